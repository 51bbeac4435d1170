// Copyright 2020-2025 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

//! A small deterministic CBOR model for SD-CWT payloads.
//!
//! The redaction protocol keys a map entry by CBOR simple value 59, which
//! general-purpose CBOR value types (including `ciborium::Value`) cannot
//! represent. This model covers exactly the subset SD-CWT needs, including
//! simple values, and encodes deterministically: minimal-length heads,
//! definite lengths only.

use serde_json::Number;

use integrity_core::common::Value;

use crate::error::Error;
use crate::error::Result;

const MAX_NESTING_DEPTH: usize = 128;

/// A CBOR data item.
#[derive(Clone, Debug, PartialEq)]
#[non_exhaustive]
pub enum CborValue {
  /// Major types 0 and 1.
  Integer(i128),
  /// Major type 2.
  Bytes(Vec<u8>),
  /// Major type 3.
  Text(String),
  /// Major type 4.
  Array(Vec<CborValue>),
  /// Major type 5, in insertion order.
  Map(Vec<(CborValue, CborValue)>),
  /// Major type 6.
  Tag(u64, Box<CborValue>),
  /// Simple values other than booleans and null, e.g. simple(59).
  Simple(u8),
  /// Simple values 20 and 21.
  Bool(bool),
  /// Simple value 22.
  Null,
  /// A double-precision float (additional information 27).
  Float(f64),
}

impl CborValue {
  /// Encodes this item as deterministic CBOR bytes.
  pub fn to_bytes(&self) -> Vec<u8> {
    let mut output: Vec<u8> = Vec::new();
    self.write(&mut output);
    output
  }

  /// Decodes a single CBOR item occupying all of `data`.
  pub fn from_slice(data: &[u8]) -> Result<Self> {
    let mut position: usize = 0;
    let value: Self = Self::read(data, &mut position, 0)?;
    if position != data.len() {
      return Err(Error::InvalidCbor("trailing bytes after CBOR item".to_owned()));
    }
    Ok(value)
  }

  /// Converts a JSON value into its CBOR counterpart.
  pub fn from_json(value: &Value) -> Self {
    match value {
      Value::Null => Self::Null,
      Value::Bool(value) => Self::Bool(*value),
      Value::Number(number) => {
        if let Some(value) = number.as_i64() {
          Self::Integer(value as i128)
        } else if let Some(value) = number.as_u64() {
          Self::Integer(value as i128)
        } else {
          Self::Float(number.as_f64().unwrap_or(f64::NAN))
        }
      }
      Value::String(text) => Self::Text(text.clone()),
      Value::Array(items) => Self::Array(items.iter().map(Self::from_json).collect()),
      Value::Object(entries) => Self::Map(
        entries
          .iter()
          .map(|(key, value)| (Self::Text(key.clone()), Self::from_json(value)))
          .collect(),
      ),
    }
  }

  /// Projects this item back to JSON where a counterpart exists.
  ///
  /// Integer map keys become their decimal strings; byte strings, tags, and
  /// simple values have no JSON counterpart and yield `None`.
  pub fn to_json(&self) -> Option<Value> {
    match self {
      Self::Integer(value) => {
        if let Ok(value) = i64::try_from(*value) {
          Some(Value::Number(value.into()))
        } else {
          u64::try_from(*value).ok().map(|value| Value::Number(value.into()))
        }
      }
      Self::Text(text) => Some(Value::String(text.clone())),
      Self::Bool(value) => Some(Value::Bool(*value)),
      Self::Null => Some(Value::Null),
      Self::Float(value) => Number::from_f64(*value).map(Value::Number),
      Self::Array(items) => items.iter().map(Self::to_json).collect::<Option<Vec<Value>>>().map(Value::Array),
      Self::Map(entries) => {
        let mut object = serde_json::Map::new();
        for (key, value) in entries {
          let key: String = match key {
            Self::Text(text) => text.clone(),
            Self::Integer(value) => value.to_string(),
            _ => return None,
          };
          object.insert(key, value.to_json()?);
        }
        Some(Value::Object(object))
      }
      Self::Bytes(_) | Self::Tag(..) | Self::Simple(_) => None,
    }
  }

  fn write(&self, output: &mut Vec<u8>) {
    match self {
      Self::Integer(value) => {
        if *value >= 0 {
          write_head(0, *value as u64, output);
        } else {
          write_head(1, (-1 - value) as u64, output);
        }
      }
      Self::Bytes(bytes) => {
        write_head(2, bytes.len() as u64, output);
        output.extend_from_slice(bytes);
      }
      Self::Text(text) => {
        write_head(3, text.len() as u64, output);
        output.extend_from_slice(text.as_bytes());
      }
      Self::Array(items) => {
        write_head(4, items.len() as u64, output);
        for item in items {
          item.write(output);
        }
      }
      Self::Map(entries) => {
        write_head(5, entries.len() as u64, output);
        for (key, value) in entries {
          key.write(output);
          value.write(output);
        }
      }
      Self::Tag(tag, inner) => {
        write_head(6, *tag, output);
        inner.write(output);
      }
      Self::Simple(value) => {
        if *value < 24 {
          output.push(0xE0 | value);
        } else {
          output.push(0xF8);
          output.push(*value);
        }
      }
      Self::Bool(false) => output.push(0xF4),
      Self::Bool(true) => output.push(0xF5),
      Self::Null => output.push(0xF6),
      Self::Float(value) => {
        output.push(0xFB);
        output.extend_from_slice(&value.to_be_bytes());
      }
    }
  }

  fn read(data: &[u8], position: &mut usize, depth: usize) -> Result<Self> {
    if depth > MAX_NESTING_DEPTH {
      return Err(Error::InvalidCbor("nesting too deep".to_owned()));
    }
    let initial: u8 = take(data, position, 1)?[0];
    let major: u8 = initial >> 5;
    let additional: u8 = initial & 0x1F;

    if major == 7 {
      return match additional {
        0..=19 => Ok(Self::Simple(additional)),
        20 => Ok(Self::Bool(false)),
        21 => Ok(Self::Bool(true)),
        22 => Ok(Self::Null),
        23 => Ok(Self::Simple(23)),
        24 => Ok(Self::Simple(take(data, position, 1)?[0])),
        27 => {
          let bytes: [u8; 8] = take(data, position, 8)?.try_into().expect("eight bytes");
          Ok(Self::Float(f64::from_be_bytes(bytes)))
        }
        _ => Err(Error::InvalidCbor(format!("unsupported simple/float encoding {additional}"))),
      };
    }

    let argument: u64 = read_argument(data, position, additional)?;
    match major {
      0 => Ok(Self::Integer(argument as i128)),
      1 => Ok(Self::Integer(-1 - argument as i128)),
      2 => Ok(Self::Bytes(take(data, position, argument as usize)?.to_vec())),
      3 => {
        let bytes: Vec<u8> = take(data, position, argument as usize)?.to_vec();
        String::from_utf8(bytes)
          .map(Self::Text)
          .map_err(|_| Error::InvalidCbor("text string is not UTF-8".to_owned()))
      }
      4 => {
        let mut items: Vec<CborValue> = Vec::new();
        for _ in 0..argument {
          items.push(Self::read(data, position, depth + 1)?);
        }
        Ok(Self::Array(items))
      }
      5 => {
        let mut entries: Vec<(CborValue, CborValue)> = Vec::new();
        for _ in 0..argument {
          let key: CborValue = Self::read(data, position, depth + 1)?;
          let value: CborValue = Self::read(data, position, depth + 1)?;
          entries.push((key, value));
        }
        Ok(Self::Map(entries))
      }
      6 => Ok(Self::Tag(argument, Box::new(Self::read(data, position, depth + 1)?))),
      _ => Err(Error::InvalidCbor(format!("unsupported major type {major}"))),
    }
  }
}

fn write_head(major: u8, value: u64, output: &mut Vec<u8>) {
  let major: u8 = major << 5;
  if value < 24 {
    output.push(major | value as u8);
  } else if value <= u8::MAX as u64 {
    output.push(major | 24);
    output.push(value as u8);
  } else if value <= u16::MAX as u64 {
    output.push(major | 25);
    output.extend_from_slice(&(value as u16).to_be_bytes());
  } else if value <= u32::MAX as u64 {
    output.push(major | 26);
    output.extend_from_slice(&(value as u32).to_be_bytes());
  } else {
    output.push(major | 27);
    output.extend_from_slice(&value.to_be_bytes());
  }
}

fn read_argument(data: &[u8], position: &mut usize, additional: u8) -> Result<u64> {
  match additional {
    0..=23 => Ok(additional as u64),
    24 => Ok(take(data, position, 1)?[0] as u64),
    25 => Ok(u16::from_be_bytes(take(data, position, 2)?.try_into().expect("two bytes")) as u64),
    26 => Ok(u32::from_be_bytes(take(data, position, 4)?.try_into().expect("four bytes")) as u64),
    27 => Ok(u64::from_be_bytes(take(data, position, 8)?.try_into().expect("eight bytes"))),
    _ => Err(Error::InvalidCbor("indefinite lengths are not supported".to_owned())),
  }
}

fn take<'a>(data: &'a [u8], position: &mut usize, len: usize) -> Result<&'a [u8]> {
  let end: usize = position
    .checked_add(len)
    .filter(|end| *end <= data.len())
    .ok_or_else(|| Error::InvalidCbor("unexpected end of input".to_owned()))?;
  let slice: &'a [u8] = &data[*position..end];
  *position = end;
  Ok(slice)
}
