// Copyright 2020-2025 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

use core::fmt;
use core::str::FromStr;

use serde::de;
use serde::Deserialize;
use serde::Deserializer;
use serde::Serialize;
use serde::Serializer;
use time::format_description::well_known::Rfc3339;
use time::Duration;
use time::OffsetDateTime;
use time::UtcOffset;

use crate::error::Error;
use crate::error::Result;

/// A parsed XML Schema 1.1 `dateTimeStamp`.
///
/// Values are normalized to UTC with fractional seconds truncated, so that a
/// timestamp always re-serializes to the same string it was compared under.
/// The time-zone designator is mandatory on input: `2023-02-24T23:36:38`
/// fails to parse, `2023-02-24T23:36:38Z` and `2023-02-24T23:36:38+01:00`
/// succeed.
#[derive(Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
#[repr(transparent)]
pub struct Timestamp(OffsetDateTime);

impl Timestamp {
  /// Parses a [`Timestamp`] from the provided input string.
  ///
  /// # Errors
  ///
  /// [`Error::InvalidDateTimeStamp`] when the input does not match
  /// `YYYY-MM-DDTHH:MM:SS[.fraction](Z|±HH:MM)` or names an impossible
  /// instant.
  pub fn parse(input: &str) -> Result<Self> {
    if !is_date_time_stamp(input) {
      return Err(Error::InvalidDateTimeStamp(input.to_owned()));
    }
    let offset_date_time: OffsetDateTime = OffsetDateTime::parse(input, &Rfc3339)
      .map_err(|_| Error::InvalidDateTimeStamp(input.to_owned()))?
      .to_offset(UtcOffset::UTC);
    Ok(Self(truncate_fractional_seconds(offset_date_time)))
  }

  /// Creates a new [`Timestamp`] with the current date and time.
  ///
  /// The proof and disclosure engines never call this themselves; callers
  /// supply every timestamp explicitly.
  pub fn now_utc() -> Self {
    Self(truncate_fractional_seconds(OffsetDateTime::now_utc()))
  }

  /// Creates a new [`Timestamp`] from the given Unix timestamp in seconds.
  pub fn from_unix(seconds: i64) -> Result<Self> {
    OffsetDateTime::from_unix_timestamp(seconds)
      .map(Self)
      .map_err(|_| Error::InvalidDateTimeStamp(seconds.to_string()))
  }

  /// Returns the [`Timestamp`] as a Unix timestamp in seconds.
  pub fn to_unix(&self) -> i64 {
    self.0.unix_timestamp()
  }

  /// Returns the [`Timestamp`] as an RFC 3339 `String` in UTC.
  pub fn to_rfc3339(&self) -> String {
    // expect is okay, constructors ensure RFC 3339 compatible timestamps.
    self.0.format(&Rfc3339).expect("valid RFC 3339 timestamp")
  }

  /// Adds a number of seconds, returning `None` on overflow.
  pub fn checked_add_seconds(self, seconds: i64) -> Option<Self> {
    self.0.checked_add(Duration::seconds(seconds)).map(Self)
  }

  /// Subtracts a number of seconds, returning `None` on overflow.
  pub fn checked_sub_seconds(self, seconds: i64) -> Option<Self> {
    self.0.checked_sub(Duration::seconds(seconds)).map(Self)
  }
}

impl fmt::Debug for Timestamp {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{:?}", self.to_rfc3339())
  }
}

impl fmt::Display for Timestamp {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.to_rfc3339())
  }
}

impl FromStr for Timestamp {
  type Err = Error;

  fn from_str(string: &str) -> Result<Self, Self::Err> {
    Self::parse(string)
  }
}

impl Serialize for Timestamp {
  fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&self.to_rfc3339())
  }
}

impl<'de> Deserialize<'de> for Timestamp {
  fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
    let string: String = String::deserialize(deserializer)?;
    Self::parse(&string).map_err(de::Error::custom)
  }
}

/// Truncates an `OffsetDateTime` to the second.
fn truncate_fractional_seconds(offset_date_time: OffsetDateTime) -> OffsetDateTime {
  offset_date_time - Duration::nanoseconds(offset_date_time.nanosecond() as i64)
}

/// Structural check for the `dateTimeStamp` lexical form.
///
/// The RFC 3339 parser underneath is more permissive than XML Schema (it
/// accepts a lowercase `t`/`z`), so the shape is pinned down here first:
/// `YYYY-MM-DDTHH:MM:SS`, an optional fraction of one to seven digits, and a
/// mandatory `Z` or `±HH:MM` designator.
fn is_date_time_stamp(input: &str) -> bool {
  let bytes: &[u8] = input.as_bytes();
  if bytes.len() < 20 {
    return false;
  }

  let digits = |range: core::ops::Range<usize>| bytes[range].iter().all(u8::is_ascii_digit);
  let date_time: bool = digits(0..4)
    && bytes[4] == b'-'
    && digits(5..7)
    && bytes[7] == b'-'
    && digits(8..10)
    && bytes[10] == b'T'
    && digits(11..13)
    && bytes[13] == b':'
    && digits(14..16)
    && bytes[16] == b':'
    && digits(17..19);
  if !date_time {
    return false;
  }

  let mut index: usize = 19;
  if bytes[index] == b'.' {
    index += 1;
    let fraction_start: usize = index;
    while index < bytes.len() && bytes[index].is_ascii_digit() {
      index += 1;
    }
    let fraction_len: usize = index - fraction_start;
    if fraction_len == 0 || fraction_len > 7 {
      return false;
    }
  }

  match bytes.get(index).copied() {
    Some(b'Z') => index + 1 == bytes.len(),
    Some(b'+') | Some(b'-') => {
      index + 6 == bytes.len()
        && digits(index + 1..index + 3)
        && bytes[index + 3] == b':'
        && digits(index + 4..index + 6)
    }
    _ => false,
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn parse_valid_utc() {
    let timestamp: Timestamp = Timestamp::parse("2023-02-24T23:36:38Z").unwrap();
    assert_eq!(timestamp.to_rfc3339(), "2023-02-24T23:36:38Z");
  }

  #[test]
  fn parse_normalizes_offset_to_utc() {
    let timestamp: Timestamp = Timestamp::parse("2023-02-25T01:36:38+02:00").unwrap();
    assert_eq!(timestamp.to_rfc3339(), "2023-02-24T23:36:38Z");
  }

  #[test]
  fn parse_truncates_fractional_seconds() {
    let timestamp: Timestamp = Timestamp::parse("2023-02-24T23:36:38.1234567Z").unwrap();
    assert_eq!(timestamp.to_rfc3339(), "2023-02-24T23:36:38Z");
  }

  #[test]
  fn missing_time_zone_designator_is_rejected() {
    assert!(Timestamp::parse("2023-02-24T23:36:38").is_err());
    assert!(Timestamp::parse("2023-02-24T23:36:38.123").is_err());
  }

  #[test]
  fn lowercase_designators_are_rejected() {
    assert!(Timestamp::parse("2023-02-24t23:36:38Z").is_err());
    assert!(Timestamp::parse("2023-02-24T23:36:38z").is_err());
  }

  #[test]
  fn eight_digit_fraction_is_rejected() {
    assert!(Timestamp::parse("2023-02-24T23:36:38.12345678Z").is_err());
  }

  #[test]
  fn unix_round_trip() {
    let timestamp: Timestamp = Timestamp::parse("2023-02-24T23:36:38Z").unwrap();
    assert_eq!(Timestamp::from_unix(timestamp.to_unix()).unwrap(), timestamp);
  }

  #[test]
  fn ordering_follows_the_instant() {
    let earlier: Timestamp = Timestamp::parse("2023-02-24T23:36:38Z").unwrap();
    let later: Timestamp = earlier.checked_add_seconds(60).unwrap();
    assert!(earlier < later);
  }
}
