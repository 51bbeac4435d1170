// Copyright 2020-2025 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

use core::fmt;
use core::str::FromStr;

use crate::error::Error;
use crate::error::Result;

/// One step of a [`CredentialPath`].
#[derive(Clone, Debug, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub enum PathSegment {
  /// A property name inside an object.
  Property(String),
  /// A zero-based position inside an array.
  Index(usize),
}

impl fmt::Display for PathSegment {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Property(name) => write!(f, "{name}"),
      Self::Index(index) => write!(f, "{index}"),
    }
  }
}

/// An ordered sequence of segments identifying a location inside a
/// credential payload.
///
/// The textual form follows JSON-pointer conventions: `/claims/0/name`
/// names the `name` property of the first element of the `claims` array,
/// and the empty string names the payload root. All-digit segments parse as
/// array indices.
#[derive(Clone, Debug, Default, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct CredentialPath {
  segments: Vec<PathSegment>,
}

impl CredentialPath {
  /// Returns the path of the payload root.
  pub fn root() -> Self {
    Self::default()
  }

  /// Parses a pointer such as `/credentialSubject/alumniOf`.
  pub fn parse(pointer: &str) -> Result<Self> {
    if pointer.is_empty() {
      return Ok(Self::root());
    }
    let Some(rest) = pointer.strip_prefix('/') else {
      return Err(Error::InvalidPath(pointer.to_owned()));
    };
    let segments: Vec<PathSegment> = rest
      .split('/')
      .map(|segment| {
        if segment.is_empty() {
          Err(Error::InvalidPath(pointer.to_owned()))
        } else if segment.bytes().all(|byte| byte.is_ascii_digit()) {
          segment
            .parse::<usize>()
            .map(PathSegment::Index)
            .map_err(|_| Error::InvalidPath(pointer.to_owned()))
        } else {
          Ok(PathSegment::Property(segment.to_owned()))
        }
      })
      .collect::<Result<_>>()?;
    Ok(Self { segments })
  }

  /// Returns the segments of this path.
  pub fn segments(&self) -> &[PathSegment] {
    &self.segments
  }

  /// Returns the number of segments.
  pub fn len(&self) -> usize {
    self.segments.len()
  }

  /// Returns `true` for the root path.
  pub fn is_empty(&self) -> bool {
    self.segments.is_empty()
  }

  /// Returns this path extended by a property segment.
  pub fn join_property(&self, name: impl Into<String>) -> Self {
    let mut segments: Vec<PathSegment> = self.segments.clone();
    segments.push(PathSegment::Property(name.into()));
    Self { segments }
  }

  /// Returns this path extended by an index segment.
  pub fn join_index(&self, index: usize) -> Self {
    let mut segments: Vec<PathSegment> = self.segments.clone();
    segments.push(PathSegment::Index(index));
    Self { segments }
  }

  /// Returns the parent path, or `None` for the root.
  pub fn parent(&self) -> Option<Self> {
    if self.segments.is_empty() {
      None
    } else {
      Some(Self {
        segments: self.segments[..self.segments.len() - 1].to_vec(),
      })
    }
  }

  /// Iterates over the proper ancestors, nearest first, ending at the root.
  pub fn ancestors(&self) -> impl Iterator<Item = CredentialPath> + '_ {
    let mut current: Option<CredentialPath> = self.parent();
    core::iter::from_fn(move || {
      let next: CredentialPath = current.take()?;
      current = next.parent();
      Some(next)
    })
  }

  /// Returns `true` if `self` is a strict prefix of `other`.
  pub fn is_ancestor_of(&self, other: &Self) -> bool {
    self.segments.len() < other.segments.len() && other.segments[..self.segments.len()] == self.segments[..]
  }
}

impl fmt::Display for CredentialPath {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    for segment in &self.segments {
      write!(f, "/{segment}")?;
    }
    Ok(())
  }
}

impl FromStr for CredentialPath {
  type Err = Error;

  fn from_str(string: &str) -> Result<Self, Self::Err> {
    Self::parse(string)
  }
}
