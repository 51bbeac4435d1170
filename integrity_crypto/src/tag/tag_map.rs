// Copyright 2020-2025 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

use std::collections::BTreeMap;
use std::fmt::Debug;

use crate::error::DispatchResult;

use super::context_kind::ContextKind;
use super::values;
use super::values::Algorithm;
use super::values::EncodingScheme;
use super::values::MaterialSemantics;
use super::values::Purpose;

/// An ordered, deeply immutable mapping from [`ContextKind`] to a context
/// value code.
///
/// Tags are the routing keys of the crypto function registry: they are
/// integer-comparable, cheap to hash, and open to third-party extension
/// through the per-kind registries. Two tags compare equal iff they contain
/// the same set of kinds with equal values.
#[derive(Clone, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct Tag {
  entries: BTreeMap<ContextKind, u32>,
}

impl Tag {
  /// Returns a [`TagBuilder`] for constructing a validated tag.
  pub fn builder() -> TagBuilder {
    TagBuilder {
      entries: BTreeMap::new(),
    }
  }

  /// Convenience constructor for private signing material held directly.
  pub fn signing(algorithm: Algorithm) -> Self {
    Self::direct(algorithm, Purpose::SIGNING)
  }

  /// Convenience constructor for public verification material held directly.
  pub fn verification(algorithm: Algorithm) -> Self {
    Self::direct(algorithm, Purpose::VERIFICATION)
  }

  /// Convenience constructor for a signature produced under `algorithm`.
  ///
  /// Signature buffers carry the algorithm under the `Verification` purpose
  /// so that a signature and the key that checks it share a discriminator.
  pub fn signature(algorithm: Algorithm) -> Self {
    Self::direct(algorithm, Purpose::VERIFICATION)
  }

  fn direct(algorithm: Algorithm, purpose: Purpose) -> Self {
    let mut entries: BTreeMap<ContextKind, u32> = BTreeMap::new();
    entries.insert(ContextKind::Algorithm, algorithm.code());
    entries.insert(ContextKind::Purpose, purpose.code());
    entries.insert(ContextKind::MaterialSemantics, MaterialSemantics::DIRECT.code());
    Self { entries }
  }

  /// Returns the raw code stored for `kind`, if present.
  pub fn get(&self, kind: ContextKind) -> Option<u32> {
    self.entries.get(&kind).copied()
  }

  /// Returns the algorithm entry, if present.
  pub fn algorithm(&self) -> Option<Algorithm> {
    self.get(ContextKind::Algorithm).map(Algorithm::from_code_unchecked)
  }

  /// Returns the purpose entry, if present.
  pub fn purpose(&self) -> Option<Purpose> {
    self.get(ContextKind::Purpose).map(Purpose::from_code_unchecked)
  }

  /// Returns the encoding-scheme entry, if present.
  pub fn encoding_scheme(&self) -> Option<EncodingScheme> {
    self.get(ContextKind::EncodingScheme).map(EncodingScheme::from_code_unchecked)
  }

  /// Returns the material-semantics entry, if present.
  pub fn material_semantics(&self) -> Option<MaterialSemantics> {
    self
      .get(ContextKind::MaterialSemantics)
      .map(MaterialSemantics::from_code_unchecked)
  }

  /// Returns an iterator over the (kind, code) entries in kind order.
  pub fn iter(&self) -> impl Iterator<Item = (ContextKind, u32)> + '_ {
    self.entries.iter().map(|(kind, code)| (*kind, *code))
  }
}

impl Debug for Tag {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    let mut map = f.debug_map();
    for (kind, code) in self.iter() {
      match values::name_of(kind, code) {
        Some(name) => map.entry(&kind.to_string(), &name),
        None => map.entry(&kind.to_string(), &code),
      };
    }
    map.finish()
  }
}

/// Builder for [`Tag`] that checks every value against its kind registry.
#[derive(Debug)]
pub struct TagBuilder {
  entries: BTreeMap<ContextKind, u32>,
}

impl TagBuilder {
  /// Sets the algorithm entry.
  pub fn algorithm(mut self, algorithm: Algorithm) -> Self {
    self.entries.insert(ContextKind::Algorithm, algorithm.code());
    self
  }

  /// Sets the purpose entry.
  pub fn purpose(mut self, purpose: Purpose) -> Self {
    self.entries.insert(ContextKind::Purpose, purpose.code());
    self
  }

  /// Sets the encoding-scheme entry.
  pub fn encoding_scheme(mut self, scheme: EncodingScheme) -> Self {
    self.entries.insert(ContextKind::EncodingScheme, scheme.code());
    self
  }

  /// Sets the material-semantics entry.
  pub fn material_semantics(mut self, semantics: MaterialSemantics) -> Self {
    self.entries.insert(ContextKind::MaterialSemantics, semantics.code());
    self
  }

  /// Builds the [`Tag`], verifying that every entry references a registered
  /// value of its kind.
  pub fn build(self) -> DispatchResult<Tag> {
    for (kind, code) in &self.entries {
      match kind {
        ContextKind::Algorithm => {
          Algorithm::try_from_code(*code)?;
        }
        ContextKind::Purpose => {
          Purpose::try_from_code(*code)?;
        }
        ContextKind::EncodingScheme => {
          EncodingScheme::try_from_code(*code)?;
        }
        ContextKind::MaterialSemantics => {
          MaterialSemantics::try_from_code(*code)?;
        }
      }
    }
    Ok(Tag { entries: self.entries })
  }
}
