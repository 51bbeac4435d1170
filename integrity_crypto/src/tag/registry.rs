// Copyright 2020-2025 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::sync::RwLock;

use crate::error::DispatchError;
use crate::error::DispatchErrorKind;
use crate::error::DispatchResult;

use super::values::CUSTOM_RANGE_START;

/// Code-to-name registry backing one context kind.
///
/// Library members are seeded at construction; custom members are appended
/// through [`KindRegistry::register`]. Registration is intended to happen
/// during process initialization only, after which the registry is treated
/// as read-only.
pub(crate) struct KindRegistry {
  entries: RwLock<BTreeMap<u32, Cow<'static, str>>>,
}

impl KindRegistry {
  pub(crate) fn new(builtin: &[(u32, &'static str)]) -> Self {
    let entries: BTreeMap<u32, Cow<'static, str>> = builtin
      .iter()
      .map(|(code, name)| (*code, Cow::Borrowed(*name)))
      .collect();
    Self {
      entries: RwLock::new(entries),
    }
  }

  /// Appends a custom code. Codes below [`CUSTOM_RANGE_START`] are reserved.
  pub(crate) fn register(&self, code: u32, name: impl Into<Cow<'static, str>>) -> DispatchResult<()> {
    if code < CUSTOM_RANGE_START {
      return Err(DispatchError::new(DispatchErrorKind::ReservedCode).with_message(format!("code {code}")));
    }
    let mut entries = self.entries.write().expect("kind registry lock poisoned");
    if entries.contains_key(&code) {
      return Err(DispatchError::new(DispatchErrorKind::DuplicateRegistration).with_message(format!("code {code}")));
    }
    entries.insert(code, name.into());
    Ok(())
  }

  pub(crate) fn contains(&self, code: u32) -> bool {
    self.entries.read().expect("kind registry lock poisoned").contains_key(&code)
  }

  pub(crate) fn name_of(&self, code: u32) -> Option<String> {
    self
      .entries
      .read()
      .expect("kind registry lock poisoned")
      .get(&code)
      .map(|name| name.to_string())
  }
}
