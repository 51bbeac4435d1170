// Copyright 2020-2025 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

//! The Verifiable Credential data model.

mod builder;
#[allow(clippy::module_inception)]
mod credential;
mod issuer;
mod subject;

pub use self::builder::CredentialBuilder;
pub use self::credential::Credential;
pub use self::issuer::Issuer;
pub use self::subject::Subject;
