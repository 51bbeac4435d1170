// Copyright 2020-2025 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

//! Selective disclosure: salted-hash redaction, SD-JWT and SD-CWT tokens,
//! the path lattice with its minimum-disclosure solver, and key binding
//! proofs.

mod disclosure;
mod key_binding;
mod key_binding_cwt;
mod lattice;
mod path;
pub mod sd_cwt;
pub mod sd_jwt;

pub use self::disclosure::CsprngSaltGenerator;
pub use self::disclosure::Disclosure;
pub use self::disclosure::SaltGenerator;
pub use self::disclosure::MIN_SALT_LEN;
pub use self::key_binding::validate_key_binding;
pub use self::key_binding::verify_key_binding_signature;
pub use self::key_binding::KeyBindingClaims;
pub use self::key_binding::KeyBindingJwtBuilder;
pub use self::key_binding::KeyBindingValidation;
pub use self::key_binding::KeyBindingValidationOptions;
pub use self::key_binding::KB_JWT_TYP;
pub use self::key_binding_cwt::validate_key_binding_cwt;
pub use self::key_binding_cwt::KeyBindingCwtBuilder;
pub use self::key_binding_cwt::KB_CWT_TYP;
pub use self::lattice::PathLattice;
pub use self::path::CredentialPath;
pub use self::path::PathSegment;
