// Copyright 2020-2025 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

//! Definitions of common types (`Object`, `Timestamp`, `Url`, etc.).

mod context;
mod object;
mod one_or_many;
mod timestamp;

pub use self::context::Context;
pub use self::object::Object;
pub use self::object::Value;
pub use self::one_or_many::OneOrMany;
pub use self::timestamp::Timestamp;

pub use url::Url;
