// Copyright 2020-2025 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

//! Pooled, scoped, zeroing buffers for keys and signatures.

mod pool;
mod sensitive;

pub use self::pool::SensitiveMemoryPool;
pub use self::sensitive::PrivateKeyMemory;
pub use self::sensitive::PublicKeyMemory;
pub use self::sensitive::SensitiveMemory;
pub use self::sensitive::SignatureMemory;
