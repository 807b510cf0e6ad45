// Copyright 2025 PRAGMA
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

pub use pallas_crypto::hash::{Hash, Hasher};

// -----------------------------------------------------------------------------
// Hash sizes
// -----------------------------------------------------------------------------

pub mod size {
    pub const KEY: usize = 28;

    pub const NONCE: usize = 32;

    pub const TRANSACTION_BODY: usize = 32;
}

// -----------------------------------------------------------------------------
// Aliases
// -----------------------------------------------------------------------------

/// Digest of the verification key controlling the payment part of an address.
pub type AddrKeyHash = Hash<{ size::KEY }>;

/// Digest of a stake verification key; the identity of a stake key across the
/// whole delegation subsystem.
pub type StakeKeyHash = Hash<{ size::KEY }>;

/// Digest of a pool's cold verification key.
pub type PoolId = Hash<{ size::KEY }>;

/// Digest of a genesis verification key.
pub type GenesisHash = Hash<{ size::KEY }>;

pub type TransactionId = Hash<{ size::TRANSACTION_BODY }>;

/// An opaque entropy contribution.
pub type Nonce = Hash<{ size::NONCE }>;

#[cfg(any(test, feature = "test-utils"))]
pub use tests::*;

#[cfg(any(test, feature = "test-utils"))]
mod tests {
    use super::*;
    use proptest::prelude::*;

    pub fn any_hash28() -> impl Strategy<Value = Hash<28>> {
        any::<[u8; 28]>().prop_map(Hash::from)
    }

    pub fn any_hash32() -> impl Strategy<Value = Hash<32>> {
        any::<[u8; 32]>().prop_map(Hash::from)
    }
}
