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

//! Primitive domain types shared by every layer of the ledger: coins, slots,
//! epochs, hashes, addresses, transactions, certificates and protocol
//! parameters. Everything here is a plain value; the state-transition rules
//! live in `sundial-ledger`.

/// Ed25519 primitives, re-exported from the underlying crypto provider.
pub mod ed25519 {
    pub use pallas_crypto::key::ed25519::{PublicKey, SecretKey, Signature};
}

pub mod cbor;
pub use cbor::{from_cbor, to_cbor};

pub mod hash;
pub use hash::*;

pub mod slot;
pub use slot::*;

pub mod epoch;
pub use epoch::*;

pub mod interval;
pub use interval::*;

pub mod transaction_pointer;
pub use transaction_pointer::*;

pub mod certificate_pointer;
pub use certificate_pointer::*;

pub mod address;
pub use address::*;

pub mod reward_account;
pub use reward_account::*;

pub mod vkey_witness;
pub use vkey_witness::*;

pub mod pool_params;
pub use pool_params::*;

pub mod certificate;
pub use certificate::*;

pub mod transaction;
pub use transaction::*;

pub mod protocol_parameters;
pub use protocol_parameters::*;

/// An amount of the smallest monetary unit. All pot arithmetic is exact;
/// underflowing a subtraction is a bug, not a saturation.
pub type Coin = u64;

/// A signed coin movement between pots (reward updates, reserve flows).
pub type DeltaCoin = i64;
