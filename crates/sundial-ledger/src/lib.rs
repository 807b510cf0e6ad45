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

//! A deterministic state-transition engine for a UTxO ledger with stake
//! delegation and stake-pool reward accounting.
//!
//! The engine is a pure function from `(state, event)` to either a new state
//! or a list of validation errors. It performs no I/O, spawns no threads and
//! never panics on a reachable path; callers own the state and hand it over
//! by value.

pub mod rules;

pub mod state;

pub mod summary;

pub mod utxo;

pub use rules::{ValidationError, Validity};
pub use state::{
    DState, EpochState, LedgerState, PState, Pots, SnapShots, UtxoState, apply_transaction,
    genesis_state, retire_pools,
};
#[cfg(any(test, feature = "test-utils"))]
pub use state::{LedgerValidation, apply_transaction_unchecked};
pub use summary::rewards::{RewardUpdate, apply_reward_update, create_reward_update};
pub use summary::stake_distribution::{StakeSnapshot, stake_distribution};
pub use utxo::Utxo;
