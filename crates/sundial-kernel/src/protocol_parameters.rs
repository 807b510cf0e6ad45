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

use crate::{Coin, NonNegativeInterval, UnitInterval};

/// System-wide constants, fixed at genesis and never updated by the
/// protocol.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlobalParameters {
    /// Number of slots in an epoch.
    pub slots_per_epoch: u64,

    /// Inverse of the active slot coefficient (f); the expected number of
    /// blocks per epoch is `slots_per_epoch / active_slot_coeff_inverse`.
    pub active_slot_coeff_inverse: u64,
}

impl Default for GlobalParameters {
    fn default() -> Self {
        GlobalParameters {
            slots_per_epoch: 432_000,
            active_slot_coeff_inverse: 20,
        }
    }
}

/// Updatable protocol parameters, part of the ledger state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProtocolParameters {
    // Economic group
    pub min_fee_a: Coin,
    pub min_fee_b: Coin,
    pub stake_key_deposit: Coin,
    pub stake_pool_deposit: Coin,
    pub key_min_refund: UnitInterval,
    pub key_decay_rate: UnitInterval,
    pub pool_min_refund: UnitInterval,
    pub pool_decay_rate: UnitInterval,
    pub monetary_expansion_rate: UnitInterval,
    pub treasury_expansion_rate: UnitInterval,

    // Technical group
    /// Latest epoch, relative to the current one, at which a pool
    /// retirement may be scheduled.
    pub max_epoch: u64,
    pub optimal_stake_pools_count: u16,
    pub pledge_influence: NonNegativeInterval,
}

impl Default for ProtocolParameters {
    fn default() -> Self {
        ProtocolParameters {
            min_fee_a: 44,
            min_fee_b: 155_381,
            stake_key_deposit: 2_000_000,
            stake_pool_deposit: 500_000_000,
            key_min_refund: UnitInterval::from_const(1, 2),
            key_decay_rate: UnitInterval::from_const(1, 10_000),
            pool_min_refund: UnitInterval::from_const(4, 5),
            pool_decay_rate: UnitInterval::from_const(1, 10_000),
            monetary_expansion_rate: UnitInterval::from_const(3, 1_000),
            treasury_expansion_rate: UnitInterval::from_const(1, 5),
            max_epoch: 18,
            optimal_stake_pools_count: 500,
            pledge_influence: NonNegativeInterval::from_const(3, 10),
        }
    }
}
