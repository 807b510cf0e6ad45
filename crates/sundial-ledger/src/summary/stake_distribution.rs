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

use crate::{
    state::{DState, LedgerState, PState},
    utxo::Utxo,
};
use std::collections::BTreeMap;
use sundial_kernel::{Address, Coin, PoolId, PoolParams, StakeKeyHash};
use tracing::info;

const EVENT_TARGET: &str = "sundial::ledger::summary::stake_distribution";

/// Materialise the stake held by each active stake key: the coin of every
/// output whose address references the key (directly or through a pointer),
/// plus the balance of its reward account. Keys that are unregistered,
/// undelegated, or delegated to an unregistered pool hold no active stake
/// and are absent from the result.
pub fn stake_distribution(
    utxo: &Utxo,
    dstate: &DState,
    pstate: &PState,
) -> BTreeMap<StakeKeyHash, Coin> {
    let mut buckets: BTreeMap<StakeKeyHash, Coin> = BTreeMap::new();

    for (_, output) in utxo.iter() {
        match &output.address {
            Address::Base { stake, .. } => {
                *buckets.entry(*stake).or_insert(0) += output.value;
            }
            Address::Pointer(pointer) => {
                if let Some(stake) = dstate.pointers.get(pointer) {
                    *buckets.entry(*stake).or_insert(0) += output.value;
                }
            }
        }
    }

    for (account, balance) in &dstate.rewards {
        *buckets.entry(account.credential()).or_insert(0) += balance;
    }

    buckets.retain(|stake_key, _| {
        dstate.stake_keys.contains_key(stake_key)
            && dstate
                .delegations
                .get(stake_key)
                .is_some_and(|pool| pstate.pools.contains_key(pool))
    });

    buckets
}

/// Aggregate a stake distribution by delegatee.
pub fn pool_stake(
    stake: &BTreeMap<StakeKeyHash, Coin>,
    delegations: &BTreeMap<StakeKeyHash, PoolId>,
) -> BTreeMap<PoolId, Coin> {
    let mut pools: BTreeMap<PoolId, Coin> = BTreeMap::new();
    for (stake_key, amount) in stake {
        if let Some(pool) = delegations.get(stake_key) {
            *pools.entry(*pool).or_insert(0) += amount;
        }
    }
    pools
}

/// A stake distribution frozen at an epoch boundary, with the delegation map
/// and pool parameters it was computed against. The reward engine consumes
/// these two epochs later.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StakeSnapshot {
    pub stake: BTreeMap<StakeKeyHash, Coin>,
    pub delegations: BTreeMap<StakeKeyHash, PoolId>,
    pub pool_params: BTreeMap<PoolId, PoolParams>,
}

impl StakeSnapshot {
    pub fn take(ledger_state: &LedgerState) -> Self {
        let stake = stake_distribution(
            &ledger_state.utxo_state.utxo,
            &ledger_state.dstate,
            &ledger_state.pstate,
        );

        let delegations = ledger_state
            .dstate
            .delegations
            .iter()
            .filter(|(stake_key, _)| stake.contains_key(*stake_key))
            .map(|(stake_key, pool)| (*stake_key, *pool))
            .collect::<BTreeMap<_, _>>();

        info!(
            target: EVENT_TARGET,
            accounts = stake.len(),
            pools = ledger_state.pstate.pools.len(),
            active_stake = stake.values().sum::<Coin>(),
            "snapshot",
        );

        StakeSnapshot {
            stake,
            delegations,
            pool_params: ledger_state.pstate.params.clone(),
        }
    }

    /// Total active stake; the denominator of every relative stake.
    pub fn total_stake(&self) -> Coin {
        self.stake.values().sum()
    }

    pub fn pools_stake(&self) -> BTreeMap<PoolId, Coin> {
        pool_stake(&self.stake, &self.delegations)
    }

    /// Stake controlled by a pool's declared owners and delegated to it;
    /// what the pledge is checked against.
    pub fn owner_stake(&self, params: &PoolParams) -> Coin {
        params
            .owners
            .iter()
            .filter(|owner| self.delegations.get(*owner) == Some(&params.id))
            .filter_map(|owner| self.stake.get(owner))
            .sum()
    }
}
