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

/*
Rewards are distributed per epoch, drawn from monetary expansion and
transaction fees, and shared among pools according to the stake they
attracted and the blocks they actually produced.

The computation consumes the oldest of the three rolling snapshots (`go`):
stake moved during epoch `e` only affects the leader schedule of `e + 1`,
and its rewards are computed against the performance observed then, so the
engine always works two epochs behind the live state.

A few refinements keep the incentives honest:

- Rewards are capped for saturated pools, so splitting stake across many
  pools beats concentrating it.
- A pool whose owners do not hold the pledge they declared earns nothing.
- Operators are paid their declared cost and margin first; the remainder is
  shared among members in proportion to their stake.

Whatever cannot be allocated (unmet pledges, under-production, accounts
deregistered since the snapshot) flows back to the treasury.
*/

use crate::{
    state::EpochState,
    summary::{SafeRatio, floor_to_coin, safe_ratio},
};
use num::{BigUint, traits::One};
use serde::ser::SerializeStruct;
use std::collections::BTreeMap;
use sundial_kernel::{
    Coin, DeltaCoin, GlobalParameters, PoolId, PoolParams, ProtocolParameters, RewardAccount,
};
use tracing::info;

const EVENT_TARGET: &str = "sundial::ledger::summary::rewards";

/// The outcome of a reward calculation, applied to an epoch state at a later
/// boundary. The three deltas and the sum of freshly-earned rewards cancel
/// out exactly.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RewardUpdate {
    pub delta_treasury: DeltaCoin,
    pub delta_reserves: DeltaCoin,
    pub delta_fees: DeltaCoin,

    /// New balances for the rewarded accounts: the balance observed at
    /// construction time plus whatever the account earned. Applying the
    /// update replaces balances with these; it does not add.
    pub rewards: BTreeMap<RewardAccount, Coin>,
}

impl serde::Serialize for RewardUpdate {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut s = serializer.serialize_struct("RewardUpdate", 4)?;
        s.serialize_field("delta_treasury", &self.delta_treasury)?;
        s.serialize_field("delta_reserves", &self.delta_reserves)?;
        s.serialize_field("delta_fees", &self.delta_fees)?;
        s.serialize_field(
            "rewards",
            &self
                .rewards
                .iter()
                .map(|(account, amount)| (account.to_string(), *amount))
                .collect::<BTreeMap<_, _>>(),
        )?;
        s.end()
    }
}

/// Compute the reward update for the epoch that just ended, from the `go`
/// snapshot, the fee snapshot, the reserves, and the per-pool block counts.
pub fn create_reward_update(
    global: &GlobalParameters,
    blocks_made: &BTreeMap<PoolId, u64>,
    epoch_state: &EpochState,
) -> RewardUpdate {
    let protocol_parameters = &epoch_state.protocol_parameters;
    let snapshot = &epoch_state.snapshots.go;
    let fee_snapshot = epoch_state.snapshots.fees;
    let reserves = epoch_state.pots.reserves;

    let blocks_total: u64 = blocks_made.values().sum();

    let efficiency = SafeRatio::one().min(safe_ratio(
        blocks_total.saturating_mul(global.active_slot_coeff_inverse),
        global.slots_per_epoch,
    ));

    let rho = safe_ratio(
        protocol_parameters.monetary_expansion_rate.numerator(),
        protocol_parameters.monetary_expansion_rate.denominator(),
    );
    let tau = safe_ratio(
        protocol_parameters.treasury_expansion_rate.numerator(),
        protocol_parameters.treasury_expansion_rate.denominator(),
    );

    let incentives = floor_to_coin(&efficiency * rho * BigUint::from(reserves));
    let total_pot = fee_snapshot + incentives;
    let treasury_tax = floor_to_coin(tau * BigUint::from(total_pot));
    let available_rewards = total_pot - treasury_tax;

    let total_stake = snapshot.total_stake();
    let pools_stake = snapshot.pools_stake();

    let mut earned: BTreeMap<RewardAccount, Coin> = BTreeMap::new();
    let mut pool_pots: BTreeMap<PoolId, Coin> = BTreeMap::new();

    for (pool, params) in &snapshot.pool_params {
        let Some(blocks) = blocks_made.get(pool).copied() else {
            continue;
        };

        let pool_stake = pools_stake.get(pool).copied().unwrap_or(0);
        let owner_stake = snapshot.owner_stake(params);

        let pot = pool_rewards(
            protocol_parameters,
            params,
            available_rewards,
            total_stake,
            pool_stake,
            owner_stake,
            blocks,
            blocks_total,
        );

        let leader = leader_rewards(pot, params, owner_stake, pool_stake);
        if leader > 0 {
            *earned.entry(params.reward_account).or_insert(0) += leader;
        }

        pool_pots.insert(*pool, pot);
    }

    for (member, stake) in &snapshot.stake {
        let Some(pool) = snapshot.delegations.get(member) else {
            continue;
        };
        let (Some(params), Some(pot)) = (snapshot.pool_params.get(pool), pool_pots.get(pool))
        else {
            continue;
        };
        // Owners earn leader rewards instead of member rewards.
        if params.owners.contains(member) {
            continue;
        }

        let pool_stake = pools_stake.get(pool).copied().unwrap_or(0);
        let amount = member_rewards(*pot, params, *stake, pool_stake);
        if amount > 0 {
            *earned.entry(RewardAccount::from(*member)).or_insert(0) += amount;
        }
    }

    // Accounts deregistered since the snapshot cannot be paid; their share
    // flows back to the treasury along with everything else left unallocated.
    let registered = &epoch_state.ledger_state.dstate.rewards;
    earned.retain(|account, _| registered.contains_key(account));

    let distributed: Coin = earned.values().sum();
    debug_assert!(distributed <= available_rewards, "over-allocated rewards");
    let unallocated = available_rewards.saturating_sub(distributed);

    info!(
        target: EVENT_TARGET,
        efficiency = %efficiency,
        incentives = incentives,
        treasury_tax = treasury_tax,
        available_rewards = available_rewards,
        distributed = distributed,
        "rewards.summary",
    );

    // The applied balances shadow whatever is in the account at application
    // time, so the earned amounts are grafted onto the balances observed
    // now.
    let rewards = earned
        .into_iter()
        .map(|(account, amount)| {
            let prior = registered.get(&account).copied().unwrap_or(0);
            (account, prior + amount)
        })
        .collect();

    RewardUpdate {
        delta_treasury: (treasury_tax + unallocated) as DeltaCoin,
        delta_reserves: -(incentives as DeltaCoin),
        delta_fees: -(fee_snapshot as DeltaCoin),
        rewards,
    }
}

/// Apply a reward update: move the deltas across the pots and replace the
/// balances of the rewarded accounts. Entries whose account has been
/// deregistered in the meantime are dropped; their amounts were already
/// returned to the treasury at construction time.
pub fn apply_reward_update(update: &RewardUpdate, epoch_state: EpochState) -> EpochState {
    let mut epoch_state = epoch_state;

    epoch_state.pots.treasury = apply_delta(epoch_state.pots.treasury, update.delta_treasury);
    epoch_state.pots.reserves = apply_delta(epoch_state.pots.reserves, update.delta_reserves);
    epoch_state.ledger_state.utxo_state.fees = apply_delta(
        epoch_state.ledger_state.utxo_state.fees,
        update.delta_fees,
    );

    for (account, amount) in &update.rewards {
        if let Some(balance) = epoch_state.ledger_state.dstate.rewards.get_mut(account) {
            *balance = *amount;
        }
    }

    epoch_state
}

fn apply_delta(pot: Coin, delta: DeltaCoin) -> Coin {
    let next = i128::from(pot) + i128::from(delta);
    debug_assert!(next >= 0, "pot underflow");
    Coin::try_from(next.max(0))
        .unwrap_or_else(|_| unreachable!("pot exceeds the maximum coin supply"))
}

// -------------------------------------------------------------------- Formulas

/// Optimal (i.e. maximum) rewards for the pool, assuming it produced its
/// expected number of blocks. Saturation caps the relative stake at `1/k`,
/// and the pledge sweetens the cap through the `a0` influence factor.
///
/// Only meaningful when the pool holds stake and meets its pledge; both are
/// checked by the caller, and the latter keeps the inner subtraction
/// non-negative (`pledge ≤ owner stake ≤ pool stake`).
fn optimal_rewards(
    protocol_parameters: &ProtocolParameters,
    available_rewards: Coin,
    total_stake: Coin,
    pool_stake: Coin,
    pledge: Coin,
) -> Coin {
    let one = SafeRatio::one();
    let a0 = safe_ratio(
        protocol_parameters.pledge_influence.numerator(),
        protocol_parameters.pledge_influence.denominator(),
    );
    let z0 = safe_ratio(1, (protocol_parameters.optimal_stake_pools_count as u64).max(1));

    let relative_pledge = safe_ratio(pledge, total_stake);
    let relative_stake = safe_ratio(pool_stake, total_stake);

    let r = SafeRatio::from_integer(BigUint::from(available_rewards));
    let p = (&z0).min(&relative_pledge);
    let s = (&z0).min(&relative_stake);

    // R / (1 + a0)
    let left = r / (one + &a0);

    // σ' + p' × a0 × (σ' - p' × (z0 - σ') / z0) / z0
    //               ⎝___________ z0_factor__________⎠
    let right = {
        let z0_factor = (s - p * (&z0 - s) / &z0) / &z0;
        s + p * &a0 * z0_factor
    };

    floor_to_coin(left * right)
}

/// The pool's reward pot: its apparent performance applied to its optimal
/// rewards. Zero when the pool attracted no stake or missed its pledge.
#[allow(clippy::too_many_arguments)]
fn pool_rewards(
    protocol_parameters: &ProtocolParameters,
    params: &PoolParams,
    available_rewards: Coin,
    total_stake: Coin,
    pool_stake: Coin,
    owner_stake: Coin,
    blocks: u64,
    blocks_total: u64,
) -> Coin {
    if pool_stake == 0 || owner_stake < params.pledge {
        return 0;
    }

    // (n / N) / σ
    let performance =
        safe_ratio(blocks, blocks_total.max(1)) * safe_ratio(total_stake, pool_stake);

    let optimal = optimal_rewards(
        protocol_parameters,
        available_rewards,
        total_stake,
        pool_stake,
        params.pledge,
    );

    floor_to_coin(performance * BigUint::from(optimal))
}

/// The operator's cut: the declared cost, plus the margin applied to the
/// rest, plus a member-like share for the owners' own stake. A pot smaller
/// than the cost goes to the operator in full.
fn leader_rewards(
    pool_rewards: Coin,
    params: &PoolParams,
    owner_stake: Coin,
    pool_stake: Coin,
) -> Coin {
    let cost = params.cost;

    if pool_rewards <= cost {
        return pool_rewards;
    }

    let margin = safe_ratio(params.margin.numerator(), params.margin.denominator());

    // A pot above cost implies the pool held stake.
    let owner_ratio = safe_ratio(owner_stake, pool_stake);

    // m + (1 - m) × s / σ
    let margin_factor = &margin + (SafeRatio::one() - &margin) * owner_ratio;

    cost + floor_to_coin(margin_factor * BigUint::from(pool_rewards - cost))
}

/// A member's share of the pot after cost and margin, in proportion to its
/// stake within the pool.
fn member_rewards(
    pool_rewards: Coin,
    params: &PoolParams,
    member_stake: Coin,
    pool_stake: Coin,
) -> Coin {
    let cost = params.cost;

    if pool_rewards <= cost || pool_stake == 0 {
        return 0;
    }

    let margin = safe_ratio(params.margin.numerator(), params.margin.denominator());

    // ⌊ (1 - m) × (R_pool - c) × t / σ ⌋
    floor_to_coin(
        (SafeRatio::one() - margin)
            * safe_ratio(member_stake, pool_stake)
            * BigUint::from(pool_rewards - cost),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        state::{DState, EpochState, Pots, SnapShots},
        summary::stake_distribution::StakeSnapshot,
    };
    use std::collections::BTreeSet;
    use sundial_kernel::{Hash, Slot, StakeKeyHash, UnitInterval};

    fn key(tag: u8) -> StakeKeyHash {
        Hash::from([tag; 28])
    }

    fn register(dstate: &mut DState, credential: StakeKeyHash, balance: Coin) {
        dstate.stake_keys.insert(credential, Slot::from(0));
        dstate
            .rewards
            .insert(RewardAccount::from(credential), balance);
    }

    #[allow(clippy::unwrap_used)]
    fn single_pool_epoch_state() -> (EpochState, BTreeMap<PoolId, u64>, GlobalParameters) {
        let pool = key(9);
        let params = PoolParams {
            id: pool,
            pledge: 0,
            cost: 10,
            margin: UnitInterval::ZERO,
            reward_account: RewardAccount::from(key(3)),
            owners: BTreeSet::new(),
        };

        let snapshot = StakeSnapshot {
            stake: BTreeMap::from([(key(1), 600), (key(2), 400)]),
            delegations: BTreeMap::from([(key(1), pool), (key(2), pool)]),
            pool_params: BTreeMap::from([(pool, params)]),
        };

        let mut epoch_state = EpochState {
            pots: Pots {
                treasury: 0,
                reserves: 10_000,
            },
            protocol_parameters: ProtocolParameters {
                monetary_expansion_rate: UnitInterval::new(1, 10).unwrap(),
                treasury_expansion_rate: UnitInterval::new(1, 5).unwrap(),
                optimal_stake_pools_count: 1,
                pledge_influence: sundial_kernel::NonNegativeInterval::new(0, 1).unwrap(),
                ..ProtocolParameters::default()
            },
            snapshots: SnapShots {
                go: snapshot,
                fees: 100,
                ..SnapShots::default()
            },
            ..EpochState::default()
        };

        for credential in [key(1), key(2), key(3)] {
            register(&mut epoch_state.ledger_state.dstate, credential, 0);
        }

        let global = GlobalParameters {
            slots_per_epoch: 100,
            active_slot_coeff_inverse: 2,
        };

        (epoch_state, BTreeMap::from([(key(9), 25u64)]), global)
    }

    fn conservation(update: &RewardUpdate, prior: &BTreeMap<RewardAccount, Coin>) -> i128 {
        let earned: i128 = update
            .rewards
            .iter()
            .map(|(account, amount)| {
                i128::from(*amount) - i128::from(prior.get(account).copied().unwrap_or(0))
            })
            .sum();
        i128::from(update.delta_treasury)
            + i128::from(update.delta_reserves)
            + i128::from(update.delta_fees)
            + earned
    }

    #[test]
    fn single_pool_split_by_hand() {
        let (epoch_state, blocks_made, global) = single_pool_epoch_state();
        let update = create_reward_update(&global, &blocks_made, &epoch_state);

        // η = min(1, 25·2/100) = 1/2; ΔR = ⌊0.5·0.1·10000⌋ = 500;
        // pot = 100 + 500 = 600; treasury tax = 120; r = 480.
        // Fully saturated single pool with full apparent performance takes
        // the whole pot: leader cost 10, members split 470 as 600:400.
        assert_eq!(update.delta_reserves, -500);
        assert_eq!(update.delta_fees, -100);
        assert_eq!(update.delta_treasury, 120);
        assert_eq!(
            update.rewards,
            BTreeMap::from([
                (RewardAccount::from(key(1)), 282),
                (RewardAccount::from(key(2)), 188),
                (RewardAccount::from(key(3)), 10),
            ]),
        );
        assert_eq!(conservation(&update, &BTreeMap::new()), 0);
    }

    #[test]
    fn unmet_pledge_zeroes_the_pool_pot() {
        let (mut epoch_state, blocks_made, global) = single_pool_epoch_state();
        if let Some(params) = epoch_state.snapshots.go.pool_params.get_mut(&key(9)) {
            params.pledge = 1_000_000;
        }

        let update = create_reward_update(&global, &blocks_made, &epoch_state);

        assert!(update.rewards.is_empty());
        // Everything that was not distributed flows back to the treasury.
        assert_eq!(update.delta_treasury, 600);
        assert_eq!(conservation(&update, &BTreeMap::new()), 0);
    }

    #[test]
    fn deregistered_accounts_forfeit_to_the_treasury() {
        let (mut epoch_state, blocks_made, global) = single_pool_epoch_state();
        epoch_state.ledger_state.dstate.stake_keys.remove(&key(2));
        epoch_state
            .ledger_state
            .dstate
            .rewards
            .remove(&RewardAccount::from(key(2)));

        let update = create_reward_update(&global, &blocks_made, &epoch_state);

        assert!(!update.rewards.contains_key(&RewardAccount::from(key(2))));
        assert_eq!(update.delta_treasury, 120 + 188);
        assert_eq!(conservation(&update, &BTreeMap::new()), 0);
    }

    #[test]
    fn earned_rewards_graft_onto_the_observed_balance() {
        let (mut epoch_state, blocks_made, global) = single_pool_epoch_state();
        register(&mut epoch_state.ledger_state.dstate, key(1), 50);

        let prior = epoch_state.ledger_state.dstate.rewards.clone();
        let update = create_reward_update(&global, &blocks_made, &epoch_state);

        assert_eq!(
            update.rewards.get(&RewardAccount::from(key(1))),
            Some(&332), // 50 observed + 282 earned
        );
        assert_eq!(conservation(&update, &prior), 0);
    }

    #[test]
    fn idle_epoch_still_taxes_the_fees() {
        let (epoch_state, _, global) = single_pool_epoch_state();
        let update = create_reward_update(&global, &BTreeMap::new(), &epoch_state);

        // No blocks: no expansion, no pool rewards; the fee snapshot is
        // taxed and the rest returns to the treasury.
        assert_eq!(update.delta_reserves, 0);
        assert_eq!(update.delta_fees, -100);
        assert_eq!(update.delta_treasury, 100);
        assert!(update.rewards.is_empty());
        assert_eq!(conservation(&update, &BTreeMap::new()), 0);
    }

    #[test]
    fn applying_an_update_moves_every_pot() {
        let mut epoch_state = EpochState {
            pots: Pots {
                treasury: 100,
                reserves: 1_000,
            },
            ..EpochState::default()
        };
        epoch_state.ledger_state.utxo_state.fees = 2;
        register(&mut epoch_state.ledger_state.dstate, key(1), 0);
        register(&mut epoch_state.ledger_state.dstate, key(2), 0);

        let update = RewardUpdate {
            delta_treasury: 3,
            delta_reserves: -10,
            delta_fees: -2,
            rewards: BTreeMap::from([
                (RewardAccount::from(key(1)), 4),
                (RewardAccount::from(key(2)), 5),
            ]),
        };

        assert_eq!(conservation(&update, &BTreeMap::new()), 0);

        let epoch_state = apply_reward_update(&update, epoch_state);

        assert_eq!(epoch_state.pots.treasury, 103);
        assert_eq!(epoch_state.pots.reserves, 990);
        assert_eq!(epoch_state.ledger_state.utxo_state.fees, 0);
        assert_eq!(
            epoch_state.ledger_state.dstate.rewards,
            BTreeMap::from([
                (RewardAccount::from(key(1)), 4),
                (RewardAccount::from(key(2)), 5),
            ]),
        );
    }

    #[test]
    fn updated_balances_shadow_prior_ones() {
        let mut epoch_state = EpochState::default();
        register(&mut epoch_state.ledger_state.dstate, key(1), 50);

        let update = RewardUpdate {
            rewards: BTreeMap::from([(RewardAccount::from(key(1)), 9)]),
            ..RewardUpdate::default()
        };

        let epoch_state = apply_reward_update(&update, epoch_state);
        assert_eq!(
            epoch_state.ledger_state.dstate.rewards.get(&RewardAccount::from(key(1))),
            Some(&9),
        );
    }

    #[test]
    fn serialises_with_hex_encoded_accounts() {
        let update = RewardUpdate {
            delta_treasury: 3,
            delta_reserves: -10,
            delta_fees: -2,
            rewards: BTreeMap::from([(RewardAccount::from(key(1)), 9)]),
        };

        #[allow(clippy::unwrap_used)]
        let encoded = serde_json::to_value(&update).unwrap();
        assert_eq!(
            encoded["rewards"][hex::encode([1u8; 28]).as_str()],
            serde_json::json!(9),
        );
        assert_eq!(encoded["delta_reserves"], serde_json::json!(-10));
    }
}
