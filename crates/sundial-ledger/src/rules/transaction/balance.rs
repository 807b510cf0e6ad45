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
    Validity,
    rules::ValidationError,
    state::{DState, PState},
    summary::{SafeRatio, floor_to_coin, safe_ratio},
    utxo::Utxo,
};
use num::{
    BigUint,
    traits::{One, Pow},
};
use std::collections::{BTreeMap, BTreeSet};
use sundial_kernel::{
    Certificate, Coin, PoolId, ProtocolParameters, Slot, StakeKeyHash, TransactionBody,
    UnitInterval,
};

/// Deposits charged by this transaction: the key deposit for every stake-key
/// registration, and the pool deposit for every pool registration whose pool
/// is not already known (re-registering an existing pool is free, including
/// within the same transaction).
pub fn deposits(
    protocol_parameters: &ProtocolParameters,
    pools: &BTreeMap<PoolId, Slot>,
    certificates: &[Certificate],
) -> Coin {
    let mut known: BTreeSet<PoolId> = pools.keys().copied().collect();
    certificates
        .iter()
        .map(|certificate| match certificate {
            Certificate::StakeRegistration(..) => protocol_parameters.stake_key_deposit,
            Certificate::PoolRegistration(params) if known.insert(params.id) => {
                protocol_parameters.stake_pool_deposit
            }
            _ => 0,
        })
        .sum()
}

// Registered keys a body deregisters, each at most once; a duplicate
// certificate must not double a refund.
fn deregistered_keys<'a>(
    dstate: &DState,
    body: &'a TransactionBody,
) -> BTreeSet<&'a StakeKeyHash> {
    body.certificates
        .iter()
        .filter_map(|certificate| match certificate {
            Certificate::StakeDeregistration(credential)
                if dstate.stake_keys.contains_key(credential) =>
            {
                Some(credential)
            }
            _ => None,
        })
        .collect()
}

/// Decayed refunds credited by this transaction's deregistrations, each aged
/// from its registration slot to the transaction's time-to-live.
pub fn key_refunds(
    protocol_parameters: &ProtocolParameters,
    dstate: &DState,
    body: &TransactionBody,
) -> Coin {
    deregistered_keys(dstate, body)
        .into_iter()
        .filter_map(|credential| dstate.stake_keys.get(credential))
        .map(|registered_at| {
            decayed_refund(
                protocol_parameters.stake_key_deposit,
                &protocol_parameters.key_min_refund,
                &protocol_parameters.key_decay_rate,
                body.time_to_live.elapsed_since(*registered_at),
            )
        })
        .sum()
}

/// Full deposits released by this transaction's deregistrations. The
/// difference with `key_refunds` is the decay accrued by each deposit.
pub fn released_key_deposits(
    protocol_parameters: &ProtocolParameters,
    dstate: &DState,
    body: &TransactionBody,
) -> Coin {
    deregistered_keys(dstate, body).len() as Coin * protocol_parameters.stake_key_deposit
}

/// `⌊d × (m + (1 − m)·(1 − λ)^Δ)⌋`: monotonically decreasing in the age,
/// bounded below by `d·m` and above by `d`. Exact rational arithmetic, one
/// floor at the end.
pub fn decayed_refund(
    deposit: Coin,
    min_refund: &UnitInterval,
    decay_rate: &UnitInterval,
    age: u64,
) -> Coin {
    let m = safe_ratio(min_refund.numerator(), min_refund.denominator());
    let retained = (SafeRatio::one() - &m) * retention(decay_rate, age);
    floor_to_coin((m + retained) * BigUint::from(deposit))
}

// (1 − λ)^Δ
fn retention(decay_rate: &UnitInterval, age: u64) -> SafeRatio {
    if decay_rate.numerator() == 0 || age == 0 {
        return SafeRatio::one();
    }
    let numerator = BigUint::from(decay_rate.denominator() - decay_rate.numerator());
    let denominator = BigUint::from(decay_rate.denominator());
    SafeRatio::new(Pow::pow(numerator, age), Pow::pow(denominator, age))
}

pub fn consumed(
    protocol_parameters: &ProtocolParameters,
    utxo: &Utxo,
    dstate: &DState,
    body: &TransactionBody,
) -> Coin {
    utxo.balance_of(&body.inputs)
        + key_refunds(protocol_parameters, dstate, body)
        + body.withdrawals.values().sum::<Coin>()
}

pub fn produced(
    protocol_parameters: &ProtocolParameters,
    pools: &BTreeMap<PoolId, Slot>,
    body: &TransactionBody,
) -> Coin {
    body.outputs.iter().map(|output| output.value).sum::<Coin>()
        + body.fee
        + deposits(protocol_parameters, pools, &body.certificates)
}

pub(crate) fn execute(
    protocol_parameters: &ProtocolParameters,
    utxo: &Utxo,
    dstate: &DState,
    pstate: &PState,
    body: &TransactionBody,
) -> Validity {
    let consumed = consumed(protocol_parameters, utxo, dstate, body);
    let produced = produced(protocol_parameters, &pstate.pools, body);
    Validity::valid_or(
        consumed == produced,
        ValidationError::ValueNotConserved { consumed, produced },
    )
}
