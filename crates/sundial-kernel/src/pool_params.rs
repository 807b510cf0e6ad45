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
    AddrKeyHash, Coin, PoolId, RewardAccount, UnitInterval, cbor,
    cbor::{decode_hash, encode_hash},
};
use std::collections::BTreeSet;

/// Parameters a pool declares on (re-)registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolParams {
    pub id: PoolId,
    pub pledge: Coin,
    pub cost: Coin,
    pub margin: UnitInterval,
    pub reward_account: RewardAccount,
    pub owners: BTreeSet<AddrKeyHash>,
}

impl<C> cbor::Encode<C> for PoolParams {
    fn encode<W: cbor::Write>(
        &self,
        e: &mut cbor::Encoder<W>,
        ctx: &mut C,
    ) -> Result<(), cbor::encode::Error<W::Error>> {
        e.array(6)?;
        encode_hash(&self.id, e)?;
        e.encode_with(self.pledge, ctx)?;
        e.encode_with(self.cost, ctx)?;
        e.encode_with(self.margin, ctx)?;
        e.encode_with(self.reward_account, ctx)?;
        e.array(self.owners.len() as u64)?;
        for owner in &self.owners {
            encode_hash(owner, e)?;
        }
        Ok(())
    }
}

impl<'b, C> cbor::Decode<'b, C> for PoolParams {
    fn decode(d: &mut cbor::Decoder<'b>, ctx: &mut C) -> Result<Self, cbor::decode::Error> {
        d.array()?;
        let id = decode_hash(d)?;
        let pledge = d.decode_with(ctx)?;
        let cost = d.decode_with(ctx)?;
        let margin = d.decode_with(ctx)?;
        let reward_account = d.decode_with(ctx)?;
        let mut owners = BTreeSet::new();
        let len = d.array()?.ok_or_else(|| {
            cbor::decode::Error::message("indefinite owner set in pool parameters")
        })?;
        for _ in 0..len {
            owners.insert(decode_hash(d)?);
        }
        Ok(PoolParams {
            id,
            pledge,
            cost,
            margin,
            reward_account,
            owners,
        })
    }
}

#[cfg(any(test, feature = "test-utils"))]
pub use tests::*;

#[cfg(any(test, feature = "test-utils"))]
mod tests {
    use super::*;
    use crate::{any_hash28, any_unit_interval};
    use proptest::{collection, prelude::*};

    prop_compose! {
        pub fn any_pool_params()(
            id in any_hash28(),
            pledge in 0..1_000_000_000u64,
            cost in 0..10_000_000u64,
            margin in any_unit_interval(),
            reward_account in any_hash28(),
            owners in collection::btree_set(any_hash28(), 0..4),
        ) -> PoolParams {
            PoolParams {
                id,
                pledge,
                cost,
                margin,
                reward_account: RewardAccount::from(reward_account),
                owners,
            }
        }
    }
}
