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
    AddrKeyHash, Epoch, PoolId, PoolParams, StakeKeyHash, cbor,
    cbor::{decode_hash, encode_hash},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Certificate {
    /// Register a stake key, charging the configured key deposit.
    StakeRegistration(StakeKeyHash),

    /// Deregister a stake key, crediting back its (decayed) deposit.
    StakeDeregistration(StakeKeyHash),

    /// Delegate a stake key to a pool. The target pool needs not be
    /// registered yet.
    StakeDelegation(StakeKeyHash, PoolId),

    /// Register a pool, or update the parameters of an existing one.
    PoolRegistration(PoolParams),

    /// Schedule a pool for retirement at the given epoch.
    PoolRetirement(PoolId, Epoch),
}

impl Certificate {
    /// The key that must have signed the enclosing transaction for this
    /// certificate to be admissible.
    pub fn required_signer(&self) -> AddrKeyHash {
        match self {
            Certificate::StakeRegistration(credential)
            | Certificate::StakeDeregistration(credential)
            | Certificate::StakeDelegation(credential, _) => *credential,
            Certificate::PoolRegistration(params) => params.id,
            Certificate::PoolRetirement(pool, _) => *pool,
        }
    }
}

impl<C> cbor::Encode<C> for Certificate {
    fn encode<W: cbor::Write>(
        &self,
        e: &mut cbor::Encoder<W>,
        ctx: &mut C,
    ) -> Result<(), cbor::encode::Error<W::Error>> {
        match self {
            Certificate::StakeRegistration(credential) => {
                e.array(2)?;
                e.encode_with(0u8, ctx)?;
                encode_hash(credential, e)?;
            }
            Certificate::StakeDeregistration(credential) => {
                e.array(2)?;
                e.encode_with(1u8, ctx)?;
                encode_hash(credential, e)?;
            }
            Certificate::StakeDelegation(credential, pool) => {
                e.array(3)?;
                e.encode_with(2u8, ctx)?;
                encode_hash(credential, e)?;
                encode_hash(pool, e)?;
            }
            Certificate::PoolRegistration(params) => {
                e.array(2)?;
                e.encode_with(3u8, ctx)?;
                e.encode_with(params, ctx)?;
            }
            Certificate::PoolRetirement(pool, epoch) => {
                e.array(3)?;
                e.encode_with(4u8, ctx)?;
                encode_hash(pool, e)?;
                e.encode_with(epoch, ctx)?;
            }
        }
        Ok(())
    }
}

impl<'b, C> cbor::Decode<'b, C> for Certificate {
    fn decode(d: &mut cbor::Decoder<'b>, ctx: &mut C) -> Result<Self, cbor::decode::Error> {
        d.array()?;
        match d.u8()? {
            0 => Ok(Certificate::StakeRegistration(decode_hash(d)?)),
            1 => Ok(Certificate::StakeDeregistration(decode_hash(d)?)),
            2 => Ok(Certificate::StakeDelegation(
                decode_hash(d)?,
                decode_hash(d)?,
            )),
            3 => Ok(Certificate::PoolRegistration(d.decode_with(ctx)?)),
            4 => Ok(Certificate::PoolRetirement(
                decode_hash(d)?,
                d.decode_with(ctx)?,
            )),
            tag => Err(cbor::decode::Error::message(format!(
                "unknown certificate variant: {tag}"
            ))),
        }
    }
}
