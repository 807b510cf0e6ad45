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
    Address, Certificate, Coin, GenesisHash, Hasher, Nonce, RewardAccount, Slot, TransactionId,
    VKeyWitness, cbor,
    cbor::{decode_hash, encode_hash},
    to_cbor,
};
use std::{
    collections::{BTreeMap, BTreeSet},
    fmt,
};

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct TransactionInput {
    pub transaction_id: TransactionId,
    pub index: u64,
}

impl fmt::Display for TransactionInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.transaction_id, self.index)
    }
}

impl<C> cbor::Encode<C> for TransactionInput {
    fn encode<W: cbor::Write>(
        &self,
        e: &mut cbor::Encoder<W>,
        ctx: &mut C,
    ) -> Result<(), cbor::encode::Error<W::Error>> {
        e.array(2)?;
        encode_hash(&self.transaction_id, e)?;
        e.encode_with(self.index, ctx)?;
        Ok(())
    }
}

impl<'b, C> cbor::Decode<'b, C> for TransactionInput {
    fn decode(d: &mut cbor::Decoder<'b>, ctx: &mut C) -> Result<Self, cbor::decode::Error> {
        d.array()?;
        Ok(TransactionInput {
            transaction_id: decode_hash(d)?,
            index: d.decode_with(ctx)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionOutput {
    pub address: Address,
    pub value: Coin,
}

impl<C> cbor::Encode<C> for TransactionOutput {
    fn encode<W: cbor::Write>(
        &self,
        e: &mut cbor::Encoder<W>,
        ctx: &mut C,
    ) -> Result<(), cbor::encode::Error<W::Error>> {
        e.array(2)?;
        e.encode_with(&self.address, ctx)?;
        e.encode_with(self.value, ctx)?;
        Ok(())
    }
}

impl<'b, C> cbor::Decode<'b, C> for TransactionOutput {
    fn decode(d: &mut cbor::Decoder<'b>, ctx: &mut C) -> Result<Self, cbor::decode::Error> {
        d.array()?;
        Ok(TransactionOutput {
            address: d.decode_with(ctx)?,
            value: d.decode_with(ctx)?,
        })
    }
}

/// The body of a transaction: everything that is signed.
///
/// The type does not enforce a non-empty input set; the rules do, since an
/// empty set must surface as a validation error rather than a decoding one.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TransactionBody {
    pub inputs: BTreeSet<TransactionInput>,
    pub outputs: Vec<TransactionOutput>,
    pub certificates: Vec<Certificate>,
    pub withdrawals: BTreeMap<RewardAccount, Coin>,
    pub fee: Coin,
    pub time_to_live: Slot,
    pub extra_entropy: BTreeMap<GenesisHash, Nonce>,
}

impl TransactionBody {
    /// The identity of the transaction: a digest of its serialised body.
    pub fn id(&self) -> TransactionId {
        Hasher::<256>::hash(&to_cbor(self))
    }

    /// Serialised size, as accounted by the fee floor.
    pub fn bytes_size(&self) -> u64 {
        to_cbor(self).len() as u64
    }
}

impl<C> cbor::Encode<C> for TransactionBody {
    fn encode<W: cbor::Write>(
        &self,
        e: &mut cbor::Encoder<W>,
        ctx: &mut C,
    ) -> Result<(), cbor::encode::Error<W::Error>> {
        e.array(7)?;
        e.array(self.inputs.len() as u64)?;
        for input in &self.inputs {
            e.encode_with(input, ctx)?;
        }
        e.array(self.outputs.len() as u64)?;
        for output in &self.outputs {
            e.encode_with(output, ctx)?;
        }
        e.array(self.certificates.len() as u64)?;
        for certificate in &self.certificates {
            e.encode_with(certificate, ctx)?;
        }
        e.map(self.withdrawals.len() as u64)?;
        for (account, amount) in &self.withdrawals {
            e.encode_with(account, ctx)?;
            e.encode_with(amount, ctx)?;
        }
        e.encode_with(self.fee, ctx)?;
        e.encode_with(self.time_to_live, ctx)?;
        e.map(self.extra_entropy.len() as u64)?;
        for (genesis_key, nonce) in &self.extra_entropy {
            encode_hash(genesis_key, e)?;
            encode_hash(nonce, e)?;
        }
        Ok(())
    }
}

impl<'b, C> cbor::Decode<'b, C> for TransactionBody {
    fn decode(d: &mut cbor::Decoder<'b>, ctx: &mut C) -> Result<Self, cbor::decode::Error> {
        fn definite_len(
            len: Option<u64>,
            what: &str,
        ) -> Result<u64, cbor::decode::Error> {
            len.ok_or_else(|| {
                cbor::decode::Error::message(format!("indefinite {what} in transaction body"))
            })
        }

        d.array()?;

        let mut inputs = BTreeSet::new();
        for _ in 0..definite_len(d.array()?, "inputs")? {
            inputs.insert(d.decode_with(ctx)?);
        }

        let mut outputs = Vec::new();
        for _ in 0..definite_len(d.array()?, "outputs")? {
            outputs.push(d.decode_with(ctx)?);
        }

        let mut certificates = Vec::new();
        for _ in 0..definite_len(d.array()?, "certificates")? {
            certificates.push(d.decode_with(ctx)?);
        }

        let mut withdrawals = BTreeMap::new();
        for _ in 0..definite_len(d.map()?, "withdrawals")? {
            let account = d.decode_with(ctx)?;
            let amount = d.decode_with(ctx)?;
            withdrawals.insert(account, amount);
        }

        let fee = d.decode_with(ctx)?;
        let time_to_live = d.decode_with(ctx)?;

        let mut extra_entropy = BTreeMap::new();
        for _ in 0..definite_len(d.map()?, "extra entropy")? {
            let genesis_key = decode_hash(d)?;
            let nonce = decode_hash(d)?;
            extra_entropy.insert(genesis_key, nonce);
        }

        Ok(TransactionBody {
            inputs,
            outputs,
            certificates,
            withdrawals,
            fee,
            time_to_live,
            extra_entropy,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Transaction {
    pub body: TransactionBody,
    pub witnesses: BTreeSet<VKeyWitness>,
}

impl<C> cbor::Encode<C> for Transaction {
    fn encode<W: cbor::Write>(
        &self,
        e: &mut cbor::Encoder<W>,
        ctx: &mut C,
    ) -> Result<(), cbor::encode::Error<W::Error>> {
        e.array(2)?;
        e.encode_with(&self.body, ctx)?;
        e.array(self.witnesses.len() as u64)?;
        for witness in &self.witnesses {
            e.encode_with(witness, ctx)?;
        }
        Ok(())
    }
}

impl<'b, C> cbor::Decode<'b, C> for Transaction {
    fn decode(d: &mut cbor::Decoder<'b>, ctx: &mut C) -> Result<Self, cbor::decode::Error> {
        d.array()?;
        let body = d.decode_with(ctx)?;
        let mut witnesses = BTreeSet::new();
        let len = d.array()?.ok_or_else(|| {
            cbor::decode::Error::message("indefinite witness set in transaction")
        })?;
        for _ in 0..len {
            witnesses.insert(d.decode_with(ctx)?);
        }
        Ok(Transaction { body, witnesses })
    }
}

#[cfg(any(test, feature = "test-utils"))]
pub use tests::*;

#[cfg(any(test, feature = "test-utils"))]
mod tests {
    use super::*;
    use crate::any_hash32;
    use proptest::prelude::*;

    prop_compose! {
        pub fn any_transaction_input()(
            transaction_id in any_hash32(),
            index in 0..8u64,
        ) -> TransactionInput {
            TransactionInput { transaction_id, index }
        }
    }

}
