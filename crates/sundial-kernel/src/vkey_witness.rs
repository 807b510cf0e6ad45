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

use crate::{AddrKeyHash, Hasher, cbor, ed25519};

/// A verification key and a signature over the transaction body hash.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct VKeyWitness {
    pub vkey: [u8; ed25519::PublicKey::SIZE],
    pub signature: [u8; ed25519::Signature::SIZE],
}

impl VKeyWitness {
    /// The hash under which this witness' key is known to the ledger.
    pub fn key_hash(&self) -> AddrKeyHash {
        Hasher::<224>::hash(&self.vkey)
    }

    /// Cryptographically verify the witness against a signed message.
    pub fn verify(&self, message: &[u8]) -> bool {
        let public_key = ed25519::PublicKey::from(self.vkey);
        let signature = ed25519::Signature::from(self.signature);
        public_key.verify(message, &signature)
    }
}

impl<C> cbor::Encode<C> for VKeyWitness {
    fn encode<W: cbor::Write>(
        &self,
        e: &mut cbor::Encoder<W>,
        _ctx: &mut C,
    ) -> Result<(), cbor::encode::Error<W::Error>> {
        e.array(2)?;
        e.bytes(&self.vkey)?;
        e.bytes(&self.signature)?;
        Ok(())
    }
}

impl<'b, C> cbor::Decode<'b, C> for VKeyWitness {
    fn decode(d: &mut cbor::Decoder<'b>, _ctx: &mut C) -> Result<Self, cbor::decode::Error> {
        fn sized<const N: usize>(bytes: &[u8]) -> Result<[u8; N], cbor::decode::Error> {
            <[u8; N]>::try_from(bytes).map_err(|_| {
                cbor::decode::Error::message(format!(
                    "invalid length: expected {N} bytes, got {}",
                    bytes.len()
                ))
            })
        }

        d.array()?;
        Ok(VKeyWitness {
            vkey: sized(d.bytes()?)?,
            signature: sized(d.bytes()?)?,
        })
    }
}
