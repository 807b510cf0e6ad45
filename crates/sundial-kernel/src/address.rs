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
    AddrKeyHash, CertificatePointer, StakeKeyHash, cbor,
    cbor::{decode_hash, encode_hash},
};
use std::fmt;

/// An output address. The stake part either embeds the stake key hash
/// directly, or references it through the pointer assigned to its
/// registration certificate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Address {
    Base {
        payment: AddrKeyHash,
        stake: StakeKeyHash,
    },
    Pointer(CertificatePointer),
}

impl Address {
    /// The key hash entitled to spend outputs locked by this address, if any.
    pub fn payment_key(&self) -> Option<&AddrKeyHash> {
        match self {
            Address::Base { payment, .. } => Some(payment),
            Address::Pointer(..) => None,
        }
    }

    /// The stake key hash embedded in this address, if any.
    pub fn stake_key(&self) -> Option<&StakeKeyHash> {
        match self {
            Address::Base { stake, .. } => Some(stake),
            Address::Pointer(..) => None,
        }
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Address::Base { payment, stake } => write!(f, "base:{payment}/{stake}"),
            Address::Pointer(pointer) => write!(f, "pointer:{pointer}"),
        }
    }
}

impl<C> cbor::Encode<C> for Address {
    fn encode<W: cbor::Write>(
        &self,
        e: &mut cbor::Encoder<W>,
        ctx: &mut C,
    ) -> Result<(), cbor::encode::Error<W::Error>> {
        match self {
            Address::Base { payment, stake } => {
                e.array(3)?;
                e.encode_with(0u8, ctx)?;
                encode_hash(payment, e)?;
                encode_hash(stake, e)?;
            }
            Address::Pointer(pointer) => {
                e.array(2)?;
                e.encode_with(1u8, ctx)?;
                e.encode_with(pointer, ctx)?;
            }
        }
        Ok(())
    }
}

impl<'b, C> cbor::Decode<'b, C> for Address {
    fn decode(d: &mut cbor::Decoder<'b>, ctx: &mut C) -> Result<Self, cbor::decode::Error> {
        d.array()?;
        match d.u8()? {
            0 => Ok(Address::Base {
                payment: decode_hash(d)?,
                stake: decode_hash(d)?,
            }),
            1 => Ok(Address::Pointer(d.decode_with(ctx)?)),
            tag => Err(cbor::decode::Error::message(format!(
                "unknown address variant: {tag}"
            ))),
        }
    }
}

#[cfg(any(test, feature = "test-utils"))]
pub use tests::*;

#[cfg(any(test, feature = "test-utils"))]
mod tests {
    use super::*;
    use crate::{any_certificate_pointer, any_hash28};
    use proptest::prelude::*;

    pub fn any_address() -> impl Strategy<Value = Address> {
        prop_oneof![
            4 => (any_hash28(), any_hash28())
                .prop_map(|(payment, stake)| Address::Base { payment, stake }),
            1 => any_certificate_pointer(u32::MAX as u64).prop_map(Address::Pointer),
        ]
    }
}
