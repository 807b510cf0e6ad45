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

use crate::{Slot, TransactionPointer, cbor};
use std::fmt;

/// Position of a certificate within the chain, assigned when the certificate
/// is committed. Outputs may address a stake key through this pointer instead
/// of embedding the key hash.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, PartialOrd, Ord)]
pub struct CertificatePointer {
    pub transaction: TransactionPointer,
    pub certificate_index: u64,
}

impl CertificatePointer {
    pub fn slot(&self) -> Slot {
        self.transaction.slot
    }
}

impl fmt::Display for CertificatePointer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{},certificate={}",
            &self.transaction, &self.certificate_index
        )
    }
}

impl<C> cbor::Encode<C> for CertificatePointer {
    fn encode<W: cbor::Write>(
        &self,
        e: &mut cbor::Encoder<W>,
        ctx: &mut C,
    ) -> Result<(), cbor::encode::Error<W::Error>> {
        e.array(2)?;
        e.encode_with(self.transaction, ctx)?;
        e.encode_with(self.certificate_index, ctx)?;
        Ok(())
    }
}

impl<'b, C> cbor::Decode<'b, C> for CertificatePointer {
    fn decode(d: &mut cbor::Decoder<'b>, ctx: &mut C) -> Result<Self, cbor::decode::Error> {
        d.array()?;
        Ok(CertificatePointer {
            transaction: d.decode_with(ctx)?,
            certificate_index: d.decode_with(ctx)?,
        })
    }
}

#[cfg(any(test, feature = "test-utils"))]
pub use tests::*;

#[cfg(any(test, feature = "test-utils"))]
mod tests {
    use super::*;
    use crate::any_transaction_pointer;
    use proptest::prelude::*;

    prop_compose! {
        pub fn any_certificate_pointer(max_slot: u64)(
            transaction in any_transaction_pointer(max_slot),
            certificate_index in any::<u8>(),
        ) -> CertificatePointer {
            CertificatePointer {
                transaction,
                certificate_index: certificate_index as u64,
            }
        }
    }

}
