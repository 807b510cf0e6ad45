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
    StakeKeyHash, cbor,
    cbor::{decode_hash, encode_hash},
};
use std::fmt;

/// The account into which delegation rewards accumulate, keyed by the hash of
/// the stake key that owns it.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord)]
#[repr(transparent)]
pub struct RewardAccount(StakeKeyHash);

impl RewardAccount {
    pub fn new(credential: StakeKeyHash) -> Self {
        Self(credential)
    }

    pub fn credential(&self) -> StakeKeyHash {
        self.0
    }
}

impl From<StakeKeyHash> for RewardAccount {
    fn from(credential: StakeKeyHash) -> Self {
        Self(credential)
    }
}

impl fmt::Display for RewardAccount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl<C> cbor::Encode<C> for RewardAccount {
    fn encode<W: cbor::Write>(
        &self,
        e: &mut cbor::Encoder<W>,
        _ctx: &mut C,
    ) -> Result<(), cbor::encode::Error<W::Error>> {
        encode_hash(&self.0, e)
    }
}

impl<'b, C> cbor::Decode<'b, C> for RewardAccount {
    fn decode(d: &mut cbor::Decoder<'b>, _ctx: &mut C) -> Result<Self, cbor::decode::Error> {
        decode_hash(d).map(RewardAccount)
    }
}
