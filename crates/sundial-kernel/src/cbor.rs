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

use crate::Hash;
use std::convert::Infallible;

pub use minicbor::{
    Decode, Decoder, Encode, Encoder, data::Tag, decode, encode, encode::Write,
};

#[allow(clippy::unwrap_used)]
/// Encode any serialisable value `T` into bytes.
pub fn to_cbor<T: Encode<()>>(value: &T) -> Vec<u8> {
    let mut buffer = Vec::new();
    let result: Result<(), encode::Error<Infallible>> = minicbor::encode(value, &mut buffer);
    result.unwrap(); // Infallible
    buffer
}

/// Decode raw bytes into a structured type `T`, assuming no context.
pub fn from_cbor<T: for<'d> Decode<'d, ()>>(bytes: &[u8]) -> Option<T> {
    minicbor::decode(bytes).ok()
}

/// Digests are foreign types; they serialise as definite byte strings.
pub fn encode_hash<const N: usize, W: Write>(
    hash: &Hash<N>,
    e: &mut Encoder<W>,
) -> Result<(), encode::Error<W::Error>> {
    e.bytes(hash.as_ref())?;
    Ok(())
}

pub fn decode_hash<const N: usize>(d: &mut Decoder<'_>) -> Result<Hash<N>, decode::Error> {
    let bytes = d.bytes()?;
    <[u8; N]>::try_from(bytes).map(Hash::from).map_err(|_| {
        decode::Error::message(format!(
            "invalid digest length: expected {N} bytes, got {}",
            bytes.len()
        ))
    })
}
