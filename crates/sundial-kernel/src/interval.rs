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

use crate::cbor;
use std::fmt;
use thiserror::Error;

const RATIONAL_NUMBER_TAG: u64 = 30;

#[derive(Debug, PartialEq, Eq, Error)]
pub enum InvalidBoundedRatio {
    #[error("zero denominator")]
    ZeroDenominator,
    #[error("ratio {numerator}/{denominator} outside of its domain")]
    OutOfBounds { numerator: u64, denominator: u64 },
}

/// A rational number in `[0, 1]`, only obtainable through its smart
/// constructor.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UnitInterval {
    numerator: u64,
    denominator: u64,
}

impl UnitInterval {
    pub const ZERO: UnitInterval = UnitInterval {
        numerator: 0,
        denominator: 1,
    };

    pub const ONE: UnitInterval = UnitInterval {
        numerator: 1,
        denominator: 1,
    };

    pub fn new(numerator: u64, denominator: u64) -> Result<Self, InvalidBoundedRatio> {
        if denominator == 0 {
            return Err(InvalidBoundedRatio::ZeroDenominator);
        }
        if numerator > denominator {
            return Err(InvalidBoundedRatio::OutOfBounds {
                numerator,
                denominator,
            });
        }
        Ok(UnitInterval {
            numerator,
            denominator,
        })
    }

    /// Constant constructor, for protocol constants known at compile time.
    /// Out-of-bounds arguments fail the compilation of the constant.
    pub const fn from_const(numerator: u64, denominator: u64) -> Self {
        assert!(denominator != 0 && numerator <= denominator);
        UnitInterval {
            numerator,
            denominator,
        }
    }

    pub fn numerator(&self) -> u64 {
        self.numerator
    }

    pub fn denominator(&self) -> u64 {
        self.denominator
    }
}

impl fmt::Display for UnitInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.numerator, self.denominator)
    }
}

/// A rational number in `[0, ∞)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NonNegativeInterval {
    numerator: u64,
    denominator: u64,
}

impl NonNegativeInterval {
    pub fn new(numerator: u64, denominator: u64) -> Result<Self, InvalidBoundedRatio> {
        if denominator == 0 {
            return Err(InvalidBoundedRatio::ZeroDenominator);
        }
        Ok(NonNegativeInterval {
            numerator,
            denominator,
        })
    }

    /// Constant constructor, for protocol constants known at compile time.
    pub const fn from_const(numerator: u64, denominator: u64) -> Self {
        assert!(denominator != 0);
        NonNegativeInterval {
            numerator,
            denominator,
        }
    }

    pub fn numerator(&self) -> u64 {
        self.numerator
    }

    pub fn denominator(&self) -> u64 {
        self.denominator
    }
}

impl fmt::Display for NonNegativeInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.numerator, self.denominator)
    }
}

fn encode_ratio<C, W: cbor::Write>(
    numerator: u64,
    denominator: u64,
    e: &mut cbor::Encoder<W>,
    ctx: &mut C,
) -> Result<(), cbor::encode::Error<W::Error>> {
    e.tag(cbor::Tag::new(RATIONAL_NUMBER_TAG))?;
    e.array(2)?;
    e.encode_with(numerator, ctx)?;
    e.encode_with(denominator, ctx)?;
    Ok(())
}

fn decode_ratio(d: &mut cbor::Decoder<'_>) -> Result<(u64, u64), cbor::decode::Error> {
    if d.datatype()? == minicbor::data::Type::Tag {
        let tag = d.tag()?;
        if tag != cbor::Tag::new(RATIONAL_NUMBER_TAG) {
            return Err(cbor::decode::Error::message(format!(
                "invalid tag for rational number: {tag:?}"
            )));
        }
    }
    d.array()?;
    let numerator = d.u64()?;
    let denominator = d.u64()?;
    Ok((numerator, denominator))
}

impl<C> cbor::Encode<C> for UnitInterval {
    fn encode<W: cbor::Write>(
        &self,
        e: &mut cbor::Encoder<W>,
        ctx: &mut C,
    ) -> Result<(), cbor::encode::Error<W::Error>> {
        encode_ratio(self.numerator, self.denominator, e, ctx)
    }
}

impl<'b, C> cbor::Decode<'b, C> for UnitInterval {
    fn decode(d: &mut cbor::Decoder<'b>, _ctx: &mut C) -> Result<Self, cbor::decode::Error> {
        let (numerator, denominator) = decode_ratio(d)?;
        UnitInterval::new(numerator, denominator)
            .map_err(|e| cbor::decode::Error::message(format!("{e}")))
    }
}

impl<C> cbor::Encode<C> for NonNegativeInterval {
    fn encode<W: cbor::Write>(
        &self,
        e: &mut cbor::Encoder<W>,
        ctx: &mut C,
    ) -> Result<(), cbor::encode::Error<W::Error>> {
        encode_ratio(self.numerator, self.denominator, e, ctx)
    }
}

impl<'b, C> cbor::Decode<'b, C> for NonNegativeInterval {
    fn decode(d: &mut cbor::Decoder<'b>, _ctx: &mut C) -> Result<Self, cbor::decode::Error> {
        let (numerator, denominator) = decode_ratio(d)?;
        NonNegativeInterval::new(numerator, denominator)
            .map_err(|e| cbor::decode::Error::message(format!("{e}")))
    }
}

#[cfg(any(test, feature = "test-utils"))]
pub use tests::*;

#[cfg(any(test, feature = "test-utils"))]
mod tests {
    use super::*;
    use proptest::prelude::*;

    prop_compose! {
        pub fn any_unit_interval()(denominator in 1..1000u64)(
            numerator in 0..=denominator,
            denominator in Just(denominator),
        ) -> UnitInterval {
            UnitInterval { numerator, denominator }
        }
    }

}
