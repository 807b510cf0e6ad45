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

pub mod rewards;
pub mod stake_distribution;

use num::{BigUint, rational::Ratio};
use sundial_kernel::Coin;

// ------------------------------------------------------------------- SafeRatio

/// Arbitrary-precision non-negative rational, used for every monetary
/// formula. Amounts are floored to `Coin` exactly once, at the end of each
/// computation.
pub type SafeRatio = Ratio<BigUint>;

pub fn safe_ratio(numerator: u64, denominator: u64) -> SafeRatio {
    SafeRatio::new(BigUint::from(numerator), BigUint::from(denominator))
}

pub fn floor_to_coin(n: SafeRatio) -> Coin {
    Coin::try_from(n.floor().to_integer()).unwrap_or_else(|_| {
        unreachable!("always fits in a u64; otherwise we've exceeded the max coin supply.")
    })
}
