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

use crate::{Validity, rules::ValidationError, utxo::Utxo};
use sundial_kernel::TransactionBody;

/// Every input must resolve to an unspent output.
pub(crate) fn known(utxo: &Utxo, body: &TransactionBody) -> Validity {
    Validity::valid_or(
        body.inputs.iter().all(|input| utxo.contains(input)),
        ValidationError::BadInputs,
    )
}

/// The input set distinguishes an otherwise-identical body from a replay of
/// itself, so it must not be empty.
pub(crate) fn non_empty(body: &TransactionBody) -> Validity {
    Validity::valid_or(!body.inputs.is_empty(), ValidationError::InputSetEmpty)
}
