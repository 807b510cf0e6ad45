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

use crate::{Validity, rules::ValidationError};
use sundial_kernel::{Slot, TransactionBody};

pub(crate) fn execute(current_slot: Slot, body: &TransactionBody) -> Validity {
    Validity::valid_or(
        body.time_to_live >= current_slot,
        ValidationError::Expired {
            time_to_live: body.time_to_live,
            current_slot,
        },
    )
}
