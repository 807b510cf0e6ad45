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

pub mod balance;
pub mod certificates;
pub mod fees;
pub mod inputs;
pub mod ttl;
pub mod withdrawals;
pub mod witnesses;

use crate::{Validity, state::LedgerState};
use sundial_kernel::{GlobalParameters, Slot, Transaction};

/// Run every transaction rule and accumulate their verdicts. The order is
/// fixed; it determines the order of errors in the final list.
pub fn execute(
    global: &GlobalParameters,
    slot: Slot,
    state: &LedgerState,
    transaction: &Transaction,
) -> Validity {
    let utxo = &state.utxo_state.utxo;
    let protocol_parameters = &state.protocol_parameters;
    let body = &transaction.body;

    inputs::known(utxo, body)
        .and(ttl::execute(slot, body))
        .and(inputs::non_empty(body))
        .and(fees::execute(protocol_parameters, body))
        .and(balance::execute(
            protocol_parameters,
            utxo,
            &state.dstate,
            &state.pstate,
            body,
        ))
        .and(withdrawals::execute(&state.dstate, body))
        .and(witnesses::execute(
            utxo,
            transaction,
            &state.dstate.genesis_delegates,
        ))
        .and(certificates::execute(
            global,
            protocol_parameters,
            slot,
            &state.dstate,
            &state.pstate,
            body,
        ))
}
