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

use crate::{Validity, rules::ValidationError, state::GenesisDelegation, utxo::Utxo};
use std::collections::BTreeSet;
use sundial_kernel::{AddrKeyHash, Certificate, Transaction, TransactionBody};

/// The set of key hashes that must sign the transaction: the spender of
/// every resolved input, the owner of every withdrawn account, the required
/// signer of every certificate, the declared owners of any registered pool,
/// and the delegates of the genesis keys contributing entropy.
pub fn wits_needed(
    utxo: &Utxo,
    body: &TransactionBody,
    genesis_delegates: &GenesisDelegation,
) -> BTreeSet<AddrKeyHash> {
    let mut needed = BTreeSet::new();

    for input in &body.inputs {
        if let Some(output) = utxo.lookup(input) {
            if let Some(payment) = output.address.payment_key() {
                needed.insert(*payment);
            }
        }
    }

    for account in body.withdrawals.keys() {
        needed.insert(account.credential());
    }

    for certificate in &body.certificates {
        needed.insert(certificate.required_signer());
        if let Certificate::PoolRegistration(params) = certificate {
            needed.extend(params.owners.iter().copied());
        }
    }

    for genesis_key in body.extra_entropy.keys() {
        if let Some(delegate) = genesis_delegates.get(genesis_key) {
            needed.insert(*delegate);
        }
    }

    needed
}

/// The three witnessing rules, in order: every signature verifies against
/// the body hash, the signing set covers everything needed, and nothing
/// more.
pub(crate) fn execute(
    utxo: &Utxo,
    transaction: &Transaction,
    genesis_delegates: &GenesisDelegation,
) -> Validity {
    let body_hash = transaction.body.id();

    let verified = Validity::valid_or(
        transaction
            .witnesses
            .iter()
            .all(|witness| witness.verify(body_hash.as_ref())),
        ValidationError::InvalidWitness,
    );

    let needed = wits_needed(utxo, &transaction.body, genesis_delegates);
    let provided = transaction
        .witnesses
        .iter()
        .map(|witness| witness.key_hash())
        .collect::<BTreeSet<_>>();

    verified
        .and(Validity::valid_or(
            needed.is_subset(&provided),
            ValidationError::MissingWitnesses,
        ))
        .and(Validity::valid_or(
            provided.is_subset(&needed),
            ValidationError::UnneededWitnesses,
        ))
}
