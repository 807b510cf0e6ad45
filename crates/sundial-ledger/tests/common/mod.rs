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

#![allow(dead_code)]
#![allow(clippy::expect_used)]

use std::collections::BTreeMap;
use sundial_kernel::{
    AddrKeyHash, Address, GlobalParameters, Hasher, ProtocolParameters, Slot, Transaction,
    TransactionBody, TransactionInput, UnitInterval, VKeyWitness, ed25519,
};
use sundial_ledger::{LedgerState, ValidationError, apply_transaction};

/// A deterministic keypair for building signed transactions in tests.
pub struct TestKey {
    seed: [u8; 32],
}

impl TestKey {
    pub fn new(tag: u8) -> Self {
        TestKey { seed: [tag; 32] }
    }

    fn secret(&self) -> ed25519::SecretKey {
        ed25519::SecretKey::from(self.seed)
    }

    pub fn vkey(&self) -> [u8; ed25519::PublicKey::SIZE] {
        self.secret()
            .public_key()
            .as_ref()
            .try_into()
            .expect("public key is 32 bytes")
    }

    pub fn key_hash(&self) -> AddrKeyHash {
        Hasher::<224>::hash(&self.vkey())
    }

    pub fn witness(&self, body: &TransactionBody) -> VKeyWitness {
        let signature = self.secret().sign(body.id().as_ref());
        VKeyWitness {
            vkey: self.vkey(),
            signature: signature.as_ref().try_into().expect("signature is 64 bytes"),
        }
    }
}

/// Sign a body with every given key and assemble the transaction.
pub fn sign(body: TransactionBody, keys: &[&TestKey]) -> Transaction {
    let witnesses = keys.iter().map(|key| key.witness(&body)).collect();
    Transaction { body, witnesses }
}

pub fn base_address(payment: &TestKey, stake: &TestKey) -> Address {
    Address::Base {
        payment: payment.key_hash(),
        stake: stake.key_hash(),
    }
}

/// Parameters with a flat 1-coin fee floor and decay-free deposits, so the
/// scenario arithmetic stays legible.
pub fn scenario_parameters() -> ProtocolParameters {
    ProtocolParameters {
        min_fee_a: 0,
        min_fee_b: 1,
        stake_key_deposit: 7,
        stake_pool_deposit: 50,
        key_min_refund: UnitInterval::new(1, 2).expect("within bounds"),
        key_decay_rate: UnitInterval::ZERO,
        pool_min_refund: UnitInterval::ONE,
        pool_decay_rate: UnitInterval::ZERO,
        ..ProtocolParameters::default()
    }
}

pub fn global_parameters() -> GlobalParameters {
    GlobalParameters {
        slots_per_epoch: 100,
        active_slot_coeff_inverse: 2,
    }
}

/// The input holding the n-th genesis output.
pub fn genesis_input(index: u64) -> TransactionInput {
    TransactionInput {
        transaction_id: TransactionBody::default().id(),
        index,
    }
}

/// Apply a transaction with the test-wide global parameters and no genesis
/// delegation.
pub fn apply(
    state: LedgerState,
    slot: u64,
    transaction: &Transaction,
) -> Result<LedgerState, Vec<ValidationError>> {
    apply_transaction(
        &global_parameters(),
        Slot::from(slot),
        state,
        transaction,
        &BTreeMap::new(),
    )
}
