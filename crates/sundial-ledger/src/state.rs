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
    Validity,
    rules::{self, ValidationError, transaction::balance},
    summary::stake_distribution::StakeSnapshot,
    utxo::Utxo,
};
use std::collections::BTreeMap;
use sundial_kernel::{
    AddrKeyHash, Certificate, CertificatePointer, Coin, Epoch, GenesisHash, GlobalParameters,
    Nonce, PoolId, PoolParams, ProtocolParameters, RewardAccount, Slot, StakeKeyHash, Transaction,
    TransactionBody, TransactionOutput, TransactionPointer,
};
use tracing::{debug, trace};

const EVENT_TARGET: &str = "sundial::ledger::state";

/// The mapping from genesis keys to the keys they delegated block production
/// and entropy contribution to. Owned by the enclosing block-processing
/// layer and refreshed on every transaction application.
pub type GenesisDelegation = BTreeMap<GenesisHash, AddrKeyHash>;

// ExtraEntropy
// ----------------------------------------------------------------------------

/// Extra entropy accumulated from genesis-key contributions. A later
/// contribution by the same genesis key shadows the earlier one.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ExtraEntropy(BTreeMap<GenesisHash, Nonce>);

impl ExtraEntropy {
    pub fn contribute(&mut self, genesis_key: GenesisHash, nonce: Nonce) {
        self.0.insert(genesis_key, nonce);
    }

    pub fn contributions(&self) -> &BTreeMap<GenesisHash, Nonce> {
        &self.0
    }
}

// UtxoState
// ----------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct UtxoState {
    pub utxo: Utxo,

    /// Exactly the sum of all currently-locked deposits; decay is flushed to
    /// the fee pot as deposits are released, never retained here.
    pub deposited: Coin,

    /// Fees accumulated since the last epoch boundary.
    pub fees: Coin,

    pub entropy: ExtraEntropy,
}

// DState
// ----------------------------------------------------------------------------

/// Delegation state: everything keyed by stake keys.
///
/// Invariants, preserved by every transition:
///
/// - `domain(rewards) = { RewardAccount(k) | k ∈ domain(stake_keys) }`
/// - `range(pointers) ⊆ domain(stake_keys)`
/// - `domain(delegations) ⊆ domain(stake_keys)`
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DState {
    /// Registered stake keys, with their registration slot.
    pub stake_keys: BTreeMap<StakeKeyHash, Slot>,

    pub rewards: BTreeMap<RewardAccount, Coin>,

    pub delegations: BTreeMap<StakeKeyHash, PoolId>,

    /// Pointers assigned to registration certificates, through which outputs
    /// may address a stake key.
    pub pointers: BTreeMap<CertificatePointer, StakeKeyHash>,

    pub genesis_delegates: GenesisDelegation,
}

// PState
// ----------------------------------------------------------------------------

/// Pool state. Invariant: `domain(params) ⊇ domain(pools) ⊇ domain(retiring)`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PState {
    /// Registered pools, with their first registration slot. Re-registering
    /// keeps the original slot.
    pub pools: BTreeMap<PoolId, Slot>,

    pub params: BTreeMap<PoolId, PoolParams>,

    /// Scheduled retirements, swept at epoch boundaries.
    pub retiring: BTreeMap<PoolId, Epoch>,

    /// Per-pool operational certificate counters, preventing replay of
    /// cold-key-signed hot-key certificates. Opaque to the ledger itself.
    pub op_counters: BTreeMap<PoolId, u64>,
}

// LedgerState
// ----------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LedgerState {
    pub utxo_state: UtxoState,
    pub dstate: DState,
    pub pstate: PState,
    pub protocol_parameters: ProtocolParameters,

    /// Index of the next transaction within the current slot; reset whenever
    /// the slot advances. Makes certificate pointers unique.
    pub tx_slot_ix: u64,

    pub current_slot: Slot,
}

/// Build the state holding the genesis outputs. The genesis transaction id
/// is the hash of the empty body, so every node derives the same initial
/// UTxO.
pub fn genesis_state(
    protocol_parameters: ProtocolParameters,
    outputs: &[TransactionOutput],
) -> LedgerState {
    let mut state = LedgerState {
        protocol_parameters,
        ..LedgerState::default()
    };
    state
        .utxo_state
        .utxo
        .insert_outputs(TransactionBody::default().id(), outputs);
    state
}

// Transaction application
// ----------------------------------------------------------------------------

/// Validate a transaction against the state and, when every rule passes,
/// produce the next state. On failure the list carries every independent
/// reason for rejection and the state is returned untouched to the caller's
/// copy semantics.
pub fn apply_transaction(
    global: &GlobalParameters,
    slot: Slot,
    state: LedgerState,
    transaction: &Transaction,
    genesis_delegates: &GenesisDelegation,
) -> Result<LedgerState, Vec<ValidationError>> {
    let mut state = state;
    state.dstate.genesis_delegates = genesis_delegates.clone();

    match rules::transaction::execute(global, slot, &state, transaction) {
        Validity::Invalid(errors) => Err(errors),
        Validity::Valid => Ok(apply_body(slot, state, &transaction.body)),
    }
}

/// The conformance entry point: accumulate whatever errors the rules find,
/// then apply the body regardless. This is the only place where an invalid
/// transaction mutates a state; it exists for comparing traces against the
/// executable specification and must never sit on a production path.
#[cfg(any(test, feature = "test-utils"))]
pub fn apply_transaction_unchecked(
    global: &GlobalParameters,
    slot: Slot,
    validation: LedgerValidation,
    transaction: &Transaction,
    genesis_delegates: &GenesisDelegation,
) -> LedgerValidation {
    let mut state = validation.state;
    state.dstate.genesis_delegates = genesis_delegates.clone();

    let mut errors = validation.errors;
    errors.extend(rules::transaction::execute(global, slot, &state, transaction).errors());

    LedgerValidation {
        errors,
        state: apply_body(slot, state, &transaction.body),
    }
}

/// A state paired with the errors accumulated while reaching it.
#[cfg(any(test, feature = "test-utils"))]
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LedgerValidation {
    pub errors: Vec<ValidationError>,
    pub state: LedgerState,
}

#[cfg(any(test, feature = "test-utils"))]
impl From<LedgerState> for LedgerValidation {
    fn from(state: LedgerState) -> Self {
        LedgerValidation {
            errors: Vec::new(),
            state,
        }
    }
}

/// Apply a validated body. Steps happen in a fixed order: UTxO update,
/// deposit accounting, fee accrual, withdrawal scrubbing, entropy
/// contributions, slot/index bookkeeping, then certificates.
fn apply_body(slot: Slot, mut state: LedgerState, body: &TransactionBody) -> LedgerState {
    let transaction_id = body.id();
    let protocol_parameters = state.protocol_parameters.clone();

    trace!(
        target: EVENT_TARGET,
        transaction = %transaction_id,
        slot = %slot,
        certificates = body.certificates.len(),
        "apply_transaction",
    );

    state.utxo_state.utxo.exclude(&body.inputs);
    state
        .utxo_state
        .utxo
        .insert_outputs(transaction_id, &body.outputs);

    // Deposits move through the pot at full value; what the decay has eaten
    // off a refund goes to the fee pot, so `deposited` keeps matching the sum
    // of live deposits exactly.
    let deposits = balance::deposits(
        &protocol_parameters,
        &state.pstate.pools,
        &body.certificates,
    );
    let released = balance::released_key_deposits(&protocol_parameters, &state.dstate, body);
    let refunded = balance::key_refunds(&protocol_parameters, &state.dstate, body);
    debug_assert!(refunded <= released, "refund exceeds the released deposits");

    let deposit_pot = state.utxo_state.deposited + deposits;
    debug_assert!(deposit_pot >= released, "deposit pot underflow");
    state.utxo_state.deposited = deposit_pot.saturating_sub(released);
    state.utxo_state.fees += body.fee + released.saturating_sub(refunded);

    for account in body.withdrawals.keys() {
        if let Some(balance) = state.dstate.rewards.get_mut(account) {
            *balance = 0;
        }
    }

    for (genesis_key, nonce) in &body.extra_entropy {
        if state.dstate.genesis_delegates.contains_key(genesis_key) {
            state.utxo_state.entropy.contribute(*genesis_key, *nonce);
        }
    }

    if slot == state.current_slot {
        state.tx_slot_ix += 1;
    } else {
        state.tx_slot_ix = 0;
        state.current_slot = slot;
    }

    for (certificate_index, certificate) in body.certificates.iter().enumerate() {
        let pointer = CertificatePointer {
            transaction: TransactionPointer {
                slot: state.current_slot,
                transaction_index: state.tx_slot_ix,
            },
            certificate_index: certificate_index as u64,
        };
        apply_certificate(
            &mut state.dstate,
            &mut state.pstate,
            state.current_slot,
            pointer,
            certificate,
        );
    }

    state
}

// Certificate application
// ----------------------------------------------------------------------------

/// Each certificate touches only the fields listed for it; anything that
/// could fail here has been rejected up-front by the delegation rule.
fn apply_certificate(
    dstate: &mut DState,
    pstate: &mut PState,
    slot: Slot,
    pointer: CertificatePointer,
    certificate: &Certificate,
) {
    match certificate {
        Certificate::StakeRegistration(credential) => {
            debug_assert!(
                !dstate.stake_keys.contains_key(credential),
                "registration of an already-registered key escaped validation",
            );
            dstate.stake_keys.insert(*credential, slot);
            dstate.rewards.insert(RewardAccount::from(*credential), 0);
            dstate.pointers.insert(pointer, *credential);
        }

        Certificate::StakeDeregistration(credential) => {
            debug_assert!(
                dstate.stake_keys.contains_key(credential),
                "deregistration of an unknown key escaped validation",
            );
            dstate.stake_keys.remove(credential);
            dstate.rewards.remove(&RewardAccount::from(*credential));
            dstate.delegations.remove(credential);
            dstate.pointers.retain(|_, target| target != credential);
        }

        Certificate::StakeDelegation(credential, pool) => {
            debug_assert!(
                dstate.stake_keys.contains_key(credential),
                "delegation from an unknown key escaped validation",
            );
            dstate.delegations.insert(*credential, *pool);
        }

        Certificate::PoolRegistration(params) => {
            pstate.pools.entry(params.id).or_insert(slot);
            pstate.op_counters.entry(params.id).or_insert(0);
            // A re-registration cancels any pending retirement.
            pstate.retiring.remove(&params.id);
            pstate.params.insert(params.id, params.clone());
        }

        Certificate::PoolRetirement(pool, epoch) => {
            debug_assert!(
                pstate.pools.contains_key(pool),
                "retirement of an unknown pool escaped validation",
            );
            pstate.retiring.insert(*pool, *epoch);
        }
    }
}

// Epoch boundary
// ----------------------------------------------------------------------------

/// Sweep the retirement schedule: every pool whose retirement epoch is the
/// given one disappears from the pool maps, and its deposit is released. The
/// (decayed) refund goes to the pool's declared reward account when that
/// account is still registered; everything else ends in the fee pot.
pub fn retire_pools(
    global: &GlobalParameters,
    mut state: LedgerState,
    epoch: Epoch,
) -> LedgerState {
    let protocol_parameters = state.protocol_parameters.clone();

    let retired = state
        .pstate
        .retiring
        .iter()
        .filter(|(_, retirement)| **retirement == epoch)
        .map(|(pool, _)| *pool)
        .collect::<Vec<_>>();

    for pool in retired {
        state.pstate.retiring.remove(&pool);
        state.pstate.op_counters.remove(&pool);
        let registered_at = state.pstate.pools.remove(&pool);
        let params = state.pstate.params.remove(&pool);

        let (Some(registered_at), Some(params)) = (registered_at, params) else {
            unreachable!("retiring pool without registration: {pool}");
        };

        debug!(target: EVENT_TARGET, pool = %pool, epoch = %epoch, "pool.retired");

        let deposit = protocol_parameters.stake_pool_deposit;
        debug_assert!(state.utxo_state.deposited >= deposit, "deposit pot underflow");
        state.utxo_state.deposited = state.utxo_state.deposited.saturating_sub(deposit);

        let age = epoch.first_slot(global).elapsed_since(registered_at);
        let refund = balance::decayed_refund(
            deposit,
            &protocol_parameters.pool_min_refund,
            &protocol_parameters.pool_decay_rate,
            age,
        );

        match state.dstate.rewards.get_mut(&params.reward_account) {
            Some(balance) => {
                *balance += refund;
                state.utxo_state.fees += deposit - refund;
            }
            // The reward account is gone; the whole deposit is forfeited.
            None => state.utxo_state.fees += deposit,
        }
    }

    state
}

// Pots, SnapShots, EpochState
// ----------------------------------------------------------------------------

/// The protocol-level money pots.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Pots {
    pub treasury: Coin,
    pub reserves: Coin,
}

/// The three rolling stake snapshots, plus the fee pot captured alongside
/// the oldest one. `mark` is the most recent; `go` feeds the reward engine.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SnapShots {
    pub mark: StakeSnapshot,
    pub set: StakeSnapshot,
    pub go: StakeSnapshot,
    pub fees: Coin,
}

impl SnapShots {
    /// Shuffle the snapshots at an epoch boundary: the previous `set`
    /// becomes `go`, the previous `mark` becomes `set`, and the freshly
    /// taken snapshot becomes `mark`.
    pub fn rotate(&mut self, mark: StakeSnapshot, fees: Coin) {
        let previous_mark = std::mem::replace(&mut self.mark, mark);
        let previous_set = std::mem::replace(&mut self.set, previous_mark);
        self.go = previous_set;
        self.fees = fees;
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EpochState {
    pub pots: Pots,
    pub protocol_parameters: ProtocolParameters,
    pub snapshots: SnapShots,
    pub ledger_state: LedgerState,
}

impl EpochState {
    /// Cross an epoch boundary: snapshot the stake distribution as it stands
    /// (before any reaping), rotate the snapshots, then sweep the pool
    /// retirement schedule for the entered epoch.
    pub fn tick(&mut self, global: &GlobalParameters, epoch: Epoch) {
        let mark = StakeSnapshot::take(&self.ledger_state);
        let fees = self.ledger_state.utxo_state.fees;
        self.snapshots.rotate(mark, fees);

        let ledger_state = std::mem::take(&mut self.ledger_state);
        self.ledger_state = retire_pools(global, ledger_state, epoch);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sundial_kernel::{Address, Hash, Transaction};

    #[test]
    fn unchecked_application_accumulates_errors_and_mutates() {
        let protocol_parameters = ProtocolParameters {
            min_fee_a: 0,
            min_fee_b: 0,
            ..ProtocolParameters::default()
        };
        let state = genesis_state(protocol_parameters, &[]);

        let mut transaction = Transaction::default();
        transaction.body.outputs.push(TransactionOutput {
            address: Address::Base {
                payment: Hash::from([1; 28]),
                stake: Hash::from([2; 28]),
            },
            value: 5,
        });
        transaction.body.time_to_live = Slot::from(10);
        let transaction_id = transaction.body.id();

        let validation = apply_transaction_unchecked(
            &GlobalParameters::default(),
            Slot::from(0),
            LedgerValidation::from(state),
            &transaction,
            &GenesisDelegation::new(),
        );

        assert_eq!(
            validation.errors,
            vec![
                ValidationError::InputSetEmpty,
                ValidationError::ValueNotConserved {
                    consumed: 0,
                    produced: 5,
                },
            ],
        );
        // The body was applied regardless: the output now exists.
        assert_eq!(validation.state.utxo_state.utxo.len(), 1);

        // Chaining keeps accumulating on top of the previous errors.
        let validation = apply_transaction_unchecked(
            &GlobalParameters::default(),
            Slot::from(0),
            validation,
            &transaction,
            &GenesisDelegation::new(),
        );
        assert_eq!(validation.errors.len(), 4);
        assert_eq!(
            validation.state.utxo_state.utxo.lookup(&sundial_kernel::TransactionInput {
                transaction_id,
                index: 0,
            })
            .map(|output| output.value),
            Some(5),
        );
    }

    #[test]
    fn snapshots_rotate_towards_go() {
        let labelled = |value: Coin| {
            let mut snapshot = StakeSnapshot::default();
            snapshot.stake.insert(Hash::from([1; 28]), value);
            snapshot
        };

        let mut snapshots = SnapShots::default();
        snapshots.rotate(labelled(1), 10);
        snapshots.rotate(labelled(2), 20);
        snapshots.rotate(labelled(3), 30);

        assert_eq!(snapshots.mark, labelled(3));
        assert_eq!(snapshots.set, labelled(2));
        assert_eq!(snapshots.go, labelled(1));
        assert_eq!(snapshots.fees, 30);

        snapshots.rotate(labelled(4), 40);
        assert_eq!(snapshots.go, labelled(2));
    }
}
