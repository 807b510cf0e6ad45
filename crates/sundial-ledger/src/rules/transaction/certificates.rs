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
    rules::ValidationError,
    state::{DState, PState},
};
use std::collections::BTreeSet;
use sundial_kernel::{
    Certificate, GlobalParameters, PoolId, ProtocolParameters, Slot, StakeKeyHash, TransactionBody,
};

/// The delegation rule: each certificate is checked against the state it
/// will actually apply to, so registrations earlier in the same transaction
/// are visible to later certificates. Errors accumulate; an invalid
/// certificate does not stop the scan.
pub(crate) fn execute(
    global: &GlobalParameters,
    protocol_parameters: &ProtocolParameters,
    slot: Slot,
    dstate: &DState,
    pstate: &PState,
    body: &TransactionBody,
) -> Validity {
    let current_epoch = slot.epoch(global);
    let mut stake_keys: BTreeSet<StakeKeyHash> = dstate.stake_keys.keys().copied().collect();
    let mut pools: BTreeSet<PoolId> = pstate.pools.keys().copied().collect();

    body.certificates
        .iter()
        .map(|certificate| match certificate {
            Certificate::StakeRegistration(credential) => Validity::valid_or(
                stake_keys.insert(*credential),
                ValidationError::StakeKeyAlreadyRegistered,
            ),

            Certificate::StakeDeregistration(credential) => Validity::valid_or(
                stake_keys.remove(credential),
                ValidationError::StakeKeyNotRegistered,
            ),

            Certificate::StakeDelegation(credential, _) => Validity::valid_or(
                stake_keys.contains(credential),
                ValidationError::StakeDelegationImpossible,
            ),

            Certificate::PoolRegistration(params) => {
                pools.insert(params.id);
                Validity::Valid
            }

            Certificate::PoolRetirement(pool, epoch) => {
                if !pools.contains(pool) {
                    Validity::invalid(ValidationError::StakePoolNotRegisteredOnKey)
                } else {
                    Validity::valid_or(
                        current_epoch < *epoch
                            && *epoch <= current_epoch + protocol_parameters.max_epoch,
                        ValidationError::RetirementCertExpired {
                            declared: *epoch,
                            current: current_epoch,
                        },
                    )
                }
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use sundial_kernel::{Epoch, Hash};

    fn stake_key(tag: u8) -> StakeKeyHash {
        Hash::from([tag; 28])
    }

    fn check(dstate: &DState, pstate: &PState, certificates: Vec<Certificate>) -> Validity {
        let body = TransactionBody {
            certificates,
            ..TransactionBody::default()
        };
        execute(
            &GlobalParameters::default(),
            &ProtocolParameters::default(),
            Slot::from(0),
            dstate,
            pstate,
            &body,
        )
    }

    #[test]
    fn registration_is_visible_to_later_certificates() {
        let validity = check(
            &DState::default(),
            &PState::default(),
            vec![
                Certificate::StakeRegistration(stake_key(1)),
                Certificate::StakeDelegation(stake_key(1), stake_key(2)),
            ],
        );
        assert!(validity.is_valid());
    }

    #[test]
    fn double_registration_within_one_transaction_is_rejected() {
        let validity = check(
            &DState::default(),
            &PState::default(),
            vec![
                Certificate::StakeRegistration(stake_key(1)),
                Certificate::StakeRegistration(stake_key(1)),
            ],
        );
        assert_eq!(
            validity,
            Validity::invalid(ValidationError::StakeKeyAlreadyRegistered),
        );
    }

    #[test]
    fn deregistering_an_unknown_key_is_rejected() {
        let validity = check(
            &DState::default(),
            &PState::default(),
            vec![Certificate::StakeDeregistration(stake_key(1))],
        );
        assert_eq!(
            validity,
            Validity::invalid(ValidationError::StakeKeyNotRegistered),
        );
    }

    #[test]
    fn retirement_epoch_must_fall_within_the_horizon() {
        let mut pstate = PState::default();
        pstate.pools.insert(stake_key(9), Slot::from(0));

        let current = Epoch::from(0);
        let horizon = ProtocolParameters::default().max_epoch;

        for (epoch, valid) in [
            (current, false),
            (current + 1, true),
            (current + horizon, true),
            (current + horizon + 1, false),
        ] {
            let validity = check(
                &DState::default(),
                &pstate,
                vec![Certificate::PoolRetirement(stake_key(9), epoch)],
            );
            assert_eq!(validity.is_valid(), valid, "retirement at epoch {epoch}");
        }
    }

    #[test]
    fn retiring_an_unknown_pool_is_rejected() {
        let validity = check(
            &DState::default(),
            &PState::default(),
            vec![Certificate::PoolRetirement(stake_key(9), Epoch::from(1))],
        );
        assert_eq!(
            validity,
            Validity::invalid(ValidationError::StakePoolNotRegisteredOnKey),
        );
    }

    #[test]
    fn errors_accumulate_across_certificates() {
        let validity = check(
            &DState::default(),
            &PState::default(),
            vec![
                Certificate::StakeDeregistration(stake_key(1)),
                Certificate::StakeDelegation(stake_key(2), stake_key(3)),
            ],
        );
        assert_eq!(
            validity,
            Validity::Invalid(vec![
                ValidationError::StakeKeyNotRegistered,
                ValidationError::StakeDelegationImpossible,
            ]),
        );
    }
}
