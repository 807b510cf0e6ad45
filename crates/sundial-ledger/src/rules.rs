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

pub mod transaction;

use sundial_kernel::{Coin, Epoch, Slot};
use thiserror::Error;

/// Every way a transaction can be rejected. Constructors and their payloads
/// are part of the wire contract; their relative order in an error list
/// follows the order the rules run in.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("unknown or already-spent inputs")]
    BadInputs,

    #[error("transaction expired: time-to-live {time_to_live}, current slot {current_slot}")]
    Expired {
        time_to_live: Slot,
        current_slot: Slot,
    },

    #[error("retirement epoch {declared} out of range at epoch {current}")]
    RetirementCertExpired { declared: Epoch, current: Epoch },

    #[error("fee too small: minimum {minimum}, supplied {supplied}")]
    FeeTooSmall { minimum: Coin, supplied: Coin },

    #[error("value not conserved: consumed {consumed}, produced {produced}")]
    ValueNotConserved { consumed: Coin, produced: Coin },

    #[error("withdrawals do not match reward account balances")]
    IncorrectRewards,

    #[error("witness signature does not verify against the body hash")]
    InvalidWitness,

    #[error("signatures missing for required witnesses")]
    MissingWitnesses,

    #[error("signatures provided by keys the transaction does not need")]
    UnneededWitnesses,

    #[error("empty input set")]
    InputSetEmpty,

    #[error("stake key already registered")]
    StakeKeyAlreadyRegistered,

    #[error("stake key not registered")]
    StakeKeyNotRegistered,

    #[error("delegation from an unregistered stake key")]
    StakeDelegationImpossible,

    #[error("retirement scheduled for an unregistered pool")]
    StakePoolNotRegisteredOnKey,
}

/// Outcome of a validation rule. Rules never short-circuit: combining two
/// invalid outcomes concatenates their error lists, so a single pass reports
/// every reason a transaction fails.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[must_use]
pub enum Validity {
    #[default]
    Valid,
    Invalid(Vec<ValidationError>),
}

impl Validity {
    pub fn invalid(error: ValidationError) -> Self {
        Validity::Invalid(vec![error])
    }

    pub fn valid_or(condition: bool, error: ValidationError) -> Self {
        if condition {
            Validity::Valid
        } else {
            Validity::invalid(error)
        }
    }

    /// Monoid append: `Valid` is the identity, two failures concatenate.
    pub fn and(self, other: Validity) -> Validity {
        match (self, other) {
            (Validity::Valid, other) => other,
            (this, Validity::Valid) => this,
            (Validity::Invalid(mut these), Validity::Invalid(those)) => {
                these.extend(those);
                Validity::Invalid(these)
            }
        }
    }

    pub fn is_valid(&self) -> bool {
        matches!(self, Validity::Valid)
    }

    pub fn errors(self) -> Vec<ValidationError> {
        match self {
            Validity::Valid => Vec::new(),
            Validity::Invalid(errors) => errors,
        }
    }

    pub fn into_result(self) -> Result<(), Vec<ValidationError>> {
        match self {
            Validity::Valid => Ok(()),
            Validity::Invalid(errors) => Err(errors),
        }
    }
}

impl FromIterator<Validity> for Validity {
    fn from_iter<T: IntoIterator<Item = Validity>>(iter: T) -> Self {
        iter.into_iter().fold(Validity::Valid, Validity::and)
    }
}
