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

use crate::{Validity, rules::ValidationError, state::DState};
use sundial_kernel::TransactionBody;

/// A withdrawal must drain its reward account exactly; partial withdrawals
/// are not a thing.
pub(crate) fn execute(dstate: &DState, body: &TransactionBody) -> Validity {
    Validity::valid_or(
        body.withdrawals
            .iter()
            .all(|(account, amount)| dstate.rewards.get(account) == Some(amount)),
        ValidationError::IncorrectRewards,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use sundial_kernel::{Hash, RewardAccount};

    #[test]
    fn partial_withdrawals_are_rejected() {
        let account = RewardAccount::from(Hash::from([1; 28]));
        let mut dstate = DState::default();
        dstate.rewards.insert(account, 10);

        let mut body = TransactionBody::default();
        body.withdrawals.insert(account, 5);
        assert_eq!(
            execute(&dstate, &body),
            Validity::invalid(ValidationError::IncorrectRewards),
        );

        body.withdrawals.insert(account, 10);
        assert!(execute(&dstate, &body).is_valid());
    }

    #[test]
    fn withdrawing_from_an_unknown_account_is_rejected() {
        let mut body = TransactionBody::default();
        body.withdrawals
            .insert(RewardAccount::from(Hash::from([1; 28])), 0);

        assert_eq!(
            execute(&DState::default(), &body),
            Validity::invalid(ValidationError::IncorrectRewards),
        );
    }
}
