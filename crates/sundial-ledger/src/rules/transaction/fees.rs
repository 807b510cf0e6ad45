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
use sundial_kernel::{Coin, ProtocolParameters, TransactionBody};

/// The fee floor is linear in the serialised size of the body.
pub fn minimum_fee(protocol_parameters: &ProtocolParameters, body: &TransactionBody) -> Coin {
    protocol_parameters.min_fee_a * body.bytes_size() + protocol_parameters.min_fee_b
}

pub(crate) fn execute(protocol_parameters: &ProtocolParameters, body: &TransactionBody) -> Validity {
    let minimum = minimum_fee(protocol_parameters, body);
    Validity::valid_or(
        body.fee >= minimum,
        ValidationError::FeeTooSmall {
            minimum,
            supplied: body.fee,
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constant_floor_when_size_coefficient_is_zero() {
        let protocol_parameters = ProtocolParameters {
            min_fee_a: 0,
            min_fee_b: 1,
            ..ProtocolParameters::default()
        };

        let mut body = TransactionBody::default();
        assert_eq!(
            execute(&protocol_parameters, &body),
            Validity::invalid(ValidationError::FeeTooSmall {
                minimum: 1,
                supplied: 0,
            }),
        );

        body.fee = 1;
        assert!(execute(&protocol_parameters, &body).is_valid());
    }

    #[test]
    fn floor_grows_with_the_body_size() {
        let protocol_parameters = ProtocolParameters {
            min_fee_a: 2,
            min_fee_b: 5,
            ..ProtocolParameters::default()
        };

        let body = TransactionBody::default();
        assert_eq!(
            minimum_fee(&protocol_parameters, &body),
            2 * body.bytes_size() + 5,
        );
    }
}
