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

use std::collections::{BTreeMap, BTreeSet};
use sundial_kernel::{Coin, TransactionId, TransactionInput, TransactionOutput};

/// The set of unspent transaction outputs, keyed by the input that spends
/// them. Iteration is always in key order, so anything derived from a fold
/// over the map is deterministic.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Utxo(BTreeMap<TransactionInput, TransactionOutput>);

impl Utxo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lookup(&self, input: &TransactionInput) -> Option<&TransactionOutput> {
        self.0.get(input)
    }

    pub fn contains(&self, input: &TransactionInput) -> bool {
        self.0.contains_key(input)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&TransactionInput, &TransactionOutput)> {
        self.0.iter()
    }

    /// Domain subtraction: drop every entry spent by the given inputs.
    pub fn exclude(&mut self, inputs: &BTreeSet<TransactionInput>) {
        for input in inputs {
            self.0.remove(input);
        }
    }

    /// Insert the outputs produced by a transaction, keyed by its id and
    /// their position.
    pub fn insert_outputs(&mut self, transaction_id: TransactionId, outputs: &[TransactionOutput]) {
        for (index, output) in outputs.iter().enumerate() {
            self.0.insert(
                TransactionInput {
                    transaction_id,
                    index: index as u64,
                },
                output.clone(),
            );
        }
    }

    /// Total amount of coin held by the set.
    pub fn balance(&self) -> Coin {
        self.0.values().map(|output| output.value).sum()
    }

    /// Amount of coin held by the entries a set of inputs resolves to.
    /// Unknown inputs contribute nothing; their absence is reported by the
    /// input rule, not here.
    pub fn balance_of<'a>(&self, inputs: impl IntoIterator<Item = &'a TransactionInput>) -> Coin {
        inputs
            .into_iter()
            .filter_map(|input| self.lookup(input))
            .map(|output| output.value)
            .sum()
    }
}

impl FromIterator<(TransactionInput, TransactionOutput)> for Utxo {
    fn from_iter<T: IntoIterator<Item = (TransactionInput, TransactionOutput)>>(iter: T) -> Self {
        Utxo(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sundial_kernel::{Address, Hash};

    fn input(tag: u8, index: u64) -> TransactionInput {
        TransactionInput {
            transaction_id: Hash::from([tag; 32]),
            index,
        }
    }

    fn output(value: Coin) -> TransactionOutput {
        TransactionOutput {
            address: Address::Base {
                payment: Hash::from([1; 28]),
                stake: Hash::from([2; 28]),
            },
            value,
        }
    }

    #[test]
    fn exclude_removes_spent_entries_only() {
        let mut utxo: Utxo = vec![(input(1, 0), output(10)), (input(2, 0), output(20))]
            .into_iter()
            .collect();

        utxo.exclude(&BTreeSet::from([input(1, 0), input(9, 0)]));

        assert!(!utxo.contains(&input(1, 0)));
        assert!(utxo.contains(&input(2, 0)));
        assert_eq!(utxo.balance(), 20);
    }

    #[test]
    fn insert_outputs_keys_by_position() {
        let mut utxo = Utxo::new();
        let id = Hash::from([7; 32]);

        utxo.insert_outputs(id, &[output(1), output(2)]);

        assert_eq!(
            utxo.lookup(&TransactionInput {
                transaction_id: id,
                index: 1
            })
            .map(|o| o.value),
            Some(2)
        );
        assert_eq!(utxo.balance(), 3);
    }

    #[test]
    fn balance_of_ignores_unknown_inputs() {
        let utxo: Utxo = vec![(input(1, 0), output(10))].into_iter().collect();
        let inputs = BTreeSet::from([input(1, 0), input(2, 0)]);
        assert_eq!(utxo.balance_of(&inputs), 10);
    }
}
