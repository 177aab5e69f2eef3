use std::collections::BTreeSet;

use log::debug;

use crate::{
  puzzle::{Puzzle, SlotId},
  word_bank::{WordBank, WordId},
};

/// The words still possible for each slot, indexed by `SlotId`. Domains only
/// ever shrink.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Domains {
  domains: Vec<BTreeSet<WordId>>,
}

impl Domains {
  /// Gives every slot the full word list, before any filtering.
  pub fn new(puzzle: &Puzzle, bank: &WordBank) -> Self {
    let all_words: BTreeSet<_> = bank.all_ids().collect();
    Self {
      domains: vec![all_words; puzzle.num_slots()],
    }
  }

  /// Builds the domains and makes them node-consistent.
  pub fn node_consistent(puzzle: &Puzzle, bank: &WordBank) -> Self {
    let mut domains = Self::new(puzzle, bank);
    domains.enforce_node_consistency(puzzle, bank);
    domains
  }

  /// Drops every word whose length differs from its slot's length. Each slot
  /// is filtered on its own.
  pub fn enforce_node_consistency(&mut self, puzzle: &Puzzle, bank: &WordBank) {
    for (slot, domain) in puzzle.slots().iter().zip(self.domains.iter_mut()) {
      let length = slot.length() as usize;
      domain.retain(|&word| bank.word_len(word) == Some(length));
    }
    debug!("Node consistency left {} candidate words", self.total_size());
  }

  pub fn get(&self, slot: SlotId) -> Option<&BTreeSet<WordId>> {
    self.domains.get(slot)
  }

  pub fn iter(&self, slot: SlotId) -> impl Iterator<Item = WordId> + '_ {
    self.domains.get(slot).into_iter().flatten().cloned()
  }

  #[cfg(test)]
  pub(crate) fn contains(&self, slot: SlotId, word: WordId) -> bool {
    self.get(slot).is_some_and(|domain| domain.contains(&word))
  }

  /// Number of candidates left for `slot`. Unknown slots have none.
  pub fn size(&self, slot: SlotId) -> usize {
    self.get(slot).map_or(0, |domain| domain.len())
  }

  pub fn total_size(&self) -> usize {
    self.domains.iter().map(|domain| domain.len()).sum()
  }

  /// The first slot with no candidates left, if any.
  pub fn first_empty(&self) -> Option<SlotId> {
    self.domains.iter().position(|domain| domain.is_empty())
  }

  /// Keeps only the words of `slot` satisfying `keep`, returning how many
  /// were removed.
  pub(crate) fn retain<F>(&mut self, slot: SlotId, keep: F) -> usize
  where
    F: FnMut(&WordId) -> bool,
  {
    self.domains.get_mut(slot).map_or(0, |domain| {
      let before = domain.len();
      domain.retain(keep);
      before - domain.len()
    })
  }
}

#[cfg(test)]
mod tests {
  #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

  use googletest::prelude::*;

  use crate::{puzzle::Puzzle, word_bank::WordBank};

  use super::Domains;

  fn bank(words: &[&str]) -> WordBank {
    WordBank::from_words(words.iter().map(|&word| word.to_owned()))
  }

  #[gtest]
  fn test_new_holds_every_word() {
    let puzzle = Puzzle::from_layout(
      "___
       _##",
    )
    .unwrap();
    let bank = bank(&["AB", "CAT", "DOGS"]);
    let domains = Domains::new(&puzzle, &bank);
    for slot in puzzle.slot_ids() {
      expect_eq!(domains.size(slot), 3);
    }
  }

  #[gtest]
  fn test_node_consistency_filters_by_length() {
    let puzzle = Puzzle::from_layout(
      "___
       _##",
    )
    .unwrap();
    let bank = bank(&["AB", "CAT", "DOGS", "OX"]);
    let domains = Domains::node_consistent(&puzzle, &bank);

    for (id, slot) in puzzle.slots().iter().enumerate() {
      expect_that!(
        domains
          .iter(id)
          .map(|word| bank.word_len(word).unwrap())
          .collect::<Vec<_>>(),
        each(eq(&(slot.length() as usize)))
      );
    }
    // The across slot has length 3, the down slot length 2.
    expect_eq!(domains.total_size(), 3);
    expect_that!(domains.first_empty(), none());
  }

  #[gtest]
  fn test_empty_word_list() {
    let puzzle = Puzzle::from_layout("___").unwrap();
    let domains = Domains::node_consistent(&puzzle, &WordBank::default());
    expect_that!(domains.first_empty(), some(eq(0)));
  }

  #[gtest]
  fn test_retain() {
    let puzzle = Puzzle::from_layout("___").unwrap();
    let bank = bank(&["CAT", "COW", "DOG"]);
    let mut domains = Domains::node_consistent(&puzzle, &bank);
    let cow = bank.id("COW").unwrap();

    expect_eq!(domains.retain(0, |&word| word != cow), 1);
    expect_false!(domains.contains(0, cow));
    expect_eq!(domains.size(0), 2);
    expect_eq!(domains.retain(3, |_| false), 0);
  }
}
