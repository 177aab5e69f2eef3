use std::collections::{HashSet, VecDeque};

use log::{debug, trace};

use crate::{
  domain::Domains,
  puzzle::{Puzzle, SlotId},
  word_bank::WordBank,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ArcConsistency {
  /// Every remaining word has support in every neighboring domain.
  Consistent,
  /// The domain of `slot` was emptied, so no assignment exists.
  Wipeout { slot: SlotId },
}

impl ArcConsistency {
  pub fn is_consistent(&self) -> bool {
    matches!(self, ArcConsistency::Consistent)
  }
}

/// Enforces arc consistency over a set of domains. The engine holds the only
/// mutable borrow of the domains until it is dropped.
pub struct ConsistencyEngine<'a> {
  puzzle: &'a Puzzle,
  bank: &'a WordBank,
  domains: &'a mut Domains,
  revisions: u64,
}

impl<'a> ConsistencyEngine<'a> {
  pub fn new(puzzle: &'a Puzzle, bank: &'a WordBank, domains: &'a mut Domains) -> Self {
    Self { puzzle, bank, domains, revisions: 0 }
  }

  /// Number of `revise` calls that removed at least one word.
  pub fn revisions(&self) -> u64 {
    self.revisions
  }

  /// Removes every word from `x`'s domain that has no word in `y`'s domain
  /// agreeing at their shared cell. Returns whether anything was removed.
  /// Slots that don't overlap are never revised.
  pub fn revise(&mut self, x: SlotId, y: SlotId) -> bool {
    let Some((x_idx, y_idx)) = self.puzzle.overlap(x, y) else {
      return false;
    };

    let bank = self.bank;
    let supported: HashSet<char> = self
      .domains
      .iter(y)
      .filter_map(|word| bank.letter(word, y_idx))
      .collect();
    let removed = self.domains.retain(x, |&word| {
      bank
        .letter(word, x_idx)
        .is_some_and(|letter| supported.contains(&letter))
    });

    if removed > 0 {
      self.revisions += 1;
      trace!("Revising {x} against {y} removed {removed} words");
    }
    removed > 0
  }

  /// Runs AC-3 over every arc of the puzzle.
  pub fn ac3(&mut self) -> ArcConsistency {
    let arcs: Vec<_> = self.puzzle.arcs().collect();
    self.ac3_from(arcs)
  }

  /// Runs AC-3 starting from the given arcs. Whenever revising (x, y) shrinks
  /// x, every other neighbor z of x is re-queued as (z, x).
  pub fn ac3_from(&mut self, initial: impl IntoIterator<Item = (SlotId, SlotId)>) -> ArcConsistency {
    if let Some(slot) = self.domains.first_empty() {
      debug!("Slot {slot} has no candidates before arc consistency");
      return ArcConsistency::Wipeout { slot };
    }

    let mut queue: VecDeque<(SlotId, SlotId)> = VecDeque::new();
    let mut queued: HashSet<(SlotId, SlotId)> = HashSet::new();
    for arc in initial {
      if queued.insert(arc) {
        queue.push_back(arc);
      }
    }

    while let Some((x, y)) = queue.pop_front() {
      queued.remove(&(x, y));
      if !self.revise(x, y) {
        continue;
      }

      if self.domains.size(x) == 0 {
        debug!("Arc consistency emptied the domain of slot {x}");
        return ArcConsistency::Wipeout { slot: x };
      }

      for &z in self.puzzle.neighbors(x) {
        if z != y && queued.insert((z, x)) {
          queue.push_back((z, x));
        }
      }
    }

    debug!(
      "Arc consistency left {} candidate words after {} revisions",
      self.domains.total_size(),
      self.revisions
    );
    ArcConsistency::Consistent
  }
}

#[cfg(test)]
mod tests {
  #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

  use googletest::prelude::*;

  use crate::{
    domain::Domains,
    puzzle::{Direction, Puzzle, Slot},
    word_bank::WordBank,
  };

  use super::{ArcConsistency, ConsistencyEngine};

  /// A three letter down slot crossing the second letter of a four letter
  /// across slot.
  const CROSS: &str = "#_##
                       ____
                       #_##";

  /// An across slot whose last letter starts a down slot.
  const CORNER: &str = "___
                        ##_
                        ##_";

  fn bank(words: &[&str]) -> WordBank {
    WordBank::from_words(words.iter().map(|&word| word.to_owned()))
  }

  fn words_of(domains: &Domains, bank: &WordBank, slot: usize) -> Vec<String> {
    domains
      .iter(slot)
      .map(|word| bank.get(word).unwrap().to_owned())
      .collect()
  }

  #[gtest]
  fn test_revise_removes_unsupported() {
    let puzzle = Puzzle::from_layout(CROSS).unwrap();
    let bank = bank(&["CAT", "DOG", "BAN", "FARM", "TAPE"]);
    let mut domains = Domains::node_consistent(&puzzle, &bank);
    let down = puzzle.slot_id(&Slot::new(0, 1, 3, Direction::Down)).unwrap();
    let across = puzzle.slot_id(&Slot::new(1, 0, 4, Direction::Across)).unwrap();

    let mut engine = ConsistencyEngine::new(&puzzle, &bank, &mut domains);
    // Every across word has an A second, so DOG has no partner.
    expect_true!(engine.revise(down, across));
    expect_false!(engine.revise(down, across));
    expect_eq!(engine.revisions(), 1);
    expect_that!(words_of(&domains, &bank, down), container_eq(["BAN", "CAT"]));
    expect_that!(words_of(&domains, &bank, across), container_eq(["FARM", "TAPE"]));
  }

  #[gtest]
  fn test_revise_without_overlap_is_noop() {
    let puzzle = Puzzle::from_layout(
      "___
       ###
       ___",
    )
    .unwrap();
    let bank = bank(&["CAT", "DOG"]);
    let mut domains = Domains::node_consistent(&puzzle, &bank);
    let mut engine = ConsistencyEngine::new(&puzzle, &bank, &mut domains);
    expect_false!(engine.revise(0, 1));
    expect_false!(engine.revise(0, 0));
    expect_eq!(domains.total_size(), 4);
  }

  #[gtest]
  fn test_ac3_wipeout() {
    let puzzle = Puzzle::from_layout(CORNER).unwrap();
    let bank = bank(&["CAT", "DOG"]);
    let mut domains = Domains::node_consistent(&puzzle, &bank);
    let result = ConsistencyEngine::new(&puzzle, &bank, &mut domains).ac3();
    // Neither T nor G starts a word.
    expect_eq!(result, ArcConsistency::Wipeout { slot: 0 });
    expect_false!(result.is_consistent());
  }

  #[gtest]
  fn test_ac3_empty_domain_up_front() {
    let puzzle = Puzzle::from_layout("___").unwrap();
    let bank = bank(&["AB"]);
    let mut domains = Domains::node_consistent(&puzzle, &bank);
    expect_eq!(
      ConsistencyEngine::new(&puzzle, &bank, &mut domains).ac3(),
      ArcConsistency::Wipeout { slot: 0 }
    );
  }

  #[gtest]
  fn test_ac3_propagates_through_chain() {
    // A down slot crossing two across slots: shrinking the first across slot
    // must propagate through the down slot to the second.
    let puzzle = Puzzle::from_layout(
      "___
       #_#
       ___",
    )
    .unwrap();
    let bank = bank(&["ABC", "XBY", "QRS", "BBB", "ZZZ"]);
    let mut domains = Domains::node_consistent(&puzzle, &bank);
    let top = puzzle.slot_id(&Slot::new(0, 0, 3, Direction::Across)).unwrap();
    let down = puzzle.slot_id(&Slot::new(0, 1, 3, Direction::Down)).unwrap();
    let bottom = puzzle.slot_id(&Slot::new(2, 0, 3, Direction::Across)).unwrap();
    let bbb = bank.id("BBB").unwrap();

    // Pinning the top slot to ZZZ leaves only ZZZ for the down slot, which
    // in turn forces a Z into the middle of the bottom slot.
    domains.retain(top, |&word| Some(word) == bank.id("ZZZ"));
    let result = ConsistencyEngine::new(&puzzle, &bank, &mut domains).ac3();
    expect_eq!(result, ArcConsistency::Consistent);
    expect_that!(words_of(&domains, &bank, down), container_eq(["ZZZ"]));
    expect_that!(words_of(&domains, &bank, bottom), container_eq(["ZZZ"]));
    expect_false!(domains.contains(bottom, bbb));
  }

  #[gtest]
  fn test_ac3_idempotent() {
    let puzzle = Puzzle::from_layout(
      "____
       _#_#
       ____
       _#_#",
    )
    .unwrap();
    let bank = bank(&[
      "ABLE", "AREA", "BEAR", "ERAS", "EASE", "RAIL", "SEAT", "TEAR", "ACE", "AGE", "BEE",
      "EAR", "SEA", "TEA", "ART", "ERA",
    ]);
    let mut domains = Domains::node_consistent(&puzzle, &bank);
    let first = ConsistencyEngine::new(&puzzle, &bank, &mut domains).ac3();
    let snapshot = domains.clone();

    let mut engine = ConsistencyEngine::new(&puzzle, &bank, &mut domains);
    let second = engine.ac3();
    expect_eq!(first, second);
    expect_eq!(engine.revisions(), 0);
    expect_eq!(domains, snapshot);
  }

  #[gtest]
  fn test_ac3_from_subset() {
    let puzzle = Puzzle::from_layout(CROSS).unwrap();
    let bank = bank(&["CAT", "DOG", "BAN", "FARM", "TAPE"]);
    let mut domains = Domains::node_consistent(&puzzle, &bank);
    let down = puzzle.slot_id(&Slot::new(0, 1, 3, Direction::Down)).unwrap();
    let across = puzzle.slot_id(&Slot::new(1, 0, 4, Direction::Across)).unwrap();

    let mut engine = ConsistencyEngine::new(&puzzle, &bank, &mut domains);
    expect_eq!(engine.ac3_from([(down, across)]), ArcConsistency::Consistent);
    // `down` has no neighbor besides `across`, so nothing is re-queued.
    expect_eq!(engine.revisions(), 1);
    expect_that!(words_of(&domains, &bank, down), container_eq(["BAN", "CAT"]));
  }
}
