use std::{
  cmp::Reverse,
  collections::HashMap,
  time::{Duration, Instant},
};

use itertools::Itertools;
use log::trace;
use rand::{
  rngs::StdRng,
  seq::{IndexedRandom, SliceRandom},
  SeedableRng,
};
use util::error::{XWordError, XWordResult};

use crate::{
  domain::Domains,
  puzzle::{Puzzle, SlotId},
  word_bank::{WordBank, WordId},
};

/// How to choose among slots (and words) the heuristics rank equally.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TieBreak {
  /// Take the first tied slot in reading order, and keep tied words in
  /// alphabetical order.
  #[default]
  Deterministic,
  /// Choose uniformly at random among tied slots and words. Runs with the
  /// same seed are identical.
  Random { seed: u64 },
}

/// Operational limits on the search. Running out is reported separately
/// from proving the puzzle unsolvable.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SearchBudget {
  /// Maximum number of tentative assignments.
  pub max_steps: Option<u64>,
  pub time_limit: Option<Duration>,
}

impl SearchBudget {
  pub const fn unlimited() -> Self {
    Self { max_steps: None, time_limit: None }
  }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SearchStats {
  pub assignments_tried: u64,
  pub backtracks: u64,
  pub ac3_revisions: u64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SearchResult {
  Complete,
  Exhausted,
  OutOfBudget,
}

/// A partial mapping from slots to words. Bindings are added and removed in
/// stack order by the search.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Assignment {
  words: Vec<Option<WordId>>,
  /// How many slots currently hold each word.
  uses: HashMap<WordId, u32>,
  num_assigned: usize,
}

impl Assignment {
  pub fn new(puzzle: &Puzzle) -> Self {
    Self {
      words: vec![None; puzzle.num_slots()],
      uses: HashMap::new(),
      num_assigned: 0,
    }
  }

  /// Binds `word` to `slot`. Fails if the slot is not part of the puzzle,
  /// already holds a word, or has a different length than the word.
  pub fn assign(
    &mut self,
    puzzle: &Puzzle,
    bank: &WordBank,
    slot: SlotId,
    word: WordId,
  ) -> XWordResult {
    let slot_len = puzzle
      .slot(slot)
      .ok_or_else(|| XWordError::InvariantViolation(format!("Slot {slot} is not in the puzzle")))?
      .length() as usize;
    let word_len = bank
      .word_len(word)
      .ok_or_else(|| XWordError::InvariantViolation(format!("Unknown word id {word}")))?;
    if word_len != slot_len {
      return Err(
        XWordError::InvariantViolation(format!(
          "Word of length {word_len} cannot fill slot {slot} of length {slot_len}"
        ))
        .into(),
      );
    }

    let entry = self
      .words
      .get_mut(slot)
      .ok_or_else(|| XWordError::InvariantViolation(format!("Slot {slot} is out of range")))?;
    if let Some(existing) = entry {
      return Err(
        XWordError::InvariantViolation(format!(
          "Slot {slot} already holds word {existing}"
        ))
        .into(),
      );
    }

    *entry = Some(word);
    *self.uses.entry(word).or_default() += 1;
    self.num_assigned += 1;
    Ok(())
  }

  /// Removes the binding of `slot`, returning the word it held.
  pub fn unassign(&mut self, slot: SlotId) -> Option<WordId> {
    let word = self.words.get_mut(slot)?.take()?;
    if let Some(count) = self.uses.get_mut(&word) {
      *count -= 1;
      if *count == 0 {
        self.uses.remove(&word);
      }
    }
    self.num_assigned -= 1;
    Some(word)
  }

  pub fn get(&self, slot: SlotId) -> Option<WordId> {
    self.words.get(slot).cloned().flatten()
  }

  pub fn is_assigned(&self, slot: SlotId) -> bool {
    self.get(slot).is_some()
  }

  pub fn len(&self) -> usize {
    self.num_assigned
  }

  pub fn is_empty(&self) -> bool {
    self.num_assigned == 0
  }

  pub fn is_complete(&self) -> bool {
    self.num_assigned == self.words.len()
  }

  pub fn iter(&self) -> impl Iterator<Item = (SlotId, WordId)> + '_ {
    self
      .words
      .iter()
      .enumerate()
      .filter_map(|(slot, word)| word.map(|word| (slot, word)))
  }

  /// Checks the binding of `slot` against the rest of the assignment: the
  /// word has the slot's length, no other slot holds the same word, and every
  /// assigned neighbor agrees on the shared letter.
  pub fn is_consistent_at(&self, puzzle: &Puzzle, bank: &WordBank, slot: SlotId) -> bool {
    let (Some(word), Some(slot_def)) = (self.get(slot), puzzle.slot(slot)) else {
      return false;
    };
    if bank.word_len(word) != Some(slot_def.length() as usize) {
      return false;
    }
    if self.uses.get(&word).is_some_and(|&count| count > 1) {
      return false;
    }

    puzzle.neighbors(slot).iter().all(|&neighbor| {
      match (self.get(neighbor), puzzle.overlap(slot, neighbor)) {
        (Some(other), Some((slot_idx, other_idx))) => {
          bank.agrees(word, slot_idx, other, other_idx)
        }
        _ => true,
      }
    })
  }

  /// Checks every binding, as `is_consistent_at` does for one.
  pub fn is_consistent(&self, puzzle: &Puzzle, bank: &WordBank) -> bool {
    self
      .iter()
      .all(|(slot, _)| self.is_consistent_at(puzzle, bank, slot))
  }
}

/// Backtracking search over assignments. Domains are only read, to order
/// slots and words; choices are committed to the assignment alone.
pub struct Search<'a> {
  puzzle: &'a Puzzle,
  bank: &'a WordBank,
  domains: &'a Domains,
  rng: Option<StdRng>,
  budget: SearchBudget,
  deadline: Option<Instant>,
  stats: SearchStats,
}

impl<'a> Search<'a> {
  pub fn new(
    puzzle: &'a Puzzle,
    bank: &'a WordBank,
    domains: &'a Domains,
    tie_break: TieBreak,
    budget: SearchBudget,
  ) -> Self {
    let rng = match tie_break {
      TieBreak::Deterministic => None,
      TieBreak::Random { seed } => Some(StdRng::seed_from_u64(seed)),
    };
    Self {
      puzzle,
      bank,
      domains,
      rng,
      budget,
      deadline: None,
      stats: SearchStats::default(),
    }
  }

  pub fn stats(&self) -> SearchStats {
    self.stats
  }

  /// Searches from the empty assignment. On `Complete`, the returned
  /// assignment maps every slot.
  pub fn run(&mut self) -> XWordResult<(SearchResult, Assignment)> {
    // A limit too large to represent as an instant never expires.
    self.deadline = self
      .budget
      .time_limit
      .and_then(|time_limit| Instant::now().checked_add(time_limit));
    let mut assignment = Assignment::new(self.puzzle);
    let result = self.backtrack(&mut assignment)?;
    Ok((result, assignment))
  }

  /// Chooses the unassigned slot with the fewest remaining words, preferring
  /// slots with more neighbors among ties.
  pub fn select_unassigned_slot(&mut self, assignment: &Assignment) -> Option<SlotId> {
    let candidates = self
      .puzzle
      .slot_ids()
      .filter(|&slot| !assignment.is_assigned(slot))
      .min_set_by_key(|&slot| {
        (
          self.domains.size(slot),
          Reverse(self.puzzle.neighbors(slot).len()),
        )
      });

    match &mut self.rng {
      Some(rng) => candidates.choose(rng).cloned(),
      None => candidates.first().cloned(),
    }
  }

  /// Orders the words of `slot` by how many words they would rule out from
  /// the domains of unassigned neighbors, fewest first.
  pub fn order_domain_values(&mut self, slot: SlotId, assignment: &Assignment) -> Vec<WordId> {
    let bank = self.bank;
    let domains = self.domains;
    // For each unassigned neighbor: the index into `slot`'s words, the
    // neighbor's domain size, and how many of its words have each letter at
    // the crossing.
    let crossings: Vec<(usize, usize, HashMap<char, usize>)> = self
      .puzzle
      .neighbors(slot)
      .iter()
      .filter(|&&neighbor| !assignment.is_assigned(neighbor))
      .filter_map(|&neighbor| {
        let (slot_idx, neighbor_idx) = self.puzzle.overlap(slot, neighbor)?;
        let letter_counts = domains
          .iter(neighbor)
          .filter_map(|word| bank.letter(word, neighbor_idx))
          .counts();
        Some((slot_idx, domains.size(neighbor), letter_counts))
      })
      .collect();

    let ruled_out = |word: WordId| -> usize {
      crossings
        .iter()
        .map(|(slot_idx, total, letter_counts)| {
          let compatible = bank
            .letter(word, *slot_idx)
            .and_then(|letter| letter_counts.get(&letter))
            .cloned()
            .unwrap_or(0);
          total - compatible
        })
        .sum()
    };

    let mut words: Vec<_> = domains.iter(slot).collect();
    if let Some(rng) = &mut self.rng {
      words.shuffle(rng);
    }
    words.sort_by_cached_key(|&word| ruled_out(word));
    words
  }

  fn out_of_budget(&self) -> bool {
    self
      .budget
      .max_steps
      .is_some_and(|max_steps| self.stats.assignments_tried > max_steps)
      || self.deadline.is_some_and(|deadline| Instant::now() >= deadline)
  }

  fn backtrack(&mut self, assignment: &mut Assignment) -> XWordResult<SearchResult> {
    let Some(slot) = self.select_unassigned_slot(assignment) else {
      return Ok(SearchResult::Complete);
    };

    for word in self.order_domain_values(slot, assignment) {
      self.stats.assignments_tried += 1;
      if self.out_of_budget() {
        return Ok(SearchResult::OutOfBudget);
      }

      assignment.assign(self.puzzle, self.bank, slot, word)?;
      if assignment.is_consistent_at(self.puzzle, self.bank, slot) {
        trace!("Trying word {word} in slot {slot} at depth {}", assignment.len());
        match self.backtrack(assignment)? {
          SearchResult::Exhausted => {}
          result => return Ok(result),
        }
      }
      assignment.unassign(slot);
    }

    self.stats.backtracks += 1;
    Ok(SearchResult::Exhausted)
  }
}
