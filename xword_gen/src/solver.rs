use std::collections::BTreeMap;

use log::debug;
use util::error::{XWordError, XWordResult};

use crate::{
  consistency::{ArcConsistency, ConsistencyEngine},
  domain::Domains,
  puzzle::{Puzzle, Slot},
  search::{Assignment, Search, SearchBudget, SearchResult, SearchStats, TieBreak},
  word_bank::WordBank,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SolverConfig {
  pub tie_break: TieBreak,
  /// Run AC-3 over the domains before searching.
  pub arc_consistency: bool,
  pub budget: SearchBudget,
}

impl Default for SolverConfig {
  fn default() -> Self {
    Self {
      tie_break: TieBreak::Deterministic,
      arc_consistency: true,
      budget: SearchBudget::unlimited(),
    }
  }
}

/// A complete assignment of words to slots.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Solution {
  words: BTreeMap<Slot, String>,
}

impl Solution {
  fn from_assignment(
    puzzle: &Puzzle,
    bank: &WordBank,
    assignment: &Assignment,
  ) -> XWordResult<Self> {
    let words: BTreeMap<_, _> = assignment
      .iter()
      .map(|(slot_id, word_id)| -> XWordResult<_> {
        let slot = puzzle
          .slot(slot_id)
          .ok_or_else(|| XWordError::Internal(format!("Unknown slot id {slot_id}")))?;
        let word = bank
          .get(word_id)
          .ok_or_else(|| XWordError::Internal(format!("Unknown word id {word_id}")))?;
        Ok((*slot, word.to_owned()))
      })
      .collect::<XWordResult<_>>()?;
    Ok(Self { words })
  }

  pub fn get(&self, slot: &Slot) -> Option<&str> {
    self.words.get(slot).map(|word| word.as_str())
  }

  /// Slots in reading order with their words.
  pub fn iter(&self) -> impl Iterator<Item = (&Slot, &str)> {
    self.words.iter().map(|(slot, word)| (slot, word.as_str()))
  }

  pub fn len(&self) -> usize {
    self.words.len()
  }

  pub fn is_empty(&self) -> bool {
    self.words.is_empty()
  }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SolveOutcome {
  Solved(Solution),
  /// No complete assignment exists.
  Unsolvable,
  /// The search budget ran out before a solution was found or ruled out.
  BudgetExhausted,
}

impl SolveOutcome {
  pub fn solution(&self) -> Option<&Solution> {
    match self {
      SolveOutcome::Solved(solution) => Some(solution),
      _ => None,
    }
  }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SolveReport {
  pub outcome: SolveOutcome,
  pub stats: SearchStats,
}

/// Fills a puzzle from a word list: node consistency, then arc consistency,
/// then backtracking search.
#[derive(Clone, Debug)]
pub struct Solver<'a> {
  puzzle: &'a Puzzle,
  bank: WordBank,
  config: SolverConfig,
}

impl<'a> Solver<'a> {
  pub fn new(puzzle: &'a Puzzle, words: impl IntoIterator<Item = String>) -> Self {
    Self::with_config(puzzle, words, SolverConfig::default())
  }

  pub fn with_config(
    puzzle: &'a Puzzle,
    words: impl IntoIterator<Item = String>,
    config: SolverConfig,
  ) -> Self {
    Self { puzzle, bank: WordBank::from_words(words), config }
  }

  pub fn bank(&self) -> &WordBank {
    &self.bank
  }

  /// Builds the node-consistent domains and, if configured, makes them arc
  /// consistent. Returns the number of AC-3 revisions and the outcome.
  pub fn reduced_domains(&self) -> (Domains, u64, ArcConsistency) {
    let mut domains = Domains::node_consistent(self.puzzle, &self.bank);
    if !self.config.arc_consistency {
      let result = match domains.first_empty() {
        Some(slot) => ArcConsistency::Wipeout { slot },
        None => ArcConsistency::Consistent,
      };
      return (domains, 0, result);
    }

    let mut engine = ConsistencyEngine::new(self.puzzle, &self.bank, &mut domains);
    let result = engine.ac3();
    let revisions = engine.revisions();
    (domains, revisions, result)
  }

  pub fn solve(&self) -> XWordResult<SolveReport> {
    let (domains, ac3_revisions, arc_consistency) = self.reduced_domains();
    if let ArcConsistency::Wipeout { slot } = arc_consistency {
      debug!(
        "No words left for {}, puzzle is unsolvable",
        self.puzzle.slot(slot).map_or_else(|| slot.to_string(), |slot| slot.to_string())
      );
      return Ok(SolveReport {
        outcome: SolveOutcome::Unsolvable,
        stats: SearchStats { ac3_revisions, ..SearchStats::default() },
      });
    }

    let mut search = Search::new(
      self.puzzle,
      &self.bank,
      &domains,
      self.config.tie_break,
      self.config.budget,
    );
    let (result, assignment) = search.run()?;
    let stats = SearchStats { ac3_revisions, ..search.stats() };
    debug!(
      "Search finished with {result:?} after {} assignments and {} backtracks",
      stats.assignments_tried, stats.backtracks
    );

    let outcome = match result {
      SearchResult::Complete => {
        if !assignment.is_complete() || !assignment.is_consistent(self.puzzle, &self.bank) {
          return Err(
            XWordError::InvariantViolation(
              "Search reported an incomplete or inconsistent assignment".to_owned(),
            )
            .into(),
          );
        }
        SolveOutcome::Solved(Solution::from_assignment(self.puzzle, &self.bank, &assignment)?)
      }
      SearchResult::Exhausted => SolveOutcome::Unsolvable,
      SearchResult::OutOfBudget => SolveOutcome::BudgetExhausted,
    };

    Ok(SolveReport { outcome, stats })
  }
}

/// Solves `puzzle` with the default configuration.
pub fn solve(puzzle: &Puzzle, words: impl IntoIterator<Item = String>) -> XWordResult<SolveOutcome> {
  Ok(Solver::new(puzzle, words).solve()?.outcome)
}
