use std::{path::PathBuf, time::Duration};

use clap::{Parser, ValueEnum};
use util::error::{XWordError, XWordResult};
use xword_gen::{
  search::{SearchBudget, TieBreak},
  SolverConfig,
};

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
  /// The rendered grid as plain text.
  Text,
  /// The bitcode-encoded letter grid.
  Binary,
}

#[derive(Parser, Debug)]
#[command(version, about = "Fill a crossword grid from a word list", long_about = None)]
pub struct Args {
  /// Grid structure file. `_` marks a fillable cell, anything else a wall.
  pub structure: PathBuf,

  /// Word list file, one word per line.
  pub words: PathBuf,

  /// Also write the solved grid to this file.
  #[arg(long)]
  pub output: Option<PathBuf>,

  #[arg(long, default_value = "text")]
  pub format: OutputFormat,

  /// Break heuristic ties randomly with this seed instead of by position.
  #[arg(long)]
  pub seed: Option<u64>,

  /// Give up after this many tentative assignments.
  #[arg(long)]
  pub max_steps: Option<u64>,

  /// Give up after this many seconds of search.
  #[arg(long)]
  pub time_limit_secs: Option<f64>,

  /// Skip the arc consistency pass before searching.
  #[arg(long)]
  pub no_arc_consistency: bool,
}

impl Args {
  pub fn solver_config(&self) -> XWordResult<SolverConfig> {
    let time_limit = self
      .time_limit_secs
      .map(|secs| {
        Duration::try_from_secs_f64(secs)
          .map_err(|err| XWordError::Parse(format!("Invalid time limit {secs}: {err}")))
      })
      .transpose()?;

    Ok(SolverConfig {
      tie_break: self
        .seed
        .map_or(TieBreak::Deterministic, |seed| TieBreak::Random { seed }),
      arc_consistency: !self.no_arc_consistency,
      budget: SearchBudget { max_steps: self.max_steps, time_limit },
    })
  }
}

#[cfg(test)]
mod tests {
  #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

  use std::time::Duration;

  use clap::Parser;
  use googletest::prelude::*;
  use xword_gen::search::TieBreak;

  use super::{Args, OutputFormat};

  #[gtest]
  fn test_defaults() {
    let args = Args::try_parse_from(["xword", "structure.txt", "words.txt"]).unwrap();
    let config = args.solver_config().unwrap();
    expect_eq!(args.format, OutputFormat::Text);
    expect_eq!(config.tie_break, TieBreak::Deterministic);
    expect_true!(config.arc_consistency);
    expect_that!(config.budget.max_steps, none());
    expect_that!(config.budget.time_limit, none());
  }

  #[gtest]
  fn test_flags() {
    let args = Args::try_parse_from([
      "xword",
      "structure.txt",
      "words.txt",
      "--seed",
      "3",
      "--max-steps",
      "100",
      "--time-limit-secs",
      "1.5",
      "--no-arc-consistency",
      "--format",
      "binary",
    ])
    .unwrap();
    let config = args.solver_config().unwrap();
    expect_eq!(args.format, OutputFormat::Binary);
    expect_eq!(config.tie_break, TieBreak::Random { seed: 3 });
    expect_false!(config.arc_consistency);
    expect_that!(config.budget.max_steps, some(eq(100)));
    expect_that!(
      config.budget.time_limit,
      some(eq(Duration::from_millis(1500)))
    );
  }

  #[gtest]
  fn test_time_limit_out_of_range() {
    for flag in ["--time-limit-secs=1e20", "--time-limit-secs=-1", "--time-limit-secs=inf"] {
      let args = Args::try_parse_from(["xword", "structure.txt", "words.txt", flag]).unwrap();
      expect_that!(
        args.solver_config(),
        err(displays_as(contains_substring("Invalid time limit")))
      );
    }
  }

  #[gtest]
  fn test_missing_words() {
    expect_that!(Args::try_parse_from(["xword", "structure.txt"]), err(anything()));
  }
}
