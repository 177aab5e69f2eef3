#![deny(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

mod args;

use std::{fs, io::Write, path::Path};

use args::{Args, OutputFormat};
use clap::Parser;
use log::info;
use util::{
  bitcode,
  error::{XWordError, XWordResult},
  time::time_fn,
};
use xword_dict::WordList;
use xword_gen::{
  render::{letter_grid, render_text},
  Puzzle, Solution, SolveOutcome, Solver,
};

fn read_puzzle(path: &Path) -> XWordResult<Puzzle> {
  let layout = fs::read_to_string(path)
    .map_err(|err| XWordError::Parse(format!("Failed to read {}: {err}", path.display())))?;
  Puzzle::from_layout(&layout)
}

fn encode_solution(
  puzzle: &Puzzle,
  solution: &Solution,
  format: OutputFormat,
) -> XWordResult<Vec<u8>> {
  Ok(match format {
    OutputFormat::Text => render_text(puzzle, solution)?.into_bytes(),
    OutputFormat::Binary => bitcode::encode(&letter_grid(puzzle, solution)?),
  })
}

fn save_solution(
  puzzle: &Puzzle,
  solution: &Solution,
  path: &Path,
  format: OutputFormat,
) -> XWordResult {
  let bytes = encode_solution(puzzle, solution, format)?;
  let mut file = fs::File::create(path)?;
  file.write_all(&bytes)?;
  info!("Wrote solution to {}", path.display());
  Ok(())
}

fn main() -> XWordResult {
  env_logger::init();
  let args = Args::parse();

  let puzzle = read_puzzle(&args.structure)?;
  let words = WordList::from_file(&args.words)?;
  info!(
    "Filling {} slots from {} words",
    puzzle.num_slots(),
    words.len()
  );

  let solver = Solver::with_config(&puzzle, words, args.solver_config()?);
  let (time, report) = time_fn(|| solver.solve());
  let report = report?;
  info!("{:?}", report.stats);

  match &report.outcome {
    SolveOutcome::Solved(solution) => {
      print!("{}", render_text(&puzzle, solution)?);
      println!("Took {}s", time.as_secs_f32());
      if let Some(output) = &args.output {
        save_solution(&puzzle, solution, output, args.format)?;
      }
    }
    SolveOutcome::Unsolvable => println!("No solution."),
    SolveOutcome::BudgetExhausted => println!("No solution found within budget."),
  }

  Ok(())
}
