use util::{
  error::{XWordError, XWordResult},
  grid::{Grid, Gridlike, MutGridlike},
};

use crate::{puzzle::Puzzle, solver::Solution};

const WALL: char = '\u{2588}';

/// Lays the words of `solution` out on the puzzle's grid. Cells no word
/// covers stay `None`.
pub fn letter_grid(puzzle: &Puzzle, solution: &Solution) -> XWordResult<Grid<Option<char>>> {
  let mut answer_grid = Grid::new(puzzle.width(), puzzle.height());
  for (slot, word) in solution.iter() {
    for (c, tile_pos) in word.chars().zip(slot.cells()) {
      let tile = answer_grid.get_mut(tile_pos).ok_or_else(|| {
        XWordError::Internal(format!("Position {tile_pos} is out of bounds"))
      })?;
      match tile {
        Some(existing_c) => {
          if c != *existing_c {
            return Err(
              XWordError::Internal(format!(
                "Conflicting letter assignment at position {tile_pos}: {c} vs {existing_c}"
              ))
              .into(),
            );
          }
        }
        None => *tile = Some(c),
      }
    }
  }

  Ok(answer_grid)
}

/// Renders one line per row. Blocked cells are drawn as a solid block and
/// fillable cells without a letter as a space.
pub fn render_text(puzzle: &Puzzle, solution: &Solution) -> XWordResult<String> {
  let letters = letter_grid(puzzle, solution)?;
  Ok(
    puzzle
      .board()
      .positions()
      .map(|pos| {
        let c = if puzzle.is_fillable(pos) {
          letters.get(pos).cloned().flatten().unwrap_or(' ')
        } else {
          WALL
        };
        let eol = pos.x as u32 + 1 == puzzle.width();
        (c, eol)
      })
      .fold(String::new(), |mut text, (c, eol)| {
        text.push(c);
        if eol {
          text.push('\n');
        }
        text
      }),
  )
}

#[cfg(test)]
mod tests {
  #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

  use googletest::prelude::*;
  use util::{grid::Gridlike, pos::Pos};

  use crate::{
    puzzle::Puzzle,
    solver::{solve, Solution},
  };

  use super::{letter_grid, render_text};

  fn solved(layout: &str, words: &[&str]) -> (Puzzle, Solution) {
    let puzzle = Puzzle::from_layout(layout).unwrap();
    let outcome = solve(&puzzle, words.iter().map(|&word| word.to_owned())).unwrap();
    let solution = outcome.solution().unwrap().clone();
    (puzzle, solution)
  }

  #[gtest]
  fn test_letter_grid() {
    let (puzzle, solution) = solved(
      "___
       ##_
       ##_",
      &["CAT", "TEN"],
    );
    let grid = letter_grid(&puzzle, &solution).unwrap();
    expect_that!(grid.get(Pos { x: 0, y: 0 }), some(eq(&Some('C'))));
    expect_that!(grid.get(Pos { x: 2, y: 0 }), some(eq(&Some('T'))));
    expect_that!(grid.get(Pos { x: 2, y: 2 }), some(eq(&Some('N'))));
    expect_that!(grid.get(Pos { x: 0, y: 1 }), some(eq(&None::<char>)));
  }

  #[gtest]
  fn test_render_text() {
    let (puzzle, solution) = solved(
      "___
       ##_
       ##_",
      &["CAT", "TEN"],
    );
    expect_eq!(
      render_text(&puzzle, &solution).unwrap(),
      "CAT\n\u{2588}\u{2588}E\n\u{2588}\u{2588}N\n"
    );
  }

  #[gtest]
  fn test_render_unfilled_cells() {
    // Single fillable cells belong to no slot and render blank.
    let (puzzle, solution) = solved(
      "_#
       #_",
      &[],
    );
    expect_eq!(
      render_text(&puzzle, &solution).unwrap(),
      " \u{2588}\n\u{2588} \n"
    );
  }
}
