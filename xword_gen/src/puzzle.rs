use std::{
  cmp::Ordering,
  collections::HashMap,
  fmt::Display,
};

use itertools::Itertools;
use log::debug;
use util::{
  error::{XWordError, XWordResult},
  grid::{Grid, Gridlike},
  pos::{Diff, Pos},
};

/// Runs of fillable cells shorter than this are not slots.
pub const MIN_SLOT_LENGTH: u32 = 2;

pub type SlotId = usize;

#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub enum Direction {
  Across,
  Down,
}

impl Direction {
  fn step(&self) -> Diff {
    match self {
      Direction::Across => Diff::RIGHT,
      Direction::Down => Diff::DOWN,
    }
  }
}

impl Display for Direction {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Direction::Across => write!(f, "across"),
      Direction::Down => write!(f, "down"),
    }
  }
}

/// A maximal run of fillable cells. Two slots are equal iff their start
/// cell, length and direction all match.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq)]
pub struct Slot {
  pos: Pos,
  length: u32,
  direction: Direction,
}

impl Slot {
  pub const fn new(row: u32, col: u32, length: u32, direction: Direction) -> Self {
    Self {
      pos: Pos { x: col as i32, y: row as i32 },
      length,
      direction,
    }
  }

  pub fn row(&self) -> u32 {
    self.pos.y as u32
  }

  pub fn col(&self) -> u32 {
    self.pos.x as u32
  }

  pub fn pos(&self) -> Pos {
    self.pos
  }

  pub fn length(&self) -> u32 {
    self.length
  }

  pub fn direction(&self) -> Direction {
    self.direction
  }

  /// The cells covered by this slot, in reading order.
  pub fn cells(&self) -> impl Iterator<Item = Pos> + use<> {
    let pos = self.pos;
    let step = self.direction.step();
    (0..self.length as i32).map(move |idx| pos + idx * step)
  }

  fn order_key(&self) -> (u32, u32, Direction, u32) {
    (self.row(), self.col(), self.direction, self.length)
  }
}

impl PartialOrd for Slot {
  fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
    Some(self.cmp(other))
  }
}

impl Ord for Slot {
  fn cmp(&self, other: &Self) -> Ordering {
    self.order_key().cmp(&other.order_key())
  }
}

impl Display for Slot {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(
      f,
      "{} {} (len {})",
      self.pos, self.direction, self.length
    )
  }
}

/// The immutable slot layout of a crossword grid, with the overlap relation
/// between slots precomputed.
#[derive(Clone, Debug)]
pub struct Puzzle {
  board: Grid<bool>,
  /// Sorted by position, so slot ids follow reading order.
  slots: Vec<Slot>,
  slot_ids: HashMap<Slot, SlotId>,
  /// Keyed by both (a, b) and (b, a). The value holds the index into the
  /// first slot's word, then the index into the second's.
  overlaps: HashMap<(SlotId, SlotId), (usize, usize)>,
  neighbors: Vec<Vec<SlotId>>,
}

impl Puzzle {
  /// Parses a layout where `_` marks a fillable cell and any other character
  /// marks a blocked one. Lines are trimmed and blank lines are skipped.
  pub fn build_grid(layout: &str) -> XWordResult<Grid<bool>> {
    let rows: Vec<Vec<bool>> = layout
      .lines()
      .map(str::trim)
      .filter(|line| !line.is_empty())
      .map(|line| line.chars().map(|c| c == '_').collect())
      .collect();
    if rows.is_empty() {
      return Err(XWordError::InvalidStructure("Empty board string".to_owned()).into());
    }

    Grid::from_rows(rows)
  }

  pub fn from_layout(layout: &str) -> XWordResult<Self> {
    Self::from_grid(Self::build_grid(layout)?)
  }

  pub fn from_grid(board: Grid<bool>) -> XWordResult<Self> {
    if board.width() == 0 || board.height() == 0 {
      return Err(
        XWordError::InvalidStructure(format!(
          "Board must be non-empty, found {}x{}",
          board.width(),
          board.height()
        ))
        .into(),
      );
    }

    let slots: Vec<Slot> = Self::board_row_runs(&board)
      .into_iter()
      .map(|(pos, length)| Slot { pos, length, direction: Direction::Across })
      .chain(
        Self::board_row_runs(&board.transpose())
          .into_iter()
          .map(|(pos, length)| Slot {
            pos: pos.transpose(),
            length,
            direction: Direction::Down,
          }),
      )
      .sorted()
      .collect();

    let slot_ids = slots
      .iter()
      .enumerate()
      .map(|(id, &slot)| (slot, id))
      .collect();
    let overlaps = Self::compute_overlaps(&slots);

    let mut neighbors = vec![Vec::new(); slots.len()];
    for &(a, b) in overlaps.keys() {
      neighbors[a].push(b);
    }
    neighbors.iter_mut().for_each(|adjacent| adjacent.sort_unstable());

    debug!(
      "Built {}x{} puzzle with {} slots and {} overlaps",
      board.width(),
      board.height(),
      slots.len(),
      overlaps.len() / 2
    );

    Ok(Self { board, slots, slot_ids, overlaps, neighbors })
  }

  /// Finds every maximal run of at least `MIN_SLOT_LENGTH` fillable cells in
  /// each row, as (start, length).
  fn board_row_runs<G: Gridlike<bool>>(board: &G) -> Vec<(Pos, u32)> {
    (0..board.height())
      .flat_map(|y| {
        let chunks = board
          .iter_row(y)
          .enumerate()
          .chunk_by(|&(_, &fillable)| fillable);
        chunks
          .into_iter()
          .filter_map(|(fillable, mut run)| {
            let (x, _) = run.next()?;
            let length = 1 + run.count() as u32;
            (fillable && length >= MIN_SLOT_LENGTH)
              .then_some((Pos { x: x as i32, y: y as i32 }, length))
          })
          .collect::<Vec<_>>()
      })
      .collect()
  }

  /// Records an overlap for every pair of slots sharing exactly one cell.
  fn compute_overlaps(slots: &[Slot]) -> HashMap<(SlotId, SlotId), (usize, usize)> {
    let mut cell_owners: HashMap<Pos, Vec<(SlotId, usize)>> = HashMap::new();
    for (id, slot) in slots.iter().enumerate() {
      for (idx, cell) in slot.cells().enumerate() {
        cell_owners.entry(cell).or_default().push((id, idx));
      }
    }

    let mut shared: HashMap<(SlotId, SlotId), Vec<(usize, usize)>> = HashMap::new();
    for owners in cell_owners.values() {
      for (&(a, a_idx), &(b, b_idx)) in owners.iter().tuple_combinations() {
        shared.entry((a, b)).or_default().push((a_idx, b_idx));
        shared.entry((b, a)).or_default().push((b_idx, a_idx));
      }
    }

    shared
      .into_iter()
      .filter_map(|(pair, cells)| match cells.as_slice() {
        &[indices] => Some((pair, indices)),
        _ => None,
      })
      .collect()
  }

  pub fn width(&self) -> u32 {
    self.board.width()
  }

  pub fn height(&self) -> u32 {
    self.board.height()
  }

  pub fn board(&self) -> &Grid<bool> {
    &self.board
  }

  pub fn is_fillable(&self, pos: Pos) -> bool {
    self.board.get(pos).is_some_and(|&fillable| fillable)
  }

  pub fn slots(&self) -> &[Slot] {
    &self.slots
  }

  pub fn num_slots(&self) -> usize {
    self.slots.len()
  }

  pub fn slot_ids(&self) -> impl Iterator<Item = SlotId> {
    0..self.slots.len()
  }

  pub fn slot(&self, id: SlotId) -> Option<&Slot> {
    self.slots.get(id)
  }

  pub fn slot_id(&self, slot: &Slot) -> Option<SlotId> {
    self.slot_ids.get(slot).cloned()
  }

  /// The (index into `a`'s word, index into `b`'s word) of the cell `a` and
  /// `b` share, if any.
  pub fn overlap(&self, a: SlotId, b: SlotId) -> Option<(usize, usize)> {
    self.overlaps.get(&(a, b)).cloned()
  }

  pub fn neighbors(&self, id: SlotId) -> &[SlotId] {
    self.neighbors.get(id).map_or(&[], |adjacent| adjacent.as_slice())
  }

  /// Every ordered pair of overlapping slots.
  pub fn arcs(&self) -> impl Iterator<Item = (SlotId, SlotId)> + '_ {
    self
      .neighbors
      .iter()
      .enumerate()
      .flat_map(|(a, adjacent)| adjacent.iter().map(move |&b| (a, b)))
  }
}
