use core::fmt;
use std::{
  error::Error,
  fmt::{Display, Formatter},
};

#[derive(Debug)]
pub enum XWordError {
  Internal(String),
  Parse(String),
  InvalidStructure(String),
  /// The search tried to bind a word to a slot it may not hold. Never
  /// expected in correct operation.
  InvariantViolation(String),
}

impl Display for XWordError {
  fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
    match self {
      XWordError::Internal(msg) => write!(f, "Internal error: {msg}"),
      XWordError::Parse(msg) => write!(f, "Parse error: {msg}"),
      XWordError::InvalidStructure(msg) => write!(f, "Invalid structure: {msg}"),
      XWordError::InvariantViolation(msg) => write!(f, "Invariant violation: {msg}"),
    }
  }
}

impl Error for XWordError {}

pub type XWordResult<T = ()> = Result<T, Box<dyn Error>>;
