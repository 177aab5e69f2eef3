#![deny(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use std::{borrow::Borrow, fs, path::Path};

use itertools::Itertools;
use log::debug;
use util::error::{XWordError, XWordResult};

/// A de-duplicated, canonicalized list of candidate words.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct WordList {
  words: Vec<String>,
}

impl WordList {
  fn canonicalize_word(word: &str) -> String {
    word.to_uppercase()
  }

  fn parse_line(line_number: usize, line: &str) -> XWordResult<Option<String>> {
    let word = line.trim();
    if word.is_empty() {
      return Ok(None);
    }
    if word.chars().any(char::is_whitespace) {
      return Err(
        XWordError::Parse(format!(
          "Line {}: \"{word}\" contains whitespace",
          line_number + 1
        ))
        .into(),
      );
    }

    Ok(Some(Self::canonicalize_word(word)))
  }

  /// Parses one word per line. Blank lines are skipped, words are upper-cased
  /// and duplicates collapse.
  pub fn parse<S>(lines: impl IntoIterator<Item = S>) -> XWordResult<Self>
  where
    S: Borrow<str>,
  {
    let words: Vec<_> = lines
      .into_iter()
      .enumerate()
      .map(|(line_number, line)| Self::parse_line(line_number, line.borrow()))
      .flatten_ok()
      .collect::<XWordResult<_>>()?;

    Ok(Self::from_words(words))
  }

  pub fn from_words(words: impl IntoIterator<Item = String>) -> Self {
    Self { words: words.into_iter().sorted().dedup().collect() }
  }

  pub fn from_file(path: impl AsRef<Path>) -> XWordResult<Self> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)
      .map_err(|err| XWordError::Parse(format!("Failed to read {}: {err}", path.display())))?;
    let list = Self::parse(contents.lines())?;
    debug!("Loaded {} words from {}", list.len(), path.display());
    Ok(list)
  }

  pub fn words(&self) -> impl Iterator<Item = &str> {
    self.words.iter().map(|word| word.as_str())
  }

  pub fn len(&self) -> usize {
    self.words.len()
  }

  pub fn is_empty(&self) -> bool {
    self.words.is_empty()
  }

  pub fn longest(&self) -> Option<&str> {
    self
      .words()
      .max_by_key(|word| word.chars().count())
  }
}

impl IntoIterator for WordList {
  type Item = String;
  type IntoIter = std::vec::IntoIter<String>;

  fn into_iter(self) -> Self::IntoIter {
    self.words.into_iter()
  }
}

#[cfg(test)]
mod tests {
  #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

  use googletest::prelude::*;

  use super::WordList;

  #[gtest]
  fn test_parse_canonicalizes() {
    let list = WordList::parse("cat\n  Dog \n\nCAT\n".lines()).unwrap();
    expect_that!(list.words().collect::<Vec<_>>(), container_eq(["CAT", "DOG"]));
    expect_eq!(list.len(), 2);
  }

  #[gtest]
  fn test_parse_rejects_inner_whitespace() {
    expect_that!(
      WordList::parse(["ok", "not ok"]),
      err(displays_as(contains_substring("Line 2")))
    );
  }

  #[gtest]
  fn test_empty() {
    let list = WordList::parse(["", "   "]).unwrap();
    expect_true!(list.is_empty());
    expect_that!(list.longest(), none());
  }

  #[gtest]
  fn test_longest() {
    let list = WordList::from_words(["AB", "ABCD", "ABC"].map(str::to_owned));
    expect_that!(list.longest(), some(eq("ABCD")));
  }

  #[gtest]
  fn test_missing_file() {
    expect_that!(
      WordList::from_file("/nonexistent/words.txt"),
      err(displays_as(contains_substring("Failed to read")))
    );
  }
}
