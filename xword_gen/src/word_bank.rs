use std::collections::HashMap;

use itertools::Itertools;

pub type WordId = u32;

/// Interned candidate words. Ids are dense and follow the sorted order of the
/// words, so iterating ids visits words in a stable order.
#[derive(Clone, Debug, Default)]
pub struct WordBank {
  words: Vec<String>,
  letters: Vec<Vec<char>>,
  ids: HashMap<String, WordId>,
}

impl WordBank {
  pub fn from_words(words: impl IntoIterator<Item = String>) -> Self {
    let words: Vec<_> = words.into_iter().sorted().dedup().collect();
    let letters = words.iter().map(|word| word.chars().collect()).collect();
    let ids = words
      .iter()
      .enumerate()
      .map(|(id, word)| (word.clone(), id as WordId))
      .collect();
    Self { words, letters, ids }
  }

  pub fn len(&self) -> usize {
    self.words.len()
  }

  pub fn is_empty(&self) -> bool {
    self.words.is_empty()
  }

  pub fn id(&self, word: &str) -> Option<WordId> {
    self.ids.get(word).cloned()
  }

  pub fn get(&self, id: WordId) -> Option<&str> {
    self.words.get(id as usize).map(|word| word.as_str())
  }

  /// Length of the word in symbols, which may differ from its byte length.
  pub fn word_len(&self, id: WordId) -> Option<usize> {
    self.letters.get(id as usize).map(|letters| letters.len())
  }

  pub fn letter(&self, id: WordId, idx: usize) -> Option<char> {
    self
      .letters
      .get(id as usize)
      .and_then(|letters| letters.get(idx))
      .cloned()
  }

  /// True if word `a` at index `a_idx` holds the same letter as word `b` at
  /// index `b_idx`. Out-of-range indices never agree.
  pub fn agrees(&self, a: WordId, a_idx: usize, b: WordId, b_idx: usize) -> bool {
    matches!(
      (self.letter(a, a_idx), self.letter(b, b_idx)),
      (Some(a_letter), Some(b_letter)) if a_letter == b_letter
    )
  }

  pub fn all_ids(&self) -> impl Iterator<Item = WordId> {
    0..self.words.len() as WordId
  }
}
