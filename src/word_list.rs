//! This module implements the word corpus shared by every variable in a puzzle. Words are
//! normalized, interned into glyph ids, and bucketed by length, so that the solver can compare
//! letters as integers and treat "all words of the right length" as a single bucket lookup.

use smallvec::{smallvec, SmallVec};
use std::collections::HashMap;
use std::ffi::OsString;
use std::fmt;
use std::fs;
use unicode_normalization::UnicodeNormalization;

use crate::types::{GlobalWordId, GlyphId, WordId};
use crate::{MAX_GLYPH_COUNT, MAX_VAR_LENGTH};

/// A struct representing a word in the word list.
#[derive(Debug, Clone)]
pub struct Word {
    /// The word as it would appear in a grid -- only lowercase letters or other valid glyphs.
    pub normalized_string: String,

    /// The word as it appears in the user's word list, with arbitrary formatting.
    pub canonical_string: String,

    /// The glyph ids making up `normalized_string`.
    pub glyphs: SmallVec<[GlyphId; MAX_VAR_LENGTH]>,
}

/// Given a canonical word string from a word list, turn it into the normalized form used by the
/// solver.
#[must_use]
pub fn normalize_word(canonical: &str) -> String {
    canonical
        .to_lowercase()
        .nfc() // Normalize Unicode combining forms
        .filter(|c| !c.is_whitespace())
        .collect()
}

#[derive(Debug, Clone)]
pub enum WordListError {
    InvalidPath(String),
    InvalidWord(String),
}

impl fmt::Display for WordListError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let string = match self {
            WordListError::InvalidPath(path) => format!("Can’t read file: “{path}”"),
            WordListError::InvalidWord(word) => {
                format!("Word list contains invalid word: “{word}”")
            }
        };
        write!(f, "{string}")
    }
}

/// Configuration describing a source of word list entries.
pub enum WordListSourceConfig {
    Memory { words: Vec<String> },
    File { path: OsString },
}

/// A struct representing the loaded word corpus. This is static regardless of grid geometry or
/// progress through a fill, although we do support a `max_length` cap that depends on the size of
/// the grid, since it helps performance to avoid loading words that are too long to be usable.
pub struct WordList {
    /// A list of all characters that occur in any (normalized) word. `GlyphId`s used everywhere
    /// else are indices into this list.
    pub glyphs: SmallVec<[char; MAX_GLYPH_COUNT]>,

    /// The inverse of `glyphs`: a map from a character to the `GlyphId` representing it.
    pub glyph_id_by_char: HashMap<char, GlyphId>,

    /// A list of all loaded words, bucketed by length. An index into `words` is the length of the
    /// words in the bucket, so `words[0]` is always an empty vec.
    pub words: Vec<Vec<Word>>,

    /// A map from a normalized string to the id of the Word representing it.
    pub word_id_by_string: HashMap<String, WordId>,

    /// The maximum word length provided when configuring the WordList, if any.
    pub max_length: Option<usize>,
}

impl WordList {
    /// Construct a new `WordList` using the given sources, omitting any entries that are longer
    /// than `max_length`. Duplicate strings across sources are loaded once.
    pub fn new(
        source_configs: Vec<WordListSourceConfig>,
        max_length: Option<usize>,
    ) -> Result<WordList, WordListError> {
        let mut instance = WordList {
            glyphs: smallvec![],
            glyph_id_by_char: HashMap::new(),
            words: vec![vec![]],
            word_id_by_string: HashMap::new(),
            max_length,
        };

        for source_config in source_configs {
            instance.load_source(&source_config)?;
        }

        Ok(instance)
    }

    fn load_source(&mut self, source: &WordListSourceConfig) -> Result<(), WordListError> {
        match source {
            WordListSourceConfig::Memory { words } => {
                for canonical in words {
                    self.add_word(canonical)?;
                }
            }

            WordListSourceConfig::File { path } => {
                let contents = fs::read_to_string(path)
                    .map_err(|_| WordListError::InvalidPath(path.to_string_lossy().into()))?;

                for line in contents.lines() {
                    // Tolerate scored word lists by ignoring everything after a semicolon.
                    let canonical = line.split(';').next().unwrap_or("").trim();
                    if canonical.is_empty() {
                        continue;
                    }
                    self.add_word(canonical)?;
                }
            }
        }

        Ok(())
    }

    /// Add a single word to the list, interning its glyphs. Entries above `max_length` are
    /// silently skipped; entries that normalize to an empty string are rejected.
    fn add_word(&mut self, canonical: &str) -> Result<(), WordListError> {
        let normalized = normalize_word(canonical);
        if normalized.is_empty() {
            return Err(WordListError::InvalidWord(canonical.into()));
        }

        let word_length = normalized.chars().count();
        if self.max_length.map_or(false, |max| word_length > max) {
            return Ok(());
        }

        if self.word_id_by_string.contains_key(&normalized) {
            return Ok(());
        }

        let glyphs: SmallVec<[GlyphId; MAX_VAR_LENGTH]> = normalized
            .chars()
            .map(|c| self.glyph_id_for_char(c))
            .collect();

        while self.words.len() < word_length + 1 {
            self.words.push(vec![]);
        }

        let word_id = self.words[word_length].len();

        self.words[word_length].push(Word {
            normalized_string: normalized.clone(),
            canonical_string: canonical.into(),
            glyphs,
        });
        self.word_id_by_string.insert(normalized, word_id);

        Ok(())
    }

    /// What's the unique glyph id for the given char? We do this lazily, instead of just mapping
    /// every letter up front, because word list entries may also contain numbers, non-English
    /// letters, or punctuation.
    pub fn glyph_id_for_char(&mut self, ch: char) -> GlyphId {
        self.glyph_id_by_char.get(&ch).copied().unwrap_or_else(|| {
            self.glyphs.push(ch);
            let id = self.glyphs.len() - 1;
            self.glyph_id_by_char.insert(ch, id);
            id
        })
    }

    /// Borrow an existing word using its global id.
    #[must_use]
    pub fn get_word(&self, global_word_id: GlobalWordId) -> &Word {
        &self.words[global_word_id.0][global_word_id.1]
    }

    /// All loaded words of the given length, as a (possibly empty) bucket.
    #[must_use]
    pub fn words_of_length(&self, length: usize) -> &[Word] {
        self.words.get(length).map_or(&[], Vec::as_slice)
    }

    /// Is the list empty?
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.word_id_by_string.is_empty()
    }
}

impl fmt::Debug for WordList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WordList")
            .field("glyphs", &self.glyphs)
            .field(
                "words",
                &self.words.iter().map(Vec::len).collect::<Vec<_>>(),
            )
            .field("max_length", &self.max_length)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
pub mod tests {
    use crate::word_list::{WordList, WordListError, WordListSourceConfig};

    #[must_use]
    pub fn memory_word_list(words: &[&str]) -> WordList {
        WordList::new(
            vec![WordListSourceConfig::Memory {
                words: words.iter().map(|&word| word.into()).collect(),
            }],
            None,
        )
        .expect("word list should load")
    }

    #[test]
    fn test_buckets_words_by_length() {
        let word_list = memory_word_list(&["CAT", "DOG", "SKATE", "ART"]);

        assert_eq!(
            word_list.words.iter().map(Vec::len).collect::<Vec<_>>(),
            vec![0, 0, 0, 3, 0, 1]
        );

        let &word_id = word_list
            .word_id_by_string
            .get("skate")
            .expect("word list should include 'skate'");
        assert_eq!(word_list.words[5][word_id].normalized_string, "skate");
        assert_eq!(word_list.words[5][word_id].canonical_string, "SKATE");
    }

    #[test]
    fn test_deduplicates_entries() {
        let word_list = memory_word_list(&["cat", "CAT", "Cat"]);

        assert_eq!(word_list.words[3].len(), 1);
    }

    #[test]
    fn test_skips_words_above_max_length() {
        let word_list = WordList::new(
            vec![WordListSourceConfig::Memory {
                words: vec!["cat".into(), "skates".into()],
            }],
            Some(5),
        )
        .expect("word list should load");

        assert!(word_list.word_id_by_string.contains_key("cat"));
        assert!(!word_list.word_id_by_string.contains_key("skates"));
    }

    #[test]
    #[allow(clippy::unicode_not_nfc)]
    fn test_unusual_characters() {
        let word_list = memory_word_list(&[
            // Non-English character expressed as one two-byte `char`
            "monsutâ",
            // Non-English character expressed as two chars w/ combining form
            "hélen",
        ]);

        assert_eq!(
            word_list.words.iter().map(Vec::len).collect::<Vec<_>>(),
            vec![0, 0, 0, 0, 0, 1, 0, 1]
        );
    }

    #[test]
    fn test_rejects_whitespace_only_word() {
        let result = WordList::new(
            vec![WordListSourceConfig::Memory {
                words: vec!["  ".into()],
            }],
            None,
        );

        assert!(matches!(result, Err(WordListError::InvalidWord(_))));
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let result = WordList::new(
            vec![WordListSourceConfig::File {
                path: "/nonexistent/words.txt".into(),
            }],
            None,
        );

        assert!(matches!(result, Err(WordListError::InvalidPath(_))));
    }
}
