//! Dictionary-backed spelling check for incident narratives.
//!
//! The dictionary is a word-frequency list (one `word frequency` pair per
//! line; frequency defaults to 1 when absent). For each narrative token not
//! in the dictionary, the best correction is the dictionary word within edit
//! distance 2: minimal distance first, then highest frequency, then
//! lexicographic order so results are deterministic.
//!
//! Token policy: tokens that are empty or contain any non-alphabetic
//! character (digits, glued punctuation like "vítima,") are skipped, not
//! flagged — the source data is full of times, addresses, and codes that a
//! word dictionary has no business correcting.

use std::collections::BTreeMap;
use std::path::Path;

use tracing::debug;

use redsqa_core::normalize;

use crate::EngineError;

/// Misspelled token → suggested correction. `None` means the token is out of
/// vocabulary but no dictionary word is within edit distance.
pub type SpellingErrorMap = BTreeMap<String, Option<String>>;

/// Candidates farther than this edit distance are never suggested.
const MAX_EDIT_DISTANCE: usize = 2;

/// Word-frequency dictionary with edit-distance correction lookup.
#[derive(Debug)]
pub struct SpellChecker {
    frequencies: BTreeMap<String, u64>,
}

impl SpellChecker {
    /// Load a dictionary file. A missing file is a configuration error, never
    /// an empty checker.
    pub fn load(path: &Path) -> Result<Self, EngineError> {
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(EngineError::DictionaryMissing(path.to_path_buf()));
            }
            Err(e) => return Err(e.into()),
        };

        let checker = Self::from_lines(text.lines());
        debug!(words = checker.frequencies.len(), "loaded spelling dictionary");
        Ok(checker)
    }

    /// Build from `word [frequency]` lines. Blank lines and `#` comments are
    /// ignored; repeated words keep the highest frequency.
    pub fn from_lines<'a>(lines: impl Iterator<Item = &'a str>) -> Self {
        let mut frequencies = BTreeMap::new();
        for line in lines {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let mut parts = line.split_whitespace();
            let Some(word) = parts.next() else { continue };
            let freq = parts.next().and_then(|f| f.parse().ok()).unwrap_or(1u64);
            let entry = frequencies.entry(word.to_lowercase()).or_insert(0);
            *entry = (*entry).max(freq);
        }
        Self { frequencies }
    }

    pub fn word_count(&self) -> usize {
        self.frequencies.len()
    }

    /// Whether a (case-folded) word is in the dictionary.
    pub fn contains(&self, word: &str) -> bool {
        self.frequencies.contains_key(word)
    }

    /// Check a narrative, returning every out-of-vocabulary token with its
    /// suggested correction. Empty narrative yields an empty map.
    pub fn check(&self, narrative: &str) -> SpellingErrorMap {
        let mut errors = SpellingErrorMap::new();
        for token in normalize::case_fold(narrative).split_whitespace() {
            if !normalize::is_alphabetic_token(token) {
                continue; // numbers / glued punctuation: skipped by policy
            }
            if self.contains(token) || errors.contains_key(token) {
                continue;
            }
            errors.insert(token.to_owned(), self.correction(token));
        }
        errors
    }

    /// Best correction for an out-of-vocabulary word, or `None` when nothing
    /// is within [`MAX_EDIT_DISTANCE`].
    pub fn correction(&self, word: &str) -> Option<String> {
        let word_len = word.chars().count();
        let mut best: Option<(usize, u64, &str)> = None;

        for (candidate, &freq) in &self.frequencies {
            // Length difference is a lower bound on edit distance.
            let cand_len = candidate.chars().count();
            if word_len.abs_diff(cand_len) > MAX_EDIT_DISTANCE {
                continue;
            }
            let distance = strsim::levenshtein(word, candidate);
            if distance > MAX_EDIT_DISTANCE {
                continue;
            }
            let better = match &best {
                None => true,
                Some((d, f, w)) => {
                    distance < *d
                        || (distance == *d && freq > *f)
                        || (distance == *d && freq == *f && candidate.as_str() < *w)
                }
            };
            if better {
                best = Some((distance, freq, candidate));
            }
        }

        best.map(|(_, _, w)| w.to_owned())
    }
}
