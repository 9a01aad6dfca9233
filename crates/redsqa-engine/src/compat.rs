//! Reference-corpus compatibility checking.
//!
//! Decides whether a declared legal code is textually supported by a
//! reference legal-code document. Two steps:
//!
//! 1. resolve the declared code to its category and require the category's
//!    text to occur in the corpus at all — otherwise `CodeNotFound`;
//! 2. fuzzy similarity between the narrative and the corpus against a
//!    cutoff — `Compatible` at or above, `Incompatible` below.
//!
//! Comparing a short narrative against an entire statute is intentionally
//! coarse; it yields a best-effort signal, not legal interpretation. Both
//! the cutoff and the comparison granularity (whole document vs. best
//! paragraph) are exposed in [`CompatConfig`].

use std::path::Path;

use serde::Serialize;
use tracing::debug;

use redsqa_core::CategoryConfig;
use redsqa_core::normalize;

use crate::EngineError;

/// Default similarity cutoff, matching the original screening tool.
pub const DEFAULT_CUTOFF: f64 = 0.6;

/// Comparison granularity for the fuzzy similarity step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Granularity {
    /// One similarity score against the whole corpus text.
    #[default]
    WholeDocument,
    /// Maximum similarity over corpus paragraphs.
    Paragraph,
}

/// Tunables for the compatibility check.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct CompatConfig {
    pub cutoff: f64,
    pub granularity: Granularity,
}

impl Default for CompatConfig {
    fn default() -> Self {
        Self {
            cutoff: DEFAULT_CUTOFF,
            granularity: Granularity::default(),
        }
    }
}

/// Per-record compatibility verdict.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "verdict", content = "code")]
pub enum CompatibilityVerdict {
    Compatible(String),
    Incompatible(String),
    CodeNotFound(String),
}

/// Reference legal-code text, loaded once and read-only afterwards.
///
/// Holds the normalized full text plus a paragraph split (blank-line
/// delimited) for [`Granularity::Paragraph`]. Construction from the same
/// source is deterministic, and the type is freely shareable across threads.
pub struct ReferenceCorpus {
    text: String,
    paragraphs: Vec<String>,
}

impl ReferenceCorpus {
    /// Build from already-extracted flat text (the source document format is
    /// the ingestion collaborator's concern).
    pub fn from_text(raw: &str) -> Self {
        let text = normalize::normalize(raw);
        let paragraphs: Vec<String> = text
            .split("\n\n")
            .map(|p| p.split_whitespace().collect::<Vec<_>>().join(" "))
            .filter(|p| !p.is_empty())
            .collect();
        Self { text, paragraphs }
    }

    /// Load from a text file. A missing file is a configuration error.
    pub fn load(path: &Path) -> Result<Self, EngineError> {
        match std::fs::read_to_string(path) {
            Ok(raw) => {
                let corpus = Self::from_text(&raw);
                debug!(
                    chars = corpus.text.len(),
                    paragraphs = corpus.paragraphs.len(),
                    "loaded reference corpus"
                );
                Ok(corpus)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(EngineError::CorpusMissing(path.to_path_buf()))
            }
            Err(e) => Err(e.into()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Whether the normalized corpus contains the given text.
    pub fn contains(&self, needle: &str) -> bool {
        !needle.is_empty() && self.text.contains(&normalize::normalize(needle))
    }
}

/// Fuzzy compatibility checker over one reference corpus.
pub struct CompatChecker {
    corpus: ReferenceCorpus,
    config: CompatConfig,
}

impl CompatChecker {
    pub fn new(corpus: ReferenceCorpus, config: CompatConfig) -> Self {
        Self { corpus, config }
    }

    pub fn config(&self) -> CompatConfig {
        self.config
    }

    /// Similarity between a narrative and the corpus under the configured
    /// granularity. Sørensen–Dice over character bigrams, in `[0, 1]`.
    pub fn similarity(&self, narrative: &str) -> f64 {
        let text = normalize::normalize(narrative);
        match self.config.granularity {
            Granularity::WholeDocument => strsim::sorensen_dice(&text, &self.corpus.text),
            Granularity::Paragraph => self
                .corpus
                .paragraphs
                .iter()
                .map(|p| strsim::sorensen_dice(&text, p))
                .fold(0.0, f64::max),
        }
    }

    /// Check a declared code against the narrative and the corpus.
    pub fn check(
        &self,
        categories: &CategoryConfig,
        narrative: &str,
        declared_code: &str,
    ) -> CompatibilityVerdict {
        let code = declared_code.to_uppercase();

        let Some(category) = categories.category_for_code(&code) else {
            return CompatibilityVerdict::CodeNotFound(code);
        };
        if !self.corpus.contains(category) {
            return CompatibilityVerdict::CodeNotFound(code);
        }

        let similarity = self.similarity(narrative);
        debug!(code = %code, similarity, cutoff = self.config.cutoff, "compatibility check");
        if similarity >= self.config.cutoff {
            CompatibilityVerdict::Compatible(code)
        } else {
            CompatibilityVerdict::Incompatible(code)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CORPUS: &str = "\
Art. 155 - FURTO. Subtrair, para si ou para outrem, coisa alheia móvel, \
sem violência e com ausência de grave ameaça à pessoa.

Art. 157 - ROUBO. Subtrair coisa móvel alheia, para si ou para outrem, \
mediante grave ameaça ou violência a pessoa.";

    fn checker(config: CompatConfig) -> CompatChecker {
        CompatChecker::new(ReferenceCorpus::from_text(CORPUS), config)
    }

    #[test]
    fn unknown_code_is_code_not_found() {
        let verdict = checker(CompatConfig::default()).check(
            &CategoryConfig::builtin(),
            "subtraiu sem violência",
            "C99999",
        );
        assert_eq!(
            verdict,
            CompatibilityVerdict::CodeNotFound("C99999".into())
        );
    }

    #[test]
    fn category_text_absent_from_corpus_is_code_not_found() {
        let empty = CompatChecker::new(
            ReferenceCorpus::from_text("texto sem as naturezas esperadas"),
            CompatConfig::default(),
        );
        let verdict = empty.check(&CategoryConfig::builtin(), "subtraiu", "C01155");
        assert_eq!(
            verdict,
            CompatibilityVerdict::CodeNotFound("C01155".into())
        );
    }

    #[test]
    fn matching_narrative_is_compatible_at_paragraph_granularity() {
        let cfg = CompatConfig {
            cutoff: DEFAULT_CUTOFF,
            granularity: Granularity::Paragraph,
        };
        let narrative =
            "Subtrair para si coisa alheia móvel, sem violência e com ausência de grave ameaça";
        let verdict = checker(cfg).check(&CategoryConfig::builtin(), narrative, "C01155");
        assert_eq!(
            verdict,
            CompatibilityVerdict::Compatible("C01155".into())
        );
    }

    #[test]
    fn unrelated_narrative_is_incompatible() {
        let verdict = checker(CompatConfig::default()).check(
            &CategoryConfig::builtin(),
            "briga de vizinhos por causa de som alto",
            "C01155",
        );
        assert_eq!(
            verdict,
            CompatibilityVerdict::Incompatible("C01155".into())
        );
    }

    #[test]
    fn lowering_cutoff_never_turns_compatible_into_incompatible() {
        let narrative = "subtraiu coisa alheia móvel sem violência";
        let sim = checker(CompatConfig::default()).similarity(narrative);
        let cats = CategoryConfig::builtin();

        let mut cutoff = 1.0;
        let mut seen_compatible = false;
        while cutoff >= 0.0 {
            let verdict = checker(CompatConfig {
                cutoff,
                granularity: Granularity::WholeDocument,
            })
            .check(&cats, narrative, "C01155");
            let compatible = verdict == CompatibilityVerdict::Compatible("C01155".into());
            assert!(
                !seen_compatible || compatible,
                "lowering cutoff below {cutoff} (similarity {sim}) flipped back to incompatible"
            );
            seen_compatible |= compatible;
            cutoff -= 0.05;
        }
        assert!(seen_compatible, "cutoff 0.0 must be compatible");
    }

    #[test]
    fn paragraph_granularity_beats_whole_document_for_local_matches() {
        let narrative =
            "Subtrair coisa móvel alheia, para si ou para outrem, mediante grave ameaça ou violência a pessoa";
        let whole = checker(CompatConfig {
            cutoff: DEFAULT_CUTOFF,
            granularity: Granularity::WholeDocument,
        })
        .similarity(narrative);
        let para = checker(CompatConfig {
            cutoff: DEFAULT_CUTOFF,
            granularity: Granularity::Paragraph,
        })
        .similarity(narrative);
        assert!(
            para > whole,
            "paragraph max ({para}) should exceed whole-document ({whole})"
        );
    }

    #[test]
    fn similarity_is_deterministic() {
        let c = checker(CompatConfig::default());
        assert_eq!(c.similarity("subtraiu a bolsa"), c.similarity("subtraiu a bolsa"));
    }
}
