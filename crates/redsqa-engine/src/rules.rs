//! Keyword-driven classification strategies.
//!
//! Two interchangeable strategies over the same [`CategoryConfig`]:
//!
//! - [`RuleClassifier`] — substring match against the normalized narrative;
//! - [`ContextClassifier`] — exact token match against the tokenized
//!   narrative (multi-word keywords match as consecutive token runs).
//!
//! The semantics differ subtly: a keyword that only ever occurs inside a
//! longer word ("arma" inside "armário") matches under substring rules but
//! not under token membership. Callers pick one strategy explicitly; there is
//! no fallback from one to the other.
//!
//! Both walk categories in the config's declared priority order and return
//! the first hit, so overlapping keyword sets resolve deterministically.
//! Both are total: any input, including the empty string, produces either a
//! configured category or the unidentified sentinel.

use serde::{Deserialize, Serialize};

use redsqa_core::CategoryConfig;
use redsqa_core::normalize;

/// Which classification strategy produced an outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    Rules,
    Context,
    Statistical,
}

/// Result of classifying one narrative.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClassificationOutcome {
    /// Configured category label, or `None` for the unidentified sentinel.
    pub category: Option<String>,
    pub strategy: Strategy,
    /// Keywords of the winning category found in the narrative. Empty for
    /// the statistical strategy.
    pub evidence: Vec<String>,
}

impl ClassificationOutcome {
    /// Display label for the unidentified sentinel.
    pub const UNIDENTIFIED: &'static str = "não identificado";

    pub fn unidentified(strategy: Strategy) -> Self {
        Self {
            category: None,
            strategy,
            evidence: Vec::new(),
        }
    }

    pub fn label(&self) -> &str {
        self.category.as_deref().unwrap_or(Self::UNIDENTIFIED)
    }
}

/// Substring matcher over the normalized narrative.
pub struct RuleClassifier<'a> {
    config: &'a CategoryConfig,
}

impl<'a> RuleClassifier<'a> {
    pub fn new(config: &'a CategoryConfig) -> Self {
        Self { config }
    }

    pub fn classify(&self, narrative: &str) -> ClassificationOutcome {
        let text = normalize::normalize(narrative);
        for rule in self.config.rules() {
            let evidence: Vec<String> = rule
                .keywords
                .iter()
                .filter(|k| !k.is_empty() && text.contains(k.as_str()))
                .cloned()
                .collect();
            if !evidence.is_empty() {
                return ClassificationOutcome {
                    category: Some(rule.label.clone()),
                    strategy: Strategy::Rules,
                    evidence,
                };
            }
        }
        ClassificationOutcome::unidentified(Strategy::Rules)
    }
}

/// Token-membership matcher over the tokenized narrative.
pub struct ContextClassifier<'a> {
    config: &'a CategoryConfig,
}

impl<'a> ContextClassifier<'a> {
    pub fn new(config: &'a CategoryConfig) -> Self {
        Self { config }
    }

    pub fn classify(&self, narrative: &str) -> ClassificationOutcome {
        let tokens = normalize::tokenize(narrative);
        for rule in self.config.rules() {
            let evidence: Vec<String> = rule
                .keywords
                .iter()
                .filter(|k| keyword_in_tokens(k, &tokens))
                .cloned()
                .collect();
            if !evidence.is_empty() {
                return ClassificationOutcome {
                    category: Some(rule.label.clone()),
                    strategy: Strategy::Context,
                    evidence,
                };
            }
        }
        ClassificationOutcome::unidentified(Strategy::Context)
    }
}

/// Whether a (possibly multi-word) keyword occurs as a consecutive token run.
fn keyword_in_tokens(keyword: &str, tokens: &[String]) -> bool {
    let kw_tokens: Vec<&str> = keyword.split_whitespace().collect();
    if kw_tokens.is_empty() || kw_tokens.len() > tokens.len() {
        return false;
    }
    tokens
        .windows(kw_tokens.len())
        .any(|w| w.iter().zip(&kw_tokens).all(|(t, k)| t.as_str() == *k))
}

/// Keyword audit of the *declared* classification: which of the declared
/// category's keywords actually appear in the narrative.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeclaredCheck {
    pub declared_code: String,
    /// Category the declared code maps to; `None` when the code is unmapped.
    pub category: Option<String>,
    /// Declared category's keywords found in the narrative.
    pub matched: Vec<String>,
}

impl DeclaredCheck {
    pub fn is_compatible(&self) -> bool {
        self.category.is_some() && !self.matched.is_empty()
    }

    /// Human-readable verdict line, the form reviewers judge and the
    /// feedback store snapshots.
    pub fn summary(&self) -> String {
        match (&self.category, self.matched.is_empty()) {
            (None, _) => format!(
                "código {} não encontrado no mapeamento",
                self.declared_code
            ),
            (Some(cat), false) => {
                format!("compatível com {cat}: {}", self.matched.join(", "))
            }
            (Some(cat), true) => {
                format!("incompatível com {cat}: nenhuma palavra-chave encontrada")
            }
        }
    }
}

/// Run the declared-code keyword audit for one narrative.
pub fn declared_keyword_check(
    config: &CategoryConfig,
    narrative: &str,
    declared_code: &str,
) -> DeclaredCheck {
    let Some(category) = config.category_for_code(declared_code) else {
        return DeclaredCheck {
            declared_code: declared_code.to_owned(),
            category: None,
            matched: Vec::new(),
        };
    };

    let text = normalize::normalize(narrative);
    let matched = config
        .keywords_for(category)
        .unwrap_or_default()
        .iter()
        .filter(|k| !k.is_empty() && text.contains(k.as_str()))
        .cloned()
        .collect();

    DeclaredCheck {
        declared_code: declared_code.to_owned(),
        category: Some(category.to_owned()),
        matched,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> CategoryConfig {
        CategoryConfig::builtin()
    }

    #[test]
    fn rules_classify_furto_narrative() {
        let cfg = config();
        let outcome = RuleClassifier::new(&cfg).classify("SUBTRAIU SEM VIOLENCIA");
        assert_eq!(outcome.category.as_deref(), Some("FURTO"));
        assert_eq!(outcome.strategy, Strategy::Rules);
        assert!(outcome.evidence.contains(&"subtraiu".to_string()));
        assert!(outcome.evidence.contains(&"sem violencia".to_string()));
    }

    #[test]
    fn violence_keywords_dominate() {
        let cfg = config();
        let outcome = RuleClassifier::new(&cfg).classify("COM VIOLENCIA E GRAVE AMEACA");
        assert_eq!(outcome.category.as_deref(), Some("ROUBO"));
    }

    #[test]
    fn empty_narrative_is_unidentified() {
        let cfg = config();
        assert_eq!(RuleClassifier::new(&cfg).classify("").category, None);
        assert_eq!(ContextClassifier::new(&cfg).classify("").category, None);
    }

    #[test]
    fn rules_are_deterministic() {
        let cfg = config();
        let clf = RuleClassifier::new(&cfg);
        let narrative = "ameaçou a vítima com arma durante o furto";
        let first = clf.classify(narrative);
        for _ in 0..10 {
            assert_eq!(clf.classify(narrative), first);
        }
    }

    #[test]
    fn overlapping_keywords_resolve_by_priority() {
        // "ameaçou" belongs to AMEAÇA, but "arma" puts the narrative in
        // ROUBO, which is declared first.
        let cfg = config();
        let outcome = RuleClassifier::new(&cfg).classify("ameaçou com arma");
        assert_eq!(outcome.category.as_deref(), Some("ROUBO"));
    }

    #[test]
    fn substring_and_token_semantics_differ() {
        let cfg = config();
        // "arma" is a substring of "armário" but not one of its tokens.
        let narrative = "levaram o armário";
        let by_rules = RuleClassifier::new(&cfg).classify(narrative);
        let by_context = ContextClassifier::new(&cfg).classify(narrative);
        assert_eq!(by_rules.category.as_deref(), Some("ROUBO"));
        assert_ne!(by_context.category.as_deref(), Some("ROUBO"));
    }

    #[test]
    fn context_matches_multi_word_keywords_as_token_runs() {
        let cfg = config();
        let outcome = ContextClassifier::new(&cfg).classify("agiu sem violência alguma");
        assert_eq!(outcome.category.as_deref(), Some("FURTO"));
        assert_eq!(outcome.evidence, vec!["sem violencia".to_string()]);
    }

    #[test]
    fn declared_check_compatible() {
        let check = declared_keyword_check(&config(), "SUBTRAIU SEM VIOLENCIA", "C01155");
        assert_eq!(check.category.as_deref(), Some("FURTO"));
        assert!(check.is_compatible());
        assert!(check.summary().starts_with("compatível com FURTO"));
    }

    #[test]
    fn declared_check_incompatible() {
        let check = declared_keyword_check(&config(), "COM VIOLENCIA E GRAVE AMEACA", "C01155");
        assert_eq!(check.category.as_deref(), Some("FURTO"));
        assert!(!check.is_compatible());
        assert!(check.matched.is_empty());
    }

    #[test]
    fn declared_check_unknown_code() {
        let check = declared_keyword_check(&config(), "qualquer texto", "C99999");
        assert_eq!(check.category, None);
        assert!(!check.is_compatible());
        assert!(check.summary().contains("não encontrado"));
    }
}
