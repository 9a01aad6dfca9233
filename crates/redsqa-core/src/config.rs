//! Offense-category configuration.
//!
//! Two static tables drive classification and compatibility checking:
//!
//! - an **ordered** list of category rules (label + trigger keywords) — the
//!   declaration order is the classification priority, so overlapping
//!   keywords resolve the same way on every run and in every implementation;
//! - a code table mapping declared legal codes (e.g. `C01155`) to category
//!   labels.
//!
//! Keywords are stored in normalized form (lowercase, diacritics folded) so
//! matching never depends on source-data accent hygiene.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::normalize;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("category configuration not found: {0}")]
    Missing(std::path::PathBuf),

    #[error("category configuration unreadable: {0}")]
    Io(#[from] std::io::Error),

    #[error("category configuration invalid: {0}")]
    Invalid(String),
}

/// One offense category: label plus the keywords that trigger it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryRule {
    pub label: String,
    pub keywords: Vec<String>,
}

/// Ordered category rules plus the declared-code table.
///
/// Rule order is classification priority: the first rule whose keywords hit
/// wins. Invariant: every label referenced by `code_table` has a rule.
/// Deserialization funnels through [`CategoryConfig::new`], so a config
/// obtained from JSON carries the same normalization and invariants as one
/// built in code.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "RawCategoryConfig")]
pub struct CategoryConfig {
    rules: Vec<CategoryRule>,
    code_table: BTreeMap<String, String>,
}

/// Wire shape of [`CategoryConfig`] before validation.
#[derive(Deserialize)]
struct RawCategoryConfig {
    rules: Vec<CategoryRule>,
    code_table: BTreeMap<String, String>,
}

impl TryFrom<RawCategoryConfig> for CategoryConfig {
    type Error = ConfigError;

    fn try_from(raw: RawCategoryConfig) -> Result<Self, Self::Error> {
        Self::new(raw.rules, raw.code_table)
    }
}

impl CategoryConfig {
    /// Build a config from explicit parts, normalizing keywords and checking
    /// the code-table invariant.
    pub fn new(
        rules: Vec<CategoryRule>,
        code_table: BTreeMap<String, String>,
    ) -> Result<Self, ConfigError> {
        if rules.is_empty() {
            return Err(ConfigError::Invalid("no category rules defined".into()));
        }

        let rules: Vec<CategoryRule> = rules
            .into_iter()
            .map(|r| CategoryRule {
                label: r.label.trim().to_uppercase(),
                keywords: r.keywords.iter().map(|k| normalize::normalize(k)).collect(),
            })
            .collect();

        for (code, label) in &code_table {
            if !rules.iter().any(|r| r.label == label.to_uppercase()) {
                return Err(ConfigError::Invalid(format!(
                    "code {code} maps to unknown category {label}"
                )));
            }
        }

        let code_table = code_table
            .into_iter()
            .map(|(c, l)| (c.to_uppercase(), l.to_uppercase()))
            .collect();

        Ok(Self { rules, code_table })
    }

    /// Load from a JSON file. A missing file is a distinct error from an
    /// unreadable or invalid one.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::Missing(path.to_path_buf()));
        }
        let text = std::fs::read_to_string(path)?;
        serde_json::from_str(&text).map_err(|e| ConfigError::Invalid(e.to_string()))
    }

    /// The built-in configuration for the REDS offense categories.
    ///
    /// Priority order is ROUBO, FURTO, AMEAÇA: violence keywords dominate
    /// when a narrative triggers more than one category. ROUBO deliberately
    /// uses qualified violence phrases ("com violência", "mediante
    /// violência") rather than the bare noun, so FURTO's defining phrase
    /// "sem violência" never triggers it.
    pub fn builtin() -> Self {
        let rules = vec![
            CategoryRule {
                label: "ROUBO".into(),
                keywords: vec![
                    "roubou".into(),
                    "roubo".into(),
                    "assalto".into(),
                    "com violência".into(),
                    "mediante violência".into(),
                    "grave ameaça".into(),
                    "força".into(),
                    "coação".into(),
                    "arma".into(),
                ],
            },
            CategoryRule {
                label: "FURTO".into(),
                keywords: vec![
                    "furtou".into(),
                    "furto".into(),
                    "subtraiu".into(),
                    "subtrair".into(),
                    "subtração".into(),
                    "levou".into(),
                    "apropriou-se".into(),
                    "sem violência".into(),
                    "ausência de grave ameaça".into(),
                ],
            },
            CategoryRule {
                label: "AMEAÇA".into(),
                keywords: vec![
                    "ameaçou".into(),
                    "intimidou".into(),
                    "disse que ia".into(),
                    "prometeu".into(),
                ],
            },
        ];

        let code_table = BTreeMap::from([
            ("C01155".to_string(), "FURTO".to_string()),
            ("C01157".to_string(), "ROUBO".to_string()),
        ]);

        Self::new(rules, code_table).expect("builtin configuration is valid")
    }

    /// Rules in priority order.
    pub fn rules(&self) -> &[CategoryRule] {
        &self.rules
    }

    /// Resolve a declared code to its category label.
    pub fn category_for_code(&self, code: &str) -> Option<&str> {
        self.code_table.get(&code.to_uppercase()).map(String::as_str)
    }

    /// Keywords for a category label, if the label is configured.
    pub fn keywords_for(&self, label: &str) -> Option<&[String]> {
        let label = label.to_uppercase();
        self.rules
            .iter()
            .find(|r| r.label == label)
            .map(|r| r.keywords.as_slice())
    }
}
