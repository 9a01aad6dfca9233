//! Per-record orchestration: normalizer, spelling, one classification
//! strategy, and the two compatibility signals, merged into one outcome.

use serde::Serialize;
use tracing::{info, warn};

use redsqa_core::{CategoryConfig, IncidentRecord, RawRecord};

use crate::compat::{CompatChecker, CompatibilityVerdict};
use crate::model::StatClassifier;
use crate::rules::{
    ClassificationOutcome, ContextClassifier, DeclaredCheck, RuleClassifier, Strategy,
    declared_keyword_check,
};
use crate::spelling::{SpellChecker, SpellingErrorMap};
use crate::EngineError;

/// Everything computed for one record.
#[derive(Debug, Clone, Serialize)]
pub struct RecordAnalysis {
    pub record: IncidentRecord,
    pub spelling: SpellingErrorMap,
    pub classification: ClassificationOutcome,
    pub compatibility: CompatibilityVerdict,
    pub declared_check: DeclaredCheck,
}

/// A row that could not be analyzed; the rest of the batch proceeds.
#[derive(Debug, Clone, Serialize)]
pub struct SkippedRecord {
    pub index: usize,
    pub reason: String,
}

/// Batch outcome: per-record analyses plus skipped-row diagnostics.
#[derive(Debug, Serialize)]
pub struct BatchReport {
    pub analyses: Vec<RecordAnalysis>,
    pub skipped: Vec<SkippedRecord>,
}

/// The assembled analysis engine. All held resources are read-only after
/// construction; records are processed one at a time.
pub struct AnalysisEngine {
    config: CategoryConfig,
    speller: SpellChecker,
    checker: CompatChecker,
    strategy: Strategy,
    statistical: Option<StatClassifier>,
}

impl AnalysisEngine {
    pub fn new(
        config: CategoryConfig,
        speller: SpellChecker,
        checker: CompatChecker,
        strategy: Strategy,
    ) -> Self {
        Self {
            config,
            speller,
            checker,
            strategy,
            statistical: None,
        }
    }

    /// Attach a statistical classifier so [`Strategy::Statistical`] can be
    /// selected.
    pub fn with_statistical(mut self, classifier: StatClassifier) -> Self {
        self.statistical = Some(classifier);
        self
    }

    pub fn config(&self) -> &CategoryConfig {
        &self.config
    }

    /// Classify one narrative with the selected strategy. Strategies never
    /// fall back to one another.
    pub fn classify(&self, narrative: &str) -> Result<ClassificationOutcome, EngineError> {
        match self.strategy {
            Strategy::Rules => Ok(RuleClassifier::new(&self.config).classify(narrative)),
            Strategy::Context => Ok(ContextClassifier::new(&self.config).classify(narrative)),
            Strategy::Statistical => match &self.statistical {
                Some(clf) => clf.classify(narrative),
                None => Err(EngineError::ConfigInvalid(
                    "statistical strategy selected but no model store configured".into(),
                )),
            },
        }
    }

    /// Full analysis of one validated record.
    pub fn analyze(&self, record: &IncidentRecord) -> Result<RecordAnalysis, EngineError> {
        let spelling = self.speller.check(&record.narrative);
        let classification = self.classify(&record.narrative)?;
        let compatibility =
            self.checker
                .check(&self.config, &record.narrative, &record.declared_code);
        let declared_check =
            declared_keyword_check(&self.config, &record.narrative, &record.declared_code);

        Ok(RecordAnalysis {
            record: record.clone(),
            spelling,
            classification,
            compatibility,
            declared_check,
        })
    }

    /// Analyze a batch of raw rows. Malformed rows — rows the ingestion layer
    /// could not parse (passed as `Err` with the parse reason) and rows with
    /// a missing id — are flagged and skipped; one bad row never aborts the
    /// batch. Configuration-level failures (e.g. statistical strategy without
    /// a trained model) abort, since every remaining row would fail the same
    /// way.
    pub fn analyze_batch(
        &self,
        rows: Vec<Result<RawRecord, String>>,
    ) -> Result<BatchReport, EngineError> {
        let mut analyses = Vec::with_capacity(rows.len());
        let mut skipped = Vec::new();

        for (index, row) in rows.into_iter().enumerate() {
            let raw = match row {
                Ok(raw) => raw,
                Err(reason) => {
                    warn!(index, %reason, "skipping unparseable record");
                    skipped.push(SkippedRecord { index, reason });
                    continue;
                }
            };
            match IncidentRecord::from_raw(raw) {
                Ok(record) => analyses.push(self.analyze(&record)?),
                Err(e) => {
                    warn!(index, error = %e, "skipping malformed record");
                    skipped.push(SkippedRecord {
                        index,
                        reason: e.to_string(),
                    });
                }
            }
        }

        info!(
            analyzed = analyses.len(),
            skipped = skipped.len(),
            "batch analysis complete"
        );
        Ok(BatchReport { analyses, skipped })
    }
}
