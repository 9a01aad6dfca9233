//! Statistical classification: TF-IDF vectors and nearest-centroid labels.
//!
//! Training vectorizes a labeled corpus with smoothed TF-IDF over content
//! tokens, computes one L2-normalized centroid per label, and persists the
//! fitted vectorizer plus centroids as a single JSON artifact written
//! atomically (temp file then rename) — a partially written model is never
//! loadable. Classification vectorizes a narrative with the persisted
//! vectorizer (unseen vocabulary contributes zero weight, never an error)
//! and returns the nearest centroid by cosine similarity.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use redsqa_core::normalize;

use crate::rules::{ClassificationOutcome, Strategy};
use crate::EngineError;

/// Fitted TF-IDF vectorizer: vocabulary indices plus per-term IDF weights.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TfidfVectorizer {
    vocabulary: BTreeMap<String, usize>,
    idf: Vec<f64>,
}

impl TfidfVectorizer {
    /// Fit vocabulary and smoothed IDF over tokenized documents.
    fn fit(docs: &[Vec<String>]) -> Self {
        let mut vocabulary = BTreeMap::new();
        for doc in docs {
            for token in doc {
                let next = vocabulary.len();
                vocabulary.entry(token.clone()).or_insert(next);
            }
        }

        // Document frequency per term.
        let mut df = vec![0usize; vocabulary.len()];
        for doc in docs {
            let mut seen = vec![false; vocabulary.len()];
            for token in doc {
                let idx = vocabulary[token];
                if !seen[idx] {
                    seen[idx] = true;
                    df[idx] += 1;
                }
            }
        }

        // Smoothed IDF: ln((1 + n) / (1 + df)) + 1.
        let n = docs.len() as f64;
        let idf = df
            .iter()
            .map(|&d| ((1.0 + n) / (1.0 + d as f64)).ln() + 1.0)
            .collect();

        Self { vocabulary, idf }
    }

    pub fn vocabulary_len(&self) -> usize {
        self.vocabulary.len()
    }

    /// TF-IDF vector for a narrative, L2-normalized. Terms outside the
    /// fitted vocabulary are ignored; a narrative with no known terms
    /// vectorizes to the zero vector.
    pub fn transform(&self, text: &str) -> Vec<f64> {
        let mut vec = vec![0.0f64; self.vocabulary.len()];
        for token in normalize::content_tokens(text) {
            if let Some(&idx) = self.vocabulary.get(&token) {
                vec[idx] += self.idf[idx];
            }
        }
        l2_normalize(&mut vec);
        vec
    }
}

/// L2-normalize in place; the zero vector stays zero.
fn l2_normalize(v: &mut [f64]) {
    let norm: f64 = v.iter().map(|x| x * x).sum::<f64>().sqrt();
    if norm > 0.0 {
        for x in v.iter_mut() {
            *x /= norm;
        }
    }
}

/// Fitted vectorizer plus per-label centroids — the persisted artifact.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainedModel {
    vectorizer: TfidfVectorizer,
    centroids: BTreeMap<String, Vec<f64>>,
}

/// Counts reported after training.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct TrainingSummary {
    pub samples: usize,
    pub labels: usize,
    pub vocabulary: usize,
}

impl TrainedModel {
    /// Train over `(text, label)` pairs.
    pub fn train(samples: &[(String, String)]) -> Result<(Self, TrainingSummary), EngineError> {
        if samples.is_empty() {
            return Err(EngineError::EmptyTrainingSet);
        }

        let docs: Vec<Vec<String>> = samples
            .iter()
            .map(|(text, _)| normalize::content_tokens(text))
            .collect();
        let vectorizer = TfidfVectorizer::fit(&docs);

        // label → (sum vector, member count), then mean + normalize.
        let mut accum: BTreeMap<String, (Vec<f64>, usize)> = BTreeMap::new();
        for (text, label) in samples {
            let v = vectorizer.transform(text);
            let entry = accum
                .entry(label.trim().to_uppercase())
                .or_insert_with(|| (vec![0.0; vectorizer.vocabulary_len()], 0));
            for (acc, val) in entry.0.iter_mut().zip(&v) {
                *acc += val;
            }
            entry.1 += 1;
        }

        let mut centroids = BTreeMap::new();
        for (label, (mut sum, count)) in accum {
            if count > 0 {
                for v in &mut sum {
                    *v /= count as f64;
                }
                l2_normalize(&mut sum);
                centroids.insert(label, sum);
            }
        }

        let summary = TrainingSummary {
            samples: samples.len(),
            labels: centroids.len(),
            vocabulary: vectorizer.vocabulary_len(),
        };

        Ok((
            Self {
                vectorizer,
                centroids,
            },
            summary,
        ))
    }

    pub fn label_count(&self) -> usize {
        self.centroids.len()
    }

    /// Classify a narrative by nearest centroid. A narrative with no known
    /// vocabulary is unidentified, not an error.
    pub fn classify(&self, narrative: &str) -> ClassificationOutcome {
        let v = self.vectorizer.transform(narrative);
        if v.iter().all(|&x| x == 0.0) {
            return ClassificationOutcome::unidentified(Strategy::Statistical);
        }

        let mut best: Option<(&str, f64)> = None;
        for (label, centroid) in &self.centroids {
            let sim: f64 = v.iter().zip(centroid).map(|(a, b)| a * b).sum();
            if best.is_none_or(|(_, s)| sim > s) {
                best = Some((label, sim));
            }
        }

        match best {
            Some((label, sim)) if sim > 0.0 => {
                debug!(label, similarity = sim, "statistical classification");
                ClassificationOutcome {
                    category: Some(label.to_owned()),
                    strategy: Strategy::Statistical,
                    evidence: Vec::new(),
                }
            }
            _ => ClassificationOutcome::unidentified(Strategy::Statistical),
        }
    }
}

/// Durable storage for the trained-model artifact.
///
/// Absence of the artifact is a valid, recoverable state
/// ([`EngineError::ModelNotTrained`]); an unparseable artifact is
/// [`EngineError::CorruptModel`] so callers can tell "not yet trained"
/// from "trained but broken".
pub struct ModelStore {
    path: PathBuf,
}

impl ModelStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Persist atomically: write to a temp file in the target directory,
    /// then rename over the destination.
    pub fn save(&self, model: &TrainedModel) -> Result<(), EngineError> {
        let dir = self
            .path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or(Path::new("."));
        let json = serde_json::to_vec(model).map_err(std::io::Error::other)?;

        let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
        std::io::Write::write_all(&mut tmp, &json)?;
        tmp.persist(&self.path).map_err(|e| e.error)?;

        info!(path = %self.path.display(), labels = model.label_count(), "saved trained model");
        Ok(())
    }

    pub fn load(&self) -> Result<TrainedModel, EngineError> {
        let bytes = match std::fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(EngineError::ModelNotTrained(self.path.clone()));
            }
            Err(e) => return Err(e.into()),
        };
        serde_json::from_slice(&bytes).map_err(|e| EngineError::CorruptModel {
            path: self.path.clone(),
            reason: e.to_string(),
        })
    }
}

/// Statistical classification strategy over a persisted model.
///
/// The model is loaded lazily on the first classification request and cached
/// for the process lifetime; concurrent readers are safe. A failed load is
/// returned to the caller and retried on the next request.
pub struct StatClassifier {
    store: ModelStore,
    model: OnceLock<TrainedModel>,
}

impl StatClassifier {
    pub fn new(store: ModelStore) -> Self {
        Self {
            store,
            model: OnceLock::new(),
        }
    }

    pub fn classify(&self, narrative: &str) -> Result<ClassificationOutcome, EngineError> {
        if let Some(model) = self.model.get() {
            return Ok(model.classify(narrative));
        }
        let loaded = self.store.load()?;
        let model = self.model.get_or_init(|| loaded);
        Ok(model.classify(narrative))
    }
}
