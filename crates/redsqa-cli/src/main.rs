//! `redsqa` — quality screening for REDS incident records.

mod display;

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use serde::Deserialize;

use redsqa_core::{CategoryConfig, FeedbackEntry, IncidentRecord, RawRecord, ReviewerJudgment};
use redsqa_engine::{
    AnalysisEngine, CompatChecker, CompatConfig, EngineError, Granularity, ModelStore,
    ReferenceCorpus, SpellChecker, StatClassifier, Strategy, TrainedModel,
    declared_keyword_check,
};
use redsqa_store::{FeedbackStore, StoreError};

#[derive(Parser)]
#[command(name = "redsqa", version, about = "Quality screening for REDS incident records")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, Copy, ValueEnum)]
enum StrategyArg {
    Rules,
    Context,
    Statistical,
}

impl From<StrategyArg> for Strategy {
    fn from(arg: StrategyArg) -> Self {
        match arg {
            StrategyArg::Rules => Strategy::Rules,
            StrategyArg::Context => Strategy::Context,
            StrategyArg::Statistical => Strategy::Statistical,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum JudgmentArg {
    Correct,
    Incorrect,
}

impl From<JudgmentArg> for ReviewerJudgment {
    fn from(arg: JudgmentArg) -> Self {
        match arg {
            JudgmentArg::Correct => ReviewerJudgment::Correct,
            JudgmentArg::Incorrect => ReviewerJudgment::Incorrect,
        }
    }
}

#[derive(Subcommand)]
enum Command {
    /// Analyze a batch of records against the reference corpus
    Analyze {
        /// JSON array of raw records (id, declared_code, declared_category, narrative)
        records: PathBuf,
        /// Reference legal-code text file
        #[arg(long)]
        corpus: PathBuf,
        /// Word-frequency spelling dictionary
        #[arg(long)]
        dict: PathBuf,
        /// Category configuration JSON (built-in tables when omitted)
        #[arg(long)]
        categories: Option<PathBuf>,
        /// Classification strategy
        #[arg(long, value_enum, default_value_t = StrategyArg::Rules)]
        strategy: StrategyArg,
        /// Similarity cutoff for the reference compatibility check
        #[arg(long, default_value_t = redsqa_engine::DEFAULT_CUTOFF)]
        cutoff: f64,
        /// Compare against the best-matching paragraph instead of the whole document
        #[arg(long)]
        paragraphs: bool,
        /// Trained model artifact (required for the statistical strategy)
        #[arg(long)]
        model: Option<PathBuf>,
    },
    /// Train the statistical model from labeled samples
    Train {
        /// JSON array of {text, category} samples
        samples: PathBuf,
        /// Where to persist the trained model
        #[arg(long)]
        model: PathBuf,
    },
    /// Classify a single narrative with the trained model
    Classify {
        text: String,
        #[arg(long)]
        model: PathBuf,
    },
    /// Record reviewer feedback for one analyzed record
    Feedback {
        /// JSON array of raw records
        records: PathBuf,
        /// Record id (REDS number) to judge
        #[arg(long)]
        id: String,
        /// Whether the computed verdict was correct
        #[arg(long, value_enum)]
        judgment: JudgmentArg,
        #[arg(long)]
        categories: Option<PathBuf>,
        #[arg(long, default_value = "feedback.json")]
        store: PathBuf,
    },
    /// List accumulated reviewer feedback
    FeedbackList {
        #[arg(long, default_value = "feedback.json")]
        store: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();
    tracing::debug!("redsqa v{}", env!("CARGO_PKG_VERSION"));
    let cli = Cli::parse();

    match cli.command {
        Command::Analyze {
            records,
            corpus,
            dict,
            categories,
            strategy,
            cutoff,
            paragraphs,
            model,
        } => analyze(
            &records, &corpus, &dict, categories.as_deref(), strategy.into(), cutoff,
            paragraphs, model,
        ),
        Command::Train { samples, model } => train(&samples, &model),
        Command::Classify { text, model } => classify(&text, &model),
        Command::Feedback {
            records,
            id,
            judgment,
            categories,
            store,
        } => feedback(&records, &id, judgment.into(), categories.as_deref(), &store),
        Command::FeedbackList { store } => {
            let entries = FeedbackStore::new(store).load()?;
            display::print_feedback(&entries);
            Ok(())
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn analyze(
    records: &Path,
    corpus: &Path,
    dict: &Path,
    categories: Option<&Path>,
    strategy: Strategy,
    cutoff: f64,
    paragraphs: bool,
    model: Option<PathBuf>,
) -> anyhow::Result<()> {
    let rows = read_records(records)?;
    let config = load_categories(categories)?;
    let speller = SpellChecker::load(dict)?;
    let checker = CompatChecker::new(
        ReferenceCorpus::load(corpus)?,
        CompatConfig {
            cutoff,
            granularity: if paragraphs {
                Granularity::Paragraph
            } else {
                Granularity::WholeDocument
            },
        },
    );

    let mut engine = AnalysisEngine::new(config, speller, checker, strategy);
    if let Some(model_path) = model {
        engine = engine.with_statistical(StatClassifier::new(ModelStore::new(model_path)));
    }

    let report = engine.analyze_batch(rows)?;
    display::print_batch(&report);
    Ok(())
}

#[derive(Deserialize)]
struct TrainingSample {
    #[serde(alias = "Texto")]
    text: String,
    #[serde(alias = "Categoria")]
    category: String,
}

fn train(samples: &Path, model: &Path) -> anyhow::Result<()> {
    let text = std::fs::read_to_string(samples)
        .with_context(|| format!("reading training samples from {}", samples.display()))?;
    let parsed: Vec<TrainingSample> =
        serde_json::from_str(&text).context("training samples must be a JSON array")?;
    let pairs: Vec<(String, String)> = parsed
        .into_iter()
        .map(|s| (s.text, s.category))
        .collect();

    let (trained, summary) = TrainedModel::train(&pairs)?;
    ModelStore::new(model).save(&trained)?;

    println!(
        "trained on {} samples: {} categories, {} vocabulary terms",
        summary.samples, summary.labels, summary.vocabulary
    );
    println!("model saved to {}", model.display());
    Ok(())
}

fn classify(text: &str, model: &Path) -> anyhow::Result<()> {
    let outcome = match StatClassifier::new(ModelStore::new(model)).classify(text) {
        Ok(outcome) => outcome,
        Err(e @ EngineError::ModelNotTrained(_)) => {
            // Actionable condition, not a stack of I/O noise.
            println!("{e}");
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };
    println!("classification: {}", outcome.label());
    Ok(())
}

fn feedback(
    records: &Path,
    id: &str,
    judgment: ReviewerJudgment,
    categories: Option<&Path>,
    store: &Path,
) -> anyhow::Result<()> {
    let rows = read_records(records)?;
    let config = load_categories(categories)?;

    let record = rows
        .into_iter()
        .filter_map(|row| row.ok())
        .filter_map(|raw| IncidentRecord::from_raw(raw).ok())
        .find(|r| r.id == id)
        .with_context(|| format!("no record with id {id} in {}", records.display()))?;

    let check = declared_keyword_check(&config, &record.narrative, &record.declared_code);
    println!("REDS {}: {}", record.id, check.summary());

    let entry = FeedbackEntry {
        record_id: record.id.clone(),
        narrative: record.narrative,
        declared_code: record.declared_code,
        verdict: check.summary(),
        judgment,
        submitted_at: chrono::Utc::now().to_rfc3339(),
    };

    match FeedbackStore::new(store).record(entry) {
        Ok(()) => println!("feedback recorded for {}", record.id),
        Err(StoreError::Duplicate(id)) => {
            // No-op rejection per the write-once contract.
            println!("feedback for {id} already recorded; keeping the original entry");
        }
        Err(e) => return Err(e.into()),
    }
    Ok(())
}

/// Parse the records file row by row. A row that does not deserialize is
/// carried as `Err` with the parse reason so the batch report can flag it
/// while the remaining rows still get analyzed. Only a file that is not a
/// JSON array at all (or unreadable) fails the command.
fn read_records(path: &Path) -> anyhow::Result<Vec<Result<RawRecord, String>>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading records from {}", path.display()))?;
    let rows: Vec<serde_json::Value> =
        serde_json::from_str(&text).context("records must be a JSON array of rows")?;
    Ok(rows
        .into_iter()
        .map(|row| serde_json::from_value::<RawRecord>(row).map_err(|e| e.to_string()))
        .collect())
}

fn load_categories(path: Option<&Path>) -> anyhow::Result<CategoryConfig> {
    match path {
        Some(p) => Ok(CategoryConfig::load(p)?),
        None => Ok(CategoryConfig::builtin()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bad_typed_row_does_not_poison_ingestion() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("records.json");
        std::fs::write(
            &path,
            r#"[
                {"reds": "R1", "natureza_codigo": "C01155", "historico": "subtraiu sem violência"},
                {"reds": "R2", "historico": 12345},
                {"reds": "R3", "natureza_codigo": "C01157", "historico": "assalto com arma"}
            ]"#,
        )
        .unwrap();

        let rows = read_records(&path).unwrap();
        assert_eq!(rows.len(), 3);
        assert!(rows[0].is_ok());
        assert!(rows[1].is_err());
        assert!(rows[2].is_ok());
    }

    #[test]
    fn non_array_records_file_is_a_hard_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("records.json");
        std::fs::write(&path, r#"{"reds": "R1"}"#).unwrap();

        assert!(read_records(&path).is_err());
    }
}
