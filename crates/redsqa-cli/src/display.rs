//! Card-style terminal rendering for analysis results.

use std::collections::BTreeMap;

use redsqa_core::FeedbackEntry;
use redsqa_engine::{BatchReport, CompatibilityVerdict, RecordAnalysis};

const MAX_NARRATIVE_CHARS: usize = 120;
const MAX_SPELLING_ITEMS: usize = 10;

/// Print one analysis as a vertical card.
pub fn print_analysis(analysis: &RecordAnalysis) {
    let record = &analysis.record;

    println!("── REDS {} {}", record.id, "─".repeat(40));
    println!("  declared:       {}", declared_line(analysis));
    println!("  narrative:      {}", truncate(&record.narrative));
    println!(
        "  classification: {} [{:?}]{}",
        analysis.classification.label(),
        analysis.classification.strategy,
        evidence_suffix(&analysis.classification.evidence),
    );
    println!("  reference:      {}", verdict_line(&analysis.compatibility));
    println!("  declared check: {}", analysis.declared_check.summary());
    println!("  spelling:       {}", spelling_line(analysis));
    println!();
}

/// Print a whole batch, then the skipped-row diagnostics.
pub fn print_batch(report: &BatchReport) {
    for analysis in &report.analyses {
        print_analysis(analysis);
    }

    if !report.skipped.is_empty() {
        println!("skipped {} malformed row(s):", report.skipped.len());
        for s in &report.skipped {
            println!("  row {}: {}", s.index, s.reason);
        }
    }
    println!(
        "{} analyzed, {} skipped",
        report.analyses.len(),
        report.skipped.len()
    );
}

/// Print accumulated feedback entries.
pub fn print_feedback(entries: &BTreeMap<String, FeedbackEntry>) {
    if entries.is_empty() {
        println!("no feedback recorded yet");
        return;
    }
    for (id, entry) in entries {
        println!("── REDS {} {}", id, "─".repeat(40));
        println!("  declared:  {}", entry.declared_code);
        println!("  narrative: {}", truncate(&entry.narrative));
        println!("  verdict:   {}", entry.verdict);
        println!("  judgment:  {:?}", entry.judgment);
        println!("  submitted: {}", entry.submitted_at);
        println!();
    }
    println!("{} feedback entr(ies)", entries.len());
}

fn declared_line(analysis: &RecordAnalysis) -> String {
    let record = &analysis.record;
    match (&record.declared_code, &analysis.declared_check.category) {
        (code, Some(cat)) if !code.is_empty() => format!("{code} ({cat})"),
        (code, None) if !code.is_empty() => format!("{code} (unmapped)"),
        _ => "—".to_string(),
    }
}

fn verdict_line(verdict: &CompatibilityVerdict) -> String {
    match verdict {
        CompatibilityVerdict::Compatible(code) => format!("compatible with {code}"),
        CompatibilityVerdict::Incompatible(code) => format!("incompatible with {code}"),
        CompatibilityVerdict::CodeNotFound(code) => {
            format!("code {code} not found in reference corpus")
        }
    }
}

fn evidence_suffix(evidence: &[String]) -> String {
    if evidence.is_empty() {
        String::new()
    } else {
        format!(" ({})", evidence.join(", "))
    }
}

fn spelling_line(analysis: &RecordAnalysis) -> String {
    if analysis.spelling.is_empty() {
        return "no issues".to_string();
    }
    let mut parts: Vec<String> = analysis
        .spelling
        .iter()
        .take(MAX_SPELLING_ITEMS)
        .map(|(word, suggestion)| match suggestion {
            Some(s) => format!("{word} → {s}"),
            None => format!("{word} → ?"),
        })
        .collect();
    if analysis.spelling.len() > MAX_SPELLING_ITEMS {
        parts.push(format!(
            "… {} more",
            analysis.spelling.len() - MAX_SPELLING_ITEMS
        ));
    }
    parts.join("; ")
}

fn truncate(text: &str) -> String {
    if text.chars().count() <= MAX_NARRATIVE_CHARS {
        return text.to_string();
    }
    let cut: String = text.chars().take(MAX_NARRATIVE_CHARS).collect();
    format!("{cut}…")
}
