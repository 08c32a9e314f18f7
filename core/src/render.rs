//! Plain-text rendering shared by front ends.

use chrono::{DateTime, Local, Utc};

use crate::analysis::AnalysisReport;
use crate::corrections::{Correction, CorrectionRecord};
use crate::scenarios::ScenarioDefinition;
use crate::turns::{Speaker, Turn};

/// `HH:MM` in local time.
pub fn format_time(at: DateTime<Utc>) -> String {
    at.with_timezone(&Local).format("%H:%M").to_string()
}

pub fn render_turn(turn: &Turn, role: &str) -> String {
    let time = format_time(turn.created_at);
    match (turn.speaker, &turn.correction) {
        (Speaker::User, _) => format!("[{time}] You: {}", turn.text),
        (Speaker::Assistant, _) => format!("[{time}] {role}: {}", turn.text),
        (Speaker::Annotation, Some(correction)) => render_correction(correction),
        (Speaker::Annotation, None) => format!("[{time}] ! {}", turn.text),
    }
}

/// Correction card. The example section only appears when an example exists.
pub fn render_correction(correction: &Correction) -> String {
    let mut lines = vec![
        "  ┌ Correction".to_string(),
        format!("  │ You said:  {}", correction.original_utterance),
        format!("  │ Better:    {}", correction.corrected_text),
        format!("  │ Why:       {}", correction.reason),
    ];
    if let Some(example) = &correction.example {
        lines.push(format!("  │ Example:   {example}"));
    }
    lines.push("  └".to_string());
    lines.join("\n")
}

/// Ledger entry line for the newest-first list, with its 1-based position.
pub fn render_ledger_entry(position: usize, record: &CorrectionRecord) -> String {
    let correction = &record.correction;
    let mut line = format!(
        "{position:>3}. [{}] \"{}\" -> \"{}\" ({})",
        format_time(record.created_at),
        correction.original_utterance,
        correction.corrected_text,
        correction.reason
    );
    if let Some(example) = &correction.example {
        line.push_str(&format!("\n     e.g. {example}"));
    }
    line
}

pub fn render_report(report: &AnalysisReport) -> String {
    let mut out = format!("Summary: {}\n", report.summary);
    out.push_str("Recurring mistakes:\n");
    if report.mistakes.is_empty() {
        out.push_str("  (none)\n");
    }
    for mistake in &report.mistakes {
        out.push_str(&format!("  - {mistake}\n"));
    }
    out.push_str(&format!("Strength: {}\n", report.strength));
    out.push_str(&format!("Focus next: {}", report.improvement));
    out
}

pub fn render_scenario(scenario: &ScenarioDefinition, active: bool) -> String {
    let marker = if active { '*' } else { ' ' };
    format!(
        "{marker} {:<14} {} {} ({}, {}) - {}",
        scenario.id,
        scenario.icon,
        scenario.title,
        scenario.role,
        scenario.difficulty,
        scenario.description
    )
}
