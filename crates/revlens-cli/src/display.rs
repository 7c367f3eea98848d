//! Terminal rendering for a session: results table, summary line, and a
//! vertical detail card for the selected review.

use std::fmt::Write;

use chrono::{DateTime, Utc};
use revlens_client::Health;
use revlens_core::{Badge, FlagKind, ReviewRecord, ScoreBand, SessionView, Summary, badges, format_percent};

const MAX_SNIPPET: usize = 48;
const MAX_CELL: usize = 18;

/// Print the full session: table, summary, then the detail card.
pub fn print_session(view: &SessionView<'_>, color: bool) {
    print!("{}", render_results_table(view.records, view.selected.map(|r| r.id.as_str()), color));
    println!();
    println!("{}", render_summary(&view.summary));
    println!();
    match view.selected {
        Some(record) => print!("{}", render_review_card(record, &view.evidence)),
        None => println!("Select a review to view details (--select <ID>)"),
    }
}

// ── Results table ──

pub fn render_results_table(records: &[ReviewRecord], selected: Option<&str>, color: bool) -> String {
    let mut out = String::new();
    if records.is_empty() {
        out.push_str("No results.\n");
        return out;
    }

    let _ = writeln!(
        out,
        "  {:<6} {:<18} {:<18} {:<48} {:>9} {:>10}  {:<16} Flags",
        "ID", "Place", "User", "Review", "Relevancy", "Confidence", "Timestamp"
    );
    for r in records {
        let marker = if selected == Some(r.id.as_str()) { '>' } else { ' ' };
        let relevancy = r
            .relevancy
            .map(|v| format!("{v:.2}"))
            .unwrap_or_else(|| "-".to_string());
        let _ = writeln!(
            out,
            "{marker} {:<6} {:<18} {:<18} {:<48} {:>9} {:>10}  {:<16} {}",
            truncate(&r.id, 6),
            truncate(&r.place, MAX_CELL),
            truncate(&r.user, MAX_CELL),
            truncate(&r.snippet, MAX_SNIPPET),
            relevancy,
            format_percent(r.prediction_confidence),
            truncate(&r.timestamp, 16),
            render_badges(&badges(r), color),
        );
    }
    out
}

fn render_badges(badges: &[Badge], color: bool) -> String {
    badges
        .iter()
        .map(|b| {
            if color {
                format!("\x1b[{}m[{}]\x1b[0m", ansi_code(b.color), b.label)
            } else {
                format!("[{}]", b.label)
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn ansi_code(color: &str) -> &'static str {
    match color {
        "red" => "31",
        "orange" => "33",
        "purple" => "35",
        _ => "90",
    }
}

// ── Summary ──

pub fn render_summary(summary: &Summary) -> String {
    let mut out = format!("Total {}", summary.total);
    for kind in FlagKind::ALL {
        let _ = write!(out, "   {} {}", kind.label(), summary.count(kind));
    }
    let _ = write!(out, "   Flagged {}", summary.flagged);
    out
}

// ── Detail card ──

/// Vertical card for one review, grouped into sections.
pub fn render_review_card(record: &ReviewRecord, evidence: &[String]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "=== {} ===", record.place);
    let _ = writeln!(out, "{}  ·  {}", record.user, record.timestamp);
    out.push('\n');

    out.push_str("Review\n");
    let _ = writeln!(out, "  {}", record.full_text);
    out.push('\n');

    out.push_str("Scores\n");
    let confidence = record.prediction_confidence;
    let _ = writeln!(
        out,
        "  {:<26} {} ({})",
        "Prediction Confidence",
        format_percent(confidence),
        ScoreBand::of(confidence).as_str()
    );
    if let Some(relevancy) = record.relevancy {
        let _ = writeln!(
            out,
            "  {:<26} {:.2} ({})",
            "Relevancy",
            relevancy,
            ScoreBand::of(relevancy).as_str()
        );
    }
    if let Some(class) = &record.predicted_class {
        let _ = writeln!(out, "  {:<26} {}", "Predicted class", class);
    }
    out.push('\n');

    out.push_str("Flags\n");
    for kind in FlagKind::ALL {
        let mark = if record.flag(kind) { '✓' } else { '✗' };
        let _ = writeln!(out, "  {mark} {:<24} {}", kind.label(), kind.description());
    }

    if !record.original_flags.is_empty() {
        let _ = writeln!(out, "  {:<26} {}", "backend labels", record.original_flags.join(", "));
    }

    if !evidence.is_empty() {
        out.push('\n');
        out.push_str("Supporting Evidence\n");
        for item in evidence {
            let _ = writeln!(out, "  - {item}");
        }
    }
    out
}

// ── Health ──

pub fn render_health(base_url: &str, health: &Health, now: DateTime<Utc>) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{:<16} {}", "backend", base_url);
    let _ = writeln!(out, "{:<16} {}", "ok", if health.ok { "yes" } else { "no" });
    let _ = writeln!(
        out,
        "{:<16} {}",
        "model loaded",
        if health.model_loaded { "yes" } else { "no" }
    );
    if let Some(method) = &health.decision_method {
        let _ = writeln!(out, "{:<16} {}", "decision method", method);
    }
    if let Some(at) = health.checked_at() {
        let skew = (now - at).num_seconds();
        let _ = writeln!(out, "{:<16} {} ({skew}s ago)", "checked at", at.to_rfc3339());
    }
    out
}

// ── Helpers ──

/// Cut to `max` characters, ending in "..." when shortened.
fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let kept: String = s.chars().take(max.saturating_sub(3)).collect();
    format!("{kept}...")
}
