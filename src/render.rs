use std::fmt::Write as _;
use std::time::Duration;

use serde::Serialize;

use crate::models::{Document, QueryResult};

/// Metadata keys shown next to each source in human output
const SOURCE_KEYS: [&str; 3] = ["source", "path", "lang"];

#[derive(Debug, Serialize)]
struct JsonOutput<'a> {
    question: &'a str,
    answer: &'a str,
    documents: &'a [Document],
    latency_ms: u64,
}

/// Machine-readable output, pretty-printed with two-space indentation
pub fn render_json(question: &str, result: &QueryResult) -> serde_json::Result<String> {
    let output = JsonOutput {
        question,
        answer: &result.response.answer,
        documents: &result.response.documents,
        latency_ms: result.latency_ms(),
    };
    let mut json = serde_json::to_string_pretty(&output)?;
    json.push('\n');
    Ok(json)
}

pub fn render_human(question: &str, result: &QueryResult) -> String {
    let mut out = String::new();
    let response = &result.response;

    let _ = writeln!(out, "Question:");
    let _ = writeln!(out, "   {}", question);
    let _ = writeln!(out);
    let _ = writeln!(out, "Answer:");
    let _ = writeln!(out, "{}", response.answer);
    let _ = writeln!(out);
    let _ = writeln!(out, "Elapsed: {}", format_elapsed(result.latency()));

    if !response.documents.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "Sources:");
        for (i, doc) in response.documents.iter().enumerate() {
            let _ = write!(out, "  [{}] score={:.3}", i + 1, doc.score);
            for key in SOURCE_KEYS {
                if let Some(value) = doc.meta_display(key) {
                    let _ = write!(out, " {}={}", key, value);
                }
            }
            let _ = writeln!(out);
        }
    }

    out
}

/// Rounds to the nearest 10ms and prints like `460ms`, `1.23s`, `1m2s`
/// or `1h0m5.5s`; zero is `0s`.
pub fn format_elapsed(elapsed: Duration) -> String {
    let ms = (elapsed.as_millis() + 5) / 10 * 10;
    if ms == 0 {
        return "0s".to_string();
    }
    if ms < 1000 {
        return format!("{}ms", ms);
    }

    let hours = ms / 3_600_000;
    let minutes = ms / 60_000 % 60;
    let secs = ms / 1000 % 60;
    let centis = ms % 1000 / 10;

    let mut out = String::new();
    if hours > 0 {
        let _ = write!(out, "{}h", hours);
    }
    if hours > 0 || minutes > 0 {
        let _ = write!(out, "{}m", minutes);
    }
    if centis == 0 {
        let _ = write!(out, "{}s", secs);
    } else {
        let frac = format!("{:02}", centis);
        let _ = write!(out, "{}.{}s", secs, frac.trim_end_matches('0'));
    }
    out
}
