use std::fmt::Write as _;

use chrono::NaiveDate;

use super::domain::{Project, TranscriptEntry};
use crate::scoring::Dimension;

const SEPARATOR: &str = "----------------------------------------";
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S UTC";

/// Plain-text analysis block for a single history entry.
pub fn render_entry(entry: &TranscriptEntry) -> String {
    let mut out = String::new();

    writeln!(out, "Transcript Analysis").expect("write report");
    writeln!(out, "Date: {}", entry.timestamp.format(TIMESTAMP_FORMAT)).expect("write report");
    writeln!(out).expect("write report");
    writeln!(out, "Scores:").expect("write report");
    for dimension in Dimension::ordered() {
        let value = entry
            .score
            .get(dimension)
            .map(|score| score.to_string())
            .unwrap_or_else(|| "n/a".to_string());
        writeln!(out, "{}: {}/{}", dimension.label(), value, dimension.rule().max)
            .expect("write report");
    }
    writeln!(out).expect("write report");
    writeln!(out, "Detailed Feedback:").expect("write report");
    writeln!(
        out,
        "{}",
        entry.feedback.as_deref().unwrap_or("No feedback available")
    )
    .expect("write report");
    writeln!(out).expect("write report");
    writeln!(out, "Original Transcript:").expect("write report");
    writeln!(out, "{}", entry.transcript).expect("write report");
    writeln!(out).expect("write report");

    match entry.video_analysis.as_deref() {
        Some(analysis) => {
            write!(out, "Video Analysis:\n{analysis}").expect("write report");
        }
        None => out.push_str("No video analysis available"),
    }

    out
}

/// Every entry of a project, in stored order, each followed by a separator line.
pub fn render_project(project: &Project) -> String {
    project
        .transcripts
        .iter()
        .map(|entry| format!("{}\n{SEPARATOR}\n", render_entry(entry)))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn project_file_name(project: &Project, exported_on: NaiveDate) -> String {
    format!(
        "{}-transcripts-{}.txt",
        sanitize_file_stem(&project.name),
        exported_on.format("%Y-%m-%d")
    )
}

pub fn entry_file_name(entry: &TranscriptEntry) -> String {
    format!("transcript-{}.txt", entry.timestamp.format("%Y-%m-%d"))
}

// Project names are free text; keep them from escaping the export directory.
fn sanitize_file_stem(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect()
}
