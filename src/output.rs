//! Terminal rendering for the CLI.

use crate::error::DublineError;
use crate::history::HistoryRecord;
use crate::languages::{LANGUAGES, language_label};
use crate::pipeline::{ProgressReporter, Stage, StageTimings};
use owo_colors::OwoColorize;
use std::time::Duration;

/// File name of the translated speech written by `translate`.
pub const AUDIO_FILE_NAME: &str = "translated_audio.wav";

/// File name of the transcript written by `translate`.
pub const TRANSCRIPT_FILE_NAME: &str = "transcript.txt";

/// Step label shown while a stage runs.
pub fn stage_title(stage: Stage) -> &'static str {
    match stage {
        Stage::Transcribe => "Transcribing video",
        Stage::Translate => "Translating text",
        Stage::Synthesize => "Generating audio",
    }
}

/// Short elapsed time, e.g. `850ms` or `1.24s`.
pub fn format_elapsed(elapsed: Duration) -> String {
    if elapsed < Duration::from_secs(1) {
        format!("{}ms", elapsed.as_millis())
    } else {
        format!("{:.2}s", elapsed.as_secs_f64())
    }
}

/// Step-by-step status on stderr.
#[derive(Debug, Clone, Copy, Default)]
pub struct TerminalProgress {
    quiet: bool,
}

impl TerminalProgress {
    pub fn new(quiet: bool) -> Self {
        Self { quiet }
    }
}

impl ProgressReporter for TerminalProgress {
    fn stage_started(&self, stage: Stage) {
        if !self.quiet {
            eprintln!("  {} {}...", "•".dimmed(), stage_title(stage));
        }
    }

    fn stage_completed(&self, stage: Stage, elapsed: Duration) {
        if !self.quiet {
            eprintln!(
                "  {} {} {}",
                "✓".green(),
                stage_title(stage),
                format!("({})", format_elapsed(elapsed)).dimmed()
            );
        }
    }

    fn stage_failed(&self, stage: Stage, error: &DublineError) {
        eprintln!("  {} {}: {}", "✗".red(), stage_title(stage), error);
    }
}

/// One line per supported language: `code  Label`.
pub fn render_languages(current: &str) -> String {
    let mut out = String::new();
    for language in LANGUAGES {
        let marker = if language.code.eq_ignore_ascii_case(current) {
            "*"
        } else {
            " "
        };
        out.push_str(&format!("{} {:<4}{}\n", marker, language.code, language.label));
    }
    out
}

/// History table, newest first as given.
pub fn render_history(records: &[HistoryRecord]) -> String {
    if records.is_empty() {
        return "No translations yet.\n".to_string();
    }

    let mut out = String::new();
    for record in records {
        out.push_str(&format!(
            "{}  {}  {}\n",
            record.created_at.format("%Y-%m-%d %H:%M"),
            language_label(&record.target_language),
            record.video_name
        ));
        out.push_str(&format!("    {}\n", preview(&record.translated_text, 72)));
    }
    out
}

/// Per-stage timing summary.
pub fn render_timings(timings: &StageTimings) -> String {
    let parts: Vec<String> = Stage::ALL
        .iter()
        .map(|stage| format!("{} {}", stage, format_elapsed(timings.get(*stage))))
        .collect();
    format!(
        "{} (total {})",
        parts.join(", "),
        format_elapsed(timings.total())
    )
}

/// First line of `text`, cut to `max_chars` with an ellipsis.
fn preview(text: &str, max_chars: usize) -> String {
    let line = text.lines().next().unwrap_or("").trim();
    if line.chars().count() <= max_chars {
        return line.to_string();
    }
    let cut: String = line.chars().take(max_chars.saturating_sub(1)).collect();
    format!("{}…", cut.trim_end())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_stage_titles() {
        assert_eq!(stage_title(Stage::Transcribe), "Transcribing video");
        assert_eq!(stage_title(Stage::Synthesize), "Generating audio");
    }

    #[test]
    fn test_format_elapsed() {
        assert_eq!(format_elapsed(Duration::from_millis(850)), "850ms");
        assert_eq!(format_elapsed(Duration::from_millis(1240)), "1.24s");
    }

    #[test]
    fn test_render_languages_marks_current() {
        let out = render_languages("es");
        assert_eq!(out.lines().count(), 20);
        assert!(out.contains("* es  Spanish"));
        assert!(out.contains("  en  English"));
    }

    #[test]
    fn test_render_history() {
        let records = vec![HistoryRecord {
            id: "1".to_string(),
            user_id: "u1".to_string(),
            video_name: "hello.mp4".to_string(),
            translated_text: "Hola mundo\nsegunda línea".to_string(),
            target_language: "es".to_string(),
            created_at: Utc.with_ymd_and_hms(2025, 3, 1, 10, 5, 0).unwrap(),
        }];
        assert_eq!(
            render_history(&records),
            "2025-03-01 10:05  Spanish  hello.mp4\n    Hola mundo\n"
        );
        assert_eq!(render_history(&[]), "No translations yet.\n");
    }

    #[test]
    fn test_render_timings() {
        let timings = StageTimings {
            transcribe: Duration::from_millis(1500),
            translate: Duration::from_millis(200),
            synthesize: Duration::from_millis(800),
        };
        assert_eq!(
            render_timings(&timings),
            "transcribe 1.50s, translate 200ms, synthesize 800ms (total 2.50s)"
        );
    }

    #[test]
    fn test_preview_truncates() {
        assert_eq!(preview("short", 10), "short");
        assert_eq!(preview("abcdefghijk", 5), "abcd…");
    }
}
