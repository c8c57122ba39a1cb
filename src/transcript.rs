//! Plain-text transcript for the document download.

use crate::languages::language_label;
use crate::pipeline::PipelineResult;

/// Render both texts of a run as a titled, word-wrapped document body.
///
/// `width` is measured in characters; words longer than `width` get a line
/// of their own. Blank lines in the input are kept as paragraph breaks.
pub fn format_transcript(result: &PipelineResult, target_language: &str, width: usize) -> String {
    let mut out = String::new();
    push_section(&mut out, "Original transcript", &result.transcription, width);
    out.push('\n');
    push_section(
        &mut out,
        &format!("Translation ({})", language_label(target_language)),
        &result.translated_text,
        width,
    );
    out
}

fn push_section(out: &mut String, title: &str, body: &str, width: usize) {
    out.push_str(title);
    out.push('\n');
    out.push_str(&"=".repeat(title.chars().count()));
    out.push('\n');
    if body.trim().is_empty() {
        out.push_str("(no speech detected)\n");
        return;
    }
    for line in wrap(body, width) {
        out.push_str(&line);
        out.push('\n');
    }
}

/// Greedy word wrap.
pub fn wrap(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut lines = Vec::new();

    for paragraph in text.trim().split('\n') {
        let mut line = String::new();
        let mut line_len = 0;

        for word in paragraph.split_whitespace() {
            let word_len = word.chars().count();
            if line_len > 0 && line_len + 1 + word_len > width {
                lines.push(std::mem::take(&mut line));
                line_len = 0;
            }
            if line_len > 0 {
                line.push(' ');
                line_len += 1;
            }
            line.push_str(word);
            line_len += word_len;
        }
        lines.push(line);
    }
    lines
}
