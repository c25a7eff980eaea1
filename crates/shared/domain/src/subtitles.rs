//! Subtitle timing for generated narration videos.
//!
//! A narration script is split into short cues whose display time is
//! proportional to their length; the cues cover the whole clip without gaps.

use std::fmt::Write;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_MAX_CHARS_PER_CUE, MAX_SUBTITLE_DURATION_MS};
use crate::error::{DomainError, DomainResult};

static SENTENCE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[^.!?。！？]+[.!?。！？]*|[.!?。！？]+").expect("sentence pattern is valid")
});

/// One timed subtitle line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct SubtitleCue {
    /// 1-based position
    pub index: usize,
    pub start_ms: u64,
    pub end_ms: u64,
    pub text: String,
}

/// Output container
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum SubtitleFormat {
    #[default]
    Srt,
    Vtt,
    Json,
}

/// Cue splitting options
#[derive(Debug, Clone, Copy)]
pub struct TimingOptions {
    pub max_chars_per_cue: usize,
}

impl Default for TimingOptions {
    fn default() -> Self {
        Self {
            max_chars_per_cue: DEFAULT_MAX_CHARS_PER_CUE,
        }
    }
}

/// Split `script` into cues spread over `duration_ms`.
pub fn build_cues(
    script: &str,
    duration_ms: u64,
    options: TimingOptions,
) -> DomainResult<Vec<SubtitleCue>> {
    if duration_ms == 0 {
        return Err(DomainError::validation("Duration must be positive"));
    }
    if duration_ms > MAX_SUBTITLE_DURATION_MS {
        return Err(DomainError::validation(format!(
            "Duration must be at most {} seconds",
            MAX_SUBTITLE_DURATION_MS / 1000
        )));
    }

    let normalized = script.split_whitespace().collect::<Vec<_>>().join(" ");
    let max_chars = options.max_chars_per_cue.max(1);

    let texts: Vec<String> = SENTENCE
        .find_iter(&normalized)
        .map(|m| m.as_str().trim())
        .filter(|s| !s.is_empty())
        .flat_map(|sentence| split_sentence(sentence, max_chars))
        .collect();

    if texts.is_empty() {
        return Err(DomainError::validation("Script is empty"));
    }

    let weights: Vec<u64> = texts.iter().map(|t| weight(t)).collect();
    let total_weight: u64 = weights.iter().sum();
    let last = texts.len() - 1;

    let mut cues = Vec::with_capacity(texts.len());
    let mut cumulative = 0u64;
    let mut start_ms = 0u64;
    for (i, (text, w)) in texts.into_iter().zip(weights).enumerate() {
        cumulative += w;
        let end_ms = if i == last {
            duration_ms
        } else {
            scale(duration_ms, cumulative, total_weight)
        };
        cues.push(SubtitleCue {
            index: i + 1,
            start_ms,
            end_ms,
            text,
        });
        start_ms = end_ms;
    }

    Ok(cues)
}

/// `round(duration_ms * part / total)` for `part <= total`, without overflow.
fn scale(duration_ms: u64, part: u64, total: u64) -> u64 {
    let (duration, part, total) = (duration_ms as u128, part as u128, total as u128);
    ((duration * part + total / 2) / total) as u64
}

/// Non-whitespace character count, never zero.
fn weight(text: &str) -> u64 {
    (text.chars().filter(|c| !c.is_whitespace()).count() as u64).max(1)
}

fn split_sentence(sentence: &str, max_chars: usize) -> Vec<String> {
    if sentence.chars().count() <= max_chars {
        return vec![sentence.to_string()];
    }

    if !sentence.contains(' ') {
        let chars: Vec<char> = sentence.chars().collect();
        return chars
            .chunks(max_chars)
            .map(|chunk| chunk.iter().collect())
            .collect();
    }

    let mut chunks = Vec::new();
    let mut current = String::new();
    for word in sentence.split(' ') {
        let needed = if current.is_empty() {
            word.chars().count()
        } else {
            current.chars().count() + 1 + word.chars().count()
        };
        if needed > max_chars && !current.is_empty() {
            chunks.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}

/// Format milliseconds as `HH:MM:SS<sep>mmm`.
fn format_timestamp(ms: u64, separator: char) -> String {
    let hours = ms / 3_600_000;
    let minutes = (ms % 3_600_000) / 60_000;
    let seconds = (ms % 60_000) / 1000;
    let millis = ms % 1000;
    format!(
        "{:02}:{:02}:{:02}{}{:03}",
        hours, minutes, seconds, separator, millis
    )
}

/// Render cues as SubRip.
pub fn render_srt(cues: &[SubtitleCue]) -> String {
    let mut out = String::new();
    for cue in cues {
        let _ = write!(
            out,
            "{}\n{} --> {}\n{}\n\n",
            cue.index,
            format_timestamp(cue.start_ms, ','),
            format_timestamp(cue.end_ms, ','),
            cue.text
        );
    }
    out
}

/// Render cues as WebVTT.
pub fn render_vtt(cues: &[SubtitleCue]) -> String {
    let mut out = String::from("WEBVTT\n\n");
    for cue in cues {
        let _ = write!(
            out,
            "{} --> {}\n{}\n\n",
            format_timestamp(cue.start_ms, '.'),
            format_timestamp(cue.end_ms, '.'),
            cue.text
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cues_are_proportional_and_contiguous() {
        let cues = build_cues("Hello world. This is a test.", 10_000, TimingOptions::default())
            .unwrap();

        assert_eq!(cues.len(), 2);
        assert_eq!(cues[0].text, "Hello world.");
        assert_eq!(cues[0].start_ms, 0);
        assert_eq!(cues[0].end_ms, 4783);
        assert_eq!(cues[1].start_ms, 4783);
        assert_eq!(cues[1].end_ms, 10_000);
        assert_eq!(cues[1].index, 2);
    }

    #[test]
    fn test_trailing_text_without_terminator() {
        let cues = build_cues("First!  And then\nmore", 3000, TimingOptions::default()).unwrap();
        let texts: Vec<_> = cues.iter().map(|c| c.text.as_str()).collect();
        assert_eq!(texts, vec!["First!", "And then more"]);
    }

    #[test]
    fn test_long_sentence_split_at_words() {
        let options = TimingOptions {
            max_chars_per_cue: 12,
        };
        let cues = build_cues("one two three four five six", 6000, options).unwrap();
        let texts: Vec<_> = cues.iter().map(|c| c.text.as_str()).collect();
        assert_eq!(texts, vec!["one two", "three four", "five six"]);
        assert!(cues.iter().all(|c| c.text.chars().count() <= 12));
        assert_eq!(cues.last().unwrap().end_ms, 6000);
    }

    #[test]
    fn test_text_without_spaces_split_by_chars() {
        let options = TimingOptions {
            max_chars_per_cue: 4,
        };
        let cues = build_cues("一二三四五六。", 1000, options).unwrap();
        let texts: Vec<_> = cues.iter().map(|c| c.text.as_str()).collect();
        assert_eq!(texts, vec!["一二三四", "五六。"]);
    }

    #[test]
    fn test_rejects_empty_script_and_zero_duration() {
        assert!(build_cues("   ", 1000, TimingOptions::default()).is_err());
        assert!(build_cues("Hello.", 0, TimingOptions::default()).is_err());
    }

    #[test]
    fn test_rejects_overlong_duration() {
        let err = build_cues("Hello world.", u64::MAX, TimingOptions::default()).unwrap_err();
        assert_eq!(err.to_string(), "Duration must be at most 86400 seconds");
    }

    #[test]
    fn test_longest_duration_does_not_overflow() {
        let script = "word ".repeat(5_000);
        let cues = build_cues(&script, MAX_SUBTITLE_DURATION_MS, TimingOptions::default()).unwrap();
        assert_eq!(cues.last().unwrap().end_ms, MAX_SUBTITLE_DURATION_MS);
        assert!(cues.windows(2).all(|w| w[0].end_ms == w[1].start_ms));
    }

    #[test]
    fn test_render_srt() {
        let cues = vec![SubtitleCue {
            index: 1,
            start_ms: 3_723_004,
            end_ms: 3_725_500,
            text: "Hi.".to_string(),
        }];
        assert_eq!(render_srt(&cues), "1\n01:02:03,004 --> 01:02:05,500\nHi.\n\n");
    }

    #[test]
    fn test_render_vtt() {
        let cues = vec![SubtitleCue {
            index: 1,
            start_ms: 0,
            end_ms: 1500,
            text: "Hi.".to_string(),
        }];
        assert_eq!(
            render_vtt(&cues),
            "WEBVTT\n\n00:00:00.000 --> 00:00:01.500\nHi.\n\n"
        );
    }
}
