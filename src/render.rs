//! The three output renderings of a [`Transcript`].

use crate::timestamp::format_timestamp;
use crate::transcript::Transcript;
use serde::Deserialize;
use std::fmt;
use tracing::debug;

/// Number of characters shown by [`RenderedDocument::preview`] unless told
/// otherwise.
pub const DEFAULT_PREVIEW_LIMIT: usize = 500;

/// Which rendering to produce.
///
/// The extension-era names (`json`, `vtt`, `vtt-grouped`) are accepted as
/// aliases on the command line and in config files.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// The payload exactly as downloaded, with all of its metadata
    #[value(alias = "json")]
    #[serde(alias = "json")]
    Raw,
    /// WebVTT subtitles with speaker voice tags
    #[default]
    #[value(alias = "vtt")]
    #[serde(alias = "vtt")]
    Cue,
    /// Plain text, consecutive lines by the same speaker merged into one paragraph
    #[value(alias = "vtt-grouped")]
    #[serde(alias = "vtt-grouped")]
    Grouped,
}

impl OutputFormat {
    pub const ALL: [OutputFormat; 3] = [Self::Raw, Self::Cue, Self::Grouped];

    pub fn extension(self) -> &'static str {
        match self {
            Self::Raw => ".json",
            Self::Cue => ".vtt",
            Self::Grouped => ".txt",
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            Self::Raw => "application/json",
            Self::Cue => "text/vtt",
            Self::Grouped => "text/plain",
        }
    }

    /// Appended to the file stem, before the extension.
    pub fn file_suffix(self) -> &'static str {
        match self {
            Self::Raw | Self::Cue => "_transcript",
            Self::Grouped => "_transcript_grouped",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Raw => "raw",
            Self::Cue => "cue",
            Self::Grouped => "grouped",
        })
    }
}

/// A rendered transcript, ready to be handed to delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedDocument {
    pub format: OutputFormat,
    pub body: String,
}

impl RenderedDocument {
    pub fn extension(&self) -> &'static str {
        self.format.extension()
    }

    pub fn mime_type(&self) -> &'static str {
        self.format.mime_type()
    }

    /// The first `limit` characters followed by `...`.
    ///
    /// Raw documents are pretty-printed first so the preview shows structure
    /// rather than one long line.
    pub fn preview(&self, limit: usize) -> String {
        let pretty;
        let text = match self.format {
            OutputFormat::Raw => {
                pretty = serde_json::from_str::<serde_json::Value>(&self.body)
                    .and_then(|v| serde_json::to_string_pretty(&v))
                    .unwrap_or_else(|_| self.body.clone());
                &pretty
            }
            OutputFormat::Cue | OutputFormat::Grouped => &self.body,
        };
        let mut preview: String = text.chars().take(limit).collect();
        preview.push_str("...");
        preview
    }
}

/// Renders `transcript` in the chosen format.
pub fn render(transcript: &Transcript, format: OutputFormat) -> RenderedDocument {
    let body = match format {
        OutputFormat::Raw => to_raw(transcript),
        OutputFormat::Cue => to_cue_document(transcript),
        OutputFormat::Grouped => to_grouped_text(transcript),
    };
    debug!(%format, entries = transcript.len(), bytes = body.len(), "rendered transcript");
    RenderedDocument { format, body }
}

/// The original payload, byte for byte.
pub fn to_raw(transcript: &Transcript) -> String {
    transcript.payload().to_string()
}

/// A WebVTT document with one cue per entry.
///
/// Offsets go through seconds and back so they come out in canonical
/// `HH:MM:SS.fff` form; a malformed offset shows up as `NaN:NaN:000NaN`.
pub fn to_cue_document(transcript: &Transcript) -> String {
    let mut vtt = String::from("WEBVTT\n\n");
    for (i, entry) in transcript.entries().iter().enumerate() {
        vtt.push_str(&format!(
            "{}\n{} --> {}\n<v {}>{}\n\n",
            entry.cue_id(i),
            format_timestamp(entry.start_seconds()),
            format_timestamp(entry.end_seconds()),
            entry.speaker(),
            entry.text(),
        ));
    }
    vtt
}

/// Plain text with one paragraph per speaker turn.
///
/// Consecutive entries by the same speaker are joined with a single space.
/// An entry with empty text still takes part in the grouping, so it can leave
/// a doubled space inside a paragraph.
pub fn to_grouped_text(transcript: &Transcript) -> String {
    let mut paragraphs = Vec::new();
    let mut current: Option<&str> = None;
    let mut buffer = String::new();

    for entry in transcript.entries() {
        let speaker = entry.speaker();
        if current == Some(speaker) {
            buffer.push(' ');
            buffer.push_str(entry.text());
            continue;
        }

        if let Some(prev) = current {
            if !buffer.is_empty() {
                paragraphs.push(format!("{prev}: {}", buffer.trim()));
            }
        }
        current = Some(speaker);
        buffer.clear();
        buffer.push_str(entry.text());
    }

    if let Some(prev) = current {
        if !buffer.is_empty() {
            paragraphs.push(format!("{prev}: {}", buffer.trim()));
        }
    }

    paragraphs.join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transcript(entries: &[(&str, &str)]) -> Transcript {
        let entries: Vec<_> = entries
            .iter()
            .enumerate()
            .map(|(i, (speaker, text))| {
                serde_json::json!({
                    "speakerDisplayName": speaker,
                    "text": text,
                    "startOffset": format!("0:00:{:02}", i),
                    "endOffset": format!("0:00:{:02}.5", i),
                })
            })
            .collect();
        Transcript::parse(serde_json::json!({ "entries": entries }).to_string()).unwrap()
    }

    #[test]
    fn cue_document() {
        let t = Transcript::parse(
            r#"{"entries":[
                {"id":"x/1","speakerDisplayName":"Ada","text":"Hello.","startOffset":"0:00:01.25","endOffset":"0:00:03"},
                {"speakerDisplayName":"Grace","text":"Hi!","startOffset":"1:02:03.5","endOffset":"1:02:04.125"}
            ]}"#,
        )
        .unwrap();
        assert_eq!(
            to_cue_document(&t),
            "WEBVTT\n\n\
             x/1\n00:00:01.250 --> 00:00:03.000\n<v Ada>Hello.\n\n\
             2\n01:02:03.500 --> 01:02:04.125\n<v Grace>Hi!\n\n"
        );
    }

    #[test]
    fn one_cue_per_entry_in_order() {
        let t = transcript(&[("A", "one"), ("A", "two"), ("B", "three"), ("A", "four")]);
        let vtt = to_cue_document(&t);
        let body = vtt.strip_prefix("WEBVTT\n\n").unwrap();
        let cues: Vec<_> = body.split_terminator("\n\n").collect();
        assert_eq!(cues.len(), 4);
        for (i, (cue, text)) in cues.iter().zip(["one", "two", "three", "four"]).enumerate() {
            let lines: Vec<_> = cue.lines().collect();
            assert_eq!(lines.len(), 3, "{cue:?}");
            assert_eq!(lines[0], (i + 1).to_string());
            assert!(lines[2].ends_with(text));
        }
    }

    #[test]
    fn missing_speaker_is_unknown_everywhere() {
        let t = Transcript::parse(
            r#"{"entries":[{"text":"who said that","startOffset":"0:00:00","endOffset":"0:00:01"}]}"#,
        )
        .unwrap();
        assert!(to_cue_document(&t).contains("<v Unknown>who said that\n"));
        assert_eq!(to_grouped_text(&t), "Unknown: who said that");
    }

    #[test]
    fn malformed_offsets_flow_through() {
        let t = Transcript::parse(r#"{"entries":[{"text":"x","startOffset":"later"}]}"#).unwrap();
        assert!(to_cue_document(&t).contains("1\nNaN:NaN:000NaN --> NaN:NaN:000NaN\n<v Unknown>x\n"));
    }

    #[test]
    fn empty_transcript() {
        let t = Transcript::parse(r#"{"entries":[]}"#).unwrap();
        assert_eq!(to_cue_document(&t), "WEBVTT\n\n");
        assert_eq!(to_grouped_text(&t), "");
    }

    #[test]
    fn grouping_merges_consecutive_speakers() {
        let t = transcript(&[("A", "hi"), ("A", "there"), ("B", "yo")]);
        assert_eq!(to_grouped_text(&t), "A: hi there\n\nB: yo");
    }

    #[test]
    fn grouping_does_not_merge_across_turns() {
        let t = transcript(&[("A", "one"), ("B", "two"), ("A", "three")]);
        assert_eq!(to_grouped_text(&t), "A: one\n\nB: two\n\nA: three");
    }

    #[test]
    fn grouping_empty_text_edge_cases() {
        // the empty middle entry leaves a doubled space
        let t = transcript(&[("A", "hi"), ("A", ""), ("A", "there")]);
        assert_eq!(to_grouped_text(&t), "A: hi  there");

        // a turn made only of empty text never gets flushed
        let t = transcript(&[("A", ""), ("B", "yo")]);
        assert_eq!(to_grouped_text(&t), "B: yo");

        // ...but two empty entries leave a single space behind
        let t = transcript(&[("A", ""), ("A", ""), ("B", "yo")]);
        assert_eq!(to_grouped_text(&t), "A: \n\nB: yo");
    }

    #[test]
    fn raw_is_passthrough() {
        let payload = "{ \"entries\" : [ ],\n  \"zeta\": 1, \"alpha\": 2 }\n";
        let t = Transcript::parse(payload).unwrap();
        assert_eq!(to_raw(&t), payload);
        assert_eq!(render(&t, OutputFormat::Raw).body, payload);
    }

    #[test]
    fn render_tags_format() {
        let t = transcript(&[("A", "hi")]);
        for format in OutputFormat::ALL {
            let doc = render(&t, format);
            assert_eq!(doc.format, format);
            assert_eq!(doc.extension(), format.extension());
        }
        assert_eq!(render(&t, OutputFormat::Cue).mime_type(), "text/vtt");
    }

    #[test]
    fn file_naming_table() {
        assert_eq!(
            OutputFormat::Raw.file_suffix().to_string() + OutputFormat::Raw.extension(),
            "_transcript.json"
        );
        assert_eq!(OutputFormat::Cue.extension(), ".vtt");
        assert_eq!(OutputFormat::Grouped.file_suffix(), "_transcript_grouped");
        assert_eq!(OutputFormat::Grouped.mime_type(), "text/plain");
        assert_eq!(OutputFormat::Raw.mime_type(), "application/json");
    }

    #[test]
    fn previews() {
        let t = transcript(&[("A", "hi")]);
        let grouped = render(&t, OutputFormat::Grouped);
        assert_eq!(grouped.preview(DEFAULT_PREVIEW_LIMIT), "A: hi...");
        assert_eq!(grouped.preview(3), "A: ...");

        let raw = RenderedDocument {
            format: OutputFormat::Raw,
            body: r#"{"b":1,"a":[]}"#.to_string(),
        };
        assert_eq!(raw.preview(100), "{\n  \"b\": 1,\n  \"a\": []\n}...");
    }
}
