//! Download meeting transcripts and convert them to WebVTT subtitles or
//! speaker-grouped plain text.
//!
//! The conversion engine ([`timestamp`], [`transcript`], [`render`]) is pure
//! and synchronous. [`fetch`] and [`deliver`] are the thin I/O edges the
//! command-line tool wraps around it.

pub mod cli;
pub mod config;
pub mod deliver;
pub mod fetch;
pub mod render;
pub mod timestamp;
pub mod transcript;

pub use render::{render, OutputFormat, RenderedDocument};
pub use transcript::{DecodeError, MalformedTimestamp, Transcript, TranscriptEntry};

#[derive(Debug, thiserror::Error)]
pub enum ConvertError {
    #[error(transparent)]
    Decode(#[from] DecodeError),
    #[error(transparent)]
    Timestamp(#[from] MalformedTimestamp),
}

/// Decodes `payload` and renders it as `format`.
///
/// With `strict` set, a cue document is refused if any entry has an offset
/// that does not parse, instead of carrying `NaN:NaN:000NaN` into the output.
/// The other formats never look at offsets.
pub fn convert(
    payload: impl Into<String>,
    format: OutputFormat,
    strict: bool,
) -> Result<RenderedDocument, ConvertError> {
    let transcript = Transcript::parse(payload)?;
    if strict && format == OutputFormat::Cue {
        transcript.check_timestamps()?;
    }
    Ok(render(&transcript, format))
}
