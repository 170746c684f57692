use crate::error::SubtitleError;
use crate::format::SubtitleFormat;
use crate::parser::{Parser, TimingPolicy};
use crate::store::CueStore;

use tracing::debug;

/// Turns raw subtitle text into a [`CueStore`]. Performs no I/O.
#[derive(Debug, Default, Clone, Copy)]
pub struct SubtitleService {
    parser: Parser,
}

impl SubtitleService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_policy(policy: TimingPolicy) -> Self {
        Self {
            parser: Parser::with_policy(policy),
        }
    }

    /// `format_hint` is a file extension such as `"srt"`, matched case-insensitively.
    ///
    /// Fails with [`SubtitleError::EmptyInput`] or [`SubtitleError::UnsupportedFormat`] when
    /// nothing can be parsed at all, and with the soft [`SubtitleError::NoCuesFound`] when the
    /// text parsed but held no usable cue.
    pub fn load(&self, raw_text: &str, format_hint: &str) -> Result<CueStore, SubtitleError> {
        let cues = self.parser.parse_named(raw_text, format_hint)?;
        debug!(format = format_hint, parsed = cues.len(), "Loading subtitles");
        CueStore::build(cues)
    }

    pub fn load_format(&self, raw_text: &str, format: SubtitleFormat) -> Result<CueStore, SubtitleError> {
        let cues = self.parser.parse(raw_text, format)?;
        debug!(%format, parsed = cues.len(), "Loading subtitles");
        CueStore::build(cues)
    }
}
