use crate::format::SubtitleFormat;

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SubtitleError {
    #[error("No subtitle text supplied")]
    EmptyInput,

    #[error("Unsupported subtitle format: '{0}'")]
    UnsupportedFormat(String),

    #[error("Malformed {format} time code: '{text}'")]
    MalformedTimeCode {
        text: String,
        format: SubtitleFormat,
    },

    #[error("No cues found in subtitle text")]
    NoCuesFound,
}

impl SubtitleError {
    /// A soft failure means the subtitle track is unusable but playback should carry on
    /// without subtitles.
    pub fn is_soft(&self) -> bool {
        matches!(self, SubtitleError::NoCuesFound)
    }
}
