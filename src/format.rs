use crate::error::SubtitleError;

use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SubtitleFormat {
    Srt,
    Ass,
    Ssa,
    Vtt,
}

impl SubtitleFormat {
    /// Every supported format, in the order a host should probe for sibling files.
    pub const ALL: [SubtitleFormat; 4] = [
        SubtitleFormat::Srt,
        SubtitleFormat::Ass,
        SubtitleFormat::Ssa,
        SubtitleFormat::Vtt,
    ];

    pub fn extension(self) -> &'static str {
        match self {
            SubtitleFormat::Srt => "srt",
            SubtitleFormat::Ass => "ass",
            SubtitleFormat::Ssa => "ssa",
            SubtitleFormat::Vtt => "vtt",
        }
    }
}

impl FromStr for SubtitleFormat {
    type Err = SubtitleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim();
        let name = name.strip_prefix('.').unwrap_or(name);
        SubtitleFormat::ALL
            .iter()
            .copied()
            .find(|f| f.extension().eq_ignore_ascii_case(name))
            .ok_or_else(|| SubtitleError::UnsupportedFormat(s.to_string()))
    }
}

impl fmt::Display for SubtitleFormat {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        write!(fmt, "{}", self.extension().to_uppercase())
    }
}
