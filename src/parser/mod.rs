//! Text subtitle parsers.
//!
//! Every parser returns cues in the order they appear in the file. Sorting is left to
//! [`CueStore`](crate::store::CueStore).

mod ass;
mod srt;
mod vtt;

use crate::cue::Cue;
use crate::error::SubtitleError;
use crate::format::SubtitleFormat;
use crate::timecode;

use regex::Regex;
use tracing::warn;

/// What to do with a cue whose timing cannot be read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimingPolicy {
    /// Substitute zero for the unreadable time and keep the cue.
    #[default]
    Lenient,
    /// Drop the cue.
    Strict,
}

impl TimingPolicy {
    pub(crate) fn resolve<T: Default>(self, parsed: Result<T, SubtitleError>) -> Option<T> {
        match parsed {
            Ok(value) => Some(value),
            Err(err) => match self {
                TimingPolicy::Lenient => {
                    warn!(error = %err, "Substituting zero for unreadable cue timing");
                    Some(T::default())
                }
                TimingPolicy::Strict => {
                    warn!(error = %err, "Dropping cue with unreadable timing");
                    None
                }
            },
        }
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct Parser {
    policy: TimingPolicy,
}

impl Parser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_policy(policy: TimingPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> TimingPolicy {
        self.policy
    }

    pub fn parse(&self, input: &str, format: SubtitleFormat) -> Result<Vec<Cue>, SubtitleError> {
        if input.is_empty() {
            return Err(SubtitleError::EmptyInput);
        }
        let input = input.strip_prefix('\u{FEFF}').unwrap_or(input);

        let cues = match format {
            SubtitleFormat::Srt => srt::parse(input, self.policy),
            SubtitleFormat::Ass | SubtitleFormat::Ssa => ass::parse(input, format, self.policy),
            SubtitleFormat::Vtt => vtt::parse(input, self.policy),
        };
        Ok(cues)
    }

    /// Like [`Parser::parse`], with the format given by name (a file extension such as `"srt"`).
    pub fn parse_named(&self, input: &str, format: &str) -> Result<Vec<Cue>, SubtitleError> {
        if input.is_empty() {
            return Err(SubtitleError::EmptyInput);
        }
        self.parse(input, format.parse()?)
    }
}

/// Finds a `start --> end` range anywhere on `line` and converts both ends.
fn time_range(line: &str, pattern: &Regex, format: SubtitleFormat) -> Result<(f64, f64), SubtitleError> {
    match pattern.captures(line) {
        Some(caps) => {
            let start = timecode::parse(&caps[1], format)?;
            let end = timecode::parse(&caps[2], format)?;
            Ok((start, end))
        }
        None => Err(SubtitleError::MalformedTimeCode {
            text: line.to_string(),
            format,
        }),
    }
}

/// Collects the text lines starting at `*pos` up to the next blank line or the first line
/// matching `ends_cue`, leaving `*pos` on that line (or at the end).
fn cue_text(lines: &[&str], pos: &mut usize, ends_cue: impl Fn(&str) -> bool) -> String {
    let mut text = String::new();
    while let Some(&line) = lines.get(*pos) {
        if line.trim().is_empty() || ends_cue(line) {
            break;
        }
        text.push_str(line);
        text.push('\n');
        *pos += 1;
    }
    text.truncate(text.trim_end().len());
    text
}
