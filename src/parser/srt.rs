use super::{cue_text, time_range, TimingPolicy};
use crate::cue::Cue;
use crate::format::SubtitleFormat;

use std::sync::OnceLock;

use regex::Regex;
use tracing::debug;

fn range_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"([0-9]{2}:[0-9]{2}:[0-9]{2},[0-9]{3}) --> ([0-9]{2}:[0-9]{2}:[0-9]{2},[0-9]{3})")
            .expect("valid SRT time range pattern")
    })
}

/// An integer line opens a block, the next line holds its time range and everything up to
/// the following blank line is text.
pub(super) fn parse(input: &str, policy: TimingPolicy) -> Vec<Cue> {
    let lines: Vec<&str> = input.lines().collect();
    let mut cues = Vec::new();
    let mut pos = 0;

    while pos < lines.len() {
        let line = lines[pos].trim();
        pos += 1;
        let index = match index_line(line) {
            Some(index) => index,
            None => continue,
        };

        let range = lines.get(pos).map_or("", |l| l.trim());
        pos += 1;
        let times = policy.resolve(time_range(range, range_pattern(), SubtitleFormat::Srt));
        let text = cue_text(&lines, &mut pos, |_| false);

        if let Some((start_time, end_time)) = times {
            let mut cue = Cue::new(start_time, end_time, text);
            cue.index = index;
            cues.push(cue);
        }
    }

    debug!(count = cues.len(), "Parsed SRT cues");
    cues
}

/// `Some` for any integer line, signed or too large for a sequence number. The inner value
/// is the sequence number when it fits in a `u32`.
fn index_line(line: &str) -> Option<Option<u32>> {
    let digits = line.strip_prefix(['-', '+']).unwrap_or(line);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some(line.parse().ok())
}
