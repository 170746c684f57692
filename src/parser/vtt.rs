use super::{cue_text, time_range, TimingPolicy};
use crate::cue::Cue;
use crate::format::SubtitleFormat;

use std::sync::OnceLock;

use regex::Regex;
use tracing::debug;

const ARROW: &str = "-->";

fn range_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"([0-9]{2}:[0-9]{2}:[0-9]{2}\.[0-9]{3}) --> ([0-9]{2}:[0-9]{2}:[0-9]{2}\.[0-9]{3})")
            .expect("valid WebVTT time range pattern")
    })
}

/// Every line containing `-->` opens a cue; the header, `NOTE` and `STYLE` blocks never do
/// and are skipped along with cue identifiers.
pub(super) fn parse(input: &str, policy: TimingPolicy) -> Vec<Cue> {
    let lines: Vec<&str> = input.lines().collect();
    let mut cues = Vec::new();
    let mut pos = 0;

    while pos < lines.len() {
        let line = lines[pos].trim();
        pos += 1;
        if !line.contains(ARROW) {
            continue;
        }

        let times = policy.resolve(time_range(line, range_pattern(), SubtitleFormat::Vtt));
        let index = identifier(&lines, pos - 1);
        let text = cue_text(&lines, &mut pos, |l| l.contains(ARROW));

        if let Some((start_time, end_time)) = times {
            let mut cue = Cue::new(start_time, end_time, text);
            cue.index = index;
            cues.push(cue);
        }
    }

    debug!(count = cues.len(), "Parsed WebVTT cues");
    cues
}

/// A numeric cue identifier directly above the timing line. The identifier must open its
/// block, so the line above it has to be blank (or the start of input).
fn identifier(lines: &[&str], timing: usize) -> Option<u32> {
    let at = timing.checked_sub(1)?;
    let opens_block = match at.checked_sub(1) {
        Some(before) => lines[before].trim().is_empty(),
        None => true,
    };
    if !opens_block {
        return None;
    }
    lines[at].trim().parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_cue() {
        let cues = parse("WEBVTT\n\n00:00:00.500 --> 00:00:01.500\nHi\n", TimingPolicy::Lenient);
        assert_eq!(cues, vec![Cue::new(0.5, 1.5, "Hi")]);
    }

    #[test]
    fn header_metadata_and_notes_are_skipped() {
        let input = "WEBVTT - Some title\nKind: captions\nLanguage: en\n\nNOTE written by hand\nstill a note\n\nSTYLE\n::cue { color: red }\n\n00:00:01.000 --> 00:00:02.000\nOne\n";
        let cues = parse(input, TimingPolicy::Lenient);
        assert_eq!(cues, vec![Cue::new(1.0, 2.0, "One")]);
    }

    #[test]
    fn cue_settings_after_range() {
        let input = "WEBVTT\n\n00:00:01.000 --> 00:00:02.000 align:start position:10%\n<v Roger>Hello\nthere\n";
        let cues = parse(input, TimingPolicy::Lenient);
        assert_eq!(cues, vec![Cue::new(1.0, 2.0, "<v Roger>Hello\nthere")]);
    }

    #[test]
    fn identifiers() {
        let input = "WEBVTT\n\n1\n00:00:01.000 --> 00:00:02.000\nA\n\nintro\n00:00:03.000 --> 00:00:04.000\nB\n";
        let cues = parse(input, TimingPolicy::Lenient);
        assert_eq!(cues[0].index, Some(1));
        assert_eq!(cues[1].index, None);
    }

    #[test]
    fn numeric_text_is_not_the_next_identifier() {
        let input = "WEBVTT\n\n00:00:01.000 --> 00:00:02.000\n42\n00:00:03.000 --> 00:00:04.000\nB\n";
        let cues = parse(input, TimingPolicy::Lenient);
        assert_eq!(
            cues,
            vec![Cue::new(1.0, 2.0, "42"), Cue::new(3.0, 4.0, "B")]
        );
    }

    #[test]
    fn identifier_on_first_line() {
        let cues = parse("7\n00:00:01.000 --> 00:00:02.000\nA\n", TimingPolicy::Lenient);
        assert_eq!(cues, vec![Cue::new(1.0, 2.0, "A").with_index(7)]);
    }

    #[test]
    fn adjacent_cues_without_blank_line() {
        let input = "WEBVTT\n\n00:00:01.000 --> 00:00:02.000\nA\n00:00:03.000 --> 00:00:04.000\nB\n";
        let cues = parse(input, TimingPolicy::Lenient);
        assert_eq!(
            cues,
            vec![Cue::new(1.0, 2.0, "A"), Cue::new(3.0, 4.0, "B")]
        );
    }

    #[test]
    fn short_timestamps_are_malformed() {
        let input = "WEBVTT\n\n00:01.000 --> 00:02.000\nShort\n\n00:00:03.000 --> 00:00:04.000\nLong\n";
        let lenient = parse(input, TimingPolicy::Lenient);
        assert_eq!(
            lenient,
            vec![Cue::new(0.0, 0.0, "Short"), Cue::new(3.0, 4.0, "Long")]
        );
        let strict = parse(input, TimingPolicy::Strict);
        assert_eq!(strict, vec![Cue::new(3.0, 4.0, "Long")]);
    }

    #[test]
    fn no_timing_lines() {
        assert!(parse("WEBVTT\n\nNOTE nothing here\n", TimingPolicy::Lenient).is_empty());
    }
}
