use super::TimingPolicy;
use crate::cue::Cue;
use crate::format::SubtitleFormat;
use crate::timecode;

use tracing::debug;

const EVENTS_SECTION: &str = "[Events]";
const DIALOGUE: &str = "Dialogue:";
/// `Layer,Start,End,Style,Name,MarginL,MarginR,MarginV,Effect,Text`
const TEXT_FIELD: usize = 9;

pub(super) fn parse(input: &str, format: SubtitleFormat, policy: TimingPolicy) -> Vec<Cue> {
    let mut in_events = false;
    let mut cues = Vec::new();

    for line in input.lines() {
        let line = line.trim();
        if line == EVENTS_SECTION {
            in_events = true;
            continue;
        }
        if !in_events {
            continue;
        }
        if let Some(fields) = line.strip_prefix(DIALOGUE) {
            if let Some(cue) = dialogue(fields, format, policy) {
                cues.push(cue);
            }
        }
    }

    debug!(count = cues.len(), %format, "Parsed ASS cues");
    cues
}

fn dialogue(fields: &str, format: SubtitleFormat, policy: TimingPolicy) -> Option<Cue> {
    let fields: Vec<&str> = fields.split(',').collect();
    if fields.len() <= TEXT_FIELD {
        debug!(fields = fields.len(), "Skipping short Dialogue line");
        return None;
    }

    let start_time = policy.resolve(timecode::parse(fields[1].trim(), format))?;
    let end_time = policy.resolve(timecode::parse(fields[2].trim(), format))?;
    // The text field may itself contain commas.
    let text = fields[TEXT_FIELD..].join(",").replace("\\N", "\n");

    Some(Cue::new(start_time, end_time, text))
}
