use crate::cue::Cue;
use crate::error::SubtitleError;

use tracing::{debug, warn};

/// An immutable, start-time ordered cue sequence with "active cue at time T" lookup.
///
/// Overlapping cues are accepted. When several cues are active at the same time the lookup
/// returns whichever one the binary search reaches first, which depends on the ordering and
/// is not necessarily the earliest.
#[derive(Debug, Clone, PartialEq)]
pub struct CueStore {
    cues: Vec<Cue>,
}

impl CueStore {
    /// Sorts `cues` by start time, keeping file order among equal start times. Cues that end
    /// before they start are dropped.
    pub fn build(cues: Vec<Cue>) -> Result<Self, SubtitleError> {
        let mut cues: Vec<Cue> = cues
            .into_iter()
            .filter(|cue| {
                let valid = cue.end_time >= cue.start_time;
                if !valid {
                    warn!(
                        start = cue.start_time,
                        end = cue.end_time,
                        text = %cue.text,
                        "Dropping cue that ends before it starts"
                    );
                }
                valid
            })
            .collect();

        if cues.is_empty() {
            return Err(SubtitleError::NoCuesFound);
        }
        cues.sort_by(|a, b| a.start_time.total_cmp(&b.start_time));
        debug!(count = cues.len(), "Built cue store");

        Ok(Self { cues })
    }

    pub fn active_cue_at(&self, time: f64) -> Option<&Cue> {
        self.position_at(time).map(|i| &self.cues[i])
    }

    fn position_at(&self, time: f64) -> Option<usize> {
        if time.is_nan() {
            return None;
        }
        let mut low = 0;
        let mut high = self.cues.len();
        while low < high {
            let mid = low + (high - low) / 2;
            let cue = &self.cues[mid];
            if time < cue.start_time {
                high = mid;
            } else if time > cue.end_time {
                low = mid + 1;
            } else {
                return Some(mid);
            }
        }
        None
    }

    pub fn cues(&self) -> &[Cue] {
        &self.cues
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Cue> {
        self.cues.iter()
    }

    pub fn len(&self) -> usize {
        self.cues.len()
    }

    /// Always false for a successfully built store.
    pub fn is_empty(&self) -> bool {
        self.cues.is_empty()
    }

    /// The latest end time of any cue.
    pub fn end_time(&self) -> f64 {
        self.cues.iter().map(|c| c.end_time).fold(0.0, f64::max)
    }
}

impl<'a> IntoIterator for &'a CueStore {
    type Item = &'a Cue;
    type IntoIter = std::slice::Iter<'a, Cue>;

    fn into_iter(self) -> Self::IntoIter {
        self.cues.iter()
    }
}

/// Remembers the last hit so that forward playback usually finds the active cue without a
/// full search. Falls back to [`CueStore::active_cue_at`]'s search on a miss.
///
/// A cursor must only be used with the store it was first used with; call
/// [`CueCursor::reset`] when the store is replaced.
#[derive(Debug, Default, Clone, Copy)]
pub struct CueCursor {
    last: Option<usize>,
}

impl CueCursor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        self.last = None;
    }

    pub fn seek<'a>(&mut self, store: &'a CueStore, time: f64) -> Option<&'a Cue> {
        if let Some(last) = self.last {
            for i in [last, last + 1] {
                if let Some(cue) = store.cues.get(i) {
                    if cue.contains(time) {
                        self.last = Some(i);
                        return Some(cue);
                    }
                }
            }
        }

        let found = store.position_at(time)?;
        self.last = Some(found);
        Some(&store.cues[found])
    }
}
