//! Subtitle timelines for media playback.
//!
//! Text subtitles (SRT, ASS/SSA, WebVTT) are parsed into [`Cue`]s, collected in a
//! start-time ordered [`CueStore`] and queried with "which cue is active at time T" while a
//! video plays.
//!
//! ```
//! use subcue::SubtitleService;
//!
//! let srt = "1\n00:00:01,000 --> 00:00:02,500\nHello\n";
//! let store = SubtitleService::new().load(srt, "srt").unwrap();
//! assert_eq!(store.active_cue_at(2.0).unwrap().text, "Hello");
//! assert!(store.active_cue_at(3.0).is_none());
//! ```

pub mod cue;
pub mod error;
pub mod format;
pub mod parser;
pub mod serialiser;
pub mod service;
pub mod session;
pub mod store;
pub mod timecode;

pub use cue::Cue;
pub use error::SubtitleError;
pub use format::SubtitleFormat;
pub use parser::{Parser, TimingPolicy};
pub use service::SubtitleService;
pub use session::{
    DisplaySink, PlaybackEvent, PlaybackSession, PlaybackSource, SessionConfig, SubtitleUpdate,
};
pub use store::{CueCursor, CueStore};
