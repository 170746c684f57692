//! Playback-side glue: one session per playback target.
//!
//! The host feeds [`PlaybackEvent`]s in, either one at a time through
//! [`PlaybackSession::handle`] or from a [`PlaybackSource`], and receives what to show on
//! its [`DisplaySink`].

use crate::cue::Cue;
use crate::error::SubtitleError;
use crate::parser::TimingPolicy;
use crate::service::SubtitleService;
use crate::store::{CueCursor, CueStore};

use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PlaybackEvent {
    /// Current playback position in seconds.
    TimeUpdate(f64),
    Play,
    Pause,
    Ended,
}

/// Anything that reports playback events. Every iterator of events is a source.
pub trait PlaybackSource {
    fn next_event(&mut self) -> Option<PlaybackEvent>;
}

impl<I> PlaybackSource for I
where
    I: Iterator<Item = PlaybackEvent>,
{
    fn next_event(&mut self) -> Option<PlaybackEvent> {
        self.next()
    }
}

/// What the display surface should currently show.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SubtitleUpdate<'a> {
    pub text: &'a str,
    pub visible: bool,
}

impl<'a> SubtitleUpdate<'a> {
    pub const HIDDEN: SubtitleUpdate<'a> = SubtitleUpdate {
        text: "",
        visible: false,
    };

    pub fn showing(cue: &'a Cue) -> Self {
        Self {
            text: &cue.text,
            visible: true,
        }
    }
}

pub trait DisplaySink {
    /// Called on every time update while subtitles are visible.
    fn show(&mut self, update: SubtitleUpdate<'_>);

    /// User-facing notices such as "Loaded 12 subtitles".
    fn notify(&mut self, _message: &str) {}
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SessionConfig {
    /// Added to every reported playback time before the lookup.
    pub time_offset: f64,
    pub visible: bool,
    pub policy: TimingPolicy,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            time_offset: 0.0,
            visible: true,
            policy: TimingPolicy::default(),
        }
    }
}

#[derive(Debug)]
pub struct PlaybackSession<S> {
    service: SubtitleService,
    store: Option<CueStore>,
    cursor: CueCursor,
    sink: S,
    time_offset: f64,
    visible: bool,
    playing: bool,
}

impl<S: DisplaySink> PlaybackSession<S> {
    pub fn new(sink: S) -> Self {
        Self::with_config(sink, SessionConfig::default())
    }

    pub fn with_config(sink: S, config: SessionConfig) -> Self {
        Self {
            service: SubtitleService::with_policy(config.policy),
            store: None,
            cursor: CueCursor::new(),
            sink,
            time_offset: config.time_offset,
            visible: config.visible,
            playing: false,
        }
    }

    /// Replaces the current subtitles with those parsed from `raw_text`, returning the number
    /// of cues loaded.
    ///
    /// A track without usable cues is not an error here: the sink is told and playback
    /// continues without subtitles (`Ok(0)`). Empty input and unknown formats are returned as
    /// errors. Either way the previous subtitles are gone.
    pub fn load(&mut self, raw_text: &str, format_hint: &str) -> Result<usize, SubtitleError> {
        self.cursor.reset();
        self.store = None;

        match self.service.load(raw_text, format_hint) {
            Ok(store) => {
                let count = store.len();
                info!(count, format = format_hint, "Loaded subtitles");
                self.sink.notify(&format!("Loaded {} subtitles", count));
                self.store = Some(store);
                Ok(count)
            }
            Err(err) if err.is_soft() => {
                warn!(error = %err, "Continuing without subtitles");
                self.sink.notify("Failed to parse subtitles");
                Ok(0)
            }
            Err(err) => {
                warn!(error = %err, "Failed to load subtitles");
                self.sink.notify("Failed to load subtitles");
                Err(err)
            }
        }
    }

    pub fn handle(&mut self, event: PlaybackEvent) {
        match event {
            PlaybackEvent::TimeUpdate(time) => self.update_display(time),
            PlaybackEvent::Play => {
                self.playing = true;
                info!("Subtitle sync started");
            }
            PlaybackEvent::Pause => {
                self.playing = false;
                info!("Subtitle sync stopped");
            }
            PlaybackEvent::Ended => {
                self.playing = false;
                info!("Playback ended");
                self.sink.show(SubtitleUpdate::HIDDEN);
            }
        }
    }

    /// Handles every event from `source` until it runs dry.
    pub fn drive<P: PlaybackSource + ?Sized>(&mut self, source: &mut P) {
        while let Some(event) = source.next_event() {
            self.handle(event);
        }
    }

    fn update_display(&mut self, time: f64) {
        if !self.visible {
            return;
        }
        let time = time + self.time_offset;
        let cue = match &self.store {
            Some(store) => self.cursor.seek(store, time),
            None => None,
        };
        self.sink.show(cue.map_or(SubtitleUpdate::HIDDEN, SubtitleUpdate::showing));
    }

    /// The cue that would be shown at playback time `time`, offset included.
    pub fn active_cue_at(&self, time: f64) -> Option<&Cue> {
        self.store.as_ref()?.active_cue_at(time + self.time_offset)
    }

    /// Drops the loaded subtitles and restores the default offset.
    pub fn reset(&mut self) {
        self.store = None;
        self.cursor.reset();
        self.time_offset = 0.0;
        self.playing = false;
        self.sink.show(SubtitleUpdate::HIDDEN);
        info!("Session reset");
    }

    pub fn set_time_offset(&mut self, offset: f64) {
        self.time_offset = offset;
    }

    pub fn time_offset(&self) -> f64 {
        self.time_offset
    }

    pub fn set_visible(&mut self, visible: bool) {
        if self.visible && !visible {
            self.sink.show(SubtitleUpdate::HIDDEN);
        }
        self.visible = visible;
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn store(&self) -> Option<&CueStore> {
        self.store.as_ref()
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SRT: &str = "1\n00:00:01,000 --> 00:00:02,500\nHello\n\n2\n00:00:03,000 --> 00:00:04,000\nWorld\n";

    #[derive(Debug, Default)]
    struct Recorder {
        shown: Vec<Option<String>>,
        notices: Vec<String>,
    }

    impl DisplaySink for Recorder {
        fn show(&mut self, update: SubtitleUpdate<'_>) {
            self.shown.push(update.visible.then(|| update.text.to_string()));
        }

        fn notify(&mut self, message: &str) {
            self.notices.push(message.to_string());
        }
    }

    fn shown(texts: &[Option<&str>]) -> Vec<Option<String>> {
        texts.iter().map(|t| t.map(String::from)).collect()
    }

    #[test]
    fn time_updates_show_and_hide() {
        let mut session = PlaybackSession::new(Recorder::default());
        assert_eq!(session.load(SRT, "srt"), Ok(2));
        session.drive(&mut [0.5, 1.0, 2.75, 3.5, 5.0].map(PlaybackEvent::TimeUpdate).into_iter());

        let sink = session.into_sink();
        assert_eq!(sink.notices, ["Loaded 2 subtitles"]);
        assert_eq!(sink.shown, shown(&[None, Some("Hello"), None, Some("World"), None]));
    }

    #[test]
    fn offset_shifts_lookups() {
        let config = SessionConfig {
            time_offset: 2.0,
            ..SessionConfig::default()
        };
        let mut session = PlaybackSession::with_config(Recorder::default(), config);
        session.load(SRT, "srt").unwrap();
        assert_eq!(session.active_cue_at(1.5).unwrap().text, "World");

        session.handle(PlaybackEvent::TimeUpdate(0.0));
        session.set_time_offset(0.0);
        session.handle(PlaybackEvent::TimeUpdate(0.0));
        assert_eq!(session.sink().shown, shown(&[Some("Hello"), None]));
    }

    #[test]
    fn hidden_session_sends_nothing_on_ticks() {
        let mut session = PlaybackSession::new(Recorder::default());
        session.load(SRT, "srt").unwrap();
        session.set_visible(false);
        session.handle(PlaybackEvent::TimeUpdate(1.5));
        assert_eq!(session.sink().shown, shown(&[None]));

        session.set_visible(true);
        session.handle(PlaybackEvent::TimeUpdate(1.5));
        assert_eq!(session.sink().shown, shown(&[None, Some("Hello")]));
    }

    #[test]
    fn play_pause_and_end() {
        let mut session = PlaybackSession::new(Recorder::default());
        session.load(SRT, "srt").unwrap();
        session.handle(PlaybackEvent::Play);
        assert!(session.is_playing());
        session.handle(PlaybackEvent::Pause);
        assert!(!session.is_playing());
        session.handle(PlaybackEvent::Play);
        session.handle(PlaybackEvent::TimeUpdate(2.0));
        session.handle(PlaybackEvent::Ended);
        assert!(!session.is_playing());
        assert_eq!(session.sink().shown, shown(&[Some("Hello"), None]));
    }

    #[test]
    fn soft_failure_continues_without_subtitles() {
        let mut session = PlaybackSession::new(Recorder::default());
        session.load(SRT, "srt").unwrap();
        assert_eq!(session.load("WEBVTT\n", "vtt"), Ok(0));
        assert!(session.store().is_none());

        session.handle(PlaybackEvent::TimeUpdate(2.0));
        let sink = session.into_sink();
        assert_eq!(sink.notices, ["Loaded 2 subtitles", "Failed to parse subtitles"]);
        assert_eq!(sink.shown, shown(&[None]));
    }

    #[test]
    fn fatal_failure_is_returned() {
        let mut session = PlaybackSession::new(Recorder::default());
        assert_eq!(session.load("", "srt"), Err(SubtitleError::EmptyInput));
        assert_eq!(
            session.load(SRT, "sub"),
            Err(SubtitleError::UnsupportedFormat("sub".to_string()))
        );
        assert!(session.store().is_none());
    }

    #[test]
    fn reload_replaces_the_track() {
        let mut session = PlaybackSession::new(Recorder::default());
        session.load(SRT, "srt").unwrap();
        session.handle(PlaybackEvent::TimeUpdate(3.5));
        session
            .load("WEBVTT\n\n00:00:03.000 --> 00:00:04.000\nOther\n", "vtt")
            .unwrap();
        session.handle(PlaybackEvent::TimeUpdate(3.5));
        assert_eq!(session.sink().shown, shown(&[Some("World"), Some("Other")]));
    }

    #[test]
    fn reset_clears_track_and_offset() {
        let mut session = PlaybackSession::new(Recorder::default());
        session.load(SRT, "srt").unwrap();
        session.set_time_offset(1.0);
        session.reset();
        assert_eq!(session.time_offset(), 0.0);
        assert!(session.active_cue_at(2.0).is_none());
    }

    #[test]
    fn sessions_are_independent() {
        let mut a = PlaybackSession::new(Recorder::default());
        let mut b = PlaybackSession::new(Recorder::default());
        a.load(SRT, "srt").unwrap();
        b.load("WEBVTT\n\n00:00:01.000 --> 00:00:02.000\nB\n", "vtt").unwrap();
        assert_eq!(a.active_cue_at(1.5).unwrap().text, "Hello");
        assert_eq!(b.active_cue_at(1.5).unwrap().text, "B");
    }
}
