use subcue::{
    serialiser, timecode, Cue, CueStore, DisplaySink, PlaybackEvent, PlaybackSession,
    SessionConfig, SubtitleFormat, SubtitleService, SubtitleUpdate, TimingPolicy,
};

use std::io::{self, Read};
use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser as ClapParser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() {
    init_logging();
    match run() {
        Ok(()) => (),
        Err(err) => {
            eprintln!("An error occurred: {}", err);
            for cause in err.chain().skip(1) {
                eprintln!("    {}", cause);
            }
            std::process::exit(1);
        }
    }
}

fn init_logging() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "subcue=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
}

#[derive(ClapParser)]
#[command(about = "Inspect and play back SRT, ASS/SSA and WebVTT subtitles")]
struct Cli {
    #[arg(
        short,
        long,
        value_name = "FILE",
        help = "The subtitle file to read from. If not supplied, the subtitles will be read from standard input.",
        default_value = "-"
    )]
    input: String,
    #[arg(
        short,
        long,
        value_name = "FORMAT",
        help = "Subtitle format (srt, ass, ssa or vtt). Defaults to the extension of the input file."
    )]
    format: Option<String>,
    #[arg(
        long,
        value_name = "SECONDS",
        help = "Shift subtitles: the cue shown at playback time T is the one active at T + SECONDS.",
        default_value_t = 0.0,
        allow_negative_numbers = true
    )]
    offset: f64,
    #[arg(
        long,
        help = "Drop cues with unreadable timing instead of placing them at zero."
    )]
    strict: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print every cue in playback order.
    List,
    /// Print the cue active at each of the given times (in seconds).
    At {
        #[arg(required = true, allow_negative_numbers = true)]
        times: Vec<f64>,
    },
    /// Simulate playback and print every change of the displayed subtitle.
    Play {
        #[arg(long, value_name = "SECONDS", default_value_t = 0.1, help = "Time between playback ticks.")]
        step: f64,
        #[arg(long, value_name = "SECONDS", help = "Stop playback here. Defaults to the end of the last cue.")]
        until: Option<f64>,
    },
    /// Write the subtitles out in another format.
    Convert {
        #[arg(long, value_name = "FORMAT")]
        to: SubtitleFormat,
        #[arg(
            short,
            long,
            value_name = "FILE",
            help = "The file to write to. If not supplied, the subtitles will be written to standard output."
        )]
        output: Option<String>,
    },
    /// Find the subtitle file belonging to a video.
    Locate {
        #[arg(value_name = "VIDEO")]
        video: PathBuf,
    },
}

impl Cli {
    fn config(&self) -> SessionConfig {
        SessionConfig {
            time_offset: self.offset,
            policy: self.policy(),
            ..SessionConfig::default()
        }
    }

    fn policy(&self) -> TimingPolicy {
        if self.strict {
            TimingPolicy::Strict
        } else {
            TimingPolicy::Lenient
        }
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    match &cli.command {
        Command::List => {
            let (data, hint) = read_subtitles(&cli)?;
            let store = load_store(&cli, &data, &hint)?;
            for cue in &store {
                print_cue(cue);
            }
        }
        Command::At { times } => {
            let (data, hint) = read_subtitles(&cli)?;
            let mut session = PlaybackSession::with_config(TerminalSink::default(), cli.config());
            if session.load(&data, &hint)? == 0 {
                bail!("No subtitles could be read from '{}'", cli.input);
            }
            for &time in times {
                let text = session.active_cue_at(time).map_or("-".to_string(), |c| one_line(&c.text));
                println!("{}\t{}", timecode::format(time, SubtitleFormat::Vtt), text);
            }
        }
        Command::Play { step, until } => {
            let (data, hint) = read_subtitles(&cli)?;
            play(&cli, &data, &hint, *step, *until)?;
        }
        Command::Convert { to, output } => {
            let (data, hint) = read_subtitles(&cli)?;
            let store = load_store(&cli, &data, &hint)?;
            let cues = shifted(&store, cli.offset);
            let written = match output {
                Some(path) => {
                    let file = std::fs::File::create(path)
                        .with_context(|| format!("Failed to create output file: '{}'", path))?;
                    serialiser::serialise(&cues, *to, file)
                }
                None => serialiser::serialise(&cues, *to, io::stdout()),
            };
            written.context("Failed to write subtitles")?;
        }
        Command::Locate { video } => {
            let found = locate_subtitle(video)
                .ok_or_else(|| anyhow!("No subtitle file found for '{}'", video.display()))?;
            println!("{}", found.display());
        }
    }

    Ok(())
}

/// The subtitle text and its format hint.
fn read_subtitles(cli: &Cli) -> Result<(String, String)> {
    let hint = format_hint(cli)?;
    let data = read_input(&cli.input)?;
    Ok((data, hint))
}

fn read_input(input: &str) -> Result<String> {
    if input == "-" {
        let mut buffer = String::new();
        io::stdin()
            .read_to_string(&mut buffer)
            .context("Failed to read from stdin")?;
        Ok(buffer)
    } else {
        std::fs::read_to_string(input).with_context(|| format!("Failed to open input file: '{}'", input))
    }
}

fn format_hint(cli: &Cli) -> Result<String> {
    if let Some(format) = &cli.format {
        return Ok(format.clone());
    }
    Path::new(&cli.input)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_lowercase)
        .ok_or_else(|| anyhow!("Cannot tell the subtitle format of '{}', pass --format", cli.input))
}

fn load_store(cli: &Cli, data: &str, hint: &str) -> Result<CueStore> {
    SubtitleService::with_policy(cli.policy())
        .load(data, hint)
        .with_context(|| format!("Failed to load subtitles: '{}'", cli.input))
}

/// Moves every cue so that it plays at the time the offset would show it.
fn shifted(store: &CueStore, offset: f64) -> Vec<Cue> {
    store
        .iter()
        .map(|cue| Cue {
            start_time: (cue.start_time - offset).max(0.0),
            end_time: (cue.end_time - offset).max(0.0),
            ..cue.clone()
        })
        .collect()
}

fn play(cli: &Cli, data: &str, hint: &str, step: f64, until: Option<f64>) -> Result<()> {
    if step.is_nan() || step <= 0.0 {
        bail!("The playback step must be positive, got {}", step);
    }
    let mut session = PlaybackSession::with_config(TerminalSink::default(), cli.config());
    session.load(data, hint)?;
    let until = match (until, session.store()) {
        (Some(until), _) => until,
        (None, Some(store)) => store.end_time() - cli.offset + step,
        (None, None) => return Ok(()),
    };

    session.handle(PlaybackEvent::Play);
    for event in Ticks::new(step, until) {
        session.handle(event);
        if let PlaybackEvent::TimeUpdate(time) = event {
            print_change(time, session.sink_mut());
        }
    }
    session.handle(PlaybackEvent::Ended);
    print_change(until, session.sink_mut());
    Ok(())
}

fn print_change(time: f64, sink: &mut TerminalSink) {
    if let Some(current) = sink.take_change() {
        let text = current.map_or("-".to_string(), one_line);
        println!("{}\t{}", timecode::format(time, SubtitleFormat::Vtt), text);
    }
}

fn print_cue(cue: &Cue) {
    println!(
        "{}\t{}\t{}",
        timecode::format(cue.start_time, SubtitleFormat::Vtt),
        timecode::format(cue.end_time, SubtitleFormat::Vtt),
        one_line(&cue.text)
    );
}

fn one_line(text: &str) -> String {
    text.replace('\n', " | ")
}

/// Playback clock ticking at a fixed interval from zero.
struct Ticks {
    step: f64,
    until: f64,
    tick: u64,
}

impl Ticks {
    fn new(step: f64, until: f64) -> Self {
        Self { step, until, tick: 0 }
    }
}

impl Iterator for Ticks {
    type Item = PlaybackEvent;

    fn next(&mut self) -> Option<PlaybackEvent> {
        let time = self.tick as f64 * self.step;
        if time > self.until {
            return None;
        }
        self.tick += 1;
        Some(PlaybackEvent::TimeUpdate(time))
    }
}

/// Keeps the displayed text and whether it changed since last asked.
#[derive(Default)]
struct TerminalSink {
    current: Option<String>,
    changed: bool,
}

impl TerminalSink {
    fn take_change(&mut self) -> Option<Option<&str>> {
        if std::mem::take(&mut self.changed) {
            Some(self.current.as_deref())
        } else {
            None
        }
    }
}

impl DisplaySink for TerminalSink {
    fn show(&mut self, update: SubtitleUpdate<'_>) {
        let next = update.visible.then_some(update.text);
        if next != self.current.as_deref() {
            self.current = next.map(String::from);
            self.changed = true;
        }
    }

    fn notify(&mut self, message: &str) {
        eprintln!("{}", message);
    }
}

/// The first file next to `video` with the same base name and a subtitle extension, probing
/// extensions in a fixed order.
fn locate_subtitle(video: &Path) -> Option<PathBuf> {
    SubtitleFormat::ALL
        .iter()
        .map(|format| video.with_extension(format.extension()))
        .find(|candidate| candidate.is_file())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn locate_prefers_srt_then_ass() {
        let dir = tempfile::tempdir().unwrap();
        let video = dir.path().join("movie.mp4");
        std::fs::write(&video, b"").unwrap();
        assert_eq!(locate_subtitle(&video), None);

        std::fs::write(dir.path().join("movie.vtt"), b"WEBVTT\n").unwrap();
        std::fs::write(dir.path().join("movie.ass"), b"[Events]\n").unwrap();
        assert_eq!(locate_subtitle(&video), Some(dir.path().join("movie.ass")));

        std::fs::write(dir.path().join("movie.srt"), b"1\n").unwrap();
        assert_eq!(locate_subtitle(&video), Some(dir.path().join("movie.srt")));
    }

    #[test]
    fn locate_ignores_other_base_names() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("other.srt"), b"1\n").unwrap();
        assert_eq!(locate_subtitle(&dir.path().join("movie.mkv")), None);
    }

    #[test]
    fn ticks_stop_after_until() {
        let times: Vec<_> = Ticks::new(0.5, 1.6).collect();
        assert_eq!(
            times,
            [0.0, 0.5, 1.0, 1.5].map(PlaybackEvent::TimeUpdate)
        );
    }

    #[test]
    fn terminal_sink_reports_changes_only() {
        let mut sink = TerminalSink::default();
        let cue = Cue::new(0.0, 1.0, "Hi");
        sink.show(SubtitleUpdate::HIDDEN);
        assert_eq!(sink.take_change(), None);
        sink.show(SubtitleUpdate::showing(&cue));
        assert_eq!(sink.take_change(), Some(Some("Hi")));
        sink.show(SubtitleUpdate::showing(&cue));
        assert_eq!(sink.take_change(), None);
        sink.show(SubtitleUpdate::HIDDEN);
        assert_eq!(sink.take_change(), Some(None));
    }

    #[test]
    fn play_rejects_non_positive_steps() {
        let cli = Cli::parse_from(["subcue", "--format", "srt", "play"]);
        let srt = "1\n00:00:01,000 --> 00:00:02,000\nHi\n";
        for step in [0.0, -0.5, f64::NAN] {
            assert!(play(&cli, srt, "srt", step, None).is_err());
        }
        assert!(play(&cli, srt, "srt", 0.5, Some(3.0)).is_ok());
    }

    #[test]
    fn locate_needs_no_subtitle_input() {
        let cli = Cli::parse_from(["subcue", "locate", "movie.mp4"]);
        assert!(matches!(cli.command, Command::Locate { .. }));
        assert!(format_hint(&cli).is_err());
    }

    #[test]
    fn format_hint_from_extension_or_flag() {
        let cli = Cli::parse_from(["subcue", "--input", "Movie.SRT", "list"]);
        assert_eq!(format_hint(&cli).unwrap(), "srt");
        let cli = Cli::parse_from(["subcue", "--input", "movie.txt", "--format", "vtt", "list"]);
        assert_eq!(format_hint(&cli).unwrap(), "vtt");
    }

    #[test]
    fn shifting_clamps_at_zero() {
        let store = CueStore::build(vec![Cue::new(1.0, 3.0, "a")]).unwrap();
        let cues = shifted(&store, 2.0);
        assert_eq!(cues[0].start_time, 0.0);
        assert_eq!(cues[0].end_time, 1.0);
    }
}
