use crate::cue::Cue;
use crate::format::SubtitleFormat;
use crate::timecode;

use std::io::{self, BufWriter, Write};

/// Writes `cues` to `dst` as a complete subtitle file. SRT blocks are renumbered from 1 in
/// the order given.
pub fn serialise<W: Write>(cues: &[Cue], format: SubtitleFormat, dst: W) -> io::Result<()> {
    let mut writer = BufWriter::new(dst);
    match format {
        SubtitleFormat::Srt => write_srt(&mut writer, cues)?,
        SubtitleFormat::Vtt => write_vtt(&mut writer, cues)?,
        SubtitleFormat::Ass | SubtitleFormat::Ssa => write_ass(&mut writer, cues, format)?,
    }
    writer.flush()
}

fn write_srt<W: Write>(buf: &mut W, cues: &[Cue]) -> io::Result<()> {
    for (seqnum, cue) in (1..).zip(cues) {
        writeln!(buf, "{}", seqnum)?;
        write_range(buf, cue, SubtitleFormat::Srt)?;
        write_text(buf, &cue.text)?;
        writeln!(buf)?;
    }
    Ok(())
}

fn write_vtt<W: Write>(buf: &mut W, cues: &[Cue]) -> io::Result<()> {
    writeln!(buf, "WEBVTT")?;
    for cue in cues {
        writeln!(buf)?;
        write_range(buf, cue, SubtitleFormat::Vtt)?;
        write_text(buf, &cue.text)?;
    }
    Ok(())
}

fn write_ass<W: Write>(buf: &mut W, cues: &[Cue], format: SubtitleFormat) -> io::Result<()> {
    let (script_type, styles) = match format {
        SubtitleFormat::Ssa => ("v4.00", "[V4 Styles]"),
        _ => ("v4.00+", "[V4+ Styles]"),
    };
    writeln!(buf, "[Script Info]")?;
    writeln!(buf, "ScriptType: {}", script_type)?;
    writeln!(buf)?;
    writeln!(buf, "{}", styles)?;
    writeln!(buf, "Format: Name, Fontname, Fontsize")?;
    writeln!(buf, "Style: Default,Arial,20")?;
    writeln!(buf)?;
    writeln!(buf, "[Events]")?;
    writeln!(
        buf,
        "Format: Layer, Start, End, Style, Name, MarginL, MarginR, MarginV, Effect, Text"
    )?;
    for cue in cues {
        writeln!(
            buf,
            "Dialogue: 0,{},{},Default,,0,0,0,,{}",
            timecode::format(cue.start_time, format),
            timecode::format(cue.end_time, format),
            cue.text.replace('\n', "\\N")
        )?;
    }
    Ok(())
}

fn write_range<W: Write>(buf: &mut W, cue: &Cue, format: SubtitleFormat) -> io::Result<()> {
    writeln!(
        buf,
        "{} --> {}",
        timecode::format(cue.start_time, format),
        timecode::format(cue.end_time, format)
    )
}

/// Blank lines would end the block early, so they are left out.
fn write_text<W: Write>(buf: &mut W, text: &str) -> io::Result<()> {
    for line in text.lines().filter(|l| !l.trim().is_empty()) {
        writeln!(buf, "{}", line)?;
    }
    Ok(())
}
