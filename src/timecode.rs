//! Conversion between textual time codes and seconds.
//!
//! Each format has its own strict grammar:
//!
//! - SRT: `HH:MM:SS,mmm`
//! - ASS/SSA: `H:MM:SS.cc` (one or two hour digits)
//! - WebVTT: `HH:MM:SS.mmm`

use crate::error::SubtitleError;
use crate::format::SubtitleFormat;

use nom::bytes::complete::{tag, take_while_m_n};
use nom::character::complete::char;
use nom::combinator::map_res;
use nom::error::VerboseError;
use nom::IResult;

#[derive(Debug, Clone, Copy)]
struct Layout {
    min_hour_digits: usize,
    max_hour_digits: usize,
    separator: char,
    fraction_digits: usize,
}

impl Layout {
    fn of(format: SubtitleFormat) -> Self {
        match format {
            SubtitleFormat::Srt => Layout {
                min_hour_digits: 2,
                max_hour_digits: 2,
                separator: ',',
                fraction_digits: 3,
            },
            SubtitleFormat::Ass | SubtitleFormat::Ssa => Layout {
                min_hour_digits: 1,
                max_hour_digits: 2,
                separator: '.',
                fraction_digits: 2,
            },
            SubtitleFormat::Vtt => Layout {
                min_hour_digits: 2,
                max_hour_digits: 2,
                separator: '.',
                fraction_digits: 3,
            },
        }
    }

    fn fraction_scale(&self) -> u64 {
        10u64.pow(self.fraction_digits as u32)
    }
}

/// Parses `text` as a time code of the given format, returning seconds.
pub fn parse(text: &str, format: SubtitleFormat) -> Result<f64, SubtitleError> {
    let layout = Layout::of(format);
    match timecode(text, layout) {
        Ok(("", seconds)) => Ok(seconds),
        _ => Err(SubtitleError::MalformedTimeCode {
            text: text.to_string(),
            format,
        }),
    }
}

/// Formats `seconds` as a time code of the given format. Negative values clamp to zero and
/// the sub-second part is rounded to the format's precision.
pub fn format(seconds: f64, format: SubtitleFormat) -> String {
    let layout = Layout::of(format);
    let scale = layout.fraction_scale();
    let units = (seconds.max(0.0) * scale as f64).round() as u64;
    let fraction = units % scale;
    let total_secs = units / scale;
    let hours = total_secs / 3600;
    let minutes = (total_secs % 3600) / 60;
    let secs = total_secs % 60;

    match format {
        SubtitleFormat::Srt => format!("{:02}:{:02}:{:02},{:03}", hours, minutes, secs, fraction),
        SubtitleFormat::Ass | SubtitleFormat::Ssa => {
            format!("{}:{:02}:{:02}.{:02}", hours, minutes, secs, fraction)
        }
        SubtitleFormat::Vtt => format!("{:02}:{:02}:{:02}.{:03}", hours, minutes, secs, fraction),
    }
}

fn timecode(input: &str, layout: Layout) -> IResult<&str, f64, VerboseError<&str>> {
    let (input, hours) = digits(input, layout.min_hour_digits, layout.max_hour_digits)?;
    let (input, _) = tag(":")(input)?;
    let (input, minutes) = digits(input, 2, 2)?;
    let (input, _) = tag(":")(input)?;
    let (input, seconds) = digits(input, 2, 2)?;
    let (input, _) = char(layout.separator)(input)?;
    let (input, fraction) = digits(input, layout.fraction_digits, layout.fraction_digits)?;

    let whole = hours * 3600 + minutes * 60 + seconds;
    Ok((
        input,
        whole as f64 + fraction as f64 / layout.fraction_scale() as f64,
    ))
}

fn digits(input: &str, min: usize, max: usize) -> IResult<&str, u64, VerboseError<&str>> {
    map_res(
        take_while_m_n(min, max, |c: char| c.is_ascii_digit()),
        |s: &str| s.parse::<u64>(),
    )(input)
}
