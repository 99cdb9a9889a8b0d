/*!
 * Time-code conversions.
 *
 * Caption tracks carry `HH:MM:SS.mmm` millisecond times, while the karaoke
 * renderer expects `H:MM:SS.cc` centisecond times with an unpadded hour
 * field. Both grammars are handled here as exact integer arithmetic.
 */

use crate::errors::CaptionError;

const MS_PER_SECOND: u64 = 1_000;
const MS_PER_MINUTE: u64 = 60_000;
const MS_PER_HOUR: u64 = 3_600_000;

/// Length of `HH:MM:SS.mmm`
pub const TIMECODE_LEN: usize = 12;

/// Parse an `HH:MM:SS.mmm` time code into milliseconds.
///
/// Surrounding whitespace is ignored; anything else that deviates from the
/// fixed-width grammar is rejected.
pub fn parse(text: &str) -> Result<u64, CaptionError> {
    parse_exact(text.trim())
}

/// Parse a time code that must span the whole input, without trimming.
pub(crate) fn parse_exact(text: &str) -> Result<u64, CaptionError> {
    let invalid = || CaptionError::InvalidTimeFormat(text.to_string());

    let bytes = text.as_bytes();
    if bytes.len() != TIMECODE_LEN
        || bytes[2] != b':'
        || bytes[5] != b':'
        || bytes[8] != b'.'
    {
        return Err(invalid());
    }

    let field = |range: std::ops::Range<usize>| -> Option<u64> {
        bytes[range].iter().try_fold(0u64, |acc, b| {
            b.is_ascii_digit().then(|| acc * 10 + u64::from(b - b'0'))
        })
    };

    let hours = field(0..2).ok_or_else(invalid)?;
    let minutes = field(3..5).ok_or_else(invalid)?;
    let seconds = field(6..8).ok_or_else(invalid)?;
    let millis = field(9..12).ok_or_else(invalid)?;

    if minutes >= 60 || seconds >= 60 {
        return Err(invalid());
    }

    Ok(hours * MS_PER_HOUR + minutes * MS_PER_MINUTE + seconds * MS_PER_SECOND + millis)
}

/// Format milliseconds as `HH:MM:SS.mmm`
pub fn format_millis(ms: u64) -> String {
    let hours = ms / MS_PER_HOUR;
    let minutes = (ms % MS_PER_HOUR) / MS_PER_MINUTE;
    let seconds = (ms % MS_PER_MINUTE) / MS_PER_SECOND;
    let millis = ms % MS_PER_SECOND;

    format!("{:02}:{:02}:{:02}.{:03}", hours, minutes, seconds, millis)
}

/// Convert milliseconds to the nearest centisecond, rounding halves up
pub fn millis_to_centiseconds(ms: u64) -> u64 {
    (ms + 5) / 10
}

/// Format milliseconds as the karaoke renderer's `H:MM:SS.cc`
pub fn format_centiseconds(ms: u64) -> String {
    let total_cs = millis_to_centiseconds(ms);
    let cs = total_cs % 100;
    let total_secs = total_cs / 100;
    let secs = total_secs % 60;
    let mins = (total_secs / 60) % 60;
    let hours = total_secs / 3600;

    format!("{}:{:02}:{:02}.{:02}", hours, mins, secs, cs)
}
