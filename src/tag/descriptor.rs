//! Loop-descriptor value parsing.
//!
//! Two encodings of the loop window are recognized, distinguished by the
//! comment key. The sample-indexed form `OHMSSPD` wraps its fields in angle
//! brackets, `<start|length>`; the time-indexed form `OHMSSPC` deliberately
//! mirrors them, `>start:length<`, with values in microseconds. Anything
//! else the comment scanner accepted is rejected here as corrupted.

use crate::error::{LoopTagError, TagResult};

/// Comment key for the sample-indexed loop form.
pub const KEY_SAMPLES: &str = "OHMSSPD";
/// Comment key for the microsecond-indexed loop form.
pub const KEY_MICROS: &str = "OHMSSPC";

/// A decoded loop window, in the unit its comment form used.
///
/// Constructed once per opened file and immutable afterwards; the streaming
/// controller converts it into absolute sample boundaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopPoints {
    /// `[start, start + length)` in interleaved sample units.
    Samples { start: u64, length: u64 },
    /// `[start, start + length)` in microseconds.
    Micros { start: u64, length: u64 },
}

/// Parse the value string of a located loop comment.
///
/// Malformed brackets, a missing delimiter, empty numeric fields and
/// embedded non-digits are all `Corrupted` - never a silent zero.
pub fn parse_loop_value(key: &str, value: &str) -> TagResult<LoopPoints> {
    match key {
        KEY_SAMPLES => {
            let (start, length) = split_window(value, '<', '>', '|')?;
            Ok(LoopPoints::Samples { start, length })
        }
        KEY_MICROS => {
            let (start, length) = split_window(value, '>', '<', ':')?;
            Ok(LoopPoints::Micros { start, length })
        }
        _ => Err(LoopTagError::Corrupted("unrecognized loop tag key")),
    }
}

fn split_window(value: &str, open: char, close: char, delim: char) -> TagResult<(u64, u64)> {
    const MALFORMED: LoopTagError = LoopTagError::Corrupted("malformed loop tag value");

    let inner = value
        .strip_prefix(open)
        .and_then(|v| v.strip_suffix(close))
        .ok_or(MALFORMED)?;
    let (start, length) = inner.split_once(delim).ok_or(MALFORMED)?;
    Ok((parse_field(start)?, parse_field(length)?))
}

fn parse_field(field: &str) -> TagResult<u64> {
    // u64::from_str would also accept a leading '+'; the wire format is
    // plain digits only.
    if field.is_empty() || !field.bytes().all(|b| b.is_ascii_digit()) {
        return Err(LoopTagError::Corrupted("non-numeric loop tag field"));
    }
    field
        .parse::<u64>()
        .map_err(|_| LoopTagError::Corrupted("loop tag field out of range"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("<0|0>", 0, 0)]
    #[case("<1000|2000>", 1000, 2000)]
    #[case("<18446744073709551615|1>", u64::MAX, 1)]
    fn test_sample_form_accepts(#[case] value: &str, #[case] start: u64, #[case] length: u64) {
        assert_eq!(
            parse_loop_value(KEY_SAMPLES, value).unwrap(),
            LoopPoints::Samples { start, length }
        );
    }

    #[rstest]
    #[case(">0:0<", 0, 0)]
    #[case(">500000:1000000<", 500_000, 1_000_000)]
    fn test_time_form_accepts(#[case] value: &str, #[case] start: u64, #[case] length: u64) {
        assert_eq!(
            parse_loop_value(KEY_MICROS, value).unwrap(),
            LoopPoints::Micros { start, length }
        );
    }

    #[rstest]
    #[case("1000|2000>")] // missing open bracket
    #[case("<1000|2000")] // missing close bracket
    #[case(">1000|2000<")] // mirrored brackets on the sample form
    #[case("<1000 2000>")] // missing delimiter
    #[case("<1000|20a0>")] // embedded non-digit
    #[case("<|2000>")] // empty start field
    #[case("<1000|>")] // empty length field
    #[case("<+1|2>")] // sign is not a digit
    #[case("<18446744073709551616|1>")] // overflows u64
    #[case("")]
    fn test_sample_form_rejects(#[case] value: &str) {
        let err = parse_loop_value(KEY_SAMPLES, value).unwrap_err();
        assert!(matches!(err, LoopTagError::Corrupted(_)), "{}", value);
    }

    #[rstest]
    #[case("<1000:2000>")] // mirrored brackets on the time form
    #[case(">1000|2000<")] // wrong delimiter
    #[case(">1000:2000>")]
    #[case(">:2000<")]
    fn test_time_form_rejects(#[case] value: &str) {
        let err = parse_loop_value(KEY_MICROS, value).unwrap_err();
        assert!(matches!(err, LoopTagError::Corrupted(_)), "{}", value);
    }

    #[test]
    fn test_unrecognized_key_rejected() {
        // The comment scanner accepts any OHMSSP* key; only the two known
        // forms parse.
        let err = parse_loop_value("OHMSSPX", "<1|2>").unwrap_err();
        assert!(matches!(err, LoopTagError::Corrupted(_)));
    }

    #[test]
    fn test_delimiter_split_is_first_occurrence() {
        // A second delimiter lands in the length field and is a non-digit.
        let err = parse_loop_value(KEY_SAMPLES, "<1|2|3>").unwrap_err();
        assert!(matches!(err, LoopTagError::Corrupted(_)));
    }
}
