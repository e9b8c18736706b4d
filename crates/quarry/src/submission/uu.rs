//! uuencoded-line codec.
//!
//! The legacy transfer encoding packs 3 payload bytes into 4 printable
//! characters, at most 45 bytes per line, with the line's first character
//! carrying the byte count. Characters map through `(c - 0x20) & 0x3F`,
//! backtick standing in for space as the zero digit.

use crate::error::{QuarryError, Result};

/// Maximum payload bytes per encoded line.
const MAX_LINE_BYTES: usize = 45;

fn digit(c: u8) -> Result<u8> {
    if (0x20..=0x60).contains(&c) {
        Ok(c.wrapping_sub(0x20) & 0x3F)
    } else {
        Err(QuarryError::MalformedEncoding(format!(
            "invalid encoding character {c:#04x}"
        )))
    }
}

/// Decode one uuencoded body line into its payload bytes.
///
/// The count character may announce up to 45 bytes; a zero count (space or
/// backtick) decodes to nothing. Truncated groups and characters outside the
/// encoding alphabet are malformed.
pub(crate) fn decode_line(line: &str) -> Result<Vec<u8>> {
    let bytes = line.as_bytes();
    let Some(&count_char) = bytes.first() else {
        return Err(QuarryError::MalformedEncoding("empty encoded line".into()));
    };
    let count = digit(count_char)? as usize;
    if count == 0 {
        return Ok(Vec::new());
    }
    if count > MAX_LINE_BYTES {
        return Err(QuarryError::MalformedEncoding(format!(
            "length {count} exceeds the 45-byte line limit"
        )));
    }
    let groups = count.div_ceil(3);
    let data = &bytes[1..];
    if data.len() < groups * 4 {
        return Err(QuarryError::MalformedEncoding(format!(
            "line truncated: {} encoding characters for {count} bytes",
            data.len()
        )));
    }
    let mut out = Vec::with_capacity(groups * 3);
    for group in data[..groups * 4].chunks_exact(4) {
        let mut d = [0u8; 4];
        for (slot, &c) in d.iter_mut().zip(group) {
            *slot = digit(c)?;
        }
        out.push((d[0] << 2) | (d[1] >> 4));
        out.push((d[1] << 4) | (d[2] >> 2));
        out.push((d[2] << 6) | d[3]);
    }
    out.truncate(count);
    Ok(out)
}

/// Encode one line of up to 45 bytes; the inverse of [`decode_line`],
/// kept for tests.
#[cfg(test)]
pub(crate) fn encode_line(data: &[u8]) -> String {
    fn enc(d: u8) -> u8 {
        if d == 0 { b'`' } else { d + 0x20 }
    }
    assert!(data.len() <= MAX_LINE_BYTES);
    let mut line = vec![enc(data.len() as u8)];
    for chunk in data.chunks(3) {
        let b = [
            chunk[0],
            chunk.get(1).copied().unwrap_or(0),
            chunk.get(2).copied().unwrap_or(0),
        ];
        line.push(enc(b[0] >> 2));
        line.push(enc(((b[0] << 4) | (b[1] >> 4)) & 0x3F));
        line.push(enc(((b[1] << 2) | (b[2] >> 6)) & 0x3F));
        line.push(enc(b[2] & 0x3F));
    }
    String::from_utf8(line).unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_every_length_up_to_a_full_line() {
        let payload: Vec<u8> = (0u8..=255).cycle().take(MAX_LINE_BYTES).collect();
        for len in 1..=MAX_LINE_BYTES {
            let line = encode_line(&payload[..len]);
            assert_eq!(decode_line(&line).unwrap(), &payload[..len], "length {len}");
        }
    }

    #[test]
    fn zero_count_line_decodes_to_nothing() {
        assert_eq!(decode_line("`").unwrap(), Vec::<u8>::new());
        assert_eq!(decode_line(" ").unwrap(), Vec::<u8>::new());
    }

    #[test]
    fn backtick_and_space_are_interchangeable_zeros() {
        // "Cat" encodes to #0V%T with no zero digits; force some by
        // encoding a payload ending in 0x00.
        let line = encode_line(&[0x00, 0x00, 0x01]);
        let with_spaces = line.replace('`', " ");
        assert_eq!(decode_line(&line).unwrap(), [0x00, 0x00, 0x01]);
        assert_eq!(decode_line(&with_spaces).unwrap(), [0x00, 0x00, 0x01]);
    }

    #[test]
    fn classic_cat_vector() {
        // The canonical example: "Cat" uuencodes to "#0V%T".
        assert_eq!(decode_line("#0V%T").unwrap(), b"Cat");
        assert_eq!(encode_line(b"Cat"), "#0V%T");
    }

    #[test]
    fn rejects_characters_outside_the_alphabet() {
        let err = decode_line("#0V~T").unwrap_err();
        assert!(matches!(err, QuarryError::MalformedEncoding(_)));
    }

    #[test]
    fn rejects_truncated_lines() {
        let err = decode_line("#0V").unwrap_err();
        assert!(matches!(err, QuarryError::MalformedEncoding(_)));
    }

    #[test]
    fn rejects_impossible_length() {
        // 'N' announces 46 bytes, one past the 45-byte limit.
        let err = decode_line("NAAAA").unwrap_err();
        assert!(matches!(err, QuarryError::MalformedEncoding(_)));
    }
}
