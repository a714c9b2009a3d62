//! BCD (binary-coded decimal) codec.
//!
//! Packs decimal digit strings into half-byte pairs for IMSI, MSISDN, and
//! E.164 Global Title representation, matching the convention used by the
//! A-interface identity fields and by the SCCP/BSSAP layers above it.

use crate::errors::EncodingError;
use bytes::{BufMut, BytesMut};

/// Filler nibble used to pad an odd-length digit string.
const FILLER_NIBBLE: u8 = 0xF;

/// Packs `digits` two per byte, low nibble first. The high nibble of the
/// final byte is the filler nibble `0xF` when `digits` has odd length.
///
/// ```
/// use vmsc_sigtran::bcd::encode;
/// assert_eq!(encode("12345").unwrap(), vec![0x21, 0x43, 0xF5]);
/// ```
pub fn encode(digits: &str) -> Result<Vec<u8>, EncodingError> {
    let mut out = BytesMut::with_capacity(digits.len().div_ceil(2));
    let chars: Vec<char> = digits.chars().collect();

    for (position, chunk) in chars.chunks(2).enumerate() {
        let low = digit_value(chunk[0], position * 2)?;
        let high = match chunk.get(1) {
            Some(&c) => digit_value(c, position * 2 + 1)?,
            None => FILLER_NIBBLE,
        };
        out.put_u8(low | (high << 4));
    }

    Ok(out.to_vec())
}

fn digit_value(c: char, position: usize) -> Result<u8, EncodingError> {
    c.to_digit(10)
        .map(|d| d as u8)
        .ok_or(EncodingError::InvalidDigit { digit: c, position })
}

/// Unpacks BCD bytes back into a decimal digit string. Reads the low nibble
/// then the high nibble of each byte; a nibble greater than 9 is treated as
/// a filler/terminator and excluded, along with everything after it in that
/// byte (the high nibble of a filler-terminated byte is never read).
///
/// ```
/// use vmsc_sigtran::bcd::decode;
/// assert_eq!(decode(&[0x21, 0x43, 0xF5]), "12345");
/// ```
pub fn decode(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 2);
    for &byte in bytes {
        let low = byte & 0x0F;
        if low > 9 {
            break;
        }
        out.push(char::from_digit(low as u32, 10).expect("low nibble <= 9"));

        let high = byte >> 4;
        if high > 9 {
            break;
        }
        out.push(char::from_digit(high as u32, 10).expect("high nibble <= 9"));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_example() {
        assert_eq!(encode("12345").unwrap(), vec![0x21, 0x43, 0xF5]);
    }

    #[test]
    fn decode_example() {
        assert_eq!(decode(&[0x21, 0x43, 0xF5]), "12345");
    }

    #[test]
    fn even_length_round_trip() {
        let digits = "250990012345";
        let encoded = encode(digits).unwrap();
        assert_eq!(decode(&encoded), digits);
    }

    #[test]
    fn odd_length_round_trip() {
        for digits in ["1", "123", "40455910101", "9"] {
            let encoded = encode(digits).unwrap();
            assert_eq!(decode(&encoded), digits, "round trip for {digits:?}");
        }
    }

    #[test]
    fn rejects_non_digit() {
        let err = encode("12a45").unwrap_err();
        match err {
            EncodingError::InvalidDigit { digit, position } => {
                assert_eq!(digit, 'a');
                assert_eq!(position, 2);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn empty_string_round_trips_to_empty() {
        assert_eq!(encode("").unwrap(), Vec::<u8>::new());
        assert_eq!(decode(&[]), "");
    }
}
