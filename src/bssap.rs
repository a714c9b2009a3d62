//! BSSAP (Base Station Subsystem Application Part) encoder.
//!
//! Wraps a GSM 04.08 Layer 3 payload either transparently (DTAP) or inside
//! a BSSMAP management message (Complete Layer 3 Information, Clear
//! Command). Each function is a pure encoder: it consumes borrowed input
//! and returns a freshly allocated buffer, never mutating its arguments.

use bytes::{BufMut, Bytes, BytesMut};

/// BSSAP discriminator shared by both DTAP and BSSMAP framings.
const DISCRIMINATOR: u8 = 0x00;

const DTAP_DLCI: u8 = 0x01;

const BSSMAP_COMPLETE_LAYER3: u8 = 0x57;
const BSSMAP_CLEAR_COMMAND: u8 = 0x20;

const IE_CELL_IDENTIFIER: u8 = 0x05;
const IE_LAYER3_INFORMATION: u8 = 0x15;
const IE_CAUSE: u8 = 0x04;

/// Hard-coded MCC/MNC bytes the source emits in Complete-L3's Cell
/// Identifier IE regardless of the real configured MCC/MNC. Preserved
/// intentionally (see design notes); [`complete_l3_dynamic`] offers the
/// alternative that packs the real values.
const HARDCODED_MCC_MNC: [u8; 3] = [0x52, 0xF0, 0x99];

/// Wraps `l3` transparently as BSSAP DTAP.
///
/// ```
/// use vmsc_sigtran::bssap::dtap;
/// let out = dtap(&[0xAA, 0xBB]);
/// assert_eq!(out[1], out[3] + 2);
/// ```
pub fn dtap(l3: &[u8]) -> Bytes {
    let mut buf = BytesMut::with_capacity(4 + l3.len());
    buf.put_u8(DISCRIMINATOR);
    buf.put_u8(l3.len() as u8 + 2);
    buf.put_u8(DTAP_DLCI);
    buf.put_u8(l3.len() as u8);
    buf.put_slice(l3);
    buf.freeze()
}

/// Wraps `l3` in a BSSMAP Complete Layer 3 Information message, using the
/// preserved hard-coded MCC/MNC bytes (see [`HARDCODED_MCC_MNC`]).
pub fn complete_l3(l3: &[u8], cell_id: u16, lac: u16) -> Bytes {
    complete_l3_with_mcc_mnc(l3, cell_id, lac, HARDCODED_MCC_MNC)
}

/// Wraps `l3` in a BSSMAP Complete Layer 3 Information message, packing the
/// Cell Identifier IE's MCC/MNC from the caller-supplied values instead of
/// the preserved hard-coded bytes. Opt-in alternative to [`complete_l3`].
pub fn complete_l3_dynamic(l3: &[u8], mcc: u16, mnc: u16, cell_id: u16, lac: u16) -> Bytes {
    let mcc_str = format!("{mcc:03}");
    let mnc_str = format!("{mnc:02}");
    let mcc_digits: Vec<u32> = mcc_str.chars().map(|c| c.to_digit(10).expect("decimal MCC")).collect();
    let mnc_digits: Vec<u32> = mnc_str.chars().map(|c| c.to_digit(10).expect("decimal MNC")).collect();
    let mcc_mnc = [
        (mcc_digits[1] as u8) << 4 | mcc_digits[0] as u8,
        0xF0 | mcc_digits[2] as u8,
        (mnc_digits[1] as u8) << 4 | mnc_digits[0] as u8,
    ];
    complete_l3_with_mcc_mnc(l3, cell_id, lac, mcc_mnc)
}

fn complete_l3_with_mcc_mnc(l3: &[u8], cell_id: u16, lac: u16, mcc_mnc: [u8; 3]) -> Bytes {
    let mut buf = BytesMut::with_capacity(16 + l3.len());
    buf.put_u8(DISCRIMINATOR);
    let len_index = buf.len();
    buf.put_u8(0); // length, backfilled below
    buf.put_u8(BSSMAP_COMPLETE_LAYER3);

    buf.put_u8(IE_CELL_IDENTIFIER);
    buf.put_u8(0x08);
    buf.put_u8(0x01); // whole CGI discriminator
    buf.put_slice(&mcc_mnc);
    buf.put_u8((lac >> 8) as u8);
    buf.put_u8(lac as u8);
    buf.put_u8((cell_id >> 8) as u8);
    buf.put_u8(cell_id as u8);

    buf.put_u8(IE_LAYER3_INFORMATION);
    buf.put_u8(l3.len() as u8);
    buf.put_slice(l3);

    let total_len = buf.len();
    buf[len_index] = (total_len - 2) as u8;
    buf.freeze()
}

/// Generates a BSSMAP Clear Command with the given cause value.
///
/// ```
/// use vmsc_sigtran::bssap::clear_command;
/// assert_eq!(&clear_command(0x09)[..], &[0x00, 0x04, 0x20, 0x04, 0x01, 0x09][..]);
/// ```
pub fn clear_command(cause: u8) -> Bytes {
    let mut buf = BytesMut::with_capacity(6);
    buf.put_u8(DISCRIMINATOR);
    buf.put_u8(0x04);
    buf.put_u8(BSSMAP_CLEAR_COMMAND);
    buf.put_u8(IE_CAUSE);
    buf.put_u8(0x01);
    buf.put_u8(cause);
    buf.freeze()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dtap_invariant_holds() {
        let out = dtap(&[0x05, 0x08, 0x00]);
        assert_eq!(out[1], out[3] + 2);
        assert_eq!(&out[..], &[0x00, 0x05, 0x01, 0x03, 0x05, 0x08, 0x00]);
    }

    #[test]
    fn clear_command_scenario() {
        assert_eq!(&clear_command(0x09)[..], &[0x00, 0x04, 0x20, 0x04, 0x01, 0x09]);
    }

    #[test]
    fn complete_l3_uses_hardcoded_mcc_mnc() {
        let l3 = [0xAA, 0xBB];
        let out = complete_l3(&l3, 0x1234, 0x3039);
        assert_eq!(out[3], 0x05); // Cell Identifier IE tag
        assert_eq!(out[4], 0x08); // length
        assert_eq!(out[5], 0x01); // whole CGI
        assert_eq!(&out[6..9], &[0x52, 0xF0, 0x99]);
        assert_eq!(&out[9..11], &[0x30, 0x39]); // LAC
        assert_eq!(&out[11..13], &[0x12, 0x34]); // Cell ID
        assert_eq!(out[13], 0x15); // Layer 3 Information IE tag
        assert_eq!(out[14], l3.len() as u8);
        assert_eq!(&out[15..], &l3);
        assert_eq!(out[1] as usize, out.len() - 2);
    }

    #[test]
    fn complete_l3_dynamic_packs_real_mcc_mnc() {
        let out = complete_l3_dynamic(&[0xAA], 250, 99, 0, 12345);
        assert_eq!(&out[6..9], &[0x52, 0xF0, 0x99]);
    }
}
