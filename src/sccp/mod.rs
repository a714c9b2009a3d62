//! SCCP (Signalling Connection Control Part) encoder.
//!
//! Emits the two SCCP message forms this front-end needs: Connection
//! Request (CR), which opens a transaction and allocates a fresh Source
//! Local Reference, and Data Form 1 (DT1), which carries a subsequent
//! message on an already-established connection.

use bytes::{BufMut, Bytes, BytesMut};
use std::sync::atomic::{AtomicU32, Ordering};

const SCCP_CR: u8 = 0x01;
const SCCP_DT1: u8 = 0x06;
const PROTOCOL_CLASS_2: u8 = 0x02;
const ADDRESS_INDICATOR_SSN_ONLY: u8 = 0x42;

/// 24-bit SCCP Source Local Reference, process-wide, initial value
/// `0x000001`, incremented after every CR emission and wrapped at 2^24.
pub struct LocalReferenceCounter {
    next: AtomicU32,
}

impl LocalReferenceCounter {
    pub fn new() -> Self {
        Self { next: AtomicU32::new(1) }
    }

    /// Allocates the next reference and advances the counter, wrapping at
    /// 2^24 rather than overflowing into the unused top byte.
    pub fn allocate(&self) -> u32 {
        self.next
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |v| Some((v + 1) & 0x00FF_FFFF))
            .unwrap_or(0)
    }

    /// Resets the counter to its initial value. Test-only convenience so
    /// tests don't depend on execution order.
    pub fn reset(&self) {
        self.next.store(1, Ordering::SeqCst);
    }
}

impl Default for LocalReferenceCounter {
    fn default() -> Self {
        Self::new()
    }
}

/// Emits an SCCP Connection Request wrapping `bssap`, allocating the
/// Source Local Reference from `counter` and incrementing it afterwards.
pub fn connection_request(counter: &LocalReferenceCounter, ssn: u8, bssap: &[u8]) -> Bytes {
    let slr = counter.allocate();

    let mut buf = BytesMut::with_capacity(9 + bssap.len());
    buf.put_u8(SCCP_CR);
    buf.put_u8((slr & 0xFF) as u8);
    buf.put_u8(((slr >> 8) & 0xFF) as u8);
    buf.put_u8(((slr >> 16) & 0xFF) as u8);
    buf.put_u8(PROTOCOL_CLASS_2);
    buf.put_u8(0x03); // pointer to Called Party Address
    buf.put_u8(0x05 + bssap.len() as u8); // pointer to Data
    buf.put_u8(0x02); // Called Party Address length
    buf.put_u8(ADDRESS_INDICATOR_SSN_ONLY);
    buf.put_u8(ssn);
    buf.put_u8(bssap.len() as u8);
    buf.put_slice(bssap);
    buf.freeze()
}

/// Emits an SCCP Data Form 1 message wrapping `bssap`, keyed by the
/// peer-allocated Destination Local Reference.
pub fn data_form1(dest_local_ref: u32, bssap: &[u8]) -> Bytes {
    let mut buf = BytesMut::with_capacity(6 + bssap.len());
    buf.put_u8(SCCP_DT1);
    buf.put_u8((dest_local_ref & 0xFF) as u8);
    buf.put_u8(((dest_local_ref >> 8) & 0xFF) as u8);
    buf.put_u8(((dest_local_ref >> 16) & 0xFF) as u8);
    buf.put_u8(0x00); // segmenting/reassembling: none
    buf.put_u8(bssap.len() as u8);
    buf.put_slice(bssap);
    buf.freeze()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cr_envelope_scenario() {
        let counter = LocalReferenceCounter::new();
        let bssap = [0u8; 10];
        let out = connection_request(&counter, 0xFE, &bssap);
        assert_eq!(
            &out[..11],
            &[0x01, 0x01, 0x00, 0x00, 0x02, 0x03, 0x0F, 0x02, 0x42, 0xFE, 0x0A]
        );
        assert_eq!(counter.allocate(), 2);
    }

    #[test]
    fn local_reference_increments_strictly() {
        let counter = LocalReferenceCounter::new();
        let first = counter.allocate();
        let second = counter.allocate();
        let third = counter.allocate();
        assert_eq!([first, second, third], [1, 2, 3]);
    }

    #[test]
    fn local_reference_wraps_at_24_bits() {
        let counter = LocalReferenceCounter::new();
        counter.next.store(0x00FF_FFFF, Ordering::SeqCst);
        assert_eq!(counter.allocate(), 0);
    }

    #[test]
    fn dt1_envelope() {
        let bssap = [0xAA, 0xBB];
        let out = data_form1(0x1234, &bssap);
        assert_eq!(&out[..], &[0x06, 0x34, 0x12, 0x00, 0x00, 0x02, 0xAA, 0xBB]);
    }
}
