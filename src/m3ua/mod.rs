//! M3UA (MTP3 User Adaptation) encoder.
//!
//! Emits a single fixed framing: a DATA message carrying one Protocol Data
//! parameter. This front-end never brings an ASP up or down over this
//! transport (it is UDP-framed, not SCTP), so the general multi-TLV M3UA
//! parameter model and the ASPSM/ASPTM message classes are not needed —
//! only this one wire shape is produced.

use bytes::{BufMut, Bytes, BytesMut};

const VERSION: u8 = 0x01;
const RESERVED: u8 = 0x00;
const MSG_CLASS_TRANSFER: u8 = 0x01;
const MSG_TYPE_DATA: u8 = 0x01;
const TAG_PROTOCOL_DATA: u16 = 0x0210;

/// Service Indicator values carried in the Protocol Data parameter.
pub mod service_indicator {
    pub const SNM: u8 = 0x00;
    pub const SCCP: u8 = 0x03;
    pub const TUP: u8 = 0x04;
    pub const ISUP: u8 = 0x05;
}

/// The MTP3 routing label plus message-priority fields every M3UA DATA
/// message carries alongside its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoutingLabel {
    pub opc: u32,
    pub dpc: u32,
    pub si: u8,
    pub ni: u8,
    pub mp: u8,
    pub sls: u8,
}

/// Wraps `payload` (an SCCP or ISUP message) in an M3UA DATA message per
/// the routing label in `label`, zero-padding the payload to a 4-byte
/// boundary.
///
/// ```
/// use vmsc_sigtran::m3ua::{wrap_data, RoutingLabel, service_indicator};
/// let payload = vec![0u8; 20];
/// let label = RoutingLabel { opc: 14001, dpc: 14002, si: service_indicator::SCCP, ni: 3, mp: 0, sls: 0 };
/// let out = wrap_data(&payload, label);
/// assert_eq!(out.len(), 44);
/// assert_eq!(&out[..8], &[0x01, 0x00, 0x01, 0x01, 0x00, 0x00, 0x00, 0x2C]);
/// ```
pub fn wrap_data(payload: &[u8], label: RoutingLabel) -> Bytes {
    let padding = (4 - (payload.len() % 4)) % 4;
    let proto_data_len = payload.len() + 16; // OPC+DPC+SI+NI+MP+SLS + payload
    let param_len = proto_data_len + 4; // + Tag + Length

    let mut buf = BytesMut::with_capacity(8 + param_len + padding);

    buf.put_u8(VERSION);
    buf.put_u8(RESERVED);
    buf.put_u8(MSG_CLASS_TRANSFER);
    buf.put_u8(MSG_TYPE_DATA);
    buf.put_u32(0); // message length, backfilled below

    buf.put_u16(TAG_PROTOCOL_DATA);
    buf.put_u16(param_len as u16);
    buf.put_u32(label.opc);
    buf.put_u32(label.dpc);
    buf.put_u8(label.si);
    buf.put_u8(label.ni);
    buf.put_u8(label.mp);
    buf.put_u8(label.sls);
    buf.put_slice(payload);
    buf.put_bytes(0, padding);

    let total_len = buf.len() as u32;
    buf[4..8].copy_from_slice(&total_len.to_be_bytes());

    buf.freeze()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrap_scenario() {
        let payload = vec![0u8; 20];
        let label = RoutingLabel { opc: 14001, dpc: 14002, si: service_indicator::SCCP, ni: 3, mp: 0, sls: 0 };
        let out = wrap_data(&payload, label);
        assert_eq!(out.len(), 44);
        assert_eq!(
            &out[..24],
            &[
                0x01, 0x00, 0x01, 0x01, 0x00, 0x00, 0x00, 0x2C, 0x02, 0x10, 0x00, 0x24, 0x00, 0x00, 0x36, 0xB1, 0x00,
                0x00, 0x36, 0xB2, 0x03, 0x03, 0x00, 0x00,
            ]
        );
    }

    #[test]
    fn message_length_matches_buffer_length() {
        for payload_len in [0usize, 1, 3, 4, 17, 100] {
            let payload = vec![0u8; payload_len];
            let label = RoutingLabel { opc: 1, dpc: 2, si: service_indicator::SCCP, ni: 2, mp: 0, sls: 0 };
            let out = wrap_data(&payload, label);
            let msg_len = u32::from_be_bytes([out[4], out[5], out[6], out[7]]) as usize;
            assert_eq!(msg_len, out.len());
            assert_eq!((msg_len - 8) % 4, 0);
        }
    }

    #[test]
    fn pads_to_four_byte_boundary() {
        let label = RoutingLabel { opc: 1, dpc: 2, si: service_indicator::SCCP, ni: 2, mp: 0, sls: 0 };
        let out = wrap_data(&[0xAA, 0xBB, 0xCC], label);
        // 16 (protocol data fixed fields) + 3 payload = 19, padded to 20.
        assert_eq!(out.len() - (8 + 4), 20);
        assert_eq!(out[out.len() - 1], 0x00);
    }
}
