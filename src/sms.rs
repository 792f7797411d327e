//! Reading received SMS messages out of a modem's message store.
//!
//! Actually talking to the modem - sending `AT+CMGF=0` and `AT+CMGR=<index>`, holding whatever lock
//! guards the serial port, and un-hexing the response - is the job of a transport, which plugs in
//! here by implementing `PduSource`. `read_sms` then does the rest.
//!
//! Decoding holds no state of its own, so there's no need to keep the transport's lock held while
//! it runs (though it does no harm either).
use std::convert::TryFrom;
use std::collections::HashMap;
use failure::Fail;
use num_derive::FromPrimitive;
use num_traits::FromPrimitive;
use crate::errors::*;
use crate::hex::HexData;
use crate::pdu::{SmsDeliver, decode_sms_deliver};

/// The storage status of an SMS message (as returned in `AT+CMGR` / `AT+CMGL`).
#[repr(u8)]
#[derive(Fail, Debug, FromPrimitive, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MessageStatus {
    /// Received and unread.
    #[fail(display = "Unread")]
    ReceivedUnread = 0,
    /// Received and read.
    #[fail(display = "Read")]
    ReceivedRead = 1,
    /// Outgoing and unsent.
    #[fail(display = "Unsent")]
    StoredUnsent = 2,
    /// Outgoing and sent.
    #[fail(display = "Sent")]
    StoredSent = 3
}
impl TryFrom<u32> for MessageStatus {
    type Error = PduError;
    fn try_from(stat: u32) -> PduResult<Self> {
        MessageStatus::from_u32(stat)
            .ok_or(PduError::InvalidParameter("unknown message status"))
    }
}
/// One message, as fetched from the modem's message store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawPdu {
    /// The message status (read, unread, etc.)
    pub status: MessageStatus,
    /// Length of the PDU in octets, as reported by the modem. This doesn't include the service
    /// centre address.
    pub length: usize,
    /// The PDU itself, starting with the service centre address.
    pub bytes: Vec<u8>
}
/// Something that can fetch raw PDUs out of a modem's message store.
///
/// Implementors are expected to serialise access to the modem themselves.
pub trait PduSource {
    type Error: Fail;

    /// Fetch the message stored at `index`.
    fn fetch_pdu(&mut self, index: u32) -> Result<RawPdu, Self::Error>;
}
/// Read and decode the message stored at `index`.
///
/// The length reported by the transport is checked against the bytes it actually returned
/// before anything is decoded; trailing bytes past the reported length are ignored.
pub fn read_sms<S: PduSource>(source: &mut S, index: u32) -> Result<SmsDeliver, ReadError<S::Error>> {
    let raw = source.fetch_pdu(index)
        .map_err(ReadError::Transport)?;
    let scalen = *raw.bytes.first()
        .ok_or(PduError::InvalidParameter("transport returned an empty PDU"))? as usize;
    let total = scalen.checked_add(1)
        .and_then(|n| n.checked_add(raw.length))
        .ok_or(PduError::InvalidParameter("length reported by the modem is too large"))?;
    if raw.bytes.len() < total {
        debug!("message {}: modem reported {} bytes (+{} SMSC), got {}", index, raw.length, scalen + 1, raw.bytes.len());
        Err(PduError::InvalidParameter("PDU shorter than the length reported by the modem"))?
    }
    let mut sms = decode_sms_deliver(&raw.bytes, total)?;
    sms.status = Some(raw.status);
    Ok(sms)
}
/// Errors from a `MemoryStore`.
#[derive(Fail, Debug)]
pub enum MemoryStoreError {
    #[fail(display = "No message stored at index {}", _0)]
    NoSuchMessage(u32),
    #[fail(display = "Stored message is malformed: {}", _0)]
    Malformed(#[cause] PduError)
}
/// A `PduSource` over hex-encoded PDUs held in memory, keyed by index.
///
/// Useful for tests, and for decoding PDUs that have been saved somewhere.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    messages: HashMap<u32, (MessageStatus, String)>
}
impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
    /// Store a hex-encoded PDU (starting with the service centre address) at `index`.
    pub fn insert(&mut self, index: u32, status: MessageStatus, hex: &str) {
        self.messages.insert(index, (status, hex.trim().to_owned()));
    }
}
impl PduSource for MemoryStore {
    type Error = MemoryStoreError;

    fn fetch_pdu(&mut self, index: u32) -> Result<RawPdu, MemoryStoreError> {
        let (status, hex) = self.messages.get(&index)
            .ok_or(MemoryStoreError::NoSuchMessage(index))?;
        let bytes = HexData::decode(hex)
            .map_err(MemoryStoreError::Malformed)?;
        let scalen = bytes.first().map(|&l| l as usize + 1).unwrap_or(0);
        Ok(RawPdu {
            status: *status,
            length: bytes.len().saturating_sub(scalen),
            bytes
        })
    }
}
#[cfg(test)]
mod test {
    use super::*;

    const HELLO: &str = "07917283010010F5040BC87238880900F10000993092516195800AE8329BFD4697D9EC37";

    struct FixedSource(RawPdu);
    impl PduSource for FixedSource {
        type Error = MemoryStoreError;
        fn fetch_pdu(&mut self, _: u32) -> Result<RawPdu, MemoryStoreError> {
            Ok(self.0.clone())
        }
    }

    #[test]
    fn status_from_integer() {
        assert_eq!(MessageStatus::try_from(1u32), Ok(MessageStatus::ReceivedRead));
        assert!(MessageStatus::try_from(4u32).unwrap_err().is_invalid_parameter());
        assert_eq!(MessageStatus::StoredSent.to_string(), "Sent");
    }
    #[test]
    fn read_from_memory_store() {
        let mut store = MemoryStore::new();
        store.insert(3, MessageStatus::ReceivedUnread, HELLO);
        let sms = read_sms(&mut store, 3).unwrap();
        assert_eq!(sms.status, Some(MessageStatus::ReceivedUnread));
        assert_eq!(sms.user_data.text.as_str(), "hellohello");
        match read_sms(&mut store, 4) {
            Err(ReadError::Transport(MemoryStoreError::NoSuchMessage(4))) => {},
            x => panic!("unexpected result: {:?}", x)
        }
    }
    #[test]
    fn reported_length_checked() {
        let bytes = HexData::decode(HELLO).unwrap();
        let mut source = FixedSource(RawPdu {
            status: MessageStatus::ReceivedRead,
            length: bytes.len(),
            bytes: bytes.clone()
        });
        match read_sms(&mut source, 0) {
            Err(ReadError::Pdu(e)) => assert!(e.is_invalid_parameter()),
            x => panic!("unexpected result: {:?}", x)
        }
        // Trailing junk past the reported length is ignored.
        let mut padded = bytes.clone();
        padded.extend_from_slice(&[0xFF, 0xFF]);
        let mut source = FixedSource(RawPdu {
            status: MessageStatus::ReceivedRead,
            length: bytes.len() - 8,
            bytes: padded
        });
        let sms = read_sms(&mut source, 0).unwrap();
        assert_eq!(sms.status, Some(MessageStatus::ReceivedRead));
        assert_eq!(sms.user_data.length, 10);
    }
    #[test]
    fn huge_reported_length() {
        let mut source = FixedSource(RawPdu {
            status: MessageStatus::ReceivedUnread,
            length: usize::MAX,
            bytes: vec![0x00, 0x04]
        });
        match read_sms(&mut source, 0) {
            Err(ReadError::Pdu(e)) => assert!(e.is_invalid_parameter()),
            x => panic!("unexpected result: {:?}", x)
        }
    }
    #[test]
    fn malformed_hex() {
        let mut store = MemoryStore::new();
        store.insert(0, MessageStatus::ReceivedRead, "0791Z");
        match read_sms(&mut store, 0) {
            Err(ReadError::Transport(MemoryStoreError::Malformed(_))) => {},
            x => panic!("unexpected result: {:?}", x)
        }
    }
}
