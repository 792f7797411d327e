//! Decoding of GSM 03.40 SMS-DELIVER Protocol Data Units (PDUs).
//!
//! See [this Wikipedia article](https://en.wikipedia.org/wiki/GSM_03.40) for more general
//! information on the format of PDUs.
//!
//! An SMS-DELIVER PDU, as a modem reports it, is laid out as follows:
//!
//! - service centre address (length in octets, type-of-address, digits)
//! - first octet (message type, user data header indicator, etc.)
//! - originating address (length in digits, type-of-address, digits)
//! - protocol identifier
//! - data coding scheme
//! - service centre timestamp (7 bytes)
//! - user data length, then the user data itself
//!
//! `decode_sms_deliver` walks those fields in order. Any error stops it there and then; you
//! never get half a message back. The reserved message type is read as SMS-DELIVER, as GSM 03.40
//! tells phones to do. Other PDU types (SMS-SUBMIT and SMS-SUBMIT-REPORT, SMS-STATUS-REPORT) are
//! recognised but refused with `PduError::NotImplemented`.
use chrono::{DateTime, TimeZone, Utc};
use num_derive::FromPrimitive;
use num_traits::FromPrimitive;
use crate::errors::*;
use crate::address::{Address, AddressLayout, decode_address};
use crate::gsm_encoding::{Encoding, UserData, decode_user_data};
use crate::sms::MessageStatus;
use crate::timestamp::{TIMESTAMP_LENGTH, decode_timestamp};

/// Message type indicator (TP-MTI).
///
/// The same two bits mean different things depending on which way the PDU travels; the names
/// here cover both directions.
#[repr(u8)]
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, FromPrimitive)]
pub enum MessageType {
    /// SMS-DELIVER (to the phone) or SMS-DELIVER-REPORT (from it).
    SmsDeliver = 0b000000_00,
    /// SMS-SUBMIT-REPORT (to the phone) or SMS-SUBMIT (from it). Outgoing messages kept in the
    /// modem's message store are SMS-SUBMIT PDUs.
    SmsSubmitReport = 0b000000_01,
    /// SMS-STATUS-REPORT (to the phone) or SMS-COMMAND (from it).
    SmsStatusReport = 0b000000_10,
    /// Reserved. Phones treat it as SMS-DELIVER.
    Reserved = 0b000000_11
}
/// The first octet of an SMS-DELIVER PDU.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct DeliverFirstOctet {
    pub mti: MessageType,
    /// More messages are waiting for this phone at the service centre.
    pub more_messages_to_send: bool,
    pub status_report_indication: bool,
    /// The user data starts with a user data header.
    pub udhi: bool,
    pub reply_path: bool
}
impl From<u8> for DeliverFirstOctet {
    fn from(b: u8) -> Self {
        let mti = match MessageType::from_u8(b & 0b000000_11) {
            Some(m) => m,
            None => MessageType::Reserved
        };
        // TP-MMS is inverted: a zero bit means there *are* more messages.
        let more_messages_to_send = (b & 0b00000100) == 0;
        let status_report_indication = (b & 0b00100000) > 0;
        let udhi = (b & 0b01000000) > 0;
        let reply_path = (b & 0b10000000) > 0;
        DeliverFirstOctet { mti, more_messages_to_send, status_report_indication, udhi, reply_path }
    }
}
#[repr(u8)]
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, FromPrimitive)]
pub enum MessageWaitingType {
    Voice = 0b000000_00,
    Fax = 0b000000_01,
    Email = 0b000000_10,
    Unknown = 0b000000_11
}
#[repr(u8)]
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, FromPrimitive)]
pub enum MessageClass {
    Silent = 0b000000_00,
    StoreToNv = 0b000000_01,
    StoreToSim = 0b000000_10,
    StoreToTe = 0b000000_11
}
/// The alphabet bits of a general data coding scheme.
#[repr(u8)]
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, FromPrimitive)]
pub enum MessageEncoding {
    Gsm7Bit = 0b0000_00_00,
    EightBit = 0b0000_01_00,
    Ucs2 = 0b0000_10_00,
    Reserved = 0b0000_11_00,
}
/// Data coding scheme (TP-DCS), broken down by coding group (see GSM 03.38 section 4).
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum DataCodingScheme {
    Standard {
        compressed: bool,
        /// Message is marked for automatic deletion once read.
        auto_delete: bool,
        class: Option<MessageClass>,
        encoding: MessageEncoding
    },
    Reserved(u8),
    MessageWaitingDiscard {
        waiting: bool,
        type_indication: MessageWaitingType,
    },
    MessageWaiting {
        waiting: bool,
        type_indication: MessageWaitingType,
        ucs2: bool
    }
}
impl DataCodingScheme {
    /// Work out what encoding the user data is in.
    ///
    /// Reserved coding groups are treated as the GSM 7-bit default alphabet, as GSM 03.38
    /// requires. Compressed data and the reserved alphabet value can't be decoded at all.
    pub fn encoding(&self) -> PduResult<Encoding> {
        use self::DataCodingScheme::*;
        match *self {
            Standard { compressed: true, .. } => {
                Err(PduError::NotImplemented("compressed user data"))
            },
            Standard { encoding, .. } => match encoding {
                MessageEncoding::Gsm7Bit => Ok(Encoding::Gsm7Bit),
                MessageEncoding::EightBit => Ok(Encoding::EightBit),
                MessageEncoding::Ucs2 => Ok(Encoding::Ucs2),
                MessageEncoding::Reserved => Err(PduError::NotImplemented("reserved alphabet in data coding scheme"))
            },
            Reserved(_) => Ok(Encoding::Gsm7Bit),
            MessageWaitingDiscard { .. } => Ok(Encoding::Gsm7Bit),
            MessageWaiting { ucs2, .. } => if ucs2 {
                Ok(Encoding::Ucs2)
            }
            else {
                Ok(Encoding::Gsm7Bit)
            }
        }
    }
}
impl From<u8> for DataCodingScheme {
    fn from(b: u8) -> Self {
        let waiting_type = |b: u8| {
            match MessageWaitingType::from_u8(b & 0b0000_0011) {
                Some(t) => t,
                None => MessageWaitingType::Unknown
            }
        };
        let class = |b: u8| MessageClass::from_u8(b & 0b0000_0011);
        if (b & 0b1000_0000) == 0b0000_0000 {
            let auto_delete = (b & 0b0100_0000) > 0;
            let compressed = (b & 0b0010_0000) > 0;
            let class = if (b & 0b0001_0000) > 0 {
                class(b)
            }
            else {
                None
            };
            let encoding = match MessageEncoding::from_u8(b & 0b0000_1100) {
                Some(e) => e,
                None => MessageEncoding::Reserved
            };
            DataCodingScheme::Standard { compressed, auto_delete, class, encoding }
        }
        else if (b & 0b1111_0000) == 0b1111_0000 {
            let encoding = if (b & 0b0000_0100) > 0 {
                MessageEncoding::EightBit
            }
            else {
                MessageEncoding::Gsm7Bit
            };
            DataCodingScheme::Standard { compressed: false, auto_delete: false, class: class(b), encoding }
        }
        else if (b & 0b1111_0000) == 0b1100_0000 {
            let waiting = (b & 0b0000_1000) > 0;
            DataCodingScheme::MessageWaitingDiscard { waiting, type_indication: waiting_type(b) }
        }
        else if (b & 0b1111_0000) == 0b1101_0000 || (b & 0b1111_0000) == 0b1110_0000 {
            let ucs2 = (b & 0b1111_0000) == 0b1110_0000;
            let waiting = (b & 0b0000_1000) > 0;
            DataCodingScheme::MessageWaiting { ucs2, waiting, type_indication: waiting_type(b) }
        }
        else {
            DataCodingScheme::Reserved(b)
        }
    }
}
/// A decoded SMS-DELIVER PDU - i.e. a received message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmsDeliver {
    /// Storage status of the message. The PDU itself doesn't carry this; it's filled in from the
    /// modem's message listing by `sms::read_sms`, and is `None` otherwise.
    pub status: Option<MessageStatus>,
    /// Service centre address (empty if the modem didn't report one).
    pub sca: Address,
    pub first_octet: DeliverFirstOctet,
    /// The sender.
    pub originating_address: Address,
    /// Protocol identifier (TP-PID), passed through untouched.
    pub pid: u8,
    pub dcs: DataCodingScheme,
    pub encoding: Encoding,
    /// Service centre timestamp, in seconds since the UNIX epoch (UTC).
    pub time: i64,
    pub user_data: UserData
}
impl SmsDeliver {
    /// The service centre timestamp as a `DateTime`.
    pub fn datetime(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_opt(self.time, 0).single()
    }
}
/// Decode the first `length` bytes of `b` as an SMS-DELIVER PDU, starting with the service centre
/// address (as modems report them).
pub fn decode_sms_deliver(b: &[u8], length: usize) -> PduResult<SmsDeliver> {
    if length == 0 || b.is_empty() {
        debug!("no data for PDU decoder");
        return Err(PduError::InvalidParameter("no PDU data"));
    }
    let b = b.get(..length)
        .ok_or(PduError::InvalidParameter("PDU length goes past end of buffer"))?;
    let (sca, mut offset) = decode_address(b, 0, AddressLayout::Octets)?;
    check_offset!(b, offset, "first octet");
    let first_octet = DeliverFirstOctet::from(b[offset]);
    if first_octet.mti != MessageType::SmsDeliver && first_octet.mti != MessageType::Reserved {
        debug!("refusing to decode {:?} PDU", first_octet.mti);
        return Err(PduError::NotImplemented("PDU types other than SMS-DELIVER"));
    }
    offset += 1;
    let (originating_address, consumed) = decode_address(b, offset, AddressLayout::SemiOctets)?;
    offset += consumed;
    check_offset!(b, offset, "protocol identifier");
    let pid = b[offset];
    offset += 1;
    check_offset!(b, offset, "data coding scheme");
    let dcs = DataCodingScheme::from(b[offset]);
    offset += 1;
    let time = decode_timestamp(&b[offset..])?;
    offset += TIMESTAMP_LENGTH;
    check_offset!(b, offset, "user data length");
    let user_data_len = b[offset];
    offset += 1;
    let encoding = dcs.encoding()?;
    let user_data = decode_user_data(&b[offset..], user_data_len, encoding, first_octet.udhi)?;
    trace!("decoded SMS-DELIVER from {}: {} characters", originating_address, user_data.length);
    Ok(SmsDeliver {
        status: None,
        sca,
        first_octet,
        originating_address,
        pid,
        dcs,
        encoding,
        time,
        user_data
    })
}
