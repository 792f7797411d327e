//! The `gsm-pdu` library decodes GSM 03.40 SMS-DELIVER PDUs (Protocol Data Units), as reported
//! by AT/Hayes-style cellular modems when reading messages back out of their message store in PDU
//! mode (`AT+CMGR` / `AT+CMGL` with `AT+CMGF=0`).
//!
//! The decoder is a pure function over a byte slice: it keeps no state between calls, performs no
//! I/O, and writes only into fixed-capacity (`heapless`) storage inside the record it returns, so
//! it's fine to call it from anywhere, on any thread, with or without the modem lock held.
//!
//! ```rust,ignore
//! use gsm_pdu::hex::HexData;
//! use gsm_pdu::pdu::decode_sms_deliver;
//!
//! let bytes = HexData::decode("0791448720003023040C914497...")?;
//! let sms = decode_sms_deliver(&bytes, bytes.len())?;
//! println!("{}: {}", sms.originating_address, sms.user_data.text);
//! ```
//!
//! Talking to the modem itself isn't this library's job; the `sms` module just describes what it
//! expects from whatever does that (see `sms::PduSource`).

#[macro_use] extern crate log;
#[macro_use] extern crate failure_derive;
#[macro_use] extern crate derive_is_enum_variant;

/// Bail out with an `InvalidParameter` error if `$offset` is past the end of `$b`.
macro_rules! check_offset {
    ($b:ident, $offset:ident, $reason:expr) => {
        if $b.get($offset).is_none() {
            return Err(PduError::InvalidParameter(concat!("Offset check failed for: ", $reason)));
        }
    }
}

pub mod errors;
pub mod address;
pub mod timestamp;
pub mod gsm_encoding;
pub mod pdu;
pub mod hex;
pub mod sms;

pub use crate::errors::{PduError, PduResult};
pub use crate::pdu::{decode_sms_deliver, SmsDeliver};
