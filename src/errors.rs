//! Error types.
use failure::Fail;

/// Error returned by a transport-backed read (see the `sms` module): either the transport itself
/// failed, or it handed back something that didn't decode.
#[derive(Fail, Debug)]
pub enum ReadError<T> where T: Fail {
    #[fail(display = "Error in transport: {}", _0)]
    Transport(#[cause] T),
    #[fail(display = "{}", _0)]
    Pdu(#[cause] PduError)
}
impl<T> From<PduError> for ReadError<T> where T: Fail {
    fn from(e: PduError) -> ReadError<T> {
        ReadError::Pdu(e)
    }
}
/// An error encountered while decoding a PDU.
///
/// Every variant carries a short, static description of the field or feature involved. All of
/// these are deterministic: decoding the same bytes again will fail in the same way.
#[derive(Fail, Debug, Clone, Copy, PartialEq, Eq, is_enum_variant)]
pub enum PduError {
    /// The input was malformed or truncated.
    #[fail(display = "Invalid parameter: {}", _0)]
    InvalidParameter(&'static str),
    /// The decoded content doesn't fit in its fixed-capacity destination.
    #[fail(display = "Out of space: {}", _0)]
    NoMemory(&'static str),
    /// The PDU uses a protocol feature that this library recognises, but doesn't decode.
    #[fail(display = "Not implemented: {}", _0)]
    NotImplemented(&'static str),
    /// An internal inconsistency; this should never be returned.
    #[fail(display = "Unknown error: {}", _0)]
    Unknown(&'static str)
}
pub type PduResult<T> = Result<T, PduError>;
