//! Utilities for dealing with the (annoying) GSM 7-bit encoding (GSM 03.38), and decoding message
//! data.
//!
//! "The annoying GSM 7-bit encoding" is otherwise known as [GSM
//! 03.38](https://en.wikipedia.org/wiki/GSM_03.38), and that Wikipedia article is pretty
//! informative. On the wire, characters are 7-bit *septets*, packed least-significant-bit first
//! so that they straddle byte boundaries; `SeptetReader` undoes the packing.
//!
//! Only the default alphabet is decoded. The extended table (reached through the `0x1B` escape
//! septet), 8-bit data and UCS2 data all produce a `NotImplemented` error.
use heapless::String;
use std::convert::TryFrom;
use crate::errors::*;

pub mod udh;

use self::udh::UserDataHeader;

/// Maximum length of decoded message text, including one slot for the terminator that
/// modem-side representations carry. At most `MAX_USER_DATA_LENGTH - 1` characters are decoded.
pub const MAX_USER_DATA_LENGTH: usize = 165;
// Nothing in the default alphabet needs more than two bytes of UTF-8.
const USER_DATA_TEXT_BYTES: usize = 2 * MAX_USER_DATA_LENGTH;

/// Septet that escapes into the extended character table.
pub const GSM_ESCAPE: u8 = 0x1B;

/// The GSM 03.38 default alphabet, indexed by septet value.
///
/// Entry `0x1B` is the escape septet, and is never emitted.
pub static GSM_DEFAULT_ALPHABET: [char; 128] = [
    '@', '£', '$', '¥', 'è', 'é', 'ù', 'ì', 'ò', 'Ç', '\n', 'Ø', 'ø', '\r', 'Å', 'å',
    'Δ', '_', 'Φ', 'Γ', 'Λ', 'Ω', 'Π', 'Ψ', 'Σ', 'Θ', 'Ξ', '\u{1B}', 'Æ', 'æ', 'ß', 'É',
    ' ', '!', '"', '#', '¤', '%', '&', '\'', '(', ')', '*', '+', ',', '-', '.', '/',
    '0', '1', '2', '3', '4', '5', '6', '7', '8', '9', ':', ';', '<', '=', '>', '?',
    '¡', 'A', 'B', 'C', 'D', 'E', 'F', 'G', 'H', 'I', 'J', 'K', 'L', 'M', 'N', 'O',
    'P', 'Q', 'R', 'S', 'T', 'U', 'V', 'W', 'X', 'Y', 'Z', 'Ä', 'Ö', 'Ñ', 'Ü', '§',
    '¿', 'a', 'b', 'c', 'd', 'e', 'f', 'g', 'h', 'i', 'j', 'k', 'l', 'm', 'n', 'o',
    'p', 'q', 'r', 's', 't', 'u', 'v', 'w', 'x', 'y', 'z', 'ä', 'ö', 'ñ', 'ü', 'à',
];

/// Character encoding of a message's user data, as derived from its data coding scheme.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Encoding {
    /// GSM 7-bit default alphabet.
    Gsm7Bit,
    /// Raw 8-bit data.
    EightBit,
    /// UCS2 (effectively UTF-16BE).
    Ucs2
}
/// Bit accumulator used to unpack septets.
///
/// Bytes go in 8 bits at a time with `fill`, and septets come out 7 bits at a time with
/// `drain_septet`, least-significant bits first.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct SeptetReader {
    accumulator: u16,
    bits_held: u8
}
impl SeptetReader {
    pub fn new() -> Self {
        Self::default()
    }
    /// Add another byte's worth of bits above the ones already held.
    ///
    /// There must be room for it, i.e. at most 8 bits held.
    pub fn fill(&mut self, b: u8) -> PduResult<()> {
        if self.bits_held > 8 {
            return Err(PduError::Unknown("SeptetReader filled with more than 8 bits held"));
        }
        self.accumulator |= (b as u16) << self.bits_held;
        self.bits_held += 8;
        Ok(())
    }
    /// Take the next septet out, if at least 7 bits are held.
    pub fn drain_septet(&mut self) -> Option<u8> {
        if self.bits_held < 7 {
            return None;
        }
        let ret = (self.accumulator & 0b0111_1111) as u8;
        self.accumulator >>= 7;
        self.bits_held -= 7;
        Some(ret)
    }
    /// Number of bits currently held.
    pub fn bits_held(&self) -> u8 {
        self.bits_held
    }
    /// The bits currently held, right-aligned.
    pub fn leftover(&self) -> u16 {
        self.accumulator
    }
}
/// Unpack `septets` septets from `data`, and append the characters they represent to `out`.
///
/// The first `skip` septets are discarded without being looked at (this is how a user data
/// header, plus its fill bits, gets stepped over). At most `max_chars` characters are written.
/// Returns the number of characters written.
pub(crate) fn unpack_septets<const N: usize>(data: &[u8], septets: usize, skip: usize, out: &mut String<N>, max_chars: usize) -> PduResult<usize> {
    let byte_count = (septets * 7 + 7) / 8;
    let data = data.get(..byte_count)
        .ok_or(PduError::InvalidParameter("packed septets shorter than declared length"))?;
    let mut reader = SeptetReader::new();
    let mut bytes = data.iter();
    let mut count = 0;
    for i in 0..septets {
        let septet = loop {
            if let Some(s) = reader.drain_septet() {
                break s;
            }
            match bytes.next() {
                Some(&b) => reader.fill(b)?,
                None => return Err(PduError::Unknown("ran out of bytes while unpacking septets"))
            }
        };
        if i < skip {
            continue;
        }
        if septet == GSM_ESCAPE {
            debug!("escape septet at position {}; extended alphabet unsupported", i);
            return Err(PduError::NotImplemented("extended GSM 7-bit alphabet"));
        }
        if count + 1 > max_chars {
            return Err(PduError::NoMemory("decoded text exceeds destination capacity"));
        }
        out.push(GSM_DEFAULT_ALPHABET[septet as usize])
            .map_err(|_| PduError::NoMemory("decoded text buffer full"))?;
        count += 1;
    }
    if reader.leftover() != 0 {
        warn!("{} padding bits left after unpacking {} septets, and they aren't zero ({:#x})",
              reader.bits_held(), septets, reader.leftover());
    }
    Ok(count)
}
/// Decoded message text, with optional user data header.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserData {
    /// Decoded text.
    pub text: String<USER_DATA_TEXT_BYTES>,
    /// Number of characters in `text`.
    pub length: u8,
    /// User data header, if the PDU had one. You'll want this to check if the message is
    /// concatenated, i.e. is part of a multi-part series.
    pub udh: Option<UserDataHeader>
}
/// Decode the user data of a PDU.
///
/// `data` starts just after the user data length octet, which is given as `septets` (for GSM
/// 7-bit data, the length is in septets, and includes any header). If `udhi` is set, a user data
/// header is parsed off the front first.
pub fn decode_user_data(data: &[u8], septets: u8, encoding: Encoding, udhi: bool) -> PduResult<UserData> {
    match encoding {
        Encoding::Gsm7Bit => {},
        Encoding::EightBit => {
            debug!("refusing to decode 8-bit user data");
            return Err(PduError::NotImplemented("8-bit user data"));
        },
        Encoding::Ucs2 => {
            debug!("refusing to decode UCS2 user data");
            return Err(PduError::NotImplemented("UCS2 user data"));
        }
    }
    let septets = septets as usize;
    let mut skip = 0;
    let mut udh = None;
    if udhi {
        let udhl = *data.first()
            .ok_or(PduError::InvalidParameter("UDHI specified, but no data"))? as usize;
        let header = data.get(1..udhl + 1)
            .ok_or(PduError::InvalidParameter("UDHL goes past end of data"))?;
        udh = Some(UserDataHeader::try_from(header)?);
        // The header is padded out to a septet boundary.
        skip = ((udhl + 1) * 8 + 6) / 7;
        if skip > septets {
            return Err(PduError::InvalidParameter("UDHL goes past declared user data length"));
        }
    }
    let mut ret = UserData { udh, ..Default::default() };
    let count = unpack_septets(data, septets, skip, &mut ret.text, MAX_USER_DATA_LENGTH - 1)?;
    ret.length = count as u8;
    Ok(ret)
}
#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn septet_reader() {
        let mut r = SeptetReader::new();
        assert_eq!(r.drain_septet(), None);
        r.fill(0xE8).unwrap();
        assert_eq!(r.drain_septet(), Some(0x68));
        assert_eq!(r.bits_held(), 1);
        assert_eq!(r.drain_septet(), None);
        r.fill(0x34).unwrap();
        assert_eq!(r.drain_septet(), Some(0x69));
        assert_eq!(r.bits_held(), 2);
        assert_eq!(r.leftover(), 0);
    }
    #[test]
    fn septet_reader_overfill() {
        let mut r = SeptetReader::new();
        r.fill(0xFF).unwrap();
        r.fill(0xFF).unwrap();
        assert!(r.fill(0xFF).unwrap_err().is_unknown());
    }
    #[test]
    fn decode_hi() {
        let ud = decode_user_data(&[0xE8, 0x34], 2, Encoding::Gsm7Bit, false).unwrap();
        assert_eq!(ud.text.as_str(), "hi");
        assert_eq!(ud.length, 2);
        assert!(ud.udh.is_none());
    }
    #[test]
    fn nonzero_padding_bits_tolerated() {
        // Same as above, with the two padding bits at the top of the last byte set.
        let ud = decode_user_data(&[0xE8, 0xF4], 2, Encoding::Gsm7Bit, false).unwrap();
        assert_eq!(ud.text.as_str(), "hi");
        assert_eq!(ud.length, 2);
    }
    #[test]
    fn decode_septet_count_matches() {
        // 10 septets = 70 bits = 9 bytes, with 2 bits of padding.
        let data = [0xE8, 0x32, 0x9B, 0xFD, 0x46, 0x97, 0xD9, 0xEC, 0x37];
        let ud = decode_user_data(&data, 10, Encoding::Gsm7Bit, false).unwrap();
        assert_eq!(ud.text.as_str(), "hellohello");
        assert_eq!(ud.length, 10);
    }
    #[test]
    fn decode_seven_septets() {
        // 7 septets fill 7 bytes with a whole septet of padding left over, which mustn't come out
        // as an extra '@'.
        let data = [0x31, 0xD9, 0x8C, 0x56, 0xB3, 0xDD, 0x00];
        let ud = decode_user_data(&data, 7, Encoding::Gsm7Bit, false).unwrap();
        assert_eq!(ud.text.as_str(), "1234567");
        assert_eq!(ud.length, 7);
    }
    #[test]
    fn decode_non_ascii() {
        let data = [0xC8, 0x32, 0x9B, 0xFD, 0x06, 0x05, 0x48, 0x40];
        let ud = decode_user_data(&data, 9, Encoding::Gsm7Bit, false).unwrap();
        assert_eq!(ud.text.as_str(), "Hello £¤¡");
        assert_eq!(ud.length, 9);
    }
    #[test]
    fn escape_is_not_implemented() {
        let err = decode_user_data(&[0xC1, 0x4D, 0x19], 3, Encoding::Gsm7Bit, false).unwrap_err();
        assert_eq!(err, PduError::NotImplemented("extended GSM 7-bit alphabet"));
    }
    #[test]
    fn other_encodings_not_implemented() {
        let data = [0x00, 0x68, 0x00, 0x69];
        assert!(decode_user_data(&data, 4, Encoding::Ucs2, false).unwrap_err().is_not_implemented());
        assert!(decode_user_data(&data, 4, Encoding::EightBit, false).unwrap_err().is_not_implemented());
    }
    #[test]
    fn truncated_user_data() {
        assert!(decode_user_data(&[0xE8], 2, Encoding::Gsm7Bit, false).unwrap_err().is_invalid_parameter());
    }
    #[test]
    fn too_much_text() {
        // 165 septets is one more than fits.
        let data = [0u8; 145];
        assert!(decode_user_data(&data, 165, Encoding::Gsm7Bit, false).unwrap_err().is_no_memory());
        let ud = decode_user_data(&data, 164, Encoding::Gsm7Bit, false).unwrap();
        assert_eq!(ud.length, 164);
    }
    #[test]
    fn with_user_data_header() {
        // Concatenated SMS header (ref 0xCC, part 1 of 2), one fill bit, then "Hi".
        let data = [0x05, 0x00, 0x03, 0xCC, 0x02, 0x01, 0x90, 0x69];
        let ud = decode_user_data(&data, 9, Encoding::Gsm7Bit, true).unwrap();
        assert_eq!(ud.text.as_str(), "Hi");
        assert_eq!(ud.length, 2);
        let csms = ud.udh.unwrap().concatenated.unwrap();
        assert_eq!(csms.reference, 0xCC);
        assert_eq!(csms.parts, 2);
        assert_eq!(csms.sequence, 1);
    }
    #[test]
    fn user_data_header_too_long() {
        let data = [0x05, 0x00, 0x03, 0xCC, 0x02, 0x01, 0x90, 0x69];
        assert!(decode_user_data(&data, 6, Encoding::Gsm7Bit, true).unwrap_err().is_invalid_parameter());
        assert!(decode_user_data(&data[..4], 9, Encoding::Gsm7Bit, true).unwrap_err().is_invalid_parameter());
    }
}
