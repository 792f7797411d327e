//! Decoding of the BCD-packed address fields in a PDU (the service centre address and the
//! originating address).
//!
//! Both fields share the same shape - a length byte, a type-of-address byte, and then the digits
//! packed two to a byte, low nibble first - but they disagree about what the length byte counts.
//! See `AddressLayout`.
use std::fmt;
use heapless::String;
use num_derive::FromPrimitive;
use num_traits::FromPrimitive;
use crate::errors::*;
use crate::gsm_encoding::unpack_septets;

/// Maximum length of a decoded address, including one slot for the terminator that modem-side
/// representations carry. At most `MAX_NUMBER_LENGTH - 1` characters are ever decoded.
pub const MAX_NUMBER_LENGTH: usize = 20;
// Alphanumeric senders can decode to two-byte UTF-8 characters.
const NUMBER_BUFFER_BYTES: usize = 2 * MAX_NUMBER_LENGTH;

/// Type of number value - used as part of phone numbers to indicate whether the number is
/// international, alphanumeric, etc.
#[repr(u8)]
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, FromPrimitive, Hash)]
pub enum TypeOfNumber {
    Unknown = 0b0_000_0000,
    /// International (i.e. starting with +).
    International = 0b0_001_0000,
    National = 0b0_010_0000,
    Special = 0b0_011_0000,
    Abbreviated = 0b0_100_0000,
    /// Alphanumeric "number" - i.e. this isn't a phone number, it's some GSM 7-bit text naming
    /// the sender (e.g. when banks send you SMSes).
    Gsm = 0b0_101_0000,
    Short = 0b0_110_0000,
    Reserved = 0b0_111_0000
}
/// Numbering plan identification value.
#[repr(u8)]
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, FromPrimitive, Hash)]
pub enum NumberingPlanIdentification {
    NetworkDetermined = 0b0_000_0000,
    IsdnTelephone = 0b0_000_0001,
    Data = 0b0_000_0011,
    Telex = 0b0_000_0100,
    National = 0b0_000_1000,
    Private = 0b0_000_1001,
    Ermes = 0b0_000_1010
}
/// Interpretation of the type-of-address byte.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct AddressType {
    pub type_of_number: TypeOfNumber,
    pub numbering_plan_identification: NumberingPlanIdentification
}
impl AddressType {
    /// Split a raw type-of-address byte into its two fields, if both are known values.
    pub fn from_byte(b: u8) -> Option<Self> {
        let type_of_number = TypeOfNumber::from_u8(b & 0b0_111_0000)?;
        let numbering_plan_identification = NumberingPlanIdentification::from_u8(b & 0b0_000_1111)?;
        Some(AddressType { type_of_number, numbering_plan_identification })
    }
}
/// Which of the two address encodings a field uses.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum AddressLayout {
    /// The length byte counts octets, including the type-of-address byte (the SMSC address).
    Octets,
    /// The length byte counts digits (semi-octets), and excludes the type-of-address byte (the
    /// originating address).
    SemiOctets
}
/// A decoded address.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Address {
    /// Raw type-of-address byte, as it appeared on the wire.
    pub type_of_address: u8,
    /// The decoded digits (or, for alphanumeric senders, text).
    pub digits: String<NUMBER_BUFFER_BYTES>,
    /// Number of characters in `digits`.
    pub digit_count: u8
}
impl Address {
    /// Interpret the type-of-address byte. Returns `None` for values outside the known set.
    pub fn address_type(&self) -> Option<AddressType> {
        AddressType::from_byte(self.type_of_address)
    }
    fn is_alphanumeric(&self) -> bool {
        self.type_of_address & 0b0_111_0000 == TypeOfNumber::Gsm as u8
    }
    fn push(&mut self, c: char) -> PduResult<()> {
        if self.digit_count as usize + 1 >= MAX_NUMBER_LENGTH {
            return Err(PduError::NoMemory("address longer than MAX_NUMBER_LENGTH"));
        }
        self.digits.push(c)
            .map_err(|_| PduError::NoMemory("address buffer full"))?;
        self.digit_count += 1;
        Ok(())
    }
}
impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.type_of_address & 0b0_111_0000 == TypeOfNumber::International as u8 {
            write!(f, "+")?;
        }
        write!(f, "{}", self.digits)
    }
}
/// Decode `nibbles` BCD digits from `data`, low nibble of each byte first.
///
/// A nibble of `0xF` is filler and ends the number. Nibbles `0xA` to `0xE` aren't digits; they're
/// skipped, and decoding carries on with the next one.
fn decode_semi_octets(data: &[u8], nibbles: usize, out: &mut Address) -> PduResult<()> {
    for i in 0..nibbles {
        let byte = data.get(i / 2)
            .ok_or(PduError::Unknown("semi-octet index past end of address"))?;
        let nibble = if i % 2 == 0 {
            byte & 0b0000_1111
        }
        else {
            byte >> 4
        };
        match nibble {
            0..=9 => out.push((b'0' + nibble) as char)?,
            0xF => break,
            x => trace!("skipping non-digit semi-octet {:X} in address", x)
        }
    }
    Ok(())
}
/// Decode an address field starting at `cursor` in `b`.
///
/// Returns the address and the number of bytes it occupied (including its length byte), so the
/// caller can advance past it.
pub fn decode_address(b: &[u8], cursor: usize, layout: AddressLayout) -> PduResult<(Address, usize)> {
    let len = *b.get(cursor)
        .ok_or(PduError::InvalidParameter("address length byte missing"))? as usize;
    let mut ret = Address::default();
    // (octets of digits, bytes consumed in total)
    let (octets, consumed) = match layout {
        AddressLayout::Octets => {
            if len == 0 {
                // No service centre address reported.
                return Ok((ret, 1));
            }
            (len - 1, len + 1)
        },
        AddressLayout::SemiOctets => {
            let octets = (len / 2) + len % 2;
            (octets, octets + 2)
        }
    };
    if cursor + consumed > b.len() {
        return Err(PduError::InvalidParameter("address length goes past end of data"));
    }
    ret.type_of_address = b[cursor + 1];
    let data = &b[cursor + 2..cursor + consumed];
    if layout == AddressLayout::SemiOctets && ret.is_alphanumeric() {
        let septets = (len * 4) / 7;
        let mut text: String<NUMBER_BUFFER_BYTES> = String::new();
        let count = unpack_septets(data, septets, 0, &mut text, MAX_NUMBER_LENGTH - 1)?;
        ret.digits = text;
        ret.digit_count = count as u8;
    }
    else {
        decode_semi_octets(data, octets * 2, &mut ret)?;
    }
    trace!("decoded address {} ({} bytes)", ret, consumed);
    Ok((ret, consumed))
}
