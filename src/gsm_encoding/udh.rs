//! Utilities for dealing with User Data Headers (used for concatenated SMS, among other things)
//! inside messages.
//!
//! [This Wikipedia article](https://en.wikipedia.org/wiki/User_Data_Header) explains what this is
//! for pretty well. Most uses of the UDH are vestigial; nowadays it's mostly useful for receiving
//! concatenated SMS, so that's the only information element that gets pulled out.
use std::convert::TryFrom;
use crate::errors::*;

/// Data about a concatenated SMS.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ConcatenatedSmsData {
    /// Reference that identifies which message this is a part of - this is like an ID for the
    /// whole message.
    pub reference: u16,
    /// How many parts to the message exist (e.g. 2).
    pub parts: u8,
    /// Which part this is (e.g. 1 of 2).
    pub sequence: u8
}
/// A User Data Header.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct UserDataHeader {
    /// Length of the header in octets, not counting the length octet itself.
    pub length: u8,
    /// Number of information elements found in the header.
    pub components: u8,
    /// Concatenated SMS data, if the header contained any.
    pub concatenated: Option<ConcatenatedSmsData>
}
impl<'a> TryFrom<&'a [u8]> for UserDataHeader {
    type Error = PduError;
    /// Accepts a UDH *without* the UDH Length octet at the start.
    fn try_from(b: &[u8]) -> PduResult<Self> {
        let mut offset = 0;
        let mut components = 0u8;
        let mut concatenated = None;
        while let Some(&id) = b.get(offset) {
            offset += 1;
            check_offset!(b, offset, "UDH component length");
            let len = b[offset] as usize;
            offset += 1;
            let data = b.get(offset..offset + len)
                .ok_or(PduError::InvalidParameter("UDH component data goes past end of header"))?;
            offset += len;
            components = components.saturating_add(1);
            match (id, data) {
                (0x00, &[reference, parts, sequence]) => {
                    concatenated = Some(ConcatenatedSmsData { reference: reference as u16, parts, sequence });
                },
                (0x08, &[hi, lo, parts, sequence]) => {
                    let reference = ((hi as u16) << 8) | (lo as u16);
                    concatenated = Some(ConcatenatedSmsData { reference, parts, sequence });
                },
                (id, _) => trace!("ignoring UDH component {:#04x} ({} bytes)", id, len)
            }
        }
        Ok(UserDataHeader {
            length: b.len() as u8,
            components,
            concatenated
        })
    }
}
#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn concatenated_8bit_reference() {
        let udh = UserDataHeader::try_from(&[0x00, 0x03, 0x2A, 0x03, 0x02][..]).unwrap();
        assert_eq!(udh.length, 5);
        assert_eq!(udh.components, 1);
        assert_eq!(udh.concatenated, Some(ConcatenatedSmsData { reference: 0x2A, parts: 3, sequence: 2 }));
    }
    #[test]
    fn concatenated_16bit_reference() {
        // Preceded by an unrelated component (application port addressing).
        let data = [0x05, 0x04, 0x0B, 0x84, 0x23, 0xF0, 0x08, 0x04, 0x12, 0x34, 0x02, 0x01];
        let udh = UserDataHeader::try_from(&data[..]).unwrap();
        assert_eq!(udh.components, 2);
        assert_eq!(udh.concatenated, Some(ConcatenatedSmsData { reference: 0x1234, parts: 2, sequence: 1 }));
    }
    #[test]
    fn truncated_component() {
        assert!(UserDataHeader::try_from(&[0x00][..]).unwrap_err().is_invalid_parameter());
        assert!(UserDataHeader::try_from(&[0x00, 0x03, 0x2A][..]).unwrap_err().is_invalid_parameter());
    }
}
