//! Conversion between bytes and the hexadecimal text modems use for PDUs in AT responses.
use std::fmt;
use crate::errors::*;

/// Bytes that format as upper-case hexadecimal, without separators.
#[derive(Debug)]
pub struct HexData<'a>(pub &'a [u8]);
impl<'a> fmt::Display for HexData<'a> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for b in self.0.iter() {
            write!(f, "{:02X}", b)?;
        }
        Ok(())
    }
}
impl<'a> HexData<'a> {
    /// Decode a hex string (either case) into bytes.
    pub fn decode(data: &str) -> PduResult<Vec<u8>> {
        if data.len() % 2 != 0 {
            return Err(PduError::InvalidParameter("hex string has odd length"));
        }
        // from_str_radix would also accept a leading '+'.
        if !data.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(PduError::InvalidParameter("invalid hex string"));
        }
        data.as_bytes()
            .chunks(2)
            .map(::std::str::from_utf8)
            .map(|x| {
                match x {
                    Ok(x) => u8::from_str_radix(x, 16)
                        .map_err(|_| PduError::InvalidParameter("invalid hex string")),
                    Err(_) => Err(PduError::InvalidParameter("invalid hex string"))
                }
            })
            .collect()
    }
}
