//! Decoding of the service centre timestamp (TP-SCTS).
//!
//! The timestamp is 7 bytes: year (within the century), month, day, hour, minute and second, then
//! the timezone as a number of quarter-hours. Every byte holds two decimal digits with their
//! nibbles swapped, so `0x32` means 23. The timezone's sign lives in the top bit once the nibbles
//! have been swapped back.
use chrono::{Datelike, NaiveDate, TimeZone, Utc};
use crate::errors::*;

/// Length of an encoded timestamp, in bytes.
pub const TIMESTAMP_LENGTH: usize = 7;

/// Swap the two nibbles of a byte.
pub fn swap_nibbles(b: u8) -> u8 {
    (b >> 4) | (b << 4)
}
/// Read a byte holding two nibble-swapped decimal digits (e.g. `0x32` -> 23).
pub fn swapped_bcd(b: u8) -> u8 {
    let units = b >> 4;
    let tens = b & 0b0000_1111;
    (tens * 10) + units
}
/// Decode a timestamp into seconds since the UNIX epoch, in UTC.
///
/// Only the first `TIMESTAMP_LENGTH` bytes of `b` are looked at. Calendar fields out of their
/// valid range (month 13, 25 o'clock, etc.) are rejected rather than rolled over.
pub fn decode_timestamp(b: &[u8]) -> PduResult<i64> {
    if b.len() < TIMESTAMP_LENGTH {
        return Err(PduError::InvalidParameter("timestamp must be 7 bytes long"));
    }
    let year = 2000 + swapped_bcd(b[0]) as i32;
    let month0 = (swapped_bcd(b[1]) as u32).checked_sub(1)
        .ok_or(PduError::InvalidParameter("timestamp month is zero"))?;
    let day = swapped_bcd(b[2]) as u32;
    let hour = swapped_bcd(b[3]) as u32;
    let minute = swapped_bcd(b[4]) as u32;
    let second = swapped_bcd(b[5]) as u32;
    let local = NaiveDate::from_ymd_opt(year, 1, 1)
        .and_then(|d| d.with_month0(month0))
        .and_then(|d| d.with_day(day))
        .and_then(|d| d.and_hms_opt(hour, minute, second))
        .ok_or(PduError::InvalidParameter("timestamp calendar field out of range"))?;
    let tz = swap_nibbles(b[6]);
    let negative = (tz & 0b1000_0000) != 0;
    let quarters = tz & 0b0111_1111;
    let quarters = ((quarters >> 4) * 10 + (quarters & 0b0000_1111)) as i64;
    let mut offset = quarters * 15 * 60;
    if negative {
        offset = -offset;
    }
    let ret = Utc.from_utc_datetime(&local).timestamp() - offset;
    trace!("decoded timestamp {} (local {}, offset {}s)", ret, local, offset);
    Ok(ret)
}
#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn nibble_helpers() {
        assert_eq!(swapped_bcd(0x32), 23);
        assert_eq!(swapped_bcd(0x00), 0);
        assert_eq!(swapped_bcd(0x99), 99);
        assert_eq!(swap_nibbles(0xA0), 0x0A);
    }
    #[test]
    fn utc_timestamp() {
        // 2023-01-02 03:04:05 +00:00
        let ts = [0x32, 0x10, 0x20, 0x30, 0x40, 0x50, 0x00];
        assert_eq!(decode_timestamp(&ts), Ok(1672628645));
        assert_eq!(decode_timestamp(&ts), decode_timestamp(&ts));
    }
    #[test]
    fn positive_timezone() {
        // 2023-01-02 03:04:05 +02:00 (8 quarter-hours)
        let ts = [0x32, 0x10, 0x20, 0x30, 0x40, 0x50, 0x80];
        assert_eq!(decode_timestamp(&ts), Ok(1672628645 - 2 * 3600));
    }
    #[test]
    fn negative_timezone() {
        // 2023-01-02 03:04:05 -05:00 (20 quarter-hours, sign bit set)
        let ts = [0x32, 0x10, 0x20, 0x30, 0x40, 0x50, 0x0A];
        assert_eq!(decode_timestamp(&ts), Ok(1672628645 + 5 * 3600));
    }
    #[test]
    fn past_2038() {
        // 2099-12-31 23:59:59 +00:00
        let ts = [0x99, 0x21, 0x13, 0x32, 0x95, 0x95, 0x00];
        assert_eq!(decode_timestamp(&ts), Ok(4102444799));
    }
    #[test]
    fn leap_day() {
        // 2024-02-29 12:00:00 +00:00
        let ts = [0x42, 0x20, 0x92, 0x21, 0x00, 0x00, 0x00];
        assert_eq!(decode_timestamp(&ts), Ok(1709208000));
    }
    #[test]
    fn too_short() {
        let ts = [0x32, 0x10, 0x20, 0x30, 0x40, 0x50];
        assert!(decode_timestamp(&ts).unwrap_err().is_invalid_parameter());
    }
    #[test]
    fn out_of_range_fields() {
        // Month 0, month 13, 30th of February, 24 o'clock.
        let cases: [[u8; 7]; 4] = [
            [0x32, 0x00, 0x20, 0x30, 0x40, 0x50, 0x00],
            [0x32, 0x31, 0x20, 0x30, 0x40, 0x50, 0x00],
            [0x32, 0x20, 0x03, 0x30, 0x40, 0x50, 0x00],
            [0x32, 0x10, 0x20, 0x42, 0x40, 0x50, 0x00]
        ];
        for ts in cases.iter() {
            assert!(decode_timestamp(ts).unwrap_err().is_invalid_parameter());
        }
    }
}
