//! Decodes SMS-DELIVER PDUs given as hex, one per line, on standard input.
//!
//! Set `RUST_LOG=gsm_pdu=trace` to watch the decoder work through each field.
use gsm_pdu::hex::HexData;
use gsm_pdu::pdu::decode_sms_deliver;
use std::io::prelude::*;

fn main() {
    env_logger::init();
    println!("Input PDUs");
    let stdin = ::std::io::stdin();
    let lock = stdin.lock();
    for ln in lock.lines() {
        let ln = match ln {
            Ok(l) => l,
            Err(e) => {
                eprintln!("Failed to read input: {}", e);
                break;
            }
        };
        let ln = ln.trim();
        if ln.is_empty() {
            continue;
        }
        let bytes = match HexData::decode(ln) {
            Ok(b) => b,
            Err(e) => {
                println!("Error: {}", e);
                continue;
            }
        };
        match decode_sms_deliver(&bytes, bytes.len()) {
            Ok(pdu) => {
                println!("PDU: {:?}", pdu);
                println!("SMSC: {}", pdu.sca);
                println!("Sender: {}", pdu.originating_address);
                match pdu.datetime() {
                    Some(dt) => println!("Sent: {}", dt),
                    None => println!("Sent: {} (out of range)", pdu.time)
                }
                println!("Encoding: {:?}", pdu.encoding);
                if let Some(csms) = pdu.user_data.udh.and_then(|u| u.concatenated) {
                    println!("Part {} of {} (reference {})", csms.sequence, csms.parts, csms.reference);
                }
                println!("Message: {:?}", pdu.user_data.text.as_str());
            },
            Err(e) => println!("Error: {}", e)
        }
    }
}
