//! The TSIG record itself. The signing and verification engine lives in
//! [`crate::tsig`]; this is only the rdata shape.
use std::fmt;

use crate::base_encoding::{base64_decode, base64_encode};
use crate::domain::DomainName;
use crate::error::{DNSError, DNSResult};
use crate::rdata::codec::{MasterFields, RDataDecoder, RDataEncoder};
use crate::rdata::RecordData;

// TSIG-specific error code values beyond the header rcodes
pub const TSIG_BADSIG: u16 = 16;
pub const TSIG_BADKEY: u16 = 17;
pub const TSIG_BADTIME: u16 = 18;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TSIG {
    pub algorithm: DomainName,
    /// seconds since the epoch, 48 bits on the wire
    pub time_signed: u64,
    /// allowed clock skew in seconds
    pub fudge: u16,
    pub mac: Vec<u8>,
    pub original_id: u16,
    pub error: u16,
    pub other: Vec<u8>,
}

impl RecordData for TSIG {
    fn from_wire(decoder: &mut RDataDecoder) -> DNSResult<Self> {
        let algorithm = decoder.read_name()?;
        let time_signed = decoder.read_u48()?;
        let fudge = decoder.read_u16()?;
        let mac_size = decoder.read_u16()?;
        let mac = decoder.read_bytes(mac_size as usize, "MAC")?;
        let original_id = decoder.read_u16()?;
        let error = decoder.read_u16()?;
        let other_size = decoder.read_u16()?;
        let other = decoder.read_bytes(other_size as usize, "other data")?;

        Ok(TSIG {
            algorithm,
            time_signed,
            fudge,
            mac,
            original_id,
            error,
            other,
        })
    }

    fn to_wire(&self, encoder: &mut RDataEncoder) -> DNSResult<usize> {
        if self.mac.len() > u16::MAX as usize || self.other.len() > u16::MAX as usize {
            return Err(DNSError::Unsupported("TSIG field too long".to_string()));
        }
        let mut length = encoder.write_name(&self.algorithm, false)?;
        length += encoder.write_u48(self.time_signed);
        length += encoder.write_u16(self.fudge);
        length += encoder.write_u16(self.mac.len() as u16);
        length += encoder.write_bytes(&self.mac);
        length += encoder.write_u16(self.original_id);
        length += encoder.write_u16(self.error);
        length += encoder.write_u16(self.other.len() as u16);
        length += encoder.write_bytes(&self.other);
        Ok(length)
    }

    fn from_master(fields: &mut MasterFields, origin: Option<&DomainName>) -> DNSResult<Self> {
        let algorithm = fields.next_name("algorithm", origin)?;
        let time_signed: u64 = fields.parse("time signed")?;
        if time_signed >> 48 != 0 {
            return Err(DNSError::master("time signed exceeds 48 bits"));
        }
        let fudge = fields.parse("fudge")?;
        let mac = parse_blob(fields.next_str("mac")?)?;
        let original_id = fields.parse("original id")?;
        let error = fields.parse("error")?;
        let other = parse_blob(fields.next_str("other data")?)?;

        Ok(TSIG {
            algorithm,
            time_signed,
            fudge,
            mac,
            original_id,
            error,
            other,
        })
    }

    fn max_length(&self) -> usize {
        self.algorithm.encoded_len() + 16 + self.mac.len() + self.other.len()
    }
}

// base64 with '-' standing in for the empty field
fn parse_blob(text: &str) -> DNSResult<Vec<u8>> {
    if text == "-" {
        Ok(Vec::new())
    } else {
        base64_decode(text)
    }
}

fn format_blob(data: &[u8]) -> String {
    if data.is_empty() {
        "-".to_string()
    } else {
        base64_encode(data)
    }
}

impl fmt::Display for TSIG {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {} {} {} {}",
            self.algorithm,
            self.time_signed,
            self.fudge,
            format_blob(&self.mac),
            self.original_id,
            self.error,
            format_blob(&self.other)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rdata::test_helpers::{master_roundtrip, wire_roundtrip};

    #[test]
    fn tsig_roundtrip() {
        let tsig = TSIG {
            algorithm: DomainName::try_from("hmac-sha256.").unwrap(),
            time_signed: 1048354263,
            fudge: 300,
            mac: vec![0xab; 32],
            original_id: 0x1234,
            error: 0,
            other: Vec::new(),
        };
        wire_roundtrip(&tsig);
        master_roundtrip(&tsig);
    }

    #[test]
    fn badtime_carries_server_clock_in_other() {
        let tsig = TSIG {
            algorithm: DomainName::try_from("hmac-sha256.").unwrap(),
            time_signed: 1048354263,
            fudge: 300,
            mac: vec![0xab; 32],
            original_id: 1,
            error: TSIG_BADTIME,
            other: vec![0x00, 0x00, 0x3e, 0x7c, 0x9f, 0x57],
        };
        wire_roundtrip(&tsig);
        master_roundtrip(&tsig);
    }
}
