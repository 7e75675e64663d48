//! TKEY: negotiation of shared secrets for TSIG.
use std::fmt;

use crate::base_encoding::{base64_decode, base64_encode};
use crate::domain::DomainName;
use crate::error::{DNSError, DNSResult};
use crate::rdata::codec::{MasterFields, RDataDecoder, RDataEncoder};
use crate::rdata::RecordData;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TKEY {
    pub algorithm: DomainName,
    pub inception: u32,
    pub expiration: u32,
    /// 1 server assignment, 2 Diffie-Hellman, 3 GSS-API, 4 resolver
    /// assignment, 5 key deletion
    pub mode: u16,
    pub error: u16,
    pub key_data: Vec<u8>,
    pub other: Vec<u8>,
}

impl RecordData for TKEY {
    fn from_wire(decoder: &mut RDataDecoder) -> DNSResult<Self> {
        let algorithm = decoder.read_name()?;
        let inception = decoder.read_u32()?;
        let expiration = decoder.read_u32()?;
        let mode = decoder.read_u16()?;
        let error = decoder.read_u16()?;
        let key_size = decoder.read_u16()?;
        let key_data = decoder.read_bytes(key_size as usize, "key data")?;
        let other_size = decoder.read_u16()?;
        let other = decoder.read_bytes(other_size as usize, "other data")?;

        Ok(TKEY {
            algorithm,
            inception,
            expiration,
            mode,
            error,
            key_data,
            other,
        })
    }

    fn to_wire(&self, encoder: &mut RDataEncoder) -> DNSResult<usize> {
        if self.key_data.len() > u16::MAX as usize || self.other.len() > u16::MAX as usize {
            return Err(DNSError::Unsupported("TKEY field too long".to_string()));
        }
        let mut length = encoder.write_name(&self.algorithm, false)?;
        length += encoder.write_u32(self.inception);
        length += encoder.write_u32(self.expiration);
        length += encoder.write_u16(self.mode);
        length += encoder.write_u16(self.error);
        length += encoder.write_u16(self.key_data.len() as u16);
        length += encoder.write_bytes(&self.key_data);
        length += encoder.write_u16(self.other.len() as u16);
        length += encoder.write_bytes(&self.other);
        Ok(length)
    }

    fn from_master(fields: &mut MasterFields, origin: Option<&DomainName>) -> DNSResult<Self> {
        let algorithm = fields.next_name("algorithm", origin)?;
        let inception = fields.parse("inception")?;
        let expiration = fields.parse("expiration")?;
        let mode = fields.parse("mode")?;
        let error = fields.parse("error")?;
        let key_data = parse_blob(fields.next_str("key data")?)?;
        let other = parse_blob(fields.next_str("other data")?)?;

        Ok(TKEY {
            algorithm,
            inception,
            expiration,
            mode,
            error,
            key_data,
            other,
        })
    }

    fn max_length(&self) -> usize {
        self.algorithm.encoded_len() + 16 + self.key_data.len() + self.other.len()
    }
}

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

impl fmt::Display for TKEY {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {} {} {} {}",
            self.algorithm,
            self.inception,
            self.expiration,
            self.mode,
            self.error,
            format_blob(&self.key_data),
            format_blob(&self.other)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rdata::test_helpers::{master_roundtrip, wire_roundtrip};

    #[test]
    fn tkey_roundtrip() {
        let tkey = TKEY {
            algorithm: DomainName::try_from("gss-tsig.").unwrap(),
            inception: 1600000000,
            expiration: 1600086400,
            mode: 3,
            error: 0,
            key_data: vec![1, 2, 3, 4],
            other: Vec::new(),
        };
        wire_roundtrip(&tkey);
        master_roundtrip(&tkey);
    }
}
