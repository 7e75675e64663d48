//! TLSA: DANE certificate associations. SMIMEA (RFC 8162) carries the
//! identical shape under its own type code.
use std::fmt;

use crate::base_encoding::{base16_decode, base16_encode};
use crate::domain::DomainName;
use crate::error::DNSResult;
use crate::rdata::codec::{MasterFields, RDataDecoder, RDataEncoder};
use crate::rdata::RecordData;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TLSA {
    /// 0 PKIX-TA, 1 PKIX-EE, 2 DANE-TA, 3 DANE-EE
    pub cert_usage: u8,
    /// 0 full certificate, 1 subject public key info
    pub selector: u8,
    /// 0 exact match, 1 SHA-256, 2 SHA-512
    pub matching_type: u8,
    pub association_data: Vec<u8>,
}

impl RecordData for TLSA {
    fn from_wire(decoder: &mut RDataDecoder) -> DNSResult<Self> {
        Ok(TLSA {
            cert_usage: decoder.read_u8()?,
            selector: decoder.read_u8()?,
            matching_type: decoder.read_u8()?,
            association_data: decoder.rest(),
        })
    }

    fn to_wire(&self, encoder: &mut RDataEncoder) -> DNSResult<usize> {
        let mut length = encoder.write_u8(self.cert_usage);
        length += encoder.write_u8(self.selector);
        length += encoder.write_u8(self.matching_type);
        length += encoder.write_bytes(&self.association_data);
        Ok(length)
    }

    fn from_master(fields: &mut MasterFields, _origin: Option<&DomainName>) -> DNSResult<Self> {
        Ok(TLSA {
            cert_usage: fields.parse("certificate usage")?,
            selector: fields.parse("selector")?,
            matching_type: fields.parse("matching type")?,
            association_data: base16_decode(&fields.rest_concat("association data")?)?,
        })
    }

    fn max_length(&self) -> usize {
        3 + self.association_data.len()
    }
}

impl fmt::Display for TLSA {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {}",
            self.cert_usage,
            self.selector,
            self.matching_type,
            base16_encode(&self.association_data)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rdata::test_helpers::{master_roundtrip, wire_roundtrip};

    #[test]
    fn tlsa_record() {
        let tlsa = TLSA {
            cert_usage: 3,
            selector: 1,
            matching_type: 1,
            association_data: vec![0xde, 0xad, 0xbe, 0xef],
        };
        wire_roundtrip(&tlsa);
        master_roundtrip(&tlsa);
        assert_eq!(tlsa.to_string(), "3 1 1 DEADBEEF");
    }
}
