//! CERT: certificates and related revocation material stored in the DNS.
use std::fmt;

use crate::base_encoding::{base64_decode, base64_encode};
use crate::domain::DomainName;
use crate::error::DNSResult;
use crate::rdata::codec::{MasterFields, RDataDecoder, RDataEncoder};
use crate::rdata::RecordData;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CERT {
    /// 1 PKIX, 2 SPKI, 3 PGP, ... per the IANA cert-type registry
    pub cert_type: u16,
    pub key_tag: u16,
    pub algorithm: u8,
    pub certificate: Vec<u8>,
}

impl RecordData for CERT {
    fn from_wire(decoder: &mut RDataDecoder) -> DNSResult<Self> {
        Ok(CERT {
            cert_type: decoder.read_u16()?,
            key_tag: decoder.read_u16()?,
            algorithm: decoder.read_u8()?,
            certificate: decoder.rest(),
        })
    }

    fn to_wire(&self, encoder: &mut RDataEncoder) -> DNSResult<usize> {
        let mut length = encoder.write_u16(self.cert_type);
        length += encoder.write_u16(self.key_tag);
        length += encoder.write_u8(self.algorithm);
        length += encoder.write_bytes(&self.certificate);
        Ok(length)
    }

    fn from_master(fields: &mut MasterFields, _origin: Option<&DomainName>) -> DNSResult<Self> {
        Ok(CERT {
            cert_type: fields.parse("certificate type")?,
            key_tag: fields.parse("key tag")?,
            algorithm: fields.parse("algorithm")?,
            certificate: base64_decode(&fields.rest_concat("certificate")?)?,
        })
    }

    fn max_length(&self) -> usize {
        5 + self.certificate.len()
    }
}

impl fmt::Display for CERT {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {}",
            self.cert_type,
            self.key_tag,
            self.algorithm,
            base64_encode(&self.certificate)
        )
    }
}
