//! SSHFP: SSH host key fingerprints published in the DNS.
use std::fmt;

use crate::base_encoding::{base16_decode, base16_encode};
use crate::domain::DomainName;
use crate::error::DNSResult;
use crate::rdata::codec::{MasterFields, RDataDecoder, RDataEncoder};
use crate::rdata::RecordData;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SSHFP {
    /// 1 RSA, 2 DSA, 3 ECDSA, 4 Ed25519, 6 Ed448
    pub algorithm: u8,
    /// 1 SHA-1, 2 SHA-256
    pub fingerprint_type: u8,
    pub fingerprint: Vec<u8>,
}

impl RecordData for SSHFP {
    fn from_wire(decoder: &mut RDataDecoder) -> DNSResult<Self> {
        Ok(SSHFP {
            algorithm: decoder.read_u8()?,
            fingerprint_type: decoder.read_u8()?,
            fingerprint: decoder.rest(),
        })
    }

    fn to_wire(&self, encoder: &mut RDataEncoder) -> DNSResult<usize> {
        let mut length = encoder.write_u8(self.algorithm);
        length += encoder.write_u8(self.fingerprint_type);
        length += encoder.write_bytes(&self.fingerprint);
        Ok(length)
    }

    fn from_master(fields: &mut MasterFields, _origin: Option<&DomainName>) -> DNSResult<Self> {
        Ok(SSHFP {
            algorithm: fields.parse("algorithm")?,
            fingerprint_type: fields.parse("fingerprint type")?,
            fingerprint: base16_decode(&fields.rest_concat("fingerprint")?)?,
        })
    }

    fn max_length(&self) -> usize {
        2 + self.fingerprint.len()
    }
}

impl fmt::Display for SSHFP {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {}",
            self.algorithm,
            self.fingerprint_type,
            base16_encode(&self.fingerprint)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rdata::test_helpers::{master_roundtrip, wire_roundtrip};

    #[test]
    fn sshfp_record() {
        let sshfp = SSHFP {
            algorithm: 4,
            fingerprint_type: 2,
            fingerprint: vec![0x12, 0x34, 0x56, 0x78, 0x9a, 0xbc],
        };
        wire_roundtrip(&sshfp);
        master_roundtrip(&sshfp);
        assert_eq!(sshfp.to_string(), "4 2 123456789ABC");
    }
}
