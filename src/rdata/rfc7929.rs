//! OPENPGPKEY: an OpenPGP transferable public key, presented as base64.
use std::fmt;

use crate::base_encoding::{base64_decode, base64_encode};
use crate::domain::DomainName;
use crate::error::DNSResult;
use crate::rdata::codec::{MasterFields, RDataDecoder, RDataEncoder};
use crate::rdata::RecordData;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OPENPGPKEY {
    pub key: Vec<u8>,
}

impl RecordData for OPENPGPKEY {
    fn from_wire(decoder: &mut RDataDecoder) -> DNSResult<Self> {
        Ok(OPENPGPKEY {
            key: decoder.rest(),
        })
    }

    fn to_wire(&self, encoder: &mut RDataEncoder) -> DNSResult<usize> {
        Ok(encoder.write_bytes(&self.key))
    }

    fn from_master(fields: &mut MasterFields, _origin: Option<&DomainName>) -> DNSResult<Self> {
        Ok(OPENPGPKEY {
            key: base64_decode(&fields.rest_concat("key")?)?,
        })
    }

    fn max_length(&self) -> usize {
        self.key.len()
    }
}

impl fmt::Display for OPENPGPKEY {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&base64_encode(&self.key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rdata::test_helpers::{master_roundtrip, wire_roundtrip};

    #[test]
    fn openpgpkey_record() {
        let key = OPENPGPKEY {
            key: vec![0x99, 0x01, 0x0d, 0x04],
        };
        wire_roundtrip(&key);
        master_roundtrip(&key);
    }
}
