//! DHCID: an opaque association between a DHCP client and a name, presented
//! as one base64 blob.
use std::fmt;

use crate::base_encoding::{base64_decode, base64_encode};
use crate::domain::DomainName;
use crate::error::DNSResult;
use crate::rdata::codec::{MasterFields, RDataDecoder, RDataEncoder};
use crate::rdata::RecordData;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DHCID {
    pub data: Vec<u8>,
}

impl RecordData for DHCID {
    fn from_wire(decoder: &mut RDataDecoder) -> DNSResult<Self> {
        Ok(DHCID {
            data: decoder.rest(),
        })
    }

    fn to_wire(&self, encoder: &mut RDataEncoder) -> DNSResult<usize> {
        Ok(encoder.write_bytes(&self.data))
    }

    fn from_master(fields: &mut MasterFields, _origin: Option<&DomainName>) -> DNSResult<Self> {
        Ok(DHCID {
            data: base64_decode(&fields.rest_concat("data")?)?,
        })
    }

    fn max_length(&self) -> usize {
        self.data.len()
    }
}

impl fmt::Display for DHCID {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&base64_encode(&self.data))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rdata::test_helpers::{master_roundtrip, wire_roundtrip};

    #[test]
    fn dhcid_record() {
        let dhcid = DHCID {
            data: vec![0x00, 0x02, 0x01, 0x63, 0x6f, 0x6e, 0x74],
        };
        wire_roundtrip(&dhcid);
        master_roundtrip(&dhcid);
    }
}
