//! AAAA: the IPv6 host address record.
use std::fmt;
use std::net::Ipv6Addr;

use crate::domain::DomainName;
use crate::error::DNSResult;
use crate::rdata::codec::{MasterFields, RDataDecoder, RDataEncoder};
use crate::rdata::RecordData;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AAAA {
    pub address: Ipv6Addr,
}

impl RecordData for AAAA {
    fn from_wire(decoder: &mut RDataDecoder) -> DNSResult<Self> {
        let octets = decoder.read_bytes(16, "IPv6 address")?;
        let mut address = [0u8; 16];
        address.copy_from_slice(&octets);
        Ok(AAAA {
            address: Ipv6Addr::from(address),
        })
    }

    fn to_wire(&self, encoder: &mut RDataEncoder) -> DNSResult<usize> {
        Ok(encoder.write_bytes(&self.address.octets()))
    }

    fn from_master(fields: &mut MasterFields, _origin: Option<&DomainName>) -> DNSResult<Self> {
        Ok(AAAA {
            address: fields.parse("IPv6 address")?,
        })
    }

    fn max_length(&self) -> usize {
        16
    }
}

impl fmt::Display for AAAA {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.address)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rdata::test_helpers::{master_roundtrip, wire_roundtrip};

    #[test]
    fn aaaa_record() {
        let aaaa = AAAA {
            address: "2606:2800:220:1:248:1893:25c8:1946".parse().unwrap(),
        };
        wire_roundtrip(&aaaa);
        master_roundtrip(&aaaa);
    }
}
