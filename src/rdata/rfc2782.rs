//! SRV: server selection for a service/protocol pair.
use std::fmt;

use crate::domain::DomainName;
use crate::error::DNSResult;
use crate::rdata::codec::{MasterFields, RDataDecoder, RDataEncoder};
use crate::rdata::RecordData;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SRV {
    pub priority: u16,
    pub weight: u16,
    pub port: u16,
    pub target: DomainName,
}

impl RecordData for SRV {
    fn from_wire(decoder: &mut RDataDecoder) -> DNSResult<Self> {
        Ok(SRV {
            priority: decoder.read_u16()?,
            weight: decoder.read_u16()?,
            port: decoder.read_u16()?,
            // early implementations compressed the target, so the decoder
            // must chase pointers even though RFC 2782 forbids emitting them
            target: decoder.read_name()?,
        })
    }

    fn to_wire(&self, encoder: &mut RDataEncoder) -> DNSResult<usize> {
        let mut length = encoder.write_u16(self.priority);
        length += encoder.write_u16(self.weight);
        length += encoder.write_u16(self.port);
        length += encoder.write_name(&self.target, false)?;
        Ok(length)
    }

    fn from_master(fields: &mut MasterFields, origin: Option<&DomainName>) -> DNSResult<Self> {
        Ok(SRV {
            priority: fields.parse("priority")?,
            weight: fields.parse("weight")?,
            port: fields.parse("port")?,
            target: fields.next_name("target", origin)?,
        })
    }

    fn max_length(&self) -> usize {
        6 + self.target.encoded_len()
    }
}

impl fmt::Display for SRV {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {}",
            self.priority, self.weight, self.port, self.target
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rdata::test_helpers::{master_roundtrip, wire_roundtrip};

    #[test]
    fn srv_record() {
        let srv = SRV {
            priority: 0,
            weight: 5,
            port: 5060,
            target: DomainName::try_from("sip.example.com.").unwrap(),
        };
        wire_roundtrip(&srv);
        master_roundtrip(&srv);
        assert_eq!(srv.to_string(), "0 5 5060 sip.example.com.");
    }
}
