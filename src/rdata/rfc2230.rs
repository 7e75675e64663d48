//! KX: the key exchanger record.
use std::fmt;

use crate::domain::DomainName;
use crate::error::DNSResult;
use crate::rdata::codec::{MasterFields, RDataDecoder, RDataEncoder};
use crate::rdata::RecordData;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KX {
    pub preference: u16,
    pub exchanger: DomainName,
}

impl RecordData for KX {
    fn from_wire(decoder: &mut RDataDecoder) -> DNSResult<Self> {
        Ok(KX {
            preference: decoder.read_u16()?,
            exchanger: decoder.read_name()?,
        })
    }

    fn to_wire(&self, encoder: &mut RDataEncoder) -> DNSResult<usize> {
        let mut length = encoder.write_u16(self.preference);
        length += encoder.write_name(&self.exchanger, false)?;
        Ok(length)
    }

    fn from_master(fields: &mut MasterFields, origin: Option<&DomainName>) -> DNSResult<Self> {
        Ok(KX {
            preference: fields.parse("preference")?,
            exchanger: fields.next_name("exchanger", origin)?,
        })
    }

    fn max_length(&self) -> usize {
        2 + self.exchanger.encoded_len()
    }
}

impl fmt::Display for KX {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.preference, self.exchanger)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rdata::test_helpers::{master_roundtrip, wire_roundtrip};

    #[test]
    fn kx_record() {
        let kx = KX {
            preference: 2,
            exchanger: DomainName::try_from("kx.example.com.").unwrap(),
        };
        wire_roundtrip(&kx);
        master_roundtrip(&kx);
    }
}
