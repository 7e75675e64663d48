//! DNAME: non-terminal redirection of a whole subtree.
use std::fmt;

use crate::domain::DomainName;
use crate::error::DNSResult;
use crate::rdata::codec::{MasterFields, RDataDecoder, RDataEncoder};
use crate::rdata::RecordData;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DNAME {
    pub target: DomainName,
}

impl RecordData for DNAME {
    fn from_wire(decoder: &mut RDataDecoder) -> DNSResult<Self> {
        Ok(DNAME {
            target: decoder.read_name()?,
        })
    }

    fn to_wire(&self, encoder: &mut RDataEncoder) -> DNSResult<usize> {
        // never compressed: DNAME postdates the RFC 1035 compression list
        encoder.write_name(&self.target, false)
    }

    fn from_master(fields: &mut MasterFields, origin: Option<&DomainName>) -> DNSResult<Self> {
        Ok(DNAME {
            target: fields.next_name("target", origin)?,
        })
    }

    fn max_length(&self) -> usize {
        self.target.encoded_len()
    }
}

impl fmt::Display for DNAME {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.target)
    }
}
