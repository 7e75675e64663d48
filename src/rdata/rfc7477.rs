//! CSYNC: child-to-parent synchronization.
use std::fmt;

use crate::domain::DomainName;
use crate::error::DNSResult;
use crate::rdata::codec::{MasterFields, RDataDecoder, RDataEncoder};
use crate::rdata::type_bitmap::TypeBitmap;
use crate::rdata::RecordData;

/// `immediate` flag bit
pub const CSYNC_IMMEDIATE: u16 = 0x0001;
/// `soaminimum` flag bit
pub const CSYNC_SOAMINIMUM: u16 = 0x0002;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CSYNC {
    pub soa_serial: u32,
    pub flags: u16,
    pub types: TypeBitmap,
}

impl RecordData for CSYNC {
    fn from_wire(decoder: &mut RDataDecoder) -> DNSResult<Self> {
        Ok(CSYNC {
            soa_serial: decoder.read_u32()?,
            flags: decoder.read_u16()?,
            types: TypeBitmap::from_wire(decoder)?,
        })
    }

    fn to_wire(&self, encoder: &mut RDataEncoder) -> DNSResult<usize> {
        let mut length = encoder.write_u32(self.soa_serial);
        length += encoder.write_u16(self.flags);
        length += self.types.to_wire(encoder);
        Ok(length)
    }

    fn from_master(fields: &mut MasterFields, _origin: Option<&DomainName>) -> DNSResult<Self> {
        Ok(CSYNC {
            soa_serial: fields.parse("soa serial")?,
            flags: fields.parse("flags")?,
            types: TypeBitmap::from_master(fields)?,
        })
    }

    fn max_length(&self) -> usize {
        6 + self.types.encoded_len()
    }
}

impl fmt::Display for CSYNC {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.soa_serial, self.flags)?;
        if !self.types.is_empty() {
            write!(f, " {}", self.types)?;
        }
        Ok(())
    }
}
