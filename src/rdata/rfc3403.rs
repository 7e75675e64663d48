//! NAPTR: the naming authority pointer used by DDDS applications.
use std::fmt;

use crate::charstring::CharacterString;
use crate::domain::DomainName;
use crate::error::DNSResult;
use crate::rdata::codec::{MasterFields, RDataDecoder, RDataEncoder};
use crate::rdata::RecordData;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NAPTR {
    pub order: u16,
    pub preference: u16,
    pub flags: CharacterString,
    pub service: CharacterString,
    pub regexp: CharacterString,
    pub replacement: DomainName,
}

impl RecordData for NAPTR {
    fn from_wire(decoder: &mut RDataDecoder) -> DNSResult<Self> {
        Ok(NAPTR {
            order: decoder.read_u16()?,
            preference: decoder.read_u16()?,
            flags: decoder.read_char_string()?,
            service: decoder.read_char_string()?,
            regexp: decoder.read_char_string()?,
            replacement: decoder.read_name()?,
        })
    }

    fn to_wire(&self, encoder: &mut RDataEncoder) -> DNSResult<usize> {
        let mut length = encoder.write_u16(self.order);
        length += encoder.write_u16(self.preference);
        length += encoder.write_char_string(&self.flags);
        length += encoder.write_char_string(&self.service);
        length += encoder.write_char_string(&self.regexp);
        length += encoder.write_name(&self.replacement, false)?;
        Ok(length)
    }

    fn from_master(fields: &mut MasterFields, origin: Option<&DomainName>) -> DNSResult<Self> {
        Ok(NAPTR {
            order: fields.parse("order")?,
            preference: fields.parse("preference")?,
            flags: fields.next_char_string("flags")?,
            service: fields.next_char_string("service")?,
            regexp: fields.next_char_string("regexp")?,
            replacement: fields.next_name("replacement", origin)?,
        })
    }

    fn max_length(&self) -> usize {
        4 + self.flags.encoded_len()
            + self.service.encoded_len()
            + self.regexp.encoded_len()
            + self.replacement.encoded_len()
    }
}

impl fmt::Display for NAPTR {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {} {} {}",
            self.order, self.preference, self.flags, self.service, self.regexp, self.replacement
        )
    }
}
