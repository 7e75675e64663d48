//! URI: priority/weight plus a target URI carried as one long text field.
use std::fmt;

use crate::domain::DomainName;
use crate::error::DNSResult;
use crate::rdata::codec::{unescape_master, MasterFields, RDataDecoder, RDataEncoder};
use crate::rdata::RecordData;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct URI {
    pub priority: u16,
    pub weight: u16,
    /// the URI bytes; unlike TXT this is *not* length-prefixed on the
    /// wire, so it may exceed the 255-octet character-string cap
    pub target: Vec<u8>,
}

impl RecordData for URI {
    fn from_wire(decoder: &mut RDataDecoder) -> DNSResult<Self> {
        Ok(URI {
            priority: decoder.read_u16()?,
            weight: decoder.read_u16()?,
            target: decoder.rest(),
        })
    }

    fn to_wire(&self, encoder: &mut RDataEncoder) -> DNSResult<usize> {
        let mut length = encoder.write_u16(self.priority);
        length += encoder.write_u16(self.weight);
        length += encoder.write_bytes(&self.target);
        Ok(length)
    }

    fn from_master(fields: &mut MasterFields, _origin: Option<&DomainName>) -> DNSResult<Self> {
        Ok(URI {
            priority: fields.parse("priority")?,
            weight: fields.parse("weight")?,
            target: unescape_master(&fields.next_field("target")?.bytes)?,
        })
    }

    fn max_length(&self) -> usize {
        4 + self.target.len()
    }
}

impl fmt::Display for URI {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} \"", self.priority, self.weight)?;
        for &b in &self.target {
            match b {
                b'"' | b'\\' => write!(f, "\\{}", b as char)?,
                0x20..=0x7E => write!(f, "{}", b as char)?,
                _ => write!(f, "\\{:03}", b)?,
            }
        }
        f.write_str("\"")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rdata::test_helpers::{master_roundtrip, wire_roundtrip};

    #[test]
    fn uri_record() {
        let uri = URI {
            priority: 10,
            weight: 1,
            target: b"https://www.example.com/path".to_vec(),
        };
        wire_roundtrip(&uri);
        master_roundtrip(&uri);
        assert_eq!(uri.to_string(), "10 1 \"https://www.example.com/path\"");
    }

    #[test]
    fn long_target_accepted() {
        let uri = URI {
            priority: 1,
            weight: 0,
            target: vec![b'a'; 700],
        };
        wire_roundtrip(&uri);
        master_roundtrip(&uri);
    }
}
