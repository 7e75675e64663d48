//! CAA: which certification authorities may issue for a name.
use std::fmt;

use crate::charstring::CharacterString;
use crate::domain::DomainName;
use crate::error::{DNSError, DNSResult};
use crate::rdata::codec::{unescape_master, MasterFields, RDataDecoder, RDataEncoder};
use crate::rdata::RecordData;

/// issuer-critical flag bit
pub const CAA_CRITICAL: u8 = 0x80;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CAA {
    pub flags: u8,
    /// the property name, e.g. `issue`, `issuewild`, `iodef`
    pub tag: CharacterString,
    /// the property value; unlike the tag it is *not* length-prefixed
    pub value: Vec<u8>,
}

impl CAA {
    pub fn is_critical(&self) -> bool {
        self.flags & CAA_CRITICAL != 0
    }
}

impl RecordData for CAA {
    fn from_wire(decoder: &mut RDataDecoder) -> DNSResult<Self> {
        let flags = decoder.read_u8()?;
        let tag = decoder.read_char_string()?;
        if tag.is_empty() {
            return Err(DNSError::wire("CAA with an empty tag"));
        }
        Ok(CAA {
            flags,
            tag,
            value: decoder.rest(),
        })
    }

    fn to_wire(&self, encoder: &mut RDataEncoder) -> DNSResult<usize> {
        let mut length = encoder.write_u8(self.flags);
        length += encoder.write_char_string(&self.tag);
        length += encoder.write_bytes(&self.value);
        Ok(length)
    }

    fn from_master(fields: &mut MasterFields, _origin: Option<&DomainName>) -> DNSResult<Self> {
        Ok(CAA {
            flags: fields.parse("flags")?,
            tag: fields.next_char_string("tag")?,
            // the value is not length-prefixed on the wire and may exceed
            // the 255-octet character-string cap
            value: unescape_master(&fields.next_field("value")?.bytes)?,
        })
    }

    fn max_length(&self) -> usize {
        1 + self.tag.encoded_len() + self.value.len()
    }
}

impl fmt::Display for CAA {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // the tag is plain letters and digits, the value is quoted
        write!(f, "{} ", self.flags)?;
        for &b in self.tag.as_bytes() {
            if (0x21..=0x7E).contains(&b) && !b"\"\\".contains(&b) {
                write!(f, "{}", b as char)?;
            } else {
                write!(f, "\\{:03}", b)?;
            }
        }
        f.write_str(" \"")?;
        for &b in &self.value {
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
    fn caa_roundtrip() {
        let caa = CAA {
            flags: CAA_CRITICAL,
            tag: CharacterString::try_from("issue").unwrap(),
            value: b"ca.example.net; policy=ev".to_vec(),
        };
        assert!(caa.is_critical());
        wire_roundtrip(&caa);
        master_roundtrip(&caa);
        assert_eq!(caa.to_string(), "128 issue \"ca.example.net; policy=ev\"");
    }

    #[test]
    fn empty_tag_rejected() {
        let bytes = [0u8, 0];
        assert!(crate::rdata::test_helpers::decode_bytes::<CAA>(&bytes).is_err());
    }

    #[test]
    fn long_value_roundtrips() {
        // values are not length-prefixed and may exceed 255 octets
        let caa = CAA {
            flags: 0,
            tag: CharacterString::try_from("iodef").unwrap(),
            value: vec![b'a'; 300],
        };
        wire_roundtrip(&caa);
        master_roundtrip(&caa);
    }
}
