//! NSEC3 and NSEC3PARAM: hashed authenticated denial of existence.
use std::fmt;

use crate::base_encoding::{
    base16_decode, base16_encode, base32hex_nopad_decode, base32hex_nopad_encode,
};
use crate::domain::DomainName;
use crate::error::{DNSError, DNSResult};
use crate::rdata::codec::{MasterFields, RDataDecoder, RDataEncoder};
use crate::rdata::type_bitmap::TypeBitmap;
use crate::rdata::RecordData;

// the salt field presents as '-' when empty
fn parse_salt(text: &str) -> DNSResult<Vec<u8>> {
    if text == "-" {
        Ok(Vec::new())
    } else {
        base16_decode(text)
    }
}

fn format_salt(salt: &[u8]) -> String {
    if salt.is_empty() {
        "-".to_string()
    } else {
        base16_encode(salt)
    }
}

/// Denial of existence over hashed owner names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NSEC3 {
    /// 1 = SHA-1
    pub hash_algorithm: u8,
    /// bit 0 is opt-out
    pub flags: u8,
    pub iterations: u16,
    pub salt: Vec<u8>,
    /// raw hash of the next owner, *not* base32-encoded
    pub next_hashed_owner: Vec<u8>,
    pub types: TypeBitmap,
}

impl NSEC3 {
    pub fn opt_out(&self) -> bool {
        self.flags & 1 != 0
    }
}

impl RecordData for NSEC3 {
    fn from_wire(decoder: &mut RDataDecoder) -> DNSResult<Self> {
        let hash_algorithm = decoder.read_u8()?;
        let flags = decoder.read_u8()?;
        let iterations = decoder.read_u16()?;
        let salt_length = decoder.read_u8()?;
        let salt = decoder.read_bytes(salt_length as usize, "salt")?;
        let hash_length = decoder.read_u8()?;
        if hash_length == 0 {
            return Err(DNSError::wire("NSEC3 with empty next hashed owner"));
        }
        let next_hashed_owner = decoder.read_bytes(hash_length as usize, "next hashed owner")?;
        let types = TypeBitmap::from_wire(decoder)?;

        Ok(NSEC3 {
            hash_algorithm,
            flags,
            iterations,
            salt,
            next_hashed_owner,
            types,
        })
    }

    fn to_wire(&self, encoder: &mut RDataEncoder) -> DNSResult<usize> {
        let mut length = encoder.write_u8(self.hash_algorithm);
        length += encoder.write_u8(self.flags);
        length += encoder.write_u16(self.iterations);
        length += encoder.write_u8(self.salt.len() as u8);
        length += encoder.write_bytes(&self.salt);
        length += encoder.write_u8(self.next_hashed_owner.len() as u8);
        length += encoder.write_bytes(&self.next_hashed_owner);
        length += self.types.to_wire(encoder);
        Ok(length)
    }

    fn from_master(fields: &mut MasterFields, _origin: Option<&DomainName>) -> DNSResult<Self> {
        Ok(NSEC3 {
            hash_algorithm: fields.parse("hash algorithm")?,
            flags: fields.parse("flags")?,
            iterations: fields.parse("iterations")?,
            salt: parse_salt(fields.next_str("salt")?)?,
            next_hashed_owner: base32hex_nopad_decode(fields.next_str("next hashed owner")?)?,
            types: TypeBitmap::from_master(fields)?,
        })
    }

    fn max_length(&self) -> usize {
        6 + self.salt.len() + self.next_hashed_owner.len() + self.types.encoded_len()
    }
}

impl fmt::Display for NSEC3 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {} {}",
            self.hash_algorithm,
            self.flags,
            self.iterations,
            format_salt(&self.salt),
            base32hex_nopad_encode(&self.next_hashed_owner)
        )?;
        if !self.types.is_empty() {
            write!(f, " {}", self.types)?;
        }
        Ok(())
    }
}

/// The NSEC3 parameters an authoritative server uses to compute hashed
/// owner names; lives at the zone apex.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NSEC3PARAM {
    pub hash_algorithm: u8,
    pub flags: u8,
    pub iterations: u16,
    pub salt: Vec<u8>,
}

impl RecordData for NSEC3PARAM {
    fn from_wire(decoder: &mut RDataDecoder) -> DNSResult<Self> {
        let hash_algorithm = decoder.read_u8()?;
        let flags = decoder.read_u8()?;
        let iterations = decoder.read_u16()?;
        let salt_length = decoder.read_u8()?;
        let salt = decoder.read_bytes(salt_length as usize, "salt")?;

        Ok(NSEC3PARAM {
            hash_algorithm,
            flags,
            iterations,
            salt,
        })
    }

    fn to_wire(&self, encoder: &mut RDataEncoder) -> DNSResult<usize> {
        let mut length = encoder.write_u8(self.hash_algorithm);
        length += encoder.write_u8(self.flags);
        length += encoder.write_u16(self.iterations);
        length += encoder.write_u8(self.salt.len() as u8);
        length += encoder.write_bytes(&self.salt);
        Ok(length)
    }

    fn from_master(fields: &mut MasterFields, _origin: Option<&DomainName>) -> DNSResult<Self> {
        Ok(NSEC3PARAM {
            hash_algorithm: fields.parse("hash algorithm")?,
            flags: fields.parse("flags")?,
            iterations: fields.parse("iterations")?,
            salt: parse_salt(fields.next_str("salt")?)?,
        })
    }

    fn max_length(&self) -> usize {
        5 + self.salt.len()
    }
}

impl fmt::Display for NSEC3PARAM {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {}",
            self.hash_algorithm,
            self.flags,
            self.iterations,
            format_salt(&self.salt)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rdata::test_helpers::{master_roundtrip, wire_roundtrip};

    #[test]
    fn nsec3_roundtrip() {
        let nsec3 = NSEC3 {
            hash_algorithm: 1,
            flags: 1,
            iterations: 12,
            salt: vec![0xaa, 0xbb, 0xcc, 0xdd],
            next_hashed_owner: base32hex_nopad_decode("NI9BSNE6JGFGO330HU4KGSP09POHFG62")
                .unwrap(),
            types: TypeBitmap::from_codes(vec![1, 2, 46]),
        };
        assert!(nsec3.opt_out());
        wire_roundtrip(&nsec3);
        master_roundtrip(&nsec3);
        assert_eq!(
            nsec3.to_string(),
            "1 1 12 AABBCCDD NI9BSNE6JGFGO330HU4KGSP09POHFG62 A NS RRSIG"
        );
    }

    #[test]
    fn nsec3param_empty_salt() {
        let param = NSEC3PARAM {
            hash_algorithm: 1,
            flags: 0,
            iterations: 0,
            salt: Vec::new(),
        };
        wire_roundtrip(&param);
        master_roundtrip(&param);
        assert_eq!(param.to_string(), "1 0 0 -");
    }

    #[test]
    fn empty_next_owner_rejected() {
        // hash length octet of zero
        let bytes = [1u8, 0, 0, 0, 0, 0];
        assert!(crate::rdata::test_helpers::decode_bytes::<NSEC3>(&bytes).is_err());
    }
}
