//! The ILNP locator records: NID, L32, L64 and LP.
use std::fmt;
use std::net::Ipv4Addr;

use crate::domain::DomainName;
use crate::error::{DNSError, DNSResult};
use crate::rdata::codec::{MasterFields, RDataDecoder, RDataEncoder};
use crate::rdata::RecordData;

// 64-bit identifiers present as four colon-separated hex groups,
// e.g. 0014:4fff:ff20:8a76
fn format_groups(value: u64) -> String {
    let b = value.to_be_bytes();
    format!(
        "{:02x}{:02x}:{:02x}{:02x}:{:02x}{:02x}:{:02x}{:02x}",
        b[0], b[1], b[2], b[3], b[4], b[5], b[6], b[7]
    )
}

fn parse_groups(text: &str) -> DNSResult<u64> {
    let groups: Vec<&str> = text.split(':').collect();
    if groups.len() != 4 {
        return Err(DNSError::master(format!(
            "'{}' is not four hex groups",
            text
        )));
    }
    let mut value = 0u64;
    for group in groups {
        let part = u16::from_str_radix(group, 16)
            .map_err(|_| DNSError::master(format!("bad hex group '{}'", group)))?;
        value = value << 16 | part as u64;
    }
    Ok(value)
}

/// A node identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NID {
    pub preference: u16,
    pub node_id: u64,
}

impl RecordData for NID {
    fn from_wire(decoder: &mut RDataDecoder) -> DNSResult<Self> {
        Ok(NID {
            preference: decoder.read_u16()?,
            node_id: {
                let high = decoder.read_u32()? as u64;
                let low = decoder.read_u32()? as u64;
                high << 32 | low
            },
        })
    }

    fn to_wire(&self, encoder: &mut RDataEncoder) -> DNSResult<usize> {
        let mut length = encoder.write_u16(self.preference);
        length += encoder.write_bytes(&self.node_id.to_be_bytes());
        Ok(length)
    }

    fn from_master(fields: &mut MasterFields, _origin: Option<&DomainName>) -> DNSResult<Self> {
        Ok(NID {
            preference: fields.parse("preference")?,
            node_id: parse_groups(fields.next_str("node id")?)?,
        })
    }

    fn max_length(&self) -> usize {
        10
    }
}

impl fmt::Display for NID {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.preference, format_groups(self.node_id))
    }
}

/// A 32-bit locator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct L32 {
    pub preference: u16,
    pub locator: Ipv4Addr,
}

impl RecordData for L32 {
    fn from_wire(decoder: &mut RDataDecoder) -> DNSResult<Self> {
        let preference = decoder.read_u16()?;
        let octets = decoder.read_bytes(4, "locator")?;
        let mut locator = [0u8; 4];
        locator.copy_from_slice(&octets);
        Ok(L32 {
            preference,
            locator: Ipv4Addr::from(locator),
        })
    }

    fn to_wire(&self, encoder: &mut RDataEncoder) -> DNSResult<usize> {
        let mut length = encoder.write_u16(self.preference);
        length += encoder.write_bytes(&self.locator.octets());
        Ok(length)
    }

    fn from_master(fields: &mut MasterFields, _origin: Option<&DomainName>) -> DNSResult<Self> {
        Ok(L32 {
            preference: fields.parse("preference")?,
            locator: fields.parse("locator")?,
        })
    }

    fn max_length(&self) -> usize {
        6
    }
}

impl fmt::Display for L32 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.preference, self.locator)
    }
}

/// A 64-bit locator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct L64 {
    pub preference: u16,
    pub locator: u64,
}

impl RecordData for L64 {
    fn from_wire(decoder: &mut RDataDecoder) -> DNSResult<Self> {
        Ok(L64 {
            preference: decoder.read_u16()?,
            locator: {
                let high = decoder.read_u32()? as u64;
                let low = decoder.read_u32()? as u64;
                high << 32 | low
            },
        })
    }

    fn to_wire(&self, encoder: &mut RDataEncoder) -> DNSResult<usize> {
        let mut length = encoder.write_u16(self.preference);
        length += encoder.write_bytes(&self.locator.to_be_bytes());
        Ok(length)
    }

    fn from_master(fields: &mut MasterFields, _origin: Option<&DomainName>) -> DNSResult<Self> {
        Ok(L64 {
            preference: fields.parse("preference")?,
            locator: parse_groups(fields.next_str("locator")?)?,
        })
    }

    fn max_length(&self) -> usize {
        10
    }
}

impl fmt::Display for L64 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.preference, format_groups(self.locator))
    }
}

/// A locator pointer: delegates to L32/L64 records at another name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LP {
    pub preference: u16,
    pub fqdn: DomainName,
}

impl RecordData for LP {
    fn from_wire(decoder: &mut RDataDecoder) -> DNSResult<Self> {
        Ok(LP {
            preference: decoder.read_u16()?,
            fqdn: decoder.read_name()?,
        })
    }

    fn to_wire(&self, encoder: &mut RDataEncoder) -> DNSResult<usize> {
        let mut length = encoder.write_u16(self.preference);
        length += encoder.write_name(&self.fqdn, false)?;
        Ok(length)
    }

    fn from_master(fields: &mut MasterFields, origin: Option<&DomainName>) -> DNSResult<Self> {
        Ok(LP {
            preference: fields.parse("preference")?,
            fqdn: fields.next_name("fqdn", origin)?,
        })
    }

    fn max_length(&self) -> usize {
        2 + self.fqdn.encoded_len()
    }
}

impl fmt::Display for LP {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.preference, self.fqdn)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rdata::test_helpers::{master_roundtrip, wire_roundtrip};

    #[test]
    fn nid_presentation() {
        let nid = NID {
            preference: 10,
            node_id: 0x0014_4fff_ff20_8a76,
        };
        assert_eq!(nid.to_string(), "10 0014:4fff:ff20:8a76");
        wire_roundtrip(&nid);
        master_roundtrip(&nid);
    }

    #[test]
    fn l32_and_l64() {
        let l32 = L32 {
            preference: 20,
            locator: "10.1.2.0".parse().unwrap(),
        };
        wire_roundtrip(&l32);
        master_roundtrip(&l32);

        let l64 = L64 {
            preference: 30,
            locator: 0x2001_0db8_1140_1000,
        };
        wire_roundtrip(&l64);
        master_roundtrip(&l64);
    }

    #[test]
    fn lp_record() {
        let lp = LP {
            preference: 40,
            fqdn: DomainName::try_from("l64-subnet.example.com.").unwrap(),
        };
        wire_roundtrip(&lp);
        master_roundtrip(&lp);
    }
}
