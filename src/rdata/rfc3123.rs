//! APL: lists of address prefixes, optionally negated.
use std::fmt;
use std::net::{Ipv4Addr, Ipv6Addr};

use crate::domain::DomainName;
use crate::error::{DNSError, DNSResult};
use crate::rdata::codec::{MasterFields, RDataDecoder, RDataEncoder};
use crate::rdata::RecordData;

const FAMILY_IPV4: u16 = 1;
const FAMILY_IPV6: u16 = 2;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AplItem {
    pub negated: bool,
    pub family: u16,
    pub prefix: u8,
    /// the address with trailing zero octets trimmed, as on the wire
    pub address: Vec<u8>,
}

impl AplItem {
    fn address_len(family: u16) -> usize {
        if family == FAMILY_IPV4 {
            4
        } else {
            16
        }
    }

    fn check(&self) -> DNSResult<()> {
        let (max_prefix, max_len) = match self.family {
            FAMILY_IPV4 => (32, 4),
            FAMILY_IPV6 => (128, 16),
            other => {
                return Err(DNSError::Unsupported(format!(
                    "APL address family {}",
                    other
                )))
            }
        };
        if self.prefix > max_prefix || self.address.len() > max_len {
            return Err(DNSError::wire(format!(
                "APL prefix {}/{} out of range for family {}",
                self.address.len(),
                self.prefix,
                self.family
            )));
        }
        Ok(())
    }

    fn padded(&self) -> [u8; 16] {
        let mut full = [0u8; 16];
        let take = self.address.len().min(16);
        full[..take].copy_from_slice(&self.address[..take]);
        full
    }
}

impl fmt::Display for AplItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.negated {
            f.write_str("!")?;
        }
        let full = self.padded();
        match self.family {
            FAMILY_IPV4 => {
                let mut octets = [0u8; 4];
                octets.copy_from_slice(&full[..4]);
                write!(f, "1:{}/{}", Ipv4Addr::from(octets), self.prefix)
            }
            _ => write!(f, "2:{}/{}", Ipv6Addr::from(full), self.prefix),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct APL {
    pub items: Vec<AplItem>,
}

impl RecordData for APL {
    fn from_wire(decoder: &mut RDataDecoder) -> DNSResult<Self> {
        let mut items = Vec::new();

        while decoder.remaining() > 0 {
            let family = decoder.read_u16()?;
            let prefix = decoder.read_u8()?;
            let flags = decoder.read_u8()?;
            let item = AplItem {
                negated: flags & 0x80 != 0,
                family,
                prefix,
                address: decoder.read_bytes((flags & 0x7F) as usize, "APL address")?,
            };
            item.check()?;
            items.push(item);
        }

        Ok(APL { items })
    }

    fn to_wire(&self, encoder: &mut RDataEncoder) -> DNSResult<usize> {
        let mut length = 0;
        for item in &self.items {
            length += encoder.write_u16(item.family);
            length += encoder.write_u8(item.prefix);
            length += encoder.write_u8(item.address.len() as u8 | if item.negated { 0x80 } else { 0 });
            length += encoder.write_bytes(&item.address);
        }
        Ok(length)
    }

    fn from_master(fields: &mut MasterFields, _origin: Option<&DomainName>) -> DNSResult<Self> {
        let mut items = Vec::new();

        while !fields.is_empty() {
            let text = fields.next_str("APL item")?;
            let bad = || DNSError::master(format!("bad APL item '{}'", text));

            let (negated, rest) = match text.strip_prefix('!') {
                Some(rest) => (true, rest),
                None => (false, text),
            };
            let (family_text, rest) = rest.split_once(':').ok_or_else(bad)?;
            let (address_text, prefix_text) = rest.split_once('/').ok_or_else(bad)?;

            let family: u16 = family_text.parse().map_err(|_| bad())?;
            let prefix: u8 = prefix_text.parse().map_err(|_| bad())?;

            let mut address = match family {
                FAMILY_IPV4 => address_text
                    .parse::<Ipv4Addr>()
                    .map_err(|_| bad())?
                    .octets()
                    .to_vec(),
                FAMILY_IPV6 => address_text
                    .parse::<Ipv6Addr>()
                    .map_err(|_| bad())?
                    .octets()
                    .to_vec(),
                other => {
                    return Err(DNSError::Unsupported(format!("APL address family {}", other)))
                }
            };
            while address.last() == Some(&0) {
                address.pop();
            }

            let item = AplItem {
                negated,
                family,
                prefix,
                address,
            };
            item.check()?;
            items.push(item);
        }

        Ok(APL { items })
    }

    fn max_length(&self) -> usize {
        self.items.iter().map(|i| 4 + i.address.len()).sum()
    }
}

impl fmt::Display for APL {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, item) in self.items.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{}", item)?;
        }
        Ok(())
    }
}
