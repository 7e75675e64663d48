//! The original record types of RFC 1035: A, NS, CNAME, SOA, WKS, PTR,
//! HINFO, MX and TXT. The TXT shape is reused by SPF (RFC 7208).
use std::fmt;
use std::net::Ipv4Addr;

use crate::charstring::CharacterString;
use crate::domain::DomainName;
use crate::error::{DNSError, DNSResult};
use crate::rdata::codec::{MasterFields, RDataDecoder, RDataEncoder};
use crate::rdata::RecordData;

/// A host address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct A {
    pub address: Ipv4Addr,
}

impl RecordData for A {
    fn from_wire(decoder: &mut RDataDecoder) -> DNSResult<Self> {
        let octets = decoder.read_bytes(4, "IPv4 address")?;
        let mut address = [0u8; 4];
        address.copy_from_slice(&octets);
        Ok(A {
            address: Ipv4Addr::from(address),
        })
    }

    fn to_wire(&self, encoder: &mut RDataEncoder) -> DNSResult<usize> {
        Ok(encoder.write_bytes(&self.address.octets()))
    }

    fn from_master(fields: &mut MasterFields, _origin: Option<&DomainName>) -> DNSResult<Self> {
        Ok(A {
            address: fields.parse("IPv4 address")?,
        })
    }

    fn max_length(&self) -> usize {
        4
    }
}

impl fmt::Display for A {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.address)
    }
}

// The single-name record types whose target field historically used
// compression.
macro_rules! host_rdata {
    ( $( $(#[$meta:meta])* $name:ident, )* ) => {
        $(
            $(#[$meta])*
            #[derive(Debug, Clone, PartialEq, Eq)]
            pub struct $name {
                pub target: DomainName,
            }

            impl RecordData for $name {
                fn from_wire(decoder: &mut RDataDecoder) -> DNSResult<Self> {
                    Ok($name { target: decoder.read_name()? })
                }

                fn to_wire(&self, encoder: &mut RDataEncoder) -> DNSResult<usize> {
                    encoder.write_name(&self.target, true)
                }

                fn from_master(
                    fields: &mut MasterFields,
                    origin: Option<&DomainName>,
                ) -> DNSResult<Self> {
                    Ok($name { target: fields.next_name("target", origin)? })
                }

                fn max_length(&self) -> usize {
                    self.target.encoded_len()
                }
            }

            impl fmt::Display for $name {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    write!(f, "{}", self.target)
                }
            }
        )*
    };
}

host_rdata! {
    /// An authoritative name server.
    NS,
    /// The canonical name for an alias.
    CNAME,
    /// A domain name pointer.
    PTR,
}

/// Marks the start of a zone of authority.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SOA {
    /// name server that was the original or primary source of data for
    /// this zone
    pub mname: DomainName,
    /// mailbox of the person responsible for this zone
    pub rname: DomainName,
    /// version number of the original copy of the zone, compared with
    /// sequence space arithmetic
    pub serial: u32,
    pub refresh: i32,
    pub retry: i32,
    pub expire: i32,
    pub minimum: i32,
}

impl RecordData for SOA {
    fn from_wire(decoder: &mut RDataDecoder) -> DNSResult<Self> {
        Ok(SOA {
            mname: decoder.read_name()?,
            rname: decoder.read_name()?,
            serial: decoder.read_u32()?,
            refresh: decoder.read_u32()? as i32,
            retry: decoder.read_u32()? as i32,
            expire: decoder.read_u32()? as i32,
            minimum: decoder.read_u32()? as i32,
        })
    }

    fn to_wire(&self, encoder: &mut RDataEncoder) -> DNSResult<usize> {
        let mut length = encoder.write_name(&self.mname, true)?;
        length += encoder.write_name(&self.rname, true)?;
        length += encoder.write_u32(self.serial);
        length += encoder.write_u32(self.refresh as u32);
        length += encoder.write_u32(self.retry as u32);
        length += encoder.write_u32(self.expire as u32);
        length += encoder.write_u32(self.minimum as u32);
        Ok(length)
    }

    fn from_master(fields: &mut MasterFields, origin: Option<&DomainName>) -> DNSResult<Self> {
        Ok(SOA {
            mname: fields.next_name("mname", origin)?,
            rname: fields.next_name("rname", origin)?,
            serial: fields.parse("serial")?,
            refresh: fields.parse("refresh")?,
            retry: fields.parse("retry")?,
            expire: fields.parse("expire")?,
            minimum: fields.parse("minimum")?,
        })
    }

    fn max_length(&self) -> usize {
        self.mname.encoded_len() + self.rname.encoded_len() + 20
    }
}

impl fmt::Display for SOA {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {} {} {} {}",
            self.mname, self.rname, self.serial, self.refresh, self.retry, self.expire, self.minimum
        )
    }
}

/// A well known service description: which ports answer on a given address
/// for a given protocol.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WKS {
    pub address: Ipv4Addr,
    pub protocol: u8,
    /// MSB-first port bitmap, trailing zero octets trimmed
    pub bitmap: Vec<u8>,
}

impl WKS {
    pub fn ports(&self) -> Vec<u16> {
        let mut ports = Vec::new();
        for (index, octet) in self.bitmap.iter().enumerate() {
            for bit in 0..8 {
                if octet & (0x80 >> bit) != 0 {
                    ports.push(index as u16 * 8 + bit as u16);
                }
            }
        }
        ports
    }
}

impl RecordData for WKS {
    fn from_wire(decoder: &mut RDataDecoder) -> DNSResult<Self> {
        let octets = decoder.read_bytes(4, "WKS address")?;
        let mut address = [0u8; 4];
        address.copy_from_slice(&octets);
        Ok(WKS {
            address: Ipv4Addr::from(address),
            protocol: decoder.read_u8()?,
            bitmap: decoder.rest(),
        })
    }

    fn to_wire(&self, encoder: &mut RDataEncoder) -> DNSResult<usize> {
        let mut length = encoder.write_bytes(&self.address.octets());
        length += encoder.write_u8(self.protocol);
        length += encoder.write_bytes(&self.bitmap);
        Ok(length)
    }

    fn from_master(fields: &mut MasterFields, _origin: Option<&DomainName>) -> DNSResult<Self> {
        let address = fields.parse("WKS address")?;
        let protocol = match fields.next_str("protocol")? {
            "tcp" => 6,
            "udp" => 17,
            text => text
                .parse()
                .map_err(|_| DNSError::master(format!("bad protocol '{}'", text)))?,
        };

        let mut bitmap = Vec::new();
        while !fields.is_empty() {
            let port: u16 = fields.parse("port")?;
            let index = port as usize / 8;
            if bitmap.len() <= index {
                bitmap.resize(index + 1, 0);
            }
            bitmap[index] |= 0x80 >> (port % 8);
        }

        Ok(WKS {
            address,
            protocol,
            bitmap,
        })
    }

    fn max_length(&self) -> usize {
        5 + self.bitmap.len()
    }
}

impl fmt::Display for WKS {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.address, self.protocol)?;
        for port in self.ports() {
            write!(f, " {}", port)?;
        }
        Ok(())
    }
}

/// Host information.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HINFO {
    pub cpu: CharacterString,
    pub os: CharacterString,
}

impl RecordData for HINFO {
    fn from_wire(decoder: &mut RDataDecoder) -> DNSResult<Self> {
        Ok(HINFO {
            cpu: decoder.read_char_string()?,
            os: decoder.read_char_string()?,
        })
    }

    fn to_wire(&self, encoder: &mut RDataEncoder) -> DNSResult<usize> {
        Ok(encoder.write_char_string(&self.cpu) + encoder.write_char_string(&self.os))
    }

    fn from_master(fields: &mut MasterFields, _origin: Option<&DomainName>) -> DNSResult<Self> {
        Ok(HINFO {
            cpu: fields.next_char_string("cpu")?,
            os: fields.next_char_string("os")?,
        })
    }

    fn max_length(&self) -> usize {
        self.cpu.encoded_len() + self.os.encoded_len()
    }
}

impl fmt::Display for HINFO {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.cpu, self.os)
    }
}

/// Mail exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MX {
    /// lower values are preferred
    pub preference: u16,
    /// a host willing to act as a mail exchange for the owner name
    pub exchange: DomainName,
}

impl RecordData for MX {
    fn from_wire(decoder: &mut RDataDecoder) -> DNSResult<Self> {
        Ok(MX {
            preference: decoder.read_u16()?,
            exchange: decoder.read_name()?,
        })
    }

    fn to_wire(&self, encoder: &mut RDataEncoder) -> DNSResult<usize> {
        let mut length = encoder.write_u16(self.preference);
        length += encoder.write_name(&self.exchange, true)?;
        Ok(length)
    }

    fn from_master(fields: &mut MasterFields, origin: Option<&DomainName>) -> DNSResult<Self> {
        Ok(MX {
            preference: fields.parse("preference")?,
            exchange: fields.next_name("exchange", origin)?,
        })
    }

    fn max_length(&self) -> usize {
        2 + self.exchange.encoded_len()
    }
}

impl fmt::Display for MX {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.preference, self.exchange)
    }
}

/// One or more text strings. SPF records carry the same shape under their
/// own type code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TXT {
    pub strings: Vec<CharacterString>,
}

impl RecordData for TXT {
    fn from_wire(decoder: &mut RDataDecoder) -> DNSResult<Self> {
        let mut strings = Vec::new();
        while decoder.remaining() > 0 {
            strings.push(decoder.read_char_string()?);
        }
        if strings.is_empty() {
            return Err(DNSError::wire("TXT rdata carries no string"));
        }
        Ok(TXT { strings })
    }

    fn to_wire(&self, encoder: &mut RDataEncoder) -> DNSResult<usize> {
        let mut length = 0;
        for cs in &self.strings {
            length += encoder.write_char_string(cs);
        }
        Ok(length)
    }

    fn from_master(fields: &mut MasterFields, _origin: Option<&DomainName>) -> DNSResult<Self> {
        let strings = fields.rest_char_strings()?;
        if strings.is_empty() {
            return Err(DNSError::master("TXT rdata needs at least one string"));
        }
        Ok(TXT { strings })
    }

    fn max_length(&self) -> usize {
        self.strings.iter().map(CharacterString::encoded_len).sum()
    }
}

impl fmt::Display for TXT {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, cs) in self.strings.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{}", cs)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rdata::test_helpers::{master_roundtrip, wire_roundtrip};
    use std::io::Cursor;

    #[test]
    fn a_record() {
        let a = A {
            address: "93.184.216.34".parse().unwrap(),
        };
        wire_roundtrip(&a);
        master_roundtrip(&a);
        assert_eq!(a.to_string(), "93.184.216.34");

        let mut buffer = Vec::new();
        let mut encoder = RDataEncoder::new(&mut buffer, None, false);
        a.to_wire(&mut encoder).unwrap();
        assert_eq!(buffer, &[0x5D, 0xB8, 0xD8, 0x22]);
    }

    #[test]
    fn soa_record() {
        let soa = SOA {
            mname: DomainName::try_from("ns1.google.com.").unwrap(),
            rname: DomainName::try_from("dns-admin.google.com.").unwrap(),
            serial: 421331739,
            refresh: 900,
            retry: 900,
            expire: 1800,
            minimum: 60,
        };
        wire_roundtrip(&soa);
        master_roundtrip(&soa);
        assert_eq!(
            soa.to_string(),
            "ns1.google.com. dns-admin.google.com. 421331739 900 900 1800 60"
        );
    }

    #[test]
    fn mx_and_hosts() {
        let mx = MX {
            preference: 10,
            exchange: DomainName::try_from("mail.example.com.").unwrap(),
        };
        wire_roundtrip(&mx);
        master_roundtrip(&mx);

        let ns = NS {
            target: DomainName::try_from("ns1.example.com.").unwrap(),
        };
        wire_roundtrip(&ns);
        master_roundtrip(&ns);
    }

    #[test]
    fn txt_record() {
        let txt = TXT {
            strings: vec![
                CharacterString::try_from("v=spf1 -all").unwrap(),
                CharacterString::try_from("second").unwrap(),
            ],
        };
        wire_roundtrip(&txt);
        master_roundtrip(&txt);
        assert_eq!(txt.to_string(), "\"v=spf1 -all\" \"second\"");
    }

    #[test]
    fn empty_txt_rejected() {
        let mut cursor = Cursor::new([].as_slice());
        let mut decoder = RDataDecoder::new(&mut cursor, 0).unwrap();
        assert!(TXT::from_wire(&mut decoder).is_err());
    }

    #[test]
    fn wks_record() {
        let wks = WKS {
            address: "10.0.0.1".parse().unwrap(),
            protocol: 6,
            bitmap: vec![0x00, 0x00, 0x01, 0x40],
        };
        assert_eq!(wks.ports(), vec![23, 25]);
        wire_roundtrip(&wks);
        master_roundtrip(&wks);
    }

    #[test]
    fn hinfo_record() {
        let hinfo = HINFO {
            cpu: CharacterString::try_from("AMD64").unwrap(),
            os: CharacterString::try_from("Linux").unwrap(),
        };
        wire_roundtrip(&hinfo);
        master_roundtrip(&hinfo);
    }
}
