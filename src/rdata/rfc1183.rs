//! The RFC 1183 experimental types (RP, AFSDB, X25, ISDN, RT) and their
//! close relatives NSAP (RFC 1706), PX (RFC 2163) and GPOS (RFC 1712).
use std::fmt;

use crate::base_encoding::base16_decode;
use crate::charstring::CharacterString;
use crate::domain::DomainName;
use crate::error::{DNSError, DNSResult};
use crate::rdata::codec::{MasterFields, RDataDecoder, RDataEncoder};
use crate::rdata::RecordData;

/// Responsible person: a mailbox and a pointer to TXT records with more
/// detail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RP {
    pub mbox: DomainName,
    pub txt_domain: DomainName,
}

impl RecordData for RP {
    fn from_wire(decoder: &mut RDataDecoder) -> DNSResult<Self> {
        Ok(RP {
            mbox: decoder.read_name()?,
            txt_domain: decoder.read_name()?,
        })
    }

    fn to_wire(&self, encoder: &mut RDataEncoder) -> DNSResult<usize> {
        let mut length = encoder.write_name(&self.mbox, false)?;
        length += encoder.write_name(&self.txt_domain, false)?;
        Ok(length)
    }

    fn from_master(fields: &mut MasterFields, origin: Option<&DomainName>) -> DNSResult<Self> {
        Ok(RP {
            mbox: fields.next_name("mbox", origin)?,
            txt_domain: fields.next_name("txt domain", origin)?,
        })
    }

    fn max_length(&self) -> usize {
        self.mbox.encoded_len() + self.txt_domain.encoded_len()
    }
}

impl fmt::Display for RP {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.mbox, self.txt_domain)
    }
}

// The preference + host shape shared by AFSDB and RT.
macro_rules! preference_rdata {
    ( $( $(#[$meta:meta])* $name:ident . $field:ident, )* ) => {
        $(
            $(#[$meta])*
            #[derive(Debug, Clone, PartialEq, Eq)]
            pub struct $name {
                pub preference: u16,
                pub $field: DomainName,
            }

            impl RecordData for $name {
                fn from_wire(decoder: &mut RDataDecoder) -> DNSResult<Self> {
                    Ok($name {
                        preference: decoder.read_u16()?,
                        $field: decoder.read_name()?,
                    })
                }

                fn to_wire(&self, encoder: &mut RDataEncoder) -> DNSResult<usize> {
                    let mut length = encoder.write_u16(self.preference);
                    length += encoder.write_name(&self.$field, false)?;
                    Ok(length)
                }

                fn from_master(
                    fields: &mut MasterFields,
                    origin: Option<&DomainName>,
                ) -> DNSResult<Self> {
                    Ok($name {
                        preference: fields.parse("preference")?,
                        $field: fields.next_name(stringify!($field), origin)?,
                    })
                }

                fn max_length(&self) -> usize {
                    2 + self.$field.encoded_len()
                }
            }

            impl fmt::Display for $name {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    write!(f, "{} {}", self.preference, self.$field)
                }
            }
        )*
    };
}

preference_rdata! {
    /// AFS database location.
    AFSDB.hostname,
    /// Route through: an intermediate host for protocols without inherent
    /// routing.
    RT.intermediate,
}

/// An X.25 PSDN address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct X25 {
    pub address: CharacterString,
}

impl RecordData for X25 {
    fn from_wire(decoder: &mut RDataDecoder) -> DNSResult<Self> {
        Ok(X25 {
            address: decoder.read_char_string()?,
        })
    }

    fn to_wire(&self, encoder: &mut RDataEncoder) -> DNSResult<usize> {
        Ok(encoder.write_char_string(&self.address))
    }

    fn from_master(fields: &mut MasterFields, _origin: Option<&DomainName>) -> DNSResult<Self> {
        Ok(X25 {
            address: fields.next_char_string("address")?,
        })
    }

    fn max_length(&self) -> usize {
        self.address.encoded_len()
    }
}

impl fmt::Display for X25 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.address)
    }
}

/// An ISDN address with an optional subaddress.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ISDN {
    pub address: CharacterString,
    pub subaddress: Option<CharacterString>,
}

impl RecordData for ISDN {
    fn from_wire(decoder: &mut RDataDecoder) -> DNSResult<Self> {
        let address = decoder.read_char_string()?;
        let subaddress = if decoder.remaining() > 0 {
            Some(decoder.read_char_string()?)
        } else {
            None
        };
        Ok(ISDN {
            address,
            subaddress,
        })
    }

    fn to_wire(&self, encoder: &mut RDataEncoder) -> DNSResult<usize> {
        let mut length = encoder.write_char_string(&self.address);
        if let Some(sub) = &self.subaddress {
            length += encoder.write_char_string(sub);
        }
        Ok(length)
    }

    fn from_master(fields: &mut MasterFields, _origin: Option<&DomainName>) -> DNSResult<Self> {
        let address = fields.next_char_string("address")?;
        let subaddress = if fields.is_empty() {
            None
        } else {
            Some(fields.next_char_string("subaddress")?)
        };
        Ok(ISDN {
            address,
            subaddress,
        })
    }

    fn max_length(&self) -> usize {
        self.address.encoded_len()
            + self
                .subaddress
                .as_ref()
                .map(CharacterString::encoded_len)
                .unwrap_or(0)
    }
}

impl fmt::Display for ISDN {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.address)?;
        if let Some(sub) = &self.subaddress {
            write!(f, " {}", sub)?;
        }
        Ok(())
    }
}

/// An NSAP address, presented as `0x`-prefixed hex. Internal dots in the
/// text form are ignored on parse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NSAP {
    pub address: Vec<u8>,
}

impl RecordData for NSAP {
    fn from_wire(decoder: &mut RDataDecoder) -> DNSResult<Self> {
        Ok(NSAP {
            address: decoder.rest(),
        })
    }

    fn to_wire(&self, encoder: &mut RDataEncoder) -> DNSResult<usize> {
        Ok(encoder.write_bytes(&self.address))
    }

    fn from_master(fields: &mut MasterFields, _origin: Option<&DomainName>) -> DNSResult<Self> {
        let text = fields.next_str("address")?;
        let hex = text
            .strip_prefix("0x")
            .ok_or_else(|| DNSError::master(format!("NSAP address '{}' lacks 0x prefix", text)))?
            .replace('.', "");
        Ok(NSAP {
            address: base16_decode(&hex)?,
        })
    }

    fn max_length(&self) -> usize {
        self.address.len()
    }
}

impl fmt::Display for NSAP {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("0x")?;
        for b in &self.address {
            write!(f, "{:02X}", b)?;
        }
        Ok(())
    }
}

/// X.400 mail mapping information.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PX {
    pub preference: u16,
    pub map822: DomainName,
    pub mapx400: DomainName,
}

impl RecordData for PX {
    fn from_wire(decoder: &mut RDataDecoder) -> DNSResult<Self> {
        Ok(PX {
            preference: decoder.read_u16()?,
            map822: decoder.read_name()?,
            mapx400: decoder.read_name()?,
        })
    }

    fn to_wire(&self, encoder: &mut RDataEncoder) -> DNSResult<usize> {
        let mut length = encoder.write_u16(self.preference);
        length += encoder.write_name(&self.map822, false)?;
        length += encoder.write_name(&self.mapx400, false)?;
        Ok(length)
    }

    fn from_master(fields: &mut MasterFields, origin: Option<&DomainName>) -> DNSResult<Self> {
        Ok(PX {
            preference: fields.parse("preference")?,
            map822: fields.next_name("map822", origin)?,
            mapx400: fields.next_name("mapx400", origin)?,
        })
    }

    fn max_length(&self) -> usize {
        2 + self.map822.encoded_len() + self.mapx400.encoded_len()
    }
}

impl fmt::Display for PX {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.preference, self.map822, self.mapx400)
    }
}

/// Geographical position as three free-form strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GPOS {
    pub longitude: CharacterString,
    pub latitude: CharacterString,
    pub altitude: CharacterString,
}

impl RecordData for GPOS {
    fn from_wire(decoder: &mut RDataDecoder) -> DNSResult<Self> {
        Ok(GPOS {
            longitude: decoder.read_char_string()?,
            latitude: decoder.read_char_string()?,
            altitude: decoder.read_char_string()?,
        })
    }

    fn to_wire(&self, encoder: &mut RDataEncoder) -> DNSResult<usize> {
        Ok(encoder.write_char_string(&self.longitude)
            + encoder.write_char_string(&self.latitude)
            + encoder.write_char_string(&self.altitude))
    }

    fn from_master(fields: &mut MasterFields, _origin: Option<&DomainName>) -> DNSResult<Self> {
        Ok(GPOS {
            longitude: fields.next_char_string("longitude")?,
            latitude: fields.next_char_string("latitude")?,
            altitude: fields.next_char_string("altitude")?,
        })
    }

    fn max_length(&self) -> usize {
        self.longitude.encoded_len() + self.latitude.encoded_len() + self.altitude.encoded_len()
    }
}

impl fmt::Display for GPOS {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.longitude, self.latitude, self.altitude)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rdata::test_helpers::{master_roundtrip, wire_roundtrip};

    #[test]
    fn rp_record() {
        let rp = RP {
            mbox: DomainName::try_from("admin.example.com.").unwrap(),
            txt_domain: DomainName::try_from("ops.example.com.").unwrap(),
        };
        wire_roundtrip(&rp);
        master_roundtrip(&rp);
    }

    #[test]
    fn afsdb_and_rt() {
        let afsdb = AFSDB {
            preference: 1,
            hostname: DomainName::try_from("afs.example.com.").unwrap(),
        };
        wire_roundtrip(&afsdb);
        master_roundtrip(&afsdb);

        let rt = RT {
            preference: 2,
            intermediate: DomainName::try_from("relay.example.com.").unwrap(),
        };
        wire_roundtrip(&rt);
        master_roundtrip(&rt);
    }

    #[test]
    fn isdn_with_and_without_subaddress() {
        let full = ISDN {
            address: CharacterString::try_from("150862028003217").unwrap(),
            subaddress: Some(CharacterString::try_from("004").unwrap()),
        };
        wire_roundtrip(&full);
        master_roundtrip(&full);

        let bare = ISDN {
            address: CharacterString::try_from("150862028003217").unwrap(),
            subaddress: None,
        };
        wire_roundtrip(&bare);
        master_roundtrip(&bare);
    }

    #[test]
    fn nsap_record() {
        let nsap = NSAP {
            address: vec![0x47, 0x00, 0x05, 0x80, 0xff],
        };
        assert_eq!(nsap.to_string(), "0x47000580FF");
        wire_roundtrip(&nsap);
        master_roundtrip(&nsap);

        // the RFC 1706 presentation carries grouping dots
        let fields = crate::rdata::test_helpers::tokenize_rdata("0x47.000580.ff");
        let mut it = MasterFields::new(&fields);
        let parsed = NSAP::from_master(&mut it, None).unwrap();
        assert_eq!(parsed.address, vec![0x47, 0x00, 0x05, 0x80, 0xff]);
    }

    #[test]
    fn px_and_gpos() {
        let px = PX {
            preference: 10,
            map822: DomainName::try_from("example.com.").unwrap(),
            mapx400: DomainName::try_from("px400.example.com.").unwrap(),
        };
        wire_roundtrip(&px);
        master_roundtrip(&px);

        let gpos = GPOS {
            longitude: CharacterString::try_from("-32.6882").unwrap(),
            latitude: CharacterString::try_from("116.8652").unwrap(),
            altitude: CharacterString::try_from("10.0").unwrap(),
        };
        wire_roundtrip(&gpos);
        master_roundtrip(&gpos);
    }
}
