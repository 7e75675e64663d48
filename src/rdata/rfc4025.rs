//! IPSECKEY: where to find an IPsec gateway and its public key.
use std::fmt;
use std::net::{Ipv4Addr, Ipv6Addr};

use crate::base_encoding::{base64_decode, base64_encode};
use crate::domain::DomainName;
use crate::error::{DNSError, DNSResult};
use crate::rdata::codec::{MasterFields, RDataDecoder, RDataEncoder};
use crate::rdata::RecordData;

/// The gateway field, discriminated by the wire gateway-type octet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Gateway {
    None,
    V4(Ipv4Addr),
    V6(Ipv6Addr),
    Name(DomainName),
}

impl Gateway {
    pub fn type_code(&self) -> u8 {
        match self {
            Gateway::None => 0,
            Gateway::V4(_) => 1,
            Gateway::V6(_) => 2,
            Gateway::Name(_) => 3,
        }
    }

    pub(crate) fn encoded_len(&self) -> usize {
        match self {
            Gateway::None => 0,
            Gateway::V4(_) => 4,
            Gateway::V6(_) => 16,
            Gateway::Name(name) => name.encoded_len(),
        }
    }

    pub(crate) fn from_wire(type_code: u8, decoder: &mut RDataDecoder) -> DNSResult<Self> {
        Ok(match type_code {
            0 => Gateway::None,
            1 => {
                let octets = decoder.read_bytes(4, "gateway")?;
                let mut addr = [0u8; 4];
                addr.copy_from_slice(&octets);
                Gateway::V4(Ipv4Addr::from(addr))
            }
            2 => {
                let octets = decoder.read_bytes(16, "gateway")?;
                let mut addr = [0u8; 16];
                addr.copy_from_slice(&octets);
                Gateway::V6(Ipv6Addr::from(addr))
            }
            3 => Gateway::Name(decoder.read_name()?),
            other => {
                return Err(DNSError::wire(format!("bad gateway type {}", other)));
            }
        })
    }

    pub(crate) fn to_wire(&self, encoder: &mut RDataEncoder) -> DNSResult<usize> {
        match self {
            Gateway::None => Ok(0),
            Gateway::V4(addr) => Ok(encoder.write_bytes(&addr.octets())),
            Gateway::V6(addr) => Ok(encoder.write_bytes(&addr.octets())),
            Gateway::Name(name) => encoder.write_name(name, false),
        }
    }

    pub(crate) fn from_master(
        type_code: u8,
        fields: &mut MasterFields,
        origin: Option<&DomainName>,
    ) -> DNSResult<Self> {
        let text = fields.next_str("gateway")?;
        Ok(match type_code {
            0 => {
                if text != "." {
                    return Err(DNSError::master(format!(
                        "gateway type 0 expects '.', got '{}'",
                        text
                    )));
                }
                Gateway::None
            }
            1 => Gateway::V4(
                text.parse()
                    .map_err(|_| DNSError::master(format!("bad IPv4 gateway '{}'", text)))?,
            ),
            2 => Gateway::V6(
                text.parse()
                    .map_err(|_| DNSError::master(format!("bad IPv6 gateway '{}'", text)))?,
            ),
            3 => Gateway::Name(DomainName::from_master(text, origin)?),
            other => {
                return Err(DNSError::master(format!("bad gateway type {}", other)));
            }
        })
    }
}

impl fmt::Display for Gateway {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Gateway::None => f.write_str("."),
            Gateway::V4(addr) => write!(f, "{}", addr),
            Gateway::V6(addr) => write!(f, "{}", addr),
            Gateway::Name(name) => write!(f, "{}", name),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IPSECKEY {
    pub precedence: u8,
    pub algorithm: u8,
    pub gateway: Gateway,
    pub public_key: Vec<u8>,
}

impl RecordData for IPSECKEY {
    fn from_wire(decoder: &mut RDataDecoder) -> DNSResult<Self> {
        let precedence = decoder.read_u8()?;
        let gateway_type = decoder.read_u8()?;
        let algorithm = decoder.read_u8()?;
        let gateway = Gateway::from_wire(gateway_type, decoder)?;
        Ok(IPSECKEY {
            precedence,
            algorithm,
            gateway,
            public_key: decoder.rest(),
        })
    }

    fn to_wire(&self, encoder: &mut RDataEncoder) -> DNSResult<usize> {
        let mut length = encoder.write_u8(self.precedence);
        length += encoder.write_u8(self.gateway.type_code());
        length += encoder.write_u8(self.algorithm);
        length += self.gateway.to_wire(encoder)?;
        length += encoder.write_bytes(&self.public_key);
        Ok(length)
    }

    fn from_master(fields: &mut MasterFields, origin: Option<&DomainName>) -> DNSResult<Self> {
        let precedence = fields.parse("precedence")?;
        let gateway_type: u8 = fields.parse("gateway type")?;
        let algorithm = fields.parse("algorithm")?;
        let gateway = Gateway::from_master(gateway_type, fields, origin)?;
        let public_key = if fields.is_empty() {
            Vec::new()
        } else {
            base64_decode(&fields.rest_concat("public key")?)?
        };
        Ok(IPSECKEY {
            precedence,
            algorithm,
            gateway,
            public_key,
        })
    }

    fn max_length(&self) -> usize {
        3 + self.gateway.encoded_len() + self.public_key.len()
    }
}

impl fmt::Display for IPSECKEY {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {}",
            self.precedence,
            self.gateway.type_code(),
            self.algorithm,
            self.gateway
        )?;
        if !self.public_key.is_empty() {
            write!(f, " {}", base64_encode(&self.public_key))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rdata::test_helpers::{master_roundtrip, wire_roundtrip};

    #[test]
    fn all_gateway_shapes() {
        for gateway in [
            Gateway::None,
            Gateway::V4("192.0.2.38".parse().unwrap()),
            Gateway::V6("2001:db8::1".parse().unwrap()),
            Gateway::Name(DomainName::try_from("gateway.example.com.").unwrap()),
        ] {
            let key = IPSECKEY {
                precedence: 10,
                algorithm: 2,
                gateway,
                public_key: vec![0x01, 0x03, 0x51, 0x53],
            };
            wire_roundtrip(&key);
            master_roundtrip(&key);
        }
    }

    #[test]
    fn keyless_record() {
        let key = IPSECKEY {
            precedence: 255,
            algorithm: 0,
            gateway: Gateway::None,
            public_key: Vec::new(),
        };
        wire_roundtrip(&key);
        master_roundtrip(&key);
        assert_eq!(key.to_string(), "255 0 0 .");
    }

    #[test]
    fn bad_gateway_type_rejected() {
        let bytes = [10u8, 4, 2];
        assert!(crate::rdata::test_helpers::decode_bytes::<IPSECKEY>(&bytes).is_err());
    }

    #[test]
    fn relative_gateway_name_resolves_against_origin() {
        let origin = DomainName::try_from("example.com.").unwrap();
        let fields = crate::rdata::test_helpers::tokenize_rdata("10 3 2 gateway AQNRU3mG7TVTO2BkR47usntb102uFJtugbo6BSGvgqt4AQ==");
        let mut it = MasterFields::new(&fields);
        let key = IPSECKEY::from_master(&mut it, Some(&origin)).unwrap();
        assert_eq!(
            key.gateway,
            Gateway::Name(DomainName::try_from("gateway.example.com.").unwrap())
        );
    }
}
