//! AMTRELAY: discovery of automatic multicast tunneling relays.
use std::fmt;

use crate::domain::DomainName;
use crate::error::{DNSError, DNSResult};
use crate::rdata::codec::{MasterFields, RDataDecoder, RDataEncoder};
use crate::rdata::rfc4025::Gateway;
use crate::rdata::RecordData;

/// The relay field reuses the IPsec gateway shape: none, v4, v6 or a name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AMTRELAY {
    pub precedence: u8,
    /// the D-bit: discovery of other relays is optional
    pub discovery_optional: bool,
    pub relay: Gateway,
}

impl RecordData for AMTRELAY {
    fn from_wire(decoder: &mut RDataDecoder) -> DNSResult<Self> {
        let precedence = decoder.read_u8()?;
        let packed = decoder.read_u8()?;
        let relay = Gateway::from_wire(packed & 0x7F, decoder)?;
        Ok(AMTRELAY {
            precedence,
            discovery_optional: packed & 0x80 != 0,
            relay,
        })
    }

    fn to_wire(&self, encoder: &mut RDataEncoder) -> DNSResult<usize> {
        let mut length = encoder.write_u8(self.precedence);
        let packed = self.relay.type_code() | if self.discovery_optional { 0x80 } else { 0 };
        length += encoder.write_u8(packed);
        length += self.relay.to_wire(encoder)?;
        Ok(length)
    }

    fn from_master(fields: &mut MasterFields, origin: Option<&DomainName>) -> DNSResult<Self> {
        let precedence = fields.parse("precedence")?;
        let d_bit: u8 = fields.parse("discovery bit")?;
        if d_bit > 1 {
            return Err(DNSError::master(format!("D-bit must be 0 or 1, got {}", d_bit)));
        }
        let relay_type: u8 = fields.parse("relay type")?;
        let relay = Gateway::from_master(relay_type, fields, origin)?;
        Ok(AMTRELAY {
            precedence,
            discovery_optional: d_bit == 1,
            relay,
        })
    }

    fn max_length(&self) -> usize {
        2 + self.relay.encoded_len()
    }
}

impl fmt::Display for AMTRELAY {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {}",
            self.precedence,
            self.discovery_optional as u8,
            self.relay.type_code(),
            self.relay
        )
    }
}
