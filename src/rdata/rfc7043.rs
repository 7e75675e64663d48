//! EUI48 and EUI64: hardware addresses, presented as dash-separated hex.
use std::fmt;

use crate::domain::DomainName;
use crate::error::{DNSError, DNSResult};
use crate::rdata::codec::{MasterFields, RDataDecoder, RDataEncoder};
use crate::rdata::RecordData;

macro_rules! eui_rdata {
    ( $( $(#[$meta:meta])* $name:ident($octets:literal), )* ) => {
        $(
            $(#[$meta])*
            #[derive(Debug, Clone, Copy, PartialEq, Eq)]
            pub struct $name {
                pub address: [u8; $octets],
            }

            impl RecordData for $name {
                fn from_wire(decoder: &mut RDataDecoder) -> DNSResult<Self> {
                    let bytes = decoder.read_bytes($octets, "EUI address")?;
                    let mut address = [0u8; $octets];
                    address.copy_from_slice(&bytes);
                    Ok($name { address })
                }

                fn to_wire(&self, encoder: &mut RDataEncoder) -> DNSResult<usize> {
                    Ok(encoder.write_bytes(&self.address))
                }

                fn from_master(
                    fields: &mut MasterFields,
                    _origin: Option<&DomainName>,
                ) -> DNSResult<Self> {
                    let text = fields.next_str("address")?;
                    let parts: Vec<&str> = text.split('-').collect();
                    if parts.len() != $octets {
                        return Err(DNSError::master(format!(
                            "EUI address '{}' needs {} groups",
                            text, $octets
                        )));
                    }
                    let mut address = [0u8; $octets];
                    for (slot, part) in address.iter_mut().zip(parts) {
                        *slot = u8::from_str_radix(part, 16).map_err(|_| {
                            DNSError::master(format!("bad EUI group '{}'", part))
                        })?;
                    }
                    Ok($name { address })
                }

                fn max_length(&self) -> usize {
                    $octets
                }
            }

            impl fmt::Display for $name {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    for (i, b) in self.address.iter().enumerate() {
                        if i > 0 {
                            f.write_str("-")?;
                        }
                        write!(f, "{:02x}", b)?;
                    }
                    Ok(())
                }
            }
        )*
    };
}

eui_rdata! {
    /// A 48-bit extended unique identifier.
    EUI48(6),
    /// A 64-bit extended unique identifier.
    EUI64(8),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rdata::test_helpers::{master_roundtrip, wire_roundtrip};

    #[test]
    fn eui48_record() {
        let eui = EUI48 {
            address: [0x00, 0x00, 0x5e, 0x00, 0x53, 0x2a],
        };
        wire_roundtrip(&eui);
        master_roundtrip(&eui);
        assert_eq!(eui.to_string(), "00-00-5e-00-53-2a");
    }

    #[test]
    fn eui64_record() {
        let eui = EUI64 {
            address: [0x00, 0x00, 0x5e, 0xef, 0x10, 0x00, 0x00, 0x2a],
        };
        wire_roundtrip(&eui);
        master_roundtrip(&eui);
    }
}
