//! OPT: the EDNS pseudo-record. The rdata is a list of {code, length,
//! data} options; payload size and extended flags live in the envelope's
//! class and ttl fields and are interpreted by the message layer.
use std::fmt;

use crate::domain::DomainName;
use crate::error::{DNSError, DNSResult};
use crate::rdata::codec::{MasterFields, RDataDecoder, RDataEncoder};
use crate::rdata::RecordData;

// option codes: https://www.iana.org/assignments/dns-parameters/dns-parameters.xhtml#dns-parameters-11
pub const OPTION_COOKIE: u16 = 10;
pub const OPTION_PADDING: u16 = 12;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EdnsOption {
    pub code: u16,
    pub data: Vec<u8>,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct OPT {
    pub options: Vec<EdnsOption>,
}

impl RecordData for OPT {
    fn from_wire(decoder: &mut RDataDecoder) -> DNSResult<Self> {
        let mut options = Vec::new();

        while decoder.remaining() > 0 {
            let code = decoder.read_u16()?;
            let length = decoder.read_u16()?;
            options.push(EdnsOption {
                code,
                data: decoder.read_bytes(length as usize, "EDNS option")?,
            });
        }

        Ok(OPT { options })
    }

    fn to_wire(&self, encoder: &mut RDataEncoder) -> DNSResult<usize> {
        let mut length = 0;
        for option in &self.options {
            if option.data.len() > u16::MAX as usize {
                return Err(DNSError::Unsupported("EDNS option too long".to_string()));
            }
            length += encoder.write_u16(option.code);
            length += encoder.write_u16(option.data.len() as u16);
            length += encoder.write_bytes(&option.data);
        }
        Ok(length)
    }

    fn from_master(_fields: &mut MasterFields, _origin: Option<&DomainName>) -> DNSResult<Self> {
        // a pseudo-record: zone files never carry it; the generic \# form
        // is intercepted before this is reached
        Err(DNSError::Unsupported(
            "OPT has no master file form".to_string(),
        ))
    }

    fn max_length(&self) -> usize {
        self.options.iter().map(|o| 4 + o.data.len()).sum()
    }
}

impl fmt::Display for OPT {
    // presented in the generic form, which also parses back
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut bytes = Vec::new();
        let mut encoder = RDataEncoder::new(&mut bytes, None, false);
        if self.to_wire(&mut encoder).is_err() {
            return Err(fmt::Error);
        }
        if bytes.is_empty() {
            write!(f, "\\# 0")
        } else {
            write!(
                f,
                "\\# {} {}",
                bytes.len(),
                crate::base_encoding::base16_encode(&bytes)
            )
        }
    }
}
