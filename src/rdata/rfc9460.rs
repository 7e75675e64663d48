//! SVCB and HTTPS: service bindings with an ordered parameter list.
//!
//! Parameters are kept as raw `(key, value)` pairs so unknown keys pass
//! through untouched; the known keys get their registered presentation
//! forms and are validated on decode.
use std::fmt;
use std::net::{Ipv4Addr, Ipv6Addr};

use crate::base_encoding::{base64_decode, base64_encode};
use crate::domain::DomainName;
use crate::error::{DNSError, DNSResult};
use crate::rdata::codec::{unescape_master, MasterFields, RDataDecoder, RDataEncoder};
use crate::rdata::RecordData;

pub const KEY_MANDATORY: u16 = 0;
pub const KEY_ALPN: u16 = 1;
pub const KEY_NO_DEFAULT_ALPN: u16 = 2;
pub const KEY_PORT: u16 = 3;
pub const KEY_IPV4HINT: u16 = 4;
pub const KEY_ECH: u16 = 5;
pub const KEY_IPV6HINT: u16 = 6;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SvcParam {
    pub key: u16,
    pub value: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SVCB {
    /// 0 is AliasMode, anything else ServiceMode
    pub priority: u16,
    pub target: DomainName,
    /// strictly ascending by key
    pub params: Vec<SvcParam>,
}

fn key_name(key: u16) -> Option<&'static str> {
    match key {
        KEY_MANDATORY => Some("mandatory"),
        KEY_ALPN => Some("alpn"),
        KEY_NO_DEFAULT_ALPN => Some("no-default-alpn"),
        KEY_PORT => Some("port"),
        KEY_IPV4HINT => Some("ipv4hint"),
        KEY_ECH => Some("ech"),
        KEY_IPV6HINT => Some("ipv6hint"),
        _ => None,
    }
}

fn key_from_name(name: &str) -> DNSResult<u16> {
    match name {
        "mandatory" => Ok(KEY_MANDATORY),
        "alpn" => Ok(KEY_ALPN),
        "no-default-alpn" => Ok(KEY_NO_DEFAULT_ALPN),
        "port" => Ok(KEY_PORT),
        "ipv4hint" => Ok(KEY_IPV4HINT),
        "ech" => Ok(KEY_ECH),
        "ipv6hint" => Ok(KEY_IPV6HINT),
        _ => match name.strip_prefix("key") {
            Some(digits) => digits
                .parse::<u16>()
                .map_err(|_| DNSError::master(format!("bad SvcParam key '{}'", name))),
            None => Err(DNSError::master(format!("unknown SvcParam key '{}'", name))),
        },
    }
}

// the ascending/unique/mandatory rules shared by both decoders
fn check_params(params: &[SvcParam]) -> DNSResult<()> {
    for pair in params.windows(2) {
        if pair[1].key <= pair[0].key {
            return Err(DNSError::Unsupported(format!(
                "SvcParam keys out of order or duplicated ({} then {})",
                pair[0].key, pair[1].key
            )));
        }
    }

    // key 0 lists keys that must also be present
    if let Some(mandatory) = params.iter().find(|p| p.key == KEY_MANDATORY) {
        if mandatory.value.is_empty() || mandatory.value.len() % 2 != 0 {
            return Err(DNSError::wire("bad mandatory SvcParam value"));
        }
        for chunk in mandatory.value.chunks(2) {
            let key = u16::from_be_bytes([chunk[0], chunk[1]]);
            if key == KEY_MANDATORY {
                return Err(DNSError::Unsupported(
                    "mandatory SvcParam lists itself".to_string(),
                ));
            }
            if !params.iter().any(|p| p.key == key) {
                return Err(DNSError::Unsupported(format!(
                    "mandatory SvcParam key {} is absent",
                    key
                )));
            }
        }
    }

    Ok(())
}

// value-shape validation for the registered keys; unknown keys pass through
fn check_value(param: &SvcParam) -> DNSResult<()> {
    let ok = match param.key {
        KEY_ALPN => {
            let mut rest = param.value.as_slice();
            if rest.is_empty() {
                false
            } else {
                loop {
                    match rest.split_first() {
                        None => break true,
                        Some((&len, tail)) => {
                            if len == 0 || tail.len() < len as usize {
                                break false;
                            }
                            rest = &tail[len as usize..];
                        }
                    }
                }
            }
        }
        KEY_NO_DEFAULT_ALPN => param.value.is_empty(),
        KEY_PORT => param.value.len() == 2,
        KEY_IPV4HINT => !param.value.is_empty() && param.value.len() % 4 == 0,
        KEY_IPV6HINT => !param.value.is_empty() && param.value.len() % 16 == 0,
        _ => true,
    };

    if ok {
        Ok(())
    } else {
        Err(DNSError::wire(format!(
            "bad value for SvcParam key {}",
            param.key
        )))
    }
}

fn alpn_ids(value: &[u8]) -> Vec<Vec<u8>> {
    let mut ids = Vec::new();
    let mut rest = value;
    while let Some((&len, tail)) = rest.split_first() {
        ids.push(tail[..len as usize].to_vec());
        rest = &tail[len as usize..];
    }
    ids
}

// generic presentation: every non-printable or structural octet escaped
fn write_escaped(f: &mut fmt::Formatter<'_>, bytes: &[u8]) -> fmt::Result {
    for &b in bytes {
        match b {
            b'"' | b'\\' => write!(f, "\\{}", b as char)?,
            0x21..=0x7E => write!(f, "{}", b as char)?,
            _ => write!(f, "\\{:03}", b)?,
        }
    }
    Ok(())
}

fn format_value(param: &SvcParam, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    // a malformed value for a registered key (possible only on hand-built
    // records) falls back to the escaped generic form
    if check_value(param).is_err() || (param.key == KEY_MANDATORY && param.value.len() % 2 != 0) {
        return write_escaped(f, &param.value);
    }

    match param.key {
        KEY_MANDATORY => {
            for (i, chunk) in param.value.chunks(2).enumerate() {
                if i > 0 {
                    f.write_str(",")?;
                }
                let key = u16::from_be_bytes([chunk[0], chunk[1]]);
                match key_name(key) {
                    Some(name) => f.write_str(name)?,
                    None => write!(f, "key{}", key)?,
                }
            }
            Ok(())
        }
        KEY_ALPN => {
            for (i, id) in alpn_ids(&param.value).iter().enumerate() {
                if i > 0 {
                    f.write_str(",")?;
                }
                for &b in id {
                    match b {
                        b',' | b'\\' => write!(f, "\\{}", b as char)?,
                        0x21..=0x7E => write!(f, "{}", b as char)?,
                        _ => write!(f, "\\{:03}", b)?,
                    }
                }
            }
            Ok(())
        }
        KEY_PORT => write!(f, "{}", u16::from_be_bytes([param.value[0], param.value[1]])),
        KEY_IPV4HINT => {
            for (i, chunk) in param.value.chunks(4).enumerate() {
                if i > 0 {
                    f.write_str(",")?;
                }
                let mut octets = [0u8; 4];
                octets.copy_from_slice(chunk);
                write!(f, "{}", Ipv4Addr::from(octets))?;
            }
            Ok(())
        }
        KEY_IPV6HINT => {
            for (i, chunk) in param.value.chunks(16).enumerate() {
                if i > 0 {
                    f.write_str(",")?;
                }
                let mut octets = [0u8; 16];
                octets.copy_from_slice(chunk);
                write!(f, "{}", Ipv6Addr::from(octets))?;
            }
            Ok(())
        }
        KEY_ECH => f.write_str(&base64_encode(&param.value)),
        _ => write_escaped(f, &param.value),
    }
}

fn parse_value(key: u16, text: &str) -> DNSResult<Vec<u8>> {
    match key {
        KEY_MANDATORY => {
            let mut keys = Vec::new();
            for part in text.split(',') {
                keys.push(key_from_name(part)?);
            }
            keys.sort_unstable();
            Ok(keys.iter().flat_map(|k| k.to_be_bytes()).collect())
        }
        KEY_ALPN => {
            let mut value = Vec::new();
            for part in split_escaped_commas(text)? {
                if part.is_empty() || part.len() > 255 {
                    return Err(DNSError::master("bad alpn id length"));
                }
                value.push(part.len() as u8);
                value.extend_from_slice(&part);
            }
            if value.is_empty() {
                return Err(DNSError::master("empty alpn list"));
            }
            Ok(value)
        }
        KEY_PORT => {
            let port: u16 = text
                .parse()
                .map_err(|_| DNSError::master(format!("bad port '{}'", text)))?;
            Ok(port.to_be_bytes().to_vec())
        }
        KEY_IPV4HINT => {
            let mut value = Vec::new();
            for part in text.split(',') {
                let addr: Ipv4Addr = part
                    .parse()
                    .map_err(|_| DNSError::master(format!("bad ipv4hint '{}'", part)))?;
                value.extend_from_slice(&addr.octets());
            }
            Ok(value)
        }
        KEY_IPV6HINT => {
            let mut value = Vec::new();
            for part in text.split(',') {
                let addr: Ipv6Addr = part
                    .parse()
                    .map_err(|_| DNSError::master(format!("bad ipv6hint '{}'", part)))?;
                value.extend_from_slice(&addr.octets());
            }
            Ok(value)
        }
        KEY_ECH => base64_decode(text),
        _ => unescape_master(text.as_bytes()),
    }
}

// alpn ids may escape the comma separator itself
fn split_escaped_commas(text: &str) -> DNSResult<Vec<Vec<u8>>> {
    let unescaped_once = text.as_bytes();
    let mut parts = vec![Vec::new()];
    let mut i = 0;
    while i < unescaped_once.len() {
        match unescaped_once[i] {
            b',' => {
                parts.push(Vec::new());
                i += 1;
            }
            b'\\' => {
                let rest = &unescaped_once[i + 1..];
                if rest.len() >= 3 && rest[..3].iter().all(u8::is_ascii_digit) {
                    let value = rest[..3]
                        .iter()
                        .fold(0u32, |acc, d| acc * 10 + (d - b'0') as u32);
                    if value > 255 {
                        return Err(DNSError::master("escape out of range"));
                    }
                    parts.last_mut().map(|p| p.push(value as u8));
                    i += 4;
                } else if !rest.is_empty() {
                    parts.last_mut().map(|p| p.push(rest[0]));
                    i += 2;
                } else {
                    return Err(DNSError::master("dangling backslash"));
                }
            }
            b => {
                parts.last_mut().map(|p| p.push(b));
                i += 1;
            }
        }
    }
    Ok(parts)
}

impl RecordData for SVCB {
    fn from_wire(decoder: &mut RDataDecoder) -> DNSResult<Self> {
        let priority = decoder.read_u16()?;
        let target = decoder.read_name()?;

        let mut params = Vec::new();
        while decoder.remaining() > 0 {
            let key = decoder.read_u16()?;
            let length = decoder.read_u16()?;
            let param = SvcParam {
                key,
                value: decoder.read_bytes(length as usize, "SvcParam value")?,
            };
            check_value(&param)?;
            params.push(param);
        }
        check_params(&params)?;

        Ok(SVCB {
            priority,
            target,
            params,
        })
    }

    fn to_wire(&self, encoder: &mut RDataEncoder) -> DNSResult<usize> {
        check_params(&self.params)?;

        let mut length = encoder.write_u16(self.priority);
        length += encoder.write_name(&self.target, false)?;
        for param in &self.params {
            if param.value.len() > u16::MAX as usize {
                return Err(DNSError::Unsupported("SvcParam value too long".to_string()));
            }
            length += encoder.write_u16(param.key);
            length += encoder.write_u16(param.value.len() as u16);
            length += encoder.write_bytes(&param.value);
        }
        Ok(length)
    }

    fn from_master(fields: &mut MasterFields, origin: Option<&DomainName>) -> DNSResult<Self> {
        let priority = fields.parse("priority")?;
        let target = fields.next_name("target", origin)?;

        let mut params = Vec::new();
        while !fields.is_empty() {
            let text = fields.next_str("SvcParam")?;
            let (name, value_text) = match text.split_once('=') {
                Some((name, value)) => (name, Some(value)),
                None => (text, None),
            };
            let key = key_from_name(name)?;
            let value = match value_text {
                Some(value) => parse_value(key, value)?,
                None => Vec::new(),
            };
            let param = SvcParam { key, value };
            check_value(&param)?;
            params.push(param);
        }

        params.sort_by_key(|p| p.key);
        check_params(&params)?;

        Ok(SVCB {
            priority,
            target,
            params,
        })
    }

    fn max_length(&self) -> usize {
        2 + self.target.encoded_len()
            + self.params.iter().map(|p| 4 + p.value.len()).sum::<usize>()
    }
}

impl fmt::Display for SVCB {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.priority, self.target)?;
        for param in &self.params {
            f.write_str(" ")?;
            match key_name(param.key) {
                Some(name) => f.write_str(name)?,
                None => write!(f, "key{}", param.key)?,
            }
            if !(param.value.is_empty() && param.key == KEY_NO_DEFAULT_ALPN) {
                f.write_str("=")?;
                format_value(param, f)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rdata::test_helpers::{decode_bytes, master_roundtrip, wire_roundtrip};

    fn service_record() -> SVCB {
        SVCB {
            priority: 16,
            target: DomainName::try_from("svc.example.com.").unwrap(),
            params: vec![
                SvcParam {
                    key: KEY_MANDATORY,
                    value: KEY_ALPN.to_be_bytes().to_vec(),
                },
                SvcParam {
                    key: KEY_ALPN,
                    value: vec![2, b'h', b'2', 2, b'h', b'3'],
                },
                SvcParam {
                    key: KEY_PORT,
                    value: 8443u16.to_be_bytes().to_vec(),
                },
                SvcParam {
                    key: KEY_IPV4HINT,
                    value: vec![192, 0, 2, 1, 192, 0, 2, 2],
                },
                SvcParam {
                    key: 667,
                    value: b"hello".to_vec(),
                },
            ],
        }
    }

    #[test]
    fn svcb_roundtrip() {
        let svcb = service_record();
        wire_roundtrip(&svcb);
        master_roundtrip(&svcb);
        assert_eq!(
            svcb.to_string(),
            "16 svc.example.com. mandatory=alpn alpn=h2,h3 port=8443 ipv4hint=192.0.2.1,192.0.2.2 key667=hello"
        );
    }

    #[test]
    fn alias_mode() {
        let alias = SVCB {
            priority: 0,
            target: DomainName::try_from("pool.svc.example.com.").unwrap(),
            params: Vec::new(),
        };
        wire_roundtrip(&alias);
        master_roundtrip(&alias);
    }

    #[test]
    fn duplicate_keys_rejected() {
        // two port params
        let mut bytes = vec![0x00, 0x10, 0x03, b's', b'v', b'c', 0x00];
        for _ in 0..2 {
            bytes.extend_from_slice(&[0x00, 0x03, 0x00, 0x02, 0x01, 0xbb]);
        }
        assert!(decode_bytes::<SVCB>(&bytes).is_err());
    }

    #[test]
    fn missing_mandatory_key_rejected() {
        // mandatory=port without a port param
        let bytes = vec![
            0x00, 0x10, 0x03, b's', b'v', b'c', 0x00, 0x00, 0x00, 0x00, 0x02, 0x00, 0x03,
        ];
        assert!(decode_bytes::<SVCB>(&bytes).is_err());
    }

    #[test]
    fn bad_port_length_rejected() {
        let bytes = vec![0x00, 0x10, 0x00, 0x00, 0x03, 0x00, 0x01, 0xbb];
        assert!(decode_bytes::<SVCB>(&bytes).is_err());
    }

    #[test]
    fn no_default_alpn_is_bare() {
        let svcb = SVCB {
            priority: 1,
            target: DomainName::root(),
            params: vec![
                SvcParam {
                    key: KEY_ALPN,
                    value: vec![2, b'h', b'2'],
                },
                SvcParam {
                    key: KEY_NO_DEFAULT_ALPN,
                    value: Vec::new(),
                },
            ],
        };
        assert_eq!(svcb.to_string(), "1 . alpn=h2 no-default-alpn");
        master_roundtrip(&svcb);
    }
}
