//! The reading and writing context handed to every record-data codec.
//!
//! A decoder wraps the cursor over the *whole* message, restricted to a
//! window of exactly rdlength octets, so that the handful of types carrying
//! compressed names can still resolve pointers. An encoder wraps the output
//! buffer together with the compression dictionary and the canonical-form
//! flag.
use std::io::Cursor;

use byteorder::{BigEndian, ReadBytesExt};

use crate::charstring::CharacterString;
use crate::domain::{CompressionMap, DomainName};
use crate::error::{DNSError, DNSResult};
use crate::network_order::FromNetworkOrder;

pub struct RDataDecoder<'a, 'c> {
    cursor: &'c mut Cursor<&'a [u8]>,
    end: u64,
}

impl<'a, 'c> RDataDecoder<'a, 'c> {
    /// `cursor` must sit at the first rdata octet; the window covers the
    /// next `rdlength` octets.
    pub fn new(cursor: &'c mut Cursor<&'a [u8]>, rdlength: u16) -> DNSResult<Self> {
        let end = cursor.position() + rdlength as u64;
        if end > cursor.get_ref().len() as u64 {
            return Err(DNSError::wire(format!(
                "rdlength {} runs past the end of the message",
                rdlength
            )));
        }
        Ok(RDataDecoder { cursor, end })
    }

    /// Octets left in the rdata window.
    pub fn remaining(&self) -> usize {
        self.end.saturating_sub(self.cursor.position()) as usize
    }

    fn check(&self, wanted: usize, what: &str) -> DNSResult<()> {
        if self.remaining() < wanted {
            return Err(DNSError::wire(format!(
                "rdata too short reading {} at offset {}",
                what,
                self.cursor.position()
            )));
        }
        Ok(())
    }

    pub fn read_u8(&mut self) -> DNSResult<u8> {
        self.check(1, "u8")?;
        Ok(self.cursor.read_u8()?)
    }

    pub fn read_u16(&mut self) -> DNSResult<u16> {
        self.check(2, "u16")?;
        Ok(self.cursor.read_u16::<BigEndian>()?)
    }

    pub fn read_u32(&mut self) -> DNSResult<u32> {
        self.check(4, "u32")?;
        Ok(self.cursor.read_u32::<BigEndian>()?)
    }

    /// The 48-bit counters TSIG carries.
    pub fn read_u48(&mut self) -> DNSResult<u64> {
        self.check(6, "u48")?;
        Ok(self.cursor.read_uint::<BigEndian>(6)?)
    }

    pub fn read_bytes(&mut self, count: usize, what: &str) -> DNSResult<Vec<u8>> {
        self.check(count, what)?;
        let pos = self.cursor.position() as usize;
        let bytes = self.cursor.get_ref()[pos..pos + count].to_vec();
        self.cursor.set_position((pos + count) as u64);
        Ok(bytes)
    }

    /// Everything left in the window; rdata whose last field is "the rest"
    /// (digests, keys, certificates) ends with this.
    pub fn rest(&mut self) -> Vec<u8> {
        let pos = self.cursor.position() as usize;
        let bytes = self.cursor.get_ref()[pos..self.end as usize].to_vec();
        self.cursor.set_position(self.end);
        bytes
    }

    /// Read an embedded name; compression pointers may leave the window but
    /// the name itself must end inside it.
    pub fn read_name(&mut self) -> DNSResult<DomainName> {
        let mut name = DomainName::default();
        name.from_network_bytes(self.cursor)?;
        if self.cursor.position() > self.end {
            return Err(DNSError::wire("name overruns its rdata"));
        }
        Ok(name)
    }

    pub fn read_char_string(&mut self) -> DNSResult<CharacterString> {
        let mut cs = CharacterString::default();
        cs.from_network_bytes(self.cursor)?;
        if self.cursor.position() > self.end {
            return Err(DNSError::wire("character string overruns its rdata"));
        }
        Ok(cs)
    }

    /// Every decoder must consume its window exactly; trailing octets are
    /// as malformed as missing ones.
    pub fn finish(&self) -> DNSResult<()> {
        if self.cursor.position() != self.end {
            return Err(DNSError::wire(format!(
                "rdata not fully consumed: {} octet(s) left",
                self.remaining()
            )));
        }
        Ok(())
    }
}

pub struct RDataEncoder<'w> {
    buffer: &'w mut Vec<u8>,
    compress: Option<&'w mut CompressionMap>,
    canonical: bool,
}

impl<'w> RDataEncoder<'w> {
    pub fn new(
        buffer: &'w mut Vec<u8>,
        compress: Option<&'w mut CompressionMap>,
        canonical: bool,
    ) -> Self {
        RDataEncoder {
            buffer,
            compress,
            canonical,
        }
    }

    pub fn write_u8(&mut self, value: u8) -> usize {
        self.buffer.push(value);
        1
    }

    pub fn write_u16(&mut self, value: u16) -> usize {
        self.buffer.extend_from_slice(&value.to_be_bytes());
        2
    }

    pub fn write_u32(&mut self, value: u32) -> usize {
        self.buffer.extend_from_slice(&value.to_be_bytes());
        4
    }

    pub fn write_u48(&mut self, value: u64) -> usize {
        self.buffer.extend_from_slice(&value.to_be_bytes()[2..]);
        6
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) -> usize {
        self.buffer.extend_from_slice(bytes);
        bytes.len()
    }

    pub fn write_char_string(&mut self, cs: &CharacterString) -> usize {
        self.buffer.push(cs.len() as u8);
        self.buffer.extend_from_slice(cs.as_bytes());
        cs.encoded_len()
    }

    /// Write an embedded name. `compressible` marks the RFC 1035 types
    /// whose target field historically used compression: those compress
    /// when a dictionary is present and are lowercased (and never
    /// compressed) in canonical form.
    pub fn write_name(&mut self, name: &DomainName, compressible: bool) -> DNSResult<usize> {
        if compressible {
            if self.canonical {
                name.to_wire(self.buffer, None, true)
            } else {
                name.to_wire(self.buffer, self.compress.as_deref_mut(), false)
            }
        } else {
            name.to_wire(self.buffer, None, false)
        }
    }
}

/// Resolve master-file escapes: `\DDD` is a decimal octet, `\c` is a
/// literal `c`. Tokens keep their escapes so that field-specific parsers
/// (names split on unescaped dots) can see them; everything else unescapes
/// through here.
pub fn unescape_master(bytes: &[u8]) -> DNSResult<Vec<u8>> {
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] == b'\\' {
            let rest = &bytes[i + 1..];
            if rest.len() >= 3 && rest[..3].iter().all(u8::is_ascii_digit) {
                let value = rest[..3]
                    .iter()
                    .fold(0u32, |acc, d| acc * 10 + (d - b'0') as u32);
                if value > 255 {
                    return Err(DNSError::master(format!("escape \\{:03} out of range", value)));
                }
                out.push(value as u8);
                i += 4;
            } else if !rest.is_empty() {
                out.push(rest[0]);
                i += 2;
            } else {
                return Err(DNSError::master("dangling backslash"));
            }
        } else {
            out.push(bytes[i]);
            i += 1;
        }
    }

    Ok(out)
}

/// The pre-tokenised, quote-aware fields of a record's textual rdata.
/// Tokens carry raw bytes because escapes may introduce arbitrary octets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MasterField {
    pub bytes: Vec<u8>,
    pub quoted: bool,
}

impl MasterField {
    pub fn new(bytes: Vec<u8>, quoted: bool) -> Self {
        MasterField { bytes, quoted }
    }

    pub fn text(&self) -> DNSResult<&str> {
        std::str::from_utf8(&self.bytes)
            .map_err(|_| DNSError::master("field is not valid text"))
    }
}

pub struct MasterFields<'a> {
    fields: &'a [MasterField],
    index: usize,
}

impl<'a> MasterFields<'a> {
    pub fn new(fields: &'a [MasterField]) -> Self {
        MasterFields { fields, index: 0 }
    }

    pub fn is_empty(&self) -> bool {
        self.index >= self.fields.len()
    }

    pub fn peek(&self) -> Option<&'a MasterField> {
        self.fields.get(self.index)
    }

    pub fn next_field(&mut self, what: &str) -> DNSResult<&'a MasterField> {
        let field = self
            .fields
            .get(self.index)
            .ok_or_else(|| DNSError::master(format!("missing {} field", what)))?;
        self.index += 1;
        Ok(field)
    }

    pub fn next_str(&mut self, what: &str) -> DNSResult<&'a str> {
        self.next_field(what)?.text()
    }

    /// Parse a numeric or mnemonic field with the standard `FromStr` of the
    /// target type.
    pub fn parse<T>(&mut self, what: &str) -> DNSResult<T>
    where
        T: std::str::FromStr,
        T::Err: std::fmt::Display,
    {
        let text = self.next_str(what)?;
        text.parse::<T>()
            .map_err(|e| DNSError::master(format!("bad {} field '{}': {}", what, text, e)))
    }

    pub fn next_name(&mut self, what: &str, origin: Option<&DomainName>) -> DNSResult<DomainName> {
        let text = self.next_str(what)?;
        DomainName::from_master(text, origin)
    }

    pub fn next_char_string(&mut self, what: &str) -> DNSResult<CharacterString> {
        let field = self.next_field(what)?;
        CharacterString::new(unescape_master(&field.bytes)?)
    }

    /// All remaining fields as character strings (the TXT shape).
    pub fn rest_char_strings(&mut self) -> DNSResult<Vec<CharacterString>> {
        let mut strings = Vec::new();
        while !self.is_empty() {
            strings.push(self.next_char_string("text")?);
        }
        Ok(strings)
    }

    /// Concatenate every remaining field: base64 and hex blobs are often
    /// split over several whitespace-separated chunks.
    pub fn rest_concat(&mut self, what: &str) -> DNSResult<String> {
        let mut out = String::new();
        while !self.is_empty() {
            out.push_str(self.next_str(what)?);
        }
        Ok(out)
    }

    pub fn expect_end(&self) -> DNSResult<()> {
        if !self.is_empty() {
            return Err(DNSError::master(format!(
                "{} extra field(s) in rdata",
                self.fields.len() - self.index
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields_of(texts: &[&str]) -> Vec<MasterField> {
        texts
            .iter()
            .map(|t| MasterField::new(t.as_bytes().to_vec(), false))
            .collect()
    }

    #[test]
    fn decoder_window() {
        let message = [0xAAu8, 0x01, 0x02, 0x03, 0x04, 0xBB];
        let mut cursor = Cursor::new(message.as_slice());
        cursor.set_position(1);

        let mut decoder = RDataDecoder::new(&mut cursor, 4).unwrap();
        assert_eq!(decoder.remaining(), 4);
        assert_eq!(decoder.read_u16().unwrap(), 0x0102);
        assert!(decoder.finish().is_err());
        assert_eq!(decoder.rest(), &[0x03, 0x04]);
        assert!(decoder.finish().is_ok());
    }

    #[test]
    fn decoder_rejects_overrun() {
        let message = [0x01u8, 0x02];
        let mut cursor = Cursor::new(message.as_slice());
        assert!(RDataDecoder::new(&mut cursor, 4).is_err());

        let mut cursor = Cursor::new(message.as_slice());
        let mut decoder = RDataDecoder::new(&mut cursor, 2).unwrap();
        assert!(decoder.read_u32().is_err());
    }

    #[test]
    fn master_fields() {
        let fields = fields_of(&["10", "mail.example.com."]);
        let mut it = MasterFields::new(&fields);
        assert_eq!(it.parse::<u16>("preference").unwrap(), 10);
        let name = it.next_name("exchange", None).unwrap();
        assert_eq!(name.to_string(), "mail.example.com.");
        assert!(it.expect_end().is_ok());
        assert!(it.next_str("more").is_err());
    }
}
