//! The resource-record envelope: owner, class, ttl and the typed rdata.
//! The TYPE field is implied by the rdata variant, so an envelope can never
//! claim one type while carrying another.
use std::cmp::Ordering;
use std::fmt;
use std::io::Cursor;

use crate::codes::{QClass, QType};
use crate::domain::{CompressionMap, DomainName};
use crate::error::{DNSError, DNSResult};
use crate::network_order::FromNetworkOrder;
use crate::rdata::codec::{RDataDecoder, RDataEncoder};
use crate::rdata::RData;

/// Envelope overhead after the owner name: TYPE, CLASS, TTL, RDLENGTH.
pub const FIXED_ENVELOPE_LENGTH: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DNSResourceRecord {
    /// the owner, i.e. the name of the node this record pertains to
    pub name: DomainName,
    pub class: QClass,
    /// seconds this record may be cached; negative values emit as zero
    pub ttl: i32,
    pub rdata: RData,
}

impl DNSResourceRecord {
    pub fn rtype(&self) -> QType {
        QType::from(self.rdata.type_code())
    }

    pub fn type_code(&self) -> u16 {
        self.rdata.type_code()
    }

    /// The TTL as emitted: negative values are clamped to zero.
    pub fn ttl_on_wire(&self) -> u32 {
        self.ttl.max(0) as u32
    }

    /// An upper bound on the encoded size, computed without encoding:
    /// the uncompressed owner, the fixed envelope fields, the rdata bound.
    pub fn max_encoded_length(&self) -> usize {
        self.name.encoded_len() + FIXED_ENVELOPE_LENGTH + self.rdata.max_length()
    }

    /// Encode the whole record. The rdlength slot is reserved, the rdata
    /// encoder runs, and the slot is back-patched with what it wrote.
    pub fn to_wire(
        &self,
        buffer: &mut Vec<u8>,
        mut compress: Option<&mut CompressionMap>,
        canonical: bool,
    ) -> DNSResult<usize> {
        let start = buffer.len();

        self.name
            .to_wire(buffer, compress.as_deref_mut(), canonical)?;
        buffer.extend_from_slice(&self.type_code().to_be_bytes());
        buffer.extend_from_slice(&self.class.code().to_be_bytes());
        buffer.extend_from_slice(&self.ttl_on_wire().to_be_bytes());

        // reserve the rdlength slot
        let rdlength_at = buffer.len();
        buffer.extend_from_slice(&[0, 0]);

        let mut encoder = RDataEncoder::new(buffer, compress, canonical);
        let rdlength = self.rdata.to_wire(&mut encoder)?;
        if rdlength > u16::MAX as usize {
            return Err(DNSError::Unsupported(format!(
                "rdata of {} octets does not fit a record",
                rdlength
            )));
        }
        buffer[rdlength_at..rdlength_at + 2].copy_from_slice(&(rdlength as u16).to_be_bytes());

        Ok(buffer.len() - start)
    }

    /// Decode one record; the cursor must wrap the whole message. The
    /// per-type decoder must consume its rdata window exactly.
    pub fn from_wire(cursor: &mut Cursor<&[u8]>) -> DNSResult<Self> {
        let mut name = DomainName::default();
        name.from_network_bytes(cursor)?;

        let mut type_code = 0u16;
        let mut class_code = 0u16;
        let mut ttl = 0u32;
        let mut rdlength = 0u16;
        type_code.from_network_bytes(cursor)?;
        class_code.from_network_bytes(cursor)?;
        ttl.from_network_bytes(cursor)?;
        rdlength.from_network_bytes(cursor)?;

        let mut decoder = RDataDecoder::new(cursor, rdlength)?;
        let rdata = RData::from_wire(QType::from(type_code), &mut decoder)?;
        decoder.finish()?;

        Ok(DNSResourceRecord {
            name,
            class: QClass::from(class_code),
            ttl: ttl as i32,
            rdata,
        })
    }

    /// The RFC 4034 canonical wire form of the whole record, used for
    /// DNSSEC hashing: lowercased owner, no compression, canonical rdata.
    pub fn canonical_wire(&self) -> DNSResult<Vec<u8>> {
        let mut buffer = Vec::new();
        self.to_wire(&mut buffer, None, true)?;
        Ok(buffer)
    }
}

impl PartialOrd for DNSResourceRecord {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

// The canonical total order: owner name in canonical order, then type,
// then class, then the canonical rdata bytes. TTL is a final tie-break so
// the order stays consistent with equality.
impl Ord for DNSResourceRecord {
    fn cmp(&self, other: &Self) -> Ordering {
        self.name
            .cmp(&other.name)
            .then_with(|| self.type_code().cmp(&other.type_code()))
            .then_with(|| self.class.code().cmp(&other.class.code()))
            .then_with(|| {
                let a = self.rdata.canonical_bytes().unwrap_or_default();
                let b = other.rdata.canonical_bytes().unwrap_or_default();
                a.cmp(&b)
            })
            .then_with(|| self.ttl.cmp(&other.ttl))
    }
}

// The master-file line. Records carrying unknown rdata present their class
// and type in the RFC 3597 generic form so the text round-trips exactly.
impl fmt::Display for DNSResourceRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.rdata {
            RData::Unknown(unknown) => write!(
                f,
                "{} {} CLASS{} TYPE{} {}",
                self.name,
                self.ttl_on_wire(),
                self.class.code(),
                unknown.code,
                self.rdata
            ),
            _ => write!(
                f,
                "{} {} {} {} {}",
                self.name,
                self.ttl_on_wire(),
                self.class,
                self.rdata.type_name(),
                self.rdata
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rdata::{rfc1035, UnknownRData};

    fn a_record(owner: &str, ttl: i32, address: &str) -> DNSResourceRecord {
        DNSResourceRecord {
            name: DomainName::try_from(owner).unwrap(),
            class: QClass::IN,
            ttl,
            rdata: RData::A(rfc1035::A {
                address: address.parse().unwrap(),
            }),
        }
    }

    #[test]
    fn a_record_wire_bytes() {
        // example.com. 3600 IN A 93.184.216.34
        let record = a_record("example.com.", 3600, "93.184.216.34");
        let mut buffer = Vec::new();
        record.to_wire(&mut buffer, None, false).unwrap();

        let tail: &[u8] = &[
            0x00, 0x01, 0x00, 0x01, 0x00, 0x00, 0x0E, 0x10, 0x00, 0x04, 0x5D, 0xB8, 0xD8, 0x22,
        ];
        assert!(buffer.ends_with(tail));
        assert!(buffer.len() <= record.max_encoded_length());
    }

    #[test]
    fn wire_roundtrip() {
        let record = a_record("example.com.", 3600, "93.184.216.34");
        let mut buffer = Vec::new();
        record.to_wire(&mut buffer, None, false).unwrap();

        let mut cursor = Cursor::new(buffer.as_slice());
        let back = DNSResourceRecord::from_wire(&mut cursor).unwrap();
        assert_eq!(back, record);
        assert_eq!(cursor.position() as usize, buffer.len());
    }

    #[test]
    fn rdlength_mismatch_is_rejected() {
        let record = a_record("example.com.", 3600, "93.184.216.34");
        let mut buffer = Vec::new();
        record.to_wire(&mut buffer, None, false).unwrap();

        // announce 5 rdata octets where the decoder consumes 4
        let at = buffer.len() - 6;
        buffer[at] = 0;
        buffer[at + 1] = 5;
        buffer.push(0xFF);
        let mut cursor = Cursor::new(buffer.as_slice());
        assert!(DNSResourceRecord::from_wire(&mut cursor).is_err());
    }

    #[test]
    fn negative_ttl_emits_zero() {
        let record = a_record("example.com.", -5, "10.0.0.1");
        let mut buffer = Vec::new();
        record.to_wire(&mut buffer, None, false).unwrap();
        let mut cursor = Cursor::new(buffer.as_slice());
        let back = DNSResourceRecord::from_wire(&mut cursor).unwrap();
        assert_eq!(back.ttl, 0);
    }

    #[test]
    fn canonical_form_lowercases_owner() {
        let record = a_record("WWW.Example.COM.", 60, "10.0.0.1");
        let wire = record.canonical_wire().unwrap();
        assert!(wire.starts_with(&[3, b'w', b'w', b'w', 7, b'e']));
    }

    #[test]
    fn canonical_order() {
        let records = vec![
            a_record("example.com.", 60, "10.0.0.2"),
            a_record("EXAMPLE.com.", 60, "10.0.0.1"),
            a_record("a.example.com.", 60, "10.0.0.1"),
            DNSResourceRecord {
                name: DomainName::try_from("example.com.").unwrap(),
                class: QClass::IN,
                ttl: 60,
                rdata: RData::NS(rfc1035::NS {
                    target: DomainName::try_from("ns.example.com.").unwrap(),
                }),
            },
        ];

        let mut sorted = records.clone();
        sorted.sort();

        // owner first (case-insensitively), then type, then rdata bytes
        assert_eq!(sorted[0], records[1]);
        assert_eq!(sorted[1], records[0]);
        assert_eq!(sorted[2], records[3]);
        assert_eq!(sorted[3], records[2]);
    }

    #[test]
    fn unknown_record_text_uses_generic_form() {
        let record = DNSResourceRecord {
            name: DomainName::try_from("example.").unwrap(),
            class: QClass::IN,
            ttl: 3600,
            rdata: RData::Unknown(UnknownRData {
                code: 65534,
                data: vec![0xDE, 0xAD, 0xBE, 0xEF],
            }),
        };
        assert_eq!(
            record.to_string(),
            "example. 3600 CLASS1 TYPE65534 \\# 4 DEADBEEF"
        );
    }
}
