//! The DNSSEC record types of RFC 4034: DS, DNSKEY, RRSIG and NSEC.
//! KEY and SIG (RFC 2536-era) reuse the DNSKEY/RRSIG shapes, and
//! CDS/CDNSKEY (RFC 7344) and DLV (RFC 4431) reuse DS/DNSKEY, all under
//! their own type codes.
use std::fmt;

use crate::base_encoding::{base16_decode, base16_encode, base64_decode, base64_encode};
use crate::codes::QType;
use crate::domain::DomainName;
use crate::error::{DNSError, DNSResult};
use crate::rdata::codec::{MasterFields, RDataDecoder, RDataEncoder};
use crate::rdata::type_bitmap::TypeBitmap;
use crate::rdata::RecordData;

/// Delegation signer: a digest of a DNSKEY in the child zone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DS {
    pub key_tag: u16,
    pub algorithm: u8,
    /// 1 SHA-1, 2 SHA-256, 4 SHA-384
    pub digest_type: u8,
    pub digest: Vec<u8>,
}

impl RecordData for DS {
    fn from_wire(decoder: &mut RDataDecoder) -> DNSResult<Self> {
        Ok(DS {
            key_tag: decoder.read_u16()?,
            algorithm: decoder.read_u8()?,
            digest_type: decoder.read_u8()?,
            digest: decoder.rest(),
        })
    }

    fn to_wire(&self, encoder: &mut RDataEncoder) -> DNSResult<usize> {
        let mut length = encoder.write_u16(self.key_tag);
        length += encoder.write_u8(self.algorithm);
        length += encoder.write_u8(self.digest_type);
        length += encoder.write_bytes(&self.digest);
        Ok(length)
    }

    fn from_master(fields: &mut MasterFields, _origin: Option<&DomainName>) -> DNSResult<Self> {
        Ok(DS {
            key_tag: fields.parse("key tag")?,
            algorithm: fields.parse("algorithm")?,
            digest_type: fields.parse("digest type")?,
            digest: base16_decode(&fields.rest_concat("digest")?)?,
        })
    }

    fn max_length(&self) -> usize {
        4 + self.digest.len()
    }
}

impl fmt::Display for DS {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {}",
            self.key_tag,
            self.algorithm,
            self.digest_type,
            base16_encode(&self.digest)
        )
    }
}

/// A zone key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DNSKEY {
    /// bit 7: zone key, bit 15: secure entry point
    pub flags: u16,
    /// must be 3
    pub protocol: u8,
    pub algorithm: u8,
    pub public_key: Vec<u8>,
}

impl DNSKEY {
    /// The RFC 4034 Appendix B key tag: a 16-bit checksum of the canonical
    /// rdata. Legacy RSA/MD5 keys carry their tag inside the key material
    /// instead.
    pub fn key_tag(&self) -> u16 {
        if self.algorithm == 1 {
            // RSAMD5: third- and second-to-last octets of the key
            let len = self.public_key.len();
            if len < 3 {
                return 0;
            }
            return u16::from_be_bytes([self.public_key[len - 3], self.public_key[len - 2]]);
        }

        let mut sum: u32 = 0;
        let rdata = self
            .flags
            .to_be_bytes()
            .into_iter()
            .chain([self.protocol, self.algorithm])
            .chain(self.public_key.iter().copied());
        for (i, b) in rdata.enumerate() {
            if i % 2 == 0 {
                sum = sum.wrapping_add((b as u32) << 8);
            } else {
                sum = sum.wrapping_add(b as u32);
            }
        }
        sum += (sum >> 16) & 0xFFFF;
        sum as u16
    }

    /// Zone-key bit of the flags field.
    pub fn is_zone_key(&self) -> bool {
        self.flags & 0x0100 != 0
    }

    /// Secure-entry-point bit of the flags field.
    pub fn is_secure_entry_point(&self) -> bool {
        self.flags & 0x0001 != 0
    }
}

impl RecordData for DNSKEY {
    fn from_wire(decoder: &mut RDataDecoder) -> DNSResult<Self> {
        Ok(DNSKEY {
            flags: decoder.read_u16()?,
            protocol: decoder.read_u8()?,
            algorithm: decoder.read_u8()?,
            public_key: decoder.rest(),
        })
    }

    fn to_wire(&self, encoder: &mut RDataEncoder) -> DNSResult<usize> {
        let mut length = encoder.write_u16(self.flags);
        length += encoder.write_u8(self.protocol);
        length += encoder.write_u8(self.algorithm);
        length += encoder.write_bytes(&self.public_key);
        Ok(length)
    }

    fn from_master(fields: &mut MasterFields, _origin: Option<&DomainName>) -> DNSResult<Self> {
        Ok(DNSKEY {
            flags: fields.parse("flags")?,
            protocol: fields.parse("protocol")?,
            algorithm: fields.parse("algorithm")?,
            public_key: base64_decode(&fields.rest_concat("public key")?)?,
        })
    }

    fn max_length(&self) -> usize {
        4 + self.public_key.len()
    }
}

impl fmt::Display for DNSKEY {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {}",
            self.flags,
            self.protocol,
            self.algorithm,
            base64_encode(&self.public_key)
        )
    }
}

/// A signature over an RRset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RRSIG {
    pub type_covered: QType,
    pub algorithm: u8,
    /// label count of the owner name, without root and any wildcard
    pub labels: u8,
    pub original_ttl: u32,
    /// seconds since the epoch, serial-arithmetic wrapped
    pub expiration: u32,
    pub inception: u32,
    pub key_tag: u16,
    pub signer: DomainName,
    pub signature: Vec<u8>,
}

impl RecordData for RRSIG {
    fn from_wire(decoder: &mut RDataDecoder) -> DNSResult<Self> {
        Ok(RRSIG {
            type_covered: QType::from(decoder.read_u16()?),
            algorithm: decoder.read_u8()?,
            labels: decoder.read_u8()?,
            original_ttl: decoder.read_u32()?,
            expiration: decoder.read_u32()?,
            inception: decoder.read_u32()?,
            key_tag: decoder.read_u16()?,
            signer: decoder.read_name()?,
            signature: decoder.rest(),
        })
    }

    fn to_wire(&self, encoder: &mut RDataEncoder) -> DNSResult<usize> {
        let mut length = encoder.write_u16(self.type_covered.code());
        length += encoder.write_u8(self.algorithm);
        length += encoder.write_u8(self.labels);
        length += encoder.write_u32(self.original_ttl);
        length += encoder.write_u32(self.expiration);
        length += encoder.write_u32(self.inception);
        length += encoder.write_u16(self.key_tag);
        length += encoder.write_name(&self.signer, false)?;
        length += encoder.write_bytes(&self.signature);
        Ok(length)
    }

    fn from_master(fields: &mut MasterFields, origin: Option<&DomainName>) -> DNSResult<Self> {
        Ok(RRSIG {
            type_covered: fields.parse("type covered")?,
            algorithm: fields.parse("algorithm")?,
            labels: fields.parse("labels")?,
            original_ttl: fields.parse("original ttl")?,
            expiration: parse_timestamp(fields.next_str("expiration")?)?,
            inception: parse_timestamp(fields.next_str("inception")?)?,
            key_tag: fields.parse("key tag")?,
            signer: fields.next_name("signer", origin)?,
            signature: base64_decode(&fields.rest_concat("signature")?)?,
        })
    }

    fn max_length(&self) -> usize {
        18 + self.signer.encoded_len() + self.signature.len()
    }
}

impl fmt::Display for RRSIG {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {} {} {} {} {} {}",
            self.type_covered,
            self.algorithm,
            self.labels,
            self.original_ttl,
            format_timestamp(self.expiration),
            format_timestamp(self.inception),
            self.key_tag,
            self.signer,
            base64_encode(&self.signature)
        )
    }
}

/// Authenticated denial of existence: the next owner name in canonical
/// order, and the types present at this one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NSEC {
    pub next_owner: DomainName,
    pub types: TypeBitmap,
}

impl RecordData for NSEC {
    fn from_wire(decoder: &mut RDataDecoder) -> DNSResult<Self> {
        Ok(NSEC {
            next_owner: decoder.read_name()?,
            types: TypeBitmap::from_wire(decoder)?,
        })
    }

    fn to_wire(&self, encoder: &mut RDataEncoder) -> DNSResult<usize> {
        let mut length = encoder.write_name(&self.next_owner, false)?;
        length += self.types.to_wire(encoder);
        Ok(length)
    }

    fn from_master(fields: &mut MasterFields, origin: Option<&DomainName>) -> DNSResult<Self> {
        Ok(NSEC {
            next_owner: fields.next_name("next owner", origin)?,
            types: TypeBitmap::from_master(fields)?,
        })
    }

    fn max_length(&self) -> usize {
        self.next_owner.encoded_len() + self.types.encoded_len()
    }
}

impl fmt::Display for NSEC {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.next_owner)?;
        if !self.types.is_empty() {
            write!(f, " {}", self.types)?;
        }
        Ok(())
    }
}

// RRSIG timestamps present as YYYYMMDDHHmmSS in UTC; a plain integer is
// also accepted. Conversion is done in-crate because the epoch arithmetic
// is trivial and must not depend on the system time zone.

const DAYS_IN_MONTH: [i64; 12] = [31, 28, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31];

fn is_leap(year: i64) -> bool {
    year % 4 == 0 && (year % 100 != 0 || year % 400 == 0)
}

fn days_from_civil(year: i64, month: i64, day: i64) -> i64 {
    let y = if month <= 2 { year - 1 } else { year };
    let era = if y >= 0 { y } else { y - 399 } / 400;
    let yoe = y - era * 400;
    let mp = if month > 2 { month - 3 } else { month + 9 };
    let doy = (153 * mp + 2) / 5 + day - 1;
    let doe = yoe * 365 + yoe / 4 - yoe / 100 + doy;
    era * 146097 + doe - 719468
}

fn civil_from_days(days: i64) -> (i64, i64, i64) {
    let z = days + 719468;
    let era = if z >= 0 { z } else { z - 146096 } / 146097;
    let doe = z - era * 146097;
    let yoe = (doe - doe / 1460 + doe / 36524 - doe / 146096) / 365;
    let y = yoe + era * 400;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let day = doy - (153 * mp + 2) / 5 + 1;
    let month = if mp < 10 { mp + 3 } else { mp - 9 };
    (if month <= 2 { y + 1 } else { y }, month, day)
}

pub fn format_timestamp(epoch: u32) -> String {
    let seconds = epoch as i64;
    let (year, month, day) = civil_from_days(seconds.div_euclid(86400));
    let tod = seconds.rem_euclid(86400);
    format!(
        "{:04}{:02}{:02}{:02}{:02}{:02}",
        year,
        month,
        day,
        tod / 3600,
        tod % 3600 / 60,
        tod % 60
    )
}

pub fn parse_timestamp(text: &str) -> DNSResult<u32> {
    if text.len() != 14 || !text.bytes().all(|b| b.is_ascii_digit()) {
        // the alternate presentation: seconds since the epoch
        return text
            .parse::<u32>()
            .map_err(|_| DNSError::master(format!("bad timestamp '{}'", text)));
    }

    let number = |range: std::ops::Range<usize>| -> i64 {
        text[range]
            .bytes()
            .fold(0i64, |acc, d| acc * 10 + (d - b'0') as i64)
    };

    let (year, month, day) = (number(0..4), number(4..6), number(6..8));
    let (hour, minute, second) = (number(8..10), number(10..12), number(12..14));

    let month_ok = (1..=12).contains(&month);
    let max_day = if month_ok {
        DAYS_IN_MONTH[month as usize - 1] + (month == 2 && is_leap(year)) as i64
    } else {
        0
    };
    if !month_ok || day < 1 || day > max_day || hour > 23 || minute > 59 || second > 59 {
        return Err(DNSError::master(format!("bad timestamp '{}'", text)));
    }

    let seconds = days_from_civil(year, month, day) * 86400 + hour * 3600 + minute * 60 + second;
    if !(0..=u32::MAX as i64).contains(&seconds) {
        return Err(DNSError::master(format!(
            "timestamp '{}' outside the 32-bit window",
            text
        )));
    }

    Ok(seconds as u32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rdata::test_helpers::{master_roundtrip, wire_roundtrip};

    #[test]
    fn ds_record() {
        let ds = DS {
            key_tag: 60485,
            algorithm: 5,
            digest_type: 1,
            digest: base16_decode("2BB183AF5F22588179A53B0A98631FAD1A292118").unwrap(),
        };
        wire_roundtrip(&ds);
        master_roundtrip(&ds);
        assert_eq!(
            ds.to_string(),
            "60485 5 1 2BB183AF5F22588179A53B0A98631FAD1A292118"
        );
    }

    #[test]
    fn key_tag_matches_rfc4034_example() {
        // the worked DNSKEY of RFC 4034 section 5.4, whose DS carries
        // key tag 60485
        let key = base64_decode(
            "AQOeiiR0GOMYkDshWoSKz9XzfwJr1AYtsmx3TGkJaNXVbfi/2pHm822aJ5iI9BMzNXxeyCe9Vndf3mRqf6zBekLXaA==",
        )
        .unwrap();
        let dnskey = DNSKEY {
            flags: 256,
            protocol: 3,
            algorithm: 5,
            public_key: key,
        };
        assert_eq!(dnskey.key_tag(), 60485);
        // deterministic
        assert_eq!(dnskey.key_tag(), dnskey.key_tag());
    }

    #[test]
    fn key_tag_small_vector() {
        // hand-computed: 01 01 03 08 AB -> 0x0100+0x01+0x0300+0x08+0xAB00
        let dnskey = DNSKEY {
            flags: 257,
            protocol: 3,
            algorithm: 8,
            public_key: vec![0xAB],
        };
        assert_eq!(dnskey.key_tag(), 0xAF09);
    }

    #[test]
    fn dnskey_roundtrip() {
        let dnskey = DNSKEY {
            flags: 257,
            protocol: 3,
            algorithm: 13,
            public_key: vec![1, 2, 3, 4, 5, 6, 7, 8],
        };
        assert!(dnskey.is_zone_key());
        assert!(dnskey.is_secure_entry_point());
        wire_roundtrip(&dnskey);
        master_roundtrip(&dnskey);
    }

    #[test]
    fn rrsig_roundtrip() {
        let rrsig = RRSIG {
            type_covered: QType::A,
            algorithm: 5,
            labels: 3,
            original_ttl: 86400,
            expiration: parse_timestamp("20030422173103").unwrap(),
            inception: parse_timestamp("20030322173103").unwrap(),
            key_tag: 2642,
            signer: DomainName::try_from("example.com.").unwrap(),
            signature: vec![0xde, 0xad, 0xbe, 0xef],
        };
        wire_roundtrip(&rrsig);
        master_roundtrip(&rrsig);
    }

    #[test]
    fn timestamps() {
        assert_eq!(parse_timestamp("20030322173103").unwrap(), 1048354263);
        assert_eq!(format_timestamp(1048354263), "20030322173103");
        assert_eq!(parse_timestamp("1048354263").unwrap(), 1048354263);
        // leap day
        assert_eq!(
            format_timestamp(parse_timestamp("20240229000000").unwrap()),
            "20240229000000"
        );
        assert!(parse_timestamp("20230229000000").is_err());
        assert!(parse_timestamp("20231301000000").is_err());
        assert!(parse_timestamp("not-a-time").is_err());
    }

    #[test]
    fn nsec_roundtrip() {
        let nsec = NSEC {
            next_owner: DomainName::try_from("host.example.com.").unwrap(),
            types: TypeBitmap::from_codes(vec![1, 15, 46, 47]),
        };
        wire_roundtrip(&nsec);
        master_roundtrip(&nsec);
        assert_eq!(nsec.to_string(), "host.example.com. A MX RRSIG NSEC");
    }

    #[test]
    fn nsec_bitmap_bytes() {
        // next owner b.example., types A and RRSIG (and NSEC itself):
        // window 0, length 6, 40 00 00 00 00 03
        let nsec = NSEC {
            next_owner: DomainName::try_from("b.example.").unwrap(),
            types: TypeBitmap::from_codes(vec![1, 46, 47]),
        };
        let bytes = crate::rdata::test_helpers::encode_plain(&nsec);
        let name_len = nsec.next_owner.encoded_len();
        assert_eq!(&bytes[..name_len], &[1, b'b', 7, b'e', b'x', b'a', b'm', b'p', b'l', b'e', 0]);
        assert_eq!(
            &bytes[name_len..],
            &[0x00, 0x06, 0x40, 0x00, 0x00, 0x00, 0x00, 0x03]
        );
    }
}
