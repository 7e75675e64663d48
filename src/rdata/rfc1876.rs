//! LOC: geographic location, with the packed exponent/mantissa size fields
//! and the milliarcsecond coordinate encoding of RFC 1876.
use std::fmt;

use crate::domain::DomainName;
use crate::error::{DNSError, DNSResult};
use crate::rdata::codec::{MasterFields, RDataDecoder, RDataEncoder};
use crate::rdata::RecordData;

// coordinate midpoint: the equator / prime meridian
const MIDPOINT: u64 = 1 << 31;
// altitude zero point: 100000m below the reference spheroid, in cm
const ALTITUDE_BASE: i64 = 10_000_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LOC {
    pub version: u8,
    /// sphere diameter in the cm*10^e packed form
    pub size: u8,
    pub horiz_pre: u8,
    pub vert_pre: u8,
    /// thousandths of an arc second, offset by 2^31; north/east positive
    pub latitude: u32,
    pub longitude: u32,
    /// centimeters above the -100000m base
    pub altitude: u32,
}

impl Default for LOC {
    fn default() -> Self {
        LOC {
            version: 0,
            size: 0x12,      // 1m
            horiz_pre: 0x16, // 10000m
            vert_pre: 0x13,  // 10m
            latitude: MIDPOINT as u32,
            longitude: MIDPOINT as u32,
            altitude: ALTITUDE_BASE as u32,
        }
    }
}

// unpack mantissa*10^exponent centimeters
fn unpack_size(packed: u8) -> u64 {
    let mantissa = (packed >> 4) as u64;
    let exponent = (packed & 0x0F) as u32;
    mantissa * 10u64.pow(exponent.min(9))
}

// pack centimeters, truncating to one significant digit like the RFC's
// reference implementation
fn pack_size(cm: u64, what: &str) -> DNSResult<u8> {
    let mut mantissa = cm;
    let mut exponent = 0u8;
    while mantissa >= 10 {
        mantissa /= 10;
        exponent += 1;
    }
    if exponent > 9 {
        return Err(DNSError::master(format!("{} too large", what)));
    }
    Ok((mantissa as u8) << 4 | exponent)
}

fn format_meters(cm: u64) -> String {
    if cm % 100 == 0 {
        format!("{}", cm / 100)
    } else if cm % 10 == 0 {
        format!("{}.{}", cm / 100, cm % 100 / 10)
    } else {
        format!("{}.{:02}", cm / 100, cm % 100)
    }
}

fn format_altitude(cm: i64) -> String {
    let sign = if cm < 0 { "-" } else { "" };
    format!("{}{}", sign, format_meters(cm.unsigned_abs()))
}

// "90", "90m", "0.05m", "-24.5m" -> centimeters
fn parse_meters(text: &str, what: &str) -> DNSResult<i64> {
    let bad = || DNSError::master(format!("bad {} '{}'", what, text));

    let text = text.strip_suffix('m').unwrap_or(text);
    let (sign, text) = match text.strip_prefix('-') {
        Some(rest) => (-1i64, rest),
        None => (1i64, text),
    };

    let (whole, frac) = match text.split_once('.') {
        Some((w, f)) => (w, f),
        None => (text, ""),
    };
    if whole.is_empty() || frac.len() > 2 || !frac.bytes().all(|b| b.is_ascii_digit()) {
        return Err(bad());
    }

    let meters: i64 = whole.parse().map_err(|_| bad())?;
    let mut centis = 0i64;
    for (i, b) in frac.bytes().enumerate() {
        centis += (b - b'0') as i64 * if i == 0 { 10 } else { 1 };
    }

    Ok(sign * (meters * 100 + centis))
}

fn format_coordinate(value: u32, positive: char, negative: char) -> String {
    let offset = value as i64 - MIDPOINT as i64;
    let hemisphere = if offset >= 0 { positive } else { negative };
    let mas = offset.unsigned_abs();

    let degrees = mas / 3_600_000;
    let minutes = mas % 3_600_000 / 60_000;
    let thousandths = mas % 60_000;
    format!(
        "{} {} {}.{:03} {}",
        degrees,
        minutes,
        thousandths / 1000,
        thousandths % 1000,
        hemisphere
    )
}

fn parse_coordinate(
    fields: &mut MasterFields,
    positive: char,
    negative: char,
    limit_degrees: u64,
) -> DNSResult<u32> {
    let degrees: u64 = fields.parse("degrees")?;
    let mut minutes = 0u64;
    let mut thousandths = 0u64;

    let mut hemisphere = None;
    for slot in 0..3 {
        let text = fields.next_str("coordinate")?;
        if text.len() == 1 {
            let c = text.chars().next().unwrap_or(' ');
            if c == positive || c == negative {
                hemisphere = Some(c == positive);
                break;
            }
        }
        match slot {
            0 => minutes = text.parse().map_err(|_| DNSError::master(format!("bad minutes '{}'", text)))?,
            1 => thousandths = parse_seconds(text)?,
            _ => return Err(DNSError::master(format!("expected hemisphere, got '{}'", text))),
        }
    }
    let positive_side =
        hemisphere.ok_or_else(|| DNSError::master("missing hemisphere letter"))?;

    if degrees > limit_degrees || minutes > 59 || thousandths >= 60_000 {
        return Err(DNSError::master("coordinate out of range"));
    }

    let mas = (degrees * 3600 + minutes * 60) * 1000 + thousandths;
    let value = if positive_side {
        MIDPOINT + mas
    } else {
        MIDPOINT - mas
    };
    Ok(value as u32)
}

// "54" or "54.321" -> thousandths of a second
fn parse_seconds(text: &str) -> DNSResult<u64> {
    let bad = || DNSError::master(format!("bad seconds '{}'", text));
    let (whole, frac) = match text.split_once('.') {
        Some((w, f)) => (w, f),
        None => (text, ""),
    };
    if frac.len() > 3 || !frac.bytes().all(|b| b.is_ascii_digit()) {
        return Err(bad());
    }
    let seconds: u64 = whole.parse().map_err(|_| bad())?;
    let mut ms = 0u64;
    for (i, b) in frac.bytes().enumerate() {
        ms += (b - b'0') as u64 * 10u64.pow(2 - i as u32);
    }
    Ok(seconds * 1000 + ms)
}

impl RecordData for LOC {
    fn from_wire(decoder: &mut RDataDecoder) -> DNSResult<Self> {
        Ok(LOC {
            version: decoder.read_u8()?,
            size: decoder.read_u8()?,
            horiz_pre: decoder.read_u8()?,
            vert_pre: decoder.read_u8()?,
            latitude: decoder.read_u32()?,
            longitude: decoder.read_u32()?,
            altitude: decoder.read_u32()?,
        })
    }

    fn to_wire(&self, encoder: &mut RDataEncoder) -> DNSResult<usize> {
        let mut length = encoder.write_u8(self.version);
        length += encoder.write_u8(self.size);
        length += encoder.write_u8(self.horiz_pre);
        length += encoder.write_u8(self.vert_pre);
        length += encoder.write_u32(self.latitude);
        length += encoder.write_u32(self.longitude);
        length += encoder.write_u32(self.altitude);
        Ok(length)
    }

    fn from_master(fields: &mut MasterFields, _origin: Option<&DomainName>) -> DNSResult<Self> {
        let latitude = parse_coordinate(fields, 'N', 'S', 90)?;
        let longitude = parse_coordinate(fields, 'E', 'W', 180)?;

        let altitude_cm = parse_meters(fields.next_str("altitude")?, "altitude")? + ALTITUDE_BASE;
        if !(0..=u32::MAX as i64).contains(&altitude_cm) {
            return Err(DNSError::master("altitude out of range"));
        }

        let mut loc = LOC {
            version: 0,
            latitude,
            longitude,
            altitude: altitude_cm as u32,
            ..LOC::default()
        };

        // trailing optional size / horizontal / vertical precision
        let mut packed = [&mut loc.size, &mut loc.horiz_pre, &mut loc.vert_pre].into_iter();
        while let (false, Some(slot)) = (fields.is_empty(), packed.next()) {
            let cm = parse_meters(fields.next_str("precision")?, "precision")?;
            if cm < 0 {
                return Err(DNSError::master("negative precision"));
            }
            *slot = pack_size(cm as u64, "precision")?;
        }
        drop(packed);

        Ok(loc)
    }

    fn max_length(&self) -> usize {
        16
    }
}

impl fmt::Display for LOC {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {}m {}m {}m {}m",
            format_coordinate(self.latitude, 'N', 'S'),
            format_coordinate(self.longitude, 'E', 'W'),
            format_altitude(self.altitude as i64 - ALTITUDE_BASE),
            format_meters(unpack_size(self.size)),
            format_meters(unpack_size(self.horiz_pre)),
            format_meters(unpack_size(self.vert_pre)),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rdata::test_helpers::{master_roundtrip, wire_roundtrip};

    #[test]
    fn loc_roundtrip() {
        // 42 21 54.000 N 71 6 18.000 W -24m
        let loc = LOC {
            version: 0,
            size: 0x12,
            horiz_pre: 0x16,
            vert_pre: 0x13,
            latitude: (MIDPOINT + ((42 * 3600 + 21 * 60 + 54) * 1000)) as u32,
            longitude: (MIDPOINT - ((71 * 3600 + 6 * 60 + 18) * 1000)) as u32,
            altitude: (ALTITUDE_BASE - 2400) as u32,
        };
        assert_eq!(
            loc.to_string(),
            "42 21 54.000 N 71 6 18.000 W -24m 1m 10000m 10m"
        );
        wire_roundtrip(&loc);
        master_roundtrip(&loc);
    }

    #[test]
    fn short_master_form_gets_defaults() {
        let fields = crate::rdata::test_helpers::tokenize_rdata("31 S 106 28 29 E 10m");
        let mut it = MasterFields::new(&fields);
        let loc = LOC::from_master(&mut it, None).unwrap();
        assert_eq!(loc.size, 0x12);
        assert_eq!(loc.horiz_pre, 0x16);
        assert_eq!(loc.vert_pre, 0x13);
        assert_eq!(loc.latitude, (MIDPOINT - 31 * 3_600_000) as u32);
        assert_eq!(
            loc.longitude,
            (MIDPOINT + (106 * 3600 + 28 * 60 + 29) * 1000) as u32
        );
    }

    #[test]
    fn size_packing() {
        assert_eq!(unpack_size(0x12), 100);
        assert_eq!(unpack_size(0x16), 1_000_000);
        assert_eq!(pack_size(100, "size").unwrap(), 0x12);
        assert_eq!(pack_size(0, "size").unwrap(), 0x00);
        assert_eq!(format_meters(250), "2.5");
        assert_eq!(parse_meters("2.5m", "size").unwrap(), 250);
        assert_eq!(parse_meters("-24", "altitude").unwrap(), -2400);
    }

    #[test]
    fn coordinate_out_of_range() {
        let fields = crate::rdata::test_helpers::tokenize_rdata("91 N 0 E 0m");
        let mut it = MasterFields::new(&fields);
        assert!(LOC::from_master(&mut it, None).is_err());
    }
}
