//! Domain names: labels, master-file escaping, DNSSEC canonical ordering,
//! and the wire codec including RFC 1035 pointer compression.
use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::io::Cursor;

use crate::error::{DNSError, DNSResult};
use crate::network_order::{FromNetworkOrder, ToNetworkOrder};
use crate::util::is_pointer;

/// Longest wire form of a name: length octets, label octets and the
/// terminating zero.
pub const MAX_NAME_LENGTH: usize = 255;

/// Longest single label.
pub const MAX_LABEL_LENGTH: usize = 63;

/// One label: 1 to 63 arbitrary octets. Comparisons are ASCII
/// case-insensitive; octets outside the ASCII range compare as raw bytes.
#[derive(Debug, Clone, Eq)]
pub struct Label(Vec<u8>);

impl Label {
    pub fn new(data: Vec<u8>) -> DNSResult<Self> {
        if data.is_empty() || data.len() > MAX_LABEL_LENGTH {
            return Err(DNSError::master(format!(
                "label of {} octets outside 1..63",
                data.len()
            )));
        }
        Ok(Label(data))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The label with A..Z folded to lowercase, as DNSSEC canonical form
    /// requires.
    pub fn to_lowercase(&self) -> Label {
        Label(self.0.to_ascii_lowercase())
    }
}

impl PartialEq for Label {
    fn eq(&self, other: &Self) -> bool {
        self.0.eq_ignore_ascii_case(&other.0)
    }
}

impl Hash for Label {
    fn hash<H: Hasher>(&self, state: &mut H) {
        for b in &self.0 {
            state.write_u8(b.to_ascii_lowercase());
        }
    }
}

impl PartialOrd for Label {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Label {
    fn cmp(&self, other: &Self) -> Ordering {
        let a = self.0.iter().map(|b| b.to_ascii_lowercase());
        let b = other.0.iter().map(|b| b.to_ascii_lowercase());
        a.cmp(b)
    }
}

// Master-file presentation: printable specials get a backslash, everything
// non-printable becomes a \DDD decimal escape.
impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &b in &self.0 {
            if b < 0x21 || b > 0x7E {
                write!(f, "\\{:03}", b)?;
            } else if br#"".\;()@$"#.contains(&b) {
                write!(f, "\\{}", b as char)?;
            } else {
                write!(f, "{}", b as char)?;
            }
        }
        Ok(())
    }
}

impl TryFrom<&str> for Label {
    type Error = DNSError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        Label::new(s.as_bytes().to_vec())
    }
}

/// A domain name: an ordered list of labels. The empty list is the root.
///
/// Names are immutable once built and own their label bytes, so a name
/// decoded out of a message buffer outlives it.
#[derive(Debug, Default, Clone, PartialEq, Eq, Hash)]
pub struct DomainName {
    labels: Vec<Label>,
}

impl DomainName {
    /// The root name.
    pub fn root() -> Self {
        DomainName { labels: Vec::new() }
    }

    pub fn is_root(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn labels(&self) -> &[Label] {
        &self.labels
    }

    pub fn label_count(&self) -> usize {
        self.labels.len()
    }

    pub fn from_labels(labels: Vec<Label>) -> DNSResult<Self> {
        let name = DomainName { labels };
        name.check_length()?;
        Ok(name)
    }

    fn check_length(&self) -> DNSResult<()> {
        if self.encoded_len() > MAX_NAME_LENGTH {
            return Err(DNSError::master(format!(
                "name '{}' exceeds 255 octets on the wire",
                self
            )));
        }
        Ok(())
    }

    /// Wire size of the uncompressed form, without encoding anything:
    /// one length octet per label, the label octets, the terminating zero.
    pub fn encoded_len(&self) -> usize {
        self.labels.iter().map(|l| l.len() + 1).sum::<usize>() + 1
    }

    /// All labels lowercased, the form canonical encoding emits.
    pub fn to_lowercase(&self) -> DomainName {
        DomainName {
            labels: self.labels.iter().map(Label::to_lowercase).collect(),
        }
    }

    /// Case-insensitive suffix test, e.g. `mail.example.com.` ends with
    /// `example.com.`.
    pub fn ends_with(&self, suffix: &DomainName) -> bool {
        if suffix.labels.len() > self.labels.len() {
            return false;
        }
        let skip = self.labels.len() - suffix.labels.len();
        self.labels[skip..] == suffix.labels[..]
    }

    /// Parse a master-file name. A trailing dot makes the name absolute;
    /// without one the `origin` is appended, and its absence is an error.
    /// `@` denotes the origin itself.
    pub fn from_master(s: &str, origin: Option<&DomainName>) -> DNSResult<Self> {
        if s.is_empty() {
            return Err(DNSError::master("empty domain name"));
        }
        if s == "@" {
            return origin
                .cloned()
                .ok_or_else(|| DNSError::master("'@' used without an origin"));
        }
        if s == "." {
            return Ok(DomainName::root());
        }

        let (mut labels, absolute) = parse_escaped_labels(s)?;
        if !absolute {
            let origin =
                origin.ok_or_else(|| DNSError::master(format!("relative name '{}' without an origin", s)))?;
            labels.extend(origin.labels.iter().cloned());
        }

        DomainName::from_labels(labels)
    }

    /// Encode the name. With a compression dictionary, known suffixes are
    /// replaced by a 14-bit pointer and new suffixes are registered.
    /// Canonical encoding never compresses and lowercases every label.
    pub fn to_wire(
        &self,
        buffer: &mut Vec<u8>,
        compress: Option<&mut CompressionMap>,
        canonical: bool,
    ) -> DNSResult<usize> {
        let start = buffer.len();

        if let (Some(map), false) = (compress, canonical) {
            for i in 0..self.labels.len() {
                let suffix = DomainName {
                    labels: self.labels[i..].to_vec(),
                };
                if let Some(offset) = map.find(&suffix) {
                    for label in &self.labels[..i] {
                        buffer.push(label.len() as u8);
                        buffer.extend_from_slice(label.as_bytes());
                    }
                    buffer.extend_from_slice(&(0xC000u16 | offset).to_be_bytes());
                    return Ok(buffer.len() - start);
                }

                // where this suffix will land once the prefix is written
                let suffix_offset =
                    start + self.labels[..i].iter().map(|l| l.len() + 1).sum::<usize>();
                map.insert(suffix, suffix_offset);
            }
        }

        for label in &self.labels {
            buffer.push(label.len() as u8);
            if canonical {
                buffer.extend_from_slice(&label.as_bytes().to_ascii_lowercase());
            } else {
                buffer.extend_from_slice(label.as_bytes());
            }
        }
        buffer.push(0);

        Ok(buffer.len() - start)
    }
}

// Split on unescaped dots, resolving \DDD and \c escapes. Returns the labels
// and whether the name was written absolute (trailing dot).
fn parse_escaped_labels(s: &str) -> DNSResult<(Vec<Label>, bool)> {
    let bytes = s.as_bytes();
    let mut labels = Vec::new();
    let mut current: Vec<u8> = Vec::new();
    let mut absolute = false;
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'\\' => {
                let rest = &bytes[i + 1..];
                if rest.len() >= 3 && rest[..3].iter().all(u8::is_ascii_digit) {
                    let value = rest[..3]
                        .iter()
                        .fold(0u32, |acc, d| acc * 10 + (d - b'0') as u32);
                    if value > 255 {
                        return Err(DNSError::master(format!("escape \\{:03} out of range", value)));
                    }
                    current.push(value as u8);
                    i += 4;
                } else if !rest.is_empty() {
                    current.push(rest[0]);
                    i += 2;
                } else {
                    return Err(DNSError::master("dangling backslash in name"));
                }
            }
            b'.' => {
                labels.push(Label::new(std::mem::take(&mut current))?);
                if i + 1 == bytes.len() {
                    absolute = true;
                }
                i += 1;
            }
            b => {
                current.push(b);
                i += 1;
            }
        }
    }

    if !current.is_empty() {
        labels.push(Label::new(current)?);
    }

    Ok((labels, absolute))
}

/// ```
/// use dnswire::domain::DomainName;
///
/// let dn = DomainName::try_from("www.google.com").unwrap();
/// assert_eq!(dn.to_string(), "www.google.com.");
/// assert_eq!(dn.label_count(), 3);
///
/// let root = DomainName::try_from(".").unwrap();
/// assert!(root.is_root());
/// assert_eq!(root.to_string(), ".");
/// ```
impl TryFrom<&str> for DomainName {
    type Error = DNSError;

    // Convenience constructor: the name is taken as absolute whether or not
    // it carries the trailing dot. Master-file code goes through
    // `from_master` which keeps the relative/absolute distinction.
    fn try_from(s: &str) -> Result<Self, Self::Error> {
        if s == "." {
            return Ok(DomainName::root());
        }
        let (labels, _) = parse_escaped_labels(s)?;
        DomainName::from_labels(labels)
    }
}

impl fmt::Display for DomainName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_root() {
            return f.write_str(".");
        }
        for label in &self.labels {
            write!(f, "{}.", label)?;
        }
        Ok(())
    }
}

impl PartialOrd for DomainName {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

// DNSSEC canonical ordering: compare the label sequences right to left,
// each label bytewise after lowercasing; a missing label sorts first.
impl Ord for DomainName {
    fn cmp(&self, other: &Self) -> Ordering {
        let a = self.labels.iter().rev();
        let b = other.labels.iter().rev();
        a.cmp(b)
    }
}

impl ToNetworkOrder for DomainName {
    /// ```
    /// use dnswire::domain::DomainName;
    /// use dnswire::network_order::ToNetworkOrder;
    ///
    /// let dn = DomainName::try_from("www.google.ie").unwrap();
    /// let mut buffer: Vec<u8> = Vec::new();
    /// assert_eq!(dn.to_network_bytes(&mut buffer).unwrap(), 15);
    /// assert_eq!(buffer, &[
    ///     0x03, 0x77, 0x77, 0x77, 0x06, 0x67, 0x6f, 0x6f, 0x67, 0x6c, 0x65,
    ///     0x02, 0x69, 0x65, 0x00,
    /// ]);
    /// ```
    fn to_network_bytes(&self, buffer: &mut Vec<u8>) -> DNSResult<usize> {
        self.to_wire(buffer, None, false)
    }
}

impl<'a> FromNetworkOrder<'a> for DomainName {
    // The cursor must wrap the whole message: pointers are offsets from the
    // start of the ID field. Every pointer must target an offset strictly
    // below the previous one, which rules out cycles without a hop counter.
    fn from_network_bytes(&mut self, buffer: &mut Cursor<&'a [u8]>) -> DNSResult<()> {
        let message = *buffer.get_ref();
        let mut pos = buffer.position() as usize;
        let mut labels = Vec::new();
        let mut wire_len = 0usize;
        // cursor position after the name as laid out in the record
        let mut resume = 0usize;
        let mut jumped = false;
        // upper bound for the next pointer target
        let mut limit = usize::MAX;

        loop {
            let prefix = *message
                .get(pos)
                .ok_or_else(|| DNSError::wire("name runs past the end of the message"))?;

            if prefix == 0 {
                if !jumped {
                    resume = pos + 1;
                }
                break;
            }

            if is_pointer(prefix) {
                let low = *message
                    .get(pos + 1)
                    .ok_or_else(|| DNSError::wire("truncated compression pointer"))?;
                let target = ((prefix as usize & 0x3F) << 8) | low as usize;

                if !jumped {
                    resume = pos + 2;
                    jumped = true;
                }

                if target >= pos || target >= limit {
                    return Err(DNSError::wire(format!(
                        "compression pointer at {} does not point backwards (target {})",
                        pos, target
                    )));
                }
                limit = target;
                pos = target;
                continue;
            }

            if prefix > MAX_LABEL_LENGTH as u8 {
                // 01/10 prefixes are reserved label types
                return Err(DNSError::wire(format!(
                    "reserved label type {:#04x} at offset {}",
                    prefix, pos
                )));
            }

            let len = prefix as usize;
            let label = message
                .get(pos + 1..pos + 1 + len)
                .ok_or_else(|| DNSError::wire("label runs past the end of the message"))?;

            wire_len += len + 1;
            if wire_len + 1 > MAX_NAME_LENGTH {
                return Err(DNSError::wire("name exceeds 255 octets"));
            }

            labels.push(Label(label.to_vec()));
            pos += len + 1;
        }

        buffer.set_position(resume as u64);
        self.labels = labels;
        Ok(())
    }
}

/// The per-message name-compression dictionary: every suffix written so far,
/// keyed case-insensitively, mapped to its offset in the message. Offsets
/// above the 14-bit pointer range are never stored.
#[derive(Debug, Default)]
pub struct CompressionMap {
    offsets: HashMap<DomainName, u16>,
}

impl CompressionMap {
    pub fn new() -> Self {
        CompressionMap::default()
    }

    pub fn find(&self, name: &DomainName) -> Option<u16> {
        if name.is_root() {
            return None;
        }
        self.offsets.get(name).copied()
    }

    pub fn insert(&mut self, name: DomainName, offset: usize) {
        if name.is_root() || offset > 0x3FFF {
            return;
        }
        // first occurrence wins: earlier offsets compress better
        self.offsets.entry(name).or_insert(offset as u16);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::get_sample_slice;

    // sample taken from real data using wireshark, exercises compression
    const SAMPLE: &str = r#"
0000   41 2a 81 80 00 01 00 00 00 01 00 01 06 67 6f 6f
0010   67 6c 65 03 63 6f 6d 00 00 05 00 01 c0 0c 00 06
0020   00 01 00 00 00 3c 00 26 03 6e 73 31 c0 0c 09 64
0030   6e 73 2d 61 64 6d 69 6e c0 0c 19 1b c0 0c 00 00
0040   03 84 00 00 03 84 00 00 07 08 00 00 00 3c
"#;

    fn name_at(sample: &[u8], offset: u64) -> DNSResult<DomainName> {
        let mut cursor = Cursor::new(sample);
        cursor.set_position(offset);
        let mut dn = DomainName::default();
        dn.from_network_bytes(&mut cursor)?;
        Ok(dn)
    }

    #[test]
    fn decode_with_compression() {
        let sample = get_sample_slice(SAMPLE);

        assert_eq!(name_at(&sample, 12).unwrap().to_string(), "google.com.");
        assert_eq!(name_at(&sample, 28).unwrap().to_string(), "google.com.");
        assert_eq!(name_at(&sample, 40).unwrap().to_string(), "ns1.google.com.");
        assert_eq!(
            name_at(&sample, 46).unwrap().to_string(),
            "dns-admin.google.com."
        );
    }

    #[test]
    fn decode_resumes_after_name() {
        let sample = get_sample_slice(SAMPLE);
        let mut cursor = Cursor::new(sample.as_slice());
        cursor.set_position(12);
        let mut dn = DomainName::default();
        dn.from_network_bytes(&mut cursor).unwrap();
        // "google.com." is 12 bytes on the wire
        assert_eq!(cursor.position(), 24);

        cursor.set_position(28);
        dn.from_network_bytes(&mut cursor).unwrap();
        // a bare pointer is 2 bytes
        assert_eq!(cursor.position(), 30);
    }

    #[test]
    fn pointer_cycle_is_rejected() {
        // two pointers pointing at each other
        let sample = [0u8; 12]
            .iter()
            .copied()
            .chain([0xC0, 0x0E, 0xC0, 0x0C])
            .collect::<Vec<_>>();
        let mut cursor = Cursor::new(sample.as_slice());
        cursor.set_position(12);
        let mut dn = DomainName::default();
        assert!(dn.from_network_bytes(&mut cursor).is_err());

        // a pointer to itself
        let sample = [0xC0u8, 0x00];
        let mut cursor = Cursor::new(sample.as_slice());
        let mut dn = DomainName::default();
        assert!(dn.from_network_bytes(&mut cursor).is_err());
    }

    #[test]
    fn pointer_out_of_range_is_rejected() {
        let sample = [0x01u8, b'a', 0xC0, 0x63];
        let mut cursor = Cursor::new(sample.as_slice());
        let mut dn = DomainName::default();
        assert!(dn.from_network_bytes(&mut cursor).is_err());
    }

    #[test]
    fn reserved_label_type_is_rejected() {
        let sample = [0b0100_0001u8, b'a', 0x00];
        let mut cursor = Cursor::new(sample.as_slice());
        let mut dn = DomainName::default();
        assert!(dn.from_network_bytes(&mut cursor).is_err());
    }

    #[test]
    fn overlong_name_is_rejected() {
        let mut sample = Vec::new();
        for _ in 0..5 {
            sample.push(63);
            sample.extend_from_slice(&[b'a'; 63]);
        }
        sample.push(0);
        let mut cursor = Cursor::new(sample.as_slice());
        let mut dn = DomainName::default();
        assert!(dn.from_network_bytes(&mut cursor).is_err());
    }

    #[test]
    fn encode_with_compression() {
        let mut buffer = vec![0u8; 12];
        let mut map = CompressionMap::new();

        let question = DomainName::try_from("example.com.").unwrap();
        question.to_wire(&mut buffer, Some(&mut map), false).unwrap();
        assert_eq!(buffer.len(), 12 + 13);

        let target = DomainName::try_from("mail.example.com.").unwrap();
        let written = target.to_wire(&mut buffer, Some(&mut map), false).unwrap();
        // "mail" label (5 bytes) + a pointer to offset 12
        assert_eq!(written, 7);
        assert_eq!(&buffer[buffer.len() - 2..], &[0xC0, 0x0C]);
    }

    #[test]
    fn compressed_wire_decodes_back() {
        let mut buffer = vec![0u8; 12];
        let mut map = CompressionMap::new();
        let a = DomainName::try_from("example.com.").unwrap();
        let b = DomainName::try_from("mail.example.com.").unwrap();
        a.to_wire(&mut buffer, Some(&mut map), false).unwrap();
        let b_offset = buffer.len() as u64;
        b.to_wire(&mut buffer, Some(&mut map), false).unwrap();

        let mut cursor = Cursor::new(buffer.as_slice());
        cursor.set_position(b_offset);
        let mut back = DomainName::default();
        back.from_network_bytes(&mut cursor).unwrap();
        assert_eq!(back, b);
    }

    #[test]
    fn canonical_encoding_lowercases_and_never_compresses() {
        let mut buffer = Vec::new();
        let name = DomainName::try_from("WWW.Example.COM.").unwrap();
        name.to_wire(&mut buffer, None, true).unwrap();
        assert_eq!(
            buffer,
            [
                3, b'w', b'w', b'w', 7, b'e', b'x', b'a', b'm', b'p', b'l', b'e', 3, b'c', b'o',
                b'm', 0
            ]
        );
    }

    #[test]
    fn equality_is_case_insensitive() {
        let a = DomainName::try_from("Example.COM.").unwrap();
        let b = DomainName::try_from("exAMPLE.com.").unwrap();
        assert_eq!(a, b);
        assert!(a.ends_with(&DomainName::try_from("com.").unwrap()));
        assert!(!a.ends_with(&DomainName::try_from("org.").unwrap()));
    }

    #[test]
    fn canonical_order_matches_rfc4034() {
        // the worked ordering example of RFC 4034 section 6.1
        let sorted = [
            "example.",
            "a.example.",
            "yljkjljk.a.example.",
            "Z.a.example.",
            "zABC.a.EXAMPLE.",
            "z.example.",
            "\\001.z.example.",
            "*.z.example.",
            "\\200.z.example.",
        ];

        let mut names: Vec<DomainName> = sorted
            .iter()
            .map(|s| DomainName::try_from(*s).unwrap())
            .collect();
        names.reverse();
        names.sort();

        let back: Vec<String> = names.iter().map(|n| n.to_string()).collect();
        let want: Vec<String> = sorted
            .iter()
            .map(|s| DomainName::try_from(*s).unwrap().to_string())
            .collect();
        assert_eq!(back, want);
    }

    #[test]
    fn master_escapes_roundtrip() {
        let name = DomainName::try_from("a\\.b.example.").unwrap();
        assert_eq!(name.label_count(), 2);
        assert_eq!(name.labels()[0].as_bytes(), b"a.b");
        assert_eq!(name.to_string(), "a\\.b.example.");

        let name = DomainName::try_from("\\007.example.").unwrap();
        assert_eq!(name.labels()[0].as_bytes(), &[7]);
        assert_eq!(name.to_string(), "\\007.example.");
    }

    #[test]
    fn relative_names_need_an_origin() {
        let origin = DomainName::try_from("example.com.").unwrap();
        let dn = DomainName::from_master("www", Some(&origin)).unwrap();
        assert_eq!(dn.to_string(), "www.example.com.");

        assert!(DomainName::from_master("www", None).is_err());
        assert_eq!(DomainName::from_master("@", Some(&origin)).unwrap(), origin);
    }
}
