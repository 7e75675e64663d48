//! The windowed type bitmap shared by NSEC, NSEC3 and CSYNC: one window per
//! 256 type codes, each carrying up to 32 octets of MSB-first bits with
//! trailing zero octets trimmed.
use std::fmt;

use crate::codes::QType;
use crate::error::{DNSError, DNSResult};
use crate::rdata::codec::{MasterFields, RDataDecoder, RDataEncoder};

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TypeBitmap {
    // sorted, without duplicates
    codes: Vec<u16>,
}

impl TypeBitmap {
    pub fn from_codes(mut codes: Vec<u16>) -> Self {
        codes.sort_unstable();
        codes.dedup();
        TypeBitmap { codes }
    }

    pub fn contains(&self, code: u16) -> bool {
        self.codes.binary_search(&code).is_ok()
    }

    pub fn iter(&self) -> impl Iterator<Item = u16> + '_ {
        self.codes.iter().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    /// Consumes the rest of the rdata window.
    pub fn from_wire(decoder: &mut RDataDecoder) -> DNSResult<Self> {
        let mut codes = Vec::new();
        let mut previous_window: Option<u8> = None;

        while decoder.remaining() > 0 {
            let window = decoder.read_u8()?;
            let length = decoder.read_u8()?;

            if let Some(previous) = previous_window {
                if window <= previous {
                    return Err(DNSError::wire(format!(
                        "bitmap window {} out of order after {}",
                        window, previous
                    )));
                }
            }
            previous_window = Some(window);

            if length == 0 || length > 32 {
                return Err(DNSError::wire(format!(
                    "bitmap window {} has bad length {}",
                    window, length
                )));
            }

            let octets = decoder.read_bytes(length as usize, "bitmap window")?;
            for (index, octet) in octets.iter().enumerate() {
                for bit in 0..8 {
                    if octet & (0x80 >> bit) != 0 {
                        codes.push((window as u16) << 8 | (index as u16 * 8 + bit as u16));
                    }
                }
            }
        }

        Ok(TypeBitmap { codes })
    }

    pub fn to_wire(&self, encoder: &mut RDataEncoder) -> usize {
        let mut written = 0;
        let mut index = 0;

        while index < self.codes.len() {
            let window = (self.codes[index] >> 8) as u8;
            let mut octets = [0u8; 32];
            let mut used = 0usize;

            while index < self.codes.len() && (self.codes[index] >> 8) as u8 == window {
                let low = (self.codes[index] & 0xFF) as usize;
                octets[low / 8] |= 0x80 >> (low % 8);
                used = used.max(low / 8 + 1);
                index += 1;
            }

            written += encoder.write_u8(window);
            written += encoder.write_u8(used as u8);
            written += encoder.write_bytes(&octets[..used]);
        }

        written
    }

    /// Wire size, computed without encoding.
    pub fn encoded_len(&self) -> usize {
        let mut length = 0;
        let mut index = 0;

        while index < self.codes.len() {
            let window = self.codes[index] >> 8;
            let mut highest = 0usize;
            while index < self.codes.len() && self.codes[index] >> 8 == window {
                highest = (self.codes[index] & 0xFF) as usize / 8 + 1;
                index += 1;
            }
            length += 2 + highest;
        }

        length
    }

    /// All remaining master-file fields, each a type mnemonic or the
    /// generic `TYPEnnn` form.
    pub fn from_master(fields: &mut MasterFields) -> DNSResult<Self> {
        let mut codes = Vec::new();
        while !fields.is_empty() {
            let qtype: QType = fields.parse("type bitmap entry")?;
            codes.push(qtype.code());
        }
        Ok(TypeBitmap::from_codes(codes))
    }
}

impl fmt::Display for TypeBitmap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, code) in self.codes.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{}", QType::from(*code))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn encode(bitmap: &TypeBitmap) -> Vec<u8> {
        let mut buffer = Vec::new();
        let mut encoder = RDataEncoder::new(&mut buffer, None, false);
        let written = bitmap.to_wire(&mut encoder);
        assert_eq!(written, buffer.len());
        assert_eq!(written, bitmap.encoded_len());
        buffer
    }

    fn decode(bytes: &[u8]) -> DNSResult<TypeBitmap> {
        let mut cursor = Cursor::new(bytes);
        let mut decoder = RDataDecoder::new(&mut cursor, bytes.len() as u16)?;
        TypeBitmap::from_wire(&mut decoder)
    }

    #[test]
    fn single_window() {
        // A (bit 1), RRSIG (bit 46) and NSEC (bit 47): window 0, 6 octets
        let bitmap = TypeBitmap::from_codes(vec![1, 46, 47]);
        let bytes = encode(&bitmap);
        assert_eq!(bytes, &[0x00, 0x06, 0x40, 0x00, 0x00, 0x00, 0x00, 0x03]);
        assert_eq!(decode(&bytes).unwrap(), bitmap);
    }

    #[test]
    fn multiple_windows_ascending() {
        // CAA is 257, i.e. window 1 bit 1
        let bitmap = TypeBitmap::from_codes(vec![257, 1, 15]);
        let bytes = encode(&bitmap);
        assert_eq!(
            bytes,
            &[0x00, 0x02, 0x40, 0x01, 0x01, 0x01, 0x40]
        );
        let back = decode(&bytes).unwrap();
        assert!(back.contains(1) && back.contains(15) && back.contains(257));
    }

    #[test]
    fn out_of_order_window_rejected() {
        let bytes = [0x01, 0x01, 0x40, 0x00, 0x01, 0x40];
        assert!(decode(&bytes).is_err());
    }

    #[test]
    fn duplicate_window_rejected() {
        let bytes = [0x00, 0x01, 0x40, 0x00, 0x01, 0x02];
        assert!(decode(&bytes).is_err());
    }

    #[test]
    fn bad_window_length_rejected() {
        assert!(decode(&[0x00, 0x00]).is_err());
        assert!(decode(&[0x00, 0x21]).is_err());
    }

    #[test]
    fn text_roundtrip() {
        let bitmap = TypeBitmap::from_codes(vec![1, 46]);
        assert_eq!(bitmap.to_string(), "A RRSIG");
    }
}
