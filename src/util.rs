//! Module for some utility functions shared by the codec and its tests.
use std::io::Cursor;

// A label length byte starts with 00, a compression pointer with 11
pub fn is_pointer(x: u8) -> bool {
    x & 0b1100_0000 == 0b1100_0000
}

// A domain name is null terminated or terminated by a pointer
pub fn is_sentinel(x: u8) -> bool {
    x == 0 || is_pointer(x)
}

/// Bytes still readable from the cursor position to the end of the slice.
pub fn remaining(buffer: &Cursor<&[u8]>) -> usize {
    (buffer.get_ref().len() as u64).saturating_sub(buffer.position()) as usize
}

// Build a byte buffer from a hex dump pasted out of wireshark, e.g.:
//   0000   76 86 81 a0 00 01 00 08 00 00 00 01
// The leading offset column of each line is dropped.
pub fn get_sample_slice(dump: &str) -> Vec<u8> {
    let mut v = Vec::new();

    for line in dump.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        for (i, field) in line.split_whitespace().enumerate() {
            // first field is the offset column
            if i == 0 && field.len() > 2 {
                continue;
            }
            v.push(u8::from_str_radix(field, 16).expect("bad hex dump sample"));
        }
    }

    v
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_slice() {
        const DUMP: &str = r#"
0000   76 86 81 a0
0010   00 01
"#;
        assert_eq!(get_sample_slice(DUMP), &[0x76, 0x86, 0x81, 0xa0, 0x00, 0x01]);
    }

    #[test]
    fn pointer_bytes() {
        assert!(is_pointer(0b1100_0000));
        assert!(is_pointer(0xff));
        assert!(!is_pointer(0b0011_1111));
        assert!(is_sentinel(0));
        assert!(!is_sentinel(0x3f));
    }
}
