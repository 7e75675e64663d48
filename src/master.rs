//! Master-file (zone-file) text handling: the quote- and paren-aware
//! tokenizer, and the record-level line parser. Per-type rdata grammars
//! live with the rdata implementations; the generic `\# <len> <hex>`
//! syntax is dispatched by the rdata registry.
use crate::codes::{QClass, QType};
use crate::domain::DomainName;
use crate::error::{DNSError, DNSResult};
use crate::rdata::codec::{MasterField, MasterFields};
use crate::rdata::RData;
use crate::resource_record::DNSResourceRecord;

/// Split one record's text into fields.
///
/// Rules: whitespace separates; `(` and `)` group a record across lines;
/// `;` starts a comment running to the end of the line; double quotes make
/// one field out of anything between them; a backslash escape is carried
/// into the field verbatim for the field parser to resolve. A newline
/// outside parentheses ends the record.
pub fn tokenize(text: &str) -> DNSResult<Vec<MasterField>> {
    let bytes = text.as_bytes();
    let mut fields = Vec::new();
    let mut current = Vec::new();
    let mut started = false;
    let mut quoted = false;
    let mut in_quotes = false;
    let mut depth = 0usize;
    let mut i = 0;

    macro_rules! flush {
        () => {
            if started {
                fields.push(MasterField::new(std::mem::take(&mut current), quoted));
                started = false;
                quoted = false;
            }
        };
    }

    while i < bytes.len() {
        let b = bytes[i];

        if in_quotes {
            match b {
                b'"' => {
                    in_quotes = false;
                    i += 1;
                }
                b'\\' => {
                    if i + 1 >= bytes.len() {
                        return Err(DNSError::master("dangling backslash in quoted string"));
                    }
                    current.push(b);
                    current.push(bytes[i + 1]);
                    i += 2;
                }
                _ => {
                    current.push(b);
                    i += 1;
                }
            }
            continue;
        }

        match b {
            b'"' => {
                in_quotes = true;
                quoted = true;
                started = true;
                i += 1;
            }
            b'\\' => {
                if i + 1 >= bytes.len() {
                    return Err(DNSError::master("dangling backslash"));
                }
                current.push(b);
                current.push(bytes[i + 1]);
                started = true;
                i += 2;
            }
            b';' => {
                while i < bytes.len() && bytes[i] != b'\n' {
                    i += 1;
                }
            }
            b'(' => {
                flush!();
                depth += 1;
                i += 1;
            }
            b')' => {
                flush!();
                depth = depth
                    .checked_sub(1)
                    .ok_or_else(|| DNSError::master("unbalanced ')'"))?;
                i += 1;
            }
            b'\n' => {
                flush!();
                if depth == 0 {
                    break;
                }
                i += 1;
            }
            b' ' | b'\t' | b'\r' => {
                flush!();
                i += 1;
            }
            _ => {
                current.push(b);
                started = true;
                i += 1;
            }
        }
    }

    if in_quotes {
        return Err(DNSError::master("unterminated quoted string"));
    }
    if depth != 0 {
        return Err(DNSError::master("unbalanced '('"));
    }
    flush!();

    Ok(fields)
}

/// Tokenize rdata-only text (no owner/ttl/class/type prelude).
pub fn tokenize_rdata(text: &str) -> DNSResult<Vec<MasterField>> {
    tokenize(text)
}

/// Parse one full record line: `owner [ttl] [class] type rdata…`, with ttl
/// and class accepted in either order. Relative owner names and `@`
/// resolve against `origin`.
pub fn parse_record(text: &str, origin: Option<&DomainName>) -> DNSResult<DNSResourceRecord> {
    let fields = tokenize(text)?;
    if fields.is_empty() {
        return Err(DNSError::master("empty record line"));
    }

    let owner = DomainName::from_master(fields[0].text()?, origin)?;

    let mut ttl: Option<i32> = None;
    let mut class: Option<QClass> = None;
    let mut qtype: Option<QType> = None;
    let mut index = 1;

    while index < fields.len() {
        let text = fields[index].text()?;

        if ttl.is_none() && !text.starts_with("TYPE") && !text.starts_with("CLASS") {
            if let Ok(seconds) = text.parse::<u32>() {
                ttl = Some(seconds as i32);
                index += 1;
                continue;
            }
        }
        if class.is_none() {
            if let Ok(parsed) = text.parse::<QClass>() {
                class = Some(parsed);
                index += 1;
                continue;
            }
        }

        qtype = Some(
            text.parse::<QType>()
                .map_err(DNSError::MalformedMasterFile)?,
        );
        index += 1;
        break;
    }

    let qtype = qtype.ok_or_else(|| DNSError::master("record line without a type"))?;
    let mut rdata_fields = MasterFields::new(&fields[index..]);
    let rdata = RData::from_master(qtype, &mut rdata_fields, origin)?;

    Ok(DNSResourceRecord {
        name: owner,
        class: class.unwrap_or(QClass::IN),
        ttl: ttl.unwrap_or(0),
        rdata,
    })
}

/// The master-file line for a record; inverse of [`parse_record`].
pub fn format_record(record: &DNSResourceRecord) -> String {
    record.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rdata::RData;

    fn roundtrip(line: &str) {
        let record = parse_record(line, None).unwrap();
        assert_eq!(format_record(&record), line);
    }

    #[test]
    fn tokenizer_basics() {
        let fields = tokenize(r#"10 mail.example.com. ; a comment"#).unwrap();
        assert_eq!(fields.len(), 2);
        assert_eq!(fields[0].text().unwrap(), "10");
        assert_eq!(fields[1].text().unwrap(), "mail.example.com.");
    }

    #[test]
    fn tokenizer_quotes_keep_spaces_and_semicolons() {
        let fields = tokenize(r#"0 issue "ca.example.net; policy=ev""#).unwrap();
        assert_eq!(fields.len(), 3);
        assert!(fields[2].quoted);
        assert_eq!(fields[2].text().unwrap(), "ca.example.net; policy=ev");
    }

    #[test]
    fn tokenizer_parens_continue_lines() {
        let fields = tokenize(
            "ns1.example.com. admin.example.com. (\n  2024010101 ; serial\n  900 900 1800 60 )",
        )
        .unwrap();
        let texts: Vec<_> = fields.iter().map(|f| f.text().unwrap()).collect();
        assert_eq!(
            texts,
            &["ns1.example.com.", "admin.example.com.", "2024010101", "900", "900", "1800", "60"]
        );
    }

    #[test]
    fn tokenizer_rejects_unbalanced_input() {
        assert!(tokenize("\"unterminated").is_err());
        assert!(tokenize("a ) b").is_err());
        assert!(tokenize("( a b").is_err());
    }

    #[test]
    fn record_lines_roundtrip() {
        roundtrip("example.com. 3600 IN A 93.184.216.34");
        roundtrip("example.com. 3600 IN MX 10 mail.example.com.");
        roundtrip("example.com. 300 IN TXT \"v=spf1 -all\"");
        roundtrip("example.com. 86400 IN NS ns1.example.com.");
        roundtrip("_sip._tcp.example.com. 60 IN SRV 0 5 5060 sip.example.com.");
    }

    #[test]
    fn generic_syntax_roundtrips_exactly() {
        let line = "example. 3600 CLASS1 TYPE65534 \\# 4 DEADBEEF";
        let record = parse_record(line, None).unwrap();
        match &record.rdata {
            RData::Unknown(unknown) => {
                assert_eq!(unknown.code, 65534);
                assert_eq!(unknown.data, vec![0xDE, 0xAD, 0xBE, 0xEF]);
            }
            other => panic!("expected Unknown, got {:?}", other),
        }
        assert_eq!(format_record(&record), line);
    }

    #[test]
    fn generic_syntax_for_known_types_redispatches() {
        // \# on a known type runs the binary decoder
        let record = parse_record("example.com. 60 IN A \\# 4 5DB8D822", None).unwrap();
        match &record.rdata {
            RData::A(a) => assert_eq!(a.address.to_string(), "93.184.216.34"),
            other => panic!("expected A, got {:?}", other),
        }
    }

    #[test]
    fn generic_syntax_length_mismatch_rejected() {
        assert!(parse_record("example.com. 60 IN A \\# 3 5DB8D822", None).is_err());
        assert!(parse_record("example.com. 60 IN A \\# 4 5DB8D8", None).is_err());
    }

    #[test]
    fn class_and_ttl_order_is_flexible() {
        let a = parse_record("example.com. 3600 IN A 10.0.0.1", None).unwrap();
        let b = parse_record("example.com. IN 3600 A 10.0.0.1", None).unwrap();
        assert_eq!(a, b);

        // both optional
        let c = parse_record("example.com. A 10.0.0.1", None).unwrap();
        assert_eq!(c.ttl, 0);
        assert_eq!(c.class, crate::codes::QClass::IN);
    }

    #[test]
    fn origin_and_at_sign() {
        let origin = DomainName::try_from("example.com.").unwrap();
        let record = parse_record("@ 60 IN MX 10 mail", Some(&origin)).unwrap();
        assert_eq!(record.name, origin);
        match &record.rdata {
            RData::MX(mx) => assert_eq!(mx.exchange.to_string(), "mail.example.com."),
            other => panic!("expected MX, got {:?}", other),
        }
    }

    #[test]
    fn multiline_soa() {
        let record = parse_record(
            "example.com. 3600 IN SOA ns1.example.com. admin.example.com. (\n\
             \t2024010101 ; serial\n\t900 ; refresh\n\t900 1800 60 )",
            None,
        )
        .unwrap();
        match &record.rdata {
            RData::SOA(soa) => {
                assert_eq!(soa.serial, 2024010101);
                assert_eq!(soa.minimum, 60);
            }
            other => panic!("expected SOA, got {:?}", other),
        }
    }
}
