//! The RFC 8427 JSON representation of resource records: structural
//! members (NAME/TYPE/CLASS/TTL), the raw rdata as hex, and the textual
//! rdata member when the type has a text grammar.
use serde_json::{json, Map, Value};

use crate::base_encoding::{base16_decode, base16_encode};
use crate::codes::{QClass, QType};
use crate::domain::DomainName;
use crate::error::{DNSError, DNSResult};
use crate::master::tokenize_rdata;
use crate::rdata::codec::MasterFields;
use crate::rdata::RData;
use crate::resource_record::DNSResourceRecord;

impl DNSResourceRecord {
    /// Serialise per RFC 8427. Both the hex member and, when the type has
    /// a text form, the `rdata<TYPEname>` member are emitted.
    pub fn to_json(&self) -> DNSResult<Value> {
        // the rdata exactly as it would sit in a message, uncompressed
        let mut rdata_bytes = Vec::new();
        let mut encoder = crate::rdata::codec::RDataEncoder::new(&mut rdata_bytes, None, false);
        self.rdata.to_wire(&mut encoder)?;

        let type_name = self.rdata.type_name();
        let mut object = json!({
            "NAME": self.name.to_string(),
            "TYPE": self.type_code(),
            "TYPEname": type_name,
            "CLASS": self.class.code(),
            "CLASSname": self.class.to_string(),
            "TTL": self.ttl_on_wire(),
            "RDLENGTH": rdata_bytes.len(),
            "RDATAHEX": base16_encode(&rdata_bytes),
        });

        let text = self.rdata.to_string();
        // the generic \# form is already covered by RDATAHEX
        if !text.starts_with("\\#") {
            if let Some(map) = object.as_object_mut() {
                map.insert(format!("rdata{}", type_name), Value::String(text));
            }
        }

        Ok(object)
    }

    /// Parse per RFC 8427. When both the textual member and `RDATAHEX`
    /// are present, the text wins if it parses; the hex member is the
    /// fallback. (The RFC itself does not state a precedence.)
    pub fn from_json(value: &Value) -> DNSResult<DNSResourceRecord> {
        let object = value
            .as_object()
            .ok_or_else(|| DNSError::master("RFC 8427 record is not a JSON object"))?;

        let name_text = string_member(object, "NAME")?
            .ok_or_else(|| DNSError::master("missing NAME member"))?;
        let name = DomainName::from_master(&name_text, None)?;

        let qtype = match u16_member(object, "TYPE")? {
            Some(code) => QType::from(code),
            None => match string_member(object, "TYPEname")? {
                Some(text) => text
                    .parse::<QType>()
                    .map_err(DNSError::MalformedMasterFile)?,
                None => return Err(DNSError::master("missing TYPE and TYPEname members")),
            },
        };

        let class = match u16_member(object, "CLASS")? {
            Some(code) => QClass::from(code),
            None => match string_member(object, "CLASSname")? {
                Some(text) => text
                    .parse::<QClass>()
                    .map_err(DNSError::MalformedMasterFile)?,
                None => QClass::IN,
            },
        };

        let ttl = u32_member(object, "TTL")?.unwrap_or(0) as i32;

        // textual rdata first, hex as the fallback
        let rdata_text = string_member(object, &format!("rdata{}", qtype))?;
        let rdata_from_text = rdata_text.and_then(|text| {
            let fields = tokenize_rdata(&text).ok()?;
            let mut it = MasterFields::new(&fields);
            RData::from_master(qtype, &mut it, None).ok()
        });

        let rdata = match rdata_from_text {
            Some(rdata) => rdata,
            None => {
                let hex = string_member(object, "RDATAHEX")?
                    .ok_or_else(|| DNSError::master("record carries neither text nor hex rdata"))?;
                let bytes = base16_decode(&hex)?;
                if let Some(rdlength) = u16_member(object, "RDLENGTH")? {
                    if rdlength as usize != bytes.len() {
                        return Err(DNSError::master(format!(
                            "RDLENGTH {} disagrees with {} hex octet(s)",
                            rdlength,
                            bytes.len()
                        )));
                    }
                }
                RData::from_bytes(qtype, &bytes)?
            }
        };

        Ok(DNSResourceRecord {
            name,
            class,
            ttl,
            rdata,
        })
    }
}

fn string_member(object: &Map<String, Value>, key: &str) -> DNSResult<Option<String>> {
    match object.get(key) {
        None => Ok(None),
        Some(Value::String(text)) => Ok(Some(text.clone())),
        Some(other) => Err(DNSError::master(format!(
            "member {} is not a string: {}",
            key, other
        ))),
    }
}

fn u32_member(object: &Map<String, Value>, key: &str) -> DNSResult<Option<u32>> {
    match object.get(key) {
        None => Ok(None),
        Some(value) => value
            .as_u64()
            .and_then(|n| u32::try_from(n).ok())
            .map(Some)
            .ok_or_else(|| DNSError::master(format!("member {} is not a 32-bit number", key))),
    }
}

fn u16_member(object: &Map<String, Value>, key: &str) -> DNSResult<Option<u16>> {
    match u32_member(object, key)? {
        None => Ok(None),
        Some(n) => u16::try_from(n)
            .map(Some)
            .map_err(|_| DNSError::master(format!("member {} is not a 16-bit number", key))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rdata::{rfc1035, UnknownRData};

    fn a_record() -> DNSResourceRecord {
        DNSResourceRecord {
            name: DomainName::try_from("example.com.").unwrap(),
            class: QClass::IN,
            ttl: 3600,
            rdata: RData::A(rfc1035::A {
                address: "93.184.216.34".parse().unwrap(),
            }),
        }
    }

    #[test]
    fn json_roundtrip() {
        let record = a_record();
        let value = record.to_json().unwrap();

        assert_eq!(value["NAME"], "example.com.");
        assert_eq!(value["TYPE"], 1);
        assert_eq!(value["TYPEname"], "A");
        assert_eq!(value["CLASS"], 1);
        assert_eq!(value["CLASSname"], "IN");
        assert_eq!(value["TTL"], 3600);
        assert_eq!(value["RDLENGTH"], 4);
        assert_eq!(value["RDATAHEX"], "5DB8D822");
        assert_eq!(value["rdataA"], "93.184.216.34");

        let back = DNSResourceRecord::from_json(&value).unwrap();
        assert_eq!(back, record);
    }

    #[test]
    fn text_and_hex_agree_regardless_of_which_is_used() {
        let with_both = json!({
            "NAME": "example.com.",
            "TYPE": 1,
            "TTL": 3600,
            "rdataA": "93.184.216.34",
            "RDATAHEX": "5DB8D822",
        });
        let text_only = json!({
            "NAME": "example.com.",
            "TYPEname": "A",
            "TTL": 3600,
            "rdataA": "93.184.216.34",
        });
        let hex_only = json!({
            "NAME": "example.com.",
            "TYPE": 1,
            "TTL": 3600,
            "RDATAHEX": "5DB8D822",
        });

        let a = DNSResourceRecord::from_json(&with_both).unwrap();
        let b = DNSResourceRecord::from_json(&text_only).unwrap();
        let c = DNSResourceRecord::from_json(&hex_only).unwrap();
        assert_eq!(a, b);
        assert_eq!(b, c);
        assert_eq!(a, a_record());
    }

    #[test]
    fn unparseable_text_falls_back_to_hex() {
        let value = json!({
            "NAME": "example.com.",
            "TYPE": 1,
            "rdataA": "not-an-address",
            "RDATAHEX": "5DB8D822",
        });
        let record = DNSResourceRecord::from_json(&value).unwrap();
        assert_eq!(record.rdata, a_record().rdata);
    }

    #[test]
    fn unknown_type_roundtrips_through_hex() {
        let record = DNSResourceRecord {
            name: DomainName::try_from("example.").unwrap(),
            class: QClass::IN,
            ttl: 60,
            rdata: RData::Unknown(UnknownRData {
                code: 65534,
                data: vec![0xDE, 0xAD],
            }),
        };
        let value = record.to_json().unwrap();
        assert_eq!(value["TYPEname"], "TYPE65534");
        assert!(value.get("rdataTYPE65534").is_none());

        let back = DNSResourceRecord::from_json(&value).unwrap();
        assert_eq!(back, record);
    }

    #[test]
    fn rdlength_mismatch_rejected() {
        let value = json!({
            "NAME": "example.com.",
            "TYPE": 1,
            "RDLENGTH": 3,
            "RDATAHEX": "5DB8D822",
        });
        assert!(DNSResourceRecord::from_json(&value).is_err());
    }
}
