//! The DNS message: header, question section, and the three record
//! sections, with whole-message encode/decode, name compression, the
//! truncation rule, and the EDNS view over the OPT pseudo-record.
use std::io::Cursor;

use log::{debug, trace};
use rand::Rng;

use crate::codes::{QClass, QType};
use crate::domain::{CompressionMap, DomainName};
use crate::error::{DNSError, DNSResult};
use crate::header::{DNSPacketHeader, HEADER_LENGTH, OpCode, PacketType};
use crate::network_order::{FromNetworkOrder, ToNetworkOrder};
use crate::question::DNSQuestion;
use crate::rdata::rfc6891::{EdnsOption, OPT};
use crate::rdata::RData;
use crate::resource_record::DNSResourceRecord;

/// Classic payload cap for UDP without EDNS.
pub const MAX_UDP_PACKET_SIZE: usize = 512;

// DNS packets are called "messages" in RFC 1035: "All communications
// inside of the domain protocol are carried in a single format called
// a message"
#[derive(Debug, Default, Clone, PartialEq)]
pub struct DNSMessage {
    pub header: DNSPacketHeader,
    pub questions: Vec<DNSQuestion>,
    pub answers: Vec<DNSResourceRecord>,
    pub authorities: Vec<DNSResourceRecord>,
    pub additionals: Vec<DNSResourceRecord>,
}

impl DNSMessage {
    /// A fresh query with a random transaction id and recursion desired.
    pub fn new_query() -> Self {
        let mut header = DNSPacketHeader::default();
        header.id = rand::thread_rng().gen::<u16>();
        header.flags.packet_type = PacketType::Query;
        header.flags.op_code = OpCode::Query;
        header.flags.recursion_desired = true;

        DNSMessage {
            header,
            ..DNSMessage::default()
        }
    }

    // Add another question into the list of questions to send
    pub fn push_question(&mut self, question: DNSQuestion) {
        self.questions.push(question);
        self.header.qd_count = self.questions.len() as u16;
    }

    pub fn push_answer(&mut self, record: DNSResourceRecord) {
        self.answers.push(record);
        self.header.an_count = self.answers.len() as u16;
    }

    pub fn push_authority(&mut self, record: DNSResourceRecord) {
        self.authorities.push(record);
        self.header.ns_count = self.authorities.len() as u16;
    }

    pub fn push_additional(&mut self, record: DNSResourceRecord) {
        self.additionals.push(record);
        self.header.ar_count = self.additionals.len() as u16;
    }

    /// Encode the whole message, compressing names unless told otherwise.
    pub fn to_wire(&self, compress: bool) -> DNSResult<Vec<u8>> {
        Ok(self.encode(compress, usize::MAX)?.0)
    }

    /// Encode under a payload limit: records that do not fit are dropped
    /// whole and TC is set. Returns the bytes and whether truncation
    /// happened.
    pub fn to_wire_limited(&self, compress: bool, limit: usize) -> DNSResult<(Vec<u8>, bool)> {
        self.encode(compress, limit)
    }

    fn encode(&self, compress: bool, limit: usize) -> DNSResult<(Vec<u8>, bool)> {
        let mut buffer = Vec::new();
        let mut map = CompressionMap::new();
        let mut dict = if compress { Some(&mut map) } else { None };

        // provisional header, patched once the surviving counts are known
        self.header.to_network_bytes(&mut buffer)?;

        let mut truncated = false;
        let mut counts = [0u16; 4];

        let mut undo = buffer.len();
        for question in &self.questions {
            question.to_wire(&mut buffer, dict.as_deref_mut())?;
            if buffer.len() > limit {
                buffer.truncate(undo);
                truncated = true;
                break;
            }
            counts[0] += 1;
            undo = buffer.len();
        }

        let sections: [(usize, &[DNSResourceRecord]); 3] = [
            (1, &self.answers),
            (2, &self.authorities),
            (3, &self.additionals),
        ];
        'sections: for (index, records) in sections {
            if truncated {
                break;
            }
            for record in records {
                record.to_wire(&mut buffer, dict.as_deref_mut(), false)?;
                if buffer.len() > limit {
                    buffer.truncate(undo);
                    truncated = true;
                    break 'sections;
                }
                counts[index] += 1;
                undo = buffer.len();
            }
        }

        // patch the real header
        let mut header = self.header.clone();
        header.qd_count = counts[0];
        header.an_count = counts[1];
        header.ns_count = counts[2];
        header.ar_count = counts[3];
        header.flags.truncated = self.header.flags.truncated || truncated;

        let mut head = Vec::with_capacity(HEADER_LENGTH);
        header.to_network_bytes(&mut head)?;
        buffer[..HEADER_LENGTH].copy_from_slice(&head);

        trace!(
            "encoded message id {} into {} byte(s), truncated: {}",
            header.id,
            buffer.len(),
            truncated
        );
        Ok((buffer, truncated))
    }

    /// Decode a whole message. Nothing is delivered on a malformed input.
    pub fn from_wire(wire: &[u8]) -> DNSResult<Self> {
        let mut cursor = Cursor::new(wire);

        let mut header = DNSPacketHeader::default();
        header.from_network_bytes(&mut cursor)?;
        debug!(
            "decoding message id {}: {}q/{}an/{}ns/{}ar",
            header.id, header.qd_count, header.an_count, header.ns_count, header.ar_count
        );

        let mut questions = Vec::with_capacity(header.qd_count as usize);
        for _ in 0..header.qd_count {
            let mut question = DNSQuestion::default();
            question.from_network_bytes(&mut cursor)?;
            questions.push(question);
        }

        let mut sections: [Vec<DNSResourceRecord>; 3] = [Vec::new(), Vec::new(), Vec::new()];
        let counts = [header.an_count, header.ns_count, header.ar_count];
        for (section, count) in sections.iter_mut().zip(counts) {
            for _ in 0..count {
                section.push(DNSResourceRecord::from_wire(&mut cursor)?);
            }
        }
        let [answers, authorities, additionals] = sections;

        if (cursor.position() as usize) < wire.len() {
            return Err(DNSError::wire(format!(
                "{} stray octet(s) after the last record",
                wire.len() - cursor.position() as usize
            )));
        }

        Ok(DNSMessage {
            header,
            questions,
            answers,
            authorities,
            additionals,
        })
    }

    /// The OPT pseudo-record, when present in the additional section.
    pub fn opt_record(&self) -> Option<&DNSResourceRecord> {
        self.additionals
            .iter()
            .find(|r| matches!(r.rdata, RData::OPT(_)))
    }

    /// The EDNS state carried by the OPT record.
    pub fn edns(&self) -> Option<EdnsInfo<'_>> {
        let record = self.opt_record()?;
        let options = match &record.rdata {
            RData::OPT(opt) => &opt.options,
            _ => return None,
        };
        let ttl = record.ttl as u32;
        Some(EdnsInfo {
            payload_size: record.class.code(),
            extended_rcode: (ttl >> 24) as u8,
            version: (ttl >> 16) as u8,
            dnssec_ok: ttl & 0x8000 != 0,
            options,
        })
    }

    /// Attach an OPT record advertising `payload_size`.
    pub fn set_edns(&mut self, payload_size: u16, dnssec_ok: bool, options: Vec<EdnsOption>) {
        let ttl = if dnssec_ok { 0x8000 } else { 0 };
        self.push_additional(DNSResourceRecord {
            name: DomainName::root(),
            class: QClass::from(payload_size),
            ttl,
            rdata: RData::OPT(OPT { options }),
        });
    }

    /// The TSIG record, which must be the very last record when present.
    pub fn tsig_record(&self) -> Option<&DNSResourceRecord> {
        let last = self.additionals.last()?;
        if last.rtype() == QType::TSIG {
            Some(last)
        } else {
            None
        }
    }
}

/// The decoded EDNS state of a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EdnsInfo<'a> {
    pub payload_size: u16,
    pub extended_rcode: u8,
    pub version: u8,
    pub dnssec_ok: bool,
    pub options: &'a [EdnsOption],
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rdata::rfc1035;

    fn sample_message() -> DNSMessage {
        let mut message = DNSMessage::new_query();
        message.header.id = 0x4321;
        message.push_question(DNSQuestion::new("example.com.", QType::MX, None).unwrap());
        message.push_answer(DNSResourceRecord {
            name: DomainName::try_from("example.com.").unwrap(),
            class: QClass::IN,
            ttl: 3600,
            rdata: RData::MX(rfc1035::MX {
                preference: 10,
                exchange: DomainName::try_from("mail.example.com.").unwrap(),
            }),
        });
        message
    }

    #[test]
    fn mx_target_compresses_against_the_question() {
        let message = sample_message();
        let wire = message.to_wire(true).unwrap();

        // the MX rdata is: preference, the "mail" label, then a pointer to
        // the question name at offset 12
        let tail: &[u8] = &[0x00, 0x0A, 0x04, b'm', b'a', b'i', b'l', 0xC0, 0x0C];
        assert!(wire.ends_with(tail));
    }

    #[test]
    fn compression_idempotence() {
        let message = sample_message();
        let compressed = message.to_wire(true).unwrap();
        let plain = message.to_wire(false).unwrap();

        assert!(compressed.len() < plain.len());
        let a = DNSMessage::from_wire(&compressed).unwrap();
        let b = DNSMessage::from_wire(&plain).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn stray_bytes_rejected() {
        let mut wire = sample_message().to_wire(true).unwrap();
        wire.push(0x00);
        assert!(DNSMessage::from_wire(&wire).is_err());
    }

    #[test]
    fn truncation_drops_whole_records() {
        let mut message = sample_message();
        for i in 0..20 {
            message.push_answer(DNSResourceRecord {
                name: DomainName::try_from("example.com.").unwrap(),
                class: QClass::IN,
                ttl: 60,
                rdata: RData::A(rfc1035::A {
                    address: format!("10.0.0.{}", i).parse().unwrap(),
                }),
            });
        }

        let (wire, truncated) = message.to_wire_limited(true, 128).unwrap();
        assert!(truncated);
        assert!(wire.len() <= 128);

        let back = DNSMessage::from_wire(&wire).unwrap();
        assert!(back.header.flags.truncated);
        assert!(back.answers.len() < message.answers.len());
        // the surviving records decode intact
        assert_eq!(back.answers[0], message.answers[0]);
    }

    #[test]
    fn edns_view() {
        let mut message = DNSMessage::new_query();
        message.push_question(DNSQuestion::new("example.com.", QType::A, None).unwrap());
        message.set_edns(4096, true, Vec::new());

        let wire = message.to_wire(true).unwrap();
        let back = DNSMessage::from_wire(&wire).unwrap();
        let edns = back.edns().unwrap();
        assert_eq!(edns.payload_size, 4096);
        assert!(edns.dnssec_ok);
        assert_eq!(edns.version, 0);
        assert_eq!(edns.extended_rcode, 0);
    }
}
