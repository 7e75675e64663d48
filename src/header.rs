//! The DNS message header: https://datatracker.ietf.org/doc/html/rfc1035#section-4.1.1
use std::io::Cursor;

use dns_derive::{DnsEnum, DnsStruct};

use crate::error::{DNSError, DNSResult};
use crate::network_order::{FromNetworkOrder, ToNetworkOrder};

/// Wire size of the header.
pub const HEADER_LENGTH: usize = 12;

// DNS packet header: ID, flags, and the four section counts.
#[derive(Debug, Default, Clone, PartialEq, Eq, DnsStruct)]
pub struct DNSPacketHeader {
    /// A 16 bit identifier assigned by the program that generates any kind
    /// of query. This identifier is copied into the corresponding reply and
    /// can be used by the requester to match up replies to outstanding
    /// queries.
    pub id: u16,
    pub flags: DNSPacketFlags,
    /// number of entries in the question section
    pub qd_count: u16,
    /// number of resource records in the answer section
    pub an_count: u16,
    /// number of name server resource records in the authority section
    pub ns_count: u16,
    /// number of resource records in the additional records section
    pub ar_count: u16,
}

// Flags bitfield:
//                                1  1  1  1  1  1
//  0  1  2  3  4  5  6  7  8  9  0  1  2  3  4  5
// +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
// |QR|   Opcode  |AA|TC|RD|RA| Z|AD|CD|   RCODE   |
// +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DNSPacketFlags {
    /// whether this message is a query or a response
    pub packet_type: PacketType,
    /// kind of query, set by the originator and copied into the response
    pub op_code: OpCode,
    /// the responding name server is an authority for the domain name in
    /// the question section
    pub authoritative_answer: bool,
    /// this message was truncated to fit the transmission channel
    pub truncated: bool,
    /// directs the name server to pursue the query recursively
    pub recursion_desired: bool,
    /// recursive query support is available in the name server
    pub recursion_available: bool,
    /// reserved, must be zero in all queries and responses
    pub z: bool,
    /// all data in the answer and authority sections has been authenticated
    pub authentic_data: bool,
    /// the requester accepts non-authenticated data
    pub checking_disabled: bool,
    pub response_code: ResponseCode,
}

impl ToNetworkOrder for DNSPacketFlags {
    fn to_network_bytes(&self, buffer: &mut Vec<u8>) -> DNSResult<usize> {
        let mut flags = (self.packet_type as u16) << 15;
        flags |= (self.op_code as u16) << 11;
        flags |= (self.authoritative_answer as u16) << 10;
        flags |= (self.truncated as u16) << 9;
        flags |= (self.recursion_desired as u16) << 8;
        flags |= (self.recursion_available as u16) << 7;
        flags |= (self.z as u16) << 6;
        flags |= (self.authentic_data as u16) << 5;
        flags |= (self.checking_disabled as u16) << 4;
        flags |= self.response_code as u16 & 0b1111;

        flags.to_network_bytes(buffer)
    }
}

impl<'a> FromNetworkOrder<'a> for DNSPacketFlags {
    fn from_network_bytes(&mut self, buffer: &mut Cursor<&'a [u8]>) -> DNSResult<()> {
        let mut flags = 0u16;
        flags.from_network_bytes(buffer)?;

        self.packet_type = PacketType::try_from(flags >> 15).map_err(DNSError::MalformedWire)?;
        self.op_code = OpCode::try_from(flags >> 11 & 0b1111).map_err(DNSError::MalformedWire)?;
        self.authoritative_answer = (flags >> 10) & 1 == 1;
        self.truncated = (flags >> 9) & 1 == 1;
        self.recursion_desired = (flags >> 8) & 1 == 1;
        self.recursion_available = (flags >> 7) & 1 == 1;
        self.z = (flags >> 6) & 1 == 1;
        self.authentic_data = (flags >> 5) & 1 == 1;
        self.checking_disabled = (flags >> 4) & 1 == 1;
        self.response_code =
            ResponseCode::try_from(flags & 0b1111).map_err(DNSError::MalformedWire)?;

        Ok(())
    }
}

/// The QR bit as an enum, which is both clearer and type oriented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, DnsEnum)]
pub enum PacketType {
    Query = 0,
    Response = 1,
}

// op codes: https://www.iana.org/assignments/dns-parameters/dns-parameters.xhtml#dns-parameters-5
#[derive(Debug, Clone, Copy, PartialEq, Eq, DnsEnum)]
pub enum OpCode {
    Query = 0,  // [RFC1035]
    IQuery = 1, // (Inverse Query, OBSOLETE) [RFC3425]
    Status = 2, // [RFC1035]
    Unassigned = 3,
    Notify = 4, // [RFC1996]
    Update = 5, // [RFC2136]
    DSO = 6,    // DNS Stateful Operations [RFC8490]
                // 7-15 Unassigned
}

// response codes: https://www.iana.org/assignments/dns-parameters/dns-parameters.xhtml#dns-parameters-6
// Only the 4-bit header field lives here; the extended TSIG/EDNS codes are
// 16-bit values carried in their own records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, DnsEnum)]
pub enum ResponseCode {
    NoError = 0,    // [RFC1035]
    FormErr = 1,    // Format Error [RFC1035]
    ServFail = 2,   // Server Failure [RFC1035]
    NXDomain = 3,   // Non-Existent Domain [RFC1035]
    NotImp = 4,     // Not Implemented [RFC1035]
    Refused = 5,    // Query Refused [RFC1035]
    YXDomain = 6,   // Name Exists when it should not [RFC2136]
    YXRRSet = 7,    // RR Set Exists when it should not [RFC2136]
    NXRRSet = 8,    // RR Set that should exist does not [RFC2136]
    NotAuth = 9,    // Not Authorized [RFC8945]
    NotZone = 10,   // Name not contained in zone [RFC2136]
    DSOTYPENI = 11, // DSO-TYPE Not Implemented [RFC8490]
    Reserved12 = 12,
    Reserved13 = 13,
    Reserved14 = 14,
    Reserved15 = 15,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{test_from_network, test_to_network};

    #[test]
    fn dns_packet_header() {
        const PACKET: &str = r#"
0000   76 86 81 a0 00 01 00 08 00 00 00 01
        "#;

        // from
        let header = test_from_network!(PACKET, DNSPacketHeader);
        assert_eq!(header.id, 0x7686);
        assert_eq!(header.flags.packet_type, PacketType::Response);
        assert_eq!(header.flags.op_code, OpCode::Query);
        assert!(!header.flags.authoritative_answer);
        assert!(!header.flags.truncated);
        assert!(header.flags.recursion_desired);
        assert!(header.flags.recursion_available);
        assert!(!header.flags.z);
        assert!(header.flags.authentic_data);
        assert!(!header.flags.checking_disabled);
        assert_eq!(header.flags.response_code, ResponseCode::NoError);
        assert_eq!(header.qd_count, 1);
        assert_eq!(header.an_count, 8);
        assert_eq!(header.ns_count, 0);
        assert_eq!(header.ar_count, 1);

        // to
        let values = test_to_network!(header);
        assert_eq!(values.0, crate::util::get_sample_slice(PACKET));
        assert_eq!(values.1, HEADER_LENGTH);
    }

    #[test]
    fn flags_roundtrip() {
        let flags = DNSPacketFlags {
            packet_type: PacketType::Response,
            op_code: OpCode::IQuery,
            authoritative_answer: true,
            truncated: true,
            recursion_desired: true,
            recursion_available: true,
            z: false,
            authentic_data: false,
            checking_disabled: true,
            response_code: ResponseCode::Refused,
        };

        let mut buffer: Vec<u8> = Vec::new();
        flags.to_network_bytes(&mut buffer).unwrap();
        assert_eq!(buffer, &[0b1000_1111, 0b1001_0101]);

        let mut cursor = Cursor::new(buffer.as_slice());
        let mut back = DNSPacketFlags::default();
        back.from_network_bytes(&mut cursor).unwrap();
        assert_eq!(back, flags);
    }

    #[test]
    fn enum_text_forms() {
        assert_eq!(OpCode::Query.to_string(), "Query");
        assert_eq!("Notify".parse::<OpCode>().unwrap(), OpCode::Notify);
        assert_eq!(ResponseCode::try_from(3u16).unwrap(), ResponseCode::NXDomain);
        assert!(OpCode::try_from(9u16).is_err());
    }
}
