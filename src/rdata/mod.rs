//! Record data: one module per defining RFC, a tagged sum over every
//! supported variant, and the registry that dispatches on the 16-bit type
//! code for both the binary and the master-file decoders.
use std::fmt;
use std::io::Cursor;

use crate::base_encoding::{base16_decode, base16_encode};
use crate::codes::QType;
use crate::domain::DomainName;
use crate::error::{DNSError, DNSResult};

pub mod codec;
pub mod type_bitmap;

pub mod rfc1035;
pub mod rfc1183;
pub mod rfc1876;
pub mod rfc2230;
pub mod rfc2782;
pub mod rfc2930;
pub mod rfc3123;
pub mod rfc3403;
pub mod rfc3596;
pub mod rfc4025;
pub mod rfc4034;
pub mod rfc4255;
pub mod rfc4398;
pub mod rfc4701;
pub mod rfc5155;
pub mod rfc6672;
pub mod rfc6698;
pub mod rfc6742;
pub mod rfc6891;
pub mod rfc7043;
pub mod rfc7477;
pub mod rfc7553;
pub mod rfc7929;
pub mod rfc8005;
pub mod rfc8659;
pub mod rfc8777;
pub mod rfc8945;
pub mod rfc8976;
pub mod rfc9460;

use codec::{MasterFields, RDataDecoder, RDataEncoder};

/// The four conversions every record variant supplies, plus `Display` for
/// the master-file rdata text.
pub trait RecordData: Sized + fmt::Display {
    /// Decode from a window of exactly rdlength octets. Types embedding
    /// compressed names resolve pointers through the decoder's view of the
    /// whole message.
    fn from_wire(decoder: &mut RDataDecoder) -> DNSResult<Self>;

    /// Encode the rdata; compression and canonical form are carried by the
    /// encoder.
    fn to_wire(&self, encoder: &mut RDataEncoder) -> DNSResult<usize>;

    /// Build from pre-tokenised textual rdata fields, resolving relative
    /// names against `origin`.
    fn from_master(fields: &mut MasterFields, origin: Option<&DomainName>) -> DNSResult<Self>;

    /// An exact (or safely over-estimated) wire size, computed without
    /// encoding.
    fn max_length(&self) -> usize;
}

/// Raw rdata of a type code the registry has no decoder for. Round-trips
/// losslessly through wire, text (RFC 3597 generic syntax) and JSON.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct UnknownRData {
    pub code: u16,
    pub data: Vec<u8>,
}

impl UnknownRData {
    fn from_wire(code: u16, decoder: &mut RDataDecoder) -> Self {
        UnknownRData {
            code,
            data: decoder.rest(),
        }
    }
}

impl fmt::Display for UnknownRData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.data.is_empty() {
            write!(f, "\\# 0")
        } else {
            write!(f, "\\# {} {}", self.data.len(), base16_encode(&self.data))
        }
    }
}

macro_rules! rdata_registry {
    ( $( $variant:ident => $ty:ty, )* ) => {
        /// Every supported record variant. The variant tag *is* the record
        /// type: construction is type-safe and decode picks the variant
        /// from the wire code, so the two can never disagree.
        #[derive(Debug, Clone, PartialEq, Eq)]
        pub enum RData {
            $( $variant($ty), )*
            Unknown(UnknownRData),
        }

        impl RData {
            /// The 16-bit type code this variant encodes as.
            pub fn type_code(&self) -> u16 {
                match self {
                    $( RData::$variant(_) => QType::$variant.code(), )*
                    RData::Unknown(unknown) => unknown.code,
                }
            }

            /// Binary decode: dispatch on the type code, falling back to
            /// the lossless `Unknown` carrier.
            pub fn from_wire(qtype: QType, decoder: &mut RDataDecoder) -> DNSResult<RData> {
                match qtype {
                    $( QType::$variant => <$ty>::from_wire(decoder).map(RData::$variant), )*
                    other => Ok(RData::Unknown(UnknownRData::from_wire(other.code(), decoder))),
                }
            }

            pub fn to_wire(&self, encoder: &mut RDataEncoder) -> DNSResult<usize> {
                match self {
                    $( RData::$variant(inner) => inner.to_wire(encoder), )*
                    RData::Unknown(unknown) => Ok(encoder.write_bytes(&unknown.data)),
                }
            }

            /// Master-file decode. The RFC 3597 generic syntax
            /// (`\# <length> <hex>`) is accepted for every type and
            /// re-dispatched through the binary decoder; types without a
            /// registered text grammar accept nothing else.
            pub fn from_master(
                qtype: QType,
                fields: &mut MasterFields,
                origin: Option<&DomainName>,
            ) -> DNSResult<RData> {
                if let Some(first) = fields.peek() {
                    if first.bytes == br"\#" {
                        return RData::generic_from_master(qtype, fields);
                    }
                }

                let rdata = match qtype {
                    $( QType::$variant => <$ty>::from_master(fields, origin).map(RData::$variant), )*
                    other => Err(DNSError::master(format!(
                        "type {} has no text grammar; use the \\# generic syntax",
                        other
                    ))),
                }?;

                fields.expect_end()?;
                Ok(rdata)
            }

            pub fn max_length(&self) -> usize {
                match self {
                    $( RData::$variant(inner) => inner.max_length(), )*
                    RData::Unknown(unknown) => unknown.data.len(),
                }
            }
        }

        impl fmt::Display for RData {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                match self {
                    $( RData::$variant(inner) => fmt::Display::fmt(inner, f), )*
                    RData::Unknown(unknown) => fmt::Display::fmt(unknown, f),
                }
            }
        }
    };
}

rdata_registry! {
    A => rfc1035::A,
    NS => rfc1035::NS,
    CNAME => rfc1035::CNAME,
    SOA => rfc1035::SOA,
    WKS => rfc1035::WKS,
    PTR => rfc1035::PTR,
    HINFO => rfc1035::HINFO,
    MX => rfc1035::MX,
    TXT => rfc1035::TXT,
    RP => rfc1183::RP,
    AFSDB => rfc1183::AFSDB,
    X25 => rfc1183::X25,
    ISDN => rfc1183::ISDN,
    RT => rfc1183::RT,
    NSAP => rfc1183::NSAP,
    SIG => rfc4034::RRSIG,
    KEY => rfc4034::DNSKEY,
    PX => rfc1183::PX,
    GPOS => rfc1183::GPOS,
    AAAA => rfc3596::AAAA,
    LOC => rfc1876::LOC,
    SRV => rfc2782::SRV,
    NAPTR => rfc3403::NAPTR,
    KX => rfc2230::KX,
    CERT => rfc4398::CERT,
    DNAME => rfc6672::DNAME,
    OPT => rfc6891::OPT,
    APL => rfc3123::APL,
    DS => rfc4034::DS,
    SSHFP => rfc4255::SSHFP,
    IPSECKEY => rfc4025::IPSECKEY,
    RRSIG => rfc4034::RRSIG,
    NSEC => rfc4034::NSEC,
    DNSKEY => rfc4034::DNSKEY,
    DHCID => rfc4701::DHCID,
    NSEC3 => rfc5155::NSEC3,
    NSEC3PARAM => rfc5155::NSEC3PARAM,
    TLSA => rfc6698::TLSA,
    SMIMEA => rfc6698::TLSA,
    HIP => rfc8005::HIP,
    CDS => rfc4034::DS,
    CDNSKEY => rfc4034::DNSKEY,
    OPENPGPKEY => rfc7929::OPENPGPKEY,
    CSYNC => rfc7477::CSYNC,
    ZONEMD => rfc8976::ZONEMD,
    SVCB => rfc9460::SVCB,
    HTTPS => rfc9460::SVCB,
    SPF => rfc1035::TXT,
    NID => rfc6742::NID,
    L32 => rfc6742::L32,
    L64 => rfc6742::L64,
    LP => rfc6742::LP,
    EUI48 => rfc7043::EUI48,
    EUI64 => rfc7043::EUI64,
    TKEY => rfc2930::TKEY,
    TSIG => rfc8945::TSIG,
    URI => rfc7553::URI,
    CAA => rfc8659::CAA,
    AMTRELAY => rfc8777::AMTRELAY,
    DLV => rfc4034::DS,
}

impl RData {
    /// The type mnemonic, or the `TYPEnnn` generic form for unknown codes.
    pub fn type_name(&self) -> String {
        QType::from(self.type_code()).to_string()
    }

    /// The canonical wire form of the rdata alone: uncompressed, with the
    /// historically-compressed target names lowercased. Equality and
    /// ordering of records compare these bytes.
    pub fn canonical_bytes(&self) -> DNSResult<Vec<u8>> {
        let mut buffer = Vec::new();
        let mut encoder = RDataEncoder::new(&mut buffer, None, true);
        self.to_wire(&mut encoder)?;
        Ok(buffer)
    }

    /// Decode standalone rdata bytes (no surrounding message); embedded
    /// compression pointers are rejected because there is nothing to
    /// point into.
    pub fn from_bytes(qtype: QType, data: &[u8]) -> DNSResult<RData> {
        if data.len() > u16::MAX as usize {
            return Err(DNSError::wire("rdata longer than 65535 octets"));
        }
        let mut cursor = Cursor::new(data);
        let mut decoder = RDataDecoder::new(&mut cursor, data.len() as u16)?;
        let rdata = RData::from_wire(qtype, &mut decoder)?;
        decoder.finish()?;
        Ok(rdata)
    }

    // `\# <length> <hex…>`: check the length, then run the bytes through
    // the binary decoder so generic text works for every type.
    fn generic_from_master(qtype: QType, fields: &mut MasterFields) -> DNSResult<RData> {
        let _marker = fields.next_field("generic marker")?;
        let length: u16 = fields.parse("generic rdata length")?;
        let hex = fields.rest_concat("generic rdata")?;
        let data = base16_decode(&hex)?;

        if data.len() != length as usize {
            return Err(DNSError::master(format!(
                "generic rdata announces {} octet(s) but carries {}",
                length,
                data.len()
            )));
        }

        RData::from_bytes(qtype, &data)
    }
}
