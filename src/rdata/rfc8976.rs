//! ZONEMD: a digest over the canonical contents of a zone, plus the walk
//! that computes and verifies it.
use std::fmt;

use crate::base_encoding::{base16_decode, base16_encode};
use crate::codes::QType;
use crate::crypto::{CryptoProvider, DigestAlgorithm};
use crate::domain::DomainName;
use crate::error::{DNSError, DNSResult};
use crate::rdata::codec::{MasterFields, RDataDecoder, RDataEncoder};
use crate::rdata::{RData, RecordData};
use crate::resource_record::DNSResourceRecord;

/// The only scheme currently defined: digest the whole sorted zone.
pub const SCHEME_SIMPLE: u8 = 1;
pub const HASH_SHA384: u8 = 1;
pub const HASH_SHA512: u8 = 2;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZONEMD {
    pub serial: u32,
    pub scheme: u8,
    pub hash_algorithm: u8,
    pub digest: Vec<u8>,
}

impl RecordData for ZONEMD {
    fn from_wire(decoder: &mut RDataDecoder) -> DNSResult<Self> {
        Ok(ZONEMD {
            serial: decoder.read_u32()?,
            scheme: decoder.read_u8()?,
            hash_algorithm: decoder.read_u8()?,
            digest: decoder.rest(),
        })
    }

    fn to_wire(&self, encoder: &mut RDataEncoder) -> DNSResult<usize> {
        let mut length = encoder.write_u32(self.serial);
        length += encoder.write_u8(self.scheme);
        length += encoder.write_u8(self.hash_algorithm);
        length += encoder.write_bytes(&self.digest);
        Ok(length)
    }

    fn from_master(fields: &mut MasterFields, _origin: Option<&DomainName>) -> DNSResult<Self> {
        Ok(ZONEMD {
            serial: fields.parse("serial")?,
            scheme: fields.parse("scheme")?,
            hash_algorithm: fields.parse("hash algorithm")?,
            digest: base16_decode(&fields.rest_concat("digest")?)?,
        })
    }

    fn max_length(&self) -> usize {
        6 + self.digest.len()
    }
}

impl fmt::Display for ZONEMD {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {}",
            self.serial,
            self.scheme,
            self.hash_algorithm,
            base16_encode(&self.digest)
        )
    }
}

/// Digest a zone: every record in canonical total order and canonical wire
/// form, skipping out-of-zone records, duplicates, the apex ZONEMD itself,
/// and RRSIGs covering ZONEMD.
pub fn zone_digest(
    records: &[DNSResourceRecord],
    apex: &DomainName,
    scheme: u8,
    hash_algorithm: u8,
    provider: &dyn CryptoProvider,
) -> DNSResult<Vec<u8>> {
    if scheme != SCHEME_SIMPLE {
        return Err(DNSError::Unsupported(format!("ZONEMD scheme {}", scheme)));
    }
    let algorithm = match hash_algorithm {
        HASH_SHA384 => DigestAlgorithm::Sha384,
        HASH_SHA512 => DigestAlgorithm::Sha512,
        other => {
            return Err(DNSError::Unsupported(format!(
                "ZONEMD hash algorithm {}",
                other
            )))
        }
    };

    let mut selected: Vec<&DNSResourceRecord> = records
        .iter()
        .filter(|r| r.name.ends_with(apex))
        .filter(|r| !(&r.name == apex && r.rtype() == QType::ZONEMD))
        .filter(|r| match &r.rdata {
            RData::RRSIG(rrsig) => rrsig.type_covered != QType::ZONEMD,
            _ => true,
        })
        .collect();

    selected.sort();
    selected.dedup_by(|a, b| a == b);

    let mut data = Vec::new();
    for record in selected {
        record.to_wire(&mut data, None, true)?;
    }

    provider.digest(algorithm, &data)
}

/// Recompute the digest a ZONEMD record claims and compare.
pub fn verify_zone_digest(
    records: &[DNSResourceRecord],
    apex: &DomainName,
    zonemd: &ZONEMD,
    provider: &dyn CryptoProvider,
) -> DNSResult<bool> {
    let computed = zone_digest(
        records,
        apex,
        zonemd.scheme,
        zonemd.hash_algorithm,
        provider,
    )?;
    Ok(computed == zonemd.digest)
}
