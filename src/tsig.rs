//! TSIG transaction signatures: building the signed region, producing the
//! MAC through the crypto collaborator, and verifying received messages
//! with the RFC 8945 failure codes.
use log::debug;

use crate::codes::QClass;
use crate::crypto::{constant_time_eq, CryptoProvider, TsigAlgorithm};
use crate::domain::DomainName;
use crate::error::{DNSError, DNSResult, VerificationKind};
use crate::header::HEADER_LENGTH;
use crate::message::DNSMessage;
use crate::rdata::rfc8945::TSIG;
use crate::rdata::RData;
use crate::resource_record::DNSResourceRecord;
use crate::util::is_pointer;

/// A shared secret under a key name.
#[derive(Debug, Clone)]
pub struct TsigKey {
    pub name: DomainName,
    pub algorithm: TsigAlgorithm,
    pub secret: Vec<u8>,
}

/// Sign a message: computes the MAC over the encoded message plus the
/// canonical TSIG pseudo-fields and returns the message with the TSIG
/// record appended as the final additional record.
pub fn sign(
    message: &DNSMessage,
    key: &TsigKey,
    time_signed: u64,
    fudge: u16,
    provider: &dyn CryptoProvider,
) -> DNSResult<DNSMessage> {
    let wire = message.to_wire(true)?;
    let data = signed_region(
        &wire,
        &key.name,
        QClass::ANY.code(),
        0,
        &key.algorithm.name(),
        time_signed,
        fudge,
        0,
        &[],
    )?;
    let mac = provider.hmac(key.algorithm, &key.secret, &data)?;

    let mut signed = message.clone();
    signed.push_additional(DNSResourceRecord {
        name: key.name.clone(),
        class: QClass::ANY,
        ttl: 0,
        rdata: RData::TSIG(TSIG {
            algorithm: key.algorithm.name(),
            time_signed,
            fudge,
            mac,
            original_id: message.header.id,
            error: 0,
            other: Vec::new(),
        }),
    });
    Ok(signed)
}

/// Verify a received wire message. MAC comparison is constant-time; a
/// MAC mismatch is BADSIG, an unknown key or algorithm is BADKEY, and a
/// clock outside `time_signed ± fudge` is BADTIME (checked only after the
/// MAC holds, per RFC 8945).
pub fn verify(
    wire: &[u8],
    key: &TsigKey,
    now: u64,
    provider: &dyn CryptoProvider,
) -> DNSResult<()> {
    let message = DNSMessage::from_wire(wire)?;
    let record = message
        .tsig_record()
        .ok_or(DNSError::Verification(VerificationKind::BadKey))?;
    let tsig = match &record.rdata {
        RData::TSIG(tsig) => tsig,
        _ => return Err(DNSError::Verification(VerificationKind::BadKey)),
    };

    if record.name != key.name {
        debug!("TSIG key name mismatch: {} vs {}", record.name, key.name);
        return Err(DNSError::Verification(VerificationKind::BadKey));
    }
    match TsigAlgorithm::from_name(&tsig.algorithm) {
        Ok(algorithm) if algorithm == key.algorithm => {}
        _ => return Err(DNSError::Verification(VerificationKind::BadKey)),
    }

    // the bytes preceding the TSIG record, with the original id restored
    // and the ARCOUNT decremented
    let tsig_offset = offset_of_last_additional(wire)?;
    let mut prefix = wire[..tsig_offset].to_vec();
    prefix[0..2].copy_from_slice(&tsig.original_id.to_be_bytes());
    let ar_count = u16::from_be_bytes([prefix[10], prefix[11]]);
    prefix[10..12].copy_from_slice(&(ar_count - 1).to_be_bytes());

    let data = signed_region(
        &prefix,
        &record.name,
        record.class.code(),
        record.ttl_on_wire(),
        &tsig.algorithm,
        tsig.time_signed,
        tsig.fudge,
        tsig.error,
        &tsig.other,
    )?;
    let expected = provider.hmac(key.algorithm, &key.secret, &data)?;

    if !constant_time_eq(&expected, &tsig.mac) {
        return Err(DNSError::Verification(VerificationKind::BadSig));
    }

    let skew = now.abs_diff(tsig.time_signed);
    if skew > tsig.fudge as u64 {
        debug!("TSIG clock skew of {}s exceeds fudge {}", skew, tsig.fudge);
        return Err(DNSError::Verification(VerificationKind::BadTime));
    }

    Ok(())
}

// prefix bytes, then the canonical pseudo-rdata: key name, class, ttl,
// algorithm name, time signed, fudge, error, other data
#[allow(clippy::too_many_arguments)]
fn signed_region(
    prefix: &[u8],
    key_name: &DomainName,
    class: u16,
    ttl: u32,
    algorithm: &DomainName,
    time_signed: u64,
    fudge: u16,
    error: u16,
    other: &[u8],
) -> DNSResult<Vec<u8>> {
    let mut data = prefix.to_vec();
    key_name.to_wire(&mut data, None, true)?;
    data.extend_from_slice(&class.to_be_bytes());
    data.extend_from_slice(&ttl.to_be_bytes());
    algorithm.to_wire(&mut data, None, true)?;
    data.extend_from_slice(&time_signed.to_be_bytes()[2..]);
    data.extend_from_slice(&fudge.to_be_bytes());
    data.extend_from_slice(&error.to_be_bytes());
    data.extend_from_slice(&(other.len() as u16).to_be_bytes());
    data.extend_from_slice(other);
    Ok(data)
}

// walk the message to the start of the final additional record
fn offset_of_last_additional(wire: &[u8]) -> DNSResult<usize> {
    let truncated = || DNSError::wire("message too short for its counts");

    if wire.len() < HEADER_LENGTH {
        return Err(truncated());
    }
    let qd_count = u16::from_be_bytes([wire[4], wire[5]]);
    let record_count = u16::from_be_bytes([wire[6], wire[7]]) as usize
        + u16::from_be_bytes([wire[8], wire[9]]) as usize
        + u16::from_be_bytes([wire[10], wire[11]]) as usize;
    if record_count == 0 {
        return Err(DNSError::wire("message carries no records"));
    }

    let mut pos = HEADER_LENGTH;
    for _ in 0..qd_count {
        pos = skip_name(wire, pos)?;
        pos = pos.checked_add(4).filter(|p| *p <= wire.len()).ok_or_else(truncated)?;
    }

    let mut start = pos;
    for _ in 0..record_count {
        start = pos;
        pos = skip_name(wire, pos)?;
        if pos + 10 > wire.len() {
            return Err(truncated());
        }
        let rdlength = u16::from_be_bytes([wire[pos + 8], wire[pos + 9]]) as usize;
        pos = pos
            .checked_add(10 + rdlength)
            .filter(|p| *p <= wire.len())
            .ok_or_else(truncated)?;
    }

    Ok(start)
}

// step over a possibly-compressed name without following pointers
fn skip_name(wire: &[u8], mut pos: usize) -> DNSResult<usize> {
    loop {
        let prefix = *wire
            .get(pos)
            .ok_or_else(|| DNSError::wire("name runs past the end of the message"))?;
        if prefix == 0 {
            return Ok(pos + 1);
        }
        if is_pointer(prefix) {
            if pos + 2 > wire.len() {
                return Err(DNSError::wire("truncated compression pointer"));
            }
            return Ok(pos + 2);
        }
        if prefix > 63 {
            return Err(DNSError::wire("reserved label type"));
        }
        pos += 1 + prefix as usize;
    }
}
