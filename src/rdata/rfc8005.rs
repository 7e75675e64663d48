//! HIP: a host identity tag, its public key, and optional rendezvous
//! servers.
use std::fmt;

use crate::base_encoding::{base16_decode, base16_encode, base64_decode, base64_encode};
use crate::domain::DomainName;
use crate::error::{DNSError, DNSResult};
use crate::rdata::codec::{MasterFields, RDataDecoder, RDataEncoder};
use crate::rdata::RecordData;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HIP {
    pub pk_algorithm: u8,
    pub hit: Vec<u8>,
    pub public_key: Vec<u8>,
    pub rendezvous_servers: Vec<DomainName>,
}

impl RecordData for HIP {
    fn from_wire(decoder: &mut RDataDecoder) -> DNSResult<Self> {
        let hit_length = decoder.read_u8()? as usize;
        let pk_algorithm = decoder.read_u8()?;
        let pk_length = decoder.read_u16()? as usize;
        // both lengths come from the wire and are checked against the
        // window before anything is copied
        let hit = decoder.read_bytes(hit_length, "HIT")?;
        let public_key = decoder.read_bytes(pk_length, "public key")?;

        let mut rendezvous_servers = Vec::new();
        while decoder.remaining() > 0 {
            rendezvous_servers.push(decoder.read_name()?);
        }

        Ok(HIP {
            pk_algorithm,
            hit,
            public_key,
            rendezvous_servers,
        })
    }

    fn to_wire(&self, encoder: &mut RDataEncoder) -> DNSResult<usize> {
        if self.hit.len() > 255 || self.public_key.len() > u16::MAX as usize {
            return Err(DNSError::Unsupported("HIP field too long".to_string()));
        }
        let mut length = encoder.write_u8(self.hit.len() as u8);
        length += encoder.write_u8(self.pk_algorithm);
        length += encoder.write_u16(self.public_key.len() as u16);
        length += encoder.write_bytes(&self.hit);
        length += encoder.write_bytes(&self.public_key);
        for server in &self.rendezvous_servers {
            length += encoder.write_name(server, false)?;
        }
        Ok(length)
    }

    fn from_master(fields: &mut MasterFields, origin: Option<&DomainName>) -> DNSResult<Self> {
        let pk_algorithm = fields.parse("algorithm")?;
        let hit = base16_decode(fields.next_str("HIT")?)?;
        let public_key = base64_decode(fields.next_str("public key")?)?;

        let mut rendezvous_servers = Vec::new();
        while !fields.is_empty() {
            rendezvous_servers.push(fields.next_name("rendezvous server", origin)?);
        }

        Ok(HIP {
            pk_algorithm,
            hit,
            public_key,
            rendezvous_servers,
        })
    }

    fn max_length(&self) -> usize {
        4 + self.hit.len()
            + self.public_key.len()
            + self
                .rendezvous_servers
                .iter()
                .map(DomainName::encoded_len)
                .sum::<usize>()
    }
}

impl fmt::Display for HIP {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {}",
            self.pk_algorithm,
            base16_encode(&self.hit),
            base64_encode(&self.public_key)
        )?;
        for server in &self.rendezvous_servers {
            write!(f, " {}", server)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rdata::test_helpers::{master_roundtrip, wire_roundtrip};

    #[test]
    fn hip_roundtrip() {
        let hip = HIP {
            pk_algorithm: 2,
            hit: base16_decode("200100107B1A74DF365639CC39F1D578").unwrap(),
            public_key: vec![0x03, 0x01, 0x00, 0x01],
            rendezvous_servers: vec![
                DomainName::try_from("rvs1.example.com.").unwrap(),
                DomainName::try_from("rvs2.example.com.").unwrap(),
            ],
        };
        wire_roundtrip(&hip);
        master_roundtrip(&hip);
    }

    #[test]
    fn truncated_lengths_rejected() {
        // hit-length of 16 with only 2 octets present
        let bytes = [16u8, 2, 0, 4, 0xAA, 0xBB];
        assert!(crate::rdata::test_helpers::decode_bytes::<HIP>(&bytes).is_err());
    }
}
