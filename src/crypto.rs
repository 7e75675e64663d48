//! The crypto collaborator boundary. The codec consumes digests, HMACs and
//! signatures as opaque capabilities through [`CryptoProvider`]; it never
//! touches key formats or primitive internals.
//!
//! [`HmacSha2Provider`] is the implementation shipped with the crate. It
//! covers the SHA-2 family, which is what ZONEMD and the current TSIG
//! algorithms need; the legacy MD5/SHA-1 algorithms surface `Unsupported`
//! unless the caller installs a provider implementing them.
use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256, Sha384, Sha512};

use crate::domain::DomainName;
use crate::error::{DNSError, DNSResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DigestAlgorithm {
    Md5,
    Sha1,
    Sha256,
    Sha384,
    Sha512,
}

/// The TSIG HMAC algorithms, identified on the wire by an algorithm name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TsigAlgorithm {
    HmacMd5,
    HmacSha1,
    HmacSha256,
    HmacSha384,
    HmacSha512,
}

impl TsigAlgorithm {
    /// The algorithm name carried in TSIG rdata.
    pub fn name(&self) -> DomainName {
        let text = match self {
            TsigAlgorithm::HmacMd5 => "hmac-md5.sig-alg.reg.int.",
            TsigAlgorithm::HmacSha1 => "hmac-sha1.",
            TsigAlgorithm::HmacSha256 => "hmac-sha256.",
            TsigAlgorithm::HmacSha384 => "hmac-sha384.",
            TsigAlgorithm::HmacSha512 => "hmac-sha512.",
        };
        DomainName::try_from(text).expect("algorithm names are well-formed")
    }

    pub fn from_name(name: &DomainName) -> DNSResult<Self> {
        for algorithm in [
            TsigAlgorithm::HmacMd5,
            TsigAlgorithm::HmacSha1,
            TsigAlgorithm::HmacSha256,
            TsigAlgorithm::HmacSha384,
            TsigAlgorithm::HmacSha512,
        ] {
            if &algorithm.name() == name {
                return Ok(algorithm);
            }
        }
        Err(DNSError::Unsupported(format!(
            "TSIG algorithm '{}'",
            name
        )))
    }
}

/// Opaque digest/sign/verify capabilities consumed by ZONEMD, TSIG and the
/// DNSSEC-facing callers.
pub trait CryptoProvider: Send + Sync {
    fn digest(&self, algorithm: DigestAlgorithm, data: &[u8]) -> DNSResult<Vec<u8>>;

    fn hmac(&self, algorithm: TsigAlgorithm, key: &[u8], data: &[u8]) -> DNSResult<Vec<u8>>;

    /// Verify an RRSIG-style signature. `algorithm` is the DNSSEC
    /// algorithm number.
    fn verify(&self, algorithm: u8, key: &[u8], data: &[u8], signature: &[u8]) -> DNSResult<bool>;

    /// Produce an RRSIG-style signature.
    fn sign(&self, algorithm: u8, key: &[u8], data: &[u8]) -> DNSResult<Vec<u8>>;
}

/// The SHA-2-only provider shipped with the crate.
#[derive(Debug, Default, Clone, Copy)]
pub struct HmacSha2Provider;

impl CryptoProvider for HmacSha2Provider {
    fn digest(&self, algorithm: DigestAlgorithm, data: &[u8]) -> DNSResult<Vec<u8>> {
        match algorithm {
            DigestAlgorithm::Sha256 => Ok(Sha256::digest(data).to_vec()),
            DigestAlgorithm::Sha384 => Ok(Sha384::digest(data).to_vec()),
            DigestAlgorithm::Sha512 => Ok(Sha512::digest(data).to_vec()),
            other => Err(DNSError::Unsupported(format!(
                "digest algorithm {:?}",
                other
            ))),
        }
    }

    fn hmac(&self, algorithm: TsigAlgorithm, key: &[u8], data: &[u8]) -> DNSResult<Vec<u8>> {
        let bad_key = |_| DNSError::Unsupported("bad HMAC key".to_string());

        match algorithm {
            TsigAlgorithm::HmacSha256 => {
                let mut mac = Hmac::<Sha256>::new_from_slice(key).map_err(bad_key)?;
                mac.update(data);
                Ok(mac.finalize().into_bytes().to_vec())
            }
            TsigAlgorithm::HmacSha384 => {
                let mut mac = Hmac::<Sha384>::new_from_slice(key).map_err(bad_key)?;
                mac.update(data);
                Ok(mac.finalize().into_bytes().to_vec())
            }
            TsigAlgorithm::HmacSha512 => {
                let mut mac = Hmac::<Sha512>::new_from_slice(key).map_err(bad_key)?;
                mac.update(data);
                Ok(mac.finalize().into_bytes().to_vec())
            }
            other => Err(DNSError::Unsupported(format!(
                "TSIG algorithm {:?}",
                other
            ))),
        }
    }

    fn verify(&self, algorithm: u8, _key: &[u8], _data: &[u8], _signature: &[u8]) -> DNSResult<bool> {
        Err(DNSError::Unsupported(format!(
            "signature verification for algorithm {}",
            algorithm
        )))
    }

    fn sign(&self, algorithm: u8, _key: &[u8], _data: &[u8]) -> DNSResult<Vec<u8>> {
        Err(DNSError::Unsupported(format!(
            "signing for algorithm {}",
            algorithm
        )))
    }
}

/// Constant-time byte comparison for MAC checking. The running time
/// depends only on the lengths, never on where the inputs differ.
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut acc = 0u8;
    for (x, y) in a.iter().zip(b) {
        acc |= x ^ y;
    }
    acc == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sha256_digest() {
        // the well-known empty-input SHA-256
        let digest = HmacSha2Provider.digest(DigestAlgorithm::Sha256, b"").unwrap();
        assert_eq!(
            crate::base_encoding::base16_encode(&digest),
            "E3B0C44298FC1C149AFBF4C8996FB92427AE41E4649B934CA495991B7852B855"
        );
    }

    #[test]
    fn hmac_sha256_rfc4231_case_one() {
        let key = [0x0b; 20];
        let mac = HmacSha2Provider
            .hmac(TsigAlgorithm::HmacSha256, &key, b"Hi There")
            .unwrap();
        assert_eq!(
            crate::base_encoding::base16_encode(&mac),
            "B0344C61D8DB38535CA8AFCEAF0BF12B881DC200C9833DA726E9376C2E32CFF7"
        );
    }

    #[test]
    fn legacy_algorithms_unsupported() {
        assert!(HmacSha2Provider
            .digest(DigestAlgorithm::Md5, b"x")
            .is_err());
        assert!(HmacSha2Provider
            .hmac(TsigAlgorithm::HmacMd5, b"k", b"x")
            .is_err());
    }

    #[test]
    fn constant_time_comparison() {
        assert!(constant_time_eq(b"abcd", b"abcd"));
        assert!(!constant_time_eq(b"abcd", b"abce"));
        assert!(!constant_time_eq(b"abcd", b"abc"));
    }

    #[test]
    fn algorithm_names_roundtrip() {
        for algorithm in [
            TsigAlgorithm::HmacMd5,
            TsigAlgorithm::HmacSha1,
            TsigAlgorithm::HmacSha256,
            TsigAlgorithm::HmacSha384,
            TsigAlgorithm::HmacSha512,
        ] {
            assert_eq!(TsigAlgorithm::from_name(&algorithm.name()).unwrap(), algorithm);
        }
    }
}
