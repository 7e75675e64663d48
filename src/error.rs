//! A dedicated error for everything that can go wrong with DNS data: wire
//! decoding, master-file text, transports, transaction verification.
use thiserror::Error;

/// A specific custom `Result` for all functions
pub type DNSResult<T> = Result<T, DNSError>;

#[derive(Debug, Error)]
pub enum DNSError {
    /// Truncated buffer, invalid compression pointer, name too long,
    /// rdlength mismatch, bad enum value, generic-syntax mismatch.
    #[error("malformed wire format: {0}")]
    MalformedWire(String),

    /// Wrong field count, unparseable numeric, bad escape, bad base encoding.
    #[error("malformed master file: {0}")]
    MalformedMasterFile(String),

    /// A registered type's decoder refuses input it cannot represent.
    #[error("unsupported record data: {0}")]
    Unsupported(String),

    /// Socket/TLS/HTTP failure, timeout, cancellation.
    #[error("transport failure: {0}")]
    Transport(String),

    /// TSIG or signature verification failure, with its DNS-level meaning.
    #[error("verification failure: {0}")]
    Verification(VerificationKind),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

impl DNSError {
    /// Helper to build a `MalformedWire` error from anything displayable.
    pub fn wire<T: std::fmt::Display>(msg: T) -> Self {
        DNSError::MalformedWire(msg.to_string())
    }

    /// Helper to build a `MalformedMasterFile` error.
    pub fn master<T: std::fmt::Display>(msg: T) -> Self {
        DNSError::MalformedMasterFile(msg.to_string())
    }
}

// enum conversion helpers built by dns_derive return String errors
impl From<String> for DNSError {
    fn from(err: String) -> Self {
        DNSError::MalformedWire(err)
    }
}

/// The TSIG/DNSSEC verification outcomes that carry a DNS-level rcode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum VerificationKind {
    #[error("MAC does not verify (BADSIG)")]
    BadSig,
    #[error("key is not known to the verifier (BADKEY)")]
    BadKey,
    #[error("signature outside the allowed time window (BADTIME)")]
    BadTime,
}

impl VerificationKind {
    /// The extended rcode mandated by RFC 8945 for each failure.
    pub fn rcode(&self) -> u16 {
        match self {
            VerificationKind::BadSig => 16,
            VerificationKind::BadKey => 17,
            VerificationKind::BadTime => 18,
        }
    }
}
