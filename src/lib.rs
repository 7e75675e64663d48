//! dnswire: a DNS wire-format codec and record-type library.
//!
//! The crate decomposes leaves-first: primitive big-endian codecs, domain
//! names with compression and canonical ordering, the record envelope and
//! its registry of typed rdata, whole messages, the textual (master-file)
//! and RFC 8427 JSON representations, TSIG transaction signatures, and
//! the transports that move encoded messages over UDP, TCP, TLS, HTTPS
//! and multicast.
//!
//! Records and names are immutable once built and safe to share across
//! threads. Decoders never panic on hostile input; every parse failure is
//! a [`error::DNSError`] value.

pub mod base_encoding;
pub mod charstring;
pub mod codes;
pub mod crypto;
pub mod domain;
pub mod error;
pub mod header;
pub mod json;
pub mod macros;
pub mod master;
pub mod message;
pub mod network_order;
pub mod question;
pub mod rdata;
pub mod resource_record;
pub mod tsig;
pub mod transport;
pub mod util;

pub use codes::{QClass, QType};
pub use domain::{CompressionMap, DomainName, Label};
pub use error::{DNSError, DNSResult};
pub use message::DNSMessage;
pub use question::DNSQuestion;
pub use rdata::RData;
pub use resource_record::DNSResourceRecord;
