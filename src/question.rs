//! Question structure: https://datatracker.ietf.org/doc/html/rfc1035#section-4.1.2
use dns_derive::DnsStruct;

use crate::codes::{QClass, QType};
use crate::domain::{CompressionMap, DomainName};
use crate::error::DNSResult;
use crate::network_order::{FromNetworkOrder, ToNetworkOrder};

#[derive(Debug, Default, Clone, PartialEq, Eq, Hash, DnsStruct)]
pub struct DNSQuestion {
    pub name: DomainName,
    pub r#type: QType,
    pub class: QClass,
}

impl DNSQuestion {
    /// Create a new question. The IN class is used if None is provided as
    /// the qclass parameter.
    pub fn new(domain: &str, qtype: QType, qclass: Option<QClass>) -> DNSResult<Self> {
        let name = DomainName::try_from(domain)?;

        Ok(DNSQuestion {
            name,
            r#type: qtype,
            class: qclass.unwrap_or(QClass::IN),
        })
    }

    // Question names participate in message compression, so the message
    // encoder goes through this rather than the plain trait impl.
    pub(crate) fn to_wire(
        &self,
        buffer: &mut Vec<u8>,
        compress: Option<&mut CompressionMap>,
    ) -> DNSResult<usize> {
        let mut length = self.name.to_wire(buffer, compress, false)?;
        length += self.r#type.to_network_bytes(buffer)?;
        length += self.class.to_network_bytes(buffer)?;
        Ok(length)
    }
}

impl std::fmt::Display for DNSQuestion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {} {}", self.name, self.class, self.r#type)
    }
}
