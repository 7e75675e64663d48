//! DNS over HTTPS: one POST per query with the raw encoded message as the
//! body, no TCP length prefix, `application/dns-message` both ways. The
//! transaction id travels inside the message and is checked end-to-end.
use log::debug;
use reqwest::header::{ACCEPT, CONTENT_TYPE};

use crate::error::{DNSError, DNSResult};
use crate::transport::{cancelled_error, identify, CancelToken};

pub const DNS_MESSAGE_MIME: &str = "application/dns-message";

pub struct DohTransport {
    client: reqwest::Client,
    url: String,
}

impl DohTransport {
    pub fn new(url: impl Into<String>) -> DNSResult<Self> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| DNSError::Transport(format!("building HTTP client: {}", e)))?;
        Ok(DohTransport {
            client,
            url: url.into(),
        })
    }

    /// POST one encoded query and return the encoded response.
    pub async fn query(&self, wire: Vec<u8>, cancel: &CancelToken) -> DNSResult<Vec<u8>> {
        let request_id = identify(&wire)?.id;

        let exchange = async {
            let response = self
                .client
                .post(&self.url)
                .header(CONTENT_TYPE, DNS_MESSAGE_MIME)
                .header(ACCEPT, DNS_MESSAGE_MIME)
                .body(wire)
                .send()
                .await
                .map_err(|e| DNSError::Transport(format!("DoH request: {}", e)))?;

            if !response.status().is_success() {
                return Err(DNSError::Transport(format!(
                    "DoH server answered {}",
                    response.status()
                )));
            }

            let mime = response
                .headers()
                .get(CONTENT_TYPE)
                .and_then(|v| v.to_str().ok())
                .unwrap_or_default()
                .to_string();
            if !mime.starts_with(DNS_MESSAGE_MIME) {
                return Err(DNSError::Transport(format!(
                    "DoH response has content type '{}'",
                    mime
                )));
            }

            let bytes = response
                .bytes()
                .await
                .map_err(|e| DNSError::Transport(format!("DoH body: {}", e)))?;
            Ok(bytes.to_vec())
        };

        let bytes = tokio::select! {
            outcome = exchange => outcome?,
            _ = cancel.cancelled() => return Err(cancelled_error()),
        };

        // the id must survive the HTTP round trip untouched
        let response_id = identify(&bytes)?.id;
        if response_id != request_id {
            debug!("DoH id mismatch: sent {}, got {}", request_id, response_id);
            return Err(DNSError::Transport(format!(
                "DoH response id {} does not match query id {}",
                response_id, request_id
            )));
        }

        Ok(bytes)
    }
}
