//! Transport boundary for the remote signing service
//!
//! The service is invoked through [`SoapTransport`], which takes a request
//! tree and returns the decoded reply (body content or fault). The default
//! implementation posts SOAP 1.1 over HTTPS with mutual TLS: the client
//! authenticates with a PEM certificate/key pair and verifies the server
//! against a supplied trust anchor only — built-in roots are disabled and
//! there is no verification bypass.

use crate::error::{Error, Result};
use crate::soap::{self, SoapReply};
use crate::types::CONNECT_TIMEOUT_SECS;
use async_trait::async_trait;
use serde_json::Value;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, instrument, trace, warn};
use url::Url;

/// Remote call abstraction used by the signing session
#[async_trait]
pub trait SoapTransport: Send + Sync {
    /// Send one request to the given endpoint and decode the reply.
    ///
    /// # Errors
    /// Returns an error when the call fails below the SOAP layer (network,
    /// TLS, unparseable response). SOAP faults are a successful transport
    /// outcome and come back as [`SoapReply::Fault`].
    async fn call(&self, operation: &str, request: &Value, endpoint: &Url) -> Result<SoapReply>;
}

/// HTTPS transport with mutual TLS
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    /// Create a transport authenticating with the given PEM
    /// certificate/key pair and trusting only the given CA certificate.
    ///
    /// # Errors
    /// Fails immediately when either file is missing or not usable PEM
    /// material; misconfiguration is never deferred to the first call.
    pub fn new(client_cert_path: &Path, ca_cert_path: &Path) -> Result<Self> {
        let identity_pem = read_material(client_cert_path)?;
        let identity = reqwest::Identity::from_pem(&identity_pem).map_err(|e| {
            Error::config(format!(
                "unusable client certificate {}: {e}",
                client_cert_path.display()
            ))
        })?;

        let ca_pem = read_material(ca_cert_path)?;
        let trust_anchor = reqwest::Certificate::from_pem(&ca_pem).map_err(|e| {
            Error::config(format!(
                "unusable CA certificate {}: {e}",
                ca_cert_path.display()
            ))
        })?;

        let client = reqwest::Client::builder()
            .use_rustls_tls()
            .identity(identity)
            .add_root_certificate(trust_anchor)
            .tls_built_in_root_certs(false)
            .https_only(true)
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .build()?;

        Ok(Self { client })
    }

    /// Create a transport over a custom reqwest client
    #[must_use]
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl SoapTransport for HttpTransport {
    #[instrument(skip(self, request))]
    async fn call(&self, operation: &str, request: &Value, endpoint: &Url) -> Result<SoapReply> {
        let body = soap::envelope(request)?;
        trace!("SOAP request: {} bytes", body.len());

        let response = self
            .client
            .post(endpoint.clone())
            .header("Content-Type", "text/xml; charset=utf-8")
            .header("SOAPAction", format!("\"{operation}\""))
            .body(body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        debug!("Received {} bytes with status {status}", text.len());

        // Faults typically arrive with an HTTP error status and must still
        // be decoded; only give up on the status when there is no envelope.
        match soap::parse_envelope(&text) {
            Ok(reply) => Ok(reply),
            Err(_) if !status.is_success() => {
                warn!("HTTP {status} without a parseable envelope");
                Err(Error::UnexpectedStatus {
                    status: status.as_u16(),
                })
            }
            Err(error) => Err(error),
        }
    }
}

fn read_material(path: &Path) -> Result<Vec<u8>> {
    std::fs::read(path)
        .map_err(|e| Error::config(format!("file not found {}: {e}", path.display())))
}
