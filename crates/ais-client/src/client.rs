//! Signing session against the AIS service
//!
//! [`AisClient`] owns the per-call configuration (revocation-information
//! mode, timestamp flag, base URL) and the results of the most recent
//! call. Every `sign`/`timestamp` call replaces the previous outcome,
//! signature and signer identity wholesale before anything else happens,
//! so a failed call never shows stale identity from an earlier one.
//!
//! Remote and parse failures are captured into the outcome state and
//! reported through the boolean return; only setup-time misconfiguration
//! is returned as an error, from [`AisClient::new`].

use crate::error::{Error, Result};
use crate::request;
use crate::response::{self, ServiceOutcome};
use crate::signer::{self, SignerIdentity};
use crate::transport::{HttpTransport, SoapTransport};
use crate::types::{
    DEFAULT_BASE_URL, DocumentHash, RevocationInformation, SERVICE_PATH, SignOptions,
    SignatureKind,
};
use serde_json::Value;
use std::path::PathBuf;
use tracing::{debug, instrument, warn};
use url::Url;
use x509_cert::certificate::Certificate;

/// Setup-time configuration for a signing session
#[derive(Debug, Clone)]
pub struct AisConfig {
    /// Customer identifier asserted as the claimed identity
    pub claimed_identity: String,
    /// PEM file with the client certificate and key for mutual TLS
    pub client_cert_path: PathBuf,
    /// PEM file with the CA certificate the server is verified against
    pub ca_cert_path: PathBuf,
    /// Base URL of the service
    pub base_url: Url,
}

impl AisConfig {
    /// Create a configuration with the default service base URL
    pub fn new(
        claimed_identity: impl Into<String>,
        client_cert_path: impl Into<PathBuf>,
        ca_cert_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            claimed_identity: claimed_identity.into(),
            client_cert_path: client_cert_path.into(),
            ca_cert_path: ca_cert_path.into(),
            base_url: default_base_url(),
        }
    }

    /// Override the service base URL
    #[must_use]
    pub fn with_base_url(mut self, base_url: Url) -> Self {
        self.base_url = base_url;
        self
    }
}

#[allow(clippy::expect_used)]
fn default_base_url() -> Url {
    Url::parse(DEFAULT_BASE_URL).expect("default base URL is valid")
}

/// Client session for the AIS signing service
///
/// # Example
///
/// ```no_run
/// use ais_client::{AisClient, AisConfig, DocumentHash, SignOptions};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = AisConfig::new("ACME-ID", "client.pem", "ais-ca.pem");
/// let mut client = AisClient::new(config)?;
///
/// let hash = DocumentHash::new(
///     "p1vImTtcYvKCgVGDfgAsp1tVVqA=",
///     "http://www.w3.org/2000/09/xmldsig#sha1",
/// );
/// if client.sign(&hash, &SignOptions::default()).await {
///     println!("signed by {}", client.signer_subject());
/// } else {
///     println!("failed: {}", client.result_major());
/// }
/// # Ok(())
/// # }
/// ```
pub struct AisClient {
    claimed_identity: String,
    base_url: Url,
    transport: Box<dyn SoapTransport>,
    revocation_information: Option<RevocationInformation>,
    add_timestamp: bool,
    outcome: ServiceOutcome,
    signature: Option<String>,
    identity: SignerIdentity,
}

impl std::fmt::Debug for AisClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AisClient")
            .field("claimed_identity", &self.claimed_identity)
            .field("base_url", &self.base_url)
            .field("transport", &"<dyn SoapTransport>")
            .field("revocation_information", &self.revocation_information)
            .field("add_timestamp", &self.add_timestamp)
            .field("outcome", &self.outcome)
            .field("signature", &self.signature)
            .field("identity", &self.identity)
            .finish()
    }
}

impl AisClient {
    /// Create a session over the default mutual-TLS HTTP transport.
    ///
    /// # Errors
    /// Fails when the credential or trust-anchor material is missing or
    /// unusable. Misconfiguration is fatal here, never deferred to the
    /// first call.
    pub fn new(config: AisConfig) -> Result<Self> {
        let transport = HttpTransport::new(&config.client_cert_path, &config.ca_cert_path)?;
        let mut client = Self::with_transport(transport, config.claimed_identity);
        client.set_base_url(config.base_url);
        Ok(client)
    }

    /// Create a session over a custom transport
    pub fn with_transport(
        transport: impl SoapTransport + 'static,
        claimed_identity: impl Into<String>,
    ) -> Self {
        Self {
            claimed_identity: claimed_identity.into(),
            base_url: default_base_url(),
            transport: Box::new(transport),
            revocation_information: None,
            add_timestamp: false,
            outcome: ServiceOutcome::default(),
            signature: None,
            identity: SignerIdentity::default(),
        }
    }

    /// Request a signature over the given digest.
    ///
    /// Returns `true` when the service reports success. Outcome, raw
    /// signature and signer identity are queryable afterwards; on failure
    /// the outcome fields carry the result or fault codes and the identity
    /// fields are empty.
    #[instrument(skip(self))]
    pub async fn sign(&mut self, hash: &DocumentHash, options: &SignOptions) -> bool {
        let request = request::build_sign_request(
            &self.claimed_identity,
            hash,
            options,
            self.add_timestamp,
            self.revocation_information,
        );
        self.execute(SignatureKind::Cms, request).await
    }

    /// Request an RFC 3161 timestamp over the given digest.
    ///
    /// Same result contract as [`sign`](Self::sign); timestamp calls carry
    /// no on-demand-certificate or Mobile ID options.
    #[instrument(skip(self))]
    pub async fn timestamp(&mut self, hash: &DocumentHash) -> bool {
        let request = request::build_timestamp_request(
            &self.claimed_identity,
            hash,
            self.add_timestamp,
            self.revocation_information,
        );
        self.execute(SignatureKind::Timestamp, request).await
    }

    async fn execute(&mut self, kind: SignatureKind, request: Value) -> bool {
        // Every call replaces the previous call's results wholesale.
        self.outcome = ServiceOutcome::default();
        self.signature = None;
        self.identity = SignerIdentity::default();

        let endpoint = match self.endpoint() {
            Ok(endpoint) => endpoint,
            Err(e) => {
                warn!("Invalid service endpoint: {e}");
                return false;
            }
        };

        let reply = match self.transport.call("sign", &request, &endpoint).await {
            Ok(reply) => reply,
            Err(e) => {
                warn!("Remote call failed: {e}");
                return false;
            }
        };

        let interpretation = response::interpret(kind, &reply);
        self.outcome = interpretation.outcome;
        if !self.outcome.success {
            debug!("Service reported failure: {}", self.outcome.result_major);
            return false;
        }

        if let Some(payload) = interpretation.payload {
            match signer::resolve(&payload) {
                Ok(identity) => self.identity = identity,
                // The signature itself stands; only the identity stays
                // unresolved.
                Err(e) => warn!("Signer certificate resolution failed: {e}"),
            }
            self.signature = Some(payload);
        }

        true
    }

    fn endpoint(&self) -> Result<Url> {
        self.base_url
            .join(SERVICE_PATH)
            .map_err(|e| Error::config(format!("invalid endpoint URL: {e}")))
    }

    /// Select the revocation information embedded alongside signatures.
    ///
    /// Matching is case-sensitive on the exact labels `PADES`, `CADES`
    /// and `BOTH`; any other label (including lowercase spellings)
    /// selects no revocation information.
    pub fn set_revocation_information(&mut self, label: &str) {
        self.revocation_information = RevocationInformation::from_label(label);
    }

    /// Enable or disable timestamping of signatures
    pub fn set_add_timestamp(&mut self, add_timestamp: bool) {
        self.add_timestamp = add_timestamp;
    }

    /// Set the base URL of the service
    pub fn set_base_url(&mut self, base_url: Url) {
        self.base_url = base_url;
    }

    /// The claimed identity sent with each request
    #[must_use]
    pub fn claimed_identity(&self) -> &str {
        &self.claimed_identity
    }

    /// The configured base URL
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// The currently selected revocation information
    #[must_use]
    pub fn revocation_information(&self) -> Option<RevocationInformation> {
        self.revocation_information
    }

    /// Whether signatures are timestamped
    #[must_use]
    pub fn add_timestamp(&self) -> bool {
        self.add_timestamp
    }

    /// Outcome of the most recent call
    #[must_use]
    pub fn outcome(&self) -> &ServiceOutcome {
        &self.outcome
    }

    /// `ResultMajor` of the most recent call, or the fault code
    #[must_use]
    pub fn result_major(&self) -> &str {
        &self.outcome.result_major
    }

    /// `ResultMinor` of the most recent call, or the fault message
    #[must_use]
    pub fn result_minor(&self) -> &str {
        &self.outcome.result_minor
    }

    /// Result message of the most recent call
    #[must_use]
    pub fn result_message(&self) -> &str {
        &self.outcome.result_message
    }

    /// Base64 signature or timestamp token of the most recent call
    #[must_use]
    pub fn last_signature(&self) -> Option<&str> {
        self.signature.as_deref()
    }

    /// Resolved signer certificate of the most recent call
    #[must_use]
    pub fn signer_certificate(&self) -> Option<&Certificate> {
        self.identity.certificate.as_ref()
    }

    /// Subject DN of the resolved signer certificate, empty if unresolved
    #[must_use]
    pub fn signer_subject(&self) -> &str {
        &self.identity.subject
    }

    /// Mobile ID pseudonym of the resolved signer certificate, empty if
    /// absent or unresolved
    #[must_use]
    pub fn signer_pseudonym(&self) -> &str {
        &self.identity.pseudonym
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::soap::SoapReply;
    use async_trait::async_trait;

    struct NeverCalled;

    #[async_trait]
    impl SoapTransport for NeverCalled {
        async fn call(&self, _: &str, _: &Value, _: &Url) -> Result<SoapReply> {
            panic!("transport must not be invoked by configuration tests");
        }
    }

    fn test_client() -> AisClient {
        AisClient::with_transport(NeverCalled, "ACME-ID")
    }

    #[test]
    fn test_session_defaults() {
        let client = test_client();
        assert_eq!(client.claimed_identity(), "ACME-ID");
        assert_eq!(client.base_url().as_str(), "https://ais.swisscom.com/");
        assert_eq!(client.revocation_information(), None);
        assert!(!client.add_timestamp());
        assert_eq!(client.result_major(), "");
        assert_eq!(client.result_minor(), "");
        assert_eq!(client.result_message(), "");
        assert!(client.last_signature().is_none());
        assert!(client.signer_certificate().is_none());
        assert_eq!(client.signer_subject(), "");
        assert_eq!(client.signer_pseudonym(), "");
    }

    #[test]
    fn test_revocation_information_setter_is_case_sensitive() {
        let mut client = test_client();

        client.set_revocation_information("PADES");
        assert_eq!(
            client.revocation_information(),
            Some(RevocationInformation::Pades)
        );

        // Lowercase labels silently select no revocation information.
        client.set_revocation_information("pades");
        assert_eq!(client.revocation_information(), None);

        client.set_revocation_information("BOTH");
        assert_eq!(
            client.revocation_information(),
            Some(RevocationInformation::Both)
        );

        client.set_revocation_information("");
        assert_eq!(client.revocation_information(), None);
    }

    #[test]
    fn test_configuration_setters() {
        let mut client = test_client();

        client.set_add_timestamp(true);
        assert!(client.add_timestamp());

        let url = Url::parse("https://ais.pre.swisscom.com").unwrap();
        client.set_base_url(url.clone());
        assert_eq!(client.base_url(), &url);
    }

    #[test]
    fn test_endpoint_is_service_path_below_base_url() {
        let client = test_client();
        assert_eq!(
            client.endpoint().unwrap().as_str(),
            "https://ais.swisscom.com/AIS-Server/ws"
        );
    }

    #[test]
    fn test_missing_credentials_fail_construction() {
        let config = AisConfig::new("ACME-ID", "/nonexistent/client.pem", "/nonexistent/ca.pem");
        let err = AisClient::new(config).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}
