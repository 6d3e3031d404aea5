//! Error types for the AIS client
//!
//! Setup-time problems (missing credential material, unreadable trust
//! anchors) surface as [`Error::Config`] from the constructors. Everything
//! that can go wrong during a `sign`/`timestamp` call is captured into the
//! session's outcome state instead of being returned to the caller; the
//! variants below are what the internal layers exchange.

use thiserror::Error;

/// Error types that can occur when using the AIS client
#[derive(Debug, Error)]
pub enum Error {
    /// Credential or trust-anchor material missing or unusable at setup
    #[error("configuration error: {0}")]
    Config(String),

    /// HTTP request failed at the transport layer
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Server answered with an HTTP error status and no parseable envelope
    #[error("unexpected HTTP status {status}")]
    UnexpectedStatus {
        /// The HTTP status code returned by the server
        status: u16,
    },

    /// XML reading or writing failed
    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// Response envelope is structurally not a SOAP message
    #[error("invalid SOAP envelope: {0}")]
    Envelope(String),

    /// Signature payload is not valid base64
    #[error("invalid base64 payload: {0}")]
    Base64(#[from] base64::DecodeError),

    /// ASN.1 decoding of the signature bundle failed
    #[error("ASN.1 parsing error: {0}")]
    Asn1(String),

    /// The signature bundle contained no usable certificate
    #[error("no certificate could be extracted from the signature")]
    NoSignerCertificate,
}

impl Error {
    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create an envelope error
    pub fn envelope(message: impl Into<String>) -> Self {
        Self::Envelope(message.into())
    }

    /// Create an ASN.1 error
    pub fn asn1(message: impl Into<String>) -> Self {
        Self::Asn1(message.into())
    }
}

/// Result type alias using the AIS client error type
pub type Result<T> = std::result::Result<T, Error>;
