//! Type definitions and protocol constants for the AIS client

use std::fmt;

/// AIS signing profile URI
pub const PROFILE_URI: &str = "http://ais.swisscom.ch/1.0";

/// Additional profile requesting an on-demand signing certificate
pub const ON_DEMAND_PROFILE_URI: &str = "http://ais.swisscom.ch/1.0/profiles/ondemandcertificate";

/// Additional profile for DSS timestamping requests
pub const TIMESTAMPING_PROFILE_URI: &str = "urn:oasis:names:tc:dss:1.0:profiles:timestamping";

/// Mobile ID step-up authentication type URI
pub const MOBILE_ID_TYPE_URI: &str = "http://ais.swisscom.ch/1.0/auth/mobileid/1.0";

/// RFC 3161 timestamp token type URN
pub const TIMESTAMP_TOKEN_URN: &str = "urn:ietf:rfc:3161";

/// `ResultMajor` value the service returns on success
pub const RESULT_MAJOR_SUCCESS: &str = "urn:oasis:names:tc:dss:1.0:resultmajor:Success";

/// Default base URL of the signing service
pub const DEFAULT_BASE_URL: &str = "https://ais.swisscom.com";

/// Path of the signing endpoint below the base URL
pub const SERVICE_PATH: &str = "/AIS-Server/ws";

/// Connection timeout for the remote call, in seconds
pub const CONNECT_TIMEOUT_SECS: u64 = 10;

/// Document digest to be signed or timestamped
///
/// The digest value is carried as a base64 string; the algorithm is an
/// XML-DSIG algorithm URI such as
/// `http://www.w3.org/2001/04/xmlenc#sha256`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentHash {
    /// Base64-encoded digest value
    pub digest_value: String,
    /// Digest algorithm URI
    pub digest_algorithm: String,
}

impl DocumentHash {
    /// Create a new document hash
    pub fn new(digest_value: impl Into<String>, digest_algorithm: impl Into<String>) -> Self {
        Self {
            digest_value: digest_value.into(),
            digest_algorithm: digest_algorithm.into(),
        }
    }
}

/// Mobile ID step-up authentication challenge
///
/// The challenge is sent to the given MSISDN before the signature is
/// released. Active only when the MSISDN is non-empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MobileIdChallenge {
    /// Subscriber number to challenge, international format
    pub msisdn: String,
    /// Message displayed on the handset
    pub message: String,
    /// Two-letter language code for the challenge dialog
    pub language: String,
}

impl MobileIdChallenge {
    /// Create a challenge for the given MSISDN with the default message
    pub fn new(msisdn: impl Into<String>) -> Self {
        Self {
            msisdn: msisdn.into(),
            ..Self::default()
        }
    }

    /// Set the handset message
    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Set the dialog language
    #[must_use]
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }
}

impl Default for MobileIdChallenge {
    fn default() -> Self {
        Self {
            msisdn: String::new(),
            message: "Do you want to sign?".to_string(),
            language: "en".to_string(),
        }
    }
}

/// Optional inputs for a signature request
///
/// Each option contributes an independent block to the request; inactive
/// options contribute nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SignOptions {
    /// Distinguished name for an on-demand signing certificate.
    /// On-demand issuance is active iff this is non-empty.
    pub distinguished_name: String,
    /// Mobile ID step-up challenge. Active iff the MSISDN is non-empty.
    pub mobile_id: Option<MobileIdChallenge>,
}

impl SignOptions {
    /// Request an on-demand certificate for the given distinguished name
    #[must_use]
    pub fn with_on_demand_certificate(mut self, distinguished_name: impl Into<String>) -> Self {
        self.distinguished_name = distinguished_name.into();
        self
    }

    /// Gate the signature on a Mobile ID step-up challenge
    #[must_use]
    pub fn with_mobile_id(mut self, challenge: MobileIdChallenge) -> Self {
        self.mobile_id = Some(challenge);
        self
    }
}

/// Revocation information embedded alongside the signature, by format family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RevocationInformation {
    /// PAdES-style revocation information
    Pades,
    /// CAdES-style revocation information
    Cades,
    /// Both format families
    Both,
}

impl RevocationInformation {
    /// Parse a revocation-information label.
    ///
    /// Matching is case-sensitive on the exact uppercase labels; any other
    /// input (including lowercase spellings) selects no revocation
    /// information rather than an error.
    #[must_use]
    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "PADES" => Some(Self::Pades),
            "CADES" => Some(Self::Cades),
            "BOTH" => Some(Self::Both),
            _ => None,
        }
    }

    /// The wire label of this revocation-information type
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pades => "PADES",
            Self::Cades => "CADES",
            Self::Both => "BOTH",
        }
    }
}

impl fmt::Display for RevocationInformation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Kind of signature requested from the service
///
/// Selects the `SignatureType` URN in the request and the location of the
/// returned payload in the response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignatureKind {
    /// CMS signature (RFC 3369)
    Cms,
    /// RFC 3161 timestamp token
    Timestamp,
}

impl SignatureKind {
    /// The `SignatureType` URN sent in the request
    #[must_use]
    pub fn signature_type_urn(&self) -> &'static str {
        match self {
            SignatureKind::Cms => "urn:ietf:rfc:3369",
            SignatureKind::Timestamp => TIMESTAMP_TOKEN_URN,
        }
    }
}
