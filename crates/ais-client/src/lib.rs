//! Client for the Swisscom All-in Signing Service (AIS)
//!
//! This crate asks the remote signing service to produce a CMS signature
//! or an RFC 3161 timestamp over a document digest, optionally gated by a
//! Mobile ID step-up challenge, and then resolves which certificate in
//! the returned PKCS#7 bundle actually signed the result.
//!
//! Remote and protocol failures are captured into the session's outcome
//! state — `sign`/`timestamp` return a boolean and the details stay
//! queryable on the session. Only setup-time misconfiguration (missing
//! credential or trust-anchor material) is a hard error.
//!
//! # Example
//!
//! ```no_run
//! use ais_client::{AisClient, AisConfig, DocumentHash, MobileIdChallenge, SignOptions};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = AisConfig::new("ACME-ID", "client.pem", "ais-ca.pem");
//!     let mut client = AisClient::new(config)?;
//!     client.set_revocation_information("PADES");
//!
//!     let hash = DocumentHash::new(
//!         "p1vImTtcYvKCgVGDfgAsp1tVVqA=",
//!         "http://www.w3.org/2000/09/xmldsig#sha1",
//!     );
//!     let options = SignOptions::default()
//!         .with_on_demand_certificate("cn=Hans Muster,o=ACME,c=CH")
//!         .with_mobile_id(MobileIdChallenge::new("+41791234567"));
//!
//!     if client.sign(&hash, &options).await {
//!         println!("subject:   {}", client.signer_subject());
//!         println!("pseudonym: {}", client.signer_pseudonym());
//!     } else {
//!         println!("failed: {} {}", client.result_major(), client.result_minor());
//!     }
//!     Ok(())
//! }
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(missing_docs)]
#![allow(clippy::module_name_repetitions)]

pub mod client;
pub mod error;
pub mod request;
pub mod response;
pub mod signer;
pub mod soap;
pub mod transport;
pub mod types;

pub use client::{AisClient, AisConfig};
pub use error::{Error, Result};
pub use response::ServiceOutcome;
pub use signer::SignerIdentity;
pub use soap::{SoapFault, SoapReply};
pub use transport::{HttpTransport, SoapTransport};
pub use types::{
    DocumentHash, MobileIdChallenge, RevocationInformation, SignOptions, SignatureKind,
};
