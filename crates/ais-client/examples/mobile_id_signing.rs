//! On-demand certificate signing gated by a Mobile ID challenge
//!
//! The service issues a short-lived signing certificate for the given
//! distinguished name after the subscriber confirms the challenge on
//! their handset. The resolved signer certificate then carries the
//! Mobile ID serial number as a `pseudonym` attribute.
//!
//! Run with:
//! `AIS_CLAIMED_IDENTITY=<id> AIS_MSISDN=+41791234567 cargo run --example mobile_id_signing`

use ais_client::{AisClient, AisConfig, DocumentHash, MobileIdChallenge, SignOptions};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let claimed_identity =
        std::env::var("AIS_CLAIMED_IDENTITY").unwrap_or_else(|_| "ACME-ID".to_string());
    let client_cert =
        std::env::var("AIS_CLIENT_CERT").unwrap_or_else(|_| "client.pem".to_string());
    let ca_cert = std::env::var("AIS_CA_CERT").unwrap_or_else(|_| "ais-ca.pem".to_string());
    let msisdn = std::env::var("AIS_MSISDN").unwrap_or_else(|_| "+41791234567".to_string());

    let config = AisConfig::new(claimed_identity, client_cert, ca_cert);
    let mut client = AisClient::new(config)?;

    let hash = DocumentHash::new(
        "nQpX7Wl5MCq6PCrGOkT1jXU0fogLB9PjT5fAF90vUiE=",
        "http://www.w3.org/2001/04/xmlenc#sha256",
    );
    let options = SignOptions::default()
        .with_on_demand_certificate("cn=Hans Muster,o=ACME,c=CH")
        .with_mobile_id(
            MobileIdChallenge::new(msisdn)
                .with_message("acme.ch: Sign the contract?")
                .with_language("de"),
        );

    println!("Waiting for the Mobile ID confirmation...");
    if client.sign(&hash, &options).await {
        println!("Signature released");
        println!("  subject:   {}", client.signer_subject());
        println!("  pseudonym: {}", client.signer_pseudonym());
    } else {
        println!(
            "Signing failed: {} {}",
            client.result_major(),
            client.result_minor()
        );
    }

    Ok(())
}
