//! Basic usage example for the AIS client
//!
//! This example demonstrates how to:
//! - Configure a client with mutual-TLS credentials
//! - Request a signature over a document digest
//! - Inspect the outcome and the resolved signer
//!
//! Run with:
//! `AIS_CLAIMED_IDENTITY=<id> AIS_CLIENT_CERT=client.pem AIS_CA_CERT=ca.pem \
//!  cargo run --example basic_usage`

use ais_client::{AisClient, AisConfig, DocumentHash, SignOptions};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing for debug output
    tracing_subscriber::fmt::init();

    let claimed_identity =
        std::env::var("AIS_CLAIMED_IDENTITY").unwrap_or_else(|_| "ACME-ID".to_string());
    let client_cert =
        std::env::var("AIS_CLIENT_CERT").unwrap_or_else(|_| "client.pem".to_string());
    let ca_cert = std::env::var("AIS_CA_CERT").unwrap_or_else(|_| "ais-ca.pem".to_string());

    println!("Creating AIS client for {claimed_identity}...");
    let config = AisConfig::new(claimed_identity, client_cert, ca_cert);
    let mut client = AisClient::new(config)?;

    // Embed PAdES revocation information and a timestamp
    client.set_revocation_information("PADES");
    client.set_add_timestamp(true);

    // SHA-256 digest of the document, base64 encoded
    let hash = DocumentHash::new(
        "nQpX7Wl5MCq6PCrGOkT1jXU0fogLB9PjT5fAF90vUiE=",
        "http://www.w3.org/2001/04/xmlenc#sha256",
    );

    println!("Requesting signature...");
    if client.sign(&hash, &SignOptions::default()).await {
        println!("Signature created");
        println!("  subject:   {}", client.signer_subject());
        println!("  pseudonym: {}", client.signer_pseudonym());
        if let Some(signature) = client.last_signature() {
            println!("  signature: {} base64 chars", signature.len());
        }
    } else {
        println!("Signing failed");
        println!("  major:   {}", client.result_major());
        println!("  minor:   {}", client.result_minor());
        println!("  message: {}", client.result_message());
    }

    Ok(())
}
