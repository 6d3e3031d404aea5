//! Request-tree construction for sign and timestamp calls
//!
//! A request is a nested tree (`serde_json::Value`) mirroring the DSS
//! `SignRequest` structure. The mandatory base tree is extended with one
//! subtree per active optional feature, merged by recursive structural
//! union in a fixed order: timestamp, on-demand certificate, Mobile ID
//! step-up, revocation information. Feature subtrees are disjoint at the
//! leaves, so the union never discards data; siblings contributed by
//! different features under the same parent (for example
//! `CertificateRequest`) coexist.
//!
//! Map keys prefixed with `@` render as XML attributes on the wire.

use crate::types::{
    DocumentHash, MOBILE_ID_TYPE_URI, MobileIdChallenge, ON_DEMAND_PROFILE_URI, PROFILE_URI,
    RevocationInformation, SignOptions, SignatureKind, TIMESTAMP_TOKEN_URN,
    TIMESTAMPING_PROFILE_URI,
};
use serde_json::{Value, json};

/// Build the full request tree for a signature call
pub fn build_sign_request(
    claimed_identity: &str,
    hash: &DocumentHash,
    options: &SignOptions,
    add_timestamp: bool,
    revocation: Option<RevocationInformation>,
) -> Value {
    let mut request = base_request(SignatureKind::Cms, claimed_identity, hash);

    if add_timestamp {
        merge(&mut request, timestamp_extension());
    }
    if !options.distinguished_name.is_empty() {
        merge(&mut request, on_demand_extension(&options.distinguished_name));
    }
    if let Some(challenge) = &options.mobile_id {
        if !challenge.msisdn.is_empty() {
            merge(&mut request, step_up_extension(challenge));
        }
    }
    if let Some(revocation) = revocation {
        merge(&mut request, revocation_extension(revocation));
    }

    request
}

/// Build the full request tree for a timestamp call
///
/// Timestamp calls carry no on-demand-certificate or Mobile ID options.
pub fn build_timestamp_request(
    claimed_identity: &str,
    hash: &DocumentHash,
    add_timestamp: bool,
    revocation: Option<RevocationInformation>,
) -> Value {
    let mut request = base_request(SignatureKind::Timestamp, claimed_identity, hash);

    if add_timestamp {
        merge(&mut request, timestamp_extension());
    }
    if let Some(revocation) = revocation {
        merge(&mut request, revocation_extension(revocation));
    }

    request
}

/// Mandatory base tree: transaction ID, profile, claimed identity,
/// signature type and the document digest
fn base_request(kind: SignatureKind, claimed_identity: &str, hash: &DocumentHash) -> Value {
    let mut optional_inputs = json!({
        "ClaimedIdentity": {
            "Name": claimed_identity,
        },
        "SignatureType": kind.signature_type_urn(),
    });
    if kind == SignatureKind::Timestamp {
        merge(
            &mut optional_inputs,
            json!({ "AdditionalProfile": TIMESTAMPING_PROFILE_URI }),
        );
    }

    json!({
        "SignRequest": {
            "RequestID": transaction_id(),
            "Profile": PROFILE_URI,
            "OptionalInputs": optional_inputs,
            "InputDocuments": {
                "DocumentHash": {
                    "DigestMethod": { "@Algorithm": hash.digest_algorithm },
                    "DigestValue": hash.digest_value,
                },
            },
        },
    })
}

/// Timestamp feature: request an RFC 3161 timestamp on the signature
fn timestamp_extension() -> Value {
    json!({
        "SignRequest": {
            "OptionalInputs": {
                "AddTimestamp": { "@Type": TIMESTAMP_TOKEN_URN },
            },
        },
    })
}

/// On-demand certificate feature: have the service issue a short-lived
/// signing certificate for the given distinguished name
fn on_demand_extension(distinguished_name: &str) -> Value {
    json!({
        "SignRequest": {
            "OptionalInputs": {
                "AdditionalProfile": ON_DEMAND_PROFILE_URI,
                "CertificateRequest": {
                    "DistinguishedName": distinguished_name,
                },
            },
        },
    })
}

/// Mobile ID step-up feature: gate the signature on an out-of-band
/// challenge to the subscriber's handset
fn step_up_extension(challenge: &MobileIdChallenge) -> Value {
    json!({
        "SignRequest": {
            "OptionalInputs": {
                "CertificateRequest": {
                    "StepUpAuthorisation": {
                        "MobileID": {
                            "@Type": MOBILE_ID_TYPE_URI,
                            "MSISDN": challenge.msisdn,
                            "Message": challenge.message,
                            "Language": challenge.language,
                        },
                    },
                },
            },
        },
    })
}

/// Revocation-information feature
fn revocation_extension(revocation: RevocationInformation) -> Value {
    json!({
        "SignRequest": {
            "OptionalInputs": {
                "AddRevocationInformation": { "@Type": revocation.as_str() },
            },
        },
    })
}

/// Recursive structural union of two request trees.
///
/// Maps union key-by-key, recursing on shared keys. Feature subtrees never
/// share a leaf key with the base or with each other, so a non-map
/// collision is a logic error; the later value wins, and debug builds
/// assert.
pub(crate) fn merge(accumulator: &mut Value, extension: Value) {
    match (accumulator, extension) {
        (Value::Object(accumulator), Value::Object(extension)) => {
            for (key, value) in extension {
                if let Some(existing) = accumulator.get_mut(&key) {
                    merge(existing, value);
                } else {
                    accumulator.insert(key, value);
                }
            }
        }
        (accumulator, extension) => {
            debug_assert!(
                false,
                "request extensions must not collide on leaf keys (got {extension})"
            );
            *accumulator = extension;
        }
    }
}

/// Create a unique transaction ID.
///
/// Random per call, safe under concurrent construction from independent
/// sessions; no shared counter.
fn transaction_id() -> String {
    format!(
        "AIS.RS.{}.{}",
        rand::random_range(10_000..=89_999u32),
        rand::random_range(1_000..=8_999u32)
    )
}
