//! Response interpretation: outcome codes and signature payload extraction
//!
//! Interpretation never fails hard. A fault maps into the outcome fields,
//! a malformed response yields empty outcome fields, and a successful
//! response without a payload is a valid terminal state.

use crate::error::Result;
use crate::soap::{SoapReply, text_of};
use crate::types::{RESULT_MAJOR_SUCCESS, SignatureKind};
use base64::{Engine as _, engine::general_purpose::STANDARD};
use serde_json::Value;
use tracing::{debug, trace};

/// Outcome of one sign or timestamp call
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServiceOutcome {
    /// `ResultMajor` URI, or the fault code on a transport fault
    pub result_major: String,
    /// `ResultMinor` URI, or the fault message on a transport fault
    pub result_minor: String,
    /// Human-readable result message, if the service supplied one
    pub result_message: String,
    /// Whether `ResultMajor` equals the success URI exactly
    pub success: bool,
}

/// Interpreted reply: the outcome plus the raw signature payload, when one
/// was returned
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Interpretation {
    /// Outcome derived from the result tree or fault
    pub outcome: ServiceOutcome,
    /// Base64-normalized signature or timestamp token
    pub payload: Option<String>,
}

/// Interpret a SOAP reply for the given operation kind
pub fn interpret(kind: SignatureKind, reply: &SoapReply) -> Interpretation {
    match reply {
        SoapReply::Fault(fault) => {
            debug!("Service returned a fault: {}", fault.code);
            Interpretation {
                outcome: ServiceOutcome {
                    result_major: fault.code.clone(),
                    result_minor: fault.message.clone(),
                    result_message: String::new(),
                    success: false,
                },
                payload: None,
            }
        }
        SoapReply::Response(tree) => {
            let result_major = probe(tree, &["SignResponse", "Result", "ResultMajor"])
                .unwrap_or_default()
                .to_string();
            let result_minor = probe(tree, &["SignResponse", "Result", "ResultMinor"])
                .unwrap_or_default()
                .to_string();
            let result_message = probe(tree, &["SignResponse", "Result", "ResultMessage"])
                .unwrap_or_default()
                .to_string();

            let success = result_major == RESULT_MAJOR_SUCCESS;
            trace!("ResultMajor={result_major}, success={success}");

            let payload = if success {
                extract_payload(kind, tree).map(normalize_base64)
            } else {
                None
            };

            Interpretation {
                outcome: ServiceOutcome {
                    result_major,
                    result_minor,
                    result_message,
                    success,
                },
                payload,
            }
        }
    }
}

/// Locate the raw signature payload for the operation kind
fn extract_payload(kind: SignatureKind, tree: &Value) -> Option<&str> {
    match kind {
        SignatureKind::Cms => probe(tree, &["SignResponse", "SignatureObject", "Base64Signature"]),
        SignatureKind::Timestamp => probe(
            tree,
            &["SignResponse", "SignatureObject", "Timestamp", "RFC3161TimeStampToken"],
        ),
    }
}

/// Walk a path of element names and return the node's character content
fn probe<'a>(tree: &'a Value, path: &[&str]) -> Option<&'a str> {
    let mut node = tree;
    for segment in path {
        node = node.get(segment)?;
    }
    text_of(node).filter(|text| !text.is_empty())
}

/// Normalize a payload to canonical base64.
///
/// The service may return either base64 text or raw bytes for the same
/// logical field. A value that already decodes as base64 is kept
/// verbatim; anything else is encoded. Normalizing twice is a no-op.
pub(crate) fn normalize_base64(raw: &str) -> String {
    if STANDARD.decode(raw).is_ok() {
        raw.to_string()
    } else {
        STANDARD.encode(raw.as_bytes())
    }
}

/// Decode a normalized payload back to bytes
pub(crate) fn decode_payload(payload: &str) -> Result<Vec<u8>> {
    Ok(STANDARD.decode(payload)?)
}
