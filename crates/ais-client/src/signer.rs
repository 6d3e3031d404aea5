//! Signer certificate resolution from PKCS#7/CMS signature payloads
//!
//! The service returns the signature as a base64-encoded CMS `SignedData`
//! blob (the body of a PEM-armored PKCS#7 structure) that bundles the
//! signer's certificate together with any CA/chain certificates. This
//! module structurally extracts the embedded certificates with the cms
//! crate — no temporary files, no external tools, and no signature
//! verification — and selects the signer's own certificate among them.
//!
//! Selection is a heuristic: the certificate with the earliest `notAfter`
//! wins, ties going to the first one in bundle order. On-demand signing
//! certificates are short-lived, so the shortest-lived certificate in the
//! bundle stands in for "the leaf signer certificate". This is not a
//! substitute for proper signer identification by chain building, but it
//! is the behavior downstream consumers depend on.

use crate::error::{Error, Result};
use crate::response::decode_payload;
use cms::cert::CertificateChoices;
use cms::content_info::ContentInfo;
use cms::signed_data::SignedData;
use der::asn1::ObjectIdentifier;
use der::{Decode, Encode, Tag, Tagged};
use std::time::SystemTime;
use tracing::{debug, trace, warn};
use x509_cert::certificate::Certificate;
use x509_cert::ext::pkix::SubjectAltName;
use x509_cert::ext::pkix::name::GeneralName;
use x509_cert::name::Name;

/// SignedData content type, 1.2.840.113549.1.7.2
const ID_SIGNED_DATA: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.840.113549.1.7.2");

/// subjectAltName extension, 2.5.29.17
const ID_SUBJECT_ALT_NAME: ObjectIdentifier = ObjectIdentifier::new_unwrap("2.5.29.17");

/// Attribute key carrying the Mobile ID serial number in the SAN
const PSEUDONYM_KEY: &str = "pseudonym = ";

/// Identity attributes of the resolved signer certificate
#[derive(Debug, Clone, Default)]
pub struct SignerIdentity {
    /// The selected certificate
    pub certificate: Option<Certificate>,
    /// Subject distinguished name of the selected certificate
    pub subject: String,
    /// `pseudonym` attribute from the subjectAltName extension, empty if
    /// absent
    pub pseudonym: String,
}

/// Resolve the signer certificate from a base64-encoded CMS signature.
///
/// # Errors
/// Returns an error if the payload is not valid base64, is not a CMS
/// `SignedData` structure, or carries no decodable certificate. A missing
/// subjectAltName extension or `pseudonym` attribute is not an error.
pub fn resolve(signature_b64: &str) -> Result<SignerIdentity> {
    let signature_bytes = decode_payload(signature_b64)?;
    trace!("Resolving signer from {} bytes of CMS data", signature_bytes.len());

    let certificates = extract_certificates(&signature_bytes)?;
    debug!("Found {} certificates in the bundle", certificates.len());

    let certificate = select_signer(&certificates)
        .cloned()
        .ok_or(Error::NoSignerCertificate)?;

    let subject = certificate.tbs_certificate.subject.to_string();
    let pseudonym = subject_alt_name_text(&certificate)
        .map(|text| pseudonym_from_san(&text))
        .unwrap_or_default();

    debug!("Selected signer: subject={subject}, pseudonym={pseudonym}");
    Ok(SignerIdentity {
        certificate: Some(certificate),
        subject,
        pseudonym,
    })
}

/// Extract the embedded certificate chain from a CMS `SignedData` blob.
///
/// Purely structural: the `certificates` field is read in bundle order,
/// non-X.509 entries are skipped, and no signature is verified.
fn extract_certificates(signature_bytes: &[u8]) -> Result<Vec<Certificate>> {
    let content_info = ContentInfo::from_der(signature_bytes)
        .map_err(|e| Error::asn1(format!("failed to parse ContentInfo: {e}")))?;

    if content_info.content_type != ID_SIGNED_DATA {
        return Err(Error::asn1(format!(
            "content type {} is not SignedData",
            content_info.content_type
        )));
    }

    let signed_data_bytes = content_info
        .content
        .to_der()
        .map_err(|e| Error::asn1(format!("failed to encode content: {e}")))?;
    let signed_data = SignedData::from_der(&signed_data_bytes)
        .map_err(|e| Error::asn1(format!("failed to parse SignedData: {e}")))?;

    let mut certificates = Vec::new();
    if let Some(certificate_set) = &signed_data.certificates {
        for (index, choice) in certificate_set.0.iter().enumerate() {
            match choice {
                CertificateChoices::Certificate(certificate) => {
                    certificates.push(certificate.clone());
                }
                CertificateChoices::Other(_) => {
                    trace!("Skipping non-X.509 certificate entry {index}");
                }
            }
        }
    }

    Ok(certificates)
}

/// Select the certificate with the earliest `notAfter`; ties go to the
/// first one in bundle order.
fn select_signer(certificates: &[Certificate]) -> Option<&Certificate> {
    let mut selected: Option<(&Certificate, SystemTime)> = None;

    for certificate in certificates {
        let not_after = certificate
            .tbs_certificate
            .validity
            .not_after
            .to_system_time();
        match selected {
            Some((_, best)) if not_after >= best => {}
            _ => selected = Some((certificate, not_after)),
        }
    }

    selected.map(|(certificate, _)| certificate)
}

/// Render the subjectAltName extension to its text form, if present
fn subject_alt_name_text(certificate: &Certificate) -> Option<String> {
    let extensions = certificate.tbs_certificate.extensions.as_ref()?;
    let extension = extensions
        .iter()
        .find(|extension| extension.extn_id == ID_SUBJECT_ALT_NAME)?;

    match SubjectAltName::from_der(extension.extn_value.as_bytes()) {
        Ok(san) => Some(render_general_names(&san.0)),
        Err(e) => {
            warn!("Failed to decode subjectAltName extension: {e}");
            None
        }
    }
}

/// Render general names the way command-line tooling prints them, e.g.
/// `DirName: serialNumber = X, name = Y, pseudonym = Z`
///
/// Only directory-name entries carry the attributes this client cares
/// about; other name forms are skipped.
fn render_general_names(names: &[GeneralName]) -> String {
    let mut entries = Vec::new();
    for name in names {
        match name {
            GeneralName::DirectoryName(directory) => {
                entries.push(format!("DirName: {}", directory_name_pairs(directory)));
            }
            GeneralName::RegisteredId(oid) => entries.push(format!("RID:{oid}")),
            other => {
                trace!("Ignoring subjectAltName entry without attributes: {other:?}");
            }
        }
    }
    entries.join(", ")
}

/// Render a directory name as `key = value` pairs joined by `, `
fn directory_name_pairs(name: &Name) -> String {
    let mut pairs = Vec::new();
    for rdn in name.0.iter() {
        for attribute in rdn.0.iter() {
            pairs.push(format!(
                "{} = {}",
                attribute_key(&attribute.oid),
                attribute_value(&attribute.value)
            ));
        }
    }
    pairs.join(", ")
}

/// Scan a rendered subjectAltName for the `pseudonym` attribute.
///
/// The text is a loosely structured `, `-separated list of `key = value`
/// pairs; the key token is matched case-sensitively and the last match
/// wins. No match yields an empty string.
pub(crate) fn pseudonym_from_san(text: &str) -> String {
    let mut pseudonym = String::new();
    for token in text.split(", ") {
        if let Some(position) = token.find(PSEUDONYM_KEY) {
            pseudonym = token[position + PSEUDONYM_KEY.len()..].to_string();
        }
    }
    pseudonym
}

/// Convert a directory-name attribute OID to its conventional short name
fn attribute_key(oid: &ObjectIdentifier) -> String {
    match oid.to_string().as_str() {
        "2.5.4.3" => "CN".to_string(),
        "2.5.4.5" => "serialNumber".to_string(),
        "2.5.4.6" => "C".to_string(),
        "2.5.4.7" => "L".to_string(),
        "2.5.4.8" => "ST".to_string(),
        "2.5.4.10" => "O".to_string(),
        "2.5.4.11" => "OU".to_string(),
        "2.5.4.13" => "description".to_string(),
        "2.5.4.41" => "name".to_string(),
        "2.5.4.65" => "pseudonym".to_string(),
        _ => oid.to_string(),
    }
}

/// Decode an attribute value as a directory string.
///
/// The content octets of the directory string types are the character
/// data itself; anything else is rendered as hex.
fn attribute_value(value: &der::Any) -> String {
    match value.tag() {
        Tag::Utf8String | Tag::PrintableString | Tag::Ia5String | Tag::TeletexString => {
            String::from_utf8_lossy(value.value()).into_owned()
        }
        _ => value.value().iter().map(|byte| format!("{byte:02X}")).collect(),
    }
}
