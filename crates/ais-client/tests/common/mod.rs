//! Shared test fixtures: certificates and CMS bundles built in process
//!
//! Nothing here produces cryptographically valid signatures — the client
//! never verifies them. The fixtures only need structurally valid DER so
//! that certificate extraction and selection can be exercised.

// Not every test binary uses every fixture.
#![allow(dead_code)]

use base64::{Engine as _, engine::general_purpose::STANDARD};
use cms::builder::SignedDataBuilder;
use cms::cert::CertificateChoices;
use cms::signed_data::EncapsulatedContentInfo;
use der::asn1::{BitString, ObjectIdentifier, OctetString, UtcTime, Utf8StringRef};
use der::{Any, Encode};
use std::time::Duration;
use x509_cert::attr::AttributeTypeAndValue;
use x509_cert::certificate::{Certificate, TbsCertificate, Version};
use x509_cert::ext::Extension;
use x509_cert::ext::pkix::SubjectAltName;
use x509_cert::ext::pkix::name::GeneralName;
use x509_cert::name::{Name, RdnSequence, RelativeDistinguishedName};
use x509_cert::serial_number::SerialNumber;
use x509_cert::spki::{AlgorithmIdentifierOwned, SubjectPublicKeyInfoOwned};
use x509_cert::time::{Time, Validity};

/// id-data
const ID_DATA: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.840.113549.1.7.1");
/// rsaEncryption
const ID_RSA_ENCRYPTION: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.840.113549.1.1.1");
/// id-ce-subjectAltName
const ID_SUBJECT_ALT_NAME: ObjectIdentifier = ObjectIdentifier::new_unwrap("2.5.29.17");

/// commonName
pub const OID_CN: ObjectIdentifier = ObjectIdentifier::new_unwrap("2.5.4.3");
/// serialNumber
pub const OID_SERIAL_NUMBER: ObjectIdentifier = ObjectIdentifier::new_unwrap("2.5.4.5");
/// name
pub const OID_NAME: ObjectIdentifier = ObjectIdentifier::new_unwrap("2.5.4.41");
/// pseudonym
pub const OID_PSEUDONYM: ObjectIdentifier = ObjectIdentifier::new_unwrap("2.5.4.65");

/// Build a name from attribute pairs, one single-attribute RDN per pair
pub fn directory_name(pairs: &[(ObjectIdentifier, &str)]) -> Name {
    let mut rdns = Vec::new();
    for (oid, value) in pairs {
        let attribute = AttributeTypeAndValue {
            oid: *oid,
            value: Any::from(Utf8StringRef::new(value).expect("fixture attribute value")),
        };
        rdns.push(
            RelativeDistinguishedName::try_from(vec![attribute]).expect("fixture attribute set"),
        );
    }
    RdnSequence(rdns)
}

/// Build a certificate with the given subject CN, serial and `notAfter`
pub fn certificate(subject_cn: &str, serial: u8, not_after_secs: u64) -> Certificate {
    certificate_with_extensions(subject_cn, serial, not_after_secs, None)
}

/// Build a certificate whose subjectAltName is a directory name with the
/// given attribute pairs
pub fn certificate_with_san(
    subject_cn: &str,
    serial: u8,
    not_after_secs: u64,
    san_pairs: &[(ObjectIdentifier, &str)],
) -> Certificate {
    let san = SubjectAltName(vec![GeneralName::DirectoryName(directory_name(san_pairs))]);
    let extension = Extension {
        extn_id: ID_SUBJECT_ALT_NAME,
        critical: false,
        extn_value: OctetString::new(san.to_der().expect("fixture SAN encoding"))
            .expect("fixture SAN octets"),
    };
    certificate_with_extensions(subject_cn, serial, not_after_secs, Some(vec![extension]))
}

fn certificate_with_extensions(
    subject_cn: &str,
    serial: u8,
    not_after_secs: u64,
    extensions: Option<Vec<Extension>>,
) -> Certificate {
    let tbs_certificate = TbsCertificate {
        version: Version::V3,
        serial_number: SerialNumber::new(&[serial]).expect("fixture serial"),
        signature: signature_algorithm(),
        issuer: directory_name(&[(OID_CN, "Fixture Issuing CA")]),
        validity: Validity {
            not_before: unix_time(1_600_000_000),
            not_after: unix_time(not_after_secs),
        },
        subject: directory_name(&[(OID_CN, subject_cn)]),
        subject_public_key_info: dummy_public_key(),
        issuer_unique_id: None,
        subject_unique_id: None,
        extensions,
    };

    Certificate {
        tbs_certificate,
        signature_algorithm: signature_algorithm(),
        signature: BitString::from_bytes(&[0u8; 16]).expect("fixture signature bits"),
    }
}

fn signature_algorithm() -> AlgorithmIdentifierOwned {
    AlgorithmIdentifierOwned {
        oid: ID_RSA_ENCRYPTION,
        parameters: None,
    }
}

fn dummy_public_key() -> SubjectPublicKeyInfoOwned {
    SubjectPublicKeyInfoOwned {
        algorithm: signature_algorithm(),
        subject_public_key: BitString::from_bytes(&[0u8; 32]).expect("fixture key bits"),
    }
}

fn unix_time(secs: u64) -> Time {
    Time::UtcTime(UtcTime::from_unix_duration(Duration::from_secs(secs)).expect("fixture time"))
}

/// Wrap certificates in a degenerate certs-only CMS `SignedData` blob and
/// return it base64-encoded, the way the service delivers signatures.
///
/// Note that the `certificates` field is a SET OF, so bundle order is the
/// DER ordering of the encoded certificates, not insertion order.
pub fn cms_bundle(certificates: Vec<Certificate>) -> String {
    let mut builder = SignedDataBuilder::new(&EncapsulatedContentInfo {
        econtent_type: ID_DATA,
        econtent: None,
    });
    for certificate in certificates {
        builder
            .add_certificate(CertificateChoices::Certificate(certificate))
            .expect("fixture certificate");
    }
    let content_info = builder.build().expect("fixture SignedData");
    STANDARD.encode(content_info.to_der().expect("fixture ContentInfo encoding"))
}
