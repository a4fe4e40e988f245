//! Small extraction and predicate helpers for certificate inspection.

use crate::oid;
use x509_parser::prelude::*;

/// Check if a certificate is self-issued (subject == issuer).
///
/// RFC 5280 Section 6.1: self-issued certificates do not count toward chain
/// depth or pathLenConstraint.
pub(crate) fn is_self_issued(cert: &X509Certificate) -> bool {
    cert.subject().as_raw() == cert.issuer().as_raw()
}

/// Check whether `now_ts` falls within the certificate's validity window.
pub(crate) fn is_time_valid(cert: &X509Certificate, now_ts: i64) -> bool {
    let not_before = cert.validity().not_before.timestamp();
    let not_after = cert.validity().not_after.timestamp();
    now_ts >= not_before && now_ts <= not_after
}

/// Check whether a certificate is marked as a CA via BasicConstraints.
///
/// A v3 certificate without BasicConstraints (or with CA:FALSE) may not
/// sign further links.
pub(crate) fn is_ca(cert: &X509Certificate) -> bool {
    cert.basic_constraints()
        .ok()
        .flatten()
        .map(|bc| bc.value.ca)
        .unwrap_or(false)
}

/// The certificate's pathLenConstraint, if BasicConstraints carries one.
pub(crate) fn path_len_constraint(cert: &X509Certificate) -> Option<u32> {
    cert.basic_constraints()
        .ok()
        .flatten()
        .and_then(|bc| bc.value.path_len_constraint)
}

/// Extract CRL Distribution Point URIs from the certificate's CRLDP
/// extension (RFC 5280 4.2.1.13). Only full-name URI entries are returned.
pub(crate) fn crl_distribution_uris(cert: &X509Certificate) -> Vec<String> {
    let mut uris = Vec::new();
    for ext in cert.extensions() {
        if let ParsedExtension::CRLDistributionPoints(points) = ext.parsed_extension() {
            for dp in points.points.iter() {
                if let Some(DistributionPointName::FullName(names)) = &dp.distribution_point {
                    for name in names {
                        if let GeneralName::URI(uri) = name {
                            uris.push(uri.to_string());
                        }
                    }
                }
            }
        }
    }
    uris
}

/// Extract OCSP responder URIs from the certificate's Authority Information
/// Access extension (RFC 5280 4.2.2.1).
pub(crate) fn ocsp_responder_uris(cert: &X509Certificate) -> Vec<String> {
    let mut uris = Vec::new();
    for ext in cert.extensions() {
        if let ParsedExtension::AuthorityInfoAccess(aia) = ext.parsed_extension() {
            for desc in &aia.accessdescs {
                if desc.access_method.to_id_string() == oid::AD_OCSP {
                    if let GeneralName::URI(uri) = &desc.access_location {
                        uris.push(uri.to_string());
                    }
                }
            }
        }
    }
    uris
}

/// The certificate subject as a display string.
pub(crate) fn subject_display(cert: &X509Certificate) -> String {
    cert.subject().to_string()
}

/// Serial number as colon-separated uppercase hex.
pub(crate) fn serial_hex(cert: &X509Certificate) -> String {
    cert.raw_serial()
        .iter()
        .map(|b| format!("{:02X}", b))
        .collect::<Vec<_>>()
        .join(":")
}
