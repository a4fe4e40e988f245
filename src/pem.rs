//! PEM bundle parsing for caller-supplied bytes.
//!
//! The validator itself consumes DER; these helpers let collaborators that
//! hold PEM bundles (trust anchor files, CRL files) convert them without
//! pulling in another parser. No filesystem access happens here.

use crate::ParseError;
use x509_parser::prelude::*;

/// Parse a PEM bundle containing one or more certificates into individual
/// DER-encoded certificates.
pub fn parse_pem_certs(input: &[u8]) -> Result<Vec<Vec<u8>>, ParseError> {
    let mut certs = Vec::new();

    for pem_result in Pem::iter_from_buffer(input) {
        match pem_result {
            Ok(pem) => {
                if pem.label == "CERTIFICATE" || pem.label == "TRUSTED CERTIFICATE" {
                    certs.push(pem.contents);
                }
            }
            Err(e) => {
                // Trailing garbage after valid blocks is tolerated
                if !certs.is_empty() {
                    break;
                }
                return Err(ParseError::Pem(format!("failed to parse PEM: {}", e)));
            }
        }
    }

    if certs.is_empty() {
        return Err(ParseError::Pem("no certificates found in PEM input".into()));
    }

    Ok(certs)
}

/// Parse a PEM bundle containing one or more CRLs into DER-encoded CRLs.
pub fn parse_pem_crls(input: &[u8]) -> Result<Vec<Vec<u8>>, ParseError> {
    let mut crls = Vec::new();

    for pem_result in Pem::iter_from_buffer(input) {
        match pem_result {
            Ok(pem) => {
                if pem.label == "X509 CRL" {
                    crls.push(pem.contents);
                }
            }
            Err(e) => {
                if !crls.is_empty() {
                    break;
                }
                return Err(ParseError::Pem(format!("failed to parse CRL PEM: {}", e)));
            }
        }
    }

    if crls.is_empty() {
        return Err(ParseError::Pem("no CRLs found in PEM input".into()));
    }

    Ok(crls)
}
