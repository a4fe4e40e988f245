//! Trust anchor storage.

use crate::ParseError;
use std::collections::HashMap;
use x509_parser::prelude::*;

/// An immutable set of trust-anchor certificates.
///
/// Anchors are trusted unconditionally as supplied: they are never verified
/// against each other and are exempt from revocation checking. Lookup is by
/// raw DER-encoded subject name, so path building can resolve a
/// certificate's issuer in one map probe.
pub struct TrustStore {
    /// Map from raw DER-encoded subject name to DER-encoded certificates.
    certs_by_subject: HashMap<Vec<u8>, Vec<Vec<u8>>>,
    count: usize,
}

impl std::fmt::Debug for TrustStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TrustStore")
            .field("count", &self.count)
            .finish()
    }
}

impl TrustStore {
    /// Create an empty trust store. Legal, but every validation against it
    /// will fail at path building.
    pub fn new() -> Self {
        TrustStore {
            certs_by_subject: HashMap::new(),
            count: 0,
        }
    }

    /// Build a trust store from DER-encoded anchor certificates.
    pub fn from_der_certs(anchors: &[Vec<u8>]) -> Result<Self, ParseError> {
        let mut store = TrustStore::new();
        for der in anchors {
            store.add_der(der)?;
        }
        Ok(store)
    }

    /// Add a DER-encoded trust anchor.
    pub fn add_der(&mut self, der: &[u8]) -> Result<(), ParseError> {
        let (_, x509) = X509Certificate::from_der(der)
            .map_err(|e| ParseError::Certificate(e.to_string()))?;

        let subject_raw = x509.subject().as_raw().to_vec();
        self.certs_by_subject
            .entry(subject_raw)
            .or_default()
            .push(der.to_vec());
        self.count += 1;

        Ok(())
    }

    /// Find trusted certificates whose subject matches the given raw
    /// DER-encoded name. Multiple anchors may share a subject (re-keyed
    /// CAs), so all matches are returned.
    pub(crate) fn find_by_subject_raw(&self, subject_raw: &[u8]) -> Option<&Vec<Vec<u8>>> {
        self.certs_by_subject.get(subject_raw)
    }

    /// Number of anchors in the store.
    pub fn len(&self) -> usize {
        self.count
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Check if a DER-encoded certificate is one of the anchors.
    ///
    /// Matches by subject and raw DER content.
    pub fn contains(&self, der: &[u8]) -> bool {
        if let Ok((_, x509)) = X509Certificate::from_der(der) {
            if let Some(certs) = self.find_by_subject_raw(x509.subject().as_raw()) {
                return certs.iter().any(|c| c == der);
            }
        }
        false
    }
}

impl Default for TrustStore {
    fn default() -> Self {
        Self::new()
    }
}
