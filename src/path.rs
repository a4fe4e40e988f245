//! Certification path construction via DFS with backtracking.
//!
//! Candidates may arrive unordered and may include extraneous certificates;
//! the first candidate is the leaf to validate, the rest form an untrusted
//! intermediate pool. The builder searches for a chain from the leaf to a
//! trust anchor where every link satisfies issuer/subject name linkage,
//! signature validity, validity-period containment, and CA basic
//! constraints (including pathLenConstraint). The search is local, offline,
//! and deterministic.

use crate::helpers::{is_ca, is_self_issued, is_time_valid, path_len_constraint};
use crate::trust::TrustStore;
use crate::PathBuildingError;
use log::{debug, trace};
use x509_parser::prelude::*;

/// Maximum path depth, to bound the search on cross-signed pools.
pub(crate) const MAX_PATH_DEPTH: usize = 32;

/// An ordered certification path from leaf to trust anchor.
///
/// The anchor is the last element. Constructed fresh per validation call
/// and not retained by the validator.
#[derive(Debug, Clone)]
pub struct CertificationPath {
    ders: Vec<Vec<u8>>,
}

impl CertificationPath {
    /// DER-encoded certificates, leaf first, anchor last.
    pub fn certs(&self) -> &[Vec<u8>] {
        &self.ders
    }

    /// Number of certificates in the path, anchor included.
    pub fn len(&self) -> usize {
        self.ders.len()
    }

    /// A path always holds at least the anchor.
    pub fn is_empty(&self) -> bool {
        self.ders.is_empty()
    }
}

/// Build a certification path from the candidate set to a trust anchor.
///
/// The first candidate is the leaf; remaining candidates are eligible
/// intermediates. Malformed intermediates are skipped (extraneous garbage
/// in a supplied bundle must not break validation), but a malformed leaf is
/// an error.
pub(crate) fn build_path(
    candidates: &[Vec<u8>],
    trust_store: &TrustStore,
    now_ts: i64,
) -> Result<CertificationPath, PathBuildingError> {
    let Some((leaf_der, rest)) = candidates.split_first() else {
        return Err(PathBuildingError::EmptyInput);
    };

    let (_, leaf) = X509Certificate::from_der(leaf_der).map_err(|e| {
        PathBuildingError::MalformedCandidate {
            position: 0,
            detail: e.to_string(),
        }
    })?;

    if !is_time_valid(&leaf, now_ts) {
        debug!("leaf certificate {} is outside its validity period", leaf.subject());
        return Err(PathBuildingError::NoValidPath);
    }

    let pool: Vec<(&[u8], X509Certificate)> = rest
        .iter()
        .filter_map(|der| {
            match X509Certificate::from_der(der) {
                Ok((_, cert)) => Some((der.as_slice(), cert)),
                Err(e) => {
                    debug!("skipping unparseable intermediate candidate: {}", e);
                    None
                }
            }
        })
        .collect();

    let mut chain_ders = vec![leaf_der.clone()];
    let mut chain_certs = vec![leaf.clone()];
    let mut used = vec![false; pool.len()];

    if dfs_build(
        &leaf,
        &mut chain_ders,
        &mut chain_certs,
        &mut used,
        &pool,
        trust_store,
        now_ts,
    ) {
        debug!(
            "built certification path of length {} for {}",
            chain_ders.len(),
            leaf.subject()
        );
        return Ok(CertificationPath { ders: chain_ders });
    }

    debug!("no certification path found for {}", leaf.subject());
    Err(PathBuildingError::NoValidPath)
}

/// DFS recursive helper. On success the chain vectors hold the complete
/// path, anchor included, and true is returned.
#[allow(clippy::too_many_arguments)]
#[allow(clippy::indexing_slicing)] // used[idx] safe: idx enumerated over pool of same length
fn dfs_build<'a>(
    current: &X509Certificate<'a>,
    chain_ders: &mut Vec<Vec<u8>>,
    chain_certs: &mut Vec<X509Certificate<'a>>,
    used: &mut [bool],
    pool: &[(&'a [u8], X509Certificate<'a>)],
    trust_store: &'a TrustStore,
    now_ts: i64,
) -> bool {
    let issuer_raw = current.issuer().as_raw();

    // Does a trust anchor terminate the chain here?
    if let Some(anchors) = trust_store.find_by_subject_raw(issuer_raw) {
        for anchor_der in anchors {
            let Ok((_, anchor)) = X509Certificate::from_der(anchor_der) else {
                continue;
            };
            if current.verify_signature(Some(anchor.public_key())).is_err() {
                trace!("anchor {} does not verify link signature", anchor.subject());
                continue;
            }
            if !is_time_valid(&anchor, now_ts) {
                trace!("anchor {} is outside its validity period", anchor.subject());
                continue;
            }
            // The current cert may itself be the anchor (self-anchored
            // chain); do not append it twice.
            let anchor_is_current = chain_ders.last().is_some_and(|d| d == anchor_der);
            if !anchor_is_current {
                chain_ders.push(anchor_der.clone());
                chain_certs.push(anchor.clone());
            }
            if path_len_ok(chain_certs) {
                return true;
            }
            if !anchor_is_current {
                chain_ders.pop();
                chain_certs.pop();
            }
        }
    }

    if chain_ders.len() >= MAX_PATH_DEPTH {
        return false;
    }

    // Try each unused intermediate as the next link.
    for (idx, (der, cert)) in pool.iter().enumerate() {
        if used[idx] {
            continue;
        }
        if cert.subject().as_raw() != issuer_raw {
            continue;
        }
        // Only validity-contained CA certificates may sign further links.
        if !is_ca(cert) || !is_time_valid(cert, now_ts) {
            continue;
        }
        if current.verify_signature(Some(cert.public_key())).is_err() {
            continue;
        }

        used[idx] = true;
        chain_ders.push(der.to_vec());
        chain_certs.push(cert.clone());

        if dfs_build(cert, chain_ders, chain_certs, used, pool, trust_store, now_ts) {
            return true;
        }

        chain_ders.pop();
        chain_certs.pop();
        used[idx] = false;
    }

    false
}

/// RFC 5280 Section 6.1.4(h): for every issuing certificate carrying a
/// pathLenConstraint, the number of non-self-issued intermediates below it
/// must not exceed the constraint.
fn path_len_ok(full_path: &[X509Certificate]) -> bool {
    for (i, cert) in full_path.iter().enumerate().skip(1) {
        if let Some(pathlen) = path_len_constraint(cert) {
            let intermediates_below = full_path
                .iter()
                .enumerate()
                .skip(1)
                .take(i.saturating_sub(1))
                .filter(|(_, c)| !is_self_issued(c))
                .count() as u32;
            if intermediates_below > pathlen {
                return false;
            }
        }
    }
    true
}
