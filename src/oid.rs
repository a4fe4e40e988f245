//! OID string constants used throughout trustpath.
//!
//! Extension OIDs are matched by comparing `Oid::to_id_string()` against
//! these values, which keeps magic strings out of the validation code.

/// Authority Information Access method: OCSP responder (RFC 5280 4.2.2.1).
pub const AD_OCSP: &str = "1.3.6.1.5.5.7.48.1";
