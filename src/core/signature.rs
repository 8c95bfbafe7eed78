//! Detached signature verification for distributed deliverable bundles.
//!
//! A signed deliverable is an exported bundle plus a top-level `dlcSignature`
//! record. Verification strips the record, canonicalizes everything that
//! remains, and checks the signature over those exact bytes, so any mutation
//! of the payload after signing is detectable.
//!
//! Only `ECDSA_P256_SHA256` is accepted. An unrecognized algorithm tag fails
//! closed with a hard error; there is no fallback verification path.
//! Malformed key or signature material is a verification failure
//! (`valid=false` with an error description), never a panic.

use crate::core::canonical;
use crate::core::error::ProvenantError;
use p256::ecdsa::signature::Verifier;
use p256::ecdsa::{Signature, VerifyingKey};
use p256::pkcs8::DecodePublicKey;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The single accepted signature algorithm identifier.
pub const SIGNATURE_ALGORITHM: &str = "ECDSA_P256_SHA256";

/// Key under which the detached signature record lives in a signed bundle.
pub const SIGNATURE_FIELD: &str = "dlcSignature";

/// Detached signature record carried by a signed deliverable.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DlcSignature {
    pub algorithm: String,
    pub public_key_pem: String,
    pub signature_hex: String,
    pub signed_at: String,
}

/// Verification outcome plus echoed signature metadata.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignatureReport {
    pub valid: bool,
    pub algorithm: String,
    pub signed_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// True when the document carries a detached signature record.
pub fn is_signed_bundle(bundle: &Value) -> bool {
    bundle.get(SIGNATURE_FIELD).is_some()
}

/// The canonical bytes a signature must cover: the bundle with its signature
/// record removed.
pub fn signed_payload_bytes(bundle: &Value) -> Result<Vec<u8>, ProvenantError> {
    let Some(root) = bundle.as_object() else {
        return Err(ProvenantError::StructuralError(
            "signed bundle is not a JSON object".to_string(),
        ));
    };
    let mut payload = root.clone();
    payload.remove(SIGNATURE_FIELD);
    Ok(canonical::canonical_bytes(&Value::Object(payload)))
}

/// Verify a signed deliverable bundle.
///
/// Returns `Err` only for hard failures (missing/malformed signature record,
/// unsupported algorithm). Bad key material, bad signature encoding, and
/// signatures that simply do not verify all return `Ok` with `valid=false`.
pub fn verify_signed_bundle(bundle: &Value) -> Result<SignatureReport, ProvenantError> {
    let Some(record) = bundle.get(SIGNATURE_FIELD) else {
        return Err(ProvenantError::NotFound(format!(
            "bundle has no {} record",
            SIGNATURE_FIELD
        )));
    };
    let record: DlcSignature = serde_json::from_value(record.clone()).map_err(|e| {
        ProvenantError::StructuralError(format!("malformed {} record: {}", SIGNATURE_FIELD, e))
    })?;

    if record.algorithm != SIGNATURE_ALGORITHM {
        return Err(ProvenantError::UnsupportedAlgorithm(record.algorithm));
    }

    let message = signed_payload_bytes(bundle)?;

    let failure = |reason: String| SignatureReport {
        valid: false,
        algorithm: record.algorithm.clone(),
        signed_at: record.signed_at.clone(),
        error: Some(reason),
    };

    let key = match VerifyingKey::from_public_key_pem(&record.public_key_pem) {
        Ok(key) => key,
        Err(e) => return Ok(failure(format!("invalid public key PEM: {}", e))),
    };

    let sig_bytes = match hex::decode(record.signature_hex.trim()) {
        Ok(bytes) => bytes,
        Err(e) => return Ok(failure(format!("signature is not valid hex: {}", e))),
    };

    // Exporters emit either ASN.1 DER or raw r||s (IEEE P1363); accept both.
    let signature = match Signature::from_der(&sig_bytes)
        .or_else(|_| Signature::from_slice(&sig_bytes))
    {
        Ok(sig) => sig,
        Err(e) => return Ok(failure(format!("malformed signature encoding: {}", e))),
    };

    match key.verify(&message, &signature) {
        Ok(()) => Ok(SignatureReport {
            valid: true,
            algorithm: record.algorithm.clone(),
            signed_at: record.signed_at.clone(),
            error: None,
        }),
        Err(_) => Ok(failure("signature does not verify over canonical payload".to_string())),
    }
}
