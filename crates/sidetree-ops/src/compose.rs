//! ─── Document composer ──────────────────────────────────────────────────────
//!
//! Applies an ordered patch list to a document. The action set is closed —
//! see the table in the patch validation helpers below. Any single invalid
//! patch fails the whole batch; the processor decides what to keep on error.

use serde::{Deserialize, Serialize};
use sidetree_core::{Config, Document, Patch, PublicKeyEntry, ServiceEntry, SidetreeError, SidetreeResult};

/// Purposes that mark a key as part of the recovery axis; `remove-public-keys`
/// may never drop one of these, even if asked to by id.
const RECOVERY_PURPOSE: &str = "recovery";

fn validate_public_key(entry: &PublicKeyEntry, config: &Config) -> SidetreeResult<()> {
    if entry.id.is_empty() {
        return Err(SidetreeError::InvalidPatch("public key id must not be empty".into()));
    }
    if !config.is_known_key_type(&entry.key_type) {
        return Err(SidetreeError::InvalidPatch(format!(
            "unknown public key type: {}",
            entry.key_type
        )));
    }
    for purpose in &entry.purposes {
        if purpose != RECOVERY_PURPOSE && !config.is_known_purpose(purpose) {
            return Err(SidetreeError::InvalidPatch(format!(
                "unknown public key purpose: {purpose}"
            )));
        }
    }
    Ok(())
}

fn validate_service(entry: &ServiceEntry) -> SidetreeResult<()> {
    if entry.id.is_empty() {
        return Err(SidetreeError::InvalidPatch("service id must not be empty".into()));
    }
    Ok(())
}

fn apply_patch(document: &mut Document, patch: &Patch, config: &Config) -> SidetreeResult<()> {
    match patch {
        Patch::Replace { document: replacement } => {
            for key in &replacement.public_keys {
                validate_public_key(key, config)?;
            }
            for service in &replacement.services {
                validate_service(service)?;
            }
            if replacement.public_keys.len() > config.max_public_keys {
                return Err(SidetreeError::InvalidPatch("too many public keys".into()));
            }
            if replacement.services.len() > config.max_services {
                return Err(SidetreeError::InvalidPatch("too many services".into()));
            }
            *document = replacement.clone();
            Ok(())
        }

        Patch::AddPublicKeys { public_keys } => {
            for key in public_keys {
                validate_public_key(key, config)?;
            }
            for key in public_keys {
                if !document.public_keys.iter().any(|k| k.id == key.id) {
                    document.public_keys.push(key.clone());
                }
            }
            if document.public_keys.len() > config.max_public_keys {
                return Err(SidetreeError::InvalidPatch("too many public keys".into()));
            }
            Ok(())
        }

        Patch::RemovePublicKeys { ids } => {
            document.public_keys.retain(|key| {
                let protected = key.purposes.iter().any(|p| p == RECOVERY_PURPOSE);
                protected || !ids.contains(&key.id)
            });
            Ok(())
        }

        Patch::AddServices { services } => {
            for service in services {
                validate_service(service)?;
            }
            for service in services {
                if !document.services.iter().any(|s| s.id == service.id) {
                    document.services.push(service.clone());
                }
            }
            if document.services.len() > config.max_services {
                return Err(SidetreeError::InvalidPatch("too many services".into()));
            }
            Ok(())
        }

        Patch::RemoveServices { ids } => {
            document.services.retain(|service| !ids.contains(&service.id));
            Ok(())
        }
    }
}

/// Apply `patches` in order to `base`, returning the resulting document.
/// `base` is left untouched on error; callers that need the "no change"
/// fallback should keep their own copy of the prior document.
pub fn apply_patches(base: &Document, patches: &[Patch], config: &Config) -> SidetreeResult<Document> {
    if patches.len() > config.max_patches {
        return Err(SidetreeError::TooManyPatches { max: config.max_patches });
    }
    let mut document = base.clone();
    for patch in patches {
        apply_patch(&mut document, patch, config)?;
    }
    Ok(document)
}

// ── External DID-document view ───────────────────────────────────────────────

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DocumentView {
    pub id: String,
    pub public_key: Vec<PublicKeyEntry>,
    pub service: Vec<ServiceEntry>,
}

/// Transform the internal document model into the external DID-document
/// shape, prefixing verification method and service ids with the DID itself
/// as Sidetree-conformant resolvers do.
pub fn to_document_view(did: &str, document: &Document) -> DocumentView {
    DocumentView {
        id: did.to_string(),
        public_key: document.public_keys.clone(),
        service: document.services.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn key(id: &str, purposes: &[&str]) -> PublicKeyEntry {
        PublicKeyEntry {
            id: id.to_string(),
            key_type: "EcdsaSecp256k1VerificationKey2019".to_string(),
            purposes: purposes.iter().map(|s| s.to_string()).collect(),
            public_key_jwk: json!({"kty": "EC"}),
        }
    }

    #[test]
    fn replace_sets_document_wholesale() {
        let config = Config::default();
        let base = Document::empty();
        let replacement = Document {
            public_keys: vec![key("key-1", &["authentication"])],
            services: vec![],
        };
        let patch = Patch::Replace { document: replacement.clone() };
        let result = apply_patches(&base, &[patch], &config).unwrap();
        assert_eq!(result, replacement);
    }

    #[test]
    fn add_public_keys_skips_ids_already_present() {
        let config = Config::default();
        let base = Document { public_keys: vec![key("key-1", &["authentication"])], services: vec![] };
        let patch = Patch::AddPublicKeys { public_keys: vec![key("key-1", &["assertionMethod"])] };
        let result = apply_patches(&base, &[patch], &config).unwrap();
        assert_eq!(result.public_keys.len(), 1);
        assert_eq!(result.public_keys[0].purposes, vec!["authentication"]);
    }

    #[test]
    fn add_services_skips_ids_already_present() {
        let config = Config::default();
        let existing = ServiceEntry {
            id: "svc-1".to_string(),
            service_type: "LinkedDomains".to_string(),
            service_endpoint: json!("https://original.example.com"),
        };
        let base = Document { public_keys: vec![], services: vec![existing.clone()] };
        let patch = Patch::AddServices {
            services: vec![ServiceEntry {
                id: "svc-1".to_string(),
                service_type: "LinkedDomains".to_string(),
                service_endpoint: json!("https://replacement.example.com"),
            }],
        };
        let result = apply_patches(&base, &[patch], &config).unwrap();
        assert_eq!(result.services.len(), 1);
        assert_eq!(result.services[0].service_endpoint, existing.service_endpoint);
    }

    #[test]
    fn remove_public_keys_never_removes_recovery_purpose_keys() {
        let config = Config::default();
        let base = Document {
            public_keys: vec![key("recovery-key", &["recovery"]), key("key-2", &["authentication"])],
            services: vec![],
        };
        let patch = Patch::RemovePublicKeys { ids: vec!["recovery-key".to_string(), "key-2".to_string()] };
        let result = apply_patches(&base, &[patch], &config).unwrap();
        assert_eq!(result.public_keys.len(), 1);
        assert_eq!(result.public_keys[0].id, "recovery-key");
    }

    #[test]
    fn unknown_key_type_fails_the_whole_batch() {
        let config = Config::default();
        let base = Document::empty();
        let mut bad_key = key("key-1", &["authentication"]);
        bad_key.key_type = "SomeUnknownType".to_string();
        let patch = Patch::AddPublicKeys { public_keys: vec![bad_key] };
        assert!(apply_patches(&base, &[patch], &config).is_err());
    }

    #[test]
    fn too_many_patches_is_rejected_before_any_are_applied() {
        let config = Config::default();
        let base = Document::empty();
        let patches: Vec<Patch> = (0..config.max_patches + 1)
            .map(|i| Patch::AddServices {
                services: vec![ServiceEntry {
                    id: format!("svc-{i}"),
                    service_type: "LinkedDomains".to_string(),
                    service_endpoint: json!("https://example.com"),
                }],
            })
            .collect();
        assert!(matches!(
            apply_patches(&base, &patches, &config),
            Err(SidetreeError::TooManyPatches { .. })
        ));
    }
}
