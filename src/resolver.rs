//! Polymorphic Reference Resolver
//!
//! Resolves a foreign reference (document id or short code) against the
//! candidate collections declared in the catalog.
//!
//! ## Addressing
//!
//! A reference that parses as an ObjectId is matched with id-keyed probes
//! only; a reference that does not parse falls back to code-keyed probes.
//! This mirrors the dual addressing present in the stored data (an animal
//! may carry a species ObjectId or a species code in the same field).
//!
//! ## Ambiguity
//!
//! All applicable probes run and their hits are counted. More than one hit
//! is a data-integrity anomaly and surfaces as a distinguishable error,
//! never a silent first match. Zero hits is `Ok(None)`; the caller decides
//! whether absence degrades the payload or invalidates it.

use bson::{doc, oid::ObjectId, Document};
use mongodb::Database;
use tracing::{debug, warn};

use crate::catalog::{Catalog, Probe, ProbeKey, RefKind};
use crate::error::{classify_db_error, RefugeError};

/// A successfully resolved reference: the raw record plus which physical
/// collection held it
#[derive(Debug, Clone)]
pub struct Resolution {
    pub source_collection: &'static str,
    pub record: Document,
}

/// Reference resolver over a shared database handle
#[derive(Clone)]
pub struct Resolver {
    db: Database,
}

impl Resolver {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Resolve `reference` as a `kind`, probing every applicable candidate
    /// collection and counting matches.
    pub async fn resolve(
        &self,
        kind: RefKind,
        reference: &str,
    ) -> Result<Option<Resolution>, RefugeError> {
        if reference.is_empty() {
            return Ok(None);
        }

        let oid = ObjectId::parse_str(reference).ok();
        let probes = Catalog::probes(kind);
        let mut hits: Vec<(usize, Document)> = Vec::new();

        for (idx, probe) in probes.iter().enumerate() {
            let filter = match probe_filter(probe, &oid, reference) {
                Some(filter) => filter,
                None => continue,
            };

            let found = self
                .db
                .collection::<Document>(probe.collection)
                .find_one(filter)
                .await
                .map_err(classify_db_error)?;

            if let Some(record) = found {
                debug!(
                    kind = kind.name(),
                    reference,
                    collection = probe.collection,
                    "reference probe hit"
                );
                hits.push((idx, record));
            }
        }

        let resolution = select_unique(kind, reference, probes, hits)?;
        if resolution.is_none() {
            debug!(kind = kind.name(), reference, "reference unresolved");
        }
        Ok(resolution)
    }
}

/// Build the lookup filter for one probe, or `None` when the probe does
/// not apply to this reference form: id probes need an id-form reference,
/// code probes only apply when the reference is not an id.
pub(crate) fn probe_filter(
    probe: &Probe,
    oid: &Option<ObjectId>,
    reference: &str,
) -> Option<Document> {
    match (probe.key, oid) {
        (ProbeKey::Id, Some(oid)) => Some(doc! {
            "_id": oid,
            "metadata.is_deleted": { "$ne": true },
        }),
        (ProbeKey::Code, None) => Some(doc! {
            "code": reference,
            "metadata.is_deleted": { "$ne": true },
        }),
        _ => None,
    }
}

/// Pick the unique hit out of the probe results.
///
/// Zero hits is a clean miss; exactly one hit wins; several hits mean the
/// same reference exists in more than one candidate collection, which is
/// reported, not resolved.
pub(crate) fn select_unique(
    kind: RefKind,
    reference: &str,
    probes: &[Probe],
    mut hits: Vec<(usize, Document)>,
) -> Result<Option<Resolution>, RefugeError> {
    match hits.len() {
        0 => Ok(None),
        1 => {
            let (idx, record) = hits.remove(0);
            Ok(Some(Resolution {
                source_collection: probes[idx].collection,
                record,
            }))
        }
        _ => {
            let collections: Vec<&'static str> =
                hits.iter().map(|(idx, _)| probes[*idx].collection).collect();
            warn!(
                kind = kind.name(),
                reference,
                collections = ?collections,
                "ambiguous polymorphic reference"
            );
            Err(RefugeError::AmbiguousReference {
                kind: kind.name(),
                reference: reference.to_string(),
                collections,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn author_probes() -> &'static [Probe] {
        Catalog::probes(RefKind::AuthorLike)
    }

    #[test]
    fn test_select_unique_single_hit_reports_source() {
        let record = doc! { "email": "vet@example.org" };
        let hits = vec![(1usize, record)];
        let resolution = select_unique(RefKind::AuthorLike, "64f1a2b3c4d5e6f708091011", author_probes(), hits)
            .unwrap()
            .expect("one hit resolves");
        assert_eq!(resolution.source_collection, "veterinarians");
        assert_eq!(resolution.record.get_str("email").unwrap(), "vet@example.org");
    }

    #[test]
    fn test_select_unique_no_hit_is_clean_miss() {
        let result = select_unique(
            RefKind::AuthorLike,
            "64f1a2b3c4d5e6f708091011",
            author_probes(),
            Vec::new(),
        )
        .unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_select_unique_two_hits_is_ambiguous() {
        let hits = vec![(0usize, doc! {}), (3usize, doc! {})];
        let err = select_unique(
            RefKind::AuthorLike,
            "64f1a2b3c4d5e6f708091011",
            author_probes(),
            hits,
        )
        .unwrap_err();
        match err {
            RefugeError::AmbiguousReference { collections, .. } => {
                assert_eq!(collections, vec!["users", "stores"]);
            }
            other => panic!("expected ambiguous reference, got {:?}", other),
        }
    }

    #[test]
    fn test_id_form_reference_skips_code_probes() {
        let species_probes = Catalog::probes(RefKind::SpeciesLike);
        let id_probe = &species_probes[0];
        let code_probe = &species_probes[1];

        let oid = ObjectId::parse_str("64f1a2b3c4d5e6f708091011").ok();
        let filter = probe_filter(id_probe, &oid, "64f1a2b3c4d5e6f708091011").unwrap();
        assert!(filter.get_object_id("_id").is_ok());
        assert!(probe_filter(code_probe, &oid, "64f1a2b3c4d5e6f708091011").is_none());
    }

    #[test]
    fn test_code_form_reference_skips_id_probes() {
        // "dog" is not a valid ObjectId, so only the code probe applies
        // and the stored code document is the one that matches.
        let species_probes = Catalog::probes(RefKind::SpeciesLike);
        let id_probe = &species_probes[0];
        let code_probe = &species_probes[1];

        let oid = ObjectId::parse_str("dog").ok();
        assert!(oid.is_none());
        assert!(probe_filter(id_probe, &oid, "dog").is_none());

        let filter = probe_filter(code_probe, &oid, "dog").unwrap();
        assert_eq!(filter.get_str("code").unwrap(), "dog");
    }
}
