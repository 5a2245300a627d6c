//! Collection Catalog
//!
//! Static registry mapping a logical reference kind to the ordered list of
//! physical collection probes that may satisfy it. Pure data: the resolver
//! owns all behavior. Kinds are a closed enum, so an unknown kind cannot
//! reach the resolver at runtime; `validate()` runs once at startup and
//! treats a malformed table as a fatal configuration error.

use crate::db::schemas::{
    ASSOCIATION_COLLECTION, RACE_COLLECTION, SPECIES_COLLECTION, STORE_COLLECTION,
    USER_COLLECTION, VETERINARIAN_COLLECTION,
};

/// Logical kind of a polymorphic reference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RefKind {
    /// Content author: any of the four owner collections
    AuthorLike,
    /// Article author: veterinarians and associations only
    ArticleAuthor,
    /// Species reference, addressable by id or code
    SpeciesLike,
    /// Race reference, addressable by id or code
    RaceLike,
}

impl RefKind {
    /// Stable name used in logs and error payloads
    pub fn name(&self) -> &'static str {
        match self {
            RefKind::AuthorLike => "authorLike",
            RefKind::ArticleAuthor => "articleAuthor",
            RefKind::SpeciesLike => "speciesLike",
            RefKind::RaceLike => "raceLike",
        }
    }
}

/// How a probe keys into its collection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeKey {
    /// Match on `_id` (reference must be a syntactically valid ObjectId)
    Id,
    /// Match on the `code` field (reference is an opaque short code)
    Code,
}

/// One candidate lookup: a physical collection plus the key mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Probe {
    pub collection: &'static str,
    pub key: ProbeKey,
}

const AUTHOR_PROBES: &[Probe] = &[
    Probe { collection: USER_COLLECTION, key: ProbeKey::Id },
    Probe { collection: VETERINARIAN_COLLECTION, key: ProbeKey::Id },
    Probe { collection: ASSOCIATION_COLLECTION, key: ProbeKey::Id },
    Probe { collection: STORE_COLLECTION, key: ProbeKey::Id },
];

const ARTICLE_AUTHOR_PROBES: &[Probe] = &[
    Probe { collection: VETERINARIAN_COLLECTION, key: ProbeKey::Id },
    Probe { collection: ASSOCIATION_COLLECTION, key: ProbeKey::Id },
];

const SPECIES_PROBES: &[Probe] = &[
    Probe { collection: SPECIES_COLLECTION, key: ProbeKey::Id },
    Probe { collection: SPECIES_COLLECTION, key: ProbeKey::Code },
];

const RACE_PROBES: &[Probe] = &[
    Probe { collection: RACE_COLLECTION, key: ProbeKey::Id },
    Probe { collection: RACE_COLLECTION, key: ProbeKey::Code },
];

/// Static catalog of reference kinds
pub struct Catalog;

impl Catalog {
    /// Ordered probe list for a kind
    pub fn probes(kind: RefKind) -> &'static [Probe] {
        match kind {
            RefKind::AuthorLike => AUTHOR_PROBES,
            RefKind::ArticleAuthor => ARTICLE_AUTHOR_PROBES,
            RefKind::SpeciesLike => SPECIES_PROBES,
            RefKind::RaceLike => RACE_PROBES,
        }
    }

    /// Assert the table is well-formed. Called once at startup; a failure
    /// here is a configuration error and the process must not serve.
    pub fn validate() -> Result<(), String> {
        for kind in [
            RefKind::AuthorLike,
            RefKind::ArticleAuthor,
            RefKind::SpeciesLike,
            RefKind::RaceLike,
        ] {
            let probes = Self::probes(kind);
            if probes.is_empty() {
                return Err(format!("catalog kind {} has no probes", kind.name()));
            }

            // Id probes must precede code probes: id addressing is the
            // primary form and code lookup is the fallback.
            let mut seen_code = false;
            for probe in probes {
                match probe.key {
                    ProbeKey::Code => seen_code = true,
                    ProbeKey::Id if seen_code => {
                        return Err(format!(
                            "catalog kind {} lists an id probe after a code probe",
                            kind.name()
                        ));
                    }
                    ProbeKey::Id => {}
                }
            }

            // The same (collection, key) pair listed twice would double-count
            // a single document as an ambiguity.
            for (i, a) in probes.iter().enumerate() {
                if probes[i + 1..].contains(a) {
                    return Err(format!(
                        "catalog kind {} lists duplicate probe {}",
                        kind.name(),
                        a.collection
                    ));
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_author_probe_order() {
        let probes = Catalog::probes(RefKind::AuthorLike);
        let collections: Vec<_> = probes.iter().map(|p| p.collection).collect();
        assert_eq!(
            collections,
            vec!["users", "veterinarians", "associations", "stores"]
        );
        assert!(probes.iter().all(|p| p.key == ProbeKey::Id));
    }

    #[test]
    fn test_article_author_excludes_plain_users_and_stores() {
        let collections: Vec<_> = Catalog::probes(RefKind::ArticleAuthor)
            .iter()
            .map(|p| p.collection)
            .collect();
        assert_eq!(collections, vec!["veterinarians", "associations"]);
    }

    #[test]
    fn test_species_probes_try_id_then_code() {
        let probes = Catalog::probes(RefKind::SpeciesLike);
        assert_eq!(probes.len(), 2);
        assert_eq!(probes[0].key, ProbeKey::Id);
        assert_eq!(probes[1].key, ProbeKey::Code);
        assert_eq!(probes[0].collection, probes[1].collection);
    }

    #[test]
    fn test_catalog_validates() {
        assert!(Catalog::validate().is_ok());
    }
}
