//! Read-Model Projector
//!
//! Assembles the public JSON representation of an entity: the primary
//! document's own fields plus every polymorphic reference resolved and
//! normalized under a documented key (`authorInfo`, `speciesDetails`,
//! `raceDetails`).
//!
//! Projection is read-only and idempotent: repeated calls with no
//! intervening writes produce identical payloads.
//!
//! ## Failure policy
//!
//! - Optional reference unresolved: the key holds an empty object and a
//!   warning is logged; the payload still renders.
//! - Required reference unresolved (an animal's species): data-integrity
//!   error, distinct from a plain not-found of the primary document.
//! - Ambiguous reference: propagated as-is; never silently resolved.

use bson::oid::ObjectId;
use serde_json::{json, Value};
use tracing::warn;

use crate::catalog::RefKind;
use crate::db::schemas::{AnimalDoc, ArticleDoc, DonationDoc, ShelterDoc};
use crate::error::RefugeError;
use crate::normalize::{empty_shape, normalize};
use crate::resolver::Resolver;

/// Read-model projector over a shared resolver
#[derive(Clone)]
pub struct Projector {
    resolver: Resolver,
}

impl Projector {
    pub fn new(resolver: Resolver) -> Self {
        Self { resolver }
    }

    /// Resolve an optional reference into its shaped form; a miss degrades
    /// to an empty shape and a log line, an ambiguity propagates.
    async fn shape_optional(
        &self,
        kind: RefKind,
        reference: &str,
        entity: &str,
    ) -> Result<Value, RefugeError> {
        if reference.is_empty() {
            return Ok(empty_shape());
        }

        match self.resolver.resolve(kind, reference).await? {
            Some(resolution) => Ok(normalize(kind, resolution.source_collection, &resolution.record)),
            None => {
                warn!(entity, kind = kind.name(), reference, "optional reference unresolved");
                Ok(empty_shape())
            }
        }
    }

    /// Project an animal. The species reference is required: an animal
    /// whose species cannot be resolved is a data error.
    pub async fn animal(&self, animal: &AnimalDoc) -> Result<Value, RefugeError> {
        let species = match self
            .resolver
            .resolve(RefKind::SpeciesLike, &animal.species)
            .await?
        {
            Some(resolution) => {
                normalize(RefKind::SpeciesLike, resolution.source_collection, &resolution.record)
            }
            None => {
                return Err(RefugeError::DataIntegrity(format!(
                    "animal {} references unresolvable species '{}'",
                    oid_hex(&animal._id),
                    animal.species
                )));
            }
        };

        let race = self
            .shape_optional(RefKind::RaceLike, &animal.race, "animal")
            .await?;

        let author = self
            .shape_optional(RefKind::AuthorLike, &animal.publisher_id.to_hex(), "animal")
            .await?;

        Ok(animal_payload(animal, species, race, author))
    }

    /// Project a donation; the author is optional and degrades to empty
    /// author fields when unresolvable.
    pub async fn donation(&self, donation: &DonationDoc) -> Result<Value, RefugeError> {
        let author = self
            .shape_optional(RefKind::AuthorLike, &donation.author_id.to_hex(), "donation")
            .await?;

        Ok(donation_payload(donation, author))
    }

    /// Project a shelter; author policy as for donations.
    pub async fn shelter(&self, shelter: &ShelterDoc) -> Result<Value, RefugeError> {
        let author = self
            .shape_optional(RefKind::AuthorLike, &shelter.author_id.to_hex(), "shelter")
            .await?;

        Ok(shelter_payload(shelter, author))
    }

    /// Project an article; the author is polymorphic over veterinarians
    /// and associations only, and its display fields are computed here,
    /// never stored.
    pub async fn article(&self, article: &ArticleDoc) -> Result<Value, RefugeError> {
        let author = self
            .shape_optional(RefKind::ArticleAuthor, &article.author_id.to_hex(), "article")
            .await?;

        Ok(article_payload(article, author))
    }
}

/// Assemble an animal payload from its resolved parts. Pure: projection
/// stays deterministic and repeat calls yield identical JSON.
fn animal_payload(animal: &AnimalDoc, species: Value, race: Value, author: Value) -> Value {
    json!({
        "id": oid_hex(&animal._id),
        "name": animal.name,
        "description": animal.description,
        "ageMonths": animal.age_months,
        "sex": animal.sex,
        "status": animal.status,
        "photos": animal.photos,
        "publisherKind": animal.publisher_kind,
        "speciesDetails": species,
        "raceDetails": race,
        "authorInfo": author,
        "createdAt": created_at(&animal.metadata),
    })
}

fn donation_payload(donation: &DonationDoc, author: Value) -> Value {
    json!({
        "id": oid_hex(&donation._id),
        "title": donation.title,
        "description": donation.description,
        "category": donation.category,
        "city": donation.city,
        "photos": donation.photos,
        "authorInfo": author,
        "createdAt": created_at(&donation.metadata),
    })
}

fn shelter_payload(shelter: &ShelterDoc, author: Value) -> Value {
    json!({
        "id": oid_hex(&shelter._id),
        "name": shelter.name,
        "description": shelter.description,
        "address": shelter.address,
        "city": shelter.city,
        "capacity": shelter.capacity,
        "photos": shelter.photos,
        "authorInfo": author,
        "createdAt": created_at(&shelter.metadata),
    })
}

fn article_payload(article: &ArticleDoc, author: Value) -> Value {
    json!({
        "id": oid_hex(&article._id),
        "title": article.title,
        "summary": article.summary,
        "body": article.body,
        "photos": article.photos,
        "authorInfo": author,
        "createdAt": created_at(&article.metadata),
    })
}

fn oid_hex(id: &Option<ObjectId>) -> String {
    id.map(|oid| oid.to_hex()).unwrap_or_default()
}

fn created_at(metadata: &crate::db::schemas::Metadata) -> Value {
    match metadata.created_at {
        Some(ts) => json!(ts.try_to_rfc3339_string().unwrap_or_default()),
        None => Value::Null,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::schemas::{AnimalStatus, Metadata, OwnerKind};

    fn fixture_animal() -> AnimalDoc {
        AnimalDoc {
            _id: ObjectId::parse_str("64f1a2b3c4d5e6f708091011").ok(),
            metadata: Metadata::default(),
            name: "Nala".to_string(),
            description: "calm, good with children".to_string(),
            age_months: 18,
            sex: "female".to_string(),
            species: "dog".to_string(),
            race: "husky".to_string(),
            photos: Vec::new(),
            publisher_id: ObjectId::parse_str("64f1a2b3c4d5e6f708091012").unwrap(),
            publisher_kind: OwnerKind::Association,
            status: AnimalStatus::Available,
        }
    }

    #[test]
    fn test_oid_hex_of_absent_id_is_empty() {
        assert_eq!(oid_hex(&None), "");
        let oid = ObjectId::parse_str("64f1a2b3c4d5e6f708091011").unwrap();
        assert_eq!(oid_hex(&Some(oid)), "64f1a2b3c4d5e6f708091011");
    }

    #[test]
    fn test_created_at_null_when_unset() {
        let metadata = crate::db::schemas::Metadata::default();
        assert_eq!(created_at(&metadata), Value::Null);
    }

    #[test]
    fn test_animal_payload_merges_under_documented_keys() {
        let animal = fixture_animal();
        let species = json!({ "name": "Dog", "code": "dog" });
        let race = json!({ "name": "Husky", "code": "husky", "species": "dog" });
        let author = json!({ "associationName": "SPA Nord", "authorKind": "association" });

        let payload = animal_payload(&animal, species, race, author);
        assert_eq!(payload["id"], "64f1a2b3c4d5e6f708091011");
        assert_eq!(payload["speciesDetails"]["code"], "dog");
        assert_eq!(payload["raceDetails"]["name"], "Husky");
        assert_eq!(payload["authorInfo"]["authorKind"], "association");
        assert_eq!(payload["status"], "available");
    }

    #[test]
    fn test_projection_is_deterministic() {
        let animal = fixture_animal();
        let parts = || {
            (
                json!({ "name": "Dog", "code": "dog" }),
                json!({ "name": "Husky", "code": "husky", "species": "dog" }),
                json!({ "associationName": "SPA Nord", "authorKind": "association" }),
            )
        };

        let (s1, r1, a1) = parts();
        let (s2, r2, a2) = parts();
        let first = serde_json::to_string(&animal_payload(&animal, s1, r1, a1)).unwrap();
        let second = serde_json::to_string(&animal_payload(&animal, s2, r2, a2)).unwrap();
        assert_eq!(first, second);
    }
}
