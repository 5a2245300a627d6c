//! Database schemas for Refuge
//!
//! Defines MongoDB document structures for animals, reference data,
//! owner-kind accounts, donations, shelters, articles, adoption requests,
//! and reports.

mod adoption;
mod animal;
mod article;
mod donation;
mod metadata;
mod owners;
mod report;
mod shelter;
mod species;

pub use adoption::{AdoptionRequestDoc, AdoptionStatus, ADOPTION_REQUEST_COLLECTION};
pub use animal::{AnimalDoc, AnimalStatus, Photo, ANIMAL_COLLECTION};
pub use article::{ArticleDoc, ARTICLE_COLLECTION};
pub use donation::{DonationDoc, DONATION_COLLECTION};
pub use metadata::Metadata;
pub use owners::{
    AssociationDoc, OwnerKind, StoreDoc, UserDoc, VeterinarianDoc, ASSOCIATION_COLLECTION,
    STORE_COLLECTION, USER_COLLECTION, VETERINARIAN_COLLECTION,
};
pub use report::{ReportDoc, ReportType, REPORT_COLLECTION};
pub use shelter::{ShelterDoc, SHELTER_COLLECTION};
pub use species::{RaceDoc, SpeciesDoc, RACE_COLLECTION, SPECIES_COLLECTION};
