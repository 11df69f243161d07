//! Core domain types shared by the router, handlers and capabilities.

pub mod ids;
pub mod repository;

pub use ids::{DeliveryId, PrNumber, RepoSlug, Sha};
pub use repository::RepositoryIdentity;
