//! Catalog data records (serde).

pub mod artifact;
pub mod collection;
pub mod project;
pub mod user;
