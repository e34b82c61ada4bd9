//! Business logic services.

pub mod auth_service;
pub mod catalog_service;
pub mod garden_service;
pub mod project_service;
