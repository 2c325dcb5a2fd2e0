//! Staff-only management endpoints for accounts, catalog, lookups and site content.

pub mod controller;
pub mod crud;
pub mod interface;
pub mod routes;
pub mod schema;

pub use routes::admin_routes;
