pub mod controller;
pub mod crud;
pub mod interface;
pub mod routes;
pub mod schema;

pub use routes::analytics_routes;
