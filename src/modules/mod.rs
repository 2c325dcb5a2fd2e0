pub mod accounts;
pub mod admin;
pub mod analytics;
pub mod catalog;
pub mod companies;
pub mod metrics;
pub mod orders;
pub mod sites;
