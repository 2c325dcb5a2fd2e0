pub mod auth;
pub mod hashing;
pub mod jwt;
pub mod metrics;
pub mod notify;
pub mod pagination;
pub mod rate_limit;
pub mod response;
pub mod security;
pub mod storage;
