pub mod buckets;
pub mod dto;
pub mod handlers;
pub mod query;
pub mod repo;

pub use handlers::router;
