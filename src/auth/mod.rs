pub mod dto;
pub mod extractor;
pub mod handlers;
pub mod password;
pub mod repo;
pub mod session;

pub use handlers::router;
