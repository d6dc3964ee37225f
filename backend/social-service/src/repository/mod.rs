mod memory_repository;
mod postgres_repository;
mod r#trait;

pub use memory_repository::MemorySocialRepository;
pub use postgres_repository::PostgresSocialRepository;
pub use r#trait::SocialRepository;
