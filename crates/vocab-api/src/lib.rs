pub mod config;
pub mod error;
pub mod jobs;
pub mod metrics;
pub mod middleware;
pub mod repository;
pub mod router;
pub mod state;
pub mod study;
pub mod tracing;

pub use config::ApiConfig;
pub use repository::PgVocabularyRepository;
pub use state::ApiState;
