//! Hosting of study sessions over HTTP.

pub mod model;
pub mod registry;
pub mod routes;
pub mod scheduler;

pub use registry::{HostedSession, SessionKind, SessionRegistry, SessionRequest};
pub use routes::routes;
pub use scheduler::{TimerFired, TokioScheduler};
