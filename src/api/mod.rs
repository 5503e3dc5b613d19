//! Portal REST API.
//!
//! Customer auth and profile endpoints under `/api/`. Profile routes are
//! protected by a bearer-token middleware; failures are `{msg, code}`.
//!
//! The router is composable: `portal_api_router()` returns a `Router`
//! that can be mounted on any axum server instance.

pub mod endpoints;
pub mod error;
pub mod middleware;
pub mod router;
pub mod server;
pub mod types;

pub use error::ApiError;
pub use router::portal_api_router;
pub use server::{start_portal_server_on, PortalApiServer, PortalApiSession};
pub use types::{ApiContext, CustomerContext};
