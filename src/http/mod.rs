//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! Public listener
//!     → request.rs (request ID, trace span)
//!     → redirects::resolver (301 on a matching active rule)
//!     → upstream.rs (forward to origin, or 404)
//!
//! Admin listener
//!     → admin (bearer auth, rule CRUD, CSV import)
//! ```

pub mod request;
pub mod server;
pub mod upstream;

pub use request::{MakeRequestUuidV4, X_REQUEST_ID};
pub use server::HttpServer;
