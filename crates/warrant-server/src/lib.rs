//! # warrant-server
//!
//! HTTP API for delegated authorization. Users register and log in, then
//! grant registered agents a set of permissions. Each grant is handed to the
//! agent as a short-lived signed token that can be re-issued on demand.
//!
//! Every endpoint answers with the same JSON envelope:
//!
//! ```json
//! {"success": true, "message": "Login Successful!", "data": {"access_token": "..."}}
//! ```

pub mod error;
pub mod middleware;
pub mod response;
pub mod routes;
pub mod state;

pub use error::ApiError;
pub use response::ApiResponse;
pub use routes::create_router;
pub use state::AppState;
