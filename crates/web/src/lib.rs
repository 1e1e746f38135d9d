//! PizzaMock Web
//!
//! In-memory stand-in for the pizza storefront backend. Requests are matched
//! against an ordered route table; handlers read and mutate per-instance
//! state (user directory and login session) or answer from a fixed catalog.

pub mod config;
pub mod directory;
pub mod dispatch;
pub mod error;
pub mod handlers;
pub mod mock;
pub mod server;
pub mod session;

pub use config::MockConfig;
pub use directory::Directory;
pub use dispatch::{Call, Dispatch, MockRequest, MockResponse, Outcome, RoutePattern, RouteTable};
pub use error::MockError;
pub use mock::{MockApi, MockState};
pub use server::MockServer;
pub use session::Session;
