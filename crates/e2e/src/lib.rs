//! PizzaMock scenario runner
//!
//! Drives a running mock API with declarative YAML scenarios:
//! - Starts the server, either as a subprocess or on a task in this process
//! - Resets mock state before every scenario
//! - Sends each request step over HTTP and checks the expectations
//! - Writes a JSON summary of the run
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                       TestRunner                            │
//! │    ├── start_server() -> ServerHandle                       │
//! │    ├── ApiClient::reset(fixture)                            │
//! │    └── run_spec(spec: ScenarioSpec) -> TestResult           │
//! ├─────────────────────────────────────────────────────────────┤
//! │  ScenarioSpec (YAML)                                        │
//! │    ├── name, description, tags, fixture                     │
//! │    └── steps: [ScenarioStep]                                │
//! │          ├── request { method, path, body?, expect }        │
//! │          ├── reset                                          │
//! │          ├── sleep { ms }                                   │
//! │          └── log { message }                                │
//! └─────────────────────────────────────────────────────────────┘
//! ```

pub mod client;
pub mod error;
pub mod runner;
pub mod server;
pub mod spec;

pub use error::{E2eError, E2eResult};
pub use runner::TestRunner;
pub use spec::{Expectation, ScenarioSpec, ScenarioStep};
