//! Apiprobe Core - primitives for contract testing HTTP/JSON APIs
//!
//! # Main Components
//!
//! - **Paths**: `.`-separated paths with `[]` array projection, resolved
//!   totally against any JSON value
//! - **Predicates**: existence, equality, membership, disjointness and
//!   count checks built on paths, plus entity type guards
//! - **Fixtures**: single-violation negative payloads derived from a
//!   field-constraint schema
//! - **Checks**: named check sets, a runner that never aborts early, and
//!   pluggable record sinks
//! - **HTTP**: a transport capability and an orchestrator issuing one
//!   request per assertion
//!
//! # Example
//!
//! ```no_run
//! use apiprobe_core::checks::CheckSet;
//! use apiprobe_core::http::{Orchestrator, ReqwestTransport, TestCase};
//! use apiprobe_core::{predicates, RunConfig};
//! use serde_json::json;
//!
//! async fn example() -> apiprobe_core::Result<()> {
//!     let orchestrator = Orchestrator::new(ReqwestTransport::with_default_config()?, RunConfig::from_env());
//!     let checks = CheckSet::new()
//!         .status(201)
//!         .check("should have departmentId", |r| predicates::is_exists(r, "departmentId"));
//!     let case = TestCase::new("department", "post valid").bearer("token");
//!     let result = orchestrator
//!         .test_post_json_assert(&case, "/v1/department", &json!({"name": "Engineering"}), &checks)
//!         .await?;
//!     assert!(result.is_success);
//!     Ok(())
//! }
//! ```

pub mod checks;
pub mod config;
pub mod decide;
pub mod entity;
pub mod error;
pub mod fixtures;
pub mod http;
pub mod path;
pub mod predicates;

// Re-export main types for convenience
pub use checks::{AssertResult, CheckRunner, CheckSet};
pub use config::{RunConfig, TransportConfig};
pub use decide::{with_probability, Decider, SeededDecider};
pub use entity::{Department, Employee, Guarded, User};
pub use error::{Error, Result};
pub use fixtures::{generate, FieldConstraint, FieldType, Fixture, Payload, Schema, Violation};
pub use http::{HttpTransport, Orchestrator, RawResponse, ReqwestTransport, TestCase};
pub use path::{resolve, Matches, PathExpr};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
