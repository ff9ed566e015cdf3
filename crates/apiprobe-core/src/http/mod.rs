//! HTTP request/assert plumbing
//!
//! - [`RawResponse`]: what checks see, including transport failures
//! - [`HttpTransport`]: the send capability, with a reqwest implementation
//! - [`Orchestrator`]: one request per call, checks evaluated on the result

pub mod orchestrator;
pub mod request;
pub mod response;
pub mod transport;

pub use orchestrator::{Orchestrator, TestCase};
pub use request::{FilePart, Method, MultipartForm, RequestBody, RequestOption, RequestSpec, RequestSummary};
pub use response::RawResponse;
pub use transport::{HttpTransport, ReqwestTransport};
