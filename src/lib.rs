//! Triggers a GitHub Actions `workflow_dispatch` for an OCI image build.
//!
//! [`build_payload`] assembles the request body and its correlation id,
//! [`Dispatcher`] sends it once over a [`RestTransport`] and accepts nothing
//! but `200 OK`. Transports are swappable so tests run against
//! [`MockRestAdapter`] or a local stub server.

pub mod adapter;
pub mod auth;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod mock;
pub mod payload;

pub use reqwest::Method;

pub use adapter::{
    Client, ReqwestTransport, RestBytes, RestError, RestErrorKind, RestFuture, RestRequest,
    RestResponse, RestResult, RestTransport, RestTransportState,
};
pub use auth::AuthHeaders;
pub use config::DispatchConfig;
pub use dispatcher::{ACCEPTED_STATUS, Dispatcher};
pub use error::DispatchError;
pub use mock::{
    MockBehavior, MockBehaviorPlan, MockResponse, MockRestAdapter, MockRestStateSnapshot,
};
pub use payload::{DEFAULT_GIT_REF, DispatchPayload, build_payload, external_ref_id};
