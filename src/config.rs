use std::time::Duration;

use crate::auth::DEFAULT_API_VERSION;
use crate::payload::DEFAULT_GIT_REF;

pub const GITHUB_API_BASE: &str = "https://api.github.com";
pub const DEFAULT_OWNER: &str = "canonical";
pub const DEFAULT_REPOSITORY: &str = "oci-factory";
pub const DEFAULT_WORKFLOW_FILE: &str = "Image.yaml";

/// Where and how a [`Dispatcher`](crate::Dispatcher) sends its request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DispatchConfig {
    pub endpoint: String,
    pub git_ref: String,
    pub api_version: String,
    /// `None` leaves the HTTP client's default in place.
    pub timeout: Option<Duration>,
}

impl DispatchConfig {
    /// Targets `workflow_file` in `owner/repository` on github.com.
    pub fn for_workflow(owner: &str, repository: &str, workflow_file: &str) -> Self {
        Self {
            endpoint: dispatch_url(GITHUB_API_BASE, owner, repository, workflow_file),
            git_ref: DEFAULT_GIT_REF.to_string(),
            api_version: DEFAULT_API_VERSION.to_string(),
            timeout: None,
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn with_git_ref(mut self, git_ref: impl Into<String>) -> Self {
        self.git_ref = git_ref.into();
        self
    }

    pub fn with_api_version(mut self, api_version: impl Into<String>) -> Self {
        self.api_version = api_version.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self::for_workflow(DEFAULT_OWNER, DEFAULT_REPOSITORY, DEFAULT_WORKFLOW_FILE)
    }
}

pub fn dispatch_url(api_base: &str, owner: &str, repository: &str, workflow_file: &str) -> String {
    format!(
        "{}/repos/{owner}/{repository}/actions/workflows/{workflow_file}/dispatches",
        api_base.trim_end_matches('/')
    )
}
