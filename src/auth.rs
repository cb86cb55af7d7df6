use std::fmt;

use crate::adapter::RestRequest;

pub const ACCEPT_HEADER: &str = "Accept";
pub const AUTHORIZATION_HEADER: &str = "Authorization";
pub const API_VERSION_HEADER: &str = "X-GitHub-Api-Version";

pub const GITHUB_MEDIA_TYPE: &str = "application/vnd.github+json";
pub const DEFAULT_API_VERSION: &str = "2022-11-28";

/// The three headers GitHub needs on an authenticated REST call.
///
/// Built per dispatch from the caller's token and never shared between
/// tokens. `Debug` redacts the token.
#[derive(Clone, PartialEq, Eq)]
pub struct AuthHeaders {
    accept: String,
    authorization: String,
    api_version: String,
}

impl AuthHeaders {
    pub fn from_token(access_token: &str) -> Self {
        Self::with_api_version(access_token, DEFAULT_API_VERSION)
    }

    pub fn with_api_version(access_token: &str, api_version: impl Into<String>) -> Self {
        Self {
            accept: GITHUB_MEDIA_TYPE.to_string(),
            authorization: format!("Bearer {access_token}"),
            api_version: api_version.into(),
        }
    }

    pub fn accept(&self) -> &str {
        &self.accept
    }

    pub fn authorization(&self) -> &str {
        &self.authorization
    }

    pub fn api_version(&self) -> &str {
        &self.api_version
    }

    pub fn pairs(&self) -> [(&'static str, &str); 3] {
        [
            (ACCEPT_HEADER, self.accept.as_str()),
            (AUTHORIZATION_HEADER, self.authorization.as_str()),
            (API_VERSION_HEADER, self.api_version.as_str()),
        ]
    }

    /// Sets each header on `request`, replacing whatever was there.
    pub fn apply(&self, request: RestRequest) -> RestRequest {
        self.pairs()
            .into_iter()
            .fold(request, |request, (key, value)| request.set_header(key, value))
    }
}

impl fmt::Debug for AuthHeaders {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthHeaders")
            .field("accept", &self.accept)
            .field("authorization", &"Bearer <redacted>")
            .field("api_version", &self.api_version)
            .finish()
    }
}
