use chrono::Utc;
use tracing::{debug, instrument};

use crate::adapter::{Client, RestError, RestErrorKind, RestRequest, RestTransport};
use crate::auth::AuthHeaders;
use crate::config::DispatchConfig;
use crate::error::DispatchError;
use crate::payload::DispatchPayload;

/// The only status GitHub's dispatch call is accepted with.
pub const ACCEPTED_STATUS: u16 = 200;

/// Sends workflow dispatch requests to the endpoint named in its config.
#[derive(Clone)]
pub struct Dispatcher {
    config: DispatchConfig,
    client: Client,
}

impl Dispatcher {
    pub fn new(config: DispatchConfig) -> Self {
        Self {
            config,
            client: Client::new(),
        }
    }

    pub fn with_transport<T>(config: DispatchConfig, transport: T) -> Self
    where
        T: RestTransport + 'static,
    {
        Self {
            config,
            client: Client::with_transport(transport),
        }
    }

    pub fn config(&self) -> &DispatchConfig {
        &self.config
    }

    /// Builds a payload against this dispatcher's configured ref.
    pub fn build_payload(
        &self,
        image_name: impl Into<String>,
        image_trigger_blob: impl Into<String>,
    ) -> DispatchPayload {
        DispatchPayload::at(
            self.config.git_ref.clone(),
            image_name,
            image_trigger_blob,
            Utc::now().timestamp(),
        )
    }

    /// Serializes the request and headers without sending anything.
    pub fn prepare(
        &self,
        payload: &DispatchPayload,
        access_token: &str,
    ) -> Result<RestRequest, DispatchError> {
        let body = sonic_rs::to_vec(payload)
            .map_err(|err| DispatchError::Serialization(err.to_string()))?;
        let headers = AuthHeaders::with_api_version(access_token, self.config.api_version.as_str());
        let request = RestRequest::post(self.config.endpoint.as_str())
            .with_body(body)
            .with_timeout(self.config.timeout);
        Ok(headers.apply(request))
    }

    /// Sends `payload` exactly once. Only `200 OK` counts as success.
    #[instrument(
        name = "workflow_dispatch",
        skip_all,
        fields(image = %payload.image_name(), external_ref_id = %payload.external_ref_id())
    )]
    pub async fn dispatch(
        &self,
        payload: DispatchPayload,
        access_token: &str,
    ) -> Result<(), DispatchError> {
        let request = self.prepare(&payload, access_token)?;

        debug!(endpoint = %request.url, "sending workflow dispatch");
        let response = match self.client.execute(request).await {
            Ok(response) => response,
            Err(err) => return accept_failure(err),
        };

        if response.status() != ACCEPTED_STATUS {
            debug!(status = response.status(), "workflow dispatch rejected");
            return Err(DispatchError::rejected(response.status(), response.body_text()));
        }

        debug!(elapsed = ?response.elapsed, "workflow dispatch accepted");
        Ok(())
    }

    /// Runs [`dispatch`](Self::dispatch) on a current-thread runtime and
    /// blocks until it settles. Must not be called from inside a runtime.
    pub fn dispatch_blocking(
        &self,
        payload: DispatchPayload,
        access_token: &str,
    ) -> Result<(), DispatchError> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|err| DispatchError::Runtime(err.to_string()))?;
        runtime.block_on(self.dispatch(payload, access_token))
    }
}

fn accept_failure(err: RestError) -> Result<(), DispatchError> {
    match (err.kind(), err.status) {
        // body of an accepted dispatch is never looked at
        (_, Some(ACCEPTED_STATUS)) => {
            debug!(error = %err.message, "ignoring unreadable body on accepted dispatch");
            Ok(())
        }
        (_, Some(status)) => Err(DispatchError::ResponseRead {
            status,
            message: err.message,
        }),
        (RestErrorKind::Internal, None) => Err(DispatchError::RequestConstruction(err.message)),
        (_, None) => Err(DispatchError::Transport(err.message)),
    }
}
