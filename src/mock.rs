//! In-memory [`RestTransport`] for deterministic dispatch tests.

use std::{
    collections::VecDeque,
    sync::{Arc, Mutex},
    time::Instant,
};

use bytes::Bytes;

use super::adapter::{
    RestBytes, RestError, RestFuture, RestRequest, RestResponse, RestResult, RestTransport,
    RestTransportState,
};

#[derive(Clone, Debug, Default)]
pub enum MockBehavior {
    /// Answer with the next queued response, or an empty `200`.
    #[default]
    Pass,
    ConnectError {
        reason: String,
    },
    /// Status line arrives, then the body cannot be read.
    ReceiveError {
        status: u16,
        reason: String,
    },
    TimeoutError {
        reason: String,
    },
    InternalError {
        reason: String,
    },
}

impl MockBehavior {
    pub fn pass() -> Self {
        Self::Pass
    }

    pub fn connect_error(reason: impl Into<String>) -> Self {
        Self::ConnectError {
            reason: reason.into(),
        }
    }

    pub fn receive_error(status: u16, reason: impl Into<String>) -> Self {
        Self::ReceiveError {
            status,
            reason: reason.into(),
        }
    }

    pub fn timeout_error(reason: impl Into<String>) -> Self {
        Self::TimeoutError {
            reason: reason.into(),
        }
    }

    pub fn internal_error(reason: impl Into<String>) -> Self {
        Self::InternalError {
            reason: reason.into(),
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct MockBehaviorPlan {
    request: VecDeque<MockBehavior>,
}

impl MockBehaviorPlan {
    pub fn push(&mut self, behavior: MockBehavior) -> &mut Self {
        self.request.push_back(behavior);
        self
    }

    pub fn pop(&mut self) -> MockBehavior {
        self.request.pop_front().unwrap_or_default()
    }
}

#[derive(Clone, Debug)]
pub struct MockResponse {
    pub status: u16,
    pub headers: Vec<(String, RestBytes)>,
    pub body: RestBytes,
}

impl MockResponse {
    pub fn new(status: u16, body: impl Into<RestBytes>) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: body.into(),
        }
    }

    pub fn text(status: u16, body: impl Into<String>) -> Self {
        Self::new(status, body.into())
    }

    pub fn empty(status: u16) -> Self {
        Self::new(status, Bytes::new())
    }
}

#[derive(Clone, Debug)]
pub struct MockRestStateSnapshot {
    pub state: RestTransportState,
    pub request_count: usize,
    pub last_url: Option<String>,
    pub last_status: Option<u16>,
    pub behavior_remaining: usize,
    pub response_queue_len: usize,
    pub last_error: Option<String>,
}

#[derive(Debug)]
struct MockRestAdapterState {
    state: RestTransportState,
    request_count: usize,
    last_url: Option<String>,
    last_status: Option<u16>,
    behavior_plan: MockBehaviorPlan,
    response_queue: VecDeque<MockResponse>,
    outbound_log: Vec<RestRequest>,
    last_error: Option<String>,
}

impl MockRestAdapterState {
    fn snapshot(&self) -> MockRestStateSnapshot {
        MockRestStateSnapshot {
            state: self.state,
            request_count: self.request_count,
            last_url: self.last_url.clone(),
            last_status: self.last_status,
            behavior_remaining: self.behavior_plan.request.len(),
            response_queue_len: self.response_queue.len(),
            last_error: self.last_error.clone(),
        }
    }
}

impl Default for MockRestAdapterState {
    fn default() -> Self {
        Self {
            state: RestTransportState::Idle,
            request_count: 0,
            last_url: None,
            last_status: None,
            behavior_plan: MockBehaviorPlan::default(),
            response_queue: VecDeque::new(),
            outbound_log: Vec::new(),
            last_error: None,
        }
    }
}

/// Cloneable handle; clones share the same queues and logs.
#[derive(Clone, Debug, Default)]
pub struct MockRestAdapter {
    state: Arc<Mutex<MockRestAdapterState>>,
}

impl MockRestAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_behavior_plan(behavior_plan: MockBehaviorPlan) -> Self {
        let state = MockRestAdapterState {
            behavior_plan,
            ..MockRestAdapterState::default()
        };
        Self {
            state: Arc::new(Mutex::new(state)),
        }
    }

    pub fn with_behavior(behavior: MockBehavior) -> Self {
        let mut plan = MockBehaviorPlan::default();
        plan.push(behavior);
        Self::with_behavior_plan(plan)
    }

    pub fn snapshot(&self) -> MockRestStateSnapshot {
        self.state
            .lock()
            .expect("mock-restapi mutex poisoned while taking snapshot")
            .snapshot()
    }

    pub fn queue_response(&self, response: MockResponse) {
        self.state
            .lock()
            .expect("mock-restapi mutex poisoned while queueing response")
            .response_queue
            .push_back(response);
    }

    pub fn queue_text(&self, status: u16, body: impl Into<String>) {
        self.queue_response(MockResponse::text(status, body));
    }

    /// Requests seen so far, in send order.
    pub fn outbound(&self) -> Vec<RestRequest> {
        self.state
            .lock()
            .expect("mock-restapi mutex poisoned while reading outbound log")
            .outbound_log
            .clone()
    }

    pub fn last_request(&self) -> Option<RestRequest> {
        self.state
            .lock()
            .expect("mock-restapi mutex poisoned while reading outbound log")
            .outbound_log
            .last()
            .cloned()
    }

    fn record_request(&self, request: &RestRequest) -> MockBehavior {
        let mut state = self
            .state
            .lock()
            .expect("mock-restapi mutex poisoned while updating state before execute");
        state.outbound_log.push(request.clone());
        state.request_count += 1;
        state.last_url = Some(request.url.clone());
        state.state = RestTransportState::Busy;
        state.last_error = None;
        state.behavior_plan.pop()
    }

    fn fail(&self, error: RestError) -> RestError {
        let mut state = self
            .state
            .lock()
            .expect("mock-restapi mutex poisoned while recording error");
        state.state = RestTransportState::Error;
        state.last_error = Some(error.message.clone());
        state.last_status = error.status;
        error
    }

    fn respond(&self, start: Instant) -> RestResponse {
        let mut state = self
            .state
            .lock()
            .expect("mock-restapi mutex poisoned while recording inbound response");
        let response = state
            .response_queue
            .pop_front()
            .unwrap_or_else(|| MockResponse::empty(200));
        let elapsed = start.elapsed();
        state.last_status = Some(response.status);
        state.state = RestTransportState::Idle;
        RestResponse {
            status: response.status,
            headers: response.headers,
            body: response.body,
            elapsed,
        }
    }
}

impl RestTransport for MockRestAdapter {
    fn execute(&self, request: RestRequest) -> RestFuture<RestResult<RestResponse>> {
        let adapter = self.clone();
        Box::pin(async move {
            let start = Instant::now();
            let behavior = adapter.record_request(&request);

            match behavior {
                MockBehavior::Pass => Ok(adapter.respond(start)),
                MockBehavior::ConnectError { reason } => {
                    Err(adapter.fail(RestError::connect(reason)))
                }
                MockBehavior::ReceiveError { status, reason } => {
                    Err(adapter.fail(RestError::receive(reason, Some(status))))
                }
                MockBehavior::TimeoutError { reason } => {
                    Err(adapter.fail(RestError::timeout(reason)))
                }
                MockBehavior::InternalError { reason } => {
                    Err(adapter.fail(RestError::internal(reason)))
                }
            }
        })
    }
}
