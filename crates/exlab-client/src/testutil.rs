//! Shared test doubles: a scripted transport standing in for the service.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::errors::ClientError;
use crate::transport::{ApiRequest, ApiResponse, ApiTransport};

/// Transport that replays scripted responses and records every request.
pub(crate) struct FakeTransport {
    calls: AtomicUsize,
    responses: Mutex<VecDeque<Result<ApiResponse, ClientError>>>,
    seen: Mutex<Vec<ApiRequest>>,
    hang_when_empty: bool,
}

impl FakeTransport {
    pub fn returning(responses: Vec<Result<ApiResponse, ClientError>>) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            responses: Mutex::new(responses.into()),
            seen: Mutex::new(Vec::new()),
            hang_when_empty: false,
        }
    }

    /// Transport whose requests never resolve, for in-flight gating tests.
    pub fn pending() -> Self {
        Self {
            calls: AtomicUsize::new(0),
            responses: Mutex::new(VecDeque::new()),
            seen: Mutex::new(Vec::new()),
            hang_when_empty: true,
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<ApiRequest> {
        self.seen.lock().expect("seen lock").clone()
    }
}

#[async_trait::async_trait]
impl ApiTransport for FakeTransport {
    async fn execute(&self, req: ApiRequest) -> Result<ApiResponse, ClientError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.seen.lock().expect("seen lock").push(req);
        let next = self.responses.lock().expect("responses lock").pop_front();
        match next {
            Some(response) => response,
            None if self.hang_when_empty => {
                std::future::pending::<Result<ApiResponse, ClientError>>().await
            }
            None => Err(ClientError::transport("no scripted response left")),
        }
    }
}

/// Scripted JSON response with the given status.
pub(crate) fn json_response(
    status: u16,
    value: serde_json::Value,
) -> Result<ApiResponse, ClientError> {
    Ok(ApiResponse {
        status,
        body: bytes::Bytes::from(value.to_string()),
    })
}
