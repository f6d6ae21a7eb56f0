use std::sync::Arc;

use tracing::{debug, warn};

use crate::errors::ClientError;
use crate::navigate::{Navigator, Screen};
use crate::store::SessionStore;
use crate::transport::{ApiRequest, ApiResponse, ApiTransport, Method, RequestBody};

const AUTH_FAILURE_STATUS: u16 = 401;

/// Single choke point for every request to the experiment service.
///
/// Attaches the bearer credential when the session holds one, and reacts to
/// an auth-failure response by clearing the credential and routing to the
/// login screen (unless already there). This is the only component allowed
/// to mutate session state as a reaction to a response. Failures are never
/// retried here: run submission is not idempotent, so retry policy belongs
/// to the caller.
#[derive(Clone)]
pub struct ApiGateway {
    transport: Arc<dyn ApiTransport>,
    store: SessionStore,
    navigator: Arc<dyn Navigator>,
}

impl ApiGateway {
    /// Creates a gateway over the given transport, session, and navigator.
    pub fn new(
        transport: Arc<dyn ApiTransport>,
        store: SessionStore,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        Self {
            transport,
            store,
            navigator,
        }
    }

    /// Returns the session store this gateway reads credentials from.
    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    /// GET `path` and decode the JSON response.
    pub async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
    ) -> Result<T, ClientError> {
        self.dispatch(Method::Get, path, RequestBody::Empty)
            .await?
            .json()
    }

    /// GET `path` and return the raw body bytes (report downloads).
    pub async fn get_bytes(&self, path: &str) -> Result<bytes::Bytes, ClientError> {
        Ok(self
            .dispatch(Method::Get, path, RequestBody::Empty)
            .await?
            .body)
    }

    /// POST a JSON body to `path` and decode the JSON response.
    pub async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T, ClientError>
    where
        B: serde::Serialize,
        T: serde::de::DeserializeOwned,
    {
        let value = serde_json::to_value(body)
            .map_err(|e| ClientError::Config(format!("unserializable request body: {e}")))?;
        self.dispatch(Method::Post, path, RequestBody::Json(value))
            .await?
            .json()
    }

    /// POST a multipart file upload to `path` and decode the JSON response.
    pub async fn upload_file<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> Result<T, ClientError> {
        self.dispatch(
            Method::Post,
            path,
            RequestBody::FileUpload {
                field: "file".to_string(),
                file_name: file_name.to_string(),
                bytes,
            },
        )
        .await?
        .json()
    }

    async fn dispatch(
        &self,
        method: Method,
        path: &str,
        body: RequestBody,
    ) -> Result<ApiResponse, ClientError> {
        let request = ApiRequest {
            method,
            path: path.to_string(),
            bearer: self.store.credential(),
            body,
        };
        debug!(?method, path, "dispatching request");
        let response = self.transport.execute(request).await?;

        if response.status == AUTH_FAILURE_STATUS {
            warn!(path, "credential rejected, forcing re-login");
            self.store.clear_credential();
            if !self.navigator.current().is_auth() {
                self.navigator.goto(Screen::Auth);
            }
            return Err(ClientError::unauthenticated(remote_detail(
                &response.body,
                response.status,
            )));
        }
        if !response.is_success() {
            return Err(ClientError::remote(
                Some(response.status),
                remote_detail(&response.body, response.status),
            ));
        }
        Ok(response)
    }
}

/// Extracts the service's `detail` diagnostic, falling back to a generic
/// message when the body is not the expected error shape.
fn remote_detail(body: &[u8], status: u16) -> String {
    if let Ok(value) = serde_json::from_slice::<serde_json::Value>(body)
        && let Some(detail) = value.get("detail")
    {
        if let Some(text) = detail.as_str() {
            return text.to_string();
        }
        return detail.to_string();
    }
    format!("request failed with status {status}")
}
