use crate::config::ServiceConfig;
use crate::errors::ClientError;

/// HTTP method subset used by the experiment service.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

/// Request payload, shaped independently of the HTTP engine so fakes can
/// inspect it without touching reqwest types.
#[derive(Clone, Debug)]
pub enum RequestBody {
    Empty,
    Json(serde_json::Value),
    /// Multipart file upload under the given form field name.
    FileUpload {
        field: String,
        file_name: String,
        bytes: Vec<u8>,
    },
}

/// One outbound request to the experiment service.
#[derive(Clone, Debug)]
pub struct ApiRequest {
    pub method: Method,
    /// Path relative to the service base URL, including any query string.
    pub path: String,
    /// Bearer credential to attach, if the session holds one.
    pub bearer: Option<String>,
    pub body: RequestBody,
}

/// Raw response: status plus body bytes, decoded by the caller.
#[derive(Clone, Debug)]
pub struct ApiResponse {
    pub status: u16,
    pub body: bytes::Bytes,
}

impl ApiResponse {
    /// Returns true for 2xx statuses.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Deserializes the body as JSON.
    pub fn json<T: serde::de::DeserializeOwned>(&self) -> Result<T, ClientError> {
        serde_json::from_slice(&self.body)
            .map_err(|e| ClientError::transport(format!("invalid response body: {e}")))
    }
}

/// Seam between the gateway and the HTTP engine.
///
/// Transport errors mean no usable response was obtained; non-2xx statuses
/// are returned as ordinary responses and classified by the gateway.
#[async_trait::async_trait]
pub trait ApiTransport: Send + Sync {
    async fn execute(&self, req: ApiRequest) -> Result<ApiResponse, ClientError>;
}

/// Default transport backed by an async reqwest client.
pub struct ReqwestTransport {
    client: reqwest::Client,
    config: ServiceConfig,
}

impl ReqwestTransport {
    /// Builds a transport from service configuration.
    pub fn new(config: ServiceConfig) -> Result<Self, ClientError> {
        config.validate()?;
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ClientError::Config(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { client, config })
    }
}

#[async_trait::async_trait]
impl ApiTransport for ReqwestTransport {
    async fn execute(&self, req: ApiRequest) -> Result<ApiResponse, ClientError> {
        let url = self.config.url(&req.path);
        let mut builder = match req.method {
            Method::Get => self.client.get(&url),
            Method::Post => self.client.post(&url),
        };
        if let Some(token) = req.bearer.as_ref() {
            builder = builder.bearer_auth(token);
        }
        builder = match req.body {
            RequestBody::Empty => builder,
            RequestBody::Json(value) => builder.json(&value),
            RequestBody::FileUpload {
                field,
                file_name,
                bytes,
            } => {
                let part = reqwest::multipart::Part::bytes(bytes).file_name(file_name);
                builder.multipart(reqwest::multipart::Form::new().part(field, part))
            }
        };

        let response = builder
            .send()
            .await
            .map_err(|e| ClientError::transport(format!("request to {url} failed: {e}")))?;
        let status = response.status().as_u16();
        let body = response
            .bytes()
            .await
            .map_err(|e| ClientError::transport(format!("failed to read response body: {e}")))?;
        Ok(ApiResponse { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_covers_2xx_only() {
        let ok = ApiResponse {
            status: 201,
            body: bytes::Bytes::new(),
        };
        let not_found = ApiResponse {
            status: 404,
            body: bytes::Bytes::new(),
        };
        assert!(ok.is_success());
        assert!(!not_found.is_success());
    }

    #[test]
    fn json_decode_error_is_transport() {
        let resp = ApiResponse {
            status: 200,
            body: bytes::Bytes::from_static(b"not json"),
        };
        let err = resp.json::<serde_json::Value>().expect_err("should fail");
        assert!(matches!(err, ClientError::Transport(_)));
    }
}
