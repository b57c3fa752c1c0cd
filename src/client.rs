//! HTTP client for the Roster API.
//!
//! [`UsersApi`] is the seam the terminal widgets talk through; [`HttpApi`]
//! implements it with `reqwest`. Tests substitute an in-process fake.

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;

use roster_core::paging::PageRequest;
use roster_core::responses::{ClearResponse, ErrorResponse, ImportResponse, ListResponse};

/// Client-side failure, split by where it happened.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The request never got an HTTP response.
    #[error("cannot reach server at {url}: {source}")]
    Connect {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    /// The server answered with a 4xx/5xx.
    #[error("{message}")]
    Server { status: StatusCode, message: String },
    /// The server answered 2xx with a body we could not decode.
    #[error("unexpected response from server: {0}")]
    Decode(#[source] reqwest::Error),
    /// The request could not be built (e.g. an unparseable MIME type).
    #[error("invalid request: {0}")]
    Request(#[source] reqwest::Error),
}

impl ClientError {
    /// The message the server sent, if this is a server-side rejection.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            Self::Server { message, .. } => Some(message),
            _ => None,
        }
    }
}

/// Operations the terminal widgets need from the server.
#[async_trait]
pub trait UsersApi: Send + Sync {
    /// Upload CSV bytes as multipart field `file`.
    async fn import_csv(
        &self,
        file_name: &str,
        mime: &str,
        bytes: Vec<u8>,
    ) -> Result<ImportResponse, ClientError>;

    async fn list_users(&self, req: PageRequest) -> Result<ListResponse, ClientError>;

    async fn clear_users(&self) -> Result<ClearResponse, ClientError>;
}

/// [`UsersApi`] over HTTP.
pub struct HttpApi {
    client: reqwest::Client,
    base_url: String,
}

impl HttpApi {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn send(&self, req: reqwest::RequestBuilder) -> Result<Response, ClientError> {
        req.send().await.map_err(|source| ClientError::Connect {
            url: self.base_url.clone(),
            source,
        })
    }
}

/// Decode a 2xx body as `T`, or turn a 4xx/5xx into [`ClientError::Server`].
async fn decode<T: DeserializeOwned>(resp: Response) -> Result<T, ClientError> {
    let status = resp.status();
    if status.is_success() {
        return resp.json::<T>().await.map_err(ClientError::Decode);
    }
    let message = match resp.json::<ErrorResponse>().await {
        Ok(body) => body.message,
        Err(_) => format!("server returned HTTP {}", status),
    };
    Err(ClientError::Server { status, message })
}

#[async_trait]
impl UsersApi for HttpApi {
    async fn import_csv(
        &self,
        file_name: &str,
        mime: &str,
        bytes: Vec<u8>,
    ) -> Result<ImportResponse, ClientError> {
        let part = Part::bytes(bytes)
            .file_name(file_name.to_string())
            .mime_str(mime)
            .map_err(ClientError::Request)?;
        let form = Form::new().part("file", part);
        let resp = self
            .send(self.client.post(self.url("/users/import")).multipart(form))
            .await?;
        decode(resp).await
    }

    async fn list_users(&self, req: PageRequest) -> Result<ListResponse, ClientError> {
        let resp = self
            .send(
                self.client
                    .get(self.url("/users"))
                    .query(&[("page", req.page), ("limit", req.limit)]),
            )
            .await?;
        decode(resp).await
    }

    async fn clear_users(&self) -> Result<ClearResponse, ClientError> {
        let resp = self.send(self.client.delete(self.url("/users"))).await?;
        decode(resp).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash() {
        let api = HttpApi::new("http://127.0.0.1:5000/");
        assert_eq!(api.base_url(), "http://127.0.0.1:5000");
        assert_eq!(api.url("/users"), "http://127.0.0.1:5000/users");
    }

    #[tokio::test]
    async fn test_unreachable_server_is_connect_error() {
        // Port 9 (discard) is closed on loopback in any sane test env.
        let api = HttpApi::new("http://127.0.0.1:9");
        let err = api.list_users(PageRequest::default()).await.unwrap_err();
        assert!(matches!(err, ClientError::Connect { .. }));
        assert!(err.server_message().is_none());
    }
}
