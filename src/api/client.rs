use std::time::Duration;

use reqwest::{multipart::Form, IntoUrl, Method, RequestBuilder, Response, Url};
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, warn};

use super::error::ApiError;
use crate::auth::session::Session;

/// How a request treats the session token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Auth {
    /// Refuse to send without a token.
    Required,
    /// Attach the token when there is one.
    IfPresent,
    /// Never attach the token, even when signed in.
    Never,
}

#[derive(Clone)]
pub struct ApiClient {
    base_url: String,
    http: reqwest::Client,
    session: Session,
}

impl ApiClient {
    pub fn new(
        base_url: impl Into<String>,
        timeout: Duration,
        session: Session,
    ) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(ApiError::transport)?;
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Ok(Self {
            base_url,
            http,
            session,
        })
    }

    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Endpoint built from raw path segments; each one is percent-encoded,
    /// so `?`, `#` or `/` inside a segment stay part of it.
    pub fn segment_url(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = Url::parse(&self.base_url).map_err(ApiError::transport)?;
        url.path_segments_mut()
            .map_err(|()| ApiError::Transport(format!("{} cannot be a base URL", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    pub async fn get_json<T>(&self, path: &str, auth: Auth) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
    {
        let req = self.request(Method::GET, self.endpoint(path), auth)?;
        decode_json(self.send(req, path).await?).await
    }

    pub async fn get_json_segments<T>(&self, segments: &[&str], auth: Auth) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
    {
        let url = self.segment_url(segments)?;
        let path = url.path().to_string();
        let req = self.request(Method::GET, url, auth)?;
        decode_json(self.send(req, &path).await?).await
    }

    pub async fn get_json_with_query<T, Q>(
        &self,
        path: &str,
        query: &Q,
        auth: Auth,
    ) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        let req = self.request(Method::GET, self.endpoint(path), auth)?.query(query);
        decode_json(self.send(req, path).await?).await
    }

    pub async fn post_json<B, T>(&self, path: &str, body: &B, auth: Auth) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let req = self.request(Method::POST, self.endpoint(path), auth)?.json(body);
        decode_json(self.send(req, path).await?).await
    }

    pub async fn put_json<B, T>(&self, path: &str, body: &B, auth: Auth) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let req = self.request(Method::PUT, self.endpoint(path), auth)?.json(body);
        decode_json(self.send(req, path).await?).await
    }

    pub async fn put_multipart(&self, path: &str, form: Form) -> Result<(), ApiError> {
        let req = self.request(Method::PUT, self.endpoint(path), Auth::Required)?.multipart(form);
        self.send(req, path).await.map(|_| ())
    }

    pub async fn delete(&self, path: &str, auth: Auth) -> Result<(), ApiError> {
        let req = self.request(Method::DELETE, self.endpoint(path), auth)?;
        self.send(req, path).await.map(|_| ())
    }

    fn request(&self, method: Method, url: impl IntoUrl, auth: Auth) -> Result<RequestBuilder, ApiError> {
        let token = match auth {
            Auth::Never => None,
            Auth::Required | Auth::IfPresent => self.session.token(),
        };
        match (auth, token) {
            (Auth::Required, None) => {
                debug!("refusing to call an authenticated endpoint without a token");
                Err(ApiError::MissingToken)
            }
            (_, Some(token)) => Ok(self.http.request(method, url).bearer_auth(token)),
            (_, None) => Ok(self.http.request(method, url)),
        }
    }

    async fn send(&self, req: RequestBuilder, path: &str) -> Result<Response, ApiError> {
        let response = req.send().await.map_err(|e| {
            warn!(error = %e, path, "request failed before a response arrived");
            ApiError::transport(e)
        })?;
        let status = response.status();
        debug!(path, %status, "api response");
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        let err = ApiError::from_response(status.as_u16(), &body);
        warn!(path, %status, error = %err, "api returned an error");
        Err(err)
    }
}

async fn decode_json<T>(response: Response) -> Result<T, ApiError>
where
    T: DeserializeOwned,
{
    response.json::<T>().await.map_err(ApiError::transport)
}
