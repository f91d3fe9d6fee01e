//! HTTP transport core.
//!
//! [`Client`] is the only component performing network exchanges. It builds
//! [`Request`] descriptors from its session state, executes them, keeps the
//! session credential and CSRF token up to date from responses, recovers once
//! from a CSRF token rejection and classifies failed responses with
//! [`classify`].
//!
//! Every service goes through one of four primitives:
//!
//! - [`Client::new_request`] builds a request descriptor
//! - [`Client::bare_do`] executes it and returns the successful response
//! - [`Client::do_json`], [`Client::do_bytes`] and [`Client::do_discard`]
//!   execute it and consume the body
//! - [`Client::execute`] builds, executes and decodes in one call

use std::{fmt, time::Duration};

use bytes::Bytes;
use log::{debug, info, warn};
use reqwest::{
    Method, Response, StatusCode, Url,
    header::{ACCEPT, ACCEPT_ENCODING, CONTENT_TYPE, COOKIE, HeaderMap, HeaderValue, USER_AGENT},
};
use serde::{Serialize, de::DeserializeOwned};

use crate::config::ClientConfig;
use crate::error::{Error, Result, StatusError, classify};
use crate::path::Query;
use crate::session::{COOKIE_SECURITY, HEADER_TOKEN, REDACTED, Session};

/// Body of an outgoing request, encoded once when it is built.
#[derive(Debug, Clone, PartialEq)]
pub enum Body {
    /// JSON encoded body, sent as `application/json`
    Json(Bytes),
    /// Key-value body, sent as `application/x-www-form-urlencoded`
    Form(Query),
}

impl Body {
    /// Encode `value` as a JSON body.
    pub fn json<T: Serialize + ?Sized>(value: &T) -> Result<Body> {
        let encoded = serde_json::to_vec(value).map_err(Error::Encode)?;
        Ok(Body::Json(Bytes::from(encoded)))
    }

    pub fn form(query: Query) -> Body {
        Body::Form(query)
    }

    fn content_type(&self) -> mime::Mime {
        match self {
            Body::Json(_) => mime::APPLICATION_JSON,
            Body::Form(_) => mime::APPLICATION_WWW_FORM_URLENCODED,
        }
    }

    fn into_bytes(self) -> Bytes {
        match self {
            Body::Json(bytes) => bytes,
            Body::Form(query) => Bytes::from(query.encode()),
        }
    }
}

impl From<Query> for Body {
    fn from(query: Query) -> Self {
        Body::Form(query)
    }
}

/// Outgoing request descriptor.
///
/// Built by [`Client::new_request`] with the session state of the moment. The
/// body is kept as an immutable buffer so the request can be replayed as is.
#[derive(Clone)]
pub struct Request {
    method: Method,
    url: Url,
    headers: HeaderMap,
    body: Option<Bytes>,
}

impl Request {
    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Mutable headers, to add request specific headers before execution.
    pub fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    pub fn body(&self) -> Option<&Bytes> {
        self.body.as_ref()
    }

    /// Copy of the request carrying `token` as its CSRF token.
    fn with_token(&self, token: &str) -> Result<Request> {
        let mut request = self.clone();
        request
            .headers
            .insert(HEADER_TOKEN, HeaderValue::from_str(token)?);
        Ok(request)
    }

    fn to_reqwest(&self, http: &reqwest::Client) -> reqwest::Result<reqwest::Request> {
        let mut builder = http
            .request(self.method.clone(), self.url.clone())
            .headers(self.headers.clone());
        if let Some(body) = &self.body {
            builder = builder.body(body.clone());
        }
        builder.build()
    }
}

impl fmt::Debug for Request {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut headers = self.headers.clone();
        if headers.contains_key(COOKIE) {
            headers.insert(COOKIE, HeaderValue::from_static(REDACTED));
        }
        f.debug_struct("Request")
            .field("method", &self.method)
            .field("url", &self.url)
            .field("headers", &headers)
            .field("body", &self.body.as_ref().map(Bytes::len))
            .finish()
    }
}

/// Client of the Roblox web API.
///
/// Holds the underlying HTTP client and the session state: the
/// `.ROBLOSECURITY` credential and the `x-csrf-token` anti-forgery token.
/// Both are picked up from every response and attached to every request built
/// afterwards.
///
/// The session state is guarded by a lock, so one client can be shared by
/// concurrent calls, typically through an [`Arc`](std::sync::Arc) as the
/// [`Services`](crate::services::Services) do. Independent sessions, such as
/// several accounts, each need their own client.
///
/// # Examples
///
/// ```no_run
/// use reqwest::Method;
/// use rbxweb::Client;
///
/// # async fn example() -> rbxweb::Result<()> {
/// let client = Client::new()?;
/// let user: serde_json::Value = client
///     .execute(Method::GET, "users", "v1/users/authenticated", None)
///     .await?;
/// println!("{user}");
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Client {
    /// Underlying HTTP client
    http: reqwest::Client,
    /// Domain suffixed to every service subdomain
    base_domain: String,
    /// Value of the `User-Agent` header
    user_agent: String,
    /// Always `https` outside of tests
    scheme: &'static str,
    session: Session,
}

impl Client {
    /// Create a new [Client] with the default [ClientConfig].
    pub fn new() -> Result<Self> {
        Client::with_config(&ClientConfig::default())
    }

    /// Create a new [Client] from `config`.
    ///
    /// The timeout and proxy settings are applied to the underlying HTTP
    /// client. Response compression is never negotiated.
    pub fn with_config(config: &ClientConfig) -> Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(Duration::from_secs(timeout));
        }
        if let Some(proxy) = &config.proxy {
            builder = builder.proxy(reqwest::Proxy::all(proxy)?);
        }

        Ok(Client::with_http_client(config, builder.build()?))
    }

    /// Create a new [Client] sending its requests through `http`.
    ///
    /// Only the base domain and user agent of `config` are used, transport
    /// settings are the ones of `http`.
    pub fn with_http_client(config: &ClientConfig, http: reqwest::Client) -> Self {
        Client {
            http,
            base_domain: config.base_domain.clone(),
            user_agent: config.user_agent.clone(),
            scheme: "https",
            session: Session::default(),
        }
    }

    /// Send requests over plain HTTP, to reach a local mock server.
    #[cfg(test)]
    pub(crate) fn insecure(mut self) -> Self {
        self.scheme = "http";
        self
    }

    pub fn base_domain(&self) -> &str {
        &self.base_domain
    }

    /// Current `.ROBLOSECURITY` credential, if any.
    pub fn security(&self) -> Option<String> {
        self.session.snapshot().security
    }

    /// Use `security` as the `.ROBLOSECURITY` credential of future requests,
    /// for instance to resume a stored login.
    pub fn set_security(&self, security: impl Into<String>) {
        self.session.set_security(security);
    }

    /// Current CSRF token, if any.
    pub fn token(&self) -> Option<String> {
        self.session.snapshot().token
    }

    /// Build a request to `path` of `service`.
    ///
    /// The request targets `https://{service}.{base_domain}/{path}`, or
    /// `https://{base_domain}/{path}` when `service` is empty. The session
    /// credential and CSRF token are attached when the client holds them.
    ///
    /// # Arguments
    ///
    /// * `method` - HTTP method of the request.
    /// * `service` - Subdomain of the API service, may be empty.
    /// * `path` - Path and query, usually built with [`path`](crate::path::path).
    /// * `body` - Optional JSON or form body.
    pub fn new_request(
        &self,
        method: Method,
        service: &str,
        path: &str,
        body: Option<Body>,
    ) -> Result<Request> {
        let host = if service.is_empty() {
            self.base_domain.clone()
        } else {
            format!("{}.{}", service, &self.base_domain)
        };
        let url = Url::parse(&format!(
            "{}://{}/{}",
            self.scheme,
            host,
            path.trim_start_matches('/')
        ))?;
        debug!("new request {} {} with body: {}", &method, &url, body.is_some());

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT_ENCODING, HeaderValue::from_static("identity"));
        headers.insert(USER_AGENT, HeaderValue::from_str(&self.user_agent)?);

        let credentials = self.session.snapshot();
        if let Some(token) = &credentials.token {
            headers.insert(HEADER_TOKEN, HeaderValue::from_str(token)?);
        }
        if let Some(security) = &credentials.security {
            let cookie = format!("{}={}", COOKIE_SECURITY, security);
            headers.insert(COOKIE, HeaderValue::from_str(&cookie)?);
        }

        let body = match body {
            Some(body) => {
                headers.insert(
                    CONTENT_TYPE,
                    HeaderValue::from_str(body.content_type().as_ref())?,
                );
                Some(body.into_bytes())
            }
            None => None,
        };

        Ok(Request {
            method,
            url,
            headers,
            body,
        })
    }

    /// Execute `request`, leaving the successful response body unread.
    ///
    /// A `.ROBLOSECURITY` cookie or `x-csrf-token` header set by the server is
    /// kept for future requests. When the server rejects the request with
    /// `403 Forbidden` while issuing a new token, the request is sent once
    /// more with that token. The retry is never repeated.
    ///
    /// # Errors
    ///
    /// * [`Error::Transport`] if the exchange fails, without retry.
    /// * The classified error (see [`classify`]) for a status outside of
    ///   `200..300`.
    pub async fn bare_do(&self, request: &Request) -> Result<Response> {
        info!("performing request {} {}", request.method(), request.url().path());

        let mut response = self.send(request).await?;
        let token = self.observe(&response);

        if let (StatusCode::FORBIDDEN, Some(token)) = (response.status(), token) {
            warn!(
                "request {} {} rejected, retrying with a new csrf token",
                request.method(),
                request.url().path()
            );
            response = self.send(&request.with_token(&token)?).await?;
            self.observe(&response);
        }

        if response.status().is_success() {
            return Ok(response);
        }
        Err(failure(response).await)
    }

    /// Execute `request` and decode the JSON response body into `T`.
    pub async fn do_json<T: DeserializeOwned>(&self, request: &Request) -> Result<T> {
        let body = self.do_bytes(request).await?;
        serde_json::from_slice(&body).map_err(Error::Decode)
    }

    /// Execute `request` and return the raw response body.
    pub async fn do_bytes(&self, request: &Request) -> Result<Bytes> {
        let response = self.bare_do(request).await?;
        let status = response.status();
        let body = response.bytes().await?;
        debug!("response {} -> {}", status, String::from_utf8_lossy(&body));
        Ok(body)
    }

    /// Execute `request`, draining and dropping the response body.
    pub async fn do_discard(&self, request: &Request) -> Result<()> {
        let response = self.bare_do(request).await?;
        response.bytes().await?;
        Ok(())
    }

    /// Build a request with [`Client::new_request`] and decode its JSON
    /// response into `T` with [`Client::do_json`].
    pub async fn execute<T: DeserializeOwned>(
        &self,
        method: Method,
        service: &str,
        path: &str,
        body: Option<Body>,
    ) -> Result<T> {
        let request = self.new_request(method, service, path, body)?;
        self.do_json(&request).await
    }

    /// Same as [`Client::execute`], for endpoints whose response is ignored.
    pub async fn execute_discard(
        &self,
        method: Method,
        service: &str,
        path: &str,
        body: Option<Body>,
    ) -> Result<()> {
        let request = self.new_request(method, service, path, body)?;
        self.do_discard(&request).await
    }

    /// Obtain a new CSRF token with an empty login request.
    ///
    /// The server rejects the request with `403 Forbidden` and issues a token
    /// in the process. The request is sent once, the rejection is not retried.
    ///
    /// # Errors
    ///
    /// * [`Error::Transport`] if the request fails to be sent.
    /// * The classified error (see [`classify`]) if the response issued no
    ///   token, or [`Error::MissingToken`] if that response was a success.
    pub async fn request_csrf_token(&self) -> Result<()> {
        let request = self.new_request(Method::POST, "auth", "v2/login", None)?;
        info!("performing csrf token request");

        let response = self.send(&request).await?;
        match self.observe(&response) {
            Some(_) => {
                response.bytes().await?;
                Ok(())
            }
            None if response.status().is_success() => Err(Error::MissingToken),
            None => Err(failure(response).await),
        }
    }

    /// Make sure the client holds a CSRF token, requesting one with
    /// [`Client::request_csrf_token`] otherwise.
    ///
    /// # Errors
    ///
    /// * [`Error::Transport`] if the request fails to be sent.
    /// * [`Error::MissingToken`] if the server did not issue a token.
    pub async fn csrf_required(&self) -> Result<()> {
        if self.token().is_some() {
            return Ok(());
        }

        match self.request_csrf_token().await {
            Ok(()) => Ok(()),
            Err(Error::Transport(err)) => Err(Error::Transport(err)),
            Err(err) => {
                debug!("csrf token request answered with: {}", err);
                Err(Error::MissingToken)
            }
        }
    }

    async fn send(&self, request: &Request) -> Result<Response> {
        let request = request.to_reqwest(&self.http)?;
        Ok(self.http.execute(request).await?)
    }

    /// Record the credential and token issued by `response`.
    ///
    /// Returns the token found in the response headers, if any.
    fn observe(&self, response: &Response) -> Option<String> {
        if let Some(cookie) = response
            .cookies()
            .filter(|cookie| cookie.name() == COOKIE_SECURITY)
            .last()
        {
            self.session.set_security(cookie.value());
        }

        let token = response
            .headers()
            .get(HEADER_TOKEN)
            .and_then(|value| value.to_str().ok())
            .filter(|token| !token.is_empty())
            .map(str::to_string)?;
        self.session.set_token(token.as_str());
        Some(token)
    }
}

/// Read the body of the failed `response` and classify it.
async fn failure(response: Response) -> Error {
    let status = response.status();
    let content_type = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
        .to_string();
    let body = match response.bytes().await {
        Ok(body) => body,
        Err(err) => {
            warn!("failed to read error response body: {}", err);
            return StatusError { status }.into();
        }
    };
    debug!("error response {} -> {}", status, String::from_utf8_lossy(&body));

    classify(status, &content_type, &body)
}
