//! The `auth/v2` API: login and CSRF token probing.

use std::sync::Arc;

use log::info;
use reqwest::Method;
use serde::{Deserialize, Serialize};

use crate::client::Body;
use crate::{Client, Result};

const SERVICE: &str = "auth";

/// Credentials type of a login request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LoginType {
    /// Username and password
    Username,
    /// Quick login token code and private key, see
    /// [`AuthTokenService`](crate::services::token::AuthTokenService)
    #[serde(rename = "AuthToken")]
    Token,
}

/// User returned by a login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginUser {
    pub id: i64,
    pub name: String,
    pub display_name: String,
}

/// Two step verification challenge, present when the account requires it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TwoStepVerificationData {
    pub media_type: i64,
    pub ticket: String,
}

/// The LoginResponse API model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Login {
    #[serde(default)]
    pub user: Option<LoginUser>,
    #[serde(default)]
    pub two_step_verification_data: Option<TwoStepVerificationData>,
    #[serde(default)]
    pub identity_verification_login_ticket: Option<String>,
    #[serde(default)]
    pub is_banned: bool,
    #[serde(default)]
    pub account_blob: Option<String>,
    #[serde(default)]
    pub should_update_email: bool,
    #[serde(default)]
    pub recovery_email: Option<String>,
}

#[derive(Serialize, Debug)]
struct LoginRequest<'a> {
    ctype: LoginType,
    cvalue: &'a str,
    password: &'a str,
}

/// Accessor of the `auth/v2` API.
#[derive(Debug, Clone)]
pub struct AuthService {
    client: Arc<Client>,
}

impl AuthService {
    pub fn new(client: Arc<Client>) -> Self {
        AuthService { client }
    }

    /// Obtain a new CSRF token by sending an empty login request.
    ///
    /// The server answers `403 Forbidden` with a `x-csrf-token` header, which
    /// the client keeps. The rejection is expected and not an error as long
    /// as this response issued a token. A token already held by the client
    /// is replaced.
    pub async fn set_csrf_token(&self) -> Result<()> {
        info!("request csrf token");
        self.client.request_csrf_token().await
    }

    /// Log in with the given credentials.
    ///
    /// On success the server sets the `.ROBLOSECURITY` cookie, which the
    /// client keeps for future requests. A CSRF token is obtained first if
    /// the client holds none.
    ///
    /// # Arguments
    ///
    /// * `value` - Username, or the token code for [`LoginType::Token`].
    /// * `password` - Password, or the token private key for [`LoginType::Token`].
    /// * `login_type` - Type of the credentials.
    pub async fn create_login(
        &self,
        value: &str,
        password: &str,
        login_type: LoginType,
    ) -> Result<Login> {
        info!("request login as {:?}", login_type);
        self.client.csrf_required().await?;

        let body = Body::json(&LoginRequest {
            ctype: login_type,
            cvalue: value,
            password,
        })?;
        self.client
            .execute(Method::POST, SERVICE, "v2/login", Some(body))
            .await
    }
}
