//! The undocumented `auth-token-service/v1` API, used by quick login.
//!
//! A quick login creates a [Token] whose code is entered on an already
//! authenticated device. Once its status is validated, the token code and
//! private key are used as credentials of a
//! [`LoginType::Token`](crate::services::auth::LoginType::Token) login.

use std::sync::Arc;

use log::info;
use reqwest::Method;
use serde::{Deserialize, Serialize};

use crate::client::Body;
use crate::{Client, Result};

const SERVICE: &str = "apis";

/// Model returned by `login/create`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Token {
    pub code: String,
    pub status: String,
    pub private_key: String,
    pub expiration_time: String,
    #[serde(default)]
    pub image_path: String,
}

/// Model returned by `login/status`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenStatus {
    pub status: String,
    #[serde(default)]
    pub account_name: Option<String>,
    #[serde(rename = "accountPictureUrl", default)]
    pub account_picture_url: Option<String>,
    pub expiration_time: String,
}

impl TokenStatus {
    /// Whether the token was entered and accepted on another device.
    pub fn is_validated(&self) -> bool {
        self.status == "Validated"
    }
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
struct TokenStatusRequest<'a> {
    code: &'a str,
    private_key: &'a str,
}

/// Accessor of the `auth-token-service/v1` API.
#[derive(Debug, Clone)]
pub struct AuthTokenService {
    client: Arc<Client>,
}

impl AuthTokenService {
    pub fn new(client: Arc<Client>) -> Self {
        AuthTokenService { client }
    }

    /// Request `auth-token-service/v1/login/create` to create a new token.
    pub async fn create_token(&self) -> Result<Token> {
        info!("request new login token");
        self.client
            .execute(
                Method::POST,
                SERVICE,
                "auth-token-service/v1/login/create",
                None,
            )
            .await
    }

    /// Request `auth-token-service/v1/login/status` to get the status of `token`.
    ///
    /// A CSRF token is obtained first if the client holds none.
    pub async fn get_token_status(&self, token: &Token) -> Result<TokenStatus> {
        info!("request status of login token {}", &token.code);
        self.client.csrf_required().await?;

        let body = Body::json(&TokenStatusRequest {
            code: &token.code,
            private_key: &token.private_key,
        })?;
        self.client
            .execute(
                Method::POST,
                SERVICE,
                "auth-token-service/v1/login/status",
                Some(body),
            )
            .await
    }
}
