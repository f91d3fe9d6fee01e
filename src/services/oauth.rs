//! The undocumented parts of the `oauth/v1` API used to authenticate Roblox Studio.
//!
//! The flow is the OAuth authorization code flow with PKCE:
//!
//! 1. [`OAuthService::get_auth_studio_url`] asks for an authorization and
//!    returns the `roblox-studio-auth:` redirect location with its code.
//! 2. [`OAuthService::auth_studio_token`] exchanges that code, together with
//!    the [CodeVerifier], for an [OAuthToken].
//!
//! The randomness of the code verifier is provided by the caller.

use std::{fmt, sync::Arc};

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use log::info;
use reqwest::{Method, Url};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::client::Body;
use crate::path::Query;
use crate::services::users::UserId;
use crate::{Client, Error, Result};

const SERVICE: &str = "apis";

/// An OAuth client id, as found in the Studio OAuth configuration.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OAuthClientId(pub String);

impl fmt::Display for OAuthClientId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A permission requested by an authorization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionScope {
    /// One of `openid`, `profile`, `email`, `verification`, `credentials`,
    /// `age`, `premium` or `roles`.
    #[serde(rename = "scopeType")]
    pub scope_type: String,
    /// `read` and/or `write`
    pub operations: Vec<String>,
}

impl PermissionScope {
    fn read(scope_type: &str) -> Self {
        PermissionScope {
            scope_type: scope_type.to_string(),
            operations: vec!["read".to_string()],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionResourceOwner {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
}

/// Serialized as an empty object, which the API requires.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionResources {}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionResourceInfo {
    pub owner: PermissionResourceOwner,
    pub resources: PermissionResources,
}

/// Token returned by `oauth/v1/token`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OAuthToken {
    pub access_token: String,
    pub expires_in: i64,
    #[serde(default)]
    pub id_token: String,
    pub refresh_token: String,
    /// Space separated scopes
    pub scope: String,
    /// Usually `Bearer`
    pub token_type: String,
}

/// PKCE code verifier of an authorization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeVerifier(String);

impl CodeVerifier {
    /// Create a verifier from random bytes, 32 of them being the usual size.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        CodeVerifier(URL_SAFE_NO_PAD.encode(bytes))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The `S256` code challenge of this verifier.
    pub fn challenge(&self) -> String {
        URL_SAFE_NO_PAD.encode(Sha256::digest(self.0.as_bytes()))
    }

    /// The OAuth state sent along the challenge.
    fn state(&self) -> Result<String> {
        let state = serde_json::json!({
            "random_string": &self.0,
            "pid": "220",
        });
        let encoded = serde_json::to_vec(&state).map_err(Error::Encode)?;
        Ok(URL_SAFE_NO_PAD.encode(encoded))
    }
}

/// Location to authenticate Roblox Studio with, and its verifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthStudioUrl {
    pub url: Url,
    pub verifier: CodeVerifier,
}

impl AuthStudioUrl {
    /// The authorization code carried by the location.
    pub fn code(&self) -> Option<String> {
        self.url
            .query_pairs()
            .find(|(key, _)| key == "code")
            .map(|(_, value)| value.into_owned())
    }
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
struct AuthorizationRequest {
    client_id: OAuthClientId,
    code_challenge: String,
    code_challenge_method: &'static str,
    nonce: &'static str,
    response_types: Vec<&'static str>,
    redirect_uri: &'static str,
    scopes: Vec<PermissionScope>,
    state: String,
    resource_infos: Vec<PermissionResourceInfo>,
}

#[derive(Deserialize, Debug)]
struct AuthorizationResponse {
    location: String,
}

/// Accessor of the `oauth/v1` API.
#[derive(Debug, Clone)]
pub struct OAuthService {
    client: Arc<Client>,
}

impl OAuthService {
    pub fn new(client: Arc<Client>) -> Self {
        OAuthService { client }
    }

    /// Request `oauth/v1/authorizations` to authorize Roblox Studio for `user_id`.
    ///
    /// Requires an authenticated client.
    ///
    /// # Arguments
    ///
    /// * `client_id` - OAuth client id of Roblox Studio.
    /// * `user_id` - The authenticated user.
    /// * `verifier` - Code verifier, to be used again with [`OAuthService::auth_studio_token`].
    pub async fn get_auth_studio_url(
        &self,
        client_id: &OAuthClientId,
        user_id: UserId,
        verifier: CodeVerifier,
    ) -> Result<AuthStudioUrl> {
        info!("request studio authorization for user {}", user_id);

        let request = AuthorizationRequest {
            client_id: client_id.clone(),
            code_challenge: verifier.challenge(),
            code_challenge_method: "S256",
            nonce: "id-roblox",
            response_types: vec!["Code"],
            redirect_uri: "roblox-studio-auth:/",
            scopes: ["openid", "credentials", "profile", "age", "roles", "premium"]
                .into_iter()
                .map(PermissionScope::read)
                .collect(),
            state: verifier.state()?,
            resource_infos: vec![PermissionResourceInfo {
                owner: PermissionResourceOwner {
                    id: user_id.to_string(),
                    kind: "User".to_string(),
                },
                resources: PermissionResources::default(),
            }],
        };

        let response: AuthorizationResponse = self
            .client
            .execute(
                Method::POST,
                SERVICE,
                "oauth/v1/authorizations",
                Some(Body::json(&request)?),
            )
            .await?;

        Ok(AuthStudioUrl {
            url: Url::parse(&response.location)?,
            verifier,
        })
    }

    /// Request `oauth/v1/token` to exchange the code of `auth_url` for a token.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] without sending anything when `auth_url`
    /// carries no code.
    pub async fn auth_studio_token(
        &self,
        client_id: &OAuthClientId,
        auth_url: &AuthStudioUrl,
    ) -> Result<OAuthToken> {
        let code = auth_url
            .code()
            .ok_or_else(|| Error::Validation("authorization location has no code".to_string()))?;
        info!("request studio token for client {}", client_id);

        let mut form = Query::new();
        form.add("code", code);
        form.add("grant_type", "authorization_code");
        form.add("client_id", client_id.0.as_str());
        form.add("code_verifier", auth_url.verifier.as_str());

        self.client
            .execute(Method::POST, SERVICE, "oauth/v1/token", Some(Body::form(form)))
            .await
    }
}
