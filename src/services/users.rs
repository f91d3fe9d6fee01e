//! The `users/v1` API.

use std::sync::Arc;

use log::info;
use reqwest::Method;
use serde::{Deserialize, Serialize};

use super::{DataResponse, first};
use crate::client::Body;
use crate::{Client, Error, Result};

const SERVICE: &str = "users";

super::id_type! {
    /// A user account.
    UserId
}

/// The AuthenticatedUserResponse API model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthenticatedUser {
    pub id: UserId,
    pub name: String,
    pub display_name: String,
}

/// The VerifiedBadgeUserResponse API model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "hasVerifiedBadge", default)]
    pub verified: bool,
    pub id: UserId,
    pub name: String,
    pub display_name: String,
}

/// The MultiGetByUserIdRequest API model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserIdRequest {
    pub user_ids: Vec<UserId>,
    pub exclude_banned_users: bool,
}

impl UserIdRequest {
    pub fn new(user_ids: Vec<UserId>) -> Self {
        UserIdRequest {
            user_ids,
            exclude_banned_users: false,
        }
    }
}

/// Accessor of the `users/v1` API.
#[derive(Debug, Clone)]
pub struct UsersService {
    client: Arc<Client>,
}

impl UsersService {
    pub fn new(client: Arc<Client>) -> Self {
        UsersService { client }
    }

    /// Request `/v1/users/authenticated` to get the user the client is logged in as.
    pub async fn get_authenticated(&self) -> Result<AuthenticatedUser> {
        info!("request authenticated user");
        self.client
            .execute(Method::GET, SERVICE, "v1/users/authenticated", None)
            .await
    }

    /// Request `/v1/users` to get the users with the given ids.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] without sending anything when
    /// `request` holds no id.
    pub async fn list_users(&self, request: &UserIdRequest) -> Result<Vec<User>> {
        if request.user_ids.is_empty() {
            return Err(Error::Validation("userIds missing".to_string()));
        }
        info!("request users {:?}", &request.user_ids);

        let response: DataResponse<User> = self
            .client
            .execute(Method::POST, SERVICE, "v1/users", Some(Body::json(request)?))
            .await?;
        Ok(response.data)
    }

    /// User with the given id, `None` if the API returned nothing.
    pub async fn get_user(&self, user_id: UserId) -> Result<Option<User>> {
        Ok(first(self.list_users(&UserIdRequest::new(vec![user_id])).await?))
    }
}

#[cfg(test)]
mod tests {
    use mockito::Matcher;

    use super::*;
    use crate::testing::mock_services;

    #[tokio::test]
    async fn test_get_authenticated() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/v1/users/authenticated")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"id": 1, "name": "Roblox", "displayName": "Roblox"}"#)
            .create_async()
            .await;

        let services = mock_services(&server);
        let user = services.users.get_authenticated().await.unwrap();
        assert_eq!(user.id, UserId(1));
        assert_eq!(user.display_name, "Roblox");
    }

    #[tokio::test]
    async fn test_get_authenticated_unauthorized() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/v1/users/authenticated")
            .with_status(401)
            .with_header("content-type", "application/json")
            .with_body(r#"{"errors":[{"code":0,"message":"Authorization has been denied for this request."}]}"#)
            .create_async()
            .await;

        let services = mock_services(&server);
        let err = services.users.get_authenticated().await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "response code 0: Authorization has been denied for this request."
        );
    }

    #[tokio::test]
    async fn test_get_user() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/v1/users")
            .match_body(Matcher::Json(serde_json::json!({
                "userIds": [156],
                "excludeBannedUsers": false
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"data": [{"hasVerifiedBadge": false, "id": 156, "name": "builderman", "displayName": "builderman"}]}"#)
            .create_async()
            .await;

        let services = mock_services(&server);
        let user = services.users.get_user(UserId(156)).await.unwrap().unwrap();
        assert_eq!(user.name, "builderman");
        assert!(!user.verified);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_get_user_not_found() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/v1/users")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"data": []}"#)
            .create_async()
            .await;

        let services = mock_services(&server);
        assert_eq!(services.users.get_user(UserId(0)).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_list_users_empty_ids() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", Matcher::Any)
            .expect(0)
            .create_async()
            .await;

        let services = mock_services(&server);
        let result = services.users.list_users(&UserIdRequest::new(vec![])).await;
        assert!(matches!(result, Err(Error::Validation(_))));
        mock.assert_async().await;
    }
}
