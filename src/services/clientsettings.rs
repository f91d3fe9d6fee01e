//! The `clientsettings/v2` API: client versions and deployment channels.

use std::{fmt, sync::Arc};

use log::info;
use reqwest::Method;
use serde::{Deserialize, Serialize};

use crate::path::{Query, path};
use crate::{Client, Result};

const SERVICE: &str = "clientsettings";

/// A supported Roblox platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BinaryType {
    WindowsPlayer,
    /// Undocumented, superseded by [`BinaryType::WindowsStudio64`]
    WindowsStudio,
    WindowsStudio64,
    MacPlayer,
    MacStudio,
}

impl BinaryType {
    pub fn as_str(&self) -> &'static str {
        match self {
            BinaryType::WindowsPlayer => "WindowsPlayer",
            BinaryType::WindowsStudio => "WindowsStudio",
            BinaryType::WindowsStudio64 => "WindowsStudio64",
            BinaryType::MacPlayer => "MacPlayer",
            BinaryType::MacStudio => "MacStudio",
        }
    }

    /// `Player` or `Studio`.
    pub fn short(&self) -> &'static str {
        match self {
            BinaryType::WindowsPlayer | BinaryType::MacPlayer => "Player",
            BinaryType::WindowsStudio | BinaryType::WindowsStudio64 | BinaryType::MacStudio => {
                "Studio"
            }
        }
    }
}

impl fmt::Display for BinaryType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The ClientVersionResponse API model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientVersion {
    pub version: String,
    /// Version GUID, `version-...`
    #[serde(rename = "clientVersionUpload")]
    pub guid: String,
    #[serde(rename = "bootstrapperVersion")]
    pub bootstrapper: String,
    #[serde(
        rename = "nextClientVersionUpload",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub next_guid: Option<String>,
    #[serde(
        rename = "nextClientVersion",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub next_version: Option<String>,
}

impl fmt::Display for ClientVersion {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} ({})", self.version, self.guid)
    }
}

/// How a user was bound to a channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AssignmentType {
    None,
    PerMille,
    BoundToPrivateChannel,
    BoundToPublicChannel,
    #[serde(other)]
    Unknown,
}

/// The UserChannelResponse API model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserChannel {
    #[serde(rename = "channelName")]
    pub channel: String,
    #[serde(rename = "channelAssignmentType")]
    pub assignment: AssignmentType,
    #[serde(default)]
    pub token: Option<String>,
}

/// Accessor of the `clientsettings/v2` API.
#[derive(Debug, Clone)]
pub struct ClientSettingsService {
    client: Arc<Client>,
}

impl ClientSettingsService {
    pub fn new(client: Arc<Client>) -> Self {
        ClientSettingsService { client }
    }

    /// Request `/v2/client-version/{binary_type}` to get the version deployed
    /// for `binary_type`, on `channel` if given.
    pub async fn get_client_version(
        &self,
        binary_type: BinaryType,
        channel: Option<&str>,
    ) -> Result<ClientVersion> {
        info!(
            "request client version of {} on channel {}",
            binary_type,
            channel.unwrap_or("live")
        );

        let mut version_path = path("v2/client-version/{}", None, &[&binary_type]);
        if let Some(channel) = channel.filter(|channel| !channel.is_empty()) {
            version_path.push_str("/channel/");
            version_path.push_str(channel);
        }

        self.client
            .execute(Method::GET, SERVICE, &version_path, None)
            .await
    }

    /// Request `/v2/user-channel` to get the channel of the authenticated user.
    ///
    /// Without `binary_type`, the API picks its own default.
    pub async fn get_user_channel(&self, binary_type: Option<BinaryType>) -> Result<UserChannel> {
        info!("request user channel");

        let mut query = Query::new();
        if let Some(binary_type) = binary_type {
            query.set("binaryType", binary_type.as_str());
        }

        self.client
            .execute(
                Method::GET,
                SERVICE,
                &path("v2/user-channel", Some(&query), &[]),
                None,
            )
            .await
    }
}

#[cfg(test)]
mod tests {
    use mockito::Matcher;

    use super::*;
    use crate::testing::mock_services;

    const VERSION: &str = r#"{
        "version": "0.640.0.6400595",
        "clientVersionUpload": "version-0123456789abcdef",
        "bootstrapperVersion": "1, 6, 0, 6400595"
    }"#;

    #[tokio::test]
    async fn test_get_client_version() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/v2/client-version/WindowsStudio64")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(VERSION)
            .create_async()
            .await;

        let services = mock_services(&server);
        let version = services
            .client_settings
            .get_client_version(BinaryType::WindowsStudio64, None)
            .await
            .unwrap();

        assert_eq!(
            version.to_string(),
            "0.640.0.6400595 (version-0123456789abcdef)"
        );
        assert_eq!(version.next_guid, None);
    }

    #[tokio::test]
    async fn test_get_client_version_on_channel() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/v2/client-version/MacPlayer/channel/zintegration")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(VERSION)
            .create_async()
            .await;

        let services = mock_services(&server);
        services
            .client_settings
            .get_client_version(BinaryType::MacPlayer, Some("zintegration"))
            .await
            .unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_get_client_version_unknown_channel() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/v2/client-version/WindowsPlayer/channel/nope")
            .with_status(404)
            .with_header("content-type", "application/json")
            .with_body(r#"{"errors":[{"code":5,"message":"No deployment found for channel"}]}"#)
            .create_async()
            .await;

        let services = mock_services(&server);
        let err = services
            .client_settings
            .get_client_version(BinaryType::WindowsPlayer, Some("nope"))
            .await
            .unwrap_err();
        assert_eq!(err.api_error().unwrap().code, 5);
    }

    #[tokio::test]
    async fn test_get_user_channel() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/v2/user-channel")
            .match_query(Matcher::UrlEncoded(
                "binaryType".to_owned(),
                "WindowsPlayer".to_owned(),
            ))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"channelName": "LIVE", "channelAssignmentType": "PerMille", "token": null}"#,
            )
            .create_async()
            .await;

        let services = mock_services(&server);
        let channel = services
            .client_settings
            .get_user_channel(Some(BinaryType::WindowsPlayer))
            .await
            .unwrap();

        assert_eq!(channel.channel, "LIVE");
        assert_eq!(channel.assignment, AssignmentType::PerMille);
        mock.assert_async().await;
    }

    #[test]
    fn test_binary_type_short() {
        assert_eq!(BinaryType::WindowsStudio64.short(), "Studio");
        assert_eq!(BinaryType::MacPlayer.short(), "Player");
        assert_eq!(BinaryType::MacStudio.to_string(), "MacStudio");
    }
}
