//! The `thumbnails/v1` API, game icons only.

use std::{fmt, sync::Arc};

use log::info;
use reqwest::Method;
use serde::{Deserialize, Serialize};

use super::games::UniverseId;
use super::{DataResponse, first};
use crate::path::{Query, path};
use crate::{Client, Error, Result};

const SERVICE: &str = "thumbnails";

/// What to return when the thumbnail is not available.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReturnPolicy {
    #[default]
    PlaceHolder,
    ForcePlaceHolder,
    AutoGenerated,
    ForceAutoGenerated,
}

impl ReturnPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReturnPolicy::PlaceHolder => "PlaceHolder",
            ReturnPolicy::ForcePlaceHolder => "ForcePlaceHolder",
            ReturnPolicy::AutoGenerated => "AutoGenerated",
            ReturnPolicy::ForceAutoGenerated => "ForceAutoGenerated",
        }
    }
}

impl fmt::Display for ReturnPolicy {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ThumbnailFormat {
    #[default]
    Png,
    Jpeg,
    Webp,
}

impl ThumbnailFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            ThumbnailFormat::Png => "Png",
            ThumbnailFormat::Jpeg => "Jpeg",
            ThumbnailFormat::Webp => "Webp",
        }
    }
}

impl fmt::Display for ThumbnailFormat {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Generation state of a thumbnail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ThumbnailState {
    Completed,
    Pending,
    InReview,
    Blocked,
    Error,
    TemporarilyUnavailable,
    #[serde(other)]
    Unknown,
}

/// The ThumbnailResponse API model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Thumbnail {
    pub target_id: i64,
    pub state: ThumbnailState,
    /// Empty unless the state is [`ThumbnailState::Completed`]
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub version: String,
}

/// Options of an icon request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IconOptions {
    pub policy: ReturnPolicy,
    /// Dimensions as `{width}x{height}`, among the sizes the API accepts.
    pub size: String,
    pub format: ThumbnailFormat,
    pub circular: bool,
}

impl Default for IconOptions {
    fn default() -> Self {
        IconOptions {
            policy: ReturnPolicy::default(),
            size: "512x512".to_string(),
            format: ThumbnailFormat::default(),
            circular: false,
        }
    }
}

/// Accessor of the `thumbnails/v1` API.
#[derive(Debug, Clone)]
pub struct ThumbnailsService {
    client: Arc<Client>,
}

impl ThumbnailsService {
    pub fn new(client: Arc<Client>) -> Self {
        ThumbnailsService { client }
    }

    /// Request `/v1/games/icons` to get the icon of each given universe.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] without sending anything when
    /// `universe_ids` is empty.
    pub async fn list_games_icons(
        &self,
        universe_ids: &[UniverseId],
        options: &IconOptions,
    ) -> Result<Vec<Thumbnail>> {
        if universe_ids.is_empty() {
            return Err(Error::Validation("universeIds missing".to_string()));
        }
        info!("request icons of games {:?}", universe_ids);

        let mut query = Query::new();
        query.extend("universeIds", universe_ids);
        query.set("returnPolicy", options.policy.as_str());
        query.set("size", options.size.as_str());
        query.set("format", options.format.as_str());
        query.set("isCircular", options.circular.to_string());

        let response: DataResponse<Thumbnail> = self
            .client
            .execute(
                Method::GET,
                SERVICE,
                &path("v1/games/icons", Some(&query), &[]),
                None,
            )
            .await?;
        Ok(response.data)
    }

    /// Icon of a single universe, `None` if the API returned nothing.
    pub async fn get_game_icon(
        &self,
        universe_id: UniverseId,
        options: &IconOptions,
    ) -> Result<Option<Thumbnail>> {
        Ok(first(self.list_games_icons(&[universe_id], options).await?))
    }
}
