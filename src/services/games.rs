//! The `games/v1` API: details of games (universes) and places.

use std::sync::Arc;

use log::info;
use reqwest::Method;
use serde::{Deserialize, Serialize};

use super::{DataResponse, first};
use crate::path::{Query, path};
use crate::{Client, Error, Result};

const SERVICE: &str = "games";

super::id_type! {
    /// A game creator, user or group.
    CreatorId
}

super::id_type! {
    /// A place, the playable unit of a game.
    PlaceId
}

super::id_type! {
    /// A universe, the game grouping one or more places.
    UniverseId
}

/// Avatar type forced by a game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AvatarType {
    #[serde(rename = "MorphToR6")]
    R6,
    #[serde(rename = "PlayerChoice")]
    PlayerChoice,
    #[serde(rename = "MorphToR15")]
    R15,
    #[serde(other)]
    Unknown,
}

/// The GameCreator API model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Creator {
    pub id: CreatorId,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(rename = "isRNVAccount", default)]
    pub is_rnv_account: bool,
    #[serde(default)]
    pub has_verified_badge: bool,
}

/// The GameDetailResponse API model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameDetail {
    /// Universe of the game
    pub id: UniverseId,
    pub root_place_id: PlaceId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub source_name: Option<String>,
    #[serde(default)]
    pub source_description: Option<String>,
    pub creator: Creator,
    #[serde(default)]
    pub price: Option<i64>,
    #[serde(default)]
    pub allowed_gear_genres: Vec<String>,
    #[serde(default)]
    pub allowed_gear_categories: Vec<String>,
    #[serde(default)]
    pub is_genre_enforced: bool,
    #[serde(default)]
    pub copying_allowed: bool,
    #[serde(default)]
    pub playing: i64,
    #[serde(default)]
    pub visits: i64,
    #[serde(default)]
    pub max_players: i32,
    pub created: String,
    pub updated: String,
    #[serde(default)]
    pub studio_access_to_apis_allowed: bool,
    #[serde(default)]
    pub create_vip_servers_allowed: bool,
    pub universe_avatar_type: AvatarType,
    #[serde(default)]
    pub genre: String,
    #[serde(default)]
    pub is_all_genre: bool,
    #[serde(default)]
    pub is_favorited_by_user: bool,
    #[serde(default)]
    pub favorited_count: i64,
}

/// The PlaceDetails API model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceDetail {
    pub place_id: PlaceId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub source_name: String,
    #[serde(default)]
    pub source_description: String,
    pub url: String,
    pub builder: String,
    pub builder_id: CreatorId,
    #[serde(default)]
    pub has_verified_badge: bool,
    pub is_playable: bool,
    #[serde(default)]
    pub reason_prohibited: String,
    pub universe_id: UniverseId,
    pub universe_root_place_id: PlaceId,
    #[serde(default)]
    pub price: i64,
    #[serde(default)]
    pub image_token: String,
}

/// Accessor of the `games/v1` API.
#[derive(Debug, Clone)]
pub struct GamesService {
    client: Arc<Client>,
}

impl GamesService {
    pub fn new(client: Arc<Client>) -> Self {
        GamesService { client }
    }

    /// Request `/v1/games?universeIds=...` to get the details of each given universe.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] without sending anything when
    /// `universe_ids` is empty.
    pub async fn list_games_details(&self, universe_ids: &[UniverseId]) -> Result<Vec<GameDetail>> {
        if universe_ids.is_empty() {
            return Err(Error::Validation("universeIds missing".to_string()));
        }
        info!("request details of games {:?}", universe_ids);

        let mut query = Query::new();
        query.extend("universeIds", universe_ids);

        let response: DataResponse<GameDetail> = self
            .client
            .execute(Method::GET, SERVICE, &path("v1/games", Some(&query), &[]), None)
            .await?;
        Ok(response.data)
    }

    /// Details of a single universe, `None` if the API returned nothing.
    pub async fn get_game_detail(&self, universe_id: UniverseId) -> Result<Option<GameDetail>> {
        Ok(first(self.list_games_details(&[universe_id]).await?))
    }

    /// Request `/v1/games/multiget-place-details?placeIds=...` to get the
    /// details of each given place.
    ///
    /// Requires an authenticated client.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] without sending anything when
    /// `place_ids` is empty.
    pub async fn list_places_details(&self, place_ids: &[PlaceId]) -> Result<Vec<PlaceDetail>> {
        if place_ids.is_empty() {
            return Err(Error::Validation("placeIds missing".to_string()));
        }
        info!("request details of places {:?}", place_ids);

        let mut query = Query::new();
        query.extend("placeIds", place_ids);

        self.client
            .execute(
                Method::GET,
                SERVICE,
                &path("v1/games/multiget-place-details", Some(&query), &[]),
                None,
            )
            .await
    }

    /// Details of a single place, `None` if the API returned nothing.
    pub async fn get_place_detail(&self, place_id: PlaceId) -> Result<Option<PlaceDetail>> {
        Ok(first(self.list_places_details(&[place_id]).await?))
    }
}

#[cfg(test)]
mod tests {
    use mockito::Matcher;

    use super::*;
    use crate::testing::mock_services;

    const GAME: &str = r#"{
        "id": 189707,
        "rootPlaceId": 1818,
        "name": "Natural Disaster Survival",
        "description": "Survive!",
        "sourceName": "Natural Disaster Survival",
        "sourceDescription": "Survive!",
        "creator": {"id": 80119, "name": "Stickmasterluke", "type": "User", "isRNVAccount": false, "hasVerifiedBadge": true},
        "price": null,
        "allowedGearGenres": ["All"],
        "allowedGearCategories": [],
        "isGenreEnforced": false,
        "copyingAllowed": false,
        "playing": 2837,
        "visits": 3904813409,
        "maxPlayers": 30,
        "created": "2007-05-01T01:07:04.78Z",
        "updated": "2024-01-02T03:04:05.06Z",
        "studioAccessToApisAllowed": false,
        "createVipServersAllowed": false,
        "universeAvatarType": "PlayerChoice",
        "genre": "All",
        "isAllGenre": true,
        "isFavoritedByUser": false,
        "favoritedCount": 12345
    }"#;

    #[tokio::test]
    async fn test_list_games_details() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/v1/games")
            .match_query(Matcher::Exact(
                "universeIds=189707&universeIds=292439477".to_owned(),
            ))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(format!(r#"{{"data": [{GAME}]}}"#))
            .create_async()
            .await;

        let services = mock_services(&server);
        let games = services
            .games
            .list_games_details(&[UniverseId(189707), UniverseId(292439477)])
            .await
            .unwrap();

        assert_eq!(games.len(), 1);
        let game = &games[0];
        assert_eq!(game.id, UniverseId(189707));
        assert_eq!(game.root_place_id, PlaceId(1818));
        assert_eq!(game.creator.kind, "User");
        assert!(game.creator.has_verified_badge);
        assert_eq!(game.price, None);
        assert_eq!(game.universe_avatar_type, AvatarType::PlayerChoice);
        assert_eq!(game.visits, 3904813409);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_get_game_detail_empty() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/v1/games")
            .match_query(Matcher::UrlEncoded("universeIds".to_owned(), "1".to_owned()))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"data": []}"#)
            .create_async()
            .await;

        let services = mock_services(&server);
        let game = services.games.get_game_detail(UniverseId(1)).await.unwrap();
        assert!(game.is_none());
    }

    #[tokio::test]
    async fn test_get_game_detail_propagates_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/v1/games")
            .match_query(Matcher::Any)
            .with_status(400)
            .with_header("content-type", "application/json")
            .with_body(r#"{"errors":[{"code":8,"message":"Too many universe ids."}]}"#)
            .create_async()
            .await;

        let services = mock_services(&server);
        let err = services.games.get_game_detail(UniverseId(1)).await.unwrap_err();
        assert_eq!(err.api_error().unwrap().code, 8);
    }

    #[tokio::test]
    async fn test_list_empty_ids_sends_nothing() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", Matcher::Any)
            .expect(0)
            .create_async()
            .await;

        let services = mock_services(&server);
        assert!(matches!(
            services.games.list_games_details(&[]).await,
            Err(Error::Validation(_))
        ));
        assert!(matches!(
            services.games.list_places_details(&[]).await,
            Err(Error::Validation(_))
        ));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_get_place_detail() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/v1/games/multiget-place-details")
            .match_query(Matcher::UrlEncoded("placeIds".to_owned(), "1818".to_owned()))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"[{
                    "placeId": 1818,
                    "name": "Classic: Crossroads",
                    "description": "",
                    "sourceName": "Classic: Crossroads",
                    "sourceDescription": "",
                    "url": "https://www.roblox.com/games/1818/Classic-Crossroads",
                    "builder": "Roblox",
                    "builderId": 1,
                    "hasVerifiedBadge": true,
                    "isPlayable": true,
                    "reasonProhibited": "None",
                    "universeId": 13058,
                    "universeRootPlaceId": 1818,
                    "price": 0,
                    "imageToken": "T_1818_icon"
                }]"#,
            )
            .create_async()
            .await;

        let services = mock_services(&server);
        let place = services
            .games
            .get_place_detail(PlaceId(1818))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(place.universe_id, UniverseId(13058));
        assert_eq!(place.builder_id, CreatorId(1));
        assert!(place.is_playable);
    }

    #[test]
    fn test_avatar_type_unknown() {
        let avatar: AvatarType = serde_json::from_str(r#""MorphToR30""#).unwrap();
        assert_eq!(avatar, AvatarType::Unknown);
        let avatar: AvatarType = serde_json::from_str(r#""MorphToR15""#).unwrap();
        assert_eq!(avatar, AvatarType::R15);
    }
}
