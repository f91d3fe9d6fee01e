//! Undocumented legacy endpoints.

use std::sync::Arc;

use log::info;
use reqwest::Method;
use serde::Deserialize;

use super::games::{PlaceId, UniverseId};
use crate::path::path;
use crate::{Client, Result};

const SERVICE: &str = "apis";

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct PlaceUniverseResponse {
    universe_id: UniverseId,
}

/// Accessor of the legacy endpoints.
#[derive(Debug, Clone)]
pub struct LegacyService {
    client: Arc<Client>,
}

impl LegacyService {
    pub fn new(client: Arc<Client>) -> Self {
        LegacyService { client }
    }

    /// Request `universes/v1/places/{place_id}/universe` to get the universe of a place.
    pub async fn get_place_universe(&self, place_id: PlaceId) -> Result<UniverseId> {
        info!("request universe of place {}", place_id);

        let response: PlaceUniverseResponse = self
            .client
            .execute(
                Method::GET,
                SERVICE,
                &path("universes/v1/places/{}/universe", None, &[&place_id]),
                None,
            )
            .await?;
        Ok(response.universe_id)
    }
}
