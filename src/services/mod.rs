//! Endpoint accessors of the Roblox web API.
//!
//! Each service groups the operations of one API (and one subdomain). A
//! service only holds a shared reference to the [`Client`], so every service
//! of a [`Services`] set uses the same session.
//!
//! # Modules
//!
//! - `auth` - Login and CSRF token probe (`auth`)
//! - `clientsettings` - Client versions and deployment channels (`clientsettings`)
//! - `games` - Game and place details (`games`)
//! - `legacy` - Undocumented legacy endpoints (`apis`)
//! - `oauth` - Studio OAuth authorization (`apis`)
//! - `thumbnails` - Game icons (`thumbnails`)
//! - `token` - Quick login tokens (`apis`)
//! - `users` - Users (`users`)
//!
//! # Examples
//!
//! ```no_run
//! use std::sync::Arc;
//! use rbxweb::{Client, Services};
//! use rbxweb::services::games::UniverseId;
//!
//! # async fn example() -> rbxweb::Result<()> {
//! let services = Services::new(Arc::new(Client::new()?));
//! if let Some(game) = services.games.get_game_detail(UniverseId(189707)).await? {
//!     println!("{} is played by {} players", game.name, game.playing);
//! }
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;

use serde::Deserialize;

use crate::Client;

pub mod auth;
pub mod clientsettings;
pub mod games;
pub mod legacy;
pub mod oauth;
pub mod thumbnails;
pub mod token;
pub mod users;

use auth::AuthService;
use clientsettings::ClientSettingsService;
use games::GamesService;
use legacy::LegacyService;
use oauth::OAuthService;
use thumbnails::ThumbnailsService;
use token::AuthTokenService;
use users::UsersService;

/// Every service, sharing one [Client].
#[derive(Debug, Clone)]
pub struct Services {
    pub auth: AuthService,
    pub auth_token: AuthTokenService,
    pub client_settings: ClientSettingsService,
    pub games: GamesService,
    pub legacy: LegacyService,
    pub oauth: OAuthService,
    pub thumbnails: ThumbnailsService,
    pub users: UsersService,
}

impl Services {
    pub fn new(client: Arc<Client>) -> Self {
        Services {
            auth: AuthService::new(Arc::clone(&client)),
            auth_token: AuthTokenService::new(Arc::clone(&client)),
            client_settings: ClientSettingsService::new(Arc::clone(&client)),
            games: GamesService::new(Arc::clone(&client)),
            legacy: LegacyService::new(Arc::clone(&client)),
            oauth: OAuthService::new(Arc::clone(&client)),
            thumbnails: ThumbnailsService::new(Arc::clone(&client)),
            users: UsersService::new(client),
        }
    }
}

/// Response envelope of the list endpoints: `{"data": [...]}`.
#[derive(Deserialize, Debug)]
struct DataResponse<T> {
    data: Vec<T>,
}

/// First item of a list response, `None` when the list is empty.
fn first<T>(items: Vec<T>) -> Option<T> {
    items.into_iter().next()
}

/// Declare an integer identifier of the API, serialized as a bare number.
macro_rules! id_type {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord,
            serde::Serialize, serde::Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<i64> for $name {
            fn from(id: i64) -> Self {
                $name(id)
            }
        }
    };
}

pub(crate) use id_type;
