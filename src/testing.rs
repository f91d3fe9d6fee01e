//! Test helpers pointing a [Client] at a local mock server.

use std::sync::Arc;

use mockito::ServerGuard;

use crate::{Client, ClientConfig, Services};

/// Subdomains reached by the services.
const SUBDOMAINS: [&str; 6] = ["apis", "auth", "clientsettings", "games", "thumbnails", "users"];

/// Create a [Client] sending every request, whatever its service, to `server`.
///
/// The base domain is `localhost:{port}` and each service subdomain is
/// resolved to the server address.
pub(crate) fn mock_client(server: &ServerGuard) -> Client {
    let address = server.socket_address();

    let mut builder = reqwest::Client::builder()
        .no_proxy()
        .resolve("localhost", address);
    for subdomain in SUBDOMAINS {
        builder = builder.resolve(&format!("{}.localhost", subdomain), address);
    }

    let config = ClientConfig {
        base_domain: format!("localhost:{}", address.port()),
        ..Default::default()
    };
    Client::with_http_client(&config, builder.build().unwrap()).insecure()
}

pub(crate) fn mock_services(server: &ServerGuard) -> Services {
    Services::new(Arc::new(mock_client(server)))
}
