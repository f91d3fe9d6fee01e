//! rbxweb-login - Log in to the Roblox web API from the command line.
//!
//! A small harness around the [`rbxweb`] services, mostly useful to try the
//! library against the real API and to obtain a session credential.
//!
//! # Login Flows
//!
//! - **Quick login** (default): a login token is created and its code printed.
//!   The code has to be entered on an already authenticated device, at
//!   `https://www.roblox.com/crossdevicelogin/ConfirmCode`. The token status is
//!   polled every `poll_interval` seconds until it is validated, then the
//!   token is used to log in.
//! - **Password**: with `--username` and `--password`, the credentials are
//!   sent directly. Accounts protected by a challenge will be rejected.
//!
//! Once logged in, the authenticated user is printed.
//!
//! # Configuration
//!
//! The configuration file is optional, see [`rbxweb::config`] for its format:
//!
//! ```yaml
//! client:
//!   timeout: 30
//! poll_interval: 4
//! ```
//!
//! # Usage
//!
//! ```bash
//! rbxweb-login
//! rbxweb-login --config rbxweb.yaml --username builderman --password hunter2
//! ```
//!
//! # Environment Variables
//!
//! - `RUST_LOG` - Controls logging level (default: `info`)
//!   - Set to `debug` to see every request and response
//! - `RBXWEB_*` - Configuration overrides, e.g. `RBXWEB_CLIENT__TIMEOUT=10`

use std::{sync::Arc, time::Duration};

use anyhow::{Context, bail};
use clap::Parser;
use env_logger::Env;
use log::{error, info};

use rbxweb::{
    Client, Services,
    config::Config,
    services::{auth::LoginType, token::Token},
};

/// Command-line arguments of rbxweb-login.
///
/// Without credentials, the quick login flow is used.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to the YAML configuration file.
    ///
    /// A missing file is not an error, defaults and `RBXWEB_` environment
    /// variables are used instead.
    #[arg(short, long, default_value = "rbxweb.yaml")]
    config: String,

    /// Username to log in with, requires `--password`.
    #[arg(short, long, requires = "password")]
    username: Option<String>,

    /// Password of `--username`.
    #[arg(short, long, requires = "username")]
    password: Option<String>,
}

/// Poll the status of `token` until it is validated on another device.
async fn wait_validation(
    services: &Services,
    token: &Token,
    interval: Duration,
) -> anyhow::Result<()> {
    loop {
        let status = services
            .auth_token
            .get_token_status(token)
            .await
            .context("token status")?;
        info!("token {} is {}", &token.code, &status.status);

        match status.status.as_str() {
            "Validated" => return Ok(()),
            "Cancelled" | "Expired" => bail!("token {} is {}", &token.code, &status.status),
            _ => tokio::time::sleep(interval).await,
        }
    }
}

async fn run(args: Args) -> anyhow::Result<()> {
    let config = Config::load(&args.config)
        .with_context(|| format!("failed to load configuration {}", &args.config))?;

    let client = Arc::new(Client::with_config(&config.client)?);
    let services = Services::new(Arc::clone(&client));

    let login = match (args.username, args.password) {
        (Some(username), Some(password)) => services
            .auth
            .create_login(&username, &password, LoginType::Username)
            .await
            .context("login")?,
        _ => {
            let token = services.auth_token.create_token().await.context("token create")?;
            println!("Enter the code {} on an authenticated device", &token.code);

            wait_validation(&services, &token, Duration::from_secs(config.poll_interval)).await?;
            services
                .auth
                .create_login(&token.code, &token.private_key, LoginType::Token)
                .await
                .context("login")?
        }
    };

    if login.two_step_verification_data.is_some() {
        bail!("two step verification is required for this account");
    }
    if client.security().is_none() {
        bail!("no session credential was issued");
    }

    let user = services.users.get_authenticated().await?;
    println!("Logged in as {} ({})", &user.name, &user.id);
    Ok(())
}

/// Main entry point of rbxweb-login.
///
/// Logging is set at `info` level by default, see `RUST_LOG`. Any failure is
/// logged with its causes before exiting with a non-zero status.
#[tokio::main]
async fn main() {
    // Put logger at info level by default
    let env = Env::default().filter_or("RUST_LOG", "info");
    env_logger::init_from_env(env);

    info!("Starting rbxweb-login {}...", env!("CARGO_PKG_VERSION"));

    let args = Args::parse();
    if let Err(err) = run(args).await {
        error!("{:#}", err);
        std::process::exit(1);
    }
}
