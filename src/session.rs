//! In-memory session state shared by every request of a [`Client`](crate::Client).

use std::{
    fmt,
    sync::{Mutex, MutexGuard, PoisonError},
};

use log::debug;

/// Name of the cookie carrying the security credential.
pub const COOKIE_SECURITY: &str = ".ROBLOSECURITY";
/// Name of the anti-forgery token header, in requests and responses.
pub const HEADER_TOKEN: &str = "x-csrf-token";

/// Printed in place of the security credential.
pub(crate) const REDACTED: &str = "<redacted>";

/// Snapshot of the credential pair attached to outgoing requests.
#[derive(Clone, Default, PartialEq, Eq)]
pub(crate) struct Credentials {
    /// Value of the [COOKIE_SECURITY] cookie
    pub security: Option<String>,
    /// Value of the [HEADER_TOKEN] header
    pub token: Option<String>,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("security", &self.security.as_ref().map(|_| REDACTED))
            .field("token", &self.token)
            .finish()
    }
}

/// Session state of one client.
///
/// The pair lives behind a mutex so that concurrent calls sharing a client
/// always read and write it as a whole. The lock is only held while copying
/// values in or out, never across a network exchange.
#[derive(Debug, Default)]
pub(crate) struct Session {
    credentials: Mutex<Credentials>,
}

impl Session {
    pub fn snapshot(&self) -> Credentials {
        self.lock().clone()
    }

    pub fn set_security(&self, security: impl Into<String>) {
        debug!("session security credential updated");
        self.lock().security = Some(security.into());
    }

    pub fn set_token(&self, token: impl Into<String>) {
        let token = token.into();
        debug!("session csrf token updated to {}", &token);
        self.lock().token = Some(token);
    }

    fn lock(&self) -> MutexGuard<'_, Credentials> {
        // The guarded data is two plain strings, a poisoned lock still holds a usable pair.
        self.credentials
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}
