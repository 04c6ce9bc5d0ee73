//! Signing in to the API

mod session;
mod types;

use log::info;
use reqwest::Client;
use std::sync::Arc;
use validator::Validate;

use crate::error::Error;
use crate::fetch::Fetch;
use crate::state::AppState;

pub use session::*;
pub use types::*;

/// Client for the login endpoint
pub struct AuthClient {
    /// The base URL of the API
    url: String,

    /// HTTP client used for requests
    client: Client,

    /// Where the session is stored
    state: Arc<AppState>,

    client_info: String,
}

impl AuthClient {
    pub(crate) fn new(url: &str, client: Client, state: Arc<AppState>, client_info: &str) -> Self {
        Self {
            url: url.to_string(),
            client,
            state,
            client_info: client_info.to_string(),
        }
    }

    /// Sign in with email and password and store the session
    pub async fn login(&self, email: &str, password: &str) -> Result<Session, Error> {
        let request = LoginRequest {
            email: email.trim().to_string(),
            password: password.to_string(),
        };
        request.validate()?;

        let url = format!("{}/api/auth/login", self.url);
        let response = Fetch::post(&self.client, &url)
            .header("X-Client-Info", &self.client_info)
            .json(&request)?
            .execute::<LoginResponse>()
            .await?;

        let token = response
            .token
            .filter(|t| !t.is_empty())
            .ok_or_else(|| Error::auth(response.message.unwrap_or_else(|| "Login response did not include a token".to_string())))?;

        let session = Session::from_token(token, response.user);
        self.state.sign_in(session.clone())?;
        info!("signed in as {}", request.email);
        Ok(session)
    }

    /// Forget the current session
    pub fn logout(&self) -> Result<(), Error> {
        self.state.sign_out()
    }

    /// The live session, if any
    pub fn session(&self) -> Option<Session> {
        self.state.session()
    }

    pub fn is_logged_in(&self) -> bool {
        self.state.is_logged_in()
    }
}
