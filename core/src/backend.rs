//! Session-aware facade over `ApiClient` and a host-supplied `Transport`.
//!
//! # Design
//! `Backend` is the context object hosts create once and hand to whatever
//! needs the API. It owns the session store, so every authenticated call
//! reads the current token from there right before building its request.
//! Failures are logged and returned; nothing is retried.

use tracing::{debug, info, warn};

use crate::client::{validate_post_content, ApiClient};
use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse, Transport};
use crate::session::{KeyValueStore, Session, SessionStore};
use crate::types::{Credentials, NewPost, Post, Profile, Registration};

pub struct Backend<T, S> {
    api: ApiClient,
    transport: T,
    sessions: SessionStore<S>,
}

impl<T: Transport, S: KeyValueStore> Backend<T, S> {
    pub fn new(base_url: &str, transport: T, store: S) -> Self {
        Self {
            api: ApiClient::new(base_url),
            transport,
            sessions: SessionStore::new(store),
        }
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    pub fn sessions(&self) -> &SessionStore<S> {
        &self.sessions
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// The stored session, or `NotAuthenticated` if there is none.
    pub fn session(&self) -> Result<Session, ApiError> {
        self.sessions.get()?.ok_or(ApiError::NotAuthenticated)
    }

    /// Create an account. Does not log in.
    pub fn register(&self, username: &str, password: &str, email: &str) -> Result<(), ApiError> {
        let req = self.api.build_register(&Registration {
            username: username.to_string(),
            password: password.to_string(),
            email: email.to_string(),
        })?;
        let resp = self.send(req)?;
        self.api
            .parse_register(resp)
            .inspect_err(|e| warn!(username, error = %e, "registration failed"))
    }

    /// Authenticate and persist the returned token together with `username`.
    pub fn login(&self, username: &str, password: &str) -> Result<Session, ApiError> {
        let req = self.api.build_login(&Credentials {
            username: username.to_string(),
            password: password.to_string(),
        })?;
        let resp = self.send(req)?;
        let token = self
            .api
            .parse_login(resp)
            .inspect_err(|e| warn!(username, error = %e, "login failed"))?;
        self.sessions.save(&token, username)?;
        info!(username, "logged in");
        Ok(Session {
            token,
            username: username.to_string(),
        })
    }

    pub fn logout(&self) -> Result<(), ApiError> {
        self.sessions.clear()?;
        info!("logged out");
        Ok(())
    }

    pub fn profile(&self) -> Result<Profile, ApiError> {
        let session = self.session()?;
        let resp = self.send(self.api.build_profile(&session.token))?;
        self.api
            .parse_profile(resp)
            .inspect_err(|e| warn!(error = %e, "profile fetch failed"))
    }

    /// Publish a post as the logged-in user. Blank content never reaches the
    /// network.
    pub fn create_post(&self, content: &str) -> Result<Post, ApiError> {
        validate_post_content(content)?;
        let session = self.session()?;
        let input = NewPost {
            user: session.username,
            content: content.to_string(),
        };
        let resp = self.send(self.api.build_create_post(&session.token, &input)?)?;
        let mut post = self
            .api
            .parse_create_post(resp)
            .inspect_err(|e| warn!(error = %e, "post creation failed"))?;
        // Fields the server did not echo back are what was sent.
        if post.user.is_empty() {
            post.user = input.user;
        }
        if post.content.is_empty() {
            post.content = input.content;
        }
        Ok(post)
    }

    pub(crate) fn send(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        debug!(method = %request.method, path = %request.path, "sending request");
        let response = self
            .transport
            .execute(request)
            .inspect_err(|e| warn!(error = %e, "transport failed"))?;
        debug!(status = response.status, "received response");
        Ok(response)
    }
}
