//! Stateless HTTP request builder and response parser for the backend API.
//!
//! # Design
//! `ApiClient` holds only a `base_url` and carries no mutable state between
//! calls. Each endpoint is split into a `build_*` method that produces an
//! `HttpRequest` and a `parse_*` method that consumes an `HttpResponse`.
//! Authenticated builders take the bearer token as an argument; where it
//! comes from is the caller's business (see `session` and `backend`).

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::types::{
    Credentials, Envelope, ErrorBody, NewPost, NewTodo, Post, Profile, Registration, TodoItem,
    TokenData,
};

pub const TODO_FIELDS_REQUIRED: &str = "Both title and description are required.";
pub const POST_CONTENT_REQUIRED: &str = "Please write something before posting.";
pub const TODO_ID_REQUIRED: &str = "A todo id is required.";

/// Encodes all but `-`, `_` and `~`. `.` is encoded so an id can never act
/// as a dot segment.
const PATH_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC.remove(b'-').remove(b'_').remove(b'~');

/// Synchronous, stateless client for the todo/social API.
#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    // -- auth ---------------------------------------------------------------

    pub fn build_login(&self, credentials: &Credentials) -> Result<HttpRequest, ApiError> {
        self.json_request(HttpMethod::Post, "/api/auth/login", None, credentials)
    }

    pub fn build_register(&self, registration: &Registration) -> Result<HttpRequest, ApiError> {
        self.json_request(HttpMethod::Post, "/api/auth/register", None, registration)
    }

    /// Extracts the token from `{"data":{"token":...}}`.
    pub fn parse_login(&self, response: HttpResponse) -> Result<String, ApiError> {
        check_status(&response)?;
        let envelope: Envelope<TokenData> = decode(&response.body)?;
        Ok(envelope.data.token)
    }

    pub fn parse_register(&self, response: HttpResponse) -> Result<(), ApiError> {
        check_status(&response)
    }

    // -- todos --------------------------------------------------------------

    pub fn build_list_todos(&self, token: &str) -> HttpRequest {
        self.bare_request(HttpMethod::Get, "/api/todos".to_string(), token)
    }

    /// Fails with `ApiError::Validation` if title or description is empty.
    pub fn build_create_todo(&self, token: &str, input: &NewTodo) -> Result<HttpRequest, ApiError> {
        validate_new_todo(&input.title, &input.description)?;
        self.json_request(HttpMethod::Post, "/api/todos", Some(token), input)
    }

    /// The id is sent as a single percent-encoded path segment. Fails with
    /// `ApiError::Validation` if it is empty.
    pub fn build_delete_todo(&self, token: &str, id: &str) -> Result<HttpRequest, ApiError> {
        if id.is_empty() {
            return Err(ApiError::Validation(TODO_ID_REQUIRED.to_string()));
        }
        let segment = utf8_percent_encode(id, PATH_SEGMENT);
        Ok(self.bare_request(HttpMethod::Delete, format!("/api/todos/{segment}"), token))
    }

    pub fn parse_list_todos(&self, response: HttpResponse) -> Result<Vec<TodoItem>, ApiError> {
        check_status(&response)?;
        decode(&response.body)
    }

    /// The created item is not returned; callers re-fetch the list.
    pub fn parse_create_todo(&self, response: HttpResponse) -> Result<(), ApiError> {
        check_status(&response)
    }

    pub fn parse_delete_todo(&self, response: HttpResponse) -> Result<(), ApiError> {
        check_status(&response)
    }

    // -- profile ------------------------------------------------------------

    pub fn build_profile(&self, token: &str) -> HttpRequest {
        self.bare_request(HttpMethod::Get, "/api/profile".to_string(), token)
    }

    pub fn parse_profile(&self, response: HttpResponse) -> Result<Profile, ApiError> {
        check_status(&response)?;
        let envelope: Envelope<Profile> = decode(&response.body)?;
        Ok(envelope.data)
    }

    // -- posts --------------------------------------------------------------

    /// Fails with `ApiError::Validation` if the content is blank.
    pub fn build_create_post(&self, token: &str, input: &NewPost) -> Result<HttpRequest, ApiError> {
        validate_post_content(&input.content)?;
        self.json_request(HttpMethod::Post, "/api/posts", Some(token), input)
    }

    pub fn parse_create_post(&self, response: HttpResponse) -> Result<Post, ApiError> {
        check_status(&response)?;
        decode(&response.body)
    }

    // -- helpers ------------------------------------------------------------

    fn bare_request(&self, method: HttpMethod, path: String, token: &str) -> HttpRequest {
        HttpRequest {
            method,
            path: format!("{}{path}", self.base_url),
            headers: vec![bearer(token)],
            body: None,
        }
    }

    fn json_request<B: Serialize>(
        &self,
        method: HttpMethod,
        path: &str,
        token: Option<&str>,
        body: &B,
    ) -> Result<HttpRequest, ApiError> {
        let body =
            serde_json::to_string(body).map_err(|e| ApiError::SerializationError(e.to_string()))?;
        let mut headers = vec![("content-type".to_string(), "application/json".to_string())];
        if let Some(token) = token {
            headers.push(bearer(token));
        }
        Ok(HttpRequest {
            method,
            path: format!("{}{path}", self.base_url),
            headers,
            body: Some(body),
        })
    }
}

pub fn validate_new_todo(title: &str, description: &str) -> Result<(), ApiError> {
    if title.is_empty() || description.is_empty() {
        return Err(ApiError::Validation(TODO_FIELDS_REQUIRED.to_string()));
    }
    Ok(())
}

pub fn validate_post_content(content: &str) -> Result<(), ApiError> {
    if content.trim().is_empty() {
        return Err(ApiError::Validation(POST_CONTENT_REQUIRED.to_string()));
    }
    Ok(())
}

fn bearer(token: &str) -> (String, String) {
    ("authorization".to_string(), format!("Bearer {token}"))
}

fn decode<T: DeserializeOwned>(body: &str) -> Result<T, ApiError> {
    serde_json::from_str(body).map_err(|e| ApiError::DeserializationError(e.to_string()))
}

/// Map non-2xx status codes to the appropriate `ApiError` variant.
fn check_status(response: &HttpResponse) -> Result<(), ApiError> {
    if response.is_success() {
        return Ok(());
    }
    if response.status == 404 {
        return Err(ApiError::NotFound);
    }
    let message = serde_json::from_str::<ErrorBody>(&response.body)
        .ok()
        .map(|b| b.message);
    Err(ApiError::HttpError {
        status: response.status,
        message,
        body: response.body.clone(),
    })
}
