//! Synchronous client core for the todo/social backend.
//!
//! # Overview
//! Builds `HttpRequest` values and parses `HttpResponse` values without
//! touching the network (host-does-IO pattern). On top of that stateless
//! layer sit a session store and a todo synchronizer that drive requests
//! through a host-supplied `Transport`.
//!
//! # Design
//! - `ApiClient` is stateless; it holds only `base_url`.
//! - Each endpoint is split into `build_*` and `parse_*`, so the I/O boundary
//!   is explicit and the FFI layer can expose the same pair.
//! - `Backend` bundles the client, a transport and a `SessionStore`; it is
//!   passed explicitly rather than living in a global.
//! - `TodoSync` mirrors the server's todo collection and re-fetches it after
//!   every mutation.
//! - DTOs are defined independently from the mock-server crate; integration
//!   tests catch schema drift.

pub mod backend;
pub mod client;
pub mod error;
pub mod http;
pub mod session;
pub mod sync;
pub mod types;

pub use backend::Backend;
pub use client::ApiClient;
pub use error::ApiError;
pub use http::{HttpMethod, HttpRequest, HttpResponse, Transport, TransportError};
pub use session::{FileStore, KeyValueStore, MemoryStore, Session, SessionStore, StoreError};
pub use sync::{Refresh, TodoSync};
pub use types::{Credentials, NewPost, NewTodo, Post, Profile, Registration, TodoItem};
