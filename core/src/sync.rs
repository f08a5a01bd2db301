//! Todo synchronizer: keeps a local copy of the user's todo list.
//!
//! # Design
//! The server is the only source of truth. The local list is replaced
//! wholesale by each successful `list()` and never edited in place: `create`
//! and `delete` issue their request and then re-fetch the full collection.
//! A failed fetch leaves the previous list as it was. Once a create or
//! delete has been accepted it is reported as done; a failed re-fetch after
//! it comes back as `Refresh::Stale`, never as the mutation's error.
//!
//! Operations are sequential (`&mut self`). There is no retry, no
//! de-duplication, and no ordering between separate synchronizers; whichever
//! list response arrives last is what the caller sees.

use chrono::Utc;
use tracing::{debug, info, warn};

use crate::backend::Backend;
use crate::client::validate_new_todo;
use crate::error::ApiError;
use crate::http::Transport;
use crate::session::KeyValueStore;
use crate::types::{NewTodo, TodoItem};

/// What happened to the local list after an accepted create or delete.
#[derive(Debug)]
pub enum Refresh {
    /// The list was re-fetched and mirrors the server.
    Fresh,
    /// The re-fetch failed; `todos()` still holds the previous list.
    Stale(ApiError),
}

impl Refresh {
    pub fn is_fresh(&self) -> bool {
        matches!(self, Refresh::Fresh)
    }
}

pub struct TodoSync<'a, T, S> {
    backend: &'a Backend<T, S>,
    todos: Vec<TodoItem>,
}

impl<'a, T: Transport, S: KeyValueStore> TodoSync<'a, T, S> {
    pub fn new(backend: &'a Backend<T, S>) -> Self {
        Self {
            backend,
            todos: Vec::new(),
        }
    }

    /// The list as of the last successful fetch.
    pub fn todos(&self) -> &[TodoItem] {
        &self.todos
    }

    /// Fetch the collection and replace the local list with it.
    pub fn list(&mut self) -> Result<&[TodoItem], ApiError> {
        let session = self.backend.session()?;
        let api = self.backend.api();
        let resp = self.backend.send(api.build_list_todos(&session.token))?;
        let todos = api
            .parse_list_todos(resp)
            .inspect_err(|e| warn!(error = %e, "todo list fetch failed"))?;
        info!(count = todos.len(), "todo list refreshed");
        self.todos = todos;
        Ok(&self.todos)
    }

    /// Create an item stamped with the current time, then re-fetch.
    pub fn create(&mut self, title: &str, description: &str) -> Result<Refresh, ApiError> {
        validate_new_todo(title, description)?;
        let session = self.backend.session()?;
        let api = self.backend.api();
        let input = NewTodo {
            title: title.to_string(),
            description: description.to_string(),
            created_at: Utc::now(),
        };
        let resp = self
            .backend
            .send(api.build_create_todo(&session.token, &input)?)?;
        api.parse_create_todo(resp)
            .inspect_err(|e| warn!(error = %e, "todo creation failed"))?;
        debug!(title, "todo created");
        Ok(self.refresh())
    }

    /// Delete an item by id, then re-fetch.
    pub fn delete(&mut self, id: &str) -> Result<Refresh, ApiError> {
        let session = self.backend.session()?;
        let api = self.backend.api();
        let resp = self.backend.send(api.build_delete_todo(&session.token, id)?)?;
        api.parse_delete_todo(resp)
            .inspect_err(|e| warn!(id, error = %e, "todo deletion failed"))?;
        debug!(id, "todo deleted");
        Ok(self.refresh())
    }

    fn refresh(&mut self) -> Refresh {
        match self.list() {
            Ok(_) => Refresh::Fresh,
            Err(e) => {
                warn!(error = %e, "list refresh after mutation failed");
                Refresh::Stale(e)
            }
        }
    }
}
