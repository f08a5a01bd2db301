use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{Path, State},
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::{net::TcpListener, sync::RwLock};
use tower_http::trace::TraceLayer;
use uuid::Uuid;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Todo {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    pub description: String,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Post {
    #[serde(rename = "_id")]
    pub id: String,
    pub user: String,
    pub content: String,
}

#[derive(Deserialize)]
pub struct Register {
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub email: String,
}

#[derive(Deserialize)]
pub struct Login {
    pub username: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct CreateTodo {
    pub title: String,
    pub description: String,
    #[serde(rename = "createdAt")]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Deserialize)]
pub struct CreatePost {
    pub user: String,
    pub content: String,
}

struct Account {
    password: String,
    email: String,
}

#[derive(Default)]
pub struct Store {
    accounts: HashMap<String, Account>,
    tokens: HashMap<String, String>,
    todos: HashMap<String, Vec<Todo>>,
    posts: Vec<Post>,
}

pub type Db = Arc<RwLock<Store>>;

/// `{ "message": ... }` error body with a status code.
pub struct ErrorResponse(StatusCode, &'static str);

impl IntoResponse for ErrorResponse {
    fn into_response(self) -> Response {
        (self.0, Json(json!({ "message": self.1 }))).into_response()
    }
}

const UNAUTHORIZED: ErrorResponse = ErrorResponse(StatusCode::UNAUTHORIZED, "Unauthorized");

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(Store::default()));
    Router::new()
        .route("/api/auth/register", post(register))
        .route("/api/auth/login", post(login))
        .route("/api/todos", get(list_todos).post(create_todo))
        .route("/api/todos/{id}", delete(delete_todo))
        .route("/api/profile", get(profile))
        .route("/api/posts", post(create_post))
        .layer(TraceLayer::new_for_http())
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

/// Resolve the bearer token in `headers` to a username.
fn authorize(store: &Store, headers: &HeaderMap) -> Result<String, ErrorResponse> {
    let token = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .ok_or(UNAUTHORIZED)?;
    store.tokens.get(token).cloned().ok_or(UNAUTHORIZED)
}

async fn register(
    State(db): State<Db>,
    Json(input): Json<Register>,
) -> Result<(StatusCode, Json<serde_json::Value>), ErrorResponse> {
    if input.username.is_empty() || input.password.is_empty() {
        return Err(ErrorResponse(
            StatusCode::BAD_REQUEST,
            "Username and password are required",
        ));
    }
    let mut store = db.write().await;
    if store.accounts.contains_key(&input.username) {
        return Err(ErrorResponse(StatusCode::CONFLICT, "Username already taken"));
    }
    store.accounts.insert(
        input.username,
        Account {
            password: input.password,
            email: input.email,
        },
    );
    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "User registered" })),
    ))
}

async fn login(
    State(db): State<Db>,
    Json(input): Json<Login>,
) -> Result<Json<serde_json::Value>, ErrorResponse> {
    let mut store = db.write().await;
    let valid = store
        .accounts
        .get(&input.username)
        .is_some_and(|a| a.password == input.password);
    if !valid {
        return Err(ErrorResponse(StatusCode::UNAUTHORIZED, "Invalid credentials"));
    }
    let token = Uuid::new_v4().simple().to_string();
    store.tokens.insert(token.clone(), input.username);
    Ok(Json(json!({ "data": { "token": token } })))
}

async fn list_todos(
    State(db): State<Db>,
    headers: HeaderMap,
) -> Result<Json<Vec<Todo>>, ErrorResponse> {
    let store = db.read().await;
    let user = authorize(&store, &headers)?;
    Ok(Json(store.todos.get(&user).cloned().unwrap_or_default()))
}

async fn create_todo(
    State(db): State<Db>,
    headers: HeaderMap,
    Json(input): Json<CreateTodo>,
) -> Result<(StatusCode, Json<Todo>), ErrorResponse> {
    let mut store = db.write().await;
    let user = authorize(&store, &headers)?;
    if input.title.is_empty() || input.description.is_empty() {
        return Err(ErrorResponse(
            StatusCode::BAD_REQUEST,
            "Title and description are required",
        ));
    }
    let todo = Todo {
        id: Uuid::new_v4().simple().to_string(),
        title: input.title,
        description: input.description,
        created_at: input.created_at.unwrap_or_else(Utc::now),
    };
    store.todos.entry(user).or_default().push(todo.clone());
    Ok((StatusCode::CREATED, Json(todo)))
}

async fn delete_todo(
    State(db): State<Db>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<StatusCode, ErrorResponse> {
    let mut store = db.write().await;
    let user = authorize(&store, &headers)?;
    let todos = store.todos.entry(user).or_default();
    let before = todos.len();
    todos.retain(|t| t.id != id);
    if todos.len() == before {
        return Err(ErrorResponse(StatusCode::NOT_FOUND, "Todo not found"));
    }
    Ok(StatusCode::NO_CONTENT)
}

async fn profile(
    State(db): State<Db>,
    headers: HeaderMap,
) -> Result<Json<serde_json::Value>, ErrorResponse> {
    let store = db.read().await;
    let user = authorize(&store, &headers)?;
    let email = store
        .accounts
        .get(&user)
        .map(|a| a.email.clone())
        .unwrap_or_default();
    Ok(Json(json!({ "data": { "username": user, "email": email } })))
}

async fn create_post(
    State(db): State<Db>,
    headers: HeaderMap,
    Json(input): Json<CreatePost>,
) -> Result<(StatusCode, Json<Post>), ErrorResponse> {
    let mut store = db.write().await;
    authorize(&store, &headers)?;
    if input.content.trim().is_empty() {
        return Err(ErrorResponse(StatusCode::BAD_REQUEST, "Content is required"));
    }
    let post = Post {
        id: Uuid::new_v4().simple().to_string(),
        user: input.user,
        content: input.content,
    };
    store.posts.push(post.clone());
    Ok((StatusCode::CREATED, Json(post)))
}
