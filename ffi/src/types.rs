//! `#[repr(C)]` types for the FFI boundary.
//!
//! # Design
//! Each type mirrors a core type but uses C-compatible representations:
//! `*mut c_char` instead of `String`, raw pointers instead of `Vec`, and
//! tagged enums with explicit discriminants. Conversion functions live here
//! to keep `lib.rs` focused on the `extern "C"` surface.

use std::ffi::{c_void, CString};
use std::os::raw::c_char;

use todo_social_core::error::ApiError;
use todo_social_core::http::HttpMethod;
use todo_social_core::types::{Post, Profile, TodoItem};

/// Opaque handle to an `ApiClient`. C callers receive a pointer to this
/// and pass it back into every FFI function.
pub struct FfiApiClient {
    pub(crate) inner: todo_social_core::ApiClient,
}

/// Move a Rust string onto the C heap. Interior NULs yield an empty string.
pub(crate) fn to_c(s: String) -> *mut c_char {
    CString::new(s).unwrap_or_default().into_raw()
}

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// HTTP method as a C enum.
#[repr(C)]
pub enum FfiHttpMethod {
    Get = 0,
    Post = 1,
    Delete = 2,
}

impl From<HttpMethod> for FfiHttpMethod {
    fn from(m: HttpMethod) -> Self {
        match m {
            HttpMethod::Get => FfiHttpMethod::Get,
            HttpMethod::Post => FfiHttpMethod::Post,
            HttpMethod::Delete => FfiHttpMethod::Delete,
        }
    }
}

/// A single HTTP header as a key-value pair of C strings.
#[repr(C)]
pub struct FfiHeader {
    pub key: *mut c_char,
    pub value: *mut c_char,
}

/// An HTTP request described as C-compatible plain data.
///
/// Built by `todo_build_*` functions. The C caller executes the request
/// and passes the response back through `todo_parse_*`.
#[repr(C)]
pub struct FfiHttpRequest {
    pub method: FfiHttpMethod,
    pub path: *mut c_char,
    pub headers: *mut FfiHeader,
    pub headers_len: u32,
    pub body: *mut c_char,
}

impl FfiHttpRequest {
    /// Convert a core `HttpRequest` into a heap-allocated `FfiHttpRequest`.
    pub(crate) fn from_core(req: todo_social_core::HttpRequest) -> *mut Self {
        let path = to_c(req.path);
        let body = match req.body {
            Some(b) => to_c(b),
            None => std::ptr::null_mut(),
        };

        let headers_len = req.headers.len() as u32;
        let headers = if req.headers.is_empty() {
            std::ptr::null_mut()
        } else {
            let ffi_headers: Box<[FfiHeader]> = req
                .headers
                .into_iter()
                .map(|(k, v)| FfiHeader {
                    key: to_c(k),
                    value: to_c(v),
                })
                .collect();
            Box::into_raw(ffi_headers) as *mut FfiHeader
        };

        Box::into_raw(Box::new(FfiHttpRequest {
            method: req.method.into(),
            path,
            headers,
            headers_len,
            body,
        }))
    }
}

// ---------------------------------------------------------------------------
// Response input (caller-provided, not heap-allocated by us)
// ---------------------------------------------------------------------------

/// An HTTP response described as C-compatible plain data.
///
/// The C caller constructs this on the stack after executing an HTTP request,
/// then passes a pointer to a `todo_parse_*` function. The FFI layer reads
/// but does not free these fields.
#[repr(C)]
pub struct FfiHttpResponse {
    pub status: u16,
    pub body: *const c_char,
}

// ---------------------------------------------------------------------------
// Result types
// ---------------------------------------------------------------------------

/// Error codes returned in `FfiResult`.
#[repr(C)]
pub enum FfiErrorCode {
    Ok = 0,
    NotFound = 1,
    Http = 2,
    Deserialization = 3,
    Serialization = 4,
    Validation = 5,
    NotAuthenticated = 6,
    Transport = 7,
    Store = 8,
    Panic = 9,
    NullArg = 10,
}

/// Tag that tells `todo_free_result` what `FfiResult::data` points to.
#[repr(C)]
pub enum FfiDataTag {
    None = 0,
    /// `data` is a NUL-terminated bearer token.
    Token = 1,
    TodoList = 2,
    Profile = 3,
    Post = 4,
}

/// A single todo item exposed to C. `created_at` is RFC 3339.
#[repr(C)]
pub struct FfiTodo {
    pub id: *mut c_char,
    pub title: *mut c_char,
    pub description: *mut c_char,
    pub created_at: *mut c_char,
}

/// A list of todo items exposed to C.
#[repr(C)]
pub struct FfiTodoList {
    pub items: *mut FfiTodo,
    pub len: u32,
}

#[repr(C)]
pub struct FfiProfile {
    pub username: *mut c_char,
    pub email: *mut c_char,
}

#[repr(C)]
pub struct FfiPost {
    pub id: *mut c_char,
    pub user: *mut c_char,
    pub content: *mut c_char,
}

/// Result envelope for all parse operations.
///
/// On success `error_code` is `Ok`, both message fields are null, and `data`
/// points to the parsed payload (tagged by `data_tag`).
/// On failure `error_code` describes the category, `error_message` is the
/// diagnostic text, `user_message` is the single line meant for display,
/// and `data` is null.
#[repr(C)]
pub struct FfiResult {
    pub error_code: FfiErrorCode,
    pub error_message: *mut c_char,
    pub user_message: *mut c_char,
    pub http_status: u16,
    pub data_tag: FfiDataTag,
    pub data: *mut c_void,
}

impl FfiResult {
    fn ok(data_tag: FfiDataTag, data: *mut c_void) -> *mut Self {
        Box::into_raw(Box::new(FfiResult {
            error_code: FfiErrorCode::Ok,
            error_message: std::ptr::null_mut(),
            user_message: std::ptr::null_mut(),
            http_status: 0,
            data_tag,
            data,
        }))
    }

    fn err(error_code: FfiErrorCode, http_status: u16, message: String, user: String) -> *mut Self {
        Box::into_raw(Box::new(FfiResult {
            error_code,
            error_message: to_c(message),
            user_message: to_c(user),
            http_status,
            data_tag: FfiDataTag::None,
            data: std::ptr::null_mut(),
        }))
    }

    /// Build a success result with no data payload (e.g. delete).
    pub(crate) fn ok_empty() -> *mut Self {
        Self::ok(FfiDataTag::None, std::ptr::null_mut())
    }

    pub(crate) fn ok_token(token: String) -> *mut Self {
        Self::ok(FfiDataTag::Token, to_c(token) as *mut c_void)
    }

    /// Build a success result carrying a `FfiTodoList`.
    pub(crate) fn ok_todo_list(todos: Vec<TodoItem>) -> *mut Self {
        let len = todos.len() as u32;
        let items = if todos.is_empty() {
            std::ptr::null_mut()
        } else {
            let ffi_todos: Box<[FfiTodo]> = todos
                .into_iter()
                .map(|t| FfiTodo {
                    id: to_c(t.id),
                    title: to_c(t.title),
                    description: to_c(t.description),
                    created_at: to_c(t.created_at.to_rfc3339()),
                })
                .collect();
            Box::into_raw(ffi_todos) as *mut FfiTodo
        };
        let list = Box::new(FfiTodoList { items, len });
        Self::ok(FfiDataTag::TodoList, Box::into_raw(list) as *mut c_void)
    }

    pub(crate) fn ok_profile(profile: Profile) -> *mut Self {
        let p = Box::new(FfiProfile {
            username: to_c(profile.username),
            email: to_c(profile.email),
        });
        Self::ok(FfiDataTag::Profile, Box::into_raw(p) as *mut c_void)
    }

    pub(crate) fn ok_post(post: Post) -> *mut Self {
        let p = Box::new(FfiPost {
            id: to_c(post.id),
            user: to_c(post.user),
            content: to_c(post.content),
        });
        Self::ok(FfiDataTag::Post, Box::into_raw(p) as *mut c_void)
    }

    /// Build an error result from an `ApiError`.
    pub(crate) fn from_error(err: ApiError) -> *mut Self {
        let (code, status) = match &err {
            ApiError::NotFound => (FfiErrorCode::NotFound, 404u16),
            ApiError::HttpError { status, .. } => (FfiErrorCode::Http, *status),
            ApiError::DeserializationError(_) => (FfiErrorCode::Deserialization, 0),
            ApiError::SerializationError(_) => (FfiErrorCode::Serialization, 0),
            ApiError::Validation(_) => (FfiErrorCode::Validation, 0),
            ApiError::NotAuthenticated => (FfiErrorCode::NotAuthenticated, 0),
            ApiError::Transport(_) => (FfiErrorCode::Transport, 0),
            ApiError::Store(_) => (FfiErrorCode::Store, 0),
        };
        Self::err(code, status, err.to_string(), err.user_message())
    }

    /// Build an error result for a null argument.
    pub(crate) fn null_arg(name: &str) -> *mut Self {
        Self::err(
            FfiErrorCode::NullArg,
            0,
            format!("null argument: {name}"),
            todo_social_core::error::GENERIC_ERROR_MESSAGE.to_string(),
        )
    }

    /// Build an error result for a caught panic.
    pub(crate) fn panic(msg: &str) -> *mut Self {
        Self::err(
            FfiErrorCode::Panic,
            0,
            msg.to_string(),
            todo_social_core::error::GENERIC_ERROR_MESSAGE.to_string(),
        )
    }
}
