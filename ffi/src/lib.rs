//! C-ABI wrapper around `todo-social-core`.
//!
//! # Overview
//! Exposes the stateless builders and parsers through `extern "C"` functions
//! so a mobile host (Swift, Kotlin via JNI, anything with a C FFI) can build
//! and parse backend requests while doing the HTTP itself. The host owns the
//! session: it stores the token returned by `todo_parse_login` and passes it
//! to every authenticated builder.
//!
//! # Design
//! - Every `extern "C"` function wraps its body in `catch_unwind` so panics
//!   never cross the FFI boundary.
//! - Builders return null on null arguments or validation failure; hosts that
//!   need the reason call `todo_validate_new_todo` / `todo_validate_post`
//!   first.
//! - A single `FfiResult` envelope with `FfiDataTag` + `void* data` conveys
//!   success payloads and errors uniformly.
//! - The C caller owns all returned pointers and must call the matching
//!   `todo_free_*` function to release them.

pub mod types;

use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::panic::{catch_unwind, AssertUnwindSafe};

use chrono::{DateTime, Utc};
use todo_social_core::client::{validate_new_todo, validate_post_content};
use todo_social_core::http::{HttpRequest, HttpResponse};
use todo_social_core::types::{Credentials, NewPost, NewTodo, Registration};
use todo_social_core::{ApiClient, ApiError};

use types::*;

/// Read a C string argument. `None` for null; invalid UTF-8 reads as empty.
fn arg(ptr: *const c_char) -> Option<String> {
    if ptr.is_null() {
        return None;
    }
    Some(
        unsafe { CStr::from_ptr(ptr) }
            .to_str()
            .unwrap_or("")
            .to_string(),
    )
}

/// Run a builder against a non-null client, turning null/panic/error into a
/// null request.
fn build_with(
    client: *const FfiApiClient,
    f: impl FnOnce(&ApiClient) -> Option<Result<HttpRequest, ApiError>>,
) -> *mut FfiHttpRequest {
    catch_unwind(AssertUnwindSafe(|| {
        if client.is_null() {
            return std::ptr::null_mut();
        }
        let client = unsafe { &*client };
        match f(&client.inner) {
            Some(Ok(req)) => FfiHttpRequest::from_core(req),
            _ => std::ptr::null_mut(),
        }
    }))
    .unwrap_or(std::ptr::null_mut())
}

/// Run a parser against a non-null client and response.
fn parse_with(
    op: &str,
    client: *const FfiApiClient,
    response: *const FfiHttpResponse,
    f: impl FnOnce(&ApiClient, HttpResponse) -> *mut FfiResult,
) -> *mut FfiResult {
    catch_unwind(AssertUnwindSafe(|| {
        if client.is_null() {
            return FfiResult::null_arg("client");
        }
        if response.is_null() {
            return FfiResult::null_arg("response");
        }
        let client = unsafe { &*client };
        let resp = unsafe { &*response };
        f(&client.inner, ffi_response_to_core(resp))
    }))
    .unwrap_or_else(|_| FfiResult::panic(&format!("panic in {op}")))
}

/// Convert an `FfiHttpResponse` to a core `HttpResponse`. A null body reads
/// as empty.
fn ffi_response_to_core(resp: &FfiHttpResponse) -> HttpResponse {
    HttpResponse {
        status: resp.status,
        headers: Vec::new(),
        body: arg(resp.body).unwrap_or_default(),
    }
}

fn into_result<T>(result: Result<T, ApiError>, ok: impl FnOnce(T) -> *mut FfiResult) -> *mut FfiResult {
    match result {
        Ok(v) => ok(v),
        Err(e) => FfiResult::from_error(e),
    }
}

// ---------------------------------------------------------------------------
// Client lifecycle
// ---------------------------------------------------------------------------

/// Create a new `ApiClient` bound to `base_url`.
///
/// Returns null if `base_url` is null or if an internal panic occurs.
/// The caller must free the returned pointer with `todo_client_free`.
#[unsafe(no_mangle)]
pub extern "C" fn todo_client_new(base_url: *const c_char) -> *mut FfiApiClient {
    catch_unwind(|| match arg(base_url) {
        Some(url) => Box::into_raw(Box::new(FfiApiClient {
            inner: ApiClient::new(&url),
        })),
        None => std::ptr::null_mut(),
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Free an `ApiClient` created by `todo_client_new`. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn todo_client_free(client: *mut FfiApiClient) {
    if !client.is_null() {
        let _ = catch_unwind(|| {
            drop(unsafe { Box::from_raw(client) });
        });
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Check todo fields without building a request. Returns `Ok` or
/// `Validation` with a displayable `user_message`.
#[unsafe(no_mangle)]
pub extern "C" fn todo_validate_new_todo(
    title: *const c_char,
    description: *const c_char,
) -> *mut FfiResult {
    catch_unwind(|| {
        let title = arg(title).unwrap_or_default();
        let description = arg(description).unwrap_or_default();
        into_result(validate_new_todo(&title, &description), |()| FfiResult::ok_empty())
    })
    .unwrap_or_else(|_| FfiResult::panic("panic in todo_validate_new_todo"))
}

/// Check post content without building a request.
#[unsafe(no_mangle)]
pub extern "C" fn todo_validate_post(content: *const c_char) -> *mut FfiResult {
    catch_unwind(|| {
        let content = arg(content).unwrap_or_default();
        into_result(validate_post_content(&content), |()| FfiResult::ok_empty())
    })
    .unwrap_or_else(|_| FfiResult::panic("panic in todo_validate_post"))
}

// ---------------------------------------------------------------------------
// Build request functions
// ---------------------------------------------------------------------------

/// Build a login request. Returns null if any argument is null.
#[unsafe(no_mangle)]
pub extern "C" fn todo_build_login(
    client: *const FfiApiClient,
    username: *const c_char,
    password: *const c_char,
) -> *mut FfiHttpRequest {
    build_with(client, |c| {
        let input = Credentials {
            username: arg(username)?,
            password: arg(password)?,
        };
        Some(c.build_login(&input))
    })
}

/// Build a registration request. Returns null if any argument is null.
#[unsafe(no_mangle)]
pub extern "C" fn todo_build_register(
    client: *const FfiApiClient,
    username: *const c_char,
    password: *const c_char,
    email: *const c_char,
) -> *mut FfiHttpRequest {
    build_with(client, |c| {
        let input = Registration {
            username: arg(username)?,
            password: arg(password)?,
            email: arg(email)?,
        };
        Some(c.build_register(&input))
    })
}

/// Build an HTTP request for listing the user's todos.
#[unsafe(no_mangle)]
pub extern "C" fn todo_build_list_todos(
    client: *const FfiApiClient,
    token: *const c_char,
) -> *mut FfiHttpRequest {
    build_with(client, |c| Some(Ok(c.build_list_todos(&arg(token)?))))
}

/// Build an HTTP request for creating a todo.
///
/// `created_at` is an RFC 3339 timestamp; null means "now". Returns null if
/// `token`, `title` or `description` is null, if either field is empty, or
/// if `created_at` does not parse.
#[unsafe(no_mangle)]
pub extern "C" fn todo_build_create_todo(
    client: *const FfiApiClient,
    token: *const c_char,
    title: *const c_char,
    description: *const c_char,
    created_at: *const c_char,
) -> *mut FfiHttpRequest {
    build_with(client, |c| {
        let created_at = match arg(created_at) {
            None => Utc::now(),
            Some(raw) => DateTime::parse_from_rfc3339(&raw).ok()?.with_timezone(&Utc),
        };
        let input = NewTodo {
            title: arg(title)?,
            description: arg(description)?,
            created_at,
        };
        Some(c.build_create_todo(&arg(token)?, &input))
    })
}

/// Build an HTTP request for deleting a todo by id. The id is
/// percent-encoded as one path segment; an empty id returns null.
#[unsafe(no_mangle)]
pub extern "C" fn todo_build_delete_todo(
    client: *const FfiApiClient,
    token: *const c_char,
    id: *const c_char,
) -> *mut FfiHttpRequest {
    build_with(client, |c| Some(c.build_delete_todo(&arg(token)?, &arg(id)?)))
}

#[unsafe(no_mangle)]
pub extern "C" fn todo_build_profile(
    client: *const FfiApiClient,
    token: *const c_char,
) -> *mut FfiHttpRequest {
    build_with(client, |c| Some(Ok(c.build_profile(&arg(token)?))))
}

/// Build a post-creation request. Returns null on blank `content`.
#[unsafe(no_mangle)]
pub extern "C" fn todo_build_create_post(
    client: *const FfiApiClient,
    token: *const c_char,
    user: *const c_char,
    content: *const c_char,
) -> *mut FfiHttpRequest {
    build_with(client, |c| {
        let input = NewPost {
            user: arg(user)?,
            content: arg(content)?,
        };
        Some(c.build_create_post(&arg(token)?, &input))
    })
}

// ---------------------------------------------------------------------------
// Parse response functions
// ---------------------------------------------------------------------------

/// Parse a login response. `data_tag = Token` on success; the host persists
/// the token.
#[unsafe(no_mangle)]
pub extern "C" fn todo_parse_login(
    client: *const FfiApiClient,
    response: *const FfiHttpResponse,
) -> *mut FfiResult {
    parse_with("todo_parse_login", client, response, |c, r| {
        into_result(c.parse_login(r), FfiResult::ok_token)
    })
}

#[unsafe(no_mangle)]
pub extern "C" fn todo_parse_register(
    client: *const FfiApiClient,
    response: *const FfiHttpResponse,
) -> *mut FfiResult {
    parse_with("todo_parse_register", client, response, |c, r| {
        into_result(c.parse_register(r), |()| FfiResult::ok_empty())
    })
}

/// Parse a list response. `data_tag = TodoList` on success.
#[unsafe(no_mangle)]
pub extern "C" fn todo_parse_list_todos(
    client: *const FfiApiClient,
    response: *const FfiHttpResponse,
) -> *mut FfiResult {
    parse_with("todo_parse_list_todos", client, response, |c, r| {
        into_result(c.parse_list_todos(r), FfiResult::ok_todo_list)
    })
}

/// Parse a create response. `data_tag = None`; re-fetch the list afterwards.
#[unsafe(no_mangle)]
pub extern "C" fn todo_parse_create_todo(
    client: *const FfiApiClient,
    response: *const FfiHttpResponse,
) -> *mut FfiResult {
    parse_with("todo_parse_create_todo", client, response, |c, r| {
        into_result(c.parse_create_todo(r), |()| FfiResult::ok_empty())
    })
}

/// Parse a delete response. `data_tag = None`; re-fetch the list afterwards.
#[unsafe(no_mangle)]
pub extern "C" fn todo_parse_delete_todo(
    client: *const FfiApiClient,
    response: *const FfiHttpResponse,
) -> *mut FfiResult {
    parse_with("todo_parse_delete_todo", client, response, |c, r| {
        into_result(c.parse_delete_todo(r), |()| FfiResult::ok_empty())
    })
}

#[unsafe(no_mangle)]
pub extern "C" fn todo_parse_profile(
    client: *const FfiApiClient,
    response: *const FfiHttpResponse,
) -> *mut FfiResult {
    parse_with("todo_parse_profile", client, response, |c, r| {
        into_result(c.parse_profile(r), FfiResult::ok_profile)
    })
}

#[unsafe(no_mangle)]
pub extern "C" fn todo_parse_create_post(
    client: *const FfiApiClient,
    response: *const FfiHttpResponse,
) -> *mut FfiResult {
    parse_with("todo_parse_create_post", client, response, |c, r| {
        into_result(c.parse_create_post(r), FfiResult::ok_post)
    })
}

// ---------------------------------------------------------------------------
// Free functions
// ---------------------------------------------------------------------------

/// Free a C string field if non-null.
fn free_c(s: *mut c_char) {
    if !s.is_null() {
        drop(unsafe { CString::from_raw(s) });
    }
}

/// Free an `FfiHttpRequest` returned by any `todo_build_*` function.
/// Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn todo_free_request(req: *mut FfiHttpRequest) {
    if req.is_null() {
        return;
    }
    let _ = catch_unwind(|| {
        let req = unsafe { Box::from_raw(req) };
        free_c(req.path);
        free_c(req.body);
        if !req.headers.is_null() && req.headers_len > 0 {
            let headers = unsafe {
                Box::from_raw(std::ptr::slice_from_raw_parts_mut(
                    req.headers,
                    req.headers_len as usize,
                ))
            };
            for h in headers.iter() {
                free_c(h.key);
                free_c(h.value);
            }
        }
    });
}

/// Free an `FfiResult` returned by any `todo_parse_*` or `todo_validate_*`
/// function. Safe to call with null. Uses `data_tag` to determine what
/// `data` points to.
#[unsafe(no_mangle)]
pub extern "C" fn todo_free_result(result: *mut FfiResult) {
    if result.is_null() {
        return;
    }
    let _ = catch_unwind(|| {
        let result = unsafe { Box::from_raw(result) };
        free_c(result.error_message);
        free_c(result.user_message);
        if result.data.is_null() {
            return;
        }
        match result.data_tag {
            FfiDataTag::Token => free_c(result.data as *mut c_char),
            FfiDataTag::TodoList => {
                let list = unsafe { Box::from_raw(result.data as *mut FfiTodoList) };
                if !list.items.is_null() && list.len > 0 {
                    let items = unsafe {
                        Box::from_raw(std::ptr::slice_from_raw_parts_mut(
                            list.items,
                            list.len as usize,
                        ))
                    };
                    for item in items.iter() {
                        free_c(item.id);
                        free_c(item.title);
                        free_c(item.description);
                        free_c(item.created_at);
                    }
                }
            }
            FfiDataTag::Profile => {
                let p = unsafe { Box::from_raw(result.data as *mut FfiProfile) };
                free_c(p.username);
                free_c(p.email);
            }
            FfiDataTag::Post => {
                let p = unsafe { Box::from_raw(result.data as *mut FfiPost) };
                free_c(p.id);
                free_c(p.user);
                free_c(p.content);
            }
            FfiDataTag::None => {}
        }
    });
}

/// Free a C string allocated by this library. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn todo_free_string(s: *mut c_char) {
    let _ = catch_unwind(|| free_c(s));
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::CString;

    const ITEM: &str = r#"{"_id":"1","title":"Buy milk","description":"2%","createdAt":"2024-01-01T00:00:00Z"}"#;

    fn new_client() -> *mut FfiApiClient {
        let url = CString::new("http://localhost:3000").unwrap();
        todo_client_new(url.as_ptr())
    }

    fn c_str<'a>(p: *const c_char) -> &'a str {
        unsafe { CStr::from_ptr(p) }.to_str().unwrap()
    }

    fn parse(
        f: extern "C" fn(*const FfiApiClient, *const FfiHttpResponse) -> *mut FfiResult,
        status: u16,
        body: &str,
    ) -> *mut FfiResult {
        let client = new_client();
        let body = CString::new(body).unwrap();
        let resp = FfiHttpResponse {
            status,
            body: body.as_ptr(),
        };
        let result = f(client, &resp);
        todo_client_free(client);
        result
    }

    #[test]
    fn client_new_null_returns_null() {
        assert!(todo_client_new(std::ptr::null()).is_null());
    }

    #[test]
    fn client_free_null_is_safe() {
        todo_client_free(std::ptr::null_mut());
    }

    #[test]
    fn build_login_has_json_body_and_no_auth() {
        let client = new_client();
        let user = CString::new("alice").unwrap();
        let pass = CString::new("secret").unwrap();
        let req = todo_build_login(client, user.as_ptr(), pass.as_ptr());
        assert!(!req.is_null());

        let r = unsafe { &*req };
        assert!(matches!(r.method, FfiHttpMethod::Post));
        assert_eq!(c_str(r.path), "http://localhost:3000/api/auth/login");
        assert_eq!(r.headers_len, 1);
        let body: serde_json::Value = serde_json::from_str(c_str(r.body)).unwrap();
        assert_eq!(body["username"], "alice");

        todo_free_request(req);
        todo_client_free(client);
    }

    #[test]
    fn build_list_todos_carries_token() {
        let client = new_client();
        let token = CString::new("abc123").unwrap();
        let req = todo_build_list_todos(client, token.as_ptr());
        let r = unsafe { &*req };
        assert!(matches!(r.method, FfiHttpMethod::Get));
        assert!(r.body.is_null());
        assert_eq!(r.headers_len, 1);
        let header = unsafe { &*r.headers };
        assert_eq!(c_str(header.key), "authorization");
        assert_eq!(c_str(header.value), "Bearer abc123");

        todo_free_request(req);
        todo_client_free(client);
    }

    #[test]
    fn build_list_todos_null_token_returns_null() {
        let client = new_client();
        assert!(todo_build_list_todos(client, std::ptr::null()).is_null());
        todo_client_free(client);
    }

    #[test]
    fn build_create_todo_uses_given_timestamp() {
        let client = new_client();
        let token = CString::new("t").unwrap();
        let title = CString::new("Buy milk").unwrap();
        let desc = CString::new("2%").unwrap();
        let at = CString::new("2024-01-01T00:00:00Z").unwrap();
        let req = todo_build_create_todo(
            client,
            token.as_ptr(),
            title.as_ptr(),
            desc.as_ptr(),
            at.as_ptr(),
        );
        assert!(!req.is_null());
        let r = unsafe { &*req };
        assert_eq!(r.headers_len, 2);
        let body: serde_json::Value = serde_json::from_str(c_str(r.body)).unwrap();
        assert_eq!(body["createdAt"], "2024-01-01T00:00:00Z");

        todo_free_request(req);
        todo_client_free(client);
    }

    #[test]
    fn build_create_todo_empty_title_returns_null() {
        let client = new_client();
        let token = CString::new("t").unwrap();
        let title = CString::new("").unwrap();
        let desc = CString::new("x").unwrap();
        let req = todo_build_create_todo(
            client,
            token.as_ptr(),
            title.as_ptr(),
            desc.as_ptr(),
            std::ptr::null(),
        );
        assert!(req.is_null());
        todo_client_free(client);
    }

    #[test]
    fn validate_new_todo_reports_message() {
        let title = CString::new("x").unwrap();
        let empty = CString::new("").unwrap();
        let result = todo_validate_new_todo(title.as_ptr(), empty.as_ptr());
        let r = unsafe { &*result };
        assert!(matches!(r.error_code, FfiErrorCode::Validation));
        assert_eq!(c_str(r.user_message), "Both title and description are required.");
        todo_free_result(result);

        let result = todo_validate_new_todo(title.as_ptr(), title.as_ptr());
        assert!(matches!(unsafe { &*result }.error_code, FfiErrorCode::Ok));
        todo_free_result(result);
    }

    #[test]
    fn build_delete_todo_targets_id() {
        let client = new_client();
        let token = CString::new("t").unwrap();
        let id = CString::new("abc").unwrap();
        let req = todo_build_delete_todo(client, token.as_ptr(), id.as_ptr());
        let r = unsafe { &*req };
        assert!(matches!(r.method, FfiHttpMethod::Delete));
        assert_eq!(c_str(r.path), "http://localhost:3000/api/todos/abc");

        todo_free_request(req);
        todo_client_free(client);
    }

    #[test]
    fn build_delete_todo_encodes_id_and_rejects_empty() {
        let client = new_client();
        let token = CString::new("t").unwrap();

        let id = CString::new("../profile").unwrap();
        let req = todo_build_delete_todo(client, token.as_ptr(), id.as_ptr());
        assert_eq!(
            c_str(unsafe { &*req }.path),
            "http://localhost:3000/api/todos/%2E%2E%2Fprofile"
        );
        todo_free_request(req);

        let empty = CString::new("").unwrap();
        assert!(todo_build_delete_todo(client, token.as_ptr(), empty.as_ptr()).is_null());
        todo_client_free(client);
    }

    #[test]
    fn parse_login_returns_token() {
        let result = parse(todo_parse_login, 200, r#"{"data":{"token":"abc123"}}"#);
        let r = unsafe { &*result };
        assert!(matches!(r.error_code, FfiErrorCode::Ok));
        assert!(matches!(r.data_tag, FfiDataTag::Token));
        assert_eq!(c_str(r.data as *const c_char), "abc123");
        todo_free_result(result);
    }

    #[test]
    fn parse_login_failure_carries_server_message() {
        let result = parse(todo_parse_login, 401, r#"{"message":"Invalid credentials"}"#);
        let r = unsafe { &*result };
        assert!(matches!(r.error_code, FfiErrorCode::Http));
        assert_eq!(r.http_status, 401);
        assert_eq!(c_str(r.user_message), "Invalid credentials");
        todo_free_result(result);
    }

    #[test]
    fn parse_list_todos_empty() {
        let result = parse(todo_parse_list_todos, 200, "[]");
        let r = unsafe { &*result };
        assert!(matches!(r.data_tag, FfiDataTag::TodoList));
        let list = unsafe { &*(r.data as *const FfiTodoList) };
        assert_eq!(list.len, 0);
        assert!(list.items.is_null());
        todo_free_result(result);
    }

    #[test]
    fn parse_list_todos_one_item() {
        let result = parse(todo_parse_list_todos, 200, &format!("[{ITEM}]"));
        let r = unsafe { &*result };
        assert!(matches!(r.error_code, FfiErrorCode::Ok));
        let list = unsafe { &*(r.data as *const FfiTodoList) };
        assert_eq!(list.len, 1);
        let items = unsafe { std::slice::from_raw_parts(list.items, list.len as usize) };
        assert_eq!(c_str(items[0].id), "1");
        assert_eq!(c_str(items[0].title), "Buy milk");
        assert_eq!(c_str(items[0].description), "2%");
        assert!(c_str(items[0].created_at).starts_with("2024-01-01T00:00:00"));
        todo_free_result(result);
    }

    #[test]
    fn parse_delete_todo_not_found() {
        let result = parse(todo_parse_delete_todo, 404, "");
        let r = unsafe { &*result };
        assert!(matches!(r.error_code, FfiErrorCode::NotFound));
        assert_eq!(r.http_status, 404);
        assert!(!r.error_message.is_null());
        todo_free_result(result);
    }

    #[test]
    fn parse_profile_success() {
        let result = parse(
            todo_parse_profile,
            200,
            r#"{"data":{"username":"alice","email":"alice@example.com"}}"#,
        );
        let r = unsafe { &*result };
        assert!(matches!(r.data_tag, FfiDataTag::Profile));
        let p = unsafe { &*(r.data as *const FfiProfile) };
        assert_eq!(c_str(p.username), "alice");
        assert_eq!(c_str(p.email), "alice@example.com");
        todo_free_result(result);
    }

    #[test]
    fn parse_create_post_success() {
        let result = parse(
            todo_parse_create_post,
            201,
            r#"{"_id":"p1","user":"alice","content":"hi"}"#,
        );
        let r = unsafe { &*result };
        assert!(matches!(r.data_tag, FfiDataTag::Post));
        let p = unsafe { &*(r.data as *const FfiPost) };
        assert_eq!(c_str(p.id), "p1");
        todo_free_result(result);
    }

    #[test]
    fn parse_null_client_returns_null_arg() {
        let body = CString::new("[]").unwrap();
        let resp = FfiHttpResponse {
            status: 200,
            body: body.as_ptr(),
        };
        let result = todo_parse_list_todos(std::ptr::null(), &resp);
        assert!(matches!(unsafe { &*result }.error_code, FfiErrorCode::NullArg));
        todo_free_result(result);
    }

    #[test]
    fn parse_null_response_returns_null_arg() {
        let client = new_client();
        let result = todo_parse_list_todos(client, std::ptr::null());
        assert!(matches!(unsafe { &*result }.error_code, FfiErrorCode::NullArg));
        todo_free_result(result);
        todo_client_free(client);
    }

    #[test]
    fn free_functions_accept_null() {
        todo_free_request(std::ptr::null_mut());
        todo_free_result(std::ptr::null_mut());
        todo_free_string(std::ptr::null_mut());
    }
}
