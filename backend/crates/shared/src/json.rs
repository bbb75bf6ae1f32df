//! JSON request bodies
//!
//! [`Json`] replaces `axum::Json` in handlers. A body that fails to parse or
//! deserialize is answered with a 400 problem document instead of axum's
//! plain-text 422, with the offending field in `errors` when it can be named.

use axum::extract::FromRequest;
use axum::extract::rejection::JsonRejection;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use crate::error::app_error::AppError;

const DATA_ERROR_PREFIX: &str = "Failed to deserialize the JSON body into the target type: ";

#[derive(Debug, Clone, Copy, Default, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct Json<T>(pub T);

impl<T: Serialize> IntoResponse for Json<T> {
    fn into_response(self) -> Response {
        axum::Json(self.0).into_response()
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        match rejection {
            JsonRejection::JsonDataError(err) => data_error(&err.body_text()),
            JsonRejection::JsonSyntaxError(_) => AppError::bad_request("Malformed JSON body."),
            JsonRejection::MissingJsonContentType(_) => {
                AppError::bad_request("Expected a request with `Content-Type: application/json`.")
            }
            other => AppError::bad_request(other.body_text()),
        }
    }
}

/// Map a serde error such as ``missing field `password` `` or
/// `tags[0]: invalid type: integer, expected a string` to a field error.
fn data_error(body_text: &str) -> AppError {
    let detail = body_text.strip_prefix(DATA_ERROR_PREFIX).unwrap_or(body_text);
    let detail = detail
        .rfind(" at line ")
        .map_or(detail, |at| &detail[..at]);

    if let Some(field) = missing_field(detail) {
        return AppError::validation(field.to_string(), "This field is required.");
    }
    match detail.split_once(": ") {
        Some((path, message)) if is_field_path(path) => {
            AppError::validation(path.to_string(), message.to_string())
        }
        _ => AppError::bad_request(detail.to_string()),
    }
}

fn missing_field(detail: &str) -> Option<&str> {
    let start = detail.find("missing field `")? + "missing field `".len();
    let len = detail[start..].find('`')?;
    Some(&detail[start..start + len])
}

fn is_field_path(path: &str) -> bool {
    !path.is_empty()
        && path
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '[' | ']'))
}
