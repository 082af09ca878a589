//! API response helpers

use axum::Json;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::response::Response;
use serde::Serialize;

use crate::storage;

/// Hold data for a successful API interaction
///
/// The data is the body as is, there is no envelope around it
pub struct Success<V>
where
    V: Serialize,
{
    status_code: StatusCode,
    data: V,
}

impl<V> Success<V>
where
    V: Serialize,
{
    pub fn ok(data: V) -> Self {
        Self {
            status_code: StatusCode::OK,
            data,
        }
    }
}

impl<V> IntoResponse for Success<V>
where
    V: Serialize,
{
    fn into_response(self) -> Response {
        (self.status_code, Json(self.data)).into_response()
    }
}

/// Confirmation message without any other data
#[derive(Debug, Serialize)]
pub struct Message {
    msg: &'static str,
}

impl Message {
    pub fn success() -> Self {
        Self { msg: "success" }
    }
}

/// Hold data for a failed API interaction
#[derive(Debug)]
pub struct Error {
    status_code: StatusCode,
    message: String,
    description: Option<String>,
}

impl Error {
    fn new<M>(status_code: StatusCode, message: M) -> Self
    where
        M: ToString,
    {
        Self {
            status_code,
            message: message.to_string(),
            description: None,
        }
    }

    pub fn bad_request<M>(message: M) -> Self
    where
        M: ToString,
    {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn unauthorized<M>(message: M) -> Self
    where
        M: ToString,
    {
        Self::new(StatusCode::UNAUTHORIZED, message)
    }

    pub fn not_found<M>(message: M) -> Self
    where
        M: ToString,
    {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    /// Something went wrong on our side, the cause is logged and not shared
    pub fn internal_server_error<M>(message: M) -> Self
    where
        M: ToString,
    {
        let message = message.to_string();

        tracing::error!("Internal server error: {message}");

        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
    }

    pub fn with_description<M>(self, description: M) -> Self
    where
        M: ToString,
    {
        Self {
            description: Some(description.to_string()),
            ..self
        }
    }

    #[cfg(test)]
    pub fn status_code(&self) -> StatusCode {
        self.status_code
    }
}

impl From<storage::Error> for Error {
    fn from(err: storage::Error) -> Self {
        match err {
            storage::Error::Conflict(description) => {
                Self::bad_request("Conflict").with_description(description)
            }
            storage::Error::InvalidReference(description) => {
                Self::bad_request("Invalid notebook reference").with_description(description)
            }
            err @ storage::Error::Connection(_) => Self::internal_server_error(err),
        }
    }
}

#[derive(Serialize)]
struct ErrorWrapper {
    detail: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<String>,
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        (
            self.status_code,
            Json(ErrorWrapper {
                detail: self.message,
                description: self.description,
            }),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_errors() {
        let err = Error::from(storage::Error::Conflict("email".to_string()));
        assert_eq!(StatusCode::BAD_REQUEST, err.status_code());

        let err = Error::from(storage::Error::InvalidReference("notebook".to_string()));
        assert_eq!(StatusCode::BAD_REQUEST, err.status_code());
        assert_eq!("Invalid notebook reference", err.message);

        let err = Error::from(storage::Error::Connection("gone".to_string()));
        assert_eq!(StatusCode::INTERNAL_SERVER_ERROR, err.status_code());
        assert_eq!(None, err.description);
    }
}
