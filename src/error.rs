use rocket::http::{ContentType, Status};
use rocket::request::Request;
use rocket::response::{self, Responder, Response};
use std::io::Cursor;
use thiserror::Error;

/// Console errors
#[derive(Error, Debug)]
pub enum ConsoleError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Backend returned {status}: {body}")]
    Backend { status: u16, body: String },

    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },

    #[error("{feed} feed unavailable: {reason}")]
    Unavailable { feed: &'static str, reason: String },

    #[error("Invalid response payload: {0}")]
    Decode(#[from] serde_json::Error),
}

impl ConsoleError {
    pub fn not_found(kind: &'static str, id: impl Into<String>) -> Self {
        ConsoleError::NotFound { kind, id: id.into() }
    }

    pub fn status(&self) -> Status {
        match self {
            ConsoleError::Validation(_) => Status::UnprocessableEntity,
            ConsoleError::NotFound { .. } => Status::NotFound,
            ConsoleError::Unavailable { .. } => Status::ServiceUnavailable,
            ConsoleError::Network(_) | ConsoleError::Backend { .. } | ConsoleError::Decode(_) => {
                Status::BadGateway
            }
        }
    }
}

pub type ConsoleResult<T> = Result<T, ConsoleError>;

impl<'r> Responder<'r, 'static> for ConsoleError {
    fn respond_to(self, _: &'r Request<'_>) -> response::Result<'static> {
        let status = self.status();
        let body = serde_json::json!({
            "error": self.to_string(),
            "status": status.code,
        })
        .to_string();

        Response::build()
            .status(status)
            .header(ContentType::JSON)
            .sized_body(body.len(), Cursor::new(body))
            .ok()
    }
}
