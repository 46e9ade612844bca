use actix_web::error::{BlockingError, ResponseError};
use actix_web::http::StatusCode;
use actix_web::HttpResponse;
use derive_more::Display;
use serde_derive::*;

#[derive(Debug, Display, Clone, Copy, PartialEq)]
pub enum ErrorKind {
    BadRequest,
    NotFound,
    InternalServerError,
}

#[derive(Debug, Display)]
pub enum Error {
    #[display(fmt = "{}: {}", _0, _1)]
    Custom(ErrorKind, String),
    #[display(fmt = "{}", _0)]
    Invalid(overlap::Error),
    #[display(fmt = "database error: {}", _0)]
    Db(diesel::result::Error),
    #[display(fmt = "connection pool error: {}", _0)]
    Pool(r2d2::Error),
    #[display(fmt = "migration error: {}", _0)]
    Migration(String),
    #[display(fmt = "multipart error: {}", _0)]
    Multipart(String),
    #[display(fmt = "io error: {}", _0)]
    Io(std::io::Error),
    #[display(fmt = "blocking task canceled")]
    Blocking,
}

impl Error {
    pub fn custom(kind: ErrorKind, msg: impl Into<String>) -> Self {
        Error::Custom(kind, msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Error::Custom(ErrorKind::NotFound, msg.into())
    }

    pub fn bad_request(msg: impl Into<String>) -> Self {
        Error::Custom(ErrorKind::BadRequest, msg.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Custom(kind, _) => *kind,
            Error::Invalid(_) | Error::Multipart(_) => ErrorKind::BadRequest,
            Error::Db(diesel::result::Error::NotFound) => ErrorKind::NotFound,
            _ => ErrorKind::InternalServerError,
        }
    }

    /// message safe to show to a client, internal details are never exposed
    pub fn public_message(&self) -> String {
        match self.kind() {
            ErrorKind::InternalServerError => "internal server error".to_owned(),
            _ => match self {
                Error::Custom(_, msg) => msg.clone(),
                Error::Db(diesel::result::Error::NotFound) => "record not found".to_owned(),
                other => other.to_string(),
            },
        }
    }
}

impl std::error::Error for Error {}

#[derive(Debug, Deserialize, Serialize)]
pub struct ErrorResponse {
    pub errors: Vec<String>,
}

impl ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        match self.kind() {
            ErrorKind::BadRequest => StatusCode::BAD_REQUEST,
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::InternalServerError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        if self.kind() == ErrorKind::InternalServerError {
            log::error!("{}", self);
        }
        HttpResponse::build(self.status_code()).json(ErrorResponse::from(&self.public_message()))
    }
}

impl From<&String> for ErrorResponse {
    fn from(err: &String) -> Self {
        ErrorResponse {
            errors: vec![err.into()],
        }
    }
}

impl From<Vec<String>> for ErrorResponse {
    fn from(errors: Vec<String>) -> Self {
        ErrorResponse { errors }
    }
}

impl From<overlap::Error> for Error {
    fn from(err: overlap::Error) -> Error {
        Error::Invalid(err)
    }
}

impl From<diesel::result::Error> for Error {
    fn from(err: diesel::result::Error) -> Error {
        Error::Db(err)
    }
}

impl From<r2d2::Error> for Error {
    fn from(err: r2d2::Error) -> Error {
        Error::Pool(err)
    }
}

impl From<actix_multipart::MultipartError> for Error {
    fn from(err: actix_multipart::MultipartError) -> Error {
        Error::Multipart(err.to_string())
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Error {
        Error::Io(err)
    }
}

impl From<BlockingError> for Error {
    fn from(_: BlockingError) -> Error {
        Error::Blocking
    }
}
