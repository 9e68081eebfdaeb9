#![allow(non_snake_case)]

use axum::http::{StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::Json;

use serde::Serialize;
use thiserror::Error;

/// Why a scanned string was rejected. Every variant is an ordinary
/// outcome of a bad scan, the caller asks the user to rescan.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Error)]
pub enum DecodeError {
    #[error("scanned data is not a structured record")]
    MalformedEncoding,
    #[error("scanned record has no recognized type")]
    UnknownType,
    #[error("scanned record has missing or invalid fields")]
    ValidationFailed,
}

impl DecodeError {
    pub fn kind(&self) -> &'static str {
        match self {
            DecodeError::MalformedEncoding => "MalformedEncoding",
            DecodeError::UnknownType => "UnknownType",
            DecodeError::ValidationFailed => "ValidationFailed",
        }
    }
}

pub async fn handler404(path: Uri) -> (StatusCode, Json<Error>) {
    (
        StatusCode::NOT_FOUND,
        Json(Error::NotFound {
            message: format!("Invalid path: {}", path),
        }),
    )
}

#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum Maybe<T> {
    Nothing(Error),
    Fine(Success<T>),
}

pub fn Fine<V>(v: V) -> Maybe<V>
where
    V: Serialize,
{
    Maybe::Fine(Success::of(v))
}

pub fn Nothing<V>(err: Error) -> Maybe<V> {
    Maybe::Nothing(err)
}

#[derive(Debug, Clone, Serialize)]
pub struct Success<V> {
    success: bool,
    #[serde(flatten)]
    value: V,
}

impl<T> IntoResponse for Maybe<T>
where
    T: Serialize,
{
    fn into_response(self) -> Response {
        match self {
            Maybe::Nothing(err) => Json::into_response(Json(err)),
            Maybe::Fine(success) => Json::into_response(Json(success)),
        }
    }
}

impl<T> Maybe<T> {
    pub fn fine(self) -> Option<T> {
        match self {
            Maybe::Fine(success) => Some(success.value),
            Maybe::Nothing(_) => None,
        }
    }

    pub fn nothing(self) -> Option<Error> {
        match self {
            Maybe::Nothing(err) => Some(err),
            Maybe::Fine(_) => None,
        }
    }
}

impl<V: Serialize> Success<V> {
    pub fn of(value: V) -> Self {
        Self {
            success: true,
            value,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "error")]
pub enum Error {
    NotFound { message: String },
    InvalidQrCode { kind: &'static str, message: String },
    Expired { message: String },
    InternalError { kind: &'static str, message: String },
    Unknown { message: String },
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        Json::into_response(Json(self))
    }
}

impl Error {
    pub fn unknown<S: Into<String>>(msg: S) -> Error {
        Error::Unknown {
            message: msg.into(),
        }
    }
}

impl From<DecodeError> for Error {
    fn from(err: DecodeError) -> Self {
        Self::InvalidQrCode {
            kind: err.kind(),
            message: "Invalid QR code format".to_string(),
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(io: std::io::Error) -> Self {
        Self::InternalError {
            kind: "IOError",
            message: io.to_string(),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::InternalError {
            kind: "SerializationError",
            message: err.to_string(),
        }
    }
}

impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Self::Unknown {
            message: err.to_string(),
        }
    }
}
