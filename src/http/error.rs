// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! HTTP error mapping.
//!
//! | Error               | Status |
//! |---------------------|--------|
//! | `InvalidIdentifier` | 400    |
//! | `NotFound`          | 404    |
//! | `Unprocessable`     | 422    |
//! | `Store`             | 500    |
//!
//! Bodies are `{"detail": "<message>"}`. Degraded fallback responses never
//! come through here; they are 200s.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::labs::LabError;
use crate::storage::traits::StorageError;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    InvalidIdentifier(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Unprocessable(String),
    #[error("{0}")]
    Store(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::InvalidIdentifier(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Unprocessable(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<StorageError> for ApiError {
    fn from(e: StorageError) -> Self {
        match e {
            StorageError::NotFound => Self::NotFound("item not found".into()),
            other => Self::Store(other.to_string()),
        }
    }
}

impl From<LabError> for ApiError {
    fn from(e: LabError) -> Self {
        match e {
            LabError::InvalidId(invalid) => Self::InvalidIdentifier(invalid.to_string()),
            LabError::NotFound(what) => Self::NotFound(what.to_string()),
            LabError::Storage(inner) => Self::Store(inner.to_string()),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::Unprocessable(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(error = %self, "Request failed");
        }
        (status, Json(json!({ "detail": self.to_string() }))).into_response()
    }
}
