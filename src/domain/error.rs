// Copyright 2024 Felipe Torres González
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types of the Recipe API.
//!
//! # Description
//!
//! Errors are split in two families:
//! - [DataDomainError]: something is wrong with the data the client sent (or with the client itself). These
//!   errors are reported back to the client with a 4xx status code and a message that explains the problem.
//! - [ServerError]: something went wrong in the backend. The cause is logged, and the client only gets a generic
//!   500 response.
//!
//! Handlers return [ApiError], which wraps both families and knows how to render itself as an HTTP response.

use actix_web::{
    http::{header, StatusCode},
    HttpResponse, ResponseError,
};
use serde::Serialize;
use serde_json::json;
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;
use validator::ValidationErrors;

/// Key used for errors that don't belong to any particular field.
pub const NON_FIELD_ERRORS: &str = "non_field_errors";

/// Field-scoped validation messages.
///
/// # Description
///
/// Serialises as a JSON object whose keys are the offending fields and whose values are the list of messages
/// for that field, i.e. `{"title": ["This field is required."]}`. Keys are kept sorted so responses are stable.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a [FieldErrors] with a single message.
    pub fn single(field: &str, message: &str) -> Self {
        let mut errors = Self::new();
        errors.add(field, message);
        errors
    }

    pub fn add(&mut self, field: &str, message: &str) {
        self.0
            .entry(field.to_owned())
            .or_default()
            .push(message.to_owned());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn messages(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Return `Ok(())` when no errors were collected, an [DataDomainError::InvalidFields] otherwise.
    pub fn into_result(self) -> Result<(), DataDomainError> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(DataDomainError::InvalidFields(self))
        }
    }
}

impl From<ValidationErrors> for FieldErrors {
    fn from(value: ValidationErrors) -> Self {
        let mut errors = FieldErrors::new();

        for (field, field_errors) in value.field_errors() {
            for error in field_errors {
                match &error.message {
                    Some(message) => errors.add(field, message),
                    None => errors.add(field, &format!("Invalid value ({}).", error.code)),
                }
            }
        }

        errors
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let fields: Vec<&str> = self.fields().collect();
        write!(f, "{}", fields.join(", "))
    }
}

/// Errors caused by the data or the credentials that a client sent.
#[derive(Debug, Error)]
pub enum DataDomainError {
    #[error("Invalid ID")]
    InvalidId,
    #[error("Authentication credentials were not provided.")]
    MissingCredentials,
    #[error("Invalid token.")]
    InvalidAccessCredentials,
    #[error("Not found.")]
    NotFound,
    #[error("Invalid data in fields: {0}")]
    InvalidFields(FieldErrors),
}

/// Errors caused by the backend.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Error found while accessing the DB")]
    DbError,
    #[error("Error found while hashing a secret")]
    HashError,
}

/// Error type returned by the HTTP handlers.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Domain(#[from] DataDomainError),
    #[error(transparent)]
    Server(#[from] ServerError),
}

impl From<FieldErrors> for ApiError {
    fn from(value: FieldErrors) -> Self {
        ApiError::Domain(DataDomainError::InvalidFields(value))
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Domain(e) => match e {
                DataDomainError::MissingCredentials | DataDomainError::InvalidAccessCredentials => {
                    StatusCode::UNAUTHORIZED
                }
                DataDomainError::InvalidId | DataDomainError::NotFound => StatusCode::NOT_FOUND,
                DataDomainError::InvalidFields(_) => StatusCode::BAD_REQUEST,
            },
            ApiError::Server(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let mut builder = HttpResponse::build(self.status_code());

        match self {
            ApiError::Domain(DataDomainError::InvalidFields(errors)) => builder.json(errors),
            ApiError::Domain(DataDomainError::InvalidId) => {
                builder.json(json!({"detail": DataDomainError::NotFound.to_string()}))
            }
            ApiError::Domain(
                e @ (DataDomainError::MissingCredentials | DataDomainError::InvalidAccessCredentials),
            ) => builder
                .insert_header((header::WWW_AUTHENTICATE, "Token"))
                .json(json!({"detail": e.to_string()})),
            ApiError::Domain(e) => builder.json(json!({"detail": e.to_string()})),
            // Never leak what went wrong in the backend.
            ApiError::Server(_) => builder.json(json!({"detail": "Internal server error."})),
        }
    }
}
