// Copyright 2025 Felipe Torres González
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Extractor that resolves the client behind a request.
//!
//! # Description
//!
//! Restricted endpoints take an [AuthenticatedUser] as their first argument. The extractor reads the
//! `Authorization` header, checks the token against the DB, and rejects the request with a 401 before the handler
//! runs when the credentials are missing or wrong.
//!
//! Accepted header formats:
//! - `Authorization: Token <client id>:<secret>`
//! - `Authorization: Bearer <client id>:<secret>`

use crate::{
    authentication::check_access,
    domain::{ApiError, AuthData, DataDomainError, ServerError, UserId},
};
use actix_web::{
    dev::Payload,
    http::header::{HeaderMap, AUTHORIZATION},
    web::Data,
    FromRequest, HttpRequest,
};
use futures_util::future::LocalBoxFuture;
use secrecy::SecretString;
use sqlx::SqlitePool;
use tracing::{debug, error};

const AUTH_KEYWORDS: [&str; 2] = ["token", "bearer"];

/// The client that issued the request.
#[derive(Clone, Copy, Debug)]
pub struct AuthenticatedUser {
    pub id: UserId,
}

impl FromRequest for AuthenticatedUser {
    type Error = ApiError;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let pool = req.app_data::<Data<SqlitePool>>().cloned();
        let token = token_from_headers(req.headers());

        Box::pin(async move {
            let token = token?;
            let pool = pool.ok_or_else(|| {
                error!("The DB pool is not registered in the application");
                ServerError::DbError
            })?;

            let id = check_access(&pool, &token).await?;
            debug!("Access granted to the user {id}");

            Ok(AuthenticatedUser { id })
        })
    }
}

/// Extract the API token from the `Authorization` header.
pub fn token_from_headers(headers: &HeaderMap) -> Result<AuthData, DataDomainError> {
    let header = headers
        .get(AUTHORIZATION)
        .ok_or(DataDomainError::MissingCredentials)?
        .to_str()
        .map_err(|_| DataDomainError::InvalidAccessCredentials)?;

    let mut parts = header.split_whitespace();
    let keyword = parts.next().unwrap_or_default().to_ascii_lowercase();

    if !AUTH_KEYWORDS.contains(&keyword.as_str()) {
        return Err(DataDomainError::MissingCredentials);
    }

    match (parts.next(), parts.next()) {
        (Some(token), None) => Ok(AuthData {
            api_key: SecretString::from(token),
        }),
        _ => Err(DataDomainError::InvalidAccessCredentials),
    }
}
