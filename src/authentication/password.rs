// Copyright 2025 Felipe Torres González
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Password based authentication, used to obtain API tokens.

use crate::{
    authentication::{compute_secret_hash, generate_token, verify_secret_hash},
    domain::{error::NON_FIELD_ERRORS, normalize_email, ApiError, FieldErrors, LoginData, ServerError, UserId},
};
use once_cell::sync::Lazy;
use secrecy::SecretString;
use sqlx::SqlitePool;
use tracing::{error, info, instrument};

const WRONG_CREDENTIALS_MSG: &str = "Unable to authenticate with provided credentials.";

/// Hash checked against the given password when the email is unknown, so both failures cost the same.
static DUMMY_PASSWORD_HASH: Lazy<Option<SecretString>> =
    Lazy::new(|| compute_secret_hash(&SecretString::from(generate_token())).ok());

/// Check the email and password of a user.
///
/// # Description
///
/// An unknown email and a wrong password produce the same validation error, so the response doesn't tell whether
/// an email is registered.
#[instrument(name = "Validate user credentials", skip(pool, credentials), fields(email = %credentials.email))]
pub async fn validate_credentials(
    pool: &SqlitePool,
    credentials: &LoginData,
) -> Result<UserId, ApiError> {
    let row: Option<(i64, String)> =
        sqlx::query_as("SELECT id, password_hash FROM ApiUser WHERE email = ?")
            .bind(normalize_email(&credentials.email))
            .fetch_optional(pool)
            .await
            .map_err(|e| {
                error!("{e}");
                ServerError::DbError
            })?;

    let wrong_credentials = || FieldErrors::single(NON_FIELD_ERRORS, WRONG_CREDENTIALS_MSG);

    let (id, password_hash) = match row {
        Some(row) => row,
        None => {
            info!("Login attempt for an unknown email");
            if let Some(hash) = DUMMY_PASSWORD_HASH.as_ref() {
                let _ = verify_secret_hash(hash, &credentials.password);
            }
            return Err(wrong_credentials().into());
        }
    };

    match verify_secret_hash(&SecretString::from(password_hash), &credentials.password) {
        Ok(_) => Ok(UserId::new(id)),
        Err(_) => {
            info!("Login attempt with a wrong password");
            Err(wrong_credentials().into())
        }
    }
}
