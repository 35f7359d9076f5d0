// Copyright 2024 Felipe Torres González
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Utilities for managing access tokens of the API.
//!
//! # Description
//!
//! An API token is composed of two parts joined by a colon: `<client id>:<secret>`. The client ID is public and
//! points to a row of the `ApiToken` table. Only the Argon2 hash of the secret is stored in the DB, hence a token
//! can't be recovered once it was handed to its owner.

use crate::domain::{ApiError, AuthData, ClientId, DataDomainError, ServerError, UserId};
use argon2::{
    password_hash::SaltString,
    {Algorithm, Argon2, Params, PasswordHash, PasswordHasher, PasswordVerifier, Version},
};
use chrono::{DateTime, Local, TimeDelta};
use rand::{distributions::Alphanumeric, thread_rng, Rng};
use secrecy::{ExposeSecret, SecretString};
use sqlx::{Executor, FromRow, SqlitePool};
use tracing::{debug, error, info, instrument};

/// Length of the secret part of a token.
const TOKEN_LENGTH: usize = 25;

#[derive(FromRow)]
struct TokenRow {
    api_token: String,
    valid_until: DateTime<Local>,
    user_id: i64,
}

#[tracing::instrument(
    name = "Validate credentials",
    skip(expected_hash, candidate)
)]
pub fn verify_secret_hash(
    expected_hash: &SecretString,
    candidate: &SecretString,
) -> Result<(), DataDomainError> {
    let expected_hash = PasswordHash::new(expected_hash.expose_secret()).map_err(|e| {
        error!("Couldn't parse the stored hash: {e}");
        DataDomainError::InvalidAccessCredentials
    })?;

    match Argon2::default().verify_password(candidate.expose_secret().as_bytes(), &expected_hash) {
        Ok(_) => Ok(()),
        Err(_) => Err(DataDomainError::InvalidAccessCredentials),
    }
}

/// Generate a token
pub fn generate_token() -> String {
    let mut rng = thread_rng();
    std::iter::repeat_with(|| rng.sample(Alphanumeric))
        .map(char::from)
        .take(TOKEN_LENGTH)
        .collect()
}

/// Compute the PHC string of a secret (a token or a password) using Argon2id.
pub fn compute_secret_hash(secret: &SecretString) -> Result<SecretString, ServerError> {
    let salt = SaltString::generate(&mut thread_rng());
    let params = Params::new(15000, 2, 1, None).map_err(|e| {
        error!("{e}");
        ServerError::HashError
    })?;

    let hash = Argon2::new(Algorithm::Argon2id, Version::V0x13, params)
        .hash_password(secret.expose_secret().as_bytes(), &salt)
        .map_err(|e| {
            error!("{e}");
            ServerError::HashError
        })?
        .to_string();

    Ok(SecretString::from(hash))
}

/// Store the hash of a token in the DB.
#[instrument(skip(pool, token_hash))]
async fn store_token(
    pool: &SqlitePool,
    token_hash: &SecretString,
    expiry: TimeDelta,
    client_id: &ClientId,
    user_id: UserId,
) -> Result<(), ServerError> {
    let now = Local::now();
    let query = sqlx::query(
        r#"
        INSERT INTO ApiToken
        (id, user_id, api_token, created, valid_until)
        VALUES(?, ?, ?, ?, ?);
        "#,
    )
    .bind(client_id.to_string())
    .bind(user_id.value())
    .bind(token_hash.expose_secret())
    .bind(now)
    .bind(now + expiry);

    pool.execute(query).await.map_err(|e| {
        error!("{e}");
        ServerError::DbError
    })?;

    Ok(())
}

/// Issue a new API token for a user.
///
/// # Description
///
/// The returned [AuthData] is the only copy of the plain token. It shall be handed to the client right away.
#[instrument(skip(pool))]
pub async fn issue_token(
    pool: &SqlitePool,
    user_id: UserId,
    expiry: TimeDelta,
) -> Result<AuthData, ServerError> {
    let client_id = ClientId::new();
    let secret = SecretString::from(generate_token());
    let token_hash = compute_secret_hash(&secret)?;

    store_token(pool, &token_hash, expiry, &client_id, user_id).await?;
    info!("New API token ({client_id}) issued for the user {user_id}");

    Ok(AuthData::new(&client_id, &secret))
}

/// Check that a token grants access to the restricted endpoints.
///
/// # Description
///
/// The token must exist, must not be expired, and its secret part must match the stored hash. All the failure
/// cases collapse into [DataDomainError::InvalidAccessCredentials]. On success, the owner of the token is returned.
#[instrument(name = "Check access", skip(pool, token))]
pub async fn check_access(pool: &SqlitePool, token: &AuthData) -> Result<UserId, ApiError> {
    let (client_id, secret) = token.split()?;

    let row = sqlx::query_as::<_, TokenRow>(
        "SELECT api_token, valid_until, user_id FROM ApiToken WHERE id = ?",
    )
    .bind(client_id.to_string())
    .fetch_optional(pool)
    .await
    .map_err(|e| {
        error!("{e}");
        ServerError::DbError
    })?;

    let row = match row {
        Some(row) => row,
        None => {
            debug!("The token ID {client_id} is not registered");
            return Err(DataDomainError::InvalidAccessCredentials.into());
        }
    };

    if row.valid_until < Local::now() {
        info!("The token {client_id} expired at {}", row.valid_until);
        return Err(DataDomainError::InvalidAccessCredentials.into());
    }

    verify_secret_hash(&SecretString::from(row.api_token), &secret)?;

    Ok(UserId::new(row.user_id))
}

/// Delete the tokens whose validity expired.
#[instrument(skip(pool))]
pub async fn delete_expired_tokens(pool: &SqlitePool) -> Result<u64, ServerError> {
    let result = sqlx::query("DELETE FROM ApiToken WHERE valid_until < ?")
        .bind(Local::now())
        .execute(pool)
        .await
        .map_err(|e| {
            error!("{e}");
            ServerError::DbError
        })?;

    Ok(result.rows_affected())
}
