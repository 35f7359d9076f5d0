// Copyright 2025 Felipe Torres González
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! DB access for the `ApiUser` table.

use crate::{
    authentication::compute_secret_hash,
    domain::{ApiError, DataDomainError, FieldErrors, NewUser, ServerError, User, UserId},
};
use chrono::Local;
use secrecy::ExposeSecret;
use sqlx::{FromRow, SqlitePool};
use tracing::{error, info, instrument};

const DUPLICATED_EMAIL_MSG: &str = "user with this email already exists.";

#[derive(FromRow)]
struct UserRow {
    id: i64,
    email: String,
    name: String,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User {
            id: UserId::new(row.id),
            email: row.email,
            name: row.name,
        }
    }
}

/// Register a new user in the DB.
///
/// # Description
///
/// Only the hash of the password is stored. Emails are unique: registering an email twice produces a validation
/// error bound to the `email` field.
#[instrument(skip(pool, user), fields(email = %user.email()))]
pub async fn register_new_user(pool: &SqlitePool, user: &NewUser) -> Result<User, ApiError> {
    let password_hash = compute_secret_hash(user.password())?;

    let result = sqlx::query(
        "INSERT INTO ApiUser (email, name, password_hash, created) VALUES (?, ?, ?, ?)",
    )
    .bind(user.email())
    .bind(user.name())
    .bind(password_hash.expose_secret())
    .bind(Local::now())
    .execute(pool)
    .await;

    match result {
        Ok(result) => {
            let id = UserId::new(result.last_insert_rowid());
            info!("New user registered with id: {id}");
            Ok(User {
                id,
                email: user.email().to_owned(),
                name: user.name().to_owned(),
            })
        }
        Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
            info!("Attempt to register an existing email");
            Err(FieldErrors::single("email", DUPLICATED_EMAIL_MSG).into())
        }
        Err(e) => {
            error!("{e}");
            Err(ServerError::DbError.into())
        }
    }
}

#[instrument(skip(pool))]
pub async fn get_user_from_db(pool: &SqlitePool, id: UserId) -> Result<User, ApiError> {
    let row = sqlx::query_as::<_, UserRow>("SELECT id, email, name FROM ApiUser WHERE id = ?")
        .bind(id.value())
        .fetch_optional(pool)
        .await
        .map_err(|e| {
            error!("{e}");
            ServerError::DbError
        })?;

    row.map(User::from)
        .ok_or_else(|| DataDomainError::NotFound.into())
}
