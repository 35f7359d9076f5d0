// Copyright 2025 Felipe Torres González
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use crate::{
    domain::{ApiError, NewUser, UserProfile},
    routes::user::utils::register_new_user,
};
use actix_web::{web, HttpResponse};
use sqlx::SqlitePool;
use tracing::instrument;

/// POST method for the /user/ endpoint (Public).
///
/// # Description
///
/// Registers a new user. The password is never returned nor stored in plain text.
#[utoipa::path(
    post,
    path = "/user/",
    tag = "User",
    request_body(content = NewUser, content_type = "application/json"),
    responses(
        (status = 201, description = "The user was registered", body = UserProfile),
        (status = 400, description = "Wrong data in the request's body"),
    )
)]
#[instrument(skip(req, pool))]
pub async fn register_user(
    req: web::Json<NewUser>,
    pool: web::Data<SqlitePool>,
) -> Result<HttpResponse, ApiError> {
    let new_user = req.into_inner().checked()?;
    let user = register_new_user(&pool, &new_user).await?;

    Ok(HttpResponse::Created().json(UserProfile::from(&user)))
}
