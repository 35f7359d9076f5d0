// Copyright 2025 Felipe Torres González
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use crate::{
    authentication::AuthenticatedUser,
    domain::{ApiError, UserProfile},
    routes::user::utils::get_user_from_db,
};
use actix_web::{web, HttpResponse};
use sqlx::SqlitePool;
use tracing::instrument;

/// GET method for the /user/me/ endpoint (Restricted).
#[utoipa::path(
    get,
    path = "/user/me/",
    tag = "User",
    security(
        ("api_token" = [])
    ),
    responses(
        (status = 200, description = "Profile of the client", body = UserProfile),
        (status = 401, description = "Missing or invalid API token"),
    )
)]
#[instrument(skip(user, pool), fields(user_id = %user.id))]
pub async fn get_profile(
    user: AuthenticatedUser,
    pool: web::Data<SqlitePool>,
) -> Result<HttpResponse, ApiError> {
    let user = get_user_from_db(&pool, user.id).await?;

    Ok(HttpResponse::Ok().json(UserProfile::from(&user)))
}
