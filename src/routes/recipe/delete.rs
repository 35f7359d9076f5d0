// Copyright 2025 Felipe Torres González
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use crate::{
    authentication::AuthenticatedUser,
    domain::ApiError,
    routes::recipe::utils::{delete_recipe_from_db, get_owned_recipe},
};
use actix_web::{web, HttpResponse};
use sqlx::SqlitePool;
use tracing::{info, instrument};

/// DELETE method for the /recipes/{id}/ endpoint (Restricted).
#[utoipa::path(
    delete,
    path = "/recipes/{id}/",
    tag = "Recipe",
    params(
        ("id" = i64, Path, description = "ID of the recipe")
    ),
    security(
        ("api_token" = [])
    ),
    responses(
        (status = 204, description = "The recipe was deleted"),
        (status = 401, description = "Missing or invalid API token"),
        (status = 404, description = "The recipe is not available"),
    )
)]
#[instrument(skip(user, pool), fields(user_id = %user.id))]
pub async fn delete_recipe(
    user: AuthenticatedUser,
    path: web::Path<String>,
    pool: web::Data<SqlitePool>,
) -> Result<HttpResponse, ApiError> {
    let recipe = get_owned_recipe(&pool, user.id, &path).await?;

    delete_recipe_from_db(&pool, &recipe).await?;
    info!("Recipe {} deleted", recipe.id());

    Ok(HttpResponse::NoContent().finish())
}
