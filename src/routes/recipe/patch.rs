// Copyright 2025 Felipe Torres González
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use crate::{
    authentication::AuthenticatedUser,
    domain::{ApiError, RecipeChanges, RecipeDetail},
    routes::recipe::utils::{get_owned_recipe, modify_recipe_from_db},
};
use actix_web::{web, HttpResponse};
use sqlx::SqlitePool;
use tracing::{info, instrument};

/// PATCH method for the /recipes/{id}/ endpoint (Restricted).
///
/// # Description
///
/// Modifies only the members of a recipe included in the request. An empty object leaves the recipe untouched.
#[utoipa::path(
    patch,
    path = "/recipes/{id}/",
    tag = "Recipe",
    params(
        ("id" = i64, Path, description = "ID of the recipe")
    ),
    request_body(
        content = RecipeDetail,
        description = "Members of the recipe to modify.",
        content_type = "application/json",
    ),
    security(
        ("api_token" = [])
    ),
    responses(
        (status = 200, description = "The recipe was updated", body = RecipeDetail),
        (status = 400, description = "Wrong data in the request's body"),
        (status = 401, description = "Missing or invalid API token"),
        (status = 404, description = "The recipe is not available"),
    )
)]
#[instrument(skip(user, body, pool), fields(user_id = %user.id))]
pub async fn partial_update_recipe(
    user: AuthenticatedUser,
    path: web::Path<String>,
    body: web::Bytes,
    pool: web::Data<SqlitePool>,
) -> Result<HttpResponse, ApiError> {
    let changes = RecipeChanges::parse(&body)?;
    let recipe = get_owned_recipe(&pool, user.id, &path).await?;

    let draft = changes.merge_into(recipe.draft())?;
    let recipe = modify_recipe_from_db(&pool, &recipe, draft).await?;
    info!("Recipe {} modified", recipe.id());

    Ok(HttpResponse::Ok().json(RecipeDetail::from(&recipe)))
}
