// Copyright 2025 Felipe Torres González
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use crate::{
    authentication::AuthenticatedUser,
    domain::{ApiError, RecipeDetail, RecipeSummary},
    routes::recipe::utils::{get_owned_recipe, get_recipes_for_owner},
};
use actix_web::{web, HttpResponse};
use sqlx::SqlitePool;
use tracing::{info, instrument};

/// GET method for the /recipes/ endpoint (Restricted).
///
/// # Description
///
/// Lists all the recipes owned by the client, the most recently created first. Recipes from other users are never
/// included. The list view doesn't include the description of the recipes.
#[utoipa::path(
    get,
    path = "/recipes/",
    tag = "Recipe",
    security(
        ("api_token" = [])
    ),
    responses(
        (
            status = 200,
            description = "The recipes of the client",
            body = [RecipeSummary],
        ),
        (status = 401, description = "Missing or invalid API token"),
    )
)]
#[instrument(skip(user, pool), fields(user_id = %user.id))]
pub async fn list_recipes(
    user: AuthenticatedUser,
    pool: web::Data<SqlitePool>,
) -> Result<HttpResponse, ApiError> {
    let recipes = get_recipes_for_owner(&pool, user.id).await?;
    info!("Listing {} recipes", recipes.len());

    let payload: Vec<RecipeSummary> = recipes.iter().map(RecipeSummary::from).collect();

    Ok(HttpResponse::Ok().json(payload))
}

/// GET method for the /recipes/{id}/ endpoint (Restricted).
///
/// # Description
///
/// Retrieves the detail view of a recipe. A recipe that doesn't exist and a recipe owned by another user produce
/// the same response.
#[utoipa::path(
    get,
    path = "/recipes/{id}/",
    tag = "Recipe",
    params(
        ("id" = i64, Path, description = "ID of the recipe")
    ),
    security(
        ("api_token" = [])
    ),
    responses(
        (status = 200, description = "The requested recipe", body = RecipeDetail),
        (status = 401, description = "Missing or invalid API token"),
        (status = 404, description = "The recipe is not available"),
    )
)]
#[instrument(skip(user, pool), fields(user_id = %user.id))]
pub async fn retrieve_recipe(
    user: AuthenticatedUser,
    path: web::Path<String>,
    pool: web::Data<SqlitePool>,
) -> Result<HttpResponse, ApiError> {
    let recipe = get_owned_recipe(&pool, user.id, &path).await?;

    Ok(HttpResponse::Ok().json(RecipeDetail::from(&recipe)))
}
