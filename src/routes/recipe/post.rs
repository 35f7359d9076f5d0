// Copyright 2025 Felipe Torres González
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use crate::{
    authentication::AuthenticatedUser,
    domain::{ApiError, RecipeChanges, RecipeDetail},
    routes::recipe::utils::register_new_recipe,
};
use actix_web::{web, HttpResponse};
use sqlx::SqlitePool;
use tracing::{info, instrument};

/// POST method for the /recipes/ endpoint (Restricted).
///
/// # Description
///
/// Registers a new recipe owned by the client. `title`, `time_minutes` and `price` are mandatory. The owner is
/// always the client: requests that include a `user` field are rejected.
#[utoipa::path(
    post,
    path = "/recipes/",
    tag = "Recipe",
    request_body(
        content = RecipeDetail,
        description = "Members of the new recipe. The `id` is ignored.",
        content_type = "application/json",
    ),
    security(
        ("api_token" = [])
    ),
    responses(
        (status = 201, description = "The recipe was registered", body = RecipeDetail),
        (status = 400, description = "Wrong data in the request's body"),
        (status = 401, description = "Missing or invalid API token"),
    )
)]
#[instrument(skip(user, body, pool), fields(user_id = %user.id))]
pub async fn create_recipe(
    user: AuthenticatedUser,
    body: web::Bytes,
    pool: web::Data<SqlitePool>,
) -> Result<HttpResponse, ApiError> {
    let draft = RecipeChanges::parse(&body)?.into_draft()?;

    let recipe = register_new_recipe(&pool, user.id, &draft).await?;
    info!("Recipe {} created", recipe.id());

    Ok(HttpResponse::Created().json(RecipeDetail::from(&recipe)))
}
