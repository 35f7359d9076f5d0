// Copyright 2024 Felipe Torres González
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use crate::{
    authentication::{issue_token, validate_credentials},
    configuration::TokenSettings,
    domain::{ApiError, LoginData},
};
use actix_web::{web, HttpResponse};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use tracing::{info, instrument};
use utoipa::ToSchema;

/// Body of the response of the /user/token/ endpoint.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TokenResponse {
    /// Value for the `Authorization: Token <token>` header.
    #[schema(example = "0a1b2c3d:Xf3kP9qLm2ZtR8vBn4WcYs7Hd")]
    pub token: String,
}

/// POST method for the /user/token/ endpoint (Public).
///
/// # Description
///
/// Exchanges the email and password of a user for a new API token. The token is only shown in this response, so
/// clients must keep it safe. Wrong credentials produce a 400 that doesn't tell which member was wrong.
#[utoipa::path(
    post,
    path = "/user/token/",
    tag = "User",
    request_body(content = LoginData, content_type = "application/json"),
    responses(
        (status = 200, description = "A new API token", body = TokenResponse),
        (status = 400, description = "Wrong credentials"),
    )
)]
#[instrument(skip(req, pool, token_settings), fields(email = %req.email))]
pub async fn request_token(
    req: web::Json<LoginData>,
    pool: web::Data<SqlitePool>,
    token_settings: web::Data<TokenSettings>,
) -> Result<HttpResponse, ApiError> {
    let user_id = validate_credentials(&pool, &req).await?;
    let token = issue_token(&pool, user_id, token_settings.expiry()).await?;
    info!("API token issued for the user {user_id}");

    Ok(HttpResponse::Ok().json(TokenResponse {
        token: token.api_key.expose_secret().to_owned(),
    }))
}
