// Copyright 2024 Felipe Torres González
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Recipe API library.

use domain::{LoginData, NewUser, RecipeDetail, RecipeSummary, UserProfile};
use routes::{
    health::{HealthResponse, ServerStatus},
    user::TokenResponse,
};
use utoipa::{
    openapi::security::{ApiKey, ApiKeyValue, SecurityScheme},
    Modify, OpenApi,
};

pub mod authentication;
pub mod configuration;
pub mod domain;
pub mod startup;
pub mod telemetry;
pub mod routes {
    pub mod health;
    pub mod recipe;
    pub mod user;
}

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_token",
            SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::with_description(
                "Authorization",
                "API token to access restricted endpoints: `Token <token>`.",
            ))),
        )
    }
}

/// Main [OpenApi] `Struct`. See [the official docs](https://docs.rs/utoipa/latest/utoipa/derive.OpenApi.html).
#[derive(OpenApi)]
#[openapi(
    paths(
        routes::recipe::get::list_recipes,
        routes::recipe::get::retrieve_recipe,
        routes::recipe::post::create_recipe,
        routes::recipe::put::update_recipe,
        routes::recipe::patch::partial_update_recipe,
        routes::recipe::delete::delete_recipe,
        routes::user::post::register_user,
        routes::user::token::request_token,
        routes::user::me::get_profile,
        routes::health::echo,
        routes::health::health_check,
    ),
    components(
        schemas(
            RecipeSummary,
            RecipeDetail,
            NewUser,
            LoginData,
            UserProfile,
            TokenResponse,
            HealthResponse,
            ServerStatus,
        )
    ),
    tags(
        (name = "Recipe", description = "Endpoints related to the recipes of the client."),
        (name = "User", description = "Endpoints related to the users of the API."),
        (name = "Maintenance", description = "Endpoints related to server's status.")
    ),
    servers(
        (url = "/api", description = "Default base URL")
    ),
    info(
        title = "Recipe API",
        description = "## A REST API to manage personal recipes.",
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;
