// Copyright 2025 Felipe Torres González
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Endpoints of the `/recipes` resource.
//!
//! # Description
//!
//! All the endpoints are restricted: clients must include a valid API token in the request's headers. The
//! collection endpoint lists and creates recipes of the caller, and the record endpoint works with a single recipe
//! of the caller.

pub mod delete;
pub mod get;
pub mod patch;
pub mod post;
pub mod put;
pub mod utils;

pub use delete::delete_recipe;
pub use get::{list_recipes, retrieve_recipe};
pub use patch::partial_update_recipe;
pub use post::create_recipe;
pub use put::update_recipe;

use actix_web::web;

/// Routing table of the recipe endpoints.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/recipes")
            .service(
                web::resource("/")
                    .route(web::get().to(list_recipes))
                    .route(web::post().to(create_recipe)),
            )
            .service(
                web::resource("/{id}/")
                    .route(web::get().to(retrieve_recipe))
                    .route(web::put().to(update_recipe))
                    .route(web::patch().to(partial_update_recipe))
                    .route(web::delete().to(delete_recipe)),
            ),
    );
}
