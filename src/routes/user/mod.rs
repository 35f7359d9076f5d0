// Copyright 2025 Felipe Torres González
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Endpoints of the `/user` resource: registration, token issuing and the profile of the client.

pub mod me;
pub mod post;
pub mod token;
pub mod utils;

pub use me::get_profile;
pub use post::register_user;
pub use token::{request_token, TokenResponse};

use actix_web::web;

/// Routing table of the user endpoints.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/user")
            .service(web::resource("/").route(web::post().to(register_user)))
            .service(web::resource("/token/").route(web::post().to(request_token)))
            .service(web::resource("/me/").route(web::get().to(get_profile))),
    );
}
