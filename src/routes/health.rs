// Copyright 2024 Felipe Torres González
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Module that implements endpoints for health checks.

use actix_web::{web, HttpResponse, Responder};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use tracing::{error, instrument};
use utoipa::ToSchema;

/// Status of a component of the service.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ServerStatus {
    Ok,
    Unreachable,
}

/// Body of the response of the /health endpoint.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    pub status: ServerStatus,
    pub database: ServerStatus,
}

/// Routing table of the maintenance endpoints.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/echo").route(web::get().to(echo)))
        .service(web::resource("/health").route(web::get().to(health_check)));
}

/// GET method for the /echo endpoint (Public).
///
/// # Description
///
/// Liveness check: it answers as long as the server runs.
#[utoipa::path(
    get,
    path = "/echo",
    tag = "Maintenance",
    responses(
        (status = 200, description = "The server is alive", headers(("Cache-Control")))
    )
)]
pub async fn echo() -> impl Responder {
    HttpResponse::Ok()
        // Avoid caching this endpoint.
        .append_header(("Cache-Control", "no-cache"))
        .finish()
}

/// GET method for the /health endpoint (Public).
///
/// # Description
///
/// Readiness check: it verifies that the DB answers queries. A 503 is returned when it doesn't.
#[utoipa::path(
    get,
    path = "/health",
    tag = "Maintenance",
    responses(
        (status = 200, description = "The service is ready", body = HealthResponse),
        (status = 503, description = "The DB is unreachable", body = HealthResponse),
    )
)]
#[instrument(skip(pool))]
pub async fn health_check(pool: web::Data<SqlitePool>) -> impl Responder {
    let database = match sqlx::query("SELECT 1").execute(pool.get_ref()).await {
        Ok(_) => ServerStatus::Ok,
        Err(e) => {
            error!("Health check failed: {e}");
            ServerStatus::Unreachable
        }
    };

    let payload = HealthResponse {
        status: ServerStatus::Ok,
        database,
    };

    let mut response = match database {
        ServerStatus::Ok => HttpResponse::Ok(),
        ServerStatus::Unreachable => HttpResponse::ServiceUnavailable(),
    };

    response
        .append_header(("Cache-Control", "no-cache"))
        .json(payload)
}
