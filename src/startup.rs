// Copyright 2024 Felipe Torres González
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Module that includes helper functions to start the **Recipe API** application.

use crate::{
    authentication::delete_expired_tokens,
    configuration::{DataBaseSettings, Settings, TokenSettings},
    domain::{error::NON_FIELD_ERRORS, ApiError, FieldErrors},
    routes, ApiDoc,
};
use actix_cors::Cors;
use actix_web::{
    dev::Server,
    http::header::{AUTHORIZATION, CONTENT_TYPE},
    web, App, HttpServer,
};
use anyhow::Context;
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use std::net::TcpListener;
use tracing::{debug, info};
use tracing_actix_web::TracingLogger;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub struct Application {
    port: u16,
    server: Server,
}

impl Application {
    pub async fn build(configuration: Settings) -> Result<Self, anyhow::Error> {
        // Create a connection pool to handle connections to the DB.
        let connection_pool = get_connection_pool(&configuration.database)
            .await
            .context("Failed to open the SQLite database")?;

        sqlx::migrate!("./migrations")
            .run(&connection_pool)
            .await
            .context("Failed to apply the DB migrations")?;

        let purged = delete_expired_tokens(&connection_pool).await?;
        debug!("{purged} expired API tokens deleted");

        let address = format!(
            "{}:{}",
            configuration.application.host, configuration.application.port
        );
        let listener = TcpListener::bind(address)?;
        let port = listener.local_addr()?.port();
        info!("Listening on port {port}");

        let server = run(
            listener,
            connection_pool,
            configuration.application.base_url,
            configuration.token,
        )?;

        Ok(Self { port, server })
    }

    /// Port the server is bound to. Useful when the settings ask for a random port (0).
    pub fn port(&self) -> u16 {
        self.port
    }

    pub async fn run_until_stopped(self) -> Result<(), std::io::Error> {
        self.server.await
    }
}

pub fn run(
    listener: TcpListener,
    db_pool: SqlitePool,
    base_url: String,
    token_settings: TokenSettings,
) -> Result<Server, anyhow::Error> {
    let db_pool = web::Data::new(db_pool);
    let token_settings = web::Data::new(token_settings);

    let server = HttpServer::new(move || {
        App::new()
            .wrap(cors_policy())
            .wrap(TracingLogger::default())
            .app_data(json_config())
            .app_data(db_pool.clone())
            .app_data(token_settings.clone())
            .service(
                SwaggerUi::new("/docs/{_:.*}").url("/api-docs/openapi.json", ApiDoc::openapi()),
            )
            .service(
                web::scope(&base_url)
                    .configure(routes::health::configure)
                    .configure(routes::recipe::configure)
                    .configure(routes::user::configure),
            )
    })
    .listen(listener)?
    .run();

    Ok(server)
}

pub async fn get_connection_pool(
    configuration: &DataBaseSettings,
) -> Result<SqlitePool, sqlx::Error> {
    SqlitePoolOptions::new()
        .max_connections(configuration.max_connections as u32)
        .idle_timeout(configuration.idle_timeout())
        .connect_with(configuration.build_db_conn())
        .await
}

fn cors_policy() -> Cors {
    Cors::default()
        .allow_any_origin()
        .allowed_methods(vec!["GET", "POST", "PUT", "PATCH", "DELETE"])
        .allowed_headers(vec![AUTHORIZATION, CONTENT_TYPE])
        .max_age(3600)
}

/// Malformed JSON bodies are reported the same way as any other validation error.
fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| {
        ApiError::from(FieldErrors::single(NON_FIELD_ERRORS, &err.to_string())).into()
    })
}
