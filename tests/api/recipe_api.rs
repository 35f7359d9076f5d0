// Copyright 2024 Felipe Torres González
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use crate::{
    fixtures::{seed_recipes, RecipeFixture},
    helpers::{forged_token, spawn_app, Credentials, Resource, TestApp},
};
use actix_web::http::StatusCode;
use chrono::TimeDelta;
use pretty_assertions::assert_eq;
use recipe_api::{
    authentication::issue_token,
    domain::{ApiError, DataDomainError},
    routes::recipe::utils::{delete_recipe_from_db, get_owned_recipe, modify_recipe_from_db},
};
use reqwest::Response;
use secrecy::ExposeSecret;
use serde_json::{json, Value};

fn sample_recipe() -> Value {
    json!({
        "title": "Sample recipe",
        "time_minutes": 10,
        "price": "5.00",
        "description": "Sample description",
        "link": "https://example.com/recipe.pdf",
    })
}

async fn create_recipe(app: &TestApp, credentials: &Credentials, body: &Value) -> i64 {
    let response = app.post_test(Resource::Recipes, credentials, body).await;
    assert_eq!(response.status().as_u16(), StatusCode::CREATED);

    let body: Value = response.json().await.expect("Failed to parse the response");
    body["id"].as_i64().expect("The response has no ID")
}

async fn assert_unauthorized(response: Response) {
    assert_eq!(response.status().as_u16(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        response
            .headers()
            .get("WWW-Authenticate")
            .and_then(|h| h.to_str().ok()),
        Some("Token")
    );
    let body: Value = response.json().await.expect("Failed to parse the response");
    assert!(body["detail"].is_string());
}

async fn assert_not_found(response: Response) {
    assert_eq!(response.status().as_u16(), StatusCode::NOT_FOUND);
    let body: Value = response.json().await.expect("Failed to parse the response");
    assert_eq!(body, json!({"detail": "Not found."}));
}

#[actix_web::test]
async fn unauthenticated_requests_are_rejected() {
    let app = spawn_app().await;
    let id = create_recipe(&app, &Credentials::WithCredentials, &sample_recipe()).await;
    let id = id.to_string();
    let no_credentials = Credentials::NoCredentials;

    assert_unauthorized(app.get_test(Resource::Recipes, &no_credentials, None).await).await;
    assert_unauthorized(app.post_test(Resource::Recipes, &no_credentials, &sample_recipe()).await)
        .await;
    assert_unauthorized(app.get_test(Resource::Recipes, &no_credentials, Some(&id)).await).await;
    assert_unauthorized(
        app.put_test(Resource::Recipes, &no_credentials, &id, &sample_recipe())
            .await,
    )
    .await;
    assert_unauthorized(
        app.patch_test(Resource::Recipes, &no_credentials, &id, &json!({"title": "Hacked"}))
            .await,
    )
    .await;
    assert_unauthorized(app.delete_test(Resource::Recipes, &no_credentials, &id).await).await;

    // Nothing was modified by the rejected requests.
    let response = app
        .get_test(Resource::Recipes, &Credentials::WithCredentials, Some(&id))
        .await;
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["title"], "Sample recipe");
    assert_eq!(app.recipe_count().await, 1);
}

#[actix_web::test]
async fn authentication_comes_before_body_parsing() {
    let app = spawn_app().await;

    let response = app
        .post_raw_test(Resource::Recipes, &Credentials::NoCredentials, "{not json")
        .await;
    assert_unauthorized(response).await;

    let response = app
        .post_test(
            Resource::Recipes,
            &Credentials::NoCredentials,
            &json!({"title": "x", "user": 1}),
        )
        .await;
    assert_unauthorized(response).await;
    assert_eq!(app.recipe_count().await, 0);
}

#[actix_web::test]
async fn wrong_tokens_are_rejected() {
    let app = spawn_app().await;
    let token = app.api_token.api_key.expose_secret().to_owned();
    let (client_id, secret) = token.split_once(':').unwrap();
    let last = if secret.ends_with('x') { 'y' } else { 'x' };
    let tampered = format!("Token {client_id}:{}{last}", &secret[..secret.len() - 1]);

    let expired = issue_token(&app.db_pool, app.user_id, TimeDelta::seconds(-1))
        .await
        .expect("Failed to issue an expired token");

    let wrong_credentials = [
        forged_token(),
        Credentials::Header(tampered),
        Credentials::from(&expired),
        Credentials::Header(format!("Basic {token}")),
        Credentials::Header("Token".into()),
        Credentials::Header(format!("Token {client_id}")),
        Credentials::Header(format!("Token {token} extra")),
    ];

    for credentials in wrong_credentials.iter() {
        let response = app.get_test(Resource::Recipes, credentials, None).await;
        assert_unauthorized(response).await;
    }
}

#[actix_web::test]
async fn bearer_keyword_is_accepted() {
    let app = spawn_app().await;
    let credentials = Credentials::Header(format!(
        "Bearer {}",
        app.api_token.api_key.expose_secret()
    ));

    let response = app.get_test(Resource::Recipes, &credentials, None).await;
    assert_eq!(response.status().as_u16(), StatusCode::OK);
}

#[actix_web::test]
async fn create_returns_the_detail_view() {
    let app = spawn_app().await;

    let response = app
        .post_test(Resource::Recipes, &Credentials::WithCredentials, &sample_recipe())
        .await;
    assert_eq!(response.status().as_u16(), StatusCode::CREATED);

    let body: Value = response.json().await.unwrap();
    let id = body["id"].as_i64().expect("The response has no ID");
    assert_eq!(
        body,
        json!({
            "id": id,
            "title": "Sample recipe",
            "time_minutes": 10,
            "price": "5.00",
            "description": "Sample description",
            "link": "https://example.com/recipe.pdf",
        })
    );
    assert_eq!(app.recipe_owner(id).await, app.user_id.value());
}

#[actix_web::test]
async fn create_ignores_the_id_and_unknown_members() {
    let app = spawn_app().await;
    let mut body = sample_recipe();
    body["id"] = json!(999);
    body["rating"] = json!(5);

    let id = create_recipe(&app, &Credentials::WithCredentials, &body).await;
    assert_ne!(id, 999);
}

#[actix_web::test]
async fn create_fills_blank_optional_members() {
    let app = spawn_app().await;

    let response = app
        .post_test(
            Resource::Recipes,
            &Credentials::WithCredentials,
            &json!({"title": "Toast", "time_minutes": 2, "price": 0.5}),
        )
        .await;
    assert_eq!(response.status().as_u16(), StatusCode::CREATED);

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["price"], "0.50");
    assert_eq!(body["description"], "");
    assert_eq!(body["link"], "");
}

#[actix_web::test]
async fn create_with_owner_is_rejected() {
    let app = spawn_app().await;

    for owner in [json!(app.user_id.value()), json!(12345), json!(null)] {
        let mut body = sample_recipe();
        body["user"] = owner;

        let response = app
            .post_test(Resource::Recipes, &Credentials::WithCredentials, &body)
            .await;
        assert_eq!(response.status().as_u16(), StatusCode::BAD_REQUEST);
        let body: Value = response.json().await.unwrap();
        assert_eq!(body, json!({"user": ["You cannot set this field"]}));
    }

    assert_eq!(app.recipe_count().await, 0);
}

#[actix_web::test]
async fn create_with_missing_members_lists_all_of_them() {
    let app = spawn_app().await;

    let response = app
        .post_test(
            Resource::Recipes,
            &Credentials::WithCredentials,
            &json!({"description": "Only a description"}),
        )
        .await;
    assert_eq!(response.status().as_u16(), StatusCode::BAD_REQUEST);

    let body: Value = response.json().await.unwrap();
    for field in ["title", "time_minutes", "price"] {
        assert_eq!(body[field], json!(["This field is required."]), "{field}");
    }
    assert_eq!(app.recipe_count().await, 0);
}

#[actix_web::test]
async fn malformed_bodies_are_rejected() {
    let app = spawn_app().await;

    for raw in ["{not json", "[1, 2, 3]", "\"a string\""] {
        let response = app
            .post_raw_test(Resource::Recipes, &Credentials::WithCredentials, raw)
            .await;
        assert_eq!(response.status().as_u16(), StatusCode::BAD_REQUEST, "{raw}");

        let body: Value = response.json().await.unwrap();
        assert!(body["non_field_errors"].is_array(), "{raw}");
    }
    assert_eq!(app.recipe_count().await, 0);
}

#[actix_web::test]
async fn wrong_members_are_rejected() {
    let app = spawn_app().await;

    let cases = [
        ("price", json!("-1.00")),
        ("price", json!("1.005")),
        ("price", json!("1000.00")),
        ("price", json!("cheap")),
        ("time_minutes", json!(-5)),
        ("time_minutes", json!("soon")),
        ("title", json!("")),
        ("title", json!("x".repeat(256))),
        ("link", json!("not a link")),
        ("link", json!("javascript:alert(1)")),
        ("link", json!("foo:bar")),
    ];

    for (field, value) in cases {
        let mut body = sample_recipe();
        body[field] = value.clone();

        let response = app
            .post_test(Resource::Recipes, &Credentials::WithCredentials, &body)
            .await;
        assert_eq!(response.status().as_u16(), StatusCode::BAD_REQUEST, "{field}: {value}");

        let body: Value = response.json().await.unwrap();
        assert!(body[field].is_array(), "{field}: {value}");
    }
    assert_eq!(app.recipe_count().await, 0);
}

#[actix_web::test]
async fn list_returns_the_newest_first() {
    let app = spawn_app().await;
    let seeded = seed_recipes(&app, &Credentials::WithCredentials).await;

    let response = app
        .get_test(Resource::Recipes, &Credentials::WithCredentials, None)
        .await;
    assert_eq!(response.status().as_u16(), StatusCode::OK);

    let body: Vec<Value> = response.json().await.unwrap();
    let ids: Vec<i64> = body.iter().map(|r| r["id"].as_i64().unwrap()).collect();
    let mut expected: Vec<i64> = seeded.iter().map(|(_, id)| *id).collect();
    expected.reverse();
    assert_eq!(ids, expected);

    // The list view doesn't include the description.
    let (fixture, _) = seeded.last().unwrap();
    assert_eq!(
        body[0],
        json!({
            "id": expected[0],
            "title": fixture.title,
            "time_minutes": fixture.time_minutes,
            "price": fixture.price,
            "link": fixture.link.clone().unwrap_or_default(),
        })
    );
}

#[actix_web::test]
async fn list_only_includes_recipes_of_the_client() {
    let app = spawn_app().await;
    let other = Credentials::from(&app.new_client("other@example.com").await);

    seed_recipes(&app, &Credentials::WithCredentials).await;
    let other_id = create_recipe(&app, &other, &sample_recipe()).await;

    let response = app
        .get_test(Resource::Recipes, &Credentials::WithCredentials, None)
        .await;
    let body: Vec<Value> = response.json().await.unwrap();
    assert_eq!(body.len(), RecipeFixture::load().unwrap().len());
    assert!(body.iter().all(|r| r["id"] != json!(other_id)));

    let response = app.get_test(Resource::Recipes, &other, None).await;
    let body: Vec<Value> = response.json().await.unwrap();
    assert_eq!(body.len(), 1);
    assert_eq!(body[0]["id"], json!(other_id));
}

#[actix_web::test]
async fn list_is_empty_for_new_clients() {
    let app = spawn_app().await;

    let response = app
        .get_test(Resource::Recipes, &Credentials::WithCredentials, None)
        .await;
    assert_eq!(response.status().as_u16(), StatusCode::OK);
    let body: Vec<Value> = response.json().await.unwrap();
    assert!(body.is_empty());
}

#[actix_web::test]
async fn retrieve_returns_the_detail_view() {
    let app = spawn_app().await;
    let id = create_recipe(&app, &Credentials::WithCredentials, &sample_recipe()).await;

    let response = app
        .get_test(Resource::Recipes, &Credentials::WithCredentials, Some(&id.to_string()))
        .await;
    assert_eq!(response.status().as_u16(), StatusCode::OK);

    let body: Value = response.json().await.unwrap();
    let mut expected = sample_recipe();
    expected["id"] = json!(id);
    assert_eq!(body, expected);
}

#[actix_web::test]
async fn missing_and_foreign_recipes_look_the_same() {
    let app = spawn_app().await;
    let other = Credentials::from(&app.new_client("other@example.com").await);
    let foreign_id = create_recipe(&app, &other, &sample_recipe()).await.to_string();

    for id in [foreign_id.as_str(), "999999", "abc", "0", "-1"] {
        let response = app
            .get_test(Resource::Recipes, &Credentials::WithCredentials, Some(id))
            .await;
        assert_not_found(response).await;
    }
}

#[actix_web::test]
async fn foreign_recipes_cannot_be_modified() {
    let app = spawn_app().await;
    let other = Credentials::from(&app.new_client("other@example.com").await);
    let foreign_id = create_recipe(&app, &other, &sample_recipe()).await;
    let id = foreign_id.to_string();

    let response = app
        .put_test(
            Resource::Recipes,
            &Credentials::WithCredentials,
            &id,
            &json!({"title": "Mine now", "time_minutes": 1, "price": "1.00"}),
        )
        .await;
    assert_not_found(response).await;

    let response = app
        .patch_test(
            Resource::Recipes,
            &Credentials::WithCredentials,
            &id,
            &json!({"title": "Mine now"}),
        )
        .await;
    assert_not_found(response).await;

    let response = app
        .delete_test(Resource::Recipes, &Credentials::WithCredentials, &id)
        .await;
    assert_not_found(response).await;

    // The recipe is untouched.
    let response = app.get_test(Resource::Recipes, &other, Some(&id)).await;
    assert_eq!(response.status().as_u16(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["title"], "Sample recipe");
    assert_eq!(app.recipe_count().await, 1);
}

#[actix_web::test]
async fn update_with_owner_is_rejected() {
    let app = spawn_app().await;
    let other_credentials = Credentials::from(&app.new_client("other@example.com").await);
    let id = create_recipe(&app, &Credentials::WithCredentials, &sample_recipe()).await;
    let foreign_id = create_recipe(&app, &other_credentials, &sample_recipe()).await;

    // The guard runs before the lookup, so a foreign recipe gets a 400 too.
    for target in [id, foreign_id] {
        let mut body = sample_recipe();
        body["user"] = json!(12345);

        let response = app
            .put_test(
                Resource::Recipes,
                &Credentials::WithCredentials,
                &target.to_string(),
                &body,
            )
            .await;
        assert_eq!(response.status().as_u16(), StatusCode::BAD_REQUEST);
        let body: Value = response.json().await.unwrap();
        assert_eq!(body, json!({"user": ["You cannot set this field"]}));

        let response = app
            .patch_test(
                Resource::Recipes,
                &Credentials::WithCredentials,
                &target.to_string(),
                &json!({"user": 12345}),
            )
            .await;
        assert_eq!(response.status().as_u16(), StatusCode::BAD_REQUEST);
    }

    assert_eq!(app.recipe_owner(id).await, app.user_id.value());
    assert_ne!(app.recipe_owner(foreign_id).await, app.user_id.value());
}

#[actix_web::test]
async fn full_update_blanks_omitted_optional_members() {
    let app = spawn_app().await;
    let id = create_recipe(&app, &Credentials::WithCredentials, &sample_recipe()).await;

    let response = app
        .put_test(
            Resource::Recipes,
            &Credentials::WithCredentials,
            &id.to_string(),
            &json!({"title": "New title", "time_minutes": 25, "price": "7.25"}),
        )
        .await;
    assert_eq!(response.status().as_u16(), StatusCode::OK);

    let body: Value = response.json().await.unwrap();
    assert_eq!(
        body,
        json!({
            "id": id,
            "title": "New title",
            "time_minutes": 25,
            "price": "7.25",
            "description": "",
            "link": "",
        })
    );
    assert_eq!(app.recipe_owner(id).await, app.user_id.value());
}

#[actix_web::test]
async fn full_update_requires_all_the_mandatory_members() {
    let app = spawn_app().await;
    let id = create_recipe(&app, &Credentials::WithCredentials, &sample_recipe()).await;

    let response = app
        .put_test(
            Resource::Recipes,
            &Credentials::WithCredentials,
            &id.to_string(),
            &json!({"title": "Only the title"}),
        )
        .await;
    assert_eq!(response.status().as_u16(), StatusCode::BAD_REQUEST);

    let body: Value = response.json().await.unwrap();
    assert!(body["time_minutes"].is_array());
    assert!(body["price"].is_array());
    assert!(body.get("title").is_none());

    // The recipe is untouched.
    let response = app
        .get_test(Resource::Recipes, &Credentials::WithCredentials, Some(&id.to_string()))
        .await;
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["title"], "Sample recipe");
}

#[actix_web::test]
async fn partial_update_only_changes_the_given_members() {
    let app = spawn_app().await;
    let id = create_recipe(&app, &Credentials::WithCredentials, &sample_recipe()).await;

    let response = app
        .patch_test(
            Resource::Recipes,
            &Credentials::WithCredentials,
            &id.to_string(),
            &json!({"title": "Patched title"}),
        )
        .await;
    assert_eq!(response.status().as_u16(), StatusCode::OK);

    let body: Value = response.json().await.unwrap();
    let mut expected = sample_recipe();
    expected["id"] = json!(id);
    expected["title"] = json!("Patched title");
    assert_eq!(body, expected);

    // An empty patch is a no-op.
    let response = app
        .patch_test(
            Resource::Recipes,
            &Credentials::WithCredentials,
            &id.to_string(),
            &json!({}),
        )
        .await;
    assert_eq!(response.status().as_u16(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body, expected);
}

#[actix_web::test]
async fn partial_update_can_clear_optional_members() {
    let app = spawn_app().await;
    let id = create_recipe(&app, &Credentials::WithCredentials, &sample_recipe()).await;

    let response = app
        .patch_test(
            Resource::Recipes,
            &Credentials::WithCredentials,
            &id.to_string(),
            &json!({"link": "", "price": 12.5}),
        )
        .await;
    assert_eq!(response.status().as_u16(), StatusCode::OK);

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["link"], "");
    assert_eq!(body["price"], "12.50");
    assert_eq!(body["description"], "Sample description");
}

#[actix_web::test]
async fn delete_is_terminal() {
    let app = spawn_app().await;
    let id = create_recipe(&app, &Credentials::WithCredentials, &sample_recipe()).await;
    let kept = create_recipe(&app, &Credentials::WithCredentials, &sample_recipe()).await;

    let response = app
        .delete_test(Resource::Recipes, &Credentials::WithCredentials, &id.to_string())
        .await;
    assert_eq!(response.status().as_u16(), StatusCode::NO_CONTENT);
    assert!(response.bytes().await.unwrap().is_empty());

    let response = app
        .get_test(Resource::Recipes, &Credentials::WithCredentials, Some(&id.to_string()))
        .await;
    assert_not_found(response).await;

    let response = app
        .delete_test(Resource::Recipes, &Credentials::WithCredentials, &id.to_string())
        .await;
    assert_not_found(response).await;

    let response = app
        .get_test(Resource::Recipes, &Credentials::WithCredentials, None)
        .await;
    let body: Vec<Value> = response.json().await.unwrap();
    assert_eq!(body.len(), 1);
    assert_eq!(body[0]["id"], json!(kept));
}

#[actix_web::test]
async fn writes_on_a_vanished_recipe_report_not_found() {
    let app = spawn_app().await;
    let id = create_recipe(&app, &Credentials::WithCredentials, &sample_recipe())
        .await
        .to_string();

    let recipe = get_owned_recipe(&app.db_pool, app.user_id, &id)
        .await
        .expect("Failed to retrieve the recipe");
    assert!(recipe.update_date().is_none());

    let updated = modify_recipe_from_db(&app.db_pool, &recipe, recipe.draft().clone())
        .await
        .expect("Failed to update the recipe");
    assert!(updated.update_date().is_some());
    let stored = get_owned_recipe(&app.db_pool, app.user_id, &id)
        .await
        .expect("Failed to retrieve the recipe");
    assert_eq!(stored.update_date().is_some(), true);
    assert_eq!(stored.creation_date(), recipe.creation_date());

    // Another request deletes the recipe after the lookup of this one.
    delete_recipe_from_db(&app.db_pool, &recipe)
        .await
        .expect("Failed to delete the recipe");

    let result = modify_recipe_from_db(&app.db_pool, &recipe, recipe.draft().clone()).await;
    assert!(matches!(result, Err(ApiError::Domain(DataDomainError::NotFound))));

    let result = delete_recipe_from_db(&app.db_pool, &recipe).await;
    assert!(matches!(result, Err(ApiError::Domain(DataDomainError::NotFound))));
    assert_eq!(app.recipe_count().await, 0);
}

#[actix_web::test]
async fn preflight_requests_are_answered() {
    let app = spawn_app().await;

    for method in ["GET", "POST", "PUT", "PATCH", "DELETE"] {
        let response = app.options_test(Resource::Recipes, method).await;
        assert_eq!(response.status().as_u16(), StatusCode::OK, "{method}");
        assert!(response
            .headers()
            .get("Access-Control-Allow-Methods")
            .and_then(|h| h.to_str().ok())
            .is_some_and(|h| h.contains(method)));
    }
}
