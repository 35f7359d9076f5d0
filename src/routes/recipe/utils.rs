// Copyright 2024 Felipe Torres González
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! DB access for the `Recipe` table.
//!
//! # Description
//!
//! Every query of this module is scoped by the owner of the recipes: a client can't read or modify a recipe that
//! belongs to somebody else, and it can't tell whether such recipe exists either. Handlers that work with a single
//! recipe shall go through [get_owned_recipe].

use crate::domain::{
    ApiError, DataDomainError, Price, Recipe, RecipeDraft, RecipeId, ServerError, UserId,
};
use chrono::{DateTime, Local};
use sqlx::{FromRow, SqlitePool};
use std::str::FromStr;
use tracing::{debug, error, info, instrument};

const RECIPE_COLUMNS: &str =
    "id, user_id, title, time_minutes, price, description, link, creation_date, update_date";

#[derive(FromRow)]
struct RecipeRow {
    id: i64,
    user_id: i64,
    title: String,
    time_minutes: i64,
    price: String,
    description: Option<String>,
    link: Option<String>,
    creation_date: DateTime<Local>,
    update_date: Option<DateTime<Local>>,
}

impl TryFrom<RecipeRow> for Recipe {
    type Error = ServerError;

    fn try_from(row: RecipeRow) -> Result<Self, Self::Error> {
        let price = Price::from_str(&row.price).map_err(|e| {
            error!("Wrong price ({}) stored for the recipe {}: {e}", row.price, row.id);
            ServerError::DbError
        })?;

        Ok(Recipe::new(
            RecipeId::new(row.id),
            UserId::new(row.user_id),
            RecipeDraft {
                title: row.title,
                time_minutes: row.time_minutes,
                price,
                description: row.description,
                link: row.link,
            },
            row.creation_date,
            row.update_date,
        ))
    }
}

#[instrument(skip(pool, draft))]
pub async fn register_new_recipe(
    pool: &SqlitePool,
    owner: UserId,
    draft: &RecipeDraft,
) -> Result<Recipe, ServerError> {
    let creation_date = Local::now();

    let result = sqlx::query(
        r#"INSERT INTO Recipe (user_id, title, time_minutes, price, description, link, creation_date)
        VALUES (?, ?, ?, ?, ?, ?, ?)"#,
    )
    .bind(owner.value())
    .bind(&draft.title)
    .bind(draft.time_minutes)
    .bind(draft.price.to_string())
    .bind(draft.description.as_deref())
    .bind(draft.link.as_deref())
    .bind(creation_date)
    .execute(pool)
    .await
    .map_err(|e| {
        error!("{e}");
        ServerError::DbError
    })?;

    let id = RecipeId::new(result.last_insert_rowid());
    info!("New recipe registered with id: {id}");

    Ok(Recipe::new(id, owner, draft.clone(), creation_date, None))
}

/// Retrieve all the recipes of a user, the most recent first.
#[instrument(skip(pool))]
pub async fn get_recipes_for_owner(
    pool: &SqlitePool,
    owner: UserId,
) -> Result<Vec<Recipe>, ServerError> {
    let rows = sqlx::query_as::<_, RecipeRow>(&format!(
        "SELECT {RECIPE_COLUMNS} FROM Recipe WHERE user_id = ? ORDER BY id DESC"
    ))
    .bind(owner.value())
    .fetch_all(pool)
    .await
    .map_err(|e| {
        error!("{e}");
        ServerError::DbError
    })?;

    debug!("{} recipes found", rows.len());

    rows.into_iter().map(Recipe::try_from).collect()
}

/// Retrieve a recipe that belongs to the given owner.
///
/// # Description
///
/// The ID comes straight from the request's path. A malformed ID, an ID that doesn't exist and an ID of a recipe
/// owned by another user all produce the very same [DataDomainError::NotFound].
#[instrument(skip(pool))]
pub async fn get_owned_recipe(
    pool: &SqlitePool,
    owner: UserId,
    raw_id: &str,
) -> Result<Recipe, ApiError> {
    let id = RecipeId::from_str(raw_id).map_err(|_| DataDomainError::NotFound)?;

    let row = sqlx::query_as::<_, RecipeRow>(&format!(
        "SELECT {RECIPE_COLUMNS} FROM Recipe WHERE id = ? AND user_id = ?"
    ))
    .bind(id.value())
    .bind(owner.value())
    .fetch_optional(pool)
    .await
    .map_err(|e| {
        error!("{e}");
        ServerError::DbError
    })?;

    match row {
        Some(row) => Ok(Recipe::try_from(row)?),
        None => {
            debug!("The recipe {id} is not available for the user {owner}");
            Err(DataDomainError::NotFound.into())
        }
    }
}

/// Overwrite the writable members of a recipe.
///
/// # Description
///
/// The recipe might have been deleted since it was retrieved. In that case nothing gets written and
/// [DataDomainError::NotFound] is returned.
#[instrument(skip(pool, recipe, draft), fields(recipe_id = %recipe.id()))]
pub async fn modify_recipe_from_db(
    pool: &SqlitePool,
    recipe: &Recipe,
    draft: RecipeDraft,
) -> Result<Recipe, ApiError> {
    let update_date = Local::now();

    let result = sqlx::query(
        r#"UPDATE Recipe
        SET title = ?, time_minutes = ?, price = ?, description = ?, link = ?, update_date = ?
        WHERE id = ? AND user_id = ?"#,
    )
    .bind(&draft.title)
    .bind(draft.time_minutes)
    .bind(draft.price.to_string())
    .bind(draft.description.as_deref())
    .bind(draft.link.as_deref())
    .bind(update_date)
    .bind(recipe.id().value())
    .bind(recipe.owner().value())
    .execute(pool)
    .await
    .map_err(|e| {
        error!("{e}");
        ServerError::DbError
    })?;

    if result.rows_affected() == 0 {
        debug!("The recipe {} vanished before the update", recipe.id());
        return Err(DataDomainError::NotFound.into());
    }

    Ok(Recipe::new(
        recipe.id(),
        recipe.owner(),
        draft,
        recipe.creation_date(),
        Some(update_date),
    ))
}

#[instrument(skip(pool, recipe), fields(recipe_id = %recipe.id()))]
pub async fn delete_recipe_from_db(pool: &SqlitePool, recipe: &Recipe) -> Result<(), ApiError> {
    let result = sqlx::query("DELETE FROM Recipe WHERE id = ? AND user_id = ?")
        .bind(recipe.id().value())
        .bind(recipe.owner().value())
        .execute(pool)
        .await
        .map_err(|e| {
            error!("{e}");
            ServerError::DbError
        })?;

    if result.rows_affected() == 0 {
        debug!("The recipe {} was already deleted", recipe.id());
        return Err(DataDomainError::NotFound.into());
    }

    Ok(())
}
