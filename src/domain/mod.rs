// Copyright 2024 Felipe Torres González
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Domain objects of the Recipe API.

pub mod auth;
pub mod error;
mod price;
mod recipe;
mod user;

pub use auth::{AuthData, ClientId};
pub use error::{ApiError, DataDomainError, FieldErrors, ServerError};
pub use price::Price;
pub use recipe::{
    reject_immutable_fields, Recipe, RecipeChanges, RecipeDetail, RecipeDraft, RecipeId,
    RecipeSummary, OWNER_FIELD,
};
pub use user::{normalize_email, LoginData, NewUser, User, UserId, UserProfile};

/// Length of the public part of an API token.
pub const ID_LENGTH: usize = 8;
