// Copyright 2024 Felipe Torres González
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Data objects related to Recipes.
//!
//! # Description
//!
//! This module includes the definition of the object [Recipe] which is a representation of a recipe entry in the
//! `Recipe` DB table. Recipes are never sent to clients as they are: the owner of a recipe is an internal detail.
//! Use [RecipeSummary] (list view) or [RecipeDetail] (detail view) to serialise a recipe.
//!
//! Data coming from clients is parsed into a [RecipeChanges] object. A set of changes can be turned into a complete
//! [RecipeDraft] (creation and full updates) or merged on top of an existing recipe (partial updates). Drafts are
//! validated before they reach the DB.

use crate::domain::{error::NON_FIELD_ERRORS, DataDomainError, FieldErrors, Price, UserId};
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::{borrow::Cow, fmt, str::FromStr};
use utoipa::ToSchema;
use validator::{validate_url, Validate, ValidationError};

/// Field of the request body that identifies the owner of a recipe.
pub const OWNER_FIELD: &str = "user";

const REQUIRED_MSG: &str = "This field is required.";
const NULL_MSG: &str = "This field may not be null.";

/// Identifier of a recipe, assigned by the DB.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecipeId(i64);

impl RecipeId {
    pub fn new(id: i64) -> Self {
        RecipeId(id)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

impl FromStr for RecipeId {
    type Err = DataDomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.parse::<i64>() {
            Ok(id) if id > 0 => Ok(RecipeId(id)),
            _ => Err(DataDomainError::InvalidId),
        }
    }
}

impl fmt::Display for RecipeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Object that represents a stored recipe.
///
/// # Description
///
/// The owner of the recipe is set when the recipe gets registered in the DB and it never changes afterwards.
#[derive(Clone, Debug, PartialEq)]
pub struct Recipe {
    id: RecipeId,
    owner: UserId,
    draft: RecipeDraft,
    creation_date: DateTime<Local>,
    update_date: Option<DateTime<Local>>,
}

impl Recipe {
    pub fn new(
        id: RecipeId,
        owner: UserId,
        draft: RecipeDraft,
        creation_date: DateTime<Local>,
        update_date: Option<DateTime<Local>>,
    ) -> Self {
        Recipe {
            id,
            owner,
            draft,
            creation_date,
            update_date,
        }
    }

    pub fn id(&self) -> RecipeId {
        self.id
    }

    pub fn owner(&self) -> UserId {
        self.owner
    }

    pub fn title(&self) -> &str {
        &self.draft.title
    }

    pub fn time_minutes(&self) -> i64 {
        self.draft.time_minutes
    }

    pub fn price(&self) -> Price {
        self.draft.price
    }

    pub fn description(&self) -> Option<&str> {
        self.draft.description.as_deref()
    }

    pub fn link(&self) -> Option<&str> {
        self.draft.link.as_deref()
    }

    pub fn creation_date(&self) -> DateTime<Local> {
        self.creation_date
    }

    pub fn update_date(&self) -> Option<DateTime<Local>> {
        self.update_date
    }

    /// Writable content of the recipe.
    pub fn draft(&self) -> &RecipeDraft {
        &self.draft
    }
}

/// The writable content of a recipe.
///
/// # Description
///
/// A draft holds every member of a [Recipe] that a client is allowed to write. The owner is not part of it on
/// purpose: it is always taken from the authenticated caller.
#[derive(Clone, Debug, PartialEq, Validate)]
pub struct RecipeDraft {
    #[validate(length(
        min = 1,
        max = 255,
        message = "Ensure this field has between 1 and 255 characters."
    ))]
    pub title: String,
    #[validate(range(min = 0, max = 2147483647, message = "Ensure this value is between 0 and 2147483647."))]
    pub time_minutes: i64,
    pub price: Price,
    pub description: Option<String>,
    #[validate(
        custom = "validate_link",
        length(max = 255, message = "Ensure this field has no more than 255 characters.")
    )]
    pub link: Option<String>,
}

impl RecipeDraft {
    /// Run the format checks over the draft's members.
    pub fn checked(self) -> Result<Self, DataDomainError> {
        match self.validate() {
            Ok(_) => Ok(self),
            Err(e) => Err(DataDomainError::InvalidFields(e.into())),
        }
    }
}

/// Links shall be well formed URLs using one of these schemes.
/// Parse an integer written as text, accepting a zero fraction such as `"10.0"`.
fn parse_integral(text: &str) -> Option<i64> {
    let text = text.trim();
    let text = match text.split_once('.') {
        Some((whole, fraction)) if fraction.bytes().all(|b| b == b'0') => whole,
        Some(_) => return None,
        None => text,
    };
    text.parse::<i64>().ok()
}

const LINK_SCHEMES: [&str; 4] = ["http", "https", "ftp", "ftps"];

fn validate_link(link: &str) -> Result<(), ValidationError> {
    let scheme = link
        .split_once("://")
        .map(|(scheme, _)| scheme.to_ascii_lowercase());

    match scheme {
        Some(scheme) if LINK_SCHEMES.contains(&scheme.as_str()) && validate_url(link) => Ok(()),
        _ => {
            let mut error = ValidationError::new("url");
            error.message = Some(Cow::from("Enter a valid URL."));
            Err(error)
        }
    }
}

/// A set of changes for a recipe sent by a client.
///
/// # Description
///
/// Each member is `None` when the client didn't include the field in the request body. For the optional members
/// of a recipe, `Some(None)` means the client explicitly cleared the field.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RecipeChanges {
    pub title: Option<String>,
    pub time_minutes: Option<i64>,
    pub price: Option<Price>,
    pub description: Option<Option<String>>,
    pub link: Option<Option<String>>,
}

impl RecipeChanges {
    /// Parse the body of a write request.
    ///
    /// # Description
    ///
    /// The body shall be a JSON object. Type errors are collected for every field, so a client gets to know all the
    /// wrong fields at once. Unknown members, as well as the read-only `id`, are ignored.
    pub fn parse(body: &[u8]) -> Result<Self, DataDomainError> {
        let object = parse_object(body)?;
        reject_immutable_fields(&object)?;

        let mut errors = FieldErrors::new();
        let mut changes = RecipeChanges::default();

        for (field, value) in object.iter() {
            match field.as_str() {
                "title" => changes.title = required_string(field, value, &mut errors),
                "time_minutes" => {
                    changes.time_minutes = match value {
                        Value::Number(n) if n.is_i64() => n.as_i64(),
                        Value::Number(n) if n.is_u64() => {
                            errors.add(field, "Ensure this value is between 0 and 2147483647.");
                            None
                        }
                        // Whole floats such as 10.0 are integers too.
                        Value::Number(n) => match n.as_f64() {
                            Some(f) if f.is_finite() && f.fract() == 0.0 => Some(f as i64),
                            _ => {
                                errors.add(field, "A valid integer is required.");
                                None
                            }
                        },
                        Value::String(s) => match parse_integral(s) {
                            Some(n) => Some(n),
                            None => {
                                errors.add(field, "A valid integer is required.");
                                None
                            }
                        },
                        Value::Null => {
                            errors.add(field, NULL_MSG);
                            None
                        }
                        _ => {
                            errors.add(field, "A valid integer is required.");
                            None
                        }
                    }
                }
                "price" => {
                    changes.price = match value {
                        Value::Null => {
                            errors.add(field, NULL_MSG);
                            None
                        }
                        other => match Price::from_json(other) {
                            Ok(price) => Some(price),
                            Err(msg) => {
                                errors.add(field, msg);
                                None
                            }
                        },
                    }
                }
                "description" => changes.description = optional_string(field, value, &mut errors),
                "link" => changes.link = optional_string(field, value, &mut errors),
                _ => (),
            }
        }

        errors.into_result()?;

        Ok(changes)
    }

    /// Turn the changes into a complete draft.
    ///
    /// # Description
    ///
    /// Used for creation and full updates. `title`, `time_minutes` and `price` are required. The optional members
    /// that were not included are left blank.
    pub fn into_draft(self) -> Result<RecipeDraft, DataDomainError> {
        let mut errors = FieldErrors::new();

        if self.title.is_none() {
            errors.add("title", REQUIRED_MSG);
        }
        if self.time_minutes.is_none() {
            errors.add("time_minutes", REQUIRED_MSG);
        }
        if self.price.is_none() {
            errors.add("price", REQUIRED_MSG);
        }

        match (self.title, self.time_minutes, self.price) {
            (Some(title), Some(time_minutes), Some(price)) => RecipeDraft {
                title,
                time_minutes,
                price,
                description: self.description.flatten(),
                link: self.link.flatten(),
            }
            .checked(),
            _ => Err(DataDomainError::InvalidFields(errors)),
        }
    }

    /// Merge the changes on top of an existing draft.
    ///
    /// # Description
    ///
    /// Used for partial updates: members that were not included keep their previous value.
    pub fn merge_into(self, current: &RecipeDraft) -> Result<RecipeDraft, DataDomainError> {
        RecipeDraft {
            title: self.title.unwrap_or_else(|| current.title.clone()),
            time_minutes: self.time_minutes.unwrap_or(current.time_minutes),
            price: self.price.unwrap_or(current.price),
            description: match self.description {
                Some(description) => description,
                None => current.description.clone(),
            },
            link: match self.link {
                Some(link) => link,
                None => current.link.clone(),
            },
        }
        .checked()
    }
}

/// Make sure the client is not trying to set fields that are assigned by the backend.
///
/// # Description
///
/// The owner of a recipe is always the authenticated client. Any attempt to set it, even to the client's own ID,
/// is rejected.
pub fn reject_immutable_fields(body: &Map<String, Value>) -> Result<(), DataDomainError> {
    if body.contains_key(OWNER_FIELD) {
        Err(DataDomainError::InvalidFields(FieldErrors::single(
            OWNER_FIELD,
            "You cannot set this field",
        )))
    } else {
        Ok(())
    }
}

fn parse_object(body: &[u8]) -> Result<Map<String, Value>, DataDomainError> {
    let value: Value = serde_json::from_slice(body).map_err(|e| {
        DataDomainError::InvalidFields(FieldErrors::single(
            NON_FIELD_ERRORS,
            &format!("JSON parse error - {e}"),
        ))
    })?;

    match value {
        Value::Object(object) => Ok(object),
        other => Err(DataDomainError::InvalidFields(FieldErrors::single(
            NON_FIELD_ERRORS,
            &format!("Invalid data. Expected a dictionary, but got {}.", json_type(&other)),
        ))),
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "str",
        Value::Array(_) => "list",
        Value::Object(_) => "dict",
    }
}

fn required_string(field: &str, value: &Value, errors: &mut FieldErrors) -> Option<String> {
    match value {
        Value::String(s) if s.trim().is_empty() => {
            errors.add(field, "This field may not be blank.");
            None
        }
        Value::String(s) => Some(s.trim().to_owned()),
        Value::Null => {
            errors.add(field, NULL_MSG);
            None
        }
        _ => {
            errors.add(field, "Not a valid string.");
            None
        }
    }
}

fn optional_string(field: &str, value: &Value, errors: &mut FieldErrors) -> Option<Option<String>> {
    match value {
        Value::String(s) if s.trim().is_empty() => Some(None),
        Value::String(s) => Some(Some(s.trim().to_owned())),
        Value::Null => Some(None),
        _ => {
            errors.add(field, "Not a valid string.");
            None
        }
    }
}

/// List view of a recipe.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct RecipeSummary {
    #[schema(example = 1)]
    pub id: i64,
    #[schema(example = "Spaghetti carbonara")]
    pub title: String,
    #[schema(example = 25)]
    pub time_minutes: i64,
    #[schema(value_type = String, example = "5.00")]
    pub price: String,
    #[schema(example = "https://example.com/carbonara.pdf")]
    pub link: String,
}

/// Detail view of a recipe.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct RecipeDetail {
    #[schema(example = 1)]
    pub id: i64,
    #[schema(example = "Spaghetti carbonara")]
    pub title: String,
    #[schema(example = 25)]
    pub time_minutes: i64,
    #[schema(value_type = String, example = "5.00")]
    pub price: String,
    #[schema(example = "https://example.com/carbonara.pdf")]
    pub link: String,
    #[schema(example = "No cream. Ever.")]
    pub description: String,
}

impl From<&Recipe> for RecipeSummary {
    fn from(recipe: &Recipe) -> Self {
        RecipeSummary {
            id: recipe.id().value(),
            title: recipe.title().to_owned(),
            time_minutes: recipe.time_minutes(),
            price: recipe.price().to_string(),
            link: recipe.link().unwrap_or_default().to_owned(),
        }
    }
}

impl From<&Recipe> for RecipeDetail {
    fn from(recipe: &Recipe) -> Self {
        RecipeDetail {
            id: recipe.id().value(),
            title: recipe.title().to_owned(),
            time_minutes: recipe.time_minutes(),
            price: recipe.price().to_string(),
            link: recipe.link().unwrap_or_default().to_owned(),
            description: recipe.description().unwrap_or_default().to_owned(),
        }
    }
}
