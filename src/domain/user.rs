// Copyright 2025 Felipe Torres González
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Data objects related to the users of the API.

use crate::domain::{DataDomainError, FieldErrors};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::ToSchema;
use validator::Validate;

/// Minimum length of a user's password.
pub const MIN_PASSWORD_LENGTH: u64 = 5;

/// Identifier of a user, assigned by the DB.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(i64);

impl UserId {
    pub fn new(id: i64) -> Self {
        UserId(id)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A registered user.
#[derive(Clone, Debug, PartialEq)]
pub struct User {
    pub id: UserId,
    pub email: String,
    pub name: String,
}

/// Public profile of a user.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct UserProfile {
    #[schema(example = "jane_doe@mail.com")]
    pub email: String,
    #[schema(example = "Jane")]
    pub name: String,
}

impl From<&User> for UserProfile {
    fn from(user: &User) -> Self {
        UserProfile {
            email: user.email.clone(),
            name: user.name.clone(),
        }
    }
}

/// Data sent by a client to register a new user.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct NewUser {
    #[validate(email(message = "Enter a valid email address."))]
    #[schema(example = "jane_doe@mail.com")]
    email: String,
    #[schema(value_type = String, example = "testpass123")]
    password: SecretString,
    #[serde(default)]
    #[validate(length(max = 255, message = "Ensure this field has no more than 255 characters."))]
    #[schema(example = "Jane")]
    name: Option<String>,
}

impl NewUser {
    pub fn new(email: &str, password: &str, name: Option<&str>) -> Result<Self, DataDomainError> {
        NewUser {
            email: email.to_owned(),
            password: SecretString::from(password),
            name: name.map(String::from),
        }
        .checked()
    }

    /// Run the format checks over the members. Emails are compared lower-cased.
    pub fn checked(mut self) -> Result<Self, DataDomainError> {
        self.email = normalize_email(&self.email);

        let mut errors = match self.validate() {
            Ok(_) => FieldErrors::new(),
            Err(e) => FieldErrors::from(e),
        };

        if (self.password.expose_secret().chars().count() as u64) < MIN_PASSWORD_LENGTH {
            errors.add("password", "Ensure this field has at least 5 characters.");
        }

        errors.into_result()?;

        Ok(self)
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn password(&self) -> &SecretString {
        &self.password
    }

    pub fn name(&self) -> &str {
        self.name.as_deref().unwrap_or_default()
    }
}

/// Credentials sent by a client to obtain an API token.
#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginData {
    #[schema(example = "jane_doe@mail.com")]
    pub email: String,
    #[schema(value_type = String, example = "testpass123")]
    pub password: SecretString,
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
