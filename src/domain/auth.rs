// Copyright 2024 Felipe Torres González
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Data objects related to the authentication logic.

use crate::domain::{DataDomainError, ID_LENGTH};
use core::fmt;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use std::str::FromStr;
use uuid::Uuid;

/// Simple type to represent the ID of an API token.
///
/// # Description
///
/// The ID is public: it travels along the secret part of the token so the backend can find the stored hash
/// without scanning the whole table.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct ClientId(String);

impl ClientId {
    pub fn new() -> Self {
        // The tail of a UUIDv7 carries the random bits; the head is the timestamp.
        let id = Uuid::now_v7().simple().to_string();
        let start = id.len() - ID_LENGTH;

        Self(id[start..].to_owned())
    }
}

impl Default for ClientId {
    fn default() -> Self {
        Self::new()
    }
}

impl FromStr for ClientId {
    type Err = DataDomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != ID_LENGTH || !s.chars().all(|c| c.is_ascii_hexdigit()) {
            Err(DataDomainError::InvalidAccessCredentials)
        } else {
            Ok(ClientId(s.to_string()))
        }
    }
}

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An API token as handed to a client: `<client id>:<secret>`.
#[derive(Clone, Debug)]
pub struct AuthData {
    pub api_key: SecretString,
}

impl AuthData {
    pub fn new(client_id: &ClientId, secret: &SecretString) -> Self {
        AuthData {
            api_key: SecretString::from(format!("{client_id}:{}", secret.expose_secret())),
        }
    }

    /// Split the token into its public and secret parts.
    pub fn split(&self) -> Result<(ClientId, SecretString), DataDomainError> {
        let (client_id, secret) = self
            .api_key
            .expose_secret()
            .split_once(':')
            .ok_or(DataDomainError::InvalidAccessCredentials)?;

        if secret.is_empty() {
            return Err(DataDomainError::InvalidAccessCredentials);
        }

        Ok((ClientId::from_str(client_id)?, SecretString::from(secret)))
    }
}
