// Copyright 2024 Felipe Torres González
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Authentication of the clients of the API.

mod extractor;
mod password;
mod token_auth;

pub use extractor::{token_from_headers, AuthenticatedUser};
pub use password::validate_credentials;
pub use token_auth::{
    check_access, compute_secret_hash, delete_expired_tokens, generate_token, issue_token,
    verify_secret_hash,
};
