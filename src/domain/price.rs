// Copyright 2025 Felipe Torres González
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Fixed-point price of a recipe.

use rust_decimal::Decimal;
use serde::{Serialize, Serializer};
use serde_json::Value;
use std::{fmt, str::FromStr};

/// Maximum number of digits (integer + fractional part) of a price.
pub const PRICE_MAX_DIGITS: u32 = 5;
/// Maximum number of decimal places of a price.
pub const PRICE_DECIMAL_PLACES: u32 = 2;

const TOO_MANY_DECIMALS_MSG: &str = "Ensure that there are no more than 2 decimal places.";

/// Price of a recipe.
///
/// # Description
///
/// Prices are non-negative decimal numbers with up to [PRICE_MAX_DIGITS] digits, of which up to
/// [PRICE_DECIMAL_PLACES] are decimals. The value is kept as a [Decimal], so no binary rounding happens between
/// the value a client sends and the value that gets stored.
///
/// The serialised form is always a string with two decimals, i.e. `"5.00"`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct Price(Decimal);

impl Price {
    /// Build a [Price] checking the format rules.
    pub fn new(value: Decimal) -> Result<Self, &'static str> {
        if value.is_sign_negative() && !value.is_zero() {
            return Err("Ensure this value is greater than or equal to 0.");
        }

        // Trailing zeros don't count as decimal places: 5.500 is a valid price.
        let normalized = value.normalize();

        if normalized.scale() > PRICE_DECIMAL_PLACES {
            return Err(TOO_MANY_DECIMALS_MSG);
        }

        if normalized.trunc().abs() >= Decimal::from(10u32.pow(PRICE_MAX_DIGITS - PRICE_DECIMAL_PLACES)) {
            return Err("Ensure that there are no more than 3 digits before the decimal point.");
        }

        let mut value = normalized.abs();
        value.rescale(PRICE_DECIMAL_PLACES);

        Ok(Price(value))
    }

    /// Parse a price from a JSON value.
    ///
    /// # Description
    ///
    /// Clients may send a price either as a JSON string (`"5.00"`) or as a JSON number (`5.0`). Numbers are
    /// converted through their textual representation, so `5.1` is read as exactly 5.10.
    pub fn from_json(value: &Value) -> Result<Self, &'static str> {
        let text = match value {
            Value::String(text) => text.trim().to_owned(),
            Value::Number(number) => number.to_string(),
            _ => return Err("A valid number is required."),
        };

        // Decimal rounds past 28 fractional digits, so the written precision is checked on the text.
        if written_decimal_places(&text)
            .is_some_and(|places| places > PRICE_DECIMAL_PLACES as i64)
        {
            return Err(TOO_MANY_DECIMALS_MSG);
        }

        let decimal = Decimal::from_str(&text)
            .or_else(|_| Decimal::from_scientific(&text))
            .map_err(|_| "A valid number is required.")?;

        Price::new(decimal)
    }

    pub fn value(&self) -> Decimal {
        self.0
    }
}

/// Count the significant decimal places of a number as written, i.e. `1.50` has 1 and `15e-3` has 3.
fn written_decimal_places(text: &str) -> Option<i64> {
    let (mantissa, exponent) = match text.split_once(|c| c == 'e' || c == 'E') {
        Some((mantissa, exponent)) => (mantissa, exponent.parse::<i64>().ok()?),
        None => (text, 0),
    };

    let fraction = mantissa
        .split_once('.')
        .map(|(_, fraction)| fraction)
        .unwrap_or_default();
    let places = fraction.trim_end_matches('0').len() as i64;

    Some(places.saturating_sub(exponent))
}

impl FromStr for Price {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Price::from_json(&Value::String(s.to_owned()))
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Serialize for Price {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}
