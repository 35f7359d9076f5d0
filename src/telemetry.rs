// Copyright 2024-2025 Felipe Torres González
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Set up of the tracing sub-system.

use crate::configuration::LogSettings;
use tracing::{warn, Subscriber};
use tracing_subscriber::{fmt, prelude::*, registry::LookupSpan, Layer};

type BoxedLayer<S> = Box<dyn Layer<S> + Send + Sync + 'static>;

/// Install the global subscriber described by the log settings.
///
/// # Description
///
/// Only one output is active at a time. When journald is requested but the socket is not available, the
/// compact console output is used instead. Calling this function more than once leaves the first subscriber in
/// place.
pub fn configure_tracing(conf: &LogSettings) {
    let level = conf.get_verbosity_level();
    let mut journald_failure = None;

    let output = if conf.journald.unwrap_or_default() {
        match tracing_journald::layer() {
            Ok(layer) => layer
                .with_field_prefix(Some("recipe_api".to_owned()))
                .boxed(),
            Err(e) => {
                journald_failure = Some(e);
                console_layer(false)
            }
        }
    } else {
        console_layer(conf.pretty_log.unwrap_or_default())
    };

    let installed = tracing_subscriber::registry()
        .with(output.with_filter(level))
        .try_init()
        .is_ok();

    if let (true, Some(e)) = (installed, journald_failure) {
        warn!("Couldn't connect to journald ({e}), logging to stdout");
    }
}

fn console_layer<S>(pretty: bool) -> BoxedLayer<S>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    if pretty {
        fmt::layer().pretty().with_target(false).boxed()
    } else {
        fmt::layer()
            .without_time()
            .with_ansi(false)
            .with_target(false)
            .boxed()
    }
}
