//! Logging for volley
//!
//! Everything goes through `tracing`. The engine crates emit structured
//! events directly; the `dispatch!`/`internal!` macros wrap an event in a
//! named span for the coarse split between campaign activity and the
//! process itself.

use std::{io::IsTerminal, str::FromStr};

use tracing::metadata::LevelFilter;
use tracing_subscriber::{
    Layer, filter::FilterFn, prelude::__tracing_subscriber_SubscriberExt, util::SubscriberInitExt,
};

#[macro_export]
macro_rules! log {
    ($level:expr, $span:expr, $($msg:expr),* $(,)?) => {{
        let span = $crate::tracing::span!($level, $span);
        let _guard = span.enter();

        $crate::tracing::event!($level, $($msg),*)
    }};
}

/// Events tied to dispatching messages for a campaign run.
#[macro_export]
macro_rules! dispatch {
    (level = $level:ident, $($msg:expr),* $(,)?) => {
        $crate::log!($crate::tracing::Level::$level, "dispatch", $($msg),*)
    };

    ($($msg:expr),* $(,)?) => {
        $crate::dispatch!(level = TRACE, $($msg),*)
    };
}

/// Events about volley itself rather than any one campaign.
#[macro_export]
macro_rules! internal {
    (level = $level:ident, $($msg:expr),* $(,)?) => {
        $crate::log!($crate::tracing::Level::$level, "internal", $($msg),*)
    };

    ($($msg:expr),* $(,)?) => {
        $crate::internal!(level = TRACE, $($msg),*)
    };
}

/// Install the global subscriber. Call once, from the binary.
///
/// The level defaults to TRACE in debug builds and INFO otherwise;
/// `VOLLEY_LOG` overrides it. Only `volley*` targets are kept.
pub fn init() {
    tracing_subscriber::Registry::default()
        .with(
            tracing_subscriber::fmt::layer()
                .compact()
                .with_ansi(std::io::stdout().is_terminal())
                .with_timer(tracing_subscriber::fmt::time::ChronoUtc::rfc_3339())
                .with_filter(env_level())
                .with_filter(FilterFn::new(|metadata| {
                    metadata.target().starts_with("volley")
                })),
        )
        .init();
}

fn env_level() -> LevelFilter {
    let default = if cfg!(debug_assertions) {
        LevelFilter::TRACE
    } else {
        LevelFilter::INFO
    };

    std::env::var("VOLLEY_LOG").map_or(default, |level| {
        LevelFilter::from_str(&level).unwrap_or_else(|_| {
            eprintln!("Invalid log level {level:?}, defaulting to {default}");
            default
        })
    })
}
