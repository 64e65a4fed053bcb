//! Subscriber setup for binaries and tests embedding Strata.

use std::sync::Once;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::constants::LOG_ENV_VAR;

/// Used when `STRATA_LOG` is unset or does not parse.
pub const DEFAULT_DIRECTIVES: &str = "strata_core=info,strata_analysis=info";

static INIT: Once = Once::new();

/// The filter `init_tracing` installs: `STRATA_LOG` when it parses,
/// otherwise [`DEFAULT_DIRECTIVES`].
///
/// `STRATA_LOG=strata_analysis::backup=debug,strata_analysis::fixers=warn`
/// narrows logging to single subsystems.
pub fn env_filter() -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV_VAR).unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVES))
}

/// Install a compact fmt subscriber filtered by [`env_filter`]. Only the
/// first call does anything, and a subscriber the host already installed
/// is left in place.
pub fn init_tracing() {
    INIT.call_once(|| {
        let layer = fmt::layer()
            .compact()
            .with_target(true)
            .with_line_number(true);
        let installed = tracing_subscriber::registry()
            .with(layer)
            .with(env_filter())
            .try_init();
        if installed.is_err() {
            tracing::debug!("global subscriber already set, keeping it");
        }
    });
}
