//! Tracing subscriber for the `tally` binary.
//!
//! `TALLY_LOG` takes an `EnvFilter` directive (e.g. `tally_classifier=debug`).
//! Output goes to stderr so command output on stdout stays pipeable.

use tracing_subscriber::EnvFilter;

pub const LOG_ENV: &str = "TALLY_LOG";

pub fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr);

    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}
