use std::io;
use std::sync::Once;

use tracing_subscriber::EnvFilter;

static INIT: Once = Once::new();

/// Install the stderr subscriber. `RUST_LOG` overrides the default filter.
pub fn init_tracing(json: bool) {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("ngram_core=info"));
        let builder = tracing_subscriber::fmt()
            .with_writer(io::stderr)
            .with_target(true)
            .with_env_filter(filter);
        if json {
            builder.json().init();
        } else {
            builder.init();
        }
    });
}
