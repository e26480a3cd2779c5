use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// `RUST_LOG` wins when set; otherwise `verbose` picks between info and debug.
pub fn init(verbose: bool, json: bool) {
    let default_filter = if verbose {
        "weatherbot=debug,weatherbot_core=debug,info"
    } else {
        "weatherbot=info,weatherbot_core=info,warn"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    let layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false);

    if json {
        tracing_subscriber::registry().with(filter).with(layer.json()).init();
    } else {
        tracing_subscriber::registry().with(filter).with(layer.compact()).init();
    }
}
