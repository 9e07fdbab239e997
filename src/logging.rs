use std::fs::File;
use std::io;
use std::path::Path;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

/// Installs the global subscriber. `RUST_LOG` wins over `verbosity`.
///
/// The dashboard repaints stderr's terminal too, so diagnostics are best sent
/// to `trace_file` when watching a run.
pub fn init(verbosity: u8, trace_file: Option<&Path>) -> io::Result<()> {
    let default = match verbosity {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false);

    match trace_file {
        Some(path) => builder
            .with_ansi(false)
            .with_writer(Mutex::new(File::create(path)?))
            .init(),
        None => builder.with_writer(io::stderr).init(),
    }
    Ok(())
}
