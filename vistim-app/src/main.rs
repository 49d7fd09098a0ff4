mod app;
pub use app::App;

use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let config = std::env::args_os().nth(1).map(PathBuf::from);
    let app = App::new(config)?;
    app.run()?;

    Ok(())
}
