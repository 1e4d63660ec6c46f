use anyhow::Result;
use tracing::info;

use gomoku_cli::GomokuEngine;

fn main() -> Result<()> {
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();
    info!("gomoku starting");
    GomokuEngine::new().run()?;
    Ok(())
}
