use anyhow::{Context, Result};
use tokio_util::sync::CancellationToken;

use indexer::runtime::{boot, job, stop};

#[tokio::main]
async fn main() -> Result<()> {
    let config = boot::boot()?;

    let cancel = CancellationToken::new();
    tokio::spawn(stop::cancel_on_shutdown(cancel.clone()));

    // The pipeline is blocking; keep it off the async workers
    tokio::task::spawn_blocking(move || job::run(&config, cancel))
        .await
        .context("Indexing task panicked")?
}
