//! PolySink - Stateful Receiver Service
//!
//! Reads newline-delimited JSON fragments from stdin, coalesces them with the
//! debounced batch engine and renders every flushed layer as a log line.
//! The engine is closed on EOF or Ctrl-C, which flushes what is left.

mod config;
mod dto;

use anyhow::Result;
use polystream_domain::{
    BatchEngine, EngineBuilder, FlushBatch, Fragment, SourceDirNormalizer, WindowProjector,
};
use polystream_tokio::TokioScheduler;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use crate::config::SinkSettings;
use crate::dto::FragmentRecord;

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables before the filter reads RUST_LOG
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Starting PolySink receiver service");

    let settings = SinkSettings::from_env()?;

    let mut projector = WindowProjector::new(settings.receiver.grouping_dimensions.clone());
    if let Some(images_dir) = &settings.images_dir {
        info!(
            images_dir = %images_dir.display(),
            "Folding ROI results paths onto images directory"
        );
        projector = projector.with_normalizer(SourceDirNormalizer::new(images_dir));
    }

    let engine = EngineBuilder::new(settings.receiver)
        .projector(projector)
        .on_error(|err| error!(error = %err, "Dropped batch"))
        .build_debounced(TokioScheduler::current()?, render)?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    let mut received = 0u64;
    loop {
        tokio::select! {
            line = lines.next_line() => match line? {
                Some(line) if line.trim().is_empty() => continue,
                Some(line) => match FragmentRecord::parse(&line) {
                    Ok(record) => {
                        engine.enqueue(Fragment::from(record))?;
                        received += 1;
                    }
                    Err(err) => warn!(error = %err, "Skipping malformed fragment record"),
                },
                None => {
                    info!("Input stream ended");
                    break;
                }
            },
            _ = &mut shutdown => {
                info!("Shutdown signal received");
                break;
            }
        }
    }

    engine.close();

    let stats = engine.stats();
    info!(
        received,
        batches = stats.batches_flushed,
        fragments = stats.fragments_flushed,
        faults = stats.faults,
        "PolySink stopped"
    );

    Ok(())
}

/// Stand-in renderer: one log line per updated layer
fn render(batch: &FlushBatch) -> anyhow::Result<()> {
    for layer in batch.layers() {
        let bytes: usize = layer.fragments.iter().map(|f| f.payload().len()).sum();
        info!(
            batch_id = %batch.id(),
            reason = %batch.reason(),
            window = %layer.group.key(),
            layer = %layer.layer_key,
            fragments = layer.fragments.len(),
            bytes,
            "Layer updated"
        );
    }
    Ok(())
}
