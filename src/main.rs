// Example crawling actor
//
// Crawls from a single seed URL, pushes one record per page to the output
// dataset, and keeps a counter of pushed records in a state blob that the
// interruption handlers persist when the platform migrates or aborts the
// run.

use std::sync::Arc;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crawl_actor::{Actor, ActorConfig, HttpCrawler, setup_migrate_abort_handlers};

/// Counter blob persisted under the reserved state key
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
struct CounterState {
    pushed: u64,
}

/// One output record per crawled page
#[derive(Debug, Serialize)]
struct ScrapedRecord {
    url: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let actor = Actor::init(ActorConfig::from_env()?).await?;

    let crawler = Arc::new(
        HttpCrawler::<CounterState>::new(
            &actor,
            Arc::new(|ctx| {
                Box::pin(async move {
                    info!("Processing {}", ctx.loaded_url());
                    ctx.enqueue_links().await?;

                    let state = ctx.state();

                    // In the ideal case these updates directly follow each
                    // other: push record -> bump counter -> mark handled.
                    ctx.push_data(&ScrapedRecord {
                        url: ctx.loaded_url().to_string(),
                    })
                    .await?;
                    // If the process exits exactly here...
                    state.write().pushed += 1;
                    // ...or here, the persisted counter and the dataset
                    // disagree
                    Ok(())
                })
            }),
        )
        .await?,
    );

    let _interruption_handlers = setup_migrate_abort_handlers(&actor, Arc::clone(&crawler));

    let seed = actor.config().start_url().to_string();
    crawler.run([seed]).await?;

    actor.exit().await
}
