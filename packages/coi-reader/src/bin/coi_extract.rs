// Extract one COI document into CSV tables.
//
// Usage: coi_extract <document-key> [data-root]
//
// The document is read from `<data-root>/<document-key>` and all outputs land
// under `<data-root>/outputs/`. Requires OPENAI_API_KEY.

use anyhow::{bail, Context, Result};
use coi_reader::{build_tables, write_main_csv, write_other_csv, write_support_csv};
use coi_reader::{CoiExtractor, DocumentStore, FsStore};
use llm_client::OpenAiClient;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,coi_reader=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args: Vec<String> = std::env::args().collect();
    let document_key = match args.get(1) {
        Some(key) => key.clone(),
        None => bail!("usage: coi_extract <document-key> [data-root]"),
    };
    let data_root = args.get(2).cloned().unwrap_or_else(|| ".".to_string());

    let model = OpenAiClient::from_env().context("OPENAI_API_KEY not configured")?;
    let store = FsStore::new(&data_root);
    let extractor = CoiExtractor::new(&model, &store);

    tracing::info!(document_key, "starting extraction");
    let manifest = extractor
        .run_extraction(&document_key)
        .await
        .context("extraction failed")?;
    tracing::info!(
        series = manifest.preferred_share_names.len(),
        "extraction complete"
    );

    let tables = build_tables(&store, &manifest)
        .await
        .context("table assembly failed")?;

    let stem = document_key
        .rsplit('/')
        .next()
        .unwrap_or(&document_key)
        .trim_end_matches(".txt")
        .to_string();
    for (name, bytes) in [
        ("main", write_main_csv(&tables)?),
        ("support", write_support_csv(&tables)?),
        ("other", write_other_csv(&tables)?),
    ] {
        let key = format!("outputs/tables/{}/{}.csv", stem, name);
        let text = String::from_utf8(bytes).context("CSV output was not UTF-8")?;
        store.put(&key, &text).await?;
        tracing::info!(key, "table written");
    }

    Ok(())
}
