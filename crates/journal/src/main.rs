use chrono::Utc;
use ledger::EntryStore;

mod client;
mod commands;
mod config;
mod error;
mod export;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let (settings, command) = config::load()?;

    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "journal={level},ledger={level}",
            level = settings.level
        ))
        .with_writer(std::io::stderr)
        .init();

    let timezone = settings.timezone()?;
    let journal = settings.journal()?;
    let remote = client::HttpRemote::new(&settings.base_url, timezone)?;
    let store = EntryStore::new(remote);

    let snapshot = store.load(settings.user_id()).await?;
    tracing::debug!(
        version = snapshot.version,
        entries = snapshot.entries.len(),
        "ledger loaded"
    );

    let ctx = commands::Context {
        journal,
        timezone,
        now: Utc::now(),
    };
    if let Err(err) = commands::run(&store, ctx, command).await {
        tracing::error!("{err}");
        return Err(err.into());
    }
    Ok(())
}
