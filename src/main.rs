mod cli;

use anyhow::Result;
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use cli::{Cli, Effect};
use property_wizard::{DraftStore, PropertyCatalog, Wizard, WizardConfig};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    // Logs go to stderr, the rendered wizard to stdout
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("property_wizard=info")),
        )
        .init();

    let cli = Cli::parse();

    let mut config = WizardConfig::load()?;
    if let Some(session) = cli.session {
        config.session_key = session;
    }

    let store = DraftStore::new(&config.data_dir, &config.session_key);
    let catalog = PropertyCatalog::standard();

    let mut wizard = match store.load_or_discard().await? {
        Some(snapshot) => {
            let (wizard, report) = Wizard::restore(catalog, config.max_image_bytes, snapshot);
            if !report.rejected.is_empty() {
                warn!("{} staged image(s) could not be restored", report.rejected.len());
            }
            wizard
        }
        None => {
            info!("Starting a new property draft");
            Wizard::new(catalog, config.max_image_bytes)
        }
    };

    match cli::execute(cli.command, &mut wizard, &config).await? {
        Effect::Save => store.save(&wizard.snapshot(&config.session_key)).await?,
        Effect::Clear => store.clear().await?,
    }

    println!();
    print!("{}", wizard.render());

    Ok(())
}
