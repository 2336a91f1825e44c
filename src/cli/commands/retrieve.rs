//! Retrieve command - verify one upstream release and catalog it

use crate::cli::args::RetrieveArgs;
use crate::config::Config;
use crate::dependency::catalog::{Catalog, InsertOutcome};
use crate::error::BuildpackResult;
use crate::retrieval::{HttpTransport, PharExtractor, ReleaseUris, Retriever, TrustedKeyring};
use console::style;
use std::time::Duration;
use tracing::info;

/// Execute the retrieve command
pub fn execute(args: RetrieveArgs, config: &Config) -> BuildpackResult<()> {
    let keyring_path = args.key.or_else(|| config.signing.keyring.clone());
    let keyring = TrustedKeyring::load(keyring_path.as_deref())?;
    info!("Loaded {} trusted key(s)", keyring.len());

    let catalog_path = args.catalog.unwrap_or_else(|| config.catalog.path.clone());
    let mut catalog = Catalog::load(&catalog_path)?;

    let extractor = match &config.extract.phar {
        Some(binary) => PharExtractor::with_binary(binary.clone()),
        None => PharExtractor::from_path()?,
    };
    let transport = HttpTransport::new(Duration::from_secs(config.upstream.timeout_secs));

    let uris = ReleaseUris::for_version(&config.upstream, &args.version);
    let descriptor =
        Retriever::new(&transport, &keyring, &extractor).generate_metadata(&args.version, &uris)?;

    match catalog.insert(descriptor.clone())? {
        InsertOutcome::Added => {
            catalog.save(&catalog_path)?;
            eprintln!(
                "{} Added composer {} to {}",
                style("✓").green(),
                descriptor.version,
                catalog_path.display()
            );
        }
        InsertOutcome::Unchanged => {
            eprintln!(
                "{} composer {} already in {}",
                style("•").cyan(),
                descriptor.version,
                catalog_path.display()
            );
        }
    }

    print!("{}", toml::to_string_pretty(&descriptor)?);
    Ok(())
}
