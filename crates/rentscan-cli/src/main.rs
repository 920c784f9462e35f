mod config;

use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;
use rentscan_ai::{BlockingVisionClient, ClientConfig, ImageInput, VisionClient, VisionError};
use rentscan_core::{
    DamageComparisonResponse, DamageDetectionResponse, DashboardAnalysisResponse,
    InsuranceOcrResponse, LicenseOcrResponse,
};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use config::{Cli, Command, parse_options};

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let config = cli.client.to_config();
    info!(model = %config.model(), endpoint = %config.endpoint(), blocking = cli.blocking, "rentscan v{}", env!("CARGO_PKG_VERSION"));

    let record = if cli.blocking {
        run_blocking(config, &cli.command)?
    } else {
        let runtime = tokio::runtime::Runtime::new().context("starting async runtime")?;
        runtime.block_on(run_async(config, &cli.command))?
    };

    println!("{}", serde_json::to_string_pretty(&record)?);
    Ok(())
}

async fn run_async(config: ClientConfig, command: &Command) -> Result<Value> {
    let client = VisionClient::new(config)?;
    match command {
        Command::License { image } => {
            render(client.parser::<LicenseOcrResponse>().parse(load(image)?).await)
        }
        Command::Insurance { image } => {
            render(client.parser::<InsuranceOcrResponse>().parse(load(image)?).await)
        }
        Command::Damage { image, location } => render(
            client
                .parser::<DamageDetectionResponse>()
                .parse_with(load(image)?, &parse_options(location))
                .await,
        ),
        Command::Dashboard { image } => {
            render(client.parser::<DashboardAnalysisResponse>().parse(load(image)?).await)
        }
        Command::Compare { before, after, location } => render(
            client
                .parser::<DamageComparisonResponse>()
                .compare_with(load(before)?, load(after)?, &parse_options(location))
                .await,
        ),
    }
}

fn run_blocking(config: ClientConfig, command: &Command) -> Result<Value> {
    let client = BlockingVisionClient::new(config)?;
    match command {
        Command::License { image } => {
            render(client.parser::<LicenseOcrResponse>().parse(load(image)?))
        }
        Command::Insurance { image } => {
            render(client.parser::<InsuranceOcrResponse>().parse(load(image)?))
        }
        Command::Damage { image, location } => render(
            client
                .parser::<DamageDetectionResponse>()
                .parse_with(load(image)?, &parse_options(location)),
        ),
        Command::Dashboard { image } => {
            render(client.parser::<DashboardAnalysisResponse>().parse(load(image)?))
        }
        Command::Compare { before, after, location } => render(
            client
                .parser::<DamageComparisonResponse>()
                .compare_with(load(before)?, load(after)?, &parse_options(location)),
        ),
    }
}

fn load(path: &Path) -> Result<ImageInput> {
    let image = ImageInput::from_path(path).with_context(|| format!("reading {}", path.display()))?;
    debug!(path = %path.display(), media_type = %image.media_type, bytes = image.data.len(), "loaded image");
    Ok(image)
}

fn render<D: Serialize>(result: Result<D, VisionError>) -> Result<Value> {
    match result {
        Ok(record) => Ok(serde_json::to_value(record)?),
        Err(err) => {
            if let Some(raw) = err.raw() {
                debug!(raw = %raw, "provider output");
            }
            Err(anyhow::anyhow!("{:?} failure: {err}", err.kind()))
        }
    }
}
