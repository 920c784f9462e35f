use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use rentscan_ai::{ClientConfig, ParseOptions};

#[derive(Parser, Debug)]
#[command(name = "rentscan")]
#[command(about = "Read rental documents and vehicle photos with a vision model")]
#[command(version)]
pub struct Cli {
    #[command(flatten)]
    pub client: ClientArgs,

    /// Use the blocking HTTP client instead of the async one
    #[arg(long, global = true)]
    pub blocking: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Args, Debug)]
pub struct ClientArgs {
    /// OpenRouter API key
    #[arg(long, env = "OPENROUTER_API_KEY", hide_env_values = true)]
    pub api_key: String,

    /// Model id, e.g. anthropic/claude-3.5-sonnet
    #[arg(long, env = "RENTSCAN_MODEL")]
    pub model: Option<String>,

    /// Chat completions endpoint
    #[arg(long, env = "RENTSCAN_ENDPOINT")]
    pub endpoint: Option<String>,

    /// Request timeout in seconds
    #[arg(long, env = "RENTSCAN_TIMEOUT_SECS", default_value_t = 60)]
    pub timeout: u64,

    /// Sent as HTTP-Referer
    #[arg(long)]
    pub site_url: Option<String>,

    /// Sent as X-Title
    #[arg(long)]
    pub site_name: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Extract the fields of a driver's license
    License { image: PathBuf },
    /// Extract the fields of an auto insurance card
    Insurance { image: PathBuf },
    /// Find damage in a vehicle photo
    Damage {
        image: PathBuf,
        /// Vehicle area the photo shows
        #[arg(long)]
        location: Option<String>,
    },
    /// Read mileage, fuel level and warning lights from a dashboard photo
    Dashboard { image: PathBuf },
    /// Find damage present at checkin that was not there at checkout
    Compare {
        before: PathBuf,
        after: PathBuf,
        /// Vehicle area both photos show
        #[arg(long)]
        location: Option<String>,
    },
}

impl ClientArgs {
    pub fn to_config(&self) -> ClientConfig {
        let mut config = ClientConfig::new(&self.api_key)
            .with_timeout(Duration::from_secs(self.timeout));
        if let Some(model) = &self.model {
            config = config.with_model(model);
        }
        if let Some(endpoint) = &self.endpoint {
            config = config.with_endpoint(endpoint);
        }
        if let Some(url) = &self.site_url {
            config = config.with_site_url(url);
        }
        if let Some(name) = &self.site_name {
            config = config.with_site_name(name);
        }
        config
    }
}

pub fn parse_options(location: &Option<String>) -> ParseOptions {
    ParseOptions {
        location: location.clone(),
        model: None,
    }
}
