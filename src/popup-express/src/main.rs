//! Popup Express: conditional popup overlays for content sites.
//!
//! Loads the popup catalog and either serves the footer block over HTTP or
//! renders it once for a given page context.

use anyhow::Context;
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand, ValueEnum};
use popup_api::ApiServer;
use popup_core::config::AppConfig;
use popup_core::store::InMemoryPopupStore;
use popup_core::types::{DeviceClass, PageContext};
use popup_eligibility::{EligibilityEngine, MarkupRenderer};
use std::sync::Arc;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "popup-express")]
#[command(about = "Conditional popup overlays: eligibility filtering and footer rendering")]
#[command(version)]
struct Cli {
    /// Popup catalog JSON file (overrides config)
    #[arg(long, env = "POPUP_EXPRESS__CATALOG__PATH")]
    catalog: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve the render endpoints over HTTP
    Serve {
        /// HTTP port (overrides config)
        #[arg(long, env = "POPUP_EXPRESS__API__HTTP_PORT")]
        http_port: Option<u16>,
    },
    /// Print the footer block for one page view
    Render {
        #[arg(long)]
        page_id: Option<u64>,

        #[arg(long, default_value_t = false)]
        homepage: bool,

        #[arg(long, value_enum, default_value_t = DeviceArg::Desktop)]
        device: DeviceArg,

        /// Locale code (defaults to the site locale)
        #[arg(long)]
        locale: Option<String>,

        /// Evaluation time as RFC 3339 (defaults to now)
        #[arg(long)]
        now: Option<String>,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum DeviceArg {
    Desktop,
    Mobile,
}

impl From<DeviceArg> for DeviceClass {
    fn from(arg: DeviceArg) -> Self {
        match arg {
            DeviceArg::Desktop => DeviceClass::Desktop,
            DeviceArg::Mobile => DeviceClass::Mobile,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr so `render` output stays clean.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "popup_express=info,tower_http=info".into()),
        )
        .with_writer(std::io::stderr)
        .json()
        .init();

    let cli = Cli::parse();

    let mut config = AppConfig::load().unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Failed to load config, using defaults");
        AppConfig::default()
    });
    if let Some(path) = cli.catalog {
        config.catalog.path = path;
    }

    let site_offset = config.site.utc_offset()?;
    let store = InMemoryPopupStore::load_json_file(&config.catalog.path, site_offset)
        .with_context(|| format!("loading popup catalog {}", config.catalog.path))?;
    info!(
        path = %config.catalog.path,
        popups = store.len(),
        utc_offset = %site_offset,
        "Catalog ready"
    );

    let engine = Arc::new(EligibilityEngine::new(
        Arc::new(store),
        MarkupRenderer::new(config.presentation.class_prefix.clone()),
    ));

    match cli.command {
        Command::Serve { http_port } => {
            if let Some(port) = http_port {
                config.api.http_port = port;
            }
            info!(
                host = %config.api.host,
                http_port = config.api.http_port,
                "Configuration loaded"
            );
            ApiServer::new(config, engine).start_http().await?;
        }
        Command::Render {
            page_id,
            homepage,
            device,
            locale,
            now,
        } => {
            let now = match now {
                Some(raw) => DateTime::parse_from_rfc3339(&raw)
                    .with_context(|| format!("invalid --now value {raw}"))?
                    .with_timezone(&Utc),
                None => Utc::now(),
            };
            let ctx = PageContext {
                page_id,
                is_homepage: homepage,
                device_class: device.into(),
                locale: locale.unwrap_or_else(|| config.site.default_locale.clone()),
                now,
            };
            print!("{}", engine.render(&ctx));
        }
    }

    Ok(())
}
