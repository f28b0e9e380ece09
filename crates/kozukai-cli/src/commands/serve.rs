//! Server command implementation

use anyhow::Result;
use kozukai_core::{Config, SourceConfig};

use super::open_source;

pub async fn cmd_serve(config: &Config, host: &str, port: u16) -> Result<()> {
    println!("🚀 Starting kozukai API server...");
    match &config.source {
        SourceConfig::Csv { path } => println!("   Source: CSV {}", path.display()),
        SourceConfig::Sheet {
            url_or_id,
            worksheet,
            access_token,
        } => {
            println!("   Source: sheet {} ({})", url_or_id, worksheet);
            if access_token.is_some() {
                println!("   🔑 Access token: set (KOZUKAI_SHEET_TOKEN)");
            }
        }
    }
    println!("   Cache TTL: {}s", config.cache_ttl.as_secs());
    println!("   Listening: http://{}:{}/api", host, port);
    println!();
    println!("   Press Ctrl+C to stop");

    let source = open_source(config)?;
    kozukai_server::serve(source, config.cache_ttl, host, port).await?;

    Ok(())
}
