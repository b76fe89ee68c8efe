use clap::Subcommand;
use serde_json::json;

use crate::cli::config::{load_cli_config, ping_server, save_cli_config, ServerStatus};
use crate::cli::utils::{output_success, output_value};
use crate::cli::OutputFormat;
use crate::gateway::rest::RestClient;

#[derive(Subcommand)]
pub enum ServerCommands {
    #[command(about = "Save the backend URL used by every other command")]
    Set {
        #[arg(help = "Server URL, e.g. http://localhost:3000")]
        url: String,
    },

    #[command(about = "Show the saved backend URL and its last known status")]
    Show,

    #[command(about = "Check that the backend answers on /health")]
    Ping,

    #[command(about = "Show the backend health report")]
    Health,
}

pub async fn handle(cmd: ServerCommands, server: Option<&str>, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        ServerCommands::Set { url } => {
            url::Url::parse(&url).map_err(|e| anyhow::anyhow!("invalid server URL '{}': {}", url, e))?;

            let mut config = load_cli_config()?;
            config.set_server(&url);
            save_cli_config(&config)?;

            output_success(
                &output_format,
                &format!("Server set to {}", config.server_url),
                Some(json!({ "server_url": config.server_url })),
            )
        }
        ServerCommands::Show => {
            let config = load_cli_config()?;
            let text = format!(
                "Server: {}\nStatus: {:?}\nLast ping: {}",
                config.server_url,
                config.status,
                config
                    .last_ping
                    .map(|t| t.to_rfc3339())
                    .unwrap_or_else(|| "never".to_string())
            );
            output_value(&output_format, &serde_json::to_value(&config)?, &text)
        }
        ServerCommands::Ping => {
            let mut config = load_cli_config()?;
            let target = server.map(str::to_string).unwrap_or_else(|| config.server_url.clone());
            let status = ping_server(&target).await;

            // Only the saved server's status is recorded
            if server.is_none() {
                config.update_ping(status.clone());
                save_cli_config(&config)?;
            }

            match status {
                ServerStatus::Up => output_success(
                    &output_format,
                    &format!("{} is up", target),
                    Some(json!({ "server_url": target, "status": status })),
                ),
                _ => Err(anyhow::anyhow!("{} is not reachable", target)),
            }
        }
        ServerCommands::Health => {
            let target = match server {
                Some(url) => url.to_string(),
                None => load_cli_config()?.server_url,
            };
            let report = RestClient::new(target)?.health().await?;
            let text = format!(
                "Status: {}\nDatabase: {}",
                report["status"].as_str().unwrap_or("unknown"),
                report["database"].as_str().unwrap_or("unknown")
            );
            output_value(&output_format, &report, &text)
        }
    }
}
