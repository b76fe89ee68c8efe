pub mod commands;
pub mod config;
pub mod utils;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use crate::assets::{AssetPipeline, OptimizeOptions};
use crate::forms::SubmitError;
use crate::gateway::rest::RestClient;
use crate::gateway::{ClientGateway, DishGateway, GatewayError, IdentityProvider, SiteGateway};
use crate::session::{GateDecision, SessionContext, SessionGate};

#[derive(Parser)]
#[command(name = "kitchen")]
#[command(about = "Kitchen CLI - operator dashboard for the Cloud Kitchen API")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in human-readable text format")]
    pub text: bool,

    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[arg(long, global = true, help = "Server URL for this invocation (overrides the saved one)")]
    pub server: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Backend server selection and health")]
    Server {
        #[command(subcommand)]
        cmd: commands::server::ServerCommands,
    },

    #[command(about = "Sign up, sign in and session management")]
    Auth {
        #[command(subcommand)]
        cmd: commands::auth::AuthCommands,
    },

    #[command(about = "Account settings of the signed-in operator")]
    Account {
        #[command(subcommand)]
        cmd: commands::account::AccountCommands,
    },

    #[command(about = "Menu items: list, add, edit, delete")]
    Dish {
        #[command(subcommand)]
        cmd: commands::dish::DishCommands,
    },

    #[command(about = "Generated menu board grouped by category")]
    Menu {
        #[command(subcommand)]
        cmd: commands::menu::MenuCommands,
    },

    #[command(about = "Storefront document editor")]
    Site {
        #[command(subcommand)]
        cmd: commands::site::SiteCommands,
    },

    #[command(about = "Create the storefront for this account")]
    Onboard(commands::onboard::OnboardArgs),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_cli(cli: &Cli) -> Self {
        if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

/// Everything a command needs: the backend client, the cached session and
/// the asset pipeline writing through the same client.
pub struct Dashboard {
    pub api: Arc<RestClient>,
    pub session: SessionContext,
    pub pipeline: AssetPipeline,
}

impl Dashboard {
    pub fn open(server_override: Option<&str>) -> anyhow::Result<Self> {
        let server_url = match server_override {
            Some(url) => url.to_string(),
            None => config::load_cli_config()?.server_url,
        };

        let api = Arc::new(RestClient::new(server_url)?);
        let session = SessionContext::load(config::session_store()?)?;
        api.set_token(session.session().map(|s| s.access_token.clone()));

        let options = OptimizeOptions::from(&crate::config::config().assets);
        let pipeline = AssetPipeline::new(api.clone()).with_options(options);

        Ok(Self { api, session, pipeline })
    }

    /// The signed-in owner, or an error pointing at the sign-in route
    pub fn owner(&self) -> anyhow::Result<Uuid> {
        match SessionGate::check(&self.session) {
            GateDecision::Admit(id) => Ok(id),
            GateDecision::Redirect(route) => Err(anyhow::anyhow!(
                "not signed in (redirected to {}); run `kitchen auth signin` first",
                route
            )),
        }
    }

    pub fn identity(&self) -> &dyn IdentityProvider {
        self.api.as_ref()
    }

    pub fn dishes(&self) -> &dyn DishGateway {
        self.api.as_ref()
    }

    pub fn clients(&self) -> &dyn ClientGateway {
        self.api.as_ref()
    }

    pub fn sites(&self) -> &dyn SiteGateway {
        self.api.as_ref()
    }
}

/// Prints per-field problems of a rejected submit before handing the error up
pub(crate) fn report_submit_error(output_format: &OutputFormat, err: SubmitError) -> anyhow::Error {
    match &err {
        SubmitError::Invalid(errors) if !errors.is_empty() => {
            if let Err(e) = utils::output_field_errors(output_format, errors) {
                return e;
            }
            anyhow::anyhow!("validation failed")
        }
        SubmitError::Gateway(GatewayError::Rejected { field_errors, .. }) if !field_errors.is_empty() => {
            for (field, message) in field_errors {
                eprintln!("  {}: {}", field, message);
            }
            err.into()
        }
        _ => err.into(),
    }
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);
    let server = cli.server.as_deref();

    match cli.command {
        Commands::Server { cmd } => commands::server::handle(cmd, server, output_format).await,
        Commands::Auth { cmd } => commands::auth::handle(cmd, Dashboard::open(server)?, output_format).await,
        Commands::Account { cmd } => commands::account::handle(cmd, Dashboard::open(server)?, output_format).await,
        Commands::Dish { cmd } => commands::dish::handle(cmd, Dashboard::open(server)?, output_format).await,
        Commands::Menu { cmd } => commands::menu::handle(cmd, Dashboard::open(server)?, output_format).await,
        Commands::Site { cmd } => commands::site::handle(cmd, Dashboard::open(server)?, output_format).await,
        Commands::Onboard(args) => commands::onboard::handle(args, Dashboard::open(server)?, output_format).await,
    }
}
