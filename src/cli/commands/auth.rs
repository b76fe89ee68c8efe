use clap::{Args, Subcommand};
use serde_json::json;

use crate::cli::utils::{output_success, output_value, prompt_line, value_or_prompt};
use crate::cli::{report_submit_error, Dashboard, OutputFormat};
use crate::forms::account::ProfileValues;
use crate::forms::auth::{sign_out, submit_sign_in, submit_sign_up, SignInForm, SignInValues, SignUpForm, SignUpValues};
use crate::session::{GateDecision, SessionGate};

#[derive(Args)]
pub struct SignUpArgs {
    #[arg(help = "Email address")]
    pub email: String,
    #[arg(long, help = "Full name")]
    pub name: String,
    #[arg(long, help = "Age in years")]
    pub age: String,
    #[arg(long, help = "Ten digit phone number")]
    pub phone: String,
    #[arg(long, help = "Date of birth")]
    pub dob: String,
    #[arg(long, help = "Nationality")]
    pub nationality: String,
    #[arg(long, help = "male or female")]
    pub gender: Option<String>,
    #[arg(long, help = "single or married")]
    pub marital_status: Option<String>,
    #[arg(long, help = "Password (will prompt if not provided)")]
    pub password: Option<String>,
}

#[derive(Subcommand)]
pub enum AuthCommands {
    #[command(about = "Create an account and its client profile")]
    Signup(SignUpArgs),

    #[command(about = "Sign in and cache the session")]
    Signin {
        #[arg(help = "Email address")]
        email: String,
        #[arg(long, help = "Password (will prompt if not provided)")]
        password: Option<String>,
    },

    #[command(about = "Sign out and clear the cached session")]
    Signout,

    #[command(about = "Show the cached session")]
    Status,

    #[command(about = "Ask the server who the cached token belongs to")]
    Whoami,
}

pub async fn handle(cmd: AuthCommands, mut dash: Dashboard, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        AuthCommands::Signup(args) => {
            let (password, re_enter_password) = match args.password {
                Some(password) => (password.clone(), password),
                None => (prompt_line("Password: ")?, prompt_line("Re-enter password: ")?),
            };

            let mut form = SignUpForm::create(SignUpValues {
                password,
                re_enter_password,
                profile: ProfileValues {
                    email: args.email,
                    name: args.name,
                    age: args.age,
                    phone_number: args.phone,
                    dob: args.dob,
                    nationality: args.nationality,
                    gender: args.gender.unwrap_or_default(),
                    marital_status: args.marital_status.unwrap_or_default(),
                },
            });

            let api = dash.api.clone();
            let session = submit_sign_up(&mut form, api.as_ref(), api.as_ref(), &mut dash.session)
                .await
                .map_err(|e| report_submit_error(&output_format, e))?;

            output_success(
                &output_format,
                &format!("Signed up as {}", session.user.email),
                Some(json!({ "user": session.user, "expires_at": session.expires_at })),
            )
        }
        AuthCommands::Signin { email, password } => {
            let password = value_or_prompt(password, "Password: ")?;
            let mut form = SignInForm::create(SignInValues { email, password });

            let api = dash.api.clone();
            let session = submit_sign_in(&mut form, api.as_ref(), api.as_ref(), &mut dash.session)
                .await
                .map_err(|e| report_submit_error(&output_format, e))?;

            output_success(
                &output_format,
                &format!("Signed in as {}", session.user.email),
                Some(json!({ "user": session.user, "expires_at": session.expires_at })),
            )
        }
        AuthCommands::Signout => {
            let api = dash.api.clone();
            sign_out(api.as_ref(), &mut dash.session).await?;
            output_success(&output_format, "Signed out", None)
        }
        AuthCommands::Status => match (SessionGate::check(&dash.session), dash.session.session()) {
            (GateDecision::Admit(_), Some(session)) => {
                let text = format!(
                    "Signed in as {} ({})\nToken expires: {}\nProfile cached: {}",
                    session.user.email,
                    session.user.id,
                    session.expires_at.to_rfc3339(),
                    if dash.session.client().is_some() { "yes" } else { "no" }
                );
                let data = json!({
                    "signed_in": true,
                    "user": session.user,
                    "expires_at": session.expires_at,
                    "client": dash.session.client(),
                });
                output_value(&output_format, &data, &text)
            }
            _ => output_value(&output_format, &json!({ "signed_in": false }), "Not signed in"),
        },
        AuthCommands::Whoami => {
            dash.owner()?;
            let user = dash.api.whoami().await?;
            output_value(
                &output_format,
                &serde_json::to_value(&user)?,
                &format!("{} ({})", user.email, user.id),
            )
        }
    }
}
