use clap::{Args, Subcommand};

use crate::cli::utils::{output_success, output_value};
use crate::cli::{report_submit_error, Dashboard, OutputFormat};
use crate::forms::account::{account_form, submit_account, ProfileValues};
use crate::models::ClientProfile;

#[derive(Args, Default)]
pub struct ProfileChanges {
    #[arg(long)]
    pub email: Option<String>,
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long)]
    pub age: Option<String>,
    #[arg(long)]
    pub phone: Option<String>,
    #[arg(long)]
    pub dob: Option<String>,
    #[arg(long)]
    pub nationality: Option<String>,
    #[arg(long, help = "male or female")]
    pub gender: Option<String>,
    #[arg(long, help = "single or married")]
    pub marital_status: Option<String>,
}

impl ProfileChanges {
    fn apply(self, values: &mut ProfileValues) {
        let fields = [
            (self.email, &mut values.email),
            (self.name, &mut values.name),
            (self.age, &mut values.age),
            (self.phone, &mut values.phone_number),
            (self.dob, &mut values.dob),
            (self.nationality, &mut values.nationality),
            (self.gender, &mut values.gender),
            (self.marital_status, &mut values.marital_status),
        ];
        for (change, field) in fields {
            if let Some(value) = change {
                *field = value;
            }
        }
    }
}

#[derive(Subcommand)]
pub enum AccountCommands {
    #[command(about = "Show the client profile")]
    Show,

    #[command(about = "Change profile fields; unspecified fields keep their value")]
    Update(ProfileChanges),
}

fn describe(profile: &ClientProfile) -> String {
    let values = ProfileValues::from(profile);
    format!(
        "Name: {}\nEmail: {}\nAge: {}\nPhone: {}\nDate of birth: {}\nNationality: {}\nGender: {}\nMarital status: {}\nWebsite: {}",
        values.name,
        values.email,
        values.age,
        values.phone_number,
        values.dob,
        values.nationality,
        values.gender,
        values.marital_status,
        profile
            .cloud_kitchen_website_id
            .map(|id| id.to_string())
            .unwrap_or_else(|| "not onboarded".to_string())
    )
}

async fn current_profile(dash: &Dashboard) -> anyhow::Result<ClientProfile> {
    let owner = dash.owner()?;
    match dash.clients().fetch(owner).await? {
        Some(profile) => Ok(profile),
        None => Err(anyhow::anyhow!("no client profile exists for {}", owner)),
    }
}

pub async fn handle(cmd: AccountCommands, mut dash: Dashboard, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        AccountCommands::Show => {
            let profile = current_profile(&dash).await?;
            output_value(&output_format, &serde_json::to_value(&profile)?, &describe(&profile))
        }
        AccountCommands::Update(changes) => {
            let current = current_profile(&dash).await?;
            let mut form = account_form(&current);
            form.update(|values| changes.apply(values));

            let api = dash.api.clone();
            let saved = submit_account(&mut form, &current, api.as_ref(), &mut dash.session)
                .await
                .map_err(|e| report_submit_error(&output_format, e))?;

            match saved {
                Some(profile) => output_success(
                    &output_format,
                    "Account updated",
                    Some(serde_json::to_value(&profile)?),
                ),
                None => output_success(&output_format, "No changes to save", None),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::sample_profile;
    use uuid::Uuid;

    #[test]
    fn only_given_fields_change() {
        let profile = sample_profile(Uuid::new_v4());
        let mut values = ProfileValues::from(&profile);
        ProfileChanges {
            name: Some("Asha Rao".to_string()),
            gender: Some("female".to_string()),
            ..Default::default()
        }
        .apply(&mut values);

        assert_eq!(values.name, "Asha Rao");
        assert_eq!(values.gender, "female");
        assert_eq!(values.email, profile.email);
        assert_eq!(values.phone_number, profile.phone_number);
    }
}
