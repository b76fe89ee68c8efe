use tracing::info;

use super::{is_valid_email, FieldErrors, Form, Schema, SubmitError, Submission};
use crate::gateway::ClientGateway;
use crate::models::{ClientProfile, Gender, MaritalStatus};
use crate::session::SessionContext;

/// Profile fields shared by sign-up and account settings
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProfileValues {
    pub email: String,
    pub name: String,
    pub age: String,
    pub phone_number: String,
    pub dob: String,
    pub nationality: String,
    pub gender: String,
    pub marital_status: String,
}

impl From<&ClientProfile> for ProfileValues {
    fn from(profile: &ClientProfile) -> Self {
        Self {
            email: profile.email.clone(),
            name: profile.name.clone(),
            age: profile.age.to_string(),
            phone_number: profile.phone_number.clone(),
            dob: profile.dob.clone(),
            nationality: profile.nationality.clone(),
            gender: profile.gender.map(|g| label_of_gender(g).to_string()).unwrap_or_default(),
            marital_status: profile
                .marital_status
                .map(|m| label_of_marital(m).to_string())
                .unwrap_or_default(),
        }
    }
}

fn label_of_gender(g: Gender) -> &'static str {
    match g {
        Gender::Male => "male",
        Gender::Female => "female",
    }
}

fn label_of_marital(m: MaritalStatus) -> &'static str {
    match m {
        MaritalStatus::Single => "single",
        MaritalStatus::Married => "married",
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileDetails {
    pub email: String,
    pub name: String,
    pub age: u32,
    pub phone_number: String,
    pub dob: String,
    pub nationality: String,
    pub gender: Option<Gender>,
    pub marital_status: Option<MaritalStatus>,
}

impl ProfileDetails {
    pub fn apply_to(&self, profile: &mut ClientProfile) {
        profile.email = self.email.clone();
        profile.name = self.name.clone();
        profile.age = self.age;
        profile.phone_number = self.phone_number.clone();
        profile.dob = self.dob.clone();
        profile.nationality = self.nationality.clone();
        profile.gender = self.gender;
        profile.marital_status = self.marital_status;
    }
}

/// Checks profile fields. With `choices_required` false, an empty gender or
/// marital status is accepted as "not given".
pub(crate) fn validate_profile(
    values: &ProfileValues,
    choices_required: bool,
    errors: &mut FieldErrors,
) -> Option<ProfileDetails> {
    if !is_valid_email(&values.email) {
        errors.add("email", "Invalid email address");
    }
    errors.require("name", &values.name, "Name is required");

    let age = values.age.trim().parse::<u32>().ok().filter(|a| *a > 0);
    if age.is_none() {
        errors.add("age", "Age must be a positive number");
    }

    let phone = values.phone_number.trim();
    if phone.chars().count() != 10 {
        errors.add("phone_number", "Phone number must be 10 digits");
    } else if !phone.chars().all(|c| c.is_ascii_digit()) {
        errors.add("phone_number", "Phone number must be numeric");
    }

    errors.require("dob", &values.dob, "Date of birth is required");
    errors.require("nationality", &values.nationality, "Nationality is required");

    let gender = parse_choice::<Gender>(&values.gender, choices_required);
    if gender.is_err() {
        errors.add("gender", "Gender is required");
    }
    let marital_status = parse_choice::<MaritalStatus>(&values.marital_status, choices_required);
    if marital_status.is_err() {
        errors.add("marital_status", "Marital status is required");
    }

    Some(ProfileDetails {
        email: values.email.trim().to_lowercase(),
        name: values.name.trim().to_string(),
        age: age?,
        phone_number: phone.to_string(),
        dob: values.dob.trim().to_string(),
        nationality: values.nationality.trim().to_string(),
        gender: gender.ok()?,
        marital_status: marital_status.ok()?,
    })
}

fn parse_choice<T: std::str::FromStr>(raw: &str, required: bool) -> Result<Option<T>, ()> {
    let raw = raw.trim();
    if raw.is_empty() {
        return if required { Err(()) } else { Ok(None) };
    }
    raw.parse::<T>().map(Some).map_err(|_| ())
}

pub struct AccountSchema;

impl Schema for AccountSchema {
    type Values = ProfileValues;
    type Output = ProfileDetails;

    fn validate(values: &ProfileValues) -> Result<ProfileDetails, FieldErrors> {
        let mut errors = FieldErrors::new();
        let details = validate_profile(values, true, &mut errors);
        match details {
            Some(details) if errors.is_empty() => Ok(details),
            _ => Err(errors),
        }
    }
}

pub type AccountForm = Form<AccountSchema>;

/// Seeds the account-settings form from the stored profile
pub fn account_form(profile: &ClientProfile) -> AccountForm {
    Form::edit(profile.user_id, ProfileValues::from(profile))
}

/// Validates and writes the account form; the cached client is refreshed on success
pub async fn submit_account(
    form: &mut AccountForm,
    current: &ClientProfile,
    clients: &dyn ClientGateway,
    ctx: &mut SessionContext,
) -> Result<Option<ClientProfile>, SubmitError> {
    let details = match form.submit()? {
        Submission::Unchanged => return Ok(None),
        Submission::Update(_, details) | Submission::Insert(details) => details,
    };

    let mut profile = current.clone();
    details.apply_to(&mut profile);

    let saved = match clients.update(&profile).await {
        Ok(saved) => saved,
        Err(e) => {
            form.reopen();
            return Err(e.into());
        }
    };
    form.complete();
    ctx.set_client(saved.clone())?;

    info!("Updated account details for {}", saved.user_id);
    Ok(Some(saved))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forms::FormState;
    use crate::gateway::memory::MemoryBackend;
    use crate::session::FileStore;
    use crate::testing::sample_profile;
    use uuid::Uuid;

    #[test]
    fn phone_must_be_ten_digits() {
        let profile = sample_profile(Uuid::new_v4());
        let mut values = ProfileValues::from(&profile);
        values.phone_number = "12345".to_string();
        let errors = AccountSchema::validate(&values).unwrap_err();
        assert_eq!(errors.get("phone_number"), Some("Phone number must be 10 digits"));

        values.phone_number = "12345abcde".to_string();
        let errors = AccountSchema::validate(&values).unwrap_err();
        assert_eq!(errors.get("phone_number"), Some("Phone number must be numeric"));
    }

    #[test]
    fn account_requires_gender_and_marital_status() {
        let mut values = ProfileValues::from(&sample_profile(Uuid::new_v4()));
        values.gender.clear();
        values.marital_status = "divorced".to_string();
        let errors = AccountSchema::validate(&values).unwrap_err();
        assert!(errors.contains("gender"));
        assert!(errors.contains("marital_status"));
    }

    #[tokio::test]
    async fn untouched_account_form_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let mut ctx = SessionContext::load(FileStore::new(dir.path().join("s.json"))).unwrap();
        let backend = MemoryBackend::new();
        let profile = sample_profile(Uuid::new_v4());
        ClientGateway::insert(&backend, &profile).await.unwrap();
        let writes_before = backend.stats().client_writes;

        let mut form = account_form(&profile);
        let out = submit_account(&mut form, &profile, &backend, &mut ctx).await.unwrap();
        assert!(out.is_none());
        assert_eq!(backend.stats().client_writes, writes_before);
    }

    #[tokio::test]
    async fn edited_account_is_saved_and_cached() {
        let dir = tempfile::tempdir().unwrap();
        let mut ctx = SessionContext::load(FileStore::new(dir.path().join("s.json"))).unwrap();
        let backend = MemoryBackend::new();
        let profile = sample_profile(Uuid::new_v4());
        ClientGateway::insert(&backend, &profile).await.unwrap();

        let mut form = account_form(&profile);
        form.update(|v| v.nationality = "Kenyan".to_string());
        let saved = submit_account(&mut form, &profile, &backend, &mut ctx).await.unwrap().unwrap();

        assert_eq!(saved.nationality, "Kenyan");
        assert_eq!(ctx.client().unwrap().nationality, "Kenyan");
        assert_eq!(form.state(), FormState::Closed);
    }
}
