//! Entity forms: schema validation plus the shared submit state machine.
//!
//! A form holds raw operator input (strings, mostly). `submit` validates the
//! whole set at once; any field error blocks the write. A valid submit in
//! create mode yields an insert, in edit mode an update, unless nothing was
//! touched, in which case there is nothing to send.

pub mod account;
pub mod auth;
pub mod dish;
pub mod onboarding;

use rust_decimal::Decimal;
use std::collections::{BTreeMap, HashMap};
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

use crate::assets::AssetError;
use crate::gateway::GatewayError;
use crate::session::SessionError;

/// Per-field validation messages; first message per field wins
#[derive(Debug, Clone, Default, PartialEq, Eq, Error)]
#[error("{} field(s) failed validation", .errors.len())]
pub struct FieldErrors {
    errors: BTreeMap<String, String>,
}

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.errors.entry(field.to_string()).or_insert_with(|| message.into());
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.errors.get(field).map(String::as_str)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.errors.contains_key(field)
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.errors.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn into_map(self) -> HashMap<String, String> {
        self.errors.into_iter().collect()
    }

    /// `Ok(value)` when nothing was recorded
    pub fn finish<T>(self, value: impl FnOnce() -> T) -> Result<T, FieldErrors> {
        if self.is_empty() {
            Ok(value())
        } else {
            Err(self)
        }
    }

    pub fn require(&mut self, field: &str, value: &str, message: &str) -> bool {
        if value.trim().is_empty() {
            self.add(field, message);
            false
        } else {
            true
        }
    }
}

impl From<FieldErrors> for GatewayError {
    fn from(errors: FieldErrors) -> Self {
        GatewayError::Rejected {
            message: errors.to_string(),
            field_errors: errors.into_map(),
        }
    }
}

pub(crate) fn is_valid_email(email: &str) -> bool {
    let email = email.trim();
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.split('.').count() >= 2
                && domain.split('.').all(|part| !part.is_empty())
        }
        None => false,
    }
}

/// Parses a non-negative decimal, accepting surrounding whitespace
pub(crate) fn non_negative_number(value: &str) -> Option<Decimal> {
    Decimal::from_str(value.trim()).ok().filter(|d| !d.is_sign_negative())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormState {
    Pristine,
    Editing,
    Validating,
    Invalid,
    Submitting,
    Closed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormMode {
    Create,
    Edit(Uuid),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Submission<T> {
    Insert(T),
    Update(Uuid, T),
    Unchanged,
}

/// Field rules of one entity type
pub trait Schema {
    type Values: Clone + PartialEq;
    type Output;

    fn validate(values: &Self::Values) -> Result<Self::Output, FieldErrors>;
}

#[derive(Debug, Error)]
pub enum SubmitError {
    #[error(transparent)]
    Invalid(#[from] FieldErrors),

    #[error(transparent)]
    Asset(#[from] AssetError),

    #[error(transparent)]
    Gateway(#[from] GatewayError),

    #[error(transparent)]
    Session(#[from] SessionError),
}

pub struct Form<S: Schema> {
    mode: FormMode,
    initial: S::Values,
    values: S::Values,
    state: FormState,
    errors: FieldErrors,
}

impl<S: Schema> Form<S> {
    pub fn create(defaults: S::Values) -> Self {
        Self::with_mode(FormMode::Create, defaults)
    }

    pub fn edit(id: Uuid, seed: S::Values) -> Self {
        Self::with_mode(FormMode::Edit(id), seed)
    }

    fn with_mode(mode: FormMode, values: S::Values) -> Self {
        Self {
            mode,
            initial: values.clone(),
            values,
            state: FormState::Pristine,
            errors: FieldErrors::new(),
        }
    }

    pub fn mode(&self) -> FormMode {
        self.mode
    }

    pub fn state(&self) -> FormState {
        self.state
    }

    pub fn values(&self) -> &S::Values {
        &self.values
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    pub fn is_dirty(&self) -> bool {
        self.values != self.initial
    }

    pub fn update(&mut self, f: impl FnOnce(&mut S::Values)) {
        f(&mut self.values);
        if self.state != FormState::Closed {
            self.state = FormState::Editing;
        }
    }

    /// Validates everything and decides what, if anything, to write
    pub fn submit(&mut self) -> Result<Submission<S::Output>, FieldErrors> {
        self.state = FormState::Validating;

        let output = match S::validate(&self.values) {
            Ok(output) => output,
            Err(errors) => {
                self.state = FormState::Invalid;
                self.errors = errors.clone();
                return Err(errors);
            }
        };
        self.errors = FieldErrors::new();

        match self.mode {
            FormMode::Edit(_) if !self.is_dirty() => {
                self.state = FormState::Closed;
                Ok(Submission::Unchanged)
            }
            FormMode::Edit(id) => {
                self.state = FormState::Submitting;
                Ok(Submission::Update(id, output))
            }
            FormMode::Create => {
                self.state = FormState::Submitting;
                Ok(Submission::Insert(output))
            }
        }
    }

    /// The write went through
    pub fn complete(&mut self) {
        self.initial = self.values.clone();
        self.state = FormState::Closed;
    }

    /// The write failed; input is kept for another attempt
    pub fn reopen(&mut self) {
        self.state = FormState::Editing;
    }

    pub fn cancel(&mut self) {
        self.values = self.initial.clone();
        self.state = FormState::Closed;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq, Default)]
    struct NameValues {
        name: String,
    }

    struct NameSchema;

    impl Schema for NameSchema {
        type Values = NameValues;
        type Output = String;

        fn validate(values: &NameValues) -> Result<String, FieldErrors> {
            let mut errors = FieldErrors::new();
            errors.require("name", &values.name, "Name is required");
            errors.finish(|| values.name.trim().to_string())
        }
    }

    #[test]
    fn create_mode_yields_insert() {
        let mut form: Form<NameSchema> = Form::create(NameValues::default());
        assert_eq!(form.state(), FormState::Pristine);
        form.update(|v| v.name = "Spice Hub".to_string());
        assert_eq!(form.state(), FormState::Editing);
        assert_eq!(form.submit().unwrap(), Submission::Insert("Spice Hub".to_string()));
        assert_eq!(form.state(), FormState::Submitting);
        form.complete();
        assert_eq!(form.state(), FormState::Closed);
    }

    #[test]
    fn invalid_input_blocks_submission() {
        let mut form: Form<NameSchema> = Form::create(NameValues::default());
        let errors = form.submit().unwrap_err();
        assert_eq!(errors.get("name"), Some("Name is required"));
        assert_eq!(form.state(), FormState::Invalid);

        form.update(|v| v.name = "x".to_string());
        assert_eq!(form.state(), FormState::Editing);
    }

    #[test]
    fn untouched_edit_is_unchanged() {
        let id = Uuid::new_v4();
        let mut form: Form<NameSchema> = Form::edit(id, NameValues { name: "Pho".to_string() });
        assert_eq!(form.submit().unwrap(), Submission::Unchanged);
        assert_eq!(form.state(), FormState::Closed);

        let mut form: Form<NameSchema> = Form::edit(id, NameValues { name: "Pho".to_string() });
        form.update(|v| v.name = "Bun Cha".to_string());
        assert_eq!(form.submit().unwrap(), Submission::Update(id, "Bun Cha".to_string()));
    }

    #[test]
    fn email_format() {
        assert!(is_valid_email("chef@example.com"));
        assert!(!is_valid_email("chef@example"));
        assert!(!is_valid_email("chef example@x.com"));
        assert!(!is_valid_email("@example.com"));
    }

    #[test]
    fn numbers_must_be_non_negative() {
        assert_eq!(non_negative_number(" 250 "), Some(Decimal::from(250)));
        assert!(non_negative_number("-1").is_none());
        assert!(non_negative_number("abc").is_none());
    }
}
