use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MaritalStatus {
    Single,
    Married,
}

impl std::str::FromStr for Gender {
    type Err = super::UnknownLabel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "male" => Ok(Gender::Male),
            "female" => Ok(Gender::Female),
            other => Err(super::UnknownLabel { kind: "gender", value: other.to_string() }),
        }
    }
}

impl std::str::FromStr for MaritalStatus {
    type Err = super::UnknownLabel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "single" => Ok(MaritalStatus::Single),
            "married" => Ok(MaritalStatus::Married),
            other => Err(super::UnknownLabel { kind: "marital status", value: other.to_string() }),
        }
    }
}

/// Operator profile linked 1:1 to an identity. Never deleted by this system.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientProfile {
    pub user_id: Uuid,
    pub name: String,
    pub email: String,
    pub age: u32,
    pub phone_number: String,
    pub dob: String,
    pub nationality: String,
    pub gender: Option<Gender>,
    pub marital_status: Option<MaritalStatus>,
    #[serde(default)]
    pub cloud_kitchen_website_id: Option<Uuid>,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}
