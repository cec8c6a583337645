// src/types/profile.rs
//! Account and engineer profile structures exchanged with the recruiting API

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

// ===== Roles =====

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Engineer,
    Recruiter,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Engineer => "engineer",
            Role::Recruiter => "recruiter",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "engineer" => Ok(Role::Engineer),
            "recruiter" => Ok(Role::Recruiter),
            other => Err(format!("Unknown role: {}. Use engineer or recruiter", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoleType {
    ContractPartTime,
    ContractFullTime,
    EmployeePartTime,
    EmployeeFullTime,
}

impl RoleType {
    pub const ALL: [RoleType; 4] = [
        RoleType::ContractPartTime,
        RoleType::ContractFullTime,
        RoleType::EmployeePartTime,
        RoleType::EmployeeFullTime,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RoleType::ContractPartTime => "contract_part_time",
            RoleType::ContractFullTime => "contract_full_time",
            RoleType::EmployeePartTime => "employee_part_time",
            RoleType::EmployeeFullTime => "employee_full_time",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            RoleType::ContractPartTime => "Part-time contract",
            RoleType::ContractFullTime => "Full-time contract",
            RoleType::EmployeePartTime => "Part-time employment",
            RoleType::EmployeeFullTime => "Full-time employment",
        }
    }
}

impl FromStr for RoleType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s.trim())
            .ok_or_else(|| format!("Unknown role type: {}", s))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoleLevel {
    Junior,
    MidLevel,
    Senior,
    PrincipalStaff,
    CLevel,
}

impl RoleLevel {
    pub const ALL: [RoleLevel; 5] = [
        RoleLevel::Junior,
        RoleLevel::MidLevel,
        RoleLevel::Senior,
        RoleLevel::PrincipalStaff,
        RoleLevel::CLevel,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RoleLevel::Junior => "junior",
            RoleLevel::MidLevel => "mid_level",
            RoleLevel::Senior => "senior",
            RoleLevel::PrincipalStaff => "principal_staff",
            RoleLevel::CLevel => "c_level",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            RoleLevel::Junior => "Junior",
            RoleLevel::MidLevel => "Middle",
            RoleLevel::Senior => "Senior",
            RoleLevel::PrincipalStaff => "Principal",
            RoleLevel::CLevel => "C-Level",
        }
    }
}

impl FromStr for RoleLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|l| l.as_str() == s.trim())
            .ok_or_else(|| format!("Unknown role level: {}", s))
    }
}

// ===== Account (GET /me/) =====

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountProfile {
    pub id: String,
    pub email: String,
    #[serde(default)]
    pub is_verified: bool,
    // Older API revisions exposed the role as `type`
    #[serde(default, alias = "type")]
    pub role: Option<Role>,
}

// ===== Engineer profile =====

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Engineer {
    pub id: Uuid,
    #[serde(default)]
    pub user: Option<String>,
    #[serde(alias = "firstName")]
    pub first_name: String,
    #[serde(alias = "lastName")]
    pub last_name: String,
    #[serde(default, alias = "tagLine")]
    pub tag_line: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub avatar: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default, alias = "searchStatus")]
    pub search_status: Option<String>,
    #[serde(default, alias = "roleType", deserialize_with = "one_or_many")]
    pub role_type: Vec<RoleType>,
    #[serde(default, alias = "roleLevel", deserialize_with = "one_or_many")]
    pub role_level: Vec<RoleLevel>,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub github: Option<String>,
    #[serde(default)]
    pub twitter: Option<String>,
    #[serde(default, rename = "linkedIn", alias = "linked_in")]
    pub linked_in: Option<String>,
    #[serde(default)]
    pub stackoverflow: Option<String>,
}

impl Engineer {
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name).trim().to_string()
    }
}

/// Body sent to `POST /engineers/` and `PUT /engineers/me/`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineerSubmission {
    pub first_name: String,
    pub last_name: String,
    #[serde(rename = "tagLine")]
    pub tag_line: String,
    pub city: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    pub country: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    pub bio: String,
    #[serde(rename = "searchStatus")]
    pub search_status: String,
    #[serde(rename = "roleType")]
    pub role_type: Vec<RoleType>,
    #[serde(rename = "roleLevel")]
    pub role_level: Vec<RoleLevel>,
    #[serde(rename = "linkedIn")]
    pub linked_in: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    pub github: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub twitter: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stackoverflow: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
}

/// The engineer model stores a single choice while the forms send lists.
fn one_or_many<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany<T> {
        One(T),
        Many(Vec<T>),
        Empty(Option<()>),
    }

    Ok(match OneOrMany::<T>::deserialize(deserializer)? {
        OneOrMany::One(value) => vec![value],
        OneOrMany::Many(values) => values,
        OneOrMany::Empty(_) => Vec::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_parsing() {
        assert_eq!("engineer".parse::<Role>().unwrap(), Role::Engineer);
        assert_eq!(" Recruiter ".parse::<Role>().unwrap(), Role::Recruiter);
        assert!("admin".parse::<Role>().is_err());
        assert_eq!(Role::Recruiter.to_string(), "recruiter");
    }

    #[test]
    fn test_account_profile_accepts_type_alias() {
        let profile: AccountProfile = serde_json::from_str(
            r#"{"id":"42","email":"a@b.io","is_verified":true,"type":"recruiter"}"#,
        )
        .unwrap();
        assert_eq!(profile.role, Some(Role::Recruiter));

        let profile: AccountProfile =
            serde_json::from_str(r#"{"id":"42","email":"a@b.io","role":null}"#).unwrap();
        assert_eq!(profile.role, None);
        assert!(!profile.is_verified);
    }

    #[test]
    fn test_engineer_accepts_single_role_type_and_camel_case() {
        let engineer: Engineer = serde_json::from_str(
            r#"{
                "id": "5f0c6f36-3c43-4e0b-9f3a-5d1b8c2a9e11",
                "firstName": "Ada",
                "last_name": "Lovelace",
                "tag_line": "Analyst",
                "role_type": "contract_full_time",
                "roleLevel": ["senior", "principal_staff"],
                "linkedIn": "https://www.linkedin.com/in/ada"
            }"#,
        )
        .unwrap();

        assert_eq!(engineer.display_name(), "Ada Lovelace");
        assert_eq!(engineer.role_type, vec![RoleType::ContractFullTime]);
        assert_eq!(
            engineer.role_level,
            vec![RoleLevel::Senior, RoleLevel::PrincipalStaff]
        );
        assert_eq!(
            engineer.linked_in.as_deref(),
            Some("https://www.linkedin.com/in/ada")
        );
    }

    #[test]
    fn test_engineer_null_role_type_is_empty() {
        let engineer: Engineer = serde_json::from_str(
            r#"{"id":"5f0c6f36-3c43-4e0b-9f3a-5d1b8c2a9e11","first_name":"A","last_name":"B","role_type":null}"#,
        )
        .unwrap();
        assert!(engineer.role_type.is_empty());
        assert!(engineer.role_level.is_empty());
    }

    #[test]
    fn test_labels() {
        assert_eq!(RoleType::EmployeePartTime.label(), "Part-time employment");
        assert_eq!(RoleLevel::MidLevel.label(), "Middle");
        assert_eq!("c_level".parse::<RoleLevel>().unwrap(), RoleLevel::CLevel);
    }
}
