// src/forms.rs
//! Signin, signup and engineer profile forms with their validators

use std::fmt;
use thiserror::Error;

use crate::types::{Engineer, EngineerSubmission, Role, RoleLevel, RoleType};
use crate::utils::{normalize_email, strip_url_prefix, with_url_prefix};

pub const MIN_PASSWORD_LENGTH: usize = 8;

pub const LINKEDIN_PREFIX: &str = "https://www.linkedin.com/in/";
pub const WEBSITE_PREFIX: &str = "https://";
pub const GITHUB_PREFIX: &str = "https://github.com/";
pub const TWITTER_PREFIX: &str = "https://twitter.com/";
pub const STACKOVERFLOW_PREFIX: &str = "https://stackoverflow.com/users/";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl FieldError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("form is invalid: {}", join(.0))]
pub struct FormErrors(pub Vec<FieldError>);

impl FormErrors {
    pub fn fields(&self) -> Vec<&'static str> {
        self.0.iter().map(|e| e.field).collect()
    }

    pub fn has(&self, field: &str) -> bool {
        self.0.iter().any(|e| e.field == field)
    }
}

fn join(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

fn finish(errors: Vec<FieldError>) -> Result<(), FormErrors> {
    if errors.is_empty() {
        Ok(())
    } else {
        Err(FormErrors(errors))
    }
}

fn require(errors: &mut Vec<FieldError>, field: &'static str, value: &str) -> bool {
    if value.trim().is_empty() {
        errors.push(FieldError::new(field, "is required"));
        return false;
    }
    true
}

// ===== Pattern checks =====

/// `[a-z0-9._%+-]+@[a-z0-9.-]+\.[a-z]{2,4}`, matched against the raw input
pub fn is_valid_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };

    let local_ok = !local.is_empty()
        && local
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || "._%+-".contains(c));
    if !local_ok {
        return false;
    }

    let chars: Vec<char> = domain.chars().collect();
    (2..=4).any(|tld_len| {
        if chars.len() < tld_len + 2 {
            return false;
        }
        let split = chars.len() - tld_len;
        let host = &chars[..split - 1];
        let tld = &chars[split..];
        chars[split - 1] == '.'
            && !host.is_empty()
            && host
                .iter()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || *c == '.' || *c == '-')
            && tld.iter().all(|c| c.is_ascii_lowercase())
    })
}

/// Handle with an optional trailing slash, e.g. `[a-zA-Z0-9-]+/?`
fn is_handle(value: &str, extra: &str) -> bool {
    let body = value.strip_suffix('/').unwrap_or(value);
    !body.is_empty()
        && body
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || extra.contains(c))
}

pub fn is_github_handle(value: &str) -> bool {
    is_handle(value, "-")
}

pub fn is_linkedin_handle(value: &str) -> bool {
    is_handle(value, "-")
}

pub fn is_twitter_handle(value: &str) -> bool {
    is_handle(value, "_-")
}

/// Stack Overflow paths look like `12345/user-name`
pub fn is_stackoverflow_path(value: &str) -> bool {
    !value.is_empty()
        && value
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '/')
}

/// Something like `example.com`: a host followed by a dot and 2+ letters
pub fn looks_like_domain(value: &str) -> bool {
    let chars: Vec<char> = value.chars().collect();
    chars.iter().enumerate().any(|(i, c)| {
        if *c != '.' || i == 0 {
            return false;
        }
        let before = chars[i - 1];
        let host_ok = before.is_ascii_lowercase() || before.is_ascii_digit() || ".-".contains(before);
        let tld = chars[i + 1..]
            .iter()
            .take_while(|c| c.is_ascii_lowercase() || **c == '.')
            .count();
        host_ok && tld >= 2
    })
}

fn check_social(
    errors: &mut Vec<FieldError>,
    field: &'static str,
    value: &str,
    required: bool,
    valid: fn(&str) -> bool,
) {
    let value = value.trim();
    if value.is_empty() {
        if required {
            errors.push(FieldError::new(field, "is required"));
        }
        return;
    }
    if value.contains("https://") {
        errors.push(FieldError::new(field, "must not include https://"));
    } else if !valid(value) {
        errors.push(FieldError::new(field, "is not a valid handle"));
    }
}

// ===== Signin / signup =====

#[derive(Debug, Clone, Default)]
pub struct SigninForm {
    pub email: String,
    pub password: String,
}

impl SigninForm {
    pub fn validate(&self) -> Result<(), FormErrors> {
        let mut errors = Vec::new();
        if require(&mut errors, "email", &self.email) && !is_valid_email(&normalize_email(&self.email)) {
            errors.push(FieldError::new("email", "is not a valid email address"));
        }
        require(&mut errors, "password", &self.password);
        finish(errors)
    }
}

#[derive(Debug, Clone)]
pub struct SignupForm {
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    pub role: Role,
}

impl SignupForm {
    pub fn validate(&self) -> Result<(), FormErrors> {
        let mut errors = Vec::new();

        if require(&mut errors, "email", &self.email) && !is_valid_email(self.email.trim()) {
            errors.push(FieldError::new(
                "email",
                "must be a valid lowercase email address",
            ));
        }

        if require(&mut errors, "password", &self.password)
            && self.password.chars().count() < MIN_PASSWORD_LENGTH
        {
            errors.push(FieldError::new(
                "password",
                format!("must be at least {} characters", MIN_PASSWORD_LENGTH),
            ));
        }

        if self.password != self.confirm_password {
            errors.push(FieldError::new("confirm_password", "passwords do not match"));
        }

        finish(errors)
    }
}

// ===== Engineer profile =====

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FormMode {
    #[default]
    Create,
    Update,
}

#[derive(Debug, Clone, Default)]
pub struct ProfileForm {
    pub mode: FormMode,
    pub first_name: String,
    pub last_name: String,
    pub tag_line: String,
    pub city: String,
    pub state: String,
    pub country: String,
    pub avatar: String,
    pub bio: String,
    pub search_status: String,
    pub role_type: Vec<RoleType>,
    pub role_level: Vec<RoleLevel>,
    pub website: String,
    pub github: String,
    pub twitter: String,
    pub linked_in: String,
    pub stackoverflow: String,
}

impl ProfileForm {
    pub fn new(mode: FormMode) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }

    /// Populate an update form from a stored profile; link fields go back to bare handles
    pub fn from_engineer(engineer: &Engineer) -> Self {
        let text = |value: &Option<String>| value.clone().unwrap_or_default();
        let handle =
            |prefix: &str, value: &Option<String>| strip_url_prefix(prefix, value.as_deref().unwrap_or_default());

        Self {
            mode: FormMode::Update,
            first_name: engineer.first_name.clone(),
            last_name: engineer.last_name.clone(),
            tag_line: text(&engineer.tag_line),
            city: text(&engineer.city),
            state: text(&engineer.state),
            country: text(&engineer.country),
            avatar: text(&engineer.avatar),
            bio: text(&engineer.bio),
            search_status: text(&engineer.search_status),
            role_type: engineer.role_type.clone(),
            role_level: engineer.role_level.clone(),
            website: handle(WEBSITE_PREFIX, &engineer.website),
            github: handle(GITHUB_PREFIX, &engineer.github),
            twitter: handle(TWITTER_PREFIX, &engineer.twitter),
            linked_in: handle(LINKEDIN_PREFIX, &engineer.linked_in),
            stackoverflow: handle(STACKOVERFLOW_PREFIX, &engineer.stackoverflow),
        }
    }

    pub fn validate(&self) -> Result<(), FormErrors> {
        let mut errors = Vec::new();

        require(&mut errors, "first_name", &self.first_name);
        require(&mut errors, "last_name", &self.last_name);
        require(&mut errors, "tag_line", &self.tag_line);
        require(&mut errors, "city", &self.city);
        require(&mut errors, "country", &self.country);
        require(&mut errors, "bio", &self.bio);
        require(&mut errors, "search_status", &self.search_status);
        if self.mode == FormMode::Create {
            require(&mut errors, "avatar", &self.avatar);
        }

        if self.role_type.is_empty() {
            errors.push(FieldError::new("role_type", "select at least one role type"));
        }
        if self.role_level.is_empty() {
            errors.push(FieldError::new("role_level", "select at least one role level"));
        }

        check_social(&mut errors, "website", &self.website, false, looks_like_domain);
        check_social(&mut errors, "github", &self.github, true, is_github_handle);
        check_social(&mut errors, "twitter", &self.twitter, false, is_twitter_handle);
        check_social(&mut errors, "linked_in", &self.linked_in, true, is_linkedin_handle);
        check_social(
            &mut errors,
            "stackoverflow",
            &self.stackoverflow,
            false,
            is_stackoverflow_path,
        );

        finish(errors)
    }

    /// Validate and build the request body, expanding handles into URLs
    pub fn into_submission(self) -> Result<EngineerSubmission, FormErrors> {
        self.validate()?;

        let optional = |value: String| {
            let value = value.trim().to_string();
            (!value.is_empty()).then_some(value)
        };
        let link = |prefix: &str, value: &str| optional(with_url_prefix(prefix, value));

        Ok(EngineerSubmission {
            first_name: self.first_name.trim().to_string(),
            last_name: self.last_name.trim().to_string(),
            tag_line: self.tag_line.trim().to_string(),
            city: self.city.trim().to_string(),
            state: optional(self.state),
            country: self.country.trim().to_string(),
            avatar: optional(self.avatar),
            bio: self.bio.trim().to_string(),
            search_status: self.search_status.trim().to_string(),
            role_type: self.role_type,
            role_level: self.role_level,
            linked_in: with_url_prefix(LINKEDIN_PREFIX, &self.linked_in),
            website: link(WEBSITE_PREFIX, &self.website),
            github: with_url_prefix(GITHUB_PREFIX, &self.github),
            twitter: link(TWITTER_PREFIX, &self.twitter),
            stackoverflow: link(STACKOVERFLOW_PREFIX, &self.stackoverflow),
            user: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled_profile() -> ProfileForm {
        ProfileForm {
            mode: FormMode::Create,
            first_name: "Ada".into(),
            last_name: "Lovelace".into(),
            tag_line: "Analytical engines".into(),
            city: "London".into(),
            country: "GB".into(),
            avatar: "https://res.cloudinary.com/rmsmms/image/upload/v1/ada.png".into(),
            bio: "First programmer".into(),
            search_status: "actively_looking".into(),
            role_type: vec![RoleType::EmployeeFullTime],
            role_level: vec![RoleLevel::Senior],
            github: "ada".into(),
            linked_in: "ada-lovelace/".into(),
            ..ProfileForm::default()
        }
    }

    #[test]
    fn test_email_pattern() {
        assert!(is_valid_email("ada@example.com"));
        assert!(is_valid_email("a.b+c@mail.co.uk"));
        assert!(!is_valid_email("Ada@example.com"));
        assert!(!is_valid_email("ada@example"));
        assert!(!is_valid_email("ada@example.comma"));
        assert!(!is_valid_email("ada@exa_mple.com"));
        assert!(!is_valid_email("@example.com"));
        assert!(!is_valid_email("ada.example.com"));
    }

    #[test]
    fn test_signin_form() {
        let form = SigninForm {
            email: "Ada@Example.com".into(),
            password: "x".into(),
        };
        assert!(form.validate().is_ok());

        let errors = SigninForm::default().validate().unwrap_err();
        assert_eq!(errors.fields(), vec!["email", "password"]);
    }

    #[test]
    fn test_signup_form() {
        let mut form = SignupForm {
            email: "ada@example.com".into(),
            password: "correct-horse".into(),
            confirm_password: "correct-horse".into(),
            role: Role::Engineer,
        };
        assert!(form.validate().is_ok());

        form.password = "short".into();
        form.confirm_password = "shorter".into();
        let errors = form.validate().unwrap_err();
        assert!(errors.has("password"));
        assert!(errors.has("confirm_password"));
    }

    #[test]
    fn test_handle_patterns() {
        assert!(is_github_handle("octo-cat/"));
        assert!(!is_github_handle("octo_cat"));
        assert!(is_twitter_handle("octo_cat"));
        assert!(!is_twitter_handle("octo cat"));
        assert!(is_stackoverflow_path("123/ada-lovelace"));
        assert!(!is_stackoverflow_path("123/Ada"));
        assert!(looks_like_domain("ada.dev"));
        assert!(looks_like_domain("blog.ada.co.uk/posts"));
        assert!(!looks_like_domain("localhost"));
        assert!(!looks_like_domain("ada.x"));
    }

    #[test]
    fn test_profile_form_requires_fields() {
        let errors = ProfileForm::new(FormMode::Create).validate().unwrap_err();
        for field in ["first_name", "avatar", "role_type", "role_level", "github", "linked_in"] {
            assert!(errors.has(field), "missing error for {}", field);
        }
        assert!(!errors.has("twitter"));

        let errors = ProfileForm::new(FormMode::Update).validate().unwrap_err();
        assert!(!errors.has("avatar"));
    }

    #[test]
    fn test_profile_form_rejects_full_urls() {
        let mut form = filled_profile();
        form.github = "https://github.com/ada".into();
        form.website = "https://ada.dev".into();
        let errors = form.validate().unwrap_err();
        assert_eq!(errors.fields(), vec!["website", "github"]);
    }

    #[test]
    fn test_into_submission_expands_links() {
        let mut form = filled_profile();
        form.website = "ada.dev".into();
        form.stackoverflow = "42/ada".into();

        let submission = form.into_submission().unwrap();
        assert_eq!(submission.github, "https://github.com/ada");
        assert_eq!(submission.linked_in, "https://www.linkedin.com/in/ada-lovelace/");
        assert_eq!(submission.website.as_deref(), Some("https://ada.dev"));
        assert_eq!(
            submission.stackoverflow.as_deref(),
            Some("https://stackoverflow.com/users/42/ada")
        );
        assert_eq!(submission.twitter, None);
        assert_eq!(submission.state, None);
    }

    #[test]
    fn test_from_engineer_strips_prefixes() {
        let engineer: Engineer = serde_json::from_value(serde_json::json!({
            "id": "6f1c1b9e-3c1a-4a51-9f5e-0d7f5b0a9c11",
            "first_name": "Ada",
            "last_name": "Lovelace",
            "github": "https://github.com/ada",
            "linkedIn": "https://www.linkedin.com/in/ada-lovelace",
            "website": "https://ada.dev",
            "role_type": "employee_full_time",
            "role_level": ["senior"]
        }))
        .unwrap();

        let form = ProfileForm::from_engineer(&engineer);
        assert_eq!(form.mode, FormMode::Update);
        assert_eq!(form.github, "ada");
        assert_eq!(form.linked_in, "ada-lovelace");
        assert_eq!(form.website, "ada.dev");
        assert_eq!(form.twitter, "");
        assert_eq!(form.role_type, vec![RoleType::EmployeeFullTime]);
    }
}
