//! User model, account forms and their normalisation

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use crate::error::{AppError, AppResult};

/// Registered reader. Credentials live in a separate table and never appear here.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct User {
    pub user_id: i32,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub dob: Option<NaiveDate>,
    pub created_at: Option<DateTime<Utc>>,
}

/// Login lookup row joining `users` and `user_credentials`
#[derive(Clone, FromRow)]
pub struct UserCredential {
    pub user_id: i32,
    pub username: String,
    /// Argon2 PHC string
    pub password: String,
}

/// Uppercase the first character and lowercase the rest
pub fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Signup form
#[derive(Deserialize, Validate, ToSchema)]
pub struct SignupForm {
    #[serde(default)]
    #[validate(length(min = 3, max = 50, message = "Username must be between 3 and 50 characters."))]
    pub username: String,
    #[serde(default)]
    #[validate(length(min = 4, message = "Password must be at least 4 characters."))]
    pub password: String,
    #[serde(default)]
    #[validate(length(min = 1, max = 100, message = "First name is required."))]
    pub first_name: String,
    #[serde(default)]
    #[validate(length(min = 1, max = 100, message = "Last name is required."))]
    pub last_name: String,
    #[serde(default)]
    #[validate(
        email(message = "Please enter a valid email address."),
        length(max = 255, message = "Email must be at most 255 characters.")
    )]
    pub email: String,
    /// Date of birth (YYYY-MM-DD)
    #[serde(default)]
    pub dob: String,
}

/// Normalised account data ready for insertion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub dob: Option<NaiveDate>,
}

impl SignupForm {
    /// Validate the form and split it into the account data and the raw password
    pub fn into_new_user(self) -> AppResult<(NewUser, String)> {
        let form = SignupForm {
            username: self.username.trim().to_string(),
            password: self.password,
            first_name: self.first_name.trim().to_string(),
            last_name: self.last_name.trim().to_string(),
            email: self.email.trim().to_string(),
            dob: self.dob.trim().to_string(),
        };
        form.validate()?;

        if form.username.chars().any(char::is_whitespace) {
            return Err(AppError::Validation(
                "Username must not contain spaces.".to_string(),
            ));
        }

        let dob = if form.dob.is_empty() {
            None
        } else {
            let date = NaiveDate::parse_from_str(&form.dob, "%Y-%m-%d").map_err(|_| {
                AppError::Validation("Date of birth must be in YYYY-MM-DD format.".to_string())
            })?;
            Some(date)
        };

        let user = NewUser {
            username: form.username.to_lowercase(),
            first_name: capitalize(&form.first_name),
            last_name: capitalize(&form.last_name),
            email: form.email.to_lowercase(),
            dob,
        };
        Ok((user, form.password))
    }
}

/// Login form
#[derive(Deserialize, ToSchema)]
pub struct LoginForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

/// Profile edit form; blank fields are left unchanged
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateProfileForm {
    pub updated_first_name: Option<String>,
    pub updated_last_name: Option<String>,
    pub updated_email: Option<String>,
}

/// Normalised subset of profile columns to write
#[derive(Debug, Clone, Default, PartialEq, Eq, Validate)]
pub struct ProfileChanges {
    #[validate(length(max = 100, message = "First name must be at most 100 characters."))]
    pub first_name: Option<String>,
    #[validate(length(max = 100, message = "Last name must be at most 100 characters."))]
    pub last_name: Option<String>,
    #[validate(
        email(message = "Please enter a valid email address."),
        length(max = 255, message = "Email must be at most 255 characters.")
    )]
    pub email: Option<String>,
}

impl ProfileChanges {
    /// Keep the non-blank fields of the form, or `None` when nothing would change
    pub fn from_form(form: UpdateProfileForm) -> Option<Self> {
        let changes = Self {
            first_name: non_empty(form.updated_first_name).map(|v| capitalize(&v)),
            last_name: non_empty(form.updated_last_name).map(|v| capitalize(&v)),
            email: non_empty(form.updated_email).map(|v| v.to_lowercase()),
        };

        if changes.columns().is_empty() {
            None
        } else {
            Some(changes)
        }
    }

    /// Column/value pairs in statement order
    pub fn columns(&self) -> Vec<(&'static str, &str)> {
        let mut columns = Vec::with_capacity(3);

        macro_rules! add_field {
            ($field:expr, $name:expr) => {
                if let Some(ref val) = $field {
                    columns.push(($name, val.as_str()));
                }
            };
        }

        add_field!(self.first_name, "first_name");
        add_field!(self.last_name, "last_name");
        add_field!(self.email, "email");

        columns
    }

    /// `SET` list with positional placeholders starting at `$1`
    pub fn set_clause(&self) -> String {
        self.columns()
            .iter()
            .enumerate()
            .map(|(idx, (name, _))| format!("{} = ${}", name, idx + 1))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Password change form
#[derive(Deserialize, Validate, ToSchema)]
pub struct ChangePasswordForm {
    #[serde(default)]
    pub current_password: String,
    #[serde(default)]
    #[validate(length(min = 4, message = "Password must be at least 4 characters."))]
    pub new_password: String,
    #[serde(default)]
    pub confirm_password: String,
}
