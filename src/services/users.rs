//! Account service: signup, login and profile management

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::user::{ChangePasswordForm, LoginForm, ProfileChanges, SignupForm, UpdateProfileForm, User},
    repository::Repository,
};

pub const INVALID_CREDENTIALS: &str = "Invalid username or password";
pub const USERNAME_TAKEN: &str = "Username is already taken. Please choose another.";
pub const WRONG_CURRENT_PASSWORD: &str = "Incorrect current password. Please try again.";
pub const PASSWORDS_DIFFER: &str = "Passwords don't match, try again!";

/// Hash a password using Argon2
pub fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))?;
    Ok(hash.to_string())
}

/// Check a password against a stored Argon2 hash
pub fn verify_password(hash: &str, password: &str) -> AppResult<bool> {
    let parsed_hash = PasswordHash::new(hash)
        .map_err(|_| AppError::Internal("Invalid password hash".to_string()))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

#[derive(Clone)]
pub struct UsersService {
    repository: Repository,
}

impl UsersService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Register a new account
    pub async fn signup(&self, form: SignupForm) -> AppResult<User> {
        let (new_user, password) = form.into_new_user()?;

        if self.repository.users.username_exists(&new_user.username).await? {
            return Err(AppError::Conflict(USERNAME_TAKEN.to_string()));
        }

        let password_hash = hash_password(&password)?;
        let user = self.repository.users.create(&new_user, &password_hash).await?;

        tracing::info!(user_id = user.user_id, username = %user.username, "User signed up");
        Ok(user)
    }

    /// Check a login form against stored credentials
    pub async fn authenticate(&self, form: &LoginForm) -> AppResult<i32> {
        let username = form.username.trim();
        if username.is_empty() || form.password.is_empty() {
            return Err(AppError::Authentication(INVALID_CREDENTIALS.to_string()));
        }

        let credential = self
            .repository
            .users
            .get_credential_by_username(username)
            .await?
            .ok_or_else(|| AppError::Authentication(INVALID_CREDENTIALS.to_string()))?;

        if !verify_password(&credential.password, &form.password)? {
            tracing::info!(username = %credential.username, "Rejected login attempt");
            return Err(AppError::Authentication(INVALID_CREDENTIALS.to_string()));
        }

        Ok(credential.user_id)
    }

    /// Get user by ID
    pub async fn get_by_id(&self, user_id: i32) -> AppResult<User> {
        self.repository.users.get_by_id(user_id).await
    }

    /// Apply the non-blank fields of a profile form.
    /// Returns `None` when the form changes nothing.
    pub async fn update_profile(&self, user_id: i32, form: UpdateProfileForm) -> AppResult<Option<User>> {
        let Some(changes) = ProfileChanges::from_form(form) else {
            return Ok(None);
        };
        changes.validate()?;

        let user = self.repository.users.update_profile(user_id, &changes).await?;
        tracing::info!(user_id, "Profile updated");
        Ok(Some(user))
    }

    /// Replace the password after checking the current one
    pub async fn change_password(&self, user_id: i32, form: ChangePasswordForm) -> AppResult<()> {
        let stored = self.repository.users.get_password_hash(user_id).await?;

        if !verify_password(&stored, &form.current_password)? {
            return Err(AppError::Authentication(WRONG_CURRENT_PASSWORD.to_string()));
        }

        if form.new_password != form.confirm_password {
            return Err(AppError::Validation(PASSWORDS_DIFFER.to_string()));
        }

        form.validate()?;

        let password_hash = hash_password(&form.new_password)?;
        self.repository.users.update_password(user_id, &password_hash).await?;

        tracing::info!(user_id, "Password changed");
        Ok(())
    }
}
