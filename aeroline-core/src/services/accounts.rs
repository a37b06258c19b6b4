use serde::Deserialize;
use tracing::{info, warn};

use crate::models::{NewUser, User, UserChanges};
use crate::password::{hash_password_off_thread, verify_password_off_thread};
use crate::reference::require_text;
use crate::validation::ValidationErrors;
use crate::{CoreError, CoreResult, Repository};

pub const MIN_PASSWORD_LENGTH: usize = 5;

const BAD_CREDENTIALS: &str = "No active account found with the given credentials";

/// Sign-up payload.
#[derive(Debug, Clone, Deserialize)]
pub struct Registration {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
}

/// Profile update; unset fields keep their value.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfileChanges {
    pub email: Option<String>,
    pub password: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

fn check_email(errors: &mut ValidationErrors, email: &str) {
    require_text(errors, "email", email);
    if !email.trim().is_empty() && !email.contains('@') {
        errors.add("email", "Enter a valid email address.");
    }
}

fn check_password(errors: &mut ValidationErrors, password: &str) {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        errors.add(
            "password",
            format!("Ensure this field has at least {} characters.", MIN_PASSWORD_LENGTH),
        );
    }
}

/// Creates a regular (non-staff) account.
pub async fn register_user(repo: &dyn Repository, registration: &Registration) -> CoreResult<User> {
    let mut errors = ValidationErrors::new();
    check_email(&mut errors, &registration.email);
    check_password(&mut errors, &registration.password);
    errors.into_result()?;

    let user = repo
        .create_user(&NewUser {
            email: registration.email.trim().to_string(),
            password_hash: hash_password_off_thread(registration.password.clone()).await?,
            first_name: registration.first_name.clone(),
            last_name: registration.last_name.clone(),
            is_staff: false,
        })
        .await?;
    info!("User registered: {} ({})", user.email, user.id);
    Ok(user)
}

/// Checks credentials; both an unknown email and a wrong password give the
/// same error.
pub async fn authenticate(repo: &dyn Repository, email: &str, password: &str) -> CoreResult<User> {
    let Some(user) = repo.find_user_by_email(email.trim()).await? else {
        warn!("Login attempt for unknown email {}", email);
        return Err(CoreError::Authentication(BAD_CREDENTIALS.into()));
    };
    if !verify_password_off_thread(password.to_string(), user.password_hash.clone()).await? {
        warn!("Wrong password for user {}", user.id);
        return Err(CoreError::Authentication(BAD_CREDENTIALS.into()));
    }
    Ok(user)
}

pub async fn update_profile(
    repo: &dyn Repository,
    user_id: i64,
    changes: &ProfileChanges,
) -> CoreResult<User> {
    let mut errors = ValidationErrors::new();
    if let Some(email) = &changes.email {
        check_email(&mut errors, email);
    }
    if let Some(password) = &changes.password {
        check_password(&mut errors, password);
    }
    errors.into_result()?;

    let password_hash = match &changes.password {
        Some(password) => Some(hash_password_off_thread(password.clone()).await?),
        None => None,
    };
    let update = UserChanges {
        email: changes.email.as_ref().map(|e| e.trim().to_string()),
        password_hash,
        first_name: changes.first_name.clone(),
        last_name: changes.last_name.clone(),
    };

    repo.update_user(user_id, &update)
        .await?
        .ok_or_else(|| CoreError::NotFound(format!("user {}", user_id)))
}

/// Creates the staff account unless a user with that email already exists.
pub async fn ensure_admin(repo: &dyn Repository, email: &str, password: &str) -> CoreResult<User> {
    if let Some(existing) = repo.find_user_by_email(email).await? {
        if !existing.is_staff {
            warn!("Bootstrap admin {} exists but is not staff", email);
        }
        return Ok(existing);
    }

    let mut errors = ValidationErrors::new();
    check_email(&mut errors, email);
    check_password(&mut errors, password);
    errors.into_result()?;

    let admin = repo
        .create_user(&NewUser {
            email: email.to_string(),
            password_hash: hash_password_off_thread(password.to_string()).await?,
            first_name: String::new(),
            last_name: String::new(),
            is_staff: true,
        })
        .await?;
    info!("Bootstrap admin created: {} ({})", admin.email, admin.id);
    Ok(admin)
}
