//! Local form validation, run before any provider call.
//!
//! Errors are keyed by field name so the client can render them inline; a
//! confirmation mismatch is always keyed to the confirmation field,
//! regardless of whether the password itself is valid.

use std::collections::BTreeMap;

/// Field name -> first error message for that field.
pub type ValidationErrors = BTreeMap<String, String>;

const PASSWORD_MIN_LEN: usize = 10;
const PASSWORD_MAX_LEN: usize = 128;
const NAME_MIN_LEN: usize = 2;
const NAME_MAX_LEN: usize = 50;

fn email_error(email: &str) -> Option<String> {
    let email = email.trim();
    if email.is_empty() {
        return Some("Email is required".to_string());
    }
    // Basic shape check; the provider is the authority on deliverability.
    let mut parts = email.splitn(2, '@');
    let local = parts.next().unwrap_or_default();
    let domain = parts.next();
    match domain {
        Some(domain)
            if !local.is_empty() && !domain.is_empty() && !email.contains(char::is_whitespace) =>
        {
            None
        }
        _ => Some("Please enter a valid email address".to_string()),
    }
}

fn password_error(password: &str) -> Option<String> {
    // Bounds count characters, not bytes.
    let length = password.chars().count();
    if password.is_empty() {
        Some("Password is required".to_string())
    } else if length < PASSWORD_MIN_LEN {
        Some(format!(
            "Password must be at least {PASSWORD_MIN_LEN} characters"
        ))
    } else if length > PASSWORD_MAX_LEN {
        Some(format!(
            "Password must be at most {PASSWORD_MAX_LEN} characters"
        ))
    } else {
        None
    }
}

fn name_error(name: &str) -> Option<String> {
    let name = name.trim();
    let length = name.chars().count();
    if name.is_empty() {
        Some("Name is required".to_string())
    } else if length < NAME_MIN_LEN {
        Some(format!("Name must be at least {NAME_MIN_LEN} characters"))
    } else if length > NAME_MAX_LEN {
        Some(format!("Name must be at most {NAME_MAX_LEN} characters"))
    } else {
        None
    }
}

fn confirmation_error(password: &str, confirm: &str) -> Option<String> {
    if confirm.is_empty() {
        Some("Please confirm your password".to_string())
    } else if password != confirm {
        Some("Passwords do not match".to_string())
    } else {
        None
    }
}

fn collect(fields: Vec<(&str, Option<String>)>) -> Result<(), ValidationErrors> {
    let errors: ValidationErrors = fields
        .into_iter()
        .filter_map(|(field, error)| error.map(|e| (field.to_string(), e)))
        .collect();
    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Login only checks email shape and that a password was entered at all;
/// length rules apply to account creation, not to existing credentials.
pub fn validate_login(email: &str, password: &str) -> Result<(), ValidationErrors> {
    let password_error = password.is_empty().then(|| "Password is required".to_string());
    collect(vec![
        ("email", email_error(email)),
        ("password", password_error),
    ])
}

pub fn validate_signup(
    name: &str,
    email: &str,
    password: &str,
    confirm_password: &str,
) -> Result<(), ValidationErrors> {
    collect(vec![
        ("name", name_error(name)),
        ("email", email_error(email)),
        ("password", password_error(password)),
        (
            "confirmPassword",
            confirmation_error(password, confirm_password),
        ),
    ])
}

pub fn validate_email_only(email: &str) -> Result<(), ValidationErrors> {
    collect(vec![("email", email_error(email))])
}

pub fn validate_password_update(
    password: &str,
    confirm_password: &str,
) -> Result<(), ValidationErrors> {
    collect(vec![
        ("password", password_error(password)),
        (
            "confirmPassword",
            confirmation_error(password, confirm_password),
        ),
    ])
}
