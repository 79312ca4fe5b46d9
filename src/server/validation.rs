use crate::server::response::ApiError;

const MAX_USERNAME_LEN: usize = 64;
const MAX_EMAIL_LEN: usize = 254;
const MIN_PASSWORD_LEN: usize = 8;

fn is_valid_username_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.'
}

fn validate_username_inner(name: &str) -> Result<(), String> {
    if name.is_empty() {
        return Err("Username cannot be empty".to_string());
    }
    if name.len() > MAX_USERNAME_LEN {
        return Err(format!(
            "Username cannot exceed {MAX_USERNAME_LEN} characters"
        ));
    }
    if !name.chars().all(is_valid_username_char) {
        return Err(
            "Username can only contain alphanumeric characters, hyphens, underscores, and periods"
                .to_string(),
        );
    }
    Ok(())
}

pub fn validate_username(name: &str) -> Result<(), ApiError> {
    validate_username_inner(name).map_err(ApiError::bad_request)
}

pub fn validate_email(email: &str) -> Result<(), ApiError> {
    if email.len() > MAX_EMAIL_LEN {
        return Err(ApiError::bad_request(format!(
            "Email cannot exceed {MAX_EMAIL_LEN} characters"
        )));
    }

    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !email.chars().any(char::is_whitespace)
        }
        None => false,
    };

    if valid {
        Ok(())
    } else {
        Err(ApiError::bad_request("Invalid email address"))
    }
}

pub fn validate_password(password: &str) -> Result<(), ApiError> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ApiError::bad_request(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    Ok(())
}
