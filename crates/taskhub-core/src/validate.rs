//! Checks that run before a form is sent.

use taskhub_shared::{PasswordReset, Registration};

use crate::api::ApiError;

pub const REGISTRATION_PASSWORD_MISMATCH: &str = "Passwords do not match. Please try again.";
pub const RESET_PASSWORD_MISMATCH: &str = "New passwords do not match.";

pub fn check_registration(registration: &Registration) -> Result<(), ApiError> {
    if registration.password != registration.password_confirm {
        return Err(ApiError::Validation(
            REGISTRATION_PASSWORD_MISMATCH.to_string(),
        ));
    }
    Ok(())
}

pub fn check_password_reset(reset: &PasswordReset) -> Result<(), ApiError> {
    if reset.new_password != reset.new_password_confirm {
        return Err(ApiError::Validation(RESET_PASSWORD_MISMATCH.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registration(password: &str, confirm: &str) -> Registration {
        Registration {
            email: "a@b.com".to_string(),
            password: password.to_string(),
            password_confirm: confirm.to_string(),
            full_name: "Ada".to_string(),
        }
    }

    #[test]
    fn registration_requires_matching_passwords() {
        assert!(check_registration(&registration("s3cret!", "s3cret!")).is_ok());
        assert_eq!(
            check_registration(&registration("s3cret!", "s3cret")),
            Err(ApiError::Validation(REGISTRATION_PASSWORD_MISMATCH.to_string()))
        );
        // exact comparison, no trimming
        assert!(check_registration(&registration("pw ", "pw")).is_err());
    }

    #[test]
    fn reset_compares_only_the_new_passwords() {
        let reset = PasswordReset {
            old_password: "different".to_string(),
            new_password: "n3w-pass".to_string(),
            new_password_confirm: "n3w-pass".to_string(),
        };
        assert!(check_password_reset(&reset).is_ok());

        let mismatch = PasswordReset {
            new_password_confirm: "n3w-pas".to_string(),
            ..reset
        };
        assert_eq!(
            check_password_reset(&mismatch),
            Err(ApiError::Validation(RESET_PASSWORD_MISMATCH.to_string()))
        );
    }
}
