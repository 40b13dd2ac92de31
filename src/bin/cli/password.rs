//! Password handling for CLI operations.

use rpassword::prompt_password;
use sealpack::Password;
use zeroize::Zeroize;

/// Prompts for password confirmation (for creating archives)
pub fn confirm_password() -> Option<Password> {
    let pwd1 = match prompt_password("Enter password: ") {
        Ok(pwd) => pwd,
        Err(_) => return None,
    };

    if pwd1.is_empty() {
        eprintln!("Password cannot be empty");
        return None;
    }

    let pwd2 = match prompt_password("Confirm password: ") {
        Ok(pwd) => pwd,
        Err(_) => return None,
    };

    match_confirmation(pwd1, pwd2)
}

/// Keeps the first entry if both match; wipes every copy it does not keep
fn match_confirmation(mut first: String, mut second: String) -> Option<Password> {
    let matches = first == second;
    second.zeroize();

    if matches {
        Some(Password::new(first))
    } else {
        first.zeroize();
        eprintln!("Passwords do not match");
        None
    }
}

/// Uses the password given on the command line or prompts for one,
/// with confirmation when `confirm` is set
pub fn get_or_prompt_password(provided: Option<String>, confirm: bool) -> Option<Password> {
    if let Some(pwd) = provided {
        return Some(Password::new(pwd));
    }

    if confirm {
        confirm_password()
    } else {
        match prompt_password("Enter password: ") {
            Ok(pwd) if !pwd.is_empty() => Some(Password::new(pwd)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matching_confirmation_keeps_password() {
        let password = match_confirmation("secret".into(), "secret".into()).unwrap();
        assert_eq!(password.as_bytes(), b"secret");
    }

    #[test]
    fn test_mismatched_confirmation_is_rejected() {
        assert!(match_confirmation("secret".into(), "secret ".into()).is_none());
    }
}
