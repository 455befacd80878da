use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CredentialError;

pub const MIN_PASSWORD_LEN: usize = 6;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    Vi,
    En,
}

/// Error codes surfaced by the authentication provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthErrorCode {
    InvalidEmail,
    UserDisabled,
    UserNotFound,
    WrongPassword,
    EmailAlreadyInUse,
    WeakPassword,
    InvalidCredential,
    TooManyRequests,
    NetworkRequestFailed,
}

impl AuthErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuthErrorCode::InvalidEmail => "auth/invalid-email",
            AuthErrorCode::UserDisabled => "auth/user-disabled",
            AuthErrorCode::UserNotFound => "auth/user-not-found",
            AuthErrorCode::WrongPassword => "auth/wrong-password",
            AuthErrorCode::EmailAlreadyInUse => "auth/email-already-in-use",
            AuthErrorCode::WeakPassword => "auth/weak-password",
            AuthErrorCode::InvalidCredential => "auth/invalid-credential",
            AuthErrorCode::TooManyRequests => "auth/too-many-requests",
            AuthErrorCode::NetworkRequestFailed => "auth/network-request-failed",
        }
    }

    pub fn message(&self, locale: Locale) -> &'static str {
        match (self, locale) {
            (AuthErrorCode::InvalidEmail, Locale::Vi) => "Email không hợp lệ.",
            (AuthErrorCode::InvalidEmail, Locale::En) => "Invalid email address.",
            (AuthErrorCode::UserDisabled, Locale::Vi) => "Tài khoản đã bị vô hiệu hóa.",
            (AuthErrorCode::UserDisabled, Locale::En) => "This account has been disabled.",
            (AuthErrorCode::UserNotFound, Locale::Vi) => "Không tìm thấy tài khoản.",
            (AuthErrorCode::UserNotFound, Locale::En) => "Account not found.",
            (AuthErrorCode::WrongPassword, Locale::Vi) => "Mật khẩu không đúng.",
            (AuthErrorCode::WrongPassword, Locale::En) => "Incorrect password.",
            (AuthErrorCode::EmailAlreadyInUse, Locale::Vi) => "Email đã được sử dụng.",
            (AuthErrorCode::EmailAlreadyInUse, Locale::En) => "This email is already in use.",
            (AuthErrorCode::WeakPassword, Locale::Vi) => {
                "Mật khẩu quá yếu. Vui lòng chọn mật khẩu mạnh hơn."
            }
            (AuthErrorCode::WeakPassword, Locale::En) => {
                "Password is too weak. Please choose a stronger one."
            }
            (AuthErrorCode::InvalidCredential, Locale::Vi) => "Email hoặc mật khẩu không đúng.",
            (AuthErrorCode::InvalidCredential, Locale::En) => "Incorrect email or password.",
            (AuthErrorCode::TooManyRequests, Locale::Vi) => {
                "Quá nhiều lần đăng nhập thất bại. Vui lòng thử lại sau."
            }
            (AuthErrorCode::TooManyRequests, Locale::En) => {
                "Too many failed sign-in attempts. Please try again later."
            }
            (AuthErrorCode::NetworkRequestFailed, Locale::Vi) => {
                "Lỗi kết nối mạng. Vui lòng kiểm tra internet."
            }
            (AuthErrorCode::NetworkRequestFailed, Locale::En) => {
                "Network error. Please check your internet connection."
            }
        }
    }
}

impl FromStr for AuthErrorCode {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "auth/invalid-email" => Ok(AuthErrorCode::InvalidEmail),
            "auth/user-disabled" => Ok(AuthErrorCode::UserDisabled),
            "auth/user-not-found" => Ok(AuthErrorCode::UserNotFound),
            "auth/wrong-password" => Ok(AuthErrorCode::WrongPassword),
            "auth/email-already-in-use" => Ok(AuthErrorCode::EmailAlreadyInUse),
            "auth/weak-password" => Ok(AuthErrorCode::WeakPassword),
            "auth/invalid-credential" => Ok(AuthErrorCode::InvalidCredential),
            "auth/too-many-requests" => Ok(AuthErrorCode::TooManyRequests),
            "auth/network-request-failed" => Ok(AuthErrorCode::NetworkRequestFailed),
            _ => Err(()),
        }
    }
}

fn generic_message(locale: Locale) -> &'static str {
    match locale {
        Locale::Vi => "Đã có lỗi xảy ra.",
        Locale::En => "Something went wrong.",
    }
}

/// User-facing text for a provider failure.
///
/// Known codes are localized; anything else shows the provider message, or a
/// generic message when there is none.
pub fn describe(code: Option<&str>, provider_message: Option<&str>, locale: Locale) -> String {
    if let Some(known) = code.and_then(|code| code.parse::<AuthErrorCode>().ok()) {
        return known.message(locale).to_string();
    }

    match provider_message {
        Some(message) if !message.is_empty() => message.to_string(),
        _ => generic_message(locale).to_string(),
    }
}

impl CredentialError {
    pub fn message(&self, locale: Locale) -> String {
        match (self, locale) {
            (CredentialError::MissingFields, Locale::Vi) => {
                "Vui lòng nhập đầy đủ email và mật khẩu.".to_string()
            }
            (CredentialError::MissingFields, Locale::En) => {
                "Please enter both email and password.".to_string()
            }
            (CredentialError::PasswordMismatch, Locale::Vi) => "Mật khẩu xác nhận không khớp.".to_string(),
            (CredentialError::PasswordMismatch, Locale::En) => {
                "Password confirmation does not match.".to_string()
            }
            (CredentialError::PasswordTooShort(min), Locale::Vi) => {
                format!("Mật khẩu phải có ít nhất {} ký tự.", min)
            }
            (CredentialError::PasswordTooShort(min), Locale::En) => {
                format!("Password must be at least {} characters.", min)
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthMode {
    SignIn,
    SignUp,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub confirm_password: Option<String>,
}

impl Credentials {
    /// Checks the form before it reaches the provider. Returns the trimmed email.
    pub fn validate(&self, mode: AuthMode) -> Result<&str, CredentialError> {
        let email = self.email.trim();
        if email.is_empty() || self.password.is_empty() {
            return Err(CredentialError::MissingFields);
        }

        if mode == AuthMode::SignUp {
            if self.confirm_password.as_deref() != Some(self.password.as_str()) {
                return Err(CredentialError::PasswordMismatch);
            }

            if self.password.chars().count() < MIN_PASSWORD_LEN {
                return Err(CredentialError::PasswordTooShort(MIN_PASSWORD_LEN));
            }
        }

        Ok(email)
    }
}
