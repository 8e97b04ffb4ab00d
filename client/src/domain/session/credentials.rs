//! Login and registration inputs.
//!
//! Constructors validate raw strings before anything reaches the network.
//! Passwords are held in zeroizing buffers and only borrowed into the wire
//! payload at send time.

use serde::Serialize;
use zeroize::Zeroizing;

/// Error returned when credential inputs are invalid.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CredentialsValidationError {
    /// Email was missing or blank once trimmed.
    #[error("email must not be empty")]
    EmptyEmail,
    /// Password was empty.
    #[error("password must not be empty")]
    EmptyPassword,
    /// A required registration field was blank.
    #[error("{field} must not be empty")]
    EmptyField {
        /// Wire name of the field.
        field: &'static str,
    },
}

/// Validated login credentials.
///
/// ## Invariants
/// - `email` is trimmed and non-empty.
/// - `password` is non-empty but keeps caller-provided whitespace.
///
/// # Examples
/// ```
/// use client::domain::LoginCredentials;
///
/// let creds = LoginCredentials::try_from_parts(" rina@example.com ", "pw").unwrap();
/// assert_eq!(creds.email(), "rina@example.com");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginCredentials {
    email: String,
    password: Zeroizing<String>,
}

impl LoginCredentials {
    /// Construct credentials from raw inputs.
    pub fn try_from_parts(email: &str, password: &str) -> Result<Self, CredentialsValidationError> {
        let normalized = email.trim();
        if normalized.is_empty() {
            return Err(CredentialsValidationError::EmptyEmail);
        }
        if password.is_empty() {
            return Err(CredentialsValidationError::EmptyPassword);
        }
        Ok(Self {
            email: normalized.to_owned(),
            password: Zeroizing::new(password.to_owned()),
        })
    }

    /// Login email.
    pub fn email(&self) -> &str {
        self.email.as_str()
    }

    /// Password as provided.
    pub fn password(&self) -> &str {
        self.password.as_str()
    }

    pub(crate) fn payload(&self) -> LoginPayload<'_> {
        LoginPayload {
            email: self.email(),
            password: self.password(),
        }
    }
}

#[derive(Serialize)]
pub(crate) struct LoginPayload<'a> {
    email: &'a str,
    password: &'a str,
}

/// Validated self-registration request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrationRequest {
    name: String,
    email: String,
    password: Zeroizing<String>,
    role: String,
    address: String,
    phone_number: String,
}

/// Raw registration fields, validated by [`RegistrationRequest::try_new`].
#[derive(Debug, Clone, Copy)]
pub struct RegistrationDraft<'a> {
    /// Display name.
    pub name: &'a str,
    /// Login email.
    pub email: &'a str,
    /// Chosen password.
    pub password: &'a str,
    /// Requested role name.
    pub role: &'a str,
    /// Postal address.
    pub address: &'a str,
    /// Contact phone number.
    pub phone_number: &'a str,
}

impl RegistrationRequest {
    /// Validate a registration draft.
    pub fn try_new(draft: RegistrationDraft<'_>) -> Result<Self, CredentialsValidationError> {
        let email = draft.email.trim();
        if email.is_empty() {
            return Err(CredentialsValidationError::EmptyEmail);
        }
        if draft.password.is_empty() {
            return Err(CredentialsValidationError::EmptyPassword);
        }
        let required = |field: &'static str, value: &str| {
            let trimmed = value.trim();
            if trimmed.is_empty() {
                Err(CredentialsValidationError::EmptyField { field })
            } else {
                Ok(trimmed.to_owned())
            }
        };
        Ok(Self {
            name: required("name", draft.name)?,
            email: email.to_owned(),
            password: Zeroizing::new(draft.password.to_owned()),
            role: required("role", draft.role)?,
            address: draft.address.trim().to_owned(),
            phone_number: draft.phone_number.trim().to_owned(),
        })
    }

    /// Login email of the new account.
    pub fn email(&self) -> &str {
        self.email.as_str()
    }

    pub(crate) fn payload(&self) -> RegistrationPayload<'_> {
        RegistrationPayload {
            name: &self.name,
            email: &self.email,
            password: self.password.as_str(),
            role: &self.role,
            address: &self.address,
            phone_number: &self.phone_number,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RegistrationPayload<'a> {
    name: &'a str,
    email: &'a str,
    password: &'a str,
    role: &'a str,
    address: &'a str,
    phone_number: &'a str,
}
