//! User profiles administered through `/profile`.

use std::fmt;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::error::DomainError;
use crate::domain::ports::ApiRequest;
use crate::domain::resource::{
    EntityId, PayloadError, Resource, ResourceStore, Validate, Verb, checks, member_path,
};

/// A user profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    /// Identifier.
    pub id: EntityId,
    /// Login name.
    #[serde(default)]
    pub username: String,
    /// Role as sent by the server.
    pub role_name: String,
    /// Display name.
    pub name: String,
    /// Gender flag, when recorded.
    #[serde(default)]
    pub gender: Option<bool>,
    /// Contact email.
    pub email: String,
    /// Wallet balance, when the role has one.
    #[serde(default)]
    pub saldo: Option<f64>,
    /// Phone number.
    #[serde(default)]
    pub phone: Option<String>,
}

/// Payload for creating a profile.
#[derive(Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUserProfile {
    /// Login name.
    pub username: String,
    /// Initial password.
    pub password: String,
    /// Role name.
    pub role_name: String,
    /// Display name.
    pub name: String,
    /// Gender flag.
    pub gender: bool,
    /// Contact email.
    pub email: String,
    /// Phone number.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

impl fmt::Debug for NewUserProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NewUserProfile")
            .field("username", &self.username)
            .field("role_name", &self.role_name)
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

impl Validate for NewUserProfile {
    fn validate(&self) -> Result<(), PayloadError> {
        checks::non_blank("username", &self.username)?;
        checks::non_blank("password", &self.password)?;
        checks::non_blank("roleName", &self.role_name)?;
        checks::non_blank("name", &self.name)?;
        checks::non_blank("email", &self.email)
    }
}

/// Payload for updating a profile. The id travels in the body.
#[derive(Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfileUpdate {
    /// Profile being updated.
    pub id: EntityId,
    /// Login name.
    pub username: String,
    /// Display name.
    pub name: String,
    /// Password to keep or set.
    pub password: String,
    /// Gender flag.
    pub gender: bool,
    /// Contact email.
    pub email: String,
    /// Wallet balance.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub saldo: Option<f64>,
    /// Phone number.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

impl fmt::Debug for UserProfileUpdate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserProfileUpdate")
            .field("id", &self.id)
            .field("username", &self.username)
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

impl Validate for UserProfileUpdate {
    fn validate(&self) -> Result<(), PayloadError> {
        checks::non_blank("username", &self.username)?;
        checks::non_blank("name", &self.name)?;
        checks::non_blank("email", &self.email)?;
        if let Some(saldo) = self.saldo {
            checks::non_negative("saldo", saldo)?;
        }
        Ok(())
    }
}

impl Resource for UserProfile {
    type Create = NewUserProfile;
    type Update = UserProfileUpdate;

    const KIND: &'static str = "user";
    const LABEL: &'static str = "User";
    const COLLECTION: &'static str = "/profile";

    fn id(&self) -> &EntityId {
        &self.id
    }

    fn create_request(payload: &NewUserProfile) -> Result<ApiRequest, serde_json::Error> {
        ApiRequest::post(format!("{}/create", Self::COLLECTION)).with_json(payload)
    }

    fn update_request(
        _id: &EntityId,
        payload: &UserProfileUpdate,
    ) -> Result<ApiRequest, serde_json::Error> {
        ApiRequest::put(format!("{}/update", Self::COLLECTION)).with_json(payload)
    }
}

/// A balance top-up made by a customer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopUp {
    /// Identifier.
    pub id: EntityId,
    /// Customer whose balance was topped up.
    pub end_user_id: EntityId,
    /// Amount added.
    pub amount: f64,
    /// Payment method used.
    pub payment_method_id: EntityId,
    /// Display name of the payment method, when known.
    #[serde(default)]
    pub method_name: Option<String>,
    /// Processing status, e.g. `SUCCESS`.
    pub status: String,
    /// When the top-up was requested.
    pub created_at: NaiveDateTime,
}

impl ResourceStore<UserProfile> {
    /// Replace the cache with the users holding `role_name`.
    ///
    /// # Errors
    ///
    /// Returns the normalised failure; the cache is left untouched.
    pub async fn list_by_role(&self, role_name: &str) -> Result<Vec<UserProfile>, DomainError> {
        let request = UserProfile::list_request().with_query("role", role_name);
        self.replace_items(Ok(request)).await
    }

    /// Search customers by name and email fragments. The cache is not touched.
    ///
    /// # Errors
    ///
    /// Returns the normalised failure.
    pub async fn customers(
        &self,
        name: Option<&str>,
        email: Option<&str>,
    ) -> Result<Vec<UserProfile>, DomainError> {
        let request = ApiRequest::get(format!("{}/get-customer", UserProfile::COLLECTION))
            .with_query("name", name.unwrap_or_default())
            .with_query("email", email.unwrap_or_default());
        let found = self
            .run_detached::<Vec<UserProfile>>(Verb::Listed, Ok(request))
            .await?;
        Ok(found.unwrap_or_default())
    }

    /// Top-up history of `customer`. The cache is not touched.
    ///
    /// # Errors
    ///
    /// Returns the normalised failure.
    pub async fn top_ups(&self, customer: &EntityId) -> Result<Vec<TopUp>, DomainError> {
        let path = format!("{}/top-up", member_path(UserProfile::COLLECTION, customer));
        let found = self
            .run_detached::<Vec<TopUp>>(Verb::Listed, Ok(ApiRequest::get(path)))
            .await?;
        Ok(found.unwrap_or_default())
    }
}
