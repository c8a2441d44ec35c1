use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::users::{Phone, User};

/// Phone as it appears on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhoneDto {
    #[serde(default)]
    pub number: String,
    #[serde(default)]
    pub citycode: String,
    #[serde(default)]
    pub contrycode: String,
}

impl From<PhoneDto> for Phone {
    fn from(p: PhoneDto) -> Self {
        Self {
            number: p.number,
            citycode: p.citycode,
            contrycode: p.contrycode,
        }
    }
}

impl From<&Phone> for PhoneDto {
    fn from(p: &Phone) -> Self {
        Self {
            number: p.number.clone(),
            citycode: p.citycode.clone(),
            contrycode: p.contrycode.clone(),
        }
    }
}

/// Request body for user registration. Missing fields default to empty so
/// they are reported by validation instead of failing deserialization.
#[derive(Debug, Default, Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub phones: Vec<PhoneDto>,
}

/// Request body for login.
#[derive(Debug, Default, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Read projection of a user returned by every auth endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phones: Vec<PhoneDto>,
    #[serde(with = "time::serde::rfc3339")]
    pub created: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub modified: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub last_login: OffsetDateTime,
    pub token: Option<String>,
    pub is_active: bool,
}

impl From<&User> for UserProfile {
    fn from(u: &User) -> Self {
        Self {
            id: u.id,
            name: u.name.clone(),
            email: u.email.clone(),
            phones: u.phones.iter().map(PhoneDto::from).collect(),
            created: u.created,
            modified: u.modified,
            last_login: u.last_login,
            token: u.token.clone(),
            is_active: u.is_active,
        }
    }
}
