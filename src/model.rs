//! User records as the backend returns them and as the form submits them.
//!
//! Backends disagree on the record shape: the location may be nested under
//! `location` or spread over flat `city`/`state`/`country` keys, and the
//! identifier may be `id`, `userId` or `_id` (sometimes several at once).
//! [`User`] decodes all of them; the form works with flat fields, and
//! `UserFormData::from_user` / `UserFormData::to_payload` convert between them.

use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize};

/// A user record as returned by the backend.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "RawUser")]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    pub birth_date: String,
    pub location: Location,
}

/// Wire shape accepted for [`User`]. Every identifier key and both location
/// layouts are read independently so that none of them collide.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawUser {
    #[serde(default, deserialize_with = "id_from_json")]
    id: Option<String>,
    #[serde(default, rename = "userId", deserialize_with = "id_from_json")]
    user_id: Option<String>,
    #[serde(default, rename = "_id", deserialize_with = "id_from_json")]
    object_id: Option<String>,
    name: String,
    email: String,
    #[serde(default)]
    birth_date: Option<String>,
    #[serde(default)]
    location: Option<Location>,
    #[serde(default)]
    city: Option<String>,
    #[serde(default)]
    state: Option<String>,
    #[serde(default)]
    country: Option<String>,
}

impl TryFrom<RawUser> for User {
    type Error = String;

    fn try_from(raw: RawUser) -> Result<Self, Self::Error> {
        let id = raw
            .id
            .or(raw.user_id)
            .or(raw.object_id)
            .ok_or_else(|| "user record has no id, userId or _id".to_string())?;
        // Nested wins; flat keys only fill in when there is no `location` object.
        let location = raw.location.unwrap_or_else(|| Location {
            city: raw.city.unwrap_or_default(),
            state: raw.state.unwrap_or_default(),
            country: raw.country.unwrap_or_default(),
        });
        Ok(Self {
            id,
            name: raw.name,
            email: raw.email,
            birth_date: raw.birth_date.unwrap_or_default(),
            location,
        })
    }
}

/// Nested location sub-object.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub country: String,
}

impl User {
    /// Birth date without any time component, e.g. `2000-01-01`.
    pub fn birth_date_only(&self) -> &str {
        date_only(&self.birth_date)
    }

    /// "city, state" line shown on cards.
    pub fn location_line(&self) -> String {
        format!("{}, {}", self.location.city, self.location.state)
    }
}

/// Request body for create (with password) and update (without).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPayload {
    pub name: String,
    pub email: String,
    pub birth_date: String,
    pub city: String,
    pub state: String,
    pub country: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

/// Flat field values edited by the form.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct UserFormData {
    pub name: String,
    pub email: String,
    pub birth_date: String,
    pub city: String,
    pub state: String,
    pub country: String,
    pub password: String,
}

impl UserFormData {
    /// Reshape a backend record for editing.
    pub fn from_user(user: &User) -> Self {
        Self {
            name: user.name.clone(),
            email: user.email.clone(),
            birth_date: user.birth_date_only().to_string(),
            city: user.location.city.clone(),
            state: user.location.state.clone(),
            country: user.location.country.clone(),
            password: String::new(),
        }
    }

    /// Build the request body. Text fields are trimmed; the password is sent
    /// exactly as typed and only when `include_password` is set.
    pub fn to_payload(&self, include_password: bool) -> UserPayload {
        UserPayload {
            name: self.name.trim().to_string(),
            email: self.email.trim().to_string(),
            birth_date: self.birth_date.trim().to_string(),
            city: self.city.trim().to_string(),
            state: self.state.trim().to_string(),
            country: self.country.trim().to_string(),
            password: include_password.then(|| self.password.clone()),
        }
    }
}

/// Text before the first `T`, which strips the time part of an ISO timestamp.
pub fn date_only(raw: &str) -> &str {
    raw.split('T').next().unwrap_or(raw)
}

/// Render a backend birth date as `M/D/YYYY`. Timestamps are read in UTC.
/// Anything unparseable is returned unchanged.
pub fn format_birth_date(raw: &str) -> String {
    let trimmed = raw.trim();
    let date = DateTime::parse_from_rfc3339(trimmed)
        .map(|dt| dt.naive_utc().date())
        .or_else(|_| NaiveDate::parse_from_str(date_only(trimmed), "%Y-%m-%d"));
    match date {
        Ok(d) => d.format("%-m/%-d/%Y").to_string(),
        Err(_) => raw.to_string(),
    }
}

/// String or numeric identifier; `null` counts as absent.
fn id_from_json<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::Null => Ok(None),
        serde_json::Value::String(s) => Ok(Some(s)),
        serde_json::Value::Number(n) => Ok(Some(n.to_string())),
        other => Err(serde::de::Error::custom(format!(
            "expected string or number for user id, found {other}"
        ))),
    }
}
