// Wire types for the users collection.
//
// Field names follow the JSON served by the collection endpoint; the few
// camelCase keys are renamed explicitly.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Geographic coordinates, served as decimal strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Geo {
    pub lat: String,
    pub lng: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    #[serde(default)]
    pub street: String,
    #[serde(default)]
    pub suite: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub zipcode: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geo: Option<Geo>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Company {
    #[serde(default)]
    pub name: String,
    #[serde(
        rename = "catchPhrase",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub catch_phrase: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bs: Option<String>,
}

/// A user record as returned by the server.
///
/// `id` is assigned by the server and never generated locally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: u64,
    pub name: String,
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub website: String,
    #[serde(default)]
    pub address: Address,
    #[serde(default)]
    pub company: Company,
}

/// Payload for create and full-replacement update requests.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserFormData {
    pub name: String,
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub website: String,
    #[serde(default)]
    pub address: Address,
    #[serde(default)]
    pub company: Company,
}

impl From<&User> for UserFormData {
    fn from(user: &User) -> Self {
        Self {
            name: user.name.clone(),
            username: user.username.clone(),
            email: user.email.clone(),
            phone: user.phone.clone(),
            website: user.website.clone(),
            address: user.address.clone(),
            company: user.company.clone(),
        }
    }
}

/// Field name -> messages, ordered by field for stable output.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ValidationErrors(BTreeMap<String, Vec<String>>);

impl ValidationErrors {
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0
            .entry(field.to_owned())
            .or_default()
            .push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn field(&self, field: &str) -> &[String] {
        self.0.get(field).map_or(&[], Vec::as_slice)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }
}

impl std::fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut first = true;
        for (field, messages) in self.iter() {
            for message in messages {
                if !first {
                    f.write_str("; ")?;
                }
                write!(f, "{field}: {message}")?;
                first = false;
            }
        }
        Ok(())
    }
}

impl UserFormData {
    /// Check the fields a create/update form requires before submission.
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::default();

        if self.name.trim().is_empty() {
            errors.add("name", "Name is required");
        }
        if self.username.trim().is_empty() {
            errors.add("username", "Username is required");
        }
        if self.email.trim().is_empty() {
            errors.add("email", "Email is required");
        } else if !looks_like_email(self.email.trim()) {
            errors.add("email", "Email is invalid");
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

fn looks_like_email(value: &str) -> bool {
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && !value.contains(char::is_whitespace)
        && domain
            .split_once('.')
            .is_some_and(|(host, tld)| !host.is_empty() && !tld.is_empty())
}
