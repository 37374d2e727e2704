//! User identity.
//!
//! There is no account model: a user is identified by name alone. Every
//! user-scoped operation takes a [`UserName`], so a request without an
//! identity is rejected before it reaches the store.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// A non-blank user name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserName(String);

impl UserName {
  /// Validate an optional identity. `None`, empty, and whitespace-only names
  /// are all [`Error::MissingUser`].
  pub fn parse(raw: Option<&str>) -> Result<Self> {
    match raw.map(str::trim) {
      Some(name) if !name.is_empty() => Ok(Self(name.to_owned())),
      _ => Err(Error::MissingUser),
    }
  }

  pub fn as_str(&self) -> &str { &self.0 }
}

impl fmt::Display for UserName {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.0)
  }
}

impl TryFrom<String> for UserName {
  type Error = Error;

  fn try_from(value: String) -> Result<Self> { Self::parse(Some(&value)) }
}

impl From<UserName> for String {
  fn from(value: UserName) -> Self { value.0 }
}
