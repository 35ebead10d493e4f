//! Logical vault addresses and their physical object key encoding.
//!
//! Every value lives at `<category>/<user>/<key>` inside a bucket, where
//! `category` is `public` or `private`. The key suffix may contain further
//! `/` separators; the user segment may not.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Result, VaultError};

const DELIMITER: char = '/';

/// Outermost namespace component of a physical key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    Public,
    Private,
}

impl Visibility {
    pub fn from_public(public: bool) -> Self {
        if public {
            Visibility::Public
        } else {
            Visibility::Private
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Visibility::Public => "public",
            Visibility::Private => "private",
        }
    }

    /// Listing prefix covering every value in this category.
    pub fn prefix(&self) -> String {
        format!("{}{}", self.as_str(), DELIMITER)
    }

    fn from_category(category: &str) -> Option<Self> {
        match category {
            "public" => Some(Visibility::Public),
            "private" => Some(Visibility::Private),
            _ => None,
        }
    }
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Address of one exact value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Path {
    pub bucket: String,
    pub key: String,
    /// Empty means "resolve via the identity service" for read and write.
    pub user: String,
    pub public: bool,
}

impl Path {
    pub fn new(bucket: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            key: key.into(),
            user: String::new(),
            public: false,
        }
    }

    pub fn user(mut self, user: impl Into<String>) -> Self {
        self.user = user.into();
        self
    }

    pub fn public(mut self, public: bool) -> Self {
        self.public = public;
        self
    }

    pub fn visibility(&self) -> Visibility {
        Visibility::from_public(self.public)
    }
}

/// Address of a class of values sharing a key and visibility, one per user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    pub bucket: String,
    pub key: String,
    pub public: bool,
}

impl Query {
    pub fn new(bucket: impl Into<String>, key: impl Into<String>, public: bool) -> Self {
        Self {
            bucket: bucket.into(),
            key: key.into(),
            public,
        }
    }

    pub fn visibility(&self) -> Visibility {
        Visibility::from_public(self.public)
    }
}

/// A physical key split back into its parts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedKey<'a> {
    pub visibility: Visibility,
    pub user: &'a str,
    pub suffix: &'a str,
}

/// Build the physical key for `path` stored under `user`.
///
/// No escaping is applied. Callers must check the user with
/// [`validate_user`] first if it did not come from the identity resolver.
pub fn encode(path: &Path, user: &str) -> String {
    format!(
        "{}{}{}{}{}",
        path.visibility(),
        DELIMITER,
        user,
        DELIMITER,
        path.key
    )
}

/// Split a physical key into `(visibility, user, suffix)`.
pub fn decode(key: &str) -> Result<DecodedKey<'_>> {
    let mut parts = key.splitn(3, DELIMITER);
    match (parts.next(), parts.next(), parts.next()) {
        (Some(category), Some(user), Some(suffix)) => Ok(DecodedKey {
            visibility: Visibility::from_category(category)
                .ok_or_else(|| VaultError::MalformedKey(key.to_string()))?,
            user,
            suffix,
        }),
        _ => Err(VaultError::MalformedKey(key.to_string())),
    }
}

/// Reject users that would corrupt the key layout.
pub fn validate_user(user: &str) -> Result<()> {
    if user.is_empty() || user.contains(DELIMITER) {
        return Err(VaultError::InvalidUser(user.to_string()));
    }
    Ok(())
}

/// Convert an encoded key into an object store location.
///
/// Unlike `object_store::path::Path::from`, this refuses keys with empty or
/// relative segments instead of silently rewriting them. `Path::parse` drops
/// a trailing `/`, so a key whose parsed form differs is refused as well.
pub(crate) fn location(key: &str) -> Result<object_store::path::Path> {
    let parsed = object_store::path::Path::parse(key)?;
    if parsed.as_ref() != key {
        return Err(VaultError::InvalidKey(
            object_store::path::Error::EmptySegment {
                path: key.to_string(),
            },
        ));
    }
    Ok(parsed)
}
