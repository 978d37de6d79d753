use crate::error::ModelError;
use uuid::Uuid;

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident, $label:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        #[cfg_attr(feature = "serde", serde(transparent))]
        pub struct $name(String);

        impl $name {
            pub fn new(id: impl Into<String>) -> Result<Self, ModelError> {
                let id = id.into();
                let trimmed = id.trim();
                if trimmed.is_empty() {
                    return Err(ModelError::InvalidId(format!(
                        "{} cannot be empty",
                        $label
                    )));
                }
                Ok(Self(trimmed.to_string()))
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl std::str::FromStr for $name {
            type Err = ModelError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::new(s)
            }
        }
    };
}

string_id!(
    /// Course document identifier as issued by the course store.
    CourseId,
    "course id"
);

string_id!(
    /// Identifier of the signed-in learner.
    UserId,
    "user id"
);

/// Chapter identifier.
///
/// Course documents store chapter ids as numbers while routes and enrollment
/// records carry them as strings, so the id is kept in its string form and
/// compared textually.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct ChapterId(String);

impl ChapterId {
    pub fn new(id: impl Into<String>) -> Result<Self, ModelError> {
        let id = id.into();
        let trimmed = id.trim();
        if trimmed.is_empty() {
            return Err(ModelError::InvalidId(
                "chapter id cannot be empty".to_string(),
            ));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn from_ordinal(ordinal: u32) -> Self {
        Self(ordinal.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// 1-based position of the chapter when the id is numeric.
    pub fn ordinal(&self) -> Option<u32> {
        self.0.parse().ok()
    }
}

impl AsRef<str> for ChapterId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ChapterId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for ChapterId {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for ChapterId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(serde::Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(u64),
            Text(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Number(n) => Ok(ChapterId(n.to_string())),
            Raw::Text(s) => ChapterId::new(s).map_err(serde::de::Error::custom),
        }
    }
}

/// Identity of one chapter view session.
///
/// A fresh id is minted every time a chapter view starts, including when the
/// learner navigates between chapters of the same course.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SessionId(pub Uuid);

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionId {
    pub fn new() -> Self {
        SessionId(Uuid::now_v7())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_ids_are_rejected() {
        assert!(CourseId::new("  ").is_err());
        assert!(ChapterId::new("").is_err());
        assert!(UserId::new("u-1").is_ok());
    }

    #[test]
    fn chapter_ordinal_parses_numeric_ids() {
        assert_eq!(ChapterId::new("3").unwrap().ordinal(), Some(3));
        assert_eq!(ChapterId::new("intro").unwrap().ordinal(), None);
        assert_eq!(ChapterId::from_ordinal(7).as_str(), "7");
    }

    #[cfg(feature = "serde")]
    #[test]
    fn chapter_id_accepts_numbers_and_strings() {
        let from_number: ChapterId = serde_json::from_str("4").unwrap();
        let from_text: ChapterId = serde_json::from_str("\"4\"").unwrap();
        assert_eq!(from_number, from_text);
    }
}
