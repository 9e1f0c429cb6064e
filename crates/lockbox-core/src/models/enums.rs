use serde::{Deserialize, Serialize};

/// Entity kind a tombstone refers to.
///
/// Kinds written by newer builds parse into `Unknown` and keep their raw
/// value, so they survive a merge and a re-upload untouched.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum DeletedItemKind {
    Item,
    Tag,
    Unknown(String),
}

#[derive(Debug)]
pub struct EnumParseError {
    enum_name: &'static str,
    value: String,
}

impl EnumParseError {
    pub(crate) fn new(enum_name: &'static str, value: impl Into<String>) -> Self {
        Self {
            enum_name,
            value: value.into(),
        }
    }
}

impl std::fmt::Display for EnumParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid {} value: {}", self.enum_name, self.value)
    }
}

impl std::error::Error for EnumParseError {}

impl DeletedItemKind {
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Item => "item",
            Self::Tag => "tag",
            Self::Unknown(value) => value.as_str(),
        }
    }

    #[must_use]
    pub const fn is_known(&self) -> bool {
        !matches!(self, Self::Unknown(_))
    }

    /// Strict parse for user-facing input; stored data goes through `From<String>`.
    pub fn parse_known(value: &str) -> Result<Self, EnumParseError> {
        match Self::from(value.to_string()) {
            Self::Unknown(_) => Err(EnumParseError::new("deleted_item_kind", value)),
            kind => Ok(kind),
        }
    }
}

impl std::fmt::Display for DeletedItemKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for DeletedItemKind {
    fn from(value: String) -> Self {
        match value.as_str() {
            "item" | "login" => Self::Item,
            "tag" => Self::Tag,
            _ => Self::Unknown(value),
        }
    }
}

impl From<DeletedItemKind> for String {
    fn from(value: DeletedItemKind) -> Self {
        match value {
            DeletedItemKind::Unknown(raw) => raw,
            known => known.as_str().to_string(),
        }
    }
}

impl std::str::FromStr for DeletedItemKind {
    type Err = EnumParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::parse_known(value)
    }
}
