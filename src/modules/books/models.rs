use serde::{Deserialize, Serialize};

/// A persisted book row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Book {
    /// Store-assigned identifier, immutable once issued
    pub id: i64,
    pub title: String,
    pub author: String,
    /// Publication year
    pub published: i64,
}

/// Inbound payload for creating a book.
///
/// Absent fields decode to their empty value (`""` / `0`) and are rejected by
/// the validator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BookInput {
    pub title: String,
    pub author: String,
    pub published: i64,
}

/// Inbound payload for a partial update.
///
/// `None` (absent or `null`) keeps the stored value; `Some` overwrites it,
/// including `Some("")` and `Some(0)`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BookPatch {
    pub title: Option<String>,
    pub author: Option<String>,
    pub published: Option<i64>,
}

impl BookPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.author.is_none() && self.published.is_none()
    }
}

/// Empty-value sentinel conversion: `""` and `0` mean "not supplied".
impl From<BookInput> for BookPatch {
    fn from(input: BookInput) -> Self {
        Self {
            title: Some(input.title).filter(|t| !t.is_empty()),
            author: Some(input.author).filter(|a| !a.is_empty()),
            published: Some(input.published).filter(|&p| p != 0),
        }
    }
}
