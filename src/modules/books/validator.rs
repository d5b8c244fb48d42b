use thiserror::Error;

use super::models::BookInput;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("title is required")]
    MissingTitle,
    #[error("author is required")]
    MissingAuthor,
    #[error("published year must be greater than 0")]
    InvalidPublishedYear,
}

impl ValidationError {
    /// Name of the offending payload field
    pub fn field(&self) -> &'static str {
        match self {
            ValidationError::MissingTitle => "title",
            ValidationError::MissingAuthor => "author",
            ValidationError::InvalidPublishedYear => "published",
        }
    }

    pub fn reason(&self) -> &'static str {
        match self {
            ValidationError::MissingTitle | ValidationError::MissingAuthor => "required",
            ValidationError::InvalidPublishedYear => "must_be_positive",
        }
    }
}

/// Check a create payload. Title, author and year are checked in that order;
/// the first failure wins.
pub fn validate(input: &BookInput) -> Result<(), ValidationError> {
    if input.title.is_empty() {
        return Err(ValidationError::MissingTitle);
    }
    if input.author.is_empty() {
        return Err(ValidationError::MissingAuthor);
    }
    if input.published <= 0 {
        return Err(ValidationError::InvalidPublishedYear);
    }
    Ok(())
}
