//! Client-side validation errors. These are raised before any request is
//! made and always name the offending field.

use regex::Regex;
use std::fmt;
use thiserror::Error;

lazy_static::lazy_static! {
    /// `local@domain.tld`: no whitespace, exactly one `@`, a dot in the domain.
    static ref EMAIL_REGEX: Regex = Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap();
}

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_REGEX.is_match(email)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Name,
    Email,
    Message,
    File,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Field::Name => "name",
            Field::Email => "email",
            Field::Message => "message",
            Field::File => "file",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{0} is required")]
    EmptyField(Field),

    #[error("{0} is not valid")]
    InvalidFormat(Field),

    #[error("file must be an image")]
    NotAnImage,

    #[error("file is {size} bytes; the limit is {max}")]
    FileTooLarge { size: u64, max: u64 },
}

impl ValidationError {
    pub fn field(&self) -> Field {
        match self {
            ValidationError::EmptyField(field) | ValidationError::InvalidFormat(field) => *field,
            ValidationError::NotAnImage | ValidationError::FileTooLarge { .. } => Field::File,
        }
    }
}
