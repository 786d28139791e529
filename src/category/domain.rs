//! Core category domain types.

use std::fmt::Display;

use serde::Serialize;
use time::OffsetDateTime;

use crate::{Cents, Error, Period, UserID, database_id::CategoryId};

/// A validated, non-empty category name.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Hash)]
pub struct CategoryName(String);

impl CategoryName {
    /// Create a category name.
    ///
    /// # Errors
    ///
    /// This function will return an [Error::EmptyName] if `name` is an empty string.
    pub fn new(name: &str) -> Result<Self, Error> {
        let name = name.trim();

        if name.is_empty() {
            Err(Error::EmptyName)
        } else {
            Ok(Self(name.to_owned()))
        }
    }

    /// Create a category name without validation.
    ///
    /// The caller should ensure that the string is not empty.
    pub fn new_unchecked(name: &str) -> Self {
        Self(name.to_owned())
    }
}

impl AsRef<str> for CategoryName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Display for CategoryName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A hex color such as `#f80` or `#ff8800`, stored in lowercase.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Hash)]
pub struct Color(String);

impl Color {
    /// Create a color from `#RGB` or `#RRGGBB` hex notation.
    ///
    /// # Errors
    ///
    /// This function will return an [Error::InvalidColor] if `color` is not a hex color.
    pub fn new(color: &str) -> Result<Self, Error> {
        let color = color.trim();

        let is_hex_color = color.strip_prefix('#').is_some_and(|digits| {
            matches!(digits.len(), 3 | 6) && digits.bytes().all(|b| b.is_ascii_hexdigit())
        });

        if is_hex_color {
            Ok(Self(color.to_ascii_lowercase()))
        } else {
            Err(Error::InvalidColor(color.to_owned()))
        }
    }

    /// Create a color without validation.
    ///
    /// The caller should ensure that the string is a hex color.
    pub fn new_unchecked(color: &str) -> Self {
        Self(color.to_owned())
    }
}

impl AsRef<str> for Color {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// A user defined group of transactions, e.g. 'Groceries'.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Category {
    /// The ID of the category.
    pub id: CategoryId,
    /// The user that owns the category.
    pub user_id: UserID,
    /// The name of the category.
    pub name: CategoryName,
    /// The color the category is shown with.
    pub color: Color,
    /// When the category was created.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// The sum of a category's entries in one period.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryAmount {
    /// The ID of the category.
    pub id: CategoryId,
    /// The user that owns the category.
    pub user_id: UserID,
    /// The name of the category.
    pub name: String,
    /// The color of the category.
    pub color: String,
    /// The period the entries fall in.
    pub period: Period,
    /// The sum of the entries.
    pub total_amount: Cents,
}

#[cfg(test)]
mod tests {
    use crate::{
        Error,
        category::{CategoryName, Color},
    };

    #[test]
    fn name_fails_on_empty_string() {
        assert_eq!(CategoryName::new(""), Err(Error::EmptyName));
        assert_eq!(CategoryName::new("\n\t "), Err(Error::EmptyName));
    }

    #[test]
    fn name_is_trimmed() {
        assert_eq!(CategoryName::new("  Food ").unwrap().as_ref(), "Food");
    }

    #[test]
    fn accepts_short_and_long_hex_colors() {
        assert_eq!(Color::new("#F80").unwrap().as_ref(), "#f80");
        assert_eq!(Color::new("#ff8800").unwrap().as_ref(), "#ff8800");
    }

    #[test]
    fn rejects_other_colors() {
        for color in ["", "red", "ff8800", "#ff88", "#gg8800", "#ff88001"] {
            assert_eq!(
                Color::new(color),
                Err(Error::InvalidColor(color.to_owned())),
                "{color:?} should be rejected"
            );
        }
    }
}
