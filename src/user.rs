//! Code for creating the users table and fetching users from the database.

use std::fmt::Display;

use rusqlite::{Connection, Row};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::{Error, filter::FilterValue};

/// A newtype wrapper for integer user IDs.
///
/// This helps disambiguate user IDs from other types of IDs, leading to better compile time
/// errors, and more flexible generics that can have distinct implementations for multiple ID types.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct UserID(i64);

impl UserID {
    /// Create a new user ID.
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    /// Cast the user ID to a 64 bit integer.
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl Display for UserID {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl From<UserID> for FilterValue {
    fn from(user_id: UserID) -> Self {
        user_id.as_i64().into()
    }
}

/// A user of the application.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct User {
    /// The user's ID in the application database.
    pub id: UserID,
    /// The user's display name.
    pub name: String,
    /// The user's email address, unique across users.
    pub email: String,
    /// The user's handle, unique across users.
    pub username: String,
    /// A link to the user's profile picture.
    pub avatar_url: Option<String>,
    /// When the user was created.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// The data needed to register a user.
#[derive(Debug, Clone, PartialEq)]
pub struct NewUser {
    /// The user's display name.
    pub name: String,
    /// The user's email address.
    pub email: String,
    /// The user's handle.
    pub username: String,
    /// A link to the user's profile picture.
    pub avatar_url: Option<String>,
}

/// Create the users table.
///
/// # Errors
///
/// This function will return an error if the SQL query failed.
pub fn create_user_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS users (
                id INTEGER PRIMARY KEY,
                name TEXT NOT NULL,
                email TEXT NOT NULL UNIQUE,
                username TEXT NOT NULL UNIQUE,
                avatar_url TEXT,
                created_at TEXT NOT NULL
                )",
        (),
    )?;

    Ok(())
}

/// Create and insert a new user into the database.
///
/// # Errors
///
/// This function will return an error if:
/// - the name, email or username is empty ([Error::EmptyName]),
/// - the email address is already registered ([Error::DuplicateEmail]),
/// - the username is already taken ([Error::DuplicateUsername]),
/// - an SQL related error occurred.
pub fn create_user(new_user: NewUser, connection: &Connection) -> Result<User, Error> {
    if [&new_user.name, &new_user.email, &new_user.username]
        .iter()
        .any(|field| field.trim().is_empty())
    {
        return Err(Error::EmptyName);
    }

    let created_at = OffsetDateTime::now_utc();

    connection.execute(
        "INSERT INTO users (name, email, username, avatar_url, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5)",
        (
            &new_user.name,
            &new_user.email,
            &new_user.username,
            &new_user.avatar_url,
            created_at,
        ),
    )?;

    let id = UserID::new(connection.last_insert_rowid());

    Ok(User {
        id,
        name: new_user.name,
        email: new_user.email,
        username: new_user.username,
        avatar_url: new_user.avatar_url,
        created_at,
    })
}

/// Get the user from the database with an ID equal to `user_id`.
///
/// # Errors
///
/// This function will return an error if:
/// - `user_id` does not belong to a registered user.
/// - there was an error trying to access the store.
pub fn get_user_by_id(user_id: UserID, connection: &Connection) -> Result<User, Error> {
    connection
        .prepare(
            "SELECT id, name, email, username, avatar_url, created_at FROM users WHERE id = :id",
        )?
        .query_row(&[(":id", &user_id.as_i64())], map_row)
        .map_err(|error| error.into())
}

/// Get the user with the given `username`.
///
/// # Errors
///
/// Returns [Error::NotFound] if no user has the username, or an error if the query failed.
pub fn get_user_by_username(username: &str, connection: &Connection) -> Result<User, Error> {
    connection
        .prepare(
            "SELECT id, name, email, username, avatar_url, created_at FROM users \
            WHERE username = :username",
        )?
        .query_row(&[(":username", username)], map_row)
        .map_err(|error| error.into())
}

fn map_row(row: &Row) -> Result<User, rusqlite::Error> {
    Ok(User {
        id: UserID::new(row.get(0)?),
        name: row.get(1)?,
        email: row.get(2)?,
        username: row.get(3)?,
        avatar_url: row.get(4)?,
        created_at: row.get(5)?,
    })
}

#[cfg(test)]
pub(crate) fn create_test_user(connection: &Connection) -> User {
    create_user(
        NewUser {
            name: "Test User".to_owned(),
            email: "test@example.com".to_owned(),
            username: "test".to_owned(),
            avatar_url: None,
        },
        connection,
    )
    .expect("Could not create test user")
}
