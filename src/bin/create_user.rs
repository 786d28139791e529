use std::error::Error;

use clap::Parser;
use rusqlite::Connection;

use wallet_rs::{JwtKeys, NewUser, create_user, encode_token, initialize_db};

/// A utility for registering a user with the wallet_rs server and issuing them a bearer token.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to the application SQLite database.
    #[arg(long, env = "DATABASE_URL")]
    db_path: String,

    /// The secret the server uses to verify bearer tokens.
    #[arg(long, env = "JWT_SECRET", hide_env_values = true)]
    jwt_secret: String,

    /// The user's display name.
    #[arg(long)]
    name: String,

    /// The user's email address.
    #[arg(long)]
    email: String,

    /// The user's handle.
    #[arg(long)]
    username: String,

    /// A link to the user's profile picture.
    #[arg(long)]
    avatar_url: Option<String>,
}

/// Create a user and print a bearer token for them.
fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let connection = Connection::open(&args.db_path)?;
    initialize_db(&connection)?;

    let user = create_user(
        NewUser {
            name: args.name,
            email: args.email,
            username: args.username,
            avatar_url: args.avatar_url,
        },
        &connection,
    )?;

    let token = encode_token(user.id, &JwtKeys::new(&args.jwt_secret))?;

    eprintln!("Created user {} with ID {}", user.username, user.id);
    println!("{token}");

    Ok(())
}
