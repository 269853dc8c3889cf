//! Prints a bcrypt hash of the given password for `ADMIN_PASSWORD_HASH`.

use bcrypt::{hash, DEFAULT_COST};
use std::env;

fn main() {
    let password = env::args().nth(1).unwrap_or_else(|| {
        eprintln!("Usage: hash-password <PASSWORD>");
        std::process::exit(1);
    });

    if password.len() < 8 {
        eprintln!("warning: passwords shorter than 8 characters are easy to guess");
    }

    match hash(&password, DEFAULT_COST) {
        Ok(hashed) => {
            println!("# Paste this into your .env:");
            println!("ADMIN_PASSWORD_HASH={}", hashed);
        }
        Err(e) => {
            eprintln!("Error hashing password: {}", e);
            std::process::exit(1);
        }
    }
}
