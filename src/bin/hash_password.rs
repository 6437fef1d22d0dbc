//! Prints an Argon2id PHC hash for a teacher password, for storing in `users.password_hash`.
//!
//! Usage: hash-password <password>   (or pipe the password on stdin)

use exam_portal::session::password::hash_password;
use std::io::BufRead;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let password = match std::env::args().nth(1) {
        Some(password) => password,
        None => {
            let mut line = String::new();
            std::io::stdin().lock().read_line(&mut line)?;
            line.trim_end_matches(['\r', '\n']).to_string()
        }
    };

    if password.is_empty() {
        return Err("password must not be empty".into());
    }

    println!("{}", hash_password(&password)?);
    Ok(())
}
