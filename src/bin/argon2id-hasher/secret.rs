use std::io::{self, BufRead, Write};

use argon2id_hasher::newtypes::Opaque;

/// Read the secret to hash or verify.
/// Prompts with hidden input, or reads a single line from stdin when `from_stdin` is set.
pub fn read_secret(prompt: &str, from_stdin: bool) -> anyhow::Result<Opaque<String>> {
    let secret = if from_stdin {
        let mut line = String::new();
        io::stdin().lock().read_line(&mut line)?;
        let trimmed = line.trim_end_matches(['\r', '\n']).len();
        line.truncate(trimmed);
        line
    } else {
        eprint!("{}", prompt);
        io::stderr().flush()?;
        rpassword::read_password()?
    };
    Ok(Opaque::new(secret))
}
