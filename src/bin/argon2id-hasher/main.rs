use anyhow::anyhow;
use argon2id_hasher::{Argon2idHasher, Config, HashError, HashScheme};
use clap::{Parser, Subcommand};
use dotenvy::dotenv;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::{Layer, layer::SubscriberExt, util::SubscriberInitExt};

mod output;
use output::{CliError, HashOutput, IdentifyOutput, Output, VerifyOutput};
mod secret;
use secret::read_secret;

#[derive(Parser)]
#[command(name = "argon2id-hasher")]
#[command(about = "Hash and verify secrets with argon2id", long_about = None)]
#[command(version)]
struct Cli {
    /// Output results in JSON format
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Hash a secret with the configured cost parameters
    Hash {
        /// Read the secret from stdin instead of prompting
        #[arg(long)]
        stdin: bool,
    },

    /// Check a secret against a stored record
    Verify {
        /// Stored argon2id record
        record: String,

        /// Read the secret from stdin instead of prompting
        #[arg(long)]
        stdin: bool,
    },

    /// Tell whether a stored record is an argon2id record and show its parameters
    Identify {
        /// Stored record
        record: String,
    },
}

fn main() -> Result<(), anyhow::Error> {
    if let Err(err) = dotenv()
        && !err.not_found()
    {
        return Err(anyhow!("Error while loading .env file: {err}"));
    }

    let config = match Config::parse_environment() {
        Ok(c) => c,
        Err(errors) => {
            return Err(anyhow!(
                "Failed to parse environment variables for configuration with errors: {}",
                errors
                    .into_iter()
                    .map(|e| e.to_string())
                    .collect::<Vec<String>>()
                    .join(", ")
            ));
        }
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_filter(Into::<LevelFilter>::into(config.log_level)),
        )
        .init();

    let cli = Cli::parse();
    let output = Output::new(cli.json);
    let max_memory = config.max_memory;
    let hasher = Argon2idHasher::new(config).with_max_memory(max_memory);

    let result: Result<bool, CliError> = match cli.command {
        Commands::Hash { stdin } => read_secret("Secret: ", stdin)
            .map_err(CliError::from)
            .and_then(|secret| {
                let record = hasher.generate(secret.unsafe_inner().as_bytes())?;
                output.success(&HashOutput {
                    record: record.into_string(),
                });
                Ok(true)
            }),
        Commands::Verify { record, stdin } => read_secret("Secret: ", stdin)
            .map_err(CliError::from)
            .and_then(|secret| {
                match hasher.verify(secret.unsafe_inner().as_bytes(), record.as_bytes()) {
                    Ok(()) => {
                        output.success(&VerifyOutput { matches: true });
                        Ok(true)
                    }
                    Err(HashError::MismatchedHashAndPassword) => {
                        output.success(&VerifyOutput { matches: false });
                        Ok(false)
                    }
                    Err(e) => Err(e.into()),
                }
            }),
        Commands::Identify { record } => {
            output.success(&IdentifyOutput::from(hasher.identify(record.as_bytes())));
            Ok(true)
        }
    };

    match result {
        Ok(true) => Ok(()),
        Ok(false) => std::process::exit(1),
        Err(e) => {
            output.error(&e);
            std::process::exit(1);
        }
    }
}

