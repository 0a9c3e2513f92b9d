mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use warrant_credential::DEFAULT_ITERATIONS;

#[derive(Parser, Debug)]
#[command(name = "warrant", version, about = "Warrant CLI")]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Signing secret management
    Secret {
        #[command(subcommand)]
        cmd: SecretCommand,
    },

    /// Issue, verify and inspect tokens
    Token {
        #[command(subcommand)]
        cmd: TokenCommand,
    },

    /// Hash and verify credentials
    Credential {
        #[command(subcommand)]
        cmd: CredentialCommand,
    },

    /// Configuration file checks
    Config {
        #[command(subcommand)]
        cmd: ConfigCommand,
    },
}

#[derive(Subcommand, Debug)]
enum SecretCommand {
    /// Generate a random signing secret
    Generate {
        /// Write the secret to this file instead of stdout
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
}

#[derive(Subcommand, Debug)]
enum TokenCommand {
    /// Issue a token for a JSON claim set
    Issue {
        /// Claims as a JSON object, e.g. '{"username":"alice"}'
        #[arg(long)]
        claims: String,

        /// Signing secret, or a path to a file containing it
        #[arg(long, env = "WARRANT_TOKEN_SECRET", hide_env_values = true)]
        secret: Option<String>,

        /// Token lifetime (e.g. "5m", "1h")
        #[arg(long, default_value = "5m")]
        ttl: String,

        /// Sign `header.payload` instead of the concatenated segments
        #[arg(long, default_value_t = false)]
        dotted: bool,
    },

    /// Verify a token and print its claims
    Verify {
        token: String,

        /// Signing secret, or a path to a file containing it
        #[arg(long, env = "WARRANT_TOKEN_SECRET", hide_env_values = true)]
        secret: Option<String>,

        /// Token was signed over `header.payload`
        #[arg(long, default_value_t = false)]
        dotted: bool,
    },

    /// Decode a token without verifying its signature
    Inspect { token: String },
}

#[derive(Subcommand, Debug)]
enum CredentialCommand {
    /// Hash a password
    Hash {
        password: String,

        /// Salt as 32 hex characters (random when omitted)
        #[arg(long)]
        salt: Option<String>,

        #[arg(long, default_value_t = DEFAULT_ITERATIONS)]
        iterations: u32,
    },

    /// Check a password against a stored hash; exits non-zero on mismatch
    Verify {
        password: String,
        hash: String,

        #[arg(long, default_value_t = DEFAULT_ITERATIONS)]
        iterations: u32,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Load and validate a configuration file
    Check {
        /// Configuration file (defaults to $WARRANT_CONFIG or warrant.yaml)
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Print the effective configuration
    Show {
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.cmd {
        Command::Secret { cmd } => match cmd {
            SecretCommand::Generate { output } => commands::secret::generate(output)?,
        },

        Command::Token { cmd } => match cmd {
            TokenCommand::Issue {
                claims,
                secret,
                ttl,
                dotted,
            } => println!("{}", commands::token::issue(secret, &claims, &ttl, dotted)?),
            TokenCommand::Verify {
                token,
                secret,
                dotted,
            } => println!("{}", commands::token::verify(secret, &token, dotted)?),
            TokenCommand::Inspect { token } => commands::token::inspect(&token)?,
        },

        Command::Credential { cmd } => match cmd {
            CredentialCommand::Hash {
                password,
                salt,
                iterations,
            } => println!(
                "{}",
                commands::credential::hash(&password, salt.as_deref(), iterations).await?
            ),
            CredentialCommand::Verify {
                password,
                hash,
                iterations,
            } => commands::credential::verify(&password, &hash, iterations).await?,
        },

        Command::Config { cmd } => match cmd {
            ConfigCommand::Check { config } => {
                commands::config::check(config.as_deref())?;
            }
            ConfigCommand::Show { config } => commands::config::show(config.as_deref())?,
        },
    }

    Ok(())
}
