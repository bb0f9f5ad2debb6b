//! Account management against the credential store.

use std::io::BufRead;

use anyhow::Context;
use clap::Subcommand;
use ytdash_core::AppConfig;

#[derive(Debug, Subcommand)]
pub enum UserCommands {
    /// Create an account
    Create {
        email: String,
        /// Password; read from stdin when not given
        #[arg(long, env = "YTDASH_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },
    /// Check a password against an existing account
    Verify {
        email: String,
        /// Password; read from stdin when not given
        #[arg(long, env = "YTDASH_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },
}

/// # Errors
///
/// Returns an error if the password cannot be read or the account operation
/// fails; the message carries the store's reason.
pub(crate) async fn run_user(
    pool: &sqlx::PgPool,
    config: &AppConfig,
    command: &UserCommands,
) -> anyhow::Result<()> {
    match command {
        UserCommands::Create { email, password } => {
            let password = resolve_password(password.as_deref())?;
            let user =
                ytdash_db::create_account(pool, email, &password, &config.allowed_email_domains)
                    .await?;
            println!("created account {}", user.email);
        }
        UserCommands::Verify { email, password } => {
            let password = resolve_password(password.as_deref())?;
            let user = ytdash_db::verify_account(pool, email, &password).await?;
            println!("verified account {}", user.email);
        }
    }
    Ok(())
}

fn resolve_password(flag: Option<&str>) -> anyhow::Result<String> {
    if let Some(password) = flag {
        return Ok(password.to_string());
    }
    let mut line = String::new();
    std::io::stdin()
        .lock()
        .read_line(&mut line)
        .context("failed to read password from stdin")?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}
