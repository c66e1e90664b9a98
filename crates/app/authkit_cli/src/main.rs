// Import and re-export the `error` module
pub use self::error::{Error, Result};
mod error;

use std::collections::BTreeMap;
use std::time::Duration;

use authkit_core::auth::jwt;
use authkit_core::{AuthConfig, Authenticator, IdentityDraft};
use clap::Parser;
use cli::{Cli, Commands};

mod cli;
mod logging;

fn main() -> Result<()> {
    if let Err(e) = run() {
        log::error!("{}", e);
        std::process::exit(1);
    }
    Ok(())
}

fn run() -> Result<()> {
    if std::env::var_os("AUTHKIT_SKIP_DOTENV").is_none() {
        dotenvy::dotenv().ok();
    }
    logging::init()?;

    let args = Cli::parse();

    match args.command {
        Commands::Version => {
            println!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
        }
        Commands::Validate { token } => {
            // Validation needs only the key, never the database.
            let config = AuthConfig::from_env()?;
            let claims = jwt::validate(&token, &config.signing_key)?;
            println!("{}", serde_json::to_string_pretty(&claims)?);
        }
        command => {
            let config = AuthConfig::from_env()?;
            let runtime = tokio::runtime::Runtime::new()?;
            runtime.block_on(execute(command, &config))?;
        }
    }

    Ok(())
}

/// Commands that need the identity database.
async fn execute(command: Commands, config: &AuthConfig) -> Result<()> {
    let auth = Authenticator::connect(config).await?;

    match command {
        Commands::Migrate => {
            log::info!("migrations applied");
        }
        Commands::Register {
            email,
            password,
            max_permission,
            first_name,
            last_name,
        } => {
            let draft = IdentityDraft::new(email, max_permission).with_name(first_name, last_name);
            let identity = auth.register(draft, &password).await?;
            println!("{}", identity.id);
        }
        Commands::Token {
            email,
            password,
            permission,
            ttl_secs,
            data,
        } => {
            let data = (!data.is_empty()).then(|| data.into_iter().collect::<BTreeMap<_, _>>());
            let token = auth
                .get_token(
                    &email,
                    &password,
                    permission,
                    ttl_secs.map(Duration::from_secs),
                    data,
                )
                .await?;
            println!("{token}");
        }
        Commands::Version | Commands::Validate { .. } => {
            return Err(Error::Custom("command does not use the database".into()));
        }
    }

    Ok(())
}
