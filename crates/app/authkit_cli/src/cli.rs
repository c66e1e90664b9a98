use authkit_core::Permission;
use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "authkit", version, about = "Register identities and issue signed tokens")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the version.
    Version,

    /// Apply database migrations.
    Migrate,

    /// Register a new identity.
    Register {
        #[arg(long)]
        email: String,

        #[arg(long)]
        password: String,

        /// Highest permission this identity may request (api, user, admin or a number).
        #[arg(long, default_value = "user")]
        max_permission: Permission,

        #[arg(long)]
        first_name: Option<String>,

        #[arg(long)]
        last_name: Option<String>,
    },

    /// Authenticate and print a signed token.
    Token {
        #[arg(long)]
        email: String,

        #[arg(long)]
        password: String,

        /// Permission to encode in the token.
        #[arg(long, default_value = "user")]
        permission: Permission,

        /// Token lifetime in seconds; 0 never expires. Defaults to the configured TTL.
        #[arg(long)]
        ttl_secs: Option<u64>,

        /// Extra `key=value` pairs carried in the token's `data` claim.
        #[arg(long = "data", value_parser = parse_key_value)]
        data: Vec<(String, String)>,
    },

    /// Verify a token and print its claims as JSON.
    Validate { token: String },
}

fn parse_key_value(s: &str) -> Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got '{s}'"))?;
    if key.is_empty() {
        return Err(format!("empty key in '{s}'"));
    }
    Ok((key.to_string(), value.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_arguments_parse() {
        let cli = Cli::try_parse_from([
            "authkit",
            "token",
            "--email",
            "a@b.com",
            "--password",
            "pw1",
            "--permission",
            "admin",
            "--ttl-secs",
            "60",
            "--data",
            "org=acme",
            "--data",
            "note=a=b",
        ])
        .unwrap();

        match cli.command {
            Commands::Token {
                email,
                permission,
                ttl_secs,
                data,
                ..
            } => {
                assert_eq!(email, "a@b.com");
                assert_eq!(permission, Permission::ADMIN);
                assert_eq!(ttl_secs, Some(60));
                assert_eq!(
                    data,
                    vec![
                        ("org".to_string(), "acme".to_string()),
                        ("note".to_string(), "a=b".to_string()),
                    ]
                );
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn register_defaults_to_user_permission() {
        let cli = Cli::try_parse_from([
            "authkit",
            "register",
            "--email",
            "a@b.com",
            "--password",
            "pw1",
        ])
        .unwrap();
        match cli.command {
            Commands::Register { max_permission, .. } => {
                assert_eq!(max_permission, Permission::USER);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn bad_permission_and_data_are_rejected() {
        let base = ["authkit", "token", "--email", "a", "--password", "p"];
        let with = |extra: [&'static str; 2]| {
            base.iter().copied().chain(extra).collect::<Vec<_>>()
        };

        assert!(Cli::try_parse_from(with(["--permission", "root"])).is_err());
        assert!(Cli::try_parse_from(with(["--data", "novalue"])).is_err());
        assert!(Cli::try_parse_from(with(["--data", "=v"])).is_err());
    }
}
