use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

use followiq_core::profile::ProfileUpdate;
use followiq_core::{AppConfig, Error};

mod commands;

use commands::motion::MotionAction;
use commands::Context;

#[derive(Parser)]
#[command(name = "followiq")]
#[command(author, version, about = "Follow IQ account backend and motion previews")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Use a throwaway in-memory backend instead of the hosted one
    #[arg(long, global = true)]
    offline: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Public contact form
    Contact {
        #[command(subcommand)]
        action: ContactAction,
    },
    /// Admin inbox of contact submissions
    Inbox {
        #[command(subcommand)]
        action: InboxAction,
    },
    /// Your account profile
    Profile {
        #[command(subcommand)]
        action: ProfileAction,
    },
    /// Sign in, sign up and session management
    Auth {
        #[command(subcommand)]
        action: AuthAction,
    },
    /// Preview site animations in the terminal
    Motion {
        #[command(subcommand)]
        action: MotionAction,

        /// Honour reduced motion (instant transitions)
        #[arg(long)]
        reduced_motion: bool,
    },
}

#[derive(Subcommand)]
enum ContactAction {
    /// Send a message through the contact form
    Submit {
        #[arg(short = 'n', long)]
        name: String,
        #[arg(short = 'e', long)]
        email: String,
        #[arg(short = 'c', long)]
        company: Option<String>,
        #[arg(short = 'm', long)]
        message: String,
    },
}

#[derive(Subcommand)]
enum InboxAction {
    /// List submissions, newest first
    List {
        /// Only unread submissions
        #[arg(long, conflicts_with = "read")]
        unread: bool,
        /// Only read submissions
        #[arg(long)]
        read: bool,
        #[arg(short = 'l', long)]
        limit: Option<usize>,
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Show one submission in full
    Show { id: Uuid },
    /// Mark a submission as read
    Read { id: Uuid },
    /// Mark a submission as unread
    Unread { id: Uuid },
    /// Flip the read state of a submission
    Toggle { id: Uuid },
    /// Delete a submission
    Delete { id: Uuid },
}

#[derive(Subcommand)]
enum ProfileAction {
    /// Show the signed-in user's profile
    Show,
    /// Update profile fields (pass an empty string to clear one)
    Set {
        #[arg(long)]
        display_name: Option<String>,
        #[arg(long)]
        phone: Option<String>,
        #[arg(long)]
        company: Option<String>,
        #[arg(long)]
        role: Option<String>,
    },
}

#[derive(Subcommand)]
enum AuthAction {
    /// Sign in with email and password
    Login {
        #[arg(short = 'e', long)]
        email: String,
        /// Read from stdin when omitted
        #[arg(short = 'p', long)]
        password: Option<String>,
    },
    /// Create an account
    Signup {
        #[arg(short = 'e', long)]
        email: String,
        #[arg(short = 'p', long)]
        password: Option<String>,
    },
    /// Sign out and forget the stored session
    Logout,
    /// Print the sign-in URL for an OAuth provider
    Oauth {
        /// google or github
        provider: String,
        /// Where to return after sign-in (defaults to the configured URL)
        #[arg(long)]
        redirect: Option<String>,
    },
    /// Show who is signed in
    Status,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = AppConfig::load()?;

    // Initialize logging (stderr, so command output stays clean)
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| config.general.log_level.clone()),
        ))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    let offline = cli.offline;
    let connect = || Context::new(Arc::new(config.clone()), offline);

    let result = match cli.command {
        Commands::Motion {
            action,
            reduced_motion,
        } => {
            // Motion previews never touch the backend
            let mut motion = config.motion.clone();
            motion.reduced_motion |= reduced_motion;
            commands::motion::run(&motion, action).await
        }
        Commands::Contact { action } => {
            let ctx = connect().await?;
            match action {
                ContactAction::Submit {
                    name,
                    email,
                    company,
                    message,
                } => commands::contact::submit(&ctx, name, email, company, message).await,
            }
        }
        Commands::Inbox { action } => {
            let ctx = connect().await?;
            match action {
                InboxAction::List {
                    unread,
                    read,
                    limit,
                    json,
                } => commands::inbox::list(&ctx, unread, read, limit, json).await,
                InboxAction::Show { id } => commands::inbox::show(&ctx, id).await,
                InboxAction::Read { id } => commands::inbox::mark(&ctx, id, true).await,
                InboxAction::Unread { id } => commands::inbox::mark(&ctx, id, false).await,
                InboxAction::Toggle { id } => commands::inbox::toggle(&ctx, id).await,
                InboxAction::Delete { id } => commands::inbox::delete(&ctx, id).await,
            }
        }
        Commands::Profile { action } => {
            let ctx = connect().await?;
            match action {
                ProfileAction::Show => commands::profile::show(&ctx).await,
                ProfileAction::Set {
                    display_name,
                    phone,
                    company,
                    role,
                } => {
                    let update = ProfileUpdate {
                        display_name,
                        phone,
                        company_name: company,
                        job_role: role,
                    };
                    commands::profile::set(&ctx, update).await
                }
            }
        }
        Commands::Auth { action } => {
            let ctx = connect().await?;
            match action {
                AuthAction::Login { email, password } => {
                    commands::auth::login(&ctx, &email, password).await
                }
                AuthAction::Signup { email, password } => {
                    commands::auth::signup(&ctx, &email, password).await
                }
                AuthAction::Logout => commands::auth::logout(&ctx).await,
                AuthAction::Oauth { provider, redirect } => {
                    commands::auth::oauth(&ctx, &provider, redirect.as_deref())
                }
                AuthAction::Status => commands::auth::status(&ctx).await,
            }
        }
    };

    if let Some(err) = result.as_ref().err().and_then(|e| e.downcast_ref::<Error>()) {
        if err.is_auth_expired() {
            eprintln!("Hint: run `followiq auth login` to sign in again.");
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use followiq_motion::Direction;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_scroll_checkpoints() {
        let cli = Cli::try_parse_from([
            "followiq", "motion", "scroll", "--input", "0,0.5,1", "--output", "0,-40,0",
        ])
        .unwrap();
        match cli.command {
            Commands::Motion {
                action: MotionAction::Scroll { input, output, .. },
                ..
            } => {
                assert_eq!(input, vec![0.0, 0.5, 1.0]);
                assert_eq!(output, vec![0.0, -40.0, 0.0]);
            }
            _ => panic!("expected motion scroll"),
        }
    }

    #[test]
    fn test_reveal_direction_is_validated() {
        let cli = Cli::try_parse_from(["followiq", "motion", "reveal", "--direction", "left"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Motion {
                action: MotionAction::Reveal {
                    direction: Direction::Left,
                    ..
                },
                ..
            }
        ));
        assert!(Cli::try_parse_from(["followiq", "motion", "reveal", "--direction", "sideways"]).is_err());
    }

    #[test]
    fn test_inbox_filters_conflict() {
        assert!(Cli::try_parse_from(["followiq", "inbox", "list", "--unread", "--read"]).is_err());
        let cli = Cli::try_parse_from(["followiq", "--offline", "inbox", "list", "--unread"]).unwrap();
        assert!(cli.offline);
    }
}
