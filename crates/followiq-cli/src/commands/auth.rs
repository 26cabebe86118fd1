use std::io::Write;

use anyhow::{bail, Result};
use tokio::io::{AsyncBufReadExt, BufReader};

use followiq_core::auth::{Credentials, OAuthProvider, SignUpOutcome};

use super::Context;

/// Password from the flag, or the first line of stdin
async fn resolve_password(password: Option<String>) -> Result<String> {
    if let Some(password) = password {
        return Ok(password);
    }

    print!("Password: ");
    std::io::stdout().flush()?;
    let mut line = String::new();
    BufReader::new(tokio::io::stdin()).read_line(&mut line).await?;
    let password = line.trim_end_matches(['\r', '\n']).to_string();
    if password.is_empty() {
        bail!("no password given");
    }
    Ok(password)
}

pub async fn login(ctx: &Context, email: &str, password: Option<String>) -> Result<()> {
    let password = resolve_password(password).await?;
    let auth = ctx.auth();
    let session = auth.sign_in(Credentials::new(email, password)).await?;

    println!("Signed in as {}", session.user.email);
    if auth.is_admin(&session) {
        println!("Admin access: yes");
    }
    Ok(())
}

pub async fn signup(ctx: &Context, email: &str, password: Option<String>) -> Result<()> {
    let password = resolve_password(password).await?;
    match ctx.auth().sign_up(Credentials::new(email, password)).await? {
        SignUpOutcome::SignedIn(session) => {
            println!("Account created. Signed in as {}", session.user.email);
        }
        SignUpOutcome::ConfirmationRequired { email } => {
            println!("Account created. Check {} for a confirmation link, then run:", email);
            println!("  followiq auth login -e {}", email);
        }
    }
    Ok(())
}

pub async fn logout(ctx: &Context) -> Result<()> {
    let auth = ctx.auth();
    if auth.current_session().await?.is_none() {
        println!("Not signed in.");
        return Ok(());
    }
    auth.sign_out().await?;
    println!("Signed out.");
    Ok(())
}

pub fn oauth(ctx: &Context, provider: &str, redirect: Option<&str>) -> Result<()> {
    let provider: OAuthProvider = provider.parse()?;
    let redirect = redirect.unwrap_or(&ctx.config.backend.oauth_redirect_url);
    let url = ctx.auth().oauth_url(provider, redirect)?;

    println!("Open this URL to continue with {}:", provider.as_str());
    println!("  {}", url);
    Ok(())
}

pub async fn status(ctx: &Context) -> Result<()> {
    let auth = ctx.auth();
    match auth.current_session().await? {
        Some(session) => {
            println!("Signed in as {}", session.user.email);
            println!("User id:     {}", session.user.id);
            println!(
                "Expires:     {}",
                session.expires_at.format("%Y-%m-%d %H:%M UTC")
            );
            println!(
                "Admin:       {}",
                if auth.is_admin(&session) { "yes" } else { "no" }
            );
        }
        None => {
            println!("Not signed in.");
            println!("\nTo sign in, run:");
            println!("  followiq auth login -e <email>");
        }
    }
    Ok(())
}
