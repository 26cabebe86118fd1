use anyhow::Result;

use followiq_core::profile::{Profile, ProfileUpdate};

use super::Context;

fn print_profile(email: &str, profile: &Profile) {
    let field = |value: &Option<String>| value.clone().unwrap_or_else(|| "-".to_string());

    println!("Email:        {}", email);
    println!("Display name: {}", field(&profile.display_name));
    println!("Phone:        {}", field(&profile.phone));
    println!("Company:      {}", field(&profile.company_name));
    println!("Role:         {}", field(&profile.job_role));
    if let Some(updated) = profile.updated_at {
        println!("Updated:      {}", updated.format("%Y-%m-%d %H:%M"));
    }
}

pub async fn show(ctx: &Context) -> Result<()> {
    let session = ctx.auth().require_session().await?;
    let profile = ctx.profiles().get(&session).await?;
    print_profile(&session.user.email, &profile);
    Ok(())
}

pub async fn set(ctx: &Context, update: ProfileUpdate) -> Result<()> {
    if update.is_empty() {
        println!("Nothing to update. Pass at least one of --display-name, --phone, --company, --role.");
        return Ok(());
    }

    let session = ctx.auth().require_session().await?;
    let profile = ctx.profiles().upsert(&session, &update).await?;
    println!("Profile saved.\n");
    print_profile(&session.user.email, &profile);
    Ok(())
}
