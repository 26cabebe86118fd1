use anyhow::Result;

use followiq_core::contact::NewContactSubmission;

use super::Context;

pub async fn submit(
    ctx: &Context,
    name: String,
    email: String,
    company: Option<String>,
    message: String,
) -> Result<()> {
    let form = NewContactSubmission::new(name, email, company, message);
    let stored = ctx.contacts().submit(form).await?;

    println!("Thanks, {}! Your message was received.", stored.name);
    println!("Reference: {}", stored.id);
    Ok(())
}
