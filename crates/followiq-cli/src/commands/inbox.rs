use anyhow::Result;
use uuid::Uuid;

use followiq_core::contact::{ContactSubmission, InboxFilter};

use super::Context;

const PREVIEW_LEN: usize = 72;

fn print_summary(item: &ContactSubmission) {
    let marker = if item.is_read { "    " } else { "new " };
    let company = item
        .company
        .as_deref()
        .map(|c| format!(" ({})", c))
        .unwrap_or_default();

    println!(
        "  {}{}  {} <{}>{}",
        marker,
        item.created_at.format("%Y-%m-%d %H:%M"),
        item.name,
        item.email,
        company
    );
    println!("      id: {}", item.id);
    println!("      {}", item.preview(PREVIEW_LEN));
    println!();
}

pub async fn list(
    ctx: &Context,
    unread: bool,
    read: bool,
    limit: Option<usize>,
    json: bool,
) -> Result<()> {
    let admin = ctx.auth().require_admin().await?;
    let contacts = ctx.contacts();

    let filter = match (unread, read) {
        (true, _) => InboxFilter::Unread,
        (_, true) => InboxFilter::Read,
        _ => InboxFilter::All,
    };
    let items = contacts.list(&admin, filter, limit).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&items)?);
        return Ok(());
    }

    if items.is_empty() {
        println!("Inbox is empty.");
        return Ok(());
    }

    let unread_count = contacts.unread_count(&admin).await?;
    println!("Submissions ({}, {} unread overall):\n", items.len(), unread_count);
    for item in &items {
        print_summary(item);
    }
    Ok(())
}

pub async fn show(ctx: &Context, id: Uuid) -> Result<()> {
    let admin = ctx.auth().require_admin().await?;
    let item = ctx.contacts().get(&admin, id).await?;

    println!("From:    {} <{}>", item.name, item.email);
    if let Some(company) = &item.company {
        println!("Company: {}", company);
    }
    println!("Sent:    {}", item.created_at.format("%Y-%m-%d %H:%M UTC"));
    println!("Status:  {}", if item.is_read { "read" } else { "unread" });
    println!("\n{}", item.message);
    Ok(())
}

pub async fn mark(ctx: &Context, id: Uuid, is_read: bool) -> Result<()> {
    let admin = ctx.auth().require_admin().await?;
    let item = ctx.contacts().mark_read(&admin, id, is_read).await?;
    println!(
        "Marked message from {} as {}.",
        item.name,
        if item.is_read { "read" } else { "unread" }
    );
    Ok(())
}

pub async fn toggle(ctx: &Context, id: Uuid) -> Result<()> {
    let admin = ctx.auth().require_admin().await?;
    let item = ctx.contacts().toggle_read(&admin, id).await?;
    println!(
        "Message from {} is now {}.",
        item.name,
        if item.is_read { "read" } else { "unread" }
    );
    Ok(())
}

pub async fn delete(ctx: &Context, id: Uuid) -> Result<()> {
    let admin = ctx.auth().require_admin().await?;
    ctx.contacts().delete(&admin, id).await?;
    println!("Deleted submission {}.", id);
    Ok(())
}
