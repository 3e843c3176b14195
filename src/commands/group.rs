//! Group management: existence check around a single mutating call.

use anyhow::{Context as AnyhowContext, Result};

use crate::Context;
use crate::api::PveClient;
use crate::ui;

pub fn create(ctx: &Context, client: &PveClient, group: &str, comment: Option<&str>) -> Result<()> {
    if client.group_exists(group)? {
        ui::unchanged(&format!("group '{}' exists", group));
        return Ok(());
    }

    if ctx.check {
        ui::info(&format!("would create group '{}'", group));
        return Ok(());
    }

    client
        .create_group(group, comment)
        .with_context(|| format!("failed to create group '{}'", group))?;
    ui::success(&format!("group '{}' created", group));

    Ok(())
}

pub fn remove(ctx: &Context, client: &PveClient, group: &str) -> Result<()> {
    if !client.group_exists(group)? {
        ui::unchanged(&format!("group '{}' doesn't exist", group));
        return Ok(());
    }

    if ctx.check {
        ui::info(&format!("would delete group '{}'", group));
        return Ok(());
    }

    if !super::confirm_destructive(ctx.yes, &format!("Delete group '{}'?", group))? {
        ui::warn("aborted");
        return Ok(());
    }

    client
        .delete_group(group)
        .with_context(|| format!("failed to delete group '{}'", group))?;
    ui::success(&format!("group '{}' deleted", group));

    Ok(())
}

pub fn list(client: &PveClient) -> Result<()> {
    let groups = client.fetch_groups()?;
    if groups.is_empty() {
        ui::info("no groups exist");
        return Ok(());
    }

    ui::header("Groups");
    for group in &groups {
        println!(
            "  {:<20} {}",
            group.groupid,
            group.comment.as_deref().unwrap_or("")
        );
    }

    Ok(())
}

pub fn show(client: &PveClient, group: &str) -> Result<()> {
    let detail = client
        .get_group(group)
        .with_context(|| format!("failed to get group '{}'", group))?;

    ui::header(group);
    if let Some(comment) = &detail.comment {
        ui::kv("comment", comment);
    }
    if detail.members.is_empty() {
        ui::dim("no members");
    } else {
        ui::kv("members", &detail.members.join(", "));
    }

    Ok(())
}
