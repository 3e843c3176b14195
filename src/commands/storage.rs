//! Directory type storage management.
//!
//! Create converges an existing storage instead of failing: content is
//! compared as an unordered set and the shared flag as a plain boolean,
//! each drift fixed with a partial `set`.

use anyhow::{Context as AnyhowContext, Result};
use std::collections::HashSet;

use crate::Context;
use crate::api::PveClient;
use crate::cli::StorageCreateArgs;
use crate::ui;

pub fn create(ctx: &Context, client: &PveClient, args: &StorageCreateArgs) -> Result<()> {
    let content = args.content.to_lowercase();

    if client.storage_exists(&args.storage)? {
        return converge(ctx, client, args, &content);
    }

    if ctx.check {
        ui::info(&format!("would create storage '{}'", args.storage));
        return Ok(());
    }

    client
        .create_storage(&args.storage, &args.path, &content, args.shared)
        .with_context(|| {
            format!(
                "failed to create storage '{}' with path '{}'",
                args.storage, args.path
            )
        })?;
    ui::success(&format!("storage '{}' created", args.storage));

    Ok(())
}

/// Bring an existing storage's content list and shared flag in line.
fn converge(
    ctx: &Context,
    client: &PveClient,
    args: &StorageCreateArgs,
    content: &str,
) -> Result<()> {
    let current = client
        .get_storage(&args.storage)
        .with_context(|| format!("failed to get storage '{}'", args.storage))?;

    let mut drifted = false;

    if !same_content(current.content.as_deref().unwrap_or(""), content) {
        drifted = true;
        if ctx.check {
            ui::info(&format!(
                "would set content of storage '{}' to '{}'",
                args.storage, content
            ));
        } else {
            client.set_storage_content(&args.storage, content)?;
            ui::success(&format!(
                "content of storage '{}' set to '{}'",
                args.storage, content
            ));
        }
    }

    if current.shared != args.shared {
        drifted = true;
        if ctx.check {
            ui::info(&format!(
                "would set shared of storage '{}' to {}",
                args.storage, args.shared
            ));
        } else {
            client.set_storage_shared(&args.storage, args.shared)?;
            ui::success(&format!(
                "shared of storage '{}' set to {}",
                args.storage, args.shared
            ));
        }
    }

    if !drifted {
        ui::unchanged(&format!("storage '{}' exists", args.storage));
    }

    Ok(())
}

/// Content lists are order-insensitive comma strings.
fn same_content(current: &str, desired: &str) -> bool {
    content_set(current) == content_set(desired)
}

fn content_set(list: &str) -> HashSet<&str> {
    list.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .collect()
}

pub fn remove(ctx: &Context, client: &PveClient, storage: &str) -> Result<()> {
    if !client.storage_exists(storage)? {
        ui::unchanged(&format!("storage '{}' doesn't exist", storage));
        return Ok(());
    }

    if ctx.check {
        ui::info(&format!("would delete storage '{}'", storage));
        return Ok(());
    }

    if !super::confirm_destructive(ctx.yes, &format!("Delete storage '{}'?", storage))? {
        ui::warn("aborted");
        return Ok(());
    }

    client
        .delete_storage(storage)
        .with_context(|| format!("failed to delete storage '{}'", storage))?;
    ui::success(&format!("storage '{}' deleted", storage));

    Ok(())
}

pub fn list(client: &PveClient) -> Result<()> {
    let storages = client.fetch_dir_storages()?;
    if storages.is_empty() {
        ui::info("no directory storages exist");
        return Ok(());
    }

    ui::header("Directory storages");
    for storage in &storages {
        println!(
            "  {:<20} {:<30} shared={} {}",
            storage.storage,
            storage.path.as_deref().unwrap_or(""),
            u8::from(storage.shared),
            storage.content.as_deref().unwrap_or("")
        );
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::same_content;

    #[test]
    fn content_comparison_ignores_order_and_spacing() {
        assert!(same_content("iso,images", "images, iso"));
        assert!(same_content("images", "images"));
    }

    #[test]
    fn content_comparison_detects_drift() {
        assert!(!same_content("images", "images,iso"));
        assert!(!same_content("", "images"));
    }
}
