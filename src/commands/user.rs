//! User management: existence check around a single mutating call.

use anyhow::{Context as AnyhowContext, Result};

use crate::Context;
use crate::api::{NewUser, PveClient};
use crate::cli::UserCreateArgs;
use crate::ui;

pub fn create(ctx: &Context, client: &PveClient, args: &UserCreateArgs) -> Result<()> {
    if client.user_exists(&args.userid)? {
        ui::unchanged(&format!("user '{}' exists", args.userid));
        return Ok(());
    }

    if ctx.check {
        ui::info(&format!("would create user '{}'", args.userid));
        return Ok(());
    }

    let new = NewUser {
        comment: args.comment.as_deref(),
        email: args.email.as_deref(),
        groups: args.groups.as_deref(),
        firstname: args.firstname.as_deref(),
        lastname: args.lastname.as_deref(),
    };
    client
        .create_user(&args.userid, &new)
        .with_context(|| format!("failed to create user '{}'", args.userid))?;
    ui::success(&format!("user '{}' created", args.userid));

    Ok(())
}

pub fn remove(ctx: &Context, client: &PveClient, userid: &str) -> Result<()> {
    if !client.user_exists(userid)? {
        ui::unchanged(&format!("user '{}' doesn't exist", userid));
        return Ok(());
    }

    if ctx.check {
        ui::info(&format!("would delete user '{}'", userid));
        return Ok(());
    }

    if !super::confirm_destructive(ctx.yes, &format!("Delete user '{}'?", userid))? {
        ui::warn("aborted");
        return Ok(());
    }

    client
        .delete_user(userid)
        .with_context(|| format!("failed to delete user '{}'", userid))?;
    ui::success(&format!("user '{}' deleted", userid));

    Ok(())
}

pub fn list(client: &PveClient) -> Result<()> {
    let users = client.fetch_users()?;
    if users.is_empty() {
        ui::info("no users exist");
        return Ok(());
    }

    ui::header("Users");
    for user in &users {
        println!(
            "  {:<30} {:<30} {}",
            user.userid,
            user.email.as_deref().unwrap_or(""),
            user.comment.as_deref().unwrap_or("")
        );
    }

    Ok(())
}
