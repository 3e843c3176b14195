//! User-specific API token management.
//!
//! A token's secret value only exists in the creation response, so create
//! prints it immediately and it cannot be shown again.

use anyhow::{Context as AnyhowContext, Result};

use crate::Context;
use crate::api::PveClient;
use crate::cli::TokenCreateArgs;
use crate::ui;

pub fn create(ctx: &Context, client: &PveClient, args: &TokenCreateArgs) -> Result<()> {
    if client.token_exists(&args.userid, &args.tokenid)? {
        ui::unchanged(&format!(
            "token '{}' for user '{}' exists",
            args.tokenid, args.userid
        ));
        return Ok(());
    }

    if ctx.check {
        ui::info(&format!(
            "would create token '{}' for user '{}'",
            args.tokenid, args.userid
        ));
        return Ok(());
    }

    let secret = client
        .create_token(
            &args.userid,
            &args.tokenid,
            args.comment.as_deref(),
            !args.no_privsep,
            args.expire,
        )
        .with_context(|| {
            format!(
                "failed to create token '{}' for user '{}'",
                args.tokenid, args.userid
            )
        })?;

    ui::success(&format!(
        "token '{}' for user '{}' created",
        args.tokenid, args.userid
    ));
    ui::kv("value", &secret.value);
    ui::warn("store the value now - it cannot be retrieved again");

    Ok(())
}

pub fn remove(ctx: &Context, client: &PveClient, userid: &str, tokenid: &str) -> Result<()> {
    if !client.token_exists(userid, tokenid)? {
        ui::unchanged(&format!(
            "token '{}' for user '{}' doesn't exist",
            tokenid, userid
        ));
        return Ok(());
    }

    if ctx.check {
        ui::info(&format!(
            "would delete token '{}' for user '{}'",
            tokenid, userid
        ));
        return Ok(());
    }

    let prompt = format!("Delete token '{}' for user '{}'?", tokenid, userid);
    if !super::confirm_destructive(ctx.yes, &prompt)? {
        ui::warn("aborted");
        return Ok(());
    }

    client.delete_token(userid, tokenid).with_context(|| {
        format!("failed to delete token '{}' for user '{}'", tokenid, userid)
    })?;
    ui::success(&format!(
        "token '{}' for user '{}' deleted",
        tokenid, userid
    ));

    Ok(())
}

pub fn list(client: &PveClient, userid: &str) -> Result<()> {
    let tokens = client
        .fetch_user_tokens(userid)
        .with_context(|| format!("failed to list tokens for user '{}'", userid))?;
    if tokens.is_empty() {
        ui::info(&format!("user '{}' has no tokens", userid));
        return Ok(());
    }

    ui::header(&format!("Tokens for {}", userid));
    for token in &tokens {
        let expire = match token.expire {
            Some(0) | None => "never".to_string(),
            Some(epoch) => format!("epoch {}", epoch),
        };
        println!(
            "  {:<20} expires: {:<16} {}",
            token.tokenid,
            expire,
            token.comment.as_deref().unwrap_or("")
        );
    }

    Ok(())
}
