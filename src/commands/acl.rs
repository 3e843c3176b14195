//! ACL front end over the reconciliation engine.

use anyhow::Result;
use colored::Colorize;

use crate::Context;
use crate::acl::{DesiredGrant, reconcile};
use crate::api::PveClient;
use crate::cli::{AclApplyArgs, AclRemoveArgs};
use crate::ui;

pub fn apply(ctx: &Context, client: &PveClient, args: &AclApplyArgs) -> Result<()> {
    let grant = DesiredGrant::new(&args.path, &args.roleid, !args.no_propagate)
        .with_groups(args.groups.as_deref())
        .with_tokens(args.tokens.as_deref())
        .with_users(args.users.as_deref());

    let outcome = reconcile::create(client, &grant, ctx.check)?;

    if let Some(reason) = outcome.skipped {
        ui::unchanged(&reason);
    } else if ctx.check {
        ui::info(&format!(
            "would set ACLs for path '{}' and roleid '{}'",
            grant.path, grant.roleid
        ));
    } else {
        ui::success(&format!(
            "ACLs for path '{}' and roleid '{}' created",
            grant.path, grant.roleid
        ));
    }

    Ok(())
}

pub fn remove(ctx: &Context, client: &PveClient, args: &AclRemoveArgs) -> Result<()> {
    let grant = DesiredGrant::new(&args.path, &args.roleid, true)
        .with_groups(args.groups.as_deref())
        .with_tokens(args.tokens.as_deref())
        .with_users(args.users.as_deref());

    // Preview pass first, so the prompt shows exactly what would go away.
    let preview = reconcile::delete(client, &grant, true)?;
    if let Some(reason) = preview.skipped {
        ui::unchanged(&reason);
        return Ok(());
    }

    for acl in &preview.removed {
        println!("  {} {}", "-".red(), acl);
    }

    if ctx.check {
        ui::info("check mode - nothing removed");
        return Ok(());
    }

    let prompt = format!("Remove {} ACL(s)?", preview.removed.len());
    if !super::confirm_destructive(ctx.yes, &prompt)? {
        ui::warn("aborted");
        return Ok(());
    }

    let outcome = reconcile::delete(client, &grant, false)?;
    if let Some(reason) = outcome.skipped {
        // the table moved underneath us between preview and apply
        ui::unchanged(&reason);
    } else {
        ui::success(&format!(
            "{} ACL(s) for path '{}' and roleid '{}' removed",
            outcome.removed.len(),
            grant.path,
            grant.roleid
        ));
    }

    Ok(())
}

pub fn list(client: &PveClient) -> Result<()> {
    let acls = client.fetch_acls()?;
    if acls.is_empty() {
        ui::info("no ACLs exist");
        return Ok(());
    }

    ui::header("ACL entries");
    for acl in &acls {
        println!(
            "  {:<20} {:<20} {:<6} {:<30} propagate={}",
            acl.path,
            acl.roleid,
            acl.kind.label(),
            acl.ugid,
            u8::from(acl.propagate)
        );
    }

    Ok(())
}
