pub mod acl;
pub mod group;
pub mod storage;
pub mod token;
pub mod user;

use anyhow::Result;
use dialoguer::Confirm;

/// Ask before a destructive change, unless `--yes` was given.
fn confirm_destructive(yes: bool, prompt: &str) -> Result<bool> {
    if yes {
        return Ok(true);
    }

    let confirmed = Confirm::new()
        .with_prompt(prompt)
        .default(false)
        .interact()?;

    Ok(confirmed)
}
