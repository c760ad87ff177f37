//! Account listing and removal.

use anyhow::{Context as _, Result};
use dialoguer::Confirm;
use mart_auth::{AccountStore, UserParams, UserQuery};
use mart_commerce::UserId;

use super::{UsersArgs, UsersCommand};
use crate::context::Context;

/// Run the users command.
pub async fn run(args: UsersArgs, ctx: &Context) -> Result<()> {
    let accounts = AccountStore::new(ctx.db().await?).with_hasher(ctx.config.hasher());
    match args.command {
        UsersCommand::List { search, role, sort } => {
            let params = UserParams { search, role, sort };
            list(&accounts, UserQuery::from(params), ctx).await
        }
        UsersCommand::Delete { id, yes } => delete(&accounts, UserId::new(id), yes, ctx).await,
    }
}

async fn list(accounts: &AccountStore, query: UserQuery, ctx: &Context) -> Result<()> {
    let users = accounts.list(&query).await?;

    if ctx.output.is_json() {
        ctx.output.json(&users);
        return Ok(());
    }

    ctx.output.header(&format!("Users ({})", users.len()));
    let widths = [6, 20, 30, 10];
    ctx.output.table_row(&["ID", "Username", "Email", "Role"], &widths);
    for user in &users {
        ctx.output.table_row(
            &[
                &user.id.to_string(),
                &user.username,
                &user.email,
                user.role.as_str(),
            ],
            &widths,
        );
    }
    Ok(())
}

async fn delete(accounts: &AccountStore, id: UserId, yes: bool, ctx: &Context) -> Result<()> {
    let account = accounts
        .get(id)
        .await
        .with_context(|| format!("Cannot delete user {}", id))?;

    if !yes {
        let confirmed = Confirm::new()
            .with_prompt(format!(
                "Delete {} <{}> ({})?",
                account.username, account.email, account.role
            ))
            .default(false)
            .interact()?;

        if !confirmed {
            ctx.output.warn("Deletion cancelled");
            return Ok(());
        }
    }

    accounts
        .admin_delete(id)
        .await
        .with_context(|| format!("Cannot delete user {}", id))?;

    if ctx.output.is_json() {
        ctx.output.json(&serde_json::json!({ "deleted": id }));
    } else {
        ctx.output.success(&format!("Deleted user {}", id));
    }
    Ok(())
}
