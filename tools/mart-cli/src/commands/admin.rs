//! Admin account bootstrap.

use anyhow::{Context as _, Result};
use dialoguer::Password;
use mart_auth::{AccountStore, AdminUserForm, Role};

use super::{AdminArgs, AdminCommand};
use crate::context::Context;

/// Run the admin command.
pub async fn run(args: AdminArgs, ctx: &Context) -> Result<()> {
    match args.command {
        AdminCommand::Create {
            username,
            email,
            password,
            address,
            contact,
        } => {
            let password = match password {
                Some(password) => password,
                None => Password::new()
                    .with_prompt("Password")
                    .with_confirmation("Repeat password", "Passwords do not match")
                    .interact()?,
            };
            let form = AdminUserForm {
                username,
                email,
                password,
                role: Role::Admin.as_str().to_string(),
                address,
                contact,
            };
            create(form, ctx).await
        }
    }
}

async fn create(form: AdminUserForm, ctx: &Context) -> Result<()> {
    let db = ctx.db().await?;
    db.migrate().await.context("Failed to create schema")?;
    let accounts = AccountStore::new(db).with_hasher(ctx.config.hasher());

    let account = accounts
        .admin_create(&form)
        .await
        .context("Failed to create admin")?;

    if ctx.output.is_json() {
        ctx.output.json(&account);
    } else {
        ctx.output
            .success(&format!("Created admin {} <{}>", account.username, account.email));
        ctx.output.kv("ID", &account.id.to_string());
    }
    Ok(())
}
