//! Admin user command handlers

use crate::config::Config;
use crate::db::repositories::user::{ADMIN_ROLE, normalize_email};
use crate::state::SharedState;

async fn open(config: &Config) -> anyhow::Result<SharedState> {
    SharedState::new(config.clone()).await
}

pub async fn cmd_admin_add(config: &Config, email: &str, role: &str) -> anyhow::Result<()> {
    let state = open(config).await?;
    let user = state
        .auth_service
        .add_user(email, role.trim())
        .await
        .map_err(|e| anyhow::anyhow!("{e}"))?;

    println!("✓ Added {} ({})", user.email, user.role);
    if !user.is_admin() {
        println!("  Note: only the '{ADMIN_ROLE}' role can sign in to the admin panel.");
    }
    Ok(())
}

pub async fn cmd_admin_list(config: &Config) -> anyhow::Result<()> {
    let state = open(config).await?;
    let users = state
        .auth_service
        .list_users()
        .await
        .map_err(|e| anyhow::anyhow!("{e}"))?;

    if users.is_empty() {
        println!("No users yet.");
        println!();
        println!("Add one with: autosource admin add you@example.com");
        return Ok(());
    }

    println!("Users ({} total)", users.len());
    println!("{:-<70}", "");
    for user in users {
        println!(
            "#{:<4} {:<36} {:<8} last login: {}",
            user.id,
            user.email,
            user.role,
            user.last_login_at.as_deref().unwrap_or("never")
        );
    }
    Ok(())
}

pub async fn cmd_admin_remove(config: &Config, email: &str) -> anyhow::Result<()> {
    let state = open(config).await?;
    let email = normalize_email(email);

    if state.store.users().delete_by_email(&email).await? {
        println!("✓ Removed {email}");
    } else {
        println!("No user with e-mail {email}");
    }
    Ok(())
}

pub async fn cmd_admin_link(config: &Config, email: &str) -> anyhow::Result<()> {
    let state = open(config).await?;

    match state
        .auth_service
        .create_login_link(email)
        .await
        .map_err(|e| anyhow::anyhow!("{e}"))?
    {
        Some(link) => {
            println!(
                "One-time login link (valid for {} minutes):",
                config.auth.link_ttl_minutes
            );
            println!("{link}");
        }
        None => println!("No user with e-mail {}", normalize_email(email)),
    }
    Ok(())
}
