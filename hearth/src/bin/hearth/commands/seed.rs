use anyhow::{Context, Result};
use clap::Args;
use hearth::{Snapshot, SnapshotStore, config::BackendKind, types::seed_users};

use crate::context::{RunContext, StorageArgs};
use crate::examples::ExampleGroup;
use crate::output::OutputManager;

pub const EXAMPLES: &[ExampleGroup] = &[ExampleGroup {
    title: "Seeding",
    commands: &[
        "hearth seed                     # Write the demo users if nothing is stored",
        "hearth seed --force             # Reset storage to the demo users, dropping posts",
        "hearth seed --backend redis --prefix demo",
    ],
}];

#[derive(Args, Debug)]
pub struct SeedArgs {
    /// Overwrite existing users, posts and notifications
    #[arg(long)]
    pub force: bool,

    #[command(flatten)]
    pub storage: StorageArgs,
}

pub async fn handle_seed(args: SeedArgs, mut ctx: RunContext, output: &OutputManager) -> Result<()> {
    ctx.apply_storage_args(&args.storage);
    if ctx.config.storage.backend == BackendKind::Memory {
        output.warning("The memory backend keeps nothing after this command exits");
    }

    let store = ctx.open_backend().await?;
    let existing = store
        .load()
        .await
        .with_context(|| format!("Failed to read {}", store.describe()))?;

    if let Some(snapshot) = &existing
        && !snapshot.users.is_empty()
        && !args.force
    {
        output.warning(&format!(
            "{} already holds {} user(s), {} post(s) and {} notification(s)",
            store.describe(),
            snapshot.users.len(),
            snapshot.posts.len(),
            snapshot.notifications.len()
        ));
        output.info("Re-run with --force to replace them");
        return Ok(());
    }

    let snapshot = Snapshot {
        users: seed_users(),
        ..Snapshot::default()
    };
    store
        .save(&snapshot)
        .await
        .with_context(|| format!("Failed to write {}", store.describe()))?;

    output.success(&format!("Seeded {} user(s) into {}", snapshot.users.len(), store.describe()));
    for user in &snapshot.users {
        output.bullet(&format!("{} {}", user.id, user.name));
    }
    output.verbose(&format!("config: {}", ctx.config_source()));
    Ok(())
}
