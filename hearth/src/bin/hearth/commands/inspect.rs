use anyhow::{Result, bail};
use clap::Subcommand;
use comfy_table::{Cell, Table};
use hearth::{Notification, Post, Privacy, User, types::UserId};
use serde::Serialize;

use crate::context::{RunContext, StorageArgs};
use crate::examples::ExampleGroup;
use crate::output::{GlobalOptions, OutputManager, TableDisplay, themed_table};
use crate::theme::ICONS;

pub const EXAMPLES: &[ExampleGroup] = &[
    ExampleGroup {
        title: "Users and posts",
        commands: &[
            "hearth inspect users                     # Friends and pending requests per user",
            "hearth inspect posts                     # Every stored post",
            "hearth inspect posts --viewer 2          # Posts user 2 is allowed to see",
        ],
    },
    ExampleGroup {
        title: "Notifications",
        commands: &[
            "hearth inspect notifications --user 1    # Notifications addressed to user 1",
            "hearth --output json inspect notifications",
        ],
    },
];

#[derive(Subcommand, Debug)]
pub enum InspectCommands {
    /// List users with their friends and incoming requests
    #[command(name = "users")]
    Users {
        #[command(flatten)]
        storage: StorageArgs,
    },

    /// List posts, newest first
    #[command(name = "posts")]
    Posts {
        /// Only show posts this user can see
        #[arg(long)]
        viewer: Option<UserId>,

        #[command(flatten)]
        storage: StorageArgs,
    },

    /// List notifications in the order they were recorded
    #[command(name = "notifications")]
    Notifications {
        /// Only show notifications addressed to this user
        #[arg(long)]
        user: Option<UserId>,

        #[command(flatten)]
        storage: StorageArgs,
    },
}

pub async fn handle_inspect_commands(command: InspectCommands, mut ctx: RunContext, output: &OutputManager) -> Result<()> {
    match command {
        InspectCommands::Users { storage } => {
            ctx.apply_storage_args(&storage);
            let network = ctx.open_network().await?;
            output.heading("Users");
            output.display(&UserRows(network.users().await))?;
        }
        InspectCommands::Posts { viewer, storage } => {
            ctx.apply_storage_args(&storage);
            let network = ctx.open_network().await?;
            let posts = match viewer {
                Some(viewer) => {
                    if network.user(viewer).await.is_none() {
                        bail!("User {viewer} not found");
                    }
                    output.heading(&format!("Posts visible to user {viewer}"));
                    network.visible_posts(viewer).await
                }
                None => {
                    output.heading("Posts");
                    network.snapshot().await.posts
                }
            };
            output.display(&PostRows(posts))?;
        }
        InspectCommands::Notifications { user, storage } => {
            ctx.apply_storage_args(&storage);
            let network = ctx.open_network().await?;
            let notifications = match user {
                Some(user) => {
                    output.heading(&format!("Notifications for user {user}"));
                    network.notifications_for(user).await
                }
                None => {
                    output.heading("Notifications");
                    network.snapshot().await.notifications
                }
            };
            output.display(&NotificationRows(notifications))?;
        }
    }
    Ok(())
}

fn join_ids(ids: &[UserId]) -> String {
    if ids.is_empty() {
        return "-".to_string();
    }
    ids.iter().map(ToString::to_string).collect::<Vec<_>>().join(", ")
}

fn empty_table(options: &GlobalOptions, message: &str) -> Table {
    let mut table = themed_table(options, &[message]);
    table.add_row(vec![Cell::new("Nothing stored yet")]);
    table
}

#[derive(Serialize)]
#[serde(transparent)]
struct UserRows(Vec<User>);

impl TableDisplay for UserRows {
    fn to_table(&self, options: &GlobalOptions) -> Table {
        if self.0.is_empty() {
            return empty_table(options, "Users");
        }
        let mut table = themed_table(options, &["Id", "Name", "Friends", "Requests from", "Bio"]);
        for user in &self.0 {
            table.add_row(vec![
                Cell::new(user.id),
                Cell::new(&user.name),
                Cell::new(join_ids(&user.friends)),
                Cell::new(join_ids(&user.friend_requests)),
                Cell::new(&user.bio),
            ]);
        }
        table
    }

    fn to_compact(&self) -> String {
        self.0
            .iter()
            .map(|user| format!("{}:{}", user.id, user.name))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[derive(Serialize)]
#[serde(transparent)]
struct PostRows(Vec<Post>);

impl TableDisplay for PostRows {
    fn to_table(&self, options: &GlobalOptions) -> Table {
        if self.0.is_empty() {
            return empty_table(options, "Posts");
        }
        let mut table = themed_table(options, &["Id", "Author", "Privacy", "Text", "Reactions", "Comments"]);
        for post in &self.0 {
            let privacy = match post.privacy {
                Privacy::Public => format!("{} public", ICONS.public),
                Privacy::Friends => format!("{} friends", ICONS.friends),
            };
            let reactions = post
                .reaction_counts()
                .into_iter()
                .map(|(kind, count)| format!("{kind} {count}"))
                .collect::<Vec<_>>()
                .join(", ");
            table.add_row(vec![
                Cell::new(post.id),
                Cell::new(&post.author),
                Cell::new(privacy),
                Cell::new(&post.text),
                Cell::new(if reactions.is_empty() { "-".to_string() } else { reactions }),
                Cell::new(post.comments.len()),
            ]);
        }
        table
    }

    fn to_compact(&self) -> String {
        format!("Posts: {}", self.0.len())
    }
}

#[derive(Serialize)]
#[serde(transparent)]
struct NotificationRows(Vec<Notification>);

impl TableDisplay for NotificationRows {
    fn to_table(&self, options: &GlobalOptions) -> Table {
        if self.0.is_empty() {
            return empty_table(options, "Notifications");
        }
        let mut table = themed_table(options, &["Id", "Type", "From", "To", "Post", "Reaction"]);
        for notification in &self.0 {
            table.add_row(vec![
                Cell::new(notification.id),
                Cell::new(notification.kind.to_string()),
                Cell::new(notification.from),
                Cell::new(notification.to),
                Cell::new(notification.post_id.map_or_else(|| "-".to_string(), |id| id.to_string())),
                Cell::new(
                    notification
                        .reaction_type
                        .map_or_else(|| "-".to_string(), |kind| kind.to_string()),
                ),
            ]);
        }
        table
    }

    fn to_compact(&self) -> String {
        format!("Notifications: {}", self.0.len())
    }
}
