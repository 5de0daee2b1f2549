use std::sync::Arc;

use anyhow::Result;
use clap::Args;
use hearth::{SnapshotStore, fanout::spawn_redis_relay, keys::KeyContext, server};

use crate::context::{RunContext, StorageArgs};
use crate::examples::ExampleGroup;
use crate::output::OutputManager;

pub const EXAMPLES: &[ExampleGroup] = &[
    ExampleGroup {
        title: "Local development",
        commands: &[
            "hearth serve                              # JSON files under ./data on 127.0.0.1:5000",
            "hearth serve --bind 0.0.0.0:8080          # Listen on every interface",
        ],
    },
    ExampleGroup {
        title: "Redis",
        commands: &[
            "REDIS_URL=redis://localhost hearth serve --backend redis",
            "hearth serve --backend memory --redis-relay   # Keep state in memory, publish events to Redis",
        ],
    },
];

#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Address to listen on, overriding `[server] bind`
    #[arg(long, env = "HEARTH_BIND")]
    pub bind: Option<String>,

    /// Also publish every event on the Redis channel `{prefix}:events`
    #[arg(long)]
    pub redis_relay: bool,

    #[command(flatten)]
    pub storage: StorageArgs,
}

pub async fn handle_serve(args: ServeArgs, mut ctx: RunContext, output: &OutputManager) -> Result<()> {
    ctx.apply_storage_args(&args.storage);
    if let Some(bind) = args.bind {
        ctx.config.server.bind = bind;
    }
    if args.redis_relay {
        ctx.config.fanout.redis_relay = true;
    }

    let network = Arc::new(ctx.open_network().await?);

    output.heading("hearth");
    output.key_value("Config", &ctx.config_source());
    output.key_value("Storage", &network.store().describe());
    output.key_value("Listening", &format!("http://{}", ctx.config.server.bind));

    let relay = if ctx.config.fanout.redis_relay {
        let conn = ctx.relay_connection(network.store()).await?;
        let channel = KeyContext::new(&ctx.config.storage.prefix).events_channel();
        output.key_value("Relay", &channel);
        Some(spawn_redis_relay(network.fanout(), conn, channel))
    } else {
        None
    };

    output.info("Press Ctrl-C to stop");
    let result = server::serve(&ctx.config.server.bind, network).await;

    if let Some(relay) = relay {
        relay.abort();
    }
    result?;
    output.success("Server stopped");
    Ok(())
}
