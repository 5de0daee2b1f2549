mod commands;
mod context;
mod examples;
mod output;
mod theme;

use std::path::PathBuf;

use anyhow::Result;
use clap::{
    ColorChoice, Command, CommandFactory, FromArgMatches, Parser, Subcommand,
    builder::{
        Styles,
        styling::{Ansi256Color, Color as ClapColor, RgbColor, Style},
    },
};
use colored::{Color as ThemeColor, Colorize, control::ShouldColorize};

use commands::{
    inspect::{InspectCommands, handle_inspect_commands},
    seed::{SeedArgs, handle_seed},
    serve::{ServeArgs, handle_serve},
};
use context::RunContext;
use examples::{ExampleGroup, command_examples};
use output::{GlobalOptions, OutputFormat, OutputManager};
use theme::{ICONS, THEME};

const ENVIRONMENT_VARIABLES: &[(&str, &str)] = &[
    ("HEARTH_CONFIG", "Configuration file used when --config is not given"),
    ("REDIS_URL", "Redis connection URL when redis_url is left at ${REDIS_URL}"),
    ("HEARTH_BIND", "Address for 'hearth serve' to listen on"),
    ("HEARTH_BACKEND", "Snapshot backend: json, redis or memory"),
    ("HEARTH_DATA_DIR", "Directory for the JSON backend"),
    ("RUST_LOG", "Log filter, e.g. 'hearth=debug'"),
];

#[derive(Parser)]
#[command(name = "hearth", version, styles = help_styles())]
#[command(
    about = "Friends, posts and live notifications for a small social network",
    long_about = "hearth keeps users, friend requests, posts and notifications in one \
                  snapshot and pushes every change to connected WebSocket clients."
)]
#[command(subcommand_required = true, arg_required_else_help = true)]
struct Cli {
    /// Configuration file (defaults to ./hearth.toml)
    #[arg(short = 'c', long, global = true, env = "HEARTH_CONFIG")]
    config: Option<PathBuf>,

    /// Output format
    #[arg(long, value_enum, default_value = "table", global = true)]
    output: OutputFormat,

    /// Only print errors
    #[arg(short = 'q', long, global = true)]
    quiet: bool,

    /// Print extra detail
    #[arg(short = 'v', long, global = true)]
    verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP and WebSocket server
    Serve(ServeArgs),

    /// Show stored users, posts and notifications
    #[command(subcommand)]
    Inspect(InspectCommands),

    /// Write the demo users into storage
    Seed(SeedArgs),
}

/// The derived command with the environment appendix and per-command examples attached.
fn cli_command() -> Command {
    let use_color = ShouldColorize::from_env().should_colorize();
    let env_lines: Vec<String> = ENVIRONMENT_VARIABLES
        .iter()
        .map(|(key, description)| {
            format!(
                "{}  {}",
                paint(key, THEME.key, true, use_color),
                paint(description, THEME.value, false, use_color)
            )
        })
        .collect();

    let mut command = Cli::command()
        .color(if use_color { ColorChoice::Auto } else { ColorChoice::Never })
        .after_long_help(help_section("Environment Variables:", &env_lines, use_color));

    for example in command_examples() {
        let text = render_examples(example.groups, use_color);
        command = command.mut_subcommand(example.name, move |sub| sub.after_long_help(text));
    }
    command
}

fn render_examples(groups: &[ExampleGroup], use_color: bool) -> String {
    let lines: Vec<String> = groups
        .iter()
        .flat_map(|group| {
            std::iter::once(paint(group.title, THEME.primary, true, use_color)).chain(group.commands.iter().map(
                move |command| {
                    format!(
                        "  {} {}",
                        paint(ICONS.arrow, THEME.secondary, false, use_color),
                        paint(command, THEME.secondary, false, use_color)
                    )
                },
            ))
        })
        .collect();
    help_section("Examples:", &lines, use_color)
}

fn help_section(heading: &str, lines: &[String], use_color: bool) -> String {
    let mut text = paint(heading, THEME.highlight, true, use_color);
    for line in lines {
        text.push_str("\n  ");
        text.push_str(line);
    }
    text
}

fn paint(text: &str, color: ThemeColor, bold: bool, use_color: bool) -> String {
    match (use_color, bold) {
        (false, _) => text.to_string(),
        (true, true) => text.color(color).bold().to_string(),
        (true, false) => text.color(color).to_string(),
    }
}

fn help_styles() -> Styles {
    let style = |color: ThemeColor| Style::new().fg_color(Some(clap_color(color)));
    Styles::styled()
        .usage(style(THEME.primary).bold())
        .header(style(THEME.highlight).bold())
        .literal(style(THEME.secondary))
        .placeholder(style(THEME.muted))
        .valid(style(THEME.success))
        .invalid(style(THEME.warning))
        .error(style(THEME.error).bold())
}

/// Theme colors are plain or bright ANSI colors, which map onto the first 16 palette entries.
fn clap_color(color: ThemeColor) -> ClapColor {
    if let ThemeColor::TrueColor { r, g, b } = color {
        return ClapColor::Rgb(RgbColor(r, g, b));
    }
    let index = match color.to_fg_str().parse::<u8>() {
        Ok(code @ 30..=37) => code - 30,
        Ok(code @ 90..=97) => code - 82,
        _ => 7,
    };
    ClapColor::Ansi256(Ansi256Color(index))
}

#[tokio::main]
async fn main() {
    env_logger::init();

    let cli = Cli::from_arg_matches(&cli_command().get_matches()).unwrap_or_else(|err| err.exit());
    let no_color = cli.no_color;
    if no_color {
        colored::control::set_override(false);
    }

    if let Err(err) = execute(cli).await {
        let output = OutputManager::new(GlobalOptions {
            no_color,
            ..Default::default()
        });
        output.error(&format!("Error: {err:#}"));
        std::process::exit(1);
    }
}

async fn execute(cli: Cli) -> Result<()> {
    let output = OutputManager::new(GlobalOptions {
        output_format: cli.output,
        quiet: cli.quiet,
        verbose: cli.verbose,
        no_color: cli.no_color,
    });
    let ctx = RunContext::load(cli.config.as_deref())?;
    output.verbose(&format!("configuration: {}", ctx.config_source()));

    match cli.command {
        Commands::Serve(args) => handle_serve(args, ctx, &output).await,
        Commands::Inspect(command) => handle_inspect_commands(command, ctx, &output).await,
        Commands::Seed(args) => handle_seed(args, ctx, &output).await,
    }
}
