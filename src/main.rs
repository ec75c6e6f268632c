// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: (C) 2025 Cranky Kernel <crankykernel@proton.me>

use anyhow::Result;
use clap::builder::styling::{AnsiColor, Effects, Styles};
use clap::{Parser, Subcommand};
use std::fs::File;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

use strix::Config;
use strix::context::{MediaRef, PageContext, Route};
use strix::prefs::{THEMES, ThemeStore};

mod cli;
use cli::{
    CommandContext, FilesCommand, OutputFormat, PageCommand, PlayCommand, SearchCommand,
};

fn cargo_style() -> Styles {
    Styles::styled()
        .header(AnsiColor::Green.on_default() | Effects::BOLD)
        .usage(AnsiColor::Green.on_default() | Effects::BOLD)
        .literal(AnsiColor::Cyan.on_default() | Effects::BOLD)
        .placeholder(AnsiColor::Cyan.on_default())
}

#[derive(Parser)]
#[command(name = "strix")]
#[command(about = "Browse, search and play movies and TV shows from a strix server")]
#[command(version)]
#[command(styles = cargo_style())]
struct Cli {
    /// Enable verbose (debug) logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Enable debug logging to file (strix_debug.log)
    #[arg(long, global = true)]
    debug_log: bool,

    /// Path to the config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Output format for commands (text, json)
    #[arg(short, long, global = true, default_value = "text")]
    format: String,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Launch interactive TUI (default if no command given)
    Tui {
        /// Page to open first, e.g. /tv/1399 or /movie/603
        route: Option<String>,
    },

    /// Search movies and TV shows
    Search {
        query: String,
        /// Use the mobile search profile
        #[arg(short, long)]
        mobile: bool,
    },

    /// Render the home page: recently added and trending
    Home,

    /// Render a title page
    Page {
        /// Route such as /tv/1399 or /movie/603
        route: String,
        /// Server-rendered media data (JSON) to start from
        #[arg(long)]
        server_data: Option<String>,
        /// Season to show for TV shows
        #[arg(short, long)]
        season: Option<u32>,
    },

    /// List the episodes of one season
    Season { show_id: u64, season: u32 },

    /// List available files
    Files {
        /// Only show files of this quality, e.g. 1080p
        #[arg(short, long)]
        quality: Option<String>,
        /// Search file names instead of listing everything
        #[arg(short, long)]
        search: Option<String>,
    },

    /// Play a title or stream token with the external player
    Play {
        /// Route such as /movie/603, /tv/1399 or /play?token=...
        route: String,
        #[arg(short, long)]
        season: Option<u32>,
        #[arg(short, long)]
        episode: Option<u32>,
        /// Print the stream URL instead of playing it
        #[arg(long)]
        print: bool,
    },

    /// Show or change the color theme
    Theme { name: Option<String> },

    /// Write the default configuration file
    InitConfig {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Execute a raw API call and print the JSON response
    Api {
        /// Path below /api, e.g. trending or tv/1399
        path: String,
    },
}

fn setup_logging(cli: &Cli) -> Result<()> {
    if cli.debug_log {
        let file = File::create("strix_debug.log")?;
        let file_layer = tracing_subscriber::fmt::layer()
            .with_writer(file)
            .with_ansi(false)
            .with_level(true)
            .with_thread_ids(true)
            .with_thread_names(true)
            .with_file(true)
            .with_line_number(true);

        tracing_subscriber::registry()
            .with(file_layer)
            .with(
                EnvFilter::from_default_env()
                    .add_directive("strix=debug".parse()?)
                    .add_directive("hyper_util=error".parse()?),
            )
            .init();
    } else if cli.verbose {
        tracing_subscriber::fmt()
            .with_writer(std::io::stderr)
            .with_env_filter(
                EnvFilter::from_default_env()
                    .add_directive(tracing::Level::DEBUG.into())
                    .add_directive("hyper_util=error".parse()?),
            )
            .init();
    } else if std::env::var("RUST_LOG").is_ok() {
        tracing_subscriber::fmt()
            .with_writer(std::io::stderr)
            .with_env_filter(
                EnvFilter::from_default_env().add_directive("hyper_util=error".parse()?),
            )
            .init();
    }
    Ok(())
}

fn run_theme_command(config: &Config, name: Option<String>) -> Result<()> {
    let store = ThemeStore::new(ThemeStore::default_path(), &config.ui.default_theme);
    match name {
        Some(name) => {
            store.save(&name)?;
            println!("Theme set to {}", name);
        }
        None => {
            let current = store.load();
            for theme in THEMES {
                let marker = if theme == current { "*" } else { " " };
                println!("{} {}", marker, theme);
            }
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(&cli)?;

    let config_path = cli.config.clone().unwrap_or_else(Config::default_path);
    let config = match &cli.config {
        // An explicitly named file must load once it exists.
        Some(path) if path.exists() => Config::load(path)?,
        _ => Config::load_or_default(&config_path),
    };
    let format = OutputFormat::from_str(&cli.format)?;

    match cli.command {
        None => strix::run_tui(config, Route::Home).await?,
        Some(Commands::Tui { route }) => {
            let start = route.as_deref().map(Route::parse).unwrap_or(Route::Home);
            strix::run_tui(config, start).await?;
        }

        Some(Commands::Search { query, mobile }) => {
            let context = CommandContext::new(config, format)?;
            SearchCommand { query, mobile }.execute(context).await?;
        }

        Some(Commands::Home) => {
            let context = CommandContext::new(config, format)?;
            let cmd = PageCommand {
                route: "/".to_string(),
                server_data: None,
                season: None,
            };
            cmd.execute(context).await?;
        }

        Some(Commands::Page {
            route,
            server_data,
            season,
        }) => {
            let context = CommandContext::new(config, format)?;
            let cmd = PageCommand {
                route,
                server_data,
                season,
            };
            cmd.execute(context).await?;
        }

        Some(Commands::Season { show_id, season }) => {
            let context = CommandContext::new(config, format)?;
            let page = context.page();
            page.set_context(PageContext::for_media(MediaRef::show(show_id)));
            page.change_season(season).await;
        }

        Some(Commands::Files { quality, search }) => {
            let context = CommandContext::new(config, format)?;
            FilesCommand { quality, search }.execute(context).await?;
        }

        Some(Commands::Play {
            route,
            season,
            episode,
            print,
        }) => {
            let context = CommandContext::new(config, format)?;
            let cmd = PlayCommand {
                route,
                season,
                episode,
                print,
            };
            cmd.execute(context).await?;
        }

        Some(Commands::Theme { name }) => run_theme_command(&config, name)?,

        Some(Commands::InitConfig { force }) => {
            if config_path.exists() && !force {
                anyhow::bail!(
                    "{} already exists, use --force to overwrite",
                    config_path.display()
                );
            }
            Config::default().save(&config_path)?;
            println!("Wrote {}", config_path.display());
        }

        Some(Commands::Api { path }) => {
            let context = CommandContext::new(config, OutputFormat::Json)?;
            eprintln!("Using server: {}", context.api.base_url());
            let result = context.api.make_request_raw(&path).await?;
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
    }

    Ok(())
}
