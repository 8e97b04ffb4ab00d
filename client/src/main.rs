//! `portal`: command-line front end for the travel portal client.
#![cfg_attr(not(any(test, doctest)), deny(clippy::unwrap_used))]
#![cfg_attr(not(any(test, doctest)), deny(clippy::expect_used))]

use std::ffi::OsString;
use std::io::{self, Write};

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use ortho_config::OrthoConfig;
use serde::Serialize;
use tokio::runtime::Builder;
use tracing::warn;
use tracing_subscriber::{EnvFilter, fmt};

use client::app::{AppContext, build_context};
use client::config::ClientSettings;
use client::domain::LoginCredentials;
use client::inbound::navigation::RouteTable;

/// `portal` command arguments.
#[derive(Debug, Parser)]
#[command(
    name = "portal",
    about = "Sign in to the travel portal and inspect its catalogue",
    version
)]
struct CliArgs {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Sign in and persist the session.
    Login {
        /// Account email.
        #[arg(long)]
        email: String,
        /// Account password.
        #[arg(long, env = "PORTAL_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Drop the persisted session.
    Logout,
    /// Print the signed-in user.
    Whoami,
    /// List activities.
    Activities {
        /// Include soft-deleted activities.
        #[arg(long)]
        include_deleted: bool,
    },
    /// List tour packages.
    Packages,
    /// Print revenue per activity type.
    Revenue {
        /// Calendar year.
        #[arg(long)]
        year: i32,
        /// Month within the year, 1 to 12.
        #[arg(long)]
        month: Option<u32>,
    },
}

fn main() -> Result<()> {
    color_eyre::install()?;
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .with_writer(io::stderr)
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let args = CliArgs::parse();
    let runtime = Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|error| eyre!("create Tokio runtime: {error}"))?;
    runtime.block_on(run(args.command))
}

async fn run(command: Command) -> Result<()> {
    let settings = ClientSettings::load_from_iter([OsString::from("portal")])
        .map_err(|error| eyre!("load settings: {error}"))?;
    let app = build_context(&settings, RouteTable::new())?;
    let mut out = io::stdout().lock();

    match command {
        Command::Login { email, password } => {
            let credentials = LoginCredentials::try_from_parts(&email, &password)?;
            let session = app.session.login(&credentials).await?;
            if let Some(user) = session.identity() {
                writeln!(out, "signed in as {} ({})", user.email(), user.role_name())?;
            }
        }
        Command::Logout => {
            app.session.logout();
            writeln!(out, "signed out")?;
        }
        Command::Whoami => match app.session.current_user() {
            Some(user) => print_json(&mut out, &user)?,
            None => writeln!(out, "not signed in")?,
        },
        Command::Activities { include_deleted } => {
            let activities = if include_deleted {
                app.activities.list_including_deleted().await?
            } else {
                app.activities.list().await?
            };
            print_json(&mut out, &activities)?;
        }
        Command::Packages => {
            let packages = app.packages.list().await?;
            print_json(&mut out, &packages)?;
        }
        Command::Revenue { year, month } => {
            let rows = app.statistics.revenue(year, month).await?;
            print_json(&mut out, &rows)?;
        }
    }
    report_session(&app);
    Ok(())
}

fn print_json(out: &mut impl Write, value: &impl Serialize) -> Result<()> {
    serde_json::to_writer_pretty(&mut *out, value)?;
    writeln!(out)?;
    Ok(())
}

fn report_session(app: &AppContext) {
    if let Some(token) = app.session.token() {
        tracing::debug!(token_fingerprint = %token.fingerprint(), "session active");
    }
}
