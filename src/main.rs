mod ui;

use anyhow::Result;
use clap::{ArgAction, Parser};
use hutch::{Request, SecretEntry};
use std::ffi::OsString;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Parser)]
#[command(
    name = "hutch",
    version,
    author,
    about = "Stateless password generator: one master secret, one password per site and account"
)]
struct Cli {
    /// Website URL, e.g. https://example.com (prompted when omitted)
    #[arg(short, long)]
    site: Option<OsString>,

    /// Account name, case sensitive (prompted when omitted)
    #[arg(short, long)]
    account: Option<OsString>,

    /// Print only the generated password
    #[arg(short, long)]
    quiet: bool,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,

    /// Raise log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn init_logging(verbosity: u8) {
    let env_filter = match verbosity {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .finish();

    if tracing::subscriber::set_global_default(subscriber).is_err() {
        eprintln!("Unable to set global default subscriber");
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if !cli.quiet {
        println!("Hutch - Stateless Password Generator v{}", env!("CARGO_PKG_VERSION"));
    }

    let site = match cli.site {
        Some(site) => site.into_encoded_bytes(),
        None => ui::prompt_site()?,
    };
    let account = match cli.account {
        Some(account) => account.into_encoded_bytes(),
        None => ui::prompt_account()?,
    };

    let request = Request::from_utf8(&site, &account)?;
    ui::confirm_request(&request)?;
    info!(site = request.site_host(), "Request validated");

    let secret = ui::TerminalEntry.acquire()?;
    let master_byte_length = secret.len();

    let options = ui::DisplayOptions {
        unicode_support: ui::detect_unicode_support(),
        color_support: !cli.no_color && ui::detect_color_support(),
        quiet: cli.quiet,
    };

    let (password, elapsed) = ui::show_progress(options.unicode_support, options.quiet, || {
        Ok(hutch::derive_password(&secret, &request)?)
    })?;
    drop(secret);

    ui::display_output(&password, &request, master_byte_length, elapsed, &options);

    Ok(())
}
