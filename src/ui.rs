use anyhow::{Context, Result};
use console::{Style, Term};
use hutch::{MasterSecret, Request, Scheme, SecretEntry, KEY_LEN, LOOKUP_TABLE};
use indicatif::{ProgressBar, ProgressStyle};
use rpassword::read_password;
use std::io::{self, BufRead, Write};
use std::time::{Duration, Instant};
use zeroize::Zeroizing;

pub struct DisplayOptions {
    pub unicode_support: bool,
    pub color_support: bool,
    pub quiet: bool,
}

pub fn detect_unicode_support() -> bool {
    supports_unicode::on(supports_unicode::Stream::Stdout)
}

pub fn detect_color_support() -> bool {
    supports_color::on(supports_color::Stream::Stdout).is_some()
}

pub fn get_status_symbols(unicode_support: bool) -> (&'static str, &'static str) {
    if unicode_support {
        ("✓", "!")
    } else {
        ("+", "!")
    }
}

/// Positions of control characters in `s`, counted in chars.
fn control_positions(s: &str) -> Vec<usize> {
    s.chars()
        .enumerate()
        .filter(|(_, c)| c.is_control())
        .map(|(pos, _)| pos)
        .collect()
}

/// Asks for confirmation when `s` carries control characters, which are easy
/// to type by accident and impossible to see when retyping later.
fn confirm_control_characters(s: &str, input_name: &str) -> Result<()> {
    let positions = control_positions(s);
    if positions.is_empty() {
        return Ok(());
    }

    let term = Term::stderr();
    let warning_msg = format!(
        "WARNING: {} contains {} control character(s) at position(s): {}",
        input_name,
        positions.len(),
        positions
            .iter()
            .map(|pos| pos.to_string())
            .collect::<Vec<_>>()
            .join(", ")
    );

    term.write_line(&warning_msg)?;
    term.write_str("Continue anyway? [y/N]: ")?;
    term.flush()?;

    let mut response = String::new();
    io::stdin().read_line(&mut response)?;
    let response = response.trim().to_lowercase();

    term.clear_last_lines(2)?;

    if response != "y" && response != "yes" {
        anyhow::bail!("Aborted: {} contains control characters", input_name);
    }

    Ok(())
}

/// Reads one raw line, without its terminator. Decoding is left to the
/// caller so invalid UTF-8 surfaces as a derivation error.
fn prompt_line(prompt: &str) -> Result<Vec<u8>> {
    print!("{}", prompt);
    io::stdout().flush()?;

    let mut line = Vec::new();
    io::stdin()
        .lock()
        .read_until(b'\n', &mut line)
        .context("Failed to read from stdin")?;

    while matches!(line.last(), Some(b'\n' | b'\r')) {
        line.pop();
    }
    Ok(line)
}

pub fn prompt_site() -> Result<Vec<u8>> {
    prompt_line("Enter Website >")
}

pub fn prompt_account() -> Result<Vec<u8>> {
    prompt_line("Enter Account (Case Sensitive!) >")
}

pub fn confirm_request(request: &Request) -> Result<()> {
    confirm_control_characters(request.site_host(), "Site")?;
    confirm_control_characters(request.account(), "Account")
}

/// Masked master secret entry on the controlling terminal.
pub struct TerminalEntry;

impl SecretEntry for TerminalEntry {
    fn acquire(&mut self) -> Result<MasterSecret> {
        print!("Enter Master Password >");
        io::stdout().flush()?;

        let passphrase =
            Zeroizing::new(read_password().context("Failed to fetch master secret")?);

        Ok(MasterSecret::from_passphrase(&passphrase)?)
    }
}

pub fn show_progress<F, T>(unicode_support: bool, quiet: bool, f: F) -> Result<(T, Duration)>
where
    F: FnOnce() -> Result<T>,
{
    if quiet {
        let start = Instant::now();
        return f().map(|r| (r, start.elapsed()));
    }

    println!();

    let term = Term::stdout();
    term.hide_cursor().ok();

    let pb = ProgressBar::new_spinner();

    if unicode_support {
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner())
                .tick_strings(&[
                    "⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿",
                ]),
        );
    } else {
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner())
                .tick_chars("-\\|/-"),
        );
    }

    pb.set_message("Stretching key...");
    pb.enable_steady_tick(Duration::from_millis(80));

    let start = Instant::now();
    let result = f();
    let elapsed = start.elapsed();

    pb.finish_and_clear();
    term.show_cursor().ok();

    result.map(|r| (r, elapsed))
}

pub fn display_output(
    password: &Zeroizing<String>,
    request: &Request,
    master_byte_length: usize,
    elapsed: Duration,
    options: &DisplayOptions,
) {
    if options.quiet {
        println!("{}", &**password);
        return;
    }

    let highlight = if options.color_support {
        Style::new().red().on_white()
    } else {
        Style::new()
    };

    println!(
        "Generated Password for the site \"{}\" with account \"{}\" is : {}\n",
        request.site_host(),
        request.account(),
        highlight.apply_to(&**password)
    );

    display_settings(master_byte_length, password.chars().count());
    display_stats(elapsed, options);
}

fn display_settings(master_byte_length: usize, output_chars: usize) {
    let scheme = Scheme::V1;

    println!("Settings:");
    println!("  ├─ Scheme     v{}", scheme.version);
    println!("  ├─ Digest     SHA-512");
    println!(
        "  ├─ Alphabet   {} symbols, personalized per master secret",
        LOOKUP_TABLE.chars().count()
    );
    println!(
        "  ├─ KDF        PBKDF2-HMAC-SHA512 ({} iterations, {}-byte key)",
        scheme.iterations, KEY_LEN
    );
    println!(
        "  ├─ Master     {} {}",
        master_byte_length,
        if master_byte_length == 1 { "byte" } else { "bytes" }
    );
    println!(
        "  └─ Output     {} {}",
        output_chars,
        if output_chars == 1 { "char" } else { "chars" }
    );

    println!();
}

fn display_stats(elapsed: Duration, options: &DisplayOptions) {
    let (check_ok, _) = get_status_symbols(options.unicode_support);

    let style = if options.color_support {
        Style::new().green()
    } else {
        Style::new()
    };

    println!(
        "{} Derived in {:.1}s",
        style.apply_to(format!("[{}]", check_ok)),
        elapsed.as_secs_f64()
    );
}
