//! `staffbook` - CLI for the staffbook employee record manager
//!
//! Without a subcommand this binary connects to the configured database and
//! runs the interactive session on stdin/stdout.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use clap::Parser;

use staffbook::cli::{AddUserCommand, Cli, Command, ConfigCommand};
use staffbook::{init_logging, session, storage, Config, Console, Gateway, Session};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    init_logging(cli.verbosity());

    match cli.command {
        None => run_interactive(cli.config),
        Some(Command::AddUser(cmd)) => handle_add_user(cli.config, &cmd),
        Some(Command::Config(cmd)) => {
            let config = Config::load_from(cli.config)?;
            handle_config(&config, cmd)
        }
    }
}

fn run_interactive(config_path: Option<PathBuf>) -> Result<(), Box<dyn std::error::Error>> {
    let mut console = Console::new(io::stdin().lock(), io::stdout());

    let load = || Config::load_from(config_path.clone());
    let gateway = match session::connect(&mut console, load) {
        Ok(Some(gateway)) => gateway,
        Ok(None) => return Ok(()),
        Err(err) if err.is_input_closed() => return Ok(()),
        Err(err) => return Err(err.into()),
    };

    let mut interactive = Session::new(gateway, console);
    match interactive.run() {
        Err(err) if !err.is_input_closed() => Err(err.into()),
        _ => Ok(()),
    }
}

fn handle_add_user(
    config_path: Option<PathBuf>,
    cmd: &AddUserCommand,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load_from(config_path)?;

    eprint!("Password for {}: ", cmd.email);
    io::stderr().flush()?;
    let mut password = String::new();
    io::stdin().lock().read_line(&mut password)?;
    let password = password.trim_end_matches(['\r', '\n']);
    if password.is_empty() {
        return Err("password cannot be empty".into());
    }

    let gateway = Gateway::new(storage::open(&config.database)?);
    gateway.register_user(&cmd.email, password)?;
    println!("Registered {}", cmd.email);
    Ok(())
}

fn handle_config(config: &Config, cmd: ConfigCommand) -> Result<(), Box<dyn std::error::Error>> {
    match cmd {
        ConfigCommand::Show { json } => {
            let db = &config.database;
            if json {
                let mut shown = config.clone();
                shown.database.uri = db.redacted_uri();
                println!("{}", serde_json::to_string_pretty(&shown)?);
            } else {
                println!("Current Configuration");
                println!("=====================");
                println!();
                println!("[Database]");
                println!(
                    "  URI:                {}",
                    db.redacted_uri().as_deref().unwrap_or("(not set)")
                );
                println!("  Name:               {}", db.name);
                println!("  Users collection:   {}", db.users_collection);
                println!("  Staff collection:   {}", db.staff_collection);
                println!("  Timeout (ms):       {}", db.timeout_ms);
            }
        }
        ConfigCommand::Path => {
            println!("{}", Config::default_config_path().display());
        }
    }
    Ok(())
}
