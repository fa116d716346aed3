use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use keycask::cli::{
    handle_entry_command, handle_file_command, CommandContext, EntryCommands, FileCommands,
    PassphraseSource,
};
use keycask::config::{paths::KeycaskPaths, settings::Settings};
use keycask::models::generator::DEFAULT_SYMBOLS;
use keycask::KeycaskError;

#[derive(Parser)]
#[command(
    name = "keycask",
    author = "Kaylee Beyene",
    version,
    about = "Encrypted single-file credential store",
    long_about = "keycask keeps titles, URLs, usernames, passwords and notes in a \
                  single AES-256 encrypted file protected by one passphrase.\n\n\
                  Set KEYCASK_PASSPHRASE (and KEYCASK_NEW_PASSPHRASE for init and \
                  passwd) to skip the passphrase prompts."
)]
struct Cli {
    /// Show debug logging (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Document to operate on
    #[arg(short, long, global = true, env = "KEYCASK_FILE")]
    file: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    #[command(flatten)]
    File(FileCommands),

    #[command(flatten)]
    Entry(EntryCommands),

    /// Print a random password
    Generate {
        /// Password length (1-64)
        #[arg(short, long)]
        length: Option<usize>,
        /// Include symbols
        #[arg(short, long)]
        symbols: bool,
    },

    /// Show current configuration and paths
    Config,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    // Initialize paths and settings
    let paths = KeycaskPaths::new()?;
    let settings = Settings::load_or_create(&paths)?;

    let passphrases = PassphraseSource::from_env();
    let ctx = CommandContext::new(paths, settings, cli.file, passphrases);

    let result = match cli.command {
        Some(Commands::File(cmd)) => handle_file_command(&ctx, cmd),
        Some(Commands::Entry(cmd)) => handle_entry_command(&ctx, cmd),
        Some(Commands::Generate { length, symbols }) => {
            let prefs = &ctx.settings.password_generation;
            let mut generator = prefs.generator();
            if let Some(length) = length {
                generator = generator.length(length);
            }
            if symbols && prefs.symbols.is_none() {
                generator = generator.symbols(Some(DEFAULT_SYMBOLS.to_string()));
            }
            generator.generate().map(|password| {
                println!("{}", password.as_str());
            })
        }
        Some(Commands::Config) => {
            print_config(&ctx);
            Ok(())
        }
        None => {
            println!("keycask - encrypted credential store");
            println!();
            println!("Run 'keycask --help' for usage information.");
            println!("Run 'keycask init' to create a document.");
            Ok(())
        }
    };

    if let Err(KeycaskError::FileNotFound(path)) = &result {
        eprintln!(
            "No document at {}. Run 'keycask init' to create one.",
            path.display()
        );
    }
    result.map_err(Into::into)
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format_timestamp(None)
        .init();
}

fn print_config(ctx: &CommandContext) {
    let settings = &ctx.settings;
    println!("keycask Configuration");
    println!("=====================");
    println!("Config directory: {}", ctx.paths.base_dir().display());
    println!("Settings file:    {}", ctx.paths.settings_file().display());
    println!("Document:         {}", ctx.document().display());
    println!();
    println!("Settings:");
    println!("  Serialization:     {}", settings.serialization);
    println!("  Compression level: {}", settings.compression_level);
    println!(
        "  Password length:   {}",
        settings.password_generation.length
    );
    println!(
        "  Password symbols:  {}",
        settings
            .password_generation
            .symbols
            .as_deref()
            .unwrap_or("(none)")
    );
}
