use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::io::Read;
use std::path::{Path, PathBuf};

use adf_convert::Config;

#[derive(Parser)]
#[command(
    name = "adf-convert",
    version,
    about = "Convert between Markdown and Atlassian Document Format",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    #[arg(long, help = "Config file path")]
    config: Option<PathBuf>,

    #[arg(long, help = "Profile name")]
    profile: Option<String>,

    #[arg(short, long, action = clap::ArgAction::Count, help = "Verbose logging")]
    verbose: u8,
}

#[derive(Subcommand)]
enum Command {
    /// Convert Markdown to ADF JSON
    ToAdf {
        #[arg(help = "Markdown file (stdin when absent or '-')")]
        input: Option<PathBuf>,
        #[arg(long, help = "Keep all links as plain links")]
        no_smart_links: bool,
        #[arg(long, help = "Pretty-print JSON output")]
        pretty: bool,
        #[arg(long, help = "Validate the produced document")]
        validate: bool,
    },
    /// Convert ADF JSON to Markdown
    ToMarkdown {
        #[arg(help = "ADF JSON file (stdin when absent or '-')")]
        input: Option<PathBuf>,
    },
    /// Validate an ADF JSON document
    Validate {
        #[arg(help = "ADF JSON file (stdin when absent or '-')")]
        input: Option<PathBuf>,
    },
    Config(ConfigCommand),
}

#[derive(Parser)]
struct ConfigCommand {
    #[command(subcommand)]
    subcommand: ConfigSubcommand,
}

#[derive(Subcommand)]
enum ConfigSubcommand {
    Init {
        #[arg(long)]
        global: bool,
    },
    Show,
    Path {
        #[arg(long)]
        global: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(log_level)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Command::Config(cmd) => handle_config(cmd, cli.config.as_ref(), cli.profile.as_ref()),
        Command::ToAdf {
            input,
            no_smart_links,
            pretty,
            validate,
        } => {
            let config = Config::load(cli.config.as_ref(), cli.profile.as_ref())?;
            let mut options = config.markdown_options();
            if no_smart_links {
                options.enable_smart_links = false;
            }

            let markdown = read_input(input.as_deref())?;
            let doc = adf_convert::markdown_to_adf(&markdown, &options);
            let value = serde_json::to_value(&doc)?;
            output_json(&value, pretty)?;

            if validate {
                let report = adf_convert::validate(&value);
                if !report.valid {
                    print_errors(&report.errors);
                    std::process::exit(1);
                }
            }
            Ok(())
        }
        Command::ToMarkdown { input } => {
            let config = Config::load(cli.config.as_ref(), cli.profile.as_ref())?;
            let value = read_json(input.as_deref())?;
            let markdown = adf_convert::adf_to_markdown(&value, &config.adf_options())?;
            println!("{}", markdown);
            Ok(())
        }
        Command::Validate { input } => {
            let value = read_json(input.as_deref())?;
            let report = adf_convert::validate(&value);
            if report.valid {
                println!("valid");
                Ok(())
            } else {
                print_errors(&report.errors);
                std::process::exit(1);
            }
        }
    }
}

fn handle_config(
    cmd: ConfigCommand,
    config_path: Option<&PathBuf>,
    profile: Option<&String>,
) -> Result<()> {
    match cmd.subcommand {
        ConfigSubcommand::Init { global } => {
            let path = Config::init_config(global)?;
            println!("Created config file: {:?}", path);
            Ok(())
        }
        ConfigSubcommand::Show => {
            let config = Config::load(config_path, profile)?;
            print!("{}", toml::to_string_pretty(&config)?);
            Ok(())
        }
        ConfigSubcommand::Path { global } => {
            let path = if global {
                Config::global_config_path()
            } else {
                // Try project config first, fall back to global
                Config::project_config_path().or_else(Config::global_config_path)
            };

            if let Some(p) = path {
                println!("{}", p.display());
            } else {
                anyhow::bail!("Config file not found");
            }
            Ok(())
        }
    }
}

fn read_input(input: Option<&Path>) -> Result<String> {
    match input {
        Some(path) if path != Path::new("-") => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read input file: {:?}", path)),
        _ => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read stdin")?;
            Ok(buf)
        }
    }
}

fn read_json(input: Option<&Path>) -> Result<serde_json::Value> {
    let text = read_input(input)?;
    serde_json::from_str(&text).context("Input is not valid JSON")
}

fn print_errors(errors: &[adf_convert::ValidationError]) {
    eprintln!("invalid: {} error(s)", errors.len());
    for error in errors {
        eprintln!("  {}", error);
    }
}

fn output_json(value: &serde_json::Value, pretty: bool) -> Result<()> {
    if pretty {
        println!("{}", serde_json::to_string_pretty(value)?);
    } else {
        println!("{}", serde_json::to_string(value)?);
    }
    Ok(())
}
