#![forbid(unsafe_code)]
#![deny(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use lint_presets::config::{ConfigContext, Overrides, build_registry};
use lint_presets::logging::init_logging;
use lint_presets::{OutputFormat, resolve, resolve_all, schema_json};

#[derive(Parser, Debug)]
#[command(
    name = "lint-presets",
    version,
    about = "Resolve shareable lint presets into one configuration"
)]
struct Cli {
    /// Preset or fragment to resolve
    #[arg(value_name = "PRESET")]
    preset: Option<String>,

    /// Extra fragment file (yaml, json or toml); repeatable
    #[arg(short = 'c', long = "config-file", value_name = "FILE")]
    config_files: Vec<PathBuf>,

    /// Inline fragment data (yaml), or a bare preset name to extend
    #[arg(short = 'd', long = "config-data", value_name = "YAML")]
    config_data: Option<String>,

    /// Output format: json or toml
    #[arg(short = 'f', long = "format", value_name = "FORMAT", default_value = "json")]
    format: String,

    /// Print every registered name and exit
    #[arg(long = "list-presets", default_value_t = false)]
    list_presets: bool,

    /// Resolve every registered fragment and report failures
    #[arg(long = "check", default_value_t = false)]
    check: bool,

    /// Print the JSON schema of the resolved output and exit
    #[arg(long = "print-schema", default_value_t = false)]
    print_schema: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if cli.print_schema {
        return match schema_json() {
            Ok(schema) => {
                println!("{schema}");
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("{e}");
                ExitCode::from(2)
            }
        };
    }

    let Some(format) = OutputFormat::parse(&cli.format) else {
        eprintln!(
            "error: unknown format '{}', expected json or toml",
            cli.format
        );
        return ExitCode::from(2);
    };

    let ctx = match build_registry(&Overrides {
        fragment_files: cli.config_files.clone(),
        fragment_data: cli.config_data.clone(),
    }) {
        Ok(ctx) => ctx,
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::from(2);
        }
    };

    if cli.list_presets {
        list_presets(&ctx);
        return ExitCode::SUCCESS;
    }

    if cli.check {
        return check_all(&ctx);
    }

    let Some(root) = cli.preset.or_else(|| ctx.root.clone()) else {
        eprintln!("error: expected a preset name, --config-file or --config-data");
        return ExitCode::from(2);
    };

    match resolve(&ctx.registry, &root).and_then(|merged| merged.render(format)) {
        Ok(text) => {
            println!("{}", text.trim_end());
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("{e}");
            ExitCode::from(2)
        }
    }
}

fn list_presets(ctx: &ConfigContext) {
    for name in ctx.registry.names() {
        if ctx.registry.is_external(name) {
            println!("{name} (external)");
        } else {
            println!("{name}");
        }
    }
}

fn check_all(ctx: &ConfigContext) -> ExitCode {
    let mut failed = false;
    for (name, outcome) in resolve_all(&ctx.registry) {
        match outcome {
            Ok(merged) => {
                tracing::info!(fragment = %name, rules = merged.rules().len(), "ok");
            }
            Err(e) => {
                eprintln!("{name}: {e}");
                failed = true;
            }
        }
    }
    if failed {
        ExitCode::from(1)
    } else {
        ExitCode::SUCCESS
    }
}
