//! stride-tools: STRIDE threat-modeling inference engine
//!
//! Infers STRIDE threats from a system description, data flows, trust
//! boundaries and an optional architecture diagram.

#![allow(clippy::struct_excessive_bools, clippy::needless_pass_by_value)]

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use std::io;
use std::path::PathBuf;
use stride_tools::{
    cli::{self, InitConfig, RulesConfig, RulesFormat},
    config::{
        self, AnalysisOverlay, AnalyzeConfigBuilder, AppConfig, BehaviorOverlay, ConfigOverlay,
        ConfigPreset, DiagramOverlay, OutputOverlay, RulesPathConfig, Validatable,
    },
    diagram::DiagramFormat,
    parsers::InputOverrides,
    pipeline::{exit_codes, PipelineError},
    reports::ReportFormat,
    rules::DosRuleVariant,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Build long version string with format support info
const fn build_long_version() -> &'static str {
    concat!(
        env!("CARGO_PKG_VERSION"),
        "\n\nModel Formats:",
        "\n  YAML, JSON (description, flows, boundaries, diagram)",
        "\n\nReport Formats:",
        "\n  summary, table, json, markdown, sarif, csv",
        "\n\nDiagram Formats:",
        "\n  ascii, dot, png, svg (png/svg need Graphviz)"
    )
}

#[derive(Parser)]
#[command(name = "stride-tools")]
#[command(version, long_version = build_long_version())]
#[command(about = "STRIDE threat-modeling inference engine", long_about = None)]
#[command(after_help = "EXIT CODES:
    0  Success (or threats found without --fail-on-threats)
    1  Threats identified with --fail-on-threats
    2  Input rejected (missing description, malformed flow or boundary)
    3  Error occurred

EXAMPLES:
    # Start from a template and analyze it
    stride-tools init threat-model.yaml
    stride-tools analyze threat-model.yaml

    # Inline model, no file needed
    stride-tools analyze -d \"public web app with login\" \\
        --flow \"browser,api,credentials\" --boundary \"dmz:browser api\"

    # CI/CD gate with SARIF for code scanning
    stride-tools analyze model.yaml -o sarif -O threats.sarif --fail-on-threats

    # Annotated data-flow diagram
    stride-tools analyze model.yaml --diagram-out dfd.svg")]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Disable colored output (also respects `NO_COLOR` env)
    #[arg(long, global = true)]
    no_color: bool,

    /// Path to configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Start from a named preset (default, extended, legacy, ci-cd)
    #[arg(long, global = true, value_parser = parse_preset)]
    preset: Option<ConfigPreset>,

    #[command(subcommand)]
    command: Commands,
}

/// Arguments for the `analyze` subcommand
#[derive(Parser)]
struct AnalyzeArgs {
    /// Threat-model file (YAML or JSON)
    model: Option<PathBuf>,

    /// System description (replaces the model's description)
    #[arg(short, long)]
    description: Option<String>,

    /// Data flow as "source,destination,data type" (repeatable)
    #[arg(long = "flow", value_name = "FLOW")]
    flows: Vec<String>,

    /// Trust boundary as "name:description" (repeatable)
    #[arg(long = "boundary", value_name = "BOUNDARY")]
    boundaries: Vec<String>,

    /// Architecture diagram (replaces the model's diagram)
    #[arg(long)]
    diagram: Option<PathBuf>,

    /// Report format (auto: summary on a terminal, json otherwise)
    #[arg(short, long, value_enum)]
    output: Option<ReportFormat>,

    /// Report file path (stdout if not specified)
    #[arg(short = 'O', long)]
    output_file: Option<PathBuf>,

    /// Custom rules file extending the built-in catalogue
    #[arg(long, env = "STRIDE_TOOLS_RULES")]
    rules: Option<PathBuf>,

    /// Gating of the system-level denial-of-service rule
    #[arg(long, value_enum)]
    dos_rule: Option<DosRuleVariant>,

    /// Skip the PUB-* rules for public-facing systems
    #[arg(long)]
    no_public_overlay: bool,

    /// Raise spoofing for boundaries named "frontend" too
    #[arg(long)]
    frontend_spoofing: bool,

    /// Skip the diagram-component stage
    #[arg(long)]
    no_diagram_stage: bool,

    /// Write an annotated data-flow diagram to this file
    #[arg(long)]
    diagram_out: Option<PathBuf>,

    /// Diagram format (inferred from --diagram-out extension when omitted)
    #[arg(long, value_enum)]
    diagram_format: Option<DiagramFormat>,

    /// Graphviz `dot` binary used for png/svg diagrams
    #[arg(long, value_name = "PATH")]
    graphviz: Option<String>,

    /// Print which keyword triggered each detected feature
    #[arg(long)]
    explain: bool,

    /// Exit with code 1 when any threat is identified
    #[arg(long)]
    fail_on_threats: bool,
}

/// Arguments for the `rules` subcommand
#[derive(Parser)]
struct RulesArgs {
    /// Custom rules file to merge into the listing
    #[arg(long, env = "STRIDE_TOOLS_RULES")]
    rules: Option<PathBuf>,

    /// Only validate the custom rules file
    #[arg(long)]
    check: bool,

    /// Listing format
    #[arg(short, long, value_enum, default_value = "table")]
    output: RulesFormat,

    /// Write the listing to a file
    #[arg(short = 'O', long)]
    output_file: Option<PathBuf>,

    /// Gating of the system-level denial-of-service rule
    #[arg(long, value_enum)]
    dos_rule: Option<DosRuleVariant>,
}

#[derive(Subcommand)]
enum Commands {
    /// Infer STRIDE threats for a system
    Analyze(AnalyzeArgs),

    /// List the effective rule catalogue or check a custom rules file
    Rules(RulesArgs),

    /// Write a starter threat-model file
    Init {
        /// Target file
        #[arg(default_value = "threat-model.yaml")]
        path: PathBuf,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },

    /// Generate JSON Schema for the config file format
    ConfigSchema {
        /// Write schema to file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show, discover, or initialize configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Sub-subcommands for the `config` command
#[derive(Subcommand)]
enum ConfigAction {
    /// Print current effective configuration (merged from defaults + file)
    Show,
    /// Print config file search paths and discovered config file
    Path,
    /// Generate an example .stride-tools.yaml in the current directory
    Init,
}

fn parse_preset(value: &str) -> Result<ConfigPreset, String> {
    ConfigPreset::from_name(value).ok_or_else(|| {
        let names: Vec<&str> = ConfigPreset::all().iter().map(ConfigPreset::name).collect();
        format!("unknown preset '{value}' (expected one of: {})", names.join(", "))
    })
}

fn main() {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| log_level.to_string()),
        ))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(io::stderr),
        )
        .init();

    let code = match run(cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("Error: {err:#}");
            err.downcast_ref::<PipelineError>()
                .map_or(exit_codes::ERROR, PipelineError::exit_code)
        }
    };
    std::process::exit(code);
}

/// Effective settings: preset, then config file, then command-line flags.
fn resolve_app_config(cli: &Cli, flags: &ConfigOverlay) -> AppConfig {
    let (file_config, loaded_from) = config::load_or_default(cli.config.as_deref());
    if let Some(path) = &loaded_from {
        tracing::debug!("Loaded config from {}", path.display());
    }
    AppConfig::layered(cli.preset, &[&file_config, flags])
}

/// Only the flags given on the command line; absent flags leave the
/// preset and file values alone.
fn analyze_flags(cli: &Cli, args: &AnalyzeArgs) -> ConfigOverlay {
    ConfigOverlay {
        analysis: AnalysisOverlay {
            public_facing_overlay: args.no_public_overlay.then_some(false),
            boundary_frontend_spoofing: args.frontend_spoofing.then_some(true),
            dos_rule: args.dos_rule,
            diagram_stage: args.no_diagram_stage.then_some(false),
        },
        rules: RulesPathConfig {
            path: args.rules.clone(),
        },
        output: OutputOverlay {
            format: args.output,
            file: args.output_file.clone(),
            no_color: cli.no_color.then_some(true),
        },
        diagram: DiagramOverlay {
            format: args.diagram_format,
            file: args.diagram_out.clone(),
            graphviz_binary: args.graphviz.clone(),
            title: None,
        },
        behavior: BehaviorOverlay {
            fail_on_threats: args.fail_on_threats.then_some(true),
            quiet: cli.quiet.then_some(true),
            explain: args.explain.then_some(true),
        },
    }
}

fn ensure_valid(config: &impl Validatable) -> Result<()> {
    let errors = config.validate();
    if errors.is_empty() {
        return Ok(());
    }
    let lines: Vec<String> = errors.iter().map(ToString::to_string).collect();
    anyhow::bail!("invalid configuration:\n  {}", lines.join("\n  "))
}

fn run(cli: Cli) -> Result<i32> {
    match &cli.command {
        Commands::Analyze(args) => {
            let app = resolve_app_config(&cli, &analyze_flags(&cli, args));

            let builder = AnalyzeConfigBuilder::from_app(&app)
                .model(args.model.clone())
                .overrides(InputOverrides {
                    description: args.description.clone(),
                    flows: args.flows.clone(),
                    boundaries: args.boundaries.clone(),
                    diagram: args.diagram.clone(),
                });
            let config = builder.build()?;
            ensure_valid(&config)?;

            cli::run_analyze(config)
        }

        Commands::Rules(args) => {
            let flags = ConfigOverlay {
                analysis: AnalysisOverlay {
                    dos_rule: args.dos_rule,
                    ..AnalysisOverlay::default()
                },
                rules: RulesPathConfig {
                    path: args.rules.clone(),
                },
                ..ConfigOverlay::default()
            };
            let app = resolve_app_config(&cli, &flags);
            ensure_valid(&app.rules)?;

            cli::run_rules(RulesConfig {
                analysis: app.analysis,
                rules: app.rules,
                format: args.output,
                check: args.check,
                output: args.output_file.clone(),
                quiet: cli.quiet,
            })
        }

        Commands::Init { path, force } => cli::run_init(InitConfig {
            path: path.clone(),
            force: *force,
            quiet: cli.quiet,
        }),

        Commands::Completions { shell } => {
            generate(*shell, &mut Cli::command(), "stride-tools", &mut io::stdout());
            Ok(exit_codes::SUCCESS)
        }

        Commands::ConfigSchema { output } => {
            let schema = config::generate_json_schema().context("failed to generate schema")?;
            match output {
                Some(path) => {
                    std::fs::write(path, &schema)
                        .with_context(|| format!("failed to write {}", path.display()))?;
                    eprintln!("Schema written to {}", path.display());
                }
                None => {
                    println!("{schema}");
                }
            }
            Ok(exit_codes::SUCCESS)
        }

        Commands::Config { action } => match action {
            ConfigAction::Show => {
                let app = resolve_app_config(&cli, &ConfigOverlay::default());
                if let Some(path) = config::discover_config_file(cli.config.as_deref()) {
                    eprintln!("# Loaded from: {}", path.display());
                } else {
                    eprintln!("# No config file found; showing defaults");
                }
                let yaml = serde_yaml::to_string(&app).context("failed to serialize config")?;
                print!("{yaml}");
                Ok(exit_codes::SUCCESS)
            }
            ConfigAction::Path => {
                let search_paths: [Option<String>; 3] = [
                    std::env::current_dir()
                        .ok()
                        .map(|p| p.display().to_string()),
                    config::user_config_dir().map(|p| p.display().to_string()),
                    ::dirs::home_dir().map(|p| p.display().to_string()),
                ];
                eprintln!("Config file search paths (in order):");
                for path in search_paths.into_iter().flatten() {
                    eprintln!("  {path}");
                }
                eprintln!();
                eprintln!("Recognized file names:");
                for name in &[
                    ".stride-tools.yaml",
                    ".stride-tools.yml",
                    "stride-tools.yaml",
                    "stride-tools.yml",
                ] {
                    eprintln!("  {name}");
                }
                eprintln!();
                match config::discover_config_file(cli.config.as_deref()) {
                    Some(path) => eprintln!("Active config file: {}", path.display()),
                    None => eprintln!("No config file found."),
                }
                Ok(exit_codes::SUCCESS)
            }
            ConfigAction::Init => {
                let target = std::env::current_dir()
                    .context("cannot determine current directory")?
                    .join(config::default_config_path());
                if target.exists() {
                    anyhow::bail!(
                        "{} already exists. Remove it first to re-initialize.",
                        target.display()
                    );
                }
                let content = config::generate_full_example_config();
                std::fs::write(&target, content)
                    .with_context(|| format!("failed to write {}", target.display()))?;
                eprintln!("Created {}", target.display());
                Ok(exit_codes::SUCCESS)
            }
        },
    }
}
