use std::path::{Path, PathBuf};
use std::process;
use std::time::Duration;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use dbml_laravel::config::{GeneratorConfig, ParserConfig, today_stamp};
use dbml_laravel::generator::generate;
use dbml_laravel::parser::{DbmlParser, JsonPayloadParser, NodeDbmlParser};
use dbml_laravel::render::{StubLoader, publish_stubs};

#[derive(Parser, Debug)]
#[command(name = "dbml-laravel")]
#[command(about = "Generate Laravel models and migrations from a DBML schema")]
struct Cli {
    /// Log debug output (overridden by RUST_LOG).
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate models and migrations for every table.
    Generate(GenerateArgs),
    /// Copy the packaged stubs into the project for customization.
    PublishStubs(PublishArgs),
}

#[derive(Args, Debug)]
struct GenerateArgs {
    /// DBML file, or a `.json` export of one.
    file: PathBuf,

    /// Overwrite existing models and replace existing migrations.
    #[arg(short, long)]
    force: bool,

    /// Project root.
    #[arg(long, default_value = ".")]
    base_path: PathBuf,

    #[arg(long, default_value = dbml_laravel::config::DEFAULT_MODELS_DIR)]
    models_dir: PathBuf,

    #[arg(long, default_value = dbml_laravel::config::DEFAULT_MIGRATIONS_DIR)]
    migrations_dir: PathBuf,

    /// Template override directory.
    #[arg(long, default_value = dbml_laravel::config::DEFAULT_STUBS_DIR)]
    stubs_dir: PathBuf,

    /// Node.js executable used to parse DBML.
    #[arg(long, default_value = "node")]
    node: String,

    /// Parser script to run instead of the bundled one.
    #[arg(long)]
    parser_script: Option<PathBuf>,

    /// Parser timeout in seconds.
    #[arg(long, default_value_t = 30)]
    timeout: u64,
}

#[derive(Args, Debug)]
struct PublishArgs {
    /// Project root.
    #[arg(long, default_value = ".")]
    base_path: PathBuf,

    #[arg(long, default_value = dbml_laravel::config::DEFAULT_STUBS_DIR)]
    stubs_dir: PathBuf,

    /// Overwrite stubs that were already published.
    #[arg(short, long)]
    force: bool,
}

fn main() {
    let cli = Cli::parse();
    setup_tracing(cli.verbose);

    if let Err(e) = run(cli.command) {
        tracing::error!("{e}");
        process::exit(1);
    }
}

fn setup_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();
}

fn run(command: Command) -> Result<()> {
    match command {
        Command::Generate(args) => run_generate(args),
        Command::PublishStubs(args) => {
            let config = GeneratorConfig {
                base_path: args.base_path,
                stubs_dir: args.stubs_dir,
                ..GeneratorConfig::default()
            };
            publish_stubs(&config.stubs_path(), args.force)?;
            Ok(())
        }
    }
}

fn run_generate(args: GenerateArgs) -> Result<()> {
    let config = GeneratorConfig {
        base_path: args.base_path,
        models_dir: args.models_dir,
        migrations_dir: args.migrations_dir,
        stubs_dir: args.stubs_dir,
        force: args.force,
        date_stamp: today_stamp(),
    };
    let templates = StubLoader::new(config.stubs_path());
    let parser = select_parser(
        &args.file,
        ParserConfig {
            node_binary: args.node,
            script: args.parser_script,
            timeout: Duration::from_secs(args.timeout),
        },
    );

    generate(&args.file, parser.as_ref(), &config, &templates)?;
    Ok(())
}

fn select_parser(file: &Path, config: ParserConfig) -> Box<dyn DbmlParser> {
    let is_json = file
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

    if is_json {
        Box::new(JsonPayloadParser)
    } else {
        Box::new(NodeDbmlParser::new(config))
    }
}
