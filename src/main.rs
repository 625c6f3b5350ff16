/*!
 * Webin CLI - Command Line Interface
 *
 * Validates a submission manifest for one context and prepares the upload
 * bundle (checksummed file list plus XML documents).
 */

use clap::{Args, Parser, Subcommand, ValueEnum};
use secrecy::SecretString;
use std::path::PathBuf;
use webin::{
    cli_style::{self, print_error, print_info, print_success, section_header, Theme},
    config::{Environment, LogLevel, SubmitConfig},
    context::ContextType,
    error::{Result, WebinError, EXIT_SUCCESS},
    logging,
    lookup::HttpLookupClient,
    report,
    submit::Submission,
    CacheOutcome,
};

#[derive(Parser)]
#[command(name = "webin")]
#[command(version, about = "Validate submission manifests and prepare upload bundles", long_about = None)]
struct Cli {
    /// Directory data files and INFO files are resolved against
    #[arg(long, value_name = "DIR", global = true)]
    input_dir: Option<PathBuf>,

    /// Directory for validation reports and submission bundles
    #[arg(long, value_name = "DIR", global = true)]
    output_dir: Option<PathBuf>,

    /// Use the test service
    #[arg(long, global = true)]
    test: bool,

    /// Webin submission account
    #[arg(long, global = true)]
    username: Option<String>,

    /// Webin password (or set WEBIN_PASSWORD)
    #[arg(long, global = true)]
    password: Option<String>,

    /// Submitting center name
    #[arg(long, global = true)]
    center_name: Option<String>,

    /// Prepare a bundle despite validation errors (never cached)
    #[arg(long, global = true)]
    ignore_errors: bool,

    /// Accept manifest fields the context does not declare
    #[arg(long, global = true)]
    allow_unknown_fields: bool,

    /// Configuration file (TOML)
    #[arg(long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, value_enum, global = true)]
    log_level: Option<LogLevelArg>,

    /// Path to log file (default: stderr)
    #[arg(long, value_name = "FILE", global = true)]
    log: Option<PathBuf>,

    /// Enable verbose logging (equivalent to --log-level=debug)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Genome assembly
    Genome(SubmitArgs),

    /// Transcriptome assembly
    Transcriptome(SubmitArgs),

    /// Annotated sequences
    Sequence(SubmitArgs),

    /// Raw sequencing reads
    Reads(SubmitArgs),

    /// List the manifest fields and file groups of a context
    Fields {
        #[arg(value_enum)]
        context: ContextArg,
    },

    /// Generate shell completions
    Completions {
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Args)]
struct SubmitArgs {
    /// Manifest file
    #[arg(short, long, value_name = "FILE")]
    manifest: PathBuf,

    /// Validate only; do not prepare a bundle
    #[arg(long)]
    validate: bool,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum ContextArg {
    Genome,
    Transcriptome,
    Sequence,
    Reads,
}

impl From<ContextArg> for ContextType {
    fn from(arg: ContextArg) -> Self {
        match arg {
            ContextArg::Genome => ContextType::Genome,
            ContextArg::Transcriptome => ContextType::Transcriptome,
            ContextArg::Sequence => ContextType::Sequence,
            ContextArg::Reads => ContextType::Reads,
        }
    }
}

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum)]
enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevelArg> for LogLevel {
    fn from(arg: LogLevelArg) -> Self {
        match arg {
            LogLevelArg::Error => LogLevel::Error,
            LogLevelArg::Warn => LogLevel::Warn,
            LogLevelArg::Info => LogLevel::Info,
            LogLevelArg::Debug => LogLevel::Debug,
            LogLevelArg::Trace => LogLevel::Trace,
        }
    }
}

fn main() {
    let code = match run() {
        Ok(()) => EXIT_SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            e.exit_code()
        }
    };
    std::process::exit(code);
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    let (context, args) = match cli.command {
        Commands::Genome(ref args) => (ContextType::Genome, args),
        Commands::Transcriptome(ref args) => (ContextType::Transcriptome, args),
        Commands::Sequence(ref args) => (ContextType::Sequence, args),
        Commands::Reads(ref args) => (ContextType::Reads, args),
        Commands::Fields { context } => {
            print_fields(context.into())?;
            return Ok(());
        }
        Commands::Completions { shell } => {
            use clap::CommandFactory;
            use clap_complete::generate;
            let mut cmd = Cli::command();
            generate(shell, &mut cmd, "webin", &mut std::io::stdout());
            return Ok(());
        }
    };

    let config = build_config(&cli)?;
    if let Err(e) = logging::init_logging(&config) {
        eprintln!("Warning: Failed to initialize logging: {}", e);
    }

    let lookup = HttpLookupClient::from_config(&config)?;
    let submission = Submission::new(context, &args.manifest, &config, &lookup)?;

    if args.validate {
        validate_only(&submission)
    } else {
        prepare(&submission)
    }
}

/// Config file, then command line overrides, then environment
fn build_config(cli: &Cli) -> Result<SubmitConfig> {
    let mut config = SubmitConfig::load(cli.config.as_deref())?;

    if let Some(ref dir) = cli.input_dir {
        config.input_dir = dir.clone();
    }
    if let Some(ref dir) = cli.output_dir {
        config.output_dir = dir.clone();
    }
    if cli.test {
        config.environment = Environment::Test;
    }
    if let Some(ref username) = cli.username {
        config.username = Some(username.clone());
    }
    if let Some(ref password) = cli.password {
        config.password = Some(SecretString::new(password.clone().into_boxed_str()));
    }
    if let Some(ref center) = cli.center_name {
        config.center_name = Some(center.clone());
    }
    config.ignore_errors |= cli.ignore_errors;
    config.allow_unknown_fields |= cli.allow_unknown_fields;
    if let Some(level) = cli.log_level {
        config.log_level = level.into();
    }
    if cli.log.is_some() {
        config.log_file = cli.log.clone();
    }
    config.verbose |= cli.verbose;
    config.apply_env();

    if !config.input_dir.is_dir() {
        return Err(WebinError::Usage(format!(
            "input directory {} does not exist",
            config.input_dir.display()
        )));
    }
    Ok(config)
}

fn print_fields(context: ContextType) -> Result<()> {
    let schema = context.schema()?;
    section_header(&format!("{} manifest fields", context));
    println!("{}", cli_style::field_table(&schema));
    section_header("Valid file groups");
    println!("{}", cli_style::group_table(&schema));
    Ok(())
}

fn validate_only(submission: &Submission<'_>) -> Result<()> {
    let validated = submission.validate()?;
    section_header("Validation");
    cli_style::print_messages(&validated.result.validation);
    println!(
        "{}",
        Theme::muted(report::summary(&validated.result.validation))
    );

    if !validated.is_valid() {
        return Err(validated.into_failure());
    }
    print_success(&format!(
        "The {} manifest {} is valid",
        submission.context(),
        submission.manifest_path().display()
    ));
    Ok(())
}

fn prepare(submission: &Submission<'_>) -> Result<()> {
    let prepared = match submission.prepare() {
        Ok(prepared) => prepared,
        Err(e) => {
            if let WebinError::ValidationFailed { messages, .. } = &e {
                section_header("Validation");
                cli_style::print_messages(messages);
                print_error(
                    "The manifest is not valid",
                    Some("Fix the errors listed above, or rerun with --ignore-errors to inspect the generated documents"),
                );
            }
            return Err(e);
        }
    };

    if let Some(validated) = prepared.validated.as_ref() {
        section_header("Validation");
        cli_style::print_messages(&validated.result.validation);
    }

    section_header("Submission bundle");
    println!("{}", cli_style::bundle_table(&prepared.bundle));

    match prepared.outcome {
        CacheOutcome::Hit => print_info("Manifest unchanged; the existing bundle was reused"),
        CacheOutcome::Rebuilt(_) => print_success("The submission bundle was prepared"),
        CacheOutcome::Provisional(_) => cli_style::print_warning(
            "The bundle was prepared despite validation errors and will not be reused",
        ),
    }
    Ok(())
}
