use std::process::ExitCode;

use camino::{Utf8Path, Utf8PathBuf};
use clap::{Args, Parser, Subcommand};
use miette::IntoDiagnostic;
use tracing_subscriber::EnvFilter;

use pride_ebeye::app::{self, ExportOptions, ExportResult};
use pride_ebeye::config::ConfigLoader;
use pride_ebeye::error::EbeyeError;
use pride_ebeye::output::JsonOutput;

#[derive(Parser)]
#[command(name = "pride-ebeye")]
#[command(about = "Generate EB-eye search XML from ProteomeXchange submission descriptors")]
#[command(version, author)]
struct Cli {
    /// Print results as JSON instead of a human summary.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(about = "Generate EB-eye XML for one dataset or a config batch")]
    Export(ExportArgs),
    #[command(about = "Project a PX descriptor and print the normalized record")]
    Inspect(InspectArgs),
}

#[derive(Args)]
struct ExportArgs {
    /// PX submission descriptor XML.
    #[arg(long)]
    px: Option<String>,

    /// Submission summary JSON (required with --px).
    #[arg(long)]
    submission: Option<String>,

    /// Protein cross-reference map JSON (identifier -> database name).
    #[arg(long)]
    proteins: Option<String>,

    /// Batch config file; defaults to pride-ebeye.json when --px is absent.
    #[arg(long)]
    config: Option<String>,

    /// Output directory; overrides the config's output_dir.
    #[arg(long)]
    out: Option<String>,

    #[arg(long)]
    dry_run: bool,
}

#[derive(Args)]
struct InspectArgs {
    #[arg(long)]
    px: String,
}

fn main() -> ExitCode {
    if let Err(report) = run() {
        eprintln!("{report:?}");
        if let Some(error) = report.downcast_ref::<EbeyeError>() {
            return ExitCode::from(map_exit_code(error));
        }
        return ExitCode::from(1);
    }
    ExitCode::SUCCESS
}

fn map_exit_code(error: &EbeyeError) -> u8 {
    match error {
        EbeyeError::MissingConfig
        | EbeyeError::ConfigRead(_)
        | EbeyeError::DescriptorRead(_)
        | EbeyeError::SubmissionRead(_)
        | EbeyeError::ProteinsRead(_) => 2,
        EbeyeError::ConfigParse(_)
        | EbeyeError::DescriptorParse(_)
        | EbeyeError::DescriptorShape(_)
        | EbeyeError::SubmissionParse(_)
        | EbeyeError::ProteinsParse(_)
        | EbeyeError::InvalidAccession(_) => 3,
        EbeyeError::ProjectNotPublic(_) => 4,
        _ => 1,
    }
}

fn run() -> miette::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Export(args) => run_export(args, cli.json),
        Commands::Inspect(args) => run_inspect(args, cli.json),
    }
}

fn run_export(args: ExportArgs, json: bool) -> miette::Result<()> {
    let options = ExportOptions {
        dry_run: args.dry_run,
    };

    let result = if let Some(px) = &args.px {
        let submission = args
            .submission
            .as_deref()
            .ok_or_else(|| miette::Report::msg("--submission is required with --px"))?;
        let out_dir = Utf8PathBuf::from(args.out.as_deref().unwrap_or("."));
        let item = app::export_entry(
            Utf8Path::new(px),
            Utf8Path::new(submission),
            args.proteins.as_deref().map(Utf8Path::new),
            &out_dir,
            &options,
        )
        .into_diagnostic()?;
        ExportResult { items: vec![item] }
    } else {
        let resolved = ConfigLoader::resolve(args.config.as_deref()).into_diagnostic()?;
        let out_override = args.out.map(Utf8PathBuf::from);
        app::export_all(&resolved, out_override.as_deref(), &options).into_diagnostic()?
    };

    if json {
        JsonOutput::print_export(&result).into_diagnostic()?;
    } else {
        print_export_summary(&result);
    }
    Ok(())
}

fn run_inspect(args: InspectArgs, json: bool) -> miette::Result<()> {
    let result = app::inspect(Utf8Path::new(&args.px)).into_diagnostic()?;
    if json {
        JsonOutput::print_inspect(&result).into_diagnostic()?;
    } else {
        let record = &result.record;
        println!("{} ({})", record.accession, record.repository_name);
        println!("  title: {}", record.title);
        println!("  link: {}", record.dataset_link);
        println!(
            "  species: {} / taxonomy ids: {}",
            record.species.len(),
            record.taxonomy_ids.len()
        );
        println!(
            "  keywords: {} submitter, {} curator",
            record.submitter_keywords.len(),
            record.curator_tags.len()
        );
        println!("  references: {}", record.references.len());
    }
    Ok(())
}

fn print_export_summary(result: &ExportResult) {
    let green = "\x1b[32m";
    let yellow = "\x1b[33m";
    let cyan = "\x1b[36m";
    let reset = "\x1b[0m";

    println!("{cyan}EB-eye export summary{reset}");
    for item in &result.items {
        let color = match item.action.as_str() {
            "written" => green,
            _ => yellow,
        };
        match &item.output_path {
            Some(path) => println!("{color}  {} {} -> {path}{reset}", item.accession, item.action),
            None => println!("{color}  {} {}{reset}", item.accession, item.action),
        }
    }
}
