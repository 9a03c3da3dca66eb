use std::path::{Path, PathBuf};

use clap::Parser;
use pdf_sanitizer::config::CliConfig;
use pdf_sanitizer::{sanitize, SanitizeOptions, SanitizeReport};
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(author, version, about = "Neutralize active content in PDF documents", long_about = None)]
struct Args {
    /// Input PDF file paths
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Output directory (or output file path when a single input is given)
    #[arg(long, short)]
    output: Option<PathBuf>,

    /// Write the sanitized file back over the input path
    #[arg(long, conflicts_with = "output")]
    in_place: bool,

    /// Keep external-link annotations, URI/Launch/GoToR/GoToE/SubmitForm/ImportData actions, and embedded URLs
    #[arg(long)]
    keep_links: bool,

    /// Keep AcroForm/XFA forms and widget annotations
    #[arg(long)]
    keep_forms: bool,

    /// Keep document/action JavaScript
    #[arg(long)]
    keep_javascript: bool,

    /// Path to a pdf_sanitizer.toml config file
    #[arg(long, default_value = "pdf_sanitizer.toml")]
    config: PathBuf,
}

impl Args {
    /// Starts from the config file's defaults, then lets each `--keep-*`
    /// flag force that option off — flags always win over the config file.
    fn options(&self, config_defaults: SanitizeOptions) -> SanitizeOptions {
        SanitizeOptions {
            remove_links: config_defaults.remove_links && !self.keep_links,
            remove_forms: config_defaults.remove_forms && !self.keep_forms,
            remove_javascript: config_defaults.remove_javascript && !self.keep_javascript,
        }
    }
}

#[tokio::main]
async fn main() {
    let args = Args::parse();
    let config = CliConfig::load(&args.config).unwrap_or_default();

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| config.log_filter.clone().into()))
        .init();

    info!(count = args.inputs.len(), "starting PDF sanitization run");

    let options = args.options(config.default_options);
    let output = args.output.clone();
    let in_place = args.in_place;
    let output_dir = config.output_dir.clone();

    let mut tasks = Vec::new();
    for input in args.inputs.clone() {
        let output = output.clone();
        let output_dir = output_dir.clone();
        tasks.push(tokio::spawn(async move {
            process_one(&input, output.as_deref(), in_place, &output_dir, &options).await
        }));
    }

    let mut failures = 0usize;
    for task in tasks {
        match task.await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                error!(error = %e, "failed to process file");
                failures += 1;
            }
            Err(join_err) => {
                error!(error = %join_err, "task panicked");
                failures += 1;
            }
        }
    }

    if failures > 0 {
        std::process::exit(1);
    }
}

async fn process_one(
    input: &Path,
    output: Option<&Path>,
    in_place: bool,
    output_dir: &Path,
    options: &SanitizeOptions,
) -> std::io::Result<()> {
    let bytes = tokio::fs::read(input).await?;
    let (sanitized, report) = sanitize(&bytes, options);

    let destination = resolve_destination(input, output, in_place, output_dir);
    if let Some(parent) = destination.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(&destination, &sanitized).await?;

    print_report(input, &destination, &report);
    Ok(())
}

fn resolve_destination(input: &Path, output: Option<&Path>, in_place: bool, output_dir: &Path) -> PathBuf {
    if in_place {
        return input.to_path_buf();
    }
    if let Some(output) = output {
        return output.to_path_buf();
    }
    let file_name = input.file_name().unwrap_or_default();
    output_dir.join(file_name)
}

fn print_report(input: &Path, destination: &Path, report: &SanitizeReport) {
    println!("{} -> {}", input.display(), destination.display());
    if report.items.is_empty() {
        println!("  (no active content found)");
    } else {
        for item in &report.items {
            println!("  {item}");
        }
    }
    if let Some(warning) = &report.warning {
        println!("  warning: {warning}");
    }
}
