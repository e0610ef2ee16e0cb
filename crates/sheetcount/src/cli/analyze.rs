//! The `sheetcount analyze` command: run the analysis over files on disk.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use clap::{Args, ValueEnum};
use sheetcount_core::output::{FileReport, OutputFormat as CoreOutputFormat};
use sheetcount_core::{AnalysisReport, Config, ErrorReport, OutputWriter, SheetCounter};

/// Supported output formats.
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum OutputFormat {
    /// Single JSON object, or an array for several files
    Json,
    /// One JSON object per line (newline-delimited)
    Jsonl,
}

impl From<OutputFormat> for CoreOutputFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Json => CoreOutputFormat::Json,
            OutputFormat::Jsonl => CoreOutputFormat::JsonLines,
        }
    }
}

/// Arguments for the `analyze` command.
#[derive(Args, Debug)]
pub struct AnalyzeArgs {
    /// Image files to analyse
    #[arg(required = true)]
    pub images: Vec<PathBuf>,

    /// Output file (defaults to stdout)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    pub format: OutputFormat,

    /// Pretty-print JSON output
    #[arg(long)]
    pub pretty: bool,
}

/// Execute the analyze command.
///
/// Files are analysed one at a time. Every file gets a report; the command
/// fails afterwards if any of them did not succeed.
pub async fn execute(args: AnalyzeArgs, config: Config) -> anyhow::Result<()> {
    let counter = SheetCounter::new(config)?;
    if !counter.is_configured() {
        tracing::warn!("No API key configured; every analysis will report the missing key");
    }
    run(&args, &counter).await
}

async fn run(args: &AnalyzeArgs, counter: &SheetCounter) -> anyhow::Result<()> {
    let mut reports = Vec::with_capacity(args.images.len());
    for path in &args.images {
        let report = analyze_file(counter, path).await;
        if let AnalysisReport::Failure(ErrorReport { error }) = &report.report {
            tracing::error!(path = %path.display(), "{error}");
        }
        reports.push(report);
    }

    let sink: Box<dyn Write> = match &args.output {
        Some(path) => Box::new(BufWriter::new(File::create(path)?)),
        None => Box::new(BufWriter::new(std::io::stdout().lock())),
    };
    let mut writer = OutputWriter::new(sink, args.format.into(), args.pretty);
    writer.write_all(&reports)?;
    writer.flush()?;

    let failed = reports.iter().filter(|r| !r.report.is_success()).count();
    if failed > 0 {
        anyhow::bail!("{failed} of {} image(s) failed", reports.len());
    }
    Ok(())
}

async fn analyze_file(counter: &SheetCounter, path: &Path) -> FileReport {
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    let report: AnalysisReport = match tokio::fs::read(path).await {
        Ok(bytes) => counter
            .analyze(bytes, &file_name)
            .await
            .map(|analysis| analysis.result)
            .into(),
        Err(e) => AnalysisReport::Failure(ErrorReport::new(format!(
            "Error processing image {file_name}: {e}"
        ))),
    };

    FileReport { file_name, report }
}
