//! Extract command - pull fields out of Coretax invoice PDFs.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::Args;
use console::style;
use glob::glob;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, warn};

use faktur_core::export::{rows_from_records, write_json, write_rows};
use faktur_core::{
    BatchResult, BatchRunner, FakturConfig, FilingDocument, LopdfTextReader, RecordAssembler,
    SourceDocument, TableFormat,
};

use super::load_config;
use crate::notify::{self, RestEventLog};

/// Arguments for the extract command.
#[derive(Args)]
pub struct ExtractArgs {
    /// Input files (.pdf or .txt) or glob patterns
    #[arg(required = true)]
    inputs: Vec<String>,

    /// Output file for the extracted table (stdout if not specified)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "csv")]
    format: OutputFormat,

    /// Also write the Coretax XML filing to this path
    #[arg(long)]
    xml: Option<PathBuf>,

    /// Number of parallel workers (overrides the config)
    #[arg(short = 'j', long)]
    jobs: Option<usize>,

    /// Do not send the processing event to the remote log
    #[arg(long)]
    no_log: bool,
}

/// Output format for extracted records.
#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// One row per line item, comma separated
    Csv,
    /// One row per line item, tab separated
    Tsv,
    /// One row per line item in an Excel workbook (requires --output)
    Xlsx,
    /// Full records as JSON
    Json,
}

pub async fn run(args: ExtractArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = load_config(config_path)?;

    let files = expand_inputs(&args.inputs)?;
    if files.is_empty() {
        anyhow::bail!("No .pdf or .txt files found for: {}", args.inputs.join(" "));
    }

    eprintln!("{} Found {} files to process", style("ℹ").blue(), files.len());

    let documents: Vec<SourceDocument> = files.iter().map(|p| load_document(p)).collect();
    let result = extract_documents(&documents, &config, args.jobs);

    let event_log = if args.no_log {
        None
    } else {
        RestEventLog::from_config(&config.event_log)
    };
    let event_id = notify::record_event(event_log.as_ref(), &result.event).await;

    // Each output is attempted even when an earlier one fails.
    let table = write_table(&result, args.format, args.output.as_deref());
    if let Err(ref e) = table {
        eprintln!("{} Table output failed: {:#}", style("✗").red(), e);
    }

    let xml = match args.xml {
        Some(ref xml_path) => write_xml(&result, &config, xml_path),
        None => Ok(()),
    };
    if let Err(ref e) = xml {
        eprintln!("{} XML output failed: {:#}", style("✗").red(), e);
    }

    print_summary(&result, start);

    if table.is_ok() && xml.is_ok() {
        notify::mark_downloaded(event_log.as_ref(), event_id.as_deref()).await;
    }
    table.and(xml)
}

/// Expand globs; plain paths are taken as given.
fn expand_inputs(inputs: &[String]) -> anyhow::Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for input in inputs {
        if input.contains(['*', '?', '[']) {
            files.extend(glob(input)?.filter_map(|r| r.ok()));
        } else {
            files.push(PathBuf::from(input));
        }
    }

    files.retain(|p| {
        let ext = p.extension().and_then(|e| e.to_str()).unwrap_or("");
        matches!(ext.to_lowercase().as_str(), "pdf" | "txt")
    });
    Ok(files)
}

fn load_document(path: &Path) -> SourceDocument {
    let filename = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("document")
        .to_string();
    let is_pdf = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("pdf"));

    let loaded = if is_pdf {
        fs::read(path).map(|data| SourceDocument::pdf(filename.clone(), data))
    } else {
        fs::read_to_string(path).map(|text| SourceDocument::text(filename.clone(), text))
    };

    loaded.unwrap_or_else(|e| {
        warn!("Failed to read {}: {}", path.display(), e);
        SourceDocument::unreadable(filename, e.to_string())
    })
}

fn extract_documents(
    documents: &[SourceDocument],
    config: &FakturConfig,
    jobs: Option<usize>,
) -> BatchResult {
    let runner = BatchRunner::new(RecordAssembler::from_config(&config.extraction))
        .with_pdf_reader(LopdfTextReader::from_config(&config.pdf));
    let jobs = jobs.unwrap_or(config.extraction.jobs);

    let pb = ProgressBar::new(documents.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=>-"),
    );

    let result = if jobs > 1 {
        let result = runner.run_parallel(documents, jobs);
        pb.set_position(documents.len() as u64);
        result
    } else {
        runner.run_with_progress(documents, |name| {
            debug!("Processed {}", name);
            pb.inc(1);
        })
    };

    pb.finish_and_clear();
    result
}

fn write_table(
    result: &BatchResult,
    format: OutputFormat,
    output: Option<&Path>,
) -> anyhow::Result<()> {
    let table_format = match format {
        OutputFormat::Csv => Some(TableFormat::Csv),
        OutputFormat::Tsv => Some(TableFormat::Tsv),
        OutputFormat::Xlsx => Some(TableFormat::Xlsx),
        OutputFormat::Json => None,
    };
    if output.is_none() && table_format.is_some_and(|f| f.is_binary()) {
        anyhow::bail!("XLSX output needs --output");
    }

    let writer: Box<dyn Write> = match output {
        Some(path) => Box::new(fs::File::create(path)?),
        None => Box::new(io::stdout().lock()),
    };

    match table_format {
        Some(table_format) => write_rows(&rows_from_records(&result.records), writer, table_format)?,
        None => write_json(&result.records, writer)?,
    }

    if let Some(path) = output {
        eprintln!("{} Output written to {}", style("✓").green(), path.display());
    }
    Ok(())
}

fn write_xml(result: &BatchResult, config: &FakturConfig, path: &Path) -> anyhow::Result<()> {
    let xml = FilingDocument::from_records(&result.records, &config.filing).to_xml()?;
    fs::write(path, xml)?;
    eprintln!("{} XML written to {}", style("✓").green(), path.display());
    Ok(())
}

fn print_summary(result: &BatchResult, start: Instant) {
    eprintln!(
        "{} Processed {} files in {:?}",
        style("✓").green(),
        result.records.len(),
        start.elapsed()
    );

    if !result.failures.is_empty() {
        eprintln!("{}", style("Unreadable files:").red());
        for failure in &result.failures {
            eprintln!("  - {}: {}", failure.filename, failure.reason);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_inputs_filters_extensions() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["a.pdf", "b.TXT", "c.xlsx"] {
            fs::write(dir.path().join(name), "x").unwrap();
        }
        let pattern = format!("{}/*", dir.path().display());

        let mut files = expand_inputs(&[pattern]).unwrap();
        files.sort();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap().to_string())
            .collect();
        assert_eq!(names, vec!["a.pdf", "b.TXT"]);
    }

    #[test]
    fn test_missing_file_becomes_unreadable_document() {
        let doc = load_document(Path::new("/nonexistent/faktur.txt"));
        assert_eq!(doc.filename, "faktur.txt");
        assert!(matches!(
            doc.content,
            faktur_core::batch::DocumentContent::Unreadable(_)
        ));
    }
}
