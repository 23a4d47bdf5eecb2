//! Convert command - turn a Faktur/DetailFaktur spreadsheet into Coretax XML.

use std::fs;
use std::path::PathBuf;

use clap::Args;
use console::style;

use faktur_core::export::{read_csv_pair, read_workbook};
use faktur_core::Conversion;

use super::load_config;

/// Arguments for the convert command.
#[derive(Args)]
pub struct ConvertArgs {
    /// Input workbook (.xlsx), or the Faktur sheet as CSV when --detail is given
    input: PathBuf,

    /// DetailFaktur sheet as CSV
    #[arg(long)]
    detail: Option<PathBuf>,

    /// Output XML file (stdout if not specified)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Seller NPWP to use when the sheet does not carry one
    #[arg(long)]
    seller_tin: Option<String>,
}

pub async fn run(args: ConvertArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let mut config = load_config(config_path)?;
    if let Some(tin) = args.seller_tin {
        config.filing.seller_tin = Some(tin);
    }

    let conversion: Conversion = match args.detail {
        Some(ref detail) => read_csv_pair(
            fs::File::open(&args.input)?,
            fs::File::open(detail)?,
            &config.filing,
        )?,
        None => read_workbook(&fs::read(&args.input)?, &config.filing)?,
    };

    for warning in &conversion.warnings {
        eprintln!("{} {}", style("⚠").yellow(), warning);
    }

    let xml = conversion.document.to_xml()?;

    match args.output {
        Some(ref path) => {
            fs::write(path, xml)?;
            eprintln!(
                "{} Converted {} invoices to {}",
                style("✓").green(),
                conversion.document.invoices.len(),
                path.display()
            );
        }
        None => println!("{}", xml),
    }

    Ok(())
}
