//! ann2k-check — decode and conformance-check an FMR or ANSI/NIST
//! transaction file (spec §4.12).

use bytes_io::StreamSource;
use clap::{Parser, ValueEnum};
use fmr_core::FormatStd;
use nist_conformance::{Checker, Severity};
use nist_config::Registry;
use std::fs::File;
use std::io::BufReader;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "ann2k-check", version, about = "Decode and conformance-check an FMR or ANSI/NIST file")]
struct Cli {
    /// Input file
    #[arg(long = "in")]
    input: String,

    /// Which subsystem to run
    #[arg(long, value_enum)]
    mode: Mode,

    /// FMR dialect; required when --mode fmr
    #[arg(long, value_enum)]
    format: Option<Dialect>,

    /// Configuration layer file(s), applied in order (spec §6: up to ten, each overrides the previous)
    #[arg(long = "config")]
    config: Vec<String>,

    /// Standard tag to check against, e.g. "AN2K-2011"; required when --mode nist with --config
    #[arg(long)]
    standard: Option<String>,

    /// Accept only the MINEX-profile header fields for FMR validation
    #[arg(long, default_value_t = false)]
    minex: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum Mode {
    Fmr,
    Nist,
}

#[derive(Clone, Copy, ValueEnum)]
enum Dialect {
    Ansi,
    Ansi07,
    Iso,
    IsoNormalCard,
    IsoCompactCard,
}

impl From<Dialect> for FormatStd {
    fn from(d: Dialect) -> Self {
        match d {
            Dialect::Ansi => FormatStd::Ansi,
            Dialect::Ansi07 => FormatStd::Ansi07,
            Dialect::Iso => FormatStd::Iso,
            Dialect::IsoNormalCard => FormatStd::IsoNormalCard,
            Dialect::IsoCompactCard => FormatStd::IsoCompactCard,
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let cli = Cli::parse();

    let exit_code = match cli.mode {
        Mode::Fmr => run_fmr(&cli)?,
        Mode::Nist => run_nist(&cli)?,
    };
    std::process::exit(exit_code);
}

fn run_fmr(cli: &Cli) -> Result<i32, Box<dyn std::error::Error>> {
    let format_std: FormatStd = cli
        .format
        .ok_or("--format is required for --mode fmr")?
        .into();

    let mut src = StreamSource::new(BufReader::new(File::open(&cli.input)?));
    let fmr = fmr_core::Fmr::decode(&mut src, format_std)?;
    let report = fmr_validate::validate(&fmr, fmr_validate::Options { minex_profile: cli.minex });

    let mut error_count = 0;
    let mut warning_count = 0;
    for finding in &report.findings {
        println!("[{}] {}: {}", finding.severity, finding.rule, finding.message);
        match finding.severity {
            fmr_validate::Severity::Error => error_count += 1,
            fmr_validate::Severity::Warning => warning_count += 1,
        }
    }
    println!("{error_count} error(s), {warning_count} warning(s)");

    Ok(exit_bits(false, error_count > 0, warning_count > 0))
}

fn run_nist(cli: &Cli) -> Result<i32, Box<dyn std::error::Error>> {
    let standard = cli.standard.clone().unwrap_or_else(|| "AN2K-2011".to_string());

    let mut registry = Registry::new();
    let mut by_name: std::collections::HashMap<String, nist_config::Specification> = std::collections::HashMap::new();
    for path in &cli.config {
        let text = std::fs::read_to_string(path)?;
        for spec in nist_config::parse_specifications(&text)? {
            match by_name.get_mut(&spec.standard) {
                Some(existing) => existing.overlay(spec),
                None => {
                    by_name.insert(spec.standard.clone(), spec);
                }
            }
        }
    }
    for spec in by_name.into_values() {
        registry.insert(spec);
    }

    let mut src = StreamSource::new(BufReader::new(File::open(&cli.input)?));
    let file = nist_io::read_file(&mut src, "0300")?;

    let checker = Checker::new(Arc::new(registry), standard);
    let report = checker.check_file(&file)?;

    for finding in &report.findings {
        println!(
            "[{}/{}] record {:?} field {:?}: {}",
            finding.severity, finding.category, finding.record_type, finding.field_id, finding.message
        );
    }
    let fatal = report.count(Severity::Fatal) > 0;
    let error = report.count(Severity::Error) > 0;
    let warning = report.count(Severity::Warning) > 0;
    println!(
        "{} fatal, {} error, {} warning",
        report.count(Severity::Fatal),
        report.count(Severity::Error),
        report.count(Severity::Warning)
    );

    Ok(exit_bits(fatal, error, warning))
}

fn exit_bits(fatal: bool, error: bool, warning: bool) -> i32 {
    (fatal as i32) | ((error as i32) << 1) | ((warning as i32) << 2)
}
