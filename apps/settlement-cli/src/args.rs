//! Command-line arguments.

use std::path::PathBuf;

use crate::error::{CliError, CliResult};

pub const USAGE: &str = "\
Usage: settlement-cli --sales <sales.json> [options]

Options:
  --sales <file>           Sale records, a JSON array (required)
  --schedules <file>       Commission schedules, a JSON object keyed by
                           category name or subcategory id
  --config <file>          settlement.toml (default: platform config dir)
  --output <file>          Write the report here instead of stdout
  --include-settlements    Include every per-sale settlement in the report
  --sequential             Settle on one thread
  -h, --help               Show this help

Example:
  settlement-cli --sales sales.json --schedules tariffs.json --output report.json";

/// Parsed command line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CliArgs {
    pub sales: PathBuf,
    pub schedules: Option<PathBuf>,
    pub config: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub include_settlements: bool,
    pub sequential: bool,
    pub help: bool,
}

impl CliArgs {
    /// Parses arguments, excluding the program name.
    pub fn parse<I>(args: I) -> CliResult<Self>
    where
        I: IntoIterator<Item = String>,
    {
        let mut parsed = CliArgs::default();
        let mut sales = None;
        let mut args = args.into_iter();

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--sales" => sales = Some(Self::value(&arg, args.next())?),
                "--schedules" => parsed.schedules = Some(Self::value(&arg, args.next())?),
                "--config" => parsed.config = Some(Self::value(&arg, args.next())?),
                "--output" => parsed.output = Some(Self::value(&arg, args.next())?),
                "--include-settlements" => parsed.include_settlements = true,
                "--sequential" => parsed.sequential = true,
                "-h" | "--help" => {
                    parsed.help = true;
                    return Ok(parsed);
                }
                other => return Err(CliError::Usage(format!("Unknown argument: {}", other))),
            }
        }

        parsed.sales =
            sales.ok_or_else(|| CliError::Usage("--sales <file> is required".into()))?;
        Ok(parsed)
    }

    fn value(flag: &str, next: Option<String>) -> CliResult<PathBuf> {
        match next {
            Some(value) if !value.starts_with("--") => Ok(PathBuf::from(value)),
            _ => Err(CliError::Usage(format!("{} requires a file path", flag))),
        }
    }
}
