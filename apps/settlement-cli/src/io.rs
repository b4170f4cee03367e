//! Reading sales and schedules, writing the report.

use std::collections::HashMap;
use std::io::Write;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::info;

use settlement_core::validation::validate_schedule;
use settlement_core::{CategoryCommissionSchedule, CommissionSchedules, SaleRecord};

use crate::error::{CliError, CliResult};

fn read_json<T: DeserializeOwned>(path: &Path) -> CliResult<T> {
    let contents = std::fs::read_to_string(path).map_err(|source| CliError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&contents).map_err(|source| CliError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Loads sale records from a JSON array.
pub fn load_sales(path: &Path) -> CliResult<Vec<SaleRecord>> {
    let sales: Vec<SaleRecord> = read_json(path)?;
    info!(?path, count = sales.len(), "Loaded sales");
    Ok(sales)
}

/// Builds the schedule lookup from a parsed map, validating every entry.
pub fn build_schedules(
    by_key: HashMap<String, CategoryCommissionSchedule>,
    default: CategoryCommissionSchedule,
) -> CliResult<CommissionSchedules> {
    for (key, schedule) in &by_key {
        validate_schedule(schedule).map_err(|source| CliError::InvalidSchedule {
            key: key.clone(),
            source,
        })?;
    }

    Ok(CommissionSchedules::new(by_key).with_default(default))
}

/// Loads commission schedules, or only the default when no file is given.
pub fn load_schedules(
    path: Option<&Path>,
    default: CategoryCommissionSchedule,
) -> CliResult<CommissionSchedules> {
    let by_key = match path {
        Some(path) => {
            let map: HashMap<String, CategoryCommissionSchedule> = read_json(path)?;
            info!(?path, count = map.len(), "Loaded commission schedules");
            map
        }
        None => HashMap::new(),
    };

    build_schedules(by_key, default)
}

/// Writes pretty JSON to a file, or to stdout when no path is given.
pub fn write_json<T: Serialize>(value: &T, path: Option<&Path>) -> CliResult<()> {
    let json = serde_json::to_string_pretty(value)?;

    match path {
        Some(path) => {
            std::fs::write(path, json)?;
            info!(?path, "Report written");
        }
        None => {
            let stdout = std::io::stdout();
            let mut handle = stdout.lock();
            writeln!(handle, "{}", json)?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_schedules_rejects_bad_rates() {
        let mut map = HashMap::new();
        map.insert("Shoes".to_string(), CategoryCommissionSchedule::uniform(150.0));

        let err = build_schedules(map, CategoryCommissionSchedule::default()).unwrap_err();
        match err {
            CliError::InvalidSchedule { key, .. } => assert_eq!(key, "Shoes"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_build_schedules_uses_configured_default() {
        let schedules =
            build_schedules(HashMap::new(), CategoryCommissionSchedule::uniform(18.0)).unwrap();
        let sale = SaleRecord::new("1", "Anything", 100.0);
        assert_eq!(schedules.for_sale(&sale).fbs, 18.0);
    }

    #[test]
    fn test_schedule_file_format() {
        let map: HashMap<String, CategoryCommissionSchedule> = serde_json::from_str(
            r#"{
                "Dresses": { "fbw": 15, "fbs": 17, "dbs": 17, "clickAndCollect": 17, "express": 19 },
                "5067": { "paidStorageKgvp": 12, "kgvpMarketplace": 14, "kgvpSupplier": 14,
                          "kgvpPickup": 14, "kgvpSupplierExpress": 16 }
            }"#,
        )
        .unwrap();

        assert_eq!(map["Dresses"].express, 19.0);
        assert_eq!(map["5067"].fbw, 12.0);
        assert!(build_schedules(map, CategoryCommissionSchedule::default()).is_ok());
    }

    #[test]
    fn test_missing_sales_file() {
        let err = load_sales(Path::new("/nonexistent/sales.json")).unwrap_err();
        assert!(matches!(err, CliError::Read { .. }));
    }
}
