use petro_econ_core::reconciliation::ImportedRow;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

/// Read a JSON or YAML file (chosen by extension) into a typed struct.
pub fn read_input<T: DeserializeOwned>(path: &str) -> Result<T, Box<dyn std::error::Error>> {
    let value = read_value(path)?;
    let typed: T = serde_json::from_value(value)
        .map_err(|e| format!("Invalid input in '{}': {}", path, e))?;
    Ok(typed)
}

/// Read a JSON or YAML file as a generic serde_json::Value.
pub fn read_value(path: &str) -> Result<Value, Box<dyn std::error::Error>> {
    let canonical = resolve_path(path)?;
    let contents = fs::read_to_string(&canonical)
        .map_err(|e| format!("Failed to read '{}': {}", canonical.display(), e))?;

    let value: Value = if is_yaml(&canonical) {
        serde_yaml::from_str(&contents)
            .map_err(|e| format!("Failed to parse '{}': {}", canonical.display(), e))?
    } else {
        serde_json::from_str(&contents)
            .map_err(|e| format!("Failed to parse '{}': {}", canonical.display(), e))?
    };
    Ok(value)
}

/// Read imported reconciliation rows from CSV (headers `year,revenue,opex,
/// net_cashflow`) or from a JSON/YAML array. Blank CSV cells stay blank.
pub fn read_imported_rows(path: &str) -> Result<Vec<ImportedRow>, Box<dyn std::error::Error>> {
    let canonical = resolve_path(path)?;
    let is_csv = canonical
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("csv"));
    if !is_csv {
        return read_input(path);
    }

    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(&canonical)
        .map_err(|e| format!("Failed to read '{}': {}", canonical.display(), e))?;

    let mut rows = Vec::new();
    for (line, record) in reader.deserialize::<CsvImportRow>().enumerate() {
        let record =
            record.map_err(|e| format!("Bad row {} in '{}': {}", line + 1, path, e))?;
        rows.push(ImportedRow {
            year: record.year,
            revenue: parse_cell(record.revenue.as_deref())?,
            opex: parse_cell(record.opex.as_deref())?,
            net_cashflow: parse_cell(record.net_cashflow.as_deref())?,
        });
    }
    Ok(rows)
}

#[derive(serde::Deserialize)]
struct CsvImportRow {
    year: i32,
    #[serde(default)]
    revenue: Option<String>,
    #[serde(default)]
    opex: Option<String>,
    #[serde(default, alias = "netCashflow")]
    net_cashflow: Option<String>,
}

fn parse_cell(
    cell: Option<&str>,
) -> Result<Option<rust_decimal::Decimal>, Box<dyn std::error::Error>> {
    match cell.map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => Ok(Some(
            s.replace(',', "")
                .parse::<rust_decimal::Decimal>()
                .map_err(|e| format!("Bad number '{}': {}", s, e))?,
        )),
    }
}

fn is_yaml(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("yaml") || e.eq_ignore_ascii_case("yml"))
}

/// Resolve and validate the path.
fn resolve_path(path: &str) -> Result<PathBuf, Box<dyn std::error::Error>> {
    let p = Path::new(path);
    let canonical = if p.is_absolute() {
        p.to_path_buf()
    } else {
        std::env::current_dir()?.join(p)
    };

    if !canonical.exists() {
        return Err(format!("File not found: {}", canonical.display()).into());
    }
    if !canonical.is_file() {
        return Err(format!("Not a file: {}", canonical.display()).into());
    }

    Ok(canonical)
}
