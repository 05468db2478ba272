use std::path::Path;

use serde::Deserialize;

use super::model::{clean_species_name, CuratedTable, SpeciesRow, SurveyTable};
use crate::error::EngineError;

/// Load a survey table from a file. Dispatch by extension.
///
/// Supported formats:
/// * `.csv`                – comma-separated, first column species
/// * `.tsv` / `.tab` / `.txt` – tab-separated, same shape
/// * `.json`               – structured document:
///   `{"locations": [...], "rows": [{"species": "...", "counts": [...]}]}`
///
/// With `has_header` set, the first row names the columns; the species
/// column header itself (conventionally `Species` or `#Datasets`) is
/// ignored. Without it, location names are synthesized as `loc{N}` where
/// `N` is the 1-based absolute column position (the species column is
/// column 1, so the first location is `loc2`).
///
/// Read counts must be non-negative integers; any other value in a
/// location column is a fatal [`EngineError::MalformedInput`].
pub fn load_survey(path: &Path, has_header: bool) -> Result<SurveyTable, EngineError> {
    if !path.exists() {
        return Err(EngineError::NotFound { path: path.to_path_buf() });
    }

    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match ext.as_str() {
        "csv" => load_survey_delimited(path, b',', has_header),
        "tsv" | "tab" | "txt" => load_survey_delimited(path, b'\t', has_header),
        "json" => load_survey_json(path),
        other => Err(EngineError::invalid(format!(
            "unsupported survey file extension: .{other}"
        ))),
    }
}

fn load_survey_delimited(
    path: &Path,
    delimiter: u8,
    has_header: bool,
) -> Result<SurveyTable, EngineError> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(has_header)
        .from_path(path)
        .map_err(|e| EngineError::malformed(format!("{}: {e}", path.display())))?;

    let mut locations: Vec<String> = if has_header {
        let headers = reader
            .headers()
            .map_err(|e| EngineError::malformed(format!("{}: header row: {e}", path.display())))?;
        headers.iter().skip(1).map(str::to_string).collect()
    } else {
        Vec::new()
    };

    let mut rows = Vec::new();
    for (i, result) in reader.records().enumerate() {
        let record =
            result.map_err(|e| EngineError::malformed(format!("{}: row {}: {e}", path.display(), i + 1)))?;

        if record.is_empty() {
            continue;
        }
        if !has_header && locations.is_empty() {
            // First data row fixes the column count.
            locations = (2..=record.len()).map(|n| format!("loc{n}")).collect();
        }

        let species = clean_species_name(record.get(0).unwrap_or(""));
        if species.is_empty() {
            return Err(EngineError::malformed(format!(
                "{}: row {}: empty species name",
                path.display(),
                i + 1
            )));
        }

        let mut counts = Vec::with_capacity(locations.len());
        for (j, cell) in record.iter().skip(1).enumerate() {
            let count = cell.trim().parse::<u64>().map_err(|_| {
                EngineError::malformed(format!(
                    "{}: row {}, column '{}': '{}' is not a non-negative integer read count",
                    path.display(),
                    i + 1,
                    locations.get(j).map(String::as_str).unwrap_or("?"),
                    cell
                ))
            })?;
            counts.push(count);
        }

        rows.push(SpeciesRow { species, counts });
    }

    Ok(SurveyTable { locations, rows })
}

/// Structured record form of the survey table, for callers that already
/// normalized their data upstream.
#[derive(Debug, Deserialize)]
struct SurveyDoc {
    locations: Vec<String>,
    rows: Vec<SurveyDocRow>,
}

#[derive(Debug, Deserialize)]
struct SurveyDocRow {
    species: String,
    counts: Vec<u64>,
}

fn load_survey_json(path: &Path) -> Result<SurveyTable, EngineError> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| EngineError::malformed(format!("{}: {e}", path.display())))?;
    let doc: SurveyDoc = serde_json::from_str(&text)
        .map_err(|e| EngineError::malformed(format!("{}: {e}", path.display())))?;

    let mut rows = Vec::with_capacity(doc.rows.len());
    for (i, row) in doc.rows.into_iter().enumerate() {
        if row.counts.len() != doc.locations.len() {
            return Err(EngineError::malformed(format!(
                "{}: row {}: {} counts for {} locations",
                path.display(),
                i + 1,
                row.counts.len(),
                doc.locations.len()
            )));
        }
        rows.push(SpeciesRow {
            species: clean_species_name(&row.species),
            counts: row.counts,
        });
    }

    Ok(SurveyTable { locations: doc.locations, rows })
}

/// Load the curated reference from a CSV file.
///
/// First column: species name. Remaining columns: named numeric
/// properties. Empty cells and `NA`/`NaN`/`null` (any case) mean "not
/// applicable" and load as `None`; anything else that fails to parse as a
/// number is a fatal error.
pub fn load_curated(path: &Path) -> Result<CuratedTable, EngineError> {
    if !path.exists() {
        return Err(EngineError::NotFound { path: path.to_path_buf() });
    }

    let mut reader = csv::Reader::from_path(path)
        .map_err(|e| EngineError::malformed(format!("{}: {e}", path.display())))?;

    let properties: Vec<String> = reader
        .headers()
        .map_err(|e| EngineError::malformed(format!("{}: header row: {e}", path.display())))?
        .iter()
        .skip(1)
        .map(str::to_string)
        .collect();

    let mut curated = CuratedTable::new(properties);

    for (i, result) in reader.records().enumerate() {
        let record =
            result.map_err(|e| EngineError::malformed(format!("{}: row {}: {e}", path.display(), i + 1)))?;
        if record.is_empty() {
            continue;
        }

        let species = clean_species_name(record.get(0).unwrap_or(""));
        let mut values = Vec::with_capacity(record.len().saturating_sub(1));
        for (j, cell) in record.iter().skip(1).enumerate() {
            values.push(parse_curated_cell(cell).ok_or_else(|| {
                EngineError::malformed(format!(
                    "{}: row {}, property column {}: '{}' is not numeric",
                    path.display(),
                    i + 1,
                    j + 1,
                    cell
                ))
            })?);
        }
        curated.insert(species, values);
    }

    Ok(curated)
}

/// `Some(None)` = explicit not-applicable, `Some(Some(v))` = numeric value,
/// `None` = unparseable.
fn parse_curated_cell(cell: &str) -> Option<Option<f64>> {
    let cell = cell.trim();
    if cell.is_empty() || cell.eq_ignore_ascii_case("na") || cell.eq_ignore_ascii_case("nan")
        || cell.eq_ignore_ascii_case("null")
    {
        return Some(None);
    }
    cell.parse::<f64>().ok().map(Some)
}
