use std::collections::BTreeMap;

use log::warn;

use super::config::WeightConfig;
use super::sort::SortOrder;
use crate::error::EngineError;
use crate::table::{CuratedTable, SurveyTable};

/// Score sentinel for species absent from the curated reference.
/// Not a real score; callers must branch on `in_curated` before using it.
pub const UNSCORED: f64 = -1.0;

/// One qualifying detection: a location whose read count exceeded the
/// reads threshold.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocationHit {
    pub location: String,
    pub reads: u64,
}

/// One scored input row.
#[derive(Debug, Clone)]
pub struct ScoredSpecies {
    pub species: String,
    pub in_curated: bool,
    /// Weighted contamination score, or [`UNSCORED`] when `!in_curated`.
    pub score: f64,
    pub num_locations: usize,
    /// Qualifying locations in column order. Strictly greater than the
    /// reads threshold.
    pub locations: Vec<LocationHit>,
    /// Properties whose contribution to the score was > 0, in weight-set
    /// order.
    pub contributing: Vec<String>,
}

/// The result of one scoring run.
#[derive(Debug, Clone)]
pub struct ScoreReport {
    /// Rows in the input table.
    pub total_rows: usize,
    /// Rows whose species name matched the curated reference exactly.
    pub matched_rows: usize,
    /// Rows that passed both the location and the score filter.
    pub above_threshold: usize,
    /// The filtered result set, in the requested order.
    pub species: Vec<ScoredSpecies>,
    /// Species names absent from the curated reference, in input order.
    pub unmatched: Vec<String>,
    /// Weighted properties that do not exist in the curated columns and
    /// were therefore dropped from scoring for all species.
    pub dropped_properties: Vec<String>,
}

/// Score every row of `table` against the curated reference and filter.
///
/// A row is reported only if (i) at least one location's read count
/// strictly exceeds `reads_threshold` and (ii) its weighted score is at
/// least `score_threshold`. Species missing from the curated reference
/// score the [`UNSCORED`] sentinel, so they fall out of the result set
/// for any `score_threshold > -1`.
///
/// Weighted properties that the curated table does not carry are dropped
/// from scoring entirely (for all species, so the remaining contributions
/// never shift) and reported via [`ScoreReport::dropped_properties`] plus
/// a single warning. If no weighted property matches any curated column,
/// the run aborts with [`EngineError::ConfigurationMismatch`].
pub fn score(
    table: &SurveyTable,
    curated: &CuratedTable,
    weights: &WeightConfig,
    score_threshold: f64,
    reads_threshold: u64,
    order: &SortOrder,
) -> Result<ScoreReport, EngineError> {
    // Resolve weight names to curated column indices once, up front.
    // Scoring must never multiply a misaligned weight vector.
    let mut resolved: Vec<(&str, usize, f64)> = Vec::with_capacity(weights.len());
    let mut dropped: Vec<String> = Vec::new();
    for (property, weight) in weights.iter() {
        match curated.property_index(property) {
            Some(idx) => resolved.push((property, idx, weight)),
            None => dropped.push(property.to_string()),
        }
    }
    if !dropped.is_empty() {
        warn!(
            "weighted properties not present in curated columns, dropped from scoring: {}",
            dropped.join(", ")
        );
    }
    if resolved.is_empty() && !weights.is_empty() {
        return Err(EngineError::ConfigurationMismatch(format!(
            "none of the {} weighted properties exist in the curated table",
            weights.len()
        )));
    }

    let mut matched_rows = 0usize;
    let mut unmatched: Vec<String> = Vec::new();
    let mut species: Vec<ScoredSpecies> = Vec::new();

    for row in &table.rows {
        let entry = curated.get(&row.species);
        match entry {
            Some(_) => matched_rows += 1,
            None => unmatched.push(row.species.clone()),
        }

        let locations: Vec<LocationHit> = table
            .locations
            .iter()
            .zip(&row.counts)
            .filter(|(_, &count)| count > reads_threshold)
            .map(|(location, &count)| LocationHit {
                location: location.clone(),
                reads: count,
            })
            .collect();

        // A species with zero qualifying detections cannot be a candidate,
        // whatever its score.
        if locations.is_empty() {
            continue;
        }

        let (score, contributing) = match entry {
            None => (UNSCORED, Vec::new()),
            Some(values) => {
                let mut total = 0.0;
                let mut contributing = Vec::new();
                for &(property, idx, weight) in &resolved {
                    // None means "not applicable", which is not a zero.
                    if let Some(value) = values.get(idx).copied().flatten() {
                        let contribution = value * weight;
                        total += contribution;
                        if contribution > 0.0 {
                            contributing.push(property.to_string());
                        }
                    }
                }
                (total, contributing)
            }
        };

        if score < score_threshold {
            continue;
        }

        species.push(ScoredSpecies {
            species: row.species.clone(),
            in_curated: entry.is_some(),
            score,
            num_locations: locations.len(),
            locations,
            contributing,
        });
    }

    order.apply(&mut species);

    Ok(ScoreReport {
        total_rows: table.len(),
        matched_rows,
        above_threshold: species.len(),
        species,
        unmatched,
        dropped_properties: dropped,
    })
}

/// Build the property → qualifying-species reverse table for "which
/// properties drove this match" reporting.
pub fn reverse_index(species: &[ScoredSpecies]) -> BTreeMap<String, Vec<String>> {
    let mut index: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for row in species {
        for property in &row.contributing {
            index
                .entry(property.clone())
                .or_default()
                .push(row.species.clone());
        }
    }
    index
}
