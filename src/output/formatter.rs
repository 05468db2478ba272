use std::collections::BTreeMap;
use std::io::IsTerminal;

use owo_colors::OwoColorize;
use terminal_size::{terminal_size, Width};

use crate::scoring::{ScoreReport, ScoredSpecies, UNSCORED};

/// Check if stdout is a TTY (for auto-detecting color support)
pub fn should_use_colors() -> bool {
    std::io::stdout().is_terminal()
}

/// Format a contamination score. The uncurated sentinel renders as "-",
/// integral scores without decimals, everything else with two.
pub fn format_score(score: f64) -> String {
    if score == UNSCORED {
        "-".to_string()
    } else if score.fract() == 0.0 {
        format!("{:.0}", score)
    } else {
        format!("{:.2}", score)
    }
}

/// Render the qualifying locations as "name:reads" pairs.
fn format_locations(row: &ScoredSpecies) -> String {
    row.locations
        .iter()
        .map(|hit| format!("{}:{}", hit.location, hit.reads))
        .collect::<Vec<_>>()
        .join("; ")
}

/// Format the run statistics block shown above the result table.
pub fn format_summary(report: &ScoreReport, score_threshold: f64, reads_threshold: u64) -> String {
    format!(
        "Threshold: score {}, reads {}\nRows: {}  Matched: {}  Above threshold: {}",
        score_threshold,
        reads_threshold,
        report.total_rows,
        report.matched_rows,
        report.above_threshold
    )
}

/// Get terminal width, defaulting to None for pipes (unlimited)
fn get_terminal_width() -> Option<usize> {
    terminal_size().map(|(Width(w), _)| w as usize)
}

/// Truncate a cell to fit available width, accounting for Unicode
fn truncate_cell(text: &str, max_width: usize) -> String {
    let chars: Vec<char> = text.chars().collect();
    if chars.len() <= max_width {
        text.to_string()
    } else if max_width > 3 {
        format!("{}...", chars[..max_width - 3].iter().collect::<String>())
    } else {
        chars[..max_width].iter().collect()
    }
}

/// Format the filtered result set as a table with columns:
/// Index, Score, Species, location count, locations.
/// Index column: 3 chars (fits "99."), right-aligned.
/// Score column is right-aligned, 6 chars wide.
pub fn format_result_table(rows: &[ScoredSpecies], use_colors: bool) -> String {
    if rows.is_empty() {
        return "No species meet the specified thresholds.".to_string();
    }

    let term_width = get_terminal_width();

    let index_width = 3;
    let score_width = 6;
    let separator = "  ";

    let species_width = rows
        .iter()
        .map(|r| r.species.chars().count())
        .max()
        .unwrap_or(0);

    rows.iter()
        .enumerate()
        .map(|(idx, row)| {
            let index_str = format!("{:>2}.", idx + 1);
            let score_padded = format!("{:>width$}", format_score(row.score), width = score_width);
            let species_padded =
                format!("{:<width$}", row.species, width = species_width);
            let count_str = format!("{:>3} loc", row.num_locations);

            let locations = format_locations(row);
            let fixed_width = index_width + 1
                + score_width
                + species_width
                + count_str.len()
                + separator.len() * 3;
            let locations = match term_width {
                Some(width) if width > fixed_width + 10 => {
                    truncate_cell(&locations, width - fixed_width)
                }
                Some(_) => truncate_cell(&locations, 20),
                // No terminal (pipe), don't truncate.
                None => locations,
            };

            if use_colors {
                format!(
                    "{} {}{}{}{}{}{}{}",
                    index_str.dimmed(),
                    score_padded.bold(),
                    separator,
                    species_padded.cyan(),
                    separator,
                    count_str,
                    separator,
                    locations.dimmed()
                )
            } else {
                format!(
                    "{} {}{}{}{}{}{}{}",
                    index_str, score_padded, separator, species_padded, separator, count_str,
                    separator, locations
                )
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Format a single species with detailed multi-line output (for -vv mode)
pub fn format_species_detail(row: &ScoredSpecies, use_colors: bool) -> String {
    let contributing = if row.contributing.is_empty() {
        "(none)".to_string()
    } else {
        row.contributing.join(", ")
    };
    let curated = if row.in_curated { "yes" } else { "no" };

    if use_colors {
        format!(
            "{}\n  Score: {}\n  Curated: {}\n  Locations ({}): {}\n  Contributing properties: {}",
            row.species.bold(),
            format_score(row.score).bold(),
            curated,
            row.num_locations,
            format_locations(row),
            contributing.cyan()
        )
    } else {
        format!(
            "{}\n  Score: {}\n  Curated: {}\n  Locations ({}): {}\n  Contributing properties: {}",
            row.species,
            format_score(row.score),
            curated,
            row.num_locations,
            format_locations(row),
            contributing
        )
    }
}

/// Format the property → species reverse table.
pub fn format_reverse_table(index: &BTreeMap<String, Vec<String>>, use_colors: bool) -> String {
    if index.is_empty() {
        return "No contributing properties.".to_string();
    }

    index
        .iter()
        .map(|(property, species)| {
            if use_colors {
                format!("{}: {}", property.bold(), species.join(", "))
            } else {
                format!("{}: {}", property, species.join(", "))
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Format the result set as tab-separated values for files and scripting.
/// Columns: species, score, location count, locations (no headers, no colors)
pub fn format_tsv(rows: &[ScoredSpecies]) -> String {
    rows.iter()
        .map(|row| {
            format!(
                "{}\t{}\t{}\t{}",
                row.species,
                format_score(row.score),
                row.num_locations,
                format_locations(row)
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::LocationHit;

    fn sample_row() -> ScoredSpecies {
        ScoredSpecies {
            species: "Ralstonia pickettii".to_string(),
            in_curated: true,
            score: 4.0,
            num_locations: 2,
            locations: vec![
                LocationHit { location: "ERR164407".to_string(), reads: 2500 },
                LocationHit { location: "ERR164408".to_string(), reads: 3000 },
            ],
            contributing: vec!["Water".to_string(), "Reagent".to_string()],
        }
    }

    #[test]
    fn test_format_score_integral() {
        assert_eq!(format_score(4.0), "4");
        assert_eq!(format_score(0.0), "0");
    }

    #[test]
    fn test_format_score_fractional() {
        assert_eq!(format_score(2.5), "2.50");
    }

    #[test]
    fn test_format_score_sentinel() {
        assert_eq!(format_score(UNSCORED), "-");
    }

    #[test]
    fn test_format_result_table_empty() {
        let rows: Vec<ScoredSpecies> = vec![];
        assert_eq!(
            format_result_table(&rows, false),
            "No species meet the specified thresholds."
        );
    }

    #[test]
    fn test_format_result_table_single() {
        let rows = vec![sample_row()];
        let result = format_result_table(&rows, false);
        assert!(result.contains(" 1."));
        assert!(result.contains("Ralstonia pickettii"));
        assert!(result.contains("2 loc"));
        assert!(result.contains("ERR164407:2500"));
    }

    #[test]
    fn test_format_result_table_indices_sequential() {
        let mut second = sample_row();
        second.species = "Delftia acidovorans".to_string();
        let rows = vec![sample_row(), second];

        let result = format_result_table(&rows, false);
        let lines: Vec<&str> = result.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains(" 1."));
        assert!(lines[1].contains(" 2."));
    }

    #[test]
    fn test_format_species_detail() {
        let result = format_species_detail(&sample_row(), false);
        assert!(result.contains("Ralstonia pickettii"));
        assert!(result.contains("Score: 4"));
        assert!(result.contains("Curated: yes"));
        assert!(result.contains("Locations (2)"));
        assert!(result.contains("Water, Reagent"));
    }

    #[test]
    fn test_format_species_detail_no_contributions() {
        let mut row = sample_row();
        row.contributing.clear();
        row.in_curated = false;
        row.score = UNSCORED;

        let result = format_species_detail(&row, false);
        assert!(result.contains("Score: -"));
        assert!(result.contains("Curated: no"));
        assert!(result.contains("(none)"));
    }

    #[test]
    fn test_format_summary() {
        let report = ScoreReport {
            total_rows: 20,
            matched_rows: 12,
            above_threshold: 3,
            species: vec![],
            unmatched: vec![],
            dropped_properties: vec![],
        };
        let result = format_summary(&report, 1.0, 1000);
        assert!(result.contains("score 1, reads 1000"));
        assert!(result.contains("Rows: 20"));
        assert!(result.contains("Matched: 12"));
        assert!(result.contains("Above threshold: 3"));
    }

    #[test]
    fn test_format_reverse_table() {
        let mut index = BTreeMap::new();
        index.insert(
            "Water".to_string(),
            vec!["Ralstonia pickettii".to_string(), "Delftia acidovorans".to_string()],
        );
        let result = format_reverse_table(&index, false);
        assert_eq!(result, "Water: Ralstonia pickettii, Delftia acidovorans");
    }

    #[test]
    fn test_format_tsv() {
        let rows = vec![sample_row()];
        let result = format_tsv(&rows);
        assert_eq!(
            result,
            "Ralstonia pickettii\t4\t2\tERR164407:2500; ERR164408:3000"
        );
    }

    #[test]
    fn test_format_tsv_empty() {
        let rows: Vec<ScoredSpecies> = vec![];
        assert_eq!(format_tsv(&rows), "");
    }

    #[test]
    fn test_truncate_cell_long() {
        assert_eq!(truncate_cell("ERR164407:2500; ERR164408:3000", 15), "ERR164407:25...");
    }

    #[test]
    fn test_truncate_cell_short() {
        assert_eq!(truncate_cell("S1:42", 20), "S1:42");
    }
}
