use crate::error::EngineError;

use super::engine::ScoredSpecies;

/// A single result-ordering criterion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    /// Descending by total contamination score.
    Score,
    /// Descending by qualifying-location count.
    LocationCount,
    /// Ascending by species name, case-insensitive.
    Alphabetic,
    /// Keep input order. Must be the only key if present.
    InputOrder,
}

impl SortKey {
    fn from_char(c: char) -> Option<Self> {
        match c.to_ascii_lowercase() {
            's' => Some(SortKey::Score),
            'l' => Some(SortKey::LocationCount),
            'a' => Some(SortKey::Alphabetic),
            'i' => Some(SortKey::InputOrder),
            _ => None,
        }
    }
}

/// An ordered list of sort keys, validated once at the boundary.
///
/// Parsed from a code string like `"SL"` or `"als"`; the leftmost letter
/// is the primary (outermost) key. The empty order keeps input order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SortOrder {
    keys: Vec<SortKey>,
}

impl SortOrder {
    /// Input order, the natural ordering when no code is given.
    pub fn input_order() -> Self {
        SortOrder::default()
    }

    /// Parse a sort-code string. Each character must be one of
    /// `S`/`L`/`A`/`I` (case-insensitive); `I` must stand alone.
    pub fn parse(code: &str) -> Result<Self, EngineError> {
        let mut keys = Vec::with_capacity(code.len());
        for c in code.chars() {
            let key = SortKey::from_char(c).ok_or_else(|| {
                EngineError::invalid(format!(
                    "sort code '{code}' contains unrecognized character '{c}'; \
                     must be a combination of S, L, A, or I"
                ))
            })?;
            keys.push(key);
        }

        if keys.contains(&SortKey::InputOrder) && keys.len() > 1 {
            return Err(EngineError::invalid(format!(
                "sort code '{code}': to keep input order, 'I' must be the only character"
            )));
        }

        Ok(SortOrder { keys })
    }

    pub fn keys(&self) -> &[SortKey] {
        &self.keys
    }

    /// Order a result set in place.
    ///
    /// Keys are applied in reverse of their code order, each with a stable
    /// sort, so the leftmost key dominates and ties under it fall back to
    /// the next key, then to input order.
    pub fn apply(&self, rows: &mut [ScoredSpecies]) {
        for key in self.keys.iter().rev() {
            match key {
                SortKey::Score => rows.sort_by(|a, b| b.score.total_cmp(&a.score)),
                SortKey::LocationCount => {
                    rows.sort_by(|a, b| b.num_locations.cmp(&a.num_locations))
                }
                SortKey::Alphabetic => rows.sort_by(|a, b| {
                    a.species.to_lowercase().cmp(&b.species.to_lowercase())
                }),
                SortKey::InputOrder => {}
            }
        }
    }
}
