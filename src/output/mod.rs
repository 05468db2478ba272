pub mod formatter;

pub use formatter::{
    format_result_table, format_reverse_table, format_score, format_species_detail,
    format_summary, format_tsv, should_use_colors,
};
