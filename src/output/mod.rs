pub mod formatter;

pub use formatter::{
    format_estimate, format_json, format_percent, format_salary, format_tables, format_tsv,
    should_use_colors,
};
