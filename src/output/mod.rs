pub mod formatter;

pub use formatter::{
    format_method_line, format_methods, format_number, format_run_report, should_use_colors,
    RunReport,
};
