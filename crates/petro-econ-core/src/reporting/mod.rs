pub mod summary;

pub use summary::{
    build_report, calculate_report, to_mm, to_percent, AnnualReportRow, EconomicsReport, KpiLine,
    KpiUnit,
};
