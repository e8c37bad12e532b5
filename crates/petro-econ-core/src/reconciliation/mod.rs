pub mod reconcile;

pub use reconcile::{
    calculate_reconciliation, FirstDivergence, ImportedRow, LineComparison, ReconciledLine,
    ReconciliationInput, ReconciliationOutput, ReconciliationRow, ReconciliationStats,
};
