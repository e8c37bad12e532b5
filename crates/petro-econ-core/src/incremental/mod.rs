pub mod comparison;

pub use comparison::{
    calculate_incremental_metrics, compare_scenarios, AnnualDelta, BucketType, IncrementalInput,
    IncrementalOutput, KpiDeltas, WaterfallBucket,
};
