pub mod grid;
pub mod perturbation;
pub mod tornado;

pub use grid::{calculate_sensitivity_grid, GridInput, GridOutput, GridVariable};
pub use perturbation::{ParamType, SensitivityParameter, MAX_START_SHIFT_YEARS};
pub use tornado::{
    calculate_sensitivity, CaseMetrics, SensitivityInput, SensitivityOutput, SensitivityRow,
    SensitivitySwings,
};
