//! Regression solvers and the model trainer.

mod normal_equations;
mod trainer;
mod traits;

pub use normal_equations::{FittedNormalEquations, NormalEquationsRegressor};
pub use trainer::{degradation_for, evaluate, Evaluation, RegressionTrainer, TrainedModel};
pub use traits::{FittedRegressor, RegressionError, Regressor};
