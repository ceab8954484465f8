/// Parameter passing: global slot layout and per-call value sets

pub mod parameter_layout;
pub mod parameter_set;

pub use parameter_layout::{builtin, ParamId, ParameterLayout};
pub use parameter_set::ParameterSet;
