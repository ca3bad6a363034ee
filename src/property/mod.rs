//! Generic capture properties and their translation to device nodes.

mod engine;
mod id;
pub mod rules;
mod value;

pub use engine::PropertyEngine;
pub use id::PropertyId;
pub use rules::{EnumSwitch, GetProcedure, PropertyRule, RuleTable, SetProcedure};
pub use value::{AutoOr, PropertyValue, AUTO_SENTINEL};
