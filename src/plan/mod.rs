pub mod builder;
pub mod error;
pub mod types;

pub use builder::PlanBuilder;
pub use error::{PlanError, PlanResult};
pub use types::{CallArg, CallArgs, CallDescriptor, Plan, SymbolicValue, ValueSlot, ValueTag};
