//! Plan analysis: output references, validation and execution ordering.

pub mod dependency;
pub mod reference;
pub mod validator;

pub use dependency::{effective_dependencies, format_cycle, DependencyGraph, DependencyGraphBuilder};
pub use reference::{
    extract_refs, is_output_ref, parse_output_ref, referenced_steps, resolve, OutputRef,
};
pub use validator::{validate, validate_plan, ValidationError};
