//! hlo-bridge translates programs from the StableHLO dialect into the MHLO
//! dialect.
//!
//! Both dialects describe the same tensor operations. StableHLO is the
//! portable format that frameworks export and that is versioned for
//! compatibility. MHLO is what the XLA compiler consumes internally. The two
//! are kept in sync, but each one evolves at its own pace, so the translation
//! has to map every operation, attribute and type from one vocabulary to the
//! other and give up cleanly where the vocabularies differ.
//!
//! The translation consists of:
//!
//! - [convert::convert_attr], which translates a single attribute;
//! - [convert::StablehloToMhloOpConverter], one rewrite rule per StableHLO
//!   operation kind;
//! - [convert::populate_stablehlo_to_mhlo_patterns], which registers a rule
//!   for every kind;
//! - [convert::ConvertStablehloToMhlo], the pass that applies the rules to a
//!   module and reports operations that could not be legalized.
//!
//! To run the pass on a module, use [transform] with
//! `--convert-stablehlo-to-mhlo`.

pub mod convert;
pub mod dialect;
pub mod ir;
pub mod shared;
#[cfg(feature = "test-utils")]
pub mod tester;
mod transform;

pub use transform::default_arguments;
pub use transform::init_subscriber;
pub use transform::ir_dump_before;
pub use transform::transform;
pub use transform::DefaultTransformDispatch;
pub use transform::Passes;
pub use transform::SinglePass;
pub use transform::TransformDispatch;

/// Dialects can define new operations, attributes, and types.
/// Each dialect is given an unique namespace that is prefixed.
///
/// Dialects can co-exist and can be produced and consumed by different passes.
pub trait Dialect {
    fn name(&self) -> &'static str;
    fn description(&self) -> &'static str;
}
