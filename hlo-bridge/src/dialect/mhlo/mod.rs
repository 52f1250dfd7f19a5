//! MHLO dialect.
//!
//! The operation set that the XLA compiler consumes. It mirrors `stablehlo`
//! but is versioned independently, so its attribute vocabulary may have extra
//! or missing symbols.
mod attribute;
mod op;
mod typ;

use crate::Dialect;

pub use attribute::ChannelHandle;
pub use attribute::ComparisonDirection;
pub use attribute::ComparisonType;
pub use attribute::ConvDimensionNumbers;
pub use attribute::CustomCallApiVersion;
pub use attribute::DotDimensionNumbers;
pub use attribute::FftType;
pub use attribute::GatherDimensionNumbers;
pub use attribute::MhloAttr;
pub use attribute::Precision;
pub use attribute::RngAlgorithm;
pub use attribute::RngDistribution;
pub use attribute::ScatterDimensionNumbers;
pub use attribute::Transpose;
pub use attribute::TypeExtensions;
pub use op::MhloOp;
pub use op::MhloOpKind;
pub use typ::TokenType;

pub struct Mhlo;

impl Dialect for Mhlo {
    fn name(&self) -> &'static str {
        "mhlo"
    }
    fn description(&self) -> &'static str {
        "MHLO dialect"
    }
}
