//! StableHLO dialect.
//!
//! The portable, versioned operation set that frameworks export. This is the
//! source vocabulary of the translation.
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
pub use attribute::Precision;
pub use attribute::RngAlgorithm;
pub use attribute::RngDistribution;
pub use attribute::ScatterDimensionNumbers;
pub use attribute::StablehloAttr;
pub use attribute::Transpose;
pub use attribute::TypeExtensions;
pub use op::StablehloOp;
pub use op::StablehloOpKind;
pub use typ::TokenType;

pub struct Stablehlo;

impl Dialect for Stablehlo {
    fn name(&self) -> &'static str {
        "stablehlo"
    }
    fn description(&self) -> &'static str {
        "StableHLO dialect"
    }
}
