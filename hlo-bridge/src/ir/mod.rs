//! Intermediate representation (IR) in which both dialects live.
//!
//! These data structures are used as the basis for the translation.
//! For example, this module contains core types such as [Operation] and [Op].

mod attribute;
mod block;
mod module;
mod op;
mod op_operand;
mod operation;
mod region;
mod typ;
mod value;

pub use attribute::ArrayAttr;
pub use attribute::Attribute;
pub use attribute::Attributes;
pub use attribute::DenseElementsAttr;
pub use attribute::IntegerAttr;
pub use attribute::OpaqueAttr;
pub use attribute::StringAttr;
pub use block::Block;
pub use block::GuardedBlock;
pub use module::module_body;
pub use module::ModuleOp;
pub use op::shared_op;
pub use op::Op;
pub use op_operand::OpOperand;
pub use op_operand::OpOperands;
pub use operation::OpBuilder;
pub use operation::Operation;
pub use operation::OperationName;
pub use region::GuardedRegion;
pub use region::Region;
pub use typ::AnyType;
pub use typ::FloatType;
pub use typ::IntegerType;
pub use typ::TensorType;
pub use typ::TupleType;
pub use typ::Type;
pub use typ::TypeConverter;
pub use typ::Types;
pub use value::BlockArgument;
pub use value::OpResult;
pub use value::Value;
pub use value::Values;

/// Indentation for printing; negative levels print nothing.
pub fn spaces(indent: i32) -> String {
    "  ".repeat(indent.max(0) as usize)
}

#[test]
fn test_spaces() {
    assert_eq!(spaces(2), "    ");
    assert_eq!(spaces(-1), "");
}
