use crate::dialect::hlo::hlo_op_kinds;
use crate::dialect::hlo::hlo_ops;
use crate::dialect::hlo::RegionArity;
use crate::ir::Attributes;
use crate::ir::Op;
use crate::ir::OpBuilder;
use crate::ir::OpOperands;
use crate::ir::Operation;
use crate::ir::Types;
use crate::shared::Shared;
use anyhow::Result;

hlo_ops!(hlo_op_kinds, MhloOpKind, "mhlo");

/// An operation of the `mhlo` dialect.
pub struct MhloOp {
    operation: Shared<Operation>,
    kind: MhloOpKind,
}

impl MhloOp {
    /// Create an op of a kind with a fixed number of regions.
    ///
    /// The regions are created without blocks. The results are unnamed and
    /// have the given types.
    pub fn create(
        kind: MhloOpKind,
        result_types: &Types,
        operands: &OpOperands,
        attributes: Attributes,
    ) -> Result<Self> {
        match kind.regions() {
            RegionArity::Fixed(n) => Ok(Self::build(kind, result_types, operands, attributes, n)),
            RegionArity::Variadic => Err(anyhow::anyhow!(
                "{kind} has a variadic number of regions, so the count has to be given"
            )),
        }
    }
    /// Create an op of a kind with a variadic number of regions, such as
    /// `mhlo.case`, with `num_regions` regions.
    pub fn create_variadic(
        kind: MhloOpKind,
        result_types: &Types,
        operands: &OpOperands,
        attributes: Attributes,
        num_regions: usize,
    ) -> Result<Self> {
        match kind.regions() {
            RegionArity::Variadic => Ok(Self::build(
                kind,
                result_types,
                operands,
                attributes,
                num_regions,
            )),
            RegionArity::Fixed(n) => Err(anyhow::anyhow!(
                "{kind} has exactly {n} regions, so no count can be given"
            )),
        }
    }
    fn build(
        kind: MhloOpKind,
        result_types: &Types,
        operands: &OpOperands,
        attributes: Attributes,
        num_regions: usize,
    ) -> Self {
        let operation = OpBuilder::new(kind.operation_name())
            .operands(&operands.values())
            .attributes(attributes)
            .result_types(result_types)
            .empty_regions(num_regions)
            .build();
        MhloOp {
            operation: Shared::new(operation.into()),
            kind,
        }
    }
    /// Wrap `operation`; its name decides the kind.
    pub fn from_operation(operation: Operation) -> Result<Self> {
        let kind = MhloOpKind::of_operation(&operation)?;
        Ok(MhloOp {
            operation: Shared::new(operation.into()),
            kind,
        })
    }
    pub fn kind(&self) -> MhloOpKind {
        self.kind
    }
}

impl Op for MhloOp {
    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
    fn operation(&self) -> &Shared<Operation> {
        &self.operation
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::IntegerType;
    use crate::ir::Type;
    use crate::shared::SharedExt;
    use std::sync::Arc;

    fn i32() -> Types {
        let typ: Arc<dyn Type> = Arc::new(IntegerType::new(32));
        Types::from_vec(vec![typ])
    }

    #[test]
    fn test_create() {
        let op = MhloOp::create(
            MhloOpKind::While,
            &i32(),
            &OpOperands::default(),
            Attributes::new(),
        )
        .unwrap();
        assert_eq!(op.regions().len(), 2);
        assert_eq!(op.name().to_string(), "mhlo.while");
        assert_eq!(
            op.operation().rd().to_string(),
            "<unnamed> = mhlo.while : i32 ({\n}, {\n})"
        );
    }

    #[test]
    fn test_from_operation() {
        let operation = Operation::new(MhloOpKind::If.operation_name());
        let err = MhloOp::from_operation(operation).err().unwrap();
        assert_eq!(err.to_string(), "mhlo.if expects 2 regions, got 0");

        let name = crate::ir::OperationName::new("stablehlo.add".to_string());
        let err = MhloOp::from_operation(Operation::new(name)).err().unwrap();
        assert_eq!(err.to_string(), "unknown mhlo operation 'stablehlo.add'");

        let operation = Operation::new(MhloOpKind::Add.operation_name());
        let op = MhloOp::from_operation(operation).unwrap();
        assert_eq!(op.kind(), MhloOpKind::Add);
    }

    #[test]
    fn test_case_needs_count() {
        let operands = OpOperands::default();
        let err = MhloOp::create(MhloOpKind::Case, &i32(), &operands, Attributes::new());
        assert!(err.is_err());
        let attributes = Attributes::new();
        let op = MhloOp::create_variadic(MhloOpKind::Case, &i32(), &operands, attributes, 0);
        assert_eq!(op.unwrap().regions().len(), 0);
        let attributes = Attributes::new();
        let err = MhloOp::create_variadic(MhloOpKind::Add, &i32(), &operands, attributes, 0);
        assert_eq!(
            err.err().unwrap().to_string(),
            "mhlo.add has exactly 0 regions, so no count can be given"
        );
    }
}
