use crate::ir::Attribute;
use crate::ir::Attributes;
use crate::ir::Block;
use crate::ir::Op;
use crate::ir::OpOperand;
use crate::ir::OpOperands;
use crate::ir::OpResult;
use crate::ir::Region;
use crate::ir::Type;
use crate::ir::Types;
use crate::ir::Value;
use crate::ir::Values;
use crate::shared::Shared;
use crate::shared::SharedExt;
use crate::shared::WeakShared;
use std::default::Default;
use std::fmt::Display;
use std::fmt::Formatter;
use std::sync::Arc;

/// The name of an operation including its dialect prefix (e.g.,
/// `stablehlo.add`).
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct OperationName {
    name: String,
}

impl OperationName {
    pub fn new(name: String) -> Self {
        Self { name }
    }
    pub fn name(&self) -> String {
        self.name.clone()
    }
    /// The dialect namespace, that is, everything before the first dot.
    pub fn dialect(&self) -> &str {
        match self.name.split_once('.') {
            Some((dialect, _)) => dialect,
            None => "builtin",
        }
    }
}

impl Display for OperationName {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.name.is_empty() {
            write!(f, "<unknown>")?;
        }
        write!(f, "{}", self.name)
    }
}

/// Note that MLIR distinguishes between Operation and Op.
/// Operation generically models all operations.
/// Op is an interface for more specific operations.
///
/// An operation owns its results and its regions. The operands only point to
/// values that are owned by other operations or blocks.
#[derive(Default)]
pub struct Operation {
    name: OperationName,
    operands: OpOperands,
    attributes: Attributes,
    /// Results are [Value]s of the [Value::OpResult] variant.
    results: Values,
    regions: Vec<Shared<Region>>,
    parent: Option<WeakShared<Block>>,
}

impl Default for OperationName {
    fn default() -> Self {
        OperationName::new("".to_string())
    }
}

impl Operation {
    pub fn new(name: OperationName) -> Self {
        Self {
            name,
            ..Default::default()
        }
    }
    pub fn name(&self) -> OperationName {
        self.name.clone()
    }
    pub fn set_name(&mut self, name: OperationName) {
        self.name = name;
    }
    pub fn operands(&self) -> OpOperands {
        self.operands.clone()
    }
    pub fn operand(&self, index: usize) -> Option<OpOperand> {
        self.operands.get(index).cloned()
    }
    pub fn operand_types(&self) -> Types {
        let types = self.operands.iter().map(|o| o.typ()).collect();
        Types::from_vec(types)
    }
    pub fn set_operands(&mut self, operands: OpOperands) {
        self.operands = operands;
    }
    pub fn attributes(&self) -> Attributes {
        self.attributes.clone()
    }
    pub fn attribute(&self, name: &str) -> Option<Attribute> {
        self.attributes.get(name).cloned()
    }
    pub fn set_attributes(&mut self, attributes: Attributes) {
        self.attributes = attributes;
    }
    pub fn results(&self) -> Values {
        self.results.clone()
    }
    pub fn result(&self, index: usize) -> Option<Shared<Value>> {
        self.results.get(index)
    }
    pub fn result_types(&self) -> Types {
        self.results.types()
    }
    pub fn set_results(&mut self, results: Values) {
        self.results = results;
    }
    pub fn regions(&self) -> Vec<Shared<Region>> {
        self.regions.clone()
    }
    pub fn region(&self, index: usize) -> Option<Shared<Region>> {
        self.regions.get(index).cloned()
    }
    pub fn set_regions(&mut self, regions: Vec<Shared<Region>>) {
        self.regions = regions;
    }
    /// Return the parent block (this is called `getBlock` in MLIR).
    pub fn parent(&self) -> Option<Shared<Block>> {
        self.parent.as_ref().and_then(|parent| parent.upgrade())
    }
    pub fn set_parent(&mut self, parent: Option<WeakShared<Block>>) {
        self.parent = parent;
    }
    /// The op that owns the region that owns the parent block.
    pub fn parent_op(&self) -> Option<Shared<dyn Op>> {
        let block = self.parent()?;
        let region = block.rd().parent()?;
        let op = region.rd().parent();
        op
    }
    /// Display the results of the operation (e.g., `%0 = `).
    pub fn display_results(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if !self.results.is_empty() {
            write!(f, "{} = ", self.results)?;
        }
        Ok(())
    }
    /// Display the regions of the operation (e.g., ` ({ ... }, { ... })`).
    pub fn display_regions(&self, f: &mut Formatter<'_>, indent: i32) -> std::fmt::Result {
        if self.regions.is_empty() {
            return Ok(());
        }
        write!(f, " (")?;
        for (i, region) in self.regions.iter().enumerate() {
            if 0 < i {
                write!(f, ", ")?;
            }
            region.rd().display(f, indent)?;
        }
        write!(f, ")")
    }
    pub fn display(&self, f: &mut Formatter<'_>, indent: i32) -> std::fmt::Result {
        self.display_results(f)?;
        write!(f, "{}", self.name)?;
        if !self.operands.is_empty() {
            write!(f, " {}", self.operands)?;
        }
        if !self.attributes.is_empty() {
            write!(f, " {}", self.attributes)?;
        }
        let result_types = self.result_types();
        if !result_types.is_empty() {
            write!(f, " : {result_types}")?;
        }
        self.display_regions(f, indent)
    }
}

impl Display for Operation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        self.display(f, 0)
    }
}

/// Builder for an [Operation].
///
/// # Example
///
/// ```
/// use hlo_bridge::ir::FloatType;
/// use hlo_bridge::ir::OpBuilder;
/// use hlo_bridge::ir::OperationName;
/// use hlo_bridge::ir::TensorType;
/// use std::sync::Arc;
///
/// let typ = Arc::new(TensorType::ranked(&[], Arc::new(FloatType::F32)));
/// let name = OperationName::new("stablehlo.constant".to_string());
/// let operation = OpBuilder::new(name).result("%0", typ).build();
/// assert_eq!(operation.to_string(), "%0 = stablehlo.constant : tensor<f32>");
/// ```
pub struct OpBuilder {
    operation: Operation,
    operands: Vec<OpOperand>,
    results: Vec<Shared<Value>>,
}

impl OpBuilder {
    pub fn new(name: OperationName) -> Self {
        Self {
            operation: Operation::new(name),
            operands: vec![],
            results: vec![],
        }
    }
    pub fn operand(mut self, value: &Shared<Value>) -> Self {
        self.operands.push(OpOperand::new(value.clone()));
        self
    }
    pub fn operands(mut self, values: &[Shared<Value>]) -> Self {
        for value in values {
            self.operands.push(OpOperand::new(value.clone()));
        }
        self
    }
    pub fn attribute(mut self, name: &str, attribute: Attribute) -> Self {
        self.operation.attributes.insert(name, attribute);
        self
    }
    pub fn attributes(mut self, attributes: Attributes) -> Self {
        self.operation.attributes = attributes;
        self
    }
    /// Add a named result of the given type.
    pub fn result(mut self, name: &str, typ: Arc<dyn Type>) -> Self {
        let result = OpResult::new(Some(name.to_string()), typ);
        self.results.push(Shared::new(Value::OpResult(result).into()));
        self
    }
    /// Add an unnamed result per type.
    pub fn result_types(mut self, types: &Types) -> Self {
        for typ in types.iter() {
            let result = OpResult::new(None, typ.clone());
            self.results.push(Shared::new(Value::OpResult(result).into()));
        }
        self
    }
    pub fn region(mut self, region: Shared<Region>) -> Self {
        self.operation.regions.push(region);
        self
    }
    /// Add `n` new regions without blocks.
    pub fn empty_regions(mut self, n: usize) -> Self {
        for _ in 0..n {
            self.operation.regions.push(Shared::new(Region::default().into()));
        }
        self
    }
    pub fn build(self) -> Operation {
        let mut operation = self.operation;
        operation.operands = OpOperands::from_vec(self.operands);
        operation.results = Values::from_vec(self.results);
        operation
    }
}
