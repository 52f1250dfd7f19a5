use crate::ir::Block;
use crate::ir::Op;
use crate::ir::Type;
use crate::ir::Types;
use crate::shared::Shared;
use crate::shared::SharedExt;
use crate::shared::WeakShared;
use std::fmt::Display;
use std::sync::Arc;

/// An argument of a block (e.g., `%arg0` in `^bb0(%arg0: tensor<f32>)`).
pub struct BlockArgument {
    name: Option<String>,
    typ: Arc<dyn Type>,
    /// The block for which this [BlockArgument] is an argument.
    parent: Option<WeakShared<Block>>,
}

impl BlockArgument {
    pub fn new(name: Option<String>, typ: Arc<dyn Type>) -> Self {
        BlockArgument {
            name,
            typ,
            parent: None,
        }
    }
    pub fn name(&self) -> Option<String> {
        self.name.clone()
    }
    pub fn parent(&self) -> Option<Shared<Block>> {
        self.parent.as_ref().and_then(|parent| parent.upgrade())
    }
    pub fn set_parent(&mut self, parent: Option<WeakShared<Block>>) {
        self.parent = parent;
    }
    pub fn typ(&self) -> Arc<dyn Type> {
        self.typ.clone()
    }
}

impl Display for BlockArgument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.name {
            Some(name) => write!(f, "{name}: {}", self.typ),
            None => write!(f, "{}", self.typ),
        }
    }
}

/// A named result of an operation.
///
/// For example, in the following code:
/// ```mlir
/// %0 = stablehlo.add %1, %2 : tensor<f32>
/// ```
/// `%0` is the result of the operation and has the name `%0`. The `defining_op`
/// is `stablehlo.add` and the `typ` is `tensor<f32>`.
pub struct OpResult {
    name: Option<String>,
    typ: Arc<dyn Type>,
    defining_op: Option<WeakShared<dyn Op>>,
}

impl OpResult {
    pub fn new(name: Option<String>, typ: Arc<dyn Type>) -> Self {
        OpResult {
            name,
            typ,
            defining_op: None,
        }
    }
    pub fn name(&self) -> Option<String> {
        self.name.clone()
    }
    pub fn typ(&self) -> Arc<dyn Type> {
        self.typ.clone()
    }
    pub fn defining_op(&self) -> Option<Shared<dyn Op>> {
        self.defining_op.as_ref().and_then(|op| op.upgrade())
    }
    pub fn set_defining_op(&mut self, op: Option<WeakShared<dyn Op>>) {
        self.defining_op = op;
    }
}

/// An instance of a value in the IR.
///
/// The primary purpose of a [Value] is to be pointed to by operands. So, in
/// the following example:
///
/// ```mlir
/// %x = stablehlo.constant dense<1.0> : tensor<f32>
/// %y = stablehlo.add %x, %x : tensor<f32>
/// ```
///
/// both operands of the second line point to the [OpResult] defined by the
/// first line. A value is owned by the operation or block that defines it;
/// operands only hold a reference to it.
pub enum Value {
    /// A block argument (e.g., `^bb0(%arg0: tensor<f32>)`).
    BlockArgument(BlockArgument),
    /// A result of an operation (e.g., `%0 = ...`).
    OpResult(OpResult),
}

impl Value {
    pub fn name(&self) -> Option<String> {
        match self {
            Value::BlockArgument(arg) => arg.name(),
            Value::OpResult(result) => result.name(),
        }
    }
    pub fn typ(&self) -> Arc<dyn Type> {
        match self {
            Value::BlockArgument(arg) => arg.typ(),
            Value::OpResult(result) => result.typ(),
        }
    }
    pub fn set_type(&mut self, typ: Arc<dyn Type>) {
        match self {
            Value::BlockArgument(arg) => arg.typ = typ,
            Value::OpResult(result) => result.typ = typ,
        }
    }
    /// The operation that defines this value, if it is an [OpResult].
    pub fn defining_op(&self) -> Option<Shared<dyn Op>> {
        match self {
            Value::BlockArgument(_) => None,
            Value::OpResult(result) => result.defining_op(),
        }
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.name() {
            Some(name) => write!(f, "{name}"),
            None => write!(f, "<unnamed>"),
        }
    }
}

/// Vector of values.
///
/// Used to store operation results and block arguments. This naming is
/// identical to MLIR values. Also there, a value can be a block argument or an
/// operation result.
#[derive(Clone, Default)]
pub struct Values {
    values: Vec<Shared<Value>>,
}

impl IntoIterator for Values {
    type Item = Shared<Value>;
    type IntoIter = std::vec::IntoIter<Self::Item>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.into_iter()
    }
}

impl Values {
    pub fn from_vec(values: Vec<Shared<Value>>) -> Self {
        Values { values }
    }
    pub fn vec(&self) -> Vec<Shared<Value>> {
        self.values.clone()
    }
    pub fn iter(&self) -> std::slice::Iter<'_, Shared<Value>> {
        self.values.iter()
    }
    pub fn get(&self, index: usize) -> Option<Shared<Value>> {
        self.values.get(index).cloned()
    }
    pub fn len(&self) -> usize {
        self.values.len()
    }
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
    pub fn types(&self) -> Types {
        let types = self.values.iter().map(|value| value.rd().typ()).collect();
        Types::from_vec(types)
    }
    /// Set the defining op for op results.
    ///
    /// This is used when replacing an operation with another operation to let
    /// the results point to the new operation. Block arguments are skipped
    /// since they are not defined by an operation.
    pub fn set_defining_op(&self, op: &Shared<dyn Op>) {
        for value in self.values.iter() {
            if let Value::OpResult(result) = &mut *value.wr() {
                result.set_defining_op(Some(Arc::downgrade(op)));
            }
        }
    }
}

impl Display for Values {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let joined = self
            .values
            .iter()
            .map(|o| o.rd().to_string())
            .collect::<Vec<String>>()
            .join(", ");
        write!(f, "{joined}")
    }
}
