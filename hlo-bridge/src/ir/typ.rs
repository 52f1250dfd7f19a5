use crate::ir::Attribute;
use anyhow::Result;
use std::fmt::Debug;
use std::fmt::Display;
use std::fmt::Formatter;
use std::sync::Arc;

/// Types are immutable and shared between values via `Arc<dyn Type>`.
pub trait Type: Send + Sync {
    /// Display the type.
    ///
    /// This has to be implemented by each type so that calls to `Display::fmt`
    /// on a `dyn Type` can be delegated to the type's `display` method.
    fn display(&self, f: &mut Formatter<'_>) -> std::fmt::Result;
    fn as_any(&self) -> &dyn std::any::Any;
    /// The namespace of the dialect that defines this type.
    fn dialect(&self) -> &str {
        "builtin"
    }
}

impl Display for dyn Type {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        self.display(f)
    }
}

impl Debug for dyn Type {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        self.display(f)
    }
}

/// Types are uniqued by their textual form, so two types are equal when they
/// print the same.
impl PartialEq for dyn Type {
    fn eq(&self, other: &Self) -> bool {
        self.to_string() == other.to_string()
    }
}

/// Interface to convert types from one dialect to another.
///
/// Conversion rules receive an implementation of this trait and use it for
/// the result types of the operations that they rewrite. Implementations are
/// expected to recurse into container types such as tensors and tuples.
pub trait TypeConverter: Send + Sync {
    fn convert_type(&self, from: &Arc<dyn Type>) -> Result<Arc<dyn Type>>;
    /// Convert all types in order.
    ///
    /// Fails as soon as one of the types cannot be converted.
    fn convert_types(&self, from: &Types) -> Result<Types> {
        let mut out = Vec::with_capacity(from.len());
        for typ in from.iter() {
            out.push(self.convert_type(typ)?);
        }
        Ok(Types::from_vec(out))
    }
}

/// A type that is only known by its textual form (e.g., `!custom.thing`).
///
/// The dialect is derived from the `!dialect.` prefix.
pub struct AnyType {
    typ: String,
}

impl AnyType {
    pub fn new(typ: &str) -> Self {
        Self {
            typ: typ.to_string(),
        }
    }
    pub fn typ(&self) -> String {
        self.typ.clone()
    }
}

impl Type for AnyType {
    fn display(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.typ)
    }
    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
    fn dialect(&self) -> &str {
        match self.typ.strip_prefix('!') {
            Some(rest) => match rest.find(|c| c == '.' || c == '<') {
                Some(end) => &rest[..end],
                None => rest,
            },
            None => "builtin",
        }
    }
}

/// Represent an integer type such as i32 or i64.
///
/// Just like in LLVM, this does not include the sign bit since the sign does
/// not matter for 2s complement integer arithmetic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntegerType {
    num_bits: u64,
}

impl IntegerType {
    pub fn new(num_bits: u64) -> Self {
        Self { num_bits }
    }
    pub fn num_bits(&self) -> u64 {
        self.num_bits
    }
}

impl Type for IntegerType {
    fn display(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "i{}", self.num_bits)
    }
    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}

impl Display for IntegerType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Type::display(self, f)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FloatType {
    BF16,
    F16,
    F32,
    F64,
}

impl Type for FloatType {
    fn display(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            FloatType::BF16 => "bf16",
            FloatType::F16 => "f16",
            FloatType::F32 => "f32",
            FloatType::F64 => "f64",
        };
        write!(f, "{name}")
    }
    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}

/// A ranked tensor such as `tensor<4x?xf32>`.
///
/// A `None` dimension is dynamic and printed as `?`. The optional encoding
/// carries dialect-specific information such as the bounds of dynamic
/// dimensions.
#[derive(Clone)]
pub struct TensorType {
    shape: Vec<Option<i64>>,
    element_type: Arc<dyn Type>,
    encoding: Option<Attribute>,
}

impl TensorType {
    pub fn new(shape: Vec<Option<i64>>, element_type: Arc<dyn Type>) -> Self {
        Self {
            shape,
            element_type,
            encoding: None,
        }
    }
    /// Tensor with only static dimensions.
    pub fn ranked(shape: &[i64], element_type: Arc<dyn Type>) -> Self {
        let shape = shape.iter().map(|dim| Some(*dim)).collect();
        Self::new(shape, element_type)
    }
    pub fn with_encoding(mut self, encoding: Option<Attribute>) -> Self {
        self.encoding = encoding;
        self
    }
    pub fn shape(&self) -> &[Option<i64>] {
        &self.shape
    }
    pub fn element_type(&self) -> Arc<dyn Type> {
        self.element_type.clone()
    }
    pub fn encoding(&self) -> Option<&Attribute> {
        self.encoding.as_ref()
    }
}

impl Type for TensorType {
    fn display(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "tensor<")?;
        for dim in self.shape.iter() {
            match dim {
                Some(dim) => write!(f, "{dim}x")?,
                None => write!(f, "?x")?,
            }
        }
        write!(f, "{}", self.element_type)?;
        if let Some(encoding) = &self.encoding {
            write!(f, ", {encoding}")?;
        }
        write!(f, ">")
    }
    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}

#[derive(Clone)]
pub struct TupleType {
    types: Vec<Arc<dyn Type>>,
}

impl TupleType {
    pub fn new(types: Vec<Arc<dyn Type>>) -> Self {
        Self { types }
    }
    pub fn types(&self) -> &[Arc<dyn Type>] {
        &self.types
    }
}

impl Type for TupleType {
    fn display(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let joined = self
            .types
            .iter()
            .map(|t| t.to_string())
            .collect::<Vec<String>>()
            .join(", ");
        write!(f, "tuple<{joined}>")
    }
    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}

/// A collection of `Type`s.
///
/// Provides some convenience methods around [Type]s.
#[derive(Clone, Default, PartialEq)]
pub struct Types {
    types: Vec<Arc<dyn Type>>,
}

impl Types {
    pub fn from_vec(types: Vec<Arc<dyn Type>>) -> Self {
        Self { types }
    }
    pub fn vec(&self) -> Vec<Arc<dyn Type>> {
        self.types.clone()
    }
    pub fn iter(&self) -> std::slice::Iter<'_, Arc<dyn Type>> {
        self.types.iter()
    }
    pub fn len(&self) -> usize {
        self.types.len()
    }
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

impl Display for Types {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let joined = self
            .types
            .iter()
            .map(|t| t.to_string())
            .collect::<Vec<String>>()
            .join(", ");
        write!(f, "{}", joined)
    }
}
