use crate::dialect::mhlo::MhloAttr;
use crate::dialect::stablehlo::StablehloAttr;
use crate::ir::IntegerType;
use crate::ir::Type;
use std::collections::BTreeMap;
use std::fmt::Display;
use std::fmt::Formatter;
use std::sync::Arc;

/// Attributes are known-constant values of operations (a variable is not allowed).
///
/// The attribute shapes are a closed set so that code which has to handle
/// every shape, such as the translation between dialects, can match on them
/// exhaustively. Attributes from dialects that are not modelled here are kept
/// as [OpaqueAttr]s.
#[derive(Clone, Debug, PartialEq)]
pub enum Attribute {
    /// An ordered list of attributes (e.g., `[1 : i64, 2 : i64]`).
    Array(ArrayAttr),
    Bool(bool),
    /// Constant tensor contents (e.g., `dense<1.0> : tensor<f32>`).
    DenseElements(DenseElementsAttr),
    Integer(IntegerAttr),
    Mhlo(MhloAttr),
    /// An attribute from a dialect that is only known by its text.
    Opaque(OpaqueAttr),
    Stablehlo(StablehloAttr),
    String(StringAttr),
    Unit,
}

impl Attribute {
    /// The namespace of the dialect that owns this attribute.
    pub fn dialect(&self) -> &str {
        match self {
            Attribute::Mhlo(_) => "mhlo",
            Attribute::Opaque(attr) => attr.dialect(),
            Attribute::Stablehlo(_) => "stablehlo",
            Attribute::Array(_)
            | Attribute::Bool(_)
            | Attribute::DenseElements(_)
            | Attribute::Integer(_)
            | Attribute::String(_)
            | Attribute::Unit => "builtin",
        }
    }
    pub fn integer(value: i64, num_bits: u64) -> Self {
        Attribute::Integer(IntegerAttr::new(IntegerType::new(num_bits), value))
    }
    pub fn string(value: &str) -> Self {
        Attribute::String(StringAttr::new(value))
    }
    pub fn array(elements: Vec<Attribute>) -> Self {
        Attribute::Array(ArrayAttr::new(elements))
    }
}

impl Display for Attribute {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Attribute::Array(attr) => write!(f, "{attr}"),
            Attribute::Bool(value) => write!(f, "{value}"),
            Attribute::DenseElements(attr) => write!(f, "{attr}"),
            Attribute::Integer(attr) => write!(f, "{attr}"),
            Attribute::Mhlo(attr) => write!(f, "{attr}"),
            Attribute::Opaque(attr) => write!(f, "{attr}"),
            Attribute::Stablehlo(attr) => write!(f, "{attr}"),
            Attribute::String(attr) => write!(f, "{attr}"),
            Attribute::Unit => write!(f, "unit"),
        }
    }
}

/// An attribute containing an integer value.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct IntegerAttr {
    // The type of the integer: specifies the precision.
    typ: IntegerType,
    value: i64,
}

impl IntegerAttr {
    pub fn new(typ: IntegerType, value: i64) -> Self {
        Self { typ, value }
    }
    pub fn i64(&self) -> i64 {
        self.value
    }
    pub fn typ(&self) -> IntegerType {
        self.typ
    }
}

impl Display for IntegerAttr {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} : {}", self.value, self.typ)
    }
}

/// UTF-8 encoded string.
#[derive(Clone, Debug, PartialEq)]
pub struct StringAttr {
    value: String,
}

impl StringAttr {
    pub fn new(value: &str) -> Self {
        Self {
            value: value.to_string(),
        }
    }
    pub fn value(&self) -> &str {
        &self.value
    }
}

impl Display for StringAttr {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let text = self.value.replace('\\', "\\\\").replace('"', "\\\"");
        write!(f, "\"{text}\"")
    }
}

#[derive(Clone, Debug)]
pub struct DenseElementsAttr {
    literal: String,
    typ: Arc<dyn Type>,
}

impl PartialEq for DenseElementsAttr {
    fn eq(&self, other: &Self) -> bool {
        self.literal == other.literal && *self.typ == *other.typ
    }
}

impl DenseElementsAttr {
    pub fn new(literal: &str, typ: Arc<dyn Type>) -> Self {
        Self {
            literal: literal.to_string(),
            typ,
        }
    }
    pub fn typ(&self) -> Arc<dyn Type> {
        self.typ.clone()
    }
}

impl Display for DenseElementsAttr {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "dense<{}> : {}", self.literal, self.typ)
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ArrayAttr {
    elements: Vec<Attribute>,
}

impl ArrayAttr {
    pub fn new(elements: Vec<Attribute>) -> Self {
        Self { elements }
    }
    pub fn elements(&self) -> &[Attribute] {
        &self.elements
    }
    pub fn len(&self) -> usize {
        self.elements.len()
    }
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}

impl Display for ArrayAttr {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let joined = self
            .elements
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<String>>()
            .join(", ");
        write!(f, "[{joined}]")
    }
}

/// An attribute that is only known by its dialect and textual body.
///
/// For example, `#custom.tag<"x">` has dialect `custom` and body `tag<"x">`.
#[derive(Clone, Debug, PartialEq)]
pub struct OpaqueAttr {
    dialect: String,
    body: String,
}

impl OpaqueAttr {
    pub fn new(dialect: &str, body: &str) -> Self {
        Self {
            dialect: dialect.to_string(),
            body: body.to_string(),
        }
    }
    pub fn dialect(&self) -> &str {
        &self.dialect
    }
    pub fn body(&self) -> &str {
        &self.body
    }
}

impl Display for OpaqueAttr {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}.{}", self.dialect, self.body)
    }
}

/// The named attributes of an operation.
///
/// Names are unique. Like a MLIR attribute dictionary, the entries are kept
/// sorted by name, so printing is deterministic.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Attributes {
    map: BTreeMap<String, Attribute>,
}

impl Attributes {
    pub fn new() -> Self {
        Self {
            map: BTreeMap::new(),
        }
    }
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
    pub fn len(&self) -> usize {
        self.map.len()
    }
    /// Insert an attribute and return the previous value under that name.
    pub fn insert(&mut self, name: &str, attribute: Attribute) -> Option<Attribute> {
        self.map.insert(name.to_string(), attribute)
    }
    pub fn get(&self, name: &str) -> Option<&Attribute> {
        self.map.get(name)
    }
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Attribute)> {
        self.map.iter()
    }
    pub fn names(&self) -> Vec<String> {
        self.map.keys().cloned().collect()
    }
}

impl FromIterator<(String, Attribute)> for Attributes {
    fn from_iter<I: IntoIterator<Item = (String, Attribute)>>(iter: I) -> Self {
        Self {
            map: iter.into_iter().collect(),
        }
    }
}

impl Display for Attributes {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if !self.map.is_empty() {
            write!(f, "{{")?;
            for (i, (name, attribute)) in self.map.iter().enumerate() {
                if 0 < i {
                    write!(f, ", ")?;
                }
                write!(f, "{name} = {attribute}")?;
            }
            write!(f, "}}")?;
        }
        Ok(())
    }
}
