use crate::ir::Type;
use std::fmt::Formatter;

/// Orders side-effecting operations (`!stablehlo.token`).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TokenType;

impl Type for TokenType {
    fn display(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "!stablehlo.token")
    }
    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
    fn dialect(&self) -> &str {
        "stablehlo"
    }
}
