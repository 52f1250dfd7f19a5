use crate::ir::Type;
use std::fmt::Formatter;

/// Orders side-effecting operations (`!mhlo.token`).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TokenType;

impl Type for TokenType {
    fn display(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "!mhlo.token")
    }
    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
    fn dialect(&self) -> &str {
        "mhlo"
    }
}
