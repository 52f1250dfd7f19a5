use crate::convert::ConvertStablehloToMhlo;
use crate::convert::Pass;
use crate::convert::RewriteResult;
use crate::ir::Op;
use crate::shared::Shared;
use crate::shared::SharedExt;
use anyhow::Result;
use clap::Arg;
use clap::ArgAction;
use std::env::ArgsOs;
use std::fmt;
use std::fmt::Display;
use tracing::info;
use tracing::subscriber::SetGlobalDefaultError;
use tracing::Level;

/// A transformation pass (e.g., `--convert-stablehlo-to-mhlo`).
pub struct SinglePass {
    pass: String,
}

impl Display for SinglePass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.pass)
    }
}

impl SinglePass {
    pub fn new(pass: &str) -> SinglePass {
        let pass = pass.strip_prefix("--").unwrap_or(pass);
        SinglePass {
            pass: pass.to_string(),
        }
    }
}

/// A collection of [SinglePass]es.
pub struct Passes {
    passes: Vec<SinglePass>,
    print_ir_before_all: bool,
}

impl Display for Passes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}",
            self.passes
                .iter()
                .map(|p| p.to_string())
                .collect::<Vec<String>>()
                .join(" ")
        )
    }
}

impl Passes {
    pub fn from_vec(passes: Vec<&str>) -> Passes {
        Passes {
            passes: passes.iter().map(|p| SinglePass::new(p)).collect(),
            print_ir_before_all: false,
        }
    }
    /// Keep only the passes (starting with `--convert-`) from the given args.
    ///
    /// `--print-ir-before-all` is picked up as well.
    pub fn from_convert_vec(args: Vec<&str>) -> Passes {
        let mut passes = vec![];
        let mut print_ir_before_all = false;
        for arg in args {
            if arg.starts_with("--convert-") {
                passes.push(arg);
            } else if arg == "--print-ir-before-all" {
                print_ir_before_all = true;
            }
        }
        Passes::from_vec(passes).with_print_ir_before_all(print_ir_before_all)
    }
    /// Extract passes (starting with `--convert-`) from the given args.
    pub fn from_convert_args(args: ArgsOs) -> Passes {
        let args = args
            .map(|arg| arg.to_string_lossy().to_string())
            .collect::<Vec<String>>();
        Passes::from_convert_vec(args.iter().map(|arg| arg.as_str()).collect())
    }
    pub fn with_print_ir_before_all(mut self, print_ir_before_all: bool) -> Passes {
        self.print_ir_before_all = print_ir_before_all;
        self
    }
    pub fn print_ir_before_all(&self) -> bool {
        self.print_ir_before_all
    }
    pub fn vec(&self) -> &Vec<SinglePass> {
        &self.passes
    }
}

/// Interface to add custom passes to the pipeline.
pub trait TransformDispatch {
    fn dispatch(op: Shared<dyn Op>, pass: &SinglePass) -> Result<RewriteResult>;
}

/// Default implementation of [TransformDispatch].
///
/// This default implementation knows only the passes that are implemented in
/// this crate.
pub struct DefaultTransformDispatch;

/// Initialize logging with the given level.
pub fn init_subscriber(level: Level) -> Result<(), SetGlobalDefaultError> {
    let subscriber = tracing_subscriber::FmtSubscriber::builder()
        .with_max_level(level)
        .with_test_writer()
        .without_time()
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
}

impl TransformDispatch for DefaultTransformDispatch {
    fn dispatch(op: Shared<dyn Op>, pass: &SinglePass) -> Result<RewriteResult> {
        let pass = pass.to_string();
        match pass.as_str() {
            ConvertStablehloToMhlo::NAME => ConvertStablehloToMhlo::convert(op.clone()),
            _ => Err(anyhow::anyhow!("Unknown pass: {}", pass)),
        }
    }
}

/// Default arguments that are available in this crate.
///
/// This includes options such as `--print-ir-before-all`, but also the default
/// passes such as `--convert-stablehlo-to-mhlo`. `--debug` is not included to
/// allow downstream projects to handle the logging differently.
pub fn default_arguments() -> Vec<Arg> {
    vec![
        Arg::new("convert-stablehlo-to-mhlo")
            .long("convert-stablehlo-to-mhlo")
            .help("Convert StableHLO operations to MHLO")
            .action(ArgAction::SetTrue),
        Arg::new("print-ir-before-all")
            .long("print-ir-before-all")
            .help("Print the IR before each pass")
            .action(ArgAction::SetTrue),
    ]
}

/// The IR of `op` as printed before `pass` by `--print-ir-before-all`.
pub fn ir_dump_before(pass: &SinglePass, op: &Shared<dyn Op>) -> String {
    format!("// -----// IR Dump Before {pass} //----- //\n{}", op.rd())
}

/// Transform the given operation via the given passes.
///
/// The passes run in order. The result is [RewriteResult::Changed] with the
/// newest root if any pass changed the IR.
pub fn transform<T: TransformDispatch>(op: Shared<dyn Op>, passes: &Passes) -> Result<RewriteResult> {
    let mut op = op;
    let mut result = RewriteResult::Unchanged;
    for pass in passes.vec() {
        if passes.print_ir_before_all() {
            info!("{}", ir_dump_before(pass, &op));
        }
        let new_result = T::dispatch(op.clone(), pass)?;
        if let RewriteResult::Changed(changed) = new_result {
            op = changed.op.clone();
            result = RewriteResult::Changed(changed);
        }
    }

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_passes() {
        let args = vec!["--debug", "--convert-stablehlo-to-mhlo"];
        let passes = Passes::from_convert_vec(args);
        assert_eq!(passes.to_string(), "convert-stablehlo-to-mhlo");
        assert_eq!(passes.vec().len(), 1);
        assert!(!passes.print_ir_before_all());
    }

    #[test]
    fn test_print_ir_before_all() {
        let args = vec!["--print-ir-before-all", "--convert-stablehlo-to-mhlo"];
        let passes = Passes::from_convert_vec(args);
        assert!(passes.print_ir_before_all());
        assert_eq!(passes.to_string(), "convert-stablehlo-to-mhlo");

        let module = crate::ir::ModuleOp::new();
        let dump = ir_dump_before(&passes.vec()[0], &module);
        let expected = "// -----// IR Dump Before convert-stablehlo-to-mhlo //----- //\nmodule {\n}";
        assert_eq!(dump, expected);

        // An empty module has nothing to legalize.
        let result = transform::<DefaultTransformDispatch>(module, &passes).unwrap();
        assert!(result == RewriteResult::Unchanged);
    }

    #[test]
    fn test_default_arguments() {
        let command = clap::Command::new("hlo-bridge").args(default_arguments());
        let matches = command
            .try_get_matches_from(vec!["hlo-bridge", "--convert-stablehlo-to-mhlo"])
            .unwrap();
        assert!(matches.get_flag("convert-stablehlo-to-mhlo"));
        assert!(!matches.get_flag("print-ir-before-all"));
    }

    #[test]
    fn test_unknown_pass() {
        let module = crate::ir::ModuleOp::new();
        let pass = SinglePass::new("--convert-foo-to-bar");
        let err = DefaultTransformDispatch::dispatch(module, &pass).err().unwrap();
        assert_eq!(err.to_string(), "Unknown pass: convert-foo-to-bar");
    }
}
