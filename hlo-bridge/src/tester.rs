use crate::convert::RewriteResult;
use crate::init_subscriber;
use crate::ir::Op;
use crate::ir::Value;
use crate::shared::Shared;
use crate::shared::SharedExt;
use crate::transform;
use crate::DefaultTransformDispatch;
use crate::Passes;
use anyhow::Result;
use std::cmp::max;
use std::panic::Location;
use std::sync::Arc;
use tracing::info;

pub struct Tester;

impl Tester {
    /// Initialize the subscriber for the tests.
    ///
    /// Cannot pass options, since the tests run concurrently.
    pub fn init_tracing() {
        let level = tracing::Level::INFO;
        match init_subscriber(level) {
            Ok(_) => (),
            Err(_e) => (),
        }
    }
    fn point_to_missing_line(expected: &str, index: usize) -> String {
        let mut result = String::new();
        result.push_str("A line is missing from the output:\n");
        result.push_str("```");
        for (i, line) in expected.lines().enumerate() {
            if i == index {
                let msg = format!("{line}   <== missing");
                result.push_str(&format!("\n{msg}"));
            } else {
                result.push_str(&format!("\n{line}"));
            }
        }
        result.push_str("\n```");
        result
    }
    pub fn check_lines_exact(actual: &str, expected: &str, caller: &Location<'_>) {
        let actual = actual.trim();
        let expected = expected.trim();
        let l = max(actual.lines().count(), expected.lines().count());
        for i in 0..l {
            let actual_line = match actual.lines().nth(i) {
                None => {
                    panic!("Expected line {i} not found in output: called from {caller}");
                }
                Some(actual_line) => actual_line,
            };
            let expected_line = match expected.lines().nth(i) {
                None => {
                    panic!("Line {i} of the output was not expected: called from {caller}");
                }
                Some(expected_line) => expected_line,
            };
            assert_eq!(actual_line, expected_line, "called from {}", caller);
        }
    }
    /// Check whether the expected lines are present in the actual output.
    ///
    /// The actual output may contain additional lines that are not in the
    /// expected output.
    pub fn check_lines_contain(actual: &str, expected: &str, caller: &Location<'_>) {
        let actual = actual.trim();
        let expected = expected.trim();
        let mut actual_index = 0;
        'outer: for (i, expected_line) in expected.lines().enumerate() {
            let expected_line = expected_line.trim();
            // If not skipping these, an empty line will match any line (which
            // can then cause the next expected line to be reported as missing).
            if expected_line.is_empty() {
                continue;
            }
            for (j, actual_line) in actual.lines().enumerate().skip(actual_index) {
                if actual_line.contains(expected_line) {
                    actual_index = j + 1;
                    continue 'outer;
                }
            }
            let msg = Self::point_to_missing_line(expected, i);
            panic!("{msg}\nwhen called from {caller}");
        }
    }
    fn print_heading(msg: &str, src: &str) {
        info!("{msg}:\n```\n{src}\n```\n");
    }
    pub fn print(op: &Shared<dyn Op>) -> String {
        op.rd().to_string()
    }
    /// Run the passes in `arguments` on `module`.
    ///
    /// Returns the error of the first failing pass.
    pub fn try_transform(arguments: Vec<&str>, module: Shared<dyn Op>) -> Result<RewriteResult> {
        for arg in arguments.iter() {
            if arg.starts_with("convert-") {
                panic!("conversion passes should be prefixed with `--convert-`");
            }
        }
        let msg = format!("Before (transform {arguments:?})");
        Self::print_heading(&msg, &Self::print(&module));
        let passes = Passes::from_convert_vec(arguments);
        transform::<DefaultTransformDispatch>(module, &passes)
    }
    /// Run the passes in `arguments` on `module` and expect a change.
    pub fn transform(arguments: Vec<&str>, module: Shared<dyn Op>) -> (Shared<dyn Op>, String) {
        let result = Self::try_transform(arguments.clone(), module).unwrap();
        let new_root_op = match result {
            RewriteResult::Changed(changed_op) => changed_op.op,
            RewriteResult::Unchanged => {
                panic!("Expected changes");
            }
        };
        let actual = Self::print(&new_root_op);
        let msg = format!("After (transform {arguments:?})");
        Self::print_heading(&msg, &actual);
        (new_root_op, actual)
    }
    fn verify_core(op: &Shared<dyn Op>) {
        let name = op.rd().name();
        if name.to_string() != "module" {
            let parent = op.rd().parent();
            let parent = match parent {
                Some(parent) => parent,
                None => panic!("op without parent:\n{}", op.rd()),
            };
            let operation = op.rd().operation().clone();
            assert!(
                parent.rd().index_of(&operation).is_some(),
                "op is not in its parent block:\n{}",
                op.rd()
            );
        }
        let results = op.rd().operation().rd().results();
        for result in results.iter() {
            if let Value::OpResult(result) = &*result.rd() {
                let defining_op = result.defining_op();
                let defining_op = match defining_op {
                    Some(defining_op) => defining_op,
                    None => panic!("result without defining op in:\n{}", op.rd()),
                };
                assert!(
                    Arc::ptr_eq(&defining_op, op),
                    "result points to another op:\n{}",
                    op.rd()
                );
            }
        }
        let regions = op.rd().regions();
        for region in regions.iter() {
            let parent = region.rd().parent();
            let points_back = match parent {
                Some(parent) => Arc::ptr_eq(&parent, op),
                None => false,
            };
            assert!(points_back, "region does not point to its op:\n{}", op.rd());
        }
    }
    /// Run some extra verification on the IR (usually on a module).
    ///
    /// Essentially, this verification aims to catch problems that are not
    /// visible in the textual representation. For example, whether an op is
    /// added to its parent block is visible or the op wouldn't be printed, but
    /// whether the op has also a pointer to the parent is not visible.
    pub fn verify(op: Shared<dyn Op>) {
        Self::verify_core(&op);
        let ops = op.rd().ops();
        for op in ops {
            Self::verify(op);
        }
    }
}
