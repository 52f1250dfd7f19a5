extern crate hlo_bridge;

use criterion::criterion_group;
use criterion::criterion_main;
use criterion::Criterion;
use hlo_bridge::dialect::stablehlo;
use hlo_bridge::dialect::stablehlo::StablehloAttr;
use hlo_bridge::dialect::stablehlo::StablehloOp;
use hlo_bridge::dialect::stablehlo::StablehloOpKind;
use hlo_bridge::ir::module_body;
use hlo_bridge::ir::shared_op;
use hlo_bridge::ir::Attribute;
use hlo_bridge::ir::FloatType;
use hlo_bridge::ir::GuardedBlock;
use hlo_bridge::ir::IntegerType;
use hlo_bridge::ir::ModuleOp;
use hlo_bridge::ir::Op;
use hlo_bridge::ir::TensorType;
use hlo_bridge::ir::Type;
use hlo_bridge::shared::Shared;
use hlo_bridge::shared::SharedExt;
use hlo_bridge::tester::Tester;
use indoc::indoc;
use std::panic::Location;
use std::sync::Arc;

fn flags() -> Vec<&'static str> {
    vec!["--convert-stablehlo-to-mhlo"]
}

/// A module with `n` chains of `add`, `compare` and `select`.
fn module(n: usize) -> Shared<dyn Op> {
    let f32_tensor: Arc<dyn Type> = Arc::new(TensorType::ranked(&[4], Arc::new(FloatType::F32)));
    let i1_tensor: Arc<dyn Type> =
        Arc::new(TensorType::ranked(&[4], Arc::new(IntegerType::new(1))));
    let module = ModuleOp::new();
    let body = module_body(&module).unwrap();
    let x = body.add_argument("%arg0", f32_tensor.clone());
    let direction = stablehlo::ComparisonDirection::Gt;
    let direction = Attribute::Stablehlo(StablehloAttr::ComparisonDirection(direction));
    for i in 0..n {
        let add = StablehloOp::builder(StablehloOpKind::Add)
            .operands(&[x.clone(), x.clone()])
            .result(&format!("%{}", 3 * i), f32_tensor.clone())
            .build();
        let add = shared_op(StablehloOp::from_operation(add).unwrap());
        body.push_op(add.clone());
        let sum = add.rd().result(0).unwrap();
        let compare = StablehloOp::builder(StablehloOpKind::Compare)
            .operands(&[sum.clone(), x.clone()])
            .attribute("comparison_direction", direction.clone())
            .result(&format!("%{}", 3 * i + 1), i1_tensor.clone())
            .build();
        let compare = shared_op(StablehloOp::from_operation(compare).unwrap());
        body.push_op(compare.clone());
        let predicate = compare.rd().result(0).unwrap();
        let select = StablehloOp::builder(StablehloOpKind::Select)
            .operands(&[predicate, sum, x.clone()])
            .result(&format!("%{}", 3 * i + 2), f32_tensor.clone())
            .build();
        body.push_op(shared_op(StablehloOp::from_operation(select).unwrap()));
    }
    module
}

fn benchmark_rewrite() {
    Tester::init_tracing();
    let expected = indoc! {"
      %0 = mhlo.add %arg0, %arg0 : tensor<4xf32>
      %1 = mhlo.compare %0, %arg0 {comparison_direction = #mhlo<comparison_direction GT>} : tensor<4xi1>
      %2 = mhlo.select %1, %0, %arg0 : tensor<4xf32>
    "};
    let (module, actual) = Tester::transform(flags(), module(100));
    Tester::verify(module);
    Tester::check_lines_contain(&actual, expected, Location::caller());
}

fn bench(c: &mut Criterion) {
    let mut group = c.benchmark_group("rewrite");
    group.sample_size(10);
    group.bench_function("benchmark_rewrite", |b| b.iter(benchmark_rewrite));
    group.finish();
}

criterion_group!(benches, bench);
criterion_main!(benches);
