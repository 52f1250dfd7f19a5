extern crate hlo_bridge;

use hlo_bridge::convert::apply_patterns;
use hlo_bridge::convert::convert_attr;
use hlo_bridge::convert::populate_stablehlo_to_mhlo_patterns;
use hlo_bridge::convert::RewritePatternSet;
use hlo_bridge::convert::RewriteResult;
use hlo_bridge::convert::StablehloToMhloTypeConverter;
use hlo_bridge::dialect::mhlo;
use hlo_bridge::dialect::mhlo::MhloAttr;
use hlo_bridge::dialect::mhlo::MhloOp;
use hlo_bridge::dialect::stablehlo;
use hlo_bridge::dialect::stablehlo::StablehloAttr;
use hlo_bridge::dialect::stablehlo::StablehloOp;
use hlo_bridge::dialect::stablehlo::StablehloOpKind;
use hlo_bridge::ir::module_body;
use hlo_bridge::ir::shared_op;
use hlo_bridge::ir::AnyType;
use hlo_bridge::ir::Attribute;
use hlo_bridge::ir::Block;
use hlo_bridge::ir::FloatType;
use hlo_bridge::ir::GuardedBlock;
use hlo_bridge::ir::GuardedRegion;
use hlo_bridge::ir::IntegerType;
use hlo_bridge::ir::ModuleOp;
use hlo_bridge::ir::OpaqueAttr;
use hlo_bridge::ir::Op;
use hlo_bridge::ir::Operation;
use hlo_bridge::ir::Region;
use hlo_bridge::ir::TensorType;
use hlo_bridge::ir::Type;
use hlo_bridge::ir::TypeConverter;
use hlo_bridge::ir::Value;
use hlo_bridge::shared::Shared;
use hlo_bridge::shared::SharedExt;
use hlo_bridge::tester::Tester;
use indoc::indoc;
use std::panic::Location;
use std::sync::Arc;

fn flags() -> Vec<&'static str> {
    vec!["--convert-stablehlo-to-mhlo"]
}

fn f32_tensor() -> Arc<dyn Type> {
    Arc::new(TensorType::ranked(&[2], Arc::new(FloatType::F32)))
}

fn i1_tensor() -> Arc<dyn Type> {
    Arc::new(TensorType::ranked(&[2], Arc::new(IntegerType::new(1))))
}

fn i32_scalar() -> Arc<dyn Type> {
    Arc::new(TensorType::ranked(&[], Arc::new(IntegerType::new(32))))
}

fn add_op(block: &Shared<Block>, operation: Operation) -> Shared<dyn Op> {
    let op = shared_op(StablehloOp::from_operation(operation).unwrap());
    block.push_op(op.clone());
    op
}

/// A region with one block that returns `value`.
fn return_region(value: &Shared<Value>) -> Shared<Region> {
    let region: Shared<Region> = Shared::new(Region::default().into());
    let block = region.add_empty_block();
    let ret = StablehloOp::builder(StablehloOpKind::Return)
        .operand(value)
        .build();
    add_op(&block, ret);
    region
}

fn empty_block_region() -> Shared<Region> {
    let region: Shared<Region> = Shared::new(Region::default().into());
    region.add_empty_block();
    region
}

fn stablehlo_attr(attr: StablehloAttr) -> Attribute {
    Attribute::Stablehlo(attr)
}

fn typed_ffi() -> Attribute {
    let version = stablehlo::CustomCallApiVersion::ApiVersionTypedFfi;
    stablehlo_attr(StablehloAttr::CustomCallApiVersion(version))
}

fn patterns() -> RewritePatternSet {
    let mut patterns = RewritePatternSet::new();
    let converter: Arc<dyn TypeConverter> = Arc::new(StablehloToMhloTypeConverter);
    populate_stablehlo_to_mhlo_patterns(&mut patterns, converter).unwrap();
    patterns
}

#[test]
fn test_compare() {
    Tester::init_tracing();
    let module = ModuleOp::new();
    let body = module_body(&module).unwrap();
    let x = body.add_argument("%arg0", f32_tensor());
    let direction = StablehloAttr::ComparisonDirection(stablehlo::ComparisonDirection::Eq);
    let compare = StablehloOp::builder(StablehloOpKind::Compare)
        .operands(&[x.clone(), x])
        .attribute("comparison_direction", stablehlo_attr(direction))
        .result("%0", i1_tensor())
        .build();
    add_op(&body, compare);
    let expected = indoc! {"
    module {
    ^bb0(%arg0: tensor<2xf32>):
      %0 = mhlo.compare %arg0, %arg0 {comparison_direction = #mhlo<comparison_direction EQ>} : tensor<2xi1>
    }
    "};
    let (module, actual) = Tester::transform(flags(), module);
    Tester::verify(module.clone());
    Tester::check_lines_exact(&actual, expected, Location::caller());

    let op = module_body(&module).unwrap().rd().ops()[0].clone();
    let op = op.rd();
    let op = op.as_any().downcast_ref::<MhloOp>().unwrap();
    let direction = mhlo::ComparisonDirection::Eq;
    let expected = Attribute::Mhlo(MhloAttr::ComparisonDirection(direction));
    assert_eq!(op.attribute("comparison_direction"), Some(expected));
}

#[test]
fn test_uses_follow_results() {
    Tester::init_tracing();
    let module = ModuleOp::new();
    let body = module_body(&module).unwrap();
    let x = body.add_argument("%arg0", f32_tensor());
    let add = StablehloOp::builder(StablehloOpKind::Add)
        .operands(&[x.clone(), x.clone()])
        .result("%0", f32_tensor())
        .build();
    let add = add_op(&body, add);
    let sum = add.rd().result(0).unwrap();
    let multiply = StablehloOp::builder(StablehloOpKind::Multiply)
        .operands(&[sum.clone(), x])
        .result("%1", f32_tensor())
        .build();
    add_op(&body, multiply);
    let expected = indoc! {"
      %0 = mhlo.add %arg0, %arg0 : tensor<2xf32>
      %1 = mhlo.multiply %0, %arg0 : tensor<2xf32>
    "};
    let (module, actual) = Tester::transform(flags(), module);
    Tester::verify(module.clone());
    Tester::check_lines_contain(&actual, expected, Location::caller());

    // The value object is the same, but now defined by the new op.
    let ops = module_body(&module).unwrap().rd().ops();
    let defining_op = sum.rd().defining_op().unwrap();
    assert!(Arc::ptr_eq(&defining_op, &ops[0]));
    assert_eq!(defining_op.rd().name().to_string(), "mhlo.add");
    let operand = ops[1].rd().operation().rd().operand(0).unwrap();
    assert!(Arc::ptr_eq(&operand.value(), &sum));
}

#[test]
fn test_channel_handle() {
    Tester::init_tracing();
    let module = ModuleOp::new();
    let body = module_body(&module).unwrap();
    let token = body.add_argument("%arg0", Arc::new(stablehlo::TokenType));
    let handle = stablehlo::ChannelHandle { handle: 7, typ: 1 };
    let send = StablehloOp::builder(StablehloOpKind::Send)
        .operand(&token)
        .attribute("channel_handle", stablehlo_attr(StablehloAttr::ChannelHandle(handle)))
        .result("%0", Arc::new(stablehlo::TokenType))
        .build();
    add_op(&body, send);
    let expected = indoc! {"
    module {
    ^bb0(%arg0: !mhlo.token):
      %0 = mhlo.send %arg0 {channel_handle = #mhlo.channel_handle<handle = 7, type = 1>} : !mhlo.token
    }
    "};
    let (module, actual) = Tester::transform(flags(), module);
    Tester::verify(module);
    Tester::check_lines_exact(&actual, expected, Location::caller());
}

#[test]
fn test_foreign_attribute_passes_through() {
    Tester::init_tracing();
    let module = ModuleOp::new();
    let body = module_body(&module).unwrap();
    let x = body.add_argument("%arg0", f32_tensor());
    let tag = Attribute::Opaque(OpaqueAttr::new("custom", r#"tag<"x">"#));
    let version = stablehlo::CustomCallApiVersion::ApiVersionOriginal;
    let custom_call = StablehloOp::builder(StablehloOpKind::CustomCall)
        .operand(&x)
        .attribute("api_version", stablehlo_attr(StablehloAttr::CustomCallApiVersion(version)))
        .attribute("backend_config", tag.clone())
        .attribute("call_target_name", Attribute::string("foo"))
        .result("%0", f32_tensor())
        .build();
    add_op(&body, custom_call);
    let expected = indoc! {r#"
      %0 = mhlo.custom_call %arg0 {api_version = #mhlo<custom_call_api_version API_VERSION_ORIGINAL>, backend_config = #custom.tag<"x">, call_target_name = "foo"} : tensor<2xf32>
    "#};
    let (module, actual) = Tester::transform(flags(), module);
    Tester::verify(module.clone());
    Tester::check_lines_contain(&actual, expected, Location::caller());

    let op = module_body(&module).unwrap().rd().ops()[0].clone();
    assert_eq!(op.rd().attribute("backend_config"), Some(tag));
}

#[test]
fn test_missing_enum_symbol_leaves_op_unchanged() {
    Tester::init_tracing();
    let module = ModuleOp::new();
    let body = module_body(&module).unwrap();
    let x = body.add_argument("%arg0", f32_tensor());
    let custom_call = StablehloOp::builder(StablehloOpKind::CustomCall)
        .operand(&x)
        .attribute("api_version", typed_ffi())
        .result("%0", f32_tensor())
        .build();
    let op = add_op(&body, custom_call);
    let before = Tester::print(&module);
    let result = op.rd().result(0).unwrap();
    let attributes = op.rd().operation().rd().attributes();

    let rewrite = apply_patterns(module.clone(), &patterns()).unwrap();
    assert!(rewrite == RewriteResult::Unchanged);

    let ops = body.rd().ops();
    assert_eq!(ops.len(), 1);
    assert!(Arc::ptr_eq(&ops[0], &op));
    assert!(Arc::ptr_eq(&op.rd().result(0).unwrap(), &result));
    assert_eq!(op.rd().operation().rd().attributes(), attributes);
    assert_eq!(Tester::print(&module), before);
}

#[test]
fn test_unconvertible_result_type_leaves_op_unchanged() {
    Tester::init_tracing();
    let module = ModuleOp::new();
    let body = module_body(&module).unwrap();
    let x = body.add_argument("%arg0", f32_tensor());
    let future: Arc<dyn Type> = Arc::new(AnyType::new("!stablehlo.future"));
    let add = StablehloOp::builder(StablehloOpKind::Add)
        .operands(&[x.clone(), x])
        .result("%0", future)
        .build();
    let op = add_op(&body, add);
    let before = Tester::print(&module);
    let result = op.rd().result(0).unwrap();

    let rewrite = apply_patterns(module.clone(), &patterns()).unwrap();
    assert!(rewrite == RewriteResult::Unchanged);

    let ops = body.rd().ops();
    assert_eq!(ops.len(), 1);
    assert!(Arc::ptr_eq(&ops[0], &op));
    assert!(Arc::ptr_eq(&op.rd().result(0).unwrap(), &result));
    assert_eq!(result.rd().typ().to_string(), "!stablehlo.future");
    let expected = indoc! {"
      %0 = stablehlo.add %arg0, %arg0 : !stablehlo.future
    "};
    let after = Tester::print(&module);
    assert_eq!(after, before);
    Tester::check_lines_contain(&after, expected, Location::caller());
}

#[test]
fn test_unlegalizable_op_fails_pass() {
    Tester::init_tracing();
    let module = ModuleOp::new();
    let body = module_body(&module).unwrap();
    let x = body.add_argument("%arg0", f32_tensor());
    let custom_call = StablehloOp::builder(StablehloOpKind::CustomCall)
        .operand(&x)
        .attribute("api_version", typed_ffi())
        .result("%0", f32_tensor())
        .build();
    add_op(&body, custom_call);
    let err = Tester::try_transform(flags(), module).err().unwrap();
    assert_eq!(
        err.to_string(),
        "failed to legalize operation 'stablehlo.custom_call'"
    );
}

#[test]
fn test_arrays() {
    let high = stablehlo_attr(StablehloAttr::Precision(stablehlo::Precision::High));
    let default = stablehlo_attr(StablehloAttr::Precision(stablehlo::Precision::Default));
    let array = Attribute::array(vec![high.clone(), Attribute::integer(3, 64), default]);
    let converted = convert_attr(&array).unwrap();
    let expected = Attribute::array(vec![
        Attribute::Mhlo(MhloAttr::Precision(mhlo::Precision::High)),
        Attribute::integer(3, 64),
        Attribute::Mhlo(MhloAttr::Precision(mhlo::Precision::Default)),
    ]);
    assert_eq!(converted, expected);
    assert_eq!(
        converted.to_string(),
        "[#mhlo<precision HIGH>, 3 : i64, #mhlo<precision DEFAULT>]"
    );

    let nested = Attribute::array(vec![Attribute::array(vec![]), high.clone()]);
    let converted = convert_attr(&nested).unwrap();
    assert_eq!(converted.to_string(), "[[], #mhlo<precision HIGH>]");

    let failing = Attribute::array(vec![high, typed_ffi()]);
    let err = convert_attr(&failing).err().unwrap();
    assert_eq!(
        err.to_string(),
        "no mhlo counterpart for custom_call_api_version API_VERSION_TYPED_FFI"
    );
}

#[test]
fn test_array_failure_leaves_op_unchanged() {
    Tester::init_tracing();
    let module = ModuleOp::new();
    let body = module_body(&module).unwrap();
    let x = body.add_argument("%arg0", f32_tensor());
    let high = stablehlo_attr(StablehloAttr::Precision(stablehlo::Precision::High));
    let dot = StablehloOp::builder(StablehloOpKind::Dot)
        .operands(&[x.clone(), x])
        .attribute("precision_config", Attribute::array(vec![high, typed_ffi()]))
        .result("%0", f32_tensor())
        .build();
    let op = add_op(&body, dot);
    let rewrite = apply_patterns(module.clone(), &patterns()).unwrap();
    assert!(rewrite == RewriteResult::Unchanged);
    assert!(Arc::ptr_eq(&body.rd().ops()[0], &op));
    assert_eq!(op.rd().name().to_string(), "stablehlo.dot");
}

#[test]
fn test_composite_records() {
    let dot = stablehlo::DotDimensionNumbers {
        lhs_batching_dimensions: vec![0],
        rhs_batching_dimensions: vec![0],
        lhs_contracting_dimensions: vec![2],
        rhs_contracting_dimensions: vec![1],
    };
    let converted = convert_attr(&stablehlo_attr(StablehloAttr::DotDimensionNumbers(dot.clone())));
    match converted.unwrap() {
        Attribute::Mhlo(MhloAttr::DotDimensionNumbers(converted)) => {
            assert_eq!(converted.fields(), dot.fields());
        }
        other => panic!("unexpected {other}"),
    }

    let conv = stablehlo::ConvDimensionNumbers {
        input_batch_dimension: 0,
        input_feature_dimension: 3,
        input_spatial_dimensions: vec![1, 2],
        kernel_input_feature_dimension: 2,
        kernel_output_feature_dimension: 3,
        kernel_spatial_dimensions: vec![0, 1],
        output_batch_dimension: 0,
        output_feature_dimension: 3,
        output_spatial_dimensions: vec![1, 2],
    };
    let attr = stablehlo_attr(StablehloAttr::ConvDimensionNumbers(conv.clone()));
    match convert_attr(&attr).unwrap() {
        Attribute::Mhlo(MhloAttr::ConvDimensionNumbers(converted)) => {
            assert_eq!(converted.fields(), conv.fields());
        }
        other => panic!("unexpected {other}"),
    }

    let gather = stablehlo::GatherDimensionNumbers {
        offset_dims: vec![1],
        collapsed_slice_dims: vec![0],
        start_index_map: vec![0],
        index_vector_dim: 1,
    };
    let attr = stablehlo_attr(StablehloAttr::GatherDimensionNumbers(gather.clone()));
    let expected = indoc! {"
    #mhlo.gather<offset_dims = [1], collapsed_slice_dims = [0], start_index_map = [0], index_vector_dim = 1>
    "};
    assert_eq!(convert_attr(&attr).unwrap().to_string(), expected.trim());

    let scatter = stablehlo::ScatterDimensionNumbers {
        update_window_dims: vec![1],
        inserted_window_dims: vec![0],
        scatter_dims_to_operand_dims: vec![0],
        index_vector_dim: 1,
    };
    let attr = stablehlo_attr(StablehloAttr::ScatterDimensionNumbers(scatter.clone()));
    match convert_attr(&attr).unwrap() {
        Attribute::Mhlo(MhloAttr::ScatterDimensionNumbers(converted)) => {
            assert_eq!(converted.fields(), scatter.fields());
        }
        other => panic!("unexpected {other}"),
    }
}

/// Build `%0 = stablehlo.case %arg0` with `n` branches that each return `%arg1`.
fn case_module(n: usize) -> (Shared<dyn Op>, Vec<Shared<Region>>) {
    let module = ModuleOp::new();
    let body = module_body(&module).unwrap();
    let index = body.add_argument("%arg0", i32_scalar());
    let x = body.add_argument("%arg1", f32_tensor());
    let regions = (0..n).map(|_| return_region(&x)).collect::<Vec<_>>();
    let mut case = StablehloOp::builder(StablehloOpKind::Case).operand(&index);
    for region in regions.iter() {
        case = case.region(region.clone());
    }
    add_op(&body, case.result("%0", f32_tensor()).build());
    (module, regions)
}

#[test]
fn test_case_without_branches() {
    Tester::init_tracing();
    let (module, _) = case_module(0);
    let expected = indoc! {"
    module {
    ^bb0(%arg0: tensor<i32>, %arg1: tensor<2xf32>):
      %0 = mhlo.case %arg0 : tensor<2xf32>
    }
    "};
    let (module, actual) = Tester::transform(flags(), module);
    Tester::verify(module.clone());
    Tester::check_lines_exact(&actual, expected, Location::caller());
    let op = module_body(&module).unwrap().rd().ops()[0].clone();
    assert_eq!(op.rd().regions().len(), 0);
}

#[test]
fn test_case_with_one_branch() {
    Tester::init_tracing();
    let (module, regions) = case_module(1);
    let expected = indoc! {"
    module {
    ^bb0(%arg0: tensor<i32>, %arg1: tensor<2xf32>):
      %0 = mhlo.case %arg0 : tensor<2xf32> ({
        mhlo.return %arg1
      })
    }
    "};
    let (module, actual) = Tester::transform(flags(), module);
    Tester::verify(module.clone());
    Tester::check_lines_exact(&actual, expected, Location::caller());
    let op = module_body(&module).unwrap().rd().ops()[0].clone();
    assert!(Arc::ptr_eq(&op.rd().regions()[0], &regions[0]));
}

#[test]
fn test_case_with_three_branches() {
    Tester::init_tracing();
    let (module, regions) = case_module(3);
    let expected = indoc! {"
    module {
    ^bb0(%arg0: tensor<i32>, %arg1: tensor<2xf32>):
      %0 = mhlo.case %arg0 : tensor<2xf32> ({
        mhlo.return %arg1
      }, {
        mhlo.return %arg1
      }, {
        mhlo.return %arg1
      })
    }
    "};
    let (module, actual) = Tester::transform(flags(), module);
    Tester::verify(module.clone());
    Tester::check_lines_exact(&actual, expected, Location::caller());
    let op = module_body(&module).unwrap().rd().ops()[0].clone();
    let new_regions = op.rd().regions();
    assert_eq!(new_regions.len(), 3);
    for (new, old) in new_regions.iter().zip(regions.iter()) {
        assert!(Arc::ptr_eq(new, old));
    }
}

#[test]
fn test_regions_are_moved() {
    Tester::init_tracing();
    let module = ModuleOp::new();
    let body = module_body(&module).unwrap();
    let condition = body.add_argument("%arg0", i1_tensor());
    let regions = vec![empty_block_region(), empty_block_region()];
    let blocks = regions
        .iter()
        .map(|region| region.rd().block(0).unwrap())
        .collect::<Vec<Shared<Block>>>();
    let if_op = StablehloOp::builder(StablehloOpKind::If)
        .operand(&condition)
        .region(regions[0].clone())
        .region(regions[1].clone())
        .build();
    let old = add_op(&body, if_op);

    let (module, _) = Tester::transform(flags(), module);
    Tester::verify(module.clone());
    let new = module_body(&module).unwrap().rd().ops()[0].clone();
    assert_eq!(new.rd().name().to_string(), "mhlo.if");
    let new_regions = new.rd().regions();
    assert_eq!(new_regions.len(), 2);
    for i in 0..2 {
        assert!(Arc::ptr_eq(&new_regions[i], &regions[i]));
        assert!(Arc::ptr_eq(&new_regions[i].rd().block(0).unwrap(), &blocks[i]));
        let parent = new_regions[i].rd().parent().unwrap();
        assert!(Arc::ptr_eq(&parent, &new));
    }
    // The replaced op no longer owns the regions.
    assert!(old.rd().regions().is_empty());
}

#[test]
fn test_every_kind_has_one_rule() {
    let patterns = patterns();
    assert_eq!(patterns.len(), StablehloOpKind::ALL.len());
    for kind in StablehloOpKind::ALL {
        let rewrite = patterns.get(&kind.operation_name()).unwrap();
        let operation = StablehloOp::builder(*kind)
            .empty_regions(match kind.regions() {
                hlo_bridge::dialect::hlo::RegionArity::Fixed(n) => n,
                hlo_bridge::dialect::hlo::RegionArity::Variadic => 2,
            })
            .build();
        let op = StablehloOp::from_operation(operation).unwrap();
        assert!(rewrite.is_match(&op).unwrap());
    }

    let mut patterns = patterns;
    let converter: Arc<dyn TypeConverter> = Arc::new(StablehloToMhloTypeConverter);
    let err = populate_stablehlo_to_mhlo_patterns(&mut patterns, converter).err().unwrap();
    assert_eq!(
        err.to_string(),
        "a pattern for stablehlo.abs is already registered"
    );
}

#[test]
fn test_rule_matches_only_its_kind() {
    let patterns = patterns();
    let name = StablehloOpKind::Add.operation_name();
    let rewrite = patterns.get(&name).unwrap();
    let subtract = StablehloOp::builder(StablehloOpKind::Subtract).build();
    let subtract = StablehloOp::from_operation(subtract).unwrap();
    assert!(!rewrite.is_match(&subtract).unwrap());
}
