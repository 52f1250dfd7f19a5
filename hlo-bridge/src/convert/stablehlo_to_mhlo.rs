use crate::convert::apply_patterns;
use crate::convert::ChangedOp;
use crate::convert::Pass;
use crate::convert::Rewrite;
use crate::convert::RewritePatternSet;
use crate::convert::RewriteResult;
use crate::dialect::hlo::hlo_ops;
use crate::dialect::hlo::EnumAttribute;
use crate::dialect::mhlo;
use crate::dialect::mhlo::MhloAttr;
use crate::dialect::mhlo::MhloOp;
use crate::dialect::mhlo::MhloOpKind;
use crate::dialect::stablehlo;
use crate::dialect::stablehlo::StablehloAttr;
use crate::dialect::stablehlo::StablehloOp;
use crate::dialect::stablehlo::StablehloOpKind;
use crate::ir::shared_op;
use crate::ir::Attribute;
use crate::ir::Attributes;
use crate::ir::Op;
use crate::ir::TensorType;
use crate::ir::TupleType;
use crate::ir::Type;
use crate::ir::TypeConverter;
use crate::shared::Shared;
use crate::shared::SharedExt;
use anyhow::Context;
use anyhow::Result;
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::debug;
use tracing::warn;

macro_rules! define_mhlo_kind {
    ([] $($variant:ident => $mnemonic:literal, $arity:ident $(($n:literal))?;)+) => {
        /// The `mhlo` operation kind that a `stablehlo` operation kind
        /// translates to.
        pub fn mhlo_kind(kind: StablehloOpKind) -> MhloOpKind {
            match kind {
                $(StablehloOpKind::$variant => MhloOpKind::$variant),+
            }
        }
    };
}

hlo_ops!(define_mhlo_kind);

/// Translate an enum symbol into the symbol with the same name in the other
/// dialect.
fn convert_enum<S: EnumAttribute, T: EnumAttribute>(value: &S) -> Result<T> {
    let name = value.stringify();
    match T::symbolize(name) {
        Some(value) => Ok(value),
        None => Err(anyhow::anyhow!("no mhlo counterpart for {} {name}", S::KIND)),
    }
}

fn unhandled(attr: &dyn std::fmt::Display) -> anyhow::Error {
    warn!("Unhandled stablehlo attribute {attr}");
    anyhow::anyhow!("unhandled stablehlo attribute {attr}")
}

fn convert_stablehlo_attr(attr: &StablehloAttr) -> Result<MhloAttr> {
    let converted = match attr {
        StablehloAttr::ChannelHandle(attr) => MhloAttr::ChannelHandle(mhlo::ChannelHandle {
            handle: attr.handle,
            typ: attr.typ,
        }),
        StablehloAttr::ComparisonDirection(attr) => {
            MhloAttr::ComparisonDirection(convert_enum(attr)?)
        }
        StablehloAttr::ComparisonType(attr) => MhloAttr::ComparisonType(convert_enum(attr)?),
        StablehloAttr::CustomCallApiVersion(attr) => {
            MhloAttr::CustomCallApiVersion(convert_enum(attr)?)
        }
        StablehloAttr::FftType(attr) => MhloAttr::FftType(convert_enum(attr)?),
        StablehloAttr::Precision(attr) => MhloAttr::Precision(convert_enum(attr)?),
        StablehloAttr::RngAlgorithm(attr) => MhloAttr::RngAlgorithm(convert_enum(attr)?),
        StablehloAttr::RngDistribution(attr) => MhloAttr::RngDistribution(convert_enum(attr)?),
        StablehloAttr::Transpose(attr) => MhloAttr::Transpose(convert_enum(attr)?),
        StablehloAttr::ConvDimensionNumbers(attr) => {
            MhloAttr::ConvDimensionNumbers(mhlo::ConvDimensionNumbers {
                input_batch_dimension: attr.input_batch_dimension,
                input_feature_dimension: attr.input_feature_dimension,
                input_spatial_dimensions: attr.input_spatial_dimensions.clone(),
                kernel_input_feature_dimension: attr.kernel_input_feature_dimension,
                kernel_output_feature_dimension: attr.kernel_output_feature_dimension,
                kernel_spatial_dimensions: attr.kernel_spatial_dimensions.clone(),
                output_batch_dimension: attr.output_batch_dimension,
                output_feature_dimension: attr.output_feature_dimension,
                output_spatial_dimensions: attr.output_spatial_dimensions.clone(),
            })
        }
        StablehloAttr::DotDimensionNumbers(attr) => {
            MhloAttr::DotDimensionNumbers(mhlo::DotDimensionNumbers {
                lhs_batching_dimensions: attr.lhs_batching_dimensions.clone(),
                rhs_batching_dimensions: attr.rhs_batching_dimensions.clone(),
                lhs_contracting_dimensions: attr.lhs_contracting_dimensions.clone(),
                rhs_contracting_dimensions: attr.rhs_contracting_dimensions.clone(),
            })
        }
        StablehloAttr::GatherDimensionNumbers(attr) => {
            MhloAttr::GatherDimensionNumbers(mhlo::GatherDimensionNumbers {
                offset_dims: attr.offset_dims.clone(),
                collapsed_slice_dims: attr.collapsed_slice_dims.clone(),
                start_index_map: attr.start_index_map.clone(),
                index_vector_dim: attr.index_vector_dim,
            })
        }
        StablehloAttr::ScatterDimensionNumbers(attr) => {
            MhloAttr::ScatterDimensionNumbers(mhlo::ScatterDimensionNumbers {
                update_window_dims: attr.update_window_dims.clone(),
                inserted_window_dims: attr.inserted_window_dims.clone(),
                scatter_dims_to_operand_dims: attr.scatter_dims_to_operand_dims.clone(),
                index_vector_dim: attr.index_vector_dim,
            })
        }
        // Only valid as tensor encoding, which the type converter handles.
        StablehloAttr::TypeExtensions(_) => return Err(unhandled(attr)),
    };
    Ok(converted)
}

/// Translate an attribute from the `stablehlo` vocabulary to the `mhlo`
/// vocabulary.
///
/// Attributes that are not owned by `stablehlo` are returned unchanged, except
/// arrays whose elements are translated one by one. An array fails as a whole
/// if one of its elements fails.
pub fn convert_attr(attr: &Attribute) -> Result<Attribute> {
    match attr {
        Attribute::Stablehlo(attr) => Ok(Attribute::Mhlo(convert_stablehlo_attr(attr)?)),
        Attribute::Opaque(opaque) if opaque.dialect() == "stablehlo" => Err(unhandled(attr)),
        Attribute::Array(array) => {
            let elements = array
                .elements()
                .iter()
                .map(convert_attr)
                .collect::<Result<Vec<Attribute>>>()?;
            Ok(Attribute::array(elements))
        }
        Attribute::Bool(_)
        | Attribute::DenseElements(_)
        | Attribute::Integer(_)
        | Attribute::Mhlo(_)
        | Attribute::Opaque(_)
        | Attribute::String(_)
        | Attribute::Unit => Ok(attr.clone()),
    }
}

/// Translate every attribute of a dictionary and keep the names.
pub fn convert_attrs(attributes: &Attributes) -> Result<Attributes> {
    attributes
        .iter()
        .map(|(name, attr)| {
            let attr = convert_attr(attr).with_context(|| format!("attribute '{name}'"))?;
            Ok((name.clone(), attr))
        })
        .collect()
}

/// Default type converter from `stablehlo` to `mhlo`.
///
/// Tokens become `mhlo` tokens. Tensors and tuples are converted element by
/// element and tensor bounds encodings are rewritten to `mhlo`. Any other type
/// from `stablehlo` fails, and all remaining types are kept as they are.
#[derive(Clone, Copy, Debug, Default)]
pub struct StablehloToMhloTypeConverter;

impl StablehloToMhloTypeConverter {
    fn convert_encoding(&self, encoding: Option<&Attribute>) -> Result<Option<Attribute>> {
        let encoding = match encoding {
            Some(Attribute::Stablehlo(StablehloAttr::TypeExtensions(extensions))) => {
                let extensions = mhlo::TypeExtensions {
                    bounds: extensions.bounds.clone(),
                };
                Some(Attribute::Mhlo(MhloAttr::TypeExtensions(extensions)))
            }
            Some(encoding) => Some(convert_attr(encoding)?),
            None => None,
        };
        Ok(encoding)
    }
}

impl TypeConverter for StablehloToMhloTypeConverter {
    fn convert_type(&self, from: &Arc<dyn Type>) -> Result<Arc<dyn Type>> {
        let any = from.as_any();
        if any.is::<stablehlo::TokenType>() {
            return Ok(Arc::new(mhlo::TokenType));
        }
        if let Some(tensor) = any.downcast_ref::<TensorType>() {
            let element_type = self.convert_type(&tensor.element_type())?;
            let encoding = self.convert_encoding(tensor.encoding())?;
            let tensor = TensorType::new(tensor.shape().to_vec(), element_type);
            return Ok(Arc::new(tensor.with_encoding(encoding)));
        }
        if let Some(tuple) = any.downcast_ref::<TupleType>() {
            let mut types = vec![];
            for typ in tuple.types() {
                types.push(self.convert_type(typ)?);
            }
            return Ok(Arc::new(TupleType::new(types)));
        }
        if from.dialect() == "stablehlo" {
            return Err(anyhow::anyhow!("no mhlo counterpart for type {from}"));
        }
        Ok(from.clone())
    }
}

/// Rewrites one `stablehlo` operation kind into the corresponding `mhlo`
/// operation.
///
/// The rule converts the result types and the attributes before it touches the
/// IR. If either fails, the operation is left as it was. Operands are kept as
/// they are since they refer to values that the driver converts elsewhere.
pub struct StablehloToMhloOpConverter {
    kind: StablehloOpKind,
    converter: Arc<dyn TypeConverter>,
}

impl StablehloToMhloOpConverter {
    pub fn new(kind: StablehloOpKind, converter: Arc<dyn TypeConverter>) -> Self {
        Self { kind, converter }
    }
    pub fn kind(&self) -> StablehloOpKind {
        self.kind
    }
}

impl Rewrite for StablehloToMhloOpConverter {
    fn name(&self) -> &'static str {
        "stablehlo_to_mhlo::StablehloToMhloOpConverter"
    }
    fn is_match(&self, op: &dyn Op) -> Result<bool> {
        let is_match = match op.as_any().downcast_ref::<StablehloOp>() {
            Some(op) => op.kind() == self.kind,
            None => false,
        };
        Ok(is_match)
    }
    fn rewrite(&self, op: Shared<dyn Op>) -> Result<RewriteResult> {
        let (result_types, operands, attributes, regions) = {
            let op = op.rd();
            let operation = op.operation().rd();
            (
                operation.result_types(),
                operation.operands(),
                operation.attributes(),
                operation.regions(),
            )
        };
        let result_types = match self.converter.convert_types(&result_types) {
            Ok(result_types) => result_types,
            Err(err) => {
                debug!("Not converting {}: {err:#}", self.kind);
                return Ok(RewriteResult::Unchanged);
            }
        };
        let attributes = match convert_attrs(&attributes) {
            Ok(attributes) => attributes,
            Err(err) => {
                debug!("Not converting {}: {err:#}", self.kind);
                return Ok(RewriteResult::Unchanged);
            }
        };
        let kind = mhlo_kind(self.kind);
        let new_op = match kind {
            MhloOpKind::Case => {
                let num_regions = regions.len();
                MhloOp::create_variadic(kind, &result_types, &operands, attributes, num_regions)?
            }
            _ => MhloOp::create(kind, &result_types, &operands, attributes)?,
        };
        let expected = new_op.regions().len();
        if expected != regions.len() {
            return Err(anyhow::anyhow!(
                "{} has {} regions, but {kind} has {expected}",
                self.kind,
                regions.len()
            ));
        }
        let new_op = shared_op(new_op);
        op.rd().replace(new_op.clone())?;

        // Move the regions instead of copying them so that the blocks and the
        // ops inside keep their identity.
        op.rd().operation().wr().set_regions(vec![]);
        new_op.rd().operation().wr().set_regions(regions.clone());
        for region in regions.iter() {
            region.wr().set_parent(Some(Arc::downgrade(&new_op)));
        }
        Ok(RewriteResult::Changed(ChangedOp::new(new_op)))
    }
}

/// Register one [StablehloToMhloOpConverter] per `stablehlo` operation kind.
///
/// Fails if a kind already has a pattern in `patterns` or if, afterwards, the
/// `stablehlo` names in `patterns` differ from the `stablehlo` kinds.
pub fn populate_stablehlo_to_mhlo_patterns(
    patterns: &mut RewritePatternSet,
    converter: Arc<dyn TypeConverter>,
) -> Result<()> {
    for kind in StablehloOpKind::ALL {
        let rewrite = StablehloToMhloOpConverter::new(*kind, converter.clone());
        patterns.add(kind.operation_name(), Box::new(rewrite))?;
    }
    let registered = patterns
        .names()
        .into_iter()
        .filter(|name| name.dialect() == "stablehlo")
        .map(|name| name.name())
        .collect::<BTreeSet<String>>();
    let expected = StablehloOpKind::ALL
        .iter()
        .map(|kind| kind.name().to_string())
        .collect::<BTreeSet<String>>();
    if registered != expected {
        let missing = expected
            .difference(&registered)
            .cloned()
            .collect::<Vec<String>>();
        let unknown = registered
            .difference(&expected)
            .cloned()
            .collect::<Vec<String>>();
        return Err(anyhow::anyhow!(
            "stablehlo patterns are incomplete (missing: {missing:?}, unknown: {unknown:?})"
        ));
    }
    Ok(())
}

/// Convert the types of all block arguments nested inside `op`.
///
/// Returns the number of arguments whose type changed.
fn convert_block_arguments(op: &Shared<dyn Op>, converter: &dyn TypeConverter) -> Result<usize> {
    let mut changes = 0;
    let regions = op.rd().regions();
    for region in regions {
        let blocks = region.rd().blocks();
        for block in blocks {
            let arguments = block.rd().arguments();
            for argument in arguments.iter() {
                let typ = argument.rd().typ();
                let converted = converter
                    .convert_type(&typ)
                    .with_context(|| format!("block argument {}", argument.rd()))?;
                if converted != typ {
                    argument.wr().set_type(converted);
                    changes += 1;
                }
            }
            let ops = block.rd().ops();
            for nested in ops.iter() {
                changes += convert_block_arguments(nested, converter)?;
            }
        }
    }
    Ok(changes)
}

/// Return an error for the first `stablehlo` operation inside `op`, if any.
fn check_legalized(op: &Shared<dyn Op>) -> Result<()> {
    let name = op.rd().name();
    if name.dialect() == "stablehlo" {
        return Err(anyhow::anyhow!("failed to legalize operation '{name}'"));
    }
    let ops = op.rd().ops();
    for nested in ops.iter() {
        check_legalized(nested)?;
    }
    Ok(())
}

/// Legalize all `stablehlo` operations to `mhlo`.
///
/// Fails if an operation remains in `stablehlo` after the rewrites, for
/// example because one of its attributes has no `mhlo` counterpart.
pub struct ConvertStablehloToMhlo;

impl Pass for ConvertStablehloToMhlo {
    const NAME: &'static str = "convert-stablehlo-to-mhlo";
    fn convert(op: Shared<dyn Op>) -> Result<RewriteResult> {
        let converter: Arc<dyn TypeConverter> = Arc::new(StablehloToMhloTypeConverter);
        let mut patterns = RewritePatternSet::new();
        populate_stablehlo_to_mhlo_patterns(&mut patterns, converter.clone())?;
        let result = apply_patterns(op.clone(), &patterns)?;
        let (root, has_changed) = match result {
            RewriteResult::Changed(changed) => (changed.op, true),
            RewriteResult::Unchanged => (op, false),
        };
        let argument_changes = convert_block_arguments(&root, converter.as_ref())?;
        debug!("Converted the type of {argument_changes} block arguments");
        check_legalized(&root)?;
        if has_changed || 0 < argument_changes {
            Ok(RewriteResult::Changed(ChangedOp::new(root)))
        } else {
            Ok(RewriteResult::Unchanged)
        }
    }
}
