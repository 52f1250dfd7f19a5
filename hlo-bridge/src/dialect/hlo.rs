//! Building blocks shared by the HLO dialects.
//!
//! Both `stablehlo` and `mhlo` define the same kinds of enum attributes and
//! attribute records, but each dialect owns its own copy so that the two
//! vocabularies can drift apart. The macros in this module generate those
//! copies from a list of canonical names.

use std::fmt::Display;
use std::fmt::Formatter;

/// An enum attribute whose symbols have a canonical textual name.
///
/// The name is what ties two dialects together: a symbol of one dialect
/// corresponds to the symbol of the other dialect with the same name.
pub trait EnumAttribute: Copy + Display + Sized + 'static {
    /// The attribute kind as printed (e.g., `comparison_direction`).
    const KIND: &'static str;
    /// All symbols in declaration order.
    const ALL: &'static [Self];
    /// The canonical name of the symbol (e.g., `EQ`).
    fn stringify(&self) -> &'static str;
    /// The symbol with the given canonical name, if any.
    fn symbolize(name: &str) -> Option<Self>;
}

/// Define an enum attribute together with its [EnumAttribute] codec.
///
/// ```ignore
/// hlo_enum!(
///     /// Comparison direction of `compare`.
///     name = ComparisonDirection,
///     kind = "comparison_direction",
///     variants = {
///         Eq => "EQ",
///         Ne => "NE",
///     },
/// );
/// ```
macro_rules! hlo_enum {
    (
        $(#[$meta:meta])*
        name = $name:ident,
        kind = $kind:literal,
        variants = { $($variant:ident => $text:literal),+ $(,)? } $(,)?
    ) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant),+
        }

        impl $crate::dialect::hlo::EnumAttribute for $name {
            const KIND: &'static str = $kind;
            const ALL: &'static [Self] = &[$($name::$variant),+];
            fn stringify(&self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
            fn symbolize(name: &str) -> Option<Self> {
                match name {
                    $($text => Some($name::$variant),)+
                    _ => None,
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                use $crate::dialect::hlo::EnumAttribute;
                write!(f, "{}", self.stringify())
            }
        }
    };
}

pub(crate) use hlo_enum;

/// Define an attribute record with named dimension fields.
///
/// The fields are listed in the order in which they are printed. Field names
/// that are Rust keywords get a different identifier but keep their printed
/// name (e.g., `typ => "type"`).
macro_rules! hlo_record {
    (
        $(#[$meta:meta])*
        name = $name:ident,
        mnemonic = $mnemonic:literal,
        fields = { $($field:ident: $typ:ty => $text:literal),+ $(,)? } $(,)?
    ) => {
        $(#[$meta])*
        #[derive(Clone, Debug, Default, PartialEq, Eq)]
        pub struct $name {
            $(pub $field: $typ),+
        }

        impl $name {
            pub const MNEMONIC: &'static str = $mnemonic;
            /// Printed field names with their values in print order.
            pub fn fields(&self) -> Vec<(&'static str, $crate::dialect::hlo::DimensionField)> {
                vec![$(($text, $crate::dialect::hlo::DimensionField::from(self.$field.clone()))),+]
            }
        }
    };
}

pub(crate) use hlo_record;

/// Define the attribute records and the attribute sum type of a dialect.
///
/// The enum attributes (`ComparisonDirection` and friends) have to be defined
/// with [hlo_enum] in the same module first, since their symbols differ per
/// dialect. The records have the same fields in both dialects.
macro_rules! hlo_attrs {
    (name = $name:ident, dialect = $dialect:literal $(,)?) => {
        $crate::dialect::hlo::hlo_record!(
            /// Identifies a channel for `send`, `recv` and the collectives.
            name = ChannelHandle,
            mnemonic = "channel_handle",
            fields = {
                handle: i64 => "handle",
                typ: i64 => "type",
            },
        );

        $crate::dialect::hlo::hlo_record!(
            name = ConvDimensionNumbers,
            mnemonic = "conv",
            fields = {
                input_batch_dimension: i64 => "input_batch_dimension",
                input_feature_dimension: i64 => "input_feature_dimension",
                input_spatial_dimensions: Vec<i64> => "input_spatial_dimensions",
                kernel_input_feature_dimension: i64 => "kernel_input_feature_dimension",
                kernel_output_feature_dimension: i64 => "kernel_output_feature_dimension",
                kernel_spatial_dimensions: Vec<i64> => "kernel_spatial_dimensions",
                output_batch_dimension: i64 => "output_batch_dimension",
                output_feature_dimension: i64 => "output_feature_dimension",
                output_spatial_dimensions: Vec<i64> => "output_spatial_dimensions",
            },
        );

        $crate::dialect::hlo::hlo_record!(
            name = DotDimensionNumbers,
            mnemonic = "dot",
            fields = {
                lhs_batching_dimensions: Vec<i64> => "lhs_batching_dimensions",
                rhs_batching_dimensions: Vec<i64> => "rhs_batching_dimensions",
                lhs_contracting_dimensions: Vec<i64> => "lhs_contracting_dimensions",
                rhs_contracting_dimensions: Vec<i64> => "rhs_contracting_dimensions",
            },
        );

        $crate::dialect::hlo::hlo_record!(
            name = GatherDimensionNumbers,
            mnemonic = "gather",
            fields = {
                offset_dims: Vec<i64> => "offset_dims",
                collapsed_slice_dims: Vec<i64> => "collapsed_slice_dims",
                start_index_map: Vec<i64> => "start_index_map",
                index_vector_dim: i64 => "index_vector_dim",
            },
        );

        $crate::dialect::hlo::hlo_record!(
            name = ScatterDimensionNumbers,
            mnemonic = "scatter",
            fields = {
                update_window_dims: Vec<i64> => "update_window_dims",
                inserted_window_dims: Vec<i64> => "inserted_window_dims",
                scatter_dims_to_operand_dims: Vec<i64> => "scatter_dims_to_operand_dims",
                index_vector_dim: i64 => "index_vector_dim",
            },
        );

        /// Bounds of the dynamic dimensions of a tensor.
        ///
        #[doc = concat!(
            "Used as tensor encoding (e.g., `tensor<?xf32, #",
            $dialect,
            ".type_extensions<bounds = [4]>>`)."
        )]
        #[derive(Clone, Debug, Default, PartialEq, Eq)]
        pub struct TypeExtensions {
            pub bounds: Vec<Option<i64>>,
        }

        impl std::fmt::Display for TypeExtensions {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "#{}.type_extensions<bounds = ", $dialect)?;
                $crate::dialect::hlo::display_bounds(f, &self.bounds)?;
                write!(f, ">")
            }
        }

        #[doc = concat!("The attributes of the `", $dialect, "` dialect.")]
        #[derive(Clone, Debug, PartialEq)]
        pub enum $name {
            ChannelHandle(ChannelHandle),
            ComparisonDirection(ComparisonDirection),
            ComparisonType(ComparisonType),
            ConvDimensionNumbers(ConvDimensionNumbers),
            CustomCallApiVersion(CustomCallApiVersion),
            DotDimensionNumbers(DotDimensionNumbers),
            FftType(FftType),
            GatherDimensionNumbers(GatherDimensionNumbers),
            Precision(Precision),
            RngAlgorithm(RngAlgorithm),
            RngDistribution(RngDistribution),
            ScatterDimensionNumbers(ScatterDimensionNumbers),
            Transpose(Transpose),
            TypeExtensions(TypeExtensions),
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                use $crate::dialect::hlo::display_enum;
                use $crate::dialect::hlo::display_record;
                let dialect = $dialect;
                match self {
                    $name::ChannelHandle(attr) => {
                        display_record(f, dialect, ChannelHandle::MNEMONIC, &attr.fields())
                    }
                    $name::ComparisonDirection(attr) => display_enum(f, dialect, attr),
                    $name::ComparisonType(attr) => display_enum(f, dialect, attr),
                    $name::ConvDimensionNumbers(attr) => {
                        display_record(f, dialect, ConvDimensionNumbers::MNEMONIC, &attr.fields())
                    }
                    $name::CustomCallApiVersion(attr) => display_enum(f, dialect, attr),
                    $name::DotDimensionNumbers(attr) => {
                        display_record(f, dialect, DotDimensionNumbers::MNEMONIC, &attr.fields())
                    }
                    $name::FftType(attr) => display_enum(f, dialect, attr),
                    $name::GatherDimensionNumbers(attr) => {
                        display_record(f, dialect, GatherDimensionNumbers::MNEMONIC, &attr.fields())
                    }
                    $name::Precision(attr) => display_enum(f, dialect, attr),
                    $name::RngAlgorithm(attr) => display_enum(f, dialect, attr),
                    $name::RngDistribution(attr) => display_enum(f, dialect, attr),
                    $name::ScatterDimensionNumbers(attr) => display_record(
                        f,
                        dialect,
                        ScatterDimensionNumbers::MNEMONIC,
                        &attr.fields(),
                    ),
                    $name::Transpose(attr) => display_enum(f, dialect, attr),
                    $name::TypeExtensions(attr) => write!(f, "{attr}"),
                }
            }
        }
    };
}

pub(crate) use hlo_attrs;

/// The number of regions that an operation kind carries.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RegionArity {
    Fixed(usize),
    /// Any number of regions; the count is given when the op is built.
    Variadic,
}

impl RegionArity {
    pub fn accepts(&self, num_regions: usize) -> bool {
        match self {
            RegionArity::Fixed(n) => *n == num_regions,
            RegionArity::Variadic => true,
        }
    }
}

impl Display for RegionArity {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            RegionArity::Fixed(n) => write!(f, "{n}"),
            RegionArity::Variadic => write!(f, "any number of"),
        }
    }
}

/// Invoke `$callback!` with every HLO operation kind.
///
/// The callback receives the extra arguments between brackets followed by one
/// entry per kind: `Variant => "mnemonic", arity;` where the arity is
/// `Fixed(n)` or `Variadic`. Both dialects and the translation between them
/// are generated from this single list, so a kind cannot be added to one of
/// them and forgotten in the others.
macro_rules! hlo_ops {
    ($callback:ident $(, $arg:tt)* $(,)?) => {
        $callback! {
            [$($arg),*]
            Abs => "abs", Fixed(0);
            Add => "add", Fixed(0);
            AfterAll => "after_all", Fixed(0);
            AllGather => "all_gather", Fixed(0);
            AllReduce => "all_reduce", Fixed(1);
            AllToAll => "all_to_all", Fixed(0);
            And => "and", Fixed(0);
            Atan2 => "atan2", Fixed(0);
            BatchNormGrad => "batch_norm_grad", Fixed(0);
            BatchNormInference => "batch_norm_inference", Fixed(0);
            BatchNormTraining => "batch_norm_training", Fixed(0);
            BitcastConvert => "bitcast_convert", Fixed(0);
            Broadcast => "broadcast", Fixed(0);
            BroadcastInDim => "broadcast_in_dim", Fixed(0);
            Case => "case", Variadic;
            Cbrt => "cbrt", Fixed(0);
            Ceil => "ceil", Fixed(0);
            Cholesky => "cholesky", Fixed(0);
            Clamp => "clamp", Fixed(0);
            CountLeadingZeros => "count_leading_zeros", Fixed(0);
            CollectivePermute => "collective_permute", Fixed(0);
            Compare => "compare", Fixed(0);
            Complex => "complex", Fixed(0);
            ComputeReshapeShape => "compute_reshape_shape", Fixed(0);
            Concatenate => "concatenate", Fixed(0);
            Constant => "constant", Fixed(0);
            Convert => "convert", Fixed(0);
            Convolution => "convolution", Fixed(0);
            Cosine => "cosine", Fixed(0);
            CreateToken => "create_token", Fixed(0);
            CrossReplicaSum => "cross-replica-sum", Fixed(0);
            CstrReshapable => "cstr_reshapable", Fixed(0);
            CustomCall => "custom_call", Fixed(0);
            Divide => "divide", Fixed(0);
            Dot => "dot", Fixed(0);
            DotGeneral => "dot_general", Fixed(0);
            DynamicBroadcastInDim => "dynamic_broadcast_in_dim", Fixed(0);
            DynamicConv => "dynamic_conv", Fixed(0);
            DynamicGather => "dynamic_gather", Fixed(0);
            DynamicIota => "dynamic_iota", Fixed(0);
            DynamicPad => "dynamic_pad", Fixed(0);
            DynamicReshape => "dynamic_reshape", Fixed(0);
            DynamicSlice => "dynamic_slice", Fixed(0);
            DynamicUpdateSlice => "dynamic_update_slice", Fixed(0);
            Einsum => "einsum", Fixed(0);
            Exponential => "exponential", Fixed(0);
            ExponentialMinusOne => "exponential_minus_one", Fixed(0);
            Fft => "fft", Fixed(0);
            Floor => "floor", Fixed(0);
            Gather => "gather", Fixed(0);
            GetDimensionSize => "get_dimension_size", Fixed(0);
            GetTupleElement => "get_tuple_element", Fixed(0);
            If => "if", Fixed(2);
            Imag => "imag", Fixed(0);
            Infeed => "infeed", Fixed(0);
            Iota => "iota", Fixed(0);
            IsFinite => "is_finite", Fixed(0);
            Log => "log", Fixed(0);
            LogPlusOne => "log_plus_one", Fixed(0);
            Logistic => "logistic", Fixed(0);
            Map => "map", Fixed(1);
            Maximum => "maximum", Fixed(0);
            Minimum => "minimum", Fixed(0);
            Multiply => "multiply", Fixed(0);
            Negate => "negate", Fixed(0);
            Not => "not", Fixed(0);
            OptimizationBarrier => "optimization_barrier", Fixed(0);
            Or => "or", Fixed(0);
            Outfeed => "outfeed", Fixed(0);
            Pad => "pad", Fixed(0);
            Popcnt => "popcnt", Fixed(0);
            Power => "power", Fixed(0);
            Real => "real", Fixed(0);
            RealDynamicSlice => "real_dynamic_slice", Fixed(0);
            Recv => "recv", Fixed(0);
            Reduce => "reduce", Fixed(1);
            ReducePrecision => "reduce_precision", Fixed(0);
            ReduceScatter => "reduce_scatter", Fixed(1);
            ReduceWindow => "reduce_window", Fixed(1);
            Remainder => "remainder", Fixed(0);
            ReplicaId => "replica_id", Fixed(0);
            Reshape => "reshape", Fixed(0);
            Return => "return", Fixed(0);
            Reverse => "reverse", Fixed(0);
            Rng => "rng", Fixed(0);
            RngBitGenerator => "rng_bit_generator", Fixed(0);
            RoundNearestAfz => "round_nearest_afz", Fixed(0);
            Rsqrt => "rsqrt", Fixed(0);
            Scatter => "scatter", Fixed(1);
            Select => "select", Fixed(0);
            SelectAndScatter => "select_and_scatter", Fixed(2);
            Send => "send", Fixed(0);
            SetDimensionSize => "set_dimension_size", Fixed(0);
            ShiftLeft => "shift_left", Fixed(0);
            ShiftRightArithmetic => "shift_right_arithmetic", Fixed(0);
            ShiftRightLogical => "shift_right_logical", Fixed(0);
            Sign => "sign", Fixed(0);
            Sine => "sine", Fixed(0);
            Slice => "slice", Fixed(0);
            Sort => "sort", Fixed(1);
            Sqrt => "sqrt", Fixed(0);
            Subtract => "subtract", Fixed(0);
            Tanh => "tanh", Fixed(0);
            TorchIndexSelect => "torch_index_select", Fixed(0);
            Trace => "trace", Fixed(0);
            Transpose => "transpose", Fixed(0);
            TriangularSolve => "triangular_solve", Fixed(0);
            Tuple => "tuple", Fixed(0);
            UnaryEinsum => "unary_einsum", Fixed(0);
            UniformDequantize => "uniform_dequantize", Fixed(0);
            UniformQuantize => "uniform_quantize", Fixed(0);
            While => "while", Fixed(2);
            Xor => "xor", Fixed(0);
        }
    };
}

pub(crate) use hlo_ops;

/// Define an operation kind enum for a dialect.
///
/// Meant as callback of [hlo_ops] with the enum name and the dialect
/// namespace as arguments. Generates the enum with `ALL`, the full operation
/// name, the lookup by name and the region arity.
macro_rules! hlo_op_kinds {
    (
        [$name:ident, $dialect:literal]
        $($variant:ident => $mnemonic:literal, $arity:ident $(($n:literal))?;)+
    ) => {
        #[doc = concat!("Operation kinds of the `", $dialect, "` dialect.")]
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];
            /// The full operation name (e.g., `stablehlo.add`).
            pub fn name(&self) -> &'static str {
                match self {
                    $($name::$variant => concat!($dialect, ".", $mnemonic)),+
                }
            }
            pub fn from_name(name: &str) -> Option<Self> {
                $name::ALL.iter().find(|kind| kind.name() == name).copied()
            }
            pub fn regions(&self) -> $crate::dialect::hlo::RegionArity {
                match self {
                    $($name::$variant => $crate::dialect::hlo::RegionArity::$arity $(($n))?),+
                }
            }
            pub fn operation_name(&self) -> $crate::ir::OperationName {
                $crate::ir::OperationName::new(self.name().to_string())
            }
            /// The kind of `operation`.
            ///
            /// Fails if the name is not a kind of this dialect or if the
            /// number of regions does not fit the kind.
            pub fn of_operation(operation: &$crate::ir::Operation) -> anyhow::Result<Self> {
                let name = operation.name();
                let kind = match $name::from_name(&name.name()) {
                    Some(kind) => kind,
                    None => {
                        return Err(anyhow::anyhow!("unknown {} operation '{name}'", $dialect))
                    }
                };
                let num_regions = operation.regions().len();
                if !kind.regions().accepts(num_regions) {
                    return Err(anyhow::anyhow!(
                        "{kind} expects {} regions, got {num_regions}",
                        kind.regions()
                    ));
                }
                Ok(kind)
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.name())
            }
        }
    };
}

pub(crate) use hlo_op_kinds;

/// The value of one field of an attribute record.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DimensionField {
    Scalar(i64),
    List(Vec<i64>),
}

impl From<i64> for DimensionField {
    fn from(value: i64) -> Self {
        DimensionField::Scalar(value)
    }
}

impl From<Vec<i64>> for DimensionField {
    fn from(value: Vec<i64>) -> Self {
        DimensionField::List(value)
    }
}

impl Display for DimensionField {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            DimensionField::Scalar(value) => write!(f, "{value}"),
            DimensionField::List(values) => {
                let joined = values
                    .iter()
                    .map(|v| v.to_string())
                    .collect::<Vec<String>>()
                    .join(", ");
                write!(f, "[{joined}]")
            }
        }
    }
}

/// Print an enum attribute (e.g., `#stablehlo<comparison_direction EQ>`).
pub fn display_enum<E: EnumAttribute>(
    f: &mut Formatter<'_>,
    dialect: &str,
    value: &E,
) -> std::fmt::Result {
    write!(f, "#{dialect}<{} {}>", E::KIND, value.stringify())
}

/// Print an attribute record (e.g., `#mhlo.channel_handle<handle = 7, type = 1>`).
pub fn display_record(
    f: &mut Formatter<'_>,
    dialect: &str,
    mnemonic: &str,
    fields: &[(&'static str, DimensionField)],
) -> std::fmt::Result {
    let joined = fields
        .iter()
        .map(|(name, value)| format!("{name} = {value}"))
        .collect::<Vec<String>>()
        .join(", ");
    write!(f, "#{dialect}.{mnemonic}<{joined}>")
}

/// Print the bounds of a tensor encoding (e.g., `[4, ?]`).
pub fn display_bounds(f: &mut Formatter<'_>, bounds: &[Option<i64>]) -> std::fmt::Result {
    let joined = bounds
        .iter()
        .map(|bound| match bound {
            Some(bound) => bound.to_string(),
            None => "?".to_string(),
        })
        .collect::<Vec<String>>()
        .join(", ");
    write!(f, "[{joined}]")
}
