use crate::dialect::hlo::hlo_attrs;
use crate::dialect::hlo::hlo_enum;

hlo_enum!(
    /// Which comparison `compare` performs.
    name = ComparisonDirection,
    kind = "comparison_direction",
    variants = {
        Eq => "EQ",
        Ne => "NE",
        Ge => "GE",
        Gt => "GT",
        Le => "LE",
        Lt => "LT",
    },
);

hlo_enum!(
    name = ComparisonType,
    kind = "comparison_type",
    variants = {
        NoType => "NOTYPE",
        Float => "FLOAT",
        TotalOrder => "TOTALORDER",
        Signed => "SIGNED",
        Unsigned => "UNSIGNED",
    },
);

hlo_enum!(
    /// Calling convention of the target of `custom_call`.
    name = CustomCallApiVersion,
    kind = "custom_call_api_version",
    variants = {
        ApiVersionUnspecified => "API_VERSION_UNSPECIFIED",
        ApiVersionOriginal => "API_VERSION_ORIGINAL",
        ApiVersionStatusReturning => "API_VERSION_STATUS_RETURNING",
        ApiVersionStatusReturningUnified => "API_VERSION_STATUS_RETURNING_UNIFIED",
        ApiVersionTypedFfi => "API_VERSION_TYPED_FFI",
    },
);

hlo_enum!(
    name = FftType,
    kind = "fft_type",
    variants = {
        Fft => "FFT",
        Ifft => "IFFT",
        Rfft => "RFFT",
        Irfft => "IRFFT",
    },
);

hlo_enum!(
    /// Precision for operations like `dot_general` and `convolution`.
    name = Precision,
    kind = "precision",
    variants = {
        Default => "DEFAULT",
        High => "HIGH",
        Highest => "HIGHEST",
    },
);

hlo_enum!(
    name = RngAlgorithm,
    kind = "rng_algorithm",
    variants = {
        Default => "DEFAULT",
        ThreeFry => "THREE_FRY",
        Philox => "PHILOX",
    },
);

hlo_enum!(
    name = RngDistribution,
    kind = "rng_distribution",
    variants = {
        Uniform => "UNIFORM",
        Normal => "NORMAL",
    },
);

hlo_enum!(
    /// Transpose type of `triangular_solve`.
    name = Transpose,
    kind = "transpose",
    variants = {
        TransposeInvalid => "TRANSPOSE_INVALID",
        NoTranspose => "NO_TRANSPOSE",
        Transpose => "TRANSPOSE",
        Adjoint => "ADJOINT",
    },
);

hlo_attrs!(name = StablehloAttr, dialect = "stablehlo");
