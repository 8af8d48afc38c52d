use thiserror::Error;

/// `ParameterError` enumerates the ways a distribution parameter can fail
/// validation.  Matrix conditions are checked in a fixed order (shape,
/// generator, observable rates, row balance, initial vector) and the first
/// failing condition is reported.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParameterError {
    /// A matrix was supplied with no rows or no columns
    #[error("The {matrix} matrix is empty")]
    EmptyMatrix { matrix: &'static str },

    /// A matrix was supplied with rows of differing lengths
    #[error("The rows of the {matrix} matrix differ in length")]
    RaggedMatrix { matrix: &'static str },

    /// A matrix that must be square is not
    #[error("The {matrix} matrix must be square, but is {rows}x{cols}")]
    NotSquare {
        matrix: &'static str,
        rows: usize,
        cols: usize,
    },

    /// Two matrices or vectors that must agree in dimension do not
    #[error("Expected dimension {expected}, but found {found}")]
    DimensionMismatch { expected: usize, found: usize },

    #[error("Diagonal entry {row} of the generator must be strictly negative, but is {value}")]
    NonNegativeDiagonal { row: usize, value: f64 },

    #[error("Off-diagonal entry ({row}, {col}) of the generator is negative ({value})")]
    NegativeOffDiagonal { row: usize, col: usize, value: f64 },

    #[error("Row {row} of the generator sums to {sum}, which exceeds the tolerance")]
    PositiveRowSum { row: usize, sum: f64 },

    #[error("Entry ({row}, {col}) of the observable rate matrix is negative ({value})")]
    NegativeObservableRate { row: usize, col: usize, value: f64 },

    /// Row sums of the hidden plus observable rates must vanish
    #[error("Row {row} of the combined generator sums to {sum}, not zero")]
    UnbalancedRowSum { row: usize, sum: f64 },

    #[error("Probability {index} is negative ({value})")]
    NegativeProbability { index: usize, value: f64 },

    #[error("The {name} probability must lie in [0, 1], but is {value}")]
    ProbabilityOutOfRange { name: &'static str, value: f64 },

    #[error("Probabilities sum to {sum}, not one")]
    ProbabilitiesNotNormalized { sum: f64 },

    #[error("The {name} parameter must be strictly positive, but is {value}")]
    NonPositive { name: &'static str, value: f64 },

    #[error("The {name} parameter must be finite, but is {value}")]
    NonFinite { name: &'static str, value: f64 },

    #[error("The range [{min}, {max}] is empty")]
    InvalidRange { min: f64, max: f64 },

    /// The generator could not be inverted
    #[error("The generator matrix is singular")]
    SingularMatrix,

    /// A persisted sampler phase does not exist in its process
    #[error("Phase {phase} is out of range for a process of dimension {dimension}")]
    PhaseOutOfRange { phase: usize, dimension: usize },

    #[error("The empirical table is empty")]
    EmptyTable,

    #[error("The empirical table has {values} values but {probabilities} probabilities")]
    LengthMismatch { values: usize, probabilities: usize },

    /// Rejection sampling failed to produce an admissible variate
    #[error("No admissible variate was drawn within {attempts} attempts")]
    RejectionLimitExceeded { attempts: usize },
}

/// `SimulationError` enumerates all possible errors returned by mapsim
#[derive(Error, Debug)]
pub enum SimulationError {
    /// Represents a distribution parameter that failed validation
    #[error("Invalid distribution parameter: {0}")]
    Parameter(#[from] ParameterError),

    /// Represents a query that the distribution family does not support
    #[error("The requested operation is not supported: {0}")]
    UnsupportedOperation(&'static str),

    /// Represents an invalid model state
    #[error("An invalid model state was encountered")]
    InvalidModelState,

    /// Represents an invalid state of event scheduling
    #[error("An invalid state was encountered, with respect to event scheduling")]
    EventSchedulingError,

    /// Represents an empty sample passed to output analysis
    #[error("Output analysis requires at least one point")]
    EmptySample,

    /// Represents a NaN or infinite point passed to output analysis
    #[error("Output analysis requires finite points")]
    NonFiniteSample,

    /// Represents a failed conversion to a float value
    #[error("Failed to convert to a float value")]
    FloatConvError,

    /// Transparent serde_json errors
    #[error(transparent)]
    JSONError(#[from] serde_json::error::Error),

    /// Transparent serde_yaml errors
    #[error(transparent)]
    YAMLError(#[from] serde_yaml::Error),

    /// Transparent Gamma distribution errors
    #[error(transparent)]
    GammaError(#[from] rand_distr::GammaError),

    /// Transparent Poisson distribution errors
    #[error(transparent)]
    PoissonError(#[from] rand_distr::PoissonError),
}
