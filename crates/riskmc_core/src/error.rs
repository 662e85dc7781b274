use thiserror::Error;

/// Errors raised while selecting data, simulating scenarios or measuring risk.
///
/// Every variant aborts the operation that produced it. Failing to converge
/// in the ERC optimizer is not an error and never shows up here.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    /// The market table has no dates at all
    #[error("market data is empty")]
    DataEmpty,

    /// At least one date does not carry the requested category
    #[error("category {0:?} not found in market data")]
    CategoryNotFound(String),

    /// Every date was dropped because of missing observations
    #[error("category {0:?} has no usable dates after dropping missing observations")]
    EmptyCategory(String),

    /// A prepared return matrix is empty, misshaped or holds non-finite cells
    #[error("invalid return matrix: {0}")]
    InvalidReturns(String),

    /// Scenarios or weights were requested before a return matrix was built
    #[error("no category selected, call select_category first")]
    NoCategorySelected,

    /// Wrong length, negative entries, or a sum away from 1
    #[error("invalid weights: {0}")]
    InvalidWeights(String),

    #[error("risk contribution size mismatch: expected {expected} assets, got {actual}")]
    RiskContributionSizeMismatch { expected: usize, actual: usize },

    #[error("unknown risk measure {0:?}")]
    UnknownRiskMeasure(String),

    #[error("unknown simulation method {0:?}")]
    UnknownSimulationMethod(String),

    /// A scalar configuration value is outside its admissible range
    #[error("invalid {name} ({value}): {reason}")]
    InvalidParameter {
        name: &'static str,
        value: f64,
        reason: &'static str,
    },

    /// A risk measure was requested on an empty scenario set
    #[error("scenario set is empty, run a simulation first")]
    EmptyScenarioSet,
}

impl EngineError {
    pub(crate) fn invalid_parameter(name: &'static str, value: f64, reason: &'static str) -> Self {
        EngineError::InvalidParameter {
            name,
            value,
            reason,
        }
    }
}

pub type Result<T> = std::result::Result<T, EngineError>;
