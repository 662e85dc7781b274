mod market;
mod results;
mod returns;
mod weights;

pub use market::{CategoryValues, MarketTable, TickerValues};
pub use results::{LossTable, RiskMeasure, RiskResult, ScenarioSet};
pub use returns::{AssetList, Matrix, ReturnMatrix};
pub use weights::{WEIGHT_TOLERANCE, WeightVector};
