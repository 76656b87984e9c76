/// Score assigned to a missing, non-finite or non-positive attribute.
pub const DEFAULT_SCORE: f64 = 50.0;

/// Upper bound of every per-metric score.
pub const MAX_METRIC_SCORE: f64 = 100.0;

/// Upper bound of a record's total score (five metrics at 100 each).
pub const MAX_TOTAL_SCORE: f64 = 500.0;

/// Flat bonus added once to every curated record before ranking.
pub const CURATED_BONUS: f64 = 50.0;

/// Below this distance (light-years) proximity is rewarded.
pub const DISTANCE_NEAR_LY: f64 = 100.0;

/// Distance at which the proximity branch saturates at 100.
pub const DISTANCE_NEAREST_LY: f64 = 1.0;

/// Above this distance (light-years) the extreme-distance branch applies.
pub const DISTANCE_FAR_LY: f64 = 1e9;

/// Approximate radius of the observable universe in light-years.
pub const DISTANCE_EDGE_LY: f64 = 1.4e10;

/// Points the proximity branch spends between 1 ly and the near threshold.
pub const PROXIMITY_SPAN: f64 = 50.0;

/// Ceiling of the generic distance band; the extreme branch starts here.
pub const FAR_BAND_FLOOR: f64 = 90.0;

/// Mass range in solar masses (planetary mass up to galaxy clusters).
pub const MASS_RANGE: (f64, f64) = (1e-5, 1e11);

/// Luminosity range in solar luminosities.
pub const LUMINOSITY_RANGE: (f64, f64) = (1e-4, 1e12);

/// Temperature range in kelvin.
pub const TEMPERATURE_RANGE: (f64, f64) = (10.0, 1e7);

/// Default number of records to select.
pub const DEFAULT_TARGET_COUNT: usize = 1000;

/// Default length of the report's top-N list.
pub const DEFAULT_TOP_N: usize = 10;

/// Slack added before flooring percentile boundaries so that
/// `1000 * 0.04` lands on 40 and not 39.
pub const BOUNDARY_EPSILON: f64 = 1e-9;
