use crate::quantity::volume::CubicMeters;

quantity!(KilowattHours, "kWh");

/// Volume correction × calorific value ÷ 3.6, the standard UK gas conversion.
pub const KILOWATT_HOURS_PER_CUBIC_METER: f64 = 11.1868;

impl From<CubicMeters> for KilowattHours {
    fn from(volume: CubicMeters) -> Self {
        Self(volume.0 * KILOWATT_HOURS_PER_CUBIC_METER)
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;

    #[test]
    fn test_from_cubic_meters() {
        assert_abs_diff_eq!(KilowattHours::from(CubicMeters(2.0)).0, 22.3736);
    }
}
