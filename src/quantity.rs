#[macro_use]
mod macros;

pub mod energy;
pub mod money;
pub mod power;
pub mod rate;
pub mod volume;

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::{energy::KilowattHours, power::Watts};

    #[test]
    fn test_ordering() {
        assert!(Watts(1.0) < Watts(2.0));
        assert_eq!(Watts(3.0).max(Watts(2.0)), Watts(3.0));
        assert_eq!([Watts(2.0), Watts(1.0)].into_iter().min(), Some(Watts(1.0)));
    }

    #[test]
    fn test_sum() {
        let total: KilowattHours = [KilowattHours(0.25), KilowattHours(0.5)].into_iter().sum();
        assert_abs_diff_eq!(total.0, 0.75);
    }

    #[test]
    fn test_display_precision() {
        assert_eq!(format!("{:.1}", KilowattHours(1.26)), "1.3 kWh");
        assert_eq!(format!("{:?}", Watts(250.0)), "250.0W");
    }
}
