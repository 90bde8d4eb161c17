/// Device registered for smart charging (an EV, a charger, or a battery).
#[must_use]
#[derive(Clone, Debug)]
pub struct SmartDevice {
    pub device_id: String,
    pub provider: String,
    pub status: String,
}
