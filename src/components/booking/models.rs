/// A new booking as submitted by a customer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookingRequest {
    pub provider_id: String,
    pub service_id: String,
    /// YYYY-MM-DD
    pub date: String,
    /// HH:MM
    pub start_time: String,
    pub customer_name: String,
    pub customer_phone: String,
    pub notes: Option<String>,
}

/// Move an existing appointment to another time, date or provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RescheduleRequest {
    pub appointment_id: String,
    /// Keep the current provider when None
    pub provider_id: Option<String>,
    /// Keep the current date when None
    pub date: Option<String>,
    pub start_time: String,
}
