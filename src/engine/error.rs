use ulid::Ulid;

#[derive(Debug)]
pub enum EngineError {
    /// A supplied date cannot be parsed into a calendar date.
    InvalidDate(String),
    /// Violates the strict `check_out > check_in` invariant.
    CheckOutNotAfterCheckIn,
    /// Daily rate must be strictly positive.
    NonPositiveRate(f64),
    /// A mutating operation was attempted with no acting user identity.
    NotAuthenticated,
    NotFound(Ulid),
    /// A persistence row is missing or mangles a required field.
    MalformedRecord(&'static str),
    /// Opaque gateway failure; retry policy belongs to the gateway, not here.
    Store(String),
}

impl std::fmt::Display for EngineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EngineError::InvalidDate(raw) => write!(f, "invalid date: {raw}"),
            EngineError::CheckOutNotAfterCheckIn => {
                write!(f, "check-out date must be after check-in date")
            }
            EngineError::NonPositiveRate(rate) => {
                write!(f, "daily rate must be positive, got {rate}")
            }
            EngineError::NotAuthenticated => write!(f, "no authenticated user"),
            EngineError::NotFound(id) => write!(f, "booking not found: {id}"),
            EngineError::MalformedRecord(field) => {
                write!(f, "malformed booking record: bad or missing {field}")
            }
            EngineError::Store(e) => write!(f, "store error: {e}"),
        }
    }
}

impl std::error::Error for EngineError {}
