use thiserror::Error;

#[derive(Error, Debug)]
pub enum CareerError {
    /// A document or raw record has the wrong shape.
    #[error("Malformed data: {0}")]
    MalformedData(String),

    /// A normalized record still lacks a required key after defaults were applied.
    #[error("Missing required field '{field}' on {entity} record")]
    MissingField { entity: &'static str, field: &'static str },

    #[error("Invalid team count: {found} (a league needs at least 2 teams)")]
    InvalidTeamCount { found: usize },

    /// Internal consistency check failed. This is a defect, not bad input.
    #[error("Simulation invariant violated: {0}")]
    SimulationInvariant(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Fixture not found: {0}")]
    FixtureNotFound(String),

    #[error("Fixture already played: {0}")]
    FixtureAlreadyPlayed(String),
}

impl CareerError {
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, CareerError::SimulationInvariant(_))
    }
}

impl From<serde_json::Error> for CareerError {
    fn from(err: serde_json::Error) -> Self {
        CareerError::MalformedData(err.to_string())
    }
}

impl From<serde_yaml::Error> for CareerError {
    fn from(err: serde_yaml::Error) -> Self {
        CareerError::InvalidConfig(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, CareerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invariant_errors_are_fatal() {
        assert!(!CareerError::SimulationInvariant("x".into()).is_recoverable());
        assert!(CareerError::InvalidTeamCount { found: 1 }.is_recoverable());
        assert!(CareerError::MissingField { entity: "fighter", field: "hp" }.is_recoverable());
    }

    #[test]
    fn test_json_errors_become_malformed_data() {
        let err: CareerError = serde_json::from_str::<u32>("\"seven\"").unwrap_err().into();
        assert!(matches!(err, CareerError::MalformedData(_)));
    }

    #[test]
    fn test_missing_field_message() {
        let err = CareerError::MissingField { entity: "fixture", field: "home_id" };
        assert_eq!(err.to_string(), "Missing required field 'home_id' on fixture record");
    }
}
