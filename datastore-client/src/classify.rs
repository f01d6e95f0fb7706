//! Response classification.

use datastore_transport::RawResponse;

/// Outcome class of an engine status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResponseClass {
    /// Any 2xx status.
    Success,
    /// Exactly 400.
    BadRequest,
    /// Exactly 404.
    NotFound,
    /// Everything else, including a missing status.
    Other,
}

impl ResponseClass {
    /// Classify a status code.
    pub fn from_status(status: Option<i64>) -> Self {
        match status {
            Some(200..=299) => Self::Success,
            Some(400) => Self::BadRequest,
            Some(404) => Self::NotFound,
            _ => Self::Other,
        }
    }

    /// Classify a raw response.
    pub fn of(response: &RawResponse) -> Self {
        Self::from_status(response.status_code().map(i64::from))
    }

    /// Whether this is a 2xx outcome.
    pub fn is_success(self) -> bool {
        self == Self::Success
    }

    /// Whether this outcome is tolerated by an operation accepting the given classes.
    ///
    /// Success is always accepted.
    pub fn is_accepted_by(self, tolerated: &[ResponseClass]) -> bool {
        self.is_success() || tolerated.contains(&self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_range() {
        for status in [200, 201, 204, 299] {
            assert_eq!(ResponseClass::from_status(Some(status)), ResponseClass::Success);
        }
        assert_eq!(ResponseClass::from_status(Some(199)), ResponseClass::Other);
        assert_eq!(ResponseClass::from_status(Some(300)), ResponseClass::Other);
    }

    #[test]
    fn test_exact_client_errors() {
        assert_eq!(ResponseClass::from_status(Some(400)), ResponseClass::BadRequest);
        assert_eq!(ResponseClass::from_status(Some(404)), ResponseClass::NotFound);
        assert_eq!(ResponseClass::from_status(Some(401)), ResponseClass::Other);
        assert_eq!(ResponseClass::from_status(Some(409)), ResponseClass::Other);
    }

    #[test]
    fn test_failures_and_absent_status() {
        for status in [Some(0), Some(500), Some(503), Some(-1), Some(i64::MAX), None] {
            assert_eq!(ResponseClass::from_status(status), ResponseClass::Other);
        }
    }

    #[test]
    fn test_every_code_has_one_class() {
        for status in -1_000..=1_000 {
            let class = ResponseClass::from_status(Some(status));
            let expected = match status {
                200..=299 => ResponseClass::Success,
                400 => ResponseClass::BadRequest,
                404 => ResponseClass::NotFound,
                _ => ResponseClass::Other,
            };
            assert_eq!(class, expected, "status {status}");
        }
    }

    #[test]
    fn test_of_raw_response() {
        assert_eq!(ResponseClass::of(&RawResponse::new(Some(201), "")), ResponseClass::Success);
        assert_eq!(ResponseClass::of(&RawResponse::new(None, "")), ResponseClass::Other);
    }

    #[test]
    fn test_acceptance() {
        let tolerated = [ResponseClass::NotFound];
        assert!(ResponseClass::Success.is_accepted_by(&tolerated));
        assert!(ResponseClass::NotFound.is_accepted_by(&tolerated));
        assert!(!ResponseClass::BadRequest.is_accepted_by(&tolerated));
        assert!(!ResponseClass::Other.is_accepted_by(&[]));
    }
}
