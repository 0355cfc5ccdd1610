use serde::{Deserialize, Serialize};

/// Outcome of computing the next number for a counter id.
///
/// Returned by every protocol call. In deferred-commit mode it is not yet durable:
/// the caller carries `new_number` until it commits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reservation {
    /// Number stored before this reservation (or `initial - 1` for a new id).
    pub previous_number: i64,
    /// Number issued by this reservation.
    pub new_number: i64,
    /// `true` iff the id had no entry in the fetched map.
    pub created: bool,
}

#[cfg(test)]
mod tests {
    use super::Reservation;

    #[test]
    fn serializes_with_camel_case_fields() {
        let r = Reservation {
            previous_number: 49,
            new_number: 50,
            created: true,
        };

        let json = serde_json::to_string(&r).unwrap();
        assert!(json.contains("\"previousNumber\":49"));
        assert!(json.contains("\"newNumber\":50"));
        assert!(json.contains("\"created\":true"));
    }
}
