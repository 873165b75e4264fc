//! The uniform `{success, ...}` result of every client operation

use serde::{Serialize, Serializer};

use crate::error::ClientError;

/// Either the payload of a successful call or the message of the failure
#[derive(Clone, Debug, PartialEq)]
pub enum Outcome<T> {
    Success(T),
    Failure { error: String },
}

impl<T> Outcome<T> {
    pub fn failure(error: impl ToString) -> Self {
        Outcome::Failure {
            error: error.to_string(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success(_))
    }

    /// `None` on failure
    pub fn payload(&self) -> Option<&T> {
        match self {
            Outcome::Success(payload) => Some(payload),
            Outcome::Failure { .. } => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Outcome::Success(_) => None,
            Outcome::Failure { error } => Some(error),
        }
    }

    pub fn into_result(self) -> Result<T, String> {
        match self {
            Outcome::Success(payload) => Ok(payload),
            Outcome::Failure { error } => Err(error),
        }
    }
}

impl<T> From<Result<T, ClientError>> for Outcome<T> {
    fn from(result: Result<T, ClientError>) -> Self {
        match result {
            Ok(payload) => Outcome::Success(payload),
            Err(err) => Outcome::failure(err),
        }
    }
}

/// Serializes as `{"success": true, <payload fields>}` or
/// `{"success": false, "error": <message>}`; payloads must be structs
impl<T: Serialize> Serialize for Outcome<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        #[derive(Serialize)]
        struct Wire<'a, T> {
            success: bool,
            #[serde(flatten)]
            payload: Option<&'a T>,
            #[serde(skip_serializing_if = "Option::is_none")]
            error: Option<&'a str>,
        }

        Wire {
            success: self.is_success(),
            payload: self.payload(),
            error: self.error(),
        }
        .serialize(serializer)
    }
}

/// `serialize_with` helper for keys, signatures and other `Display` types
pub(crate) fn as_display<T: std::fmt::Display, S: Serializer>(
    value: &T,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.collect_str(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Serialize)]
    struct Receipt {
        signature: &'static str,
    }

    #[test]
    fn success_flattens_payload() {
        let outcome = Outcome::Success(Receipt { signature: "abc" });
        assert_eq!(
            serde_json::to_value(&outcome).unwrap(),
            json!({"success": true, "signature": "abc"})
        );
    }

    #[test]
    fn failure_carries_message_only() {
        let outcome: Outcome<Receipt> = Outcome::failure("boom");
        assert_eq!(
            serde_json::to_value(&outcome).unwrap(),
            json!({"success": false, "error": "boom"})
        );
        assert!(outcome.payload().is_none());
        assert_eq!(outcome.error(), Some("boom"));
    }

    #[test]
    fn client_errors_keep_their_message() {
        let outcome: Outcome<()> = Err(ClientError::LockRecordNotFound).into();
        assert_eq!(outcome.into_result(), Err("No lock record found for this user".to_string()));
    }
}
