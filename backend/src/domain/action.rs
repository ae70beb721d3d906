//! Broker envelopes: the tagged inbound request and the uniform response.
//!
//! ```text
//! {"action":"auth","auth":{"email":"ada@example.com","password":"secret"}}
//! {"action":"log","log":{"name":"event","data":"free text"}}
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Credential payload forwarded to the credential capability.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthPayload {
    pub email: String,
    pub password: String,
}

impl fmt::Debug for AuthPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthPayload")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Free-form entry forwarded to the log capability.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogPayload {
    pub name: String,
    pub data: String,
}

/// Raw inbound envelope as it appears on the wire.
///
/// `action` is the sole routing key; convert with [`ActionEnvelope::into_action`]
/// to obtain the closed [`Action`] set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionEnvelope {
    pub action: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth: Option<AuthPayload>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log: Option<LogPayload>,
}

/// Reasons an inbound body cannot become an [`Action`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ActionDecodeError {
    /// Body is not a JSON object of the expected shape.
    #[error("malformed request body: {message}")]
    Malformed { message: String },
    /// Discriminator names no known capability.
    #[error("unknown action")]
    UnknownAction { action: String },
    /// Discriminator is known but its payload is absent.
    #[error("missing {action} payload")]
    MissingPayload { action: &'static str },
}

/// Closed set of routable actions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Check an email/password pair against the credential capability.
    Auth(AuthPayload),
    /// Append an entry to the log capability.
    Log(LogPayload),
}

impl Action {
    /// Discriminator value naming this action on the wire.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Auth(_) => "auth",
            Self::Log(_) => "log",
        }
    }

    /// Decode a request body into an action.
    ///
    /// # Examples
    /// ```
    /// use authbroker::domain::{Action, ActionDecodeError};
    ///
    /// let action = Action::decode(br#"{"action":"log","log":{"name":"a","data":"b"}}"#)
    ///     .expect("valid log action");
    /// assert_eq!(action.name(), "log");
    ///
    /// let err = Action::decode(br#"{"action":"bogus"}"#).expect_err("unknown");
    /// assert_eq!(err.to_string(), "unknown action");
    /// ```
    pub fn decode(body: &[u8]) -> Result<Self, ActionDecodeError> {
        let envelope: ActionEnvelope =
            serde_json::from_slice(body).map_err(|err| ActionDecodeError::Malformed {
                message: err.to_string(),
            })?;
        envelope.into_action()
    }
}

impl ActionEnvelope {
    /// Resolve the discriminator into the closed [`Action`] set.
    pub fn into_action(self) -> Result<Action, ActionDecodeError> {
        match self.action.as_str() {
            "auth" => self
                .auth
                .map(Action::Auth)
                .ok_or(ActionDecodeError::MissingPayload { action: "auth" }),
            "log" => self
                .log
                .map(Action::Log)
                .ok_or(ActionDecodeError::MissingPayload { action: "log" }),
            _ => Err(ActionDecodeError::UnknownAction {
                action: self.action,
            }),
        }
    }
}

/// Uniform outward result.
///
/// ## Invariants
/// - `error == true` implies `data.is_none()` once [`Self::normalized`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseEnvelope {
    pub error: bool,
    #[serde(default)]
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl ResponseEnvelope {
    /// Successful result with optional data.
    pub fn success(message: impl Into<String>, data: Option<Value>) -> Self {
        Self {
            error: false,
            message: message.into(),
            data,
        }
    }

    /// Failed result; never carries data.
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            error: true,
            message: message.into(),
            data: None,
        }
    }

    /// Enforce the error/data invariant on an envelope received from elsewhere.
    #[must_use]
    pub fn normalized(mut self) -> Self {
        if self.error {
            self.data = None;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[test]
    fn decodes_auth_action() {
        let action = Action::decode(
            br#"{"action":"auth","auth":{"email":"ada@example.com","password":"pw"}}"#,
        )
        .expect("auth action");
        assert_eq!(
            action,
            Action::Auth(AuthPayload {
                email: "ada@example.com".to_owned(),
                password: "pw".to_owned(),
            })
        );
    }

    #[rstest]
    #[case(br#"{"action":"bogus"}"#.as_slice())]
    #[case(br#"{"action":"bogus","auth":{"email":"a@b","password":"p"}}"#.as_slice())]
    #[case(br#"{"action":"bogus","log":{"name":"n","data":"d"}}"#.as_slice())]
    #[case(br#"{"action":"AUTH","auth":{"email":"a@b","password":"p"}}"#.as_slice())]
    #[case(br#"{"action":""}"#.as_slice())]
    fn unknown_actions_are_rejected_regardless_of_payload(#[case] body: &[u8]) {
        let err = Action::decode(body).expect_err("unknown action");
        assert!(matches!(err, ActionDecodeError::UnknownAction { .. }));
        assert_eq!(err.to_string(), "unknown action");
    }

    #[rstest]
    #[case(b"".as_slice())]
    #[case(b"not json".as_slice())]
    #[case(br#"{"auth":{"email":"a@b","password":"p"}}"#.as_slice())]
    #[case(br#""auth""#.as_slice())]
    fn malformed_bodies_are_rejected(#[case] body: &[u8]) {
        let err = Action::decode(body).expect_err("malformed");
        assert!(matches!(err, ActionDecodeError::Malformed { .. }));
    }

    #[rstest]
    #[case(br#"{"action":"auth"}"#.as_slice(), "auth")]
    #[case(br#"{"action":"log","auth":{"email":"a@b","password":"p"}}"#.as_slice(), "log")]
    fn known_action_without_payload_is_rejected(#[case] body: &[u8], #[case] name: &str) {
        let err = Action::decode(body).expect_err("missing payload");
        assert_eq!(err.to_string(), format!("missing {name} payload"));
    }

    #[test]
    fn auth_payload_debug_hides_password() {
        let payload = AuthPayload {
            email: "ada@example.com".to_owned(),
            password: "hunter22".to_owned(),
        };
        assert!(!format!("{payload:?}").contains("hunter22"));
    }

    #[test]
    fn normalized_drops_data_on_error() {
        let envelope = ResponseEnvelope {
            error: true,
            message: "nope".to_owned(),
            data: Some(json!({"leak": true})),
        }
        .normalized();
        assert!(envelope.data.is_none());
    }

    #[test]
    fn success_envelope_omits_absent_data() {
        let value = serde_json::to_value(ResponseEnvelope::success("logged", None)).expect("json");
        assert_eq!(value, json!({"error": false, "message": "logged"}));
    }
}
