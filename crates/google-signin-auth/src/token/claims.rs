//! Introspection results.

use std::fmt;

use serde_json::{Map, Value};

/// Maximum nesting depth accepted in an introspection response.
pub const MAX_RESPONSE_DEPTH: usize = 16;

/// Claims returned by the introspection endpoint for a token issued to this
/// application.
///
/// `sub` and `aud` are always strings, even when the provider encodes them
/// as (possibly very large) numbers.
#[derive(Debug, Clone, PartialEq)]
pub struct TokenIntrospectionResult {
    sub: String,
    aud: String,
    claims: Map<String, Value>,
}

impl TokenIntrospectionResult {
    /// Builds a result from decoded claims, coercing `sub` and `aud` to
    /// strings in the claim map as well.
    #[must_use]
    pub fn from_claims(mut claims: Map<String, Value>) -> Self {
        let sub = claim_as_string(claims.get("sub"));
        let aud = claim_as_string(claims.get("aud"));
        claims.insert("sub".to_string(), Value::String(sub.clone()));
        claims.insert("aud".to_string(), Value::String(aud.clone()));
        Self { sub, aud, claims }
    }

    /// Subject: the user's stable identifier at the provider.
    #[must_use]
    pub fn sub(&self) -> &str {
        &self.sub
    }

    /// Audience: the client the token was issued to.
    #[must_use]
    pub fn aud(&self) -> &str {
        &self.aud
    }

    /// All claims, with `sub` and `aud` coerced.
    #[must_use]
    pub fn claims(&self) -> &Map<String, Value> {
        &self.claims
    }

    /// Returns a raw claim.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.claims.get(name)
    }

    /// Returns a scalar claim as text. Missing or non-scalar claims are `None`.
    #[must_use]
    pub fn get_str(&self, name: &str) -> Option<String> {
        match self.claims.get(name)? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }

    /// Email claim, if granted.
    #[must_use]
    pub fn email(&self) -> Option<String> {
        self.get_str("email")
    }

    /// Scope claim split into individual scopes.
    #[must_use]
    pub fn scopes(&self) -> Vec<String> {
        self.get_str("scope")
            .map(|s| s.split_whitespace().map(String::from).collect())
            .unwrap_or_default()
    }
}

/// Coerces a claim to a string without going through floating point.
///
/// Numbers keep their exact decimal text; missing and null claims become
/// the empty string.
pub(crate) fn claim_as_string(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        Some(Value::Array(_) | Value::Object(_)) | Some(Value::Null) | None => String::new(),
    }
}

/// Decodes an introspection body into a claim map.
///
/// Large integers are preserved textually (`arbitrary_precision`).
pub(crate) fn decode_claims(body: &str) -> Result<Map<String, Value>, String> {
    let value: Value = serde_json::from_str(body).map_err(|e| e.to_string())?;

    let depth = json_depth(&value);
    if depth > MAX_RESPONSE_DEPTH {
        return Err(format!(
            "nesting depth {depth} exceeds the limit of {MAX_RESPONSE_DEPTH}"
        ));
    }

    match value {
        Value::Object(map) => Ok(map),
        other => Err(format!("expected a JSON object, got {}", kind_of(&other))),
    }
}

fn json_depth(value: &Value) -> usize {
    match value {
        Value::Array(items) => 1 + items.iter().map(json_depth).max().unwrap_or(0),
        Value::Object(map) => 1 + map.values().map(json_depth).max().unwrap_or(0),
        _ => 0,
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Why an introspected token was not accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RejectionReason {
    /// The token was issued to a different client.
    AudienceMismatch {
        /// Configured client identifier.
        expected: String,
        /// `aud` claim of the token.
        actual: String,
    },
    /// The claims carry no subject to key an account on.
    MissingSubject,
    /// The body is not a JSON object within the nesting limit.
    UnreadableResponse {
        /// Decoder message.
        message: String,
    },
}

impl fmt::Display for RejectionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AudienceMismatch { expected, actual } => {
                write!(f, "audience mismatch: expected '{expected}', got '{actual}'")
            }
            Self::MissingSubject => write!(f, "subject claim is missing"),
            Self::UnreadableResponse { message } => {
                write!(f, "unreadable introspection response: {message}")
            }
        }
    }
}

/// Outcome of token introspection.
///
/// A rejection is a routine result for bad, stolen or expired tokens and is
/// not an error.
#[derive(Debug, Clone, PartialEq)]
pub enum Introspection {
    /// The token belongs to this application.
    Validated(TokenIntrospectionResult),
    /// The token was not accepted.
    Rejected(RejectionReason),
}

impl Introspection {
    /// Returns the claims of a validated token.
    #[must_use]
    pub fn into_validated(self) -> Option<TokenIntrospectionResult> {
        match self {
            Self::Validated(result) => Some(result),
            Self::Rejected(_) => None,
        }
    }

    /// Returns `true` for a validated token.
    #[must_use]
    pub fn is_validated(&self) -> bool {
        matches!(self, Self::Validated(_))
    }
}
