use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug)]
pub struct Health {
    pub status: &'static str,
}

/// `{"ok": bool, ...}` response body shared by the store routes.
/// The payload's fields are flattened next to `ok`.
#[derive(Serialize, Debug)]
pub struct Envelope<T: Serialize> {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<u16>,
    #[serde(flatten)]
    pub data: Option<T>,
}

impl<T: Serialize> Envelope<T> {
    pub fn ok(data: T) -> Self { Self { ok: true, error: None, code: None, data: Some(data) } }

    pub fn error(msg: impl Into<String>) -> Self { Self { ok: false, error: Some(msg.into()), code: None, data: None } }

    /// Error body carrying a stable numeric code next to the message.
    pub fn error_with_code(msg: impl Into<String>, code: Option<u16>) -> Self {
        Self { code, ..Self::error(msg) }
    }
}

impl Envelope<()> {
    pub fn empty() -> Self { Self { ok: true, error: None, code: None, data: None } }
}
