use std::sync::OnceLock;

use serde::Serialize;

static QUIET: OnceLock<bool> = OnceLock::new();

/// Suppress human status lines (`CTXSTORE_QUIET=1`)
pub fn is_quiet() -> bool {
    *QUIET.get_or_init(|| {
        std::env::var("CTXSTORE_QUIET")
            .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
            .unwrap_or(false)
    })
}

/// How command results are rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    Human,
    Json,
}

impl OutputMode {
    pub fn from_json_flag(json: bool) -> Self {
        if json { OutputMode::Json } else { OutputMode::Human }
    }

    pub fn is_human(self) -> bool {
        self == OutputMode::Human
    }
}

/// JSON envelope shared by every command
#[derive(Debug, Serialize)]
pub struct Envelope<'a, T: Serialize> {
    pub ok: bool,
    pub command: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

pub fn success_envelope<'a, T: Serialize>(command: &'a str, data: T) -> Envelope<'a, T> {
    Envelope { ok: true, command, data: Some(data), error: None }
}

pub fn error_envelope<'a>(command: &'a str, error: &anyhow::Error) -> Envelope<'a, ()> {
    Envelope { ok: false, command, data: None, error: Some(format!("{error:#}")) }
}

pub fn emit_success<T: Serialize>(command: &str, data: T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(&success_envelope(command, data))?);
    Ok(())
}

pub fn emit_error(command: &str, error: &anyhow::Error) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(&error_envelope(command, error))?);
    Ok(())
}
