//! Decode policy shared by the responder variants
//!
//! * skipped targets are left alone;
//! * sinks receive the body verbatim;
//! * an empty body is "nothing to decode" and leaves the target untouched
//!   (204s, empty 4xx bodies); for JSON a whitespace-only body counts as
//!   empty too;
//! * a failed decode replaces the target with the raw body and reports the
//!   decode error.

use std::io::Write;
use std::sync::PoisonError;

use bytes::Bytes;
use serde::de::DeserializeOwned;

use super::target::{SharedSink, Target};
use crate::error::{self, Result};

#[inline]
fn is_blank_json(body: &[u8]) -> bool {
    body.iter().all(u8::is_ascii_whitespace)
}

/// Decode `body` into `target` with the given codec
pub(crate) fn decode_with<T, D>(target: &mut Target<T>, body: &Bytes, decode: D) -> Result<()>
where
    D: FnOnce(&[u8]) -> Result<T>,
{
    match target {
        Target::Skip => Ok(()),
        Target::Sink(sink) => write_to_sink(sink, body),
        Target::Value(_) | Target::Raw(_) => {
            if body.is_empty() {
                return Ok(());
            }
            match decode(body) {
                Ok(value) => {
                    *target = Target::Value(value);
                    Ok(())
                }
                Err(e) => {
                    tracing::debug!(bytes = body.len(), "decode failed, keeping raw body: {e}");
                    *target = Target::Raw(body.clone());
                    Err(e)
                }
            }
        }
    }
}

/// JSON-decode `body` into `target`
pub(crate) fn decode_json<T: DeserializeOwned>(target: &mut Target<T>, body: &Bytes) -> Result<()> {
    if is_blank_json(body) && matches!(target, Target::Value(_) | Target::Raw(_)) {
        return Ok(());
    }
    decode_with(target, body, |bytes| {
        serde_json::from_slice(bytes).map_err(error::decode)
    })
}

/// Capture the whole body as the value of a byte target
pub(crate) fn capture_bytes(target: &mut Target<Bytes>, body: &Bytes) -> Result<()> {
    match target {
        Target::Skip => Ok(()),
        Target::Sink(sink) => write_to_sink(sink, body),
        Target::Value(_) | Target::Raw(_) => {
            *target = Target::Value(body.clone());
            Ok(())
        }
    }
}

fn write_to_sink(sink: &SharedSink, body: &Bytes) -> Result<()> {
    let mut writer = sink.lock().unwrap_or_else(PoisonError::into_inner);
    writer
        .write_all(body)
        .and_then(|()| writer.flush())
        .map_err(error::body)
}
