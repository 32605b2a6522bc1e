use crate::client::JobApi;
use anyhow::{Context, Result};
use clap::builder::{
    styling::{AnsiColor, Effects},
    Styles,
};
use serde::Serialize;
use std::io::Write;

/// Writes `value` as JSON indented by four spaces, followed by a newline.
///
/// # Examples
///
/// ```
/// let mut out = Vec::new();
/// gxjob::utils::write_json(&mut out, &serde_json::json!({"id": "a"})).unwrap();
/// assert_eq!(String::from_utf8(out).unwrap(), "{\n    \"id\": \"a\"\n}\n");
/// ```
pub fn write_json<T: Serialize + ?Sized>(out: &mut dyn Write, value: &T) -> Result<()> {
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut *out, formatter);
    value
        .serialize(&mut ser)
        .context("Failed to serialize JSON output")?;
    writeln!(out)?;
    Ok(())
}

/// Resolves a history given either its ID or its name.
///
/// The string is tried as an ID first. If the server does not know it, the
/// first history with exactly that name wins. `None` when neither matches.
pub async fn find_history<A: JobApi>(api: &A, name_or_id: &str) -> Result<Option<String>> {
    if let Some(history) = api.show_history(name_or_id).await? {
        return Ok(Some(history.id));
    }
    tracing::debug!("No history with ID {}, searching by name", name_or_id);
    let histories = api.find_histories(name_or_id).await?;
    Ok(histories
        .into_iter()
        .find(|h| h.name == name_or_id)
        .map(|h| h.id))
}

pub const STYLES: Styles = Styles::styled()
    .header(AnsiColor::Green.on_default().effects(Effects::BOLD))
    .usage(AnsiColor::Green.on_default().effects(Effects::BOLD))
    .literal(AnsiColor::Cyan.on_default().effects(Effects::BOLD))
    .placeholder(AnsiColor::Cyan.on_default());
