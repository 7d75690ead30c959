//! Debug dump of the raw response body.

use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use std::io;
use std::path::Path;

/// How the response body is written to disk.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DumpFormat {
    /// Re-indented with four spaces, key order preserved.
    #[default]
    Pretty,
    /// Exactly the bytes received.
    Verbatim,
}

/// Write `body` to `path`. Bodies that are not JSON are written verbatim
/// regardless of `format`.
pub fn write_json(path: &Path, body: &[u8], format: DumpFormat) -> io::Result<()> {
    let bytes = match format {
        DumpFormat::Verbatim => body.to_vec(),
        DumpFormat::Pretty => match serde_json::from_slice::<serde_json::Value>(body) {
            Ok(value) => pretty(&value)?,
            Err(e) => {
                tracing::debug!(path=%path.display(), error=%e, "dump.not_json_written_verbatim");
                body.to_vec()
            }
        },
    };
    std::fs::write(path, &bytes)?;
    tracing::debug!(path=%path.display(), bytes=bytes.len(), ?format, "dump.written");
    Ok(())
}

fn pretty(value: &serde_json::Value) -> io::Result<Vec<u8>> {
    let mut out = Vec::new();
    let mut ser = serde_json::Serializer::with_formatter(&mut out, PrettyFormatter::with_indent(b"    "));
    value.serialize(&mut ser).map_err(io::Error::other)?;
    Ok(out)
}
