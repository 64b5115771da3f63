//! Text export of decoded models.
//!
//! Three independent writers turn a loaded [`Model`](crate::Model) into the
//! intermediate text containers:
//!
//! - [`PimWriter`]: geometry (`.pim`)
//! - [`PitWriter`]: traits, i.e. looks and variants (`.pit`)
//! - [`PisWriter`]: skeleton (`.pis`)
//!
//! Floats are written as their IEEE-754 bit pattern (`&3f800000`) so values
//! survive the round trip exactly.

mod pim;
mod pis;
mod pit;

pub use pim::PimWriter;
pub use pis::PisWriter;
pub use pit::PitWriter;

use std::fmt;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

/// Tool identifier written into every header block.
pub const SOURCE: &str = concat!("prism ", env!("CARGO_PKG_VERSION"));

/// Line terminator.
pub(crate) const EOL: &str = "\n";

/// A float written as its bit pattern.
#[derive(Debug, Clone, Copy)]
pub struct Hex(pub f32);

impl fmt::Display for Hex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "&{:08x}", self.0.to_bits())
    }
}

/// Float components separated by two spaces.
#[derive(Debug, Clone, Copy)]
pub struct HexList<'a>(pub &'a [f32]);

impl fmt::Display for HexList<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, value) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("  ")?;
            }
            Hex(*value).fmt(f)?;
        }
        Ok(())
    }
}

/// Write the `Header { ... }` block shared by all containers.
pub(crate) fn write_header<W: Write>(
    writer: &mut W,
    format_version: u32,
    kind: &str,
    name: &str,
) -> io::Result<()> {
    write!(writer, "Header {{{EOL}")?;
    write!(writer, "\tFormatVersion: {format_version}{EOL}")?;
    write!(writer, "\tSource: \"{SOURCE}\"{EOL}")?;
    write!(writer, "\tType: \"{kind}\"{EOL}")?;
    write!(writer, "\tName: \"{name}\"{EOL}")?;
    write!(writer, "}}{EOL}")
}

/// Run a container writer against an in-memory buffer.
pub(crate) fn render_with<F>(write: F) -> String
where
    F: FnOnce(&mut Vec<u8>) -> io::Result<()>,
{
    let mut out = Vec::new();
    // A Vec sink never fails; the writers only propagate sink errors.
    let _ = write(&mut out);
    String::from_utf8_lossy(&out).into_owned()
}

/// Output location of a container: the export root joined with the model's
/// virtual path, plus the container extension.
pub fn output_path(export_root: &Path, virtual_path: &str, extension: &str) -> PathBuf {
    let mut path = export_root
        .join(virtual_path.trim_start_matches('/'))
        .into_os_string();
    path.push(".");
    path.push(extension);
    PathBuf::from(path)
}

/// Create `path` (and its parent directories) and fill it through `body`.
pub(crate) fn write_file<F>(path: &Path, body: F) -> io::Result<()>
where
    F: FnOnce(&mut BufWriter<File>) -> io::Result<()>,
{
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut writer = BufWriter::new(File::create(path)?);
    body(&mut writer)?;
    writer.flush()
}
