use crate::coverage::AssembledArtist;
use crate::output::summary::{OutputError, OutputResult};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Writes one artist document to `<dir>/<slug>.json`
///
/// An existing document for the same slug is overwritten.
pub fn write_artist_json(dir: &Path, assembled: &AssembledArtist) -> OutputResult<PathBuf> {
    let slug = &assembled.artist.slug;
    if slug.is_empty() || slug.contains(['/', '\\']) || slug.starts_with('.') {
        return Err(OutputError::Write(format!("unusable file name '{}'", slug)));
    }

    std::fs::create_dir_all(dir)?;
    let path = dir.join(format!("{}.json", slug));

    let mut writer = BufWriter::new(File::create(&path)?);
    serde_json::to_writer_pretty(&mut writer, assembled)?;
    writer.write_all(b"\n")?;
    writer.flush()?;

    Ok(path)
}
