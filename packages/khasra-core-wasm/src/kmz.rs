use std::io::{Cursor, Read};

use zip::ZipArchive;

use crate::error::ExtractError;

pub const KML_EXTENSION: &str = ".kml";

/// The markup document pulled out of an archive.
#[derive(Debug, Clone, PartialEq)]
pub struct KmlDocument {
    pub name: String,
    pub content: String,
}

/// Return the first `.kml` entry of the archive in central-directory order.
/// Other documents are ignored. `Ok(None)` when there is none.
pub fn find_kml_document(bytes: &[u8]) -> Result<Option<KmlDocument>, ExtractError> {
    let mut archive = ZipArchive::new(Cursor::new(bytes))?;

    for i in 0..archive.len() {
        let mut entry = archive.by_index(i)?;
        if !entry.is_file() || !entry.name().ends_with(KML_EXTENSION) {
            continue;
        }
        let name = entry.name().to_string();
        // The declared size comes from the archive header and is not trusted
        let mut raw = Vec::new();
        entry.read_to_end(&mut raw)?;

        let content = String::from_utf8_lossy(&raw);
        let content = content.strip_prefix('\u{feff}').unwrap_or(&*content).to_string();
        return Ok(Some(KmlDocument { name, content }));
    }

    Ok(None)
}
