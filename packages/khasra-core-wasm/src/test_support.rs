// Helpers shared by the unit tests.
use std::io::{Cursor, Write};

use zip::write::SimpleFileOptions;
use zip::ZipWriter;

/// Build an in-memory KMZ archive from `(entry name, contents)` pairs.
pub fn build_archive(entries: &[(&str, &str)]) -> Vec<u8> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default();
    for (name, contents) in entries {
        writer.start_file(*name, options).expect("start entry");
        writer.write_all(contents.as_bytes()).expect("write entry");
    }
    writer.finish().expect("finish archive").into_inner()
}

/// Wrap placemark markup in a KML document inside a single-entry archive.
pub fn kmz_with_placemarks(placemarks: &str) -> Vec<u8> {
    let kml = format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<kml xmlns="http://www.opengis.net/kml/2.2">
  <Document>
    <name>survey</name>
    {}
  </Document>
</kml>"#,
        placemarks
    );
    build_archive(&[("doc.kml", &kml)])
}
