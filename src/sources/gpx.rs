//! GPX Track Reader
//!
//! Streams `<trkpt>` elements out of GPX 1.0/1.1 documents. Every point of
//! every `<trk>`/`<trkseg>` becomes one record, so multiple tracks come out
//! as one list (merged when indexed). Waypoints and route points are ignored.
//!
//! ```text
//! <trkpt lat="47.6" lon="-122.3">
//!   <ele>12.0</ele>
//!   <time>2024-01-15T10:30:00Z</time>
//! </trkpt>
//! ```
//!
//! Missing `<time>` yields a record without timestamp. Missing or garbled
//! `lat`/`lon` yields a record without that coordinate; the index rejects it.

use super::events::parse_timestamp;
use super::SourceError;
use crate::track::RawTrackRecord;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::io::Read;
use std::path::Path;

/// Records read from one track path plus the GPX documents they came from
#[derive(Debug, Default)]
pub struct TrackLoad {
    pub records: Vec<RawTrackRecord>,
    pub files: Vec<String>,
}

/// Read a track from a `.gpx` file or a `.zip` containing `.gpx` files
pub fn read_track_file(path: &Path) -> Result<TrackLoad, SourceError> {
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "gpx" => Ok(TrackLoad {
            records: read_gpx_file(path)?,
            files: vec![path.display().to_string()],
        }),
        "zip" => read_gpx_zip(path),
        _ => Err(SourceError::Unsupported(path.display().to_string())),
    }
}

/// Read all track points from a GPX file
pub fn read_gpx_file(path: &Path) -> Result<Vec<RawTrackRecord>, SourceError> {
    let content = std::fs::read_to_string(path)?;
    read_gpx_str(&content)
}

/// Read every GPX entry of a ZIP archive, in entry-name order
fn read_gpx_zip(path: &Path) -> Result<TrackLoad, SourceError> {
    let file = std::fs::File::open(path)?;
    let mut archive = zip::ZipArchive::new(file)?;

    let mut names: Vec<String> = archive
        .file_names()
        .filter(|name| name.to_lowercase().ends_with(".gpx"))
        .map(str::to_string)
        .collect();
    names.sort();

    if names.is_empty() {
        return Err(SourceError::Unsupported(format!(
            "{}: no .gpx entries in archive",
            path.display()
        )));
    }

    let mut load = TrackLoad::default();
    for name in names {
        let mut content = String::new();
        archive.by_name(&name)?.read_to_string(&mut content)?;

        let records = read_gpx_str(&content)?;
        tracing::debug!(entry = %name, points = records.len(), "Read GPX entry");

        load.records.extend(records);
        load.files.push(name);
    }

    Ok(load)
}

/// Read all track points from GPX text
pub fn read_gpx_str(xml: &str) -> Result<Vec<RawTrackRecord>, SourceError> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);

    let mut records = Vec::new();
    // Point being read and the number of elements open inside it
    let mut current: Option<(RawTrackRecord, usize)> = None;
    let mut time_text: Option<String> = None;

    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                if let Some((_, depth)) = current.as_mut() {
                    if *depth == 0 && e.local_name().as_ref() == b"time" {
                        time_text = Some(String::new());
                    }
                    *depth += 1;
                } else if e.local_name().as_ref() == b"trkpt" {
                    current = Some((point_from_attributes(&e)?, 0));
                }
            }
            Event::Empty(e) => {
                if current.is_none() && e.local_name().as_ref() == b"trkpt" {
                    records.push(point_from_attributes(&e)?);
                }
            }
            Event::Text(t) => {
                if let Some(text) = time_text.as_mut() {
                    text.push_str(&t.unescape()?);
                }
            }
            Event::End(e) => {
                let mut finished = false;

                if let Some((record, depth)) = current.as_mut() {
                    if *depth > 0 {
                        *depth -= 1;
                        if *depth == 0 {
                            if let Some(text) = time_text.take() {
                                record.timestamp = Some(parse_timestamp(text.trim())?);
                            }
                        }
                    } else if e.local_name().as_ref() == b"trkpt" {
                        finished = true;
                    }
                }

                if finished {
                    if let Some((record, _)) = current.take() {
                        records.push(record);
                    }
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(records)
}

fn point_from_attributes(e: &BytesStart<'_>) -> Result<RawTrackRecord, SourceError> {
    let mut record = RawTrackRecord::default();

    for attr in e.attributes() {
        let attr = attr.map_err(|err| SourceError::Xml(err.to_string()))?;
        let value = attr.unescape_value()?;

        match attr.key.local_name().as_ref() {
            b"lat" => record.latitude = value.trim().parse().ok(),
            b"lon" => record.longitude = value.trim().parse().ok(),
            _ => {}
        }
    }

    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use std::io::Write;
    use tempfile::tempdir;

    const SAMPLE_GPX: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<gpx version="1.1" creator="test" xmlns="http://www.topografix.com/GPX/1/1">
  <wpt lat="1.0" lon="1.0"><time>2024-01-15T09:00:00Z</time></wpt>
  <trk>
    <name>Morning</name>
    <trkseg>
      <trkpt lat="47.6062" lon="-122.3321">
        <ele>56.0</ele>
        <time>2024-01-15T10:30:00Z</time>
      </trkpt>
      <trkpt lat="47.6100" lon="-122.3400">
        <time>2024-01-15T12:31:00+02:00</time>
      </trkpt>
    </trkseg>
  </trk>
  <trk>
    <trkseg>
      <trkpt lat="47.7" lon="-122.4"><ele>10</ele></trkpt>
      <trkpt lat="47.8" lon="-122.5"/>
    </trkseg>
  </trk>
</gpx>"#;

    #[test]
    fn test_reads_all_track_points() {
        let records = read_gpx_str(SAMPLE_GPX).unwrap();

        // Waypoint is not a track point
        assert_eq!(records.len(), 4);

        assert_eq!(
            records[0].timestamp,
            Some(Utc.with_ymd_and_hms(2024, 1, 15, 10, 30, 0).unwrap())
        );
        assert_eq!(records[0].latitude, Some(47.6062));
        assert_eq!(records[0].longitude, Some(-122.3321));

        // Offset times are normalized to UTC
        assert_eq!(
            records[1].timestamp,
            Some(Utc.with_ymd_and_hms(2024, 1, 15, 10, 31, 0).unwrap())
        );

        assert_eq!(records[2].timestamp, None);
        assert_eq!(records[3].timestamp, None);
        assert_eq!(records[3].latitude, Some(47.8));
    }

    #[test]
    fn test_nested_time_is_not_point_time() {
        let gpx = r#"<gpx><trk><trkseg>
            <trkpt lat="1" lon="2">
              <extensions><time>2024-01-15T10:30:00Z</time></extensions>
            </trkpt>
        </trkseg></trk></gpx>"#;

        let records = read_gpx_str(gpx).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].timestamp, None);
    }

    #[test]
    fn test_garbled_coordinate_becomes_missing() {
        let gpx = r#"<gpx><trk><trkseg>
            <trkpt lat="north" lon="2"><time>2024-01-15T10:30:00Z</time></trkpt>
        </trkseg></trk></gpx>"#;

        let records = read_gpx_str(gpx).unwrap();
        assert_eq!(records[0].latitude, None);
        assert_eq!(records[0].longitude, Some(2.0));
    }

    #[test]
    fn test_bad_time_is_error() {
        let gpx = r#"<gpx><trk><trkseg>
            <trkpt lat="1" lon="2"><time>yesterday</time></trkpt>
        </trkseg></trk></gpx>"#;

        assert!(matches!(read_gpx_str(gpx), Err(SourceError::Parse(_))));
    }

    #[test]
    fn test_no_tracks() {
        let records = read_gpx_str(r#"<gpx version="1.1"></gpx>"#).unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn test_read_track_file_dispatch() {
        let dir = tempdir().unwrap();

        let gpx_path = dir.path().join("ride.GPX");
        std::fs::write(&gpx_path, SAMPLE_GPX).unwrap();
        let load = read_track_file(&gpx_path).unwrap();
        assert_eq!(load.records.len(), 4);
        assert_eq!(load.files.len(), 1);

        let txt_path = dir.path().join("ride.txt");
        std::fs::write(&txt_path, SAMPLE_GPX).unwrap();
        assert!(matches!(
            read_track_file(&txt_path),
            Err(SourceError::Unsupported(_))
        ));
    }

    #[test]
    fn test_read_zip_merges_entries() {
        let dir = tempdir().unwrap();
        let zip_path = dir.path().join("export.zip");

        let file = std::fs::File::create(&zip_path).unwrap();
        let mut writer = zip::ZipWriter::new(file);
        let options = zip::write::SimpleFileOptions::default();

        writer.start_file("b.gpx", options).unwrap();
        writer.write_all(SAMPLE_GPX.as_bytes()).unwrap();
        writer.start_file("notes.txt", options).unwrap();
        writer.write_all(b"not a track").unwrap();
        writer.start_file("a.gpx", options).unwrap();
        writer.write_all(SAMPLE_GPX.as_bytes()).unwrap();
        writer.finish().unwrap();

        let load = read_track_file(&zip_path).unwrap();
        assert_eq!(load.files, vec!["a.gpx".to_string(), "b.gpx".to_string()]);
        assert_eq!(load.records.len(), 8);
    }
}
