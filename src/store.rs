// src/store.rs

use crate::decode::DeviceRecord;
use crate::index::DeviceIndex;
use anyhow::{Context, Result};
use serde::{de::DeserializeOwned, Serialize};
use std::{
    fs,
    io::{BufReader, BufWriter, Write},
    path::{Path, PathBuf},
};
use tracing::{info, warn};

pub const DEVICES_FILE: &str = "devices.json";
pub const BRANDS_FILE: &str = "brands.json";

/// Write `devices.json` and `brands.json` under `dir`, creating it if needed.
/// Returns the two paths written.
pub fn write_index<P: AsRef<Path>>(dir: P, index: &DeviceIndex) -> Result<(PathBuf, PathBuf)> {
    let dir = dir.as_ref();
    fs::create_dir_all(dir).with_context(|| format!("creating {:?}", dir))?;

    let devices_path = dir.join(DEVICES_FILE);
    write_json_atomic(&devices_path, index.devices())?;
    info!(count = index.len(), path = %devices_path.display(), "device list saved");

    let brands_path = dir.join(BRANDS_FILE);
    write_json_atomic(&brands_path, index.brands())?;
    info!(count = index.brands().len(), path = %brands_path.display(), "brand list saved");

    Ok((devices_path, brands_path))
}

/// Rebuild an index from the sidecars in `dir` without re-fetching the feed.
///
/// The brand list is re-derived from the devices; a stale `brands.json` is
/// reported, not trusted.
pub fn load_index<P: AsRef<Path>>(dir: P) -> Result<DeviceIndex> {
    let dir = dir.as_ref();
    let index = DeviceIndex::from_records(read_devices(dir)?);

    match read_brands(dir) {
        Ok(brands) if brands == index.brands() => {}
        Ok(brands) => warn!(
            stored = brands.len(),
            derived = index.brands().len(),
            "{} disagrees with {}; using derived brand list",
            BRANDS_FILE,
            DEVICES_FILE
        ),
        Err(e) => warn!(error = %e, "skipping unreadable {}", BRANDS_FILE),
    }

    Ok(index)
}

pub fn read_devices<P: AsRef<Path>>(dir: P) -> Result<Vec<DeviceRecord>> {
    read_json(&dir.as_ref().join(DEVICES_FILE))
}

pub fn read_brands<P: AsRef<Path>>(dir: P) -> Result<Vec<String>> {
    read_json(&dir.as_ref().join(BRANDS_FILE))
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let f = fs::File::open(path).with_context(|| format!("opening {:?}", path))?;
    serde_json::from_reader(BufReader::new(f)).with_context(|| format!("parsing {:?}", path))
}

/// Pretty-print `value` to a hidden temp file next to `path`, then rename it
/// over `path`.
fn write_json_atomic<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .with_context(|| format!("no file name in {:?}", path))?;
    let tmp_path = path.with_file_name(format!(".{}.tmp", file_name));

    let tmp = fs::File::create(&tmp_path).with_context(|| format!("creating {:?}", tmp_path))?;
    let mut writer = BufWriter::new(tmp);
    serde_json::to_writer_pretty(&mut writer, value)
        .with_context(|| format!("serializing {}", file_name))?;
    writer.write_all(b"\n")?;
    writer
        .flush()
        .with_context(|| format!("flushing {:?}", tmp_path))?;

    fs::rename(&tmp_path, path)
        .with_context(|| format!("renaming {:?} -> {:?}", tmp_path, path))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn sample() -> DeviceIndex {
        DeviceIndex::from_records(vec![
            DeviceRecord::new("Samsung", "Galaxy S7", "heroqltevzw", "SM-G930V"),
            DeviceRecord::new("华为", "Mate \"9\"", "HWMHA", "MHA-L29"),
            DeviceRecord::new("Samsung", "Galaxy S8", "dreamqltesq", "SM-G950U"),
        ])
    }

    #[test]
    fn sidecars_round_trip() -> Result<()> {
        let dir = tempdir()?;
        let index = sample();
        let (devices_path, brands_path) = write_index(dir.path(), &index)?;

        assert!(devices_path.ends_with(DEVICES_FILE));
        assert!(brands_path.ends_with(BRANDS_FILE));
        assert_eq!(load_index(dir.path())?, index);
        assert_eq!(read_brands(dir.path())?, vec!["Samsung", "华为"]);
        Ok(())
    }

    #[test]
    fn devices_file_uses_field_named_objects() -> Result<()> {
        let dir = tempdir()?;
        write_index(dir.path(), &sample())?;

        let raw = fs::read_to_string(dir.path().join(DEVICES_FILE))?;
        let json: serde_json::Value = serde_json::from_str(&raw)?;
        assert_eq!(
            json[0],
            serde_json::json!({
                "brand": "Samsung",
                "name": "Galaxy S7",
                "device": "heroqltevzw",
                "model": "SM-G930V"
            })
        );
        assert!(raw.ends_with("]\n"));
        Ok(())
    }

    #[test]
    fn no_temp_files_left_behind() -> Result<()> {
        let dir = tempdir()?;
        write_index(dir.path().join("nested"), &sample())?;
        let mut names: Vec<_> = fs::read_dir(dir.path().join("nested"))?
            .filter_map(|e| e.ok())
            .map(|e| e.file_name().to_string_lossy().to_string())
            .collect();
        names.sort();
        assert_eq!(names, vec![BRANDS_FILE, DEVICES_FILE]);
        Ok(())
    }

    #[test]
    fn stale_or_missing_brands_file_is_tolerated() -> Result<()> {
        let dir = tempdir()?;
        let index = sample();
        write_index(dir.path(), &index)?;

        fs::write(dir.path().join(BRANDS_FILE), "[\"Nokia\"]")?;
        assert_eq!(load_index(dir.path())?.brands(), index.brands());

        fs::remove_file(dir.path().join(BRANDS_FILE))?;
        assert_eq!(load_index(dir.path())?, index);
        Ok(())
    }

    #[test]
    fn missing_devices_file_is_an_error() -> Result<()> {
        let dir = tempdir()?;
        let err = load_index(dir.path()).unwrap_err();
        assert!(format!("{:#}", err).contains(DEVICES_FILE));
        Ok(())
    }
}
