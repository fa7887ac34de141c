//! EP-007: Source distribution archive.
//!
//! Builds `{name}-{version}.tar.gz` with all entries under a
//! `{name}-{version}/` root: PKG-INFO first, then the scripts in manifest
//! order. Entry metadata is pinned (mtime 0, fixed modes) so the same
//! inputs produce the same archive.

use crate::core::metadata;
use crate::core::types::PackageMetadata;
use flate2::write::GzEncoder;
use flate2::Compression;
use std::path::{Path, PathBuf};

/// File name of the sdist for a resolved package, e.g.
/// "thermod-monitor-dbstats-1.2.0.tar.gz".
pub fn sdist_file_name(meta: &PackageMetadata) -> String {
    format!("{}-{}.tar.gz", meta.name, meta.version)
}

/// Build the source distribution. `base_dir` is the directory script paths
/// are relative to (the manifest's directory). Returns the archive path.
pub fn build_sdist(
    meta: &PackageMetadata,
    base_dir: &Path,
    out_dir: &Path,
) -> Result<PathBuf, String> {
    std::fs::create_dir_all(out_dir)
        .map_err(|e| format!("cannot create dir {}: {}", out_dir.display(), e))?;

    let root = format!("{}-{}", meta.name, meta.version);
    let archive_path = out_dir.join(sdist_file_name(meta));

    // Atomic write: temp file + rename
    let tmp_path = out_dir.join(format!("{}.tmp", sdist_file_name(meta)));
    let file = std::fs::File::create(&tmp_path)
        .map_err(|e| format!("cannot create {}: {}", tmp_path.display(), e))?;
    let encoder = GzEncoder::new(file, Compression::default());
    let mut builder = tar::Builder::new(encoder);

    let pkg_info = metadata::render_pkg_info(meta);
    append_bytes(
        &mut builder,
        &format!("{}/PKG-INFO", root),
        pkg_info.as_bytes(),
        0o644,
    )?;

    for script in meta.scripts.keys() {
        let source = base_dir.join(script);
        let content = std::fs::read(&source)
            .map_err(|e| format!("cannot read {}: {}", source.display(), e))?;
        append_bytes(
            &mut builder,
            &format!("{}/{}", root, script),
            &content,
            0o755,
        )?;
    }

    let encoder = builder
        .into_inner()
        .map_err(|e| format!("archive write error: {}", e))?;
    encoder
        .finish()
        .map_err(|e| format!("compression error: {}", e))?;
    std::fs::rename(&tmp_path, &archive_path).map_err(|e| {
        format!(
            "cannot rename {} → {}: {}",
            tmp_path.display(),
            archive_path.display(),
            e
        )
    })?;

    Ok(archive_path)
}

fn append_bytes<W: std::io::Write>(
    builder: &mut tar::Builder<W>,
    path: &str,
    content: &[u8],
    mode: u32,
) -> Result<(), String> {
    let mut header = tar::Header::new_gnu();
    header.set_size(content.len() as u64);
    header.set_mode(mode);
    header.set_mtime(0);
    header.set_cksum();
    builder
        .append_data(&mut header, path, content)
        .map_err(|e| format!("cannot add {} to archive: {}", path, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::read::GzDecoder;
    use indexmap::IndexMap;

    fn make_meta(scripts: IndexMap<String, String>) -> PackageMetadata {
        PackageMetadata {
            name: "demo-pkg".to_string(),
            version: "1.2.0".to_string(),
            description: Some("Demo".to_string()),
            long_description: None,
            author: None,
            author_email: None,
            url: None,
            license: None,
            requires: vec!["thermod >=1.2.0".to_string()],
            scripts,
            generator: "empacar test".to_string(),
        }
    }

    fn entry_names(path: &Path) -> Vec<String> {
        let file = std::fs::File::open(path).unwrap();
        let mut archive = tar::Archive::new(GzDecoder::new(file));
        archive
            .entries()
            .unwrap()
            .map(|e| e.unwrap().path().unwrap().to_string_lossy().to_string())
            .collect()
    }

    #[test]
    fn test_ep007_sdist_file_name() {
        let meta = make_meta(IndexMap::new());
        assert_eq!(sdist_file_name(&meta), "demo-pkg-1.2.0.tar.gz");
    }

    #[test]
    fn test_ep007_build_contains_pkg_info_and_scripts() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("demo-pkg"), "#!/bin/sh\n").unwrap();

        let mut scripts = IndexMap::new();
        scripts.insert("demo-pkg".to_string(), "blake3:xxx".to_string());
        let meta = make_meta(scripts);

        let out_dir = dir.path().join("dist");
        let archive = build_sdist(&meta, dir.path(), &out_dir).unwrap();
        assert!(archive.exists());
        assert_eq!(
            entry_names(&archive),
            vec!["demo-pkg-1.2.0/PKG-INFO", "demo-pkg-1.2.0/demo-pkg"]
        );
    }

    #[test]
    fn test_ep007_deterministic() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("demo-pkg"), "#!/bin/sh\n").unwrap();

        let mut scripts = IndexMap::new();
        scripts.insert("demo-pkg".to_string(), "blake3:xxx".to_string());
        let meta = make_meta(scripts);

        let a = build_sdist(&meta, dir.path(), &dir.path().join("d1")).unwrap();
        let b = build_sdist(&meta, dir.path(), &dir.path().join("d2")).unwrap();
        assert_eq!(std::fs::read(a).unwrap(), std::fs::read(b).unwrap());
    }

    #[test]
    fn test_ep007_missing_script_fails() {
        let dir = tempfile::tempdir().unwrap();
        let mut scripts = IndexMap::new();
        scripts.insert("ghost".to_string(), "blake3:xxx".to_string());
        let meta = make_meta(scripts);
        let result = build_sdist(&meta, dir.path(), &dir.path().join("dist"));
        assert!(result.is_err());
    }

    #[test]
    fn test_ep007_no_temp_file_left() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("demo-pkg"), "#!/bin/sh\n").unwrap();
        let mut scripts = IndexMap::new();
        scripts.insert("demo-pkg".to_string(), "blake3:xxx".to_string());
        let meta = make_meta(scripts);

        let out_dir = dir.path().join("dist");
        build_sdist(&meta, dir.path(), &out_dir).unwrap();
        let leftovers: Vec<_> = std::fs::read_dir(&out_dir)
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
            .collect();
        assert!(leftovers.is_empty());
    }
}
