//! EP-005: Metadata assembly and emission.
//!
//! Turns a validated manifest into a resolved `PackageMetadata` record:
//! runs the version resolver, canonicalizes requirements, expands script
//! patterns, and digests each script. Emits PKG-INFO, YAML, or JSON.

use super::requirement;
use super::types::{PackageManifest, PackageMetadata};
use super::version;
use crate::dist::hasher;
use indexmap::IndexMap;
use std::path::Path;

/// Output format for emitted metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetadataFormat {
    PkgInfo,
    Yaml,
    Json,
}

impl MetadataFormat {
    pub fn parse(s: &str) -> Result<Self, String> {
        match s {
            "pkg-info" => Ok(MetadataFormat::PkgInfo),
            "yaml" => Ok(MetadataFormat::Yaml),
            "json" => Ok(MetadataFormat::Json),
            other => Err(format!(
                "unknown format '{}' (expected pkg-info, yaml or json)",
                other
            )),
        }
    }
}

/// Assemble resolved metadata from a manifest. `base_dir` is the directory
/// the manifest's relative paths are resolved against.
pub fn assemble(manifest: &PackageManifest, base_dir: &Path) -> Result<PackageMetadata, String> {
    let version = version::resolve_version(&base_dir.join(&manifest.version_from))
        .map_err(|e| e.to_string())?;

    let mut requires = Vec::new();
    for spec in &manifest.requires {
        requires.push(requirement::parse_requirement(spec)?.to_string());
    }

    let mut scripts = IndexMap::new();
    for script in expand_scripts(&manifest.scripts, base_dir)? {
        let digest = hasher::hash_file(&base_dir.join(&script))?;
        scripts.insert(script, digest);
    }

    Ok(PackageMetadata {
        name: manifest.package.name.clone(),
        version,
        description: manifest.package.description.clone(),
        long_description: manifest.package.long_description.clone(),
        author: manifest.package.author.clone(),
        author_email: manifest.package.author_email.clone(),
        url: manifest.package.url.clone(),
        license: manifest.package.license.clone(),
        requires,
        scripts,
        generator: format!("empacar {}", env!("CARGO_PKG_VERSION")),
    })
}

/// Expand script entries (plain paths or glob patterns) into relative file
/// paths, manifest order, duplicates removed. Every entry must match at
/// least one existing file.
pub fn expand_scripts(patterns: &[String], base_dir: &Path) -> Result<Vec<String>, String> {
    let mut expanded: Vec<String> = Vec::new();

    for pattern in patterns {
        let full = base_dir.join(pattern);
        if full.is_file() {
            push_unique(&mut expanded, pattern.clone());
            continue;
        }

        let full_pattern = full
            .to_str()
            .ok_or_else(|| format!("script pattern '{}' is not valid UTF-8", pattern))?
            .to_string();
        let paths = glob::glob(&full_pattern)
            .map_err(|e| format!("invalid script pattern '{}': {}", pattern, e))?;

        let mut matched = false;
        for entry in paths {
            let path = entry.map_err(|e| format!("cannot read '{}': {}", pattern, e))?;
            if !path.is_file() {
                continue;
            }
            let rel = path
                .strip_prefix(base_dir)
                .map_err(|e| format!("path prefix error: {}", e))?
                .to_string_lossy()
                .to_string();
            push_unique(&mut expanded, rel);
            matched = true;
        }
        if !matched {
            return Err(format!("script '{}' matches no files", pattern));
        }
    }

    Ok(expanded)
}

fn push_unique(expanded: &mut Vec<String>, script: String) {
    if !expanded.contains(&script) {
        expanded.push(script);
    }
}

/// Emit metadata in the requested format.
pub fn emit(meta: &PackageMetadata, format: MetadataFormat) -> Result<String, String> {
    match format {
        MetadataFormat::PkgInfo => Ok(render_pkg_info(meta)),
        MetadataFormat::Yaml => {
            serde_yaml_ng::to_string(meta).map_err(|e| format!("serialize error: {}", e))
        }
        MetadataFormat::Json => {
            serde_json::to_string_pretty(meta).map_err(|e| format!("serialize error: {}", e))
        }
    }
}

/// Render RFC 822-style key/value metadata: header fields, one blank line,
/// then the long description body.
pub fn render_pkg_info(meta: &PackageMetadata) -> String {
    let mut out = String::new();
    field(&mut out, "Metadata-Version", "2.1");
    field(&mut out, "Name", &meta.name);
    field(&mut out, "Version", &meta.version);
    opt_field(&mut out, "Summary", &meta.description);
    opt_field(&mut out, "Home-page", &meta.url);
    opt_field(&mut out, "Author", &meta.author);
    opt_field(&mut out, "Author-email", &meta.author_email);
    opt_field(&mut out, "License", &meta.license);
    for req in &meta.requires {
        field(&mut out, "Requires-Dist", req);
    }
    for (script, digest) in &meta.scripts {
        field(&mut out, "Script", &format!("{} ({})", script, digest));
    }
    field(&mut out, "Generator", &meta.generator);
    if let Some(body) = &meta.long_description {
        out.push('\n');
        out.push_str(body);
        if !body.ends_with('\n') {
            out.push('\n');
        }
    }
    out
}

fn field(out: &mut String, key: &str, value: &str) {
    out.push_str(key);
    out.push_str(": ");
    out.push_str(value);
    out.push('\n');
}

fn opt_field(out: &mut String, key: &str, value: &Option<String>) {
    if let Some(v) = value {
        field(out, key, v);
    }
}

/// Write emitted metadata atomically (write to temp, then rename).
pub fn write_metadata(path: &Path, content: &str) -> Result<(), String> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .map_err(|e| format!("cannot create dir {}: {}", parent.display(), e))?;
        }
    }
    let tmp_path = path.with_extension("tmp");
    std::fs::write(&tmp_path, content)
        .map_err(|e| format!("cannot write {}: {}", tmp_path.display(), e))?;
    std::fs::rename(&tmp_path, path).map_err(|e| {
        format!(
            "cannot rename {} → {}: {}",
            tmp_path.display(),
            path.display(),
            e
        )
    })?;
    Ok(())
}
