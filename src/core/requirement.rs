//! EP-004: Dependency specifier parsing.
//!
//! Specifiers follow the `"name op version"` form of the manifest, e.g.
//! `"thermod >= 1.2.0"` or `"requests >= 2.4.3, < 3"`. Requirements are
//! declared metadata only — nothing is ever fetched or installed.

use super::types::{Constraint, ConstraintOp, Requirement, Version};

/// Parse a full dependency specifier: a package name followed by zero or
/// more comma-separated constraints.
pub fn parse_requirement(spec: &str) -> Result<Requirement, String> {
    let spec = spec.trim();
    if spec.is_empty() {
        return Err("empty requirement".to_string());
    }

    let split_at = spec.find(['<', '>', '=', '!']).unwrap_or(spec.len());
    let name = spec[..split_at].trim();
    if name.is_empty() {
        return Err(format!("requirement '{}' has no package name", spec));
    }
    if !is_valid_name(name) {
        return Err(format!("invalid package name '{}'", name));
    }

    let constraints = parse_constraints(&spec[split_at..])
        .map_err(|e| format!("requirement '{}': {}", spec, e))?;

    Ok(Requirement {
        name: name.to_string(),
        constraints,
    })
}

/// Parse a comma-separated constraint list, e.g. `">= 1.2, < 2"`.
/// An empty or all-whitespace input yields no constraints.
pub fn parse_constraints(s: &str) -> Result<Vec<Constraint>, String> {
    let s = s.trim();
    if s.is_empty() {
        return Ok(Vec::new());
    }

    let mut constraints = Vec::new();
    for clause in s.split(',') {
        let clause = clause.trim();
        let (op, rest) = parse_op(clause)?;
        let version = parse_version(rest.trim())?;
        constraints.push(Constraint { op, version });
    }
    Ok(constraints)
}

fn parse_op(clause: &str) -> Result<(ConstraintOp, &str), String> {
    for (text, op) in [
        (">=", ConstraintOp::Ge),
        ("<=", ConstraintOp::Le),
        ("==", ConstraintOp::Eq),
        ("!=", ConstraintOp::Ne),
        (">", ConstraintOp::Gt),
        ("<", ConstraintOp::Lt),
    ] {
        if let Some(rest) = clause.strip_prefix(text) {
            return Ok((op, rest));
        }
    }
    Err(format!("constraint '{}' has no comparison operator", clause))
}

/// Parse a dotted numeric version with an optional trailing tag on the last
/// segment ("1.2.0", "2.4rc1").
pub fn parse_version(s: &str) -> Result<Version, String> {
    if s.is_empty() {
        return Err("empty version".to_string());
    }

    let mut segments = Vec::new();
    let mut tag = None;
    let pieces: Vec<&str> = s.split('.').collect();
    let last = pieces.len() - 1;

    for (i, piece) in pieces.iter().enumerate() {
        if let Ok(n) = piece.parse::<u64>() {
            segments.push(n);
            continue;
        }
        // Only the last segment may carry a tag, and it must start with digits.
        let digits_end = piece.find(|c: char| !c.is_ascii_digit()).unwrap_or(0);
        if i != last || digits_end == 0 {
            return Err(format!("invalid version '{}'", s));
        }
        let n: u64 = piece[..digits_end]
            .parse()
            .map_err(|_| format!("invalid version '{}'", s))?;
        segments.push(n);
        tag = Some(piece[digits_end..].to_string());
    }

    Ok(Version { segments, tag })
}

/// Check a version against every constraint in a list.
pub fn satisfies(version: &Version, constraints: &[Constraint]) -> bool {
    constraints.iter().all(|c| {
        let ord = version.cmp(&c.version);
        match c.op {
            ConstraintOp::Eq => ord.is_eq(),
            ConstraintOp::Ne => ord.is_ne(),
            ConstraintOp::Ge => ord.is_ge(),
            ConstraintOp::Le => ord.is_le(),
            ConstraintOp::Gt => ord.is_gt(),
            ConstraintOp::Lt => ord.is_lt(),
        }
    })
}

fn is_valid_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphanumeric() => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.')
}
