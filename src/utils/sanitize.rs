//! Filename sanitization utilities

/// Longest file name (in bytes, before the extension) we will produce
pub const MAX_NAME_LEN: usize = 200;

/// Sanitize a human title for safe filesystem usage
///
/// Filesystem-unsafe characters become underscores, surrounding whitespace and
/// dots are trimmed, runs of spaces and underscores are collapsed, and the
/// result is cut to at most [`MAX_NAME_LEN`] bytes on a char boundary.
pub fn sanitize_filename(name: &str) -> String {
    let replaced: String = name
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();

    let trimmed = replaced.trim().trim_matches('.');

    let mut result = String::with_capacity(trimmed.len());
    let mut last = None;
    for c in trimmed.chars() {
        if (c == ' ' || c == '_') && last == Some(c) {
            continue;
        }
        result.push(c);
        last = Some(c);
    }

    truncate_on_char_boundary(&mut result, MAX_NAME_LEN);
    result
}

/// Build the local file name for a remote file
///
/// Prefers the human title (keeping the remote extension) and falls back to
/// the last path component of the remote name.
pub fn local_file_name(remote_name: &str, title: Option<&str>) -> String {
    let base = remote_name.rsplit('/').next().unwrap_or(remote_name);

    if let Some(title) = title.map(str::trim).filter(|t| !t.is_empty()) {
        let stem = sanitize_filename(title);
        if !stem.is_empty() {
            return match extension(base) {
                Some(ext) => format!("{}.{}", stem, ext),
                None => stem,
            };
        }
    }

    // Bound the stem only, so a long remote name keeps its extension
    let (stem, ext) = match extension(base) {
        Some(ext) => (&base[..base.len() - ext.len() - 1], Some(sanitize_filename(ext))),
        None => (base, None),
    };
    let mut stem = sanitize_filename(stem);
    if stem.is_empty() {
        stem = "_".to_string();
    }

    match ext.filter(|e| !e.is_empty()) {
        Some(ext) => format!("{}.{}", stem, ext),
        None => stem,
    }
}

/// Extension of a file name without the leading dot
pub fn extension(name: &str) -> Option<&str> {
    let (stem, ext) = name.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() || ext.contains('/') {
        None
    } else {
        Some(ext)
    }
}

fn truncate_on_char_boundary(s: &mut String, max: usize) {
    if s.len() <= max {
        return;
    }
    let mut cut = max;
    while !s.is_char_boundary(cut) {
        cut -= 1;
    }
    s.truncate(cut);
}
