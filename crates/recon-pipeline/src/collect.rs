//! Photo discovery.
//!
//! Expands glob patterns under each configured directory and returns a
//! deduplicated list of absolute file paths in discovery order
//! (directory-major, pattern-minor).

use std::collections::HashSet;
use std::path::{Component, Path, PathBuf};

use regex::Regex;
use walkdir::WalkDir;

/// Patterns used when `input.photo_globs` is not configured.
pub const DEFAULT_PHOTO_GLOBS: &[&str] = &["*.jpg", "*.jpeg", "*.tif", "*.tiff", "*.png"];

/// Collect photo paths.
///
/// Blank and non-existent directories are skipped. Only paths that are
/// regular files at call time are returned. An empty result is not an error
/// here; the caller decides whether it is fatal.
pub fn collect_photos<D, P>(dirs: &[D], patterns: &[P], recursive: bool) -> Vec<PathBuf>
where
    D: AsRef<str>,
    P: AsRef<str>,
{
    let globs: Vec<Glob> = patterns
        .iter()
        .filter_map(|p| Glob::compile(p.as_ref(), recursive))
        .collect();

    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for dir in dirs {
        let dir = dir.as_ref().trim();
        if dir.is_empty() {
            continue;
        }
        let Some(dir) = absolute(Path::new(dir)) else {
            continue;
        };
        if !dir.is_dir() {
            log::debug!("skipping photo dir {} (not a directory)", dir.display());
            continue;
        }
        for glob in &globs {
            for path in glob.expand(&dir) {
                if path.is_file() && seen.insert(path.clone()) {
                    out.push(path);
                }
            }
        }
    }
    out
}

/// Absolute, lexically normalized form of `path`.
pub fn absolute(path: &Path) -> Option<PathBuf> {
    std::path::absolute(path).ok().map(|p| normalize_path(&p))
}

/// Remove `.` and resolve `..` components without touching the file system.
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push(component);
                }
            }
            other => out.push(other),
        }
    }
    out
}

/// Shell-style pattern compiled to a path regex.
///
/// The walk starts at the pattern's anchor (the photo directory, or the
/// pattern's own root when it is absolute), moved up once per leading `..`
/// and down through the wildcard-free leading components.
#[derive(Debug)]
struct Glob {
    anchor: Option<PathBuf>,
    ups: usize,
    prefix: PathBuf,
    regex: Regex,
    max_depth: Option<usize>,
    include_hidden: bool,
}

impl Glob {
    fn compile(pattern: &str, recursive: bool) -> Option<Self> {
        let pattern = pattern.trim();
        if pattern.is_empty() {
            return None;
        }

        let mut anchor = PathBuf::new();
        let mut parts: Vec<&str> = Vec::new();
        for component in Path::new(pattern).components() {
            match component {
                Component::Prefix(_) | Component::RootDir => anchor.push(component),
                Component::CurDir => {}
                Component::ParentDir => {
                    // `lit/..` folds away; after a wildcard it stays literal.
                    if parts.last().is_some_and(|p| *p != ".." && !has_wildcard(p)) {
                        parts.pop();
                    } else {
                        parts.push("..");
                    }
                }
                Component::Normal(name) => parts.push(name.to_str()?),
            }
        }

        let ups = parts.iter().take_while(|p| **p == "..").count();
        let rest = &parts[ups..];
        if rest.is_empty() {
            return None;
        }
        let literal = rest[..rest.len() - 1]
            .iter()
            .take_while(|p| !has_wildcard(p))
            .count();
        let (prefix, rest) = rest.split_at(literal);

        let mut re = String::from("^");
        let mut unbounded = false;
        for (i, part) in rest.iter().enumerate() {
            let last = i + 1 == rest.len();
            if recursive && *part == "**" {
                unbounded = true;
                if last {
                    re.push_str("[^/]+(?:/[^/]+)*");
                } else {
                    re.push_str("(?:[^/]+/)*");
                }
                continue;
            }
            re.push_str(&translate_component(part));
            if !last {
                re.push('/');
            }
        }
        re.push('$');

        let regex = match Regex::new(&re) {
            Ok(regex) => regex,
            Err(err) => {
                log::debug!("skipping photo glob {pattern:?}: {err}");
                return None;
            }
        };
        Some(Self {
            anchor: (!anchor.as_os_str().is_empty()).then_some(anchor),
            ups,
            prefix: prefix.iter().collect(),
            regex,
            max_depth: (!unbounded).then_some(rest.len()),
            include_hidden: rest.iter().any(|p| p.starts_with('.')),
        })
    }

    /// Directory the walk starts from when expanding under `dir`.
    fn base(&self, dir: &Path) -> PathBuf {
        let mut base = self.anchor.clone().unwrap_or_else(|| dir.to_path_buf());
        for _ in 0..self.ups {
            base.pop();
        }
        base.join(&self.prefix)
    }

    /// Matching entries, sorted by name at each level.
    fn expand(&self, dir: &Path) -> Vec<PathBuf> {
        let base = self.base(dir);
        if !base.is_dir() {
            return Vec::new();
        }
        let mut walker = WalkDir::new(&base)
            .min_depth(1)
            .follow_links(true)
            .sort_by_file_name();
        if let Some(depth) = self.max_depth {
            walker = walker.max_depth(depth);
        }
        let include_hidden = self.include_hidden;
        walker
            .into_iter()
            .filter_entry(|e| include_hidden || !is_hidden(e.file_name()))
            .filter_map(Result::ok)
            .filter(|e| {
                e.path()
                    .strip_prefix(&base)
                    .ok()
                    .and_then(relative_key)
                    .is_some_and(|key| self.regex.is_match(&key))
            })
            .map(|e| normalize_path(e.path()))
            .collect()
    }
}

fn has_wildcard(part: &str) -> bool {
    part.contains(['*', '?', '['])
}

fn is_hidden(name: &std::ffi::OsStr) -> bool {
    name.to_str().is_some_and(|n| n.starts_with('.'))
}

/// `/`-joined relative path, or `None` for non-UTF-8 names.
fn relative_key(rel: &Path) -> Option<String> {
    let parts: Option<Vec<&str>> = rel.components().map(|c| c.as_os_str().to_str()).collect();
    parts.map(|p| p.join("/"))
}

/// One path component: `*`, `?`, `[...]` and `[!...]` are wildcards, the
/// rest is literal.
fn translate_component(part: &str) -> String {
    let chars: Vec<char> = part.chars().collect();
    let mut out = String::new();
    let mut i = 0;
    while i < chars.len() {
        match chars[i] {
            '*' => out.push_str("[^/]*"),
            '?' => out.push_str("[^/]"),
            '[' => match class_end(&chars, i) {
                Some(end) => {
                    out.push('[');
                    let mut j = i + 1;
                    if chars[j] == '!' {
                        out.push('^');
                        j += 1;
                    }
                    for &c in &chars[j..end] {
                        if matches!(c, '\\' | '[' | '&' | '~' | '^') {
                            out.push('\\');
                        }
                        out.push(c);
                    }
                    out.push(']');
                    i = end;
                }
                None => out.push_str(r"\["),
            },
            c => out.push_str(&regex::escape(&c.to_string())),
        }
        i += 1;
    }
    out
}

/// Index of the `]` closing the class opened at `start`.
fn class_end(chars: &[char], start: usize) -> Option<usize> {
    let mut j = start + 1;
    if chars.get(j) == Some(&'!') {
        j += 1;
    }
    // A leading `]` is literal.
    if chars.get(j) == Some(&']') {
        j += 1;
    }
    (j..chars.len()).find(|&k| chars[k] == ']')
}
