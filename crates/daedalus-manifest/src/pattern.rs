//! Source-path to URL-pattern translation.
//!
//! Translation rules, applied per segment left to right:
//!
//! - `(group)` segments scope inheritance but vanish from the URL.
//! - `(_group)` segments exclude their whole subtree from routing.
//! - `[name]` becomes a dynamic segment capturing `name`.
//! - `[...name]` becomes a catch-all capturing the path remainder; it must
//!   be the final URL segment.
//! - A file named `index` maps to its parent directory's URL.
//! - Underscore-prefixed files and directories (other than the reserved
//!   `_middleware`/`_layout`/`_app`/`_error` filenames) are excluded.
//! - The source extension is stripped; the routing table re-applies it only
//!   to break URL collisions.

use daedalus_core::error::{BuildError, BuildResult};

/// Recognized source-file extensions, in tie-break priority order.
pub const EXTENSIONS: [&str; 4] = ["tsx", "ts", "jsx", "js"];

/// Splits a filename into its stem and recognized extension.
///
/// Unrecognized extensions stay part of the stem.
#[must_use]
pub fn split_extension(file: &str) -> (&str, Option<&str>) {
    if let Some((stem, ext)) = file.rsplit_once('.') {
        if EXTENSIONS.contains(&ext) {
            return (stem, Some(ext));
        }
    }
    (file, None)
}

/// Returns the tie-break priority of an extension (lower sorts first).
#[must_use]
pub fn extension_priority(ext: Option<&str>) -> usize {
    ext.and_then(|e| EXTENSIONS.iter().position(|known| *known == e))
        .unwrap_or(EXTENSIONS.len())
}

/// A translated URL pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutePattern {
    /// The URL pattern handed to the matcher, e.g. `/blog/{slug}`.
    pub pattern: String,
    /// Number of URL segments the pattern carries.
    pub depth: usize,
}

/// Translates a page artifact's relative source path into a URL pattern.
///
/// Returns `None` when the path falls in an excluded subtree.
///
/// # Errors
///
/// Returns [`BuildError::CatchAllNotLast`] when a catch-all segment is not
/// final and [`BuildError::EmptyCaptureName`] for `[]` or `[...]`.
///
/// # Example
///
/// ```
/// use daedalus_manifest::pattern::translate;
///
/// let route = translate("blog/(archive)/[year]/index.tsx").unwrap().unwrap();
/// assert_eq!(route.pattern, "/blog/{year}");
/// ```
pub fn translate(path: &str) -> BuildResult<Option<RoutePattern>> {
    translate_inner(path, false)
}

/// Like [`translate`], but keeps the source extension on the final segment.
///
/// Used by the routing table when two artifacts would otherwise collide in
/// the produced URL: the later-sorted artifact keeps its extension.
pub fn translate_with_extension(path: &str) -> BuildResult<Option<RoutePattern>> {
    translate_inner(path, true)
}

fn translate_inner(path: &str, keep_extension: bool) -> BuildResult<Option<RoutePattern>> {
    let mut segments: Vec<String> = Vec::new();
    let parts: Vec<&str> = path.split('/').filter(|p| !p.is_empty()).collect();

    for (i, part) in parts.iter().enumerate() {
        let is_file = i + 1 == parts.len();
        let (stem, ext) = if is_file {
            split_extension(part)
        } else {
            (*part, None)
        };

        if is_excluded_segment(stem, is_file) {
            return Ok(None);
        }

        let produced = match translate_segment(stem, path)? {
            Some(segment) => segment,
            // A colliding index file keeps its full filename as a segment.
            None if is_file && keep_extension && stem == "index" => stem.to_string(),
            None => {
                // Route groups and `index` contribute nothing to the URL.
                continue;
            }
        };

        if let Some(prev) = segments.last() {
            if prev.starts_with('*') {
                return Err(BuildError::CatchAllNotLast {
                    path: path.to_string(),
                });
            }
        }

        if is_file && keep_extension {
            if let Some(ext) = ext {
                segments.push(format!("{produced}.{ext}"));
                continue;
            }
        }
        segments.push(produced);
    }

    // An index file under a catch-all directory is fine; the catch-all is
    // still the final produced segment. Anything after one is not.
    if let Some(pos) = segments.iter().position(|s| s.starts_with('*')) {
        if pos + 1 != segments.len() {
            return Err(BuildError::CatchAllNotLast {
                path: path.to_string(),
            });
        }
    }

    let depth = segments.len();
    let pattern = if segments.is_empty() {
        "/".to_string()
    } else {
        format!("/{}", segments.join("/"))
    };

    Ok(Some(RoutePattern { pattern, depth }))
}

/// Returns true when any segment of `path` excludes it from routing.
///
/// Used for special artifacts, whose reserved filenames never reach the
/// page translator.
pub(crate) fn is_excluded_path(path: &str) -> bool {
    let parts: Vec<&str> = path.split('/').filter(|p| !p.is_empty()).collect();
    parts.iter().enumerate().any(|(i, part)| {
        let is_file = i + 1 == parts.len();
        let stem = if is_file { split_extension(part).0 } else { *part };
        is_excluded_segment(stem, is_file)
    })
}

/// Returns true when a stem excludes its subtree from routing.
///
/// The reserved names are base filenames only; a *directory* called
/// `_layout` is an ordinary underscore-prefixed directory and excludes its
/// subtree like any other.
fn is_excluded_segment(stem: &str, is_file: bool) -> bool {
    if let Some(inner) = group_name(stem) {
        return inner.starts_with('_');
    }
    if !stem.starts_with('_') {
        return false;
    }
    !(is_file && is_reserved_stem(stem))
}

fn is_reserved_stem(stem: &str) -> bool {
    matches!(stem, "_middleware" | "_layout" | "_app" | "_error")
}

/// Extracts the inner name of a `(group)` segment.
fn group_name(stem: &str) -> Option<&str> {
    stem.strip_prefix('(')?.strip_suffix(')')
}

/// Translates one stem into a URL segment, or `None` when it is elided.
fn translate_segment(stem: &str, path: &str) -> BuildResult<Option<String>> {
    if group_name(stem).is_some() || stem == "index" {
        return Ok(None);
    }

    if let Some(rest) = stem.strip_prefix("[...") {
        let name = rest.strip_suffix(']').unwrap_or(rest);
        if name.is_empty() {
            return Err(BuildError::EmptyCaptureName {
                segment: stem.to_string(),
                path: path.to_string(),
            });
        }
        return Ok(Some(format!("*{name}")));
    }

    if let Some(rest) = stem.strip_prefix('[') {
        let name = rest.strip_suffix(']').unwrap_or(rest);
        if name.is_empty() {
            return Err(BuildError::EmptyCaptureName {
                segment: stem.to_string(),
                path: path.to_string(),
            });
        }
        return Ok(Some(format!("{{{name}}}")));
    }

    Ok(Some(stem.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pattern(path: &str) -> String {
        translate(path).unwrap().unwrap().pattern
    }

    #[test]
    fn static_paths() {
        assert_eq!(pattern("about.ts"), "/about");
        assert_eq!(pattern("docs/getting-started.tsx"), "/docs/getting-started");
    }

    #[test]
    fn index_maps_to_parent() {
        assert_eq!(pattern("index.tsx"), "/");
        assert_eq!(pattern("blog/index.ts"), "/blog");
    }

    #[test]
    fn dynamic_segments() {
        assert_eq!(pattern("blog/[slug].tsx"), "/blog/{slug}");
        assert_eq!(pattern("[year]/[month]/index.ts"), "/{year}/{month}");
    }

    #[test]
    fn catch_all_segments() {
        assert_eq!(pattern("docs/[...path].ts"), "/docs/*path");
        assert_eq!(pattern("docs/[...path]/index.ts"), "/docs/*path");
    }

    #[test]
    fn catch_all_must_be_final() {
        let err = translate("docs/[...rest]/extra.ts").unwrap_err();
        assert!(matches!(err, BuildError::CatchAllNotLast { .. }));
    }

    #[test]
    fn empty_capture_names_rejected() {
        assert!(matches!(
            translate("blog/[].ts").unwrap_err(),
            BuildError::EmptyCaptureName { .. }
        ));
        assert!(matches!(
            translate("blog/[...].ts").unwrap_err(),
            BuildError::EmptyCaptureName { .. }
        ));
    }

    #[test]
    fn route_groups_vanish_from_url() {
        assert_eq!(pattern("(marketing)/pricing.tsx"), "/pricing");
        assert_eq!(pattern("blog/(archive)/[year]/index.ts"), "/blog/{year}");
    }

    #[test]
    fn underscore_group_excludes_subtree() {
        assert_eq!(translate("(_drafts)/secret.ts").unwrap(), None);
        assert_eq!(translate("blog/(_wip)/post.tsx").unwrap(), None);
    }

    #[test]
    fn underscore_files_and_dirs_excluded() {
        assert_eq!(translate("_helpers/util.ts").unwrap(), None);
        assert_eq!(translate("blog/_partial.tsx").unwrap(), None);
    }

    #[test]
    fn reserved_names_do_not_exempt_directories() {
        assert_eq!(translate("blog/_layout/index.ts").unwrap(), None);
        assert_eq!(translate("_error/page.tsx").unwrap(), None);
        assert_eq!(translate("_app/nested/[id].ts").unwrap(), None);
    }

    #[test]
    fn depth_counts_produced_segments() {
        assert_eq!(translate("index.ts").unwrap().unwrap().depth, 0);
        assert_eq!(
            translate("(site)/blog/[slug].tsx").unwrap().unwrap().depth,
            2
        );
    }

    #[test]
    fn extension_kept_on_collision_variant() {
        let route = translate_with_extension("about.js").unwrap().unwrap();
        assert_eq!(route.pattern, "/about.js");

        let route = translate_with_extension("blog/index.ts").unwrap().unwrap();
        assert_eq!(route.pattern, "/blog/index.ts");
    }

    #[test]
    fn unrecognized_extensions_stay_in_stem() {
        assert_eq!(split_extension("readme.md"), ("readme.md", None));
        assert_eq!(split_extension("about.ts"), ("about", Some("ts")));
    }

    #[test]
    fn extension_priorities_are_total() {
        assert!(extension_priority(Some("tsx")) < extension_priority(Some("ts")));
        assert!(extension_priority(Some("ts")) < extension_priority(Some("jsx")));
        assert!(extension_priority(Some("jsx")) < extension_priority(Some("js")));
        assert!(extension_priority(Some("js")) < extension_priority(None));
    }
}
