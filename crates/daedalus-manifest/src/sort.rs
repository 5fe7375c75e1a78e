//! Deterministic total order over route source paths.
//!
//! Registration order decides matching precedence (the first structural
//! match wins), so the order must be independent of discovery order. Paths
//! compare segment by segment from the root; at each depth, special
//! artifacts sort before ordinary pages, static before dynamic, dynamic
//! before catch-all. Extension priority is the final tie-break.

use crate::pattern::{extension_priority, split_extension};
use std::cmp::Ordering;

/// Per-segment precedence rank; lower sorts first.
///
/// The special artifacts at a directory level precede every ordinary route
/// at the same or deeper level, so middleware, layouts, and boundaries are
/// registered before the routes that depend on them.
fn segment_rank(segment: &str) -> u8 {
    match segment {
        "_error" => 0,
        "_middleware" => 1,
        "_layout" => 2,
        "_app" => 3,
        "index" => 4,
        _ if segment.starts_with("[...") => 7,
        _ if segment.starts_with('[') => 6,
        _ => 5,
    }
}

/// Group parentheses are invisible in the URL; compare by the inner name.
fn normalize(segment: &str) -> &str {
    segment
        .strip_prefix('(')
        .and_then(|s| s.strip_suffix(')'))
        .unwrap_or(segment)
}

fn decompose(path: &str) -> (Vec<&str>, Option<&str>) {
    let mut segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    let mut ext = None;
    if let Some(last) = segments.pop() {
        let (stem, e) = split_extension(last);
        segments.push(stem);
        ext = e;
    }
    (segments, ext)
}

/// Compares two relative source paths for registration order.
///
/// # Example
///
/// ```
/// use daedalus_manifest::sort::sort_route_paths;
/// use std::cmp::Ordering;
///
/// assert_eq!(
///     sort_route_paths("blog/_middleware.ts", "blog/[slug].tsx"),
///     Ordering::Less
/// );
/// ```
#[must_use]
pub fn sort_route_paths(a: &str, b: &str) -> Ordering {
    let (a_segments, a_ext) = decompose(a);
    let (b_segments, b_ext) = decompose(b);

    for (sa, sb) in a_segments.iter().zip(b_segments.iter()) {
        let (na, nb) = (normalize(sa), normalize(sb));
        let by_rank = segment_rank(na).cmp(&segment_rank(nb));
        if by_rank != Ordering::Equal {
            return by_rank;
        }
        let by_name = na.cmp(nb);
        if by_name != Ordering::Equal {
            return by_name;
        }
    }

    a_segments
        .len()
        .cmp(&b_segments.len())
        .then_with(|| extension_priority(a_ext).cmp(&extension_priority(b_ext)))
        // Group parentheses normalize away above; the raw path keeps the
        // order total even then.
        .then_with(|| a.cmp(b))
}

/// Sorts a set of source paths into registration order.
pub fn sort_paths<S: AsRef<str>>(paths: &mut [S]) {
    paths.sort_by(|a, b| sort_route_paths(a.as_ref(), b.as_ref()));
}
