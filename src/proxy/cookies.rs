//! `Set-Cookie` reconstruction for upstream responses.
//!
//! Fetch-style clients hand back every upstream `Set-Cookie` line merged
//! into one `", "`-joined string. [`split_coalesced`] undoes that merge
//! with a fixed heuristic: cookies whose last attribute ends in `e`
//! (`Secure`, `SameSite=None`, `SameSite=Lax`...) leave a literal `"e, "`
//! at every boundary. Any cookie that contains `"e, "` elsewhere, such as
//! an `Expires=Tue, 01 ...` date, is split in the wrong place.
//!
//! hyper keeps `Set-Cookie` lines separate, so [`CookieMode::Native`]
//! skips the heuristic entirely and copies them through unchanged.

use axum::http::header::SET_COOKIE;
use axum::http::{HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize};

const SEPARATOR: &str = "e, ";

/// How upstream `Set-Cookie` headers are rebuilt for the caller.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum CookieMode {
    /// Join all lines with `", "`, then split them back apart with [`split_coalesced`].
    #[default]
    Coalesced,
    /// Copy each upstream line through as-is.
    Native,
}

impl std::fmt::Display for CookieMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Coalesced => f.write_str("coalesced"),
            Self::Native => f.write_str("native"),
        }
    }
}

/// Split a merged `Set-Cookie` value into individual cookies.
///
/// Splits on the literal `"e, "`, puts back the `e` the split consumed
/// on every fragment that no longer ends in one, then reverses the order.
#[must_use]
pub fn split_coalesced(merged: &str) -> Vec<String> {
    let mut cookies: Vec<String> = merged
        .split(SEPARATOR)
        .map(|fragment| {
            if fragment.ends_with('e') {
                fragment.to_string()
            } else {
                format!("{fragment}e")
            }
        })
        .collect();
    // `str::Split` over a `&str` pattern only walks forwards.
    cookies.reverse();
    cookies
}

/// Merge every `Set-Cookie` line into one string the way a fetch client
/// reports it. `None` when the header is absent or not valid text.
fn coalesce(headers: &HeaderMap) -> Option<String> {
    let values: Vec<&str> = headers
        .get_all(SET_COOKIE)
        .iter()
        .map(HeaderValue::to_str)
        .collect::<Result<_, _>>()
        .ok()?;

    if values.is_empty() {
        None
    } else {
        Some(values.join(", "))
    }
}

/// Rewrite the `Set-Cookie` lines of `upstream` onto `outgoing`.
///
/// `outgoing` is expected to already carry the upstream lines verbatim;
/// in coalesced mode they are replaced by the reconstructed sequence.
pub fn apply(mode: CookieMode, upstream: &HeaderMap, outgoing: &mut HeaderMap) {
    if mode == CookieMode::Native {
        return;
    }

    // An empty merged value leaves the copied header untouched.
    let Some(merged) = coalesce(upstream).filter(|m| !m.is_empty()) else {
        return;
    };

    let cookies = split_coalesced(&merged);
    let values: Vec<HeaderValue> = cookies
        .iter()
        .filter_map(|cookie| match HeaderValue::from_str(cookie) {
            Ok(v) => Some(v),
            Err(e) => {
                tracing::warn!(cookie = %cookie, error = %e, "dropping unrepresentable set-cookie");
                None
            }
        })
        .collect();

    outgoing.remove(SET_COOKIE);
    for value in values {
        outgoing.append(SET_COOKIE, value);
    }
}
