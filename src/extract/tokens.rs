//! Continuation and session token extractor
//!
//! The platform embeds two opaque tokens in the raw HTML of the initial
//! comments page rather than in any structured payload: the pagination
//! cursor (near a `data-token` attribute) and the anti-forgery session token
//! (near an `XSRF_TOKEN` script constant). They are located by substring
//! search around the marker key; the quoted value starts a fixed number of
//! characters past the key.
//!
//! A naive scan (`find` + index arithmetic) silently returns garbage when a
//! marker is absent or reordered. Every failure mode here is therefore an
//! explicit [`ExtractError::TokenNotFound`] instead.

use super::{ExtractError, ExtractResult};

/// Marker key preceding the pagination token on the initial page
pub const PAGE_TOKEN_KEY: &str = "data-token";
/// Characters between the end of [`PAGE_TOKEN_KEY`] and its quoted value (`="`)
pub const PAGE_TOKEN_OFFSET: usize = 2;

/// Marker key preceding the session token on the initial page
pub const SESSION_TOKEN_KEY: &str = "XSRF_TOKEN";
/// Characters between the end of [`SESSION_TOKEN_KEY`] and its quoted value (`': "`)
pub const SESSION_TOKEN_OFFSET: usize = 4;

/// Locates a quoted token value embedded after a marker key
///
/// Finds the first occurrence of `key` in `html`, skips `offset` characters
/// past its end, and returns everything up to the next double quote. The
/// returned value may be empty; callers decide whether an empty token is
/// acceptable (an empty page token just means no further pages).
///
/// # Errors
///
/// `TokenNotFound` when the key is absent, the offset runs past the end of
/// the document, the skip lands inside a multi-byte character, or no closing
/// quote follows.
pub fn find_token(html: &str, key: &str, offset: usize) -> ExtractResult<String> {
    let not_found = || ExtractError::TokenNotFound {
        key: key.to_string(),
    };

    let key_pos = html.find(key).ok_or_else(not_found)?;
    let value_start = key_pos + key.len() + offset;
    let rest = html.get(value_start..).ok_or_else(not_found)?;
    let value_end = rest.find('"').ok_or_else(not_found)?;

    Ok(rest[..value_end].to_string())
}
