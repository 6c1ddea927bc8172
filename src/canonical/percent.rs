//! RFC 3986 percent-encoding with the adjustments Atlassian Connect expects.

// crates.io
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};

/// Everything except the RFC 3986 unreserved characters (`A-Z a-z 0-9 - _ . ~`).
const UNRESERVED_COMPLEMENT: &AsciiSet =
	&NON_ALPHANUMERIC.remove(b'-').remove(b'_').remove(b'.').remove(b'~');

/// Percent-encodes `s` for use in a canonical request.
///
/// Every byte outside the unreserved set becomes `%XX` (uppercase hex). On top of that:
///
/// - space and `+` both become `%20`;
/// - `*` becomes `%2A`;
/// - `~` stays literal.
///
/// ```
/// use zephyr_squad_auth::canonical::percent_encode;
///
/// assert_eq!(percent_encode("a b+c*~"), "a%20b%20c%2A~");
/// ```
pub fn percent_encode(s: &str) -> String {
	// The base set already leaves `~` alone and escapes `*`; only `+` needs rewriting. A literal
	// `%` is itself escaped, so `%2B` can only come from `+`.
	utf8_percent_encode(s, UNRESERVED_COMPLEMENT).to_string().replace("%2B", "%20")
}
