//! Request signing contracts that let downstream crates attach Zephyr tokens to arbitrary
//! HTTP clients.

/// Header carrying the Zephyr access key alongside the token.
pub const ACCESS_KEY_HEADER: &str = "zapiAccessKey";

/// Describes how to sign an outbound request without constraining the HTTP client type.
///
/// The trait is generic over both the request and error types so implementers can integrate
/// with any client builder while the signing core stays transport-agnostic. Implementations
/// must sign exactly the `method` and `url` the request will be sent with; a token signed for a
/// different URL fails verification upstream.
pub trait RequestSignerExt<Request, Error>
where
	Self: Send + Sync,
{
	/// Consumes the provided request and injects `Authorization: JWT <token>` plus the
	/// [`ACCESS_KEY_HEADER`].
	fn sign_request(&self, request: Request, method: &str, url: &str) -> Result<Request, Error>;
}
