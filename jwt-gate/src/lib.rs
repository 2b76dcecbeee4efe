//! Request scoped JWT handling and rule based route protection
//!
//! jwt-gate carries a JSON Web Token through one HTTP request:
//!
//! * the token sent by the client is read from the `Authorization` header,
//!   verified and stored in the request's context;
//! * routes are protected by a [Gate], a list of rules checked against the
//!   stored token and the request data before the route handler runs;
//! * a new or refreshed token can be sent back in the response headers.
//!
//! It is framework agnostic: the host web framework owns the request
//! context, calls the handler hooks and maps errors to responses with
//! [error::Jwt::status].
//!
//! Non goals:
//!
//! * this is not an identity provider, tokens are minted by the application
//!   from claims it already trusts;
//! * revocation and refresh token rotation need external state and are not
//!   handled here.
//!
//! # Usage
//!
//! ```rust
//! use jwt_gate::rules::{HasScopes, MatchValue};
//! use jwt_gate::{
//!     error, Gate, JwtConfig, JwtHandler, RequestContext, RequestData, Secret, Token,
//! };
//! use http::HeaderMap;
//!
//! fn main() -> Result<(), error::Jwt> {
//!   let handler = JwtHandler::new(
//!     JwtConfig::new().with_lifespan(300).with_auto_update(true),
//!     Secret::new("secret"),
//!   )?;
//!
//!   // rules are built when routes are registered, a bad path reference
//!   // fails here and not while serving requests
//!   let get_user = Gate::new()
//!     .rule(HasScopes::new(vec!["read:user"]))
//!     .rule(MatchValue::new(vec!["url:uuid", "jwt:uuid"])?)
//!     .protect(|uuid: &str| format!("user {}", uuid));
//!
//!   // a login route mints the token, it is sent with the response
//!   let mut login = RequestContext::default();
//!   handler.generate_token(
//!     &mut login,
//!     Token::builder().scopes(vec!["read:user"]).claim("uuid", "123"),
//!   );
//!   let mut response = HeaderMap::new();
//!   handler.after_request(&login, &mut response)?;
//!
//!   // the client sends it back with its next request
//!   let mut ctx = RequestContext::new(RequestData::new().with_url_param("uuid", "123"));
//!   handler.before_request(&response, &mut ctx)?;
//!   assert_eq!(get_user.call_with(&ctx, "123")?, "user 123");
//!
//!   // and cannot read another user
//!   let mut ctx = RequestContext::new(RequestData::new().with_url_param("uuid", "321"));
//!   handler.before_request(&response, &mut ctx)?;
//!   let denied = error::Jwt::from(get_user.call_with(&ctx, "321").unwrap_err());
//!   assert_eq!(denied.status(), http::StatusCode::FORBIDDEN);
//!
//!   Ok(())
//! }
//! ```
pub mod context;
pub mod crypto;
pub mod error;
pub mod gate;
pub mod handler;
pub mod rules;
pub mod token;

mod time;

pub use context::{RequestContext, RequestData, TokenStore};
pub use crypto::{
    Algorithm, KeyPair, PrivateKey, PublicKey, RsaKeyPair, RsaPublicKey, Secret, SigningKey,
    VerifyingKey,
};
pub use gate::{Gate, Protected};
pub use handler::{JwtConfig, JwtHandler};
pub use token::{Token, TokenBuilder};
