//! full request cycle through a small routing table: a login route issuing
//! tokens and routes protected by scopes and by the user's uuid
use http::{HeaderMap, HeaderValue, StatusCode};
use jwt_gate::rules::{HasScopes, MatchValue};
use jwt_gate::{
    error, Gate, JwtConfig, JwtHandler, KeyPair, Protected, RequestContext, RequestData,
    RsaKeyPair, Secret, SigningKey, Token,
};
use rand::{prelude::StdRng, SeedableRng};

struct App {
    jwt: JwtHandler,
    protected: Protected<fn() -> String>,
    protected_user: Protected<fn(String) -> String>,
}

struct Response {
    status: StatusCode,
    body: String,
    headers: HeaderMap,
}

fn init_logs() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn protected() -> String {
    "success".to_string()
}

fn protected_user(uuid: String) -> String {
    uuid
}

impl App {
    fn new<K: Into<SigningKey>>(config: JwtConfig, key: K) -> Self {
        init_logs();

        App {
            jwt: JwtHandler::new(config.with_auto_update(true), key).unwrap(),
            protected: Gate::new()
                .rule(HasScopes::new(vec!["read:protected"]))
                .protect(protected as fn() -> String),
            protected_user: Gate::new()
                .rule(HasScopes::new(vec!["read:protected"]))
                .rule(MatchValue::new(vec!["jwt:uuid", "url:uuid"]).unwrap())
                .protect(protected_user as fn(String) -> String),
        }
    }

    fn get(&self, path: &str, token: Option<&HeaderValue>) -> Response {
        let mut request = HeaderMap::new();
        if let Some(token) = token {
            request.insert("authorization", token.clone());
        }

        let segments = path.trim_start_matches('/').split('/').collect::<Vec<_>>();
        let mut data = RequestData::new().with_headers(&request);
        if let ["protected", uuid] = segments.as_slice() {
            data = data.with_url_param("uuid", *uuid);
        }
        let mut ctx = RequestContext::new(data);

        let result = self
            .jwt
            .before_request(&request, &mut ctx)
            .and_then(|()| -> Result<String, error::Jwt> {
                match segments.as_slice() {
                    ["token"] => {
                        self.jwt.generate_token(
                            &mut ctx,
                            Token::builder()
                                .scopes(vec!["read:protected"])
                                .claim("uuid", "123"),
                        );
                        Ok("success".to_string())
                    }
                    ["protected"] => Ok(self.protected.call(&ctx)?),
                    ["protected", uuid] => Ok(self.protected_user.call_with(&ctx, uuid.to_string())?),
                    _ => Ok("not found".to_string()),
                }
            });

        match result {
            Ok(body) => {
                let mut headers = HeaderMap::new();
                self.jwt.after_request(&ctx, &mut headers).unwrap();
                Response {
                    status: StatusCode::OK,
                    body,
                    headers,
                }
            }
            Err(e) => Response {
                status: e.status(),
                body: "invalid token".to_string(),
                headers: HeaderMap::new(),
            },
        }
    }
}

fn run(app: &App) {
    assert_eq!(app.get("/protected", None).status, StatusCode::FORBIDDEN);
    assert_eq!(app.get("/protected/123", None).status, StatusCode::FORBIDDEN);

    let response = app.get("/token", None);
    assert_eq!(response.status, StatusCode::OK);
    let token = response.headers.get("authorization").cloned().unwrap();

    let response = app.get("/protected", Some(&token));
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body, "success");
    let token = response.headers.get("authorization").cloned().unwrap();

    let response = app.get("/protected/123", Some(&token));
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body, "123");
    let token = response.headers.get("authorization").cloned().unwrap();

    let response = app.get("/protected/321", Some(&token));
    assert_eq!(response.status, StatusCode::FORBIDDEN);
    assert_eq!(response.body, "invalid token");
    assert!(response.headers.is_empty());
}

#[test]
fn hmac_flow() {
    run(&App::new(JwtConfig::new().with_lifespan(300), Secret::new("secret")));
}

#[test]
fn ed25519_flow() {
    let mut rng: StdRng = SeedableRng::seed_from_u64(1234);
    let root = KeyPair::new_with_rng(&mut rng);

    run(&App::new(
        JwtConfig::new()
            .with_algorithm(jwt_gate::Algorithm::EdDSA)
            .with_issuer(vec!["issuer1"])
            .with_audience(vec!["service"]),
        root,
    ));
}

#[test]
fn rsa_flow() {
    let keypair = RsaKeyPair::from_pem(
        include_bytes!("fixtures/rsa_private.pem"),
        include_bytes!("fixtures/rsa_public.pem"),
    )
    .unwrap();

    run(&App::new(
        JwtConfig::new()
            .with_algorithm(jwt_gate::Algorithm::RS256)
            .with_audience(vec!["service"]),
        keypair,
    ));
}

#[test]
fn tokens_for_another_audience_are_rejected() {
    let app = App::new(JwtConfig::new(), Secret::new("secret"));
    let other = JwtHandler::new(
        JwtConfig::new().with_audience(vec!["billing"]),
        Secret::new("secret"),
    )
    .unwrap();

    let token = Token::builder().scopes(vec!["read:protected"]).build();
    let value = HeaderValue::from_str(&format!("Bearer {}", other.encode(&token, None).unwrap()))
        .unwrap();

    assert_eq!(app.get("/protected", Some(&value)).status, StatusCode::FORBIDDEN);
}

#[test]
fn tokens_from_another_issuer_are_rejected() {
    let app = App::new(
        JwtConfig::new().with_issuer(vec!["issuer1"]),
        Secret::new("secret"),
    );
    let other = JwtHandler::new(
        JwtConfig::new().with_issuer(vec!["issuer2"]),
        Secret::new("secret"),
    )
    .unwrap();

    let token = Token::builder().scopes(vec!["read:protected"]).build();
    let value = HeaderValue::from_str(&format!("Bearer {}", other.encode(&token, None).unwrap()))
        .unwrap();

    let response = app.get("/protected", Some(&value));
    assert_eq!(response.status, StatusCode::FORBIDDEN);
}

#[test]
fn malformed_bearer_is_rejected() {
    let app = App::new(JwtConfig::new(), Secret::new("secret"));
    let value = HeaderValue::from_static("Basic dXNlcjpwYXNz");
    assert_eq!(app.get("/protected", Some(&value)).status, StatusCode::FORBIDDEN);
}

#[test]
fn missing_scope_is_rejected() {
    let app = App::new(JwtConfig::new(), Secret::new("secret"));
    let token = Token::builder().scopes(vec!["write:protected"]).build();
    let value = HeaderValue::from_str(&format!(
        "Bearer {}",
        app.jwt.encode(&token, None).unwrap()
    ))
    .unwrap();

    assert_eq!(app.get("/protected", Some(&value)).status, StatusCode::FORBIDDEN);
}
