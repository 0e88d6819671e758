#![cfg(all(feature = "reqwest", feature = "test"))]

// std
use std::time::Duration;
// crates.io
use base64::{Engine as _, engine::general_purpose::STANDARD};
use httpmock::prelude::*;
use serde_json::json;
// self
use oauth2_identity::{
	_preludet::*,
	auth::BackstageIdentity,
	error::TokenEndpointError,
	handlers::{CallbackParams, RequestContext},
	provider::ClientAuthMethod,
};

#[tokio::test]
async fn callback_refresh_token_renews_the_same_identity() {
	let server = MockServer::start_async().await;
	let mut code_exchange = server
		.mock_async(|when, then| {
			when.method(POST).path("/token").header("accept", "application/json");
			then.status(200).header("content-type", "application/json").body(
				json!({ "access_token": "T1", "refresh_token": "R1", "expires_in": 3600 })
					.to_string(),
			);
		})
		.await;
	let first_profile = server
		.mock_async(|when, then| {
			when.method(GET).path("/userinfo").header("authorization", "Bearer T1");
			then.status(200)
				.header("content-type", "application/json")
				.body(json!({ "email": "alice@example.com", "name": "Alice" }).to_string());
		})
		.await;
	let handlers = build_test_handlers(&server.base_url());
	let outcome = handlers
		.handler(&RequestContext::new(), &CallbackParams::with_code("abc123"))
		.await
		.expect("Callback should complete.");
	let refresh_token =
		outcome.refresh_token().cloned().expect("Provider issued a refresh token.");

	code_exchange.assert_async().await;
	first_profile.assert_async().await;
	code_exchange.delete_async().await;

	let refresh_grant = server
		.mock_async(|when, then| {
			when.method(POST).path("/token");
			then.status(200).header("content-type", "application/json").body(
				json!({ "access_token": "T2", "refresh_token": "R-rotated", "expires_in": 1200 })
					.to_string(),
			);
		})
		.await;
	let second_profile = server
		.mock_async(|when, then| {
			when.method(GET).path("/userinfo").header("authorization", "Bearer T2");
			then.status(200)
				.header("content-type", "application/json")
				.body(json!({ "email": "alice@example.com", "name": "Alice" }).to_string());
		})
		.await;
	let response = handlers
		.refresh(&RequestContext::new(), refresh_token.expose(), Some("openid email"))
		.await
		.expect("Refresh should complete.");

	refresh_grant.assert_async().await;
	second_profile.assert_async().await;

	assert_eq!(response.profile.email, outcome.response.profile.email);
	assert_eq!(response.backstage_identity, Some(BackstageIdentity { id: "alice".into() }));
	assert_eq!(response.provider_info.access_token.expose(), "T2");
	assert_eq!(response.provider_info.expires_in_seconds, Some(1200));
	assert_eq!(response.provider_info.scope, "openid email");

	let forwarded = serde_json::to_value(&response).expect("Response should serialize.");

	assert!(!forwarded.to_string().contains("R-rotated"));
}

#[tokio::test]
async fn rejected_refresh_token_requires_reauthentication() {
	let server = MockServer::start_async().await;
	let grant = server
		.mock_async(|when, then| {
			when.method(POST).path("/token");
			then.status(400).header("content-type", "application/json").body(
				json!({ "error": "invalid_grant", "error_description": "Token revoked." })
					.to_string(),
			);
		})
		.await;
	let profile = server
		.mock_async(|when, then| {
			when.method(GET).path("/userinfo");
			then.status(200).body("{}");
		})
		.await;
	let err = build_test_handlers(&server.base_url())
		.refresh(&RequestContext::new(), "revoked", None)
		.await
		.expect_err("Refresh must fail.");

	grant.assert_async().await;
	profile.assert_calls_async(0).await;

	assert!(err.requires_reauthentication());
	assert!(matches!(
		err,
		Error::Refresh(TokenEndpointError::Rejected { status: 400, error: Some(ref code), .. })
			if code == "invalid_grant"
	));
}

#[tokio::test]
async fn transient_refresh_failures_do_not_force_login() {
	let server = MockServer::start_async().await;

	server
		.mock_async(|when, then| {
			when.method(POST).path("/token");
			then.status(502).body("bad gateway");
		})
		.await;

	let err = build_test_handlers(&server.base_url())
		.refresh(&RequestContext::new(), "R1", None)
		.await
		.expect_err("Refresh must fail.");

	assert!(matches!(err, Error::Refresh(TokenEndpointError::Unavailable { status: 502, .. })));
	assert!(!err.requires_reauthentication());
}

#[tokio::test]
async fn statuses_without_a_rejection_do_not_force_login() {
	for (status, body) in [(302, ""), (408, "request timeout"), (404, "not found")] {
		let server = MockServer::start_async().await;
		let grant = server
			.mock_async(|when, then| {
				when.method(POST).path("/token");
				then.status(status).header("location", "https://elsewhere.example.com").body(body);
			})
			.await;
		let err = build_test_handlers(&server.base_url())
			.refresh(&RequestContext::new(), "R1", None)
			.await
			.expect_err("Refresh must fail.");

		grant.assert_async().await;

		assert!(matches!(err, Error::Refresh(_)), "unexpected error for {status}: {err:?}");
		assert!(!err.requires_reauthentication(), "HTTP {status} must not force a new login");
	}
}

#[tokio::test]
async fn oauth_error_body_is_a_rejection_whatever_the_status() {
	let server = MockServer::start_async().await;

	server
		.mock_async(|when, then| {
			when.method(POST).path("/token");
			then.status(409)
				.header("content-type", "application/json")
				.body(json!({ "error": "invalid_grant" }).to_string());
		})
		.await;

	let err = build_test_handlers(&server.base_url())
		.refresh(&RequestContext::new(), "R1", None)
		.await
		.expect_err("Refresh must fail.");

	assert!(matches!(err, Error::Refresh(TokenEndpointError::Rejected { status: 409, .. })));
	assert!(err.requires_reauthentication());
}

#[tokio::test]
async fn empty_refresh_token_is_rejected_locally() {
	let server = MockServer::start_async().await;
	let grant = server
		.mock_async(|when, then| {
			when.method(POST).path("/token");
			then.status(200).body("{}");
		})
		.await;
	let err = build_test_handlers(&server.base_url())
		.refresh(&RequestContext::new(), "", None)
		.await
		.expect_err("Empty refresh token must fail.");

	grant.assert_calls_async(0).await;

	assert!(matches!(err, Error::Refresh(TokenEndpointError::MissingRefreshToken)));
	assert!(err.requires_reauthentication());
}

#[tokio::test]
async fn refreshed_profile_without_email_fails_resolution() {
	let server = MockServer::start_async().await;

	server
		.mock_async(|when, then| {
			when.method(POST).path("/token");
			then.status(200)
				.header("content-type", "application/json")
				.body(json!({ "access_token": "T2" }).to_string());
		})
		.await;
	server
		.mock_async(|when, then| {
			when.method(GET).path("/userinfo");
			then.status(200)
				.header("content-type", "application/json")
				.body(json!({ "login": "alice", "email": null }).to_string());
		})
		.await;

	let err = build_test_handlers(&server.base_url())
		.refresh(&RequestContext::new(), "R1", None)
		.await
		.expect_err("Resolution must fail.");

	assert!(matches!(err, Error::IdentityResolution { .. }), "unexpected error: {err:?}");
}

#[tokio::test]
async fn basic_client_authentication_sends_credentials_in_header() {
	let server = MockServer::start_async().await;
	let credentials = format!("{TEST_CLIENT_ID}:{TEST_CLIENT_SECRET}");
	let basic = format!("Basic {}", STANDARD.encode(credentials));
	let grant = server
		.mock_async(|when, then| {
			when.method(POST).path("/token").header("authorization", basic.as_str());
			then.status(200)
				.header("content-type", "application/json")
				.body(json!({ "access_token": "T3" }).to_string());
		})
		.await;

	server
		.mock_async(|when, then| {
			when.method(GET).path("/userinfo");
			then.status(200)
				.header("content-type", "application/json")
				.body(json!({ "email": "carol@example.com" }).to_string());
		})
		.await;

	let mut env = mock_env_config(&server.base_url());

	env.client_auth_method = Some(ClientAuthMethod::ClientSecretBasic);

	let response = build_test_handlers_with(&env)
		.refresh(&RequestContext::new(), "R1", None)
		.await
		.expect("Refresh should complete.");

	grant.assert_async().await;

	assert_eq!(response.backstage_identity, Some(BackstageIdentity { id: "carol".into() }));
	assert_eq!(response.provider_info.scope, "openid email");
}

#[tokio::test]
async fn slow_profile_fetch_times_out_as_cancelled() {
	let server = MockServer::start_async().await;

	server
		.mock_async(|when, then| {
			when.method(POST).path("/token");
			then.status(200)
				.header("content-type", "application/json")
				.body(json!({ "access_token": "T2" }).to_string());
		})
		.await;
	server
		.mock_async(|when, then| {
			when.method(GET).path("/userinfo");
			then.status(200)
				.header("content-type", "application/json")
				.body(json!({ "email": "alice@example.com" }).to_string())
				.delay(Duration::from_secs(5));
		})
		.await;

	let err = build_test_handlers(&server.base_url())
		.refresh(&RequestContext::new().with_timeout(Duration::from_millis(300)), "R1", None)
		.await
		.expect_err("Timed out refresh must fail.");

	assert!(matches!(err, Error::Cancelled));
}
