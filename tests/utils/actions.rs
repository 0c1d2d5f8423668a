use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
};
use serde_json::{json, Value};
use tower::ServiceExt; // for `oneshot`

use super::setup::TestSetup;

// ============================================================================
// Action Helpers
// ============================================================================

impl TestSetup {
    /// Send a request through the router and return the status and JSON body
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header("Authorization", format!("Bearer {}", token));
        }
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        };
        (status, value)
    }

    pub async fn get(&self, uri: &str, token: &str) -> (StatusCode, Value) {
        self.request(Method::GET, uri, Some(token), None).await
    }

    pub async fn post(&self, uri: &str, token: &str, body: Value) -> (StatusCode, Value) {
        self.request(Method::POST, uri, Some(token), Some(body)).await
    }

    // ============================================================================
    // Convenience Action Methods
    // ============================================================================

    /// Log in and return the token response, panicking on failure
    pub async fn login(&self, name: &str, password: &str) -> Value {
        let (status, body) = self
            .request(
                Method::POST,
                "/v1/security/login",
                None,
                Some(json!({ "name": name, "password": password })),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "login failed: {}", body);
        body
    }

    /// Log in and return only the access token
    pub async fn access_token(&self, name: &str, password: &str) -> String {
        self.login(name, password).await["accessToken"]
            .as_str()
            .unwrap()
            .to_string()
    }

    /// Create an account as `admin_token` and return its ID
    pub async fn create_account(
        &self,
        admin_token: &str,
        name: &str,
        password: &str,
        role: &str,
    ) -> String {
        let (status, body) = self
            .post(
                "/v1/accounts",
                admin_token,
                json!({ "name": name, "password": password, "role": role }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "account creation failed: {}", body);
        body["id"].as_str().unwrap().to_string()
    }

    /// Create an entity through `uri` and return its ID
    pub async fn create(&self, uri: &str, token: &str, body: Value) -> String {
        let (status, created) = self.post(uri, token, body).await;
        assert_eq!(status, StatusCode::CREATED, "POST {} failed: {}", uri, created);
        created["id"].as_str().unwrap().to_string()
    }
}
