//! Integration tests for the Night Market portal.
//!
//! # Running Tests
//!
//! ```bash
//! # Pure cross-crate tests
//! cargo test -p night-market-integration-tests
//!
//! # Live HTTP tests against a running, seeded portal
//! nm-cli migrate && nm-cli seed
//! cargo run -p night-market-web &
//! cargo test -p night-market-integration-tests -- --ignored
//! ```
//!
//! Live tests read the portal URL from `NM_TEST_BASE_URL`
//! (default `http://localhost:3000`) and sign in with the seeded accounts.

use reqwest::{Client, StatusCode, redirect};
use serde_json::{Value, json};

/// Password of the seeded test accounts.
pub const SEED_PASSWORD: &str = "password123";

/// Seeded vendor account.
pub const VENDOR_EMAIL: &str = "user@test.com";
/// Second seeded vendor, owning nothing of [`VENDOR_EMAIL`]'s.
pub const OTHER_VENDOR_EMAIL: &str = "user2@test.com";
/// Seeded staff account.
pub const STAFF_EMAIL: &str = "staff@test.com";
/// Seeded admin account.
pub const ADMIN_EMAIL: &str = "admin@test.com";

/// Base URL of the portal under test.
#[must_use]
pub fn base_url() -> String {
    std::env::var("NM_TEST_BASE_URL").unwrap_or_else(|_| "http://localhost:3000".to_string())
}

/// Absolute URL for `path`.
#[must_use]
pub fn url(path: &str) -> String {
    format!("{}{path}", base_url().trim_end_matches('/'))
}

/// HTTP client with a cookie store that does not follow redirects.
///
/// # Panics
///
/// Panics if the client cannot be built.
#[must_use]
pub fn client() -> Client {
    Client::builder()
        .cookie_store(true)
        .redirect(redirect::Policy::none())
        .build()
        .expect("Failed to create HTTP client")
}

/// Sign in through `portal` (`user`, `staff` or `admin`) and return the client.
///
/// # Panics
///
/// Panics if the request fails or the login is not accepted.
pub async fn login(portal: &str, email: &str) -> Client {
    let client = client();
    let resp = client
        .post(url(&format!("/login/{portal}")))
        .form(&[("email", email), ("password", SEED_PASSWORD)])
        .send()
        .await
        .expect("Failed to send login request");
    assert_eq!(
        resp.status(),
        StatusCode::SEE_OTHER,
        "login as {email} through {portal} failed"
    );
    client
}

/// A complete goods application payload.
#[must_use]
pub fn goods_payload(email: &str) -> Value {
    json!({
        "formType": "goods",
        "brandName": "星空クラフト",
        "contactPerson": "山田 花子",
        "phone": "090-1234-5678",
        "email": email,
        "emailConfirm": email,
        "participationMonths": [7, 8],
        "participationPlan": "6months",
        "productType": "手作りアクセサリー",
        "productFeatures": "天然石を使ったアクセサリー",
        "priceRange": "¥500〜¥3,000",
        "agreementCheck": true,
        "companyName": "星空クラフト",
        "representativeName": "山田 花子",
        "companyAddress": "宮崎県宮崎市橘通西1-1-1",
    })
}

/// Read a JSON response body.
///
/// # Panics
///
/// Panics if the body is not JSON.
pub async fn json_body(resp: reqwest::Response) -> Value {
    resp.json().await.expect("response body is not JSON")
}
