//! Authentication and account endpoints

use docent_core::types::{AckResponse, AuthUrl, UserInfo};
use docent_core::{DocentError, Result};
use reqwest::header::{HeaderMap, SET_COOKIE};

use crate::{ApiClient, SESSION_COOKIE};

impl ApiClient {
    /// URL the user must visit to sign in
    pub async fn auth_url(&self) -> Result<AuthUrl> {
        self.send_json(self.client.get(self.url("/auth/url"))).await
    }

    /// URL the user must visit to sign in with admin consent
    pub async fn admin_auth_url(&self) -> Result<AuthUrl> {
        self.send_json(self.client.get(self.url("/auth/admin/url")))
            .await
    }

    /// Exchange an OAuth callback code for a session token
    ///
    /// The backend answers the callback with a redirect that carries the
    /// `session_token` cookie, so this request runs on a dedicated client
    /// with redirects disabled and reads the cookie off the raw response.
    pub async fn complete_auth(&self, code: &str) -> Result<String> {
        let client = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .timeout(self.config.timeout)
            .build()?;
        let resp = client
            .get(self.url("/auth/callback"))
            .query(&[("code", code)])
            .send()
            .await?;

        if let Some(token) = extract_session_cookie(resp.headers()) {
            return Ok(token);
        }
        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();
        Err(DocentError::api(
            status.as_u16(),
            crate::extract_detail(status, &body),
        ))
    }

    /// End the server-side session
    pub async fn logout(&self) -> Result<AckResponse> {
        self.send_json(self.client.post(self.url("/logout"))).await
    }

    /// Delete the account and all its data
    pub async fn dropout(&self) -> Result<AckResponse> {
        self.send_json(self.client.post(self.url("/dropout"))).await
    }

    /// The signed-in user
    pub async fn user_info(&self) -> Result<UserInfo> {
        self.send_json(self.client.get(self.url("/user"))).await
    }
}

/// Find the session token among Set-Cookie headers
fn extract_session_cookie(headers: &HeaderMap) -> Option<String> {
    let prefix = format!("{}=", SESSION_COOKIE);
    for value in headers.get_all(SET_COOKIE) {
        let raw = match value.to_str() {
            Ok(raw) => raw,
            Err(_) => continue,
        };
        let pair = raw.split(';').next().unwrap_or("");
        if let Some(token) = pair.strip_prefix(&prefix) {
            if !token.is_empty() {
                return Some(token.to_string());
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderValue;

    #[test]
    fn session_cookie_is_extracted_from_attributes() {
        let mut headers = HeaderMap::new();
        headers.append(
            SET_COOKIE,
            HeaderValue::from_static("other=1; Path=/"),
        );
        headers.append(
            SET_COOKIE,
            HeaderValue::from_static("session_token=tok-123; HttpOnly; Path=/; SameSite=Lax"),
        );
        assert_eq!(extract_session_cookie(&headers).as_deref(), Some("tok-123"));
    }

    #[test]
    fn missing_or_empty_cookie_yields_none() {
        let mut headers = HeaderMap::new();
        assert!(extract_session_cookie(&headers).is_none());
        headers.append(SET_COOKIE, HeaderValue::from_static("session_token=; Path=/"));
        assert!(extract_session_cookie(&headers).is_none());
    }
}
