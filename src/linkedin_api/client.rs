// src/linkedin_api/client.rs
//! Authenticated HTTP client for the LinkedIn Marketing API.
//!
//! One call is one outbound request. Failures are classified into
//! [`LinkedInError`] and returned immediately; retry policy belongs to the caller.

use reqwest::Method;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

use super::error::LinkedInError;
use super::models::{
    Elements, RemoteAdAccount, RemoteCampaign, RemoteLeadForm, RemoteLeadResponse, RemoteProfile,
};
use super::token::Credential;
use crate::config::LinkedInConfig;

const IDENTITY_ENDPOINT: &str = "/v2/me";
const AD_ACCOUNTS_ENDPOINT: &str = "/v2/adAccountsV2";
const CAMPAIGNS_ENDPOINT: &str = "/v2/adCampaignsV2";
const LEAD_FORMS_ENDPOINT: &str = "/v2/leadForms";
const LEAD_RESPONSES_ENDPOINT: &str = "/v2/leadFormResponses";

const RESTLI_PROTOCOL_VERSION: &str = "2.0.0";

pub fn account_urn(account_id: &str) -> String {
    format!("urn:li:sponsoredAccount:{}", account_id)
}

pub fn campaign_urn(campaign_id: &str) -> String {
    format!("urn:li:sponsoredCampaign:{}", campaign_id)
}

pub fn lead_form_urn(form_id: &str) -> String {
    format!("urn:li:leadForm:{}", form_id)
}

pub struct LinkedInClient {
    client: reqwest::Client,
    base_url: String,
    credential: Credential,
}

impl LinkedInClient {
    pub fn new(config: &LinkedInConfig, credential: Credential) -> Result<Self, LinkedInError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            credential,
        })
    }

    pub fn credential(&self) -> &Credential {
        &self.credential
    }

    pub(crate) fn mark_validated(&mut self, has_elevated_access: bool) {
        self.credential.validated = true;
        self.credential.has_elevated_access = has_elevated_access;
    }

    /// Generic call returning the parsed JSON payload. An empty 2xx body parses as `null`.
    pub async fn request(
        &self,
        method: Method,
        endpoint: &str,
        query: &[(&str, String)],
        body: Option<&Value>,
    ) -> Result<Value, LinkedInError> {
        self.send(method, endpoint, query, body).await
    }

    pub async fn identity(&self) -> Result<RemoteProfile, LinkedInError> {
        self.send(Method::GET, IDENTITY_ENDPOINT, &[], None).await
    }

    pub async fn ad_accounts(&self, count: u32) -> Result<Vec<RemoteAdAccount>, LinkedInError> {
        let query = [("q", "search".to_string()), ("count", count.to_string())];
        self.list(AD_ACCOUNTS_ENDPOINT, &query).await
    }

    pub async fn campaigns(&self, account_id: &str) -> Result<Vec<RemoteCampaign>, LinkedInError> {
        let query = [
            ("q", "search".to_string()),
            ("search.account.values[0]", account_urn(account_id)),
        ];
        self.list(CAMPAIGNS_ENDPOINT, &query).await
    }

    pub async fn create_campaign(&self, payload: &Value) -> Result<Value, LinkedInError> {
        self.send(Method::POST, CAMPAIGNS_ENDPOINT, &[], Some(payload))
            .await
    }

    pub async fn lead_forms(&self, campaign_id: &str) -> Result<Vec<RemoteLeadForm>, LinkedInError> {
        let query = [("q", "owner".to_string()), ("owner", campaign_urn(campaign_id))];
        self.list(LEAD_FORMS_ENDPOINT, &query).await
    }

    pub async fn lead_responses(
        &self,
        form_id: &str,
    ) -> Result<Vec<RemoteLeadResponse>, LinkedInError> {
        let query = [("q", "form".to_string()), ("form", lead_form_urn(form_id))];
        self.list(LEAD_RESPONSES_ENDPOINT, &query).await
    }

    /// GET a listing page. Elements that cannot be read are logged and skipped.
    async fn list<T>(&self, endpoint: &str, query: &[(&str, String)]) -> Result<Vec<T>, LinkedInError>
    where
        T: DeserializeOwned,
    {
        let page: Elements<Value> = self.send(Method::GET, endpoint, query, None).await?;
        let (rows, dropped) = page.decode();
        if dropped > 0 {
            warn!(endpoint, dropped, "skipped unreadable elements in LinkedIn listing");
        }
        Ok(rows)
    }

    async fn send<T>(
        &self,
        method: Method,
        endpoint: &str,
        query: &[(&str, String)],
        body: Option<&Value>,
    ) -> Result<T, LinkedInError>
    where
        T: DeserializeOwned,
    {
        let url = format!("{}{}", self.base_url, endpoint);

        let mut builder = self
            .client
            .request(method.clone(), &url)
            .bearer_auth(self.credential.bearer())
            .header("X-Restli-Protocol-Version", RESTLI_PROTOCOL_VERSION)
            .query(query);

        if let Some(body) = body {
            builder = builder.json(body);
        }

        debug!(%method, endpoint, "calling LinkedIn API");

        let response = builder.send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            warn!(%method, endpoint, status = status.as_u16(), "LinkedIn API returned an error status");
            return Err(LinkedInError::from_status(status, text));
        }

        let payload = if text.trim().is_empty() { "null" } else { text.as_str() };

        serde_json::from_str(payload).map_err(|e| {
            warn!(endpoint, error = %e, "LinkedIn API returned an unparseable payload");
            LinkedInError::Malformed { body: text.clone() }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{bearer_token, body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> LinkedInClient {
        let config = LinkedInConfig {
            api_base_url: server.uri(),
            ..LinkedInConfig::default()
        };
        LinkedInClient::new(&config, Credential::new("test-token")).unwrap()
    }

    #[tokio::test]
    async fn sends_bearer_and_restli_headers() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v2/me"))
            .and(bearer_token("test-token"))
            .and(header("X-Restli-Protocol-Version", "2.0.0"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "abc123",
                "localizedFirstName": "Ada"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let profile = client_for(&server).identity().await.unwrap();
        assert_eq!(profile.id.as_deref(), Some("abc123"));
        assert_eq!(profile.localized_first_name.as_deref(), Some("Ada"));
    }

    #[tokio::test]
    async fn ad_accounts_use_bounded_count() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v2/adAccountsV2"))
            .and(query_param("q", "search"))
            .and(query_param("count", "25"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "elements": [{ "id": 1, "name": "Acme" }, { "id": 2 }]
            })))
            .mount(&server)
            .await;

        let accounts = client_for(&server).ad_accounts(25).await.unwrap();
        assert_eq!(accounts.len(), 2);
        assert_eq!(accounts[0].id.as_deref(), Some("1"));
    }

    #[tokio::test]
    async fn campaigns_are_scoped_to_account_urn() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v2/adCampaignsV2"))
            .and(query_param("search.account.values[0]", "urn:li:sponsoredAccount:507"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "elements": [{ "id": 9001, "name": "Hiring push" }]
            })))
            .mount(&server)
            .await;

        let campaigns = client_for(&server).campaigns("507").await.unwrap();
        assert_eq!(campaigns.len(), 1);
        assert_eq!(campaigns[0].name.as_deref(), Some("Hiring push"));
    }

    #[tokio::test]
    async fn unreadable_element_does_not_fail_the_page() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v2/leadFormResponses"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "elements": [
                    { "id": "lead-1", "submittedAt": "yesterday" },
                    42,
                    { "id": "lead-2", "responses": "none" }
                ]
            })))
            .mount(&server)
            .await;

        let leads = client_for(&server).lead_responses("7").await.unwrap();
        assert_eq!(leads.len(), 2);
        assert_eq!(leads[0].submitted_at, None);
        assert!(leads[1].responses.is_empty());
    }

    #[tokio::test]
    async fn unauthorized_keeps_raw_body() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v2/me"))
            .respond_with(ResponseTemplate::new(401).set_body_string("{\"message\":\"Expired\"}"))
            .mount(&server)
            .await;

        let err = client_for(&server).identity().await.unwrap_err();
        match err {
            LinkedInError::Auth { body } => assert!(body.contains("Expired")),
            other => panic!("expected auth error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn forbidden_is_a_permission_error() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v2/adAccountsV2"))
            .respond_with(ResponseTemplate::new(403).set_body_string("not approved"))
            .mount(&server)
            .await;

        let err = client_for(&server).ad_accounts(10).await.unwrap_err();
        assert!(matches!(err, LinkedInError::Permission { .. }));
    }

    #[tokio::test]
    async fn rate_limit_is_not_retried() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v2/leadForms"))
            .respond_with(ResponseTemplate::new(429).set_body_string("slow down"))
            .expect(1)
            .mount(&server)
            .await;

        let err = client_for(&server).lead_forms("42").await.unwrap_err();
        assert!(matches!(err, LinkedInError::RateLimited { .. }));
    }

    #[tokio::test]
    async fn server_error_is_a_protocol_error() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v2/leadFormResponses"))
            .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
            .mount(&server)
            .await;

        let err = client_for(&server).lead_responses("7").await.unwrap_err();
        match err {
            LinkedInError::Protocol { status, body } => {
                assert_eq!(status.as_u16(), 502);
                assert_eq!(body, "bad gateway");
            }
            other => panic!("expected protocol error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn non_json_success_is_malformed() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v2/me"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
            .mount(&server)
            .await;

        let err = client_for(&server).identity().await.unwrap_err();
        match err {
            LinkedInError::Malformed { body } => assert!(body.contains("maintenance")),
            other => panic!("expected malformed response error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn create_campaign_posts_payload() {
        let server = MockServer::start().await;
        let payload = json!({ "name": "Backend engineers", "account": account_urn("507") });

        Mock::given(method("POST"))
            .and(path("/v2/adCampaignsV2"))
            .and(body_json(&payload))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "id": 777 })))
            .mount(&server)
            .await;

        let created = client_for(&server).create_campaign(&payload).await.unwrap();
        assert_eq!(created["id"], 777);
    }

    #[tokio::test]
    async fn empty_success_body_is_null() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v2/adCampaignsV2"))
            .respond_with(ResponseTemplate::new(201))
            .mount(&server)
            .await;

        let created = client_for(&server)
            .request(Method::POST, "/v2/adCampaignsV2", &[], Some(&json!({})))
            .await
            .unwrap();
        assert!(created.is_null());
    }
}
