// src/web/mod.rs
pub mod auth;

pub use auth::{AuthConfig, AuthenticatedUser};

use anyhow::Result;
use rocket::fairing::{Fairing, Info, Kind};
use rocket::http::{Header, Status};
use rocket::serde::json::Json;
use rocket::{catch, catchers, get, options, post, routes, Build, Request, Response, Rocket, State};
use std::sync::Arc;
use tracing::{error, info};

use crate::config::{jwt_secret, AppConfig};
use crate::linkedin_api::{EnvTokenProvider, TokenProvider};
use crate::linkedin_sync::{dispatch_body, LinkedInSync, SyncOutcome};
use crate::store::SqliteStore;

pub type AppSync = LinkedInSync<SqliteStore>;

// CORS Fairing
pub struct Cors;

#[rocket::async_trait]
impl Fairing for Cors {
    fn info(&self) -> Info {
        Info {
            name: "Add CORS headers to responses",
            kind: Kind::Response,
        }
    }

    async fn on_response<'r>(&self, _request: &'r Request<'_>, response: &mut Response<'r>) {
        response.set_header(Header::new("Access-Control-Allow-Origin", "*"));
        response.set_header(Header::new("Access-Control-Allow-Methods", "POST, GET, OPTIONS"));
        response.set_header(Header::new(
            "Access-Control-Allow-Headers",
            "authorization, x-client-info, apikey, content-type",
        ));
        response.set_header(Header::new("Access-Control-Allow-Credentials", "true"));
    }
}

#[post("/linkedin-sync", data = "<body>")]
pub async fn linkedin_sync(
    body: String,
    user: Option<AuthenticatedUser>,
    sync: &State<AppSync>,
) -> (Status, Json<SyncOutcome>) {
    let owner_id = user.as_ref().map(|u| u.user_id.as_str());
    let dispatched = dispatch_body(sync.inner(), owner_id, &body).await;
    let status = Status::from_code(dispatched.status).unwrap_or(Status::InternalServerError);
    (status, Json(dispatched.outcome))
}

#[get("/health")]
pub async fn health(sync: &State<AppSync>) -> Result<&'static str, Status> {
    match sync.store().health_check().await {
        Ok(()) => Ok("OK"),
        Err(e) => {
            error!(error = %e, "Health check failed");
            Err(Status::ServiceUnavailable)
        }
    }
}

#[options("/<_..>")]
pub async fn options() -> Status {
    Status::Ok
}

// Error catchers
#[catch(400)]
pub fn bad_request() -> Json<SyncOutcome> {
    Json(SyncOutcome::failed(
        "Invalid request format",
        "Send a JSON body with an action field",
    ))
}

#[catch(422)]
pub fn unprocessable() -> Json<SyncOutcome> {
    Json(SyncOutcome::failed(
        "Request body does not match the expected shape",
        "Send { \"action\": \"...\", \"campaignData\": {...} } with a string action",
    ))
}

#[catch(500)]
pub fn internal_error() -> Json<SyncOutcome> {
    Json(SyncOutcome::failed(
        "Internal server error",
        "Try again in a few moments and check the server logs",
    ))
}

pub fn build_rocket(port: u16, sync: AppSync, auth_config: AuthConfig) -> Rocket<Build> {
    let figment = rocket::Config::figment()
        .merge(("port", port))
        .merge(("address", "0.0.0.0"));

    rocket::custom(figment)
        .attach(Cors)
        .manage(sync)
        .manage(auth_config)
        .register("/api", catchers![bad_request, unprocessable, internal_error])
        .mount("/api", routes![linkedin_sync, health, options])
}

// Main server start function
pub async fn start_web_server(config: AppConfig) -> Result<()> {
    let auth_config = AuthConfig::new(jwt_secret()?, config.auth.audience.clone());

    let store = match SqliteStore::new(&config.database_path).await {
        Ok(store) => store,
        Err(e) => {
            error!("Failed to initialize database: {}", e);
            return Err(e);
        }
    };

    let tokens: Arc<dyn TokenProvider> = Arc::new(EnvTokenProvider::new());
    if tokens.token().is_none() {
        info!("LINKEDIN_ACCESS_TOKEN not set, sync commands will report LinkedIn as not configured");
    }

    info!("Starting recruit-sync API server");
    info!("Database: {}", config.database_path.display());
    info!("LinkedIn API: {}", config.linkedin.api_base_url);
    info!("Server: http://0.0.0.0:{}", config.port);

    let sync = LinkedInSync::new(config.linkedin.clone(), tokens, store);

    build_rocket(config.port, sync, auth_config)
        .launch()
        .await
        .map_err(|e| anyhow::anyhow!("Rocket server failed: {}", e))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LinkedInConfig;
    use crate::linkedin_api::StaticTokenProvider;
    use crate::web::auth::tests::{session_token, SECRET};
    use rocket::http::ContentType;
    use rocket::local::asynchronous::Client;
    use serde_json::{json, Value};

    async fn client() -> Client {
        let store = SqliteStore::in_memory().await.unwrap();
        let sync = LinkedInSync::new(
            LinkedInConfig::default(),
            Arc::new(StaticTokenProvider::new(None)),
            store,
        );
        let auth = AuthConfig::new(SECRET.to_string(), Some("authenticated".to_string()));
        Client::tracked(build_rocket(0, sync, auth)).await.unwrap()
    }

    fn bearer(sub: &str) -> Header<'static> {
        Header::new(
            "Authorization",
            format!("Bearer {}", session_token(sub, Some("authenticated"), SECRET)),
        )
    }

    async fn post(client: &Client, body: Value, auth: Option<Header<'static>>) -> (Status, Value) {
        let mut request = client
            .post("/api/linkedin-sync")
            .header(ContentType::JSON)
            .body(body.to_string());
        if let Some(header) = auth {
            request = request.header(header);
        }
        let response = request.dispatch().await;
        let status = response.status();
        let body: Value = response.into_json().await.unwrap();
        (status, body)
    }

    #[rocket::async_test]
    async fn missing_session_is_401() {
        let client = client().await;

        let (status, body) = post(&client, json!({ "action": "sync-leads" }), None).await;

        assert_eq!(status, Status::Unauthorized);
        assert_eq!(body["success"], false);
    }

    #[rocket::async_test]
    async fn forged_session_is_401() {
        let client = client().await;
        let forged = Header::new(
            "Authorization",
            format!("Bearer {}", session_token("user-1", Some("authenticated"), "nope")),
        );

        let (status, _) = post(&client, json!({ "action": "sync-leads" }), Some(forged)).await;

        assert_eq!(status, Status::Unauthorized);
    }

    #[rocket::async_test]
    async fn unconfigured_linkedin_is_200_with_zero_count() {
        let client = client().await;

        let (status, body) =
            post(&client, json!({ "action": "sync-ad-accounts" }), Some(bearer("user-1"))).await;

        assert_eq!(status, Status::Ok);
        assert_eq!(body["success"], true);
        assert_eq!(body["count"], 0);
        assert!(body.get("error").is_none());
    }

    #[rocket::async_test]
    async fn unknown_action_is_400() {
        let client = client().await;

        let (status, body) =
            post(&client, json!({ "action": "export-all" }), Some(bearer("user-1"))).await;

        assert_eq!(status, Status::BadRequest);
        assert_eq!(body["error"], "Invalid action: export-all");
    }

    #[rocket::async_test]
    async fn unparseable_body_uses_outcome_envelope() {
        let client = client().await;

        let response = client
            .post("/api/linkedin-sync")
            .header(ContentType::JSON)
            .header(bearer("user-1"))
            .body("not json")
            .dispatch()
            .await;

        assert_eq!(response.status(), Status::BadRequest);
        let body: Value = response.into_json().await.unwrap();
        assert_eq!(body["success"], false);
        assert!(body["error"].as_str().unwrap().starts_with("Invalid request body"));
        assert!(body["troubleshooting"].is_string());
    }

    #[rocket::async_test]
    async fn unparseable_body_without_session_is_401() {
        let client = client().await;

        for body in ["not json", r#"{ "action": 42 }"#] {
            let response = client
                .post("/api/linkedin-sync")
                .header(ContentType::JSON)
                .body(body)
                .dispatch()
                .await;

            assert_eq!(response.status(), Status::Unauthorized);
            let json: Value = response.into_json().await.unwrap();
            assert_eq!(json["success"], false);
        }
    }

    #[rocket::async_test]
    async fn health_checks_database() {
        let client = client().await;

        let response = client.get("/api/health").dispatch().await;

        assert_eq!(response.status(), Status::Ok);
        assert_eq!(response.into_string().await.unwrap(), "OK");
    }

    #[rocket::async_test]
    async fn responses_carry_cors_headers() {
        let client = client().await;

        let response = client.options("/api/linkedin-sync").dispatch().await;

        assert_eq!(response.status(), Status::Ok);
        assert_eq!(
            response.headers().get_one("Access-Control-Allow-Origin"),
            Some("*")
        );
    }
}
