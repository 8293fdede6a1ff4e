use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde_json::json;
use std::time::Duration;
use tracing::{debug, warn};

use locaspace_core::{CoreResult, ListingApi, MessagingApi, SessionContext};
use locaspace_shared::{BookingConfirmation, BookingRequest, Conversation, Listing, ListingId, Message};

use crate::error::ClientError;

/// Typed client for the LocaSpace REST backend, bound to one session.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    session: SessionContext,
}

impl ApiClient {
    pub fn new(base_url: &str, timeout: Duration, session: SessionContext) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(http, base_url, session))
    }

    /// Share an existing connection pool.
    pub fn with_client(http: reqwest::Client, base_url: &str, session: SessionContext) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            session,
        }
    }

    pub fn session(&self) -> &SessionContext {
        &self.session
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        debug!("{} {}", method, url);
        let builder = self.http.request(method, url);
        match self.session.authorization_header() {
            Some(value) => builder.header(reqwest::header::AUTHORIZATION, value),
            None => builder,
        }
    }

    async fn send(builder: RequestBuilder) -> Result<Response, ClientError> {
        let response = builder.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let message = response.text().await.unwrap_or_default();
        warn!(status = status.as_u16(), "Backend call failed: {}", message);
        Err(ClientError::Status {
            status: status.as_u16(),
            message,
        })
    }

    async fn send_json<T: DeserializeOwned>(builder: RequestBuilder) -> Result<T, ClientError> {
        Ok(Self::send(builder).await?.json().await?)
    }
}

#[async_trait]
impl ListingApi for ApiClient {
    async fn pending_listings(&self) -> CoreResult<Vec<Listing>> {
        Ok(Self::send_json(self.request(Method::GET, "/listings/pending")).await?)
    }

    async fn validate_listing(&self, id: &ListingId) -> CoreResult<()> {
        Self::send(self.request(Method::PUT, &format!("/listings/{}/validate", id))).await?;
        Ok(())
    }

    async fn reject_listing(&self, id: &ListingId) -> CoreResult<()> {
        Self::send(self.request(Method::DELETE, &format!("/listings/{}", id))).await?;
        Ok(())
    }

    async fn get_listing(&self, id: &ListingId) -> CoreResult<Listing> {
        Ok(Self::send_json(self.request(Method::GET, &format!("/listings/{}", id))).await?)
    }

    async fn create_booking(&self, request: &BookingRequest) -> CoreResult<BookingConfirmation> {
        Ok(Self::send_json(self.request(Method::POST, "/bookings").json(request)).await?)
    }
}

#[async_trait]
impl MessagingApi for ApiClient {
    async fn conversations(&self) -> CoreResult<Vec<Conversation>> {
        Ok(Self::send_json(self.request(Method::GET, "/conversations")).await?)
    }

    async fn messages(&self, conversation_id: &str) -> CoreResult<Vec<Message>> {
        let path = format!("/conversations/{}/messages", conversation_id);
        Ok(Self::send_json(self.request(Method::GET, &path)).await?)
    }

    async fn send_message(&self, conversation_id: &str, body: &str) -> CoreResult<Message> {
        let path = format!("/conversations/{}/messages", conversation_id);
        let builder = self.request(Method::POST, &path).json(&json!({ "body": body }));
        Ok(Self::send_json(builder).await?)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use axum::extract::Path;
    use axum::http::{HeaderMap, StatusCode};
    use axum::routing::{get, post, put};
    use axum::{Json, Router};
    use locaspace_core::{CoreError, Role};
    use serde_json::Value;

    fn listing_json(id: u64, title: &str) -> Value {
        json!({
            "id": id.to_string(),
            "title": title,
            "city": "Paris",
            "pricePerNight": 100,
            "owner": {"id": "h1", "name": "Louis", "email": "louis@locaspace.fr"},
            "status": "pending",
            "createdAt": "2024-05-01T10:00:00Z"
        })
    }

    fn require_token(headers: &HeaderMap) -> Result<(), StatusCode> {
        match headers.get("authorization").and_then(|v| v.to_str().ok()) {
            Some("Bearer secret-token") => Ok(()),
            _ => Err(StatusCode::UNAUTHORIZED),
        }
    }

    /// Minimal stand-in for the backend REST API.
    pub(crate) async fn spawn_backend() -> String {
        let app = Router::new()
            .route(
                "/listings/pending",
                get(|headers: HeaderMap| async move {
                    require_token(&headers)?;
                    Ok::<_, StatusCode>(Json(json!([listing_json(1, "Paris Loft"), listing_json(2, "Lyon Studio")])))
                }),
            )
            .route(
                "/listings/{id}/validate",
                put(|Path(id): Path<String>| async move {
                    if id == "1" { StatusCode::NO_CONTENT } else { StatusCode::INTERNAL_SERVER_ERROR }
                }),
            )
            .route(
                "/listings/{id}",
                get(|Path(id): Path<u64>| async move {
                    if id == 1 { Ok(Json(listing_json(1, "Paris Loft"))) } else { Err(StatusCode::NOT_FOUND) }
                })
                .delete(|| async { StatusCode::NO_CONTENT }),
            )
            .route(
                "/bookings",
                post(|Json(body): Json<Value>| async move {
                    Json(json!({
                        "reference": "RES000001",
                        "listingId": body["listingId"],
                        "totalPrice": body["totalPrice"]
                    }))
                }),
            )
            .route(
                "/conversations/{id}/messages",
                post(|Path(id): Path<String>, headers: HeaderMap, Json(body): Json<Value>| async move {
                    require_token(&headers)?;
                    Ok::<_, StatusCode>(Json(json!({
                        "id": "m-9",
                        "conversationId": id,
                        "senderId": "u-1",
                        "body": body["body"],
                        "sentAt": "2024-05-01T10:00:00Z"
                    })))
                })
                .get(|Path(id): Path<String>| async move {
                    Json(json!([
                        {"id": "m-2", "conversationId": id, "senderId": "u-2", "body": "Later", "sentAt": "2024-05-01T11:00:00Z"},
                        {"id": "m-1", "conversationId": id, "senderId": "u-1", "body": "First", "sentAt": "2024-05-01T10:00:00Z"}
                    ]))
                }),
            )
            .route(
                "/conversations",
                get(|| async { Json(json!([{"id": "c-1", "participants": ["u-1", "u-2"]}])) }),
            );

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }

    pub(crate) fn client(base_url: &str) -> ApiClient {
        let session = SessionContext::new("u-1", Role::Admin).with_token("secret-token");
        ApiClient::new(base_url, Duration::from_secs(5), session).unwrap()
    }

    #[tokio::test]
    async fn test_pending_listings_sends_bearer_token() {
        let base = spawn_backend().await;

        let listings = client(&base).pending_listings().await.unwrap();
        assert_eq!(listings.len(), 2);
        assert_eq!(listings[1].title, "Lyon Studio");

        let anonymous = ApiClient::new(&base, Duration::from_secs(5), SessionContext::anonymous()).unwrap();
        let err = anonymous.pending_listings().await.unwrap_err();
        assert!(matches!(err, CoreError::BackendError { status: Some(401), .. }));
    }

    #[tokio::test]
    async fn test_status_codes_map_to_core_errors() {
        let base = spawn_backend().await;
        let api = client(&base);

        api.validate_listing(&ListingId::from(1)).await.unwrap();
        assert!(matches!(
            api.validate_listing(&ListingId::from(2)).await,
            Err(CoreError::BackendError { status: Some(500), .. })
        ));
        api.reject_listing(&ListingId::from(2)).await.unwrap();

        assert_eq!(api.get_listing(&ListingId::from(1)).await.unwrap().title, "Paris Loft");
        assert!(matches!(api.get_listing(&ListingId::from(5)).await, Err(CoreError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_create_booking_round_trip() {
        let base = spawn_backend().await;
        let request = BookingRequest {
            listing_id: ListingId::from(1),
            start_date: chrono::NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
            end_date: chrono::NaiveDate::from_ymd_opt(2024, 6, 4).unwrap(),
            guests: 2,
            first_name: "Camille".to_string(),
            last_name: "Durand".to_string(),
            email: "camille.durand@mail.fr".to_string(),
            phone: "+33612345678".to_string(),
            message: String::new(),
            nights: 3,
            total_price: 345,
        };

        let confirmation = client(&base).create_booking(&request).await.unwrap();
        assert_eq!(confirmation.reference, "RES000001");
        assert_eq!(confirmation.listing_id, ListingId::from(1));
        assert_eq!(confirmation.total_price, 345);
    }

    #[tokio::test]
    async fn test_unreachable_backend() {
        let api = client("http://127.0.0.1:9");
        assert!(matches!(
            api.conversations().await,
            Err(CoreError::BackendError { status: None, .. })
        ));
    }
}
