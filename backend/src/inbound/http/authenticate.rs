//! Credential capability handler.
//!
//! ```text
//! POST /authenticate {"email":"ada@example.com","password":"secret"}
//! ```

use actix_web::{HttpResponse, post, web};

use crate::domain::{AuthPayload, Error, LoginCredentials, ResponseEnvelope};
use crate::inbound::http::ApiResult;
use crate::inbound::http::state::AuthHttpState;

/// Check an email/password pair and return the account without its hash.
///
/// Both unknown emails and wrong passwords answer 401 `invalid credentials`.
#[post("/authenticate")]
pub async fn authenticate(
    state: web::Data<AuthHttpState>,
    body: web::Bytes,
) -> ApiResult<HttpResponse> {
    let payload: AuthPayload = serde_json::from_slice(&body)
        .map_err(|err| Error::invalid_request(format!("malformed request body: {err}")))?;
    let credentials = LoginCredentials::try_from_parts(&payload.email, &payload.password)
        .map_err(|err| Error::invalid_request(err.to_string()))?;

    let user = state.login.authenticate(&credentials).await?;
    let data = serde_json::to_value(&user)
        .map_err(|err| Error::internal(format!("failed to encode user: {err}")))?;
    Ok(HttpResponse::Ok().json(ResponseEnvelope::success(
        "Successfully authenticated",
        Some(data),
    )))
}

#[cfg(test)]
mod tests {
    //! Handler coverage against a mocked login service.
    use std::sync::Arc;

    use super::*;
    use crate::domain::ports::MockLoginService;
    use crate::domain::{EmailAddress, PublicUser, UserId};
    use actix_web::http::StatusCode;
    use actix_web::{App, test as actix_test};
    use chrono::Utc;
    use rstest::rstest;
    use serde_json::Value;

    fn public_user() -> PublicUser {
        let now = Utc::now();
        PublicUser {
            id: UserId::new(1),
            email: EmailAddress::new("ada@example.com").expect("valid email"),
            first_name: Some("Ada".to_owned()),
            last_name: None,
            active: true,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    async fn post_body(login: MockLoginService, body: &'static str) -> (StatusCode, Value) {
        let state = web::Data::new(AuthHttpState::new(Arc::new(login)));
        let app = actix_test::init_service(App::new().app_data(state).service(authenticate)).await;
        let request = actix_test::TestRequest::post()
            .uri("/authenticate")
            .insert_header(("content-type", "application/json"))
            .set_payload(body)
            .to_request();
        let response = actix_test::call_service(&app, request).await;
        let status = response.status();
        let value: Value = actix_test::read_body_json(response).await;
        (status, value)
    }

    #[actix_web::test]
    async fn valid_credentials_return_user_without_hash() {
        let mut login = MockLoginService::new();
        login
            .expect_authenticate()
            .withf(|creds| creds.email().as_str() == "ada@example.com" && creds.password() == "pw")
            .times(1)
            .returning(|_| Ok(public_user()));

        let (status, body) =
            post_body(login, r#"{"email":"ada@example.com","password":"pw"}"#).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["error"], Value::Bool(false));
        assert_eq!(body["message"], "Successfully authenticated");
        assert_eq!(body["data"]["email"], "ada@example.com");
        assert!(body["data"].get("password").is_none());
        assert!(body["data"].get("password_hash").is_none());
    }

    #[actix_web::test]
    async fn rejected_credentials_answer_unauthorised() {
        let mut login = MockLoginService::new();
        login
            .expect_authenticate()
            .returning(|_| Err(Error::unauthorized("invalid credentials")));

        let (status, body) =
            post_body(login, r#"{"email":"ada@example.com","password":"nope"}"#).await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], Value::Bool(true));
        assert_eq!(body["message"], "invalid credentials");
    }

    #[rstest]
    #[case::not_json("not json")]
    #[case::missing_password(r#"{"email":"ada@example.com"}"#)]
    #[case::blank_email(r#"{"email":"  ","password":"pw"}"#)]
    #[case::blank_password(r#"{"email":"ada@example.com","password":""}"#)]
    #[case::bad_email(r#"{"email":"ada","password":"pw"}"#)]
    #[actix_web::test]
    async fn malformed_requests_are_rejected_before_lookup(#[case] body: &'static str) {
        let mut login = MockLoginService::new();
        login.expect_authenticate().never();

        let (status, value) = post_body(login, body).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(value["error"], Value::Bool(true));
    }
}
