//! Server construction and middleware wiring.

mod config;
mod state_builders;

pub use config::{CredentialConfig, ServerConfig};

use state_builders::build_http_state;

use actix_web::body::MessageBody;
use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer, web};

use wishlist_backend::Trace;
#[cfg(debug_assertions)]
use wishlist_backend::doc::ApiDoc;
use wishlist_backend::inbound::http::health::{HealthState, live, ready};
use wishlist_backend::inbound::http::routes::configure;
use wishlist_backend::inbound::http::state::HttpState;
use wishlist_backend::middleware::CorsPolicy;
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

#[derive(Clone)]
struct AppDependencies {
    health_state: web::Data<HealthState>,
    http_state: web::Data<HttpState>,
    cors: CorsPolicy,
}

fn build_app(
    deps: AppDependencies,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse<impl MessageBody>,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let AppDependencies {
        health_state,
        http_state,
        cors,
    } = deps;

    let app = App::new()
        .app_data(health_state)
        .app_data(http_state)
        .wrap(Trace)
        .wrap(cors.build())
        .configure(configure)
        .service(ready)
        .service(live);

    #[cfg(debug_assertions)]
    let app = app.service(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()));
    #[cfg(not(debug_assertions))]
    let app = app;

    app
}

/// Construct an Actix HTTP server using the provided health state and configuration.
///
/// The readiness probe flips to ready once the listener is bound.
///
/// # Errors
/// Propagates [`std::io::Error`] when the services cannot be built or the
/// socket cannot be bound.
pub fn create_server(
    health_state: web::Data<HealthState>,
    config: ServerConfig,
) -> std::io::Result<Server> {
    let server_health_state = health_state.clone();
    let http_state = build_http_state(&config)?;
    let cors = config.cors.clone();

    let server = HttpServer::new(move || {
        build_app(AppDependencies {
            health_state: server_health_state.clone(),
            http_state: http_state.clone(),
            cors: cors.clone(),
        })
    })
    .bind(config.bind_addr())?
    .run();

    health_state.mark_ready();
    Ok(server)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::SocketAddr;

    use actix_web::http::{Method, StatusCode, header};
    use actix_web::test as actix_test;
    use chrono::TimeDelta;
    use rstest::rstest;
    use serde_json::{Value, json};

    fn deps(is_ready: bool) -> AppDependencies {
        let health_state = web::Data::new(HealthState::new());
        if is_ready {
            health_state.mark_ready();
        }
        let config = ServerConfig::new(
            SocketAddr::from(([127, 0, 0, 1], 0)),
            CredentialConfig::new("test-secret", TimeDelta::minutes(5)).with_hash_costs(8, 1),
        );
        AppDependencies {
            health_state,
            http_state: build_http_state(&config).expect("state builds"),
            cors: config.cors.clone(),
        }
    }

    #[rstest]
    #[case(false, StatusCode::SERVICE_UNAVAILABLE)]
    #[case(true, StatusCode::OK)]
    #[actix_web::test]
    async fn readiness_reflects_health_state(
        #[case] is_ready: bool,
        #[case] expected: StatusCode,
    ) {
        let app = actix_test::init_service(build_app(deps(is_ready))).await;

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri("/health/ready")
                .to_request(),
        )
        .await;

        assert_eq!(res.status(), expected);
    }

    #[actix_web::test]
    async fn responses_carry_trace_id_header() {
        let app = actix_test::init_service(build_app(deps(true))).await;

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri("/api/v1/wishes/last")
                .to_request(),
        )
        .await;

        assert_eq!(res.status(), StatusCode::OK);
        assert!(res.headers().contains_key("trace-id"));
    }

    #[actix_web::test]
    async fn browser_preflight_is_granted() {
        let app = actix_test::init_service(build_app(deps(true))).await;

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::default()
                .method(Method::OPTIONS)
                .uri("/api/v1/wishes/last")
                .insert_header((header::ORIGIN, "https://gifts.example"))
                .insert_header((header::ACCESS_CONTROL_REQUEST_METHOD, "GET"))
                .to_request(),
        )
        .await;

        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(
            res.headers()
                .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
                .expect("allow-origin header"),
            "https://gifts.example"
        );
    }

    #[actix_web::test]
    async fn signup_through_the_full_stack() {
        let app = actix_test::init_service(build_app(deps(true))).await;

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/api/v1/signup")
                .set_json(json!({
                    "username": "alice",
                    "email": "alice@example.com",
                    "password": "hunter22"
                }))
                .to_request(),
        )
        .await;

        assert_eq!(res.status(), StatusCode::CREATED);
        let body: Value = actix_test::read_body_json(res).await;
        assert_eq!(body["username"], "alice");
        assert!(body.get("password").is_none());
    }
}
