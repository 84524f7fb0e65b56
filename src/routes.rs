use crate::{
    api::{attendance, reports},
    config::Config,
};
use actix_governor::{
    Governor, GovernorConfigBuilder, PeerIpKeyExtractor, governor::middleware::NoOpMiddleware,
};
use actix_web::web;

pub fn configure(cfg: &mut web::ServiceConfig, config: Config) {
    // Helper to build per-route limiter
    fn build_limiter(requests_per_min: u32) -> Governor<PeerIpKeyExtractor, NoOpMiddleware> {
        let per_ms = if requests_per_min == 0 {
            1
        } else {
            60_000 / requests_per_min as u64
        };
        let cfg = GovernorConfigBuilder::default()
            .per_millisecond(per_ms)
            .burst_size(requests_per_min)
            .key_extractor(PeerIpKeyExtractor)
            .finish()
            .unwrap();
        Governor::new(&cfg)
    }

    let clock_limiter = build_limiter(config.rate_clock_per_min);
    let report_limiter = build_limiter(config.rate_report_per_min);

    cfg.service(
        web::scope(&config.api_prefix)
            .service(
                web::scope("/attendance")
                    // /attendance
                    .service(
                        web::resource("")
                            .wrap(clock_limiter)
                            .route(web::post().to(attendance::clock_in))
                            .route(web::put().to(attendance::clock_out)),
                    )
                    // /attendance/status/{employee_name}
                    .service(
                        web::resource("/status/{employee_name}")
                            .route(web::get().to(attendance::get_status)),
                    ),
            )
            .service(
                web::scope("/reports")
                    .wrap(report_limiter)
                    // /reports/sessions
                    .service(
                        web::resource("/sessions").route(web::get().to(reports::list_sessions)),
                    )
                    // /reports/statistics
                    .service(
                        web::resource("/statistics")
                            .route(web::get().to(reports::get_statistics)),
                    ),
            ),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::AttendanceEngine;
    use crate::store::memory::MemorySessionStore;
    use actix_web::web::Data;
    use actix_web::{App, test};
    use serde_json::{Value, json};

    fn test_config() -> Config {
        Config {
            database_url: "mysql://unused".into(),
            server_addr: "127.0.0.1:0".into(),
            admin_token: "secret-token".into(),
            rate_clock_per_min: 1000,
            rate_report_per_min: 1000,
            api_prefix: "/api".into(),
        }
    }

    macro_rules! test_app {
        () => {{
            let config = test_config();
            let engine = Data::new(AttendanceEngine::new(std::sync::Arc::new(
                MemorySessionStore::new(),
            )));
            test::init_service(
                App::new()
                    .app_data(engine.clone())
                    .app_data(Data::new(config.clone()))
                    .configure(|cfg| configure(cfg, config.clone())),
            )
            .await
        }};
    }

    #[actix_web::test]
    async fn clock_in_round_trip_over_http() {
        let app = test_app!();

        let req = test::TestRequest::post()
            .uri("/api/attendance")
            .set_json(json!({"employee_name": "Jane Doe", "department": "Sales Team"}))
            .peer_addr("127.0.0.1:8080".parse().unwrap())
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 201);
        let session: Value = test::read_body_json(resp).await;
        assert_eq!(session["employee_name"], "Jane Doe");
        assert_eq!(session["department"], "Sales Team");
        let record_id = session["id"].as_str().unwrap().to_string();

        // Same employee, same day: conflict carrying the existing record id.
        let req = test::TestRequest::post()
            .uri("/api/attendance")
            .set_json(json!({"employee_name": "Jane Doe", "department": "Sales Team"}))
            .peer_addr("127.0.0.1:8080".parse().unwrap())
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 409);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["record_id"], record_id.as_str());

        // Status shows the open session.
        let req = test::TestRequest::get()
            .uri("/api/attendance/status/Jane%20Doe")
            .peer_addr("127.0.0.1:8080".parse().unwrap())
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 200);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["is_active"], true);
        assert_eq!(body["session"]["id"], record_id.as_str());

        // Clock out, then a second attempt conflicts.
        let req = test::TestRequest::put()
            .uri("/api/attendance")
            .set_json(json!({"record_id": record_id}))
            .peer_addr("127.0.0.1:8080".parse().unwrap())
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 200);

        let req = test::TestRequest::put()
            .uri("/api/attendance")
            .set_json(json!({"record_id": record_id}))
            .peer_addr("127.0.0.1:8080".parse().unwrap())
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 409);
    }

    #[actix_web::test]
    async fn unknown_department_is_rejected_at_the_boundary() {
        let app = test_app!();

        let req = test::TestRequest::post()
            .uri("/api/attendance")
            .set_json(json!({"employee_name": "Jane Doe", "department": "Warehouse"}))
            .peer_addr("127.0.0.1:8080".parse().unwrap())
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 400);
    }

    #[actix_web::test]
    async fn clock_out_on_unknown_record_is_404() {
        let app = test_app!();

        let req = test::TestRequest::put()
            .uri("/api/attendance")
            .set_json(json!({"record_id": "no-such-record"}))
            .peer_addr("127.0.0.1:8080".parse().unwrap())
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 404);
    }

    #[actix_web::test]
    async fn reports_require_the_admin_token() {
        let app = test_app!();

        let req = test::TestRequest::get()
            .uri("/api/reports/statistics")
            .peer_addr("127.0.0.1:8080".parse().unwrap())
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 401);

        let req = test::TestRequest::get()
            .uri("/api/reports/statistics")
            .insert_header(("x-admin-token", "wrong"))
            .peer_addr("127.0.0.1:8080".parse().unwrap())
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 401);

        let req = test::TestRequest::get()
            .uri("/api/reports/statistics")
            .insert_header(("x-admin-token", "secret-token"))
            .peer_addr("127.0.0.1:8080".parse().unwrap())
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 200);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["total_employees"], 0);
        assert_eq!(body["avg_hours_today"], 0.0);
    }

    #[actix_web::test]
    async fn session_report_applies_query_filters() {
        let app = test_app!();

        for (name, dept) in [
            ("Jane Doe", "Sales Team"),
            ("John Smith", "Sales Team"),
            ("Janet Park", "Marketing Team"),
        ] {
            let req = test::TestRequest::post()
                .uri("/api/attendance")
                .set_json(json!({"employee_name": name, "department": dept}))
                .peer_addr("127.0.0.1:8080".parse().unwrap())
            .to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), 201);
        }

        let req = test::TestRequest::get()
            .uri("/api/reports/sessions?employee_name=jan&department=Sales%20Team")
            .insert_header(("x-admin-token", "secret-token"))
            .peer_addr("127.0.0.1:8080".parse().unwrap())
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 200);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["total"], 1);
        assert_eq!(body["data"][0]["employee_name"], "Jane Doe");
    }
}
