use std::sync::Arc;
use std::time::Duration;

use judge_client::{ApiSettings, AsyncResource, Endpoints, Producer, ReqwestApi};
use judge_core::{Phase, GENERIC_FAILURE_MESSAGE};
use pretty_assertions::assert_eq;
use serde_json::json;
use tokio::runtime::Handle;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn endpoints(server: &MockServer, settings: ApiSettings) -> Endpoints {
    let settings = ApiSettings {
        base_url: format!("{}/api", server.uri()),
        ..settings
    };
    Endpoints::new(Arc::new(ReqwestApi::new(settings).expect("api client")))
}

#[tokio::test]
async fn problem_list_is_decoded() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/problems"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "_id": "507f1f77bcf86cd799439011", "title": "Two Sum", "difficulty": "easy" },
            { "id": "507f1f77bcf86cd799439012", "title": "LRU Cache", "tags": ["design"] }
        ])))
        .mount(&server)
        .await;

    let problems = endpoints(&server, ApiSettings::default())
        .problems()
        .produce()
        .await
        .expect("problems");

    assert_eq!(problems.len(), 2);
    assert_eq!(problems[0].title, "Two Sum");
    assert_eq!(problems[0].difficulty.as_deref(), Some("easy"));
    assert_eq!(problems[1].id, "507f1f77bcf86cd799439012");
    assert_eq!(problems[1].tags, vec!["design".to_string()]);
}

#[tokio::test]
async fn server_message_becomes_failure_message() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/problems/missing"))
        .respond_with(
            ResponseTemplate::new(404).set_body_json(json!({ "message": "Problem not found" })),
        )
        .mount(&server)
        .await;

    let err = endpoints(&server, ApiSettings::default())
        .problem("missing")
        .produce()
        .await
        .unwrap_err();

    assert_eq!(err.status(), Some(404));
    assert_eq!(err.normalized_message(), "Problem not found");
}

#[tokio::test]
async fn status_text_used_when_body_has_no_message() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/contests"))
        .respond_with(ResponseTemplate::new(500).set_body_string("internal error"))
        .mount(&server)
        .await;

    let err = endpoints(&server, ApiSettings::default())
        .contests()
        .produce()
        .await
        .unwrap_err();

    assert_eq!(err.normalized_message(), "Request failed with status code 500");
    assert_ne!(err.normalized_message(), GENERIC_FAILURE_MESSAGE);
}

#[tokio::test]
async fn slow_response_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/contests"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(Duration::from_millis(250))
                .set_body_json(json!([])),
        )
        .mount(&server)
        .await;

    let settings = ApiSettings {
        request_timeout: Duration::from_millis(50),
        ..ApiSettings::default()
    };
    let err = endpoints(&server, settings)
        .contests()
        .produce()
        .await
        .unwrap_err();

    assert_eq!(err.normalized_message(), "The request timed out.");
}

#[tokio::test]
async fn oversized_body_is_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/forum/threads"))
        .respond_with(ResponseTemplate::new(200).set_body_string("[\"0123456789\"]"))
        .mount(&server)
        .await;

    let settings = ApiSettings {
        max_bytes: 4,
        ..ApiSettings::default()
    };
    let err = endpoints(&server, settings)
        .forum_threads(None)
        .produce()
        .await
        .unwrap_err();

    assert!(err.normalized_message().starts_with("response too large"));
}

#[tokio::test]
async fn forum_category_is_sent_as_query() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/forum/threads"))
        .and(query_param("category", "dynamic programming"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "_id": "t1", "title": "Knapsack help", "replyCount": 3 }
        ])))
        .mount(&server)
        .await;

    let threads = endpoints(&server, ApiSettings::default())
        .forum_threads(Some("dynamic programming"))
        .produce()
        .await
        .expect("threads");

    assert_eq!(threads[0].reply_count, 3);
}

#[tokio::test]
async fn resource_surfaces_server_error_and_recovers_on_retry() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/problems/507f1f77bcf86cd799439011"))
        .respond_with(
            ResponseTemplate::new(503).set_body_json(json!({ "message": "Judge is busy" })),
        )
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/problems/507f1f77bcf86cd799439011"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "_id": "507f1f77bcf86cd799439011",
            "title": "Two Sum",
            "statement": "Find two numbers.",
            "timeLimitMs": 1000
        })))
        .mount(&server)
        .await;

    let endpoints = endpoints(&server, ApiSettings::default());
    let resource = AsyncResource::builder(endpoints.problem("507f1f77bcf86cd799439011"))
        .name("problem")
        .bind(&Handle::current());

    let failed = wait_for_phase(&resource, Phase::Failed).await;
    assert_eq!(failed.error.as_deref(), Some("Judge is busy"));

    resource.refetch();
    let loaded = wait_for_phase(&resource, Phase::Succeeded).await;
    let problem = loaded.data.expect("problem");
    assert_eq!(problem.title, "Two Sum");
    assert_eq!(problem.time_limit_ms, Some(1000));
    assert_eq!(loaded.error, None);
}

async fn wait_for_phase<T: Clone + Send + 'static>(
    resource: &AsyncResource<T>,
    phase: Phase,
) -> judge_core::ResourceView<T> {
    tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            let view = resource.view();
            if view.phase == phase {
                return view;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("resource reached phase")
}
