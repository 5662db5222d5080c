//! FILENAME: server/tests/test_calc.rs
//! Integration tests for the /api/calc pipeline against engine doubles.

mod common;

use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

use common::{sample_table, EngineCall, TestHarness};
use scenario::{SlotValue, ValidationError, INPUT_SLOTS};
use server::handler::{calc, process_request};
use server::ApiError;

#[tokio::test]
async fn end_to_end_example_scenario() {
    let harness = TestHarness::with_table(sample_table(), 2, 2);
    let body = json!({ "buildYear": "1991-1997", "sizeOfHome": 1800 });

    let csv = process_request(&harness.state, body).await.unwrap();
    assert_eq!(csv, "1,a\r\n2,b\r\n");

    let calls = harness.calls();
    // Nine writes, one recompute, one region read.
    assert_eq!(calls.len(), 11);
    assert!(calls.contains(&EngineCall::Write {
        instance: 0,
        slot: "G4".to_string(),
        value: SlotValue::Integer(1800),
    }));
    assert!(calls.contains(&EngineCall::Write {
        instance: 0,
        slot: "N6".to_string(),
        value: SlotValue::Text("Current"),
    }));
    assert_eq!(calls[9], EngineCall::Calculate { instance: 0 });
    assert_eq!(calls[10], EngineCall::Read { instance: 0 });
}

#[tokio::test]
async fn missing_build_year_never_touches_the_engine() {
    let harness = TestHarness::with_table(sample_table(), 2, 2);
    let body = json!({ "sizeOfHome": 1800 });

    let err = process_request(&harness.state, body).await.unwrap_err();
    match err {
        ApiError::Validation(ValidationError::MissingField { field }) => {
            assert_eq!(field, "buildYear");
        }
        other => panic!("expected MissingField, got {:?}", other),
    }

    assert_eq!(harness.connect_count(), 0);
    assert!(harness.calls().is_empty());
}

#[tokio::test]
async fn invalid_size_of_home_fails_fast() {
    let harness = TestHarness::with_table(sample_table(), 2, 2);
    let body = json!({ "buildYear": "1991-1997", "sizeOfHome": 0 });

    let err = process_request(&harness.state, body).await.unwrap_err();
    match err {
        ApiError::Validation(validation) => assert_eq!(validation.field(), Some("sizeOfHome")),
        other => panic!("expected validation error, got {:?}", other),
    }
    assert!(harness.calls().is_empty());
}

#[tokio::test]
async fn concurrent_requests_never_interleave_writes() {
    let harness = TestHarness::with_slow_writes(sample_table(), 2, 2);

    let first = {
        let state = harness.state.clone();
        tokio::spawn(async move {
            process_request(&state, json!({ "buildYear": "<1949", "sizeOfHome": 900 })).await
        })
    };
    let second = {
        let state = harness.state.clone();
        tokio::spawn(async move {
            process_request(&state, json!({ "buildYear": "2015-present", "sizeOfHome": 3200 }))
                .await
        })
    };

    first.await.unwrap().unwrap();
    second.await.unwrap().unwrap();

    // Each request's cycle must be contiguous: nine writes in slot order,
    // then the recompute, then the read - with no foreign calls inside.
    let calls = harness.calls();
    assert_eq!(calls.len(), 22);
    for cycle in calls.chunks(11) {
        let instance = match &cycle[0] {
            EngineCall::Write { instance, .. } => *instance,
            other => panic!("cycle starts with {:?}", other),
        };
        for (call, expected_slot) in cycle.iter().zip(INPUT_SLOTS) {
            match call {
                EngineCall::Write { instance: i, slot, .. } => {
                    assert_eq!(*i, instance);
                    assert_eq!(slot, expected_slot);
                }
                other => panic!("expected write, got {:?}", other),
            }
        }
        assert_eq!(cycle[9], EngineCall::Calculate { instance });
        assert_eq!(cycle[10], EngineCall::Read { instance });
    }
}

#[tokio::test]
async fn exhausted_pool_answers_busy() {
    let harness = TestHarness::with_table(sample_table(), 2, 2);

    // Hold the only instance so the request times out while queued.
    let _held = harness.state.pool.acquire().await.unwrap();
    let err = process_request(
        &harness.state,
        json!({ "buildYear": "1991-1997", "sizeOfHome": 1800 }),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, ApiError::Busy));
}

#[tokio::test]
async fn engine_fault_is_a_generic_computation_failure() {
    let harness = TestHarness::with_failing_compute();
    let err = process_request(
        &harness.state,
        json!({ "buildYear": "1991-1997", "sizeOfHome": 1800 }),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, ApiError::Computation));
}

#[tokio::test]
async fn wrong_output_shape_is_a_computation_failure() {
    // The double returns 2x2 but the region contract says 8x7.
    let harness = TestHarness::with_table(sample_table(), 8, 7);
    let err = process_request(
        &harness.state,
        json!({ "buildYear": "1991-1997", "sizeOfHome": 1800 }),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, ApiError::Computation));
}

#[tokio::test]
async fn failed_instance_is_not_reused() {
    let harness = TestHarness::with_failing_compute();
    let body = json!({ "buildYear": "1991-1997", "sizeOfHome": 1800 });

    process_request(&harness.state, body.clone()).await.unwrap_err();
    process_request(&harness.state, body).await.unwrap_err();

    // Each request opened a fresh instance; nothing half-written was parked.
    assert_eq!(harness.connect_count(), 2);
}

#[tokio::test]
async fn success_response_is_csv() {
    let harness = TestHarness::with_table(sample_table(), 2, 2);
    let response = calc(
        State(harness.state.clone()),
        Json(json!({ "buildYear": "1991-1997", "sizeOfHome": 1800 })),
    )
    .await
    .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::CONTENT_TYPE).unwrap(),
        "text/csv"
    );
}

#[tokio::test]
async fn error_statuses_distinguish_fault_classes() {
    let validation = ApiError::Validation(ValidationError::MissingField { field: "buildYear" });
    assert_eq!(
        validation.into_response().status(),
        StatusCode::UNPROCESSABLE_ENTITY
    );
    assert_eq!(
        ApiError::Busy.into_response().status(),
        StatusCode::SERVICE_UNAVAILABLE
    );
    assert_eq!(
        ApiError::Computation.into_response().status(),
        StatusCode::BAD_GATEWAY
    );
}
