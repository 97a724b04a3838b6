/// Integration tests for component status changes
/// Covers immediate issuance failures, runtime-reported failures, telling
/// concurrent toggles apart, and the synchronous status helpers.

use xrlink_client::SetStatusOutcome;
use xrlink_shared::{
    ComponentType, Operation, RawEvent, ResultCode, SpaceHandle, SpatialError, Uuid,
    EVENT_SPACE_SET_STATUS_COMPLETE,
};
use xrlink_test::{
    assert_call_count, assert_no_pending_requests, test_client, test_client_with, MockRuntime,
    Recorder,
};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[test]
fn immediate_failure_calls_back_with_component_and_desired_value() {
    init_logging();
    let mut client = test_client();
    let space = client
        .runtime_mut()
        .add_space(Uuid::from_u128(1), false, &[ComponentType::Locatable]);
    client.runtime_mut().fail_next_issue(
        Operation::SetComponentStatus,
        ResultCode::ERROR_SPACE_COMPONENT_STATUS_PENDING,
    );
    let outcomes = Recorder::new();

    let issued = client.set_component_enabled(space, ComponentType::Storable, true, outcomes.sink());

    assert!(!issued);
    assert_eq!(
        outcomes.take(),
        vec![SetStatusOutcome {
            space,
            component: ComponentType::Storable,
            enabled: true,
            result: Err(SpatialError::IssueFailed {
                operation: Operation::SetComponentStatus,
                code: ResultCode::ERROR_SPACE_COMPONENT_STATUS_PENDING,
            }),
        }]
    );
    assert_no_pending_requests!(client);
    assert_eq!(client.runtime().pending_events(), 0);
}

#[test]
fn completion_enables_component() {
    let mut client = test_client();
    let space = client.runtime_mut().add_space(Uuid::from_u128(1), false, &[]);
    let outcomes = Recorder::new();

    assert!(!client.is_component_enabled(space, ComponentType::Storable));
    assert!(client.set_component_enabled(space, ComponentType::Storable, true, outcomes.sink()));
    assert_eq!(client.pending_requests(), 1);

    client.tick();

    let outcomes = outcomes.take();
    assert_eq!(outcomes.len(), 1);
    assert_eq!(outcomes[0].result, Ok(()));
    assert!(client.is_component_enabled(space, ComponentType::Storable));
    assert_no_pending_requests!(client);
}

#[test]
fn runtime_failure_is_reported_with_request_fields() {
    let mut client = test_client();
    let space = client.runtime_mut().add_space(Uuid::from_u128(1), false, &[]);
    client
        .runtime_mut()
        .fail_next_completion(Operation::SetComponentStatus, ResultCode::ERROR_RUNTIME_FAILURE);
    let outcomes = Recorder::new();

    client.set_component_enabled(space, ComponentType::Locatable, true, outcomes.sink());
    client.tick();

    let outcome = outcomes.take().remove(0);
    assert_eq!(outcome.component, ComponentType::Locatable);
    assert!(outcome.enabled);
    assert_eq!(
        outcome.result,
        Err(SpatialError::RuntimeFailed {
            operation: Operation::SetComponentStatus,
            code: ResultCode::ERROR_RUNTIME_FAILURE,
        })
    );
    assert!(!client.is_component_enabled(space, ComponentType::Locatable));
}

#[test]
fn concurrent_toggles_on_one_space_are_told_apart() {
    let mut client = test_client_with(MockRuntime::manual());
    let space = SpaceHandle::new(4);
    let uuid = Uuid::from_u128(4);
    let outcomes = Recorder::new();

    client.set_component_enabled(space, ComponentType::Storable, true, outcomes.sink());
    let storable_id = client.runtime().last_request_id().unwrap();
    client.set_component_enabled(space, ComponentType::Sharable, false, outcomes.sink());
    let sharable_id = client.runtime().last_request_id().unwrap();

    // completions arrive in reverse order
    let runtime = client.runtime_mut();
    runtime.push_event(
        RawEvent::new(EVENT_SPACE_SET_STATUS_COMPLETE)
            .with_request_id(sharable_id)
            .with_space(space, uuid)
            .with_component(ComponentType::Sharable, false),
    );
    runtime.push_event(
        RawEvent::new(EVENT_SPACE_SET_STATUS_COMPLETE)
            .with_request_id(storable_id)
            .with_result(ResultCode::ERROR_SPACE_COMPONENT_NOT_SUPPORTED)
            .with_space(space, uuid)
            .with_component(ComponentType::Storable, true),
    );
    client.tick();

    let outcomes = outcomes.take();
    assert_eq!(outcomes.len(), 2);
    assert_eq!(outcomes[0].component, ComponentType::Sharable);
    assert_eq!(outcomes[0].result, Ok(()));
    assert_eq!(outcomes[1].component, ComponentType::Storable);
    assert!(outcomes[1].result.is_err());
    assert_no_pending_requests!(client);
}

#[test]
fn completion_with_unknown_component_reports_the_requested_one() {
    let mut client = test_client_with(MockRuntime::manual());
    let space = SpaceHandle::new(6);
    let outcomes = Recorder::default();

    client.set_component_enabled(space, ComponentType::Storable, true, outcomes.sink());
    let request_id = client.runtime().last_request_id().unwrap();
    let mut raw = RawEvent::new(EVENT_SPACE_SET_STATUS_COMPLETE)
        .with_request_id(request_id)
        .with_space(space, Uuid::from_u128(6));
    raw.component = Some(999);
    client.runtime_mut().push_event(raw);
    client.tick();

    let outcomes: Vec<SetStatusOutcome> = outcomes.take();
    assert_eq!(
        outcomes,
        vec![SetStatusOutcome {
            space,
            component: ComponentType::Storable,
            enabled: true,
            result: Ok(()),
        }]
    );
    assert_no_pending_requests!(client);
}

#[test]
fn supported_components_are_enumerated() {
    let mut client = test_client();
    let space = client
        .runtime_mut()
        .add_space(Uuid::from_u128(1), false, &[ComponentType::Bounded2D]);

    let components = client.supported_components(space).unwrap();

    assert_eq!(
        components,
        vec![
            ComponentType::Locatable,
            ComponentType::Storable,
            ComponentType::Bounded2D,
        ]
    );
    // sizing call plus fill call
    assert_call_count!(client, Operation::EnumerateSupportedComponents, 2);
}

#[test]
fn supported_components_of_unknown_space_fail() {
    let mut client = test_client();

    let error = client.supported_components(SpaceHandle::new(77)).unwrap_err();

    assert_eq!(error.code(), Some(ResultCode::ERROR_HANDLE_INVALID));
}
