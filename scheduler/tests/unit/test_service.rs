//! Deployment service tests

mod common;

use std::collections::HashMap;

use tokio_test::{assert_err, assert_ok};

use rolloutd::errors::{DeploymentError, Step};
use rolloutd::models::deployment::{
    Deployment, DeploymentHealth, DeploymentStatus, FailedInstance,
};

use common::{
    environment, Harness, MockClusterState, MockScheduler, MockStore, WriteReply, CLUSTER,
    ENVIRONMENT, TASK_DEFINITION,
};

fn assert_dependency_failure(result: Result<impl std::fmt::Debug, DeploymentError>, step: Step) {
    match result {
        Err(DeploymentError::DependencyFailure { step: actual, .. }) => assert_eq!(actual, step),
        other => panic!("expected dependency failure during {}, got {:?}", step, other),
    }
}

// ================================ INPUT VALIDATION ================================ //

#[tokio::test]
async fn test_create_deployment_empty_environment_name() {
    let h = Harness::standard(Vec::new());

    let result = h.service.create_deployment("", "").await;

    assert!(matches!(result, Err(DeploymentError::InvalidInput(_))));
    assert_eq!(h.total_calls(), 0);
}

#[tokio::test]
async fn test_get_deployment_empty_arguments() {
    let h = Harness::standard(Vec::new());

    let result = h.service.get_deployment("", "some-id").await;
    assert!(matches!(result, Err(DeploymentError::InvalidInput(_))));

    let result = h.service.get_deployment(ENVIRONMENT, "").await;
    assert!(matches!(result, Err(DeploymentError::InvalidInput(_))));

    assert_eq!(h.total_calls(), 0);
}

#[tokio::test]
async fn test_list_deployments_empty_environment_name() {
    let h = Harness::standard(Vec::new());

    let result = h.service.list_deployments("").await;

    assert!(matches!(result, Err(DeploymentError::InvalidInput(_))));
    assert_eq!(h.total_calls(), 0);
}

// ================================ CREATE DEPLOYMENT ================================ //

#[tokio::test]
async fn test_create_deployment_get_environment_fails() {
    let h = Harness::standard(Vec::new());
    h.store.fail_get();

    let result = h.service.create_deployment(ENVIRONMENT, "").await;

    assert_dependency_failure(result, Step::FetchEnvironment);
    assert!(h.store.adds().is_empty());
}

#[tokio::test]
async fn test_create_deployment_environment_missing() {
    let h = Harness::new(
        MockStore::new(None),
        MockClusterState::new(&["I1"]),
        MockScheduler::new(Vec::new()),
    );

    let result = h.service.create_deployment(ENVIRONMENT, "").await;

    assert!(matches!(result, Err(DeploymentError::NotFound(_))));
    assert!(h.store.adds().is_empty());
}

#[tokio::test]
async fn test_create_deployment_outdated_token() {
    let h = Harness::standard(Vec::new());

    let result = h.service.create_deployment(ENVIRONMENT, "invalid").await;

    assert!(matches!(result, Err(DeploymentError::Conflict(_))));
    assert!(h.store.adds().is_empty());
    assert!(h.store.updates().is_empty());
    assert!(h.cluster_state.calls().is_empty());
    assert!(h.scheduler.calls().is_empty());
}

#[tokio::test]
async fn test_create_deployment_add_deployment_fails() {
    let h = Harness::standard(Vec::new());
    h.store.reply_to_add(WriteReply::Fail);

    let result = h.service.create_deployment(ENVIRONMENT, "").await;

    assert_dependency_failure(result, Step::AddDeployment);
    assert!(h.cluster_state.calls().is_empty());
    assert!(h.scheduler.calls().is_empty());
}

#[tokio::test]
async fn test_create_deployment_add_deployment_conflicts() {
    let h = Harness::standard(Vec::new());
    h.store.reply_to_add(WriteReply::Conflict);

    let result = h.service.create_deployment(ENVIRONMENT, "").await;

    assert!(matches!(result, Err(DeploymentError::Conflict(_))));
    assert!(h.cluster_state.calls().is_empty());
}

#[tokio::test]
async fn test_create_deployment_appends_pending_deployment() {
    let env = environment();
    let token = env.token.clone();
    let h = Harness::new(
        MockStore::new(Some(env)),
        MockClusterState::new(&["I1", "I2"]),
        MockScheduler::new(Vec::new()),
    );

    assert_ok!(h.service.create_deployment(ENVIRONMENT, &token).await);

    let adds = h.store.adds();
    assert_eq!(adds.len(), 1);
    assert_eq!(adds[0].snapshot_token, token);

    let appended = &adds[0].deployment;
    assert!(!appended.id.is_empty());
    assert_eq!(appended.task_definition, TASK_DEFINITION);
    assert_eq!(appended.status, DeploymentStatus::Pending);
    assert_eq!(appended.health, DeploymentHealth::Healthy);
    assert_eq!(appended.desired_task_count, 0);
    assert!(appended.end_time.is_none());
    assert!(appended.failed_instances.is_empty());
}

#[tokio::test]
async fn test_create_deployment_there_is_an_in_progress_deployment() {
    let mut env = environment();
    let mut in_progress = Deployment::new(TASK_DEFINITION);
    in_progress.status = DeploymentStatus::InProgress;
    env.deployments.insert(in_progress.id.clone(), in_progress);

    let h = Harness::new(
        MockStore::new(Some(env)),
        MockClusterState::new(&["I1", "I2"]),
        MockScheduler::new(Vec::new()),
    );

    let deployment = h.service.create_deployment(ENVIRONMENT, "").await.unwrap();

    assert_eq!(deployment.status, DeploymentStatus::Pending);
    assert_eq!(deployment.health, DeploymentHealth::Healthy);
    assert_eq!(deployment.desired_task_count, 0);
    assert_eq!(deployment, h.store.adds()[0].deployment);
    assert!(h.cluster_state.calls().is_empty());
    assert!(h.scheduler.calls().is_empty());
    assert!(h.store.updates().is_empty());
}

#[tokio::test]
async fn test_create_deployment_ignores_other_pending_deployments() {
    let mut env = environment();
    let pending = Deployment::new(TASK_DEFINITION);
    env.deployments.insert(pending.id.clone(), pending);

    let h = Harness::new(
        MockStore::new(Some(env)),
        MockClusterState::new(&["I1"]),
        MockScheduler::new(Vec::new()),
    );

    let deployment = h.service.create_deployment(ENVIRONMENT, "").await.unwrap();

    assert_eq!(deployment.status, DeploymentStatus::InProgress);
    assert_eq!(h.scheduler.calls().len(), 1);
}

#[tokio::test]
async fn test_create_deployment_list_instances_fails() {
    let h = Harness::new(
        MockStore::new(Some(environment())),
        MockClusterState::failing(),
        MockScheduler::new(Vec::new()),
    );

    let result = h.service.create_deployment(ENVIRONMENT, "").await;

    assert_dependency_failure(result, Step::ListInstances);
    assert_eq!(h.cluster_state.calls(), vec![CLUSTER]);
    assert!(h.scheduler.calls().is_empty());
    assert!(h.store.updates().is_empty());
}

#[tokio::test]
async fn test_create_deployment_list_instances_is_empty() {
    let h = Harness::new(
        MockStore::new(Some(environment())),
        MockClusterState::new(&[]),
        MockScheduler::new(Vec::new()),
    );

    let result = h.service.create_deployment(ENVIRONMENT, "").await;

    assert!(matches!(result, Err(DeploymentError::NoInstances(_))));
    assert!(h.scheduler.calls().is_empty());
    assert!(h.store.updates().is_empty());

    // The pending record stays visible
    let deployments = h.service.list_deployments(ENVIRONMENT).await.unwrap();
    assert_eq!(deployments.len(), 1);
    assert_eq!(deployments[0].status, DeploymentStatus::Pending);
}

#[tokio::test]
async fn test_create_deployment_start_task_fails() {
    let h = Harness::new(
        MockStore::new(Some(environment())),
        MockClusterState::new(&["I1", "I2"]),
        MockScheduler::failing(),
    );

    let result = h.service.create_deployment(ENVIRONMENT, "").await;

    assert_dependency_failure(result, Step::StartTask);
    assert_eq!(h.scheduler.calls().len(), 1);
    assert!(h.store.updates().is_empty());
}

#[tokio::test]
async fn test_create_deployment_update_deployment_fails() {
    let h = Harness::standard(Vec::new());
    h.store.reply_to_update(WriteReply::Fail);

    let result = h.service.create_deployment(ENVIRONMENT, "").await;

    assert_dependency_failure(result, Step::UpdateDeployment);
    assert_eq!(h.store.updates().len(), 1);
}

#[tokio::test]
async fn test_create_deployment_update_deployment_conflicts() {
    let h = Harness::standard(Vec::new());
    h.store.reply_to_update(WriteReply::Conflict);

    let result = h.service.create_deployment(ENVIRONMENT, "").await;

    assert!(matches!(result, Err(DeploymentError::Conflict(_))));
    assert_eq!(h.store.updates().len(), 1);
    assert_eq!(h.scheduler.calls().len(), 1);
}

#[tokio::test]
async fn test_create_deployment_without_token() {
    let h = Harness::standard(Vec::new());

    let deployment = h.service.create_deployment(ENVIRONMENT, "").await.unwrap();

    assert_eq!(deployment.status, DeploymentStatus::InProgress);
    assert_eq!(deployment.health, DeploymentHealth::Healthy);
    assert_eq!(deployment.desired_task_count, 2);
    assert!(deployment.failed_instances.is_empty());
}

#[tokio::test]
async fn test_create_deployment_with_token() {
    let env = environment();
    let token = env.token.clone();
    let h = Harness::new(
        MockStore::new(Some(env)),
        MockClusterState::new(&["I1", "I2", "I3"]),
        MockScheduler::new(Vec::new()),
    );

    let deployment = h.service.create_deployment(ENVIRONMENT, &token).await.unwrap();

    assert_eq!(deployment.status, DeploymentStatus::InProgress);
    assert_eq!(deployment.desired_task_count, 3);
}

#[tokio::test]
async fn test_create_deployment_places_with_deployment_id_as_run_token() {
    let h = Harness::standard(Vec::new());

    let deployment = h.service.create_deployment(ENVIRONMENT, "").await.unwrap();

    let calls = h.scheduler.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].cluster, CLUSTER);
    assert_eq!(calls[0].instances, vec!["I1", "I2"]);
    assert_eq!(calls[0].run_token, deployment.id);
    assert_eq!(calls[0].task_definition, TASK_DEFINITION);
}

#[tokio::test]
async fn test_create_deployment_updates_against_appended_snapshot() {
    let h = Harness::standard(Vec::new());

    let deployment = h.service.create_deployment(ENVIRONMENT, "").await.unwrap();

    let original_token = h.store.adds()[0].snapshot_token.clone();
    let updates = h.store.updates();
    assert_eq!(updates.len(), 1);
    assert_ne!(updates[0].snapshot_token, original_token);
    assert_eq!(updates[0].snapshot_token, format!("{}+", original_token));
    assert_eq!(updates[0].deployment, deployment);
}

#[tokio::test]
async fn test_create_deployment_reports_failed_instances() {
    let failures = vec![
        FailedInstance::new("I2", "insufficient resources"),
        FailedInstance::new("I1", "agent disconnected"),
    ];
    let h = Harness::standard(failures.clone());

    let deployment = h.service.create_deployment(ENVIRONMENT, "").await.unwrap();

    assert_eq!(deployment.status, DeploymentStatus::InProgress);
    assert_eq!(deployment.health, DeploymentHealth::Unhealthy);
    assert_eq!(deployment.failed_instances, failures);
}

#[tokio::test]
async fn test_create_deployment_partial_failure_scenario() {
    let h = Harness::standard(vec![FailedInstance::new("I2", "insufficient resources")]);

    let deployment = h.service.create_deployment(ENVIRONMENT, "").await.unwrap();

    assert_eq!(deployment.status, DeploymentStatus::InProgress);
    assert_eq!(deployment.health, DeploymentHealth::Unhealthy);
    assert_eq!(deployment.desired_task_count, 2);
    assert_eq!(
        deployment.failed_instances,
        vec![FailedInstance::new("I2", "insufficient resources")]
    );
    assert!(deployment.end_time.is_none());

    // What was persisted is what was returned
    let stored = h.service.get_deployment(ENVIRONMENT, &deployment.id).await.unwrap();
    assert_eq!(stored, Some(deployment));
}

// ================================ GET DEPLOYMENT ================================ //

#[tokio::test]
async fn test_get_deployment_get_environment_fails() {
    let h = Harness::standard(Vec::new());
    h.store.fail_get();

    let result = h.service.get_deployment(ENVIRONMENT, "deploymentID").await;
    assert_dependency_failure(result, Step::FetchEnvironment);
}

#[tokio::test]
async fn test_get_deployment_environment_missing() {
    let h = Harness::new(
        MockStore::new(None),
        MockClusterState::new(&[]),
        MockScheduler::new(Vec::new()),
    );

    let result = h.service.get_deployment(ENVIRONMENT, "deploymentID").await;
    assert!(matches!(result, Err(DeploymentError::NotFound(_))));
}

#[tokio::test]
async fn test_get_deployment_environment_has_no_deployments() {
    let h = Harness::standard(Vec::new());

    let deployment = assert_ok!(h.service.get_deployment(ENVIRONMENT, "deploymentID").await);
    assert!(deployment.is_none());
}

#[tokio::test]
async fn test_get_deployment_no_matching_deployment() {
    let mut env = environment();
    let other = Deployment::new(TASK_DEFINITION);
    env.deployments.insert(other.id.clone(), other);
    let h = Harness::new(
        MockStore::new(Some(env)),
        MockClusterState::new(&[]),
        MockScheduler::new(Vec::new()),
    );

    let deployment = assert_ok!(h.service.get_deployment(ENVIRONMENT, "deploymentID").await);
    assert!(deployment.is_none());
}

#[tokio::test]
async fn test_get_deployment() {
    let mut env = environment();
    let first = Deployment::new(TASK_DEFINITION);
    let second = Deployment::new(TASK_DEFINITION);
    env.deployments.insert(first.id.clone(), first);
    env.deployments.insert(second.id.clone(), second.clone());
    let h = Harness::new(
        MockStore::new(Some(env)),
        MockClusterState::new(&[]),
        MockScheduler::new(Vec::new()),
    );

    let deployment = h.service.get_deployment(ENVIRONMENT, &second.id).await.unwrap();
    assert_eq!(deployment, Some(second));
}

// ================================ LIST DEPLOYMENTS ================================ //

#[tokio::test]
async fn test_list_deployments_get_environment_fails() {
    let h = Harness::standard(Vec::new());
    h.store.fail_get();

    let result = h.service.list_deployments(ENVIRONMENT).await;
    assert_dependency_failure(result, Step::FetchEnvironment);
}

#[tokio::test]
async fn test_list_deployments_environment_missing() {
    let h = Harness::new(
        MockStore::new(None),
        MockClusterState::new(&[]),
        MockScheduler::new(Vec::new()),
    );

    let error = assert_err!(h.service.list_deployments(ENVIRONMENT).await);
    assert!(matches!(error, DeploymentError::NotFound(_)));
}

#[tokio::test]
async fn test_list_deployments_matches_environment() {
    for count in [0usize, 1, 5] {
        let mut env = environment();
        let mut expected = HashMap::new();
        for _ in 0..count {
            let deployment = Deployment::new(TASK_DEFINITION);
            env.deployments.insert(deployment.id.clone(), deployment.clone());
            expected.insert(deployment.id.clone(), deployment);
        }
        let h = Harness::new(
            MockStore::new(Some(env)),
            MockClusterState::new(&[]),
            MockScheduler::new(Vec::new()),
        );

        let deployments = h.service.list_deployments(ENVIRONMENT).await.unwrap();

        assert_eq!(deployments.len(), count);
        for deployment in deployments {
            assert_eq!(expected.get(&deployment.id), Some(&deployment));
        }
    }
}
