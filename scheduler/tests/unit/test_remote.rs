//! Remote collaborator tests against an in-process fake service

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use tokio::net::TcpListener;

use rolloutd::cluster::remote::{ContainerInstance, ContainerInstancePage};
use rolloutd::cluster::{ClusterState, ClusterStateClient};
use rolloutd::deploy::DeploymentService;
use rolloutd::errors::{ClientError, ClusterStateError};
use rolloutd::http::client::HttpClient;
use rolloutd::models::deployment::{DeploymentHealth, DeploymentStatus, FailedInstance};
use rolloutd::placement::remote::{
    FailureRecord, StartTaskRequest, StartTaskResponse, TaskRecord,
};
use rolloutd::placement::{TaskScheduler, TaskSchedulerClient};
use rolloutd::store::MemoryEnvironmentStore;

#[derive(Default)]
struct FakeService {
    start_requests: Mutex<Vec<StartTaskRequest>>,
}

fn instance(arn: &str) -> ContainerInstance {
    ContainerInstance {
        container_instance_arn: arn.to_string(),
        cluster_arn: None,
        status: Some("ACTIVE".to_string()),
    }
}

/// Cluster `C` lists `I1`, `I2` over two pages; cluster `broken` fails;
/// cluster `looping` hands out the same page token forever
async fn filter_instances(Query(params): Query<HashMap<String, String>>) -> Response {
    let cluster = params.get("cluster").map(String::as_str).unwrap_or_default();
    let next_token = params.get("nextToken").map(String::as_str);

    let page = match (cluster, next_token) {
        ("broken", _) => {
            return (StatusCode::INTERNAL_SERVER_ERROR, "cluster state unavailable")
                .into_response()
        }
        ("looping", _) => ContainerInstancePage {
            items: vec![instance("I1")],
            next_token: Some("same".to_string()),
        },
        ("C", None) => ContainerInstancePage {
            items: vec![instance("I1")],
            next_token: Some("page-2".to_string()),
        },
        ("C", Some("page-2")) => ContainerInstancePage {
            items: vec![instance("I2")],
            next_token: None,
        },
        _ => ContainerInstancePage {
            items: Vec::new(),
            next_token: None,
        },
    };
    Json(page).into_response()
}

/// Places on every instance except `I2`
async fn start_task(
    State(fake): State<Arc<FakeService>>,
    Json(request): Json<StartTaskRequest>,
) -> Json<StartTaskResponse> {
    fake.start_requests.lock().unwrap().push(request.clone());

    let mut response = StartTaskResponse::default();
    for instance in &request.container_instances {
        if instance == "I2" {
            response.failures.push(FailureRecord {
                arn: instance.clone(),
                reason: "insufficient resources".to_string(),
            });
        } else {
            response.tasks.push(TaskRecord {
                task_arn: format!("task/{}", request.started_by),
                container_instance_arn: instance.clone(),
            });
        }
    }
    Json(response)
}

async fn spawn_fake() -> (String, Arc<FakeService>) {
    let fake = Arc::new(FakeService::default());
    let app = Router::new()
        .route("/api/v1/instances/filter", get(filter_instances))
        .route("/api/v1/tasks/start", post(start_task))
        .with_state(fake.clone());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{}/api", addr), fake)
}

fn client(base_url: &str) -> HttpClient {
    HttpClient::new(base_url, Duration::from_secs(5)).unwrap()
}

#[tokio::test]
async fn test_list_instances_follows_pages() {
    let (base_url, _) = spawn_fake().await;
    let cluster_state = ClusterStateClient::new(client(&base_url));

    let instances = cluster_state.list_instances("C").await.unwrap();
    assert_eq!(instances, vec!["I1", "I2"]);
}

#[tokio::test]
async fn test_list_instances_unknown_cluster() {
    let (base_url, _) = spawn_fake().await;
    let cluster_state = ClusterStateClient::new(client(&base_url));

    let instances = cluster_state.list_instances("other").await.unwrap();
    assert!(instances.is_empty());
}

#[tokio::test]
async fn test_list_instances_server_error() {
    let (base_url, _) = spawn_fake().await;
    let cluster_state = ClusterStateClient::new(client(&base_url));

    let result = cluster_state.list_instances("broken").await;
    match result {
        Err(ClusterStateError::Client(ClientError::Status { status, body, .. })) => {
            assert_eq!(status, 500);
            assert_eq!(body, "cluster state unavailable");
        }
        other => panic!("expected status error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_list_instances_repeated_page_token() {
    let (base_url, _) = spawn_fake().await;
    let cluster_state = ClusterStateClient::new(client(&base_url));

    let result = tokio::time::timeout(
        Duration::from_secs(3),
        cluster_state.list_instances("looping"),
    )
    .await
    .expect("listing should stop on a repeated page token");

    assert!(matches!(result, Err(ClusterStateError::Other(_))));
}

#[tokio::test]
async fn test_start_task_maps_response() {
    let (base_url, fake) = spawn_fake().await;
    let scheduler = TaskSchedulerClient::new(client(&base_url));
    let instances = vec!["I1".to_string(), "I2".to_string()];

    let output = scheduler
        .start_task("C", &instances, "run-1", "T")
        .await
        .unwrap();

    assert_eq!(output.tasks.len(), 1);
    assert_eq!(output.tasks[0].instance, "I1");
    assert_eq!(output.tasks[0].task, "task/run-1");
    assert_eq!(
        output.failures,
        vec![FailedInstance::new("I2", "insufficient resources")]
    );

    let requests = fake.start_requests.lock().unwrap();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].cluster, "C");
    assert_eq!(requests[0].container_instances, instances);
    assert_eq!(requests[0].started_by, "run-1");
    assert_eq!(requests[0].task_definition, "T");
}

#[tokio::test]
async fn test_deployment_through_remote_collaborators() {
    let (base_url, fake) = spawn_fake().await;
    let store = Arc::new(MemoryEnvironmentStore::new());
    store.create_environment("E", "T", "C").await.unwrap();
    let service = DeploymentService::new(
        store,
        Arc::new(ClusterStateClient::new(client(&base_url))),
        Arc::new(TaskSchedulerClient::new(client(&base_url))),
    );

    let deployment = service.create_deployment("E", "").await.unwrap();

    assert_eq!(deployment.status, DeploymentStatus::InProgress);
    assert_eq!(deployment.health, DeploymentHealth::Unhealthy);
    assert_eq!(deployment.desired_task_count, 2);
    assert_eq!(
        deployment.failed_instances,
        vec![FailedInstance::new("I2", "insufficient resources")]
    );
    assert_eq!(
        fake.start_requests.lock().unwrap()[0].started_by,
        deployment.id
    );
}
