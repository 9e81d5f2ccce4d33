// Optional DockerRepo tests when a Docker daemon is available

use docker_manager::docker_repo::DockerRepo;

async fn live_repo() -> Option<DockerRepo> {
    let repo = DockerRepo::connect().ok()?.negotiate_version().await;
    // Skip when Docker is not available (e.g. CI without Docker)
    repo.list_containers().await.ok()?;
    Some(repo)
}

#[tokio::test]
async fn docker_repo_system_stats_partition_holds() {
    let Some(repo) = live_repo().await else {
        return;
    };
    let stats = repo.system_stats().await.unwrap();
    let c = &stats.containers;
    assert_eq!(c.running + c.paused + c.stopped, c.total);
}

#[tokio::test]
async fn docker_repo_inspect_unknown_container_is_not_found() {
    let Some(repo) = live_repo().await else {
        return;
    };
    let err = repo
        .container_detail("docker-manager-test-no-such-container")
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        docker_manager::error::DockerError::NotFound(_)
    ));
}

/// A locally present image that can run `sleep`, if any.
async fn local_sleep_image(repo: &DockerRepo) -> Option<String> {
    let images = repo.list_images().await.ok()?;
    images
        .iter()
        .flat_map(|i| i.repo_tags.iter())
        .find(|tag| {
            ["busybox:", "alpine:", "debian:", "ubuntu:"]
                .iter()
                .any(|p| tag.starts_with(p))
        })
        .cloned()
}

#[tokio::test]
async fn docker_repo_start_then_detail_reports_running() {
    use bollard::models::ContainerCreateBody;
    use bollard::query_parameters::{CreateContainerOptionsBuilder, RemoveContainerOptionsBuilder};
    use std::time::Duration;

    let Some(repo) = live_repo().await else {
        return;
    };
    let Some(image) = local_sleep_image(&repo).await else {
        return;
    };
    let docker = bollard::Docker::connect_with_defaults().unwrap();
    let name = format!("docker-manager-test-{}", std::process::id());
    let created = docker
        .create_container(
            Some(CreateContainerOptionsBuilder::default().name(&name).build()),
            ContainerCreateBody {
                image: Some(image),
                cmd: Some(vec!["sleep".to_string(), "60".to_string()]),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    repo.start_container(&created.id).await.unwrap();

    let deadline = tokio::time::Instant::now() + Duration::from_secs(10);
    let detail = loop {
        let detail = repo.container_detail(&created.id).await.unwrap();
        let running = detail.container.state.as_ref().and_then(|s| s.running);
        if running == Some(true) || tokio::time::Instant::now() >= deadline {
            break detail;
        }
        tokio::time::sleep(Duration::from_millis(200)).await;
    };

    let running = detail.container.state.as_ref().and_then(|s| s.running);
    let has_stats = detail.stats.is_some();

    let _ = repo.stop_container(&created.id).await;
    let _ = docker
        .remove_container(
            &created.id,
            Some(RemoveContainerOptionsBuilder::default().force(true).build()),
        )
        .await;

    assert_eq!(running, Some(true));
    assert!(has_stats, "running container detail should embed a stats sample");
}
