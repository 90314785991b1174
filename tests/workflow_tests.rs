use anyhow::Result;
use dockernest::domain::{ContainerSpec, ContainerStatus, PortBinding, Severity};
use dockernest::services::{Session, SessionSettings};
use dockernest::test_support::MockEngine;
use std::sync::Arc;
use std::time::Duration;

fn create_session() -> (Session, Arc<MockEngine>) {
    let mock = Arc::new(MockEngine::new());
    mock.add_network("dockernest-net");
    let session = Session::new(mock.clone(), MockEngine::credential(), SessionSettings::default());
    (session, mock)
}

#[tokio::test(start_paused = true)]
async fn test_workflow_wordpress_with_database() -> Result<()> {
    let (session, mock) = create_session();
    session.load().await?;

    // 1. Deploy wordpress on host port 8081
    let spec = ContainerSpec::new("web1", "wordpress:latest").with_port(PortBinding {
        host_port: Some(8081),
        container_port: None,
        protocol: Default::default(),
    });
    let created = session.create(&spec).await?;
    assert_eq!(created.len(), 2);

    // 2. Database first, application second
    let requests = mock.created_requests();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0].name, "web1_db");
    assert_eq!(requests[0].image, "mysql:5.7");
    assert_eq!(requests[1].name, "web1");
    assert_eq!(requests[1].image, "wordpress:latest");
    assert_eq!(requests[1].ports.get("80/tcp"), Some(&8081));
    assert_eq!(
        requests[1].env.get("WORDPRESS_DB_HOST"),
        created[0].docker_name.as_ref()
    );

    // 3. The two creations are separated by the settle delay
    let timed = mock.get_timed_commands();
    let db_at = timed.iter().find(|(c, _)| c == "create:web1_db").map(|(_, t)| *t);
    let app_at = timed.iter().find(|(c, _)| c == "create:web1").map(|(_, t)| *t);
    let (Some(db_at), Some(app_at)) = (db_at, app_at) else {
        panic!("both creations should be recorded");
    };
    assert!(app_at - db_at >= Duration::from_secs(4));

    // 4. One refresh after the whole deployment, and the view matches the engine
    let commands = mock.get_commands();
    let last_create = commands.iter().rposition(|c| c == "create:web1").unwrap();
    let refreshes_after: Vec<_> = commands[last_create..]
        .iter()
        .filter(|c| c.as_str() == "list_containers")
        .collect();
    assert_eq!(refreshes_after.len(), 1);

    let view = session.view();
    let names: Vec<_> = view.containers.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["web1_db", "web1"]);
    let notice = view.notification.expect("success notification");
    assert_eq!(notice.severity, Severity::Success);
    assert_eq!(notice.message, "web1 deployed");

    Ok(())
}

#[tokio::test]
async fn test_workflow_container_lifecycle() -> Result<()> {
    let (session, mock) = create_session();

    let spec = ContainerSpec::new("cache", "redis:latest").with_port(PortBinding::new(6379, 6379));
    let created = session.create(&spec).await?;
    let id = created[0].id.clone();
    assert_eq!(mock.created_requests().len(), 1);
    assert_eq!(mock.get_state("cache"), Some(ContainerStatus::Running));

    session.stop(&id).await?;
    assert_eq!(mock.get_state("cache"), Some(ContainerStatus::Stopped));
    assert_eq!(session.view().containers[0].status, ContainerStatus::Stopped);

    session.start(&id).await?;
    session.restart(&id).await?;
    assert_eq!(session.view().containers[0].status, ContainerStatus::Running);

    session.delete(&id).await?;
    assert!(!mock.container_exists("cache"));
    assert!(session.view().containers.is_empty());

    // create + four verbs, each followed by exactly one refresh
    let refreshes = mock
        .get_commands()
        .iter()
        .filter(|c| c.as_str() == "list_containers")
        .count();
    assert_eq!(refreshes, 5);

    Ok(())
}

#[tokio::test]
async fn test_workflow_network_then_container() -> Result<()> {
    let (session, mock) = create_session();
    session.load().await?;

    assert!(session.create_network("backend").await?);
    assert!(session.select_network("backend"));

    session
        .create(&ContainerSpec::new("api", "nginx:latest"))
        .await?;

    let requests = mock.created_requests();
    assert_eq!(requests[0].network.as_deref(), Some("backend"));
    assert_eq!(session.view().selected_network, "backend");

    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_workflow_notification_expires() -> Result<()> {
    let (session, _mock) = create_session();

    session
        .create(&ContainerSpec::new("web", "nginx:latest"))
        .await?;
    assert!(session.view().notification.is_some());

    tokio::time::advance(Duration::from_secs(3)).await;
    assert!(session.view().notification.is_none());

    Ok(())
}
