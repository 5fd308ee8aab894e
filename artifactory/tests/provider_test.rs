#![allow(clippy::disallowed_methods)] // Allow unwrap() in tests for clarity

use artifactory::ArtifactoryProvider;
use mockito::{Matcher, Server, ServerGuard};
use serde_json::json;
use tfplug::{Dynamic, ProviderServer, ResourceState};

async fn configured(server: &ServerGuard) -> ProviderServer<ArtifactoryProvider> {
    tfplug::init_logging(tfplug::LogLevel::from_env());
    let provider = ProviderServer::new(ArtifactoryProvider::new());
    let diags = provider
        .configure_provider(Dynamic::from(json!({
            "url": server.url(),
            "access_token": "secret"
        })))
        .await;
    assert!(!diags.has_errors(), "{:?}", diags.errors);
    provider
}

fn local_repo_body(key: &str, description: &str) -> String {
    json!({
        "key": key,
        "rclass": "local",
        "packageType": "maven",
        "description": description,
        "handleReleases": true,
        "handleSnapshots": false
    })
    .to_string()
}

#[tokio::test(flavor = "multi_thread")]
async fn local_repository_lifecycle() {
    let mut server = Server::new_async().await;
    let provider = configured(&server).await;

    let create = server
        .mock("PUT", "/api/repositories/libs-local")
        .match_header("authorization", "Bearer secret")
        .match_body(Matcher::PartialJson(json!({
            "key": "libs-local",
            "rclass": "local",
            "packageType": "maven"
        })))
        .with_status(200)
        .create_async()
        .await;
    let read = server
        .mock("GET", "/api/repositories/libs-local")
        .with_body(local_repo_body("libs-local", "libraries"))
        .create_async()
        .await;

    let response = provider
        .apply_resource_change(
            "artifactory_local_repository",
            None,
            Some(Dynamic::from(json!({
                "key": "libs-local",
                "package_type": "maven",
                "description": "libraries"
            }))),
        )
        .await;
    assert!(!response.diagnostics.has_errors(), "{:?}", response.diagnostics.errors);
    create.assert_async().await;

    let state = response.new_state.unwrap();
    assert_eq!(state.id, "libs-local");
    assert_eq!(state.get("handle_releases"), Some(&Dynamic::Bool(true)));

    let refreshed = provider
        .read_resource("artifactory_local_repository", state.clone())
        .await;
    assert!(!refreshed.diagnostics.has_errors());
    assert_eq!(refreshed.new_state.as_ref(), Some(&state));
    read.assert_async().await;

    let update = server
        .mock("POST", "/api/repositories/libs-local")
        .match_body(Matcher::PartialJson(json!({"description": "shared libraries"})))
        .create_async()
        .await;
    read.remove_async().await;
    let _read_updated = server
        .mock("GET", "/api/repositories/libs-local")
        .with_body(local_repo_body("libs-local", "shared libraries"))
        .create_async()
        .await;

    let response = provider
        .apply_resource_change(
            "artifactory_local_repository",
            Some(state),
            Some(Dynamic::from(json!({
                "key": "libs-local",
                "package_type": "maven",
                "description": "shared libraries"
            }))),
        )
        .await;
    assert!(!response.diagnostics.has_errors(), "{:?}", response.diagnostics.errors);
    update.assert_async().await;
    let state = response.new_state.unwrap();
    assert_eq!(
        state.get("description"),
        Some(&Dynamic::String("shared libraries".to_string()))
    );

    let delete = server
        .mock("DELETE", "/api/repositories/libs-local")
        .create_async()
        .await;
    let response = provider
        .apply_resource_change("artifactory_local_repository", Some(state), None)
        .await;
    assert!(!response.diagnostics.has_errors());
    assert!(response.new_state.is_none());
    delete.assert_async().await;
}

#[tokio::test(flavor = "multi_thread")]
async fn changing_key_replaces_repository() {
    let mut server = Server::new_async().await;
    let provider = configured(&server).await;

    let delete = server
        .mock("DELETE", "/api/repositories/libs-local")
        .create_async()
        .await;
    let create = server
        .mock("PUT", "/api/repositories/libs-release")
        .create_async()
        .await;
    let _read = server
        .mock("GET", "/api/repositories/libs-release")
        .with_body(local_repo_body("libs-release", "releases"))
        .create_async()
        .await;

    let prior = ResourceState {
        id: "libs-local".to_string(),
        attributes: [
            ("key".to_string(), Dynamic::from("libs-local")),
            ("package_type".to_string(), Dynamic::from("maven")),
        ]
        .into_iter()
        .collect(),
    };
    let response = provider
        .apply_resource_change(
            "artifactory_local_repository",
            Some(prior),
            Some(Dynamic::from(json!({
                "key": "libs-release",
                "package_type": "maven"
            }))),
        )
        .await;

    assert!(!response.diagnostics.has_errors(), "{:?}", response.diagnostics.errors);
    delete.assert_async().await;
    create.assert_async().await;
    assert_eq!(response.new_state.unwrap().id, "libs-release");
}

#[tokio::test(flavor = "multi_thread")]
async fn refresh_of_deleted_object_drops_state() {
    let mut server = Server::new_async().await;
    let provider = configured(&server).await;

    let _gone = server
        .mock("GET", "/api/security/groups/devs")
        .match_query(Matcher::Any)
        .with_status(404)
        .create_async()
        .await;

    let state = ResourceState {
        id: "devs".to_string(),
        attributes: [("name".to_string(), Dynamic::from("devs"))]
            .into_iter()
            .collect(),
    };
    let response = provider.read_resource("artifactory_group", state).await;
    assert!(!response.diagnostics.has_errors());
    assert!(response.new_state.is_none());
}

#[tokio::test(flavor = "multi_thread")]
async fn server_errors_keep_prior_state() {
    let mut server = Server::new_async().await;
    let provider = configured(&server).await;

    let _broken = server
        .mock("GET", "/api/security/users/jane")
        .with_status(500)
        .with_body(r#"{"errors":[{"status":500,"message":"boom"}]}"#)
        .create_async()
        .await;

    let state = ResourceState {
        id: "jane".to_string(),
        attributes: Default::default(),
    };
    let response = provider.read_resource("artifactory_user", state.clone()).await;
    assert!(response.diagnostics.has_errors());
    assert_eq!(response.new_state, Some(state));
}

#[tokio::test(flavor = "multi_thread")]
async fn mixed_permission_forms_are_rejected_before_any_request() {
    let mut server = Server::new_async().await;
    let provider = configured(&server).await;

    let untouched = server
        .mock("POST", Matcher::Any)
        .expect(0)
        .create_async()
        .await;

    let response = provider
        .apply_resource_change(
            "artifactory_permission_target",
            None,
            Some(Dynamic::from(json!({
                "name": "mixed",
                "repositories": ["libs-local"],
                "repo": [{
                    "repositories": ["libs-local"]
                }]
            }))),
        )
        .await;

    assert!(response.diagnostics.has_errors());
    assert!(response.new_state.is_none());
    untouched.assert_async().await;
}

#[tokio::test(flavor = "multi_thread")]
async fn import_user_by_name() {
    let mut server = Server::new_async().await;
    let provider = configured(&server).await;

    let _user = server
        .mock("GET", "/api/security/users/jane")
        .with_body(
            json!({
                "name": "jane",
                "email": "jane@example.com",
                "admin": false,
                "realm": "internal",
                "groups": ["readers"]
            })
            .to_string(),
        )
        .create_async()
        .await;
    let _missing = server
        .mock("GET", "/api/security/users/ghost")
        .with_status(404)
        .create_async()
        .await;

    let response = provider.import_resource_state("artifactory_user", "jane").await;
    assert!(!response.diagnostics.has_errors(), "{:?}", response.diagnostics.errors);
    let state = response.new_state.unwrap();
    assert_eq!(state.id, "jane");
    assert_eq!(state.get("email"), Some(&Dynamic::from("jane@example.com")));
    assert!(state.get("password").is_none());

    let response = provider.import_resource_state("artifactory_user", "ghost").await;
    assert!(response.new_state.is_none());
    assert!(response.diagnostics.errors[0]
        .summary
        .contains("artifactory_user \"ghost\" does not exist"));
}

#[tokio::test(flavor = "multi_thread")]
async fn group_data_source_reads_by_name() {
    let mut server = Server::new_async().await;
    let provider = configured(&server).await;

    let _group = server
        .mock("GET", "/api/security/groups/readers")
        .match_query(Matcher::UrlEncoded("includeUsers".into(), "true".into()))
        .with_body(
            json!({
                "name": "readers",
                "description": "read only",
                "autoJoin": true,
                "realm": "internal",
                "userNames": ["jane", "joe"]
            })
            .to_string(),
        )
        .create_async()
        .await;
    let _missing = server
        .mock("GET", "/api/security/groups/nobody")
        .match_query(Matcher::Any)
        .with_status(404)
        .create_async()
        .await;

    let response = provider
        .read_data_source("artifactory_group", Dynamic::from(json!({"name": "readers"})))
        .await;
    assert!(!response.diagnostics.has_errors(), "{:?}", response.diagnostics.errors);
    let state = response.state.unwrap();
    assert_eq!(state.id, "readers");
    assert_eq!(state.get("auto_join"), Some(&Dynamic::Bool(true)));

    let response = provider
        .read_data_source("artifactory_group", Dynamic::from(json!({"name": "nobody"})))
        .await;
    assert!(response.state.is_none());
    assert!(response.diagnostics.has_errors());
}

#[tokio::test(flavor = "multi_thread")]
async fn unconfigured_provider_reports_error() {
    let server = Server::new_async().await;
    let provider = ProviderServer::new(ArtifactoryProvider::new());

    let diags = provider
        .configure_provider(Dynamic::from(json!({"url": server.url(), "username": "admin"})))
        .await;
    assert!(diags.has_errors());

    let response = provider
        .read_data_source("artifactory_user", Dynamic::from(json!({"name": "jane"})))
        .await;
    assert!(response.diagnostics.has_errors());
}

#[tokio::test(flavor = "multi_thread")]
async fn concurrent_reads_share_one_client() {
    let mut server = Server::new_async().await;
    let provider = configured(&server).await;

    let keys = ["libs-a", "libs-b", "libs-c", "libs-d"];
    let mut mocks = Vec::new();
    for key in keys {
        mocks.push(
            server
                .mock("GET", format!("/api/repositories/{}", key).as_str())
                .with_body(local_repo_body(key, key))
                .create_async()
                .await,
        );
    }

    let reads = keys.iter().map(|key| {
        provider.read_data_source(
            "artifactory_local_repository",
            Dynamic::from(json!({"key": key})),
        )
    });
    let responses = futures::future::join_all(reads).await;

    for (key, response) in keys.iter().zip(responses) {
        assert!(!response.diagnostics.has_errors());
        let state = response.state.unwrap();
        assert_eq!(state.id, *key);
        assert_eq!(state.get("description"), Some(&Dynamic::from(*key)));
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn update_without_package_type_keeps_repository() {
    let mut server = Server::new_async().await;
    let provider = configured(&server).await;

    let delete = server
        .mock("DELETE", "/api/repositories/libs-local")
        .expect(0)
        .create_async()
        .await;
    let update = server
        .mock("POST", "/api/repositories/libs-local")
        .match_body(Matcher::PartialJson(json!({"description": "new"})))
        .expect(1)
        .create_async()
        .await;
    let _read = server
        .mock("GET", "/api/repositories/libs-local")
        .with_body(local_repo_body("libs-local", "new"))
        .create_async()
        .await;

    let prior = ResourceState {
        id: "libs-local".to_string(),
        attributes: [
            ("key".to_string(), Dynamic::from("libs-local")),
            ("package_type".to_string(), Dynamic::from("maven")),
            ("description".to_string(), Dynamic::from("old")),
        ]
        .into_iter()
        .collect(),
    };
    let response = provider
        .apply_resource_change(
            "artifactory_local_repository",
            Some(prior),
            Some(Dynamic::from(json!({"key": "libs-local", "description": "new"}))),
        )
        .await;

    assert!(!response.diagnostics.has_errors(), "{:?}", response.diagnostics.errors);
    update.assert_async().await;
    delete.assert_async().await;
    let state = response.new_state.unwrap();
    assert_eq!(state.get("package_type"), Some(&Dynamic::from("maven")));
}

#[tokio::test(flavor = "multi_thread")]
async fn failed_replacement_forgets_deleted_repository() {
    let mut server = Server::new_async().await;
    let provider = configured(&server).await;

    let delete = server
        .mock("DELETE", "/api/repositories/libs-local")
        .create_async()
        .await;
    let create = server
        .mock("PUT", "/api/repositories/libs-release")
        .with_status(400)
        .with_body(r#"{"errors":[{"status":400,"message":"bad"}]}"#)
        .create_async()
        .await;

    let prior = ResourceState {
        id: "libs-local".to_string(),
        attributes: [
            ("key".to_string(), Dynamic::from("libs-local")),
            ("package_type".to_string(), Dynamic::from("maven")),
        ]
        .into_iter()
        .collect(),
    };
    let response = provider
        .apply_resource_change(
            "artifactory_local_repository",
            Some(prior),
            Some(Dynamic::from(json!({"key": "libs-release", "package_type": "maven"}))),
        )
        .await;

    delete.assert_async().await;
    create.assert_async().await;
    assert!(response.diagnostics.has_errors());
    assert!(response.new_state.is_none());
}

#[tokio::test(flavor = "multi_thread")]
async fn failed_delete_during_replacement_keeps_prior_state() {
    let mut server = Server::new_async().await;
    let provider = configured(&server).await;

    let _delete = server
        .mock("DELETE", "/api/repositories/libs-local")
        .with_status(500)
        .create_async()
        .await;
    let create = server
        .mock("PUT", "/api/repositories/libs-release")
        .expect(0)
        .create_async()
        .await;

    let prior = ResourceState {
        id: "libs-local".to_string(),
        attributes: [("key".to_string(), Dynamic::from("libs-local"))]
            .into_iter()
            .collect(),
    };
    let response = provider
        .apply_resource_change(
            "artifactory_local_repository",
            Some(prior.clone()),
            Some(Dynamic::from(json!({"key": "libs-release"}))),
        )
        .await;

    assert!(response.diagnostics.has_errors());
    assert_eq!(response.new_state, Some(prior));
    create.assert_async().await;
}

#[tokio::test(flavor = "multi_thread")]
async fn legacy_grants_without_repositories_are_rejected() {
    let mut server = Server::new_async().await;
    let provider = configured(&server).await;

    let untouched = server
        .mock("POST", Matcher::Any)
        .expect(0)
        .create_async()
        .await;

    let response = provider
        .apply_resource_change(
            "artifactory_permission_target",
            None,
            Some(Dynamic::from(json!({
                "name": "p",
                "users": [{"name": "jane", "permissions": ["read"]}]
            }))),
        )
        .await;

    assert!(response.new_state.is_none());
    assert!(response.diagnostics.errors[0]
        .summary
        .contains("`users,repositories` must be specified"));
    untouched.assert_async().await;
}

#[tokio::test(flavor = "multi_thread")]
async fn removed_settings_are_cleared_on_update() {
    let mut server = Server::new_async().await;
    let provider = configured(&server).await;

    let update = server
        .mock("POST", "/api/repositories/rpm-local")
        .match_body(Matcher::PartialJson(json!({
            "propertySets": [],
            "yumRootDepth": 0,
            "calculateYumMetadata": false
        })))
        .expect(1)
        .create_async()
        .await;
    let _read = server
        .mock("GET", "/api/repositories/rpm-local")
        .with_body(
            json!({"key": "rpm-local", "rclass": "local", "packageType": "rpm"}).to_string(),
        )
        .create_async()
        .await;

    let prior = ResourceState {
        id: "rpm-local".to_string(),
        attributes: [
            ("key".to_string(), Dynamic::from("rpm-local")),
            ("package_type".to_string(), Dynamic::from("rpm")),
            ("property_sets".to_string(), Dynamic::from(json!(["artifactory"]))),
            ("yum_root_depth".to_string(), Dynamic::from(json!(2))),
            ("calculate_yum_metadata".to_string(), Dynamic::Bool(true)),
        ]
        .into_iter()
        .collect(),
    };
    let response = provider
        .apply_resource_change(
            "artifactory_local_repository",
            Some(prior),
            Some(Dynamic::from(json!({"key": "rpm-local"}))),
        )
        .await;

    assert!(!response.diagnostics.has_errors(), "{:?}", response.diagnostics.errors);
    update.assert_async().await;
    let state = response.new_state.unwrap();
    assert_eq!(state.get("property_sets"), None);
    assert_eq!(state.get("yum_root_depth"), None);
}
