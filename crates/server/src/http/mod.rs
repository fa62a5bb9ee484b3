use axum::{Router, middleware::from_fn_with_state, routing::get};

use crate::{Deployment, routes};

mod identity;

pub fn router(deployment: Deployment) -> Router {
    let api_routes = Router::new()
        .merge(routes::auth::router())
        .merge(routes::users::router())
        .merge(routes::roles::router())
        .merge(routes::releases::router())
        .merge(routes::requirements::router())
        .merge(routes::projects::router())
        .merge(routes::team_members::router())
        .merge(routes::tasks::router())
        .merge(routes::comments::router())
        .merge(routes::attachments::router())
        .layer(from_fn_with_state(
            deployment.clone(),
            identity::require_identity,
        ));

    Router::new()
        .route("/health", get(routes::health::health_check))
        .nest("/api", api_routes)
        .with_state(deployment)
}

#[cfg(test)]
mod tests {
    use axum::{
        body::{Body, to_bytes},
        http::{Request, StatusCode, header},
    };
    use tower::ServiceExt;

    use crate::{Config, Deployment};

    async fn test_deployment() -> Deployment {
        let doc_path = std::env::temp_dir().join(format!(
            "taskforge-test-{}",
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap()
                .as_nanos()
        ));
        let config = Config {
            host: "127.0.0.1".to_string(),
            port: 0,
            database_url: "sqlite::memory:".to_string(),
            jwt_secret: "test-secret".to_string(),
            token_expiry: chrono::Duration::minutes(5),
            doc_path,
        };
        Deployment::new(config).await.unwrap()
    }

    #[tokio::test]
    async fn health_is_public() {
        let app = super::router(test_deployment().await);
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn api_reads_require_a_token() {
        let app = super::router(test_deployment().await);
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/tasks")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn signup_and_login_are_public() {
        let app = super::router(test_deployment().await);

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/users")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(
                        serde_json::json!({
                            "name": "alice",
                            "email": "alice@example.com",
                            "password": "pw",
                            "password2": "pw"
                        })
                        .to_string(),
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/auth")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(
                        serde_json::json!({
                            "email": "alice@example.com",
                            "password": "pw"
                        })
                        .to_string(),
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["success"], true);
        assert!(json["data"]["access_token"].as_str().is_some());
    }

    async fn seed_member(
        deployment: &Deployment,
        name: &str,
        email: &str,
        project_id: i64,
        is_manager: bool,
    ) -> db::models::user::User {
        use db::models::{team_member, user};
        use services::services::password::hash_password;

        let user = user::User::create(
            &deployment.db().pool,
            &user::CreateUser {
                name: name.to_string(),
                email: email.to_string(),
                password_hash: hash_password("pw").unwrap(),
                is_active: true,
            },
        )
        .await
        .unwrap();
        team_member::TeamMember::create(
            &deployment.db().pool,
            &team_member::CreateTeamMember {
                user_id: user.id,
                project_id,
                role_id: 1,
                is_manager,
                is_active: true,
            },
        )
        .await
        .unwrap();
        user
    }

    async fn login(deployment: &Deployment, email: &str) -> String {
        deployment
            .auth()
            .login(&deployment.db().pool, email, "pw")
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn self_update_with_mismatched_passwords_is_rejected() {
        let deployment = test_deployment().await;
        let app = super::router(deployment.clone());
        let user = seed_member(&deployment, "erin", "erin@example.com", 1, false).await;
        let token = login(&deployment, "erin@example.com").await;

        let response = app
            .oneshot(
                Request::builder()
                    .method("PATCH")
                    .uri(format!("/api/users/{}", user.id))
                    .header(header::AUTHORIZATION, format!("Bearer {token}"))
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(
                        serde_json::json!({
                            "password": "new",
                            "password2": "different"
                        })
                        .to_string(),
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn only_the_comment_author_may_delete_it() {
        use db::models::task::{CreateTask, Task};

        let deployment = test_deployment().await;
        let app = super::router(deployment.clone());
        seed_member(&deployment, "frank", "frank@example.com", 1, false).await;
        seed_member(&deployment, "grace", "grace@example.com", 1, false).await;
        let task = Task::create(
            &deployment.db().pool,
            &CreateTask {
                name: "commented".to_string(),
                description: None,
                state: None,
                assignee_id: None,
                project_id: 1,
                requirement_link: "https://req/1".to_string(),
            },
            1,
        )
        .await
        .unwrap();

        let author_token = login(&deployment, "frank@example.com").await;
        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/comments")
                    .header(header::AUTHORIZATION, format!("Bearer {author_token}"))
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(
                        serde_json::json!({
                            "message": "first",
                            "task_id": task.id,
                            "prev_state": "created"
                        })
                        .to_string(),
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        let comment_id = json["data"]["id"].as_i64().unwrap();

        let other_token = login(&deployment, "grace@example.com").await;
        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("DELETE")
                    .uri(format!("/api/comments/{comment_id}"))
                    .header(header::AUTHORIZATION, format!("Bearer {other_token}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        let response = app
            .oneshot(
                Request::builder()
                    .method("DELETE")
                    .uri(format!("/api/comments/{comment_id}"))
                    .header(header::AUTHORIZATION, format!("Bearer {author_token}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn comment_stores_the_callers_state_snapshot() {
        use db::models::task::{CreateTask, EditTask, Task, TaskState};

        let deployment = test_deployment().await;
        let app = super::router(deployment.clone());
        seed_member(&deployment, "heidi", "heidi@example.com", 1, false).await;
        let task = Task::create(
            &deployment.db().pool,
            &CreateTask {
                name: "snapshotted".to_string(),
                description: None,
                state: None,
                assignee_id: None,
                project_id: 1,
                requirement_link: "https://req/2".to_string(),
            },
            1,
        )
        .await
        .unwrap();
        Task::edit(
            &deployment.db().pool,
            task.id,
            &EditTask {
                state: Some(TaskState::Worked),
                assignee_id: None,
            },
        )
        .await
        .unwrap();

        let token = login(&deployment, "heidi@example.com").await;
        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/comments")
                    .header(header::AUTHORIZATION, format!("Bearer {token}"))
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(
                        serde_json::json!({
                            "message": "from before the rework",
                            "task_id": task.id,
                            "prev_state": "created"
                        })
                        .to_string(),
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        // The task sits in `worked`; the stored snapshot is the caller's.
        assert_eq!(json["data"]["prev_state"], "created");

        // A dangling task_id is accepted as-is.
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/comments")
                    .header(header::AUTHORIZATION, format!("Bearer {token}"))
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(
                        serde_json::json!({
                            "message": "orphan",
                            "task_id": 9999,
                            "prev_state": "finished"
                        })
                        .to_string(),
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn deleting_a_project_takes_a_manager() {
        use db::models::{
            project::{CreateProject, Project},
            release::{CreateRelease, Release},
        };

        let deployment = test_deployment().await;
        let app = super::router(deployment.clone());
        let release = Release::create(
            &deployment.db().pool,
            &CreateRelease {
                name: "1.0".to_string(),
                description: "first".to_string(),
                release_date: chrono::Utc::now(),
            },
        )
        .await
        .unwrap();
        let project = Project::create(
            &deployment.db().pool,
            &CreateProject {
                name: "doomed".to_string(),
                description: "".to_string(),
                release_id: release.id,
            },
            1,
        )
        .await
        .unwrap();
        seed_member(&deployment, "ivan", "ivan@example.com", project.id, false).await;
        seed_member(&deployment, "judy", "judy@example.com", project.id, true).await;

        let member_token = login(&deployment, "ivan@example.com").await;
        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("DELETE")
                    .uri(format!("/api/projects/{}", project.id))
                    .header(header::AUTHORIZATION, format!("Bearer {member_token}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        let manager_token = login(&deployment, "judy@example.com").await;
        let response = app
            .oneshot(
                Request::builder()
                    .method("DELETE")
                    .uri(format!("/api/projects/{}", project.id))
                    .header(header::AUTHORIZATION, format!("Bearer {manager_token}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(
            Project::find_by_id(&deployment.db().pool, project.id)
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn mismatched_password_confirmation_is_rejected() {
        let app = super::router(test_deployment().await);
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/users")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(
                        serde_json::json!({
                            "name": "bob",
                            "email": "bob@example.com",
                            "password": "pw",
                            "password2": "other"
                        })
                        .to_string(),
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
