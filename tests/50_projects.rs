mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::json;

async fn create_task(
    client: &reqwest::Client,
    base_url: &str,
    user: &common::TestUser,
    title: &str,
) -> Result<String> {
    let res = client
        .post(format!("{}/api/v1/tasks/create", base_url))
        .header("Authorization", common::bearer(user))
        .json(&json!({ "title": title, "description": "project member" }))
        .send()
        .await?;
    anyhow::ensure!(res.status() == StatusCode::CREATED, "task create failed");
    Ok(res.json::<serde_json::Value>().await?["data"]["id"]
        .as_str()
        .unwrap()
        .to_string())
}

async fn create_project(
    client: &reqwest::Client,
    base_url: &str,
    user: &common::TestUser,
    name: &str,
) -> Result<String> {
    let res = client
        .post(format!("{}/api/v1/projects/create", base_url))
        .header("Authorization", common::bearer(user))
        .json(&json!({ "name": name, "description": "a project" }))
        .send()
        .await?;
    anyhow::ensure!(res.status() == StatusCode::CREATED, "project create failed");
    let body = res.json::<serde_json::Value>().await?;
    anyhow::ensure!(body["data"]["status"] == "Active", "default status");
    Ok(body["data"]["id"].as_str().unwrap().to_string())
}

#[tokio::test]
async fn task_membership_is_idempotent_and_ordered() -> Result<()> {
    let Some(server) = common::server().await? else {
        return Ok(());
    };
    let client = reqwest::Client::new();
    let user = common::register_and_login(&client, &server.base_url).await?;

    let project_id = create_project(&client, &server.base_url, &user, "Launch").await?;
    let task_a = create_task(&client, &server.base_url, &user, "Task A").await?;
    let task_b = create_task(&client, &server.base_url, &user, "Task B").await?;

    // Add A twice and B once; duplicates are not appended
    for task_id in [&task_a, &task_a, &task_b] {
        let res = client
            .post(format!(
                "{}/api/v1/projects/add-task-to-project/{}/{}",
                server.base_url, task_id, project_id
            ))
            .header("Authorization", common::bearer(&user))
            .send()
            .await?;
        assert_eq!(res.status(), StatusCode::OK);
    }

    // Populated fetch preserves the insertion order
    let res = client
        .get(format!(
            "{}/api/v1/projects/get-project-by-id/{}",
            server.base_url, project_id
        ))
        .header("Authorization", common::bearer(&user))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body = res.json::<serde_json::Value>().await?;
    let tasks = body["data"]["tasks"].as_array().unwrap();
    assert_eq!(tasks.len(), 2);
    assert_eq!(tasks[0]["id"], task_a.as_str());
    assert_eq!(tasks[0]["title"], "Task A");
    assert_eq!(tasks[1]["id"], task_b.as_str());

    // Membership endpoint returns the same populated list
    let res = client
        .get(format!(
            "{}/api/v1/projects/get-project-tasks/{}",
            server.base_url, project_id
        ))
        .header("Authorization", common::bearer(&user))
        .send()
        .await?;
    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["data"].as_array().unwrap().len(), 2);

    // Remove A; removing it again is a no-op
    for _ in 0..2 {
        let res = client
            .patch(format!(
                "{}/api/v1/projects/remove-task-from-project/{}/{}",
                server.base_url, task_a, project_id
            ))
            .header("Authorization", common::bearer(&user))
            .send()
            .await?;
        assert_eq!(res.status(), StatusCode::OK);
    }

    let res = client
        .get(format!(
            "{}/api/v1/projects/get-project-tasks/{}",
            server.base_url, project_id
        ))
        .header("Authorization", common::bearer(&user))
        .send()
        .await?;
    let body = res.json::<serde_json::Value>().await?;
    let remaining = body["data"].as_array().unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0]["id"], task_b.as_str());
    Ok(())
}

#[tokio::test]
async fn adding_a_missing_task_or_project_is_not_found() -> Result<()> {
    let Some(server) = common::server().await? else {
        return Ok(());
    };
    let client = reqwest::Client::new();
    let user = common::register_and_login(&client, &server.base_url).await?;

    let project_id = create_project(&client, &server.base_url, &user, "Orphans").await?;
    let missing = uuid_like();

    let res = client
        .post(format!(
            "{}/api/v1/projects/add-task-to-project/{}/{}",
            server.base_url, missing, project_id
        ))
        .header("Authorization", common::bearer(&user))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    Ok(())
}

fn uuid_like() -> String {
    // Valid UUID shape, vanishingly unlikely to exist
    "00000000-0000-4000-8000-000000000001".to_string()
}

#[tokio::test]
async fn deleting_a_project_leaves_its_tasks() -> Result<()> {
    let Some(server) = common::server().await? else {
        return Ok(());
    };
    let client = reqwest::Client::new();
    let user = common::register_and_login(&client, &server.base_url).await?;

    let project_id = create_project(&client, &server.base_url, &user, "Ephemeral").await?;
    let task_id = create_task(&client, &server.base_url, &user, "Survivor").await?;

    let res = client
        .post(format!(
            "{}/api/v1/projects/add-task-to-project/{}/{}",
            server.base_url, task_id, project_id
        ))
        .header("Authorization", common::bearer(&user))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);

    let res = client
        .delete(format!(
            "{}/api/v1/projects/delete-project/{}",
            server.base_url, project_id
        ))
        .header("Authorization", common::bearer(&user))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);

    // No cascade: the referenced task still exists
    let res = client
        .get(format!(
            "{}/api/v1/tasks/get-task-by-id/{}",
            server.base_url, task_id
        ))
        .header("Authorization", common::bearer(&user))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);

    let res = client
        .get(format!(
            "{}/api/v1/projects/get-project-by-id/{}",
            server.base_url, project_id
        ))
        .header("Authorization", common::bearer(&user))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn project_update_is_allow_listed() -> Result<()> {
    let Some(server) = common::server().await? else {
        return Ok(());
    };
    let client = reqwest::Client::new();
    let user = common::register_and_login(&client, &server.base_url).await?;
    let project_id = create_project(&client, &server.base_url, &user, "Renamable").await?;

    let res = client
        .patch(format!(
            "{}/api/v1/projects/update-project/{}",
            server.base_url, project_id
        ))
        .header("Authorization", common::bearer(&user))
        .json(&json!({ "status": "On Hold" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["data"]["status"], "On Hold");
    assert_eq!(body["data"]["name"], "Renamable");

    // Empty update returns the stored project unchanged
    let res = client
        .patch(format!(
            "{}/api/v1/projects/update-project/{}",
            server.base_url, project_id
        ))
        .header("Authorization", common::bearer(&user))
        .json(&json!({}))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["message"], "No updatable fields provided");
    assert_eq!(body["data"]["status"], "On Hold");
    Ok(())
}

#[tokio::test]
async fn projects_are_private_to_their_owner() -> Result<()> {
    let Some(server) = common::server().await? else {
        return Ok(());
    };
    let client = reqwest::Client::new();
    let user_a = common::register_and_login(&client, &server.base_url).await?;
    let user_b = common::register_and_login(&client, &server.base_url).await?;
    let project_id = create_project(&client, &server.base_url, &user_a, "Secret").await?;

    let res = client
        .get(format!(
            "{}/api/v1/projects/get-project-by-id/{}",
            server.base_url, project_id
        ))
        .header("Authorization", common::bearer(&user_b))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    // B's own listing does not include A's project
    let res = client
        .get(format!("{}/api/v1/projects/get-projects", server.base_url))
        .header("Authorization", common::bearer(&user_b))
        .send()
        .await?;
    let body = res.json::<serde_json::Value>().await?;
    assert!(body["data"].as_array().unwrap().is_empty());
    Ok(())
}
