mod common;

use anyhow::Result;
use chrono::{DateTime, Duration, Utc};
use reqwest::StatusCode;
use serde_json::json;

#[tokio::test]
async fn created_task_gets_the_documented_defaults() -> Result<()> {
    let Some(server) = common::server().await? else {
        return Ok(());
    };
    let client = reqwest::Client::new();
    let user = common::register_and_login(&client, &server.base_url).await?;

    let before = Utc::now();
    let res = client
        .post(format!("{}/api/v1/tasks/create", server.base_url))
        .header("Authorization", common::bearer(&user))
        .json(&json!({ "title": "Write report", "description": "Quarterly numbers" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);

    let body = res.json::<serde_json::Value>().await?;
    let task = &body["data"];
    assert_eq!(task["status"], "Pending");
    assert_eq!(task["priority"], "Medium");
    assert_eq!(task["user"], user.id.as_str());

    // Due date defaults to ~24h from creation
    let due: DateTime<Utc> = task["dueDate"].as_str().unwrap().parse()?;
    let expected = before + Duration::hours(24);
    assert!((due - expected).num_minutes().abs() < 5, "dueDate: {}", due);
    Ok(())
}

#[tokio::test]
async fn create_requires_title_and_description() -> Result<()> {
    let Some(server) = common::server().await? else {
        return Ok(());
    };
    let client = reqwest::Client::new();
    let user = common::register_and_login(&client, &server.base_url).await?;

    let res = client
        .post(format!("{}/api/v1/tasks/create", server.base_url))
        .header("Authorization", common::bearer(&user))
        .json(&json!({ "title": "No description" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    // Invalid enum values are rejected before reaching the handler
    let res = client
        .post(format!("{}/api/v1/tasks/create", server.base_url))
        .header("Authorization", common::bearer(&user))
        .json(&json!({ "title": "T", "description": "D", "status": "Done" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn ownership_is_enforced_end_to_end() -> Result<()> {
    let Some(server) = common::server().await? else {
        return Ok(());
    };
    let client = reqwest::Client::new();
    let user_a = common::register_and_login(&client, &server.base_url).await?;
    let user_b = common::register_and_login(&client, &server.base_url).await?;

    // A creates a task
    let res = client
        .post(format!("{}/api/v1/tasks/create", server.base_url))
        .header("Authorization", common::bearer(&user_a))
        .json(&json!({ "title": "Private task", "description": "Owned by A" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);
    let task_id = res.json::<serde_json::Value>().await?["data"]["id"]
        .as_str()
        .unwrap()
        .to_string();

    // B cannot read, modify or delete it
    let res = client
        .get(format!(
            "{}/api/v1/tasks/get-task-by-id/{}",
            server.base_url, task_id
        ))
        .header("Authorization", common::bearer(&user_b))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let res = client
        .patch(format!(
            "{}/api/v1/tasks/update-task/{}",
            server.base_url, task_id
        ))
        .header("Authorization", common::bearer(&user_b))
        .json(&json!({ "title": "Hijacked" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let res = client
        .delete(format!(
            "{}/api/v1/tasks/delete-task/{}",
            server.base_url, task_id
        ))
        .header("Authorization", common::bearer(&user_b))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    // A deletes it; a later fetch by A is a 404
    let res = client
        .delete(format!(
            "{}/api/v1/tasks/delete-task/{}",
            server.base_url, task_id
        ))
        .header("Authorization", common::bearer(&user_a))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);

    let res = client
        .get(format!(
            "{}/api/v1/tasks/get-task-by-id/{}",
            server.base_url, task_id
        ))
        .header("Authorization", common::bearer(&user_a))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn partial_update_touches_only_the_sent_fields() -> Result<()> {
    let Some(server) = common::server().await? else {
        return Ok(());
    };
    let client = reqwest::Client::new();
    let user = common::register_and_login(&client, &server.base_url).await?;

    let res = client
        .post(format!("{}/api/v1/tasks/create", server.base_url))
        .header("Authorization", common::bearer(&user))
        .json(&json!({ "title": "Original", "description": "Original description" }))
        .send()
        .await?;
    let task_id = res.json::<serde_json::Value>().await?["data"]["id"]
        .as_str()
        .unwrap()
        .to_string();

    let res = client
        .patch(format!(
            "{}/api/v1/tasks/update-task/{}",
            server.base_url, task_id
        ))
        .header("Authorization", common::bearer(&user))
        .json(&json!({ "status": "In-Progress" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["data"]["status"], "In-Progress");
    assert_eq!(body["data"]["title"], "Original");
    assert_eq!(body["data"]["description"], "Original description");

    // Empty update leaves the row untouched
    let res = client
        .patch(format!(
            "{}/api/v1/tasks/update-task/{}",
            server.base_url, task_id
        ))
        .header("Authorization", common::bearer(&user))
        .json(&json!({}))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["data"]["status"], "In-Progress");
    assert_eq!(body["message"], "No updatable fields provided");
    Ok(())
}

#[tokio::test]
async fn search_is_scoped_to_the_caller() -> Result<()> {
    let Some(server) = common::server().await? else {
        return Ok(());
    };
    let client = reqwest::Client::new();
    let user_a = common::register_and_login(&client, &server.base_url).await?;
    let user_b = common::register_and_login(&client, &server.base_url).await?;

    let marker = format!("marker{}", common::unique_suffix());
    for (owner, title) in [
        (&user_a, format!("{} alpha", marker)),
        (&user_a, format!("{} beta", marker)),
        (&user_b, format!("{} gamma", marker)),
    ] {
        let res = client
            .post(format!("{}/api/v1/tasks/create", server.base_url))
            .header("Authorization", common::bearer(owner))
            .json(&json!({ "title": title, "description": "searchable" }))
            .send()
            .await?;
        assert_eq!(res.status(), StatusCode::CREATED);
    }

    // A sees only A's matches, case-insensitively
    let res = client
        .get(format!(
            "{}/api/v1/tasks/search?q={}",
            server.base_url,
            marker.to_uppercase()
        ))
        .header("Authorization", common::bearer(&user_a))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body = res.json::<serde_json::Value>().await?;
    let results = body["data"].as_array().unwrap();
    assert_eq!(results.len(), 2);
    for task in results {
        assert_eq!(task["user"], user_a.id.as_str());
    }

    // Status filter narrows further
    let res = client
        .get(format!(
            "{}/api/v1/tasks/search?q={}&status=Completed",
            server.base_url, marker
        ))
        .header("Authorization", common::bearer(&user_a))
        .send()
        .await?;
    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["data"].as_array().unwrap().len(), 0);
    Ok(())
}

#[tokio::test]
async fn task_list_is_most_recent_first() -> Result<()> {
    let Some(server) = common::server().await? else {
        return Ok(());
    };
    let client = reqwest::Client::new();
    let user = common::register_and_login(&client, &server.base_url).await?;

    for title in ["first", "second", "third"] {
        let res = client
            .post(format!("{}/api/v1/tasks/create", server.base_url))
            .header("Authorization", common::bearer(&user))
            .json(&json!({ "title": title, "description": "ordering" }))
            .send()
            .await?;
        assert_eq!(res.status(), StatusCode::CREATED);
    }

    let res = client
        .get(format!("{}/api/v1/tasks/get-tasks", server.base_url))
        .header("Authorization", common::bearer(&user))
        .send()
        .await?;
    let body = res.json::<serde_json::Value>().await?;
    let tasks = body["data"].as_array().unwrap();
    assert_eq!(tasks.len(), 3);
    assert_eq!(tasks[0]["title"], "third");
    assert_eq!(tasks[2]["title"], "first");
    Ok(())
}
