use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use configs::StorageConfig;
use reqwest::StatusCode as HttpStatusCode;
use serde_json::{json, Value};
use service::todo::TodoStore;
use tokio::net::TcpListener;
use uuid::Uuid;

use server::startup::{build_app, build_store};

struct TestApp {
    base_url: String,
}

async fn serve(store: Arc<TodoStore>) -> anyhow::Result<TestApp> {
    let app = build_app(store);
    let listener = TcpListener::bind((std::net::Ipv4Addr::LOCALHOST, 0)).await?;
    let addr: SocketAddr = listener.local_addr()?;
    let base_url = format!("http://{}:{}", addr.ip(), addr.port());

    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await { eprintln!("server error: {}", e); }
    });

    Ok(TestApp { base_url })
}

async fn start_in_memory() -> anyhow::Result<TestApp> {
    serve(TodoStore::in_memory()).await
}

fn temp_store_path() -> PathBuf {
    PathBuf::from(format!("target/test-data/{}/todos.json", Uuid::new_v4()))
}

fn client() -> reqwest::Client {
    reqwest::Client::new()
}

async fn create(app: &TestApp, name: &str, user_id: i64) -> anyhow::Result<Value> {
    let res = client()
        .post(format!("{}/todos", app.base_url))
        .json(&json!({"name": name, "userId": user_id}))
        .send()
        .await?;
    assert_eq!(res.status(), HttpStatusCode::CREATED);
    Ok(res.json::<Value>().await?)
}

#[tokio::test]
async fn e2e_public_health() -> anyhow::Result<()> {
    let app = start_in_memory().await?;
    let res = client().get(format!("{}/health", app.base_url)).send().await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    let body = res.json::<Value>().await?;
    assert_eq!(body["status"], "ok");
    Ok(())
}

#[tokio::test]
async fn e2e_create_fetch_delete_lifecycle() -> anyhow::Result<()> {
    let app = start_in_memory().await?;
    let c = client();

    let created = create(&app, "Buy milk", 1).await?;
    assert_eq!(created, json!({"id": 1, "name": "Buy milk", "userId": 1}));

    let res = c.get(format!("{}/todos/byid?todoId=1", app.base_url)).send().await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    assert_eq!(res.json::<Value>().await?, created);

    let res = c.delete(format!("{}/todos/1", app.base_url)).send().await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    let body = res.json::<Value>().await?;
    assert_eq!(body["id"], 1);

    let res = c.get(format!("{}/todos/byid?todoId=1", app.base_url)).send().await?;
    assert_eq!(res.status(), HttpStatusCode::NOT_FOUND);
    let body = res.json::<Value>().await?;
    assert_eq!(body["error"], "Not Found");
    Ok(())
}

#[tokio::test]
async fn e2e_missing_or_invalid_query_params_are_bad_requests() -> anyhow::Result<()> {
    let app = start_in_memory().await?;
    let c = client();

    for path in [
        "/todos/byuserid",
        "/todos/byuserid?userId=abc",
        "/todos/byid",
        "/todos/byid?todoId=",
        "/todos/byname",
        "/todos/byname?name=x&match=fuzzy",
    ] {
        let res = c.get(format!("{}{}", app.base_url, path)).send().await?;
        assert_eq!(res.status(), HttpStatusCode::BAD_REQUEST, "GET {path}");
    }

    let res = c.delete(format!("{}/todos", app.base_url)).send().await?;
    assert_eq!(res.status(), HttpStatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn e2e_create_requires_name_and_user() -> anyhow::Result<()> {
    let app = start_in_memory().await?;
    let c = client();

    for body in [json!({"name": "x"}), json!({"userId": 1}), json!({"name": "", "userId": 1})] {
        let res = c.post(format!("{}/todos", app.base_url)).json(&body).send().await?;
        assert_eq!(res.status(), HttpStatusCode::BAD_REQUEST, "POST {body}");
    }

    // numeric strings are accepted for userId
    let res = c
        .post(format!("{}/todos", app.base_url))
        .json(&json!({"name": "Tea", "userId": "3"}))
        .send()
        .await?;
    assert_eq!(res.status(), HttpStatusCode::CREATED);
    assert_eq!(res.json::<Value>().await?["userId"], 3);
    Ok(())
}

#[tokio::test]
async fn e2e_malformed_bodies_are_bad_requests() -> anyhow::Result<()> {
    let app = start_in_memory().await?;
    let c = client();
    create(&app, "existing", 1).await?;

    // no body and no content type at all
    let res = c.post(format!("{}/todos", app.base_url)).send().await?;
    assert_eq!(res.status(), HttpStatusCode::BAD_REQUEST);
    assert_eq!(res.json::<Value>().await?["error"], "Bad Request");

    // well-formed JSON with the wrong field types
    for body in [json!({"name": 5, "userId": 1}), json!({"name": "x", "userId": true})] {
        let res = c.post(format!("{}/todos", app.base_url)).json(&body).send().await?;
        assert_eq!(res.status(), HttpStatusCode::BAD_REQUEST, "POST {body}");
    }

    // broken JSON syntax
    let res = c
        .post(format!("{}/todos", app.base_url))
        .header("content-type", "application/json")
        .body("{\"name\":")
        .send()
        .await?;
    assert_eq!(res.status(), HttpStatusCode::BAD_REQUEST);

    for path in ["/todos/update?todoId=1", "/todos/1"] {
        let res = c.put(format!("{}{}", app.base_url, path)).send().await?;
        assert_eq!(res.status(), HttpStatusCode::BAD_REQUEST, "PUT {path}");
    }

    // nothing above changed the collection
    let all = c.get(format!("{}/todos/all", app.base_url)).send().await?.json::<Value>().await?;
    assert_eq!(all, json!([{"id": 1, "name": "existing", "userId": 1}]));
    Ok(())
}

#[tokio::test]
async fn e2e_index_greets() -> anyhow::Result<()> {
    let app = start_in_memory().await?;
    let res = client().get(format!("{}/", app.base_url)).send().await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    assert_eq!(res.text().await?, "Hello my name is Tom");
    Ok(())
}

#[tokio::test]
async fn e2e_bulk_delete_partial_match_succeeds() -> anyhow::Result<()> {
    let app = start_in_memory().await?;
    let c = client();
    create(&app, "only", 1).await?;

    let res = c.delete(format!("{}/todos?todoId=1&todoId=2", app.base_url)).send().await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    let body = res.json::<Value>().await?;
    assert_eq!(body["deleted"], 1);

    let res = c.delete(format!("{}/todos?todoId=1", app.base_url)).send().await?;
    assert_eq!(res.status(), HttpStatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn e2e_queries_by_user_and_name() -> anyhow::Result<()> {
    let app = start_in_memory().await?;
    let c = client();
    create(&app, "Milk", 1).await?;
    create(&app, "Water", 2).await?;
    create(&app, "Oat milk", 1).await?;

    let res = c.get(format!("{}/todos/byuserid?userId=1", app.base_url)).send().await?;
    let ids: Vec<i64> = res
        .json::<Vec<Value>>()
        .await?
        .iter()
        .filter_map(|t| t["id"].as_i64())
        .collect();
    assert_eq!(ids, vec![1, 3]);

    let res = c.get(format!("{}/todos/byuserid?userId=9", app.base_url)).send().await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    assert_eq!(res.json::<Value>().await?, json!([]));

    let res = c.get(format!("{}/todos/byname?name=milk", app.base_url)).send().await?;
    assert_eq!(res.json::<Value>().await?, json!([{"id": 1, "name": "Milk", "userId": 1}]));

    let res = c.get(format!("{}/todos/byname?name=MIL&match=contains", app.base_url)).send().await?;
    assert_eq!(res.json::<Vec<Value>>().await?.len(), 2);

    let res = c.get(format!("{}/todos/byname?name=bread", app.base_url)).send().await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    assert_eq!(res.json::<Value>().await?, json!([]));
    Ok(())
}

#[tokio::test]
async fn e2e_update_by_query_and_path() -> anyhow::Result<()> {
    let app = start_in_memory().await?;
    let c = client();
    create(&app, "draft", 1).await?;

    let res = c
        .put(format!("{}/todos/update?todoId=1", app.base_url))
        .json(&json!({"name": "final"}))
        .send()
        .await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    assert_eq!(res.json::<Value>().await?, json!({"id": 1, "name": "final", "userId": 1}));

    let res = c
        .put(format!("{}/todos/1", app.base_url))
        .json(&json!({"name": "moved", "userId": 4}))
        .send()
        .await?;
    assert_eq!(res.json::<Value>().await?, json!({"id": 1, "name": "moved", "userId": 4}));

    let res = c.put(format!("{}/todos/1", app.base_url)).json(&json!({"userId": 4})).send().await?;
    assert_eq!(res.status(), HttpStatusCode::BAD_REQUEST);

    let res = c.put(format!("{}/todos/2", app.base_url)).json(&json!({"name": "x"})).send().await?;
    assert_eq!(res.status(), HttpStatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn e2e_delete_all_clears_but_ids_keep_growing() -> anyhow::Result<()> {
    let app = start_in_memory().await?;
    let c = client();
    create(&app, "a", 1).await?;
    create(&app, "b", 1).await?;

    let res = c.delete(format!("{}/todos/all", app.base_url)).send().await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    assert_eq!(res.json::<Value>().await?["deleted"], 2);

    let res = c.get(format!("{}/todos/all", app.base_url)).send().await?;
    assert_eq!(res.json::<Value>().await?, json!([]));

    let created = create(&app, "c", 1).await?;
    assert_eq!(created["id"], 3);
    Ok(())
}

#[tokio::test]
async fn e2e_persisted_state_reloads_after_restart() -> anyhow::Result<()> {
    let cfg = StorageConfig { persist: true, path: temp_store_path().display().to_string(), seed_demo: false };

    let app = serve(build_store(&cfg).await?).await?;
    create(&app, "one", 1).await?;
    create(&app, "two", 2).await?;
    create(&app, "three", 1).await?;
    let res = client().delete(format!("{}/todos/2", app.base_url)).send().await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    let before = client().get(format!("{}/todos/all", app.base_url)).send().await?.json::<Value>().await?;

    let restarted = serve(build_store(&cfg).await?).await?;
    let after = client().get(format!("{}/todos/all", restarted.base_url)).send().await?.json::<Value>().await?;
    assert_eq!(after, before);

    let created = create(&restarted, "four", 1).await?;
    assert_eq!(created["id"], 4);

    let _ = tokio::fs::remove_file(&cfg.path).await;
    Ok(())
}

#[tokio::test]
async fn e2e_seed_demo_populates_empty_store() -> anyhow::Result<()> {
    let cfg = StorageConfig { persist: false, path: String::new(), seed_demo: true };
    let app = serve(build_store(&cfg).await?).await?;
    let res = client().get(format!("{}/todos/byuserid?userId=1", app.base_url)).send().await?;
    let todos = res.json::<Vec<Value>>().await?;
    assert_eq!(todos.len(), 2);
    assert_eq!(todos[0]["name"], "Milch holen");
    Ok(())
}
