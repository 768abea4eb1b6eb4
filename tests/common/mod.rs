use std::process::{Child, Command, Stdio};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::OnceLock;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};
use reqwest::StatusCode;

static SERVER: OnceLock<TestServer> = OnceLock::new();
static COUNTER: AtomicU64 = AtomicU64::new(0);

pub struct TestServer {
    pub base_url: String,
    #[allow(dead_code)]
    child: Child,
}

impl TestServer {
    fn spawn() -> Result<Self> {
        // Pick an unused port for isolation
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);

        // Spawn the already-built binary to keep start fast during tests
        // Assumes debug profile; adjust if you run tests with --release
        let mut cmd = Command::new("target/debug/taskboard-api");
        cmd.env("TASKBOARD_PORT", port.to_string())
            .env("APP_ENV", "development")
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());

        // Inherit environment so the server sees DATABASE_URL from .env
        let child = cmd.spawn().context("failed to spawn server binary")?;

        Ok(Self { base_url, child })
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let client = reqwest::Client::new();
        let deadline = Instant::now() + timeout;
        loop {
            if Instant::now() > deadline {
                break;
            }
            let url = format!("{}/health", self.base_url);
            if let Ok(resp) = client.get(&url).send().await {
                if resp.status() == StatusCode::OK {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(150)).await;
        }
        anyhow::bail!(
            "server did not become ready on {} within {:?}",
            self.base_url,
            timeout
        )
    }
}

/// Returns `None` when DATABASE_URL is not configured, so suites can skip
/// cleanly instead of failing on machines without a database.
pub async fn server() -> Result<Option<&'static TestServer>> {
    let _ = dotenvy::dotenv();
    if std::env::var("DATABASE_URL").is_err() {
        eprintln!("skipping: DATABASE_URL is not set");
        return Ok(None);
    }

    let server = SERVER.get_or_init(|| TestServer::spawn().expect("failed to spawn server binary"));
    server.wait_ready(Duration::from_secs(10)).await?;
    Ok(Some(server))
}

/// Unique-enough suffix so registrations do not collide across runs against
/// a persistent database.
#[allow(dead_code)]
pub fn unique_suffix() -> String {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    let n = COUNTER.fetch_add(1, Ordering::Relaxed);
    format!("{:x}{}", nanos, n)
}

#[allow(dead_code)]
pub struct TestUser {
    pub id: String,
    pub username: String,
    pub email: String,
    pub password: String,
    pub access_token: String,
    pub refresh_token: String,
}

/// Register a fresh user and log in, returning both tokens.
#[allow(dead_code)]
pub async fn register_and_login(client: &reqwest::Client, base_url: &str) -> Result<TestUser> {
    let suffix = unique_suffix();
    let username = format!("user{}", suffix);
    let email = format!("user{}@example.com", suffix);
    let password = "correct-horse-battery".to_string();

    let res = client
        .post(format!("{}/api/v1/auth/register", base_url))
        .json(&serde_json::json!({
            "fullName": "Test User",
            "username": username,
            "email": email,
            "password": password,
        }))
        .send()
        .await?;
    anyhow::ensure!(
        res.status() == StatusCode::CREATED,
        "register failed: {}",
        res.status()
    );

    let res = client
        .post(format!("{}/api/v1/auth/login", base_url))
        .json(&serde_json::json!({ "identifier": username, "password": password }))
        .send()
        .await?;
    anyhow::ensure!(res.status() == StatusCode::OK, "login failed: {}", res.status());

    let body: serde_json::Value = res.json().await?;
    let access_token = body["data"]["accessToken"]
        .as_str()
        .context("missing accessToken")?
        .to_string();
    let refresh_token = body["data"]["refreshToken"]
        .as_str()
        .context("missing refreshToken")?
        .to_string();
    let id = body["data"]["user"]["id"]
        .as_str()
        .context("missing user id")?
        .to_string();

    Ok(TestUser {
        id,
        username,
        email,
        password,
        access_token,
        refresh_token,
    })
}

#[allow(dead_code)]
pub fn bearer(user: &TestUser) -> String {
    format!("Bearer {}", user.access_token)
}
