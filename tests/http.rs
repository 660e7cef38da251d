use once_cell::sync::Lazy;
use reqwest::Client;
use serde_json::{json, Value};
use std::net::TcpListener;
use std::process::{Child, Command, Stdio};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tokio::time::sleep;

struct TestServer {
    base_url: String,
    child: Child,
}

impl Drop for TestServer {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

static TEST_LOCK: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));
static SERVER: Lazy<Mutex<Option<Arc<TestServer>>>> = Lazy::new(|| Mutex::new(None));

#[cfg(unix)]
mod cleanup {
    use std::sync::atomic::{AtomicI32, Ordering};
    use std::sync::Once;

    static REGISTER: Once = Once::new();
    static PID: AtomicI32 = AtomicI32::new(0);

    pub fn register(pid: u32) {
        REGISTER.call_once(|| {
            PID.store(pid as i32, Ordering::SeqCst);
            unsafe {
                libc::atexit(on_exit);
            }
        });
    }

    extern "C" fn on_exit() {
        let pid = PID.load(Ordering::SeqCst);
        if pid > 0 {
            unsafe {
                libc::kill(pid, libc::SIGTERM);
            }
        }
    }
}

fn pick_free_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind random port");
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    port
}

fn unique_data_path() -> String {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    let mut path = std::env::temp_dir();
    path.push(format!(
        "wellness_app_http_{}_{}.json",
        std::process::id(),
        nanos
    ));
    path.to_string_lossy().to_string()
}

fn unique_user(prefix: &str) -> String {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    format!("{prefix}-{nanos}")
}

async fn wait_until_ready(base_url: &str) {
    let client = Client::new();
    let deadline = Instant::now() + Duration::from_secs(3);
    loop {
        if let Ok(resp) = client
            .get(format!("{base_url}/api/questions/today"))
            .send()
            .await
        {
            if resp.status().is_success() {
                return;
            }
        }
        if Instant::now() > deadline {
            panic!("server did not become ready");
        }
        sleep(Duration::from_millis(100)).await;
    }
}

async fn spawn_server() -> TestServer {
    let port = pick_free_port();
    let data_path = unique_data_path();
    let child = Command::new(env!("CARGO_BIN_EXE_wellness_app"))
        .env("PORT", port.to_string())
        .env("APP_DATA_PATH", data_path)
        .env("RUST_LOG", "info")
        .env_remove("TIP_SERVICE_URL")
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .spawn()
        .expect("failed to spawn server");

    #[cfg(unix)]
    cleanup::register(child.id());

    let base_url = format!("http://127.0.0.1:{port}");
    wait_until_ready(&base_url).await;

    TestServer { base_url, child }
}

async fn shared_server() -> Arc<TestServer> {
    let mut guard = SERVER.lock().await;
    if let Some(server) = guard.as_ref() {
        return Arc::clone(server);
    }
    let server = Arc::new(spawn_server().await);
    *guard = Some(Arc::clone(&server));
    server
}

async fn todays_question_count(client: &Client, base_url: &str) -> usize {
    let questions: Value = client
        .get(format!("{base_url}/api/questions/today"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    questions.as_array().expect("question array").len()
}

async fn submit_check_in(client: &Client, base_url: &str, user: &str, answers: Value) -> reqwest::Response {
    client
        .post(format!("{base_url}/api/mood-session"))
        .json(&json!({ "user_id": user, "answers": answers }))
        .send()
        .await
        .unwrap()
}

#[tokio::test]
async fn http_questions_today_is_deterministic_and_bounded() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let first: Value = client
        .get(format!("{}/api/questions/today", server.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let second: Value = client
        .get(format!("{}/api/questions/today", server.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(first, second);
    let len = first.as_array().unwrap().len();
    assert!((5..=8).contains(&len), "unexpected question count {len}");
}

#[tokio::test]
async fn http_check_in_scores_and_counts() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();
    let user = unique_user("scorer");

    let count = todays_question_count(&client, &server.base_url).await;
    let answers = Value::Array(vec![json!(2); count]);
    let response = submit_check_in(&client, &server.base_url, &user, answers).await;
    assert!(response.status().is_success());

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["daily_sessions"], json!(1));
    let scores = body["session"]["perma_scores"].as_object().unwrap();
    assert_eq!(scores.len(), 5);
    // Every pillar asked about today averages 2; absent pillars stay 0.
    for value in scores.values() {
        let v = value.as_f64().unwrap();
        assert!(v == 2.0 || v == 0.0, "unexpected average {v}");
    }
    assert!(body["session"]["strongest"].is_string());
    assert!(body["session"]["weakest"].is_string());
    assert!(body["session"]["summary"]
        .as_str()
        .unwrap()
        .contains("Strongest pillar"));
}

#[tokio::test]
async fn http_third_check_in_is_rejected() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();
    let user = unique_user("limited");

    let count = todays_question_count(&client, &server.base_url).await;
    for _ in 0..2 {
        let answers = Value::Array(vec![json!(1); count]);
        let response = submit_check_in(&client, &server.base_url, &user, answers).await;
        assert!(response.status().is_success());
    }

    let answers = Value::Array(vec![json!(1); count]);
    let response = submit_check_in(&client, &server.base_url, &user, answers).await;
    assert_eq!(response.status().as_u16(), 429);

    let status: Value = client
        .get(format!(
            "{}/api/mood-session/daily-count?user_id={user}",
            server.base_url
        ))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(status["count"], json!(2));
    assert_eq!(status["can_check_in"], json!(false));
    assert!(status["next_check_in"].is_string());
}

#[tokio::test]
async fn http_concurrent_submissions_admit_exactly_two() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();
    let user = unique_user("parallel");

    let count = todays_question_count(&client, &server.base_url).await;
    let mut tasks = Vec::new();
    for _ in 0..5 {
        let client = client.clone();
        let base_url = server.base_url.clone();
        let user = user.clone();
        tasks.push(tokio::spawn(async move {
            let answers = Value::Array(vec![json!(2); count]);
            submit_check_in(&client, &base_url, &user, answers)
                .await
                .status()
                .as_u16()
        }));
    }

    let mut admitted = 0;
    let mut denied = 0;
    for task in tasks {
        match task.await.unwrap() {
            200 => admitted += 1,
            429 => denied += 1,
            other => panic!("unexpected status {other}"),
        }
    }
    assert_eq!(admitted, 2);
    assert_eq!(denied, 3);
}

#[tokio::test]
async fn http_unanswered_questionnaire_is_bad_request() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();
    let user = unique_user("partial");

    let count = todays_question_count(&client, &server.base_url).await;
    let mut answers = vec![json!(2); count];
    answers[0] = Value::Null;
    let response = submit_check_in(&client, &server.base_url, &user, Value::Array(answers)).await;
    assert_eq!(response.status().as_u16(), 400);
}

#[tokio::test]
async fn http_trends_reflect_recorded_sessions() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();
    let user = unique_user("trends");

    let count = todays_question_count(&client, &server.base_url).await;
    let answers = Value::Array(vec![json!(2); count]);
    let response = submit_check_in(&client, &server.base_url, &user, answers).await;
    assert!(response.status().is_success());

    let body: Value = client
        .get(format!(
            "{}/api/mood-session/trends?user_id={user}",
            server.base_url
        ))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    let trends = body["trends"].as_object().unwrap();
    assert_eq!(trends.len(), 5);
    for record in trends.values() {
        let first = record["trend"].as_array().unwrap()[0].as_f64().unwrap();
        assert_eq!(first, 0.0);
        assert_eq!(record["consistency"], json!(true));
    }
    assert!(body["mood"].is_string());
    // A single session has no downward movement, so nothing to suggest.
    assert_eq!(body["suggestions"], json!([]));
}

#[tokio::test]
async fn http_sessions_list_newest_first_with_date_filter() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();
    let user = unique_user("history");

    let count = todays_question_count(&client, &server.base_url).await;
    for score in [1, 2] {
        let answers = Value::Array(vec![json!(score); count]);
        let response = submit_check_in(&client, &server.base_url, &user, answers).await;
        assert!(response.status().is_success());
    }

    let sessions: Value = client
        .get(format!(
            "{}/api/mood-session?user_id={user}",
            server.base_url
        ))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let sessions = sessions.as_array().unwrap();
    assert_eq!(sessions.len(), 2);
    // Newest first: the second submission (all 2s) leads.
    assert_eq!(sessions[0]["answers"], json!(vec![2; count]));
    assert_eq!(sessions[1]["answers"], json!(vec![1; count]));
    let newest = sessions[0]["timestamp"].as_str().unwrap();
    let oldest = sessions[1]["timestamp"].as_str().unwrap();
    assert!(newest >= oldest, "{newest} should not precede {oldest}");

    let today = &newest[..10];
    let todays: Value = client
        .get(format!(
            "{}/api/mood-session?user_id={user}&date={today}",
            server.base_url
        ))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(todays.as_array().unwrap().len(), 2);

    let other_day: Value = client
        .get(format!(
            "{}/api/mood-session?user_id={user}&date=2020-01-01",
            server.base_url
        ))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(other_day.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn http_budget_analytics_split_savings_from_expenses() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();
    let user = unique_user("budget");

    let response = client
        .post(format!("{}/api/budget", server.base_url))
        .json(&json!({
            "user_id": user,
            "income": 1000.0,
            "expenses": { "rent": 500.0, "savings": 200.0 }
        }))
        .send()
        .await
        .unwrap();
    assert!(response.status().is_success());

    let analytics: Value = client
        .get(format!(
            "{}/api/budget/analytics?user_id={user}&period=3m",
            server.base_url
        ))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    let series = &analytics["time_series"];
    assert_eq!(series["income"], json!([1000.0]));
    assert_eq!(series["expenses"], json!([500.0]));
    assert_eq!(series["savings"], json!([200.0]));
    let breakdown = analytics["current_month_breakdown"].as_object().unwrap();
    assert_eq!(breakdown["rent"], json!(500.0));
    assert_eq!(breakdown["savings"], json!(200.0));
}

#[tokio::test]
async fn http_perma_chat_without_collaborator_is_bad_gateway() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let response = client
        .post(format!("{}/api/perma-chat", server.base_url))
        .json(&json!({
            "perma_scores": {},
            "summary": "",
            "user_message": "any advice?",
            "timezone": "UTC"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 502);
}
