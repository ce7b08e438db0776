use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::StatusCode;
use rust_decimal::Decimal;
use serde_json::{json, Value};

use shopfloor_api::app::{build_app, services::AppServices};
use shopfloor_infra::config::UploadConfig;
use shopfloor_infra::external::{HostedMedia, OutgoingMail, StagedUpload};
use shopfloor_infra::{InMemoryRepository, Mailer, MediaHost, UpstreamError};

/// Media host double: records what it saw and answers with a canned outcome.
#[derive(Default)]
struct FakeMediaHost {
    fail: bool,
    delay: Option<Duration>,
    seen: Mutex<Vec<(PathBuf, bool)>>,
}

#[async_trait]
impl MediaHost for FakeMediaHost {
    async fn upload(&self, upload: &StagedUpload) -> Result<HostedMedia, UpstreamError> {
        self.seen
            .lock()
            .unwrap()
            .push((upload.path.clone(), upload.path.exists()));
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail {
            return Err(UpstreamError::Rejected {
                service: "media host",
                status: 500,
                body: "boom".to_string(),
            });
        }
        Ok(HostedMedia {
            url: format!("https://media.example/posts/{}", upload.file_name),
            file_type: upload.kind.as_str().to_string(),
            file_name: upload.file_name.clone(),
        })
    }
}

#[derive(Default)]
struct FakeMailer {
    fail: bool,
    sent: Mutex<Vec<OutgoingMail>>,
}

#[async_trait]
impl Mailer for FakeMailer {
    async fn send(&self, mail: OutgoingMail) -> Result<(), UpstreamError> {
        if self.fail {
            return Err(UpstreamError::Transport {
                service: "mail relay",
                message: "connection refused".to_string(),
            });
        }
        self.sent.lock().unwrap().push(mail);
        Ok(())
    }
}

struct TestServer {
    base_url: String,
    handle: tokio::task::JoinHandle<()>,
    media: Arc<FakeMediaHost>,
    mailer: Arc<FakeMailer>,
    staging: tempfile::TempDir,
}

impl TestServer {
    async fn spawn() -> Self {
        Self::spawn_with(FakeMediaHost::default(), FakeMailer::default()).await
    }

    async fn spawn_with(media: FakeMediaHost, mailer: FakeMailer) -> Self {
        Self::spawn_with_timeout(media, mailer, Duration::from_secs(5)).await
    }

    async fn spawn_with_timeout(media: FakeMediaHost, mailer: FakeMailer, timeout: Duration) -> Self {
        let staging = tempfile::tempdir().expect("failed to create staging dir");
        let media = Arc::new(media);
        let mailer = Arc::new(mailer);
        let services = AppServices::new(
            Arc::new(InMemoryRepository::new()),
            media.clone(),
            mailer.clone(),
            UploadConfig {
                staging_dir: staging.path().to_path_buf(),
                max_bytes: 1024 * 1024,
                timeout,
            },
        );

        // Same router as prod, bound to an ephemeral port.
        let app = build_app(services);
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url,
            handle,
            media,
            mailer,
            staging,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn staging_dir(&self) -> &Path {
        self.staging.path()
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn dec(value: &Value) -> Decimal {
    Decimal::from_str(value.as_str().expect("decimal serialized as string")).unwrap()
}

async fn create_acme(client: &reqwest::Client, srv: &TestServer) -> Value {
    let res = client
        .post(srv.url("/supplier"))
        .json(&json!({
            "name": "Acme",
            "company": "Acme Ltd",
            "email": "a@acme.test",
            "phone": "555-0100",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    res.json().await.unwrap()
}

async fn create_widget(client: &reqwest::Client, srv: &TestServer, supplier_id: i64) -> Value {
    let res = client
        .post(srv.url(&format!("/product/{supplier_id}")))
        .json(&json!({
            "name": "Widget",
            "quantity_in_stock": 10,
            "unit_price": "2.50",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    res.json().await.unwrap()
}

fn image_form(caption: Option<&str>) -> Form {
    let part = Part::bytes(vec![0x89, b'P', b'N', b'G', 1, 2, 3])
        .file_name("cat.png")
        .mime_str("image/png")
        .unwrap();
    let form = Form::new().part("file", part);
    match caption {
        Some(c) => form.text("caption", c.to_string()),
        None => form,
    }
}

#[tokio::test]
async fn health_is_ok() {
    let srv = TestServer::spawn().await;
    let res = reqwest::get(srv.url("/health")).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn supplier_product_sale_scenario() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let supplier = create_acme(&client, &srv).await;
    assert_eq!(supplier["status"], "ok");
    assert_eq!(supplier["data"]["id"], 1);
    assert_eq!(supplier["data"]["name"], "Acme");

    let product = create_widget(&client, &srv, 1).await;
    let product_id = product["data"]["id"].as_i64().unwrap();
    assert_eq!(product["data"]["supplied_by"], 1);
    assert_eq!(product["data"]["quantity_in_stock"], 10);
    assert_eq!(product["data"]["quantity_sold"], 0);
    assert_eq!(dec(&product["data"]["revenue"]), Decimal::ZERO);
    assert_eq!(product["data"]["unit_price"], "2.50");
    assert_eq!(product["data"]["revenue"], "0.000");

    // Numbers are accepted too; the stored scale does not depend on the input's.
    let res = client
        .put(srv.url(&format!("/product/{product_id}")))
        .json(&json!({ "quantity_sold": 3, "quantity": 3, "unit_price": 2.5 }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let updated: Value = res.json().await.unwrap();
    assert_eq!(updated["data"]["quantity_sold"], 3);
    assert_eq!(updated["data"]["quantity_in_stock"], 10);
    assert_eq!(dec(&updated["data"]["revenue"]), Decimal::new(750, 2));
    assert_eq!(updated["data"]["revenue"], "7.500");
    assert_eq!(updated["data"]["unit_price"], "2.50");

    // Reads are idempotent.
    let first: Value = client
        .get(srv.url(&format!("/product/{product_id}")))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let second: Value = client
        .get(srv.url(&format!("/product/{product_id}")))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(first, second);
    assert_eq!(first["data"], updated["data"]);

    let list: Value = client
        .get(srv.url("/products"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(list["data"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn supplier_update_replaces_fields_and_delete_confirms() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    create_acme(&client, &srv).await;

    let res = client
        .put(srv.url("/supplier/1"))
        .json(&json!({
            "name": "Acme2",
            "company": "Acme Group",
            "email": "ops@acme.test",
            "phone": "555-0199",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["data"]["name"], "Acme2");
    assert_eq!(body["data"]["email"], "ops@acme.test");

    let res = client.delete(srv.url("/supplier/1")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["data"], "Supplier with id 1 has been deleted.");

    let res = client.get(srv.url("/supplier/1")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn deleting_a_supplier_keeps_its_products() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    create_acme(&client, &srv).await;
    let product = create_widget(&client, &srv, 1).await;
    let product_id = product["data"]["id"].as_i64().unwrap();

    let res = client.delete(srv.url("/supplier/1")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = client
        .get(srv.url(&format!("/product/{product_id}")))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["data"]["supplied_by"], 1);
}

#[tokio::test]
async fn missing_ids_are_not_found() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client.get(srv.url("/supplier/42")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "not_found");

    let res = client.delete(srv.url("/product/42")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let res = client
        .put(srv.url("/product/42"))
        .json(&json!({ "quantity_in_stock": 1 }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let res = client
        .post(srv.url("/email/42"))
        .json(&json!({ "subject": "Restock", "message": "Please" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn invalid_input_is_rejected_with_400() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    // Missing field.
    let res = client
        .post(srv.url("/supplier"))
        .json(&json!({ "name": "Acme", "company": "Acme Ltd", "email": "a@acme.test" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "validation_error");

    // Malformed email.
    let res = client
        .post(srv.url("/supplier"))
        .json(&json!({
            "name": "Acme",
            "company": "Acme Ltd",
            "email": "not-an-email",
            "phone": "555-0100",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    // Non-numeric id.
    let res = client.get(srv.url("/supplier/abc")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    // Product for an unknown supplier.
    let res = client
        .post(srv.url("/product/7"))
        .json(&json!({ "name": "Widget", "unit_price": "1.00" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    create_acme(&client, &srv).await;
    let product = create_widget(&client, &srv, 1).await;
    let product_id = product["data"]["id"].as_i64().unwrap();

    // Body supplier disagrees with the path.
    let res = client
        .post(srv.url("/product/1"))
        .json(&json!({ "name": "Gadget", "supplied_by": 2 }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    // Negative price, quantity without price, unknown field.
    for payload in [
        json!({ "unit_price": "-1.00" }),
        json!({ "quantity": 2 }),
        json!({ "quantity_instock": 5 }),
    ] {
        let res = client
            .put(srv.url(&format!("/product/{product_id}")))
            .json(&payload)
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST, "payload {payload}");
    }

    // Rejected updates leave the product untouched.
    let body: Value = client
        .get(srv.url(&format!("/product/{product_id}")))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["data"], product["data"]);
}

#[tokio::test]
async fn upload_creates_a_post_that_shows_in_the_feed() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client
        .post(srv.url("/upload"))
        .multipart(image_form(Some("my cat")))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["data"]["caption"], "my cat");
    assert_eq!(body["data"]["file_type"], "image");
    assert_eq!(body["data"]["url"], "https://media.example/posts/cat.png");

    // The host saw a real staged file, which is gone now.
    let seen = srv.media.seen.lock().unwrap().clone();
    assert_eq!(seen.len(), 1);
    assert!(seen[0].1);
    assert!(!seen[0].0.exists());
    assert_eq!(std::fs::read_dir(srv.staging_dir()).unwrap().count(), 0);

    let res = client
        .post(srv.url("/upload"))
        .multipart(image_form(None))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let feed: Value = client
        .get(srv.url("/feed"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let posts = feed["posts"].as_array().unwrap();
    assert_eq!(posts.len(), 2);
    // Newest first.
    assert_eq!(posts[0]["caption"], Value::Null);
    assert_eq!(posts[1]["caption"], "my cat");
}

#[tokio::test]
async fn failed_media_upload_creates_no_post_and_cleans_up() {
    let srv = TestServer::spawn_with(
        FakeMediaHost {
            fail: true,
            ..FakeMediaHost::default()
        },
        FakeMailer::default(),
    )
    .await;
    let client = reqwest::Client::new();

    let res = client
        .post(srv.url("/upload"))
        .multipart(image_form(Some("lost")))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_GATEWAY);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "upstream_error");

    assert_eq!(srv.media.seen.lock().unwrap().len(), 1);
    assert_eq!(std::fs::read_dir(srv.staging_dir()).unwrap().count(), 0);

    let feed: Value = client
        .get(srv.url("/feed"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(feed["posts"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn slow_media_host_times_out_without_a_post() {
    let srv = TestServer::spawn_with_timeout(
        FakeMediaHost {
            delay: Some(Duration::from_secs(3)),
            ..FakeMediaHost::default()
        },
        FakeMailer::default(),
        Duration::from_millis(200),
    )
    .await;
    let client = reqwest::Client::new();

    let res = client
        .post(srv.url("/upload"))
        .multipart(image_form(Some("too slow")))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_GATEWAY);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "upstream_error");
    assert!(body["detail"].as_str().unwrap().contains("200ms"), "{body}");

    assert_eq!(std::fs::read_dir(srv.staging_dir()).unwrap().count(), 0);
    let feed: Value = client
        .get(srv.url("/feed"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(feed["posts"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn upload_rejects_missing_or_unsupported_files() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client
        .post(srv.url("/upload"))
        .multipart(Form::new().text("caption", "no file"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let part = Part::bytes(b"%PDF-1.7".to_vec())
        .file_name("doc.pdf")
        .mime_str("application/pdf")
        .unwrap();
    let res = client
        .post(srv.url("/upload"))
        .multipart(Form::new().part("file", part))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    assert!(srv.media.seen.lock().unwrap().is_empty());
}

#[tokio::test]
async fn email_goes_to_the_products_supplier() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    create_acme(&client, &srv).await;
    let product = create_widget(&client, &srv, 1).await;
    let product_id = product["data"]["id"].as_i64().unwrap();

    let res = client
        .post(srv.url(&format!("/email/{product_id}")))
        .json(&json!({ "subject": "Restock", "message": "Need 20 more widgets." }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["data"]["recipient"], "a@acme.test");

    let sent = srv.mailer.sent.lock().unwrap();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to, vec!["a@acme.test".to_string()]);
    assert_eq!(sent[0].subject, "Restock");
    assert_eq!(sent[0].body, "Need 20 more widgets.");
}

#[tokio::test]
async fn mail_failure_is_reported_as_bad_gateway() {
    let srv = TestServer::spawn_with(
        FakeMediaHost::default(),
        FakeMailer {
            fail: true,
            ..FakeMailer::default()
        },
    )
    .await;
    let client = reqwest::Client::new();
    create_acme(&client, &srv).await;
    let product = create_widget(&client, &srv, 1).await;
    let product_id = product["data"]["id"].as_i64().unwrap();

    let res = client
        .post(srv.url(&format!("/email/{product_id}")))
        .json(&json!({ "subject": "Restock", "message": "Please" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_GATEWAY);

    let res = client
        .post(srv.url(&format!("/email/{product_id}")))
        .json(&json!({ "subject": " ", "message": "Please" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}
