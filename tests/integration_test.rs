use std::io::Cursor;
use std::path::Path;
use std::sync::Arc;

use breed_batch_classifier::{
    AnalyzeOutcome, App, BatchOrchestrator, ClassifierClient, Config, LifecycleState,
    TimingSettings,
};
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Match, Mock, MockServer, Request, ResponseTemplate};

/// 按上传文件名匹配 multipart 请求（请求体含二进制，不能按 UTF-8 匹配）
struct UploadNamed(&'static str);

impl Match for UploadNamed {
    fn matches(&self, request: &Request) -> bool {
        let needle = format!("filename=\"{}\"", self.0);
        request
            .body
            .windows(needle.len())
            .any(|window| window == needle.as_bytes())
    }
}

fn write_png(dir: &Path, name: &str) {
    let img = image::DynamicImage::ImageRgb8(image::RgbImage::new(32, 24));
    let mut buf = Cursor::new(Vec::new());
    img.write_to(&mut buf, image::ImageFormat::Png).unwrap();
    std::fs::write(dir.join(name), buf.into_inner()).unwrap();
}

fn prediction(breed: &str, confidence: f64) -> serde_json::Value {
    json!({
        "predicted_breed": breed,
        "confidence": confidence,
        "top_5_predictions": [{"breed": breed, "confidence": confidence}]
    })
}

async fn mount_prediction(server: &MockServer, file_name: &'static str, breed: &str, confidence: f64) {
    Mock::given(method("POST"))
        .and(path("/predict"))
        .and(UploadNamed(file_name))
        .respond_with(ResponseTemplate::new(200).set_body_json(prediction(breed, confidence)))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_app_classifies_folder_and_writes_report() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "ok",
            "model_loaded": true,
            "num_classes": 50
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "message": "Cattle Breed Classifier API",
            "total_classes": 2,
            "class_names": ["Gir", "Sahiwal"]
        })))
        .expect(1)
        .mount(&server)
        .await;
    mount_prediction(&server, "a.png", "Gir", 90.0).await;
    mount_prediction(&server, "b.png", "Sahiwal", 80.0).await;
    mount_prediction(&server, "c.png", "Ongole", 70.0).await;

    let dir = tempfile::tempdir().unwrap();
    write_png(dir.path(), "a.png");
    write_png(dir.path(), "b.png");
    write_png(dir.path(), "c.png");
    std::fs::write(dir.path().join("notes.txt"), b"ignored").unwrap();
    let report_path = dir.path().join("report.json");

    let config = Config {
        api_base_url: server.uri(),
        image_folder: dir.path().to_string_lossy().to_string(),
        report_file: report_path.to_string_lossy().to_string(),
        settle_delay_ms: 10,
        stage_tick_ms: 5,
        stage_total_ms: 50,
        ..Config::default()
    };

    let app = App::initialize(config).await.unwrap();
    let stats = app.run().await.unwrap();

    assert_eq!(stats.total, 3);
    assert_eq!(stats.analyzed, 2);
    assert_eq!(stats.failed, 1);
    assert_eq!(stats.unique_labels, 2);
    assert_eq!(stats.average_confidence, 85.0);

    let snapshot = app.orchestrator().snapshot().await;
    assert_eq!(snapshot[0].source_asset.file_name, "a.png");
    assert_eq!(snapshot[0].result().unwrap().label, "Gir");
    assert_eq!(snapshot[1].result().unwrap().label, "Sahiwal");
    // 服务端类别列表中没有 Ongole
    assert_eq!(
        snapshot[2].error_message(),
        Some("响应格式错误: 未知品种: Ongole")
    );
    assert!(snapshot.iter().all(|item| item.preview.is_some()));

    let report: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&report_path).unwrap()).unwrap();
    assert_eq!(report["stats"]["analyzed"], 2);
    assert_eq!(report["items"][1]["label"], "Sahiwal");
}

#[tokio::test]
async fn test_sweep_over_http_continues_on_error_and_retry_recovers() {
    let server = MockServer::start().await;
    mount_prediction(&server, "a.png", "Gir", 90.0).await;
    Mock::given(method("POST"))
        .and(path("/predict"))
        .and(UploadNamed("b.png"))
        .respond_with(
            ResponseTemplate::new(500).set_body_json(json!({"detail": "Model not loaded"})),
        )
        .up_to_n_times(1)
        .mount(&server)
        .await;
    mount_prediction(&server, "b.png", "Sahiwal", 80.0).await;

    let dir = tempfile::tempdir().unwrap();
    write_png(dir.path(), "a.png");
    write_png(dir.path(), "b.png");
    let assets = breed_batch_classifier::ingest::load_image_folder(dir.path().to_str().unwrap())
        .await
        .unwrap();

    let client = Arc::new(ClassifierClient::with_base_url(&server.uri()).unwrap());
    let orchestrator = BatchOrchestrator::new(client, TimingSettings::default());
    let ids = orchestrator.add_items(assets).await;

    let report = orchestrator.analyze_all().await.unwrap();
    assert_eq!(report.selected, 2);
    assert_eq!(report.completed, 1);
    assert_eq!(report.failed, 1);

    let failed = orchestrator.get(ids[1]).await.unwrap();
    assert_eq!(failed.state, LifecycleState::Failed("Model not loaded".to_string()));

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 2);
    assert!(UploadNamed("a.png").matches(&requests[0]));
    assert!(UploadNamed("b.png").matches(&requests[1]));

    let retry = orchestrator.analyze(ids[1]).await.unwrap();
    assert_eq!(
        retry,
        AnalyzeOutcome::Completed {
            label: "Sahiwal".to_string(),
            confidence: 80.0
        }
    );

    let stats = orchestrator.stats().await;
    assert_eq!(stats.analyzed, 2);
    assert_eq!(stats.failed, 0);
    assert_eq!(stats.average_confidence, 85.0);
}
