use async_trait::async_trait;
use hemo_application::{SessionLifecycle, SessionStore};
use hemo_core::config::AnalysisMode;
use hemo_core::interpretation::{ParasitemiaLevel, SeverityTier, ThrombocytopeniaLevel};
use hemo_core::session::SessionState;
use hemo_core::{CellClass, ClassCounts, Detection, Detector, EngineConfig, HemoError};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

// Mock detector returning the counts registered for each image payload
struct MockDetector {
    results: Mutex<HashMap<Vec<u8>, ClassCounts>>,
    calls: AtomicUsize,
}

impl MockDetector {
    fn new() -> Self {
        Self {
            results: Mutex::new(HashMap::new()),
            calls: AtomicUsize::new(0),
        }
    }

    fn with_image(self, image: &[u8], counts: ClassCounts) -> Self {
        self.results.lock().unwrap().insert(image.to_vec(), counts);
        self
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Detector for MockDetector {
    async fn detect(&self, image: &[u8], _mode: &AnalysisMode) -> anyhow::Result<Detection> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let counts = self
            .results
            .lock()
            .unwrap()
            .get(image)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("cannot decode image"))?;
        Ok(Detection {
            counts,
            annotated_image: [b"annotated:".as_slice(), image].concat(),
        })
    }
}

// Mock detector that never answers in time
struct SlowDetector;

#[async_trait]
impl Detector for SlowDetector {
    async fn detect(&self, _image: &[u8], _mode: &AnalysisMode) -> anyhow::Result<Detection> {
        tokio::time::sleep(Duration::from_secs(30)).await;
        Ok(Detection {
            counts: ClassCounts::new(),
            annotated_image: Vec::new(),
        })
    }
}

fn lifecycle(detector: Arc<dyn Detector>) -> SessionLifecycle {
    let config = Arc::new(EngineConfig::default());
    let store = Arc::new(SessionStore::new(config.clone()));
    SessionLifecycle::new(config, store, detector)
}

fn platelet_field() -> ClassCounts {
    ClassCounts::new()
        .with(CellClass::WhiteBloodCell, 2)
        .with(CellClass::RedBloodCell, 150)
        .with(CellClass::Platelet, 8)
}

#[tokio::test]
async fn test_platelet_session_end_to_end() {
    let detector = Arc::new(MockDetector::new().with_image(b"field", platelet_field()));
    let lifecycle = lifecycle(detector.clone());

    let id = lifecycle
        .start_session("platelet", Some("100x-oil"))
        .await
        .unwrap();
    for expected_index in 1..=10 {
        let outcome = lifecycle
            .upload_image(&id, b"field", Some("platelet"))
            .await
            .unwrap();
        assert_eq!(outcome.image_index, expected_index);
        assert_eq!(outcome.counts.get(CellClass::Platelet), 8);
        assert_eq!(outcome.annotated_image, b"annotated:field".to_vec());
    }

    let report = lifecycle.finalize_session(&id).await.unwrap();
    assert_eq!(report.aggregation.images_count, 10);
    assert_eq!(report.aggregation.totals_by_class.get(CellClass::Platelet), 80);
    assert_eq!(report.aggregation.avg_for(CellClass::Platelet), 8.0);
    assert_eq!(
        report
            .aggregation
            .extrapolated_concentration
            .as_ref()
            .unwrap()
            .per_microliter,
        8.0 * 15_000.0
    );
    assert_eq!(
        report.interpretation.severity_tier,
        SeverityTier::Thrombocytopenia(ThrombocytopeniaLevel::Mild)
    );
    assert_eq!(detector.calls(), 10);
}

#[tokio::test]
async fn test_parasite_single_all_negative() {
    let zero = ClassCounts::new().with(CellClass::Trophozoite, 0);
    let detector = Arc::new(MockDetector::new().with_image(b"field", zero));
    let lifecycle = lifecycle(detector);

    let id = lifecycle.start_session("parasite-single", None).await.unwrap();
    for _ in 0..3 {
        lifecycle.upload_image(&id, b"field", None).await.unwrap();
    }

    let report = lifecycle.finalize_session(&id).await.unwrap();
    assert_eq!(
        report.interpretation.severity_tier,
        SeverityTier::Parasitemia(ParasitemiaLevel::Negative)
    );
    assert_eq!(report.interpretation.severity_rank, 0);
}

#[tokio::test]
async fn test_finalize_unknown_session() {
    let lifecycle = lifecycle(Arc::new(MockDetector::new()));
    let err = lifecycle.finalize_session("never-created").await.unwrap_err();
    assert_eq!(err, HemoError::session_not_found("never-created"));
}

#[tokio::test]
async fn test_upload_after_finalize_is_rejected() {
    let detector = Arc::new(MockDetector::new().with_image(b"field", platelet_field()));
    let lifecycle = lifecycle(detector.clone());

    let id = lifecycle.start_session("platelet", None).await.unwrap();
    lifecycle.upload_image(&id, b"field", None).await.unwrap();
    lifecycle.finalize_session(&id).await.unwrap();

    let err = lifecycle.upload_image(&id, b"field", None).await.unwrap_err();
    assert_eq!(err, HemoError::session_finalized(&id));
    assert_eq!(lifecycle.session_status(&id).await.unwrap().images_count, 1);
    // rejected before the detector was invoked
    assert_eq!(detector.calls(), 1);
}

#[tokio::test]
async fn test_refinalize_returns_same_report() {
    let detector = Arc::new(MockDetector::new().with_image(b"field", platelet_field()));
    let lifecycle = lifecycle(detector);

    let id = lifecycle.start_session("platelet", None).await.unwrap();
    lifecycle.upload_image(&id, b"field", None).await.unwrap();

    let first = lifecycle.finalize_session(&id).await.unwrap();
    let second = lifecycle.finalize_session(&id).await.unwrap();
    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );
    assert_eq!(
        lifecycle.session_status(&id).await.unwrap().state,
        SessionState::Finalized
    );
}

#[tokio::test]
async fn test_finalize_empty_session_keeps_it_open() {
    let detector = Arc::new(MockDetector::new().with_image(b"field", platelet_field()));
    let lifecycle = lifecycle(detector);

    let id = lifecycle.start_session("platelet", None).await.unwrap();
    let err = lifecycle.finalize_session(&id).await.unwrap_err();
    assert_eq!(err, HemoError::empty_aggregation(&id));

    // still accepting uploads
    lifecycle.upload_image(&id, b"field", None).await.unwrap();
    assert!(lifecycle.finalize_session(&id).await.is_ok());
}

#[tokio::test]
async fn test_failed_detection_leaves_session_unchanged() {
    let detector = Arc::new(MockDetector::new().with_image(b"good", platelet_field()));
    let lifecycle = lifecycle(detector);

    let id = lifecycle.start_session("platelet", None).await.unwrap();
    lifecycle.upload_image(&id, b"good", None).await.unwrap();

    let err = lifecycle.upload_image(&id, b"corrupt", None).await.unwrap_err();
    assert!(matches!(err, HemoError::DetectionFailed { .. }));
    assert!(err.is_upstream());
    assert_eq!(lifecycle.session_status(&id).await.unwrap().images_count, 1);

    // the batch continues after a skipped image
    let next = lifecycle.upload_image(&id, b"good", None).await.unwrap();
    assert_eq!(next.image_index, 2);
}

#[tokio::test]
async fn test_detection_timeout_leaves_session_unchanged() {
    let lifecycle = lifecycle(Arc::new(SlowDetector)).with_detection_timeout(Duration::from_millis(50));

    let id = lifecycle.start_session("platelet", None).await.unwrap();
    let err = lifecycle.upload_image(&id, b"field", None).await.unwrap_err();
    assert_eq!(
        err,
        HemoError::DetectionTimeout {
            session_id: id.clone(),
            timeout_ms: 50
        }
    );
    assert_eq!(lifecycle.session_status(&id).await.unwrap().images_count, 0);
}

#[tokio::test]
async fn test_foreign_class_from_detector_is_a_detection_failure() {
    let detector = Arc::new(
        MockDetector::new().with_image(b"field", ClassCounts::new().with(CellClass::Ring, 3)),
    );
    let lifecycle = lifecycle(detector);

    let id = lifecycle.start_session("platelet", None).await.unwrap();
    let err = lifecycle.upload_image(&id, b"field", None).await.unwrap_err();
    assert!(matches!(err, HemoError::DetectionFailed { .. }));
    assert_eq!(lifecycle.session_status(&id).await.unwrap().images_count, 0);
}

#[tokio::test]
async fn test_overflowing_detection_is_a_detection_failure() {
    let detector = Arc::new(
        MockDetector::new().with_image(
            b"field",
            ClassCounts::new()
                .with(CellClass::WhiteBloodCell, u64::MAX)
                .with(CellClass::RedBloodCell, 1),
        ),
    );
    let lifecycle = lifecycle(detector);

    let id = lifecycle.start_session("platelet", None).await.unwrap();
    let err = lifecycle.upload_image(&id, b"field", None).await.unwrap_err();
    assert!(matches!(err, HemoError::DetectionFailed { .. }));
    assert_eq!(lifecycle.session_status(&id).await.unwrap().images_count, 0);
}

#[tokio::test]
async fn test_session_totals_overflowing_fail_finalize() {
    let detector = Arc::new(MockDetector::new().with_image(
        b"field",
        ClassCounts::new().with(CellClass::Platelet, u64::MAX / 2 + 1),
    ));
    let lifecycle = lifecycle(detector);

    let id = lifecycle.start_session("platelet", None).await.unwrap();
    lifecycle.upload_image(&id, b"field", None).await.unwrap();
    lifecycle.upload_image(&id, b"field", None).await.unwrap();

    let err = lifecycle.finalize_session(&id).await.unwrap_err();
    assert!(matches!(err, HemoError::CountOverflow { .. }));
}

#[tokio::test]
async fn test_mode_mismatch_is_rejected_before_detection() {
    let detector = Arc::new(MockDetector::new().with_image(b"field", platelet_field()));
    let lifecycle = lifecycle(detector.clone());

    let id = lifecycle.start_session("platelet", None).await.unwrap();
    let err = lifecycle
        .upload_image(&id, b"field", Some("parasite-multi"))
        .await
        .unwrap_err();
    assert!(matches!(err, HemoError::ModeMismatch { .. }));
    assert_eq!(detector.calls(), 0);
}

#[tokio::test]
async fn test_start_rejects_invalid_mode() {
    let lifecycle = lifecycle(Arc::new(MockDetector::new()));
    let err = lifecycle.start_session("malaria", None).await.unwrap_err();
    assert!(matches!(err, HemoError::InvalidMode { .. }));
    assert!(lifecycle.store().is_empty().await);
}

#[tokio::test]
async fn test_catalog_lists_configured_modes() {
    let lifecycle = lifecycle(Arc::new(MockDetector::new()));
    let ids: Vec<&str> = lifecycle
        .available_modes()
        .iter()
        .map(|mode| mode.id.as_str())
        .collect();
    assert_eq!(
        ids,
        ["parasite-single", "parasite-multi", "parasite-advanced", "platelet"]
    );
    assert!(
        lifecycle
            .magnifications()
            .iter()
            .any(|m| m.id == "100x-oil" && m.conversion_factor == 15_000.0)
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_uploads_get_dense_indices() {
    let detector = Arc::new(MockDetector::new().with_image(b"field", platelet_field()));
    let lifecycle = Arc::new(lifecycle(detector));
    let id = lifecycle.start_session("platelet", None).await.unwrap();

    let mut handles = Vec::new();
    for _ in 0..32 {
        let lifecycle = lifecycle.clone();
        let id = id.clone();
        handles.push(tokio::spawn(async move {
            lifecycle
                .upload_image(&id, b"field", None)
                .await
                .unwrap()
                .image_index
        }));
    }

    let mut indices = Vec::new();
    for handle in handles {
        indices.push(handle.await.unwrap());
    }
    indices.sort();
    assert_eq!(indices, (1..=32).collect::<Vec<_>>());

    let report = lifecycle.finalize_session(&id).await.unwrap();
    assert_eq!(report.aggregation.totals_by_class.get(CellClass::Platelet), 8 * 32);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_slow_detection_does_not_block_other_sessions() {
    struct GatedDetector;

    #[async_trait]
    impl Detector for GatedDetector {
        async fn detect(&self, image: &[u8], _mode: &AnalysisMode) -> anyhow::Result<Detection> {
            if image == b"slow" {
                tokio::time::sleep(Duration::from_secs(5)).await;
            }
            Ok(Detection {
                counts: ClassCounts::new().with(CellClass::Platelet, 1),
                annotated_image: Vec::new(),
            })
        }
    }

    let lifecycle = Arc::new(lifecycle(Arc::new(GatedDetector)));
    let slow_id = lifecycle.start_session("platelet", None).await.unwrap();
    let fast_id = lifecycle.start_session("platelet", None).await.unwrap();

    let slow = {
        let lifecycle = lifecycle.clone();
        tokio::spawn(async move { lifecycle.upload_image(&slow_id, b"slow", None).await })
    };

    let fast = tokio::time::timeout(
        Duration::from_secs(1),
        lifecycle.upload_image(&fast_id, b"fast", None),
    )
    .await
    .expect("upload to another session was blocked")
    .unwrap();
    assert_eq!(fast.image_index, 1);

    slow.abort();
}
