use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use super::*;

struct Constant(f32);

impl InferenceBackend for Constant {
    fn infer(&mut self, input: Array4<f32>) -> CutframeResult<MaskTensor> {
        let (h, w) = (input.shape()[2], input.shape()[3]);
        MaskTensor::new(vec![self.0; w * h], w, h)
    }
}

/// Fails the first `failures` loads, then succeeds.
struct Flaky {
    loads: Arc<AtomicUsize>,
    failures: usize,
    delay: Duration,
}

impl BackendLoader for Flaky {
    fn load(&self) -> CutframeResult<Box<dyn InferenceBackend>> {
        std::thread::sleep(self.delay);
        let n = self.loads.fetch_add(1, Ordering::SeqCst);
        if n < self.failures {
            return Err(CutframeError::inference_init("runtime unavailable"));
        }
        Ok(Box::new(Constant(0.5)))
    }
}

fn flaky(failures: usize, delay: Duration) -> (SharedEngine, Arc<AtomicUsize>) {
    let loads = Arc::new(AtomicUsize::new(0));
    let engine = SharedEngine::new(Flaky {
        loads: Arc::clone(&loads),
        failures,
        delay,
    });
    (engine, loads)
}

#[test]
fn mask_tensor_checks_length() {
    assert!(MaskTensor::new(vec![0.0; 6], 3, 2).is_ok());
    assert!(matches!(
        MaskTensor::new(vec![0.0; 5], 3, 2),
        Err(CutframeError::InferenceRun(_))
    ));
    assert!(MaskTensor::new(Vec::new(), 0, 0).is_err());
}

#[test]
fn ensure_ready_loads_once_and_reuses() {
    let (engine, loads) = flaky(0, Duration::ZERO);
    assert!(!engine.is_ready());
    let a = engine.ensure_ready().unwrap();
    let _b = engine.ensure_ready().unwrap();
    assert_eq!(loads.load(Ordering::SeqCst), 1);
    assert!(engine.is_ready());

    let mask = a.infer(Array4::zeros((1, 3, 2, 4))).unwrap();
    assert_eq!((mask.width, mask.height), (4, 2));
    assert!(mask.values.iter().all(|&v| v == 0.5));
}

#[test]
fn concurrent_first_calls_share_one_load() {
    let (engine, loads) = flaky(0, Duration::from_millis(30));
    let engine = Arc::new(engine);
    let threads: Vec<_> = (0..8)
        .map(|_| {
            let engine = Arc::clone(&engine);
            std::thread::spawn(move || engine.ensure_ready().map(|_| ()))
        })
        .collect();
    for t in threads {
        t.join().unwrap().unwrap();
    }
    assert_eq!(loads.load(Ordering::SeqCst), 1);
}

#[test]
fn failed_init_is_not_cached_and_retries() {
    let (engine, loads) = flaky(1, Duration::ZERO);
    let err = engine.ensure_ready().unwrap_err();
    assert!(err.is_retryable());
    assert!(!engine.is_ready());

    engine.ensure_ready().unwrap();
    assert_eq!(loads.load(Ordering::SeqCst), 2);
    assert!(engine.is_ready());
}

#[test]
fn invalidate_forces_reload() {
    let (engine, loads) = flaky(0, Duration::ZERO);
    engine.ensure_ready().unwrap();
    engine.invalidate();
    assert!(!engine.is_ready());
    engine.ensure_ready().unwrap();
    assert_eq!(loads.load(Ordering::SeqCst), 2);
}

#[test]
fn ort_loader_reports_missing_model_as_init_error() {
    let loader = OrtLoader::new("/definitely/not/a/model.onnx");
    assert!(matches!(loader.load(), Err(CutframeError::InferenceInit(_))));
}
