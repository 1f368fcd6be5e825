//! Meshing pipeline: offloads feature meshing to a pool of worker threads
//! and delivers finished meshes through a channel.

use std::io;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread::JoinHandle;

use crate::geometry::Feature;
use crate::mesh::{Mesh, MeshBuilder, MeshOptions, MeshStats};
use crate::transform::CoordinateTransform;

/// A self-contained meshing job: all features of one tile content.
pub struct MeshingTask<K> {
    /// Caller's key used to match results to requests (e.g. a tile address).
    pub key: K,
    /// Features to fold into one mesh, in order.
    pub features: Vec<Feature>,
}

/// The result of a completed meshing task.
pub struct MeshingResult<K> {
    /// Key of the originating task.
    pub key: K,
    /// The generated mesh.
    pub mesh: Mesh,
    /// Counters of the build.
    pub stats: MeshStats,
}

/// Meshing pipeline backed by a thread pool.
///
/// Each task is meshed by a fresh [`MeshBuilder`] owned by the worker that
/// picked it up. Results are collected with [`drain_results`](Self::drain_results)
/// or [`recv_result`](Self::recv_result).
pub struct MeshingPipeline<K> {
    task_sender: Option<crossbeam_channel::Sender<MeshingTask<K>>>,
    result_receiver: crossbeam_channel::Receiver<MeshingResult<K>>,
    worker_handles: Vec<JoinHandle<()>>,
    /// Maximum number of tasks queued or running at once.
    budget: usize,
    in_flight: Arc<AtomicUsize>,
    /// Tasks submitted whose result has not been handed to the caller yet.
    pending: AtomicUsize,
}

impl<K: Send + 'static> MeshingPipeline<K> {
    /// Spawn `worker_count` meshing threads accepting at most `budget`
    /// in-flight tasks.
    pub fn new(
        worker_count: usize,
        budget: usize,
        options: MeshOptions,
        transform: Option<Arc<dyn CoordinateTransform>>,
    ) -> io::Result<Self> {
        let budget = budget.max(1);
        let (task_tx, task_rx) = crossbeam_channel::bounded::<MeshingTask<K>>(budget);
        let (result_tx, result_rx) = crossbeam_channel::unbounded();
        let in_flight = Arc::new(AtomicUsize::new(0));

        let mut handles = Vec::with_capacity(worker_count);
        for i in 0..worker_count.max(1) {
            let rx = task_rx.clone();
            let tx = result_tx.clone();
            let transform = transform.clone();
            let flight = Arc::clone(&in_flight);

            let handle = std::thread::Builder::new()
                .name(format!("tessella-mesh-{i}"))
                .spawn(move || {
                    while let Ok(task) = rx.recv() {
                        let build = std::panic::catch_unwind(AssertUnwindSafe(|| {
                            mesh_features(options, transform.as_ref(), &task.features)
                        }));
                        // A panicking task still yields a result.
                        let (mesh, stats) = build.unwrap_or_else(|_| {
                            log::error!(
                                "meshing task with {} features panicked, returning an empty mesh",
                                task.features.len()
                            );
                            (Mesh::default(), MeshStats::default())
                        });

                        let _ = tx.send(MeshingResult {
                            key: task.key,
                            mesh,
                            stats,
                        });
                        flight.fetch_sub(1, Ordering::Relaxed);
                    }
                })?;
            handles.push(handle);
        }
        log::debug!("meshing pipeline started with {} workers", handles.len());

        Ok(Self {
            task_sender: Some(task_tx),
            result_receiver: result_rx,
            worker_handles: handles,
            budget,
            in_flight,
            pending: AtomicUsize::new(0),
        })
    }

    /// Submit a task. Hands the task back if the budget is exhausted or the
    /// pipeline has been shut down.
    pub fn submit(&self, task: MeshingTask<K>) -> Result<(), MeshingTask<K>> {
        let Some(sender) = &self.task_sender else {
            return Err(task);
        };
        if self.in_flight.load(Ordering::Relaxed) >= self.budget {
            return Err(task);
        }
        self.in_flight.fetch_add(1, Ordering::Relaxed);
        self.pending.fetch_add(1, Ordering::Relaxed);
        if let Err(err) = sender.send(task) {
            self.in_flight.fetch_sub(1, Ordering::Relaxed);
            self.pending.fetch_sub(1, Ordering::Relaxed);
            return Err(err.into_inner());
        }
        Ok(())
    }

    /// Drain all completed results without blocking.
    pub fn drain_results(&self) -> Vec<MeshingResult<K>> {
        let results: Vec<_> = self.result_receiver.try_iter().collect();
        self.pending.fetch_sub(results.len(), Ordering::Relaxed);
        results
    }

    /// Block until the next result arrives. Returns `None` once every
    /// submitted task has been received.
    pub fn recv_result(&self) -> Option<MeshingResult<K>> {
        if self.pending.load(Ordering::Relaxed) == 0 {
            return None;
        }
        let result = self.result_receiver.recv().ok()?;
        self.pending.fetch_sub(1, Ordering::Relaxed);
        Some(result)
    }

    /// Number of tasks queued or being processed.
    pub fn in_flight_count(&self) -> usize {
        self.in_flight.load(Ordering::Relaxed)
    }

    /// Number of worker threads.
    pub fn worker_count(&self) -> usize {
        self.worker_handles.len()
    }

    /// Shut down all worker threads, letting queued tasks finish.
    pub fn shutdown(&mut self) {
        // Closing the channel makes the workers exit once it is empty.
        self.task_sender.take();
        for handle in self.worker_handles.drain(..) {
            let _ = handle.join();
        }
    }
}

fn mesh_features(
    options: MeshOptions,
    transform: Option<&Arc<dyn CoordinateTransform>>,
    features: &[Feature],
) -> (Mesh, MeshStats) {
    let mut builder = MeshBuilder::new(options);
    if let Some(transform) = transform {
        builder = builder.with_transform(Arc::clone(transform));
    }
    for feature in features {
        builder.add_feature(feature);
    }
    let (mesh, stats) = builder.finish();
    log::trace!(
        "meshed {} features into {} triangles ({} polygons skipped)",
        stats.features,
        stats.triangles,
        stats.polygons_skipped
    );
    (mesh, stats)
}

impl<K> Drop for MeshingPipeline<K> {
    fn drop(&mut self) {
        self.task_sender.take();
        for handle in self.worker_handles.drain(..) {
            let _ = handle.join();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Geometry, Polygon};
    use glam::DVec3;
    use std::time::{Duration, Instant};

    fn square_feature(name: &str, offset: f64) -> Feature {
        Feature::new(
            name,
            Geometry::Polygon(Polygon::new(vec![
                DVec3::new(offset, 0.0, 0.0),
                DVec3::new(offset + 1.0, 0.0, 0.0),
                DVec3::new(offset + 1.0, 1.0, 0.0),
                DVec3::new(offset, 1.0, 0.0),
            ])),
        )
    }

    fn collect(pipeline: &MeshingPipeline<u32>, count: usize) -> Vec<MeshingResult<u32>> {
        let mut received = Vec::new();
        let start = Instant::now();
        while received.len() < count {
            received.extend(pipeline.drain_results());
            assert!(start.elapsed().as_secs() < 10, "Timed out");
            std::thread::sleep(Duration::from_millis(1));
        }
        received
    }

    #[test]
    fn test_task_produces_mesh() {
        let pipeline = MeshingPipeline::new(2, 8, MeshOptions::default(), None).unwrap();
        let task = MeshingTask {
            key: 7,
            features: vec![square_feature("a", 0.0), square_feature("b", 5.0)],
        };
        assert!(pipeline.submit(task).is_ok());

        let results = collect(&pipeline, 1);
        assert_eq!(results[0].key, 7);
        assert_eq!(results[0].mesh.triangle_count(), 4);
        assert_eq!(results[0].mesh.vertex_count(), 8);
        assert_eq!(results[0].stats.features, 2);
    }

    #[test]
    fn test_concurrent_tasks_do_not_interfere() {
        let pipeline = MeshingPipeline::new(4, 16, MeshOptions::default(), None).unwrap();
        for key in 0..8u32 {
            let features = (0..=key)
                .map(|i| square_feature(&format!("f{i}"), f64::from(i) * 2.0))
                .collect();
            assert!(pipeline.submit(MeshingTask { key, features }).is_ok());
        }

        let mut received = collect(&pipeline, 8);
        received.sort_by_key(|r| r.key);
        for (key, result) in received.iter().enumerate() {
            assert_eq!(result.key as usize, key);
            assert_eq!(result.mesh.triangle_count(), (key + 1) * 2);
        }
    }

    #[test]
    fn test_budget_limits_active_tasks() {
        let pipeline = MeshingPipeline::<u32>::new(1, 2, MeshOptions::default(), None).unwrap();
        let mut rejected = 0;
        for key in 0..10 {
            let features = (0..200)
                .map(|i| square_feature("f", f64::from(i) * 2.0))
                .collect();
            if let Err(task) = pipeline.submit(MeshingTask { key, features }) {
                assert_eq!(task.key, key);
                rejected += 1;
            }
        }
        assert!(rejected >= 4, "Budget should limit submissions, got {rejected} rejected");
    }

    #[test]
    fn test_recv_result_blocks_until_done() {
        let pipeline = MeshingPipeline::new(1, 4, MeshOptions::default(), None).unwrap();
        assert!(pipeline.recv_result().is_none());
        assert!(
            pipeline
                .submit(MeshingTask {
                    key: 1,
                    features: vec![square_feature("a", 0.0)],
                })
                .is_ok()
        );
        let result = pipeline.recv_result().unwrap();
        assert_eq!(result.key, 1);
    }

    #[test]
    fn test_submit_after_shutdown_is_rejected() {
        let mut pipeline = MeshingPipeline::<u32>::new(1, 4, MeshOptions::default(), None).unwrap();
        pipeline.shutdown();
        assert_eq!(pipeline.worker_count(), 0);
        assert!(
            pipeline
                .submit(MeshingTask {
                    key: 0,
                    features: Vec::new(),
                })
                .is_err()
        );
    }

    struct Explode;

    impl CoordinateTransform for Explode {
        fn transform(&self, _: &mut [DVec3]) {
            panic!("bad transform");
        }
    }

    #[test]
    fn test_panicking_task_still_delivers_result() {
        let explode: Arc<dyn CoordinateTransform> = Arc::new(Explode);
        let pipeline = MeshingPipeline::new(2, 4, MeshOptions::default(), Some(explode)).unwrap();
        assert!(
            pipeline
                .submit(MeshingTask {
                    key: 3,
                    features: vec![square_feature("a", 0.0)],
                })
                .is_ok()
        );
        let result = pipeline.recv_result().unwrap();
        assert_eq!(result.key, 3);
        assert!(result.mesh.is_empty());
        assert!(pipeline.recv_result().is_none());
    }
}
