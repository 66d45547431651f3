//! A live scene: configuration, current field snapshot and per-tick render.
//!
//! The only mutable shared state is the published snapshot (behind an
//! `RwLock`) and the attractor cache. A snapshot carries the configuration
//! its field was built from, so the two are always swapped together.
//! Rendering clones the snapshot's `Arc` and never blocks a rebuild for
//! longer than the pointer swap.
//!
//! Rebuilds are either synchronous ([`Scene::update_config`]) or run on a
//! worker thread ([`Scene::spawn_rebuild`]). Every request takes a ticket;
//! a finished rebuild is published only if no newer one has been published
//! already, so a slow worker never overwrites a fresher field.

use crate::attractor::AttractorCache;
use crate::camera::{CameraState, Viewport};
use crate::compositor::{FrameCompositor, FrameStats};
use crate::config::ParticleSystemConfig;
use crate::error::SceneError;
use crate::field::ParticleField;
use crate::gateway;
use crate::phase::PhaseController;
use crate::sink::DrawSink;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, RwLock};
use std::thread::{self, JoinHandle};
use tracing::{debug, info, warn};

/// Everything one frame needs, published atomically.
#[derive(Debug)]
struct Snapshot {
    ticket: u64,
    config: ParticleSystemConfig,
    field: Arc<ParticleField>,
    camera: CameraState,
    phases: PhaseController,
}

#[derive(Debug)]
struct Shared {
    snapshot: RwLock<Arc<Snapshot>>,
    cache: Mutex<AttractorCache>,
    next_ticket: AtomicU64,
}

impl Shared {
    fn snapshot(&self) -> Result<Arc<Snapshot>, SceneError> {
        self.snapshot
            .read()
            .map(|s| Arc::clone(&s))
            .map_err(|_| SceneError::Poisoned("snapshot"))
    }

    /// Build (or reuse) the field for `config` and publish it unless a
    /// newer ticket got there first. Returns whether it was published.
    fn rebuild(&self, ticket: u64, config: ParticleSystemConfig) -> Result<bool, SceneError> {
        config.validate()?;

        // The reused field and the config it is compared with come from the
        // same snapshot
        let previous = self.snapshot()?;
        let field = if previous.ticket > 0 && same_geometry(&previous.config, &config) {
            debug!(ticket, "geometry unchanged, reusing field");
            Arc::clone(&previous.field)
        } else {
            let mut cache = self.cache.lock().map_err(|_| SceneError::Poisoned("cache"))?;
            let field = ParticleField::build(&config, &mut cache);
            let live = gateway::attractor_key(&config.gateway);
            cache.retain(|key| Some(*key) == live);
            Arc::new(field)
        };

        let mut slot = self
            .snapshot
            .write()
            .map_err(|_| SceneError::Poisoned("snapshot"))?;
        if slot.ticket > ticket {
            warn!(ticket, published = slot.ticket, "discarding stale rebuild");
            return Ok(false);
        }
        *slot = Arc::new(Snapshot {
            ticket,
            camera: config.camera.to_state(),
            phases: PhaseController::new(config.animation.clone(), config.manifold.opacity),
            config,
            field,
        });
        Ok(true)
    }
}

/// True when two configs generate the same particles.
fn same_geometry(a: &ParticleSystemConfig, b: &ParticleSystemConfig) -> bool {
    a.seed == b.seed
        && a.manifold == b.manifold
        && a.landmarks == b.landmarks
        && a.gateway == b.gateway
        && a.sigil == b.sigil
        && a.decor == b.decor
}

/// Handle to a background rebuild.
#[derive(Debug)]
pub struct RebuildHandle {
    ticket: u64,
    handle: JoinHandle<Result<bool, SceneError>>,
}

impl RebuildHandle {
    pub fn ticket(&self) -> u64 {
        self.ticket
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Wait for the worker. `Ok(false)` means a newer rebuild won.
    pub fn join(self) -> Result<bool, SceneError> {
        self.handle.join().map_err(|_| SceneError::WorkerPanicked)?
    }
}

/// A configured scene that renders one frame per [`Scene::tick`].
#[derive(Debug)]
pub struct Scene {
    shared: Arc<Shared>,
    compositor: FrameCompositor,
    rendered_ticket: u64,
}

impl Scene {
    /// Validate `config`, build its field and get ready to render.
    pub fn new(config: ParticleSystemConfig, viewport: Viewport) -> Result<Self, SceneError> {
        config.validate()?;
        let phases = PhaseController::new(config.animation.clone(), config.manifold.opacity);
        let placeholder = Snapshot {
            ticket: 0,
            config: config.clone(),
            field: Arc::new(ParticleField::default()),
            camera: config.camera.to_state(),
            phases: phases.clone(),
        };
        let shared = Arc::new(Shared {
            snapshot: RwLock::new(Arc::new(placeholder)),
            cache: Mutex::new(AttractorCache::new()),
            next_ticket: AtomicU64::new(1),
        });
        let scene = Self {
            shared,
            compositor: FrameCompositor::new(viewport, phases),
            rendered_ticket: 0,
        };
        let ticket = scene.take_ticket();
        scene.shared.rebuild(ticket, config)?;
        Ok(scene)
    }

    /// Pixel grid for snapping draw commands.
    pub fn with_grid(mut self, grid: f32) -> Self {
        self.compositor = self.compositor.with_grid(grid);
        self
    }

    fn take_ticket(&self) -> u64 {
        self.shared.next_ticket.fetch_add(1, Ordering::Relaxed)
    }

    /// Replace the configuration and rebuild on this thread.
    ///
    /// On error the previous field stays live. Camera and animation edits
    /// reuse the existing field.
    pub fn update_config(&mut self, config: ParticleSystemConfig) -> Result<(), SceneError> {
        let ticket = self.take_ticket();
        self.shared.rebuild(ticket, config)?;
        Ok(())
    }

    /// Replace the configuration and rebuild on a worker thread.
    ///
    /// The current field keeps rendering until the new one is published.
    pub fn spawn_rebuild(&self, config: ParticleSystemConfig) -> RebuildHandle {
        let ticket = self.take_ticket();
        let shared = Arc::clone(&self.shared);
        let handle = thread::spawn(move || {
            let published = shared.rebuild(ticket, config);
            match &published {
                Ok(true) => info!(ticket, "background rebuild published"),
                Ok(false) => {}
                Err(err) => warn!(ticket, %err, "background rebuild failed"),
            }
            published
        });
        RebuildHandle { ticket, handle }
    }

    /// Render one frame.
    pub fn tick(
        &mut self,
        progress: f32,
        time: f32,
        sink: &mut dyn DrawSink,
    ) -> Result<FrameStats, SceneError> {
        let snapshot = self.shared.snapshot()?;
        if snapshot.ticket != self.rendered_ticket {
            self.compositor.set_phases(snapshot.phases.clone());
            self.rendered_ticket = snapshot.ticket;
        }
        Ok(self
            .compositor
            .render_frame(&snapshot.field, &snapshot.camera, progress, time, sink))
    }

    /// The currently published field.
    pub fn field(&self) -> Result<Arc<ParticleField>, SceneError> {
        Ok(Arc::clone(&self.shared.snapshot()?.field))
    }

    /// The camera of the currently published configuration.
    pub fn camera(&self) -> Result<CameraState, SceneError> {
        Ok(self.shared.snapshot()?.camera)
    }

    /// Copy of the last accepted configuration.
    pub fn config(&self) -> Result<ParticleSystemConfig, SceneError> {
        Ok(self.shared.snapshot()?.config.clone())
    }

    /// Ticket of the published snapshot; grows with every publish.
    pub fn generation(&self) -> Result<u64, SceneError> {
        Ok(self.shared.snapshot()?.ticket)
    }

    pub fn viewport(&self) -> Viewport {
        self.compositor.viewport()
    }

    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.compositor.set_viewport(viewport);
    }

    /// Number of attractor clouds currently memoized.
    pub fn cached_attractors(&self) -> Result<usize, SceneError> {
        self.shared
            .cache
            .lock()
            .map(|c| c.len())
            .map_err(|_| SceneError::Poisoned("cache"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attractor::AttractorKind;
    use crate::config::{GatewayShape, ManifoldConfig};
    use crate::error::ConfigError;
    use crate::sink::CountingSink;

    fn small_config() -> ParticleSystemConfig {
        let mut config = ParticleSystemConfig::default();
        config.manifold = ManifoldConfig {
            rows: 20,
            columns: 20,
            ..ManifoldConfig::default()
        };
        config.decor.star_count = 40;
        config
    }

    #[test]
    fn test_tick_renders_published_field() {
        let mut scene = Scene::new(small_config(), Viewport::new(640.0, 360.0)).unwrap();
        assert_eq!(scene.generation().unwrap(), 1);
        let mut sink = CountingSink::default();
        let stats = scene.tick(0.05, 0.0, &mut sink).unwrap();
        assert_eq!(stats.considered, scene.field().unwrap().len());
        assert!(stats.emitted > 0);
        assert_eq!(sink.commands, stats.emitted);
    }

    #[test]
    fn test_invalid_update_keeps_previous_field() {
        let mut scene = Scene::new(small_config(), Viewport::default()).unwrap();
        let before = scene.field().unwrap();
        let mut bad = small_config();
        bad.camera.focal_length = -1.0;
        let err = scene.update_config(bad).unwrap_err();
        assert!(matches!(err, SceneError::Config(ConfigError::Invalid { .. })));
        assert!(Arc::ptr_eq(&before, &scene.field().unwrap()));
        assert_eq!(scene.config().unwrap().camera.focal_length, 600.0);
    }

    #[test]
    fn test_camera_edit_reuses_field() {
        let mut scene = Scene::new(small_config(), Viewport::default()).unwrap();
        let before = scene.field().unwrap();
        let mut config = small_config();
        config.camera.yaw = 10.0;
        config.animation.section_count = 6;
        scene.update_config(config).unwrap();
        assert!(Arc::ptr_eq(&before, &scene.field().unwrap()));
        assert!((scene.camera().unwrap().yaw - 10f32.to_radians()).abs() < 1e-6);
        assert_eq!(scene.generation().unwrap(), 2);
    }

    #[test]
    fn test_geometry_edit_rebuilds() {
        let mut scene = Scene::new(small_config(), Viewport::default()).unwrap();
        let before = scene.field().unwrap();
        let mut config = small_config();
        config.manifold.rows = 5;
        scene.update_config(config).unwrap();
        let after = scene.field().unwrap();
        assert!(!Arc::ptr_eq(&before, &after));
        assert_eq!(after.counts().terrain, 100);
    }

    #[test]
    fn test_background_rebuild_publishes() {
        let mut scene = Scene::new(small_config(), Viewport::default()).unwrap();
        let mut config = small_config();
        config.decor.star_count = 7;
        let handle = scene.spawn_rebuild(config);
        assert!(handle.join().unwrap());
        assert_eq!(scene.field().unwrap().counts().star, 7);
        let mut sink = CountingSink::default();
        scene.tick(0.5, 1.0, &mut sink).unwrap();
    }

    #[test]
    fn test_stale_rebuild_is_discarded() {
        let mut scene = Scene::new(small_config(), Viewport::default()).unwrap();
        let mut slow = small_config();
        slow.decor.star_count = 1;
        // Taken first, finishes last
        let stale_ticket = scene.take_ticket();

        let mut fresh = small_config();
        fresh.decor.star_count = 2;
        scene.update_config(fresh).unwrap();

        assert!(!scene.shared.rebuild(stale_ticket, slow).unwrap());
        assert_eq!(scene.field().unwrap().counts().star, 2);
        assert_eq!(scene.config().unwrap().decor.star_count, 2);
    }

    #[test]
    fn test_concurrent_same_geometry_rebuilds_keep_field_in_sync() {
        let mut scene = Scene::new(small_config(), Viewport::default()).unwrap();
        for round in 0..8 {
            let mut many = small_config();
            many.decor.star_count = 99;
            let handles: Vec<_> = (0..6)
                .map(|i| {
                    let mut config = many.clone();
                    config.camera.yaw = (round * 6 + i) as f32;
                    scene.spawn_rebuild(config)
                })
                .collect();
            let mut camera_only = many.clone();
            camera_only.camera.yaw = -1.0;
            scene.update_config(camera_only).unwrap();
            for handle in handles {
                handle.join().unwrap();
            }

            let config = scene.config().unwrap();
            assert_eq!(scene.field().unwrap().counts().star, config.decor.star_count as usize);

            // Later camera edits reuse whatever field was published
            let mut moved = config.clone();
            moved.camera.pitch += 1.0;
            scene.update_config(moved).unwrap();
            assert_eq!(scene.field().unwrap().counts().star, 99);

            scene.update_config(small_config()).unwrap();
            assert_eq!(scene.field().unwrap().counts().star, 40);
        }
    }

    #[test]
    fn test_rebuild_compares_against_published_config() {
        let mut scene = Scene::new(small_config(), Viewport::default()).unwrap();
        let mut more = small_config();
        more.decor.star_count = 99;
        // Taken before the publish below, so it races against it
        let early = scene.take_ticket();

        let mut turned = more.clone();
        turned.camera.yaw = 5.0;
        scene.update_config(turned).unwrap();
        let published = scene.field().unwrap();

        assert!(!scene.shared.rebuild(early, more.clone()).unwrap());
        assert!(Arc::ptr_eq(&published, &scene.field().unwrap()));

        let late = scene.take_ticket();
        assert!(scene.shared.rebuild(late, more).unwrap());
        assert!(Arc::ptr_eq(&published, &scene.field().unwrap()));
        assert_eq!(scene.field().unwrap().counts().star, 99);
        assert_eq!(scene.config().unwrap().camera.yaw, 0.0);
    }

    #[test]
    fn test_cache_only_keeps_live_gateway() {
        let mut config = small_config();
        config.gateway.shape = GatewayShape::Attractor(AttractorKind::Thomas);
        config.gateway.points = 200;
        let mut scene = Scene::new(config.clone(), Viewport::default()).unwrap();
        assert_eq!(scene.cached_attractors().unwrap(), 1);

        config.gateway.shape = GatewayShape::Attractor(AttractorKind::Lorenz);
        scene.update_config(config.clone()).unwrap();
        assert_eq!(scene.cached_attractors().unwrap(), 1);

        config.gateway.shape = GatewayShape::Hexagon;
        scene.update_config(config).unwrap();
        assert_eq!(scene.cached_attractors().unwrap(), 0);
    }
}
