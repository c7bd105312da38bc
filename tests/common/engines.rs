use flyer_gym::physics::{
    EngineError, EngineFactory, FlightDynamics, LinearEngine, ModelReference, PropertySlot,
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Linear engine that fails after a fixed number of integration steps.
///
/// The count restarts on every initial-condition pass, so trim is unaffected
/// and the failure lands inside the episode. The initial-condition pass itself
/// fails while `fail_ic` is raised.
pub struct DivergingEngine {
    inner: LinearEngine,
    fail_after: usize,
    runs: usize,
    fail_ic: Arc<AtomicBool>,
}

impl DivergingEngine {
    pub fn new(fail_after: usize) -> Self {
        Self {
            inner: LinearEngine::new(),
            fail_after,
            runs: 0,
            fail_ic: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn with_ic_switch(mut self, fail_ic: Arc<AtomicBool>) -> Self {
        self.fail_ic = fail_ic;
        self
    }
}

impl FlightDynamics for DivergingEngine {
    fn name(&self) -> &str {
        "diverging"
    }

    fn load_model(&mut self, model: &ModelReference) -> Result<(), EngineError> {
        self.inner.load_model(model)
    }

    fn bind(&self, engine_id: &str) -> Option<PropertySlot> {
        self.inner.bind(engine_id)
    }

    fn get(&self, slot: PropertySlot) -> f64 {
        self.inner.get(slot)
    }

    fn set(&mut self, slot: PropertySlot, value: f64) {
        self.inner.set(slot, value)
    }

    fn set_dt(&mut self, dt: f64) {
        self.inner.set_dt(dt)
    }

    fn dt(&self) -> f64 {
        self.inner.dt()
    }

    fn run_ic(&mut self) -> Result<(), EngineError> {
        if self.fail_ic.load(Ordering::SeqCst) {
            return Err(EngineError::Diverged {
                sim_time: self.inner.sim_time(),
                detail: "scripted initial-condition failure".to_string(),
            });
        }
        self.runs = 0;
        self.inner.run_ic()
    }

    fn run(&mut self) -> Result<(), EngineError> {
        if self.runs >= self.fail_after {
            return Err(EngineError::Diverged {
                sim_time: self.inner.sim_time(),
                detail: "scripted failure".to_string(),
            });
        }
        self.runs += 1;
        self.inner.run()
    }

    fn sim_time(&self) -> f64 {
        self.inner.sim_time()
    }

    fn unload(&mut self) {
        self.inner.unload()
    }
}

pub fn diverging_engine_factory(fail_after: usize) -> EngineFactory {
    Box::new(move || Box::new(DivergingEngine::new(fail_after)) as Box<dyn FlightDynamics>)
}

/// Engines that never diverge in flight but whose initial-condition pass
/// fails while the returned switch is raised.
pub fn switchable_ic_engine_factory() -> (EngineFactory, Arc<AtomicBool>) {
    let switch = Arc::new(AtomicBool::new(false));
    let shared = Arc::clone(&switch);
    let factory: EngineFactory = Box::new(move || {
        Box::new(DivergingEngine::new(usize::MAX).with_ic_switch(Arc::clone(&shared)))
            as Box<dyn FlightDynamics>
    });
    (factory, switch)
}
