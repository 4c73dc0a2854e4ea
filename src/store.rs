//! Local state: the latest canvas snapshots and the open workbenches
use crate::canvas::{Canvas, CanvasId, CanvasIdRef};
use crate::workbench::WorkbenchState;
use anyhow::Result;
use parking_lot::{Mutex, RwLock};
use std::collections::BTreeMap;
use std::sync::Arc;

pub trait StateStore {
    fn load_canvas(&self, canvas_id: CanvasIdRef) -> Result<Option<Canvas>>;
    /// Returns `true` when the stored snapshot changed
    fn store_canvas(&self, canvas: Canvas) -> Result<bool>;
    fn list_canvases(&self) -> Result<Vec<Canvas>>;

    fn load_workbench(&self, canvas_id: CanvasIdRef) -> Result<Option<WorkbenchState>>;
    /// Runs `f` on the workbench of `canvas_id`, opening one if needed
    fn update_workbench(
        &self,
        canvas_id: CanvasIdRef,
        f: &mut dyn FnMut(&mut WorkbenchState),
    ) -> Result<()>;
    /// Like `update_workbench`, but never opens one; returns whether it was open
    fn update_open_workbench(
        &self,
        canvas_id: CanvasIdRef,
        f: &mut dyn FnMut(&mut WorkbenchState),
    ) -> Result<bool>;
    fn close_workbench(&self, canvas_id: CanvasIdRef) -> Result<bool>;
}

pub type SharedStateStore = Arc<dyn StateStore + Send + Sync + 'static>;

#[derive(Default)]
pub struct InMemoryStateStore {
    canvases: RwLock<BTreeMap<CanvasId, Canvas>>,
    workbenches: Mutex<BTreeMap<CanvasId, WorkbenchState>>,
}

impl InMemoryStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn new_shared() -> SharedStateStore {
        Arc::new(Self::new())
    }
}

impl StateStore for InMemoryStateStore {
    fn load_canvas(&self, canvas_id: CanvasIdRef) -> Result<Option<Canvas>> {
        Ok(self.canvases.read().get(canvas_id).cloned())
    }

    fn store_canvas(&self, canvas: Canvas) -> Result<bool> {
        let mut canvases = self.canvases.write();
        if canvases.get(&canvas.id) == Some(&canvas) {
            return Ok(false);
        }
        canvases.insert(canvas.id.clone(), canvas);
        Ok(true)
    }

    fn list_canvases(&self) -> Result<Vec<Canvas>> {
        Ok(self.canvases.read().values().cloned().collect())
    }

    fn load_workbench(&self, canvas_id: CanvasIdRef) -> Result<Option<WorkbenchState>> {
        Ok(self.workbenches.lock().get(canvas_id).cloned())
    }

    fn update_workbench(
        &self,
        canvas_id: CanvasIdRef,
        f: &mut dyn FnMut(&mut WorkbenchState),
    ) -> Result<()> {
        let mut workbenches = self.workbenches.lock();
        f(workbenches.entry(canvas_id.to_owned()).or_default());
        Ok(())
    }

    fn update_open_workbench(
        &self,
        canvas_id: CanvasIdRef,
        f: &mut dyn FnMut(&mut WorkbenchState),
    ) -> Result<bool> {
        Ok(match self.workbenches.lock().get_mut(canvas_id) {
            Some(workbench) => {
                f(workbench);
                true
            }
            None => false,
        })
    }

    fn close_workbench(&self, canvas_id: CanvasIdRef) -> Result<bool> {
        Ok(self.workbenches.lock().remove(canvas_id).is_some())
    }
}
