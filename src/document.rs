use std::sync::Arc;

use egui::Pos2;
use serde::{Deserialize, Serialize};

use crate::element::{CanvasObject, ObjectId};

/// Shared, immutable handle to an object inside a snapshot
pub type ObjectRef = Arc<CanvasObject>;

/// The ordered objects on the canvas plus the current selection.
///
/// A `Document` is a value: every structural operation returns a new
/// document and leaves `self` untouched. Objects are reference counted so
/// snapshots in the history share everything they did not change.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Paint order, later entries draw on top
    objects: Vec<ObjectRef>,
    selected_id: Option<ObjectId>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a document from loaded objects, dropping a dangling selection
    pub fn from_objects(objects: Vec<CanvasObject>, selected_id: Option<ObjectId>) -> Self {
        let objects: Vec<ObjectRef> = objects.into_iter().map(Arc::new).collect();
        let selected_id = selected_id.filter(|id| objects.iter().any(|obj| obj.id() == *id));
        Self {
            objects,
            selected_id,
        }
    }

    pub fn objects(&self) -> &[ObjectRef] {
        &self.objects
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn selected_id(&self) -> Option<ObjectId> {
        self.selected_id
    }

    pub fn selected(&self) -> Option<&CanvasObject> {
        self.selected_id.and_then(|id| self.get(id))
    }

    pub fn get(&self, id: ObjectId) -> Option<&CanvasObject> {
        self.objects
            .iter()
            .find(|obj| obj.id() == id)
            .map(|obj| obj.as_ref())
    }

    pub fn contains(&self, id: ObjectId) -> bool {
        self.get(id).is_some()
    }

    pub fn index_of(&self, id: ObjectId) -> Option<usize> {
        self.objects.iter().position(|obj| obj.id() == id)
    }

    /// Topmost object whose rotated box contains `pos`
    pub fn object_at(&self, pos: Pos2) -> Option<&CanvasObject> {
        self.objects
            .iter()
            .rev()
            .find(|obj| obj.hit_test(pos))
            .map(|obj| obj.as_ref())
    }

    /// New document with `obj` on top, and selected
    pub fn with_appended(&self, obj: CanvasObject) -> Self {
        let selected_id = Some(obj.id());
        let mut objects = self.objects.clone();
        objects.push(Arc::new(obj));
        Self {
            objects,
            selected_id,
        }
    }

    /// New document without the object `id`; its selection is cleared if it was selected
    pub fn with_removed(&self, id: ObjectId) -> Self {
        let objects = self
            .objects
            .iter()
            .filter(|obj| obj.id() != id)
            .cloned()
            .collect();
        let selected_id = self.selected_id.filter(|selected| *selected != id);
        Self {
            objects,
            selected_id,
        }
    }

    /// New document with the object `id` swapped for `new_obj` at the same paint position
    pub fn with_replaced(&self, id: ObjectId, new_obj: CanvasObject) -> Self {
        let new_id = new_obj.id();
        let new_obj = Arc::new(new_obj);
        let objects = self
            .objects
            .iter()
            .map(|obj| {
                if obj.id() == id {
                    Arc::clone(&new_obj)
                } else {
                    Arc::clone(obj)
                }
            })
            .collect();
        let selected_id = self
            .selected_id
            .map(|selected| if selected == id { new_id } else { selected });
        Self {
            objects,
            selected_id,
        }
    }

    /// New document with the same objects and a different selection.
    ///
    /// Ids that are not in the document clear the selection.
    pub fn with_selection(&self, id: Option<ObjectId>) -> Self {
        Self {
            objects: self.objects.clone(),
            selected_id: id.filter(|id| self.contains(*id)),
        }
    }

    /// Empty document, nothing selected
    pub fn cleared(&self) -> Self {
        Self::new()
    }
}
