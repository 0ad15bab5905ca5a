//! Ordered element storage with monotonically assigned ids.

use crate::model::{DesignElement, ElementKind};

/// Elements in draw order (later elements are drawn on top).
#[derive(Debug, Clone, Default)]
pub struct ElementStore {
    elements: Vec<DesignElement>,
    next_id: u64,
}

impl ElementStore {
    pub fn new() -> Self {
        Self {
            elements: Vec::new(),
            next_id: 1,
        }
    }

    /// Reserves the next id. Ids are never reused within a session.
    pub fn generate_id(&mut self) -> u64 {
        let id = self.next_id.max(1);
        self.next_id = id + 1;
        id
    }

    /// Ensures future ids are greater than `id`.
    pub fn bump_next_id(&mut self, id: u64) {
        if id >= self.next_id {
            self.next_id = id + 1;
        }
    }

    /// Creates a default element of `kind` with a fresh id and stores it.
    pub fn create(&mut self, kind: ElementKind) -> &mut DesignElement {
        let id = self.generate_id();
        self.elements.push(DesignElement::new(id, kind));
        let last = self.elements.len() - 1;
        &mut self.elements[last]
    }

    /// Inserts an element restored from a file, keeping its id.
    pub fn restore(&mut self, element: DesignElement) {
        self.bump_next_id(element.id);
        self.elements.push(element);
    }

    pub fn get(&self, id: u64) -> Option<&DesignElement> {
        self.elements.iter().find(|e| e.id == id)
    }

    pub fn get_mut(&mut self, id: u64) -> Option<&mut DesignElement> {
        self.elements.iter_mut().find(|e| e.id == id)
    }

    pub fn remove(&mut self, id: u64) -> Option<DesignElement> {
        let idx = self.elements.iter().position(|e| e.id == id)?;
        Some(self.elements.remove(idx))
    }

    pub fn contains(&self, id: u64) -> bool {
        self.get(id).is_some()
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &DesignElement> {
        self.elements.iter()
    }

    pub fn as_slice(&self) -> &[DesignElement] {
        &self.elements
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Drops every element. The id counter keeps running.
    pub fn clear(&mut self) {
        self.elements.clear();
    }
}
