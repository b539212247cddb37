use std::collections::HashMap;

use splitbook_core::Entity;

/// Id-keyed storage for ledger entities.
#[derive(Debug)]
pub(crate) struct Arena<E: Entity> {
    items: HashMap<E::Id, E>,
}

impl<E: Entity> Default for Arena<E> {
    fn default() -> Self {
        Self {
            items: HashMap::new(),
        }
    }
}

impl<E: Entity> Arena<E> {
    pub(crate) fn insert(&mut self, entity: E) -> E::Id {
        let id = *entity.id();
        self.items.insert(id, entity);
        id
    }

    pub(crate) fn get(&self, id: E::Id) -> Option<&E> {
        self.items.get(&id)
    }

    pub(crate) fn get_mut(&mut self, id: E::Id) -> Option<&mut E> {
        self.items.get_mut(&id)
    }

    pub(crate) fn remove(&mut self, id: E::Id) -> Option<E> {
        self.items.remove(&id)
    }

    pub(crate) fn len(&self) -> usize {
        self.items.len()
    }

    pub(crate) fn values(&self) -> impl Iterator<Item = &E> {
        self.items.values()
    }
}
