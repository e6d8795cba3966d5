use crate::anatomy::error::AnatomyError;
use crate::anatomy::normalize::NormalizedOrgan;
use crate::anatomy::organs::OrganId;
use std::collections::HashMap;

/// Normalized organs keyed by identifier. Entries are added once and live
/// until the session is dropped.
#[derive(Debug, Default)]
pub struct OrganRegistry {
    entries: HashMap<OrganId, NormalizedOrgan>,
}

impl OrganRegistry {
    pub fn get(&self, id: OrganId) -> Option<&NormalizedOrgan> {
        self.entries.get(&id)
    }

    pub fn get_mut(&mut self, id: OrganId) -> Option<&mut NormalizedOrgan> {
        self.entries.get_mut(&id)
    }

    pub fn put(&mut self, organ: NormalizedOrgan) -> Result<(), AnatomyError> {
        if self.entries.contains_key(&organ.id) {
            return Err(AnatomyError::DuplicateOrgan(organ.id));
        }
        self.entries.insert(organ.id, organ);
        Ok(())
    }

    pub fn contains(&self, id: OrganId) -> bool {
        self.entries.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Visits every present entry once, in no particular order.
    pub fn for_each(&self, mut f: impl FnMut(&NormalizedOrgan)) {
        self.entries.values().for_each(|organ| f(organ));
    }

    pub fn for_each_mut(&mut self, mut f: impl FnMut(&mut NormalizedOrgan)) {
        self.entries.values_mut().for_each(|organ| f(organ));
    }

    pub fn ids(&self) -> impl Iterator<Item = OrganId> + '_ {
        self.entries.keys().copied()
    }
}
