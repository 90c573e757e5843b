//! Dense renumbering of live identities.

use std::collections::BTreeMap;

use folio_types::{ObjectId, TypeError};
use tracing::info;

use crate::error::{XrefError, XrefResult};
use crate::table::{assign_id, XrefTable};

impl XrefTable {
    /// Reassign identities densely from 1, generation 0, preserving the
    /// ascending order of the old identities.
    ///
    /// Every reference held inside the table is rewritten. References to
    /// absent objects go to the dead-object sentinel. The returned map
    /// lets holders outside the table, such as the trailer, follow along.
    pub fn renumber(&mut self) -> XrefResult<BTreeMap<ObjectId, ObjectId>> {
        let dangling = self.objects.values().any(|item| {
            item.references()
                .iter()
                .any(|target| !self.objects.contains_key(target))
        });
        let sentinel = if dangling {
            Some(self.ensure_dead_object()?)
        } else {
            self.dead_object.filter(|id| self.objects.contains_key(id))
        };

        let mapping = self
            .objects
            .keys()
            .zip(1u32..)
            .map(|(&old, number)| Ok((old, ObjectId::new(number, 0)?)))
            .collect::<Result<BTreeMap<_, _>, TypeError>>()?;
        let sentinel = sentinel.and_then(|id| mapping.get(&id).copied());

        let mut repaired = 0;
        let old = std::mem::take(&mut self.objects);
        for ((_, mut item), &new_id) in old.into_iter().zip(mapping.values()) {
            item.rewrite_references(|target| match mapping.get(&target) {
                Some(&new) => Some(new),
                None => {
                    repaired += 1;
                    sentinel
                }
            });
            assign_id(&mut item, new_id);
            self.objects.insert(new_id, item);
        }

        self.dead_object = sentinel;
        self.next_number = u32::try_from(self.objects.len() + 1)
            .map_err(|_| XrefError::IdentitySpaceExhausted)?;
        self.record_repairs(repaired)?;

        let moved = mapping.iter().filter(|(old, new)| old != new).count();
        info!(objects = self.objects.len(), moved, repaired, "renumbered object table");
        Ok(mapping)
    }
}
