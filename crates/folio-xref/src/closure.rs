//! Reachability, dangling-reference repair and compaction.
//!
//! Traversal never recurses. Each pass walks an explicit stack while
//! tracking depth; a node found beyond the depth cap is pushed onto a
//! deferred queue, and passes repeat until that queue is empty. The visited
//! set makes cycles terminate.

use std::collections::BTreeSet;

use folio_types::ObjectId;
use tracing::{debug, info, warn};

use crate::error::XrefResult;
use crate::table::XrefTable;

impl XrefTable {
    /// Identities reachable from `root`, including `root` itself.
    ///
    /// References to absent objects are rewritten to the dead-object
    /// sentinel, which then belongs to the result.
    pub fn transitive_closure(&mut self, root: ObjectId) -> XrefResult<BTreeSet<ObjectId>> {
        self.closure_from([root])
    }

    /// [`XrefTable::transitive_closure`] over several roots, e.g. every
    /// reference held by a trailer.
    pub fn closure_from(
        &mut self,
        roots: impl IntoIterator<Item = ObjectId>,
    ) -> XrefResult<BTreeSet<ObjectId>> {
        let mut visited = BTreeSet::new();
        let mut missing = BTreeSet::new();
        let mut holders = BTreeSet::new();
        let mut deferred: Vec<ObjectId> = roots.into_iter().collect();
        let mut passes = 0usize;

        while !deferred.is_empty() {
            passes += 1;
            let mut stack: Vec<(ObjectId, usize)> = deferred.drain(..).map(|id| (id, 0)).collect();
            while let Some((id, depth)) = stack.pop() {
                let Some(item) = self.objects.get(&id) else {
                    missing.insert(id);
                    continue;
                };
                if !visited.insert(id) {
                    continue;
                }
                for target in item.references() {
                    if !self.objects.contains_key(&target) {
                        missing.insert(target);
                        holders.insert(id);
                    } else if !visited.contains(&target) {
                        if depth + 1 > self.max_depth {
                            deferred.push(target);
                            self.diagnostics.deferred_visits += 1;
                        } else {
                            stack.push((target, depth + 1));
                        }
                    }
                }
            }
        }

        let repaired = self.repair_dangling(&holders, &missing)?;
        if repaired > 0 {
            if let Some(sentinel) = self.dead_object {
                visited.insert(sentinel);
            }
        }
        debug!(
            reachable = visited.len(),
            passes,
            repaired,
            "computed transitive closure"
        );
        Ok(visited)
    }

    /// Redirect every reference to a `missing` identity held by `holders`
    /// to the sentinel. Returns the number of references rewritten.
    fn repair_dangling(
        &mut self,
        holders: &BTreeSet<ObjectId>,
        missing: &BTreeSet<ObjectId>,
    ) -> XrefResult<usize> {
        if holders.is_empty() {
            return Ok(0);
        }
        let sentinel = self.ensure_dead_object()?;
        let mut total = 0;
        for holder in holders {
            let Some(item) = self.objects.get_mut(holder) else {
                continue;
            };
            let mut count = 0;
            item.rewrite_references(|target| {
                missing.contains(&target).then(|| {
                    count += 1;
                    sentinel
                })
            });
            warn!(holder = %holder, count, "repaired dangling references");
            total += count;
        }
        self.record_repairs(total)?;
        Ok(total)
    }

    /// Keep exactly the objects reachable from `root`. Returns how many
    /// entries were dropped.
    pub fn compact(&mut self, root: ObjectId) -> XrefResult<usize> {
        self.compact_from([root])
    }

    pub fn compact_from(&mut self, roots: impl IntoIterator<Item = ObjectId>) -> XrefResult<usize> {
        let live = self.closure_from(roots)?;
        let before = self.objects.len();
        self.objects.retain(|id, _| live.contains(id));
        if self.dead_object.is_some_and(|id| !live.contains(&id)) {
            self.dead_object = None;
        }
        let removed = before - self.objects.len();
        info!(removed, live = self.objects.len(), "compacted object table");
        Ok(removed)
    }
}
