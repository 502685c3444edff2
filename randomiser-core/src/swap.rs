use crate::catalog::{CatalogView, ItemType, LocationRecord};

#[derive(Debug)]
struct PendingSwap {
    source: String,
    kind: ItemType,
    targets: Vec<String>,
    cursor: usize,
}

impl PendingSwap {
    fn next_target(&mut self) -> &str {
        let idx = self.cursor;
        self.cursor = (self.cursor + 1) % self.targets.len();
        &self.targets[idx]
    }
}

/// Queued "replace A with B" requests. A source may carry several targets;
/// committing hands them out round-robin so they spread evenly over the
/// locations that hold the source.
#[derive(Debug, Default)]
pub(crate) struct SwapQueue {
    pending: Vec<PendingSwap>,
}

impl SwapQueue {
    pub(crate) fn push(&mut self, source: &str, target: &str, kind: ItemType) {
        if let Some(p) = self
            .pending
            .iter_mut()
            .find(|p| p.source == source && p.kind == kind)
        {
            if !p.targets.iter().any(|t| t == target) {
                p.targets.push(target.to_string());
            }
            return;
        }

        self.pending.push(PendingSwap {
            source: source.to_string(),
            kind,
            targets: vec![target.to_string()],
            cursor: 0,
        });
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub(crate) fn carries(&self, kind: ItemType) -> bool {
        self.pending.iter().any(|p| p.kind == kind)
    }

    /// Walk every location once, rewriting force item then original item.
    /// Locations already swapped this session are left alone; locations that
    /// change are flagged. Returns how many locations changed.
    pub(crate) fn commit(&mut self, view: &CatalogView<'_>, locations: &mut [LocationRecord]) -> usize {
        let mut changed_count = 0usize;

        for loc in locations.iter_mut() {
            if loc.swapped {
                continue;
            }

            let mut last: Option<(String, String)> = None;
            let mut changed = false;

            for slot in [&mut loc.force_item, &mut loc.original_item] {
                let Some(current) = slot.clone() else {
                    continue;
                };

                // Force and original holding the same source get the same target.
                if let Some((source, target)) = last.as_ref() {
                    if *source == current {
                        *slot = Some(target.clone());
                        continue;
                    }
                }

                let Some(kind) = view.item_type(&current) else {
                    continue;
                };

                if let Some(pending) = self
                    .pending
                    .iter_mut()
                    .find(|p| p.source == current && p.kind == kind)
                {
                    let target = pending.next_target().to_string();
                    *slot = Some(target.clone());
                    last = Some((current, target));
                    changed = true;
                }
            }

            if changed {
                log::debug!("swap at {}: {:?}", loc.full_name(), last);
                loc.swapped = true;
                changed_count += 1;
            }
        }

        self.pending.clear();
        changed_count
    }
}
