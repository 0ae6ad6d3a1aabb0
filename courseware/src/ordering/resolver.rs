use charybdis::types::Int;

use crate::errors::CourseError;
use crate::ordering::model::{OrderableItem, ReorderRequest, ResolvedOrder};

/// Computes the final ordering of every item of one container.
///
/// Requests are placed first, ascending by `desired_order` with ties kept in batch order, each
/// on its desired slot or the first free slot after it. Items nobody asked to move keep their
/// relative `(order, created_at)` sequence and fill the remaining slots left to right. The
/// result always numbers the items `1..=N`.
///
/// Returns `NotFound` when a request names an item that is not part of `items`.
pub fn resolve(items: &[OrderableItem], requests: &[ReorderRequest]) -> Result<Vec<ResolvedOrder>, CourseError> {
    let mut requested = Vec::with_capacity(requests.len());

    for request in requests {
        let index = items
            .iter()
            .position(|item| item.id == request.item_id && item.kind == request.item_kind)
            .ok_or_else(|| {
                CourseError::NotFound(format!(
                    "{} {} is not part of the container",
                    request.item_kind, request.item_id
                ))
            })?;

        requested.push((index, request.desired_order));
    }

    // stable, so equal desired orders keep batch order
    requested.sort_by_key(|(_, desired_order)| *desired_order);

    let mut slots: Vec<Option<usize>> = vec![None; items.len()];
    let mut placed = vec![false; items.len()];

    for (index, desired_order) in requested {
        // first request for an item wins
        if placed[index] {
            continue;
        }

        // Targets past the end are capped at the current length. The output is compacted,
        // so this yields the same sequence as growing the array up to the target.
        let mut slot = (desired_order.max(1) - 1) as usize;
        slot = slot.min(slots.len());

        while slot < slots.len() && slots[slot].is_some() {
            slot += 1;
        }

        if slot == slots.len() {
            slots.push(None);
        }

        slots[slot] = Some(index);
        placed[index] = true;
    }

    let mut unplaced: Vec<usize> = (0..items.len()).filter(|index| !placed[*index]).collect();
    unplaced.sort_by_key(|index| (items[*index].order, items[*index].created_at));

    let mut unplaced = unplaced.into_iter();

    for slot in slots.iter_mut().filter(|slot| slot.is_none()) {
        match unplaced.next() {
            Some(index) => *slot = Some(index),
            None => break,
        }
    }

    slots.extend(unplaced.map(Some));

    let resolved = slots
        .into_iter()
        .flatten()
        .enumerate()
        .map(|(position, index)| ResolvedOrder {
            item_id: items[index].id,
            item_kind: items[index].kind,
            new_order: position as Int + 1,
        })
        .collect();

    Ok(resolved)
}
