use std::collections::{HashMap, HashSet};

use chrono::{TimeZone, Utc};
use courseware::ordering::{resolve, ItemKind, OrderableItem, ReorderRequest, ResolvedOrder};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use uuid::Uuid;

const ROUNDS: u64 = 200;

/// Items with gapped, sometimes duplicated orders, as left behind by deletes and racing appends.
fn random_items(rng: &mut StdRng) -> Vec<OrderableItem> {
    let container_id = Uuid::new_v4();
    let count = rng.random_range(1..=40);

    (0..count)
        .map(|_| OrderableItem {
            id: Uuid::new_v4(),
            kind: if rng.random_bool(0.7) {
                ItemKind::Lecture
            } else {
                ItemKind::Quiz
            },
            order: rng.random_range(1..=60),
            container_id,
            created_at: Utc.timestamp_opt(rng.random_range(0..1_000_000), 0).unwrap(),
        })
        .collect()
}

fn random_requests(rng: &mut StdRng, items: &[OrderableItem]) -> Vec<ReorderRequest> {
    let count = rng.random_range(0..=items.len().min(8));
    let len = items.len() as i32;

    (0..count)
        .map(|_| {
            let item = items[rng.random_range(0..items.len())];

            ReorderRequest {
                item_id: item.id,
                item_kind: item.kind,
                desired_order: rng.random_range(-2..=len + 5),
            }
        })
        .collect()
}

fn apply(items: &[OrderableItem], resolved: &[ResolvedOrder]) -> Vec<OrderableItem> {
    let orders: HashMap<Uuid, i32> = resolved.iter().map(|entry| (entry.item_id, entry.new_order)).collect();

    items
        .iter()
        .map(|item| OrderableItem {
            order: orders[&item.id],
            ..*item
        })
        .collect()
}

#[test]
fn every_item_gets_exactly_one_position() {
    let mut rng = StdRng::seed_from_u64(7);

    for _ in 0..ROUNDS {
        let items = random_items(&mut rng);
        let requests = random_requests(&mut rng, &items);

        let resolved = resolve(&items, &requests).unwrap();

        let orders: Vec<i32> = resolved.iter().map(|entry| entry.new_order).collect();
        let expected: Vec<i32> = (1..=items.len() as i32).collect();
        assert_eq!(orders, expected);

        let ids: HashSet<Uuid> = resolved.iter().map(|entry| entry.item_id).collect();
        assert_eq!(ids, items.iter().map(|item| item.id).collect());
    }
}

#[test]
fn distinct_targets_within_range_are_honored() {
    let mut rng = StdRng::seed_from_u64(11);

    for _ in 0..ROUNDS {
        let items = random_items(&mut rng);

        let mut movers = items.clone();
        movers.shuffle(&mut rng);
        movers.truncate(rng.random_range(0..=items.len()));

        let mut targets: Vec<i32> = (1..=items.len() as i32).collect();
        targets.shuffle(&mut rng);

        let requests: Vec<ReorderRequest> = movers
            .iter()
            .zip(targets)
            .map(|(item, desired_order)| ReorderRequest {
                item_id: item.id,
                item_kind: item.kind,
                desired_order,
            })
            .collect();

        let resolved = resolve(&items, &requests).unwrap();

        for request in &requests {
            let placed = resolved.iter().find(|entry| entry.item_id == request.item_id).unwrap();
            assert_eq!(placed.new_order, request.desired_order);
        }
    }
}

#[test]
fn colliding_targets_take_the_first_free_slot_at_or_after_them() {
    let mut rng = StdRng::seed_from_u64(17);

    for _ in 0..ROUNDS {
        let items = random_items(&mut rng);
        let crowded = (items.len() as i32 / 2).max(1);

        // at most half the items, all aimed at the first half, so every slot stays in range
        let mut movers = items.clone();
        movers.shuffle(&mut rng);
        movers.truncate(rng.random_range(0..=items.len() / 2));

        let requests: Vec<ReorderRequest> = movers
            .iter()
            .map(|item| ReorderRequest {
                item_id: item.id,
                item_kind: item.kind,
                desired_order: rng.random_range(-1..=crowded),
            })
            .collect();

        let resolved = resolve(&items, &requests).unwrap();

        let mut processing = requests.clone();
        processing.sort_by_key(|request| request.desired_order);

        let mut taken = HashSet::new();
        for request in processing {
            let mut slot = request.desired_order.max(1) - 1;
            while taken.contains(&slot) {
                slot += 1;
            }
            taken.insert(slot);

            let placed = resolved.iter().find(|entry| entry.item_id == request.item_id).unwrap();
            assert_eq!(placed.new_order, slot + 1);
        }
    }
}

#[test]
fn items_nobody_moved_keep_their_relative_sequence() {
    let mut rng = StdRng::seed_from_u64(23);

    for _ in 0..ROUNDS {
        let items = random_items(&mut rng);
        let requests = random_requests(&mut rng, &items);
        let moved: HashSet<Uuid> = requests.iter().map(|request| request.item_id).collect();

        let resolved = resolve(&items, &requests).unwrap();

        let mut before: Vec<&OrderableItem> = items.iter().filter(|item| !moved.contains(&item.id)).collect();
        before.sort_by_key(|item| (item.order, item.created_at));
        let before: Vec<Uuid> = before.iter().map(|item| item.id).collect();

        let after: Vec<Uuid> = resolved
            .iter()
            .filter(|entry| !moved.contains(&entry.item_id))
            .map(|entry| entry.item_id)
            .collect();

        assert_eq!(before, after);
    }
}

#[test]
fn resolving_twice_is_stable() {
    let mut rng = StdRng::seed_from_u64(31);

    for _ in 0..ROUNDS {
        let items = random_items(&mut rng);
        let requests = random_requests(&mut rng, &items);

        let first = resolve(&items, &requests).unwrap();
        let second = resolve(&apply(&items, &first), &requests).unwrap();

        assert_eq!(first, second);
    }
}
