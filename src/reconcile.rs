//! Partial-update reconciliation for nested child collections. Incoming
//! items are matched against persisted children by natural key (ingredient
//! name, step order); matches become field updates, the rest become inserts.
//! Children omitted from the payload are left as they are.

use std::collections::HashSet;
use std::hash::Hash;

/// One child-record operation computed from a partial update. The natural
/// key travels inside the item and is never modified by an `Update`.
#[derive(Debug, Clone, PartialEq)]
pub enum ChildOp<I> {
    Update(I),
    Insert(I),
}

/// Compute the operations that converge the persisted children (identified
/// by `existing` keys) to the incoming collection. An absent collection
/// produces no operations. A key repeated within the payload updates the
/// item inserted earlier in the same batch rather than inserting twice.
pub fn reconcile<I, K, F>(
    existing: impl IntoIterator<Item = K>,
    incoming: Option<&[I]>,
    key: F,
) -> Vec<ChildOp<I>>
where
    I: Clone,
    K: Eq + Hash,
    F: Fn(&I) -> K,
{
    let Some(incoming) = incoming else {
        return Vec::new();
    };

    let mut known: HashSet<K> = existing.into_iter().collect();
    let mut ops = Vec::with_capacity(incoming.len());

    for item in incoming {
        let item_key = key(item);
        if known.contains(&item_key) {
            ops.push(ChildOp::Update(item.clone()));
        } else {
            known.insert(item_key);
            ops.push(ChildOp::Insert(item.clone()));
        }
    }

    ops
}
