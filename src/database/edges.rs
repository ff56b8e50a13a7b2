use std::collections::{BTreeSet, HashMap};
use uuid::Uuid;

/// Many-to-many edge set indexed in both directions.
///
/// Every mutation touches the forward and backward maps together, so
/// `right_of(a).contains(b)` holds exactly when `left_of(b).contains(a)`.
#[derive(Debug, Clone, Default)]
pub struct EdgeIndex {
    forward: HashMap<Uuid, BTreeSet<Uuid>>,
    backward: HashMap<Uuid, BTreeSet<Uuid>>,
}

impl EdgeIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns false when the edge already existed
    pub fn link(&mut self, left: Uuid, right: Uuid) -> bool {
        let added = self.forward.entry(left).or_default().insert(right);
        if added {
            self.backward.entry(right).or_default().insert(left);
        }
        added
    }

    /// Returns false when there was no such edge
    pub fn unlink(&mut self, left: Uuid, right: Uuid) -> bool {
        let removed = remove_from(&mut self.forward, left, right);
        if removed {
            remove_from(&mut self.backward, right, left);
        }
        removed
    }

    pub fn right_of(&self, left: Uuid) -> impl Iterator<Item = Uuid> + '_ {
        self.forward.get(&left).into_iter().flatten().copied()
    }

    pub fn left_of(&self, right: Uuid) -> impl Iterator<Item = Uuid> + '_ {
        self.backward.get(&right).into_iter().flatten().copied()
    }

    /// Drop every edge whose left end is `left`; returns how many went
    pub fn remove_left(&mut self, left: Uuid) -> usize {
        let Some(rights) = self.forward.remove(&left) else {
            return 0;
        };
        for right in &rights {
            remove_from(&mut self.backward, *right, left);
        }
        rights.len()
    }

    /// Drop every edge whose right end is `right`; returns how many went
    pub fn remove_right(&mut self, right: Uuid) -> usize {
        let Some(lefts) = self.backward.remove(&right) else {
            return 0;
        };
        for left in &lefts {
            remove_from(&mut self.forward, *left, right);
        }
        lefts.len()
    }

    pub fn edges(&self) -> impl Iterator<Item = (Uuid, Uuid)> + '_ {
        self.forward
            .iter()
            .flat_map(|(left, rights)| rights.iter().map(move |right| (*left, *right)))
    }

    pub fn len(&self) -> usize {
        self.forward.values().map(BTreeSet::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.forward.is_empty()
    }
}

fn remove_from(map: &mut HashMap<Uuid, BTreeSet<Uuid>>, key: Uuid, value: Uuid) -> bool {
    let Some(set) = map.get_mut(&key) else {
        return false;
    };
    let removed = set.remove(&value);
    if set.is_empty() {
        map.remove(&key);
    }
    removed
}

impl FromIterator<(Uuid, Uuid)> for EdgeIndex {
    fn from_iter<I: IntoIterator<Item = (Uuid, Uuid)>>(iter: I) -> Self {
        let mut index = EdgeIndex::new();
        for (left, right) in iter {
            index.link(left, right);
        }
        index
    }
}
