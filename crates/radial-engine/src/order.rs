//! User-visible trigger ordering with adjacent-swap moves.

use std::slice;

use tracing::trace;

/// Items carrying a persisted integer sort priority.
pub trait Prioritized {
    /// Current priority; lower sorts first.
    fn priority(&self) -> i32;
    /// Overwrite the priority.
    fn set_priority(&mut self, priority: i32);
}

/// Direction of a single move.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Direction {
    /// Toward index 0.
    Up,
    /// Toward the end.
    Down,
}

/// Ordered sequence whose positions and stored priorities stay in step.
#[derive(Clone, Debug)]
pub struct PriorityOrderer<T> {
    /// Items in display order.
    items: Vec<T>,
}

impl<T: Prioritized> PriorityOrderer<T> {
    /// Sort `items` by priority. Ties keep their input order.
    pub fn new(mut items: Vec<T>) -> Self {
        items.sort_by_key(Prioritized::priority);
        Self { items }
    }

    /// Move the item at `index` one place. Moving the first item up or the
    /// last item down (or an out-of-range index) changes nothing and returns
    /// false. Otherwise the two neighbours swap places and priorities.
    pub fn move_item(&mut self, index: usize, dir: Direction) -> bool {
        let other = match dir {
            Direction::Up => index.checked_sub(1),
            Direction::Down => index.checked_add(1),
        };
        let Some(other) = other.filter(|o| *o < self.items.len() && index < self.items.len())
        else {
            trace!(index, ?dir, "move_noop");
            return false;
        };
        let (lo, hi) = (index.min(other), index.max(other));
        let (head, tail) = self.items.split_at_mut(hi);
        let (a, b) = (&mut head[lo], &mut tail[0]);
        let pa = a.priority();
        a.set_priority(b.priority());
        b.set_priority(pa);
        self.items.swap(lo, hi);
        trace!(from = index, to = other, "move_item");
        true
    }

    /// Items in display order.
    pub fn iter(&self) -> slice::Iter<'_, T> {
        self.items.iter()
    }

    /// Mutable items in display order. Callers must not touch priorities.
    pub(crate) fn iter_mut(&mut self) -> slice::IterMut<'_, T> {
        self.items.iter_mut()
    }

    /// Item at `index`.
    pub fn get(&self, index: usize) -> Option<&T> {
        self.items.get(index)
    }

    /// Position of the first item matching `pred`.
    pub fn position(&self, pred: impl Fn(&T) -> bool) -> Option<usize> {
        self.items.iter().position(pred)
    }

    /// First item matching `pred`.
    pub fn find(&self, pred: impl Fn(&T) -> bool) -> Option<&T> {
        self.items.iter().find(|t| pred(t))
    }

    /// Mutable first item matching `pred`.
    pub(crate) fn find_mut(&mut self, pred: impl Fn(&T) -> bool) -> Option<&mut T> {
        self.items.iter_mut().find(|t| pred(t))
    }

    /// Number of items.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// True when empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[derive(Clone, Debug, PartialEq)]
    struct Item {
        name: &'static str,
        priority: i32,
    }

    impl Prioritized for Item {
        fn priority(&self) -> i32 {
            self.priority
        }

        fn set_priority(&mut self, priority: i32) {
            self.priority = priority;
        }
    }

    fn abc() -> PriorityOrderer<Item> {
        PriorityOrderer::new(vec![
            Item { name: "c", priority: 7 },
            Item { name: "a", priority: 1 },
            Item { name: "b", priority: 4 },
        ])
    }

    fn names(o: &PriorityOrderer<Item>) -> Vec<&'static str> {
        o.iter().map(|i| i.name).collect()
    }

    #[test]
    fn sorts_on_construction() {
        assert_eq!(names(&abc()), ["a", "b", "c"]);
    }

    #[test]
    fn edges_are_noops() {
        let mut o = abc();
        assert!(!o.move_item(0, Direction::Up));
        assert!(!o.move_item(2, Direction::Down));
        assert!(!o.move_item(9, Direction::Up));
        assert_eq!(names(&o), ["a", "b", "c"]);
        assert_eq!(o.get(0).map(|i| i.priority), Some(1));
    }

    #[test]
    fn interior_move_swaps_priorities() {
        let mut o = abc();
        assert!(o.move_item(1, Direction::Down));
        assert_eq!(names(&o), ["a", "c", "b"]);
        let prios: Vec<i32> = o.iter().map(|i| i.priority).collect();
        assert_eq!(prios, [1, 4, 7]);

        assert!(o.move_item(1, Direction::Up));
        assert_eq!(names(&o), ["c", "a", "b"]);
        assert_eq!(o.position(|i| i.name == "c"), Some(0));
        assert_eq!(o.find(|i| i.name == "c").map(|i| i.priority), Some(1));
    }

    proptest! {
        #[test]
        fn moves_swap_two_adjacent_priorities(
            prios in proptest::collection::vec(-50i32..50, 1..12),
            index in 0usize..12,
            up in any::<bool>(),
        ) {
            let items: Vec<Keyed> = prios
                .iter()
                .enumerate()
                .map(|(id, p)| Keyed { id, priority: *p })
                .collect();
            let mut o = PriorityOrderer::new(items);
            let before: Vec<Keyed> = o.iter().cloned().collect();
            let dir = if up { Direction::Up } else { Direction::Down };
            let moved = o.move_item(index, dir);

            let prio_of = |o: &PriorityOrderer<Keyed>, id: usize| {
                o.find(|k| k.id == id).map(|k| k.priority)
            };
            let mut a: Vec<i32> = before.iter().map(|k| k.priority).collect();
            let mut b: Vec<i32> = o.iter().map(|k| k.priority).collect();
            // Display order and priority order agree.
            prop_assert!(b.windows(2).all(|w| w[0] <= w[1]));
            a.sort_unstable();
            b.sort_unstable();
            prop_assert_eq!(a, b);

            let changed: Vec<usize> = before
                .iter()
                .enumerate()
                .filter(|(_, k)| prio_of(&o, k.id) != Some(k.priority))
                .map(|(pos, _)| pos)
                .collect();
            if moved {
                prop_assert!(changed.len() <= 2);
                if let [x, y] = changed[..] {
                    prop_assert_eq!(y, x + 1);
                }
            } else {
                prop_assert!(changed.is_empty());
                prop_assert_eq!(o.iter().cloned().collect::<Vec<_>>(), before);
            }
        }
    }

    #[derive(Clone, Debug, PartialEq)]
    struct Keyed {
        id: usize,
        priority: i32,
    }

    impl Prioritized for Keyed {
        fn priority(&self) -> i32 {
            self.priority
        }

        fn set_priority(&mut self, priority: i32) {
            self.priority = priority;
        }
    }
}
