//! Reachability and distance over inheritance edges.
//!
//! All walks are iterative. A node on the current path is never re-entered,
//! so an injected cycle terminates; `max_inheritance_depth` additionally caps
//! how deep a single path may go (0 means no cap).

use crate::model::DocumentationModel;
use crate::types::{EntityId, Protection};
use std::collections::{HashMap, HashSet, VecDeque};
use tracing::{error, warn};

/// Which edge list a walk follows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Towards base classes
    Up,
    /// Towards derived classes
    Down,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mark {
    OnPath,
    Done,
}

impl DocumentationModel {
    fn depth_exceeded(&self, depth: usize) -> bool {
        let limit = self.options().max_inheritance_depth;
        limit > 0 && depth > limit
    }

    /// Neighbours of `id` along `direction`.
    ///
    /// Walking up without `follow_instances` replaces template instances by
    /// their master.
    fn neighbours(&self, id: EntityId, direction: Direction, follow_instances: bool) -> Vec<EntityId> {
        match direction {
            Direction::Up => self
                .base_classes(id)
                .iter()
                .map(|edge| {
                    let target = edge.class;
                    if follow_instances {
                        target
                    } else {
                        self.class(target)
                            .and_then(|c| c.template_master)
                            .unwrap_or(target)
                    }
                })
                .collect(),
            Direction::Down => self.sub_classes(id).iter().map(|edge| edge.class).collect(),
        }
    }

    /// Depth-first search from `start`, true when `target` is reached.
    fn reaches(
        &self,
        start: EntityId,
        target: EntityId,
        direction: Direction,
        follow_instances: bool,
    ) -> bool {
        let mut marks: HashMap<EntityId, Mark> = HashMap::new();
        let mut path: Vec<(EntityId, Vec<EntityId>, usize)> = Vec::new();

        marks.insert(start, Mark::OnPath);
        path.push((start, self.neighbours(start, direction, follow_instances), 0));

        while let Some((node, next, cursor)) = path.last_mut() {
            let node = *node;
            let Some(&candidate) = next.get(*cursor) else {
                marks.insert(node, Mark::Done);
                path.pop();
                continue;
            };
            *cursor += 1;

            if candidate == target {
                return true;
            }

            match marks.get(&candidate) {
                Some(Mark::OnPath) => {
                    warn!(
                        "Inheritance cycle through '{}' while looking for '{}'",
                        self.name(candidate),
                        self.name(target)
                    );
                    continue;
                }
                Some(Mark::Done) => continue,
                None => {}
            }

            if self.depth_exceeded(path.len()) {
                error!(
                    "Possible recursive class relation while inside '{}' and looking for '{}'",
                    self.name(node),
                    self.name(target)
                );
                return false;
            }

            marks.insert(candidate, Mark::OnPath);
            let next = self.neighbours(candidate, direction, follow_instances);
            path.push((candidate, next, 0));
        }

        false
    }

    /// True iff `base` is a direct or indirect base class of `derived`.
    ///
    /// With `follow_instances` false, template instances on the way are
    /// replaced by their generic master.
    pub fn is_base_class(&self, derived: EntityId, base: EntityId, follow_instances: bool) -> bool {
        self.reaches(derived, base, Direction::Up, follow_instances)
    }

    /// True iff `derived` is a direct or indirect sub class of `base`.
    pub fn is_sub_class(&self, base: EntityId, derived: EntityId) -> bool {
        self.reaches(base, derived, Direction::Down, true)
    }

    /// Number of base edges on the shortest path from `from` up to `to`.
    ///
    /// An Objective-C category counts as the class it extends. `None` when
    /// `to` is not reachable within the depth bound.
    pub fn min_class_distance(&self, from: EntityId, to: EntityId) -> Option<usize> {
        let to = self
            .class(to)
            .and_then(|c| c.category_of)
            .unwrap_or(to);

        let mut seen = HashSet::from([from]);
        let mut queue = VecDeque::from([(from, 0usize)]);
        let mut warned = false;

        while let Some((node, distance)) = queue.pop_front() {
            if node == to {
                return Some(distance);
            }
            if self.depth_exceeded(distance + 1) {
                if !warned {
                    warn!(
                        "Maximum inheritance depth reached while computing distance from '{}' to '{}'",
                        self.name(from),
                        self.name(to)
                    );
                    warned = true;
                }
                continue;
            }
            for edge in self.base_classes(node) {
                if seen.insert(edge.class) {
                    queue.push_back((edge.class, distance + 1));
                }
            }
        }

        None
    }

    /// Protection with which members of `base` are reachable from `entity`.
    ///
    /// Starts from `protection` and caps it along each path (a protected
    /// edge caps public to protected, a private edge caps to private). When
    /// several paths exist the most permissive one wins. `None` if `base` is
    /// not an ancestor of `entity`.
    pub fn inherited_protection_level(
        &self,
        entity: EntityId,
        base: EntityId,
        protection: Protection,
    ) -> Option<Protection> {
        if entity == base {
            return Some(protection);
        }

        let mut best: Option<Protection> = None;
        let mut seen = HashSet::from([(entity, protection)]);
        let mut stack = vec![(entity, protection, 0usize)];

        while let Some((node, prot, depth)) = stack.pop() {
            if self.depth_exceeded(depth + 1) {
                continue;
            }
            for edge in self.base_classes(node) {
                let capped = prot.capped_by(edge.protection);
                if edge.class == base {
                    best = Some(match best {
                        Some(current) if rank(current) <= rank(capped) => current,
                        _ => capped,
                    });
                } else if seen.insert((edge.class, capped)) {
                    stack.push((edge.class, capped, depth + 1));
                }
            }
        }

        best
    }
}

fn rank(protection: Protection) -> u8 {
    match protection {
        Protection::Public => 0,
        Protection::Protected => 1,
        Protection::Package => 2,
        Protection::Private => 3,
    }
}
