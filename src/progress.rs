//! Goal tree arithmetic that does not touch the database.
//!
//! Goals reference each other by id only. Walks go through [`GoalTree`], an
//! index of one user's goals keyed by id, and never follow live links.

use std::collections::{HashMap, HashSet};

use crate::entities::goal;
use crate::error::AppError;

pub const MIN_PERCENTAGE: f64 = 0.0;
pub const MAX_PERCENTAGE: f64 = 100.0;

/// One level of aggregation: a goal without children keeps its own value,
/// otherwise the unweighted mean of the direct children wins.
pub fn aggregate_completion(own: f64, children: &[f64]) -> f64 {
    if children.is_empty() {
        return own;
    }
    children.iter().sum::<f64>() / children.len() as f64
}

pub fn ensure_percentage(label: &str, value: f64) -> Result<(), AppError> {
    if value.is_nan() || !(MIN_PERCENTAGE..=MAX_PERCENTAGE).contains(&value) {
        return Err(AppError::Validation(format!(
            "{label} must be between {MIN_PERCENTAGE} and {MAX_PERCENTAGE} (got {value})"
        )));
    }
    Ok(())
}

pub struct GoalTree {
    nodes: HashMap<i64, goal::Model>,
    children: HashMap<i64, Vec<i64>>,
}

impl GoalTree {
    pub fn new(goals: Vec<goal::Model>) -> Self {
        let mut children: HashMap<i64, Vec<i64>> = HashMap::new();
        for goal in &goals {
            if let Some(parent_id) = goal.parent_goal_id {
                children.entry(parent_id).or_default().push(goal.id);
            }
        }
        for ids in children.values_mut() {
            ids.sort_unstable();
        }
        let nodes = goals.into_iter().map(|goal| (goal.id, goal)).collect();
        Self { nodes, children }
    }

    /// Parent chain of `id`, nearest first. A revisited id means the stored
    /// data already contains a cycle.
    pub fn ancestors(&self, id: i64) -> Result<Vec<&goal::Model>, AppError> {
        let start = self
            .nodes
            .get(&id)
            .ok_or_else(|| AppError::NotFound(format!("goal id {id}")))?;
        let mut seen = HashSet::from([id]);
        let mut chain = Vec::new();
        let mut next = start.parent_goal_id;
        while let Some(parent_id) = next {
            if !seen.insert(parent_id) {
                return Err(AppError::Validation(format!(
                    "goal id {id} has cyclic ancestry through goal id {parent_id}"
                )));
            }
            let Some(parent) = self.nodes.get(&parent_id) else {
                break;
            };
            chain.push(parent);
            next = parent.parent_goal_id;
        }
        Ok(chain)
    }

    /// True when hanging `goal_id` under `new_parent_id` would close a loop.
    pub fn would_create_cycle(&self, goal_id: i64, new_parent_id: i64) -> bool {
        if goal_id == new_parent_id {
            return true;
        }
        let mut seen = HashSet::new();
        let mut next = Some(new_parent_id);
        while let Some(current) = next {
            if current == goal_id {
                return true;
            }
            if !seen.insert(current) {
                // Pre-existing loop above the new parent; refuse to extend it.
                return true;
            }
            next = self.nodes.get(&current).and_then(|node| node.parent_goal_id);
        }
        false
    }

    /// Pre-order walk below `root_id`, inclusive, with depth from the root.
    pub fn subtree(&self, root_id: i64) -> Result<Vec<(usize, &goal::Model)>, AppError> {
        if !self.nodes.contains_key(&root_id) {
            return Err(AppError::NotFound(format!("goal id {root_id}")));
        }
        let mut visited = HashSet::new();
        let mut ordered = Vec::new();
        let mut stack = vec![(0usize, root_id)];
        while let Some((depth, id)) = stack.pop() {
            if !visited.insert(id) {
                continue;
            }
            let Some(node) = self.nodes.get(&id) else {
                continue;
            };
            ordered.push((depth, node));
            if let Some(child_ids) = self.children.get(&id) {
                for child_id in child_ids.iter().rev() {
                    stack.push((depth + 1, *child_id));
                }
            }
        }
        Ok(ordered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn node(id: i64, parent: Option<i64>, pct: f64) -> goal::Model {
        let now = Utc::now();
        goal::Model {
            id,
            user_id: "u1".to_string(),
            parent_goal_id: parent,
            goal_type: "monthly".to_string(),
            description: format!("goal {id}"),
            deadline: None,
            status: "active".to_string(),
            phase: "research".to_string(),
            priority: "medium".to_string(),
            completion_percentage: pct,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn leaf_keeps_its_own_value() {
        for value in [0.0, 12.5, 99.9, 100.0] {
            assert_eq!(aggregate_completion(value, &[]), value);
        }
    }

    #[test]
    fn parent_takes_unweighted_mean() {
        let mean = aggregate_completion(0.0, &[50.0, 75.0]);
        assert!((mean - 62.5).abs() < 1e-9);
    }

    #[test]
    fn one_stalled_child_drags_the_mean() {
        let mean = aggregate_completion(0.0, &[100.0, 100.0, 100.0, 0.0]);
        assert!((mean - 75.0).abs() < 1e-9);
    }

    #[test]
    fn percentage_bounds_are_inclusive() {
        assert!(ensure_percentage("completion percentage", 0.0).is_ok());
        assert!(ensure_percentage("completion percentage", 100.0).is_ok());
        assert!(ensure_percentage("completion percentage", -0.1).is_err());
        assert!(ensure_percentage("completion percentage", 100.1).is_err());
        assert!(ensure_percentage("completion percentage", f64::NAN).is_err());
    }

    #[test]
    fn cycle_detection_covers_self_and_descendants() {
        let tree = GoalTree::new(vec![
            node(1, None, 0.0),
            node(2, Some(1), 0.0),
            node(3, Some(2), 0.0),
            node(4, None, 0.0),
        ]);
        assert!(tree.would_create_cycle(1, 1));
        assert!(tree.would_create_cycle(1, 3));
        assert!(tree.would_create_cycle(2, 3));
        assert!(!tree.would_create_cycle(3, 4));
        assert!(!tree.would_create_cycle(4, 3));
    }

    #[test]
    fn ancestors_walk_to_root_and_flag_loops() {
        let tree = GoalTree::new(vec![
            node(1, None, 0.0),
            node(2, Some(1), 0.0),
            node(3, Some(2), 0.0),
        ]);
        let chain: Vec<i64> = tree
            .ancestors(3)
            .expect("ancestors")
            .iter()
            .map(|goal| goal.id)
            .collect();
        assert_eq!(chain, vec![2, 1]);

        let looped = GoalTree::new(vec![node(5, Some(6), 0.0), node(6, Some(5), 0.0)]);
        match looped.ancestors(5) {
            Err(AppError::Validation(message)) => assert!(message.contains("cyclic")),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn subtree_is_preorder_with_depths() {
        let tree = GoalTree::new(vec![
            node(1, None, 0.0),
            node(2, Some(1), 0.0),
            node(3, Some(1), 0.0),
            node(4, Some(2), 0.0),
        ]);
        let walk: Vec<(usize, i64)> = tree
            .subtree(1)
            .expect("subtree")
            .into_iter()
            .map(|(depth, goal)| (depth, goal.id))
            .collect();
        assert_eq!(walk, vec![(0, 1), (1, 2), (2, 4), (1, 3)]);
    }
}
