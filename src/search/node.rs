use crate::core::{Action, SokobanState};
use serde::{Deserialize, Serialize};

/// 探索木のノード。親は arena 内の添字で持つ。
#[derive(Debug, Clone)]
pub struct SearchNode {
    pub state: SokobanState,
    pub gval: u32,
    pub hval: f64,
    pub parent: Option<usize>,
    pub action: Option<Action>,
}

impl SearchNode {
    pub fn root(state: SokobanState, hval: f64) -> Self {
        SearchNode {
            state,
            gval: 0,
            hval,
            parent: None,
            action: None,
        }
    }
}

/// 初期状態からゴールまでの経路
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Solution {
    /// 初期状態を含む、通過した全状態
    pub path: Vec<SokobanState>,
    pub actions: Vec<Action>,
    pub gval: u32,
}

impl Solution {
    /// 探索で作った解なら常に Some (path は初期状態を含む)
    pub fn final_state(&self) -> Option<&SokobanState> {
        self.path.last()
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}

/// 親をたどって経路を復元する
pub fn trace_path(nodes: &[SearchNode], goal: usize) -> Solution {
    let mut path = Vec::new();
    let mut actions = Vec::new();
    let mut current = Some(goal);
    while let Some(idx) = current {
        let node = &nodes[idx];
        path.push(node.state.clone());
        if let Some(a) = node.action {
            actions.push(a);
        }
        current = node.parent;
    }
    path.reverse();
    actions.reverse();
    Solution {
        path,
        actions,
        gval: nodes[goal].gval,
    }
}

/// `idx` の祖先 (自身を含む) に同じ状態があるか
pub fn on_path(nodes: &[SearchNode], idx: usize, state: &SokobanState) -> bool {
    let mut current = Some(idx);
    while let Some(i) = current {
        let node = &nodes[i];
        if node.state.robots == state.robots && node.state.boxes == state.boxes {
            return true;
        }
        current = node.parent;
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{setup_from_strings, Direction};

    #[test]
    fn test_trace_path() {
        let state = setup_from_strings(&["-@$-."]).unwrap();
        let action = Action::new(0, Direction::Right);
        let next = crate::logic::apply_action(&state, action).unwrap();
        let nodes = vec![
            SearchNode::root(state.clone(), 2.0),
            SearchNode {
                state: next.clone(),
                gval: 1,
                hval: 1.0,
                parent: Some(0),
                action: Some(action),
            },
        ];

        let solution = trace_path(&nodes, 1);
        assert_eq!(solution.actions, vec![action]);
        assert_eq!(solution.final_state(), Some(&next));
        assert!(on_path(&nodes, 1, &state));
    }

    #[test]
    fn test_deserialized_empty_path_has_no_final_state() {
        let solution: Solution =
            serde_json::from_str(r#"{"path": [], "actions": [], "gval": 0}"#).unwrap();
        assert!(solution.is_empty());
        assert_eq!(solution.final_state(), None);
    }
}
