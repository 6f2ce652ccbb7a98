pub mod zobrist;

use crate::core::{Action, Direction, SokobanState};

/// 1 手の移動を試みる。移動できなければ None。
///
/// ロボットは障害物・壁・他のロボットには入れない。箱がある場合は同じ方向に
/// 押し、押し先が空いていなければ移動できない。
pub fn apply_action(state: &SokobanState, action: Action) -> Option<SokobanState> {
    let robot = *state.robots.get(action.robot)?;
    let target = robot.step(action.direction);

    if state.layout.is_blocked(target) || state.has_robot(target) {
        return None;
    }

    let mut boxes = state.boxes.clone();
    if state.has_box(target) {
        let pushed = target.step(action.direction);
        if state.layout.is_blocked(pushed) || state.has_box(pushed) || state.has_robot(pushed) {
            return None;
        }
        boxes.remove(&target);
        boxes.insert(pushed);
    }

    let mut robots = state.robots.clone();
    robots[action.robot] = target;

    Some(SokobanState::new(state.layout.clone(), robots, boxes))
}

/// 後続状態の生成 (ロボット番号順、各ロボットは Direction::ALL の順)
pub fn successors(state: &SokobanState) -> Vec<(Action, SokobanState)> {
    let mut result = Vec::with_capacity(state.robots.len() * 4);
    for robot in 0..state.robots.len() {
        for direction in Direction::ALL {
            let action = Action::new(robot, direction);
            if let Some(next) = apply_action(state, action) {
                result.push((action, next));
            }
        }
    }
    result
}

/// 手順を順に適用する。途中で不正な手があれば None。
pub fn replay(state: &SokobanState, actions: &[Action]) -> Option<SokobanState> {
    actions
        .iter()
        .try_fold(state.clone(), |s, &a| apply_action(&s, a))
}

pub fn is_goal(state: &SokobanState) -> bool {
    state.is_goal()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{setup_from_strings, Position};

    #[test]
    fn test_push_box() {
        let state = setup_from_strings(&["-@$-."]).unwrap();
        let next = apply_action(&state, Action::new(0, Direction::Right)).unwrap();
        assert_eq!(next.robots, vec![Position::new(2, 0)]);
        assert!(next.has_box(Position::new(3, 0)));
        assert!(!next.has_box(Position::new(2, 0)));

        let done = apply_action(&next, Action::new(0, Direction::Right)).unwrap();
        assert!(is_goal(&done));
    }

    #[test]
    fn test_blocked_moves() {
        // 箱の先が壁・障害物・箱・ロボットなら押せない
        let wall = setup_from_strings(&["-@$"]).unwrap();
        assert!(apply_action(&wall, Action::new(0, Direction::Right)).is_none());
        assert!(apply_action(&wall, Action::new(0, Direction::Up)).is_none());

        let obstacle = setup_from_strings(&["@$#"]).unwrap();
        assert!(apply_action(&obstacle, Action::new(0, Direction::Right)).is_none());

        let two_boxes = setup_from_strings(&["@$$."]).unwrap();
        assert!(apply_action(&two_boxes, Action::new(0, Direction::Right)).is_none());

        let robots = setup_from_strings(&["@$@-"]).unwrap();
        assert!(apply_action(&robots, Action::new(0, Direction::Right)).is_none());
        assert!(apply_action(&robots, Action::new(1, Direction::Left)).is_none());
        assert!(apply_action(&robots, Action::new(1, Direction::Right)).is_some());
        assert!(apply_action(&robots, Action::new(2, Direction::Right)).is_none());
    }

    #[test]
    fn test_successors_order() {
        let state = setup_from_strings(&["---", "-@-", "---"]).unwrap();
        let dirs: Vec<Direction> = successors(&state)
            .iter()
            .map(|(a, _)| a.direction)
            .collect();
        assert_eq!(dirs, Direction::ALL.to_vec());
    }

    #[test]
    fn test_replay() {
        let state = setup_from_strings(&["-@$-."]).unwrap();
        let right = Action::new(0, Direction::Right);
        assert!(replay(&state, &[right, right]).unwrap().is_goal());
        assert!(replay(&state, &[right, right, right]).is_none());
    }
}
