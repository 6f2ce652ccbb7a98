//! # Deadlock Detection
//!
//! Recognises states from which no sequence of pushes can store every box.
//! The checks run in a fixed order and the first one that fires is reported:
//!
//! 0. **Insufficient storage**: fewer storage cells than boxes.
//! 1. **Corner**: an unsolved box in a grid corner.
//! 2. **Pinned**: an unsolved box blocked on two perpendicular sides.
//! 3. **Frozen row pair**: a box blocked vertically next to a horizontal
//!    neighbour box that is blocked vertically as well.
//! 4. **Frozen column pair**: the same with the axes swapped.
//! 5. **Stuck on wall**: a box on the boundary with a box or obstacle beside it
//!    along that boundary.
//! 6. **Wall storage shortage**: a boundary wall holding more unsolved boxes
//!    than free storage cells.
//!
//! Checks 1 to 5 run per unsolved box (ascending position order) before the
//! aggregate check 6. "Blocked" means an obstacle or the implicit outer wall.

use crate::core::{Direction, Layout, Position, SokobanState};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Wall {
    Left,
    Right,
    Top,
    Bottom,
}

impl Wall {
    pub const ALL: [Wall; 4] = [Wall::Left, Wall::Right, Wall::Top, Wall::Bottom];

    pub fn contains(self, layout: &Layout, pos: Position) -> bool {
        match self {
            Wall::Left => pos.x == 0,
            Wall::Right => pos.x == layout.width - 1,
            Wall::Top => pos.y == 0,
            Wall::Bottom => pos.y == layout.height - 1,
        }
    }

    /// 壁に沿った 2 方向
    fn along(self) -> [Direction; 2] {
        match self {
            Wall::Left | Wall::Right => [Direction::Down, Direction::Up],
            Wall::Top | Wall::Bottom => [Direction::Right, Direction::Left],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeadlockReason {
    InsufficientStorage { boxes: usize, storage: usize },
    Corner(Position),
    Pinned(Position),
    FrozenRowPair { pos: Position, neighbor: Position },
    FrozenColumnPair { pos: Position, neighbor: Position },
    StuckOnWall { pos: Position, wall: Wall },
    WallStorageShortage { wall: Wall, boxes: usize, storage: usize },
}

impl fmt::Display for DeadlockReason {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            DeadlockReason::InsufficientStorage { boxes, storage } => {
                write!(f, "{} boxes but only {} storage cells", boxes, storage)
            }
            DeadlockReason::Corner(pos) => write!(f, "box in corner at {}", pos),
            DeadlockReason::Pinned(pos) => write!(f, "box pinned at {}", pos),
            DeadlockReason::FrozenRowPair { pos, neighbor } => {
                write!(f, "boxes at {} and {} freeze each other", pos, neighbor)
            }
            DeadlockReason::FrozenColumnPair { pos, neighbor } => {
                write!(f, "boxes at {} and {} freeze each other", pos, neighbor)
            }
            DeadlockReason::StuckOnWall { pos, wall } => {
                write!(f, "box at {} stuck on {:?} wall", pos, wall)
            }
            DeadlockReason::WallStorageShortage {
                wall,
                boxes,
                storage,
            } => write!(
                f,
                "{} boxes on {:?} wall but {} free storage cells",
                boxes, wall, storage
            ),
        }
    }
}

/// 1 つの箱の周囲 (上下左右が塞がっているか)
struct Surroundings<'a> {
    state: &'a SokobanState,
    pos: Position,
    up: bool,
    down: bool,
    left: bool,
    right: bool,
}

impl<'a> Surroundings<'a> {
    fn new(state: &'a SokobanState, pos: Position) -> Self {
        let blocked = |d| state.layout.is_blocked(pos.step(d));
        Surroundings {
            state,
            pos,
            up: blocked(Direction::Up),
            down: blocked(Direction::Down),
            left: blocked(Direction::Left),
            right: blocked(Direction::Right),
        }
    }

    /// `dir` 側の隣が箱で、その箱が `across` のどちらかで塞がっている
    fn frozen_neighbor(&self, dir: Direction, across: [Direction; 2]) -> Option<Position> {
        let neighbor = self.pos.step(dir);
        let layout = &self.state.layout;
        (self.state.has_box(neighbor)
            && across.iter().any(|&d| layout.is_blocked(neighbor.step(d))))
        .then_some(neighbor)
    }
}

type BoxCheck = fn(&Surroundings) -> Option<DeadlockReason>;

const BOX_CHECKS: [BoxCheck; 5] = [
    corner,
    pinned,
    frozen_row_pair,
    frozen_column_pair,
    stuck_on_wall,
];

fn corner(s: &Surroundings) -> Option<DeadlockReason> {
    s.state
        .layout
        .corners()
        .contains(&s.pos)
        .then_some(DeadlockReason::Corner(s.pos))
}

fn pinned(s: &Surroundings) -> Option<DeadlockReason> {
    ((s.up || s.down) && (s.left || s.right)).then_some(DeadlockReason::Pinned(s.pos))
}

fn frozen_row_pair(s: &Surroundings) -> Option<DeadlockReason> {
    if !(s.up || s.down) {
        return None;
    }
    let vertical = [Direction::Up, Direction::Down];
    s.frozen_neighbor(Direction::Left, vertical)
        .or_else(|| s.frozen_neighbor(Direction::Right, vertical))
        .map(|neighbor| DeadlockReason::FrozenRowPair {
            pos: s.pos,
            neighbor,
        })
}

fn frozen_column_pair(s: &Surroundings) -> Option<DeadlockReason> {
    if !(s.left || s.right) {
        return None;
    }
    let horizontal = [Direction::Left, Direction::Right];
    s.frozen_neighbor(Direction::Up, horizontal)
        .or_else(|| s.frozen_neighbor(Direction::Down, horizontal))
        .map(|neighbor| DeadlockReason::FrozenColumnPair {
            pos: s.pos,
            neighbor,
        })
}

fn stuck_on_wall(s: &Surroundings) -> Option<DeadlockReason> {
    let state = s.state;
    Wall::ALL
        .into_iter()
        .filter(|w| w.contains(&state.layout, s.pos))
        .find(|w| {
            w.along().iter().any(|&d| {
                let next = s.pos.step(d);
                state.has_box(next) || state.obstacles().contains(&next)
            })
        })
        .map(|wall| DeadlockReason::StuckOnWall { pos: s.pos, wall })
}

fn wall_storage_shortage(state: &SokobanState) -> Option<DeadlockReason> {
    let layout = &state.layout;
    Wall::ALL.into_iter().find_map(|wall| {
        let boxes = state
            .unsolved_boxes()
            .filter(|b| wall.contains(layout, *b))
            .count();
        let storage = layout
            .storage
            .iter()
            .filter(|s| !state.has_box(**s) && wall.contains(layout, **s))
            .count();
        (storage < boxes).then_some(DeadlockReason::WallStorageShortage {
            wall,
            boxes,
            storage,
        })
    })
}

/// 最初に見つかったデッドロックの理由を返す。None なら (このチェックの範囲では) 解ける可能性がある。
pub fn detect_deadlock(state: &SokobanState) -> Option<DeadlockReason> {
    let boxes = state.boxes.len();
    let storage = state.storage().len();
    if storage < boxes {
        return Some(DeadlockReason::InsufficientStorage { boxes, storage });
    }

    for b in state.unsolved_boxes() {
        let surroundings = Surroundings::new(state, b);
        if let Some(reason) = BOX_CHECKS.iter().find_map(|check| check(&surroundings)) {
            return Some(reason);
        }
    }

    wall_storage_shortage(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::setup_from_strings;

    fn reason(rows: &[&str]) -> Option<DeadlockReason> {
        detect_deadlock(&setup_from_strings(rows).unwrap())
    }

    #[test]
    fn test_open_board_has_no_deadlock() {
        assert_eq!(reason(&["-----", "-@$-.", "-----"]), None);
    }

    #[test]
    fn test_stored_boxes_are_ignored() {
        // 角にあっても格納済みなら問題ない
        assert_eq!(reason(&["*---", "-@--", "----"]), None);
    }

    #[test]
    fn test_insufficient_storage() {
        assert_eq!(
            reason(&["-----", "-$$.-", "--@--"]),
            Some(DeadlockReason::InsufficientStorage {
                boxes: 2,
                storage: 1
            })
        );
    }

    #[test]
    fn test_corner() {
        assert_eq!(
            reason(&["$---", "-@.-", "----"]),
            Some(DeadlockReason::Corner(Position::new(0, 0)))
        );
        assert_eq!(
            reason(&["---.", "-@--", "---$"]),
            Some(DeadlockReason::Corner(Position::new(3, 2)))
        );
    }

    #[test]
    fn test_pinned_by_obstacles() {
        // (2,2) は上と左が障害物
        assert_eq!(
            reason(&["-----", "--#--", "-#$--", "---@.", "-----"]),
            Some(DeadlockReason::Pinned(Position::new(2, 2)))
        );
    }

    #[test]
    fn test_frozen_row_pair() {
        // 上が障害物の箱が 2 つ横に並ぶ
        assert_eq!(
            reason(&["------", "-##---", "-$$...", "---@--", "------"]),
            Some(DeadlockReason::FrozenRowPair {
                pos: Position::new(1, 2),
                neighbor: Position::new(2, 2)
            })
        );
    }

    #[test]
    fn test_frozen_column_pair() {
        // 右が障害物の箱が 2 つ縦に並ぶ
        assert_eq!(
            reason(&["-----", "--$#-", "--$#-", "@-..-", "-----"]),
            Some(DeadlockReason::FrozenColumnPair {
                pos: Position::new(2, 1),
                neighbor: Position::new(2, 2)
            })
        );
    }

    #[test]
    fn test_stuck_on_wall() {
        // 壁沿いの並びは先に pinned / frozen pair で検出されるので、述語を直接確かめる
        let state = setup_from_strings(&["-----", "$----", "$-@..", "-----"]).unwrap();
        let s = Surroundings::new(&state, Position::new(0, 1));
        assert_eq!(
            stuck_on_wall(&s),
            Some(DeadlockReason::StuckOnWall {
                pos: Position::new(0, 1),
                wall: Wall::Left
            })
        );
        assert!(matches!(
            detect_deadlock(&state),
            Some(DeadlockReason::FrozenColumnPair { .. })
        ));

        let state = setup_from_strings(&["-#$--", "-----", "-@.--"]).unwrap();
        let s = Surroundings::new(&state, Position::new(2, 0));
        assert_eq!(
            stuck_on_wall(&s),
            Some(DeadlockReason::StuckOnWall {
                pos: Position::new(2, 0),
                wall: Wall::Top
            })
        );

        let state = setup_from_strings(&["--$--", "-----", "-@.--"]).unwrap();
        let s = Surroundings::new(&state, Position::new(2, 0));
        assert_eq!(stuck_on_wall(&s), None);
    }

    #[test]
    fn test_wall_storage_shortage() {
        // 上の壁に箱が 1 つ、上の壁の格納場所は 0
        assert_eq!(
            reason(&["--$--", "-----", "-@.--"]),
            Some(DeadlockReason::WallStorageShortage {
                wall: Wall::Top,
                boxes: 1,
                storage: 0
            })
        );
        assert_eq!(reason(&["--$-.", "-----", "-@---"]), None);
    }

    #[test]
    fn test_first_reason_wins() {
        // (0,0) は角、(3,2) も角。座標昇順で (0,0) が先
        assert_eq!(
            reason(&["$--.", "-@-.", "---$"]),
            Some(DeadlockReason::Corner(Position::new(0, 0)))
        );
    }
}
