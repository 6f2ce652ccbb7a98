use super::types::Position;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

/// 盤面の不変部分 (サイズ・障害物・格納場所)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Layout {
    pub width: i32,
    pub height: i32,
    pub obstacles: BTreeSet<Position>,
    pub storage: BTreeSet<Position>,
}

impl Layout {
    pub fn new(width: i32, height: i32) -> Self {
        Layout {
            width,
            height,
            obstacles: BTreeSet::new(),
            storage: BTreeSet::new(),
        }
    }

    pub fn in_bounds(&self, pos: Position) -> bool {
        pos.x >= 0 && pos.y >= 0 && pos.x < self.width && pos.y < self.height
    }

    /// 障害物または外周の壁
    pub fn is_blocked(&self, pos: Position) -> bool {
        !self.in_bounds(pos) || self.obstacles.contains(&pos)
    }

    pub fn is_storage(&self, pos: Position) -> bool {
        self.storage.contains(&pos)
    }

    pub fn corners(&self) -> [Position; 4] {
        [
            Position::new(0, 0),
            Position::new(0, self.height - 1),
            Position::new(self.width - 1, 0),
            Position::new(self.width - 1, self.height - 1),
        ]
    }

    /// 矩形 (両端を含む) 内の障害物の数
    pub fn obstacles_between(&self, a: Position, b: Position) -> u32 {
        let (left, right) = (a.x.min(b.x), a.x.max(b.x));
        let (top, bottom) = (a.y.min(b.y), a.y.max(b.y));
        self.obstacles
            .iter()
            .filter(|o| o.x >= left && o.x <= right && o.y >= top && o.y <= bottom)
            .count() as u32
    }
}

/// 同一 Layout 内で状態を識別するキー
pub type StateKey = (Vec<Position>, BTreeSet<Position>);

/// 探索中の 1 局面。後続状態は常に新しい値として作られる。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SokobanState {
    pub layout: Arc<Layout>,
    /// ロボットの位置。添字がロボット番号。
    pub robots: Vec<Position>,
    pub boxes: BTreeSet<Position>,
}

impl SokobanState {
    pub fn new(layout: Arc<Layout>, robots: Vec<Position>, boxes: BTreeSet<Position>) -> Self {
        SokobanState {
            layout,
            robots,
            boxes,
        }
    }

    pub fn width(&self) -> i32 {
        self.layout.width
    }

    pub fn height(&self) -> i32 {
        self.layout.height
    }

    pub fn storage(&self) -> &BTreeSet<Position> {
        &self.layout.storage
    }

    pub fn obstacles(&self) -> &BTreeSet<Position> {
        &self.layout.obstacles
    }

    pub fn has_box(&self, pos: Position) -> bool {
        self.boxes.contains(&pos)
    }

    pub fn has_robot(&self, pos: Position) -> bool {
        self.robots.contains(&pos)
    }

    /// 格納場所に乗っていない箱 (座標昇順)
    pub fn unsolved_boxes(&self) -> impl Iterator<Item = Position> + '_ {
        self.boxes
            .iter()
            .copied()
            .filter(|b| !self.layout.is_storage(*b))
    }

    /// 全ての箱が格納場所にあればゴール
    pub fn is_goal(&self) -> bool {
        self.boxes.is_subset(&self.layout.storage)
    }

    pub fn key(&self) -> StateKey {
        (self.robots.clone(), self.boxes.clone())
    }
}

impl fmt::Display for SokobanState {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&crate::display::render_plain(self))
    }
}
