use crate::core::{Position, SokobanState};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

// Zobrist Hash用の乱数テーブル (盤面サイズごとに作る)
pub struct ZobristHasher {
    width: i32,
    boxes: Vec<u64>,
    robots: Vec<u64>,
}

impl ZobristHasher {
    pub fn new(width: i32, height: i32, seed: u64) -> Self {
        let cells = (width.max(0) * height.max(0)) as usize;
        let mut rng = StdRng::seed_from_u64(seed);
        ZobristHasher {
            width,
            boxes: (0..cells).map(|_| rng.gen()).collect(),
            robots: (0..cells).map(|_| rng.gen()).collect(),
        }
    }

    pub fn for_state(state: &SokobanState, seed: u64) -> Self {
        Self::new(state.width(), state.height(), seed)
    }

    fn index(&self, pos: Position) -> usize {
        (pos.y * self.width + pos.x) as usize
    }

    pub fn compute_hash(&self, state: &SokobanState) -> u64 {
        let mut hash = 0;

        for &b in &state.boxes {
            hash ^= self.boxes[self.index(b)];
        }

        // ロボットは番号で区別する (入れ替えると別の状態)
        for (i, &r) in state.robots.iter().enumerate() {
            hash ^= self.robots[self.index(r)].rotate_left(i as u32);
        }

        hash
    }
}
