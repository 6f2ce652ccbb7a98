use crate::core::{Layout, SokobanState};
use crate::logic::zobrist::ZobristHasher;
use std::sync::Arc;

#[derive(Clone, Copy, Debug)]
pub struct CacheEntry {
    pub hash: u64,
    pub hval: f64,
}

/// ヒューリスティック値のメモ化テーブル
///
/// 探索エンジンが所有し、ヒューリスティック名と盤面 (Layout) に紐づける。
/// どちらかが変われば中身は破棄される。ハッシュはロボットと箱の位置しか
/// 見ないので、障害物や格納場所の違いは Layout の比較で区別する。
///
/// テーブルは `bind` で確保し、盤面で取り得る状態数を上限にする。
pub struct HeuristicCache {
    entries: Vec<Option<CacheEntry>>,
    max_entries: usize,
    seed: u64,
    hasher: Option<ZobristHasher>,
    layout: Option<Arc<Layout>>,
    bound_to: Option<String>,
    pub hits: usize,
    pub misses: usize,
}

impl HeuristicCache {
    pub fn new(size_mb: usize, seed: u64) -> Self {
        let entry_size = std::mem::size_of::<Option<CacheEntry>>();
        let num_entries = ((size_mb * 1024 * 1024) / entry_size).max(1);
        Self {
            entries: Vec::new(),
            max_entries: num_entries,
            seed,
            hasher: None,
            layout: None,
            bound_to: None,
            hits: 0,
            misses: 0,
        }
    }

    pub fn clear(&mut self) {
        self.entries.fill(None);
        self.hits = 0;
        self.misses = 0;
    }

    /// 探索開始時に呼ぶ。違うヒューリスティックや盤面なら中身を捨てる。
    pub fn bind(&mut self, heuristic: &str, state: &SokobanState) {
        let same_heuristic = self.bound_to.as_deref() == Some(heuristic);
        let same_layout = self
            .layout
            .as_ref()
            .is_some_and(|l| Arc::ptr_eq(l, &state.layout) || **l == *state.layout);
        if !same_heuristic || !same_layout || self.entries.is_empty() {
            let wanted = self.max_entries.min(state_bound(state));
            if self.entries.len() == wanted {
                self.clear();
            } else {
                self.entries = vec![None; wanted];
                self.hits = 0;
                self.misses = 0;
            }
            self.bound_to = Some(heuristic.to_string());
            self.layout = Some(state.layout.clone());
            self.hasher = Some(ZobristHasher::for_state(state, self.seed));
        }
    }

    pub fn bound_to(&self) -> Option<&str> {
        self.bound_to.as_deref()
    }

    /// 確保済みのエントリ数 (bind 前は 0)
    pub fn capacity(&self) -> usize {
        self.entries.len()
    }

    pub fn hash(&self, state: &SokobanState) -> Option<u64> {
        self.hasher.as_ref().map(|h| h.compute_hash(state))
    }

    fn slot(&self, hash: u64) -> usize {
        (hash as usize) % self.entries.len().max(1)
    }

    pub fn get(&mut self, hash: u64) -> Option<f64> {
        match self.entries.get(self.slot(hash)).copied().flatten() {
            Some(entry) if entry.hash == hash => {
                self.hits += 1;
                Some(entry.hval)
            }
            _ => {
                self.misses += 1;
                None
            }
        }
    }

    /// 衝突したら新しい方で上書きする
    pub fn store(&mut self, hash: u64, hval: f64) {
        let idx = self.slot(hash);
        if let Some(slot) = self.entries.get_mut(idx) {
            *slot = Some(CacheEntry { hash, hval });
        }
    }

    pub fn len(&self) -> usize {
        self.entries.iter().filter(|e| e.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// 盤面で区別できる状態数の上限 (各ロボット・箱がどのマスにも居られるとした場合)
fn state_bound(state: &SokobanState) -> usize {
    let cells = (state.width().max(1) * state.height().max(1)) as usize;
    let movers = (state.robots.len() + state.boxes.len()) as u32;
    cells.saturating_pow(movers)
}
