use super::{Heuristic, INFINITE_COST};
use crate::core::SokobanState;

/// Admissible estimate: for every box not yet stored, the Manhattan distance to
/// the nearest storage cell. Obstacles and other boxes are ignored.
#[derive(Debug, Default, Clone, Copy)]
pub struct ManhattanHeuristic;

impl Heuristic for ManhattanHeuristic {
    fn estimate(&mut self, state: &SokobanState) -> f64 {
        let mut total = 0;
        for b in state.unsolved_boxes() {
            match state.storage().iter().map(|s| b.manhattan(*s)).min() {
                Some(d) => total += d,
                None => return INFINITE_COST,
            }
        }
        total as f64
    }

    fn name(&self) -> &str {
        "manhattan"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::setup_from_strings;

    #[test]
    fn test_sum_of_nearest_storage() {
        // 箱 (1,1) -> (4,1) = 3, 箱 (2,3) -> (4,1) = 4 (同じ格納場所を共有してよい)
        let state = setup_from_strings(&["@----", "-$--.", "-----", "--$--"]).unwrap();
        assert_eq!(ManhattanHeuristic.estimate(&state), 7.0);
    }

    #[test]
    fn test_ignores_obstacles_and_stored_boxes() {
        let state = setup_from_strings(&["@$#.*"]).unwrap();
        assert_eq!(ManhattanHeuristic.estimate(&state), 2.0);
    }

    #[test]
    fn test_goal_and_missing_storage() {
        let goal = setup_from_strings(&["@*-"]).unwrap();
        assert_eq!(ManhattanHeuristic.estimate(&goal), 0.0);

        let no_storage = setup_from_strings(&["@$-"]).unwrap();
        assert_eq!(ManhattanHeuristic.estimate(&no_storage), INFINITE_COST);
    }
}
