use super::board::{Layout, SokobanState};
use super::types::Position;
use crate::error::{Result, SolverError};
use std::collections::BTreeSet;
use std::path::Path;
use std::sync::Arc;

/// 名前付きの組み込み問題
#[derive(Debug, Clone, Copy)]
pub struct Problem {
    pub name: &'static str,
    pub rows: &'static [&'static str],
}

impl Problem {
    pub fn state(&self) -> Result<SokobanState> {
        setup_from_strings(self.rows)
    }
}

/// 文字列配列 (外周の壁を含まない内側のみ) から初期状態を作る
///
/// `#` 障害物, `@` ロボット, `+` 格納場所上のロボット, `$` 箱,
/// `*` 格納場所上の箱, `.` 格納場所, ` ` / `-` / `_` 床
pub fn setup_from_strings<S: AsRef<str>>(rows: &[S]) -> Result<SokobanState> {
    let height = rows.len();
    if height == 0 {
        return Err(SolverError::EmptyPuzzle);
    }
    let width = rows[0].as_ref().chars().count();

    let mut layout = Layout::new(width as i32, height as i32);
    let mut robots = Vec::new();
    let mut boxes = BTreeSet::new();

    for (y, row) in rows.iter().enumerate() {
        let row = row.as_ref();
        let found = row.chars().count();
        if found != width {
            return Err(SolverError::RaggedRow {
                row: y,
                expected: width,
                found,
            });
        }

        for (x, tile) in row.chars().enumerate() {
            let pos = Position::new(x as i32, y as i32);
            match tile {
                ' ' | '-' | '_' => {}
                '#' => {
                    layout.obstacles.insert(pos);
                }
                '.' => {
                    layout.storage.insert(pos);
                }
                '$' => {
                    boxes.insert(pos);
                }
                '*' => {
                    boxes.insert(pos);
                    layout.storage.insert(pos);
                }
                '@' => robots.push(pos),
                '+' => {
                    robots.push(pos);
                    layout.storage.insert(pos);
                }
                _ => {
                    return Err(SolverError::UnknownTile {
                        tile,
                        row: y,
                        col: x,
                    })
                }
            }
        }
    }

    if robots.is_empty() {
        return Err(SolverError::NoRobot);
    }

    Ok(SokobanState::new(Arc::new(layout), robots, boxes))
}

/// 改行区切りのテキストから読み込む。空行と `;` で始まるコメント行は無視する。
pub fn parse_puzzle(text: &str) -> Result<SokobanState> {
    let rows: Vec<&str> = text
        .lines()
        .map(|l| l.trim_end_matches('\r'))
        .filter(|l| !l.is_empty() && !l.starts_with(';'))
        .collect();
    setup_from_strings(&rows)
}

pub fn load_puzzle_file<P: AsRef<Path>>(path: P) -> Result<SokobanState> {
    let text = std::fs::read_to_string(path)?;
    parse_puzzle(&text)
}

/// 番号・名前・ファイルパスのいずれかから問題を解決する
pub fn resolve_problem(spec: &str) -> Result<(String, SokobanState)> {
    if let Some(problem) = find_problem(spec) {
        return Ok((problem.name.to_string(), problem.state()?));
    }
    let path = Path::new(spec);
    if path.is_file() {
        let name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("puzzle")
            .to_string();
        return Ok((name, load_puzzle_file(path)?));
    }
    Err(SolverError::UnknownProblem(spec.to_string()))
}

pub fn find_problem(spec: &str) -> Option<Problem> {
    if let Ok(index) = spec.parse::<usize>() {
        return PROBLEMS.get(index).copied();
    }
    PROBLEMS.iter().find(|p| p.name == spec).copied()
}

pub static PROBLEMS: &[Problem] = &[
    Problem {
        name: "warmup",
        rows: &[
            "-----", //
            "-@$-.",
            "-----",
        ],
    },
    Problem {
        name: "two_lanes",
        rows: &[
            "------", //
            "-@$-.-",
            "--$-.-",
            "------",
            "------",
        ],
    },
    Problem {
        name: "pillars",
        rows: &[
            "-------", //
            "-#-$-.-",
            "-@-$-.-",
            "-#-----",
            "-------",
        ],
    },
    Problem {
        name: "twins",
        rows: &[
            "@----", //
            "-$--.",
            "-$--.",
            "@----",
        ],
    },
    Problem {
        name: "detour",
        rows: &[
            "-------", //
            "-@-----",
            "--$#---",
            "-------",
            "---.---",
            "-------",
        ],
    },
    Problem {
        name: "crowded",
        rows: &[
            "--------", //
            "-@$--.--",
            "--$--.--",
            "--$--.--",
            "--------",
            "--------",
        ],
    },
    Problem {
        name: "solved",
        rows: &[
            "---", //
            "-*-",
            "-@-",
        ],
    },
    Problem {
        name: "cornered",
        rows: &[
            "$---", //
            "----",
            "-@.-",
            "----",
        ],
    },
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_tiles() {
        let state = setup_from_strings(&["#.$", "*+-", "@ _"]).unwrap();
        assert_eq!(state.width(), 3);
        assert_eq!(state.height(), 3);
        assert!(state.obstacles().contains(&Position::new(0, 0)));
        assert_eq!(
            state.storage().iter().copied().collect::<Vec<_>>(),
            vec![Position::new(0, 1), Position::new(1, 0), Position::new(1, 1)]
        );
        assert_eq!(
            state.boxes.iter().copied().collect::<Vec<_>>(),
            vec![Position::new(0, 1), Position::new(2, 0)]
        );
        // ロボットは出現順 (行優先)
        assert_eq!(state.robots, vec![Position::new(1, 1), Position::new(0, 2)]);
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(
            setup_from_strings::<&str>(&[]),
            Err(SolverError::EmptyPuzzle)
        ));
        assert!(matches!(
            setup_from_strings(&["@$.", "--"]),
            Err(SolverError::RaggedRow { row: 1, expected: 3, found: 2 })
        ));
        assert!(matches!(
            setup_from_strings(&["@x."]),
            Err(SolverError::UnknownTile { tile: 'x', row: 0, col: 1 })
        ));
        assert!(matches!(
            setup_from_strings(&["-$."]),
            Err(SolverError::NoRobot)
        ));
    }

    #[test]
    fn test_parse_puzzle_skips_comments() {
        let state = parse_puzzle("; warmup\r\n-@$.\r\n\r\n----\r\n").unwrap();
        assert_eq!(state.height(), 2);
        assert_eq!(state.width(), 4);
    }

    #[test]
    fn test_builtin_problems_parse() {
        for problem in PROBLEMS {
            let state = problem.state().unwrap();
            assert!(!state.robots.is_empty(), "{}", problem.name);
            assert!(state.storage().len() >= state.boxes.len(), "{}", problem.name);
        }
        assert_eq!(find_problem("0").map(|p| p.name), Some("warmup"));
        assert_eq!(find_problem("twins").map(|p| p.name), Some("twins"));
        assert!(find_problem("99").is_none());
        assert!(matches!(
            resolve_problem("no_such_problem"),
            Err(SolverError::UnknownProblem(_))
        ));
    }
}
