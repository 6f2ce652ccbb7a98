use crate::core::{Position, SokobanState};
use crate::search::Solution;
use crossterm::style::{StyledContent, Stylize};

fn tile(state: &SokobanState, pos: Position) -> char {
    let storage = state.layout.is_storage(pos);
    if state.obstacles().contains(&pos) {
        '#'
    } else if state.has_box(pos) {
        if storage {
            '*'
        } else {
            '$'
        }
    } else if state.has_robot(pos) {
        if storage {
            '+'
        } else {
            '@'
        }
    } else if storage {
        '.'
    } else {
        '-'
    }
}

fn styled(c: char) -> StyledContent<char> {
    match c {
        '#' => c.dark_grey(),
        '$' => c.yellow().bold(),
        '*' => c.green().bold(),
        '@' | '+' => c.cyan().bold(),
        '.' => c.red(),
        _ => c.dark_grey().dim(),
    }
}

/// パズルのテキスト形式に戻す (床は '-')
pub fn render_plain(state: &SokobanState) -> String {
    let mut out = String::new();
    for y in 0..state.height() {
        for x in 0..state.width() {
            out.push(tile(state, Position::new(x, y)));
        }
        out.push('\n');
    }
    out
}

/// 端末向けの色付き表示
pub fn render_styled(state: &SokobanState) -> String {
    let mut out = String::new();

    // X軸ラベル
    out.push_str("   ");
    for x in 0..state.width() {
        out.push_str(&format!("{}", x % 10));
    }
    out.push('\n');

    for y in 0..state.height() {
        out.push_str(&format!("{:2} ", y));
        for x in 0..state.width() {
            let c = tile(state, Position::new(x, y));
            out.push_str(&format!("{}", styled(c)));
        }
        out.push('\n');
    }
    out
}

pub fn print_state(state: &SokobanState) {
    print!("{}", render_styled(state));
}

pub fn print_solution(solution: &Solution) {
    println!("{}", format!("=== Solution: {} moves ===", solution.gval).bold());
    if let Some(initial) = solution.path.first() {
        print_state(initial);
    }
    for (i, (action, state)) in solution
        .actions
        .iter()
        .zip(solution.path.iter().skip(1))
        .enumerate()
    {
        println!();
        println!("{} {}", format!("[{}]", i + 1).bold(), action);
        print_state(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::setup_from_strings;

    #[test]
    fn test_render_plain_uses_puzzle_tiles() {
        let rows = ["#-$.", "+*@-"];
        let state = setup_from_strings(&rows).unwrap();
        assert_eq!(render_plain(&state), "#-$.\n+*@-\n");
        assert_eq!(state.to_string(), render_plain(&state));
    }

    #[test]
    fn test_render_plain_parses_back() {
        let state = setup_from_strings(&["-@$ .", "#  *-"]).unwrap();
        let text = render_plain(&state);
        let rows: Vec<&str> = text.lines().collect();
        assert_eq!(setup_from_strings(&rows).unwrap(), state);
    }

    #[test]
    fn test_render_styled_contains_every_row() {
        let state = setup_from_strings(&["-@$-.", "-----"]).unwrap();
        let text = render_styled(&state);
        assert_eq!(text.lines().count(), 3);
        assert!(text.lines().nth(1).unwrap().starts_with(" 0 "));
    }
}
