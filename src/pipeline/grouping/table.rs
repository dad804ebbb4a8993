//! Tables that run across a page break (property schedules, boundary
//! measurements, tax rolls).

/// Lines at each page boundary inspected for table rows.
const BOUNDARY_LINES: usize = 3;

/// Minimum ratio of tabular lines for a boundary to count as tabular.
const TABULAR_THRESHOLD: f64 = 0.60;

/// Both sides of a page break look like rows of the same table.
pub fn is_table_continuation(previous: &str, next: &str) -> bool {
    is_tail_tabular(previous) && is_head_tabular(next)
}

fn is_tail_tabular(text: &str) -> bool {
    let lines: Vec<&str> = content_lines(text).rev().take(BOUNDARY_LINES).collect();
    boundary_is_tabular(&lines)
}

fn is_head_tabular(text: &str) -> bool {
    let lines: Vec<&str> = content_lines(text).take(BOUNDARY_LINES).collect();
    boundary_is_tabular(&lines)
}

fn content_lines(text: &str) -> impl DoubleEndedIterator<Item = &str> {
    text.lines().filter(|l| !l.trim().is_empty())
}

fn boundary_is_tabular(lines: &[&str]) -> bool {
    if lines.is_empty() {
        return false;
    }
    let tabular_count = lines.iter().filter(|l| is_tabular_line(l)).count();
    tabular_count as f64 / lines.len() as f64 >= TABULAR_THRESHOLD
}

/// A line looks tabular if it has several columns separated by pipes or
/// aligned multi-space gaps. Tabs are already spaces after sanitation.
fn is_tabular_line(line: &str) -> bool {
    let trimmed = line.trim();
    if trimmed.len() < 5 {
        return false;
    }

    trimmed.matches('|').count() >= 2 || count_multi_space_gaps(trimmed) >= 2
}

/// Count runs of 3+ consecutive spaces.
fn count_multi_space_gaps(text: &str) -> usize {
    let mut count = 0;
    let mut gap_len = 0;

    for ch in text.chars() {
        if ch == ' ' {
            gap_len += 1;
            if gap_len == 3 {
                count += 1;
            }
        } else {
            gap_len = 0;
        }
    }

    count
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCHEDULE_TAIL: &str = "Relación de fincas:\n\
        Finca La Esperanza    12 caballerías    Oriente\n\
        Finca San Rafael    8 caballerías    Oriente\n\
        Colonia Mercedes    3 caballerías    Camagüey";

    const SCHEDULE_HEAD: &str = "Hacienda Santa Ana    20 caballerías    Oriente\n\
        Solar número 4    1 caballería    Holguín\n\
        Total de la relación: cuarenta y cuatro caballerías.";

    #[test]
    fn multi_space_columns_are_tabular() {
        assert!(is_tabular_line("Finca La Esperanza    12 caballerías    Oriente"));
        assert!(is_tabular_line("Lindero | Norte | 120 varas"));
        assert!(!is_tabular_line("comparece ante mí el señor Pedro Ruiz"));
        assert!(!is_tabular_line("a b"));
    }

    #[test]
    fn counts_gaps_once_per_run() {
        assert_eq!(count_multi_space_gaps("a      b   c"), 2);
        assert_eq!(count_multi_space_gaps("a  b"), 0);
    }

    #[test]
    fn schedule_spanning_pages() {
        assert!(is_table_continuation(SCHEDULE_TAIL, SCHEDULE_HEAD));
    }

    #[test]
    fn prose_pages_not_tabular() {
        let prose = "comparece el señor Pedro Ruiz\nvecino de esta ciudad\ny dice:";
        assert!(!is_table_continuation(prose, SCHEDULE_HEAD));
        assert!(!is_table_continuation(SCHEDULE_TAIL, prose));
        assert!(!is_table_continuation("", ""));
    }
}
