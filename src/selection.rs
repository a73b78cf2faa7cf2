use crate::error::SelectionError;

/// What the operator asked for at the file prompt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    Quit,
    Files {
        /// Zero-based, sorted, without duplicates
        indices: Vec<usize>,
        /// Numbers that were outside `1..=file_count`
        skipped: Vec<String>,
    },
}

/// Parse `all`, `q`/`quit`, or a comma separated list of 1-based numbers.
pub fn parse_selection(input: &str, file_count: usize) -> Result<Selection, SelectionError> {
    let input = input.trim().to_lowercase();

    match input.as_str() {
        "q" | "quit" => return Ok(Selection::Quit),
        "all" => {
            if file_count == 0 {
                return Err(SelectionError::NothingSelected(Vec::new()));
            }
            return Ok(Selection::Files {
                indices: (0..file_count).collect(),
                skipped: Vec::new(),
            });
        }
        _ => {}
    }

    let mut indices = Vec::new();
    let mut skipped = Vec::new();
    for part in input.split(',') {
        let part = part.trim();
        let number = match part.parse::<i64>() {
            Ok(number) => number,
            // Too many digits to be a file number, but still a number
            Err(_) if is_integer(part) => {
                skipped.push(part.to_string());
                continue;
            }
            Err(_) => return Err(SelectionError::InvalidNumber(part.to_string())),
        };

        match usize::try_from(number) {
            Ok(n) if (1..=file_count).contains(&n) => indices.push(n - 1),
            _ => skipped.push(part.to_string()),
        }
    }

    indices.sort_unstable();
    indices.dedup();

    if indices.is_empty() {
        return Err(SelectionError::NothingSelected(skipped));
    }
    Ok(Selection::Files { indices, skipped })
}

fn is_integer(s: &str) -> bool {
    let digits = s.strip_prefix(['+', '-']).unwrap_or(s);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn files(indices: &[usize]) -> Selection {
        Selection::Files {
            indices: indices.to_vec(),
            skipped: Vec::new(),
        }
    }

    #[test]
    fn test_parse_quit() {
        assert_eq!(parse_selection("q", 3), Ok(Selection::Quit));
        assert_eq!(parse_selection("  Q \n", 3), Ok(Selection::Quit));
        assert_eq!(parse_selection("quit", 3), Ok(Selection::Quit));
    }

    #[test]
    fn test_parse_all() {
        assert_eq!(parse_selection("ALL", 3), Ok(files(&[0, 1, 2])));
        assert_eq!(
            parse_selection("all", 0),
            Err(SelectionError::NothingSelected(Vec::new()))
        );
    }

    #[test]
    fn test_parse_list() {
        assert_eq!(parse_selection("1,3", 3), Ok(files(&[0, 2])));
        assert_eq!(parse_selection(" 3 , 1 ,3", 3), Ok(files(&[0, 2])));
        assert_eq!(parse_selection("+2", 3), Ok(files(&[1])));
    }

    #[test]
    fn test_parse_skips_out_of_range() {
        assert_eq!(
            parse_selection("0,2,9,-1", 3),
            Ok(Selection::Files {
                indices: vec![1],
                skipped: vec!["0".to_string(), "9".to_string(), "-1".to_string()],
            })
        );
    }

    #[test]
    fn test_parse_skips_numbers_too_large_to_parse() {
        assert_eq!(
            parse_selection("1,99999999999999999999", 3),
            Ok(Selection::Files {
                indices: vec![0],
                skipped: vec!["99999999999999999999".to_string()],
            })
        );
        assert_eq!(
            parse_selection("-99999999999999999999", 3),
            Err(SelectionError::NothingSelected(vec![
                "-99999999999999999999".to_string()
            ]))
        );
        assert!(matches!(
            parse_selection("1,+", 3),
            Err(SelectionError::InvalidNumber(_))
        ));
    }

    #[test]
    fn test_parse_nothing_in_range() {
        assert_eq!(
            parse_selection("7,8", 3),
            Err(SelectionError::NothingSelected(vec![
                "7".to_string(),
                "8".to_string()
            ]))
        );
    }

    #[test]
    fn test_parse_invalid() {
        assert_eq!(
            parse_selection("1,two", 3),
            Err(SelectionError::InvalidNumber("two".to_string()))
        );
        assert!(matches!(
            parse_selection("", 3),
            Err(SelectionError::InvalidNumber(_))
        ));
        assert!(matches!(
            parse_selection("1,", 3),
            Err(SelectionError::InvalidNumber(_))
        ));
    }
}
