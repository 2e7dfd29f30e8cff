use crate::error::{Result, SimError};
use crate::terrain::grid::Pos;
use std::fs::File;
use std::io::{BufRead, BufReader};

/// Read a drain plan from a file path
pub fn parse_drain_plan(path: &str) -> Result<Vec<Pos>> {
    let file = File::open(path)?;
    let reader = BufReader::with_capacity(64 * 1024, file);

    let mut drains = Vec::with_capacity(16);
    for (i, line) in reader.lines().enumerate() {
        if let Some(pos) = parse_line(i + 1, &line?)? {
            drains.push(pos);
        }
    }
    Ok(drains)
}

/// Parse a drain plan directly from an in-memory string
pub fn parse_drain_plan_str(src: &str) -> Result<Vec<Pos>> {
    let mut drains = Vec::new();
    for (i, raw) in src.lines().enumerate() {
        if let Some(pos) = parse_line(i + 1, raw)? {
            drains.push(pos);
        }
    }
    Ok(drains)
}

/// One `row col` or `row,col` entry; blank lines and `#` comments yield `None`
fn parse_line(line_no: usize, raw: &str) -> Result<Option<Pos>> {
    let line = match raw.find('#') {
        Some(hash) => &raw[..hash],
        None => raw,
    }
    .trim();
    if line.is_empty() {
        return Ok(None);
    }

    let mut parts = line
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|s| !s.is_empty());
    let invalid = |msg: String| SimError::InvalidLine { line: line_no, msg };

    let row = parts
        .next()
        .ok_or_else(|| invalid("missing row".to_string()))?;
    let col = parts
        .next()
        .ok_or_else(|| invalid(format!("missing column after `{row}`")))?;
    if let Some(extra) = parts.next() {
        return Err(invalid(format!("unexpected trailing `{extra}`")));
    }

    let row: usize = row
        .parse()
        .map_err(|_| invalid(format!("row `{row}` is not a cell index")))?;
    let col: usize = col
        .parse()
        .map_err(|_| invalid(format!("column `{col}` is not a cell index")))?;

    Ok(Some(Pos::new(row, col)))
}

/// Parse a single `row,col` CLI value
pub fn parse_pos(src: &str) -> std::result::Result<Pos, String> {
    match parse_line(1, src) {
        Ok(Some(pos)) => Ok(pos),
        Ok(None) => Err("empty position".to_string()),
        Err(SimError::InvalidLine { msg, .. }) => Err(msg),
        Err(e) => Err(e.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_basic_plan() {
        let plan = parse_drain_plan_str("3 4\n10,2\n").unwrap();

        assert_eq!(plan, vec![Pos::new(3, 4), Pos::new(10, 2)]);
    }

    #[test]
    fn test_parse_skips_blank_and_comments() {
        let src = "# drains along the river\n\n  1 1  # first\n\n2, 2\n";
        let plan = parse_drain_plan_str(src).unwrap();

        assert_eq!(plan, vec![Pos::new(1, 1), Pos::new(2, 2)]);
    }

    #[test]
    fn test_parse_reports_line_number() {
        let err = parse_drain_plan_str("1 1\n2\n").unwrap_err();
        assert!(matches!(err, SimError::InvalidLine { line: 2, .. }));

        let err = parse_drain_plan_str("1 1\n\nx 3\n").unwrap_err();
        assert!(matches!(err, SimError::InvalidLine { line: 3, .. }));

        let err = parse_drain_plan_str("1 2 3\n").unwrap_err();
        assert!(matches!(err, SimError::InvalidLine { line: 1, .. }));
    }

    #[test]
    fn test_parse_rejects_negative() {
        assert!(parse_drain_plan_str("-1 4\n").is_err());
    }

    #[test]
    fn test_parse_pos() {
        assert_eq!(parse_pos("7,8"), Ok(Pos::new(7, 8)));
        assert!(parse_pos("").is_err());
        assert!(parse_pos("7").is_err());
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            parse_drain_plan("/definitely/not/here.txt"),
            Err(SimError::Io(_))
        ));
    }
}
