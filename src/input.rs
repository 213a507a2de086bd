//! Loading of comma-separated input tables.
//!
//! A table is a text-file with one row per line; the first column is a numeric key, the
//! remaining columns are coordinates. Two tables are combined by an inner join on the key:
//! the resulting points are ordered by ascending key and consist of the coordinates of the
//! left row followed by those of the right row.

use std::cmp::Ordering;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::error::{KMeansError, Result};
use crate::space::PointSet;
use crate::types::{Coordinate, Position};

const SEPARATOR: char = ',';

/// A keyed table of numeric rows.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    name: String,
    keys: Vec<Coordinate>,
    rows: Vec<Position>, // rows[i] belongs to keys[i]; the key column is not repeated here
}

impl Table {
    /// Returns the number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Returns the number of value columns (without the key column).
    pub fn width(&self) -> usize {
        self.rows.first().map_or(0, |r| r.len())
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Parses comma-separated numeric rows. Blank lines are skipped; all rows must have the same
/// number of entries. Line numbers in errors start at 1.
pub(crate) fn parse_rows<R: BufRead>(reader: R, name: &str) -> Result<Vec<Position>> {
    Ok(parse_numbered_rows(reader, name)?.into_iter().map(|(_, row)| row).collect())
}

/// Same as [parse_rows], but each row comes with its line number.
fn parse_numbered_rows<R: BufRead>(reader: R, name: &str) -> Result<Vec<(usize, Position)>> {
    let mut rows: Vec<(usize, Position)> = Vec::new();
    let mut width: Option<usize> = None;

    for (line_idx, line) in reader.lines().enumerate() {
        let line = line?;
        let content = line.trim();
        if content.is_empty() {
            continue;
        }
        let mut row: Position = Vec::with_capacity(width.unwrap_or(0));
        for (col, entry) in content.split(SEPARATOR).enumerate() {
            let entry = entry.trim();
            let value = entry.parse::<Coordinate>().map_err(|_| KMeansError::Parse {
                path: name.to_string(),
                line: line_idx + 1,
                reason: format!("entry {} ('{}') is not a number", col, entry),
            })?;
            row.push(value);
        }
        match width {
            None => width = Some(row.len()),
            Some(w) if w != row.len() => {
                return Err(KMeansError::Parse {
                    path: name.to_string(),
                    line: line_idx + 1,
                    reason: format!("expected {} entries, found {}", w, row.len()),
                })
            }
            _ => {}
        }
        rows.push((line_idx + 1, row));
    }
    Ok(rows)
}

/// Reads a keyed table from any buffered reader; name is only used in error messages.
pub fn read_table_from<R: BufRead>(reader: R, name: &str) -> Result<Table> {
    let mut keys = Vec::new();
    let mut rows = Vec::new();
    for (line, mut row) in parse_numbered_rows(reader, name)? {
        if row.len() < 2 {
            return Err(KMeansError::Parse {
                path: name.to_string(),
                line,
                reason: "a row needs a key and at least one coordinate".to_string(),
            });
        }
        let key = row.remove(0);
        if !key.is_finite() {
            return Err(KMeansError::Parse {
                path: name.to_string(),
                line,
                reason: format!("key {} is not finite", key),
            });
        }
        keys.push(key);
        rows.push(row);
    }
    Ok(Table {
        name: name.to_string(),
        keys,
        rows,
    })
}

/// Reads a keyed table from a text-file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or a row cannot be parsed.
pub fn read_table<P: AsRef<Path>>(file_path: P) -> Result<Table> {
    let name = file_path.as_ref().display().to_string();
    let f = BufReader::new(File::open(file_path)?);
    let table = read_table_from(f, &name)?;
    tracing::debug!("read {} rows with {} value columns from '{}'", table.len(), table.width(), name);
    Ok(table)
}

fn sorted_order(keys: &[Coordinate]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..keys.len()).collect();
    // stable, so rows with equal keys keep their file order
    order.sort_by(|&a, &b| keys[a].partial_cmp(&keys[b]).unwrap_or(Ordering::Equal));
    order
}

/// Inner join of two tables on their key column.
///
/// Points are ordered by ascending key. A key occurring several times yields every
/// combination of matching rows (left rows in file order, then right rows in file order).
///
/// # Errors
///
/// Returns [KMeansError::InvalidArgument] if the tables have no key in common.
pub fn join_tables(left: &Table, right: &Table) -> Result<PointSet> {
    let left_order = sorted_order(&left.keys);
    let right_order = sorted_order(&right.keys);

    let mut joined: Vec<Position> = Vec::with_capacity(left.len().min(right.len()));
    let (mut i, mut j) = (0, 0);
    while i < left_order.len() && j < right_order.len() {
        let key_left = left.keys[left_order[i]];
        let key_right = right.keys[right_order[j]];
        if key_left < key_right {
            i += 1;
        } else if key_left > key_right {
            j += 1;
        } else {
            let mut i_end = i;
            while i_end < left_order.len() && left.keys[left_order[i_end]] == key_left {
                i_end += 1;
            }
            let mut j_end = j;
            while j_end < right_order.len() && right.keys[right_order[j_end]] == key_right {
                j_end += 1;
            }
            for &l in &left_order[i..i_end] {
                for &r in &right_order[j..j_end] {
                    let mut point = Vec::with_capacity(left.rows[l].len() + right.rows[r].len());
                    point.extend_from_slice(&left.rows[l]);
                    point.extend_from_slice(&right.rows[r]);
                    joined.push(point);
                }
            }
            i = i_end;
            j = j_end;
        }
    }

    if joined.is_empty() {
        return Err(KMeansError::InvalidArgument(format!(
            "the tables '{}' and '{}' have no key in common",
            left.name, right.name
        )));
    }
    PointSet::by_ndpoints(joined)
}

/// Reads two keyed tables and joins them, see [join_tables].
pub fn load_joined<P: AsRef<Path>, Q: AsRef<Path>>(file_path_1: P, file_path_2: Q) -> Result<PointSet> {
    let left = read_table(file_path_1)?;
    let right = read_table(file_path_2)?;
    let space = join_tables(&left, &right)?;
    tracing::info!(
        "joined '{}' ({} rows) and '{}' ({} rows) into {} points of dimension {}",
        left.name(),
        left.len(),
        right.name(),
        right.len(),
        space.n(),
        space.dim()
    );
    Ok(space)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn table(text: &str, name: &str) -> Table {
        read_table_from(Cursor::new(text), name).unwrap()
    }

    #[test]
    fn parse_skips_blank_lines_and_trims() {
        let rows = parse_rows(Cursor::new("1.5, 2\n\n -3,4e1\r\n"), "mem").unwrap();
        assert_eq!(rows, vec![vec![1.5, 2.0], vec![-3.0, 40.0]]);
    }

    #[test]
    fn parse_errors_report_the_line() {
        match parse_rows(Cursor::new("1,2\n3,x\n"), "mem") {
            Err(KMeansError::Parse { path, line, .. }) => {
                assert_eq!(path, "mem");
                assert_eq!(line, 2);
            }
            other => panic!("expected parse error, got {:?}", other),
        }
        match parse_rows(Cursor::new("1,2\n\n3,4,5\n"), "mem") {
            Err(KMeansError::Parse { line, .. }) => assert_eq!(line, 3),
            other => panic!("expected parse error, got {:?}", other),
        }
    }

    #[test]
    fn join_sorts_by_key_and_drops_unmatched() {
        let left = table("3,30.0\n1,10.0\n2,20.0\n7,70.0\n", "left");
        let right = table("2,0.2,0.02\n1,0.1,0.01\n3,0.3,0.03\n9,0.9,0.09\n", "right");
        let points = join_tables(&left, &right).unwrap();
        assert_eq!(
            points.get_positions(),
            vec![
                vec![10.0, 0.1, 0.01],
                vec![20.0, 0.2, 0.02],
                vec![30.0, 0.3, 0.03],
            ]
        );
    }

    #[test]
    fn duplicate_keys_give_all_combinations() {
        let left = table("1,1.0\n1,2.0\n", "left");
        let right = table("1,5.0\n1,6.0\n0,9.0\n", "right");
        let points = join_tables(&left, &right).unwrap();
        assert_eq!(
            points.get_positions(),
            vec![vec![1.0, 5.0], vec![1.0, 6.0], vec![2.0, 5.0], vec![2.0, 6.0]]
        );
    }

    #[test]
    fn disjoint_tables_are_an_error() {
        let left = table("1,1.0\n", "left");
        let right = table("2,1.0\n", "right");
        assert!(matches!(join_tables(&left, &right), Err(KMeansError::InvalidArgument(_))));
    }

    #[test]
    fn rows_need_a_value_column() {
        assert!(read_table_from(Cursor::new("1\n2\n"), "keys_only").is_err());
    }
}
