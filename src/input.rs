//! Parsers for the plain-text inputs that feed the tree: polygon vertices, per-object vertex
//! ranges, window queries and nearest neighbor queries.
//!
//! Every parser skips blank lines and reports the 1-based line number of the first line it
//! cannot parse.

use std::io::BufRead;
use std::str::FromStr;

use crate::error::{PackedRTreeError, Result};
use crate::rtree::Rect;

/// The range of vertices belonging to one object, as listed in an offsets file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObjectOffsets {
    pub id: u32,
    /// Index of the object's first vertex.
    pub start: usize,
    /// Index of the object's last vertex, inclusive.
    pub end: usize,
}

/// Read vertices, one `x,y` pair per line.
pub fn read_coords(reader: impl BufRead) -> Result<Vec<(f64, f64)>> {
    parse_lines(reader, |line, line_number| {
        let [x, y] = parse_fields::<f64, 2>(line.split(','), line_number)?;
        Ok((x, y))
    })
}

/// Read object vertex ranges, one `id,start,end` triple per line.
pub fn read_offsets(reader: impl BufRead) -> Result<Vec<ObjectOffsets>> {
    parse_lines(reader, |line, line_number| {
        let [id, start, end] = parse_fields::<usize, 3>(line.split(','), line_number)?;
        let id = u32::try_from(id).map_err(|_| PackedRTreeError::MalformedInput {
            line: line_number,
            reason: format!("object id {id} does not fit in 32 bits"),
        })?;
        Ok(ObjectOffsets { id, start, end })
    })
}

/// Compute the bounding rectangle of every object from its vertex range.
///
/// An empty range or one that runs past the end of `coords` fails with
/// [`PackedRTreeError::InvalidGeometry`].
pub fn objects_from_offsets(
    coords: &[(f64, f64)],
    offsets: &[ObjectOffsets],
) -> Result<Vec<(u32, Rect<f64>)>> {
    offsets
        .iter()
        .map(|offsets| {
            let points = coords.get(offsets.start..=offsets.end).ok_or_else(|| {
                PackedRTreeError::InvalidGeometry(format!(
                    "object {} spans vertices {}..={} but only {} vertices exist",
                    offsets.id,
                    offsets.start,
                    offsets.end,
                    coords.len()
                ))
            })?;
            let rect = Rect::from_points(points.iter().copied())?;
            Ok((offsets.id, rect))
        })
        .collect()
}

/// Read window queries, one `x_low y_low x_high y_high` line each.
pub fn read_range_queries(reader: impl BufRead) -> Result<Vec<Rect<f64>>> {
    parse_lines(reader, |line, line_number| {
        let [x_low, y_low, x_high, y_high] =
            parse_fields::<f64, 4>(line.split_whitespace(), line_number)?;
        Rect::try_new(x_low, y_low, x_high, y_high).map_err(|err| {
            PackedRTreeError::MalformedInput {
                line: line_number,
                reason: err.to_string(),
            }
        })
    })
}

/// Read nearest neighbor query points, one `x y` line each.
pub fn read_knn_queries(reader: impl BufRead) -> Result<Vec<(f64, f64)>> {
    parse_lines(reader, |line, line_number| {
        let [x, y] = parse_fields::<f64, 2>(line.split_whitespace(), line_number)?;
        Ok((x, y))
    })
}

fn parse_lines<T>(
    reader: impl BufRead,
    mut parse: impl FnMut(&str, usize) -> Result<T>,
) -> Result<Vec<T>> {
    let mut out = vec![];
    for (i, line) in reader.lines().enumerate() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        out.push(parse(line, i + 1)?);
    }
    Ok(out)
}

/// Parse exactly `K` fields.
fn parse_fields<'a, T: FromStr + Default + Copy, const K: usize>(
    fields: impl Iterator<Item = &'a str>,
    line_number: usize,
) -> Result<[T; K]> {
    let malformed = |reason: String| PackedRTreeError::MalformedInput {
        line: line_number,
        reason,
    };

    let mut out = [T::default(); K];
    let mut count = 0;
    for field in fields {
        let field = field.trim();
        if count < K {
            out[count] = field
                .parse()
                .map_err(|_| malformed(format!("cannot parse {field:?}")))?;
        }
        count += 1;
    }
    if count != K {
        return Err(malformed(format!("expected {K} fields, found {count}")));
    }
    Ok(out)
}
