//! Shape checks for flat numeric data coming from the host.

use crate::error::{malformed, Result};

pub fn point(values: &[f64]) -> Result<[f64; 3]> {
    <[f64; 3]>::try_from(values).map_err(|_| malformed(format!("expected 3 coordinates, got {}", values.len())))
}

pub fn vector(values: &[f32]) -> Result<[f32; 3]> {
    <[f32; 3]>::try_from(values).map_err(|_| malformed(format!("expected 3 components, got {}", values.len())))
}

/// Sixteen values, row by row.
pub fn matrix(values: &[f64]) -> Result<[[f64; 4]; 4]> {
    if values.len() != 16 {
        return Err(malformed(format!("expected 16 matrix values, got {}", values.len())));
    }
    let mut rows = [[0.0; 4]; 4];
    for (row, chunk) in rows.iter_mut().zip(values.chunks_exact(4)) {
        row.copy_from_slice(chunk);
    }
    Ok(rows)
}

/// Flat `x, y, z` triplets.
pub fn points(values: &[f64]) -> Result<Vec<[f64; 3]>> {
    if values.len() % 3 != 0 {
        return Err(malformed(format!("{} values is not a whole number of points", values.len())));
    }
    Ok(values.chunks_exact(3).map(|p| [p[0], p[1], p[2]]).collect())
}

/// The `count` elements of `components` values each starting at element
/// `offset`.
pub(crate) fn range<'a, T>(data: &'a [T], components: usize, offset: u32, count: u32, what: &str) -> Result<&'a [T]> {
    let missing = || {
        malformed(format!(
            "{what}: {count} elements from {offset} requested, {} supplied",
            data.len() / components
        ))
    };
    let start = (offset as usize).checked_mul(components).ok_or_else(missing)?;
    let end = (count as usize)
        .checked_mul(components)
        .and_then(|len| start.checked_add(len))
        .ok_or_else(missing)?;
    data.get(start..end).ok_or_else(missing)
}
