//! Contiguous storage for points and centroids.
//!
//! Both the dataset and the centroid set are row-major `N × D` arenas backed by
//! a single `ndarray::Array2<f64>`, so a point is addressed by its row index and
//! never owns a heap allocation of its own.

use std::fmt::Display;
use std::fs::File;
use std::io::{BufRead, BufReader, Lines};
use std::path::Path;
use std::str::FromStr;

use ndarray::{Array2, ArrayView1, ArrayView2, Axis};
use rand::Rng;
use rand_distr::{Distribution, Uniform};

use crate::error::{Error, Result};

/// An ordered, immutable collection of `N` points of dimension `D`.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    points: Array2<f64>,
}

impl Dataset {
    /// Builds a dataset from one vector per point.
    ///
    /// # Errors
    /// * `Configuration` if `rows` is empty or the points have no coordinates
    /// * `DimensionMismatch` if a row's length differs from the first row's
    pub fn from_rows(rows: &[Vec<f64>]) -> Result<Self> {
        let (n, dim, values) = flatten_rows(rows, "dataset")?;
        Self::from_flat(n, dim, values)
    }

    /// Builds a dataset from `n * dim` row-major coordinates.
    pub fn from_flat(n: usize, dim: usize, values: Vec<f64>) -> Result<Self> {
        Ok(Self {
            points: shape_arena(n, dim, values, "dataset")?,
        })
    }

    /// Reads the text format `N D` followed by `N × D` whitespace separated reals.
    ///
    /// Line breaks carry no meaning beyond error reporting; tokens after the
    /// last coordinate are ignored.
    pub fn read_from<R: BufRead>(reader: R) -> Result<Self> {
        let mut tokens = Tokens::new(reader);
        let n: usize = tokens.next_parsed("point count")?;
        let dim: usize = tokens.next_parsed("dimension")?;
        let total = n.checked_mul(dim).ok_or_else(|| Error::Parse {
            line: tokens.line,
            message: format!("{n} points of dimension {dim} overflow the address space"),
        })?;

        let mut values = Vec::new();
        for _ in 0..total {
            values.push(tokens.next_parsed::<f64>("coordinate")?);
        }
        Self::from_flat(n, dim, values)
    }

    /// Opens `path` and reads it with [`Dataset::read_from`].
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        Self::read_from(BufReader::new(file))
    }

    /// Generates `n` points whose coordinates are uniform in `[low, high)`.
    pub fn random_uniform<R: Rng + ?Sized>(
        n: usize,
        dim: usize,
        low: f64,
        high: f64,
        rng: &mut R,
    ) -> Result<Self> {
        if !(low.is_finite() && high.is_finite() && low < high) {
            return Err(Error::configuration(format!(
                "sample range [{low}, {high}) is empty or not finite"
            )));
        }
        let between = Uniform::new(low, high);
        let values = (0..n * dim).map(|_| between.sample(rng)).collect();
        Self::from_flat(n, dim, values)
    }

    /// Number of points.
    pub fn len(&self) -> usize {
        self.points.nrows()
    }

    /// Always false for a constructed dataset; kept alongside `len`.
    pub fn is_empty(&self) -> bool {
        self.points.nrows() == 0
    }

    pub fn dimension(&self) -> usize {
        self.points.ncols()
    }

    /// Position of point `index`. Panics if `index >= len()`.
    pub fn point(&self, index: usize) -> ArrayView1<'_, f64> {
        self.points.row(index)
    }

    pub fn points(&self) -> ArrayView2<'_, f64> {
        self.points.view()
    }
}

/// The `K × D` representative positions of the clusters.
///
/// A value is never updated in place by the clustering loop: every update step
/// produces a new `Centroids`.
#[derive(Debug, Clone, PartialEq)]
pub struct Centroids {
    positions: Array2<f64>,
}

impl Centroids {
    /// Builds a centroid set from one vector per centroid.
    pub fn from_rows(rows: &[Vec<f64>]) -> Result<Self> {
        let (k, dim, values) = flatten_rows(rows, "centroid set")?;
        Ok(Self {
            positions: shape_arena(k, dim, values, "centroid set")?,
        })
    }

    /// Copies the positions of the given dataset rows.
    pub(crate) fn from_indices(dataset: &Dataset, indices: &[usize]) -> Self {
        Self {
            positions: dataset.points.select(Axis(0), indices),
        }
    }

    pub(crate) fn from_array(positions: Array2<f64>) -> Self {
        Self { positions }
    }

    /// Number of centroids.
    pub fn k(&self) -> usize {
        self.positions.nrows()
    }

    pub fn dimension(&self) -> usize {
        self.positions.ncols()
    }

    /// Position of centroid `index`. Panics if `index >= k()`.
    pub fn centroid(&self, index: usize) -> ArrayView1<'_, f64> {
        self.positions.row(index)
    }

    pub fn positions(&self) -> ArrayView2<'_, f64> {
        self.positions.view()
    }

    /// Copies the centroids out as one vector per cluster.
    pub fn to_vecs(&self) -> Vec<Vec<f64>> {
        self.positions.outer_iter().map(|row| row.to_vec()).collect()
    }
}

fn flatten_rows(rows: &[Vec<f64>], what: &str) -> Result<(usize, usize, Vec<f64>)> {
    let first = rows
        .first()
        .ok_or_else(|| Error::configuration(format!("{what} is empty")))?;
    let dim = first.len();

    let mut values = Vec::with_capacity(rows.len() * dim);
    for row in rows {
        if row.len() != dim {
            return Err(Error::DimensionMismatch {
                expected: dim,
                found: row.len(),
            });
        }
        values.extend_from_slice(row);
    }
    Ok((rows.len(), dim, values))
}

fn shape_arena(rows: usize, dim: usize, values: Vec<f64>, what: &str) -> Result<Array2<f64>> {
    if rows == 0 {
        return Err(Error::configuration(format!("{what} is empty")));
    }
    if dim == 0 {
        return Err(Error::configuration(format!(
            "{what} must have at least one dimension"
        )));
    }
    if values.len() != rows * dim {
        return Err(Error::DimensionMismatch {
            expected: rows * dim,
            found: values.len(),
        });
    }
    Array2::from_shape_vec((rows, dim), values).map_err(|e| Error::configuration(e.to_string()))
}

/// Whitespace tokenizer that remembers the line it is on.
struct Tokens<R> {
    lines: Lines<R>,
    pending: std::vec::IntoIter<String>,
    line: usize,
}

impl<R: BufRead> Tokens<R> {
    fn new(reader: R) -> Self {
        Self {
            lines: reader.lines(),
            pending: Vec::new().into_iter(),
            line: 0,
        }
    }

    fn next_token(&mut self) -> Result<Option<String>> {
        loop {
            if let Some(token) = self.pending.next() {
                return Ok(Some(token));
            }
            match self.lines.next() {
                Some(line) => {
                    let line = line?;
                    self.line += 1;
                    self.pending = line
                        .split_whitespace()
                        .map(str::to_owned)
                        .collect::<Vec<_>>()
                        .into_iter();
                }
                None => return Ok(None),
            }
        }
    }

    fn next_parsed<T>(&mut self, what: &str) -> Result<T>
    where
        T: FromStr,
        T::Err: Display,
    {
        let token = self.next_token()?.ok_or_else(|| Error::Parse {
            line: self.line.max(1),
            message: format!("unexpected end of input, expected {what}"),
        })?;
        token.parse().map_err(|e| Error::Parse {
            line: self.line,
            message: format!("invalid {what} '{token}': {e}"),
        })
    }
}
