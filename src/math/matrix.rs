use rand::Rng;
use serde::{Serialize, Deserialize};
use std::f64::consts::PI;
use std::ops::{Add, Sub, Mul};

/// Dense row-major matrix.
///
/// Batches are laid out column-wise: a batch of `n` samples with `d` features
/// is a `(d, n)` matrix, so a layer maps it with `w · h + b`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Matrix{
    pub rows: usize,
    pub cols: usize,
    pub data: Vec<Vec<f64>>
}

impl Matrix{
    pub fn zeros(rows: usize, cols: usize) -> Matrix {
        Matrix{
            rows,
            cols,
            data: vec![vec![0.0; cols]; rows]
        }
    }

    /// Zero matrix with the same shape as `other`.
    pub fn zeros_like(other: &Matrix) -> Matrix {
        Matrix::zeros(other.rows, other.cols)
    }

    /// Every entry drawn independently from U[low, high).
    pub fn uniform<R: Rng + ?Sized>(rows: usize, cols: usize, low: f64, high: f64, rng: &mut R) -> Matrix {
        let mut res = Matrix::zeros(rows, cols);

        for i in 0..rows {
            for j in 0..cols {
                res.data[i][j] = low + (high - low) * rng.gen::<f64>();
            }
        }

        res
    }

    /// Samples a single value from N(0, 1) using the Box-Muller transform.
    fn sample_standard_normal<R: Rng + ?Sized>(rng: &mut R) -> f64 {
        // Both uniforms live in (0, 1] so ln never sees zero.
        let u1: f64 = 1.0 - rng.gen::<f64>();
        let u2: f64 = 1.0 - rng.gen::<f64>();
        (-2.0 * u1.ln()).sqrt() * (2.0 * PI * u2).cos()
    }

    /// Every entry drawn independently from N(0, std_dev²).
    pub fn normal<R: Rng + ?Sized>(rows: usize, cols: usize, std_dev: f64, rng: &mut R) -> Matrix {
        let mut res = Matrix::zeros(rows, cols);
        for i in 0..rows {
            for j in 0..cols {
                res.data[i][j] = Matrix::sample_standard_normal(rng) * std_dev;
            }
        }
        res
    }

    pub fn from_data(data: Vec<Vec<f64>>) -> Matrix {
        Matrix {
            rows: data.len(),
            cols: data.first().map_or(0, |row| row.len()),
            data
        }
    }

    /// Builds a `(len, columns.len())` matrix whose j-th column is `columns[j]`.
    /// All columns must share one length.
    pub fn from_columns<C: AsRef<[f64]>>(columns: &[C]) -> Matrix {
        let rows = columns.first().map_or(0, |c| c.as_ref().len());
        let mut res = Matrix::zeros(rows, columns.len());
        for (j, column) in columns.iter().enumerate() {
            let column = column.as_ref();
            assert_eq!(column.len(), rows, "columns must share one length");
            for (i, &x) in column.iter().enumerate() {
                res.data[i][j] = x;
            }
        }
        res
    }

    /// Column vector `(values.len(), 1)`.
    pub fn column_vector(values: &[f64]) -> Matrix {
        Matrix::from_data(values.iter().map(|&x| vec![x]).collect())
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    pub fn column(&self, j: usize) -> Vec<f64> {
        self.data.iter().map(|row| row[j]).collect()
    }

    pub fn transpose(&self) -> Matrix {
        let mut res = Matrix::zeros(self.cols, self.rows);

        for i in 0..res.rows {
            for j in 0..res.cols {
                res.data[i][j] = self.data[j][i];
            }
        }

        res
    }

    pub fn map<F>(&self, functor: F) -> Matrix
    where
        F: Fn(f64) -> f64,
    {
        Matrix {
            rows: self.rows,
            cols: self.cols,
            data: self.data
                .iter()
                .map(|row| row.iter().map(|&x| functor(x)).collect())
                .collect(),
        }
    }

    /// Combines two same-shape matrices entry by entry.
    pub fn zip_map<F>(&self, other: &Matrix, functor: F) -> Matrix
    where
        F: Fn(f64, f64) -> f64,
    {
        self.assert_same_shape(other);
        Matrix {
            rows: self.rows,
            cols: self.cols,
            data: self.data.iter().zip(other.data.iter())
                .map(|(row_a, row_b)| {
                    row_a.iter().zip(row_b.iter()).map(|(&a, &b)| functor(a, b)).collect()
                })
                .collect(),
        }
    }

    /// Element-wise (Hadamard) product.
    pub fn hadamard(&self, other: &Matrix) -> Matrix {
        self.zip_map(other, |a, b| a * b)
    }

    pub fn scale(&self, factor: f64) -> Matrix {
        self.map(|x| x * factor)
    }

    pub fn clamp(&self, low: f64, high: f64) -> Matrix {
        self.map(|x| x.clamp(low, high))
    }

    /// Matrix product `self · rhs` without consuming either operand.
    pub fn dot(&self, rhs: &Matrix) -> Matrix {
        if self.cols != rhs.rows {
            panic!("Matrices are of incorrect sizes")
        }

        let mut res = Matrix::zeros(self.rows, rhs.cols);

        for i in 0..self.rows {
            let out = &mut res.data[i];
            for (k, &a) in self.data[i].iter().enumerate() {
                if a == 0.0 {
                    continue;
                }
                for (o, &b) in out.iter_mut().zip(rhs.data[k].iter()) {
                    *o += a * b;
                }
            }
        }

        res
    }

    /// Adds the `(rows, 1)` column `bias` to every column of `self`.
    pub fn add_column(&self, bias: &Matrix) -> Matrix {
        if bias.rows != self.rows || bias.cols != 1 {
            panic!("Bias column does not match the matrix height")
        }

        let mut res = self.clone();
        for (row, b) in res.data.iter_mut().zip(bias.data.iter()) {
            for x in row.iter_mut() {
                *x += b[0];
            }
        }
        res
    }

    /// Sums across columns, producing a `(rows, 1)` column.
    pub fn sum_columns(&self) -> Matrix {
        Matrix::from_data(self.data.iter().map(|row| vec![row.iter().sum()]).collect())
    }

    pub fn sum(&self) -> f64 {
        self.data.iter().flatten().sum()
    }

    pub fn sum_of_squares(&self) -> f64 {
        self.data.iter().flatten().map(|x| x * x).sum()
    }

    /// Row index of the largest entry in each column. The first maximum wins ties.
    pub fn argmax_columns(&self) -> Vec<usize> {
        (0..self.cols)
            .map(|j| {
                let mut best = 0;
                for i in 1..self.rows {
                    if self.data[i][j] > self.data[best][j] {
                        best = i;
                    }
                }
                best
            })
            .collect()
    }

    /// In-place `self -= rhs`.
    pub fn sub_assign(&mut self, rhs: &Matrix) {
        self.assert_same_shape(rhs);
        for (row, other) in self.data.iter_mut().zip(rhs.data.iter()) {
            for (x, y) in row.iter_mut().zip(other.iter()) {
                *x -= y;
            }
        }
    }

    pub fn max_abs(&self) -> f64 {
        self.data.iter().flatten().fold(0.0, |acc, x| acc.max(x.abs()))
    }

    fn assert_same_shape(&self, other: &Matrix) {
        if self.rows != other.rows || self.cols != other.cols {
            panic!("Matrices are of incorrect sizes")
        }
    }
}

impl Default for Matrix {
    fn default() -> Self {
        Matrix { rows: 0, cols: 0, data: vec![] }
    }
}

impl Add for Matrix {
    type Output = Matrix;

    fn add(self, rhs: Self) -> Self::Output {
        self.zip_map(&rhs, |a, b| a + b)
    }
}

impl Sub for Matrix {
    type Output = Matrix;

    fn sub(self, rhs: Self) -> Self::Output {
        self.zip_map(&rhs, |a, b| a - b)
    }
}

impl Mul for Matrix {
    type Output = Matrix;

    fn mul(self, rhs: Self) -> Self::Output {
        self.dot(&rhs)
    }
}
