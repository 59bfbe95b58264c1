//! Column-major matrix views.
//!
//! [`MatRef`] and [`MatMut`] pair a slice with a shape and a leading dimension (the distance,
//! in elements, between the starts of two consecutive columns). Element `(i, j)` lives at
//! `data[j * ld + i]`. Views are validated once on construction; sub-views inherit that
//! validation and are bounds-checked against their parent.

use crate::error::{shape_error, Result};

/// Calculates the 1D index for a 2D element in a column-major matrix.
///
/// # Arguments
/// * `i` - Row index.
/// * `j` - Column index.
/// * `ld` - Leading dimension (stride between columns).
#[inline(always)]
pub fn at(i: usize, j: usize, ld: usize) -> usize {
    (j * ld) + i
}

/// Minimum slice length backing a `rows × cols` column-major matrix with stride `ld`.
#[inline(always)]
fn required_len(rows: usize, cols: usize, ld: usize) -> usize {
    if rows == 0 || cols == 0 {
        0
    } else {
        (cols - 1) * ld + rows
    }
}

fn validate(rows: usize, cols: usize, ld: usize, len: usize) -> Result<()> {
    if ld < rows {
        return Err(shape_error(
            rows,
            cols,
            ld,
            len,
            "leading dimension is smaller than the row count",
        ));
    }
    if len < required_len(rows, cols, ld) {
        return Err(shape_error(
            rows,
            cols,
            ld,
            len,
            "slice is too short for the declared shape",
        ));
    }
    Ok(())
}

/// Read-only column-major view.
#[derive(Debug, Clone, Copy)]
pub struct MatRef<'a, T> {
    data: &'a [T],
    rows: usize,
    cols: usize,
    ld: usize,
}

impl<'a, T: Copy> MatRef<'a, T> {
    /// Creates a view over `data` holding a `rows × cols` matrix with leading dimension `ld`.
    pub fn new(data: &'a [T], rows: usize, cols: usize, ld: usize) -> Result<Self> {
        validate(rows, cols, ld, data.len())?;
        Ok(MatRef {
            data,
            rows,
            cols,
            ld,
        })
    }

    #[inline(always)]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[inline(always)]
    pub fn cols(&self) -> usize {
        self.cols
    }

    #[inline(always)]
    pub fn ld(&self) -> usize {
        self.ld
    }

    /// Element at row `i`, column `j`.
    #[inline(always)]
    pub fn get(&self, i: usize, j: usize) -> T {
        debug_assert!(i < self.rows && j < self.cols);
        self.data[at(i, j, self.ld)]
    }

    /// Contiguous storage of column `j`.
    #[inline(always)]
    pub fn col(&self, j: usize) -> &'a [T] {
        debug_assert!(j < self.cols);
        let data: &'a [T] = self.data;
        // Empty views may be backed by an empty slice whatever `ld` says.
        if self.rows == 0 {
            return &data[..0];
        }
        let start = at(0, j, self.ld);
        &data[start..start + self.rows]
    }

    /// The `rows × cols` block whose top-left element is `(row, col)`.
    ///
    /// # Panics
    /// Panics if the block does not lie inside this view.
    pub fn submatrix(&self, row: usize, col: usize, rows: usize, cols: usize) -> MatRef<'a, T> {
        assert!(
            row + rows <= self.rows && col + cols <= self.cols,
            "submatrix ({row}, {col}) of {rows}x{cols} is outside a {}x{} view",
            self.rows,
            self.cols
        );

        let data: &'a [T] = self.data;
        let data = if rows == 0 || cols == 0 {
            &data[..0]
        } else {
            &data[at(row, col, self.ld)..]
        };

        MatRef {
            data,
            rows,
            cols,
            ld: self.ld,
        }
    }
}

/// Mutable column-major view.
#[derive(Debug)]
pub struct MatMut<'a, T> {
    data: &'a mut [T],
    rows: usize,
    cols: usize,
    ld: usize,
}

impl<'a, T: Copy> MatMut<'a, T> {
    /// Creates a mutable view over `data` holding a `rows × cols` matrix with leading
    /// dimension `ld`.
    pub fn new(data: &'a mut [T], rows: usize, cols: usize, ld: usize) -> Result<Self> {
        validate(rows, cols, ld, data.len())?;
        Ok(MatMut {
            data,
            rows,
            cols,
            ld,
        })
    }

    #[inline(always)]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[inline(always)]
    pub fn cols(&self) -> usize {
        self.cols
    }

    #[inline(always)]
    pub fn ld(&self) -> usize {
        self.ld
    }

    #[inline(always)]
    pub fn get(&self, i: usize, j: usize) -> T {
        debug_assert!(i < self.rows && j < self.cols);
        self.data[at(i, j, self.ld)]
    }

    #[inline(always)]
    pub fn get_mut(&mut self, i: usize, j: usize) -> &mut T {
        debug_assert!(i < self.rows && j < self.cols);
        &mut self.data[at(i, j, self.ld)]
    }

    /// Reborrows this view for a shorter lifetime.
    #[inline(always)]
    pub fn rb_mut(&mut self) -> MatMut<'_, T> {
        MatMut {
            data: &mut *self.data,
            rows: self.rows,
            cols: self.cols,
            ld: self.ld,
        }
    }

    /// Read-only view of the same elements.
    #[inline(always)]
    pub fn rb(&self) -> MatRef<'_, T> {
        MatRef {
            data: &*self.data,
            rows: self.rows,
            cols: self.cols,
            ld: self.ld,
        }
    }

    /// Mutable `rows × cols` block whose top-left element is `(row, col)`.
    ///
    /// # Panics
    /// Panics if the block does not lie inside this view.
    pub fn submatrix_mut(
        &mut self,
        row: usize,
        col: usize,
        rows: usize,
        cols: usize,
    ) -> MatMut<'_, T> {
        assert!(
            row + rows <= self.rows && col + cols <= self.cols,
            "submatrix ({row}, {col}) of {rows}x{cols} is outside a {}x{} view",
            self.rows,
            self.cols
        );

        let data = if rows == 0 || cols == 0 {
            &mut self.data[..0]
        } else {
            &mut self.data[at(row, col, self.ld)..]
        };

        MatMut {
            data,
            rows,
            cols,
            ld: self.ld,
        }
    }

    /// Splits the view into the columns before `col` and the columns from `col` on.
    pub fn split_at_col(self, col: usize) -> (MatMut<'a, T>, MatMut<'a, T>) {
        let MatMut {
            data,
            rows,
            cols,
            ld,
        } = self;
        assert!(col <= cols, "split column {col} outside {cols} columns");

        // The last column may be shorter than `ld` in the backing slice.
        let mid = at(0, col, ld).min(data.len());
        let (left, right) = data.split_at_mut(mid);

        (
            MatMut {
                data: left,
                rows,
                cols: col,
                ld,
            },
            MatMut {
                data: right,
                rows,
                cols: cols - col,
                ld,
            },
        )
    }

    /// Splits the view into consecutive column ranges of `width` columns (the last one may
    /// be narrower).
    pub fn into_col_chunks(self, width: usize) -> Vec<MatMut<'a, T>> {
        assert!(width > 0, "column chunk width must be non-zero");

        let mut chunks = Vec::with_capacity(self.cols.div_ceil(width));
        let mut rest = self;
        while rest.cols > width {
            let (head, tail) = rest.split_at_col(width);
            chunks.push(head);
            rest = tail;
        }
        if rest.cols > 0 {
            chunks.push(rest);
        }
        chunks
    }
}

/// Validated views over the three operands of a `(m, n, k)` binary product.
pub(crate) type Operands<'a> = (MatRef<'a, u64>, MatRef<'a, u64>, MatMut<'a, f32>);

/// Wraps raw bgemm arguments into views: `A` is `m × k`, `B` is `k × n`, `C` is `m × n`.
#[allow(clippy::too_many_arguments)]
pub(crate) fn operands<'a>(
    m: usize,
    n: usize,
    k: usize,
    a: &'a [u64],
    lda: usize,
    b: &'a [u64],
    ldb: usize,
    c: &'a mut [f32],
    ldc: usize,
) -> Result<Operands<'a>> {
    Ok((
        MatRef::new(a, m, k, lda)?,
        MatRef::new(b, k, n, ldb)?,
        MatMut::new(c, m, n, ldc)?,
    ))
}
