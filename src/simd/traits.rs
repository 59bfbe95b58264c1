/// A register-blocked kernel producing one `MR × NR` tile of Hamming sums.
///
/// Implementations read the packed panels laid out by [`crate::panels`]: for every word pair,
/// `2 * MR` words of `A` followed (in the other panel) by `2 * NR` words of `B`.
pub trait MicroKernel {
    /// Rows of the output tile.
    const MR: usize;
    /// Columns of the output tile.
    const NR: usize;
    /// Name reported in logs and by [`crate::dispatch::Kernel::name`].
    const NAME: &'static str;

    /// Overwrites `tile` (column-major, `MR × NR`) with the Hamming sums of `pairs` word pairs.
    ///
    /// # Panics
    /// Panics if `tile` is shorter than `MR * NR`, or if a panel holds fewer than
    /// `2 * pairs` words per row (or column).
    fn compute(&self, pairs: usize, tile: &mut [f32], a_panel: &[u64], b_panel: &[u64]);
}
