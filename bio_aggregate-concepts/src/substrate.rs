/// Scalar field which can be sampled at arbitrary positions.
///
/// Substrates are owned outside of the aggregate which only keeps shared references.
/// They are sampled concurrently and must therefore be [Send] and [Sync].
///
/// Any closure of the form `Fn(&Pos) -> f64` is a valid substrate.
/// ```
/// # use bio_aggregate_concepts::SubstrateField;
/// let field = |x: &[f64; 2]| x[0] + x[1];
/// assert_eq!(field.sample(&[1.0, 2.0]), 3.0);
/// ```
pub trait SubstrateField<Pos>: Send + Sync {
    /// Concentration of the substrate at the given position.
    fn sample(&self, position: &Pos) -> f64;
}

impl<Pos, F> SubstrateField<Pos> for F
where
    F: Fn(&Pos) -> f64 + Send + Sync,
{
    fn sample(&self, position: &Pos) -> f64 {
        self(position)
    }
}
