use ndarray::ArrayView1;
use num_traits::Float;

/// Euclidean distance between two vectors of the same dimension.
///
/// Callers are expected to have checked the lengths; extra trailing
/// coordinates of the longer vector are ignored.
///
/// # Examples
/// ```
/// use lloyd::k_means::distance::euclidean_distance;
/// use ndarray::arr1;
///
/// let a = arr1(&[0.0, 0.0]);
/// let b = arr1(&[3.0, 4.0]);
/// assert_eq!(euclidean_distance(a.view(), b.view()), 5.0);
/// ```
pub fn euclidean_distance<T: Float>(a: ArrayView1<'_, T>, b: ArrayView1<'_, T>) -> T {
    a.iter()
        .zip(b.iter())
        .fold(T::zero(), |acc, (&x, &y)| acc + (x - y) * (x - y))
        .sqrt()
}
