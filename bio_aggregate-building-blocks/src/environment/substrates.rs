use bio_aggregate_concepts::*;

use nalgebra::SVector;
use serde::{Deserialize, Serialize};

/// Substrate with identical concentration everywhere.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ConstantSubstrate {
    /// Concentration at every position
    pub value: f64,
}

impl<Pos> SubstrateField<Pos> for ConstantSubstrate {
    fn sample(&self, _position: &Pos) -> f64 {
        self.value
    }
}

/// Substrate whose concentration changes linearly in space.
///
/// \\begin{equation}
///     c(\vec{x}) = c_0 + \vec{g}\cdot\vec{x}
/// \\end{equation}
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct LinearGradientSubstrate<const D: usize> {
    /// Concentration $c_0$ at the origin
    pub offset: f64,
    /// Gradient $\vec{g}$ of the concentration
    pub gradient: SVector<f64, D>,
}

impl<const D: usize> SubstrateField<SVector<f64, D>> for LinearGradientSubstrate<D> {
    fn sample(&self, position: &SVector<f64, D>) -> f64 {
        self.offset + self.gradient.dot(position)
    }
}

/// Substrate stored as regular image with `D` axes.
///
/// The image covers the region starting at `origin` with pixels of size `spacing`.
/// A position is mapped to the pixel whose center is closest to it.
/// Positions outside of the image sample a concentration of zero.
///
/// ```
/// # use bio_aggregate_building_blocks::prelude::*;
/// # use bio_aggregate_concepts::SubstrateField;
/// use nalgebra::Vector2;
/// let image = ndarray::Array2::from_shape_vec((2, 3), vec![0u8, 1, 2, 3, 4, 5])
///     .unwrap()
///     .into_dyn();
/// let substrate = ImageSubstrate::new(image, [0.0; 2], [1.0; 2]).unwrap();
/// assert_eq!(substrate.sample(&Vector2::new(1.2, 2.1)), 5.0);
/// assert_eq!(substrate.sample(&Vector2::new(-3.0, 0.0)), 0.0);
/// ```
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ImageSubstrate<T, const D: usize> {
    image: ndarray::ArrayD<T>,
    origin: SVector<f64, D>,
    spacing: SVector<f64, D>,
}

impl<T, const D: usize> ImageSubstrate<T, D> {
    /// Constructs a new [ImageSubstrate].
    ///
    /// Fails if the number of image axes does not match the dimension `D` or if any spacing
    /// is not strictly positive.
    pub fn new(
        image: ndarray::ArrayD<T>,
        origin: impl Into<SVector<f64, D>>,
        spacing: impl Into<SVector<f64, D>>,
    ) -> Result<Self, SetupError> {
        let spacing = spacing.into();
        if image.ndim() != D {
            return Err(SetupError(format!(
                "image has {} axes but substrate is defined in {} dimensions",
                image.ndim(),
                D
            )));
        }
        if spacing.iter().any(|dx| !(*dx > 0.0)) {
            return Err(SetupError(format!(
                "spacing {spacing:?} of image substrate must be strictly positive"
            )));
        }
        Ok(Self {
            image,
            origin: origin.into(),
            spacing,
        })
    }

    /// Physical position of the first pixel
    pub fn get_origin(&self) -> SVector<f64, D> {
        self.origin
    }

    /// Size of a single pixel along every axis
    pub fn get_spacing(&self) -> SVector<f64, D> {
        self.spacing
    }

    /// Obtains the index of the pixel covering the given position.
    pub fn pixel_index(&self, position: &SVector<f64, D>) -> Option<[usize; D]> {
        let mut index = [0usize; D];
        for (i, n) in self.image.shape().iter().enumerate() {
            let q = ((position[i] - self.origin[i]) / self.spacing[i]).round();
            if !(q >= 0.0) || q >= *n as f64 {
                return None;
            }
            index[i] = q as usize;
        }
        Some(index)
    }
}

impl<T, const D: usize> SubstrateField<SVector<f64, D>> for ImageSubstrate<T, D>
where
    T: num::ToPrimitive + Send + Sync,
{
    fn sample(&self, position: &SVector<f64, D>) -> f64 {
        self.pixel_index(position)
            .and_then(|index| self.image.get(ndarray::IxDyn(&index)))
            .and_then(|value| value.to_f64())
            .unwrap_or(0.0)
    }
}
