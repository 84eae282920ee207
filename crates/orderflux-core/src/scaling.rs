//! Min-max scaling fitted on finite values.

/// Linear map of an observed range onto `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MinMaxScaler {
    pub min: f64,
    pub max: f64,
}

impl MinMaxScaler {
    /// Fits on the finite values only; `None` if there are none.
    pub fn fit<I>(values: I) -> Option<Self>
    where
        I: IntoIterator<Item = f64>,
    {
        values
            .into_iter()
            .filter(|value| value.is_finite())
            .fold(None, |bounds: Option<Self>, value| {
                Some(match bounds {
                    Some(scaler) => Self {
                        min: scaler.min.min(value),
                        max: scaler.max.max(value),
                    },
                    None => Self {
                        min: value,
                        max: value,
                    },
                })
            })
    }

    /// A zero-width range maps every value to 0.
    pub fn transform(&self, value: f64) -> f64 {
        let range = self.max - self.min;
        if range == 0.0 {
            value - self.min
        } else {
            (value - self.min) / range
        }
    }

    /// Largest value `transform` produces over the fitted range.
    pub fn upper(&self) -> f64 {
        self.transform(self.max)
    }
}
