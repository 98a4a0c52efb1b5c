use crate::error::SplineError;

/// Prefix sums over the gaps between a run of objects, so a distance along the run can
/// be turned back into "which object, and how far towards the next one".
///
/// Nothing here fails on an out-of-range distance: anything at or below zero lands on
/// the first object, anything at or past the total length lands on the last.
#[derive(Clone, Debug)]
pub struct DistanceMap<T> {
    objects: Vec<T>,
    cumulative: Vec<f64>,
}

impl<T> DistanceMap<T> {
    /// `distances[i]` is the gap between `objects[i]` and `objects[i + 1]`.
    pub fn new(objects: Vec<T>, distances: &[f64]) -> Result<DistanceMap<T>, SplineError> {
        if objects.is_empty() || distances.len() + 1 != objects.len() {
            return Err(SplineError::LengthMismatch {
                objects: objects.len(),
                distances: distances.len(),
            });
        }

        let mut cumulative = Vec::with_capacity(objects.len());
        cumulative.push(0.0);
        for distance in distances {
            let last = cumulative[cumulative.len() - 1];
            cumulative.push(last + distance);
        }

        Ok(DistanceMap {
            objects,
            cumulative,
        })
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn total_length(&self) -> f64 {
        self.cumulative[self.cumulative.len() - 1]
    }

    pub fn objects(&self) -> &[T] {
        &self.objects
    }

    /// Index of the last object whose cumulative distance is at or before `x`.
    pub fn index_at(&self, x: f64) -> usize {
        let last = self.objects.len() - 1;
        // also catches NaN
        if !(x > 0.0) {
            return 0;
        }
        if x >= self.total_length() {
            return last;
        }

        let after = self.cumulative.partition_point(|&c| c <= x);
        after.saturating_sub(1).min(last)
    }

    pub fn object_at(&self, x: f64) -> &T {
        &self.objects[self.index_at(x)]
    }

    pub fn closest_distance_at(&self, x: f64) -> f64 {
        self.cumulative[self.index_at(x)]
    }

    pub fn cumulative_at(&self, index: usize) -> f64 {
        self.cumulative[index.min(self.cumulative.len() - 1)]
    }

    /// How far `x` has got from `index_at(x)` towards the object after it, in [0, 1].
    pub fn lerp_fraction_to_next(&self, x: f64) -> f64 {
        if !(x > 0.0) {
            return 0.0;
        }
        if x >= self.total_length() {
            return 1.0;
        }

        let index = self.index_at(x);
        let start = self.cumulative[index];
        let span = self.cumulative[index + 1] - start;
        if span <= 0.0 {
            return 0.0;
        }
        (x - start) / span
    }
}
