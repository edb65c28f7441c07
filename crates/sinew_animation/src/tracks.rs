use crate::values::Interpolatable;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Keyframe<T> {
    pub time: f32,
    pub value: T,
}

impl<T> Keyframe<T> {
    #[inline]
    pub fn new(time: f32, value: T) -> Self {
        Self { time, value }
    }
}

/// A keyframe track sorted ascending by timestamp.
///
/// Time is expressed in clip ticks. Sampling past the last key is a caller
/// error: clip samplers wrap or clamp time into `[0, duration]` first.
#[derive(Debug, Clone)]
pub struct KeyframeTrack<T: Interpolatable> {
    keys: Vec<Keyframe<T>>,
}

impl<T: Interpolatable> Default for KeyframeTrack<T> {
    fn default() -> Self {
        Self { keys: Vec::new() }
    }
}

impl<T: Interpolatable> KeyframeTrack<T> {
    /// Builds a track from keys, sorting them by time.
    #[must_use]
    pub fn new(mut keys: Vec<Keyframe<T>>) -> Self {
        keys.sort_by(|a, b| a.time.total_cmp(&b.time));
        Self { keys }
    }

    /// A track holding a single constant value.
    #[must_use]
    pub fn constant(value: T) -> Self {
        Self {
            keys: vec![Keyframe::new(0.0, value)],
        }
    }

    #[must_use]
    pub fn from_pairs(times: &[f32], values: &[T]) -> Self {
        debug_assert_eq!(times.len(), values.len(), "times/values length mismatch");
        Self::new(
            times
                .iter()
                .zip(values)
                .map(|(&time, &value)| Keyframe::new(time, value))
                .collect(),
        )
    }

    #[inline]
    #[must_use]
    pub fn keys(&self) -> &[Keyframe<T>] {
        &self.keys
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Timestamp of the last key, 0 for an empty track.
    #[must_use]
    pub fn end_time(&self) -> f32 {
        self.keys.last().map_or(0.0, |k| k.time)
    }

    /// Samples the track at `time`.
    ///
    /// - no keys: [`Interpolatable::IDENTITY`]
    /// - one key: that key's value, whatever the time
    /// - otherwise: the first segment `i` with `time <= keys[i + 1].time`,
    ///   interpolated by `alpha = (time - t_i) / (t_i+1 - t_i)`
    #[must_use]
    pub fn interpolate(&self, time: f32) -> T {
        match self.keys.as_slice() {
            [] => T::IDENTITY,
            [only] => only.value,
            keys => {
                let index = Self::segment_index(keys, time);
                debug_assert!(
                    index.is_some(),
                    "keyframe time {time} beyond last key {}",
                    self.end_time()
                );
                let Some(index) = index else {
                    return keys[keys.len() - 1].value;
                };

                let k0 = &keys[index];
                let k1 = &keys[index + 1];
                let alpha = Self::scale_factor(k0.time, k1.time, time);
                T::interpolate_linear(k0.value, k1.value, alpha)
            }
        }
    }

    fn segment_index(keys: &[Keyframe<T>], time: f32) -> Option<usize> {
        keys.windows(2).position(|pair| time <= pair[1].time)
    }

    /// Normalized position of `time` between two timestamps.
    ///
    /// Times before the first key clamp to it; coincident keys yield 0.
    fn scale_factor(t0: f32, t1: f32, time: f32) -> f32 {
        let span = t1 - t0;
        if span <= 0.0 {
            return 0.0;
        }
        ((time - t0) / span).max(0.0)
    }
}
