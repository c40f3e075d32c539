use std::fmt::{self, Formatter};

/// How many times a setup is expected to have handled a call.
///
/// Bounds are inclusive. The default expectation of every setup is
/// [`Times::at_least_once`], which is what "was matched" means.
///
/// ```
/// use standin::Times;
///
/// assert!(Times::between(2, 4).contains(3));
/// assert!(!Times::at_most(1).contains(2));
/// assert_eq!(Times::exactly(2).to_string(), "exactly 2 times");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Times {
    min: usize,
    max: Option<usize>,
}

impl Times {
    pub fn never() -> Self {
        Times::exactly(0)
    }

    pub fn once() -> Self {
        Times::exactly(1)
    }

    pub fn exactly(n: usize) -> Self {
        Times {
            min: n,
            max: Some(n),
        }
    }

    pub fn at_least(n: usize) -> Self {
        Times { min: n, max: None }
    }

    pub fn at_least_once() -> Self {
        Times::at_least(1)
    }

    pub fn at_most(n: usize) -> Self {
        Times {
            min: 0,
            max: Some(n),
        }
    }

    /// # Panics
    ///
    /// If `min` is greater than `max`.
    pub fn between(min: usize, max: usize) -> Self {
        assert!(min <= max, "invalid range: {} > {}", min, max);
        Times {
            min,
            max: Some(max),
        }
    }

    pub fn contains(&self, count: usize) -> bool {
        count >= self.min && self.max.map_or(true, |max| count <= max)
    }
}

impl Default for Times {
    fn default() -> Self {
        Times::at_least_once()
    }
}

fn times(n: usize) -> &'static str {
    if n == 1 {
        "time"
    } else {
        "times"
    }
}

impl fmt::Display for Times {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match (self.min, self.max) {
            (0, Some(0)) => f.write_str("never"),
            (min, Some(max)) if min == max => write!(f, "exactly {} {}", min, times(min)),
            (0, Some(max)) => write!(f, "at most {} {}", max, times(max)),
            (min, None) => write!(f, "at least {} {}", min, times(min)),
            (min, Some(max)) => write!(f, "between {} and {} times", min, max),
        }
    }
}
