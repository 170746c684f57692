/// A single subtitle cue. Times are in seconds.
#[derive(Debug, Clone, PartialEq)]
pub struct Cue {
    /// Sequence number as written in the source file, when the format has one.
    pub index: Option<u32>,
    pub start_time: f64,
    pub end_time: f64,
    /// Display text. Lines are joined with `\n`; inline markup is left as-is.
    pub text: String,
}

impl Cue {
    pub fn new(start_time: f64, end_time: f64, text: impl Into<String>) -> Self {
        Self {
            index: None,
            start_time,
            end_time,
            text: text.into(),
        }
    }

    pub fn with_index(mut self, index: u32) -> Self {
        self.index = Some(index);
        self
    }

    /// Both ends are inclusive.
    pub fn contains(&self, time: f64) -> bool {
        time >= self.start_time && time <= self.end_time
    }

    pub fn duration(&self) -> f64 {
        self.end_time - self.start_time
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contains_is_inclusive() {
        let cue = Cue::new(1.0, 2.5, "Hello");
        assert!(cue.contains(1.0));
        assert!(cue.contains(2.0));
        assert!(cue.contains(2.5));
        assert!(!cue.contains(0.999));
        assert!(!cue.contains(2.501));
    }

    #[test]
    fn duration() {
        assert_eq!(Cue::new(3.0, 4.25, "").duration(), 1.25);
    }
}
