//! Ordered fallback lookup
//!
//! Nearly every reconciled field tries the same thing: a short, ordered list
//! of candidate sources, each optionally guarded by a validator, first hit
//! wins. The order differs per field (own-first, legacy-first) and is part
//! of the output contract, so the caller spells it out explicitly; this
//! builder only removes the repeated `if`-chains.

/// Builder over an ordered list of `(candidate, validator)` pairs
#[derive(Debug, Clone, Copy)]
pub struct Lookup<'a> {
    value: Option<&'a str>,
}

impl<'a> Lookup<'a> {
    /// Start an empty lookup
    pub fn start() -> Self {
        Self { value: None }
    }

    /// Try a candidate; any present value is accepted
    pub fn then(self, candidate: Option<&'a str>) -> Self {
        match self.value {
            Some(_) => self,
            None => Self { value: candidate },
        }
    }

    /// Try a candidate guarded by a validator
    pub fn then_if(self, candidate: Option<&'a str>, valid: impl Fn(&str) -> bool) -> Self {
        match self.value {
            Some(_) => self,
            None => Self {
                value: candidate.filter(|v| valid(v)),
            },
        }
    }

    /// The first candidate that survived, if any
    pub fn found(self) -> Option<&'a str> {
        self.value
    }
}
