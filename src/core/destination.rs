//! Log destinations and the destination set

use serde::{Deserialize, Serialize};
use std::ops::BitOr;

/// A single output destination for log records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Destination {
    Console,
    File,
    Adapters,
}

const ALL_DESTINATIONS: [Destination; 3] =
    [Destination::Console, Destination::File, Destination::Adapters];

/// An open, non-exclusive set of destinations
///
/// Any combination is valid, including the empty set. Membership is a pure
/// test with no state.
///
/// # Examples
///
/// ```
/// use diaglog::core::{Destination, Destinations};
///
/// let dests = Destinations::of(&[Destination::Console, Destination::File]);
/// assert!(dests.contains(Destination::Console));
/// assert!(!dests.contains(Destination::Adapters));
///
/// let all = dests | Destinations::of(&[Destination::Adapters]);
/// assert_eq!(all, Destinations::all());
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Destinations {
    console: bool,
    file: bool,
    adapters: bool,
}

impl Destinations {
    /// The empty set: records are filtered and formatted but go nowhere
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// All three destinations
    #[must_use]
    pub fn all() -> Self {
        Self::of(&ALL_DESTINATIONS)
    }

    /// Build a set from a slice of destinations
    #[must_use]
    pub fn of(destinations: &[Destination]) -> Self {
        let mut set = Self::empty();
        for d in destinations {
            set.insert(*d);
        }
        set
    }

    pub fn insert(&mut self, destination: Destination) {
        match destination {
            Destination::Console => self.console = true,
            Destination::File => self.file = true,
            Destination::Adapters => self.adapters = true,
        }
    }

    #[must_use]
    pub fn contains(&self, destination: Destination) -> bool {
        match destination {
            Destination::Console => self.console,
            Destination::File => self.file,
            Destination::Adapters => self.adapters,
        }
    }

    #[must_use]
    pub fn union(&self, other: Self) -> Self {
        Self {
            console: self.console || other.console,
            file: self.file || other.file,
            adapters: self.adapters || other.adapters,
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        !(self.console || self.file || self.adapters)
    }
}

impl BitOr for Destinations {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        self.union(rhs)
    }
}

impl From<Destination> for Destinations {
    fn from(destination: Destination) -> Self {
        Self::of(&[destination])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_set() {
        let dests = Destinations::empty();
        assert!(dests.is_empty());
        for d in ALL_DESTINATIONS {
            assert!(!dests.contains(d));
        }
    }

    #[test]
    fn test_all_set() {
        let dests = Destinations::all();
        for d in ALL_DESTINATIONS {
            assert!(dests.contains(d));
        }
    }

    #[test]
    fn test_union() {
        let console = Destinations::from(Destination::Console);
        let file = Destinations::from(Destination::File);
        let both = console | file;

        assert!(both.contains(Destination::Console));
        assert!(both.contains(Destination::File));
        assert!(!both.contains(Destination::Adapters));
    }

    #[test]
    fn test_insert_is_idempotent() {
        let mut dests = Destinations::empty();
        dests.insert(Destination::File);
        dests.insert(Destination::File);
        assert_eq!(dests, Destinations::from(Destination::File));
    }
}
