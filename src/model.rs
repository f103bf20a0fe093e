pub mod entity {
    use std::collections::BTreeMap;

    use super::ModelError;

    pub type Name = String;
    pub type Utility = i64;

    /// A guest and the utility they gain from sitting next to each other guest.
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct Person {
        pub name: Name,
        utilities: BTreeMap<Name, Utility>,
    }

    impl Person {
        pub fn new(name: impl Into<Name>) -> Person {
            Person {
                name: name.into(),
                utilities: BTreeMap::new(),
            }
        }

        /// Builder-style variant of [`Person::set_utility`].
        pub fn with_utility(mut self, other: impl Into<Name>, utility: Utility) -> Result<Person, ModelError> {
            self.set_utility(other, utility)?;
            Ok(self)
        }

        pub fn set_utility(&mut self, other: impl Into<Name>, utility: Utility) -> Result<(), ModelError> {
            let other = other.into();
            if other == self.name {
                return Err(ModelError::SelfReference { name: other });
            }
            self.utilities.insert(other, utility);
            Ok(())
        }

        /// Utility toward `other`, 0 when undefined.
        pub fn utility(&self, other: &str) -> Utility {
            self.utilities.get(other).copied().unwrap_or(0)
        }

        pub fn has_utility(&self, other: &str) -> bool {
            self.utilities.contains_key(other)
        }

        pub fn utilities(&self) -> impl Iterator<Item = (&Name, Utility)> {
            self.utilities.iter().map(|(name, utility)| (name, *utility))
        }
    }
}

pub mod guest {
    use std::collections::BTreeMap;

    use super::entity::{Name, Person, Utility};
    use super::ModelError;

    /// Every person under consideration, keyed by unique name.
    #[derive(Debug, Clone, Default, PartialEq, Eq)]
    pub struct GuestList {
        people: BTreeMap<Name, Person>,
    }

    impl GuestList {
        pub fn new() -> GuestList {
            GuestList::default()
        }

        pub fn from_people(people: impl IntoIterator<Item = Person>) -> Result<GuestList, ModelError> {
            let mut guests = GuestList::new();
            for person in people {
                guests.insert(person)?;
            }
            Ok(guests)
        }

        pub fn insert(&mut self, person: Person) -> Result<(), ModelError> {
            if self.people.contains_key(&person.name) {
                return Err(ModelError::DuplicatePerson { name: person.name });
            }
            self.people.insert(person.name.clone(), person);
            Ok(())
        }

        pub fn get(&self, name: &str) -> Option<&Person> {
            self.people.get(name)
        }

        /// Directed utility `from -> to`; unknown people and undefined entries are 0.
        pub fn utility(&self, from: &str, to: &str) -> Utility {
            self.people.get(from).map_or(0, |person| person.utility(to))
        }

        /// Names in ascending order.
        pub fn names(&self) -> impl Iterator<Item = &Name> {
            self.people.keys()
        }

        pub fn people(&self) -> impl Iterator<Item = &Person> {
            self.people.values()
        }

        pub fn len(&self) -> usize {
            self.people.len()
        }

        pub fn is_empty(&self) -> bool {
            self.people.is_empty()
        }
    }
}

pub mod arrangement {
    use std::collections::HashSet;
    use std::fmt;

    use serde::Serialize;

    use super::entity::Name;
    use super::guest::GuestList;

    /// Wide enough for a full row of `i64::MAX` utilities in both directions.
    pub type Score = i128;

    /// Left-to-right seating order.
    #[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
    #[serde(transparent)]
    pub struct Arrangement(pub Vec<Name>);

    impl Arrangement {
        pub fn new<S: Into<Name>>(names: impl IntoIterator<Item = S>) -> Arrangement {
            Arrangement(names.into_iter().map(Into::into).collect())
        }

        pub fn names(&self) -> &[Name] {
            &self.0
        }

        pub fn len(&self) -> usize {
            self.0.len()
        }

        pub fn is_empty(&self) -> bool {
            self.0.is_empty()
        }

        pub fn reversed(&self) -> Arrangement {
            Arrangement(self.0.iter().rev().cloned().collect())
        }

        /// True when every guest is seated exactly once and nobody else is.
        pub fn is_complete(&self, guests: &GuestList) -> bool {
            let mut seen = HashSet::with_capacity(self.0.len());
            self.0.len() == guests.len()
                && self.0.iter().all(|name| guests.get(name).is_some() && seen.insert(name))
        }
    }

    impl fmt::Display for Arrangement {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "{}", self.0.join(" - "))
        }
    }
}

use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ModelError {
    #[error("person `{name}` is listed more than once")]
    DuplicatePerson { name: String },
    #[error("person `{name}` has a utility toward themselves")]
    SelfReference { name: String },
    #[error("person `{person}` has a utility toward `{missing}`, who is not on the guest list")]
    ReferentialIntegrity { person: String, missing: String },
}
