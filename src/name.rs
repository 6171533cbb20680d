//! Interned strings used for variable and parameter names.
//!
//! Blackboard lookups compare names a lot, so names are interned into a
//! process-wide heap and compared by pointer instead of by content.

use ::once_cell::sync::Lazy;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::fmt::{Debug, Display, Formatter, Result as FmtResult};
use std::ops::Deref;
use std::sync::Mutex;

static NAME_HEAP: Lazy<Mutex<BTreeSet<&'static str>>> = Lazy::new(|| Mutex::new(BTreeSet::new()));

/// An interned name with O(1) equality.
///
/// Two `Name`s created from equal strings share the same backing allocation,
/// so equality reduces to an address comparison.
#[allow(clippy::derived_hash_with_manual_eq)]
#[derive(Clone, Copy, Eq, Hash)]
pub struct Name {
    s: &'static str,
}

impl Name {
    /// Retrieves the backing string.
    pub fn as_str(self) -> &'static str {
        self.s
    }

    fn addr(self) -> usize {
        self.s.as_ptr() as usize
    }
}

impl<S: AsRef<str>> From<S> for Name {
    fn from(s: S) -> Name {
        let s = s.as_ref();
        let mut heap = NAME_HEAP.lock().unwrap();
        let interned = match heap.get(s) {
            Some(interned) => *interned,
            None => {
                let leaked: &'static str = Box::leak(s.to_owned().into_boxed_str());
                heap.insert(leaked);
                leaked
            }
        };
        Name { s: interned }
    }
}

impl Debug for Name {
    fn fmt(&self, fmt: &mut Formatter) -> FmtResult {
        Debug::fmt(self.s, fmt)
    }
}

impl Display for Name {
    fn fmt(&self, fmt: &mut Formatter) -> FmtResult {
        fmt.write_str(self.s)
    }
}

impl Deref for Name {
    type Target = str;
    fn deref(&self) -> &str {
        self.s
    }
}

impl PartialEq for Name {
    fn eq(&self, other: &Self) -> bool {
        self.addr() == other.addr()
    }
}

impl Ord for Name {
    fn cmp(&self, other: &Self) -> Ordering {
        self.s.cmp(other.s)
    }
}

impl PartialOrd for Name {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<S: AsRef<str>> PartialEq<S> for Name {
    fn eq(&self, other: &S) -> bool {
        self.s == other.as_ref()
    }
}

impl Serialize for Name {
    fn serialize<S: Serializer>(&self, ser: S) -> Result<S::Ok, S::Error> {
        ser.serialize_str(self.s)
    }
}

impl<'de> Deserialize<'de> for Name {
    fn deserialize<D: Deserializer<'de>>(de: D) -> Result<Name, D::Error> {
        String::deserialize(de).map(Name::from)
    }
}
