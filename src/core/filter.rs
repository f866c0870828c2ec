//! Group filtering of transition firings.
//!
//! Groups are display-only tags attached to a firing by the server. The
//! filter decides which firings are shown in the graph and which trace rows
//! are flagged as filtered out.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Pseudo-group matching firings that carry no group at all.
pub const OTHERS: &str = "others";

/// Set of active groups, plus whether ungrouped firings are shown.
///
/// # Example
///
/// ```rust
/// use simtrace::core::GroupFilter;
///
/// let mut filter = GroupFilter::all(["timed", "even", "odd"]);
/// assert!(filter.process_group(&[]));
/// assert!(filter.process_group(&["odd".to_string()]));
///
/// filter.set_others(false);
/// filter.set_group("odd", false);
/// assert!(!filter.process_group(&[]));
/// assert!(!filter.process_group(&["odd".to_string()]));
/// assert!(filter.process_group(&["odd".to_string(), "timed".to_string()]));
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupFilter {
    known: BTreeSet<String>,
    active: BTreeSet<String>,
    others: bool,
}

impl Default for GroupFilter {
    fn default() -> Self {
        Self::all(std::iter::empty::<String>())
    }
}

impl GroupFilter {
    /// Filter with every known group active and "others" shown.
    pub fn all<I, G>(groups: I) -> Self
    where
        I: IntoIterator<Item = G>,
        G: Into<String>,
    {
        let known: BTreeSet<String> = groups.into_iter().map(Into::into).collect();
        Self {
            active: known.clone(),
            known,
            others: true,
        }
    }

    /// Decide whether a firing with these groups passes the filter.
    ///
    /// An ungrouped firing passes iff "others" is active; otherwise the
    /// firing passes iff one of its groups is active.
    pub fn process_group(&self, groups: &[String]) -> bool {
        if groups.is_empty() {
            self.others
        } else {
            groups.iter().any(|g| self.active.contains(g))
        }
    }

    /// Toggle one group; the name [`OTHERS`] toggles the ungrouped case.
    pub fn set_group(&mut self, group: &str, active: bool) {
        if group == OTHERS {
            self.others = active;
            return;
        }
        self.known.insert(group.to_string());
        if active {
            self.active.insert(group.to_string());
        } else {
            self.active.remove(group);
        }
    }

    pub fn set_others(&mut self, active: bool) {
        self.others = active;
    }

    /// Make groups announced by the server known, active by default.
    pub fn learn<'a, I>(&mut self, groups: I)
    where
        I: IntoIterator<Item = &'a String>,
    {
        for group in groups {
            if self.known.insert(group.clone()) {
                self.active.insert(group.clone());
            }
        }
    }

    pub fn is_active(&self, group: &str) -> bool {
        if group == OTHERS {
            self.others
        } else {
            self.active.contains(group)
        }
    }

    /// Known groups in display order, [`OTHERS`] last.
    pub fn groups(&self) -> impl Iterator<Item = &str> {
        self.known
            .iter()
            .map(String::as_str)
            .chain(std::iter::once(OTHERS))
    }
}
