//! Collection wrapper types for displaying groups of domain objects.

use std::{fmt, ops::Index};

use crate::models::{Backup, DrPlan, Instance, Server};

/// Newtype wrapper for displaying a page of DR plans.
///
/// ```rust
/// use fleetdr_core::display::DrPlans;
///
/// let plans = DrPlans(Vec::new());
/// assert!(plans.is_empty());
/// assert_eq!(format!("{plans}"), "No DR plans found.\n");
/// ```
pub struct DrPlans(pub Vec<DrPlan>);

impl DrPlans {
    /// Check if the collection is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Get the number of plans in the collection.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Get a reference to the plan at the given index.
    pub fn get(&self, index: usize) -> Option<&DrPlan> {
        self.0.get(index)
    }

    /// Get an iterator over the plans.
    pub fn iter(&self) -> std::slice::Iter<'_, DrPlan> {
        self.0.iter()
    }
}

impl Index<usize> for DrPlans {
    type Output = DrPlan;

    fn index(&self, index: usize) -> &Self::Output {
        &self.0[index]
    }
}

impl IntoIterator for DrPlans {
    type Item = DrPlan;
    type IntoIter = std::vec::IntoIter<Self::Item>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a DrPlans {
    type Item = &'a DrPlan;
    type IntoIter = std::slice::Iter<'a, DrPlan>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl fmt::Display for DrPlans {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            writeln!(f, "No DR plans found.")
        } else {
            for plan in &self.0 {
                plan.fmt_summary(f)?;
            }
            Ok(())
        }
    }
}

/// Newtype wrapper for displaying an instance's backups.
pub struct Backups(pub Vec<Backup>);

impl Backups {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

impl fmt::Display for Backups {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return writeln!(f, "No backups found.");
        }
        for backup in &self.0 {
            write!(f, "{backup}")?;
        }
        Ok(())
    }
}

/// Newtype wrapper for displaying registered servers.
pub struct Servers(pub Vec<Server>);

impl fmt::Display for Servers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return writeln!(f, "No servers registered.");
        }
        for server in &self.0 {
            write!(f, "{server}")?;
        }
        Ok(())
    }
}

/// Newtype wrapper for displaying registered instances.
pub struct Instances(pub Vec<Instance>);

impl fmt::Display for Instances {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return writeln!(f, "No instances registered.");
        }
        for instance in &self.0 {
            write!(f, "{instance}")?;
        }
        Ok(())
    }
}
