//! Configurations and the sets they are visited from.
//!
//! A [`Configuration`] is the full state vector of robot, manipulated object
//! and supports. Sets are built once (generated by the planner or read from
//! disk) and only read afterwards.

use std::fmt;

use crate::error::{CalibrationError, Result};
use crate::tour::Tour;

/// Full-state coordinate vector.
///
/// Equality is value equality on the coordinates.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Configuration(Vec<f64>);

impl Configuration {
    pub fn new(coordinates: Vec<f64>) -> Self {
        Self(coordinates)
    }

    /// Number of coordinates.
    pub fn dim(&self) -> usize {
        self.0.len()
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    pub fn into_inner(self) -> Vec<f64> {
        self.0
    }
}

impl From<Vec<f64>> for Configuration {
    fn from(coordinates: Vec<f64>) -> Self {
        Self(coordinates)
    }
}

impl AsRef<[f64]> for Configuration {
    fn as_ref(&self) -> &[f64] {
        &self.0
    }
}

impl fmt::Display for Configuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, x) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{x}")?;
        }
        write!(f, "]")
    }
}

/// Identifier of a graspable feature on a manipulated object (e.g. `table/contact_03`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct HandleId(String);

impl HandleId {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for HandleId {
    fn from(name: &str) -> Self {
        Self(name.to_string())
    }
}

impl From<String> for HandleId {
    fn from(name: String) -> Self {
        Self(name)
    }
}

impl fmt::Display for HandleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Ordered configurations, each tagged with the handle it was generated for.
///
/// Insertion order is generation order. Untagged entries are plain
/// waypoints for free motion.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigurationSet {
    configurations: Vec<Configuration>,
    handles: Vec<Option<HandleId>>,
}

impl ConfigurationSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds an untagged set.
    pub fn from_configurations(configurations: Vec<Configuration>) -> Self {
        let handles = vec![None; configurations.len()];
        Self {
            configurations,
            handles,
        }
    }

    /// Appends a configuration with its handle tag.
    pub fn push(&mut self, configuration: Configuration, handle: Option<HandleId>) {
        self.configurations.push(configuration);
        self.handles.push(handle);
    }

    pub fn len(&self) -> usize {
        self.configurations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.configurations.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Configuration> {
        self.configurations.get(index)
    }

    pub fn handle(&self, index: usize) -> Option<&HandleId> {
        self.handles.get(index).and_then(Option::as_ref)
    }

    pub fn configurations(&self) -> &[Configuration] {
        &self.configurations
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Configuration, Option<&HandleId>)> {
        self.configurations
            .iter()
            .zip(self.handles.iter().map(Option::as_ref))
    }

    /// Returns the shared coordinate count, or `None` for an empty set.
    ///
    /// # Errors
    ///
    /// `DimensionMismatch` naming the first configuration whose length
    /// differs from the first entry.
    pub fn common_dimension(&self) -> Result<Option<usize>> {
        let Some(first) = self.configurations.first() else {
            return Ok(None);
        };
        let expected = first.dim();
        for (index, q) in self.configurations.iter().enumerate().skip(1) {
            if q.dim() != expected {
                return Err(CalibrationError::DimensionMismatch {
                    index,
                    expected,
                    actual: q.dim(),
                });
            }
        }
        Ok(Some(expected))
    }

    /// Returns the configurations in tour order.
    pub fn ordered(&self, tour: &Tour) -> Result<Self> {
        check_tour_len(tour, self.len())?;
        let mut out = Self::new();
        for &i in tour.iter() {
            out.push(self.configurations[i].clone(), self.handles[i].clone());
        }
        Ok(out)
    }
}

impl FromIterator<Configuration> for ConfigurationSet {
    fn from_iter<I: IntoIterator<Item = Configuration>>(iter: I) -> Self {
        Self::from_configurations(iter.into_iter().collect())
    }
}

/// One calibration stop: the pre-grasp configuration, the contact
/// configuration reached from it, and the handle being touched.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CalibrationTarget {
    pub pregrasp: Configuration,
    pub contact: Configuration,
    pub handle: HandleId,
}

/// Calibration targets in generation order.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TargetSet {
    targets: Vec<CalibrationTarget>,
}

impl TargetSet {
    pub fn new(targets: Vec<CalibrationTarget>) -> Self {
        Self { targets }
    }

    /// Zips the three companion sequences into targets.
    ///
    /// # Errors
    ///
    /// `InvalidInput` if the sequences differ in length.
    pub fn from_parts(
        pregrasps: Vec<Configuration>,
        contacts: Vec<Configuration>,
        handles: Vec<HandleId>,
    ) -> Result<Self> {
        if pregrasps.len() != contacts.len() || pregrasps.len() != handles.len() {
            return Err(CalibrationError::InvalidInput(format!(
                "{} pre-grasps, {} contacts and {} handles do not pair up",
                pregrasps.len(),
                contacts.len(),
                handles.len()
            )));
        }
        let targets = pregrasps
            .into_iter()
            .zip(contacts)
            .zip(handles)
            .map(|((pregrasp, contact), handle)| CalibrationTarget {
                pregrasp,
                contact,
                handle,
            })
            .collect();
        Ok(Self { targets })
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&CalibrationTarget> {
        self.targets.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, CalibrationTarget> {
        self.targets.iter()
    }

    /// Pre-grasp configurations tagged with their handles, the set a tour is
    /// built over.
    pub fn pregrasp_set(&self) -> ConfigurationSet {
        let mut set = ConfigurationSet::new();
        for t in &self.targets {
            set.push(t.pregrasp.clone(), Some(t.handle.clone()));
        }
        set
    }

    /// Reorders targets so that contacts and handles follow their pre-grasps.
    pub fn reordered(&self, tour: &Tour) -> Result<Self> {
        check_tour_len(tour, self.len())?;
        Ok(Self {
            targets: tour.iter().map(|&i| self.targets[i].clone()).collect(),
        })
    }

    pub fn pregrasps(&self) -> impl Iterator<Item = &Configuration> {
        self.targets.iter().map(|t| &t.pregrasp)
    }

    pub fn contacts(&self) -> impl Iterator<Item = &Configuration> {
        self.targets.iter().map(|t| &t.contact)
    }

    pub fn handles(&self) -> impl Iterator<Item = &HandleId> {
        self.targets.iter().map(|t| &t.handle)
    }
}

impl<'a> IntoIterator for &'a TargetSet {
    type Item = &'a CalibrationTarget;
    type IntoIter = std::slice::Iter<'a, CalibrationTarget>;

    fn into_iter(self) -> Self::IntoIter {
        self.targets.iter()
    }
}

fn check_tour_len(tour: &Tour, len: usize) -> Result<()> {
    if tour.len() != len {
        return Err(CalibrationError::InvalidInput(format!(
            "tour visits {} configurations but the set holds {}",
            tour.len(),
            len
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn q(xs: &[f64]) -> Configuration {
        Configuration::new(xs.to_vec())
    }

    #[test]
    fn test_common_dimension_empty() {
        let set = ConfigurationSet::new();
        assert_eq!(set.common_dimension().unwrap(), None);
    }

    #[test]
    fn test_common_dimension_mismatch_names_index() {
        let set: ConfigurationSet = vec![q(&[0.0, 1.0]), q(&[1.0, 1.0]), q(&[2.0])]
            .into_iter()
            .collect();
        match set.common_dimension() {
            Err(CalibrationError::DimensionMismatch {
                index,
                expected,
                actual,
            }) => {
                assert_eq!(index, 2);
                assert_eq!(expected, 2);
                assert_eq!(actual, 1);
            }
            other => panic!("expected DimensionMismatch, got {other:?}"),
        }
    }

    #[test]
    fn test_configuration_display() {
        assert_eq!(q(&[1.0, -0.5]).to_string(), "[1, -0.5]");
    }

    #[test]
    fn test_target_set_reordered_keeps_association() {
        let targets = TargetSet::from_parts(
            vec![q(&[0.0]), q(&[1.0]), q(&[2.0])],
            vec![q(&[10.0]), q(&[11.0]), q(&[12.0])],
            vec!["h0".into(), "h1".into(), "h2".into()],
        )
        .unwrap();
        let tour = Tour::new(vec![0, 2, 1]).unwrap();
        let ordered = targets.reordered(&tour).unwrap();

        let handles: Vec<&str> = ordered.handles().map(HandleId::as_str).collect();
        assert_eq!(handles, vec!["h0", "h2", "h1"]);
        for t in &ordered {
            assert_eq!(t.contact.as_slice()[0], t.pregrasp.as_slice()[0] + 10.0);
        }
    }

    #[test]
    fn test_target_set_from_parts_length_mismatch() {
        let result = TargetSet::from_parts(vec![q(&[0.0])], vec![], vec!["h".into()]);
        assert!(matches!(result, Err(CalibrationError::InvalidInput(_))));
    }

    #[test]
    fn test_reordered_rejects_wrong_tour_length() {
        let targets = TargetSet::from_parts(vec![q(&[0.0])], vec![q(&[1.0])], vec!["h".into()])
            .unwrap();
        let tour = Tour::new(vec![0, 1]).unwrap();
        assert!(targets.reordered(&tour).is_err());
    }
}
