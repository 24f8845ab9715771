//! Filter Pipeline
//!
//! Boxed filter steps over one item type. A step may only be built for an
//! item type that implements the capability it reads, so an unsupported
//! filter is a compile error rather than a runtime check.

use super::capability::{HasContent, HasCreatedAt, HasLength, HasMetadata, HasName};
use crate::error::Result;
use std::collections::HashMap;

/// One narrowing step
pub trait Filter<T>: Send + Sync {
    /// Short description used in progress logging
    fn label(&self) -> String;

    /// Reject bad arguments without looking at any item
    fn validate(&self) -> Result<()> {
        Ok(())
    }

    fn apply(&self, items: Vec<T>) -> Result<Vec<T>>;
}

/// Created within the last `days` days
#[derive(Debug, Clone, Copy)]
pub struct DaysLte {
    pub days: f64,
    pub now: Option<i64>,
}

impl DaysLte {
    pub fn new(days: f64) -> Self {
        Self { days, now: None }
    }

    /// Evaluate against a fixed clock instead of the time of the call
    pub fn at(mut self, now: i64) -> Self {
        self.now = Some(now);
        self
    }
}

impl<T: HasCreatedAt> Filter<T> for DaysLte {
    fn label(&self) -> String {
        format!("created within {} days", self.days)
    }

    fn validate(&self) -> Result<()> {
        super::check_days(self.days)
    }

    fn apply(&self, items: Vec<T>) -> Result<Vec<T>> {
        let now = self.now.unwrap_or_else(super::now_unix);
        super::days_lte_at(items, self.days, now)
    }
}

/// Created more than `days` days ago
#[derive(Debug, Clone, Copy)]
pub struct DaysGt {
    pub days: f64,
    pub now: Option<i64>,
}

impl DaysGt {
    pub fn new(days: f64) -> Self {
        Self { days, now: None }
    }

    pub fn at(mut self, now: i64) -> Self {
        self.now = Some(now);
        self
    }
}

impl<T: HasCreatedAt> Filter<T> for DaysGt {
    fn label(&self) -> String {
        format!("older than {} days", self.days)
    }

    fn validate(&self) -> Result<()> {
        super::check_days(self.days)
    }

    fn apply(&self, items: Vec<T>) -> Result<Vec<T>> {
        let now = self.now.unwrap_or_else(super::now_unix);
        super::days_gt_at(items, self.days, now)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct LengthLte(pub i64);

impl<T: HasLength> Filter<T> for LengthLte {
    fn label(&self) -> String {
        format!("length <= {}", self.0)
    }

    fn validate(&self) -> Result<()> {
        super::check_length(self.0)
    }

    fn apply(&self, items: Vec<T>) -> Result<Vec<T>> {
        super::length_lte(items, self.0)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct LengthGt(pub i64);

impl<T: HasLength> Filter<T> for LengthGt {
    fn label(&self) -> String {
        format!("length > {}", self.0)
    }

    fn validate(&self) -> Result<()> {
        super::check_length(self.0)
    }

    fn apply(&self, items: Vec<T>) -> Result<Vec<T>> {
        super::length_gt(items, self.0)
    }
}

#[derive(Debug, Clone)]
pub struct ContainsName(pub Vec<String>);

impl<T: HasName> Filter<T> for ContainsName {
    fn label(&self) -> String {
        format!("name contains {:?}", self.0)
    }

    fn apply(&self, items: Vec<T>) -> Result<Vec<T>> {
        Ok(super::contains_name(items, &self.0))
    }
}

#[derive(Debug, Clone)]
pub struct NotContainsName(pub Vec<String>);

impl<T: HasName> Filter<T> for NotContainsName {
    fn label(&self) -> String {
        format!("name excludes {:?}", self.0)
    }

    fn apply(&self, items: Vec<T>) -> Result<Vec<T>> {
        Ok(super::not_contains_name(items, &self.0))
    }
}

#[derive(Debug, Clone)]
pub struct ContainsContent(pub Vec<String>);

impl<T: HasContent> Filter<T> for ContainsContent {
    fn label(&self) -> String {
        format!("content contains {:?}", self.0)
    }

    fn apply(&self, items: Vec<T>) -> Result<Vec<T>> {
        Ok(super::contains_content(items, &self.0))
    }
}

#[derive(Debug, Clone)]
pub struct NotContainsContent(pub Vec<String>);

impl<T: HasContent> Filter<T> for NotContainsContent {
    fn label(&self) -> String {
        format!("content excludes {:?}", self.0)
    }

    fn apply(&self, items: Vec<T>) -> Result<Vec<T>> {
        Ok(super::not_contains_content(items, &self.0))
    }
}

#[derive(Debug, Clone)]
pub struct MetadataEquals(pub HashMap<String, String>);

impl<T: HasMetadata> Filter<T> for MetadataEquals {
    fn label(&self) -> String {
        let mut pairs: Vec<String> = self.0.iter().map(|(k, v)| format!("{}={}", k, v)).collect();
        pairs.sort();
        format!("metadata {}", pairs.join(","))
    }

    fn apply(&self, items: Vec<T>) -> Result<Vec<T>> {
        Ok(super::metadata_equals(items, &self.0))
    }
}

/// Apply `steps` in order; each step narrows the previous result.
pub fn apply_filters<T>(items: Vec<T>, steps: &[Box<dyn Filter<T>>]) -> Result<Vec<T>> {
    for step in steps {
        step.validate()?;
    }

    let mut items = items;
    for step in steps {
        let before = items.len();
        items = step.apply(items)?;
        tracing::debug!("filter [{}]: {} -> {}", step.label(), before, items.len());
    }

    Ok(items)
}

/// Ordered list of filter steps for one item type
pub struct Pipeline<T> {
    steps: Vec<Box<dyn Filter<T>>>,
}

impl<T> Default for Pipeline<T> {
    fn default() -> Self {
        Self { steps: Vec::new() }
    }
}

impl<T> std::fmt::Debug for Pipeline<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.steps.iter().map(|s| s.label()))
            .finish()
    }
}

impl<T> Pipeline<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push<F: Filter<T> + 'static>(&mut self, step: F) {
        self.steps.push(Box::new(step));
    }

    pub fn with<F: Filter<T> + 'static>(mut self, step: F) -> Self {
        self.push(step);
        self
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn labels(&self) -> Vec<String> {
        self.steps.iter().map(|s| s.label()).collect()
    }

    /// Check every step's arguments up front
    pub fn validate(&self) -> Result<()> {
        self.steps.iter().try_for_each(|s| s.validate())
    }

    pub fn apply(&self, items: Vec<T>) -> Result<Vec<T>> {
        apply_filters(items, &self.steps)
    }
}
