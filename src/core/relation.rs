//! Declarative relation joins
//!
//! An entity kind lists the relations that single-entity reads should load
//! eagerly. Each relation may carry an ordering for its rows and one nested
//! sub-relation, which may itself be ordered. Deeper nesting is not
//! expressible: [`SubRelationSpec`] has no sub-relation of its own.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SortDirection {
    Asc,
    Desc,
}

/// Ordering applied to the rows of a joined relation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationOrder {
    pub column: String,
    pub direction: SortDirection,
}

/// Second-level relation joined through its parent
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubRelationSpec {
    pub name: String,
    pub order: Option<RelationOrder>,
}

impl SubRelationSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            order: None,
        }
    }

    pub fn order_by(mut self, column: impl Into<String>, direction: SortDirection) -> Self {
        self.order = Some(RelationOrder {
            column: column.into(),
            direction,
        });
        self
    }
}

/// First-level relation of an entity kind
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationSpec {
    pub name: String,
    pub order: Option<RelationOrder>,
    pub subrelation: Option<SubRelationSpec>,
}

impl RelationSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            order: None,
            subrelation: None,
        }
    }

    pub fn order_by(mut self, column: impl Into<String>, direction: SortDirection) -> Self {
        self.order = Some(RelationOrder {
            column: column.into(),
            direction,
        });
        self
    }

    pub fn with_subrelation(mut self, subrelation: SubRelationSpec) -> Self {
        self.subrelation = Some(subrelation);
        self
    }
}

/// One join of a [`JoinPlan`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinStep {
    /// Relation joined before this one, `None` for the root entity
    pub parent: Option<String>,
    pub relation: String,
    pub order: Option<RelationOrder>,
}

/// Ordered list of joins a repository performs for a single-entity read
///
/// Parents always precede their children.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JoinPlan {
    steps: Vec<JoinStep>,
}

impl JoinPlan {
    /// A plan that joins nothing
    pub fn none() -> Self {
        Self::default()
    }

    pub fn from_specs(specs: &[RelationSpec]) -> Self {
        let mut steps = Vec::new();
        for spec in specs {
            steps.push(JoinStep {
                parent: None,
                relation: spec.name.clone(),
                order: spec.order.clone(),
            });
            if let Some(sub) = &spec.subrelation {
                steps.push(JoinStep {
                    parent: Some(spec.name.clone()),
                    relation: sub.name.clone(),
                    order: sub.order.clone(),
                });
            }
        }
        Self { steps }
    }

    /// Join a single relation of the root, unordered
    pub fn single(relation: impl Into<String>) -> Self {
        Self::from_specs(&[RelationSpec::new(relation)])
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn steps(&self) -> &[JoinStep] {
        &self.steps
    }

    /// Joins hanging directly off the root entity
    pub fn roots(&self) -> impl Iterator<Item = &JoinStep> {
        self.steps.iter().filter(|s| s.parent.is_none())
    }

    /// Joins nested under the given first-level relation
    pub fn children_of<'a>(&'a self, parent: &'a str) -> impl Iterator<Item = &'a JoinStep> {
        self.steps
            .iter()
            .filter(move |s| s.parent.as_deref() == Some(parent))
    }
}
