use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::fmt;

/// Mutable fields shared by every roster record
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PersonDetails {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub email: String,
}

impl PersonDetails {
    pub fn new(
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        email: impl Into<String>,
    ) -> Self {
        Self {
            first_name: first_name.into(),
            last_name: last_name.into(),
            email: email.into(),
        }
    }

    /// Trim surrounding whitespace from every field
    pub fn normalized(&self) -> Self {
        Self {
            first_name: self.first_name.trim().to_string(),
            last_name: self.last_name.trim().to_string(),
            email: self.email.trim().to_string(),
        }
    }
}

/// The resource kinds served by this application
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Employee,
    Student,
}

impl EntityKind {
    pub const ALL: [EntityKind; 2] = [EntityKind::Employee, EntityKind::Student];

    /// Backing table name
    pub fn table(&self) -> &'static str {
        match self {
            EntityKind::Employee => "employees",
            EntityKind::Student => "students",
        }
    }

    /// Collection path the resource is mounted under
    pub fn path(&self) -> &'static str {
        match self {
            EntityKind::Employee => "/api/employees",
            EntityKind::Student => "/api/students",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            EntityKind::Employee => "Employee",
            EntityKind::Student => "Student",
        }
    }

    pub fn deleted_message(&self) -> String {
        format!("{} deleted successfully!", self.name())
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A persisted roster record.
///
/// Employee and Student share their shape; this trait lets the repository,
/// service and HTTP layers handle both with a single generic implementation.
pub trait Entity:
    Serialize + DeserializeOwned + Clone + fmt::Debug + Send + Sync + Unpin + 'static
{
    const KIND: EntityKind;

    fn from_parts(id: Option<i64>, details: PersonDetails) -> Self;

    fn id(&self) -> Option<i64>;

    fn details(&self) -> &PersonDetails;

    fn details_mut(&mut self) -> &mut PersonDetails;

    fn with_id(self, id: i64) -> Self {
        let details = self.details().clone();
        Self::from_parts(Some(id), details)
    }

    fn without_id(self) -> Self {
        let details = self.details().clone();
        Self::from_parts(None, details)
    }

    /// Copy every mutable field from `other`; the identifier is kept.
    fn merge_from(&mut self, other: &Self) {
        *self.details_mut() = other.details().clone();
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct Employee {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(flatten)]
    pub details: PersonDetails,
}

impl Employee {
    pub fn new(
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        email: impl Into<String>,
    ) -> Self {
        Self {
            id: None,
            details: PersonDetails::new(first_name, last_name, email),
        }
    }
}

impl Entity for Employee {
    const KIND: EntityKind = EntityKind::Employee;

    fn from_parts(id: Option<i64>, details: PersonDetails) -> Self {
        Self { id, details }
    }

    fn id(&self) -> Option<i64> {
        self.id
    }

    fn details(&self) -> &PersonDetails {
        &self.details
    }

    fn details_mut(&mut self) -> &mut PersonDetails {
        &mut self.details
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct Student {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(flatten)]
    pub details: PersonDetails,
}

impl Student {
    pub fn new(
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        email: impl Into<String>,
    ) -> Self {
        Self {
            id: None,
            details: PersonDetails::new(first_name, last_name, email),
        }
    }
}

impl Entity for Student {
    const KIND: EntityKind = EntityKind::Student;

    fn from_parts(id: Option<i64>, details: PersonDetails) -> Self {
        Self { id, details }
    }

    fn id(&self) -> Option<i64> {
        self.id
    }

    fn details(&self) -> &PersonDetails {
        &self.details
    }

    fn details_mut(&mut self) -> &mut PersonDetails {
        &mut self.details
    }
}
