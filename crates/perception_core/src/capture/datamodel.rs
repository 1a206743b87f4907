//! Records reported to a dataset: definitions, annotations, metrics and their values.
use std::collections::BTreeMap;
use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Index of a captured frame, as counted by the host.
pub type FrameIndex = u64;

/// Identifies the sensor (camera) a record was captured with.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SensorId(pub String);

impl SensorId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SensorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SensorId {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

/// Describes a kind of annotation a labeler produces.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnotationDefinition {
    pub id: String,
    pub description: String,
}

impl AnnotationDefinition {
    pub fn new(id: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            description: description.into(),
        }
    }
}

/// Describes a kind of metric.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricDefinition {
    pub id: String,
    pub description: String,
}

impl MetricDefinition {
    pub fn new(id: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            description: description.into(),
        }
    }
}

/// Nested key/value payload of an annotation or metric.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq, Default)]
pub enum ReportValue {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    Array(Vec<ReportValue>),
    Object(BTreeMap<String, ReportValue>),
}

impl ReportValue {
    /// Builds an object from key/value pairs.
    pub fn object<K, V, I>(entries: I) -> Self
    where
        K: Into<String>,
        V: Into<ReportValue>,
        I: IntoIterator<Item = (K, V)>,
    {
        ReportValue::Object(
            entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    /// Looks up `key` if this is an object.
    pub fn get(&self, key: &str) -> Option<&ReportValue> {
        match self {
            ReportValue::Object(map) => map.get(key),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[ReportValue]> {
        match self {
            ReportValue::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ReportValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            ReportValue::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ReportValue::Float(v) => Some(*v),
            ReportValue::Int(v) => Some(*v as f64),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, ReportValue::Null)
    }
}

impl From<bool> for ReportValue {
    fn from(value: bool) -> Self {
        ReportValue::Bool(value)
    }
}

impl From<i32> for ReportValue {
    fn from(value: i32) -> Self {
        ReportValue::Int(value.into())
    }
}

impl From<u32> for ReportValue {
    fn from(value: u32) -> Self {
        ReportValue::Int(value.into())
    }
}

impl From<i64> for ReportValue {
    fn from(value: i64) -> Self {
        ReportValue::Int(value)
    }
}

impl From<usize> for ReportValue {
    fn from(value: usize) -> Self {
        ReportValue::Int(i64::try_from(value).unwrap_or(i64::MAX))
    }
}

impl From<f32> for ReportValue {
    fn from(value: f32) -> Self {
        ReportValue::Float(value.into())
    }
}

impl From<f64> for ReportValue {
    fn from(value: f64) -> Self {
        ReportValue::Float(value)
    }
}

impl From<&str> for ReportValue {
    fn from(value: &str) -> Self {
        ReportValue::String(value.to_owned())
    }
}

impl From<String> for ReportValue {
    fn from(value: String) -> Self {
        ReportValue::String(value)
    }
}

impl<T: Into<ReportValue>> From<Vec<T>> for ReportValue {
    fn from(value: Vec<T>) -> Self {
        ReportValue::Array(value.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<ReportValue>, const N: usize> From<[T; N]> for ReportValue {
    fn from(value: [T; N]) -> Self {
        ReportValue::Array(value.into_iter().map(Into::into).collect())
    }
}

impl From<BTreeMap<String, ReportValue>> for ReportValue {
    fn from(value: BTreeMap<String, ReportValue>) -> Self {
        ReportValue::Object(value)
    }
}

impl<T: Into<ReportValue>> From<Option<T>> for ReportValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(ReportValue::Null, Into::into)
    }
}

/// An annotation captured for one sensor on one frame.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Annotation {
    /// Id of the [`AnnotationDefinition`] this annotation belongs to.
    pub definition: String,
    pub sensor: SensorId,
    pub frame: FrameIndex,
    pub values: ReportValue,
}

impl Annotation {
    pub fn new(
        definition: &AnnotationDefinition,
        sensor: SensorId,
        frame: FrameIndex,
        values: impl Into<ReportValue>,
    ) -> Self {
        Self {
            definition: definition.id.clone(),
            sensor,
            frame,
            values: values.into(),
        }
    }
}

/// A metric for one frame, optionally tied to a sensor.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Metric {
    /// Id of the [`MetricDefinition`] this metric belongs to.
    pub definition: String,
    pub sensor: Option<SensorId>,
    pub frame: FrameIndex,
    pub values: ReportValue,
}

impl Metric {
    pub fn new(
        definition: &MetricDefinition,
        sensor: Option<SensorId>,
        frame: FrameIndex,
        values: impl Into<ReportValue>,
    ) -> Self {
        Self {
            definition: definition.id.clone(),
            sensor,
            frame,
            values: values.into(),
        }
    }
}
