//! Vehicle identity and type model.
//!
//! A depot fleet is partitioned into *types*: short class codes combining
//! fuel, chassis and livery. Vehicles of the same type are interchangeable
//! for lane assignment, so the engine compares types, never raw strings.
//!
//! The type of a vehicle is the fixed-length prefix of its identifier
//! (`DMV429` → `DMV`). It is parsed once at ingestion and carried alongside
//! the raw identifier.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// Default number of leading characters that encode the vehicle type.
pub const DEFAULT_TYPE_PREFIX_LEN: usize = 3;

/// A fungible vehicle class code (e.g. `"SMV"`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VehicleType(String);

impl VehicleType {
    /// Creates a vehicle type from its code.
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    /// The type code.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VehicleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for VehicleType {
    fn from(code: &str) -> Self {
        Self::new(code)
    }
}

/// A unique vehicle identifier with its parsed type.
///
/// Serialized as the plain identifier string. Deserialization splits the
/// type off with [`DEFAULT_TYPE_PREFIX_LEN`], as [`FromStr`] does; a depot
/// with another prefix length should load identifiers as strings and parse
/// them with [`TypeCatalogue::parse_id`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct VehicleId {
    raw: String,
    vehicle_type: VehicleType,
}

/// Why a raw identifier could not be turned into a [`VehicleId`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VehicleIdError {
    /// The identifier is empty after trimming.
    Empty,
    /// The identifier has no suffix after the type prefix.
    TooShort {
        /// The offending identifier.
        raw: String,
        /// Required prefix length.
        prefix_len: usize,
    },
    /// The type prefix is not in the catalogue.
    UnknownType {
        /// The offending identifier.
        raw: String,
        /// The parsed prefix.
        vehicle_type: VehicleType,
    },
}

impl fmt::Display for VehicleIdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "empty vehicle identifier"),
            Self::TooShort { raw, prefix_len } => write!(
                f,
                "vehicle identifier '{raw}' is too short for a {prefix_len}-character type prefix"
            ),
            Self::UnknownType { raw, vehicle_type } => {
                write!(f, "vehicle identifier '{raw}' has unknown type '{vehicle_type}'")
            }
        }
    }
}

impl std::error::Error for VehicleIdError {}

impl VehicleId {
    /// Parses an identifier whose first `prefix_len` characters are its type.
    ///
    /// Surrounding whitespace is ignored. The identifier must be strictly
    /// longer than the prefix.
    pub fn parse(raw: &str, prefix_len: usize) -> Result<Self, VehicleIdError> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(VehicleIdError::Empty);
        }
        let split = match raw.char_indices().nth(prefix_len) {
            Some((idx, _)) if prefix_len > 0 => idx,
            _ => {
                return Err(VehicleIdError::TooShort {
                    raw: raw.to_string(),
                    prefix_len,
                })
            }
        };
        Ok(Self {
            raw: raw.to_string(),
            vehicle_type: VehicleType::new(&raw[..split]),
        })
    }

    /// The full identifier.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// The vehicle's type.
    #[inline]
    pub fn vehicle_type(&self) -> &VehicleType {
        &self.vehicle_type
    }

    /// Returns the same vehicle operated under another type code.
    ///
    /// The type prefix of the raw identifier is rewritten as well, so
    /// `SVV703` operated as `SMV` becomes `SMV703`.
    pub fn retyped(&self, target: &VehicleType) -> Self {
        let suffix = &self.raw[self.vehicle_type.as_str().len()..];
        Self {
            raw: format!("{target}{suffix}"),
            vehicle_type: target.clone(),
        }
    }
}

impl FromStr for VehicleId {
    type Err = VehicleIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s, DEFAULT_TYPE_PREFIX_LEN)
    }
}

impl TryFrom<String> for VehicleId {
    type Error = VehicleIdError;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        raw.parse()
    }
}

impl From<VehicleId> for String {
    fn from(id: VehicleId) -> Self {
        id.raw
    }
}

impl fmt::Display for VehicleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Descriptive attributes of a vehicle type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VehicleClass {
    /// Type code.
    pub code: VehicleType,
    /// Fuel (e.g. "Biodiesel", "Sähkö").
    pub fuel: String,
    /// Chassis (e.g. "2-aks.", "Teli").
    pub chassis: String,
    /// Livery colour.
    pub livery: String,
}

impl VehicleClass {
    /// Creates a vehicle class.
    pub fn new(
        code: impl Into<String>,
        fuel: impl Into<String>,
        chassis: impl Into<String>,
        livery: impl Into<String>,
    ) -> Self {
        Self {
            code: VehicleType::new(code.into()),
            fuel: fuel.into(),
            chassis: chassis.into(),
            livery: livery.into(),
        }
    }
}

/// Known vehicle classes plus type aliases.
///
/// An alias maps a code that exists in the timetable to the code it is
/// operated as. Aliased identifiers are rewritten at ingestion.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TypeCatalogue {
    /// Type prefix length used when parsing identifiers.
    pub prefix_len: usize,
    classes: Vec<VehicleClass>,
    aliases: HashMap<VehicleType, VehicleType>,
}

impl Default for TypeCatalogue {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeCatalogue {
    /// Creates an empty catalogue with the default prefix length.
    pub fn new() -> Self {
        Self {
            prefix_len: DEFAULT_TYPE_PREFIX_LEN,
            classes: Vec::new(),
            aliases: HashMap::new(),
        }
    }

    /// The depot's standard fleet, with `SVV` operated as `SMV`.
    pub fn standard() -> Self {
        Self::new()
            .with_class(VehicleClass::new("DMS", "Biodiesel", "2-aks.", "Super"))
            .with_class(VehicleClass::new("DMV", "Biodiesel", "2-aks.", "Vihreä"))
            .with_class(VehicleClass::new("SMS", "Sähkö", "2-aks.", "Super"))
            .with_class(VehicleClass::new("SMV", "Sähkö", "2-aks.", "Vihreä"))
            .with_class(VehicleClass::new("STS", "Sähkö", "Teli", "Super"))
            .with_class(VehicleClass::new("STV", "Sähkö", "Teli", "Vihreä"))
            .with_class(VehicleClass::new("SVV", "Sähkö", "Volvo", "Vihreä"))
            .with_class(VehicleClass::new("DTV", "Biodiesel", "Teli", "Vihreä"))
            .with_alias("SVV", "SMV")
    }

    /// Sets the type prefix length.
    pub fn with_prefix_len(mut self, prefix_len: usize) -> Self {
        self.prefix_len = prefix_len;
        self
    }

    /// Adds a vehicle class. A class with the same code is replaced.
    pub fn with_class(mut self, class: VehicleClass) -> Self {
        self.classes.retain(|c| c.code != class.code);
        self.classes.push(class);
        self
    }

    /// Operates vehicles of type `from` as type `to`.
    pub fn with_alias(mut self, from: impl Into<String>, to: impl Into<String>) -> Self {
        self.aliases
            .insert(VehicleType::new(from.into()), VehicleType::new(to.into()));
        self
    }

    /// All known classes.
    pub fn classes(&self) -> &[VehicleClass] {
        &self.classes
    }

    /// Whether a type code is known.
    pub fn contains(&self, vehicle_type: &VehicleType) -> bool {
        self.classes.iter().any(|c| &c.code == vehicle_type)
    }

    /// Looks up a class by code.
    pub fn class(&self, vehicle_type: &VehicleType) -> Option<&VehicleClass> {
        self.classes.iter().find(|c| &c.code == vehicle_type)
    }

    /// The code a type is operated as (itself when not aliased).
    pub fn resolve<'a>(&'a self, vehicle_type: &'a VehicleType) -> &'a VehicleType {
        self.aliases.get(vehicle_type).unwrap_or(vehicle_type)
    }

    /// Parses an identifier, applying aliases and rejecting unknown types.
    pub fn parse_id(&self, raw: &str) -> Result<VehicleId, VehicleIdError> {
        let id = VehicleId::parse(raw, self.prefix_len)?;
        if !self.contains(id.vehicle_type()) {
            return Err(VehicleIdError::UnknownType {
                raw: id.as_str().to_string(),
                vehicle_type: id.vehicle_type().clone(),
            });
        }
        let target = self.resolve(id.vehicle_type());
        if target == id.vehicle_type() {
            Ok(id)
        } else {
            Ok(id.retyped(target))
        }
    }

    /// Parses a type code for a departure, applying aliases.
    pub fn parse_type(&self, code: &str) -> Result<VehicleType, VehicleIdError> {
        let vehicle_type = VehicleType::new(code.trim());
        if vehicle_type.as_str().is_empty() {
            return Err(VehicleIdError::Empty);
        }
        if !self.contains(&vehicle_type) {
            return Err(VehicleIdError::UnknownType {
                raw: code.trim().to_string(),
                vehicle_type,
            });
        }
        Ok(self.resolve(&vehicle_type).clone())
    }

    /// Parses every identifier with a known type, in order.
    ///
    /// Timetables contain rows for non-fleet vehicles; those are returned
    /// separately with the reason they were skipped.
    pub fn filter_known<'a, I>(&self, raws: I) -> (Vec<VehicleId>, Vec<VehicleIdError>)
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut known = Vec::new();
        let mut skipped = Vec::new();
        for raw in raws {
            match self.parse_id(raw) {
                Ok(id) => known.push(id),
                Err(e) => skipped.push(e),
            }
        }
        (known, skipped)
    }
}
