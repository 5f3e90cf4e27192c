//! Typed, validated reads over a [`ConfigStore`]

use std::fmt::Display;
use std::str::FromStr;

use regex::Regex;

use super::ConfigStore;
use crate::error::InvalidReason;
use crate::{Error, Result};

/// Inclusive numeric bounds for a setting
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Bounds<T> {
    /// Smallest accepted value, if any
    pub minimum: Option<T>,
    /// Largest accepted value, if any
    pub maximum: Option<T>,
}

impl<T> Bounds<T> {
    /// No bounds
    pub fn none() -> Self {
        Self {
            minimum: None,
            maximum: None,
        }
    }

    /// Both ends bounded, inclusive
    pub fn between(minimum: T, maximum: T) -> Self {
        Self {
            minimum: Some(minimum),
            maximum: Some(maximum),
        }
    }

    /// Lower bound only
    pub fn at_least(minimum: T) -> Self {
        Self {
            minimum: Some(minimum),
            maximum: None,
        }
    }

    /// Upper bound only
    pub fn at_most(maximum: T) -> Self {
        Self {
            minimum: None,
            maximum: Some(maximum),
        }
    }
}

impl<T: PartialOrd + Display + Copy> Bounds<T> {
    /// Check `value` against the bounds, returning it unchanged if it fits
    pub fn check(&self, key: &str, value: T) -> Result<T> {
        let below = self.minimum.is_some_and(|min| value < min);
        let above = self.maximum.is_some_and(|max| value > max);
        if below || above {
            return Err(Error::out_of_range(key, value, self.minimum, self.maximum));
        }
        Ok(value)
    }
}

/// Typed accessor over a configuration store
///
/// Nothing is cached: each call reads the store again and re-runs every
/// check, so a bad value fails on every access.
#[derive(Clone, Debug)]
pub struct Config<S> {
    store: S,
}

impl<S: ConfigStore> Config<S> {
    /// Wrap a store
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// The underlying store
    pub fn store(&self) -> &S {
        &self.store
    }

    fn require(&self, key: &str) -> Result<String> {
        self.store.get(key).ok_or_else(|| Error::missing(key))
    }

    /// Read a string, optionally requiring it to match `pattern`
    pub fn string(&self, key: &str, pattern: Option<&Regex>) -> Result<String> {
        let value = self.require(key)?;
        if let Some(pattern) = pattern {
            check_pattern(key, &value, pattern)?;
        }
        Ok(value)
    }

    /// Read an `i32` within `bounds`
    pub fn integer(&self, key: &str, bounds: Bounds<i32>) -> Result<i32> {
        let raw = self.require(key)?;
        parse_integer(key, &raw, bounds)
    }

    /// Read a finite `f64` within `bounds`
    pub fn double(&self, key: &str, bounds: Bounds<f64>) -> Result<f64> {
        let raw = self.require(key)?;
        let value: f64 = parse_number(key, &raw)?;
        if !value.is_finite() {
            return Err(Error::invalid(key, raw, InvalidReason::NotANumber));
        }
        bounds.check(key, value)
    }

    /// Read a value and map it through `allowed`
    ///
    /// Matching is exact and case-sensitive against the map's names.
    pub fn enumeration<T: Copy>(&self, key: &str, allowed: &[(&str, T)]) -> Result<T> {
        let raw = self.require(key)?;
        lookup(key, &raw, allowed)
    }

    /// Read a JSON array of strings, preserving order
    ///
    /// `null` elements are skipped.
    pub fn collection(&self, key: &str) -> Result<Vec<String>> {
        let raw = self.require(key)?;
        let elements: Vec<Option<String>> = serde_json::from_str(&raw)
            .map_err(|_| Error::invalid(key, raw.as_str(), InvalidReason::NotAStringArray))?;
        Ok(elements.into_iter().flatten().collect())
    }

    /// Read a collection of `i32`, each within `bounds`
    ///
    /// The first element that fails aborts the read.
    pub fn integer_collection(&self, key: &str, bounds: Bounds<i32>) -> Result<Vec<i32>> {
        self.collection(key)?
            .iter()
            .map(|element| parse_integer(key, element, bounds))
            .collect()
    }

    /// Read a collection of enum names, each mapped through `allowed`
    pub fn enum_collection<T: Copy>(&self, key: &str, allowed: &[(&str, T)]) -> Result<Vec<T>> {
        self.collection(key)?
            .iter()
            .map(|element| lookup(key, element, allowed))
            .collect()
    }
}

fn parse_number<T: FromStr>(key: &str, raw: &str) -> Result<T> {
    raw.trim()
        .parse()
        .map_err(|_| Error::invalid(key, raw, InvalidReason::NotANumber))
}

fn parse_integer(key: &str, raw: &str, bounds: Bounds<i32>) -> Result<i32> {
    let value: i32 = parse_number(key, raw)?;
    bounds.check(key, value)
}

fn check_pattern(key: &str, value: &str, pattern: &Regex) -> Result<()> {
    if pattern.is_match(value) {
        return Ok(());
    }
    Err(Error::invalid(
        key,
        value,
        InvalidReason::PatternMismatch {
            pattern: pattern.as_str().to_string(),
        },
    ))
}

fn lookup<T: Copy>(key: &str, value: &str, allowed: &[(&str, T)]) -> Result<T> {
    allowed
        .iter()
        .find(|(name, _)| *name == value)
        .map(|(_, variant)| *variant)
        .ok_or_else(|| Error::invalid(key, value, InvalidReason::NotRecognized))
}
