//! Literal find/replace over source content and emitted paths.

use std::borrow::Cow;

use indexmap::IndexMap;
use serde::Deserialize;

/// Ordered literal substitutions.
///
/// Pairs are applied one after another over the whole text, so a later
/// pair sees the output of an earlier one. Empty search strings are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct FindReplace(IndexMap<String, String>);

impl FindReplace {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Apply every pair in order.
    pub fn apply<'a>(&self, content: &'a str) -> Cow<'a, str> {
        self.apply_with(content, |value| Cow::Borrowed(value))
    }

    /// Apply every pair in order, passing each replacement through `map` first.
    pub fn apply_with<'a, F>(&self, content: &'a str, map: F) -> Cow<'a, str>
    where
        F: Fn(&str) -> Cow<'_, str>,
    {
        let mut out = Cow::Borrowed(content);
        for (find, replace) in self.iter() {
            if find.is_empty() || !out.contains(find) {
                continue;
            }
            out = Cow::Owned(out.replace(find, &map(replace)));
        }
        out
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for FindReplace {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}
