use crate::config::MatchStrategy;
use crate::types::{RAW_EXTENSION, SUPPORT_EXTENSION};

/// How many support files a single selection may contribute
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchScope {
    FirstMatch,
    /// Every matching product, e.g. RED and COLOR sharing an identifier
    AllMatches,
}

/// Pairs selected images with their support files in the data directory
pub struct SupportMatcher<'a> {
    image_files: &'a [String],
    data_files: &'a [String],
    strategy: MatchStrategy,
}

impl<'a> SupportMatcher<'a> {
    pub fn new(image_files: &'a [String], data_files: &'a [String], strategy: MatchStrategy) -> Self {
        Self {
            image_files,
            data_files,
            strategy,
        }
    }

    /// First support file for `identifier`, or `None` when the image has no `.sup`
    pub fn find(&self, identifier: &str) -> Option<String> {
        self.matches(identifier).next()
    }

    /// Support files for `identifier`, in image listing order
    pub fn find_all(&self, identifier: &str) -> Vec<String> {
        let mut found: Vec<String> = Vec::new();
        for support in self.matches(identifier) {
            if !found.contains(&support) {
                found.push(support);
            }
        }
        found
    }

    /// Collect according to `scope`
    pub fn find_scoped(&self, identifier: &str, scope: MatchScope) -> Vec<String> {
        match scope {
            MatchScope::FirstMatch => self.find(identifier).into_iter().collect(),
            MatchScope::AllMatches => self.find_all(identifier),
        }
    }

    fn matches<'s>(&'s self, identifier: &'s str) -> impl Iterator<Item = String> + 's {
        self.image_files
            .iter()
            .filter(move |name| self.is_candidate(identifier, name))
            .filter_map(|name| name.strip_suffix(RAW_EXTENSION))
            .filter_map(move |stem| {
                let support = format!("{}{}", stem, SUPPORT_EXTENSION);
                self.data_files.iter().find(|d| **d == support).cloned()
            })
    }

    fn is_candidate(&self, identifier: &str, name: &str) -> bool {
        if !name.ends_with(RAW_EXTENSION) {
            return false;
        }
        match self.strategy {
            MatchStrategy::Substring => name.contains(identifier),
            MatchStrategy::Prefix => name.starts_with(identifier),
        }
    }
}
