// Topic label table — topic index to display name.
//
// The table is fixed per model and must have exactly one label per topic.
// A size mismatch is a configuration error, reported when a model is loaded
// or before training starts.

use serde::{Deserialize, Serialize};

use crate::error::TopicError;
use crate::model::TopicDistribution;

pub const DEFAULT_LABELS: [&str; 5] = ["Sports", "Business", "Arts/Literature", "Politics", "Misc"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicLabels {
    labels: Vec<String>,
}

impl Default for TopicLabels {
    fn default() -> Self {
        Self::new(DEFAULT_LABELS)
    }
}

impl TopicLabels {
    pub fn new<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            labels: labels.into_iter().map(Into::into).collect(),
        }
    }

    /// Parse a comma-separated list, e.g. from `SEEDLING_LABELS`.
    pub fn parse_list(list: &str) -> Result<Self, TopicError> {
        let labels: Vec<String> = list
            .split(',')
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(String::from)
            .collect();
        if labels.is_empty() {
            return Err(TopicError::configuration("label list is empty"));
        }
        Ok(Self { labels })
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.labels
    }

    /// Look up a topic's label.
    pub fn label(&self, topic: usize) -> Result<&str, TopicError> {
        self.labels.get(topic).map(String::as_str).ok_or_else(|| {
            TopicError::configuration(format!(
                "topic {topic} has no label (table has {} labels)",
                self.labels.len()
            ))
        })
    }

    /// Check the table against a model's topic count.
    pub fn validate_for(&self, n_topics: usize) -> Result<(), TopicError> {
        if self.labels.len() != n_topics {
            return Err(TopicError::configuration(format!(
                "label table has {} labels but the model has {n_topics} topics",
                self.labels.len()
            )));
        }
        Ok(())
    }

    /// Label of the dominant topic of a distribution.
    pub fn dominant_label(&self, dist: &TopicDistribution) -> Result<&str, TopicError> {
        self.label(dist.dominant_topic())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dominant_label() {
        let labels = TopicLabels::new(["Sports", "Business"]);
        let dist = TopicDistribution(vec![0.3, 0.7]);
        assert_eq!(labels.dominant_label(&dist).unwrap(), "Business");
        let wide = TopicDistribution(vec![0.1, 0.1, 0.8]);
        assert!(matches!(
            labels.dominant_label(&wide),
            Err(TopicError::Configuration(_))
        ));
    }

    #[test]
    fn test_default_table() {
        let labels = TopicLabels::default();
        assert_eq!(labels.len(), 5);
        assert_eq!(labels.label(0).unwrap(), "Sports");
        assert_eq!(labels.label(4).unwrap(), "Misc");
    }

    #[test]
    fn test_out_of_bounds_label() {
        let labels = TopicLabels::default();
        assert!(matches!(labels.label(5), Err(TopicError::Configuration(_))));
    }

    #[test]
    fn test_validate_for_mismatch() {
        let labels = TopicLabels::new(["A", "B"]);
        assert!(labels.validate_for(2).is_ok());
        assert!(matches!(
            labels.validate_for(3),
            Err(TopicError::Configuration(_))
        ));
    }

    #[test]
    fn test_parse_list() {
        let labels = TopicLabels::parse_list(" Sports, Business ,,Misc").unwrap();
        assert_eq!(labels.as_slice(), &["Sports", "Business", "Misc"]);
        assert!(TopicLabels::parse_list(" , ").is_err());
    }
}
