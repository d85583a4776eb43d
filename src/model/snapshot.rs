// Model snapshots — durable, loadable trained state.
//
// A snapshot is the whole `TopicModel` as JSON, wrapped with a format
// version and the time it was saved. The timestamp lives on the wrapper so
// the model itself stays a pure function of its training inputs. It is written to a temporary file and renamed into place so a
// failed write never leaves a half-written model behind.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::TopicModel;
use crate::error::TopicError;
use crate::labels::TopicLabels;
use crate::vocab::Vocabulary;

pub const SNAPSHOT_VERSION: u32 = 1;

#[derive(Serialize, Deserialize)]
struct Snapshot {
    format_version: u32,
    saved_at: DateTime<Utc>,
    model: TopicModel,
}

impl TopicModel {
    /// Persist the model at `path`, replacing any previous snapshot.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create directory {}", parent.display()))?;
            }
        }

        let snapshot = Snapshot {
            format_version: SNAPSHOT_VERSION,
            saved_at: Utc::now(),
            model: self.clone(),
        };
        let json = serde_json::to_string(&snapshot).context("Failed to serialize model")?;

        let tmp = path.with_extension("tmp");
        std::fs::write(&tmp, json)
            .with_context(|| format!("Failed to write model snapshot {}", tmp.display()))?;
        std::fs::rename(&tmp, path)
            .with_context(|| format!("Failed to move model snapshot into {}", path.display()))?;

        info!(path = %path.display(), topics = self.n_topics(), "Saved model snapshot");
        Ok(())
    }

    /// Load a snapshot and check that its matrix has the shape it claims.
    pub fn load(path: &Path) -> Result<Self> {
        Ok(Self::load_with_saved_at(path)?.0)
    }

    /// Like [`TopicModel::load`], also returning when the snapshot was saved.
    pub fn load_with_saved_at(path: &Path) -> Result<(Self, DateTime<Utc>)> {
        let json = std::fs::read_to_string(path).with_context(|| {
            format!(
                "Failed to read model snapshot {}. Run `seedling train` first.",
                path.display()
            )
        })?;
        let snapshot: Snapshot = serde_json::from_str(&json)
            .with_context(|| format!("Failed to parse model snapshot {}", path.display()))?;

        if snapshot.format_version != SNAPSHOT_VERSION {
            anyhow::bail!(
                "Model snapshot {} has format version {}, expected {}",
                path.display(),
                snapshot.format_version,
                SNAPSHOT_VERSION
            );
        }

        snapshot.model.check_shape()?;
        Ok((snapshot.model, snapshot.saved_at))
    }

    /// Load a model for inference and validate it against the vocabulary and
    /// label table that will be used with it.
    pub fn load_for_inference(
        path: &Path,
        vocab: &Vocabulary,
        labels: &TopicLabels,
    ) -> Result<Self> {
        let model = Self::load(path)?;
        model.check_compatible(vocab, labels)?;
        info!(
            path = %path.display(),
            topics = model.n_topics(),
            vocab = model.vocab_size,
            "Loaded model snapshot"
        );
        Ok(model)
    }

    /// The vocabulary must be the training vocabulary and the label table
    /// must have one label per topic.
    pub fn check_compatible(
        &self,
        vocab: &Vocabulary,
        labels: &TopicLabels,
    ) -> Result<(), TopicError> {
        if vocab.fingerprint() != self.vocab_fingerprint || vocab.len() != self.vocab_size {
            return Err(TopicError::consistency(format!(
                "vocabulary ({} terms) is not the one this model was trained with ({} terms)",
                vocab.len(),
                self.vocab_size
            )));
        }
        labels.validate_for(self.n_topics())
    }

    fn check_shape(&self) -> Result<(), TopicError> {
        if self.topic_word.len() != self.params.n_topics {
            return Err(TopicError::consistency(format!(
                "snapshot has {} topic rows but declares {} topics",
                self.topic_word.len(),
                self.params.n_topics
            )));
        }
        if let Some(row) = self.topic_word.iter().find(|r| r.len() != self.vocab_size) {
            return Err(TopicError::consistency(format!(
                "snapshot topic row has {} entries, vocabulary has {}",
                row.len(),
                self.vocab_size
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TrainParams;

    fn model(vocab: &Vocabulary) -> TopicModel {
        TopicModel {
            params: TrainParams {
                n_topics: 2,
                ..TrainParams::default()
            },
            vocab_fingerprint: vocab.fingerprint(),
            vocab_size: vocab.len(),
            topic_word: vec![vec![0.7, 0.3], vec![0.2, 0.8]],
            log_likelihood: -1.5,
        }
    }

    #[test]
    fn test_save_then_load_for_inference() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("guided_lda.json");
        let vocab = Vocabulary::from_terms(["game", "stock"]);
        let m = model(&vocab);
        m.save(&path).unwrap();

        let loaded =
            TopicModel::load_for_inference(&path, &vocab, &TopicLabels::new(["A", "B"])).unwrap();
        assert_eq!(loaded, m);
        assert!(!path.with_extension("tmp").exists());
    }

    #[test]
    fn test_saving_twice_keeps_model_equal() {
        let dir = tempfile::tempdir().unwrap();
        let vocab = Vocabulary::from_terms(["game", "stock"]);
        let m = model(&vocab);
        let first = dir.path().join("a.json");
        let second = dir.path().join("b.json");
        m.save(&first).unwrap();
        m.save(&second).unwrap();

        let (a, a_saved) = TopicModel::load_with_saved_at(&first).unwrap();
        let (b, b_saved) = TopicModel::load_with_saved_at(&second).unwrap();
        assert_eq!(a, b);
        assert!(a_saved <= b_saved);
    }

    #[test]
    fn test_load_rejects_label_mismatch() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("m.json");
        let vocab = Vocabulary::from_terms(["game", "stock"]);
        model(&vocab).save(&path).unwrap();

        let err =
            TopicModel::load_for_inference(&path, &vocab, &TopicLabels::default()).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<TopicError>(),
            Some(TopicError::Configuration(_))
        ));
    }

    #[test]
    fn test_load_rejects_other_vocabulary() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("m.json");
        let vocab = Vocabulary::from_terms(["game", "stock"]);
        model(&vocab).save(&path).unwrap();

        let other = Vocabulary::from_terms(["stock", "game"]);
        let err = TopicModel::load_for_inference(&path, &other, &TopicLabels::new(["A", "B"]))
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<TopicError>(),
            Some(TopicError::Consistency(_))
        ));
    }

    #[test]
    fn test_load_missing_file_is_boundary_error() {
        let err = TopicModel::load(Path::new("/nonexistent/seedling/model.json")).unwrap_err();
        assert!(err.downcast_ref::<TopicError>().is_none());
    }
}
