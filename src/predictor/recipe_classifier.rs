//! Recipe Classifier
//!
//! This module provides the prediction service for classifying food photos
//! into recipe categories. It chains the pipeline stages: read the image,
//! stretch-resize it to the model input geometry, normalize it into a
//! batched tensor, run the model, and select the top class with its
//! confidence score.
//!
//! The model is an explicitly constructed, immutable instance handed to the
//! classifier at build time. Tests inject stub models through the
//! [`ScoringModel`] seam instead of loading an artifact.

use crate::core::{
    CommonBuilderConfig, ConfigError, ConfigValidator, ConfigValidatorExt, DefaultImageReader,
    ImageReader, LabelSet, OrtInfer, OrtSessionConfig, RecognitionError, ScoringModel, Tensor4D,
    constants::{DEFAULT_BATCH_SIZE, MODEL_INPUT_HEIGHT, MODEL_INPUT_WIDTH},
};
use crate::processors::{NormalizeImage, Topk, argmax, resize_to_input, softmax_in_place};
use image::RgbImage;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// The outcome of classifying one photo.
///
/// Immutable once produced. The confidence is the raw score of the selected
/// class, a float in [0, 1]; percentage formatting belongs to the
/// presentation layer via [`confidence_percent`](Self::confidence_percent).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipePrediction {
    /// Index of the predicted class in the label set.
    pub class_id: usize,
    /// Predicted label.
    pub label: String,
    /// Score of the predicted label, in [0, 1].
    pub confidence: f32,
}

impl RecipePrediction {
    /// The confidence as a percentage rounded to two decimal places.
    ///
    /// Display-only transform: 0.0 maps to 0.0 and 1.0 maps to 100.0.
    pub fn confidence_percent(&self) -> f32 {
        (self.confidence * 100.0 * 100.0).round() / 100.0
    }
}

/// Configuration for the recipe classifier.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecipeClassifierConfig {
    /// Common configuration options shared across predictors.
    pub common: CommonBuilderConfig,
    /// Input shape for the model (width, height).
    pub input_shape: Option<(u32, u32)>,
    /// Whether to softmax-normalize score rows before selection. The shipped
    /// recipe model ends in a softmax layer, so this defaults to off; enable
    /// it for model heads that emit raw logits.
    pub apply_softmax: Option<bool>,
}

impl RecipeClassifierConfig {
    /// Creates a configuration with default settings.
    pub fn new() -> Self {
        Self {
            common: CommonBuilderConfig::with_defaults(
                Some("recipe_classifier".to_string()),
                Some(DEFAULT_BATCH_SIZE),
            ),
            input_shape: Some((MODEL_INPUT_WIDTH, MODEL_INPUT_HEIGHT)),
            apply_softmax: Some(false),
        }
    }

    /// Creates a configuration with custom common settings.
    pub fn with_common(common: CommonBuilderConfig) -> Self {
        Self {
            common,
            input_shape: Some((MODEL_INPUT_WIDTH, MODEL_INPUT_HEIGHT)),
            apply_softmax: Some(false),
        }
    }
}

impl ConfigValidator for RecipeClassifierConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        self.common.validate()?;

        if let Some((width, height)) = self.input_shape {
            self.validate_image_dimensions(width, height)?;
        }

        Ok(())
    }

    fn get_defaults() -> Self {
        Self::new()
    }
}

/// Recipe classifier: food photo in, label and confidence out.
///
/// Holds the label set, the preprocessing parameters, and the scoring model.
/// The model is shared, read-only state; classification takes `&self` and
/// each call is independent of every other call, so a serving layer can run
/// predictions from worker threads without coordination.
#[derive(Debug)]
pub struct RecipeClassifier<M: ScoringModel = OrtInfer> {
    /// Versioned label set matching the model's training-time class order.
    labels: LabelSet,
    /// Input shape for the model (width, height).
    input_shape: (u32, u32),
    /// Image reader for loading photos from file paths.
    read_image: DefaultImageReader,
    /// Image normalizer producing batched model-input tensors.
    normalize: NormalizeImage,
    /// The scoring model.
    model: M,
    /// Top-k operator for listing candidate dishes.
    post_op: Topk,
    /// Whether to softmax-normalize score rows before selection.
    apply_softmax: bool,
    /// Number of images per inference batch.
    batch_size: usize,
}

impl RecipeClassifier<OrtInfer> {
    /// Creates a classifier backed by an ONNX Runtime session pool.
    ///
    /// Loads the model once; a load failure is fatal and should abort
    /// startup.
    pub fn new(
        config: RecipeClassifierConfig,
        labels: LabelSet,
        model_path: &Path,
    ) -> Result<Self, RecognitionError> {
        let model = OrtInfer::from_common(&config.common, model_path)?;
        Self::from_parts(model, labels, config)
    }
}

impl<M: ScoringModel> RecipeClassifier<M> {
    /// Creates a classifier from an already-constructed scoring model.
    ///
    /// This is the injection point for tests and for callers that manage
    /// model construction themselves.
    pub fn from_parts(
        model: M,
        labels: LabelSet,
        config: RecipeClassifierConfig,
    ) -> Result<Self, RecognitionError> {
        labels.validate()?;

        Ok(Self {
            post_op: Topk::from_class_names(labels.labels().to_vec()),
            labels,
            input_shape: config
                .input_shape
                .unwrap_or((MODEL_INPUT_WIDTH, MODEL_INPUT_HEIGHT)),
            read_image: DefaultImageReader::new(),
            normalize: NormalizeImage::for_unit_range()?,
            model,
            apply_softmax: config.apply_softmax.unwrap_or(false),
            batch_size: config.common.batch_size.unwrap_or(DEFAULT_BATCH_SIZE).max(1),
        })
    }

    /// The label set this classifier predicts over.
    pub fn labels(&self) -> &LabelSet {
        &self.labels
    }

    /// Classifies the photo at the given path.
    ///
    /// # Errors
    ///
    /// Decode failures and inference failures propagate with their original
    /// kind; no translation happens here.
    pub fn classify(&self, path: impl AsRef<Path>) -> Result<RecipePrediction, RecognitionError> {
        let img = self.read_image.read_single(path.as_ref())?;
        self.classify_image(&img)
    }

    /// Classifies an already-decoded photo.
    pub fn classify_image(&self, img: &RgbImage) -> Result<RecipePrediction, RecognitionError> {
        let tensor = self.preprocess(std::slice::from_ref(img))?;
        let scores = self.model.infer_2d(&tensor)?;

        debug!(
            rows = scores.nrows(),
            classes = scores.ncols(),
            "scored single image"
        );

        self.select(scores.row(0).to_vec())
    }

    /// Classifies a batch of photos, preserving input order.
    ///
    /// Photos are processed in chunks of the configured batch size so one
    /// call over many paths does not build an unbounded tensor.
    pub fn classify_batch<P: AsRef<Path> + Send + Sync>(
        &self,
        paths: &[P],
    ) -> Result<Vec<RecipePrediction>, RecognitionError> {
        let mut predictions = Vec::with_capacity(paths.len());

        for chunk in paths.chunks(self.batch_size) {
            let imgs = self.read_image.apply(chunk.iter().map(|p| p.as_ref()))?;
            let tensor = self.preprocess(&imgs)?;
            let scores = self.model.infer_2d(&tensor)?;

            if scores.nrows() != imgs.len() {
                return Err(RecognitionError::inference_failed(format!(
                    "expected one score row per image, got {} rows for {} images",
                    scores.nrows(),
                    imgs.len()
                )));
            }

            for row in scores.outer_iter() {
                predictions.push(self.select(row.to_vec())?);
            }
        }

        debug!(count = predictions.len(), "classified batch");
        Ok(predictions)
    }

    /// Lists the k most likely dishes for one photo, best first.
    ///
    /// Candidates share the selection policy of [`classify_image`](Self::classify_image):
    /// equal scores keep ascending class-index order, and the first
    /// candidate always matches the single-class prediction.
    pub fn top_candidates(
        &self,
        img: &RgbImage,
        k: usize,
    ) -> Result<Vec<RecipePrediction>, RecognitionError> {
        let tensor = self.preprocess(std::slice::from_ref(img))?;
        let scores = self.model.infer_2d(&tensor)?;

        let mut row = scores.row(0).to_vec();
        if row.len() != self.labels.len() {
            return Err(RecognitionError::inference_failed(format!(
                "model produced {} scores but label set '{}' has {} labels",
                row.len(),
                self.labels.version(),
                self.labels.len()
            )));
        }
        if self.apply_softmax {
            softmax_in_place(&mut row);
        }

        let topk = self
            .post_op
            .process_single(&row, k)
            .map_err(RecognitionError::invalid_input)?;

        let mut candidates = Vec::with_capacity(k.min(row.len()));
        for (&class_id, &confidence) in topk.indexes[0].iter().zip(&topk.scores[0]) {
            let label = self
                .labels
                .get(class_id)
                .ok_or_else(|| {
                    RecognitionError::inference_failed(format!(
                        "class index {class_id} out of label range"
                    ))
                })?
                .to_string();
            candidates.push(RecipePrediction {
                class_id,
                label,
                confidence,
            });
        }
        Ok(candidates)
    }

    /// Resizes and normalizes decoded photos into one batched tensor.
    fn preprocess(&self, imgs: &[RgbImage]) -> Result<Tensor4D, RecognitionError> {
        let (width, height) = self.input_shape;
        let resized: Vec<RgbImage> = imgs
            .iter()
            .map(|img| resize_to_input(img, width, height, None))
            .collect();
        self.normalize.normalize_batch_to(&resized)
    }

    /// Selects the top class from one score row.
    ///
    /// The row width must equal the label count; a mismatch means the model
    /// artifact and label set disagree and is reported as an inference
    /// failure. Ties select the lowest index.
    fn select(&self, mut row: Vec<f32>) -> Result<RecipePrediction, RecognitionError> {
        if row.len() != self.labels.len() {
            return Err(RecognitionError::inference_failed(format!(
                "model produced {} scores but label set '{}' has {} labels",
                row.len(),
                self.labels.version(),
                self.labels.len()
            )));
        }

        if self.apply_softmax {
            softmax_in_place(&mut row);
        }

        let class_id = argmax(&row).ok_or_else(|| {
            RecognitionError::inference_failed("model produced an empty score row")
        })?;
        let confidence = row[class_id];
        let label = self
            .labels
            .get(class_id)
            .ok_or_else(|| {
                RecognitionError::inference_failed(format!(
                    "class index {class_id} out of label range"
                ))
            })?
            .to_string();

        debug!(%label, confidence, "selected top class");

        Ok(RecipePrediction {
            class_id,
            label,
            confidence,
        })
    }
}

/// Builder for the recipe classifier.
pub struct RecipeClassifierBuilder {
    common: CommonBuilderConfig,
    input_shape: Option<(u32, u32)>,
    apply_softmax: Option<bool>,
    labels: Option<LabelSet>,
}

impl RecipeClassifierBuilder {
    /// Creates a new builder with default configuration.
    pub fn new() -> Self {
        Self {
            common: CommonBuilderConfig::new(),
            input_shape: None,
            apply_softmax: None,
            labels: None,
        }
    }

    /// Sets the model path.
    pub fn model_path(mut self, model_path: impl Into<std::path::PathBuf>) -> Self {
        self.common = self.common.model_path(model_path);
        self
    }

    /// Sets the model name used in logs and error context.
    pub fn model_name(mut self, model_name: impl Into<String>) -> Self {
        self.common = self.common.model_name(model_name);
        self
    }

    /// Sets the batch size.
    pub fn batch_size(mut self, batch_size: usize) -> Self {
        self.common = self.common.batch_size(batch_size);
        self
    }

    /// Sets the session pool size for concurrent predictions (minimum 1).
    pub fn session_pool_size(mut self, size: usize) -> Self {
        self.common = self.common.session_pool_size(size);
        self
    }

    /// Sets the input tensor name, skipping auto-detection.
    pub fn input_name(mut self, name: impl Into<String>) -> Self {
        self.common = self.common.input_name(name);
        self
    }

    /// Sets the ONNX Runtime session configuration.
    pub fn ort_session(mut self, config: OrtSessionConfig) -> Self {
        self.common = self.common.ort_session(config);
        self
    }

    /// Sets the input shape (width, height) the model expects.
    pub fn input_shape(mut self, input_shape: (u32, u32)) -> Self {
        self.input_shape = Some(input_shape);
        self
    }

    /// Enables or disables softmax normalization of score rows.
    pub fn apply_softmax(mut self, apply: bool) -> Self {
        self.apply_softmax = Some(apply);
        self
    }

    /// Sets the label set. Defaults to [`LabelSet::recipe_v1`] when not set.
    pub fn labels(mut self, labels: LabelSet) -> Self {
        self.labels = Some(labels);
        self
    }

    /// Loads the label set from a JSON file shipped with the model artifact.
    pub fn labels_from_file(
        mut self,
        path: impl AsRef<Path>,
    ) -> Result<Self, RecognitionError> {
        self.labels = Some(LabelSet::from_json_file(path)?);
        Ok(self)
    }

    /// Builds the classifier, loading the model from the given path.
    pub fn build(mut self, model_path: &Path) -> Result<RecipeClassifier, RecognitionError> {
        if self.common.model_path.is_none() {
            self.common = self.common.model_path(model_path.to_path_buf());
        }

        let config = RecipeClassifierConfig {
            common: self.common,
            input_shape: self.input_shape,
            apply_softmax: self.apply_softmax,
        };
        let config = config.validate_and_wrap()?;

        let labels = self.labels.unwrap_or_else(LabelSet::recipe_v1);
        RecipeClassifier::new(config, labels, model_path)
    }
}

impl Default for RecipeClassifierBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Tensor2D;
    use crate::domain::{HistoryEntry, PredictionHistory};
    use std::sync::Mutex;

    /// Scoring stub returning the same row for every batched image, while
    /// recording the shape of the tensor it was handed.
    struct StubModel {
        row: Vec<f32>,
        seen_shape: Mutex<Option<Vec<usize>>>,
    }

    impl StubModel {
        fn new(row: Vec<f32>) -> Self {
            Self {
                row,
                seen_shape: Mutex::new(None),
            }
        }
    }

    impl ScoringModel for StubModel {
        fn infer_2d(&self, batch: &Tensor4D) -> Result<Tensor2D, RecognitionError> {
            *self.seen_shape.lock().unwrap() = Some(batch.shape().to_vec());
            let rows = batch.shape()[0];
            Ok(Tensor2D::from_shape_fn((rows, self.row.len()), |(_, j)| {
                self.row[j]
            }))
        }
    }

    fn classifier_with_row(row: Vec<f32>) -> RecipeClassifier<StubModel> {
        RecipeClassifier::from_parts(
            StubModel::new(row),
            LabelSet::recipe_v1(),
            RecipeClassifierConfig::new(),
        )
        .unwrap()
    }

    fn small_labels() -> LabelSet {
        LabelSet::new("test-v1", vec!["a".into(), "b".into(), "c".into()]).unwrap()
    }

    #[test]
    fn fixed_scores_select_expected_label() {
        // All-zero scores except index 5 = 0.92.
        let mut row = vec![0.0f32; 14];
        row[5] = 0.92;
        let classifier = classifier_with_row(row);

        let prediction = classifier.classify_image(&RgbImage::new(64, 48)).unwrap();
        assert_eq!(prediction.class_id, 5);
        assert_eq!(prediction.label, "burger");
        assert_eq!(prediction.confidence, 0.92);
    }

    #[test]
    fn preprocessing_feeds_hwc_batch_of_one() {
        let classifier = classifier_with_row(vec![0.0; 14]);
        classifier.classify_image(&RgbImage::new(640, 480)).unwrap();

        let shape = classifier.model.seen_shape.lock().unwrap().clone().unwrap();
        assert_eq!(shape, vec![1, 224, 224, 3]);
    }

    #[test]
    fn tie_break_selects_lowest_index() {
        let mut row = vec![0.1f32; 14];
        row[3] = 0.5;
        row[7] = 0.5;
        let classifier = classifier_with_row(row);

        for _ in 0..5 {
            let prediction = classifier.classify_image(&RgbImage::new(10, 10)).unwrap();
            assert_eq!(prediction.class_id, 3);
            assert_eq!(prediction.confidence, 0.5);
        }
    }

    #[test]
    fn score_row_width_must_match_label_count() {
        // 3 scores against the 14-label set.
        let classifier = classifier_with_row(vec![0.2, 0.3, 0.5]);
        let result = classifier.classify_image(&RgbImage::new(10, 10));
        assert!(matches!(result, Err(RecognitionError::Inference(_))));
    }

    #[test]
    fn classify_is_idempotent_for_same_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dish.png");
        image::RgbImage::from_pixel(320, 240, image::Rgb([180, 90, 40]))
            .save(&path)
            .unwrap();

        let mut row = vec![0.01f32; 14];
        row[10] = 0.83;
        let classifier = classifier_with_row(row);

        let first = classifier.classify(&path).unwrap();
        let second = classifier.classify(&path).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.label, "pizza");
    }

    #[test]
    fn missing_file_is_decode_error_and_leaves_no_history() {
        let classifier = classifier_with_row(vec![0.0; 14]);
        let mut history = PredictionHistory::new();

        let result = classifier.classify(Path::new("uploads/missing.jpg"));
        match result {
            Err(err) => assert!(err.is_decode_error()),
            Ok(_) => panic!("expected a decode error for a missing file"),
        }

        // Callers record history only on success; a failed call must leave
        // no side effect.
        if let Ok(prediction) = classifier.classify(Path::new("uploads/missing.jpg")) {
            history.record(
                "alice",
                HistoryEntry {
                    filename: "missing.jpg".to_string(),
                    predicted_label: prediction.label,
                    confidence: prediction.confidence,
                },
            );
        }
        assert_eq!(history.user_count(), 0);
    }

    #[test]
    fn classify_batch_preserves_order_across_chunks() {
        let dir = tempfile::tempdir().unwrap();
        let mut paths = Vec::new();
        for i in 0..3 {
            let path = dir.path().join(format!("photo_{i}.png"));
            image::RgbImage::new(20, 20).save(&path).unwrap();
            paths.push(path);
        }

        let mut row = vec![0.0f32; 14];
        row[0] = 0.9;
        let mut classifier = classifier_with_row(row);
        classifier.batch_size = 2;

        let predictions = classifier.classify_batch(&paths).unwrap();
        assert_eq!(predictions.len(), 3);
        assert!(predictions.iter().all(|p| p.label == "Dosa"));
    }

    #[test]
    fn top_candidates_agree_with_classify() {
        let mut row = vec![0.0f32; 14];
        row[2] = 0.61;
        row[9] = 0.25;
        row[0] = 0.1;
        let classifier = classifier_with_row(row);
        let img = RgbImage::new(30, 30);

        let best = classifier.classify_image(&img).unwrap();
        let candidates = classifier.top_candidates(&img, 3).unwrap();

        assert_eq!(candidates.len(), 3);
        assert_eq!(candidates[0], best);
        assert_eq!(candidates[1].label, "kabab");
        assert_eq!(candidates[2].label, "Dosa");
    }

    #[test]
    fn softmax_option_normalizes_logits() {
        let model = StubModel::new(vec![1.0, 3.0, 2.0]);
        let config = RecipeClassifierConfig {
            apply_softmax: Some(true),
            ..RecipeClassifierConfig::new()
        };
        let classifier =
            RecipeClassifier::from_parts(model, small_labels(), config).unwrap();

        let prediction = classifier.classify_image(&RgbImage::new(10, 10)).unwrap();
        assert_eq!(prediction.label, "b");
        let expected = 3.0f32.exp() / (1.0f32.exp() + 3.0f32.exp() + 2.0f32.exp());
        assert!((prediction.confidence - expected).abs() < 1e-6);
    }

    #[test]
    fn confidence_percent_boundaries() {
        let zero = RecipePrediction {
            class_id: 0,
            label: "Dosa".to_string(),
            confidence: 0.0,
        };
        let one = RecipePrediction {
            class_id: 1,
            label: "Idli".to_string(),
            confidence: 1.0,
        };
        assert_eq!(zero.confidence_percent(), 0.0);
        assert_eq!(one.confidence_percent(), 100.0);

        let mid = RecipePrediction {
            confidence: 0.125,
            ..zero
        };
        assert_eq!(mid.confidence_percent(), 12.5);
    }
}
