//! Score selection over classification outputs.

use std::collections::HashMap;

/// Index of the maximum score in a row.
///
/// Ties select the lowest index (first occurrence), so selection is
/// deterministic and reproducible for any input. Returns `None` for an
/// empty row.
pub fn argmax(row: &[f32]) -> Option<usize> {
    let mut best: Option<(usize, f32)> = None;
    for (idx, &score) in row.iter().enumerate() {
        match best {
            Some((_, best_score)) if score <= best_score => {}
            _ => best = Some((idx, score)),
        }
    }
    best.map(|(idx, _)| idx)
}

/// Normalizes a score row into a probability distribution in place.
///
/// Uses max-subtraction for numerical stability. Leaves the argmax
/// unchanged: the transform is strictly monotonic.
pub fn softmax_in_place(row: &mut [f32]) {
    if row.is_empty() {
        return;
    }
    let max = row.iter().cloned().fold(f32::NEG_INFINITY, f32::max);
    let mut sum = 0.0f32;
    for v in row.iter_mut() {
        *v = (*v - max).exp();
        sum += *v;
    }
    if sum > 0.0 {
        for v in row.iter_mut() {
            *v /= sum;
        }
    }
}

/// Result structure for top-k classification processing.
#[derive(Debug, Clone)]
pub struct TopkResult {
    /// Top-k class indexes for each prediction, best first.
    pub indexes: Vec<Vec<usize>>,
    /// Scores corresponding to the indexes.
    pub scores: Vec<Vec<f32>>,
    /// Class names for the indexes, if a mapping was provided.
    pub class_names: Option<Vec<Vec<String>>>,
}

/// A processor for extracting top-k results from classification outputs.
#[derive(Debug, Default)]
pub struct Topk {
    class_id_map: Option<HashMap<usize, String>>,
}

impl Topk {
    /// Creates a new Topk processor with optional class name mapping.
    pub fn new(class_id_map: Option<HashMap<usize, String>>) -> Self {
        Self { class_id_map }
    }

    /// Creates a Topk processor without class name mapping.
    pub fn without_class_names() -> Self {
        Self::new(None)
    }

    /// Creates a Topk processor from a vector of class names where the
    /// vector index is the class ID.
    pub fn from_class_names(class_names: Vec<String>) -> Self {
        let class_id_map: HashMap<usize, String> = class_names.into_iter().enumerate().collect();
        Self::new(Some(class_id_map))
    }

    /// Extracts the top-k predictions from each score row.
    ///
    /// Rows are sorted descending by score with a stable sort, so equal
    /// scores keep ascending index order and the tie-break matches
    /// [`argmax`].
    ///
    /// # Errors
    ///
    /// Returns an error if k is 0 or any score row is empty.
    pub fn process(&self, predictions: &[Vec<f32>], k: usize) -> Result<TopkResult, String> {
        if k == 0 {
            return Err("k must be greater than 0".to_string());
        }

        let mut all_indexes = Vec::with_capacity(predictions.len());
        let mut all_scores = Vec::with_capacity(predictions.len());
        let mut all_class_names = self.class_id_map.is_some().then(Vec::new);

        for prediction in predictions {
            if prediction.is_empty() {
                return Err("empty prediction vector".to_string());
            }

            let mut indexed: Vec<(usize, f32)> =
                prediction.iter().copied().enumerate().collect();
            indexed.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

            let (indexes, scores): (Vec<usize>, Vec<f32>) =
                indexed.into_iter().take(k.min(prediction.len())).unzip();

            if let Some(ref mut names) = all_class_names {
                names.push(self.map_indexes_to_names(&indexes));
            }
            all_indexes.push(indexes);
            all_scores.push(scores);
        }

        Ok(TopkResult {
            indexes: all_indexes,
            scores: all_scores,
            class_names: all_class_names,
        })
    }

    /// Extracts the top-k predictions from a single score row.
    pub fn process_single(&self, prediction: &[f32], k: usize) -> Result<TopkResult, String> {
        self.process(&[prediction.to_vec()], k)
    }

    fn map_indexes_to_names(&self, indexes: &[usize]) -> Vec<String> {
        match &self.class_id_map {
            Some(class_map) => indexes
                .iter()
                .map(|&idx| {
                    class_map
                        .get(&idx)
                        .cloned()
                        .unwrap_or_else(|| format!("Unknown({})", idx))
                })
                .collect(),
            None => indexes.iter().map(|&idx| idx.to_string()).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn argmax_selects_unique_maximum() {
        assert_eq!(argmax(&[0.1, 0.8, 0.1]), Some(1));
        assert_eq!(argmax(&[0.7, 0.2, 0.1]), Some(0));
    }

    #[test]
    fn argmax_tie_break_is_first_occurrence() {
        let scores = [0.5, 0.5, 0.1];
        for _ in 0..10 {
            assert_eq!(argmax(&scores), Some(0));
        }
        assert_eq!(argmax(&[0.1, 0.5, 0.5]), Some(1));
    }

    #[test]
    fn argmax_empty_row() {
        assert_eq!(argmax(&[]), None);
    }

    #[test]
    fn softmax_sums_to_one_and_preserves_argmax() {
        let mut row = vec![2.0, 1.0, 0.5, 3.0];
        let before = argmax(&row);
        softmax_in_place(&mut row);
        let sum: f32 = row.iter().sum();
        assert!((sum - 1.0).abs() < 1e-6);
        assert_eq!(argmax(&row), before);
    }

    #[test]
    fn topk_orders_descending() {
        let topk = Topk::without_class_names();
        let predictions = vec![vec![0.1, 0.8, 0.1], vec![0.7, 0.2, 0.1]];

        let result = topk.process(&predictions, 2).unwrap();
        assert_eq!(result.indexes[0], vec![1, 0]);
        assert_eq!(result.indexes[1], vec![0, 1]);
        assert!(result.class_names.is_none());
    }

    #[test]
    fn topk_equal_scores_keep_index_order() {
        let topk = Topk::without_class_names();
        let result = topk.process(&[vec![0.5, 0.5, 0.1]], 3).unwrap();
        assert_eq!(result.indexes[0], vec![0, 1, 2]);
    }

    #[test]
    fn topk_with_class_names() {
        let topk = Topk::from_class_names(vec![
            "pizza".to_string(),
            "burger".to_string(),
            "Dosa".to_string(),
        ]);
        let result = topk.process(&[vec![0.1, 0.8, 0.1]], 2).unwrap();
        assert_eq!(
            result.class_names.as_ref().unwrap()[0],
            vec!["burger", "pizza"]
        );
    }

    #[test]
    fn topk_k_larger_than_classes() {
        let topk = Topk::without_class_names();
        let result = topk.process(&[vec![0.1, 0.8]], 5).unwrap();
        assert_eq!(result.indexes[0].len(), 2);
    }

    #[test]
    fn topk_invalid_inputs() {
        let topk = Topk::without_class_names();
        assert!(topk.process(&[vec![0.1]], 0).is_err());
        assert!(topk.process(&[vec![]], 1).is_err());
    }
}
