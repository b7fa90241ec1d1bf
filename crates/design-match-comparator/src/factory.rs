use std::sync::Arc;

use design_match_types::SimilarityMetric;

use crate::similarity::{LayoutMetric, MeanAbsMetric, StructuralSsimMetric};

pub struct MetricFactory {
    metric: SimilarityMetric,
}

impl MetricFactory {
    pub fn new(metric: SimilarityMetric) -> Self {
        Self { metric }
    }

    pub fn build(&self) -> Arc<dyn LayoutMetric> {
        match self.metric {
            SimilarityMetric::Ssim => Arc::new(StructuralSsimMetric::new()),
            SimilarityMetric::MeanAbs => Arc::new(MeanAbsMetric::new()),
        }
    }
}
