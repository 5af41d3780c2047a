//! In-memory source store
//!
//! Holds the registered images, their points/annotations, and the source
//! label set. Persistence beyond process lifetime is a collaborator concern;
//! everything here is process-local state behind concurrent maps.

use std::collections::HashMap;

use dashmap::DashMap;
use rand::rng;
use tokio::sync::RwLock;
use tracing::{debug, info};
use uuid::Uuid;

use crate::annotation::{
    Annotation, AnnotationCounts, AnnotationKind, GenerateSpec, PixelRect, Point, generate_points,
};
use crate::labels::{Label, LabelSet};

use super::types::{CpcImport, ImageRecord, ImageSummary, SourceError, StoreStats};

/// In-memory store for one source
pub struct SourceStore {
    images: DashMap<Uuid, ImageRecord>,
    label_set: RwLock<LabelSet>,
    /// Cap for point generation per image
    max_points_per_image: u64,
}

impl SourceStore {
    pub fn new(max_points_per_image: u64) -> Self {
        Self {
            images: DashMap::new(),
            label_set: RwLock::new(LabelSet::new()),
            max_points_per_image,
        }
    }

    /// Register a new image. Names must be unique within the source.
    pub async fn register_image(
        &self,
        name: &str,
        width: u32,
        height: u32,
        annotation_area: Option<PixelRect>,
    ) -> Result<ImageSummary, SourceError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(SourceError::InvalidRequest(
                "Image name may not be empty".to_string(),
            ));
        }
        if width == 0 || height == 0 {
            return Err(SourceError::InvalidRequest(format!(
                "Image dimensions must be positive, got {}x{}",
                width, height
            )));
        }
        if let Some(area) = &annotation_area {
            area.validate(width, height)?;
        }
        if self.images.iter().any(|entry| entry.name == name) {
            return Err(SourceError::DuplicateImageName(name.to_string()));
        }

        let record = ImageRecord {
            id: Uuid::new_v4(),
            name: name.to_string(),
            width,
            height,
            annotation_area,
            points: Vec::new(),
            annotations: HashMap::new(),
            cpc: None,
        };
        let summary = record.summary();
        debug!("Registered image '{}' ({}x{})", name, width, height);
        self.images.insert(record.id, record);
        Ok(summary)
    }

    /// All images, sorted by name
    pub async fn list_images(&self) -> Vec<ImageSummary> {
        let mut summaries: Vec<ImageSummary> = self
            .images
            .iter()
            .map(|entry| entry.summary())
            .collect();
        summaries.sort_by(|a, b| a.name.cmp(&b.name));
        summaries
    }

    /// (id, name) pairs for the matching heuristic, in name order
    pub async fn image_names(&self) -> Vec<(Uuid, String)> {
        let mut names: Vec<(Uuid, String)> = self
            .images
            .iter()
            .map(|entry| (entry.id, entry.name.clone()))
            .collect();
        names.sort_by(|a, b| a.1.cmp(&b.1));
        names
    }

    pub async fn get_image(&self, id: Uuid) -> Result<ImageRecord, SourceError> {
        self.images
            .get(&id)
            .map(|entry| entry.clone())
            .ok_or(SourceError::ImageNotFound(id))
    }

    pub async fn label_set(&self) -> LabelSet {
        self.label_set.read().await.clone()
    }

    /// Replace the source's label set
    pub async fn set_label_set(&self, labels: Vec<Label>) -> Result<usize, SourceError> {
        let set = LabelSet::from_labels(labels)?;
        let len = set.len();
        *self.label_set.write().await = set;
        info!("Label set replaced: {} labels", len);
        Ok(len)
    }

    /// Generate sample points for an image, replacing existing points and
    /// clearing annotations.
    pub async fn generate_points(
        &self,
        id: Uuid,
        spec: GenerateSpec,
    ) -> Result<Vec<Point>, SourceError> {
        let mut entry = self
            .images
            .get_mut(&id)
            .ok_or(SourceError::ImageNotFound(id))?;
        let points = generate_points(
            entry.width,
            entry.height,
            entry.annotation_area,
            spec,
            self.max_points_per_image,
            &mut rng(),
        )?;
        debug!("Generated {} points for image '{}'", points.len(), entry.name);
        entry.points = points.clone();
        entry.annotations.clear();
        Ok(points)
    }

    /// Set one point's annotation. The label code must resolve
    /// case-insensitively against the label set; the stored code is the
    /// set's canonical spelling.
    pub async fn set_annotation(
        &self,
        id: Uuid,
        point_number: u32,
        label_code: &str,
        kind: AnnotationKind,
    ) -> Result<AnnotationCounts, SourceError> {
        let label_set = self.label_set.read().await;
        if label_set.is_empty() {
            return Err(SourceError::NoLabelSet);
        }
        let label = label_set
            .lookup(label_code)
            .ok_or_else(|| SourceError::UnknownLabelCode {
                point_number,
                code: label_code.to_string(),
            })?;

        let mut entry = self
            .images
            .get_mut(&id)
            .ok_or(SourceError::ImageNotFound(id))?;
        if !entry.points.iter().any(|p| p.number == point_number) {
            return Err(SourceError::PointNotFound(point_number));
        }
        entry.annotations.insert(
            point_number,
            Annotation {
                label_code: label.code.clone(),
                kind,
            },
        );
        Ok(entry.counts())
    }

    /// Apply a fully validated batch of CPC imports.
    pub async fn commit_imports(&self, imports: Vec<CpcImport>) {
        for import in imports {
            let Some(mut entry) = self.images.get_mut(&import.image_id) else {
                debug!("Skipping import for vanished image {}", import.image_id);
                continue;
            };
            entry.points = import.points;
            entry.annotations = import.annotations;
            entry.cpc = Some(import.cpc);
        }
    }

    /// All full records, sorted by name (for exports)
    pub async fn all_images(&self) -> Vec<ImageRecord> {
        let mut records: Vec<ImageRecord> =
            self.images.iter().map(|entry| entry.clone()).collect();
        records.sort_by(|a, b| a.name.cmp(&b.name));
        records
    }

    pub async fn stats(&self) -> StoreStats {
        let mut stats = StoreStats {
            images: self.images.len(),
            ..StoreStats::default()
        };
        for entry in self.images.iter() {
            stats.points += entry.points.len();
            stats.annotations += entry.annotations.len();
        }
        stats
    }
}
