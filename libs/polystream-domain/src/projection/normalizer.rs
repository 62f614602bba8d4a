//! Grouping coordinate normalization
//!
//! Different payload types sometimes describe the same window with
//! different coordinates. A normalizer maps them onto one value before the
//! group key is built.

use std::path::Path;

use crate::fragment::{Coordinate, DataType, Dimension, Fragment};

/// Hook applied to every grouping coordinate before keying
pub trait CoordinateNormalizer: Send + Sync {
    fn normalize(
        &self,
        dimension: Dimension,
        coordinate: &Coordinate,
        fragment: &Fragment,
    ) -> Coordinate;
}

/// Leaves coordinates untouched
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityNormalizer;

impl CoordinateNormalizer for IdentityNormalizer {
    fn normalize(
        &self,
        _dimension: Dimension,
        coordinate: &Coordinate,
        _fragment: &Fragment,
    ) -> Coordinate {
        coordinate.clone()
    }
}

/// Folds ROI results paths back onto the images directory they belong to
///
/// ROI payloads are addressed by the path of the analysis output
/// (`/plate/foo_results`), while their images carry the images directory
/// name. For `rois` fragments whose window coordinate looks like a results
/// path, the coordinate becomes the base name of the images directory.
#[derive(Debug, Clone)]
pub struct SourceDirNormalizer {
    images_dir_name: Option<String>,
}

impl SourceDirNormalizer {
    pub fn new(images_dir: impl AsRef<Path>) -> Self {
        let images_dir_name = images_dir
            .as_ref()
            .file_name()
            .map(|name| name.to_string_lossy().into_owned());
        Self { images_dir_name }
    }
}

impl CoordinateNormalizer for SourceDirNormalizer {
    fn normalize(
        &self,
        dimension: Dimension,
        coordinate: &Coordinate,
        fragment: &Fragment,
    ) -> Coordinate {
        let Some(dir_name) = &self.images_dir_name else {
            return coordinate.clone();
        };
        match coordinate {
            Coordinate::Label(label)
                if dimension == Dimension::Window
                    && fragment.data_type() == DataType::Rois
                    && (label.contains("_results") || label.contains('/')) =>
            {
                Coordinate::Label(dir_name.clone())
            }
            _ => coordinate.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fragment::Addressing;

    fn fragment(data_type: DataType) -> Fragment {
        Fragment::new(Addressing::new(), data_type, Vec::<u8>::new())
    }

    #[test]
    fn test_rois_results_path_maps_to_images_dir() {
        let normalizer = SourceDirNormalizer::new("/my/plate/images");
        let rois = fragment(DataType::Rois);

        let normalized =
            normalizer.normalize(Dimension::Window, &Coordinate::from("/tmp/foo_results"), &rois);
        assert_eq!(normalized, Coordinate::from("images"));
    }

    #[test]
    fn test_other_payloads_and_dimensions_untouched() {
        let normalizer = SourceDirNormalizer::new("/my/plate/images");
        let path = Coordinate::from("/tmp/foo_results");

        let image = fragment(DataType::Image);
        assert_eq!(normalizer.normalize(Dimension::Window, &path, &image), path);

        let rois = fragment(DataType::Rois);
        assert_eq!(normalizer.normalize(Dimension::Channel, &path, &rois), path);

        let plain = Coordinate::from("step_1");
        assert_eq!(normalizer.normalize(Dimension::Window, &plain, &rois), plain);
    }

    #[test]
    fn test_root_images_dir_disables_rule() {
        let normalizer = SourceDirNormalizer::new("/");
        let rois = fragment(DataType::Rois);
        let path = Coordinate::from("a/b_results");

        assert_eq!(normalizer.normalize(Dimension::Window, &path, &rois), path);
    }
}
