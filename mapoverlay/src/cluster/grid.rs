//! Grid-based spatial clustering.
//!
//! Locations are projected to Web Mercator world pixels at the requested zoom
//! and bucketed into square cells of `grid_size` pixels. Zooming in shrinks
//! the geographic extent of a cell, so clusters split apart as the user zooms.

use std::collections::HashMap;

use crate::coord::{from_world_pixel, mean_location, to_world_pixel, LatLong, Point};

use super::options::ClusterPlacementMode;

/// One clustered bucket.
#[derive(Debug, Clone, PartialEq)]
pub struct Bucket {
    /// Indices into the input, in input order
    pub members: Vec<usize>,
    pub location: LatLong,
}

/// Result of one clustering pass.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Clustering {
    /// Buckets large enough to render as a cluster, in first-appearance order
    pub clusters: Vec<Bucket>,
    /// Indices that stay individual pins
    pub singles: Vec<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridClusterer {
    grid_size: f64,
    minimum_cluster_size: usize,
    placement: ClusterPlacementMode,
}

impl GridClusterer {
    /// A grid size below one pixel is treated as one pixel.
    pub fn new(grid_size: f64, minimum_cluster_size: usize, placement: ClusterPlacementMode) -> Self {
        Self {
            grid_size: grid_size.max(1.0),
            minimum_cluster_size: minimum_cluster_size.max(1),
            placement,
        }
    }

    pub fn cluster(&self, locations: &[LatLong], zoom: f64) -> Clustering {
        let mut order: Vec<(i64, i64)> = Vec::new();
        let mut cells: HashMap<(i64, i64), Vec<usize>> = HashMap::new();

        for (index, location) in locations.iter().enumerate() {
            let pixel = to_world_pixel(*location, zoom);
            let cell = (
                (pixel.x / self.grid_size).floor() as i64,
                (pixel.y / self.grid_size).floor() as i64,
            );
            cells
                .entry(cell)
                .or_insert_with(|| {
                    order.push(cell);
                    Vec::new()
                })
                .push(index);
        }

        let mut result = Clustering::default();
        for cell in order {
            let Some(members) = cells.remove(&cell) else {
                continue;
            };
            if members.len() < self.minimum_cluster_size {
                result.singles.extend(members);
                continue;
            }
            let location = self.place(cell, &members, locations, zoom);
            result.clusters.push(Bucket { members, location });
        }
        result
    }

    fn place(&self, cell: (i64, i64), members: &[usize], locations: &[LatLong], zoom: f64) -> LatLong {
        match self.placement {
            ClusterPlacementMode::FirstPin => locations[members[0]],
            ClusterPlacementMode::MeanValue => {
                let member_locations: Vec<LatLong> = members.iter().map(|&i| locations[i]).collect();
                mean_location(&member_locations).unwrap_or(locations[members[0]])
            }
            ClusterPlacementMode::None => {
                let center = Point::new(
                    (cell.0 as f64 + 0.5) * self.grid_size,
                    (cell.1 as f64 + 0.5) * self.grid_size,
                );
                from_world_pixel(center, zoom)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nearby() -> Vec<LatLong> {
        vec![
            LatLong::new(47.6062, -122.3321),
            LatLong::new(47.6063, -122.3322),
            LatLong::new(47.6064, -122.3320),
            LatLong::new(40.7128, -74.0060),
        ]
    }

    #[test]
    fn test_close_points_cluster_distant_stay_single() {
        let clusterer = GridClusterer::new(60.0, 2, ClusterPlacementMode::MeanValue);
        let result = clusterer.cluster(&nearby(), 10.0);

        assert_eq!(result.clusters.len(), 1);
        assert_eq!(result.clusters[0].members, vec![0, 1, 2]);
        assert_eq!(result.singles, vec![3]);
    }

    #[test]
    fn test_minimum_cluster_size_is_respected() {
        let clusterer = GridClusterer::new(60.0, 4, ClusterPlacementMode::MeanValue);
        let result = clusterer.cluster(&nearby(), 10.0);

        assert!(result.clusters.is_empty());
        assert_eq!(result.singles.len(), 4);
    }

    #[test]
    fn test_high_zoom_splits_clusters() {
        let clusterer = GridClusterer::new(60.0, 2, ClusterPlacementMode::MeanValue);
        let result = clusterer.cluster(&nearby(), 21.0);

        assert!(result.clusters.is_empty());
    }

    #[test]
    fn test_first_pin_placement() {
        let locations = nearby();
        let clusterer = GridClusterer::new(60.0, 2, ClusterPlacementMode::FirstPin);
        let result = clusterer.cluster(&locations, 10.0);

        assert_eq!(result.clusters[0].location, locations[0]);
    }

    #[test]
    fn test_mean_placement() {
        let locations = nearby();
        let clusterer = GridClusterer::new(60.0, 2, ClusterPlacementMode::MeanValue);
        let result = clusterer.cluster(&locations, 10.0);

        let expected_lat = (47.6062 + 47.6063 + 47.6064) / 3.0;
        assert!((result.clusters[0].location.latitude - expected_lat).abs() < 1e-9);
    }

    #[test]
    fn test_cell_center_placement_lies_in_cell() {
        let locations = nearby();
        let clusterer = GridClusterer::new(60.0, 2, ClusterPlacementMode::None);
        let result = clusterer.cluster(&locations, 10.0);

        let placed = to_world_pixel(result.clusters[0].location, 10.0);
        let first = to_world_pixel(locations[0], 10.0);
        assert_eq!((placed.x / 60.0).floor(), (first.x / 60.0).floor());
        assert_eq!((placed.y / 60.0).floor(), (first.y / 60.0).floor());
    }

    #[test]
    fn test_empty_input() {
        let clusterer = GridClusterer::new(60.0, 2, ClusterPlacementMode::MeanValue);
        assert_eq!(clusterer.cluster(&[], 3.0), Clustering::default());
    }
}
