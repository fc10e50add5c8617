use std::collections::VecDeque;

use geo_types::Coord;
use rstar::{PointDistance, RTree, RTreeObject, AABB};
use serde::{Deserialize, Serialize};

use crate::geometry::{feature_centroid, planar_distance, to_lng_lat};
use crate::models::{Cluster, ClusterMember, ClusterSummary, Feature, LngLat};

pub const DEFAULT_DISTANCE_THRESHOLD: f64 = 25.0;

/// How neighbours of a dequeued feature are found. Both produce the same clusters.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum NeighborSearch {
    /// Rescan every feature, O(n) per dequeued feature.
    #[default]
    Scan,
    /// Query an R-tree of centroids.
    Indexed,
}

/// Caller-held clustering configuration.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct ClusterOptions {
    /// Same units as the coordinates (degrees).
    pub threshold: f64,
    pub strategy: NeighborSearch,
}

impl Default for ClusterOptions {
    fn default() -> Self {
        ClusterOptions {
            threshold: DEFAULT_DISTANCE_THRESHOLD,
            strategy: NeighborSearch::Scan,
        }
    }
}

/// Group features into connected components of the threshold graph using the
/// full neighbour rescan.
pub fn cluster_features(features: &[Feature], threshold: f64) -> Vec<Cluster> {
    cluster_with_options(
        features,
        &ClusterOptions {
            threshold,
            strategy: NeighborSearch::Scan,
        },
    )
}

pub fn cluster_with_options(features: &[Feature], options: &ClusterOptions) -> Vec<Cluster> {
    let centroids: Vec<Option<Coord<f64>>> = features
        .iter()
        .map(|feature| feature_centroid(&feature.geometry))
        .collect();

    // The tree cannot reproduce `inf <= inf` comparisons, so unbounded
    // thresholds always rescan.
    match options.strategy {
        NeighborSearch::Indexed if options.threshold.is_finite() => {
            let index = CentroidIndex::build(&centroids);
            flood_fill(features, &centroids, |idx, center, visited| {
                index.neighbors(idx, center, options.threshold, visited)
            })
        }
        _ => flood_fill(features, &centroids, |idx, center, visited| {
            scan_neighbors(&centroids, idx, center, options.threshold, visited)
        }),
    }
}

/// Breadth-first flood fill. `neighbors` must return unvisited indices within
/// the threshold in ascending order, duplicates of queued entries included.
fn flood_fill<F>(
    features: &[Feature],
    centroids: &[Option<Coord<f64>>],
    mut neighbors: F,
) -> Vec<Cluster>
where
    F: FnMut(usize, Coord<f64>, &[bool]) -> Vec<usize>,
{
    let mut visited = vec![false; features.len()];
    let mut clusters: Vec<Cluster> = Vec::new();
    let mut queue: VecDeque<usize> = VecDeque::new();

    for start in 0..features.len() {
        if visited[start] {
            continue;
        }

        let mut members: Vec<ClusterMember> = Vec::new();
        queue.push_back(start);

        while let Some(idx) = queue.pop_front() {
            if visited[idx] {
                continue;
            }
            visited[idx] = true;

            // Features without a centroid are consumed but never clustered
            let Some(center) = centroids[idx] else {
                continue;
            };

            members.push(ClusterMember {
                feature: features[idx].clone(),
                centroid: to_lng_lat(center),
                index: idx,
            });

            queue.extend(neighbors(idx, center, &visited));
        }

        if !members.is_empty() {
            let centroid = mean_centroid(&members);
            clusters.push(Cluster {
                id: clusters.len(),
                size: members.len(),
                members,
                centroid,
            });
        }
    }

    clusters
}

fn scan_neighbors(
    centroids: &[Option<Coord<f64>>],
    idx: usize,
    center: Coord<f64>,
    threshold: f64,
    visited: &[bool],
) -> Vec<usize> {
    centroids
        .iter()
        .enumerate()
        .filter(|(j, _)| *j != idx && !visited[*j])
        .filter_map(|(j, other)| other.map(|c| (j, c)))
        .filter(|(_, other)| planar_distance(center, *other) <= threshold)
        .map(|(j, _)| j)
        .collect()
}

fn mean_centroid(members: &[ClusterMember]) -> LngLat {
    let n = members.len() as f64;
    let (sum_lng, sum_lat) = members
        .iter()
        .fold((0.0, 0.0), |(lng, lat), m| (lng + m.centroid[0], lat + m.centroid[1]));
    [sum_lng / n, sum_lat / n]
}

#[derive(Clone, Debug)]
struct IndexedCentroid {
    index: usize,
    position: [f64; 2],
}

impl RTreeObject for IndexedCentroid {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.position)
    }
}

impl PointDistance for IndexedCentroid {
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        (point[0] - self.position[0]).powi(2) + (point[1] - self.position[1]).powi(2)
    }
}

/// R-tree over finite centroids. Non-finite centroids never satisfy a finite
/// threshold, so leaving them out changes nothing.
struct CentroidIndex {
    tree: RTree<IndexedCentroid>,
}

impl CentroidIndex {
    fn build(centroids: &[Option<Coord<f64>>]) -> Self {
        let items = centroids
            .iter()
            .enumerate()
            .filter_map(|(index, c)| c.map(|c| (index, c)))
            .filter(|(_, c)| c.x.is_finite() && c.y.is_finite())
            .map(|(index, c)| IndexedCentroid {
                index,
                position: [c.x, c.y],
            })
            .collect();
        CentroidIndex {
            tree: RTree::bulk_load(items),
        }
    }

    fn neighbors(&self, idx: usize, center: Coord<f64>, threshold: f64, visited: &[bool]) -> Vec<usize> {
        if threshold.is_nan() || threshold < 0.0 || !center.x.is_finite() || !center.y.is_finite() {
            return Vec::new();
        }
        // Search slightly wide, then apply the exact metric so boundary
        // pairs match the rescan bit for bit.
        let radius = threshold * (1.0 + 1e-9) + 1e-12;
        let origin = [center.x, center.y];
        let mut found: Vec<usize> = self
            .tree
            .locate_within_distance(origin, radius * radius)
            .filter(|item| item.index != idx && !visited[item.index])
            .filter(|item| {
                let other = Coord {
                    x: item.position[0],
                    y: item.position[1],
                };
                planar_distance(center, other) <= threshold
            })
            .map(|item| item.index)
            .collect();
        found.sort_unstable();
        found
    }
}

impl ClusterSummary {
    pub fn from_clusters(clusters: &[Cluster], total_features: usize) -> Self {
        let clustered_features: usize = clusters.iter().map(|c| c.size).sum();
        let average_cluster_size = if clusters.is_empty() {
            0.0
        } else {
            clustered_features as f64 / clusters.len() as f64
        };
        ClusterSummary {
            total_clusters: clusters.len(),
            total_features,
            clustered_features,
            average_cluster_size,
            largest_cluster: clusters.iter().map(|c| c.size).max().unwrap_or(0),
        }
    }
}
